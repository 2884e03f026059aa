use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "coffee_bean_grade_info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub bean_name: Option<String>,
    /// Join key against `detection_records.defects_name`.
    pub english_name: String,
    pub recognition_result: Option<String>,
    pub category: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub appearance: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub cause: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub flavor_impact: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub handling_suggestion: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub prevention: Option<String>,
    pub sample_image_url: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
