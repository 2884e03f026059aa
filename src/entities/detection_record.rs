use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "detection_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub image_path: String,
    // Classifier JSON document, kept verbatim for audit
    #[sea_orm(column_type = "Text")]
    pub defects_json: String,
    #[sea_orm(column_type = "Text")]
    pub defects_name: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::favorite_record::Entity")]
    FavoriteRecord,
}

impl Related<super::favorite_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FavoriteRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
