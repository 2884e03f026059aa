use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "favorite_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub detection_id: i32,
    #[sea_orm(column_type = "Text")]
    pub defects_name: String,
    pub image_path: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::detection_record::Entity",
        from = "Column::DetectionId",
        to = "super::detection_record::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    DetectionRecord,
}

impl Related<super::detection_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DetectionRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
