use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;

use crate::entities::{coffee_bean_grade_info, CoffeeBeanGradeInfo};

/// Curated description of a bean grade or defect category.
///
/// Every field is `None` when the lookup missed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GradeMetadata {
    pub bean_name: Option<String>,
    pub english_name: Option<String>,
    pub recognition_result: Option<String>,
    pub category: Option<String>,
    pub appearance: Option<String>,
    pub cause: Option<String>,
    pub flavor_impact: Option<String>,
    pub handling_suggestion: Option<String>,
    pub prevention: Option<String>,
    pub sample_image_url: Option<String>,
}

impl GradeMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<coffee_bean_grade_info::Model> for GradeMetadata {
    fn from(model: coffee_bean_grade_info::Model) -> Self {
        Self {
            bean_name: model.bean_name,
            english_name: Some(model.english_name),
            recognition_result: model.recognition_result,
            category: model.category,
            appearance: model.appearance,
            cause: model.cause,
            flavor_impact: model.flavor_impact,
            handling_suggestion: model.handling_suggestion,
            prevention: model.prevention,
            sample_image_url: model.sample_image_url,
        }
    }
}

#[derive(Clone)]
pub struct GradeEnricher {
    db: DatabaseConnection,
}

impl GradeEnricher {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Exact match of the whole summary against `english_name`. A multi-defect
    /// summary such as `"crack, spot"` only matches a row keyed that way.
    pub async fn enrich(&self, defects_name: &str) -> Result<Option<GradeMetadata>, DbErr> {
        let row = CoffeeBeanGradeInfo::find()
            .filter(coffee_bean_grade_info::Column::EnglishName.eq(defects_name))
            .order_by_asc(coffee_bean_grade_info::Column::Id)
            .one(&self.db)
            .await?;

        if row.is_none() {
            tracing::debug!(defects_name = %defects_name, "No grade metadata for detection");
        }
        Ok(row.map(GradeMetadata::from))
    }

    /// Returns `false` when no grade row has this id.
    pub async fn attach_sample_image(&self, grade_id: i32, url: &str) -> Result<bool, DbErr> {
        let Some(grade) = CoffeeBeanGradeInfo::find_by_id(grade_id).one(&self.db).await? else {
            return Ok(false);
        };

        let mut active: coffee_bean_grade_info::ActiveModel = grade.into();
        active.sample_image_url = Set(Some(url.to_string()));
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        active.update(&self.db).await?;

        tracing::info!(grade_id = grade_id, url = %url, "Sample image attached to grade");
        Ok(true)
    }
}
