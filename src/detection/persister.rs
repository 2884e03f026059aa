use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set};

use super::parser::CanonicalDefect;
use crate::entities::detection_record;

/// Comma-space join of defect types in list order; empty when nothing was detected.
pub fn defect_name_summary(defects: &[CanonicalDefect]) -> String {
    defects
        .iter()
        .map(|d| d.defect_type.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Writes the authoritative detection record.
#[derive(Clone)]
pub struct DetectionRecordPersister {
    db: DatabaseConnection,
}

impl DetectionRecordPersister {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn persist(
        &self,
        user_id: i32,
        image_path: &str,
        payload: &str,
        defects: &[CanonicalDefect],
    ) -> Result<detection_record::Model, DbErr> {
        let record = detection_record::ActiveModel {
            user_id: Set(user_id),
            image_path: Set(image_path.to_string()),
            defects_json: Set(payload.to_string()),
            defects_name: Set(defect_name_summary(defects)),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };

        let record = record.insert(&self.db).await?;
        tracing::info!(
            detection_id = record.id,
            user_id = record.user_id,
            defects_name = %record.defects_name,
            "Detection record saved"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defect(name: &str) -> CanonicalDefect {
        CanonicalDefect {
            defect_type: name.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn summary_of_nothing_is_empty() {
        assert_eq!(defect_name_summary(&[]), "");
    }

    #[test]
    fn summary_joins_in_order() {
        assert_eq!(defect_name_summary(&[defect("crack")]), "crack");
        assert_eq!(
            defect_name_summary(&[defect("crack"), defect("spot")]),
            "crack, spot"
        );
        assert_eq!(
            defect_name_summary(&[defect("crack"), defect("crack")]),
            "crack, crack"
        );
    }
}
