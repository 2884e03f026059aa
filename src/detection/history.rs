use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{detection_history, DetectionHistory};

/// Best-effort per-user history index. Detection records stay the source of
/// truth; a lost history row is tolerated.
#[derive(Clone)]
pub struct HistoryMirror {
    db: DatabaseConnection,
}

impl HistoryMirror {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append a history entry. Failures are logged and swallowed.
    pub async fn mirror(&self, user_id: i32, defects_name: &str, image_path: &str) {
        if let Err(e) = self.try_mirror(user_id, defects_name, image_path).await {
            tracing::error!(
                user_id = user_id,
                image_path = %image_path,
                error = %e,
                "Failed to save detection history"
            );
            metrics::counter!("beanscan_history_mirror_failures_total").increment(1);
        }
    }

    async fn try_mirror(
        &self,
        user_id: i32,
        defects_name: &str,
        image_path: &str,
    ) -> Result<detection_history::Model, DbErr> {
        detection_history::ActiveModel {
            user_id: Set(user_id),
            defects_name: Set(defects_name.to_string()),
            image_path: Set(image_path.to_string()),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    /// The user's history, newest first.
    pub async fn list_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<detection_history::Model>, DbErr> {
        DetectionHistory::find()
            .filter(detection_history::Column::UserId.eq(user_id))
            .order_by_desc(detection_history::Column::CreatedAt)
            .order_by_desc(detection_history::Column::Id)
            .all(&self.db)
            .await
    }
}
