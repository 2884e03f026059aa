use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::config::RetentionConfig;
use crate::entities::{detection_history, detection_record, DetectionHistory, DetectionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeSummary {
    pub records: u64,
    pub history: u64,
}

/// Delete detection records and history entries older than `max_age`.
/// Favorites of a deleted record go with it through the FK cascade.
pub async fn purge_expired(
    db: &DatabaseConnection,
    max_age: chrono::Duration,
) -> Result<PurgeSummary, DbErr> {
    let threshold = chrono::Utc::now().naive_utc() - max_age;

    let records = DetectionRecord::delete_many()
        .filter(detection_record::Column::CreatedAt.lt(threshold))
        .exec(db)
        .await?
        .rows_affected;

    let history = DetectionHistory::delete_many()
        .filter(detection_history::Column::CreatedAt.lt(threshold))
        .exec(db)
        .await?
        .rows_affected;

    Ok(PurgeSummary { records, history })
}

pub fn start_retention_sweeper(db: DatabaseConnection, config: RetentionConfig) {
    tokio::spawn(async move {
        tracing::info!(
            max_age_days = config.max_age.num_days(),
            "Retention sweeper started"
        );
        let mut ticker = tokio::time::interval(config.interval);
        loop {
            ticker.tick().await;
            match purge_expired(&db, config.max_age).await {
                Ok(summary) => {
                    tracing::info!(
                        records = summary.records,
                        history = summary.history,
                        "Expired detection data purged"
                    );
                    // Cascaded favorites leave the gauges stale
                    if let Err(e) = crate::metrics::refresh_record_gauges(&db).await {
                        tracing::warn!("Failed to refresh record gauges: {}", e);
                    }
                }
                Err(e) => tracing::error!("Retention sweep failed: {}", e),
            }
        }
    });
}
