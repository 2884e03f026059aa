use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait};

use crate::entities::{DetectionRecord, FavoriteRecord};

/// Row counts behind the record gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordCounts {
    pub detections: u64,
    pub favorites: u64,
}

impl RecordCounts {
    pub async fn load(db: &DatabaseConnection) -> Result<Self, DbErr> {
        Ok(Self {
            detections: DetectionRecord::find().count(db).await?,
            favorites: FavoriteRecord::find().count(db).await?,
        })
    }

    pub fn publish(&self) {
        metrics::gauge!("beanscan_detection_records_total").set(self.detections as f64);
        metrics::gauge!("beanscan_favorite_records_total").set(self.favorites as f64);
    }
}

/// Seed the record gauges from the current table sizes.
pub async fn init_metrics(db: &DatabaseConnection) {
    let counts = RecordCounts::load(db).await.unwrap_or(RecordCounts {
        detections: 0,
        favorites: 0,
    });
    counts.publish();

    // Counters show up in /metrics before their first increment
    for outcome in ["success", "invocation_error", "parse_error", "persistence_error"] {
        metrics::counter!("beanscan_detections_total", "outcome" => outcome).absolute(0);
    }
    for outcome in ["created", "conflict", "not_found"] {
        metrics::counter!("beanscan_favorites_total", "outcome" => outcome).absolute(0);
    }
    metrics::counter!("beanscan_history_mirror_failures_total").absolute(0);

    tracing::info!(
        "Initialized metrics: DetectionRecords={}, Favorites={}",
        counts.detections,
        counts.favorites
    );
}

/// Re-read the record gauges after bulk deletes the per-request helpers do not see.
pub async fn refresh_record_gauges(db: &DatabaseConnection) -> Result<RecordCounts, DbErr> {
    let counts = RecordCounts::load(db).await?;
    counts.publish();
    Ok(counts)
}

pub fn increment_detection_records() {
    metrics::gauge!("beanscan_detection_records_total").increment(1.0);
}

pub fn increment_favorite_records() {
    metrics::gauge!("beanscan_favorite_records_total").increment(1.0);
}

pub fn decrement_favorite_records() {
    metrics::gauge!("beanscan_favorite_records_total").decrement(1.0);
}
