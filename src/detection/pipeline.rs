use std::sync::Arc;

use sea_orm::{DatabaseConnection, DbErr};
use serde::Serialize;
use thiserror::Error;

use super::grade::{GradeEnricher, GradeMetadata};
use super::history::HistoryMirror;
use super::invoker::{InferenceInvoker, InvocationError};
use super::labels::LabelCatalog;
use super::parser::{self, CanonicalDefect, ExtractionSource, ParseError};
use super::persister::DetectionRecordPersister;

/// Failures that abort a detection request. Nothing is persisted for the
/// first two; the third means the authoritative write itself failed.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to save detection record: {0}")]
    Persistence(#[from] DbErr),
}

impl DetectionError {
    fn outcome_label(&self) -> &'static str {
        match self {
            Self::Invocation(_) => "invocation_error",
            Self::Parse(_) => "parse_error",
            Self::Persistence(_) => "persistence_error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectionOutcome {
    pub detection_id: i32,
    pub defects_name: String,
    pub defects: Vec<CanonicalDefect>,
    pub source: ExtractionSource,
    #[serde(flatten)]
    pub grade: GradeMetadata,
}

/// Invoke → parse → persist → mirror history → enrich.
pub struct DetectionPipeline {
    invoker: InferenceInvoker,
    catalog: Arc<LabelCatalog>,
    threshold: f64,
    persister: DetectionRecordPersister,
    history: HistoryMirror,
    grades: GradeEnricher,
}

impl DetectionPipeline {
    pub fn new(
        db: DatabaseConnection,
        invoker: InferenceInvoker,
        catalog: Arc<LabelCatalog>,
        threshold: f64,
    ) -> Self {
        Self {
            invoker,
            catalog,
            threshold,
            persister: DetectionRecordPersister::new(db.clone()),
            history: HistoryMirror::new(db.clone()),
            grades: GradeEnricher::new(db),
        }
    }

    #[tracing::instrument(
        name = "detect",
        skip(self),
        fields(detection_id = tracing::field::Empty)
    )]
    pub async fn detect(
        &self,
        user_id: i32,
        image_path: &str,
    ) -> Result<DetectionOutcome, DetectionError> {
        match self.run(user_id, image_path).await {
            Ok(outcome) => {
                tracing::Span::current().record("detection_id", outcome.detection_id);
                metrics::counter!("beanscan_detections_total", "outcome" => "success").increment(1);
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, "Detection failed");
                metrics::counter!("beanscan_detections_total", "outcome" => e.outcome_label())
                    .increment(1);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        user_id: i32,
        image_path: &str,
    ) -> Result<DetectionOutcome, DetectionError> {
        let raw = self.invoker.invoke(image_path).await?;
        let parsed = parser::parse(&raw, &self.catalog, self.threshold)?;

        let record = self
            .persister
            .persist(user_id, image_path, &parsed.payload, &parsed.defects)
            .await?;

        // Committed from here on; later steps must not fail the request
        self.history
            .mirror(user_id, &record.defects_name, &record.image_path)
            .await;

        let grade = match self.grades.enrich(&record.defects_name).await {
            Ok(grade) => grade.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    detection_id = record.id,
                    error = %e,
                    "Grade lookup failed, returning detection without metadata"
                );
                GradeMetadata::default()
            }
        };

        Ok(DetectionOutcome {
            detection_id: record.id,
            defects_name: record.defects_name,
            defects: parsed.defects,
            source: parsed.source,
            grade,
        })
    }

    pub fn history(&self) -> &HistoryMirror {
        &self.history
    }

    pub fn grades(&self) -> &GradeEnricher {
        &self.grades
    }
}
