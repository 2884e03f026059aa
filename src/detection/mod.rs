//! Detection-result ingestion: run the external classifier on an uploaded
//! image and turn its output into persisted, enriched records.

pub mod grade;
pub mod history;
pub mod invoker;
pub mod labels;
pub mod parser;
pub mod persister;
pub mod pipeline;

pub use grade::{GradeEnricher, GradeMetadata};
pub use history::HistoryMirror;
pub use invoker::{InferenceInvoker, InvocationError};
pub use labels::LabelCatalog;
pub use parser::{CanonicalDefect, ExtractionSource, ParseError, ParsedOutput};
pub use persister::{defect_name_summary, DetectionRecordPersister};
pub use pipeline::{DetectionError, DetectionOutcome, DetectionPipeline};
