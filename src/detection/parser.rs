//! Classifier output parsing.
//!
//! The classifier prints arbitrary log lines followed by one JSON object. The
//! object is located by the first `{` in the captured text and read to the end
//! of the output. Two shapes are understood:
//!
//! - `{"defects": [{"type": "...", "confidence": 0.9}, ...]}` (labelled)
//! - `{"output": [0.01, 0.93, ...]}` (one score per label-catalog index)
//!
//! A non-empty `defects` array wins; `output` is only consulted otherwise.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::labels::LabelCatalog;

/// Scores must be strictly greater than this to count as a detected defect.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON payload found")]
    NoPayload,

    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("malformed JSON: defect entry {index} is invalid: {reason}")]
    MalformedDefect { index: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDefect {
    #[serde(rename = "type")]
    pub defect_type: String,
    pub confidence: f64,
}

/// Which part of the document the defect list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    Defects,
    Output,
    Empty,
}

#[derive(Debug, Clone)]
pub struct ParsedOutput {
    /// The JSON document exactly as the classifier printed it.
    pub payload: String,
    pub defects: Vec<CanonicalDefect>,
    pub source: ExtractionSource,
}

enum ClassifierOutput {
    Labelled(Vec<CanonicalDefect>),
    Scores(Vec<f64>),
    Empty,
}

impl ClassifierOutput {
    fn from_document(doc: &Value) -> Result<Self, ParseError> {
        if let Some(entries) = doc
            .get("defects")
            .and_then(Value::as_array)
            .filter(|entries| !entries.is_empty())
        {
            let defects = entries
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    CanonicalDefect::deserialize(entry).map_err(|e| ParseError::MalformedDefect {
                        index,
                        reason: e.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::Labelled(defects));
        }

        if let Some(scores) = doc.get("output").and_then(Value::as_array) {
            // Numeric strings count; anything else scores zero
            return Ok(Self::Scores(scores.iter().map(score_of).collect()));
        }

        Ok(Self::Empty)
    }
}

fn score_of(value: &Value) -> f64 {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .unwrap_or(0.0)
}

/// Locate the JSON document within raw classifier output.
pub fn extract_payload(raw: &str) -> Result<&str, ParseError> {
    raw.find('{')
        .map(|start| &raw[start..])
        .ok_or(ParseError::NoPayload)
}

pub fn parse(
    raw: &str,
    catalog: &LabelCatalog,
    threshold: f64,
) -> Result<ParsedOutput, ParseError> {
    let payload = extract_payload(raw)?;
    let doc: Value = serde_json::from_str(payload)?;

    let (defects, source) = match ClassifierOutput::from_document(&doc)? {
        ClassifierOutput::Labelled(defects) => (defects, ExtractionSource::Defects),
        ClassifierOutput::Scores(scores) => {
            let defects = scores
                .into_iter()
                .enumerate()
                .filter(|(_, confidence)| *confidence > threshold)
                .map(|(index, confidence)| CanonicalDefect {
                    defect_type: catalog.label_at(index).to_string(),
                    confidence,
                })
                .collect();
            (defects, ExtractionSource::Output)
        }
        ClassifierOutput::Empty => (Vec::new(), ExtractionSource::Empty),
    };

    Ok(ParsedOutput {
        payload: payload.to_string(),
        defects,
        source,
    })
}
