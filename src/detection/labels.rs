use std::path::Path;

/// Placeholder returned for any index the catalog cannot resolve.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Ordered class names for index-based classifier output.
///
/// Loaded once at startup and shared read-only; a failed load degrades to an
/// empty catalog rather than stopping the process.
#[derive(Debug, Clone, Default)]
pub struct LabelCatalog {
    labels: Vec<String>,
}

impl LabelCatalog {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// One label per line, in file order. Blank lines keep their slot so
    /// indices stay aligned with the classifier's output vector.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let catalog = Self::from_labels(contents.lines().map(str::trim));
                tracing::info!(
                    path = %path.display(),
                    count = catalog.len(),
                    "Loaded defect label catalog"
                );
                catalog
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load label catalog, index-based results will map to \"unknown\""
                );
                Self::default()
            }
        }
    }

    pub fn label_at(&self, index: usize) -> &str {
        self.labels
            .get(index)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn out_of_range_index_is_unknown() {
        let catalog = LabelCatalog::from_labels(["broken", "insect_damage"]);
        assert_eq!(catalog.label_at(0), "broken");
        assert_eq!(catalog.label_at(1), "insect_damage");
        assert_eq!(catalog.label_at(2), UNKNOWN_LABEL);
    }

    #[test]
    fn missing_file_degrades_to_empty_catalog() {
        let catalog = LabelCatalog::load("/nonexistent/labels.txt");
        assert!(catalog.is_empty());
        assert_eq!(catalog.label_at(0), UNKNOWN_LABEL);
    }

    #[test]
    fn load_keeps_file_order_and_trims_line_endings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "black\r\nsour\n\nfungus\n").unwrap();

        let catalog = LabelCatalog::load(file.path());
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.label_at(0), "black");
        assert_eq!(catalog.label_at(1), "sour");
        assert_eq!(catalog.label_at(2), "");
        assert_eq!(catalog.label_at(3), "fungus");
    }
}
