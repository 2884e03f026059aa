use std::path::{Path, PathBuf};

/// Uploaded images on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `file_name` looks like an image, judged by its extension.
    pub fn is_image(file_name: &str) -> bool {
        mime_guess::from_path(file_name)
            .first()
            .map(|m| m.type_() == mime::IMAGE)
            .unwrap_or(false)
    }

    /// Store `data` under a fresh `<uuid>.<ext>` name and return its path.
    pub async fn save(&self, file_name: &str, data: &[u8]) -> std::io::Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;

        let ext = Path::new(file_name)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("jpg")
            .to_ascii_lowercase();
        let path = self.root.join(format!("{}.{}", uuid::Uuid::new_v4(), ext));
        tokio::fs::write(&path, data).await?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "Stored upload");
        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_image_names() {
        assert!(LocalFileStore::is_image("bean.JPG"));
        assert!(LocalFileStore::is_image("bean.png"));
        assert!(!LocalFileStore::is_image("notes.txt"));
        assert!(!LocalFileStore::is_image("no_extension"));
    }

    #[tokio::test]
    async fn save_writes_under_root_with_original_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().join("uploads"));

        let path = store.save("Bean.PNG", b"\x89PNG").await.unwrap();

        assert!(path.ends_with(".png"));
        assert!(Path::new(&path).starts_with(dir.path().join("uploads")));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"\x89PNG");
    }
}
