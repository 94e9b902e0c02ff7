use anyhow::{Result, bail};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use farewell_types::media::{MediaKind, UploadedFile};

/// Manages uploaded images on disk.
///
/// Each file is stored at `{root}/{kind}/{uuid}.{ext}`; the database only
/// keeps the relative `{kind}/{uuid}.{ext}` part.
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub async fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        info!("Media directory: {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a stored relative path. Rejects anything that
    /// would escape the media root.
    pub fn file_path(&self, relative: &str) -> Result<PathBuf> {
        let rel = Path::new(relative);
        if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
            bail!("Refusing media path outside the media root: {}", relative);
        }
        Ok(self.root.join(rel))
    }

    /// Write an upload under its kind's folder and return the relative path.
    pub async fn save(&self, kind: MediaKind, file: &UploadedFile) -> Result<String> {
        let dir = self.root.join(kind.dir());
        fs::create_dir_all(&dir).await?;

        let name = format!("{}.{}", Uuid::new_v4(), file.extension());
        let relative = format!("{}/{}", kind.dir(), name);

        let mut out = fs::File::create(dir.join(&name)).await?;
        out.write_all(&file.bytes).await?;
        out.flush().await?;

        debug!("Stored {} ({} bytes) as {}", file.file_name, file.bytes.len(), relative);
        Ok(relative)
    }

    /// Save several uploads. If any write fails the ones already written
    /// are removed again.
    pub async fn save_all(&self, kind: MediaKind, files: &[UploadedFile]) -> Result<Vec<String>> {
        let mut saved = Vec::with_capacity(files.len());
        for file in files {
            match self.save(kind, file).await {
                Ok(path) => saved.push(path),
                Err(e) => {
                    self.delete_all(&saved).await;
                    return Err(e);
                }
            }
        }
        Ok(saved)
    }

    /// Delete a stored file. A file that is already gone is not an error.
    pub async fn delete(&self, relative: &str) -> Result<()> {
        let path = self.file_path(relative)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted media {}", relative);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Media {} already gone", relative);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort cleanup after rows were removed; failures are logged.
    pub async fn delete_all(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.delete(path).await {
                warn!("Failed to delete media {}: {}", path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> UploadedFile {
        UploadedFile::new(name, Some("image/png"), b"\x89PNG\r\n".to_vec())
    }

    #[tokio::test]
    async fn save_places_file_under_kind_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf()).await.unwrap();

        let rel = store.save(MediaKind::EventCover, &png("cover.png")).await.unwrap();
        assert!(rel.starts_with("event_covers/"));
        assert!(rel.ends_with(".png"));

        let on_disk = tokio::fs::read(store.file_path(&rel).unwrap()).await.unwrap();
        assert_eq!(on_disk, b"\x89PNG\r\n");

        store.delete(&rel).await.unwrap();
        assert!(!store.file_path(&rel).unwrap().exists());
        // second delete is a no-op
        store.delete(&rel).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_paths_escaping_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf()).await.unwrap();
        assert!(store.file_path("../etc/passwd").is_err());
        assert!(store.file_path("/etc/passwd").is_err());
        assert!(store.file_path("awards/ok.png").is_ok());
    }
}
