//! Local-disk storage for product images.
//!
//! Files live in `<root>/products/<uuid>.<ext>` and are referenced from the
//! database by the relative URL `/uploads/products/<uuid>.<ext>`.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use tokio::fs;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const URL_PREFIX: &str = "/uploads/products/";

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// File received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct StoredImage {
    pub url: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    fn products_dir(&self) -> PathBuf {
        self.root.join("products")
    }

    /// Checks size and type, returning the extension the file will be stored with.
    pub fn check(&self, file: &UploadedFile) -> AppResult<&'static str> {
        if file.bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".into()));
        }
        if file.bytes.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "Uploaded file exceeds {} bytes",
                self.max_bytes
            )));
        }
        extension_for(file)
            .ok_or_else(|| AppError::BadRequest("Only jpg, png, gif and webp images are accepted".into()))
    }

    pub async fn save(&self, file: &UploadedFile) -> AppResult<StoredImage> {
        let ext = self.check(file)?;
        let dir = self.products_dir();
        fs::create_dir_all(&dir).await?;

        let name = format!("{}.{ext}", Uuid::new_v4());
        let path = dir.join(&name);
        fs::write(&path, &file.bytes).await?;
        tracing::debug!(path = %path.display(), bytes = file.bytes.len(), "image stored");

        Ok(StoredImage {
            url: format!("{URL_PREFIX}{name}"),
            path,
        })
    }

    /// Disk path behind a stored URL; `None` for URLs this store never issued.
    pub fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(URL_PREFIX)?;
        let valid = !name.is_empty()
            && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
            && name != ".."
            && name != ".";
        valid.then(|| self.products_dir().join(name))
    }

    /// Best-effort removal: a missing file is not an error, other failures are logged.
    pub async fn remove(&self, url: &str) {
        let Some(path) = self.path_for_url(url) else {
            tracing::warn!(%url, "refusing to remove file outside the upload directory");
            return;
        };
        match fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "image removed"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "image removal failed"),
        }
    }
}

fn extension_for(file: &UploadedFile) -> Option<&'static str> {
    let from_mime = match file.content_type.as_deref() {
        Some("image/jpeg") | Some("image/jpg") => Some("jpg"),
        Some("image/png") => Some("png"),
        Some("image/gif") => Some("gif"),
        Some("image/webp") => Some("webp"),
        _ => None,
    };
    from_mime.or_else(|| {
        let ext = Path::new(file.file_name.as_deref()?)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        ALLOWED_EXTENSIONS.into_iter().find(|allowed| *allowed == ext)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, mime: Option<&str>, bytes: &'static [u8]) -> UploadedFile {
        UploadedFile {
            file_name: Some(name.to_string()),
            content_type: mime.map(str::to_string),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn accepts_images_by_mime_or_extension() {
        let store = ImageStore::new("unused", 1024);
        assert_eq!(store.check(&upload("a.bin", Some("image/png"), b"x")).unwrap(), "png");
        assert_eq!(store.check(&upload("photo.JPEG", None, b"x")).unwrap(), "jpeg");
        assert!(store.check(&upload("notes.txt", Some("text/plain"), b"x")).is_err());
    }

    #[test]
    fn rejects_empty_and_oversized_files() {
        let store = ImageStore::new("unused", 4);
        assert!(store.check(&upload("a.png", None, b"")).is_err());
        assert!(store.check(&upload("a.png", None, b"12345")).is_err());
    }

    #[test]
    fn only_resolves_urls_it_issued() {
        let store = ImageStore::new("/srv/uploads", 1024);
        assert_eq!(
            store.path_for_url("/uploads/products/abc.png"),
            Some(PathBuf::from("/srv/uploads/products/abc.png"))
        );
        assert_eq!(store.path_for_url("/uploads/products/../secret"), None);
        assert_eq!(store.path_for_url("/etc/passwd"), None);
        assert_eq!(store.path_for_url("/uploads/products/"), None);
    }

    #[tokio::test]
    async fn save_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), 1024);
        let stored = store.save(&upload("a.png", Some("image/png"), b"png")).await.unwrap();
        assert!(stored.url.starts_with(URL_PREFIX));
        assert!(stored.path.exists());

        store.remove(&stored.url).await;
        assert!(!stored.path.exists());
        // second removal is a no-op
        store.remove(&stored.url).await;
    }
}
