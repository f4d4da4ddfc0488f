use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::utils::form::UploadedFile;

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "jpg", "jpeg", "png"];
const PICTURE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Where an upload belongs; decides the folder and the accepted extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    VolunteerPicture,
    NgoLogo,
    VerificationDocument,
    EventImage,
    CertificateTemplate,
}

impl UploadKind {
    pub fn folder(&self) -> &'static str {
        match self {
            UploadKind::VolunteerPicture => "profiles/volunteers",
            UploadKind::NgoLogo => "profiles/ngos",
            UploadKind::VerificationDocument => "ngo_documents",
            UploadKind::EventImage => "events",
            UploadKind::CertificateTemplate => "certificates/templates",
        }
    }

    fn rejection_message(&self) -> &'static str {
        match self {
            UploadKind::VerificationDocument | UploadKind::CertificateTemplate => {
                "Only PDF, Word documents, and images are allowed."
            }
            _ => "Only image files are allowed.",
        }
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::VerificationDocument | UploadKind::CertificateTemplate => {
                DOCUMENT_EXTENSIONS
            }
            UploadKind::VolunteerPicture | UploadKind::NgoLogo | UploadKind::EventImage => {
                PICTURE_EXTENSIONS
            }
        }
    }
}

/// Checks size and extension and returns the normalized extension.
pub fn validate_upload(kind: UploadKind, file: &UploadedFile, max_bytes: usize) -> Result<String> {
    if file.bytes.is_empty() {
        return Err(Error::BadRequest("The submitted file is empty.".into()));
    }
    if file.bytes.len() > max_bytes {
        return Err(Error::BadRequest(format!(
            "File size must be less than {}MB.",
            max_bytes / (1024 * 1024)
        )));
    }
    match file.extension() {
        Some(ext) if kind.allowed_extensions().contains(&ext.as_str()) => Ok(ext),
        _ => Err(Error::BadRequest(kind.rejection_message().to_string())),
    }
}

/// Persists uploaded files and hands back the relative path that is stored
/// on the record and served under `/media/`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn save(&self, kind: UploadKind, file: &UploadedFile) -> Result<String>;
    async fn remove(&self, path: &str) -> Result<()>;
}

pub struct LocalFileStorage {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, kind: UploadKind, file: &UploadedFile) -> Result<String> {
        let ext = validate_upload(kind, file, self.max_bytes)?;

        let dir = self.root.join(kind.folder());
        tokio::fs::create_dir_all(&dir).await?;

        let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        tokio::fs::write(dir.join(&stored_name), &file.bytes)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, folder = kind.folder(), "failed to write upload");
                Error::Io(e)
            })?;

        Ok(format!("{}/{}", kind.folder(), stored_name))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        if path.split('/').any(|part| part == "..") {
            return Err(Error::BadRequest("Invalid media path".into()));
        }
        match tokio::fs::remove_file(self.root.join(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file(name: &str, len: usize) -> UploadedFile {
        UploadedFile {
            file_name: name.into(),
            content_type: None,
            bytes: Bytes::from(vec![1u8; len]),
        }
    }

    #[test]
    fn documents_and_pictures_accept_different_extensions() {
        assert!(validate_upload(UploadKind::VerificationDocument, &file("a.DOCX", 4), 10).is_ok());
        assert!(validate_upload(UploadKind::VerificationDocument, &file("a.gif", 4), 10).is_err());
        assert!(validate_upload(UploadKind::EventImage, &file("a.webp", 4), 10).is_ok());
        assert!(validate_upload(UploadKind::EventImage, &file("a.pdf", 4), 10).is_err());
        assert!(validate_upload(UploadKind::NgoLogo, &file("noext", 4), 10).is_err());
    }

    #[test]
    fn oversized_and_empty_files_are_refused() {
        let max = 1024 * 1024;
        assert!(validate_upload(UploadKind::CertificateTemplate, &file("c.pdf", max), max).is_ok());
        assert!(
            validate_upload(UploadKind::CertificateTemplate, &file("c.pdf", max + 1), max).is_err()
        );
        assert!(validate_upload(UploadKind::CertificateTemplate, &file("c.pdf", 0), max).is_err());
    }

    #[tokio::test]
    async fn local_storage_writes_under_the_kind_folder() {
        let root = std::env::temp_dir().join(format!("voluntree-media-{}", uuid::Uuid::new_v4()));
        let storage = LocalFileStorage::new(&root, 1024);

        let path = storage
            .save(UploadKind::CertificateTemplate, &file("Award.PDF", 8))
            .await
            .unwrap();
        assert!(path.starts_with("certificates/templates/"));
        assert!(path.ends_with(".pdf"));
        assert!(root.join(&path).exists());

        storage.remove(&path).await.unwrap();
        assert!(!root.join(&path).exists());
        storage.remove(&path).await.unwrap();
        assert!(storage.remove("../etc/passwd").await.is_err());

        let _ = std::fs::remove_dir_all(root);
    }
}
