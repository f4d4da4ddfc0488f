use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::error::Result;

/// A file part taken from a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Lower-cased extension of the client-supplied file name.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

/// Multipart body collected into text fields and files.
///
/// File inputs left empty by the browser (no name, no bytes) are dropped so
/// that "no new file" reads the same as an absent field.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = FormData::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if let Some(file_name) = field.file_name().map(str::to_string) {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.files.insert(
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    },
                );
            } else {
                let value = field.text().await?;
                form.fields.entry(name).or_default().push(value);
            }
        }
        Ok(form)
    }

    /// First value of a text field, trimmed.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(|v| v.trim())
    }

    /// Trimmed value, empty string when absent.
    pub fn text_or_default(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_string()
    }

    /// HTML checkbox semantics: present means on.
    pub fn checkbox(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    #[cfg(test)]
    pub fn with_fields(pairs: &[(&str, &str)]) -> Self {
        let mut form = FormData::default();
        for (name, value) in pairs {
            form.fields
                .entry(name.to_string())
                .or_default()
                .push(value.to_string());
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed_and_checkbox_is_presence() {
        let form = FormData::with_fields(&[("title", "  Cleanup "), ("maintenance_mode", "on")]);
        assert_eq!(form.text("title"), Some("Cleanup"));
        assert!(form.checkbox("maintenance_mode"));
        assert!(!form.checkbox("send_welcome_email"));
        assert_eq!(form.text_or_default("missing"), "");
    }

    #[test]
    fn repeated_field_reads_its_first_value() {
        let form = FormData::with_fields(&[("status", " published"), ("status", "ongoing")]);
        assert_eq!(form.text("status"), Some("published"));
        assert_eq!(form.text("nobody"), None);
    }

    #[test]
    fn extension_is_lowercased() {
        let file = UploadedFile {
            file_name: "Scan.PDF".into(),
            content_type: None,
            bytes: Bytes::from_static(b"%PDF"),
        };
        assert_eq!(file.extension().as_deref(), Some("pdf"));
    }
}
