use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::multipart::{Multipart, MultipartError};
use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use crate::config::UploadConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid file format: Images only")]
    NotAnImage(String),

    #[error("File of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("staging write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A file staged to local disk, pending upload to the media host.
///
/// The file is deleted when the guard drops, so every controller exit path
/// (success, validation failure, store failure) cleans up without having to
/// remember to. `remove` deletes eagerly once the hand-off is done.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    removed: bool,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remove(mut self) {
        self.removed = true;
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("failed to remove staged file {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if !self.removed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!(
                    "failed to remove staged file {} on drop: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// Parsed multipart request: text fields plus at most one staged file.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    pub file: Option<StagedUpload>,
}

impl MultipartForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Walk the multipart stream, staging the part named `file_field` and
/// collecting every other part as text.
pub async fn read_form(
    mut multipart: Multipart,
    file_field: &str,
    config: &UploadConfig,
) -> Result<MultipartForm, UploadError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == file_field {
            // A file input submitted with nothing chosen arrives as an empty
            // part; treat it as absent
            if field.file_name().map_or(true, str::is_empty) {
                continue;
            }
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            form.file = Some(stage_bytes(&bytes, &content_type, config).await?);
        } else {
            form.fields.insert(name, field.text().await?);
        }
    }

    Ok(form)
}

/// Write an incoming file part to the staging directory under a generated
/// unique name. Image MIME types only; size-capped.
pub async fn stage_bytes(
    bytes: &[u8],
    content_type: &str,
    config: &UploadConfig,
) -> Result<StagedUpload, UploadError> {
    if bytes.len() > config.max_bytes {
        return Err(UploadError::TooLarge {
            size: bytes.len(),
            max: config.max_bytes,
        });
    }

    let name = staged_file_name(content_type)?;
    tokio::fs::create_dir_all(&config.dir).await?;
    let path = config.dir.join(name);
    tokio::fs::write(&path, bytes).await?;

    tracing::debug!("staged upload at {}", path.display());
    Ok(StagedUpload { path, removed: false })
}

/// `IMG_{unix_millis}_{random}.{subtype}` from the declared MIME type.
///
/// The subtype becomes part of a filesystem path, so only registered-subtype
/// characters are accepted; anything else (separators included) is rejected
/// as not an image.
fn staged_file_name(content_type: &str) -> Result<String, UploadError> {
    let subtype = content_type
        .strip_prefix("image/")
        .filter(|rest| !rest.is_empty())
        .filter(|rest| {
            rest.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
        })
        .ok_or_else(|| UploadError::NotAnImage(content_type.to_string()))?;

    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    Ok(format!(
        "IMG_{}_{}.{}",
        Utc::now().timestamp_millis(),
        suffix,
        subtype
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(dir: &Path) -> UploadConfig {
        UploadConfig {
            dir: dir.to_path_buf(),
            max_bytes: 64,
        }
    }

    #[test]
    fn staged_names_carry_prefix_and_extension() {
        let name = staged_file_name("image/jpeg").expect("name");
        assert!(name.starts_with("IMG_"));
        assert!(name.ends_with(".jpeg"));
    }

    #[test]
    fn non_image_mime_is_rejected() {
        assert!(matches!(
            staged_file_name("application/pdf"),
            Err(UploadError::NotAnImage(_))
        ));
        assert!(matches!(staged_file_name("image/"), Err(UploadError::NotAnImage(_))));
    }

    #[test]
    fn subtype_with_path_characters_is_rejected() {
        for mime in ["image/x/y", "image/../../etc/passwd", "image/png\0", "image/a b"] {
            assert!(
                matches!(staged_file_name(mime), Err(UploadError::NotAnImage(_))),
                "{mime} should not produce a file name"
            );
        }
        // Registered subtypes legitimately use '+', '-' and '.'
        let name = staged_file_name("image/svg+xml").expect("name");
        assert!(name.ends_with(".svg+xml"));
        assert!(staged_file_name("image/vnd.microsoft.icon").is_ok());
    }

    #[tokio::test]
    async fn oversized_part_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(dir.path());
        let result = stage_bytes(&[0u8; 65], "image/png", &config).await;
        assert!(matches!(result, Err(UploadError::TooLarge { size: 65, max: 64 })));
    }

    #[tokio::test]
    async fn staged_file_lands_on_disk_and_remove_deletes_it() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(dir.path());

        let staged = stage_bytes(b"jpegdata", "image/jpeg", &config).await.expect("stage");
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        staged.remove();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn dropped_guard_cleans_up() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(dir.path());

        let staged = stage_bytes(b"pngdata", "image/png", &config).await.expect("stage");
        let path = staged.path().to_path_buf();
        drop(staged);
        assert!(!path.exists());
    }
}
