//! # cb-storage-local
//!
//! Local filesystem implementation of `MediaStore`.
//! Uploaded CVs land flat in one directory as `<unix-millis>-<sanitized name>`.

use async_trait::async_trait;
use cb_core::models::StoredUpload;
use cb_core::traits::MediaStore;
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs;

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./uploads")
    root_path: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root.into(),
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save_upload(&self, data: Vec<u8>, original_name: &str) -> anyhow::Result<StoredUpload> {
        let file_name = sanitize_file_name(original_name);
        let target_path = self
            .root_path
            .join(format!("{}-{}", Utc::now().timestamp_millis(), file_name));

        fs::create_dir_all(&self.root_path).await?;
        fs::write(&target_path, &data).await?;

        Ok(StoredUpload {
            path: target_path,
            file_name,
        })
    }

    async fn remove_upload(&self, upload: &StoredUpload) -> anyhow::Result<()> {
        if !upload.path.starts_with(&self.root_path) {
            anyhow::bail!("{} is outside the upload root", upload.path.display());
        }
        fs::remove_file(&upload.path).await?;
        Ok(())
    }
}

/// Keeps ASCII letters, digits, `.` and `-`; everything else becomes `_`.
/// Directory components are dropped first so a name can never escape the
/// upload root.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload".to_owned()
    } else {
        cleaned
    }
}
