//! Local-disk implementation of the `ImageStore` port.
//!
//! Files land in a flat upload directory under names of the form
//! `<field>-<timestamp><ext>`, e.g. `photos-1712345678901234567.jpg`. The
//! timestamp has nanosecond precision so several files written for one
//! request cannot collide.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::submission::ImageUpload;

/// The multipart field whose name prefixes every stored file.
const FIELD_NAME: &str = "photos";

/// Image store rooted at one upload directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskImageStore {
    root: PathBuf,
    last_stamp: Arc<AtomicI64>,
}

impl DiskImageStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            last_stamp: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<(), ImageStoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| ImageStoreError::io(err.to_string()))
    }

    /// Filenames must stay inside the upload directory.
    fn guard_filename(filename: &str) -> Result<(), ImageStoreError> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(ImageStoreError::invalid_filename(filename));
        }
        Ok(())
    }

    /// Strictly increasing per store instance, so files written for one
    /// request cannot collide even when the clock tick has not advanced.
    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let prev = self.last_stamp.fetch_max(now, Ordering::AcqRel);
        if prev >= now {
            self.last_stamp.fetch_add(1, Ordering::AcqRel) + 1
        } else {
            now
        }
    }

    fn next_filename(&self, extension: &str) -> String {
        let timestamp = self.next_timestamp();
        format!("{FIELD_NAME}-{timestamp}{extension}")
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn save(&self, upload: &ImageUpload) -> Result<String, ImageStoreError> {
        Self::guard_filename(&upload.extension)?;
        let filename = self.next_filename(&upload.extension);
        tokio::fs::write(self.root.join(&filename), &upload.content)
            .await
            .map_err(|err| ImageStoreError::io(err.to_string()))?;
        Ok(filename)
    }

    async fn remove(&self, filename: &str) -> Result<(), ImageStoreError> {
        Self::guard_filename(filename)?;
        tokio::fs::remove_file(self.root.join(filename))
            .await
            .map_err(|err| ImageStoreError::io(err.to_string()))
    }
}
