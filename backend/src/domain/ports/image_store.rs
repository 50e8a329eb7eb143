//! Port abstraction for image file storage.

use async_trait::async_trait;

use crate::domain::submission::ImageUpload;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// Filesystem operation failed.
        Io { message: String } => "image store I/O failed: {message}",
        /// The filename is not a plain file name under the store root.
        InvalidFilename { message: String } => "invalid image filename: {message}",
    }
}

/// File storage for listing photos.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an uploaded image and return the stored filename.
    async fn save(&self, upload: &ImageUpload) -> Result<String, ImageStoreError>;

    /// Remove a stored image file. Callers decide whether a failure is
    /// fatal; deletion flows log and continue.
    async fn remove(&self, filename: &str) -> Result<(), ImageStoreError>;
}
