//! Listing deletion: owner verification, best-effort file cleanup, and
//! removal of the listing's rows.

use std::sync::Arc;

use tracing::warn;

use crate::domain::Error;
use crate::domain::listing::{ListingId, SellerId};
use crate::domain::ports::{ImageStore, ListingPersistenceError, ListingRepository};

/// Write-side service removing listings. Not reversible.
#[derive(Clone)]
pub struct ListingDeletionService {
    listings: Arc<dyn ListingRepository>,
    images: Arc<dyn ImageStore>,
}

fn map_listing_error(error: ListingPersistenceError) -> Error {
    match error {
        ListingPersistenceError::Connection { message } => Error::service_unavailable(message),
        ListingPersistenceError::Query { message } => Error::internal(message),
    }
}

impl ListingDeletionService {
    /// Create the service over its repository and image store.
    pub fn new(listings: Arc<dyn ListingRepository>, images: Arc<dyn ImageStore>) -> Self {
        Self { listings, images }
    }

    /// Delete the caller's listing.
    ///
    /// Fails with not-found when the listing does not exist and forbidden
    /// when the caller is not its owner; in both cases nothing is touched.
    /// Image file removal is best-effort: failures are logged and the row
    /// deletion proceeds regardless.
    pub async fn delete(&self, caller: SellerId, id: ListingId) -> Result<(), Error> {
        let owner = self
            .listings
            .find_owner(id)
            .await
            .map_err(map_listing_error)?
            .ok_or_else(|| Error::not_found("listing not found"))?;
        if owner != caller {
            return Err(Error::forbidden("only the owner may delete a listing"));
        }

        let filenames = self
            .listings
            .image_files(id)
            .await
            .map_err(map_listing_error)?;
        for filename in &filenames {
            if let Err(error) = self.images.remove(filename).await {
                warn!(
                    listing_id = %id,
                    filename = %filename,
                    error = %error,
                    "failed to remove listing image file"
                );
            }
        }

        self.listings
            .delete_listing(id)
            .await
            .map_err(map_listing_error)
    }
}
