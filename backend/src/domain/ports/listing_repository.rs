//! Port abstraction for listing persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::catalog::CategorySelection;
use crate::domain::listing::{Listing, ListingDetail, ListingId, ListingImage, SellerId};
use crate::domain::submission::{StoredImage, ValidatedListing};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by listing repository adapters.
    pub enum ListingPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "listing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "listing repository query failed: {message}",
    }
}

/// Persistence operations for listings, their images, and contact details.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Fetch active listings constrained by the resolved category selection.
    async fn list_active(
        &self,
        selection: &CategorySelection,
    ) -> Result<Vec<Listing>, ListingPersistenceError>;

    /// Fetch all listings owned by the given seller, active or not.
    async fn list_by_owner(
        &self,
        owner: SellerId,
    ) -> Result<Vec<Listing>, ListingPersistenceError>;

    /// Batch-fetch the images of the given listings, ordered by
    /// `(listing_id, sort_order, id)` so downstream folds are deterministic.
    async fn images_for(
        &self,
        listing_ids: &[ListingId],
    ) -> Result<Vec<ListingImage>, ListingPersistenceError>;

    /// Assemble the joined detail read model, or `None` when the base product
    /// row does not exist. Missing joined references yield `None` sub-objects.
    async fn find_detail(
        &self,
        id: ListingId,
    ) -> Result<Option<ListingDetail>, ListingPersistenceError>;

    /// Create the contact-detail record, the product referencing it, and the
    /// image rows, all inside one transaction. Returns the new listing id.
    async fn create_listing(
        &self,
        owner: SellerId,
        listing: &ValidatedListing,
        images: &[StoredImage],
    ) -> Result<ListingId, ListingPersistenceError>;

    /// Look up the owner of a listing, or `None` when it does not exist.
    async fn find_owner(
        &self,
        id: ListingId,
    ) -> Result<Option<SellerId>, ListingPersistenceError>;

    /// Stored image filenames of a listing, for file cleanup before deletion.
    async fn image_files(&self, id: ListingId) -> Result<Vec<String>, ListingPersistenceError>;

    /// Delete the listing's image rows, the product row, and its
    /// contact-detail record in one transaction.
    async fn delete_listing(&self, id: ListingId) -> Result<(), ListingPersistenceError>;
}
