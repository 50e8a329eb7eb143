//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on domain services and ports, and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{CatalogRepository, ImageStore, ListingRepository, LoginService};
use crate::domain::{ListingDeletionService, ListingQueryService, ListingSubmissionService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Read-side listing and catalog queries.
    pub listings: Arc<ListingQueryService>,
    /// Listing creation.
    pub submissions: Arc<ListingSubmissionService>,
    /// Listing removal.
    pub deletions: Arc<ListingDeletionService>,
    /// Authentication and account management.
    pub auth: Arc<dyn LoginService>,
}

impl HttpState {
    /// Wire the domain services over the given port implementations.
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        catalog: Arc<dyn CatalogRepository>,
        images: Arc<dyn ImageStore>,
        auth: Arc<dyn LoginService>,
    ) -> Self {
        Self {
            listings: Arc::new(ListingQueryService::new(listings.clone(), catalog)),
            submissions: Arc::new(ListingSubmissionService::new(
                listings.clone(),
                images.clone(),
            )),
            deletions: Arc::new(ListingDeletionService::new(listings, images)),
            auth,
        }
    }
}
