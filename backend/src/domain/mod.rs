//! Domain primitives, aggregates, services, and ports.
//!
//! Everything in this module is transport agnostic: inbound adapters map
//! HTTP requests onto these types and outbound adapters implement the
//! [`ports`] traits over PostgreSQL and the local filesystem.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod listing;
pub mod listing_deletion_service;
pub mod listing_query_service;
pub mod listing_submission_service;
pub mod ports;
pub mod submission;

pub use self::auth::{LoginCredentials, LoginValidationError, SellerRegistration};
pub use self::catalog::{CategoryScope, CategorySelection, ListingFilter, MainCategoryNode};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::listing::{
    ContactDetails, Listing, ListingCard, ListingDetail, ListingId, ListingImage, LookupRef,
    SellerId, SellerProfile,
};
pub use self::listing_deletion_service::ListingDeletionService;
pub use self::listing_query_service::ListingQueryService;
pub use self::listing_submission_service::ListingSubmissionService;
pub use self::submission::{
    FieldViolation, ImageUpload, ListingDraft, MAX_LISTING_IMAGES, StoredImage, ValidatedListing,
};

/// Response header carrying the per-request trace identifier.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Convenient result alias for fallible domain operations.
pub type ApiResult<T> = Result<T, Error>;
