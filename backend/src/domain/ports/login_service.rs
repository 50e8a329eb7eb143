//! Port abstraction for authentication and account management.
//!
//! Unlike the persistence ports this trait returns [`Error`] directly: its
//! failures (bad credentials, duplicate phone number) are part of the domain
//! contract rather than adapter plumbing.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::auth::{LoginCredentials, SellerRegistration};
use crate::domain::listing::{SellerId, SellerProfile};

/// Authentication gateway backed by the user store.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Create a new seller account and return its profile.
    ///
    /// Fails with a validation error when the phone number is already
    /// registered.
    async fn register(&self, registration: &SellerRegistration) -> Result<SellerProfile, Error>;

    /// Verify credentials and return the matching profile.
    ///
    /// The phone number is matched against any of the account's phone
    /// columns. Wrong phone and wrong password are indistinguishable to the
    /// caller.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<SellerProfile, Error>;

    /// Fetch a seller profile by id, or `None` when the account is gone.
    async fn profile(&self, id: SellerId) -> Result<Option<SellerProfile>, Error>;
}
