//! PostgreSQL-backed `LoginService` implementation using Diesel and Argon2.
//!
//! Passwords are stored as Argon2 PHC strings (salted, default parameters).
//! Lookup matches the supplied phone number against any of the account's
//! three phone columns; wrong phone and wrong password produce the same
//! unauthorized error so the two cases cannot be distinguished.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::json;
use tracing::debug;

use crate::domain::auth::{LoginCredentials, SellerRegistration};
use crate::domain::listing::{SellerId, SellerProfile};
use crate::domain::ports::LoginService;
use crate::domain::Error;

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const BAD_CREDENTIALS: &str = "invalid phone number or password";

/// Diesel-backed implementation of the `LoginService` port.
#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    /// Create a new login service with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> Error {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            Error::service_unavailable(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> Error {
    debug!(
        error_type = %std::any::type_name_of_val(&error),
        "diesel operation failed"
    );
    Error::internal("database error")
}

/// Hash a password into its Argon2 PHC string form.
fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
}

/// Verify a password against a stored Argon2 PHC string.
fn verify_password(stored_hash: &str, provided: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|err| Error::internal(format!("stored password hash is invalid: {err}")))?;
    match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(Error::internal(format!(
            "password verification failed: {err}"
        ))),
    }
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn register(&self, registration: &SellerRegistration) -> Result<SellerProfile, Error> {
        let password_hash = hash_password(registration.password())?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_user = NewUserRow {
            display_name: registration.display_name(),
            phone_number: registration.phone_number(),
            password_hash: &password_hash,
        };
        let row: Result<UserRow, diesel::result::Error> = diesel::insert_into(users::table)
            .values(&new_user)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await;

        match row {
            Ok(row) => Ok(row.into()),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) => Err(Error::invalid_request("phone number is already registered")
                .with_details(json!({ "field": "phoneNumber", "code": "taken" }))),
            Err(error) => Err(map_diesel_error(error)),
        }
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<SellerProfile, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let phone = credentials.phone_number();
        let row: Option<UserRow> = users::table
            .filter(
                users::phone_number
                    .eq(phone)
                    .or(users::phone_number_2.eq(phone))
                    .or(users::phone_number_3.eq(phone)),
            )
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        };
        if verify_password(&row.password_hash, credentials.password())? {
            Ok(row.into())
        } else {
            Err(Error::unauthorized(BAD_CREDENTIALS))
        }
    }

    async fn profile(&self, id: SellerId) -> Result<Option<SellerProfile>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for password handling and error mapping.
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("correct horse battery").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse battery").expect("verification runs"));
        assert!(!verify_password(&hash, "wrong password").expect("verification runs"));
    }

    #[rstest]
    fn salts_differ_between_hashes() {
        let first = hash_password("same input").expect("hashing should succeed");
        let second = hash_password("same input").expect("hashing should succeed");
        assert_ne!(first, second);
    }

    #[rstest]
    fn garbage_stored_hash_is_an_internal_error() {
        let err = verify_password("not-a-phc-string", "anything")
            .expect_err("invalid hash should be rejected");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    fn pool_errors_surface_as_service_unavailable() {
        let err = map_pool_error(PoolError::checkout("pool exhausted"));
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
