//! Authentication primitives: login credentials and seller registration.
//!
//! Inbound payload parsing stays outside the domain; these constructors
//! validate string inputs before a handler talks to the login port.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use zeroize::Zeroizing;

use crate::domain::submission::FieldViolation;

/// Minimum allowed length for a display name.
pub const DISPLAY_NAME_MIN: usize = 3;
/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 32;
/// Minimum allowed password length.
pub const PASSWORD_MIN: usize = 8;

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

/// Phone numbers: digits with an optional leading `+`, 6 to 20 characters.
fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\+?[0-9]{6,20}$").unwrap_or_else(|err| {
            panic!("phone regex must compile: {err}");
        })
    })
}

/// Validation errors returned by [`LoginCredentials::try_from_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Phone number was missing or blank once trimmed.
    EmptyPhoneNumber,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPhoneNumber => write!(f, "phone number must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the login port.
///
/// ## Invariants
/// - `phone_number` is trimmed and non-empty.
/// - `password` is non-empty but keeps caller-provided whitespace to avoid
///   surprising credential comparisons.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    phone_number: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate and construct credentials from raw request parts.
    pub fn try_from_parts(
        phone_number: &str,
        password: &str,
    ) -> Result<Self, LoginValidationError> {
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            return Err(LoginValidationError::EmptyPhoneNumber);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            phone_number: phone_number.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Phone number the caller wants to log in with.
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// Password to verify against the stored hash.
    pub fn password(&self) -> &str {
        &self.password
    }
}

/// A validated registration payload.
#[derive(Debug, Clone)]
pub struct SellerRegistration {
    display_name: String,
    phone_number: String,
    password: Zeroizing<String>,
}

impl SellerRegistration {
    /// Validate and construct a registration, collecting every violation.
    pub fn try_from_parts(
        display_name: &str,
        phone_number: &str,
        password: &str,
    ) -> Result<Self, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        let display_name = display_name.trim();
        if display_name.len() < DISPLAY_NAME_MIN {
            violations.push(FieldViolation::new(
                "displayName",
                "too_short",
                format!("Display name must be at least {DISPLAY_NAME_MIN} characters."),
            ));
        } else if display_name.len() > DISPLAY_NAME_MAX {
            violations.push(FieldViolation::new(
                "displayName",
                "too_long",
                format!("Display name must be at most {DISPLAY_NAME_MAX} characters."),
            ));
        }

        let phone_number = phone_number.trim();
        if !phone_regex().is_match(phone_number) {
            violations.push(FieldViolation::new(
                "phoneNumber",
                "invalid_phone",
                "A valid phone number is required.",
            ));
        }

        if password.len() < PASSWORD_MIN {
            violations.push(FieldViolation::new(
                "password",
                "too_short",
                format!("Password must be at least {PASSWORD_MIN} characters."),
            ));
        }

        if violations.is_empty() {
            Ok(Self {
                display_name: display_name.to_owned(),
                phone_number: phone_number.to_owned(),
                password: Zeroizing::new(password.to_owned()),
            })
        } else {
            Err(violations)
        }
    }

    /// Display name shown on listings and the profile.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Primary phone number, which doubles as the login identifier.
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// Raw password; hashed by the login adapter before storage.
    pub fn password(&self) -> &str {
        &self.password
    }
}
