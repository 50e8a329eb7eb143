//! Listing submission payloads and their validation.
//!
//! Validation collects every violation instead of failing fast so the client
//! can surface all form problems in one round trip.

use serde_json::{Value, json};

use crate::domain::listing::ContactDetails;

/// Maximum number of images accepted per listing.
pub const MAX_LISTING_IMAGES: usize = 8;

/// One uploaded image, already filtered to an accepted type and size by the
/// inbound adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Lowercased file extension including the leading dot, e.g. `.jpg`.
    pub extension: String,
    /// Raw file content.
    pub content: Vec<u8>,
}

/// A stored image file awaiting row insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Filename assigned by the image store.
    pub filename: String,
    /// 1-based upload position.
    pub sort_order: i32,
}

/// Raw listing form fields as collected from the multipart request.
///
/// Every field is optional at this stage; unparseable numeric input is
/// treated the same as an absent field so validation reports a single,
/// stable message per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingDraft {
    /// Advertised title.
    pub name: Option<String>,
    /// Asking price.
    pub price: Option<f64>,
    /// Free-form description.
    pub description: Option<String>,
    /// Subcategory reference.
    pub sub_category_id: Option<i64>,
    /// Optional brand reference.
    pub brand_id: Option<i64>,
    /// Optional condition reference.
    pub condition_id: Option<i64>,
    /// City reference.
    pub city_id: Option<i64>,
    /// District reference.
    pub district_id: Option<i64>,
    /// Commune reference.
    pub commune_id: Option<i64>,
    /// Street address.
    pub address: Option<String>,
    /// Optional map latitude.
    pub latitude: Option<f64>,
    /// Optional map longitude.
    pub longitude: Option<f64>,
    /// Optional discount.
    pub discount: Option<f64>,
    /// Whether the discount is a percentage.
    pub discount_as_percentage: bool,
    /// Whether the seller offers free delivery.
    pub is_free_delivery: bool,
    /// Contact name for the detail record.
    pub contact_name: Option<String>,
    /// Optional contact email.
    pub contact_email: Option<String>,
    /// Primary contact phone number.
    pub contact_phone: Option<String>,
    /// Optional second contact phone number.
    pub contact_phone_2: Option<String>,
    /// Optional third contact phone number.
    pub contact_phone_3: Option<String>,
}

/// A single validation failure, tied to the form field that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Form field name as the client sent it.
    pub field: &'static str,
    /// Stable violation code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl FieldViolation {
    /// Construct a violation for the given field.
    pub fn new(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }

    /// Render the violation as a JSON object for error details.
    pub fn to_json(&self) -> Value {
        json!({
            "field": self.field,
            "code": self.code,
            "message": self.message,
        })
    }
}

/// A listing payload that passed validation, ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedListing {
    /// Advertised title.
    pub name: String,
    /// Asking price, strictly positive and finite.
    pub price: f64,
    /// Free-form description.
    pub description: String,
    /// Subcategory reference.
    pub sub_category_id: i64,
    /// Optional brand reference.
    pub brand_id: Option<i64>,
    /// Optional condition reference.
    pub condition_id: Option<i64>,
    /// City reference.
    pub city_id: i64,
    /// District reference.
    pub district_id: i64,
    /// Commune reference.
    pub commune_id: i64,
    /// Street address.
    pub address: String,
    /// Optional map latitude.
    pub latitude: Option<f64>,
    /// Optional map longitude.
    pub longitude: Option<f64>,
    /// Optional discount.
    pub discount: Option<f64>,
    /// Whether the discount is a percentage.
    pub discount_as_percentage: bool,
    /// Whether the seller offers free delivery.
    pub is_free_delivery: bool,
    /// Contact details for the 1:1 detail record.
    pub contact: ContactDetails,
}

fn require_text(
    value: Option<String>,
    field: &'static str,
    message: &'static str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Some(text),
        _ => {
            violations.push(FieldViolation::new(field, "required", message));
            None
        }
    }
}

fn require_id(
    value: Option<i64>,
    field: &'static str,
    message: &'static str,
    violations: &mut Vec<FieldViolation>,
) -> Option<i64> {
    match value {
        Some(id) => Some(id),
        None => {
            violations.push(FieldViolation::new(field, "required", message));
            None
        }
    }
}

impl ListingDraft {
    /// Validate the draft, collecting every violation.
    ///
    /// Image-count constraints are checked by the submission service, which
    /// is the only place that sees the uploads.
    pub fn validate(self) -> Result<ValidatedListing, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        let name = require_text(self.name, "name", "Name is required.", &mut violations);
        let description = require_text(
            self.description,
            "description",
            "Description is required.",
            &mut violations,
        );
        let address = require_text(
            self.address,
            "address",
            "Address is required.",
            &mut violations,
        );
        let contact_name = require_text(
            self.contact_name,
            "contactName",
            "Contact name is required.",
            &mut violations,
        );
        let contact_phone = require_text(
            self.contact_phone,
            "contactPhone",
            "A contact phone number is required.",
            &mut violations,
        );

        let price = match self.price {
            Some(price) if price.is_finite() && price > 0.0 => Some(price),
            _ => {
                violations.push(FieldViolation::new(
                    "price",
                    "positive_number",
                    "Price must be a positive number.",
                ));
                None
            }
        };

        let sub_category_id = require_id(
            self.sub_category_id,
            "productSubCategoryId",
            "A valid subcategory ID is required.",
            &mut violations,
        );
        let city_id = require_id(
            self.city_id,
            "cityId",
            "A valid City ID is required.",
            &mut violations,
        );
        let district_id = require_id(
            self.district_id,
            "districtId",
            "A valid District ID is required.",
            &mut violations,
        );
        let commune_id = require_id(
            self.commune_id,
            "communeId",
            "A valid Commune ID is required.",
            &mut violations,
        );

        match (
            name,
            description,
            address,
            contact_name,
            contact_phone,
            price,
            sub_category_id,
            city_id,
            district_id,
            commune_id,
        ) {
            (
                Some(name),
                Some(description),
                Some(address),
                Some(contact_name),
                Some(contact_phone),
                Some(price),
                Some(sub_category_id),
                Some(city_id),
                Some(district_id),
                Some(commune_id),
            ) => Ok(ValidatedListing {
                name,
                price,
                description,
                sub_category_id,
                brand_id: self.brand_id,
                condition_id: self.condition_id,
                city_id,
                district_id,
                commune_id,
                address,
                latitude: self.latitude,
                longitude: self.longitude,
                discount: self.discount,
                discount_as_percentage: self.discount_as_percentage,
                is_free_delivery: self.is_free_delivery,
                contact: ContactDetails {
                    contact_name,
                    email: self.contact_email,
                    phone_number: contact_phone,
                    phone_number_2: self.contact_phone_2,
                    phone_number_3: self.contact_phone_3,
                },
            }),
            _ => Err(violations),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for draft validation.
    use super::*;
    use rstest::rstest;

    fn complete_draft() -> ListingDraft {
        ListingDraft {
            name: Some("Road bike".to_owned()),
            price: Some(250.0),
            description: Some("Lightly used".to_owned()),
            sub_category_id: Some(12),
            city_id: Some(1),
            district_id: Some(2),
            commune_id: Some(3),
            address: Some("12 River Road".to_owned()),
            contact_name: Some("Dara".to_owned()),
            contact_phone: Some("012345678".to_owned()),
            ..ListingDraft::default()
        }
    }

    #[rstest]
    fn complete_draft_validates() {
        let listing = complete_draft().validate().expect("draft should validate");
        assert_eq!(listing.name, "Road bike");
        assert_eq!(listing.contact.contact_name, "Dara");
        assert_eq!(listing.contact.phone_number, "012345678");
    }

    #[rstest]
    fn all_violations_are_collected() {
        let violations = ListingDraft::default()
            .validate()
            .expect_err("empty draft should not validate");

        let fields: Vec<&str> = violations.iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec![
                "name",
                "description",
                "address",
                "contactName",
                "contactPhone",
                "price",
                "productSubCategoryId",
                "cityId",
                "districtId",
                "communeId",
            ],
        );
    }

    #[rstest]
    #[case(Some(0.0))]
    #[case(Some(-5.0))]
    #[case(Some(f64::NAN))]
    #[case(Some(f64::INFINITY))]
    #[case(None)]
    fn non_positive_price_is_rejected(#[case] price: Option<f64>) {
        let mut draft = complete_draft();
        draft.price = price;
        let violations = draft.validate().expect_err("price should be rejected");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "price");
        assert_eq!(violations[0].code, "positive_number");
    }

    #[rstest]
    fn whitespace_only_text_counts_as_missing() {
        let mut draft = complete_draft();
        draft.name = Some("   ".to_owned());
        let violations = draft.validate().expect_err("blank name should be rejected");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");
    }

    #[rstest]
    fn violation_json_shape_is_stable() {
        let violation = FieldViolation::new("price", "positive_number", "Price must be positive.");
        let value = violation.to_json();
        assert_eq!(value["field"], "price");
        assert_eq!(value["code"], "positive_number");
    }
}
