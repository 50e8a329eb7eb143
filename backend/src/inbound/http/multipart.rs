//! Multipart collection for the listing submission endpoint.
//!
//! Streams the `multipart/form-data` payload, gathering text fields into a
//! [`ListingDraft`] and `photos` files into [`ImageUpload`]s. File-level
//! constraints are enforced here, before the domain service runs:
//! at most [`MAX_LISTING_IMAGES`] files, 2 MiB each, image MIME type and
//! extension only.

use std::collections::HashMap;

use actix_multipart::Multipart;
use futures_util::StreamExt as _;
use serde_json::json;

use crate::domain::{Error, FieldViolation, ImageUpload, ListingDraft, MAX_LISTING_IMAGES};

/// Per-file upload limit: 2 MiB.
pub const MAX_FILE_BYTES: usize = 2 * 1024 * 1024;
/// Upper bound for a single text field; listing descriptions are well below.
const MAX_TEXT_BYTES: usize = 64 * 1024;
/// The multipart field name carrying image files.
pub const PHOTOS_FIELD: &str = "photos";

/// File extensions accepted for listing photos, matched case-insensitively.
const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

/// Everything the submission endpoint extracts from one multipart request.
#[derive(Debug, Default)]
pub struct CollectedSubmission {
    /// Text fields, leniently parsed.
    pub draft: ListingDraft,
    /// Accepted image files in upload order.
    pub uploads: Vec<ImageUpload>,
}

fn upload_error(code: &'static str, message: impl Into<String>) -> Error {
    let violation = FieldViolation::new(PHOTOS_FIELD, code, message);
    Error::invalid_request("listing validation failed")
        .with_details(json!({ "errors": [violation.to_json()] }))
}

fn malformed(error: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("malformed multipart payload: {error}"))
}

/// Lowercased extension of the uploaded filename, without the dot.
fn extension_of(filename: &str) -> Option<String> {
    let (stem, extension) = filename.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

fn accepted_extension(filename: &str) -> Option<String> {
    extension_of(filename).filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

fn parse_text(fields: &HashMap<String, String>, name: &str) -> Option<String> {
    fields
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

/// Unparseable numbers collapse to `None` so validation reports the same
/// stable per-field message as an absent field.
fn parse_i64(fields: &HashMap<String, String>, name: &str) -> Option<i64> {
    fields.get(name).and_then(|value| value.trim().parse().ok())
}

fn parse_f64(fields: &HashMap<String, String>, name: &str) -> Option<f64> {
    fields.get(name).and_then(|value| value.trim().parse().ok())
}

fn parse_flag(fields: &HashMap<String, String>, name: &str) -> bool {
    fields
        .get(name)
        .is_some_and(|value| matches!(value.trim(), "true" | "1" | "on"))
}

fn draft_from_fields(fields: &HashMap<String, String>) -> ListingDraft {
    ListingDraft {
        name: parse_text(fields, "name"),
        price: parse_f64(fields, "price"),
        description: parse_text(fields, "description"),
        sub_category_id: parse_i64(fields, "productSubCategoryId"),
        brand_id: parse_i64(fields, "productBrandId"),
        condition_id: parse_i64(fields, "conditionId"),
        city_id: parse_i64(fields, "cityId"),
        district_id: parse_i64(fields, "districtId"),
        commune_id: parse_i64(fields, "communeId"),
        address: parse_text(fields, "address"),
        latitude: parse_f64(fields, "latitude"),
        longitude: parse_f64(fields, "longitude"),
        discount: parse_f64(fields, "discount"),
        discount_as_percentage: fields
            .get("discountType")
            .is_some_and(|value| value.trim() == "percent"),
        is_free_delivery: parse_flag(fields, "freeDelivery"),
        contact_name: parse_text(fields, "contactName"),
        contact_email: parse_text(fields, "contactEmail"),
        contact_phone: parse_text(fields, "contactPhone"),
        contact_phone_2: parse_text(fields, "contactPhone2"),
        contact_phone_3: parse_text(fields, "contactPhone3"),
    }
}

/// Drain the multipart stream into text fields and accepted image uploads.
pub async fn collect_submission(mut payload: Multipart) -> Result<CollectedSubmission, Error> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut uploads: Vec<ImageUpload> = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(malformed)?;
        let (name, filename) = {
            let disposition = field.content_disposition();
            (
                disposition.get_name().unwrap_or_default().to_owned(),
                disposition.get_filename().map(ToOwned::to_owned),
            )
        };

        if let Some(filename) = filename {
            if name != PHOTOS_FIELD {
                return Err(upload_error(
                    "unexpected_file",
                    format!("Unexpected file field: {name}."),
                ));
            }
            if uploads.len() == MAX_LISTING_IMAGES {
                return Err(upload_error(
                    "too_many",
                    format!("No more than {MAX_LISTING_IMAGES} images are allowed."),
                ));
            }
            let is_image_mime = field
                .content_type()
                .is_some_and(|mime| mime.type_().as_str() == "image");
            let extension = accepted_extension(&filename);
            let Some(extension) = extension.filter(|_| is_image_mime) else {
                return Err(upload_error("not_an_image", "Images only."));
            };

            let mut content = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(malformed)?;
                if content.len() + chunk.len() > MAX_FILE_BYTES {
                    return Err(upload_error(
                        "too_large",
                        "Each image must be at most 2 MiB.",
                    ));
                }
                content.extend_from_slice(&chunk);
            }
            uploads.push(ImageUpload {
                extension: format!(".{extension}"),
                content,
            });
        } else {
            let mut value = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(malformed)?;
                if value.len() + chunk.len() > MAX_TEXT_BYTES {
                    return Err(Error::invalid_request(format!(
                        "form field too large: {name}"
                    )));
                }
                value.extend_from_slice(&chunk);
            }
            let value = String::from_utf8(value)
                .map_err(|_| Error::invalid_request(format!("form field not UTF-8: {name}")))?;
            fields.insert(name, value);
        }
    }

    Ok(CollectedSubmission {
        draft: draft_from_fields(&fields),
        uploads,
    })
}
