//! Listing entities and aggregates.
//!
//! A listing is a single classified advertisement. The types here mirror the
//! relational model: the product row itself ([`Listing`]), its images
//! ([`ListingImage`]), its 1:1 contact record ([`ContactDetails`]), and the
//! fully joined read model used by the detail page ([`ListingDetail`]).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a listing (product) row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(i64);

impl ListingId {
    /// Wrap a raw database identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user who owns a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellerId(i64);

impl SellerId {
    /// Wrap a raw database identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SellerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product row as stored, without any joined context.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    /// Listing identifier.
    pub id: ListingId,
    /// Advertised title.
    pub name: String,
    /// Asking price. Validated strictly positive on submission.
    pub price: f64,
    /// Free-form description.
    pub description: String,
    /// Subcategory the listing belongs to.
    pub sub_category_id: i64,
    /// Optional brand reference.
    pub brand_id: Option<i64>,
    /// Optional condition reference (new, used, ...).
    pub condition_id: Option<i64>,
    /// City reference.
    pub city_id: i64,
    /// District reference.
    pub district_id: i64,
    /// Commune reference.
    pub commune_id: i64,
    /// Street address supplied by the seller.
    pub address: String,
    /// Optional map latitude.
    pub latitude: Option<f64>,
    /// Optional map longitude.
    pub longitude: Option<f64>,
    /// Optional discount amount or percentage.
    pub discount: Option<f64>,
    /// Whether `discount` is a percentage rather than an absolute amount.
    pub discount_as_percentage: bool,
    /// Whether the seller offers free delivery.
    pub is_free_delivery: bool,
    /// Contact-detail record referenced by this listing.
    pub detail_id: i64,
    /// Owner of the listing.
    pub owner: SellerId,
    /// Inactive listings are excluded from public queries.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// An image row belonging to a listing.
///
/// `sort_order` is the 1-based upload position. The representative image of
/// a listing is the one with the lowest sort order; ties fall back to the
/// first row encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingImage {
    /// Image row identifier.
    pub id: i64,
    /// Listing the image belongs to.
    pub listing_id: ListingId,
    /// Stored filename under the upload directory.
    pub photo: String,
    /// 1-based upload position.
    pub sort_order: i32,
}

/// A listing summary card: the product row plus its representative image.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCard {
    /// The underlying product row.
    pub listing: Listing,
    /// Representative image filename, if the listing has any image.
    pub image_url: Option<String>,
}

/// Contact information stored 1:1 with a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    /// Name shown to interested buyers.
    pub contact_name: String,
    /// Optional contact email.
    pub email: Option<String>,
    /// Primary contact phone number.
    pub phone_number: String,
    /// Optional second phone number.
    pub phone_number_2: Option<String>,
    /// Optional third phone number.
    pub phone_number_3: Option<String>,
}

/// A named lookup-table reference (brand, category, city, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRef {
    /// Lookup row identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// Public view of a seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerProfile {
    /// Seller identifier.
    pub id: SellerId,
    /// Display name.
    pub display_name: String,
    /// Primary phone number, which doubles as the login identifier.
    pub phone_number: String,
}

/// Fully joined read model for the listing detail page.
///
/// Every joined reference is optional: a dangling or absent foreign key
/// yields `None` rather than an error (left-join semantics).
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDetail {
    /// The base product row.
    pub listing: Listing,
    /// Brand, when referenced and present.
    pub brand: Option<LookupRef>,
    /// Subcategory, when present.
    pub sub_category: Option<LookupRef>,
    /// Main category, derived transitively through the subcategory.
    pub main_category: Option<LookupRef>,
    /// Condition, when referenced and present.
    pub condition: Option<LookupRef>,
    /// City, when present.
    pub city: Option<LookupRef>,
    /// District, when present.
    pub district: Option<LookupRef>,
    /// Commune, when present.
    pub commune: Option<LookupRef>,
    /// Contact details, when the referenced record exists.
    pub contact_details: Option<ContactDetails>,
    /// Seller profile, when the owning user exists.
    pub seller: Option<SellerProfile>,
    /// All images for the listing, ordered by sort order.
    pub images: Vec<ListingImage>,
}
