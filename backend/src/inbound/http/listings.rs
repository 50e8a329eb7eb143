//! Listing endpoints.
//!
//! ```text
//! GET    /api/products/public?mainCategoryId&subCategoryId&brandId
//! GET    /api/products/public/{id}
//! GET    /api/products/mine
//! POST   /api/products            (multipart, field `photos`)
//! DELETE /api/products/{id}
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    ContactDetails, ListingCard, ListingDetail, ListingFilter, ListingId, ListingImage, LookupRef,
    SellerProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorResponseSchema;
use crate::inbound::http::multipart::collect_submission;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query parameters of the public listing endpoint. Filters cascade; the
/// most specific one wins.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PublicListingsQuery {
    /// Main-category filter (least specific).
    pub main_category_id: Option<i64>,
    /// Subcategory filter.
    pub sub_category_id: Option<i64>,
    /// Brand filter (most specific).
    pub brand_id: Option<i64>,
}

impl From<PublicListingsQuery> for ListingFilter {
    fn from(query: PublicListingsQuery) -> Self {
        Self {
            main_category_id: query.main_category_id,
            sub_category_id: query.sub_category_id,
            brand_id: query.brand_id,
        }
    }
}

/// One listing card in a summary response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingCardResponse {
    /// Listing identifier.
    pub id: i64,
    /// Advertised title.
    pub name: String,
    /// Asking price.
    pub price: f64,
    /// Free-form description.
    pub description: String,
    /// Subcategory reference.
    pub sub_category_id: i64,
    /// Brand reference, when supplied.
    pub brand_id: Option<i64>,
    /// Condition reference, when supplied.
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
    /// Whether the listing is publicly visible.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Representative image filename, or null without images.
    pub image_url: Option<String>,
}

impl From<ListingCard> for ListingCardResponse {
    fn from(card: ListingCard) -> Self {
        let ListingCard { listing, image_url } = card;
        Self {
            id: listing.id.get(),
            name: listing.name,
            price: listing.price,
            description: listing.description,
            sub_category_id: listing.sub_category_id,
            brand_id: listing.brand_id,
            condition_id: listing.condition_id,
            city_id: listing.city_id,
            district_id: listing.district_id,
            commune_id: listing.commune_id,
            address: listing.address,
            latitude: listing.latitude,
            longitude: listing.longitude,
            discount: listing.discount,
            discount_as_percentage: listing.discount_as_percentage,
            is_free_delivery: listing.is_free_delivery,
            is_active: listing.is_active,
            created_at: listing.created_at,
            image_url,
        }
    }
}

/// A named lookup reference in a detail response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    /// Lookup row identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
}

impl From<LookupRef> for LookupResponse {
    fn from(lookup: LookupRef) -> Self {
        Self {
            id: lookup.id,
            name: lookup.name,
        }
    }
}

/// Contact details nested in a detail response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetailsResponse {
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

impl From<ContactDetails> for ContactDetailsResponse {
    fn from(contact: ContactDetails) -> Self {
        Self {
            contact_name: contact.contact_name,
            email: contact.email,
            phone_number: contact.phone_number,
            phone_number_2: contact.phone_number_2,
            phone_number_3: contact.phone_number_3,
        }
    }
}

/// Seller summary nested in a detail response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerResponse {
    /// Seller identifier.
    pub id: i64,
    /// Display name.
    pub display_name: String,
}

impl From<SellerProfile> for SellerResponse {
    fn from(seller: SellerProfile) -> Self {
        Self {
            id: seller.id.get(),
            display_name: seller.display_name,
        }
    }
}

/// One image row in a detail response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingImageResponse {
    /// Image row identifier.
    pub id: i64,
    /// Stored filename under the upload directory.
    pub photo: String,
    /// 1-based upload position.
    pub sort_order: i32,
}

impl From<ListingImage> for ListingImageResponse {
    fn from(image: ListingImage) -> Self {
        Self {
            id: image.id,
            photo: image.photo,
            sort_order: image.sort_order,
        }
    }
}

/// The joined detail response. Absent references serialise as null.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetailResponse {
    /// Listing identifier.
    pub id: i64,
    /// Advertised title.
    pub name: String,
    /// Asking price.
    pub price: f64,
    /// Free-form description.
    pub description: String,
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
    /// Whether the listing is publicly visible.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Brand, when present.
    pub brand: Option<LookupResponse>,
    /// Subcategory, when present.
    pub sub_category: Option<LookupResponse>,
    /// Main category (via the subcategory), when present.
    pub main_category: Option<LookupResponse>,
    /// Condition, when present.
    pub condition: Option<LookupResponse>,
    /// City, when present.
    pub city: Option<LookupResponse>,
    /// District, when present.
    pub district: Option<LookupResponse>,
    /// Commune, when present.
    pub commune: Option<LookupResponse>,
    /// Contact details, when the record exists.
    pub contact_details: Option<ContactDetailsResponse>,
    /// Seller summary, when the account exists.
    pub seller: Option<SellerResponse>,
    /// Images ordered by sort order.
    pub images: Vec<ListingImageResponse>,
}

impl From<ListingDetail> for ListingDetailResponse {
    fn from(detail: ListingDetail) -> Self {
        let ListingDetail {
            listing,
            brand,
            sub_category,
            main_category,
            condition,
            city,
            district,
            commune,
            contact_details,
            seller,
            images,
        } = detail;
        Self {
            id: listing.id.get(),
            name: listing.name,
            price: listing.price,
            description: listing.description,
            address: listing.address,
            latitude: listing.latitude,
            longitude: listing.longitude,
            discount: listing.discount,
            discount_as_percentage: listing.discount_as_percentage,
            is_free_delivery: listing.is_free_delivery,
            is_active: listing.is_active,
            created_at: listing.created_at,
            brand: brand.map(Into::into),
            sub_category: sub_category.map(Into::into),
            main_category: main_category.map(Into::into),
            condition: condition.map(Into::into),
            city: city.map(Into::into),
            district: district.map(Into::into),
            commune: commune.map(Into::into),
            contact_details: contact_details.map(Into::into),
            seller: seller.map(Into::into),
            images: images.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response of a successful listing creation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingCreatedResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Identifier of the new listing.
    pub product_id: i64,
}

/// Response of a successful listing deletion.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingDeletedResponse {
    /// Always true on the success path.
    pub success: bool,
}

fn cards_response(cards: Vec<ListingCard>) -> web::Json<Vec<ListingCardResponse>> {
    web::Json(cards.into_iter().map(Into::into).collect())
}

/// Browse active listings, optionally filtered by category.
#[utoipa::path(
    get,
    path = "/api/products/public",
    params(PublicListingsQuery),
    responses(
        (status = 200, description = "Active listings", body = [ListingCardResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponseSchema)
    ),
    tags = ["products"],
    operation_id = "publicListings",
    security([])
)]
#[get("/public")]
pub async fn public_listings(
    state: web::Data<HttpState>,
    query: web::Query<PublicListingsQuery>,
) -> ApiResult<web::Json<Vec<ListingCardResponse>>> {
    let filter = ListingFilter::from(query.into_inner());
    let cards = state.listings.public_listings(&filter).await?;
    Ok(cards_response(cards))
}

/// Fetch the joined detail view of one listing.
#[utoipa::path(
    get,
    path = "/api/products/public/{id}",
    params(("id" = i64, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Listing detail", body = ListingDetailResponse),
        (status = 404, description = "Listing not found", body = ErrorResponseSchema)
    ),
    tags = ["products"],
    operation_id = "publicListingDetail",
    security([])
)]
#[get("/public/{id}")]
pub async fn public_listing_detail(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ListingDetailResponse>> {
    let detail = state
        .listings
        .listing_detail(ListingId::new(path.into_inner()))
        .await?;
    Ok(web::Json(detail.into()))
}

/// The authenticated caller's own listings, active or not.
#[utoipa::path(
    get,
    path = "/api/products/mine",
    responses(
        (status = 200, description = "Caller's listings", body = [ListingCardResponse]),
        (status = 401, description = "Unauthorised", body = ErrorResponseSchema)
    ),
    tags = ["products"],
    operation_id = "myListings",
    security(("SessionCookie" = []))
)]
#[get("/mine")]
pub async fn my_listings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ListingCardResponse>>> {
    let owner = session.require_user_id()?;
    let cards = state.listings.listings_for_owner(owner).await?;
    Ok(cards_response(cards))
}

/// Create a listing from a multipart form with 1 to 8 `photos` files.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Listing created", body = ListingCreatedResponse),
        (status = 400, description = "Validation failed", body = ErrorResponseSchema),
        (status = 401, description = "Unauthorised", body = ErrorResponseSchema)
    ),
    tags = ["products"],
    operation_id = "createListing",
    security(("SessionCookie" = []))
)]
#[post("")]
pub async fn create_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    // Authentication first, before any of the payload is consumed.
    let owner = session.require_user_id()?;
    let submission = collect_submission(payload).await?;
    let listing_id = state
        .submissions
        .submit(owner, submission.draft, submission.uploads)
        .await?;
    Ok(HttpResponse::Created().json(ListingCreatedResponse {
        success: true,
        product_id: listing_id.get(),
    }))
}

/// Delete the caller's listing. Not reversible.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Listing deleted", body = ListingDeletedResponse),
        (status = 401, description = "Unauthorised", body = ErrorResponseSchema),
        (status = 403, description = "Caller does not own the listing", body = ErrorResponseSchema),
        (status = 404, description = "Listing not found", body = ErrorResponseSchema)
    ),
    tags = ["products"],
    operation_id = "deleteListing",
    security(("SessionCookie" = []))
)]
#[delete("/{id}")]
pub async fn delete_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ListingDeletedResponse>> {
    let caller = session.require_user_id()?;
    state
        .deletions
        .delete(caller, ListingId::new(path.into_inner()))
        .await?;
    Ok(web::Json(ListingDeletedResponse { success: true }))
}
