//! Diesel row structs for the listing, catalog, and user tables.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    ContactDetails, Listing, ListingId, ListingImage, LookupRef, SellerId, SellerProfile,
};

use super::schema::{product_details, product_images, products, users};

/// Queryable row for products.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub sub_category_id: i64,
    pub brand_id: Option<i64>,
    pub condition_id: Option<i64>,
    pub city_id: i64,
    pub district_id: i64,
    pub commune_id: i64,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub discount: Option<f64>,
    pub discount_as_percentage: bool,
    pub is_free_delivery: bool,
    pub detail_id: i64,
    pub user_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Listing {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ListingId::new(row.id),
            name: row.name,
            price: row.price,
            description: row.description,
            sub_category_id: row.sub_category_id,
            brand_id: row.brand_id,
            condition_id: row.condition_id,
            city_id: row.city_id,
            district_id: row.district_id,
            commune_id: row.commune_id,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            discount: row.discount,
            discount_as_percentage: row.discount_as_percentage,
            is_free_delivery: row.is_free_delivery,
            detail_id: row.detail_id,
            owner: SellerId::new(row.user_id),
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Insertable row for products. `created_at` and `id` come from the database.
#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub(crate) struct NewProductRow<'a> {
    pub name: &'a str,
    pub price: f64,
    pub description: &'a str,
    pub sub_category_id: i64,
    pub brand_id: Option<i64>,
    pub condition_id: Option<i64>,
    pub city_id: i64,
    pub district_id: i64,
    pub commune_id: i64,
    pub address: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub discount: Option<f64>,
    pub discount_as_percentage: bool,
    pub is_free_delivery: bool,
    pub detail_id: i64,
    pub user_id: i64,
    pub is_active: bool,
}

/// Queryable row for product images.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = product_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductImageRow {
    pub id: i64,
    pub product_id: i64,
    pub photo: String,
    pub sort_order: i32,
}

impl From<ProductImageRow> for ListingImage {
    fn from(row: ProductImageRow) -> Self {
        Self {
            id: row.id,
            listing_id: ListingId::new(row.product_id),
            photo: row.photo,
            sort_order: row.sort_order,
        }
    }
}

/// Insertable row for product images.
#[derive(Debug, Insertable)]
#[diesel(table_name = product_images)]
pub(crate) struct NewProductImageRow<'a> {
    pub product_id: i64,
    pub photo: &'a str,
    pub sort_order: i32,
}

/// Queryable row for contact records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = product_details)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductDetailRow {
    pub id: i64,
    pub contact_name: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub phone_number_2: Option<String>,
    pub phone_number_3: Option<String>,
}

impl From<ProductDetailRow> for ContactDetails {
    fn from(row: ProductDetailRow) -> Self {
        Self {
            contact_name: row.contact_name,
            email: row.email,
            phone_number: row.phone_number,
            phone_number_2: row.phone_number_2,
            phone_number_3: row.phone_number_3,
        }
    }
}

/// Insertable row for contact records.
#[derive(Debug, Insertable)]
#[diesel(table_name = product_details)]
pub(crate) struct NewProductDetailRow<'a> {
    pub contact_name: &'a str,
    pub email: Option<&'a str>,
    pub phone_number: &'a str,
    pub phone_number_2: Option<&'a str>,
    pub phone_number_3: Option<&'a str>,
}

/// Queryable row for seller accounts.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub display_name: String,
    pub phone_number: String,
    pub phone_number_2: Option<String>,
    pub phone_number_3: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for SellerProfile {
    fn from(row: UserRow) -> Self {
        Self {
            id: SellerId::new(row.id),
            display_name: row.display_name,
            phone_number: row.phone_number,
        }
    }
}

/// Insertable row for seller accounts.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub display_name: &'a str,
    pub phone_number: &'a str,
    pub password_hash: &'a str,
}

/// Generic `(id, name)` row used by every lookup table.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct LookupRow {
    pub id: i64,
    pub name: String,
}

impl From<LookupRow> for LookupRef {
    fn from(row: LookupRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}
