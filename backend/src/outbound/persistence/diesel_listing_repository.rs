//! PostgreSQL-backed `ListingRepository` implementation using Diesel.
//!
//! Listing creation and deletion run inside transactions so the detail
//! record, product row, and image rows commit or roll back together. Detail
//! assembly reads every joined table in one transaction so the SELECTs
//! observe a consistent snapshot.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use tracing::debug;

use crate::domain::catalog::CategorySelection;
use crate::domain::listing::{
    Listing, ListingDetail, ListingId, ListingImage, LookupRef, SellerId, SellerProfile,
};
use crate::domain::ports::{ListingPersistenceError, ListingRepository};
use crate::domain::submission::{StoredImage, ValidatedListing};

use super::models::{
    LookupRow, NewProductDetailRow, NewProductImageRow, NewProductRow, ProductDetailRow,
    ProductImageRow, ProductRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    brands, cities, communes, conditions, districts, main_categories, product_details,
    product_images, products, sub_categories, users,
};

/// Diesel-backed implementation of the `ListingRepository` port.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to the port error type.
fn map_pool_error(error: PoolError) -> ListingPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ListingPersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to the port error type.
fn map_diesel_error(error: diesel::result::Error) -> ListingPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => ListingPersistenceError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ListingPersistenceError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => ListingPersistenceError::query("database error"),
        _ => ListingPersistenceError::query("database error"),
    }
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn list_active(
        &self,
        selection: &CategorySelection,
    ) -> Result<Vec<Listing>, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = products::table
            .select(ProductRow::as_select())
            .filter(products::is_active.eq(true))
            .into_boxed();
        query = match selection {
            CategorySelection::Brand(brand_id) => query.filter(products::brand_id.eq(*brand_id)),
            CategorySelection::SubCategory(sub_category_id) => {
                query.filter(products::sub_category_id.eq(*sub_category_id))
            }
            CategorySelection::SubCategoryIn(sub_category_ids) => {
                query.filter(products::sub_category_id.eq_any(sub_category_ids.clone()))
            }
            CategorySelection::All => query,
        };

        let rows: Vec<ProductRow> = query
            .order(products::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_owner(
        &self,
        owner: SellerId,
    ) -> Result<Vec<Listing>, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProductRow> = products::table
            .select(ProductRow::as_select())
            .filter(products::user_id.eq(owner.get()))
            .order(products::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn images_for(
        &self,
        listing_ids: &[ListingId],
    ) -> Result<Vec<ListingImage>, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let ids: Vec<i64> = listing_ids.iter().map(|id| id.get()).collect();
        let rows: Vec<ProductImageRow> = product_images::table
            .select(ProductImageRow::as_select())
            .filter(product_images::product_id.eq_any(ids))
            .order((
                product_images::product_id.asc(),
                product_images::sort_order.asc(),
                product_images::id.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_detail(
        &self,
        id: ListingId,
    ) -> Result<Option<ListingDetail>, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let product: Option<ProductRow> = products::table
                    .find(id.get())
                    .select(ProductRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;
                let Some(product) = product else {
                    return Ok(None);
                };

                let brand: Option<LookupRow> = match product.brand_id {
                    Some(brand_id) => brands::table
                        .find(brand_id)
                        .select((brands::id, brands::name))
                        .first(conn)
                        .await
                        .optional()?,
                    None => None,
                };
                let condition: Option<LookupRow> = match product.condition_id {
                    Some(condition_id) => conditions::table
                        .find(condition_id)
                        .select((conditions::id, conditions::name))
                        .first(conn)
                        .await
                        .optional()?,
                    None => None,
                };

                let sub_category: Option<(i64, i64, String)> = sub_categories::table
                    .find(product.sub_category_id)
                    .select((
                        sub_categories::id,
                        sub_categories::main_category_id,
                        sub_categories::name,
                    ))
                    .first(conn)
                    .await
                    .optional()?;
                let main_category: Option<LookupRow> = match &sub_category {
                    Some((_, main_category_id, _)) => main_categories::table
                        .find(*main_category_id)
                        .select((main_categories::id, main_categories::name))
                        .first(conn)
                        .await
                        .optional()?,
                    None => None,
                };

                let city: Option<LookupRow> = cities::table
                    .find(product.city_id)
                    .select((cities::id, cities::name))
                    .first(conn)
                    .await
                    .optional()?;
                let district: Option<LookupRow> = districts::table
                    .find(product.district_id)
                    .select((districts::id, districts::name))
                    .first(conn)
                    .await
                    .optional()?;
                let commune: Option<LookupRow> = communes::table
                    .find(product.commune_id)
                    .select((communes::id, communes::name))
                    .first(conn)
                    .await
                    .optional()?;

                let contact: Option<ProductDetailRow> = product_details::table
                    .find(product.detail_id)
                    .select(ProductDetailRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;

                let seller: Option<(i64, String, String)> = users::table
                    .find(product.user_id)
                    .select((users::id, users::display_name, users::phone_number))
                    .first(conn)
                    .await
                    .optional()?;

                let images: Vec<ProductImageRow> = product_images::table
                    .select(ProductImageRow::as_select())
                    .filter(product_images::product_id.eq(product.id))
                    .order((product_images::sort_order.asc(), product_images::id.asc()))
                    .load(conn)
                    .await?;

                Ok(Some(ListingDetail {
                    listing: product.into(),
                    brand: brand.map(Into::into),
                    sub_category: sub_category.as_ref().map(|(id, _, name)| LookupRef {
                        id: *id,
                        name: name.clone(),
                    }),
                    main_category: main_category.map(Into::into),
                    condition: condition.map(Into::into),
                    city: city.map(Into::into),
                    district: district.map(Into::into),
                    commune: commune.map(Into::into),
                    contact_details: contact.map(Into::into),
                    seller: seller.map(|(id, display_name, phone_number)| SellerProfile {
                        id: SellerId::new(id),
                        display_name,
                        phone_number,
                    }),
                    images: images.into_iter().map(Into::into).collect(),
                }))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn create_listing(
        &self,
        owner: SellerId,
        listing: &ValidatedListing,
        images: &[StoredImage],
    ) -> Result<ListingId, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let product_id = conn
            .transaction(|conn| {
                async move {
                    let new_detail = NewProductDetailRow {
                        contact_name: &listing.contact.contact_name,
                        email: listing.contact.email.as_deref(),
                        phone_number: &listing.contact.phone_number,
                        phone_number_2: listing.contact.phone_number_2.as_deref(),
                        phone_number_3: listing.contact.phone_number_3.as_deref(),
                    };
                    let detail_id: i64 = diesel::insert_into(product_details::table)
                        .values(&new_detail)
                        .returning(product_details::id)
                        .get_result(conn)
                        .await?;

                    let new_product = NewProductRow {
                        name: &listing.name,
                        price: listing.price,
                        description: &listing.description,
                        sub_category_id: listing.sub_category_id,
                        brand_id: listing.brand_id,
                        condition_id: listing.condition_id,
                        city_id: listing.city_id,
                        district_id: listing.district_id,
                        commune_id: listing.commune_id,
                        address: &listing.address,
                        latitude: listing.latitude,
                        longitude: listing.longitude,
                        discount: listing.discount,
                        discount_as_percentage: listing.discount_as_percentage,
                        is_free_delivery: listing.is_free_delivery,
                        detail_id,
                        user_id: owner.get(),
                        is_active: true,
                    };
                    let product_id: i64 = diesel::insert_into(products::table)
                        .values(&new_product)
                        .returning(products::id)
                        .get_result(conn)
                        .await?;

                    let image_rows: Vec<NewProductImageRow<'_>> = images
                        .iter()
                        .map(|image| NewProductImageRow {
                            product_id,
                            photo: &image.filename,
                            sort_order: image.sort_order,
                        })
                        .collect();
                    if !image_rows.is_empty() {
                        diesel::insert_into(product_images::table)
                            .values(&image_rows)
                            .execute(conn)
                            .await?;
                    }

                    Ok(product_id)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(ListingId::new(product_id))
    }

    async fn find_owner(
        &self,
        id: ListingId,
    ) -> Result<Option<SellerId>, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let owner: Option<i64> = products::table
            .find(id.get())
            .select(products::user_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(owner.map(SellerId::new))
    }

    async fn image_files(&self, id: ListingId) -> Result<Vec<String>, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        product_images::table
            .filter(product_images::product_id.eq(id.get()))
            .order(product_images::sort_order.asc())
            .select(product_images::photo)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn delete_listing(&self, id: ListingId) -> Result<(), ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let detail_id: Option<i64> = products::table
                    .find(id.get())
                    .select(products::detail_id)
                    .first(conn)
                    .await
                    .optional()?;

                diesel::delete(
                    product_images::table.filter(product_images::product_id.eq(id.get())),
                )
                .execute(conn)
                .await?;
                diesel::delete(products::table.find(id.get()))
                    .execute(conn)
                    .await?;
                if let Some(detail_id) = detail_id {
                    diesel::delete(product_details::table.find(detail_id))
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
