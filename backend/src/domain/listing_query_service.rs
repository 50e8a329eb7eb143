//! Listing read paths: public browse queries, the seller's own listings,
//! detail assembly, and category lookups.
//!
//! The browse query resolves the cascading category filter (brand over
//! subcategory over main category), fetches the matching active products,
//! and decorates each with its representative image.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::Error;
use crate::domain::catalog::{
    CategoryScope, CategorySelection, ListingFilter, MainCategoryNode,
};
use crate::domain::listing::{
    Listing, ListingCard, ListingDetail, ListingId, ListingImage, LookupRef, SellerId,
};
use crate::domain::ports::{
    CatalogPersistenceError, CatalogRepository, ListingPersistenceError, ListingRepository,
};

/// Read-side service over the listing and catalog repositories.
#[derive(Clone)]
pub struct ListingQueryService {
    listings: Arc<dyn ListingRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

fn map_listing_error(error: ListingPersistenceError) -> Error {
    match error {
        ListingPersistenceError::Connection { message } => Error::service_unavailable(message),
        ListingPersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_catalog_error(error: CatalogPersistenceError) -> Error {
    match error {
        CatalogPersistenceError::Connection { message } => Error::service_unavailable(message),
        CatalogPersistenceError::Query { message } => Error::internal(message),
    }
}

/// Pick one representative image per listing.
///
/// The lowest sort order wins; among equal sort orders the first row
/// encountered wins, so the result is deterministic for any input order.
fn representative_images(images: Vec<ListingImage>) -> HashMap<ListingId, String> {
    let mut best: HashMap<ListingId, (i32, String)> = HashMap::new();
    for image in images {
        match best.get(&image.listing_id) {
            Some((sort_order, _)) if *sort_order <= image.sort_order => {}
            _ => {
                best.insert(image.listing_id, (image.sort_order, image.photo));
            }
        }
    }
    best.into_iter()
        .map(|(listing_id, (_, photo))| (listing_id, photo))
        .collect()
}

impl ListingQueryService {
    /// Create the service over its two repositories.
    pub fn new(listings: Arc<dyn ListingRepository>, catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { listings, catalog }
    }

    /// Active listings matching the most specific supplied filter, each with
    /// its representative image attached.
    ///
    /// A main category with zero subcategories short-circuits to an empty
    /// result without touching the product table.
    pub async fn public_listings(&self, filter: &ListingFilter) -> Result<Vec<ListingCard>, Error> {
        let selection = match filter.scope() {
            CategoryScope::Brand(brand_id) => CategorySelection::Brand(brand_id),
            CategoryScope::SubCategory(sub_category_id) => {
                CategorySelection::SubCategory(sub_category_id)
            }
            CategoryScope::MainCategory(main_category_id) => {
                let sub_category_ids = self
                    .catalog
                    .sub_category_ids(main_category_id)
                    .await
                    .map_err(map_catalog_error)?;
                if sub_category_ids.is_empty() {
                    return Ok(Vec::new());
                }
                CategorySelection::SubCategoryIn(sub_category_ids)
            }
            CategoryScope::All => CategorySelection::All,
        };

        let listings = self
            .listings
            .list_active(&selection)
            .await
            .map_err(map_listing_error)?;
        self.attach_images(listings).await
    }

    /// All listings owned by the caller, with representative images.
    pub async fn listings_for_owner(&self, owner: SellerId) -> Result<Vec<ListingCard>, Error> {
        let listings = self
            .listings
            .list_by_owner(owner)
            .await
            .map_err(map_listing_error)?;
        self.attach_images(listings).await
    }

    /// The joined detail read model for one listing.
    pub async fn listing_detail(&self, id: ListingId) -> Result<ListingDetail, Error> {
        self.listings
            .find_detail(id)
            .await
            .map_err(map_listing_error)?
            .ok_or_else(|| Error::not_found("listing not found"))
    }

    /// Main categories with their subcategories, for the category pickers.
    pub async fn category_tree(&self) -> Result<Vec<MainCategoryNode>, Error> {
        self.catalog
            .main_category_tree()
            .await
            .map_err(map_catalog_error)
    }

    /// Brands registered under one subcategory.
    pub async fn brands_of(&self, sub_category_id: i64) -> Result<Vec<LookupRef>, Error> {
        self.catalog
            .brands_of(sub_category_id)
            .await
            .map_err(map_catalog_error)
    }

    async fn attach_images(&self, listings: Vec<Listing>) -> Result<Vec<ListingCard>, Error> {
        if listings.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<ListingId> = listings.iter().map(|listing| listing.id).collect();
        let images = self
            .listings
            .images_for(&ids)
            .await
            .map_err(map_listing_error)?;
        let mut representatives = representative_images(images);
        Ok(listings
            .into_iter()
            .map(|listing| {
                let image_url = representatives.remove(&listing.id);
                ListingCard { listing, image_url }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for filter resolution and image attachment.
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::listing::SellerProfile;
    use crate::domain::submission::{StoredImage, ValidatedListing};

    fn listing(id: i64, sub_category_id: i64, brand_id: Option<i64>) -> Listing {
        Listing {
            id: ListingId::new(id),
            name: format!("listing {id}"),
            price: 10.0,
            description: "description".to_owned(),
            sub_category_id,
            brand_id,
            condition_id: None,
            city_id: 1,
            district_id: 2,
            commune_id: 3,
            address: "somewhere".to_owned(),
            latitude: None,
            longitude: None,
            discount: None,
            discount_as_percentage: false,
            is_free_delivery: false,
            detail_id: id,
            owner: SellerId::new(99),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn image(id: i64, listing_id: i64, photo: &str, sort_order: i32) -> ListingImage {
        ListingImage {
            id,
            listing_id: ListingId::new(listing_id),
            photo: photo.to_owned(),
            sort_order,
        }
    }

    /// Recording listing repository stub: serves canned listings per
    /// selection and records which selections were queried.
    #[derive(Default)]
    struct StubListingRepository {
        listings: Vec<Listing>,
        images: Vec<ListingImage>,
        queried_selections: Mutex<Vec<CategorySelection>>,
    }

    impl StubListingRepository {
        fn with_listings(listings: Vec<Listing>, images: Vec<ListingImage>) -> Self {
            Self {
                listings,
                images,
                queried_selections: Mutex::new(Vec::new()),
            }
        }

        fn queried(&self) -> Vec<CategorySelection> {
            self.queried_selections
                .lock()
                .expect("selection lock")
                .clone()
        }

        fn matches(listing: &Listing, selection: &CategorySelection) -> bool {
            match selection {
                CategorySelection::Brand(brand_id) => listing.brand_id == Some(*brand_id),
                CategorySelection::SubCategory(sub_id) => listing.sub_category_id == *sub_id,
                CategorySelection::SubCategoryIn(sub_ids) => {
                    sub_ids.contains(&listing.sub_category_id)
                }
                CategorySelection::All => true,
            }
        }
    }

    #[async_trait]
    impl ListingRepository for StubListingRepository {
        async fn list_active(
            &self,
            selection: &CategorySelection,
        ) -> Result<Vec<Listing>, ListingPersistenceError> {
            self.queried_selections
                .lock()
                .expect("selection lock")
                .push(selection.clone());
            Ok(self
                .listings
                .iter()
                .filter(|listing| listing.is_active && Self::matches(listing, selection))
                .cloned()
                .collect())
        }

        async fn list_by_owner(
            &self,
            owner: SellerId,
        ) -> Result<Vec<Listing>, ListingPersistenceError> {
            Ok(self
                .listings
                .iter()
                .filter(|listing| listing.owner == owner)
                .cloned()
                .collect())
        }

        async fn images_for(
            &self,
            listing_ids: &[ListingId],
        ) -> Result<Vec<ListingImage>, ListingPersistenceError> {
            Ok(self
                .images
                .iter()
                .filter(|image| listing_ids.contains(&image.listing_id))
                .cloned()
                .collect())
        }

        async fn find_detail(
            &self,
            id: ListingId,
        ) -> Result<Option<ListingDetail>, ListingPersistenceError> {
            Ok(self
                .listings
                .iter()
                .find(|listing| listing.id == id)
                .map(|listing| ListingDetail {
                    listing: listing.clone(),
                    brand: None,
                    sub_category: None,
                    main_category: None,
                    condition: None,
                    city: None,
                    district: None,
                    commune: None,
                    contact_details: None,
                    seller: Some(SellerProfile {
                        id: listing.owner,
                        display_name: "Seller".to_owned(),
                        phone_number: "012345678".to_owned(),
                    }),
                    images: Vec::new(),
                }))
        }

        async fn create_listing(
            &self,
            _owner: SellerId,
            _listing: &ValidatedListing,
            _images: &[StoredImage],
        ) -> Result<ListingId, ListingPersistenceError> {
            Err(ListingPersistenceError::query("not under test"))
        }

        async fn find_owner(
            &self,
            _id: ListingId,
        ) -> Result<Option<SellerId>, ListingPersistenceError> {
            Ok(None)
        }

        async fn image_files(
            &self,
            _id: ListingId,
        ) -> Result<Vec<String>, ListingPersistenceError> {
            Ok(Vec::new())
        }

        async fn delete_listing(&self, _id: ListingId) -> Result<(), ListingPersistenceError> {
            Ok(())
        }
    }

    /// Catalog stub mapping one main category to a fixed subcategory set.
    #[derive(Default)]
    struct StubCatalogRepository {
        sub_categories: HashMap<i64, Vec<i64>>,
    }

    #[async_trait]
    impl CatalogRepository for StubCatalogRepository {
        async fn sub_category_ids(
            &self,
            main_category_id: i64,
        ) -> Result<Vec<i64>, CatalogPersistenceError> {
            Ok(self
                .sub_categories
                .get(&main_category_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn main_category_tree(
            &self,
        ) -> Result<Vec<MainCategoryNode>, CatalogPersistenceError> {
            Ok(Vec::new())
        }

        async fn brands_of(
            &self,
            _sub_category_id: i64,
        ) -> Result<Vec<LookupRef>, CatalogPersistenceError> {
            Ok(Vec::new())
        }
    }

    fn service(
        listings: Arc<StubListingRepository>,
        catalog: StubCatalogRepository,
    ) -> ListingQueryService {
        ListingQueryService::new(listings, Arc::new(catalog))
    }

    fn hierarchy_fixture() -> (Arc<StubListingRepository>, StubCatalogRepository) {
        // Main category 5 owns subcategories 12 and 13. Subcategory 12 has
        // three active products, two of them brand 7; subcategory 13 has none.
        let listings = vec![
            listing(1, 12, Some(7)),
            listing(2, 12, Some(7)),
            listing(3, 12, Some(8)),
            listing(4, 20, Some(9)),
        ];
        let repository = Arc::new(StubListingRepository::with_listings(listings, Vec::new()));
        let catalog = StubCatalogRepository {
            sub_categories: HashMap::from([(5, vec![12, 13]), (6, Vec::new())]),
        };
        (repository, catalog)
    }

    fn ids(cards: &[ListingCard]) -> Vec<i64> {
        cards.iter().map(|card| card.listing.id.get()).collect()
    }

    #[tokio::test]
    async fn main_category_expands_to_its_subcategories() {
        let (repository, catalog) = hierarchy_fixture();
        let service = service(repository.clone(), catalog);

        let cards = service
            .public_listings(&ListingFilter {
                main_category_id: Some(5),
                ..ListingFilter::default()
            })
            .await
            .expect("query should succeed");

        assert_eq!(ids(&cards), vec![1, 2, 3]);
        assert_eq!(
            repository.queried(),
            vec![CategorySelection::SubCategoryIn(vec![12, 13])],
        );
    }

    #[tokio::test]
    async fn main_category_without_subcategories_short_circuits() {
        let (repository, catalog) = hierarchy_fixture();
        let service = service(repository.clone(), catalog);

        let cards = service
            .public_listings(&ListingFilter {
                main_category_id: Some(6),
                ..ListingFilter::default()
            })
            .await
            .expect("query should succeed");

        assert!(cards.is_empty());
        // The product table must not be touched at all.
        assert!(repository.queried().is_empty());
    }

    #[tokio::test]
    async fn filters_narrow_along_the_hierarchy_path() {
        let (repository, catalog) = hierarchy_fixture();
        let service = service(repository, catalog);

        let by_main = service
            .public_listings(&ListingFilter {
                main_category_id: Some(5),
                ..ListingFilter::default()
            })
            .await
            .expect("main category query");
        let by_sub = service
            .public_listings(&ListingFilter {
                main_category_id: Some(5),
                sub_category_id: Some(12),
                ..ListingFilter::default()
            })
            .await
            .expect("subcategory query");
        let by_brand = service
            .public_listings(&ListingFilter {
                main_category_id: Some(5),
                sub_category_id: Some(12),
                brand_id: Some(7),
            })
            .await
            .expect("brand query");

        let main_ids = ids(&by_main);
        let sub_ids = ids(&by_sub);
        let brand_ids = ids(&by_brand);
        assert!(brand_ids.iter().all(|id| sub_ids.contains(id)));
        assert!(sub_ids.iter().all(|id| main_ids.contains(id)));
        assert_eq!(brand_ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn no_filter_returns_every_active_listing() {
        let (repository, catalog) = hierarchy_fixture();
        let service = service(repository.clone(), catalog);

        let cards = service
            .public_listings(&ListingFilter::default())
            .await
            .expect("query should succeed");

        assert_eq!(ids(&cards), vec![1, 2, 3, 4]);
        assert_eq!(repository.queried(), vec![CategorySelection::All]);
    }

    #[rstest]
    fn sort_order_one_always_wins() {
        let images = vec![
            image(10, 1, "late.jpg", 3),
            image(11, 1, "first.jpg", 1),
            image(12, 1, "second.jpg", 2),
        ];
        let representatives = representative_images(images);
        assert_eq!(
            representatives.get(&ListingId::new(1)),
            Some(&"first.jpg".to_owned()),
        );
    }

    #[rstest]
    fn lowest_sort_order_wins_without_sort_order_one() {
        let images = vec![image(10, 1, "five.jpg", 5), image(11, 1, "four.jpg", 4)];
        let representatives = representative_images(images);
        assert_eq!(
            representatives.get(&ListingId::new(1)),
            Some(&"four.jpg".to_owned()),
        );
    }

    #[rstest]
    fn ties_fall_back_to_first_encountered() {
        let images = vec![
            image(10, 1, "seen-first.jpg", 2),
            image(11, 1, "seen-second.jpg", 2),
        ];
        let representatives = representative_images(images);
        assert_eq!(
            representatives.get(&ListingId::new(1)),
            Some(&"seen-first.jpg".to_owned()),
        );
    }

    #[tokio::test]
    async fn cards_without_images_get_no_image_url() {
        let listings = vec![listing(1, 12, None), listing(2, 12, None)];
        let images = vec![image(10, 1, "one.jpg", 1)];
        let repository = Arc::new(StubListingRepository::with_listings(listings, images));
        let service = service(repository, StubCatalogRepository::default());

        let cards = service
            .public_listings(&ListingFilter::default())
            .await
            .expect("query should succeed");

        assert_eq!(cards[0].image_url.as_deref(), Some("one.jpg"));
        assert_eq!(cards[1].image_url, None);
    }

    #[tokio::test]
    async fn missing_detail_maps_to_not_found() {
        let repository = Arc::new(StubListingRepository::default());
        let service = service(repository, StubCatalogRepository::default());

        let err = service
            .listing_detail(ListingId::new(404))
            .await
            .expect_err("absent listing should be a not-found error");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
