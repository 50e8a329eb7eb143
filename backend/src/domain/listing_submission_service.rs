//! Listing submission: validation, image file storage, and the
//! transactional insert of detail record, product, and image rows.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::warn;

use crate::domain::Error;
use crate::domain::listing::{ListingId, SellerId};
use crate::domain::ports::{ImageStore, ListingPersistenceError, ListingRepository};
use crate::domain::submission::{
    FieldViolation, ImageUpload, ListingDraft, MAX_LISTING_IMAGES, StoredImage,
};

/// Write-side service creating listings.
#[derive(Clone)]
pub struct ListingSubmissionService {
    listings: Arc<dyn ListingRepository>,
    images: Arc<dyn ImageStore>,
}

fn map_listing_error(error: ListingPersistenceError) -> Error {
    match error {
        ListingPersistenceError::Connection { message } => Error::service_unavailable(message),
        ListingPersistenceError::Query { message } => Error::internal(message),
    }
}

fn validation_error(violations: &[FieldViolation]) -> Error {
    let errors: Vec<Value> = violations.iter().map(FieldViolation::to_json).collect();
    Error::invalid_request("listing validation failed").with_details(json!({ "errors": errors }))
}

fn image_count_violation(count: usize) -> Option<FieldViolation> {
    if count == 0 {
        Some(FieldViolation::new(
            "photos",
            "required",
            "At least one image is required.",
        ))
    } else if count > MAX_LISTING_IMAGES {
        Some(FieldViolation::new(
            "photos",
            "too_many",
            format!("No more than {MAX_LISTING_IMAGES} images are allowed."),
        ))
    } else {
        None
    }
}

impl ListingSubmissionService {
    /// Create the service over its repository and image store.
    pub fn new(listings: Arc<dyn ListingRepository>, images: Arc<dyn ImageStore>) -> Self {
        Self { listings, images }
    }

    /// Validate and persist a new listing for the authenticated owner.
    ///
    /// Field violations and image-count violations are collected into one
    /// validation error. Image files are written before the database
    /// transaction; when any later step fails the stored files are removed
    /// best-effort so a failed submission leaves no stray files behind.
    pub async fn submit(
        &self,
        owner: SellerId,
        draft: ListingDraft,
        uploads: Vec<ImageUpload>,
    ) -> Result<ListingId, Error> {
        let mut violations = Vec::new();
        let listing = match draft.validate() {
            Ok(listing) => Some(listing),
            Err(draft_violations) => {
                violations.extend(draft_violations);
                None
            }
        };
        violations.extend(image_count_violation(uploads.len()));
        if !violations.is_empty() {
            return Err(validation_error(&violations));
        }
        let Some(listing) = listing else {
            return Err(Error::internal("validated listing missing after validation"));
        };

        let stored = self.store_uploads(&uploads).await?;
        match self
            .listings
            .create_listing(owner, &listing, &stored)
            .await
        {
            Ok(listing_id) => Ok(listing_id),
            Err(error) => {
                self.discard_stored(&stored).await;
                Err(map_listing_error(error))
            }
        }
    }

    /// Write every upload to the image store, assigning 1-based sort orders
    /// in upload position. On failure the already stored files are removed.
    async fn store_uploads(&self, uploads: &[ImageUpload]) -> Result<Vec<StoredImage>, Error> {
        let mut stored = Vec::with_capacity(uploads.len());
        for (position, upload) in uploads.iter().enumerate() {
            match self.images.save(upload).await {
                Ok(filename) => {
                    let sort_order = i32::try_from(position + 1)
                        .map_err(|_| Error::internal("image position overflowed sort order"))?;
                    stored.push(StoredImage {
                        filename,
                        sort_order,
                    });
                }
                Err(error) => {
                    self.discard_stored(&stored).await;
                    return Err(Error::internal(format!(
                        "failed to store uploaded image: {error}"
                    )));
                }
            }
        }
        Ok(stored)
    }

    async fn discard_stored(&self, stored: &[StoredImage]) {
        for image in stored {
            if let Err(error) = self.images.remove(&image.filename).await {
                warn!(
                    filename = %image.filename,
                    error = %error,
                    "failed to clean up stored image after aborted submission"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for submission validation and file handling.
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::catalog::CategorySelection;
    use crate::domain::listing::{Listing, ListingDetail, ListingImage};
    use crate::domain::ports::ImageStoreError;
    use crate::domain::submission::ValidatedListing;

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

    fn upload() -> ImageUpload {
        ImageUpload {
            extension: ".jpg".to_owned(),
            content: vec![0xFF, 0xD8],
        }
    }

    #[derive(Default)]
    struct RecordingRepository {
        created: Mutex<Vec<(SellerId, ValidatedListing, Vec<StoredImage>)>>,
        fail_create: bool,
    }

    #[async_trait]
    impl ListingRepository for RecordingRepository {
        async fn list_active(
            &self,
            _selection: &CategorySelection,
        ) -> Result<Vec<Listing>, ListingPersistenceError> {
            Ok(Vec::new())
        }

        async fn list_by_owner(
            &self,
            _owner: SellerId,
        ) -> Result<Vec<Listing>, ListingPersistenceError> {
            Ok(Vec::new())
        }

        async fn images_for(
            &self,
            _listing_ids: &[ListingId],
        ) -> Result<Vec<ListingImage>, ListingPersistenceError> {
            Ok(Vec::new())
        }

        async fn find_detail(
            &self,
            _id: ListingId,
        ) -> Result<Option<ListingDetail>, ListingPersistenceError> {
            Ok(None)
        }

        async fn create_listing(
            &self,
            owner: SellerId,
            listing: &ValidatedListing,
            images: &[StoredImage],
        ) -> Result<ListingId, ListingPersistenceError> {
            if self.fail_create {
                return Err(ListingPersistenceError::query("insert failed"));
            }
            self.created.lock().expect("created lock").push((
                owner,
                listing.clone(),
                images.to_vec(),
            ));
            Ok(ListingId::new(41))
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

    #[derive(Default)]
    struct RecordingImageStore {
        saved: Mutex<Vec<String>>,
        removed: Mutex<Vec<String>>,
        fail_after: Option<usize>,
    }

    #[async_trait]
    impl ImageStore for RecordingImageStore {
        async fn save(&self, upload: &ImageUpload) -> Result<String, ImageStoreError> {
            let mut saved = self.saved.lock().expect("saved lock");
            if self.fail_after.is_some_and(|limit| saved.len() >= limit) {
                return Err(ImageStoreError::io("disk full"));
            }
            let filename = format!("photos-{}{}", saved.len() + 1, upload.extension);
            saved.push(filename.clone());
            Ok(filename)
        }

        async fn remove(&self, filename: &str) -> Result<(), ImageStoreError> {
            self.removed
                .lock()
                .expect("removed lock")
                .push(filename.to_owned());
            Ok(())
        }
    }

    fn service(
        repository: Arc<RecordingRepository>,
        store: Arc<RecordingImageStore>,
    ) -> ListingSubmissionService {
        ListingSubmissionService::new(repository, store)
    }

    fn violation_fields(error: &Error) -> Vec<String> {
        error
            .details()
            .and_then(|details| details.get("errors"))
            .and_then(|errors| errors.as_array())
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|entry| entry.get("field"))
                    .filter_map(|field| field.as_str())
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn accepts_one_to_eight_images() {
        for count in [1_usize, 8] {
            let repository = Arc::new(RecordingRepository::default());
            let store = Arc::new(RecordingImageStore::default());
            let service = service(repository.clone(), store.clone());

            let uploads = std::iter::repeat_with(upload).take(count).collect();
            let listing_id = service
                .submit(SellerId::new(7), complete_draft(), uploads)
                .await
                .expect("submission should succeed");

            assert_eq!(listing_id, ListingId::new(41));
            let created = repository.created.lock().expect("created lock");
            assert_eq!(created.len(), 1);
            assert_eq!(created[0].2.len(), count);
        }
    }

    #[rstest]
    #[case(0)]
    #[case(9)]
    #[tokio::test]
    async fn rejects_zero_and_too_many_images(#[case] count: usize) {
        let repository = Arc::new(RecordingRepository::default());
        let store = Arc::new(RecordingImageStore::default());
        let service = service(repository.clone(), store.clone());

        let uploads = std::iter::repeat_with(upload).take(count).collect();
        let error = service
            .submit(SellerId::new(7), complete_draft(), uploads)
            .await
            .expect_err("submission should fail");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(violation_fields(&error), vec!["photos"]);
        assert!(repository.created.lock().expect("created lock").is_empty());
        assert!(store.saved.lock().expect("saved lock").is_empty());
    }

    #[tokio::test]
    async fn draft_and_image_violations_are_reported_together() {
        let repository = Arc::new(RecordingRepository::default());
        let store = Arc::new(RecordingImageStore::default());
        let service = service(repository, store);

        let mut draft = complete_draft();
        draft.name = None;
        let error = service
            .submit(SellerId::new(7), draft, Vec::new())
            .await
            .expect_err("submission should fail");

        assert_eq!(violation_fields(&error), vec!["name", "photos"]);
    }

    #[tokio::test]
    async fn sort_orders_follow_upload_positions() {
        let repository = Arc::new(RecordingRepository::default());
        let store = Arc::new(RecordingImageStore::default());
        let service = service(repository.clone(), store);

        service
            .submit(SellerId::new(7), complete_draft(), vec![upload(); 3])
            .await
            .expect("submission should succeed");

        let created = repository.created.lock().expect("created lock");
        let sort_orders: Vec<i32> = created[0].2.iter().map(|image| image.sort_order).collect();
        assert_eq!(sort_orders, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failed_insert_discards_stored_files() {
        let repository = Arc::new(RecordingRepository {
            fail_create: true,
            ..RecordingRepository::default()
        });
        let store = Arc::new(RecordingImageStore::default());
        let service = service(repository, store.clone());

        let error = service
            .submit(SellerId::new(7), complete_draft(), vec![upload(); 2])
            .await
            .expect_err("submission should fail");

        assert_eq!(error.code(), ErrorCode::InternalError);
        let saved = store.saved.lock().expect("saved lock").clone();
        let removed = store.removed.lock().expect("removed lock").clone();
        assert_eq!(saved, removed);
    }

    #[tokio::test]
    async fn failed_store_discards_earlier_files() {
        let repository = Arc::new(RecordingRepository::default());
        let store = Arc::new(RecordingImageStore {
            fail_after: Some(1),
            ..RecordingImageStore::default()
        });
        let service = service(repository.clone(), store.clone());

        let error = service
            .submit(SellerId::new(7), complete_draft(), vec![upload(); 2])
            .await
            .expect_err("submission should fail");

        assert_eq!(error.code(), ErrorCode::InternalError);
        assert!(repository.created.lock().expect("created lock").is_empty());
        let removed = store.removed.lock().expect("removed lock").clone();
        assert_eq!(removed.len(), 1);
    }
}
