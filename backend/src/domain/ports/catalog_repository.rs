//! Port abstraction for category-hierarchy lookups.

use async_trait::async_trait;

use crate::domain::catalog::MainCategoryNode;
use crate::domain::listing::LookupRef;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by catalog repository adapters.
    pub enum CatalogPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "catalog repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "catalog repository query failed: {message}",
    }
}

/// Read operations over the category hierarchy.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Identifiers of every subcategory under the given main category.
    /// An unknown main category simply yields an empty set.
    async fn sub_category_ids(
        &self,
        main_category_id: i64,
    ) -> Result<Vec<i64>, CatalogPersistenceError>;

    /// Main categories with their subcategories, for the category pickers.
    async fn main_category_tree(&self) -> Result<Vec<MainCategoryNode>, CatalogPersistenceError>;

    /// Brands registered under the given subcategory.
    async fn brands_of(
        &self,
        sub_category_id: i64,
    ) -> Result<Vec<LookupRef>, CatalogPersistenceError>;
}
