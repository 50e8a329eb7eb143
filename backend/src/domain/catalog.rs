//! Category hierarchy types and the cascading listing filter.
//!
//! The hierarchy is MainCategory → SubCategory → Brand. A product references
//! its subcategory and brand directly; the main category is derived
//! transitively through the subcategory.

use crate::domain::listing::LookupRef;

/// Optional filter parameters accepted by the public listing endpoint.
///
/// Filters cascade rather than combine: the most specific supplied filter
/// wins and the broader ones are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingFilter {
    /// Filter by main category (least specific).
    pub main_category_id: Option<i64>,
    /// Filter by subcategory.
    pub sub_category_id: Option<i64>,
    /// Filter by brand (most specific).
    pub brand_id: Option<i64>,
}

/// The single category constraint a [`ListingFilter`] resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryScope {
    /// Brand filter supplied; supersedes everything broader.
    Brand(i64),
    /// Subcategory filter supplied and no brand filter.
    SubCategory(i64),
    /// Only a main-category filter supplied; must be expanded to the set of
    /// subcategories underneath it before querying products.
    MainCategory(i64),
    /// No category filter at all.
    All,
}

impl ListingFilter {
    /// Resolve the precedence rule: brand over subcategory over main
    /// category, never a combination.
    pub fn scope(&self) -> CategoryScope {
        if let Some(brand_id) = self.brand_id {
            CategoryScope::Brand(brand_id)
        } else if let Some(sub_category_id) = self.sub_category_id {
            CategoryScope::SubCategory(sub_category_id)
        } else if let Some(main_category_id) = self.main_category_id {
            CategoryScope::MainCategory(main_category_id)
        } else {
            CategoryScope::All
        }
    }
}

/// The concrete product-table constraint handed to the listing repository
/// once any main-category expansion has happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelection {
    /// Products of one brand.
    Brand(i64),
    /// Products of one subcategory.
    SubCategory(i64),
    /// Products of any of the given subcategories.
    SubCategoryIn(Vec<i64>),
    /// No category constraint.
    All,
}

/// A main category together with its subcategories, for the category picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainCategoryNode {
    /// Main category identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Subcategories underneath this main category.
    pub sub_categories: Vec<LookupRef>,
}
