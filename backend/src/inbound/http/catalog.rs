//! Category lookup endpoints backing the cascading pickers.
//!
//! ```text
//! GET /api/productCategory                  -> main categories with subcategories
//! GET /api/productCategory/{subCategoryId}  -> brands of one subcategory
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::MainCategoryNode;
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorResponseSchema;
use crate::inbound::http::listings::LookupResponse;
use crate::inbound::http::state::HttpState;

/// One main category with its subcategories.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MainCategoryResponse {
    /// Main category identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Subcategories underneath this main category.
    pub sub_categories: Vec<LookupResponse>,
}

impl From<MainCategoryNode> for MainCategoryResponse {
    fn from(node: MainCategoryNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            sub_categories: node.sub_categories.into_iter().map(Into::into).collect(),
        }
    }
}

/// The main-category tree for the category pickers.
#[utoipa::path(
    get,
    path = "/api/productCategory",
    responses(
        (status = 200, description = "Main categories with subcategories", body = [MainCategoryResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponseSchema)
    ),
    tags = ["catalog"],
    operation_id = "categoryTree",
    security([])
)]
#[get("")]
pub async fn category_tree(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<MainCategoryResponse>>> {
    let tree = state.listings.category_tree().await?;
    Ok(web::Json(tree.into_iter().map(Into::into).collect()))
}

/// Brands registered under one subcategory.
#[utoipa::path(
    get,
    path = "/api/productCategory/{subCategoryId}",
    params(("subCategoryId" = i64, Path, description = "Subcategory identifier")),
    responses(
        (status = 200, description = "Brand list", body = [LookupResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponseSchema)
    ),
    tags = ["catalog"],
    operation_id = "brandsOfSubCategory",
    security([])
)]
#[get("/{subCategoryId}")]
pub async fn brands_of_sub_category(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<LookupResponse>>> {
    let brands = state.listings.brands_of(path.into_inner()).await?;
    Ok(web::Json(brands.into_iter().map(Into::into).collect()))
}
