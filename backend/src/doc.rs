//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API. The generated document is served by Swagger UI in debug
//! builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::catalog::MainCategoryResponse;
use crate::inbound::http::error::ErrorResponseSchema;
use crate::inbound::http::listings::{
    ContactDetailsResponse, ListingCardResponse, ListingCreatedResponse, ListingDeletedResponse,
    ListingDetailResponse, ListingImageResponse, LookupResponse, SellerResponse,
};
use crate::inbound::http::users::{LoginRequest, ProfileResponse, RegisterRequest};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Tradepost backend API",
        description = "Classifieds marketplace: listing browse, submission, deletion, and session-authenticated accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::listings::public_listings,
        crate::inbound::http::listings::public_listing_detail,
        crate::inbound::http::listings::my_listings,
        crate::inbound::http::listings::create_listing,
        crate::inbound::http::listings::delete_listing,
        crate::inbound::http::catalog::category_tree,
        crate::inbound::http::catalog::brands_of_sub_category,
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorResponseSchema,
        ListingCardResponse,
        ListingDetailResponse,
        ListingImageResponse,
        ListingCreatedResponse,
        ListingDeletedResponse,
        LookupResponse,
        ContactDetailsResponse,
        SellerResponse,
        MainCategoryResponse,
        RegisterRequest,
        LoginRequest,
        ProfileResponse,
    ))
)]
pub struct ApiDoc;
