//! Account endpoints.
//!
//! ```text
//! POST /api/auth/register {"displayName":"Dara","phoneNumber":"012345678","password":"..."}
//! POST /api/auth/login    {"phoneNumber":"012345678","password":"..."}
//! POST /api/auth/logout
//! GET  /api/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::{
    Error, FieldViolation, LoginCredentials, LoginValidationError, SellerProfile,
    SellerRegistration,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorResponseSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name shown on listings.
    pub display_name: String,
    /// Phone number used to log in.
    pub phone_number: String,
    /// Plain-text password; hashed before storage.
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Phone number matched against any of the account's phone columns.
    pub phone_number: String,
    /// Password to verify.
    pub password: String,
}

/// Public profile of the authenticated seller.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// Seller identifier.
    pub id: i64,
    /// Display name.
    pub display_name: String,
    /// Primary phone number.
    pub phone_number: String,
}

impl From<SellerProfile> for ProfileResponse {
    fn from(profile: SellerProfile) -> Self {
        Self {
            id: profile.id.get(),
            display_name: profile.display_name,
            phone_number: profile.phone_number,
        }
    }
}

fn violations_error(violations: &[FieldViolation]) -> Error {
    let errors: Vec<Value> = violations.iter().map(FieldViolation::to_json).collect();
    Error::invalid_request("registration validation failed")
        .with_details(json!({ "errors": errors }))
}

fn map_login_validation_error(err: &LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyPhoneNumber => {
            Error::invalid_request("phone number must not be empty")
                .with_details(json!({ "field": "phoneNumber", "code": "required" }))
        }
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "required" })),
    }
}

/// Create an account and start a session.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Validation failed", body = ErrorResponseSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let registration =
        SellerRegistration::try_from_parts(&payload.display_name, &payload.phone_number, &payload.password)
            .map_err(|violations| violations_error(&violations))?;
    let profile = state.auth.register(&registration).await?;
    session.persist_user(profile.id)?;
    Ok(HttpResponse::Created().json(ProfileResponse::from(profile)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorResponseSchema),
        (status = 401, description = "Invalid credentials", body = ErrorResponseSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&payload.phone_number, &payload.password)
        .map_err(|err| map_login_validation_error(&err))?;
    let profile = state.auth.authenticate(&credentials).await?;
    session.persist_user(profile.id)?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(profile)))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cleared")
    ),
    tags = ["auth"],
    operation_id = "logout",
    security(("SessionCookie" = []))
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::Ok().finish()
}

/// The authenticated caller's own profile.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Caller profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorResponseSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser",
    security(("SessionCookie" = []))
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let id = session.require_user_id()?;
    let profile = state
        .auth
        .profile(id)
        .await?
        .ok_or_else(|| Error::unauthorized("login required"))?;
    Ok(web::Json(profile.into()))
}

#[cfg(test)]
mod tests {
    //! Handler-level coverage over a stubbed login service.
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::domain::SellerId;
    use crate::domain::catalog::{CategorySelection, MainCategoryNode};
    use crate::domain::listing::{Listing, ListingDetail, ListingId, ListingImage, LookupRef};
    use crate::domain::ports::{
        CatalogPersistenceError, CatalogRepository, ImageStore, ImageStoreError,
        ListingPersistenceError, ListingRepository, LoginService,
    };
    use crate::domain::submission::{ImageUpload, StoredImage, ValidatedListing};
    use crate::inbound::http::test_utils::test_session_middleware;

    struct EmptyListings;

    #[async_trait]
    impl ListingRepository for EmptyListings {
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
            _owner: SellerId,
            _listing: &ValidatedListing,
            _images: &[StoredImage],
        ) -> Result<ListingId, ListingPersistenceError> {
            Ok(ListingId::new(1))
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

    struct EmptyCatalog;

    #[async_trait]
    impl CatalogRepository for EmptyCatalog {
        async fn sub_category_ids(
            &self,
            _main_category_id: i64,
        ) -> Result<Vec<i64>, CatalogPersistenceError> {
            Ok(Vec::new())
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

    struct NullImages;

    #[async_trait]
    impl ImageStore for NullImages {
        async fn save(&self, _upload: &ImageUpload) -> Result<String, ImageStoreError> {
            Ok("photos-1.jpg".to_owned())
        }

        async fn remove(&self, _filename: &str) -> Result<(), ImageStoreError> {
            Ok(())
        }
    }

    /// Accepts one fixed account: phone 012345678, password "letmein-42".
    struct FixtureLogin;

    fn fixture_profile() -> SellerProfile {
        SellerProfile {
            id: SellerId::new(7),
            display_name: "Dara".to_owned(),
            phone_number: "012345678".to_owned(),
        }
    }

    #[async_trait]
    impl LoginService for FixtureLogin {
        async fn register(
            &self,
            registration: &SellerRegistration,
        ) -> Result<SellerProfile, Error> {
            Ok(SellerProfile {
                id: SellerId::new(8),
                display_name: registration.display_name().to_owned(),
                phone_number: registration.phone_number().to_owned(),
            })
        }

        async fn authenticate(
            &self,
            credentials: &LoginCredentials,
        ) -> Result<SellerProfile, Error> {
            if credentials.phone_number() == "012345678" && credentials.password() == "letmein-42" {
                Ok(fixture_profile())
            } else {
                Err(Error::unauthorized("invalid phone number or password"))
            }
        }

        async fn profile(&self, id: SellerId) -> Result<Option<SellerProfile>, Error> {
            Ok((id == SellerId::new(7)).then(fixture_profile))
        }
    }

    fn test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = web::Data::new(HttpState::new(
            Arc::new(EmptyListings),
            Arc::new(EmptyCatalog),
            Arc::new(NullImages),
            Arc::new(FixtureLogin),
        ));
        App::new().app_data(state).service(
            web::scope("/api/auth")
                .wrap(test_session_middleware())
                .service(register)
                .service(login)
                .service(logout)
                .service(current_user),
        )
    }

    #[actix_web::test]
    async fn login_issues_a_session_cookie_that_authenticates_me() {
        let app = test::init_service(test_app()).await;

        let login_res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(&LoginRequest {
                    phone_number: "012345678".to_owned(),
                    password: "letmein-42".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::OK);
        let cookie = login_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();

        let me_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/auth/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(me_res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(me_res).await;
        assert_eq!(body["displayName"], "Dara");
        assert_eq!(body["phoneNumber"], "012345678");
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let app = test::init_service(test_app()).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(&LoginRequest {
                    phone_number: "012345678".to_owned(),
                    password: "wrong".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["code"], "unauthorized");
    }

    #[actix_web::test]
    async fn blank_login_fields_are_invalid_requests() {
        let app = test::init_service(test_app()).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(&LoginRequest {
                    phone_number: "   ".to_owned(),
                    password: "letmein-42".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "phoneNumber");
    }

    #[actix_web::test]
    async fn register_collects_violations() {
        let app = test::init_service(test_app()).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(&RegisterRequest {
                    display_name: "ab".to_owned(),
                    phone_number: "nope".to_owned(),
                    password: "short".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        let errors = body["details"]["errors"].as_array().expect("errors list");
        assert_eq!(errors.len(), 3);
    }

    #[actix_web::test]
    async fn register_starts_a_session() {
        let app = test::init_service(test_app()).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(&RegisterRequest {
                    display_name: "Sokha".to_owned(),
                    phone_number: "098765432".to_owned(),
                    password: "longenough".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(
            response
                .response()
                .cookies()
                .any(|cookie| cookie.name() == "session")
        );
    }

    #[actix_web::test]
    async fn logout_clears_the_session() {
        let app = test::init_service(test_app()).await;

        let login_res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(&LoginRequest {
                    phone_number: "012345678".to_owned(),
                    password: "letmein-42".to_owned(),
                })
                .to_request(),
        )
        .await;
        let cookie = login_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();

        let logout_res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/logout")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(logout_res.status(), StatusCode::OK);
        let cleared = logout_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session removal cookie")
            .into_owned();

        let me_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/auth/me")
                .cookie(cleared)
                .to_request(),
        )
        .await;
        assert_eq!(me_res.status(), StatusCode::UNAUTHORIZED);
    }
}
