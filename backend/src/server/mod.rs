//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use tradepost_backend::ApiDoc;
use tradepost_backend::Trace;
use tradepost_backend::inbound::http::catalog::{brands_of_sub_category, category_tree};
use tradepost_backend::inbound::http::health::{HealthState, live, ready};
use tradepost_backend::inbound::http::listings::{
    create_listing, delete_listing, my_listings, public_listing_detail, public_listings,
};
use tradepost_backend::inbound::http::state::HttpState;
use tradepost_backend::inbound::http::users::{current_user, login, logout, register};
use tradepost_backend::outbound::persistence::{
    DieselCatalogRepository, DieselListingRepository, DieselLoginService,
};
use tradepost_backend::outbound::storage::DiskImageStore;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

/// Wire the Diesel adapters and disk store into the handler state.
fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let listings = Arc::new(DieselListingRepository::new(config.db_pool.clone()));
    let catalog = Arc::new(DieselCatalogRepository::new(config.db_pool.clone()));
    let images = Arc::new(DiskImageStore::new(config.upload_dir.clone()));
    let auth = Arc::new(DieselLoginService::new(config.db_pool.clone()));
    web::Data::new(HttpState::new(listings, catalog, images, auth))
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api")
        .wrap(session)
        .service(
            web::scope("/products")
                .service(public_listings)
                .service(public_listing_detail)
                .service(my_listings)
                .service(create_listing)
                .service(delete_listing),
        )
        .service(
            web::scope("/productCategory")
                .service(category_tree)
                .service(brands_of_sub_category),
        )
        .service(
            web::scope("/auth")
                .service(register)
                .service(login)
                .service(logout)
                .service(current_user),
        );

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        upload_dir: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
