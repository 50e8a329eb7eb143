//! Diesel persistence adapters implementing the domain ports.

mod diesel_catalog_repository;
mod diesel_listing_repository;
mod diesel_login_service;
mod models;
mod pool;
pub mod schema;

pub use diesel_catalog_repository::DieselCatalogRepository;
pub use diesel_listing_repository::DieselListingRepository;
pub use diesel_login_service::DieselLoginService;
pub use pool::{DbPool, PoolConfig, PoolError};
