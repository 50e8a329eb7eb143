//! PostgreSQL-backed `CatalogRepository` implementation using Diesel.

use std::collections::BTreeMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use tracing::debug;

use crate::domain::catalog::MainCategoryNode;
use crate::domain::listing::LookupRef;
use crate::domain::ports::{CatalogPersistenceError, CatalogRepository};

use super::models::LookupRow;
use super::pool::{DbPool, PoolError};
use super::schema::{brands, main_categories, sub_categories};

/// Diesel-backed implementation of the `CatalogRepository` port.
#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CatalogPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            CatalogPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CatalogPersistenceError {
    debug!(
        error_type = %std::any::type_name_of_val(&error),
        "diesel operation failed"
    );
    match error {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::ClosedConnection,
            _,
        ) => CatalogPersistenceError::connection("database connection error"),
        _ => CatalogPersistenceError::query("database error"),
    }
}

#[async_trait]
impl CatalogRepository for DieselCatalogRepository {
    async fn sub_category_ids(
        &self,
        main_category_id: i64,
    ) -> Result<Vec<i64>, CatalogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        sub_categories::table
            .filter(sub_categories::main_category_id.eq(main_category_id))
            .select(sub_categories::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn main_category_tree(&self) -> Result<Vec<MainCategoryNode>, CatalogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Read both levels in one transaction so the tree is consistent.
        let (mains, subs) = conn
            .transaction(|conn| {
                async move {
                    let mains: Vec<LookupRow> = main_categories::table
                        .select((main_categories::id, main_categories::name))
                        .order(main_categories::id.asc())
                        .load(conn)
                        .await?;
                    let subs: Vec<(i64, i64, String)> = sub_categories::table
                        .select((
                            sub_categories::main_category_id,
                            sub_categories::id,
                            sub_categories::name,
                        ))
                        .order(sub_categories::id.asc())
                        .load(conn)
                        .await?;
                    Ok((mains, subs))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let mut grouped: BTreeMap<i64, Vec<LookupRef>> = BTreeMap::new();
        for (main_category_id, id, name) in subs {
            grouped
                .entry(main_category_id)
                .or_default()
                .push(LookupRef { id, name });
        }

        Ok(mains
            .into_iter()
            .map(|main| MainCategoryNode {
                sub_categories: grouped.remove(&main.id).unwrap_or_default(),
                id: main.id,
                name: main.name,
            })
            .collect())
    }

    async fn brands_of(
        &self,
        sub_category_id: i64,
    ) -> Result<Vec<LookupRef>, CatalogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<LookupRow> = brands::table
            .filter(brands::sub_category_id.eq(sub_category_id))
            .select((brands::id, brands::name))
            .order(brands::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
