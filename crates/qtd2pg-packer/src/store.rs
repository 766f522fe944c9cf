//! The database boundary used by [`crate::RecordPacker`].
//!
//! [`PgStore`] is the PostGIS implementation; tests substitute in-memory
//! stores.

use std::future::Future;

use qtd2pg_core::{AppConfig, Credentials, Settings, TargetTables, VideoGeometry};
use qtd2pg_db::{DbError, InsertSummary, PoolConfig, ServerAddress, TableLayout, TableMismatch};
use sqlx::PgPool;

/// A server that can create databases and open sessions on them.
pub trait SpatialStore: Sync {
    type Session: StoreSession;

    fn create_database(
        &self,
        name: &str,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    fn open(
        &self,
        database: &str,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Self::Session, DbError>> + Send;
}

/// A connection to one target database, reused for a whole batch.
pub trait StoreSession: Send + Sync {
    fn create_tables(
        &self,
        tables: &TargetTables,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    fn check_tables(
        &self,
        tables: &TargetTables,
    ) -> impl Future<Output = Result<Vec<TableMismatch>, DbError>> + Send;

    fn insert_video(
        &self,
        tables: &TargetTables,
        geometry: &VideoGeometry,
    ) -> impl Future<Output = Result<InsertSummary, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct PgStore {
    server: ServerAddress,
    pool_config: PoolConfig,
    maintenance_db: String,
    layout: TableLayout,
}

impl PgStore {
    #[must_use]
    pub fn new(
        server: ServerAddress,
        pool_config: PoolConfig,
        maintenance_db: impl Into<String>,
        layout: TableLayout,
    ) -> Self {
        Self {
            server,
            pool_config,
            maintenance_db: maintenance_db.into(),
            layout,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig, settings: &Settings) -> Self {
        Self::new(
            ServerAddress::from_app_config(config),
            PoolConfig::from_app_config(config),
            config.maintenance_db.clone(),
            TableLayout::from_settings(settings),
        )
    }
}

impl SpatialStore for PgStore {
    type Session = PgSession;

    async fn create_database(&self, name: &str, credentials: &Credentials) -> Result<(), DbError> {
        let pool = qtd2pg_db::connect(
            &self.server,
            &self.maintenance_db,
            credentials,
            self.pool_config,
        )
        .await?;
        let result = qtd2pg_db::create_database(&pool, name).await;
        pool.close().await;
        result
    }

    async fn open(&self, database: &str, credentials: &Credentials) -> Result<PgSession, DbError> {
        let pool = qtd2pg_db::connect(&self.server, database, credentials, self.pool_config).await?;
        Ok(PgSession {
            pool,
            layout: self.layout.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgSession {
    pool: PgPool,
    layout: TableLayout,
}

impl StoreSession for PgSession {
    async fn create_tables(&self, tables: &TargetTables) -> Result<(), DbError> {
        qtd2pg_db::create_tables(&self.pool, &self.layout, tables).await
    }

    async fn check_tables(&self, tables: &TargetTables) -> Result<Vec<TableMismatch>, DbError> {
        Ok(qtd2pg_db::check_tables(&self.pool, &self.layout.schema, tables).await?)
    }

    async fn insert_video(
        &self,
        tables: &TargetTables,
        geometry: &VideoGeometry,
    ) -> Result<InsertSummary, DbError> {
        qtd2pg_db::insert_video(&self.pool, &self.layout.schema, tables, geometry).await
    }
}
