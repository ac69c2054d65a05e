//! Inventory loading.
//!
//! Sources return typed errors; [`InventoryStore`] memoizes one snapshot for a
//! fixed TTL and degrades any failure to an empty table.

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::{Connection, PgConnection};
use std::{
    fmt::Debug,
    io::Read,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tokio::{sync::Mutex, time::Instant};

use crate::{Config, error::InventoryError, model::InventoryRow};

const INVENTORY_QUERY: &str = "SELECT product_id::text AS product_id, \
     category::text AS category, \
     base_demand::bigint AS base_demand, \
     current_stock::bigint AS current_stock \
     FROM inventory";

#[async_trait]
pub trait InventorySource: Send + Sync + Debug {
    async fn fetch(&self) -> Result<Vec<InventoryRow>, InventoryError>;
}

/// Raw row as read from a store, before the non-negativity check.
#[derive(Debug, Clone, Deserialize, sqlx::FromRow)]
struct RawInventoryRow {
    product_id: String,
    category: String,
    base_demand: i64,
    current_stock: i64,
}

impl RawInventoryRow {
    fn into_row(self) -> Option<InventoryRow> {
        let base_demand = u64::try_from(self.base_demand).ok();
        let current_stock = u64::try_from(self.current_stock).ok();

        match (base_demand, current_stock) {
            (Some(base_demand), Some(current_stock)) => Some(InventoryRow {
                product_id: self.product_id,
                category: self.category,
                base_demand,
                current_stock,
            }),
            _ => {
                tracing::warn!(
                    product_id = %self.product_id,
                    base_demand = self.base_demand,
                    current_stock = self.current_stock,
                    "skipping inventory row with negative quantities"
                );
                None
            }
        }
    }
}

fn normalize(raw: Vec<RawInventoryRow>) -> Vec<InventoryRow> {
    raw.into_iter().filter_map(RawInventoryRow::into_row).collect()
}

/// Postgres `inventory` table. Opens one connection per load.
#[derive(Clone)]
pub struct PgInventorySource {
    uri: String,
}

impl PgInventorySource {
    pub fn new(uri: String) -> Self {
        Self { uri }
    }
}

impl Debug for PgInventorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgInventorySource").field("uri", &"<redacted>").finish()
    }
}

#[async_trait]
impl InventorySource for PgInventorySource {
    async fn fetch(&self) -> Result<Vec<InventoryRow>, InventoryError> {
        let mut conn = PgConnection::connect(&self.uri).await.map_err(InventoryError::Connect)?;

        let raw = sqlx::query_as::<_, RawInventoryRow>(INVENTORY_QUERY)
            .fetch_all(&mut conn)
            .await
            .map_err(InventoryError::Query)?;

        if let Err(e) = conn.close().await {
            tracing::debug!(error = %e, "inventory connection did not close cleanly");
        }

        Ok(normalize(raw))
    }
}

/// CSV file with the same columns as the `inventory` table.
#[derive(Debug, Clone)]
pub struct CsvInventorySource {
    path: PathBuf,
}

impl CsvInventorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parse inventory rows from CSV with a header line.
pub fn read_inventory_csv<R: Read>(reader: R) -> Result<Vec<InventoryRow>, InventoryError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let raw = csv_reader.deserialize().collect::<Result<Vec<RawInventoryRow>, _>>()?;

    Ok(normalize(raw))
}

#[async_trait]
impl InventorySource for CsvInventorySource {
    async fn fetch(&self) -> Result<Vec<InventoryRow>, InventoryError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|source| InventoryError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        read_inventory_csv(bytes.as_slice())
    }
}

/// Pick the CSV source when one is configured, otherwise the database.
pub fn inventory_source(config: &Config) -> anyhow::Result<Box<dyn InventorySource>> {
    if let Some(path) = &config.inventory.csv_path {
        return Ok(Box::new(CsvInventorySource::new(path.clone())));
    }

    let uri = config.db_uri()?;
    Ok(Box::new(PgInventorySource::new(uri.to_owned())))
}

#[async_trait]
impl<S: InventorySource + ?Sized> InventorySource for Box<S> {
    async fn fetch(&self) -> Result<Vec<InventoryRow>, InventoryError> {
        (**self).fetch().await
    }
}

#[derive(Debug)]
struct Snapshot {
    rows: Arc<[InventoryRow]>,
    loaded_at: Instant,
}

/// Memoizing front for an [`InventorySource`].
///
/// All callers inside one TTL window see the same snapshot. Failed loads
/// become an empty snapshot, which is memoized like any other.
#[derive(Debug)]
pub struct InventoryStore<S> {
    source: S,
    ttl: Duration,
    snapshot: Mutex<Option<Snapshot>>,
}

impl<S: InventorySource> InventoryStore<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self { source, ttl, snapshot: Mutex::new(None) }
    }

    /// Current inventory; empty when the source failed.
    pub async fn load(&self) -> Arc<[InventoryRow]> {
        let mut guard = self.snapshot.lock().await;

        if let Some(snapshot) = guard.as_ref() {
            if snapshot.loaded_at.elapsed() < self.ttl {
                return Arc::clone(&snapshot.rows);
            }
        }

        let rows: Arc<[InventoryRow]> = match self.source.fetch().await {
            Ok(rows) => {
                tracing::debug!(rows = rows.len(), "inventory loaded");
                rows.into()
            }
            Err(e) => {
                tracing::warn!(error = %e, "inventory load failed; using empty table");
                Arc::from(Vec::new())
            }
        };

        *guard = Some(Snapshot { rows: Arc::clone(&rows), loaded_at: Instant::now() });
        rows
    }

    /// Drop the memoized snapshot so the next load hits the source.
    pub async fn invalidate(&self) {
        self.snapshot.lock().await.take();
    }
}
