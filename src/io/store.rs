//! Collaborator interfaces for the catalog, order, and alert stores, plus a
//! JSON-document implementation used by the command line entry point.
//!
//! The pipeline only ever sees these traits; tests substitute in-memory
//! fakes, and the storage engine behind them is out of scope here.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SyncError};
use crate::model::{CatalogEntry, PersistedOrder, UnknownItemAlert};

/// Read side of the service catalog.
///
/// Implementations return only entries with `active = true`. Returning an
/// empty list is a valid state (nothing will match); failing to fetch at all
/// aborts the run.
pub trait CatalogSource {
    fn active_entries(&self) -> Result<Vec<CatalogEntry>>;
}

/// Write side of the order store. `upsert` fully replaces the stored record
/// for the given work-order number; the last writer wins.
pub trait OrderStore {
    fn upsert(&self, order: &PersistedOrder) -> Result<()>;
    fn get(&self, work_order_number: &str) -> Result<Option<PersistedOrder>>;
    fn list(&self) -> Result<Vec<PersistedOrder>>;
}

/// Sink for operator-facing alerts. Alerts are append-only from the
/// pipeline's point of view.
pub trait AlertSink {
    fn raise(&self, alert: UnknownItemAlert) -> Result<()>;
}

const CATALOG_FILE: &str = "catalog.json";
const ORDERS_FILE: &str = "orders.json";
const ALERTS_FILE: &str = "alerts.json";

/// File-backed store keeping the catalog, orders, and alerts as JSON
/// documents under one directory. Orders are keyed by work-order number in a
/// sorted map so the serialized document stays stable across runs.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Opens the store directory, creating it if needed.
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn read_document<T: Default + DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.root.join(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let source = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&source)?)
    }

    fn write_document<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(self.root.join(name), json)?;
        Ok(())
    }

    fn read_orders(&self) -> Result<BTreeMap<String, PersistedOrder>> {
        self.read_document(ORDERS_FILE)
    }
}

impl CatalogSource for JsonStore {
    fn active_entries(&self) -> Result<Vec<CatalogEntry>> {
        let path = self.root.join(CATALOG_FILE);
        if !path.exists() {
            // A missing document is a fetch failure, not an empty catalog.
            return Err(SyncError::CatalogUnavailable(format!(
                "missing catalog document {}",
                path.display()
            )));
        }
        let source = fs::read_to_string(&path)
            .map_err(|error| SyncError::CatalogUnavailable(error.to_string()))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&source)
            .map_err(|error| SyncError::CatalogUnavailable(error.to_string()))?;
        Ok(entries.into_iter().filter(|entry| entry.active).collect())
    }
}

impl OrderStore for JsonStore {
    fn upsert(&self, order: &PersistedOrder) -> Result<()> {
        let mut orders = self.read_orders()?;
        orders.insert(order.work_order_number.clone(), order.clone());
        self.write_document(ORDERS_FILE, &orders)
    }

    fn get(&self, work_order_number: &str) -> Result<Option<PersistedOrder>> {
        Ok(self.read_orders()?.get(work_order_number).cloned())
    }

    fn list(&self) -> Result<Vec<PersistedOrder>> {
        Ok(self.read_orders()?.into_values().collect())
    }
}

impl AlertSink for JsonStore {
    fn raise(&self, alert: UnknownItemAlert) -> Result<()> {
        let mut alerts: Vec<UnknownItemAlert> = self.read_document(ALERTS_FILE)?;
        alerts.push(alert);
        self.write_document(ALERTS_FILE, &alerts)
    }
}
