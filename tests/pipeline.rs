use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;

use ordersync::io::store::{AlertSink, CatalogSource, JsonStore, OrderStore};
use ordersync::model::{
    AlertStatus, CatalogEntry, PersistedOrder, SheetData, UnknownItemAlert,
};
use ordersync::sync::{run_sync, sync_from_workbook};
use ordersync::{Result, SyncError};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

#[derive(Default)]
struct MemoryStore {
    orders: RefCell<BTreeMap<String, PersistedOrder>>,
    reject: Option<String>,
}

impl MemoryStore {
    fn rejecting(work_order_number: &str) -> Self {
        Self {
            reject: Some(work_order_number.to_string()),
            ..Self::default()
        }
    }
}

impl OrderStore for MemoryStore {
    fn upsert(&self, order: &PersistedOrder) -> Result<()> {
        if self.reject.as_deref() == Some(order.work_order_number.as_str()) {
            return Err(SyncError::Store("constraint violation".to_string()));
        }
        self.orders
            .borrow_mut()
            .insert(order.work_order_number.clone(), order.clone());
        Ok(())
    }

    fn get(&self, work_order_number: &str) -> Result<Option<PersistedOrder>> {
        Ok(self.orders.borrow().get(work_order_number).cloned())
    }

    fn list(&self) -> Result<Vec<PersistedOrder>> {
        Ok(self.orders.borrow().values().cloned().collect())
    }
}

struct MemoryCatalog {
    entries: Vec<CatalogEntry>,
    available: bool,
}

impl MemoryCatalog {
    fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            available: true,
        }
    }

    fn offline() -> Self {
        Self {
            entries: Vec::new(),
            available: false,
        }
    }
}

impl CatalogSource for MemoryCatalog {
    fn active_entries(&self) -> Result<Vec<CatalogEntry>> {
        if !self.available {
            return Err(SyncError::CatalogUnavailable("catalog offline".to_string()));
        }
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.active)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct MemoryAlerts {
    raised: RefCell<Vec<UnknownItemAlert>>,
}

impl AlertSink for MemoryAlerts {
    fn raise(&self, alert: UnknownItemAlert) -> Result<()> {
        self.raised.borrow_mut().push(alert);
        Ok(())
    }
}

fn entry(code: &str, price: f64, duration_minutes: u32) -> CatalogEntry {
    CatalogEntry {
        code: code.to_string(),
        description: String::new(),
        price,
        duration_minutes,
        active: true,
    }
}

fn sheet(header: &[&str], rows: &[&[&str]]) -> SheetData {
    SheetData {
        header: header.iter().map(|cell| cell.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
    }
}

fn export_sheet() -> SheetData {
    sheet(
        &["Work Order Number", "Customer Name", "Labor To Do"],
        &[
            &["WO-1001", "Alice", "Qty: 1 - BDC-tripcharge"],
            &["WO-1001", "Duplicate Metadata", "Qty: 2 - BDC-installation"],
            &["WO-1002", "Bob", "Qty: 1 - BDC-unknownitem"],
        ],
    )
}

fn standard_catalog() -> MemoryCatalog {
    MemoryCatalog::with_entries(vec![
        entry("BDC-tripcharge", 60.0, 15),
        entry("BDC-installation", 250.0, 120),
    ])
}

#[test]
fn reconciles_multi_row_export_into_one_order() {
    let store = MemoryStore::default();
    let alerts = MemoryAlerts::default();

    let summary = run_sync(&export_sheet(), &standard_catalog(), &store, &alerts)
        .expect("sync succeeded");

    assert_eq!(summary.rows_found, 3);
    assert_eq!(summary.orders_attempted, 2);
    assert_eq!(summary.processed_count, 2);
    assert_eq!(summary.alerts_raised, 1);
    assert_eq!(
        summary.message,
        "Sync complete. Processed 3 rows and upserted 2 unique orders."
    );

    let first = store
        .get("WO-1001")
        .expect("store read")
        .expect("WO-1001 present");
    assert_eq!(
        first.labor_to_do,
        "Qty: 1 - BDC-tripcharge\nQty: 2 - BDC-installation"
    );
    assert_eq!(first.line_items.len(), 2);
    assert_eq!(first.duration_minutes, 15.0 + 240.0);
    assert_eq!(first.price, 60.0 + 500.0);
    assert_eq!(
        first.fields.get("customer_name"),
        Some(&Some("Alice".to_string()))
    );

    let second = store
        .get("WO-1002")
        .expect("store read")
        .expect("WO-1002 present");
    assert_eq!(second.duration_minutes, 0.0);
    assert_eq!(second.price, 0.0);
    assert_eq!(second.line_items.len(), 1);

    let raised = alerts.raised.borrow();
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].kind, "unknown_line_item");
    assert_eq!(raised[0].work_order_number, "WO-1002");
    assert_eq!(raised[0].status, AlertStatus::New);
    assert!(raised[0].message.contains("BDC-unknownitem"));
}

#[test]
fn second_run_is_idempotent() {
    let store = MemoryStore::default();
    let alerts = MemoryAlerts::default();
    let data = export_sheet();
    let catalog = standard_catalog();

    run_sync(&data, &catalog, &store, &alerts).expect("first run");
    let after_first = store.list().expect("store read");

    run_sync(&data, &catalog, &store, &alerts).expect("second run");
    let after_second = store.list().expect("store read");

    assert_eq!(after_first, after_second);
}

#[test]
fn per_order_store_failure_does_not_stop_the_run() {
    let store = MemoryStore::rejecting("WO-1001");
    let alerts = MemoryAlerts::default();

    let summary = run_sync(&export_sheet(), &standard_catalog(), &store, &alerts)
        .expect("sync still succeeds");

    assert_eq!(summary.orders_attempted, 2);
    assert_eq!(summary.processed_count, 1);
    assert!(store.get("WO-1001").expect("store read").is_none());
    assert!(store.get("WO-1002").expect("store read").is_some());
}

#[test]
fn catalog_fetch_failure_aborts_before_any_write() {
    let store = MemoryStore::default();
    let alerts = MemoryAlerts::default();

    let result = run_sync(&export_sheet(), &MemoryCatalog::offline(), &store, &alerts);

    assert!(matches!(result, Err(SyncError::CatalogUnavailable(_))));
    assert!(store.list().expect("store read").is_empty());
    assert!(alerts.raised.borrow().is_empty());
}

#[test]
fn empty_source_is_a_noop_success() {
    let store = MemoryStore::default();
    let alerts = MemoryAlerts::default();

    // The catalog is never consulted when there is nothing to process.
    let summary = run_sync(
        &SheetData::default(),
        &MemoryCatalog::offline(),
        &store,
        &alerts,
    )
    .expect("no-op success");

    assert_eq!(summary.message, "No data found in source.");
    assert_eq!(summary.processed_count, 0);
    assert!(store.list().expect("store read").is_empty());
}

#[test]
fn empty_catalog_is_a_fallback_not_an_error() {
    let store = MemoryStore::default();
    let alerts = MemoryAlerts::default();

    let summary = run_sync(
        &export_sheet(),
        &MemoryCatalog::with_entries(Vec::new()),
        &store,
        &alerts,
    )
    .expect("sync succeeded");

    assert_eq!(summary.processed_count, 2);
    // Three labor lines across the two orders, all unmatched.
    assert_eq!(summary.alerts_raised, 3);

    for order in store.list().expect("store read") {
        assert_eq!(order.duration_minutes, 0.0);
        assert_eq!(order.price, 0.0);
    }
}

#[test]
fn workbook_sync_persists_and_stays_idempotent() {
    let temp_dir = tempdir().expect("temporary directory");
    let workbook_path = temp_dir.path().join("export.xlsx");
    let store_dir = temp_dir.path().join("store");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Work Orders").expect("sheet named");
    let header = [
        "Work Order Number",
        "Customer Name",
        "Schedule Date",
        "Labor To Do",
    ];
    for (col, cell) in header.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *cell)
            .expect("header written");
    }
    let rows = [
        ["WO-9", "Carol", "6/18/25", "Qty: 1 - BDC-tripcharge"],
        ["WO-9", "Carol", "6/18/25", "Qty: 1 - BDC-retired"],
    ];
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet
                .write_string((row_idx + 1) as u32, col_idx as u16, *cell)
                .expect("cell written");
        }
    }
    workbook.save(&workbook_path).expect("workbook saved");

    fs::create_dir_all(&store_dir).expect("store directory");
    let catalog = serde_json::json!([
        {"code": "BDC-tripcharge", "description": "Trip charge", "price": 60.0, "duration_minutes": 15, "active": true},
        {"code": "BDC-retired", "description": "No longer offered", "price": 99.0, "duration_minutes": 45, "active": false}
    ]);
    fs::write(
        store_dir.join("catalog.json"),
        serde_json::to_string_pretty(&catalog).expect("catalog serialized"),
    )
    .expect("catalog written");

    let summary =
        sync_from_workbook(&workbook_path, "Work Orders", &store_dir).expect("sync succeeded");
    assert_eq!(summary.processed_count, 1);
    assert_eq!(summary.alerts_raised, 1);

    let store = JsonStore::open(&store_dir).expect("store opened");
    let order = store
        .get("WO-9")
        .expect("store read")
        .expect("WO-9 present");
    assert_eq!(
        order.fields.get("schedule_date"),
        Some(&Some("2025-06-18".to_string()))
    );
    // The inactive entry does not participate in matching.
    assert_eq!(order.duration_minutes, 15.0);
    assert_eq!(order.price, 60.0);
    assert_eq!(order.line_items.len(), 2);

    let alerts_json = fs::read_to_string(store_dir.join("alerts.json")).expect("alerts read");
    let alerts: Vec<UnknownItemAlert> =
        serde_json::from_str(&alerts_json).expect("alerts parsed");
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].message.contains("BDC-retired"));

    let first_orders = store.list().expect("store read");
    sync_from_workbook(&workbook_path, "Work Orders", &store_dir).expect("second run");
    let second_orders = store.list().expect("store read");
    assert_eq!(first_orders, second_orders);
}

#[test]
fn missing_catalog_document_is_fatal() {
    let temp_dir = tempdir().expect("temporary directory");
    let workbook_path = temp_dir.path().join("export.xlsx");
    let store_dir = temp_dir.path().join("store");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Work Orders").expect("sheet named");
    worksheet
        .write_string(0, 0, "Work Order Number")
        .expect("header written");
    worksheet.write_string(1, 0, "WO-1").expect("cell written");
    workbook.save(&workbook_path).expect("workbook saved");

    let result = sync_from_workbook(&workbook_path, "Work Orders", &store_dir);
    assert!(matches!(result, Err(SyncError::CatalogUnavailable(_))));
}

#[test]
fn json_store_upsert_replaces_prior_record() {
    let temp_dir = tempdir().expect("temporary directory");
    let store = JsonStore::open(temp_dir.path()).expect("store opened");

    let mut order = PersistedOrder {
        work_order_number: "WO-1".to_string(),
        fields: BTreeMap::new(),
        labor_to_do: "Qty: 1 - BDC-tripcharge".to_string(),
        line_items: Vec::new(),
        duration_minutes: 15.0,
        price: 60.0,
    };
    store.upsert(&order).expect("first upsert");

    order.labor_to_do = "Qty: 2 - BDC-tripcharge".to_string();
    order.duration_minutes = 30.0;
    order.price = 120.0;
    store.upsert(&order).expect("second upsert");

    let stored = store.list().expect("store read");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].duration_minutes, 30.0);
    assert_eq!(stored[0].labor_to_do, "Qty: 2 - BDC-tripcharge");
}
