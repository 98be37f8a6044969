use std::path::Path;

use tracing::{debug, info};

use crate::aggregate::{self, Aggregation};
use crate::catalog;
use crate::error::Result;
use crate::extract;
use crate::io::excel_read;
use crate::io::store::{AlertSink, CatalogSource, JsonStore, OrderStore};
use crate::model::{ColumnMap, SheetData, SyncSummary};
use crate::reconcile::{ReconcileOutcome, Reconciler};

/// Runs the full pipeline over an already loaded sheet.
///
/// An empty source is a defined no-op success. The catalog is fetched once
/// and held for the whole run; a fetch failure aborts before any order is
/// touched, since costing without a catalog would be meaningless. Orders are
/// then reconciled sequentially in encounter order, and a failing order
/// never stops the ones after it.
pub fn run_sync(
    sheet: &SheetData,
    catalog_source: &dyn CatalogSource,
    store: &dyn OrderStore,
    alerts: &dyn AlertSink,
) -> Result<SyncSummary> {
    if sheet.is_empty() {
        info!("source is empty, nothing to reconcile");
        return Ok(SyncSummary::no_data(sheet.rows.len()));
    }

    let mut entries = catalog_source.active_entries()?;
    catalog::sort_for_matching(&mut entries);

    let map = ColumnMap::standard();
    let Aggregation { orders, skipped } = aggregate::aggregate(sheet, &map);
    if !skipped.is_empty() {
        debug!(count = skipped.len(), "rows skipped during aggregation");
    }

    let reconciler = Reconciler::new(store, alerts);
    let mut upserted = 0;
    let mut alerts_raised = 0;

    for order in &orders {
        let line_items = extract::extract_line_items(&order.labor_to_do);
        let costing = catalog::cost_job(&line_items, &entries);

        match reconciler.reconcile(order, line_items, &costing) {
            ReconcileOutcome::Upserted {
                alerts_raised: raised,
            } => {
                upserted += 1;
                alerts_raised += raised;
            }
            ReconcileOutcome::StoreRejected {
                alerts_raised: raised,
            } => {
                alerts_raised += raised;
            }
        }
    }

    info!(
        rows = sheet.rows.len(),
        orders = orders.len(),
        upserted,
        alerts_raised,
        "sync complete"
    );

    Ok(SyncSummary::complete(
        sheet.rows.len(),
        orders.len(),
        upserted,
        alerts_raised,
    ))
}

/// Loads one worksheet from an xlsx workbook and reconciles it into the JSON
/// store rooted at `store_dir`.
pub fn sync_from_workbook(input: &Path, sheet_name: &str, store_dir: &Path) -> Result<SyncSummary> {
    let sheet = excel_read::read_sheet(input, sheet_name)?;
    let store = JsonStore::open(store_dir)?;
    run_sync(&sheet, &store, &store, &store)
}
