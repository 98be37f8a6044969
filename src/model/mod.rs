use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical field holding the natural key of an order.
pub const WORK_ORDER_FIELD: &str = "work_order_number";
/// Canonical field accumulating the billable task lines for an order.
pub const LABOR_FIELD: &str = "labor_to_do";
/// Alert type recorded for catalog misses.
pub const UNKNOWN_LINE_ITEM_ALERT: &str = "unknown_line_item";

/// Raw worksheet contents: the shared header followed by every data row.
///
/// Cells carry no structure at this point; absent cells are empty strings and
/// are turned into explicit `None`s by the row normalizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetData {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetData {
    /// True when there is nothing to process: no header or no data rows.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() || self.rows.is_empty()
    }
}

/// Mapping from external column names to canonical field names.
///
/// Only mapped columns are consumed; anything else in the source header is
/// dropped at the normalization boundary. Source column names are unique
/// within a map.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    entries: Vec<(String, String)>,
    date_fields: BTreeSet<String>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps an external column to a canonical field. Re-inserting a source
    /// column replaces its previous mapping.
    pub fn insert(&mut self, source: &str, field: &str) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.as_str() == source)
        {
            entry.1 = field.to_string();
        } else {
            self.entries.push((source.to_string(), field.to_string()));
        }
    }

    /// Maps a date-bearing column; its values are normalised from the source
    /// `M/D/YY` shape to canonical `YYYY-MM-DD` (or `None` when malformed).
    pub fn insert_date(&mut self, source: &str, field: &str) {
        self.insert(source, field);
        self.date_fields.insert(field.to_string());
    }

    pub fn field_for(&self, source: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.as_str() == source)
            .map(|(_, field)| field.as_str())
    }

    pub fn is_date_field(&self, field: &str) -> bool {
        self.date_fields.contains(field)
    }

    /// The production mapping for the installer work-order export.
    pub fn standard() -> Self {
        let mut map = Self::new();
        map.insert("Customer Name", "customer_name");
        map.insert("Work Order Number", WORK_ORDER_FIELD);
        map.insert("PO Number", "po_number");
        map.insert("Phone 1", "phone_1");
        map.insert("Phone 2", "phone_2");
        map.insert("Phone 3", "phone_3");
        map.insert("Email", "email");
        map.insert("Address", "address");
        map.insert("Apt / Unit Number", "apt_unit_number");
        map.insert("City", "city");
        map.insert("State", "state");
        map.insert("Zip Code", "zip_code");
        map.insert("Store Number", "store_number");
        map.insert("Job Type", "job_type");
        map.insert("Instructions", "instructions");
        map.insert("Materials", "materials");
        map.insert("Time Window", "time_window");
        map.insert("Last Note Made", "last_note_made");
        map.insert("Latest Comment", "latest_comment");
        map.insert_date("Entry Date", "entry_date");
        map.insert_date("Date order sent to installer", "date_order_sent_to_installer");
        map.insert_date("Material Arrival Date", "material_arrival_date");
        map.insert_date("Schedule Date", "schedule_date");
        map.insert("Labor To Do", LABOR_FIELD);
        map.insert("Installer", "installer");
        map.insert("Status", "status");
        map.insert_date("Date of Status Change", "date_of_status_change");
        map.insert("Chargeback", "chargeback");
        map.insert("Chargeback Amount", "chargeback_amount");
        map.insert("Invoice Number", "invoice_number");
        map.insert_date("Billed Date", "billed_date");
        map.insert_date("Payment Date", "payment_date");
        map.insert("Payment Amount", "payment_amount");
        map.insert("Check Number", "check_number");
        map.insert("Notes", "notes");
        map
    }
}

/// Canonical record for one work order, rebuilt from possibly many raw rows.
///
/// `work_order_number` is non-empty by construction; `labor_to_do` is the
/// newline-joined concatenation, in encounter order, of every labor fragment
/// seen for this order. The remaining metadata comes from the first row seen
/// for the order; date fields hold canonical `YYYY-MM-DD` text or `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOrder {
    pub work_order_number: String,
    pub fields: BTreeMap<String, Option<String>>,
    pub labor_to_do: String,
}

/// One parsed billable task from a `labor_to_do` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub quantity: f64,
    pub description: String,
}

/// A priced, timed service definition owned by the external catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub duration_minutes: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Derived totals for one order's line items.
///
/// Quantities may be fractional, so the totals are not rounded here; items
/// with no catalog match appear in `unmatched` in input order and contribute
/// nothing to the totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobCosting {
    pub duration_minutes: f64,
    pub price: f64,
    pub unmatched: Vec<LineItem>,
}

/// The store's representation of an order, keyed by `work_order_number`.
///
/// Every reconciliation fully replaces the stored record for its key; fields
/// are never merged with prior stored values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedOrder {
    pub work_order_number: String,
    pub fields: BTreeMap<String, Option<String>>,
    pub labor_to_do: String,
    pub line_items: Vec<LineItem>,
    pub duration_minutes: f64,
    pub price: f64,
}

/// Operator-facing signal that a line item missed the catalog. Created by the
/// pipeline, consumed (and eventually acknowledged) elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownItemAlert {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub work_order_number: String,
    pub created_at: String,
    pub status: AlertStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    New,
    Acknowledged,
}

impl UnknownItemAlert {
    /// Builds the alert raised for a line item with no active catalog entry.
    pub fn unknown_line_item(item: &LineItem, work_order_number: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: UNKNOWN_LINE_ITEM_ALERT.to_string(),
            message: format!(
                "No active catalog entry matches \"Qty: {} - {}\"",
                item.quantity, item.description
            ),
            work_order_number: work_order_number.to_string(),
            created_at: Utc::now().to_rfc3339(),
            status: AlertStatus::New,
        }
    }
}

/// Run summary returned by the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub message: String,
    pub rows_found: usize,
    pub orders_attempted: usize,
    pub processed_count: usize,
    pub alerts_raised: usize,
}

impl SyncSummary {
    /// Summary for an empty source: a defined no-op success.
    pub fn no_data(rows_found: usize) -> Self {
        Self {
            message: "No data found in source.".to_string(),
            rows_found,
            orders_attempted: 0,
            processed_count: 0,
            alerts_raised: 0,
        }
    }

    pub fn complete(
        rows_found: usize,
        orders_attempted: usize,
        processed_count: usize,
        alerts_raised: usize,
    ) -> Self {
        Self {
            message: format!(
                "Sync complete. Processed {rows_found} rows and upserted {processed_count} unique orders."
            ),
            rows_found,
            orders_attempted,
            processed_count,
            alerts_raised,
        }
    }
}
