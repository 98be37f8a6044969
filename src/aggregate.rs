use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::model::{ColumnMap, NormalizedOrder, SheetData, LABOR_FIELD, WORK_ORDER_FIELD};
use crate::normalize::normalize_row;

/// Result of folding the source rows into one record per work order.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// One record per work-order number, in encounter order.
    pub orders: Vec<NormalizedOrder>,
    /// Rows that could not be attributed to an order, with the reason.
    pub skipped: Vec<SkippedRow>,
}

/// A source row that produced no order contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// Zero-based index into the data rows (header excluded).
    pub row_index: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingWorkOrderNumber,
}

/// Groups normalized rows by work-order number.
///
/// Rows are visited in input order. The first row seen for a number supplies
/// the order's metadata; later rows for the same number never overwrite it —
/// multi-row exports duplicate the metadata, so only their labor fragment is
/// absorbed. Every row's non-empty labor fragment is appended in encounter
/// order and the fragments are newline-joined into the final `labor_to_do`.
/// Rows without a work-order number are skipped with a tagged reason, never
/// treated as fatal.
pub fn aggregate(sheet: &SheetData, map: &ColumnMap) -> Aggregation {
    let mut builders: Vec<OrderBuilder> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skipped = Vec::new();

    for (row_index, row) in sheet.rows.iter().enumerate() {
        let mut fields = normalize_row(&sheet.header, row, map);

        let work_order_number = match fields.get(WORK_ORDER_FIELD).cloned().flatten() {
            Some(number) => number,
            None => {
                debug!(row_index, "skipping row without a work order number");
                skipped.push(SkippedRow {
                    row_index,
                    reason: SkipReason::MissingWorkOrderNumber,
                });
                continue;
            }
        };

        let fragment = fields.remove(LABOR_FIELD).flatten();

        let slot = match index.get(&work_order_number) {
            Some(&slot) => slot,
            None => {
                fields.remove(WORK_ORDER_FIELD);
                builders.push(OrderBuilder {
                    work_order_number: work_order_number.clone(),
                    fields,
                    fragments: Vec::new(),
                });
                index.insert(work_order_number, builders.len() - 1);
                builders.len() - 1
            }
        };

        if let Some(fragment) = fragment {
            builders[slot].fragments.push(fragment);
        }
    }

    Aggregation {
        orders: builders.into_iter().map(OrderBuilder::finish).collect(),
        skipped,
    }
}

struct OrderBuilder {
    work_order_number: String,
    fields: BTreeMap<String, Option<String>>,
    fragments: Vec<String>,
}

impl OrderBuilder {
    fn finish(self) -> NormalizedOrder {
        NormalizedOrder {
            work_order_number: self.work_order_number,
            fields: self.fields,
            labor_to_do: self.fragments.join("\n"),
        }
    }
}
