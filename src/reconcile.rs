use tracing::{error, warn};

use crate::io::store::{AlertSink, OrderStore};
use crate::model::{JobCosting, LineItem, NormalizedOrder, PersistedOrder, UnknownItemAlert};

/// Per-order result of a reconciliation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The order was written; carries the number of alerts raised for it.
    Upserted { alerts_raised: usize },
    /// The store rejected the write. The failure is logged and the run
    /// continues with the next order.
    StoreRejected { alerts_raised: usize },
}

/// Merges one costed order into the persistent store.
///
/// The write is a full replace keyed by work-order number, which is what
/// makes repeated runs over the same rows idempotent: nothing is appended to
/// or merged with the previously stored record. Collaborators are injected
/// so tests can substitute in-memory fakes.
pub struct Reconciler<'a> {
    store: &'a dyn OrderStore,
    alerts: &'a dyn AlertSink,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn OrderStore, alerts: &'a dyn AlertSink) -> Self {
        Self { store, alerts }
    }

    /// Writes the order and raises one alert per unmatched line item.
    ///
    /// Alerts are raised regardless of whether the upsert succeeds: a
    /// catalog miss is worth surfacing even when persistence is down. An
    /// alert write failure is logged and never fails the order.
    pub fn reconcile(
        &self,
        order: &NormalizedOrder,
        line_items: Vec<LineItem>,
        costing: &JobCosting,
    ) -> ReconcileOutcome {
        let mut alerts_raised = 0;
        for item in &costing.unmatched {
            let alert = UnknownItemAlert::unknown_line_item(item, &order.work_order_number);
            match self.alerts.raise(alert) {
                Ok(()) => alerts_raised += 1,
                Err(err) => warn!(
                    work_order_number = %order.work_order_number,
                    error = %err,
                    "failed to record unknown line item alert"
                ),
            }
        }

        let record = PersistedOrder {
            work_order_number: order.work_order_number.clone(),
            fields: order.fields.clone(),
            labor_to_do: order.labor_to_do.clone(),
            line_items,
            duration_minutes: costing.duration_minutes,
            price: costing.price,
        };

        if let Err(err) = self.store.upsert(&record) {
            error!(
                work_order_number = %order.work_order_number,
                error = %err,
                "order upsert failed"
            );
            return ReconcileOutcome::StoreRejected { alerts_raised };
        }

        ReconcileOutcome::Upserted { alerts_raised }
    }
}
