use crate::model::{CatalogEntry, JobCosting, LineItem};

/// Orders catalog entries for matching: ascending by code.
///
/// The external catalog does not guarantee a fetch order, so the pipeline
/// fixes one here to make first-match-wins deterministic.
pub fn sort_for_matching(entries: &mut [CatalogEntry]) {
    entries.sort_by(|lhs, rhs| lhs.code.cmp(&rhs.code));
}

/// Resolves line items against the active catalog and totals the job.
///
/// Each item is matched against the first entry, in the order given, whose
/// code occurs in the item's description; both sides are compared
/// lower-cased. A match contributes `duration_minutes * quantity` and
/// `price * quantity` to the totals; quantities may be fractional and the
/// totals are not rounded. Items with no match are collected in `unmatched`
/// in input order and contribute nothing. An empty catalog is a valid input
/// and yields zero totals with every item unmatched.
pub fn cost_job(items: &[LineItem], catalog: &[CatalogEntry]) -> JobCosting {
    let mut costing = JobCosting::default();

    for item in items {
        let description = item.description.to_lowercase();
        let matched = catalog
            .iter()
            .find(|entry| description.contains(&entry.code.to_lowercase()));

        match matched {
            Some(entry) => {
                costing.duration_minutes += f64::from(entry.duration_minutes) * item.quantity;
                costing.price += entry.price * item.quantity;
            }
            None => costing.unmatched.push(item.clone()),
        }
    }

    costing
}
