use std::collections::BTreeSet;

use crate::aggregator::AggregatedMapping;
use crate::models::{ClassKey, ReconciliationRow};

/// Compare reserved against running capacity, one row per class key.
///
/// Rows cover the union of both key sets, sorted by the byte order of the
/// key, so identical inputs always produce identical output.
pub fn reconcile(
    reserved: &AggregatedMapping,
    running: &AggregatedMapping,
) -> Vec<ReconciliationRow> {
    let keys: BTreeSet<&ClassKey> = reserved.keys().chain(running.keys()).collect();

    let rows: Vec<ReconciliationRow> = keys
        .into_iter()
        .map(|key| {
            ReconciliationRow::new(key.clone(), reserved.count_of(key), running.count_of(key))
        })
        .collect();

    tracing::debug!(
        reserved_keys = reserved.len(),
        running_keys = running.len(),
        rows = rows.len(),
        "Reconciled capacity"
    );

    rows
}
