//! # Sequence Grouping Module
//!
//! Pure ordering logic shared by the registry and the emitter: maps an
//! order value to its group id and partitions a scan snapshot into
//! per-group, fully sorted runs.
//!
//! A [`SequenceGroups`] value is transient. It is built from one snapshot,
//! consumed while answering one request, and dropped; nothing in this
//! module caches anything across requests.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------


// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;

use tracing::trace;

use crate::registry::CaseRecord;

// ------------------------------------------------------------------------------------------------
// Group id
// ------------------------------------------------------------------------------------------------

/// Maps an order value to the id of the group it belongs to.
///
/// The group id is the floor of the order value, so `1.1`, `1.99` and
/// `1.0` all land in group `1`, while `-0.5` lands in group `-1` (floor
/// rounds toward negative infinity, not toward zero). Order values are
/// validated as finite at registration; magnitudes beyond the `i64`
/// range saturate at the boundary groups.
pub(crate) fn group_id(order: f64) -> i64 {
    order.floor() as i64
}

/// Counts distinct order values shared by more than one record.
///
/// Cases with a shared order value still replay deterministically (ties
/// fall back to registration sequence), but the collision usually means a
/// declaration slip, so the registry surfaces the count in its stats.
pub(crate) fn duplicate_order_values(records: &[CaseRecord]) -> usize {
    let mut orders: Vec<f64> = records.iter().map(|r| r.order).collect();
    orders.sort_by(f64::total_cmp);

    let mut duplicates = 0;
    let mut i = 0;
    while i < orders.len() {
        let mut j = i + 1;
        while j < orders.len() && orders[j] == orders[i] {
            j += 1;
        }
        if j - i > 1 {
            duplicates += 1;
        }
        i = j;
    }
    duplicates
}

// ------------------------------------------------------------------------------------------------
// Group partition
// ------------------------------------------------------------------------------------------------

/// One snapshot of case records, partitioned by group id.
pub(crate) struct SequenceGroups {
    groups: BTreeMap<i64, Vec<CaseRecord>>,
}

impl SequenceGroups {
    /// Partitions a snapshot into groups keyed by [`group_id`].
    ///
    /// Records keep their snapshot order within each bucket; sorting
    /// happens lazily in [`take_ordered`](Self::take_ordered) for the one
    /// group actually requested.
    pub(crate) fn partition(records: impl IntoIterator<Item = CaseRecord>) -> Self {
        let mut groups: BTreeMap<i64, Vec<CaseRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(group_id(record.order)).or_default().push(record);
        }
        trace!(group_count = groups.len(), "partitioned case snapshot");
        Self { groups }
    }

    /// Group ids present in this snapshot, ascending.
    pub(crate) fn group_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.groups.keys().copied()
    }

    /// `(group id, case count)` per group, ascending by group id.
    pub(crate) fn group_sizes(&self) -> impl Iterator<Item = (i64, usize)> + '_ {
        self.groups.iter().map(|(id, records)| (*id, records.len()))
    }

    /// Number of non-empty groups in the snapshot.
    pub(crate) fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Removes group `group` and returns its records sorted ascending by
    /// full order value; ties fall back to registration sequence, so equal
    /// orders replay in the order they were registered.
    ///
    /// A group id with no registered cases yields an empty vector.
    pub(crate) fn take_ordered(&mut self, group: i64) -> Vec<CaseRecord> {
        let mut records = self.groups.remove(&group).unwrap_or_default();
        records.sort_by(|a, b| a.order.total_cmp(&b.order).then(a.seq.cmp(&b.seq)));
        records
    }
}
