//! # Case Emitter
//!
//! Produces the runnable case list for one group: take a registry
//! snapshot, partition it, sort the requested group, and wrap each record
//! as a [`TestCase`]. The whole pipeline is re-run on every request, so
//! each emission reflects the catalogue as of that instant and holds no
//! registry lock once it returns.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------


// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::fmt;

use tracing::debug;

use crate::invoke::TestCase;
use crate::registry::Registry;
use crate::sequence::SequenceGroups;

// ------------------------------------------------------------------------------------------------
// Emission
// ------------------------------------------------------------------------------------------------

/// Emits the ordered cases of `group` from `registry`.
///
/// Total by construction: a group nobody registered into yields an empty
/// iterator. The records are materialized eagerly (the snapshot already
/// paid for them) but every owner construction stays deferred to
/// [`TestCase::invoke`].
pub(crate) fn emit(registry: &Registry, group: i64) -> OrderedTests {
    let snapshot = registry.snapshot();
    let universe = snapshot.len();

    let mut groups = SequenceGroups::partition(snapshot);
    let cases: Vec<TestCase> = groups
        .take_ordered(group)
        .into_iter()
        .map(|record| TestCase::new(record.name, record.owner, record.binding))
        .collect();

    debug!(group, emitted = cases.len(), universe, "ordered cases emitted");
    OrderedTests {
        cases: cases.into_iter(),
    }
}

// ------------------------------------------------------------------------------------------------
// Iterator
// ------------------------------------------------------------------------------------------------

/// Iterator over the ordered cases of one group.
///
/// Yields [`TestCase`] values in ascending order-value order (ties in
/// registration order). Exhausting, dropping or re-requesting it never
/// touches owner state; instances exist only inside
/// [`TestCase::invoke`].
pub struct OrderedTests {
    cases: std::vec::IntoIter<TestCase>,
}

impl OrderedTests {
    /// Cases not yet yielded.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// `true` once every case has been yielded (or none was emitted).
    pub fn is_empty(&self) -> bool {
        self.cases.len() == 0
    }
}

impl Iterator for OrderedTests {
    type Item = TestCase;

    fn next(&mut self) -> Option<TestCase> {
        self.cases.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cases.size_hint()
    }
}

impl ExactSizeIterator for OrderedTests {}

impl std::iter::FusedIterator for OrderedTests {}

impl fmt::Debug for OrderedTests {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedTests")
            .field("remaining", &self.len())
            .finish()
    }
}
