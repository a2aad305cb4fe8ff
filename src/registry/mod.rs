//! # Case Registry Module
//!
//! The process-visible catalogue of declared test cases. Owners declare
//! their cases through a [`Suite`] builder; the registry validates and
//! stores one [`CaseRecord`] per case and answers discovery requests with
//! a point-in-time snapshot of everything registered so far.
//!
//! ## Responsibilities
//!
//! - Validate declarations at registration time (non-empty name, finite
//!   order value, no duplicate `owner::name` pair) so that discovery and
//!   emission can never fail.
//! - Assign each case a monotonically increasing registration sequence
//!   number, the tie-breaker for equal order values.
//! - Serve full-catalogue snapshots to the emitter, plus derived views
//!   such as [`group_ids`](Registry::group_ids) and
//!   [`stats`](Registry::stats).
//!
//! ## Not in scope
//!
//! - Ordering and grouping math (see `sequence`).
//! - Constructing owners or running case bodies (see `invoke`).
//!
//! ## Concurrency model
//!
//! A single `RwLock` guards the record list. Registration takes the write
//! lock for a whole suite, so a suite lands atomically; discovery clones
//! the records under the read lock and releases it before any case body
//! can run. A panic inside a case body therefore can never poison the
//! registry.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Submodules
// ------------------------------------------------------------------------------------------------

mod suite;

pub use suite::Suite;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::emitter::OrderedTests;
use crate::invoke::CaseBinding;
use crate::sequence::{self, SequenceGroups};

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors returned when a suite of cases is registered.
///
/// All of these surface at declaration time. Once a case is accepted it
/// can always be discovered, grouped and emitted.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A case was declared with an empty name.
    #[error("case name must not be empty (owner `{owner}`)")]
    EmptyName {
        /// Owner type whose suite carried the unnamed case.
        owner: &'static str,
    },

    /// A case was declared with a NaN or infinite order value.
    #[error("case `{owner}::{name}` has non-finite order value {order}")]
    NonFiniteOrder {
        /// Owner type of the offending case.
        owner: &'static str,
        /// Declared case name.
        name: String,
        /// The rejected order value.
        order: f64,
    },

    /// The same `owner::name` pair was registered twice.
    #[error("case `{owner}::{name}` is already registered")]
    DuplicateCase {
        /// Owner type of the offending case.
        owner: &'static str,
        /// Declared case name.
        name: String,
    },

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

// ------------------------------------------------------------------------------------------------
// Records
// ------------------------------------------------------------------------------------------------

/// One registered case as stored in the catalogue.
#[derive(Clone, Debug)]
pub(crate) struct CaseRecord {
    /// Registration sequence number; breaks ties between equal orders.
    pub(crate) seq: u64,
    /// Declared case name.
    pub(crate) name: String,
    /// Type name of the owner the case runs against.
    pub(crate) owner: &'static str,
    /// Declared order value; finite by construction.
    pub(crate) order: f64,
    /// Deferred `construct → call → drop` unit.
    pub(crate) binding: CaseBinding,
}

/// A validated-but-unstored case handed over by the [`Suite`] builder.
pub(crate) struct PreparedCase {
    pub(crate) name: String,
    pub(crate) order: f64,
    pub(crate) binding: CaseBinding,
}

// ------------------------------------------------------------------------------------------------
// Statistics
// ------------------------------------------------------------------------------------------------

/// Point-in-time registry statistics.
#[derive(Debug, Clone)]
pub struct RegistryStats {
    /// Total number of registered cases.
    pub case_count: usize,
    /// Number of non-empty groups.
    pub group_count: usize,
    /// `(group id, case count)` per group, ascending by group id.
    pub group_sizes: Vec<(i64, usize)>,
    /// Distinct order values shared by more than one case.
    pub duplicate_orders: usize,
}

// ------------------------------------------------------------------------------------------------
// Registry
// ------------------------------------------------------------------------------------------------

struct RegistryInner {
    records: Vec<CaseRecord>,
}

/// Append-only catalogue of registered cases.
///
/// Cheap to create for scoped use in tests; long-lived programs usually
/// share the process-wide instance returned by [`Registry::global`].
pub struct Registry {
    inner: RwLock<RegistryInner>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                records: Vec::new(),
            }),
        }
    }

    /// The process-wide registry, created on first use.
    ///
    /// [`Suite::register_global`](Suite::register_global) and the
    /// crate-level [`ordered_tests`](crate::ordered_tests) /
    /// [`group_ids`](crate::group_ids) helpers all operate on this
    /// instance.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, RegistryInner>, RegistryError> {
        self.inner
            .write()
            .map_err(|_| RegistryError::Internal("RwLock poisoned".to_string()))
    }

    // Reads stay total. Records are pushed fully built, so even a writer
    // that panicked mid-batch cannot have left a torn record behind.
    fn read_lock(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Validates and stores a whole suite under one write lock.
    ///
    /// Either every case in the batch is accepted or none is; a rejected
    /// batch leaves the catalogue untouched.
    pub(crate) fn register_batch(
        &self,
        owner: &'static str,
        cases: Vec<PreparedCase>,
    ) -> Result<(), RegistryError> {
        let mut inner = self.write_lock()?;

        for case in &cases {
            if case.name.is_empty() {
                return Err(RegistryError::EmptyName { owner });
            }
            if !case.order.is_finite() {
                return Err(RegistryError::NonFiniteOrder {
                    owner,
                    name: case.name.clone(),
                    order: case.order,
                });
            }
            let stored = inner
                .records
                .iter()
                .any(|r| r.owner == owner && r.name == case.name);
            let in_batch = cases.iter().filter(|c| c.name == case.name).count() > 1;
            if stored || in_batch {
                return Err(RegistryError::DuplicateCase {
                    owner,
                    name: case.name.clone(),
                });
            }
        }

        for PreparedCase {
            name,
            order,
            binding,
        } in cases
        {
            if inner.records.iter().any(|r| r.order == order) {
                warn!(
                    owner,
                    name = %name,
                    order,
                    "order value already registered; ties replay in registration order"
                );
            }
            let seq = inner.records.len() as u64;
            debug!(
                owner,
                name = %name,
                order,
                group = sequence::group_id(order),
                seq,
                "case registered"
            );
            inner.records.push(CaseRecord {
                seq,
                name,
                owner,
                order,
                binding,
            });
        }
        Ok(())
    }

    /// Clones the full catalogue as of this instant.
    ///
    /// The clone owns its data, so the read lock is released before the
    /// caller sorts, filters or invokes anything.
    pub(crate) fn snapshot(&self) -> Vec<CaseRecord> {
        let inner = self.read_lock();
        trace!(case_count = inner.records.len(), "scanning registry snapshot");
        inner.records.clone()
    }

    /// Number of registered cases.
    pub fn len(&self) -> usize {
        self.read_lock().records.len()
    }

    /// `true` if no case has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted ids of every group with at least one registered case.
    pub fn group_ids(&self) -> Vec<i64> {
        let groups = SequenceGroups::partition(self.snapshot());
        groups.group_ids().collect()
    }

    /// Computes point-in-time statistics over the catalogue.
    pub fn stats(&self) -> RegistryStats {
        let snapshot = self.snapshot();
        let case_count = snapshot.len();
        let duplicate_orders = sequence::duplicate_order_values(&snapshot);
        let groups = SequenceGroups::partition(snapshot);
        RegistryStats {
            case_count,
            group_count: groups.group_count(),
            group_sizes: groups.group_sizes().collect(),
            duplicate_orders,
        }
    }

    /// Emits the cases of `group`, sorted by order value, as fresh
    /// [`TestCase`](crate::TestCase) values.
    ///
    /// Re-scans the catalogue on every call and never fails: an unknown
    /// group id simply yields an empty iterator. Nothing is constructed
    /// or run here; invocation is deferred to each emitted case.
    pub fn ordered_tests(&self, group: i64) -> OrderedTests {
        crate::emitter::emit(self, group)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
