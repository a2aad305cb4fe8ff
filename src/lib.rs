//! # ordotest
//!
//! A registry-driven engine for **ordered test cases**: declare named
//! cases with fractional order values, discover them grouped by the
//! integral part of that value, and invoke each one against a freshly
//! constructed owner instance.
//!
//! ## Quick Start
//!
//! ```rust
//! use ordotest::{Registry, Suite};
//!
//! #[derive(Default)]
//! struct Checkout {
//!     items: u32,
//! }
//!
//! impl Checkout {
//!     fn add_item(&mut self) {
//!         self.items += 1;
//!     }
//!
//!     fn review_empty_cart(&mut self) {
//!         assert_eq!(self.items, 0);
//!     }
//! }
//!
//! let registry = Registry::new();
//!
//! Suite::<Checkout>::new()
//!     .case("add_item", 1.1, Checkout::add_item)
//!     .case("review_empty_cart", 1.2, Checkout::review_empty_cart)
//!     .register(&registry)
//!     .unwrap();
//!
//! // Discovery: group 1 holds both cases, sorted by order value.
//! let names: Vec<_> = registry
//!     .ordered_tests(1)
//!     .map(|case| case.name().to_owned())
//!     .collect();
//! assert_eq!(names, ["add_item", "review_empty_cart"]);
//!
//! // Invocation: every case constructs its own fresh `Checkout`, so
//! // `review_empty_cart` still sees zero items after `add_item` ran.
//! for case in registry.ordered_tests(1) {
//!     case.invoke().unwrap();
//! }
//! ```
//!
//! ## Features
//!
//! - **Fractional ordering** — order `1.11` runs after `1.1` and before `1.2`;
//!   the whole part selects the group, the full value sorts within it.
//! - **Ephemeral discovery** — every request re-scans the registry; nothing
//!   is cached between emissions, so late registrations show up immediately.
//! - **Fresh owner per invocation** — each case constructs, uses and drops its
//!   own instance; no state leaks between cases or repeated runs.
//! - **Deferred failure** — a broken owner factory surfaces when the case is
//!   invoked, attributed to that case alone; discovery itself never fails.
//! - **Runner-agnostic** — emitted cases are plain values, driven from any
//!   `#[test]` function or custom harness.

#![allow(dead_code)]

pub(crate) mod emitter;
pub(crate) mod invoke;
pub(crate) mod registry;
pub(crate) mod sequence;

pub use emitter::OrderedTests;
pub use invoke::{CaseError, ConstructionError, InvocationError, InvokeError, TestCase};
pub use registry::{Registry, RegistryError, RegistryStats, Suite};

/// Emits the ordered cases of `group` from the process-wide registry.
///
/// Convenience for `Registry::global().ordered_tests(group)`; see
/// [`Registry::ordered_tests`] for the full contract.
pub fn ordered_tests(group: i64) -> OrderedTests {
    Registry::global().ordered_tests(group)
}

/// Sorted ids of every group present in the process-wide registry.
pub fn group_ids() -> Vec<i64> {
    Registry::global().group_ids()
}
