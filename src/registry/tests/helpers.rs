use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use crate::registry::{Registry, Suite};

/// Initialize tracing subscriber controlled by `RUST_LOG` env var.
/// Safe to call multiple times — only the first call takes effect.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Shared, thread-safe log of case names in invocation order.
pub type RunLog = Arc<Mutex<Vec<String>>>;

pub fn run_log() -> RunLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Reads the log back as a plain name list.
pub fn logged(log: &RunLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Fixture owner standing in for a user workflow object.
#[derive(Default)]
pub struct Workflow {
    pub step: u32,
}

/// Registers the reference catalogue used across registry tests.
///
/// Declaration order is deliberately not sorted: group 1 must come back
/// as `b (1.11) → a (1.2) → c (1.3)` and group 2 as `d (2.1)`. Every
/// case appends its own name to `log` when invoked.
pub fn reference_catalogue(registry: &Registry, log: &RunLog) {
    init_tracing();

    let mut suite = Suite::<Workflow>::new();
    for (name, order) in [("a", 1.2), ("b", 1.11), ("c", 1.3), ("d", 2.1)] {
        let log = Arc::clone(log);
        suite = suite.case(name, order, move |_| {
            log.lock().unwrap().push(name.to_string());
        });
    }
    suite.register(registry).expect("register catalogue");
}
