//! # Dynamic Invocation Module
//!
//! Turns a registered `{factory, method}` pair into a **deferred,
//! zero-argument callable**: nothing is constructed when a binding is
//! created or when a [`TestCase`] is emitted — the owner instance comes
//! into existence only inside [`TestCase::invoke`], is handed to the case
//! body, and is dropped before `invoke` returns.
//!
//! ## Isolation
//!
//! Every invocation runs the factory again, so two cases can never share
//! an owner instance — not within a group, not across groups, and not
//! across repeated invocations of the same case. A case body that mutates
//! its owner leaves nothing behind for the next case to observe.
//!
//! ## Failure model
//!
//! All failure in this crate is concentrated here:
//!
//! - [`ConstructionError`] — the owner factory failed. Raised only from
//!   `invoke`, never while bindings are created or cases are emitted.
//! - [`InvocationError`] — the case body returned an error. The original
//!   error is carried through untouched; `Display` and `source` both
//!   delegate to it.
//! - Panics in a case body are **not** caught. They unwind straight
//!   through `invoke` to the caller.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------


// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::trace;

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Boxed error returned by a fallible case body.
///
/// Whatever concrete error the body produces is moved into the box and
/// travels through [`InvokeError::Invocation`] without being inspected,
/// rewrapped, or reworded.
pub type CaseError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The owner factory failed to produce an instance.
///
/// Surfaced only when [`TestCase::invoke`] runs; producing the case list
/// never constructs anything and therefore never raises this.
#[derive(Debug, Clone, Error)]
#[error("cannot construct owner `{owner}`: {reason}")]
pub struct ConstructionError {
    owner: &'static str,
    reason: String,
}

impl ConstructionError {
    /// Creates a construction failure for owner type `T`.
    pub fn new<T>(reason: impl Into<String>) -> Self {
        Self {
            owner: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    /// The owner type that could not be constructed.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Human-readable reason supplied by the factory.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// An error raised by the case body itself, propagated verbatim.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InvocationError(#[from] CaseError);

impl InvocationError {
    /// Borrows the original error produced by the case body.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_ref()
    }

    /// Unwraps back into the original boxed error.
    pub fn into_inner(self) -> CaseError {
        self.0
    }
}

/// Errors that can occur while invoking a single [`TestCase`].
///
/// Each value is attributed to exactly one case; a failed case has no
/// effect on any other case because no state is shared between them.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The owner instance could not be constructed; the case body never ran.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// The case body ran and failed.
    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

// ------------------------------------------------------------------------------------------------
// Case binding
// ------------------------------------------------------------------------------------------------

type BindingFn = dyn Fn() -> Result<(), InvokeError> + Send + Sync;

/// A deferred `construct → call → drop` unit, type-erased over the owner.
///
/// Cloning is cheap (`Arc`); clones share the recipe, never an instance.
#[derive(Clone)]
pub(crate) struct CaseBinding {
    run: Arc<BindingFn>,
}

impl CaseBinding {
    /// Composes an owner factory and a case body into a single deferred
    /// callable.
    ///
    /// The factory runs on **every** call, producing a brand-new owner
    /// for the body to mutate; the owner is dropped before the call
    /// returns. Neither closure runs here.
    pub(crate) fn bind<T, F, M>(factory: F, method: M) -> Self
    where
        T: 'static,
        F: Fn() -> Result<T, ConstructionError> + Send + Sync + 'static,
        M: Fn(&mut T) -> Result<(), CaseError> + Send + Sync + 'static,
    {
        let owner_type = std::any::type_name::<T>();
        let run = move || -> Result<(), InvokeError> {
            trace!(owner = owner_type, "constructing fresh owner instance");
            let mut owner = factory()?;
            method(&mut owner).map_err(InvocationError::from)?;
            Ok(())
            // `owner` dropped here; nothing survives into the next call.
        };
        Self { run: Arc::new(run) }
    }

    /// Runs the binding once: fresh construction, then the case body.
    pub(crate) fn call(&self) -> Result<(), InvokeError> {
        (self.run)()
    }
}

impl fmt::Debug for CaseBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseBinding").finish_non_exhaustive()
    }
}

// ------------------------------------------------------------------------------------------------
// Test case
// ------------------------------------------------------------------------------------------------

/// One named, runnable test case handed to the external runner.
///
/// `invoke` may be called any number of times; each call constructs a
/// fresh owner instance, so repeated runs start from the same
/// construction-default state.
pub struct TestCase {
    name: String,
    owner: &'static str,
    binding: CaseBinding,
}

impl TestCase {
    pub(crate) fn new(name: String, owner: &'static str, binding: CaseBinding) -> Self {
        Self {
            name,
            owner,
            binding,
        }
    }

    /// The declared case name, used by the runner for identification.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type name of the owner constructed for each invocation.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Constructs a fresh owner instance and runs the case body on it.
    ///
    /// # Errors
    ///
    /// - [`InvokeError::Construction`] if the owner factory fails.
    /// - [`InvokeError::Invocation`] carrying the body's own error.
    ///
    /// Panics raised by the case body unwind through this call unchanged.
    pub fn invoke(&self) -> Result<(), InvokeError> {
        trace!(case = %self.name, owner = self.owner, "invoking case");
        self.binding.call()
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
