//! Suite builder, the declaration side of the registry.
//!
//! A [`Suite`] collects the cases of one owner type together with the
//! recipe for constructing that owner, then hands the whole batch to a
//! [`Registry`] in one atomic registration. Declaring a case stores two
//! closures and runs neither.

use std::sync::Arc;

use tracing::debug;

use super::{PreparedCase, Registry, RegistryError};
use crate::invoke::{CaseBinding, CaseError, ConstructionError};

type OwnerFactory<T> = Arc<dyn Fn() -> Result<T, ConstructionError> + Send + Sync>;
type CaseBody<T> = Box<dyn Fn(&mut T) -> Result<(), CaseError> + Send + Sync>;

struct PendingCase<T> {
    name: String,
    order: f64,
    body: CaseBody<T>,
}

/// Builder that declares the ordered cases of one owner type `T`.
///
/// Each declared case pairs a name and an order value with a body that
/// receives `&mut T`. At invocation time every case gets its own fresh
/// `T`, so bodies can mutate freely without leaking state into the next
/// case.
///
/// # Examples
///
/// ```
/// use ordotest::{Registry, Suite};
///
/// #[derive(Default)]
/// struct Cart {
///     items: u32,
/// }
///
/// let registry = Registry::new();
/// Suite::<Cart>::new()
///     .case("add_first_item", 1.1, |cart| cart.items += 1)
///     .case("remove_item", 1.2, |cart| cart.items = cart.items.saturating_sub(1))
///     .register(&registry)?;
///
/// assert_eq!(registry.len(), 2);
/// # Ok::<(), ordotest::RegistryError>(())
/// ```
pub struct Suite<T> {
    owner: &'static str,
    factory: OwnerFactory<T>,
    cases: Vec<PendingCase<T>>,
}

impl<T: Default + 'static> Suite<T> {
    /// Starts a suite whose owner instances come from `T::default()`.
    pub fn new() -> Self {
        Self::with_factory(|| Ok(T::default()))
    }
}

impl<T: Default + 'static> Default for Suite<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Suite<T> {
    /// Starts a suite with an explicit owner factory.
    ///
    /// The factory runs once per invocation of each registered case,
    /// never at declaration or discovery time. A factory that returns an
    /// error makes every case of the suite fail with
    /// [`InvokeError::Construction`](crate::InvokeError::Construction),
    /// while the case list itself stays fully discoverable.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<T, ConstructionError> + Send + Sync + 'static,
    {
        Self {
            owner: std::any::type_name::<T>(),
            factory: Arc::new(factory),
            cases: Vec::new(),
        }
    }

    /// Declares a case whose body cannot fail (other than by panicking).
    pub fn case<M>(mut self, name: impl Into<String>, order: f64, body: M) -> Self
    where
        M: Fn(&mut T) + Send + Sync + 'static,
    {
        self.cases.push(PendingCase {
            name: name.into(),
            order,
            body: Box::new(move |owner| {
                body(owner);
                Ok(())
            }),
        });
        self
    }

    /// Declares a case whose body may fail.
    ///
    /// The returned error reaches the runner untouched inside
    /// [`InvokeError::Invocation`](crate::InvokeError::Invocation).
    pub fn try_case<M>(mut self, name: impl Into<String>, order: f64, body: M) -> Self
    where
        M: Fn(&mut T) -> Result<(), CaseError> + Send + Sync + 'static,
    {
        self.cases.push(PendingCase {
            name: name.into(),
            order,
            body: Box::new(body),
        });
        self
    }

    /// Hands every declared case to `registry` in declaration order.
    ///
    /// Registration is atomic per suite: if any case fails validation the
    /// registry is left exactly as it was.
    ///
    /// # Errors
    ///
    /// See [`RegistryError`] for the validation rules.
    pub fn register(self, registry: &Registry) -> Result<(), RegistryError> {
        let Suite {
            owner,
            factory,
            cases,
        } = self;
        debug!(owner, case_count = cases.len(), "registering suite");

        let prepared = cases
            .into_iter()
            .map(|case| {
                let factory = Arc::clone(&factory);
                PreparedCase {
                    name: case.name,
                    order: case.order,
                    binding: CaseBinding::bind(move || factory(), case.body),
                }
            })
            .collect();
        registry.register_batch(owner, prepared)
    }

    /// Registers the suite into the process-wide [`Registry::global`].
    pub fn register_global(self) -> Result<(), RegistryError> {
        self.register(Registry::global())
    }
}
