//! # The Container — heart of Tawsil
//!
//! A runtime registry that maps service identifiers to implementations and
//! produces fully-wired instances on demand.
//!
//! # Architecture
//! ```text
//!  register_*()  ──>  Registry (records + constructor arguments)
//!                           │
//!  get(id)  ──>  construct_instance(id, parent chain)
//!                           │  recurses into dependencies,
//!                           │  substitutes lazy references for
//!                           │  services already in the chain
//!                           ▼
//!                    InstanceCache (singletons)
//! ```
//!
//! # Examples
//! ```rust
//! use tawsil_container::prelude::*;
//!
//! struct ConsoleLogger;
//!
//! struct UserService {
//!     logger: Injected<ConsoleLogger>,
//! }
//!
//! impl Injectable for UserService {
//!     const DEPENDENCIES: &'static [Option<&'static str>] = &[Some("ILogger")];
//!
//!     fn construct(args: &Arguments) -> Result<Self> {
//!         Ok(UserService { logger: args.inject(0)? })
//!     }
//! }
//!
//! let container = Container::new();
//! container.singleton_factory("ILogger", || Ok::<_, BoxError>(ConsoleLogger))?;
//! container.transient::<UserService>("IUserService")?;
//!
//! let service = container.get::<UserService>("IUserService")?;
//! assert!(service.logger.is_bound());
//! # Ok::<(), DiError>(())
//! ```

use std::any::type_name;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::ReentrantMutex;
use tawsil_support::rendering::suggest_similar;
use tracing::{debug, instrument, trace};

use crate::cache::{Instance, InstanceCache};
use crate::error::{BoxError, DiError, NotRegisteredError, Result};
use crate::graph::{GraphInspector, GraphReport};
use crate::identifier::{ConstructorArgument, ServiceId};
use crate::injectable::{Argument, Arguments, Injectable};
use crate::kind::RegistrationKind;
use crate::lazy::LazyRef;
use crate::provider::Provider;
use crate::registry::{Registration, RegistrationRecord, Registry, ServiceSource};

/// Maximum number of "did you mean?" suggestions in lookup errors.
const MAX_SUGGESTIONS: usize = 3;

static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(Container::new);

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

struct ContainerState {
    registry: Registry,
    instances: InstanceCache,
}

/// A link of the requesting chain: a service under construction and the
/// lazy reference handed to dependents that need it back.
#[derive(Clone)]
struct ParentLink {
    identifier: ServiceId,
    lazy: LazyRef,
}

/// Dependency injection container keyed by [`ServiceId`].
///
/// All state sits behind one re-entrant lock. A top-level [`get`](Self::get)
/// holds it for the whole construction, so a singleton is built at most once
/// even with concurrent callers, while factories and constructors may still
/// call back into the same container from the same thread.
///
/// A factory that hands work to another thread which calls back into the
/// same container, and then waits for it, deadlocks.
pub struct Container {
    state: ReentrantMutex<RefCell<ContainerState>>,
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(ContainerState {
                registry: Registry::new(),
                instances: InstanceCache::new(),
            })),
        }
    }

    /// The process-wide default container.
    ///
    /// Created on first access and kept for the life of the process.
    /// Prefer passing a container explicitly; this exists for modules that
    /// want an ambient registry.
    pub fn global() -> &'static Container {
        &GLOBAL_CONTAINER
    }

    // ── Registration ──

    /// Stores a registration of the given kind.
    ///
    /// Re-registering an identifier replaces its record and its
    /// constructor-argument list. An already cached singleton instance is
    /// kept and keeps being returned.
    pub fn register(&self, kind: RegistrationKind, registration: Registration) {
        let previous = self.with_state_mut(|state| state.registry.register(kind, registration));
        // Dropped outside the borrow: captured values may run arbitrary Drop code
        drop(previous);
    }

    /// Registers a service constructed at most once.
    ///
    /// # Errors
    /// [`DiError::MissingIdentifier`] if the identifier is empty.
    pub fn register_singleton(&self, registration: Registration) -> Result<()> {
        self.register_checked(RegistrationKind::Singleton, registration)
    }

    /// Registers a service constructed on every request.
    ///
    /// # Errors
    /// [`DiError::MissingIdentifier`] if the identifier is empty.
    pub fn register_transient(&self, registration: Registration) -> Result<()> {
        self.register_checked(RegistrationKind::Transient, registration)
    }

    /// Registers `T` as a singleton constructed from its declared dependencies.
    pub fn singleton<T: Injectable>(&self, identifier: impl Into<ServiceId>) -> Result<()> {
        self.register_singleton(Registration::new(identifier).implementation::<T>())
    }

    /// Registers `T` as a transient constructed from its declared dependencies.
    pub fn transient<T: Injectable>(&self, identifier: impl Into<ServiceId>) -> Result<()> {
        self.register_transient(Registration::new(identifier).implementation::<T>())
    }

    /// Registers a singleton produced by a zero-argument factory.
    pub fn singleton_factory<T, E, F>(&self, identifier: impl Into<ServiceId>, factory: F) -> Result<()>
    where
        T: Send + Sync + 'static,
        E: Into<BoxError>,
        F: Fn() -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        self.register_singleton(Registration::new(identifier).factory(factory))
    }

    /// Registers a transient produced by a zero-argument factory.
    pub fn transient_factory<T, E, F>(&self, identifier: impl Into<ServiceId>, factory: F) -> Result<()>
    where
        T: Send + Sync + 'static,
        E: Into<BoxError>,
        F: Fn() -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        self.register_transient(Registration::new(identifier).factory(factory))
    }

    /// Registers every service of a [`Provider`].
    pub fn add_provider(&self, provider: &dyn Provider) -> Result<()> {
        debug!(provider = provider.name(), "Adding provider");
        provider.register(self)
    }

    /// Returns `true` if a registration exists for `identifier`.
    pub fn has(&self, identifier: impl AsRef<str>) -> bool {
        self.with_state(|state| state.registry.contains(identifier.as_ref()))
    }

    /// Returns the number of registered services.
    pub fn len(&self) -> usize {
        self.with_state(|state| state.registry.len())
    }

    pub fn is_empty(&self) -> bool {
        self.with_state(|state| state.registry.is_empty())
    }

    /// Registered identifiers, sorted.
    pub fn registered_identifiers(&self) -> Vec<ServiceId> {
        self.with_state(|state| state.registry.identifiers())
    }

    // ── Instance cache ──

    /// The cached instance for `identifier`, if any. Never constructs.
    pub fn get_instance(&self, identifier: impl AsRef<str>) -> Option<Instance> {
        self.with_state(|state| state.instances.get(identifier.as_ref()))
    }

    /// Caches `instance` under `identifier`, overwriting any previous one,
    /// and returns it.
    pub fn set_instance(&self, identifier: impl Into<ServiceId>, instance: Instance) -> Instance {
        let identifier = identifier.into();
        let previous =
            self.with_state_mut(|state| state.instances.insert(identifier, instance.clone()));
        drop(previous);
        instance
    }

    /// Returns `true` if [`get_instance`](Self::get_instance) would return a value.
    pub fn has_instance(&self, identifier: impl AsRef<str>) -> bool {
        self.with_state(|state| state.instances.contains(identifier.as_ref()))
    }

    // ── Resolution ──

    /// Produces (or fetches) the service registered under `identifier`.
    ///
    /// ```rust,ignore
    /// let db: Arc<Database> = container.get("IDatabase")?;
    /// ```
    ///
    /// # Errors
    /// - [`DiError::MissingIdentifier`] for an empty identifier
    /// - [`DiError::TypeMismatch`] when the service is not a `T`
    /// - any construction error of the service or its dependencies
    pub fn get<T: Send + Sync + 'static>(&self, identifier: impl Into<ServiceId>) -> Result<Arc<T>> {
        let identifier = identifier.into();
        let instance = self.get_erased(identifier.clone())?;

        instance
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch {
                identifier,
                expected: type_name::<T>(),
            })
    }

    /// Type-erased [`get`](Self::get).
    pub fn get_erased(&self, identifier: impl Into<ServiceId>) -> Result<Instance> {
        let identifier = identifier.into();
        if identifier.is_empty() {
            return Err(DiError::MissingIdentifier { operation: "get" });
        }
        self.resolve_root(&identifier)
    }

    /// Checks the dependency graph without constructing anything.
    ///
    /// # Errors
    /// [`DiError::NotRegistered`] for the first unregistered dependency.
    pub fn validate(&self) -> Result<GraphReport> {
        let edges = self.with_state(|state| {
            state
                .registry
                .records()
                .map(|record| {
                    let dependencies = match &record.source {
                        ServiceSource::Implementation(Some(_)) => state
                            .registry
                            .constructor_arguments(record.identifier.as_str())
                            .map(|arguments| arguments.iter().flatten().cloned().collect())
                            .unwrap_or_default(),
                        _ => Vec::new(),
                    };
                    (record.identifier.clone(), dependencies)
                })
                .collect::<BTreeMap<_, _>>()
        });

        GraphInspector::new(edges).inspect()
    }

    // ── Internal ──

    fn register_checked(&self, kind: RegistrationKind, registration: Registration) -> Result<()> {
        if registration.identifier().is_empty() {
            return Err(DiError::MissingIdentifier { operation: "register" });
        }
        self.register(kind, registration);
        Ok(())
    }

    #[instrument(skip(self), name = "container_get")]
    fn resolve_root(&self, identifier: &ServiceId) -> Result<Instance> {
        // Held across the whole graph: check-cache / construct / cache-write is atomic
        let _guard = self.state.lock();
        self.construct_instance(identifier, &[])
    }

    /// Produces an instance of `identifier`, recursing into its dependencies.
    fn construct_instance(
        &self,
        identifier: &ServiceId,
        parent_chain: &[ParentLink],
    ) -> Result<Instance> {
        let record = self.registration_record(identifier, parent_chain)?;

        if record.kind.is_cached() {
            if let Some(instance) = self.get_instance(identifier) {
                trace!(identifier = %identifier, "Returning cached singleton");
                return Ok(instance);
            }
        }

        let me = ParentLink {
            identifier: identifier.clone(),
            lazy: LazyRef::pending(identifier.clone()),
        };

        let instance = match &record.source {
            ServiceSource::Factory(factory) => {
                trace!(identifier = %identifier, "Invoking custom factory");
                factory().map_err(|source| DiError::FactoryFailed {
                    identifier: identifier.clone(),
                    source,
                })?
            }
            ServiceSource::Implementation(implementation) => {
                let arguments = self
                    .with_state(|state| state.registry.constructor_arguments(identifier.as_str()))
                    .ok_or_else(|| DiError::MissingConstructorArguments {
                        identifier: identifier.clone(),
                    })?;

                let implementation =
                    implementation
                        .as_ref()
                        .ok_or_else(|| DiError::NoImplementation {
                            identifier: identifier.clone(),
                        })?;

                let values = self.resolve_arguments(&me, &arguments, parent_chain)?;

                trace!(
                    identifier = %identifier,
                    strategy = implementation.strategy(),
                    arguments = values.len(),
                    "Constructing implementation"
                );
                implementation.construct(&Arguments::new(identifier.clone(), values))?
            }
        };

        // Dependents that received `me.lazy` now see the finished instance
        me.lazy.bind(&instance);

        if record.kind.is_cached() {
            Ok(self.set_instance(identifier.clone(), instance))
        } else {
            Ok(instance)
        }
    }

    /// Resolves the positional arguments of `me`, strictly in order.
    fn resolve_arguments(
        &self,
        me: &ParentLink,
        arguments: &[ConstructorArgument],
        parent_chain: &[ParentLink],
    ) -> Result<Vec<Argument>> {
        let mut child_chain: Option<Vec<ParentLink>> = None;
        let mut values = Vec::with_capacity(arguments.len());

        for argument in arguments {
            let Some(dependency) = argument else {
                values.push(Argument::Absent);
                continue;
            };

            if let Some(parent) = parent_chain
                .iter()
                .find(|parent| &parent.identifier == dependency)
            {
                trace!(
                    identifier = %me.identifier,
                    dependency = %dependency,
                    "Dependency is under construction, injecting lazy reference"
                );
                values.push(Argument::Service(parent.lazy.clone()));
                continue;
            }

            let chain = child_chain.get_or_insert_with(|| {
                let mut chain = parent_chain.to_vec();
                chain.push(me.clone());
                chain
            });

            let instance = self.construct_instance(dependency, chain)?;
            values.push(Argument::Service(LazyRef::bound(dependency.clone(), instance)));
        }

        Ok(values)
    }

    fn registration_record(
        &self,
        identifier: &ServiceId,
        parent_chain: &[ParentLink],
    ) -> Result<Arc<RegistrationRecord>> {
        self.with_state(|state| state.registry.record(identifier.as_str()))
            .ok_or_else(|| self.not_registered(identifier, parent_chain))
    }

    fn not_registered(&self, identifier: &ServiceId, parent_chain: &[ParentLink]) -> DiError {
        let suggestions = self.with_state(|state| {
            let registered = state.registry.identifiers();
            let available: Vec<&str> = registered.iter().map(ServiceId::as_str).collect();
            suggest_similar(identifier.as_str(), &available, MAX_SUGGESTIONS)
        });

        DiError::NotRegistered(NotRegisteredError {
            identifier: identifier.clone(),
            required_by: parent_chain
                .iter()
                .map(|parent| parent.identifier.clone())
                .collect(),
            suggestions,
        })
    }

    fn with_state<R>(&self, f: impl FnOnce(&ContainerState) -> R) -> R {
        let guard = self.state.lock();
        let state = guard.borrow();
        f(&state)
    }

    fn with_state_mut<R>(&self, f: impl FnOnce(&mut ContainerState) -> R) -> R {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        f(&mut state)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (registered, cached) =
            self.with_state(|state| (state.registry.len(), state.instances.len()));
        f.debug_struct("Container")
            .field("registered", &registered)
            .field("cached", &cached)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::Container;
    pub use crate::cache::Instance;
    pub use crate::error::{BoxError, DiError, Result};
    pub use crate::graph::GraphReport;
    pub use crate::identifier::{ConstructorArgument, ServiceId};
    pub use crate::injectable::{Argument, Arguments, FromArgument, Injectable};
    pub use crate::kind::RegistrationKind;
    pub use crate::lazy::{Injected, LazyRef};
    pub use crate::provider::Provider;
    pub use crate::registry::Registration;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
