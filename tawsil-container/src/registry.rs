//! Service registry — registration records and their dependency metadata.
//!
//! The registry keeps two tables keyed by [`ServiceId`]:
//! - the [`RegistrationRecord`] (kind + how to produce the service)
//! - the ordered constructor-argument list captured at registration time
//!
//! Registering an identifier again replaces both entries (last write wins).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::Instance;
use crate::error::{BoxError, Result};
use crate::identifier::{ConstructorArgument, ServiceId};
use crate::injectable::{Arguments, Injectable, dependencies_of};
use crate::kind::RegistrationKind;

/// Zero-argument factory that fully owns construction.
pub(crate) type FactoryFn = Arc<dyn Fn() -> std::result::Result<Instance, BoxError> + Send + Sync>;

/// Builds an instance from resolved positional arguments.
pub(crate) type ConstructFn = Arc<dyn Fn(&Arguments) -> Result<Instance> + Send + Sync>;

/// How an implementation-backed service is built.
///
/// The strategy is fixed when the service is registered.
#[derive(Clone)]
pub(crate) enum Implementation {
    /// A type implementing [`Injectable`].
    Constructible(ConstructFn),
    /// A plain function over the resolved arguments.
    Callable(ConstructFn),
}

impl Implementation {
    /// The constructible strategy for `T`.
    pub(crate) fn constructible<T: Injectable>() -> Self {
        Implementation::Constructible(Arc::new(|args: &Arguments| -> Result<Instance> {
            Ok(Arc::new(T::construct(args)?) as Instance)
        }))
    }

    /// The callable strategy for `f`.
    pub(crate) fn callable<T, F>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
    {
        Implementation::Callable(Arc::new(move |args: &Arguments| -> Result<Instance> {
            Ok(Arc::new(f(args)?) as Instance)
        }))
    }

    pub(crate) fn construct(&self, args: &Arguments) -> Result<Instance> {
        match self {
            Implementation::Constructible(construct) | Implementation::Callable(construct) => {
                construct(args)
            }
        }
    }

    pub(crate) fn strategy(&self) -> &'static str {
        match self {
            Implementation::Constructible(_) => "constructible",
            Implementation::Callable(_) => "callable",
        }
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Implementation::{}", self.strategy())
    }
}

/// Options for registering one service.
///
/// Supply a factory, an implementation, or both; a factory always takes
/// precedence. With neither, the registration is stored but resolving it
/// fails with [`DiError::NoImplementation`](crate::error::DiError::NoImplementation).
///
/// # Examples
/// ```
/// use tawsil_container::prelude::*;
///
/// struct Greeter { name: String }
///
/// let container = Container::new();
/// container.register_transient(
///     Registration::new("IGreeter")
///         .callable(|_args| Ok(Greeter { name: "world".into() })),
/// )?;
///
/// assert_eq!(container.get::<Greeter>("IGreeter")?.name, "world");
/// # Ok::<(), DiError>(())
/// ```
pub struct Registration {
    identifier: ServiceId,
    factory: Option<FactoryFn>,
    implementation: Option<Implementation>,
    attached: Option<Vec<ConstructorArgument>>,
    explicit: Option<Vec<ConstructorArgument>>,
}

impl Registration {
    pub fn new(identifier: impl Into<ServiceId>) -> Self {
        Self {
            identifier: identifier.into(),
            factory: None,
            implementation: None,
            attached: None,
            explicit: None,
        }
    }

    /// Produces the service with a zero-argument factory.
    pub fn factory<T, E, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        E: Into<BoxError>,
        F: Fn() -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(move || -> std::result::Result<Instance, BoxError> {
            factory()
                .map(|value| Arc::new(value) as Instance)
                .map_err(Into::into)
        }));
        self
    }

    /// Constructs `T`, capturing [`Injectable::DEPENDENCIES`] as its metadata.
    pub fn implementation<T: Injectable>(mut self) -> Self {
        self.implementation = Some(Implementation::constructible::<T>());
        self.attached = Some(dependencies_of::<T>());
        self
    }

    /// Builds the service by calling `f` with the resolved arguments.
    ///
    /// The callable carries no metadata of its own; pair it with
    /// [`dependencies`](Self::dependencies).
    pub fn callable<T, F>(mut self, f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
    {
        self.implementation = Some(Implementation::callable(f));
        self.attached = None;
        self
    }

    /// Supplies the constructor-argument list by hand.
    ///
    /// Takes precedence over metadata attached to the implementation.
    pub fn dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<ServiceId>,
    {
        self.explicit = Some(
            dependencies
                .into_iter()
                .map(|dependency| dependency.map(Into::into))
                .collect(),
        );
        self
    }

    pub fn identifier(&self) -> &ServiceId {
        &self.identifier
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("identifier", &self.identifier)
            .field("factory", &self.factory.is_some())
            .field("implementation", &self.implementation)
            .field("dependencies", &self.explicit.as_ref().or(self.attached.as_ref()))
            .finish()
    }
}

/// How a registered service is produced.
#[derive(Clone)]
pub(crate) enum ServiceSource {
    Factory(FactoryFn),
    Implementation(Option<Implementation>),
}

/// Stored registration for one identifier.
pub(crate) struct RegistrationRecord {
    pub identifier: ServiceId,
    pub kind: RegistrationKind,
    pub source: ServiceSource,
}

impl fmt::Debug for RegistrationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            ServiceSource::Factory(_) => "factory",
            ServiceSource::Implementation(Some(implementation)) => implementation.strategy(),
            ServiceSource::Implementation(None) => "none",
        };
        f.debug_struct("RegistrationRecord")
            .field("identifier", &self.identifier)
            .field("kind", &self.kind)
            .field("source", &source)
            .finish()
    }
}

/// Stores all registrations of a container.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    records: HashMap<ServiceId, Arc<RegistrationRecord>>,
    constructor_arguments: HashMap<ServiceId, Arc<[ConstructorArgument]>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a registration, replacing any previous one for the identifier.
    ///
    /// The constructor-argument list is taken from the implementation
    /// (hand-supplied list first, then attached metadata); without an
    /// implementation an empty list is recorded.
    ///
    /// Returns the displaced record, if any.
    pub fn register(
        &mut self,
        kind: RegistrationKind,
        registration: Registration,
    ) -> Option<Arc<RegistrationRecord>> {
        let Registration {
            identifier,
            factory,
            implementation,
            attached,
            explicit,
        } = registration;

        let arguments: Vec<ConstructorArgument> = if implementation.is_some() {
            explicit.or(attached).unwrap_or_default()
        } else {
            Vec::new()
        };

        let source = match factory {
            Some(factory) => ServiceSource::Factory(factory),
            None => ServiceSource::Implementation(implementation),
        };

        let record = RegistrationRecord {
            identifier: identifier.clone(),
            kind,
            source,
        };

        debug!(
            identifier = %identifier,
            kind = %kind,
            source = ?record,
            arguments = arguments.len(),
            "Registered service"
        );

        self.constructor_arguments
            .insert(identifier.clone(), Arc::from(arguments));
        let previous = self.records.insert(identifier, Arc::new(record));
        if let Some(previous) = &previous {
            debug!(identifier = %previous.identifier, "Overwrote existing registration");
        }
        previous
    }

    /// Looks up a registration record.
    pub fn record(&self, identifier: &str) -> Option<Arc<RegistrationRecord>> {
        trace!(identifier, "Registry lookup");
        self.records.get(identifier).cloned()
    }

    /// The constructor-argument list recorded for `identifier`.
    pub fn constructor_arguments(&self, identifier: &str) -> Option<Arc<[ConstructorArgument]>> {
        self.constructor_arguments.get(identifier).cloned()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.records.contains_key(identifier)
    }

    /// Returns the number of registered services.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<ServiceId> {
        let mut identifiers: Vec<ServiceId> = self.records.keys().cloned().collect();
        identifiers.sort();
        identifiers
    }

    /// All records (for diagnostics).
    pub fn records(&self) -> impl Iterator<Item = &Arc<RegistrationRecord>> {
        self.records.values()
    }

    #[cfg(test)]
    pub fn forget_constructor_arguments(&mut self, identifier: &str) {
        self.constructor_arguments.remove(identifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Database;

    impl Injectable for Database {
        const DEPENDENCIES: &'static [Option<&'static str>] = &[Some("IConfig"), None];

        fn construct(_args: &Arguments) -> Result<Self> {
            Ok(Database)
        }
    }

    fn arguments_of(registry: &Registry, identifier: &str) -> Vec<ConstructorArgument> {
        registry
            .constructor_arguments(identifier)
            .map(|args| args.to_vec())
            .unwrap()
    }

    #[test]
    fn register_and_get() {
        let mut reg = Registry::new();
        reg.register(
            RegistrationKind::Singleton,
            Registration::new("IDatabase").implementation::<Database>(),
        );

        let record = reg.record("IDatabase").unwrap();
        assert_eq!(record.kind, RegistrationKind::Singleton);
        assert!(matches!(
            record.source,
            ServiceSource::Implementation(Some(Implementation::Constructible(_)))
        ));
        assert!(reg.contains("IDatabase"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn attached_metadata_is_captured() {
        let mut reg = Registry::new();
        reg.register(
            RegistrationKind::Transient,
            Registration::new("IDatabase").implementation::<Database>(),
        );

        assert_eq!(
            arguments_of(&reg, "IDatabase"),
            vec![Some(ServiceId::from("IConfig")), None]
        );
    }

    #[test]
    fn explicit_metadata_wins() {
        let mut reg = Registry::new();
        reg.register(
            RegistrationKind::Transient,
            Registration::new("IDatabase")
                .dependencies([Some("IOther")])
                .implementation::<Database>(),
        );

        assert_eq!(
            arguments_of(&reg, "IDatabase"),
            vec![Some(ServiceId::from("IOther"))]
        );
    }

    #[test]
    fn factory_takes_precedence() {
        let mut reg = Registry::new();
        reg.register(
            RegistrationKind::Singleton,
            Registration::new("IDatabase")
                .implementation::<Database>()
                .factory(|| Ok::<_, BoxError>(Database)),
        );

        let record = reg.record("IDatabase").unwrap();
        assert!(matches!(record.source, ServiceSource::Factory(_)));
    }

    #[test]
    fn no_implementation_records_empty_arguments() {
        let mut reg = Registry::new();
        reg.register(
            RegistrationKind::Transient,
            Registration::new("IGhost").dependencies([Some("IConfig")]),
        );

        assert!(arguments_of(&reg, "IGhost").is_empty());
        assert!(matches!(
            reg.record("IGhost").unwrap().source,
            ServiceSource::Implementation(None)
        ));
    }

    #[test]
    fn reregistration_overwrites() {
        let mut reg = Registry::new();
        reg.register(
            RegistrationKind::Singleton,
            Registration::new("IDatabase").implementation::<Database>(),
        );
        let previous = reg.register(
            RegistrationKind::Transient,
            Registration::new("IDatabase").factory(|| Ok::<_, BoxError>(Database)),
        );

        assert_eq!(previous.unwrap().kind, RegistrationKind::Singleton);

        let record = reg.record("IDatabase").unwrap();
        assert_eq!(record.kind, RegistrationKind::Transient);
        assert!(arguments_of(&reg, "IDatabase").is_empty());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn identifiers_are_sorted() {
        let mut reg = Registry::new();
        for id in ["IZeta", "IAlpha", "IMid"] {
            reg.register(RegistrationKind::Transient, Registration::new(id));
        }
        assert_eq!(
            reg.identifiers(),
            vec![ServiceId::from("IAlpha"), ServiceId::from("IMid"), ServiceId::from("IZeta")]
        );
    }
}
