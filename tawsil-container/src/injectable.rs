//! Constructible services and their positional arguments.
//!
//! A type becomes constructible by the container by implementing
//! [`Injectable`]: it declares the ordered identifiers of its constructor
//! parameters and builds itself from the resolved [`Arguments`].
//! `#[derive(Injectable)]` generates both parts from field attributes;
//! writing the impl by hand behaves identically.
//!
//! # Examples
//! ```
//! use tawsil_container::prelude::*;
//!
//! struct Config { url: String }
//!
//! struct Database { config: Injected<Config> }
//!
//! impl Injectable for Database {
//!     const DEPENDENCIES: &'static [Option<&'static str>] = &[Some("IConfig")];
//!
//!     fn construct(args: &Arguments) -> Result<Self> {
//!         Ok(Database { config: args.inject(0)? })
//!     }
//! }
//!
//! let container = Container::new();
//! container.singleton_factory("IConfig", || {
//!     Ok::<_, BoxError>(Config { url: "postgres://localhost".into() })
//! })?;
//! container.singleton::<Database>("IDatabase")?;
//!
//! let db = container.get::<Database>("IDatabase")?;
//! assert_eq!(db.config.get().url, "postgres://localhost");
//! # Ok::<(), DiError>(())
//! ```

use crate::error::{DiError, Result};
use crate::identifier::{ConstructorArgument, ServiceId};
use crate::lazy::{Injected, LazyRef};

/// A type the container can construct from resolved dependencies.
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Identifiers of the constructor parameters, in positional order.
    ///
    /// `None` marks a parameter that is not injected.
    const DEPENDENCIES: &'static [Option<&'static str>];

    /// Builds the service from arguments resolved per [`Self::DEPENDENCIES`].
    fn construct(args: &Arguments) -> Result<Self>;
}

/// Owned form of [`Injectable::DEPENDENCIES`].
pub fn dependencies_of<T: Injectable>() -> Vec<ConstructorArgument> {
    T::DEPENDENCIES
        .iter()
        .map(|dependency| dependency.map(ServiceId::from))
        .collect()
}

/// One resolved constructor parameter.
#[derive(Debug, Clone)]
pub enum Argument {
    /// A resolved dependency, possibly still under construction.
    Service(LazyRef),
    /// A parameter that is not injected.
    Absent,
}

impl Argument {
    pub fn is_absent(&self) -> bool {
        matches!(self, Argument::Absent)
    }
}

/// The positional arguments handed to a constructor.
#[derive(Debug)]
pub struct Arguments {
    owner: ServiceId,
    values: Vec<Argument>,
}

impl Arguments {
    pub(crate) fn new(owner: ServiceId, values: Vec<Argument>) -> Self {
        Self { owner, values }
    }

    /// Identifier of the service being constructed.
    pub fn owner(&self) -> &ServiceId {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw argument at `index`.
    pub fn get(&self, index: usize) -> Result<&Argument> {
        self.values
            .get(index)
            .ok_or_else(|| DiError::ArgumentOutOfRange {
                identifier: self.owner.clone(),
                index,
                len: self.values.len(),
            })
    }

    /// `true` if the parameter at `index` is an absent placeholder or missing.
    pub fn is_absent(&self, index: usize) -> bool {
        self.values.get(index).is_none_or(Argument::is_absent)
    }

    /// Converts the argument at `index` into the parameter type.
    ///
    /// ```rust,ignore
    /// let logger: Injected<ConsoleLogger> = args.inject(0)?;
    /// let metrics: Option<Injected<Metrics>> = args.inject(1)?;
    /// ```
    pub fn inject<F: FromArgument>(&self, index: usize) -> Result<F> {
        F::from_argument(self, index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.values.iter()
    }
}

/// Parameter types a constructor argument converts into.
pub trait FromArgument: Sized {
    fn from_argument(arguments: &Arguments, index: usize) -> Result<Self>;
}

impl<T: Send + Sync + 'static> FromArgument for Injected<T> {
    fn from_argument(arguments: &Arguments, index: usize) -> Result<Self> {
        match arguments.get(index)? {
            Argument::Service(handle) => Injected::from_handle(handle.clone()),
            Argument::Absent => Err(DiError::AbsentArgument {
                identifier: arguments.owner.clone(),
                index,
            }),
        }
    }
}

impl<T: Send + Sync + 'static> FromArgument for Option<Injected<T>> {
    fn from_argument(arguments: &Arguments, index: usize) -> Result<Self> {
        match arguments.get(index)? {
            Argument::Service(handle) => Injected::from_handle(handle.clone()).map(Some),
            Argument::Absent => Ok(None),
        }
    }
}

impl FromArgument for LazyRef {
    fn from_argument(arguments: &Arguments, index: usize) -> Result<Self> {
        match arguments.get(index)? {
            Argument::Service(handle) => Ok(handle.clone()),
            Argument::Absent => Err(DiError::AbsentArgument {
                identifier: arguments.owner.clone(),
                index,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Wheel;

    #[derive(Debug)]
    struct Car {
        front: Injected<Wheel>,
        spare: Option<Injected<Wheel>>,
    }

    impl Injectable for Car {
        const DEPENDENCIES: &'static [Option<&'static str>] = &[Some("IWheel"), None];

        fn construct(args: &Arguments) -> Result<Self> {
            Ok(Car {
                front: args.inject(0)?,
                spare: args.inject(1)?,
            })
        }
    }

    fn wheel_argument() -> Argument {
        Argument::Service(LazyRef::bound(ServiceId::from("IWheel"), Arc::new(Wheel)))
    }

    #[test]
    fn dependencies_keep_order_and_gaps() {
        assert_eq!(
            dependencies_of::<Car>(),
            vec![Some(ServiceId::from("IWheel")), None]
        );
    }

    #[test]
    fn construct_from_arguments() {
        let args = Arguments::new(
            ServiceId::from("ICar"),
            vec![wheel_argument(), Argument::Absent],
        );

        let car = Car::construct(&args).unwrap();
        assert!(car.front.is_bound());
        assert!(car.spare.is_none());
        assert!(args.is_absent(1));
        assert!(!args.is_absent(0));
    }

    #[test]
    fn absent_slot_as_required_dependency_fails() {
        let args = Arguments::new(ServiceId::from("ICar"), vec![Argument::Absent]);
        let err = args.inject::<Injected<Wheel>>(0).unwrap_err();
        assert!(matches!(err, DiError::AbsentArgument { index: 0, .. }));
    }

    #[test]
    fn reading_past_the_end_fails() {
        let args = Arguments::new(ServiceId::from("ICar"), vec![wheel_argument()]);
        let err = Car::construct(&args).unwrap_err();
        assert!(matches!(
            err,
            DiError::ArgumentOutOfRange { index: 1, len: 1, .. }
        ));
        assert!(args.is_absent(5));
    }

    #[test]
    fn raw_handle_argument() {
        let args = Arguments::new(ServiceId::from("ICar"), vec![wheel_argument()]);
        let handle: LazyRef = args.inject(0).unwrap();
        assert_eq!(handle.identifier(), &ServiceId::from("IWheel"));
        assert_eq!(args.owner(), &ServiceId::from("ICar"));
        assert_eq!(args.iter().count(), 1);
    }
}
