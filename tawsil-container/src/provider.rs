//! Provider trait — a module of related service registrations.
//!
//! Providers let a library register the services it needs without the
//! application spelling each one out.
//!
//! # Examples
//! ```rust
//! use tawsil_container::prelude::*;
//!
//! struct Clock;
//! struct StorageProvider;
//!
//! impl Provider for StorageProvider {
//!     fn register(&self, container: &Container) -> Result<()> {
//!         container.singleton_factory("IClock", || Ok::<_, BoxError>(Clock))?;
//!         Ok(())
//!     }
//! }
//!
//! let container = Container::new();
//! container.add_provider(&StorageProvider)?;
//! assert!(container.has("IClock"));
//! # Ok::<(), DiError>(())
//! ```

use crate::container::Container;
use crate::error::Result;

/// A module that registers related services into a container.
///
/// Split registrations by concern and add each provider once:
///
/// ```rust,ignore
/// container.add_provider(&DatabaseProvider)?;
/// container.add_provider(&AuthProvider)?;
/// ```
pub trait Provider: Send + Sync {
    /// Register services into `container`.
    fn register(&self, container: &Container) -> Result<()>;

    /// Optional: human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoxError, DiError};
    use crate::registry::Registration;

    struct Database;

    struct TestProvider;

    impl Provider for TestProvider {
        fn register(&self, container: &Container) -> Result<()> {
            container.singleton_factory("IDatabase", || Ok::<_, BoxError>(Database))?;
            container.transient_factory("IAnswer", || Ok::<_, BoxError>(42i32))?;
            Ok(())
        }
    }

    struct BrokenProvider;

    impl Provider for BrokenProvider {
        fn register(&self, container: &Container) -> Result<()> {
            container.register_singleton(Registration::new(""))
        }
    }

    #[test]
    fn provider_registers_services() {
        let container = Container::new();
        container.add_provider(&TestProvider).unwrap();

        assert_eq!(container.len(), 2);
        assert_eq!(*container.get::<i32>("IAnswer").unwrap(), 42);
    }

    #[test]
    fn provider_errors_propagate() {
        let container = Container::new();
        let err = container.add_provider(&BrokenProvider).unwrap_err();
        assert!(matches!(err, DiError::MissingIdentifier { .. }));
        assert!(container.is_empty());
    }

    #[test]
    fn provider_has_name() {
        assert!(TestProvider.name().contains("TestProvider"));
    }
}
