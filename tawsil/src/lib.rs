//! # Tawsil — Dependency Injection Container for Rust
//!
//! A string-keyed IoC container: services are registered under identifiers,
//! produced on demand with their dependencies wired recursively, and
//! dependency cycles are broken with lazy references.
//!
//! ```rust
//! use tawsil::prelude::*;
//!
//! #[derive(Injectable)]
//! struct Config;
//!
//! #[derive(Injectable)]
//! struct Database {
//!     #[inject(id = "IConfig")]
//!     config: Injected<Config>,
//! }
//!
//! let container = Container::new();
//! container.singleton::<Config>("IConfig")?;
//! container.transient::<Database>("IDatabase")?;
//!
//! let db = container.get::<Database>("IDatabase")?;
//! assert!(db.config.is_bound());
//! # Ok::<(), DiError>(())
//! ```

pub use tawsil_container::*;
#[cfg(feature = "derive")]
pub use tawsil_derive::*;
pub use tawsil_support::*;

/// Everything needed to register and resolve services.
pub mod prelude {
    pub use tawsil_container::prelude::*;
    #[cfg(feature = "derive")]
    pub use tawsil_derive::Injectable;
}
