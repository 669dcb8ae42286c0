//! Core container implementation for Tawsil DI.

pub mod cache;
pub mod container;
pub mod error;
pub mod graph;
pub mod identifier;
pub mod injectable;
pub mod kind;
pub mod lazy;
pub mod provider;
pub mod registry;

pub use cache::Instance;
pub use container::{Container, prelude};
pub use error::{BoxError, DiError, Result};
pub use graph::GraphReport;
pub use identifier::{ConstructorArgument, ServiceId};
pub use injectable::{Argument, Arguments, FromArgument, Injectable};
pub use kind::RegistrationKind;
pub use lazy::{Injected, LazyRef};
pub use provider::Provider;
pub use registry::Registration;
