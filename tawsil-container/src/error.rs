//! Error types for Tawsil container operations.
//!
//! Every failure is immediate and synchronous: nothing is retried, and a
//! failed construction never writes to the instance cache.

use std::fmt;

use tawsil_support::rendering::render_chain;

use crate::identifier::ServiceId;

/// Boxed error produced by user factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for all Tawsil operations.
#[derive(Debug, thiserror::Error)]
pub enum DiError {
    /// An operation was called without an identifier.
    #[error("Container could not {operation} service: No identifier was given!")]
    MissingIdentifier { operation: &'static str },

    /// Requested identifier was never registered.
    #[error("{}", .0)]
    NotRegistered(NotRegisteredError),

    /// An implementation-backed record has no recorded dependency list.
    #[error(
        "Container could not find constructor arguments for the service: '{identifier}'. Have you registered it as a service?"
    )]
    MissingConstructorArguments { identifier: ServiceId },

    /// A custom factory returned an error.
    #[error(
        "Could not instantiate the service with the identifier: '{identifier}': the custom instantiation function failed: {source}"
    )]
    FactoryFailed {
        identifier: ServiceId,
        #[source]
        source: BoxError,
    },

    /// An implementation-backed record was registered without an implementation.
    #[error(
        "Container could not construct a new service of kind: {identifier}. Reason: No implementation was given!"
    )]
    NoImplementation { identifier: ServiceId },

    /// An instance was requested as a Rust type it does not have.
    #[error("Service '{identifier}' is not of the requested type {expected}")]
    TypeMismatch {
        identifier: ServiceId,
        expected: &'static str,
    },

    /// A constructor asked for a required dependency in a slot that was left absent.
    #[error("Constructor argument {index} of '{identifier}' is absent but was requested as a dependency")]
    AbsentArgument { identifier: ServiceId, index: usize },

    /// A constructor read past the end of its argument list.
    #[error("Constructor argument {index} of '{identifier}' is out of range ({len} arguments)")]
    ArgumentOutOfRange {
        identifier: ServiceId,
        index: usize,
        len: usize,
    },

    /// A lazy reference was read before its target finished construction.
    #[error(
        "Lazy reference to '{identifier}' was accessed before the service finished construction"
    )]
    Unbound { identifier: ServiceId },

    /// A back-reference was read after the service it points to was dropped.
    #[error("Lazy reference to '{identifier}' outlived the service it points to")]
    Released { identifier: ServiceId },
}

/// Error when an identifier has no registration.
///
/// Carries the chain of services that were being constructed when the
/// lookup happened, outermost first.
#[derive(Debug)]
pub struct NotRegisteredError {
    /// The identifier that was requested
    pub identifier: ServiceId,
    /// In-progress constructions that required it, root first
    pub required_by: Vec<ServiceId>,
    /// Registered identifiers that look similar
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Container could not find a service for identifier: \"{}\".",
            self.identifier
        )?;

        if !self.required_by.is_empty() {
            write!(
                f,
                " It is required by the service: '{}'.",
                render_chain(&self.required_by)
            )?;
        }

        write!(f, " Remember to register it as a service!")?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        Ok(())
    }
}

impl DiError {
    /// The identifier the error is about, when there is one.
    pub fn identifier(&self) -> Option<&ServiceId> {
        match self {
            DiError::MissingIdentifier { .. } => None,
            DiError::NotRegistered(err) => Some(&err.identifier),
            DiError::MissingConstructorArguments { identifier }
            | DiError::FactoryFailed { identifier, .. }
            | DiError::NoImplementation { identifier }
            | DiError::TypeMismatch { identifier, .. }
            | DiError::AbsentArgument { identifier, .. }
            | DiError::ArgumentOutOfRange { identifier, .. }
            | DiError::Unbound { identifier }
            | DiError::Released { identifier } => Some(identifier),
        }
    }
}

/// Convenient Result type for Tawsil operations.
pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn not_registered_error_display() {
        let err = DiError::NotRegistered(NotRegisteredError {
            identifier: ServiceId::from("IDatabase"),
            required_by: vec![ServiceId::from("IUserService"), ServiceId::from("IUserRepo")],
            suggestions: vec![],
        });

        let msg = format!("{err}");
        assert!(msg.contains("\"IDatabase\""));
        assert!(msg.contains("IUserService -> IUserRepo"));
        assert!(msg.contains("Remember to register it"));
    }

    #[test]
    fn not_registered_without_chain() {
        let err = DiError::NotRegistered(NotRegisteredError {
            identifier: ServiceId::from("Missing"),
            required_by: vec![],
            suggestions: vec!["Mission".into()],
        });

        let msg = format!("{err}");
        assert!(msg.contains("Missing"));
        assert!(!msg.contains("It is required by"));
        assert!(msg.contains("- Mission"));
    }

    #[test]
    fn factory_failed_keeps_source() {
        let err = DiError::FactoryFailed {
            identifier: ServiceId::from("IClock"),
            source: "clock unavailable".into(),
        };

        assert!(err.to_string().contains("IClock"));
        assert_eq!(err.source().map(|s| s.to_string()), Some("clock unavailable".to_string()));
    }

    #[test]
    fn identifier_accessor() {
        let err = DiError::NoImplementation {
            identifier: ServiceId::from("IFoo"),
        };
        assert_eq!(err.identifier(), Some(&ServiceId::from("IFoo")));
        assert!(
            DiError::MissingIdentifier { operation: "get" }
                .identifier()
                .is_none()
        );
    }
}
