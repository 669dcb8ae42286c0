//! Registration kinds.
//!
//! The kind fixes how long a produced instance lives:
//! - [`RegistrationKind::Singleton`] — constructed at most once per container
//! - [`RegistrationKind::Transient`] — constructed on every request
use std::fmt;

/// Lifecycle policy of a registered service.
///
/// # Examples
/// ```
/// use tawsil_container::kind::RegistrationKind;
///
/// assert!(RegistrationKind::Singleton.is_cached());
/// assert!(!RegistrationKind::Transient.is_cached());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationKind {
    /// One instance shared for the container's lifetime.
    ///
    /// Created on first request and cached; never re-constructed and never
    /// expired.
    Singleton,

    /// New instance created on every request.
    ///
    /// Never cached. Ownership passes to the caller.
    Transient,
}

impl RegistrationKind {
    /// Returns `true` if produced instances are stored in the instance cache.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, RegistrationKind::Singleton)
    }
}

impl fmt::Display for RegistrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationKind::Singleton => write!(f, "Singleton"),
            RegistrationKind::Transient => write!(f, "Transient"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_equality() {
        assert_eq!(RegistrationKind::Singleton, RegistrationKind::Singleton);
        assert_ne!(RegistrationKind::Singleton, RegistrationKind::Transient);
    }

    #[test]
    fn kind_is_cached() {
        assert!(RegistrationKind::Singleton.is_cached());
        assert!(!RegistrationKind::Transient.is_cached());
    }

    #[test]
    fn kind_display() {
        assert_eq!(format!("{}", RegistrationKind::Singleton), "Singleton");
        assert_eq!(format!("{}", RegistrationKind::Transient), "Transient");
    }
}
