//! Service identifiers.
//!
//! A [`ServiceId`] is the opaque string token naming an abstraction.
//! It is the key of the registry, the constructor-argument table and the
//! instance cache.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Uniquely names a service within a container.
///
/// Cloning is cheap (a reference-count bump), so identifiers are passed
/// around by value freely.
///
/// # Examples
/// ```
/// use tawsil_container::identifier::ServiceId;
///
/// let id = ServiceId::from("ILogger");
/// assert_eq!(id.as_str(), "ILogger");
/// assert_eq!(id, ServiceId::from(String::from("ILogger")));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(Arc<str>);

impl ServiceId {
    /// Creates an identifier from anything string-like.
    #[inline]
    pub fn new(identifier: impl AsRef<str>) -> Self {
        Self(Arc::from(identifier.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty identifier, which stands for
    /// "no identifier was given".
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ServiceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ServiceId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&String> for ServiceId {
    fn from(value: &String) -> Self {
        Self::new(value)
    }
}

impl From<&ServiceId> for ServiceId {
    fn from(value: &ServiceId) -> Self {
        value.clone()
    }
}

impl AsRef<str> for ServiceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets maps keyed by ServiceId be queried with a plain &str
impl Borrow<str> for ServiceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ServiceId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ServiceId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceId({:?})", &*self.0)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One positional constructor parameter.
///
/// `Some(id)` is injected by resolving `id`; `None` marks a parameter that
/// is intentionally not injected and receives an absent placeholder.
pub type ConstructorArgument = Option<ServiceId>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn equality_across_constructors() {
        assert_eq!(ServiceId::from("IFoo"), ServiceId::from(String::from("IFoo")));
        assert_ne!(ServiceId::from("IFoo"), ServiceId::from("IBar"));
        assert_eq!(ServiceId::from("IFoo"), "IFoo");
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(ServiceId::from("IFoo"), 1);
        assert_eq!(map.get("IFoo"), Some(&1));
        assert_eq!(map.get("IBar"), None);
    }

    #[test]
    fn empty_identifier() {
        assert!(ServiceId::from("").is_empty());
        assert!(!ServiceId::from("IFoo").is_empty());
    }

    #[test]
    fn display_and_debug() {
        let id = ServiceId::from("IFoo");
        assert_eq!(id.to_string(), "IFoo");
        assert_eq!(format!("{id:?}"), "ServiceId(\"IFoo\")");
    }
}
