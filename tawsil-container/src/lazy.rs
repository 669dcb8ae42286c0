//! Lazy references — the cycle-breaking mechanism.
//!
//! While a service is under construction the engine hands out a
//! [`LazyRef`] for it: a single-assignment cell that is bound to the
//! produced instance once the constructor returns. A dependent that asks
//! for a service already present in the requesting chain receives that cell
//! instead of triggering another construction.
//!
//! Constructors see every injected dependency as an [`Injected<T>`], whether
//! it arrived already built or as a still-empty cell. Reading through it
//! forwards to whatever instance the cell holds at read time.
//!
//! # Ownership
//! A dependency that was fully built before its dependent holds it strongly.
//! A back-reference (the cell handed out while its target was still under
//! construction) holds its target weakly: it never keeps the target alive,
//! so a cycle of transients is freed once the caller drops the root. Reading
//! a back-reference after that fails with [`DiError::Released`].
//!
//! # Limitation
//! A constructor must not read a dependency that participates in a cycle
//! with it: the cell is only filled after the constructor returns.
//! [`Injected::try_get`] reports this as [`DiError::Unbound`];
//! [`Injected::get`] panics.

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;

use crate::cache::Instance;
use crate::error::{DiError, Result};
use crate::identifier::ServiceId;

enum Binding {
    Owned(Instance),
    BackReference(Weak<dyn Any + Send + Sync>),
}

/// Type-erased, single-assignment handle to a service instance.
#[derive(Clone)]
pub struct LazyRef {
    identifier: ServiceId,
    cell: Arc<OnceCell<Binding>>,
}

impl LazyRef {
    /// A handle whose instance is not produced yet.
    pub(crate) fn pending(identifier: ServiceId) -> Self {
        Self {
            identifier,
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// A handle owning an instance that already exists.
    pub(crate) fn bound(identifier: ServiceId, instance: Instance) -> Self {
        Self {
            identifier,
            cell: Arc::new(OnceCell::with_value(Binding::Owned(instance))),
        }
    }

    /// Binds the handle without keeping `instance` alive. Returns `false`
    /// if it was already bound, in which case the first binding is kept.
    pub(crate) fn bind(&self, instance: &Instance) -> bool {
        self.cell
            .set(Binding::BackReference(Arc::downgrade(instance)))
            .is_ok()
    }

    pub fn identifier(&self) -> &ServiceId {
        &self.identifier
    }

    /// `true` once the target finished construction, even if it was dropped
    /// since.
    pub fn is_bound(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The bound instance, if any and still alive.
    pub fn get(&self) -> Option<Instance> {
        match self.cell.get()? {
            Binding::Owned(instance) => Some(instance.clone()),
            Binding::BackReference(weak) => weak.upgrade(),
        }
    }

    /// The bound instance.
    ///
    /// # Errors
    /// - [`DiError::Unbound`] while the target is still under construction
    /// - [`DiError::Released`] when the target was dropped
    pub fn instance(&self) -> Result<Instance> {
        match self.cell.get() {
            None => Err(DiError::Unbound {
                identifier: self.identifier.clone(),
            }),
            Some(Binding::Owned(instance)) => Ok(instance.clone()),
            Some(Binding::BackReference(weak)) => {
                weak.upgrade().ok_or_else(|| DiError::Released {
                    identifier: self.identifier.clone(),
                })
            }
        }
    }

    /// Two handles share the same cell.
    pub fn same_cell(&self, other: &LazyRef) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    fn is_back_reference(&self) -> bool {
        matches!(self.cell.get(), Some(Binding::BackReference(_)))
    }
}

impl fmt::Debug for LazyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRef")
            .field("identifier", &self.identifier)
            .field("bound", &self.is_bound())
            .field("back_reference", &self.is_back_reference())
            .finish()
    }
}

/// A dependency as received by a constructor.
///
/// Hands out shared pointers to `T` once its target exists.
///
/// # Examples
/// ```
/// use tawsil_container::lazy::Injected;
///
/// struct Clock { hour: u8 }
///
/// let clock = Injected::from_value("IClock", Clock { hour: 9 });
/// assert_eq!(clock.get().hour, 9);
/// ```
pub struct Injected<T> {
    handle: LazyRef,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: Send + Sync + 'static> Injected<T> {
    /// Wraps a handle, checking the type right away when it is bound.
    pub(crate) fn from_handle(handle: LazyRef) -> Result<Self> {
        if let Some(instance) = handle.get() {
            if !(*instance).is::<T>() {
                return Err(DiError::TypeMismatch {
                    identifier: handle.identifier.clone(),
                    expected: type_name::<T>(),
                });
            }
        }

        Ok(Self {
            handle,
            _marker: PhantomData,
        })
    }

    /// An already-bound dependency over `value`.
    ///
    /// Handy when wiring a service by hand, outside a container.
    pub fn from_value(identifier: impl Into<ServiceId>, value: T) -> Self {
        Self::from_arc(identifier, Arc::new(value))
    }

    /// An already-bound dependency over a shared `value`.
    pub fn from_arc(identifier: impl Into<ServiceId>, value: Arc<T>) -> Self {
        let instance: Instance = value;
        Self {
            handle: LazyRef::bound(identifier.into(), instance),
            _marker: PhantomData,
        }
    }

    /// Returns a shared pointer to the target.
    ///
    /// # Errors
    /// - [`DiError::Unbound`] while the target is still under construction
    /// - [`DiError::Released`] when a back-reference outlived its target
    /// - [`DiError::TypeMismatch`] when the target is not a `T`
    pub fn try_get(&self) -> Result<Arc<T>> {
        self.handle
            .instance()?
            .downcast::<T>()
            .map_err(|_| self.type_mismatch())
    }

    /// Returns a shared pointer to the target.
    ///
    /// # Panics
    /// Whenever [`try_get`](Self::try_get) would fail.
    pub fn get(&self) -> Arc<T> {
        match self.try_get() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn identifier(&self) -> &ServiceId {
        self.handle.identifier()
    }

    pub fn is_bound(&self) -> bool {
        self.handle.is_bound()
    }

    /// The underlying type-erased handle.
    pub fn handle(&self) -> &LazyRef {
        &self.handle
    }

    fn type_mismatch(&self) -> DiError {
        DiError::TypeMismatch {
            identifier: self.handle.identifier.clone(),
            expected: type_name::<T>(),
        }
    }
}

impl<T> Clone for Injected<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Injected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injected")
            .field("identifier", &self.handle.identifier)
            .field("type", &type_name::<T>())
            .field("bound", &self.handle.is_bound())
            .finish()
    }
}
