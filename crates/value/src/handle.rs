//! Opaque handles to host data
//!
//! The expression core never looks inside host objects or delegates. It
//! carries them around as a [`HostHandle`] and hands them back to the host
//! resolver when a member is accessed or a callable is invoked.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased reference to a host value
///
/// Two handles are equal only when they point at the same allocation.
#[derive(Clone)]
pub struct HostHandle {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: Arc<str>,
}

impl HostHandle {
    /// Wrap a host value, naming it after its Rust type
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap a host value under an explicit display name
    pub fn named<T: Any + Send + Sync>(value: T, type_name: impl Into<Arc<str>>) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: type_name.into(),
        }
    }

    /// Wrap an already shared host value
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: Arc::from(std::any::type_name::<T>()),
        }
    }

    /// Borrow the wrapped value as `T`, if that is its type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Check the wrapped type
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Display name of the wrapped value
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &HostHandle) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }

    /// Address of the shared allocation, stable for the handle's lifetime
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner).cast::<()>() as usize
    }
}

impl fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostHandle({} @ {:#x})", self.type_name, self.addr())
    }
}

impl PartialEq for HostHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for HostHandle {}

impl std::hash::Hash for HostHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order {
        id: u32,
    }

    #[test]
    fn test_identity() {
        let a = HostHandle::new(Order { id: 1 });
        let b = a.clone();
        let c = HostHandle::new(Order { id: 1 });

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.addr(), b.addr());
    }

    #[test]
    fn test_downcast() {
        let handle = HostHandle::new(Order { id: 7 });
        assert!(handle.is::<Order>());
        assert_eq!(handle.downcast_ref::<Order>().map(|o| o.id), Some(7));
        assert!(handle.downcast_ref::<String>().is_none());
        assert!(handle.type_name().ends_with("Order"));
    }

    #[test]
    fn test_named() {
        let handle = HostHandle::named(5_u8, "Customer");
        assert_eq!(handle.type_name(), "Customer");
    }
}
