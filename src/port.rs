use crate::Service;
use derive_more::Display;
use std::{
    any::type_name,
    fmt::{Debug, Formatter},
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_PORT_ID: AtomicU64 = AtomicU64::new(0);

/// The identity of a port. Two ports never share an identity, even if they
/// were created with the same label.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PortId(u64);

impl PortId {
    fn next() -> Self {
        PortId(NEXT_PORT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Untyped information about a port.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
#[display(fmt = "{}", name)]
pub struct PortInfo {
    id: PortId,
    name: &'static str,
    type_name: &'static str,
}

impl PortInfo {
    /// Gets the identity of this port.
    #[inline]
    #[must_use]
    pub fn id(&self) -> PortId {
        self.id
    }

    /// Gets the label this port was created with. Labels are only used for
    /// diagnostics.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Gets the name of the port's value type.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// A named capability whose value has type `T`.
///
/// A port is only a token. What it resolves to is decided by the
/// [`Recipe`](crate::Recipe) a [`Context`](crate::Context) is built from.
/// Copies of a port are the same capability, but two calls to [`Port::new`]
/// always create distinct capabilities:
///
/// ```
/// use hexagonal_di::Port;
///
/// let a = Port::<i32>::new("Answer");
/// let b = Port::<i32>::new("Answer");
/// let c = a;
///
/// assert_ne!(a.info(), b.info());
/// assert_eq!(a.info(), c.info());
/// ```
pub struct Port<T>
where
    T: ?Sized + Service,
{
    info: PortInfo,
    marker: PhantomData<fn() -> crate::Svc<T>>,
}

impl<T> Port<T>
where
    T: ?Sized + Service,
{
    /// Creates a new port. The id is a diagnostic label and does not need to
    /// be unique.
    #[must_use]
    pub fn new(id: &'static str) -> Self {
        Port {
            info: PortInfo {
                id: PortId::next(),
                name: id,
                type_name: type_name::<T>(),
            },
            marker: PhantomData,
        }
    }

    /// Gets the untyped information about this port.
    #[inline]
    #[must_use]
    pub fn info(&self) -> PortInfo {
        self.info
    }

    /// Gets the label this port was created with.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.info.name
    }
}

impl<T> Clone for Port<T>
where
    T: ?Sized + Service,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Port<T> where T: ?Sized + Service {}

impl<T> Debug for Port<T>
where
    T: ?Sized + Service,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Port")
            .field("name", &self.info.name)
            .field("type_name", &self.info.type_name)
            .finish()
    }
}

impl<T> From<&Port<T>> for PortInfo
where
    T: ?Sized + Service,
{
    fn from(port: &Port<T>) -> Self {
        port.info
    }
}

impl<T> From<Port<T>> for PortInfo
where
    T: ?Sized + Service,
{
    fn from(port: Port<T>) -> Self {
        port.info
    }
}
