#![allow(clippy::used_underscore_binding)]

use crate::PortInfo;
use derive_more::{Display, Error};

#[cfg(feature = "arc")]
mod types {
    use std::{
        any::Any,
        sync::{Arc, Mutex, PoisonError},
    };

    /// A reference-counted pointer holding a built value. The pointer type is
    /// determined by the feature flags passed to this crate.
    pub type Svc<T> = Arc<T>;

    /// A reference-counted pointer holding a type-erased value.
    pub type DynSvc = Arc<dyn Any + Send + Sync>;

    /// Implemented automatically on types that can be the value of a port.
    pub trait Service: Any + Send + Sync {}
    impl<T: ?Sized + Any + Send + Sync> Service for T {}

    pub(crate) type Shared<T> = Arc<Mutex<T>>;

    pub(crate) trait SharedEx<T> {
        fn new(value: T) -> Self;
        fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R;
    }

    impl<T> SharedEx<T> for Shared<T> {
        fn new(value: T) -> Self {
            Arc::new(Mutex::new(value))
        }

        fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
            // Cached values are never mutated in place, so a poisoned lock
            // still guards a consistent map.
            f(&mut *self.lock().unwrap_or_else(PoisonError::into_inner))
        }
    }
}

#[cfg(feature = "rc")]
mod types {
    use std::{any::Any, cell::RefCell, rc::Rc};

    /// A reference-counted pointer holding a built value. The pointer type is
    /// determined by the feature flags passed to this crate.
    pub type Svc<T> = Rc<T>;

    /// A reference-counted pointer holding a type-erased value.
    pub type DynSvc = Rc<dyn Any>;

    /// Implemented automatically on types that can be the value of a port.
    pub trait Service: Any {}
    impl<T: ?Sized + Any> Service for T {}

    pub(crate) type Shared<T> = Rc<RefCell<T>>;

    pub(crate) trait SharedEx<T> {
        fn new(value: T) -> Self;
        fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R;
    }

    impl<T> SharedEx<T> for Shared<T> {
        fn new(value: T) -> Self {
            Rc::new(RefCell::new(value))
        }

        fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
            f(&mut *self.borrow_mut())
        }
    }
}

pub use types::{DynSvc, Service, Svc};
pub(crate) use types::{Shared, SharedEx};

/// A result from resolving a port or wiring a recipe.
pub type InjectResult<T> = Result<T, InjectError>;

/// An error that has occurred while wiring a recipe or resolving a port.
#[derive(Debug, Display, Error)]
#[non_exhaustive]
pub enum InjectError {
    /// No adapter is registered for the requested port.
    #[display(
        fmt = "no adapter found for port {} (available ports: {})",
        port,
        "fmt_ports(available)"
    )]
    MissingAdapter {
        /// The port that was requested.
        port: PortInfo,

        /// Every port registered in the recipe used for resolution.
        available: Vec<PortInfo>,
    },

    /// An adapter was added to a recipe before one of the ports it requires.
    #[display(
        fmt = "the adapter for {} requires {}, which was not added to the recipe before it",
        port,
        dependency
    )]
    UnregisteredDependency {
        /// The port whose adapter was being added.
        port: PortInfo,

        /// The required port that is missing from the capability set.
        dependency: PortInfo,
    },

    /// An adapter tried to resolve a port it did not declare as a requirement.
    #[display(
        fmt = "the adapter for {} resolved {} without declaring it as a requirement",
        port,
        dependency
    )]
    UndeclaredDependency {
        /// The port whose adapter made the request.
        port: PortInfo,

        /// The port that was requested.
        dependency: PortInfo,
    },

    /// The value cached for a port has the wrong type.
    #[display(fmt = "the value cached for {} has the wrong type", port)]
    InvalidValue {
        /// The port that was requested.
        port: PortInfo,
    },
}

fn fmt_ports(ports: &[PortInfo]) -> String {
    let mut joined = String::new();
    for port in ports {
        if !joined.is_empty() {
            joined.push_str(", ");
        }
        joined.push_str(port.name());
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Port;

    #[test]
    fn missing_adapter_lists_available_ports() {
        let foo = Port::<i32>::new("Foo");
        let bar = Port::<i32>::new("Bar");
        let baz = Port::<i32>::new("Baz");
        let error = InjectError::MissingAdapter {
            port: baz.info(),
            available: vec![foo.info(), bar.info()],
        };

        assert_eq!(
            "no adapter found for port Baz (available ports: Foo, Bar)",
            error.to_string()
        );
    }

    #[test]
    fn missing_adapter_with_empty_recipe() {
        let foo = Port::<i32>::new("Foo");
        let error = InjectError::MissingAdapter {
            port: foo.info(),
            available: Vec::new(),
        };

        assert_eq!(
            "no adapter found for port Foo (available ports: )",
            error.to_string()
        );
    }
}
