use crate::{
    DynSvc, InjectError, InjectResult, Port, PortId, PortInfo, Recipe,
    Service, Shared, SharedEx, Svc,
};
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
};

/// A cache entry for a single port. Holding a slot while its adapter runs is
/// what guarantees each port is built at most once per context.
type Slot = Shared<Option<DynSvc>>;

/// A runtime resolver bound to a [`Recipe`]. The value of each port is built
/// lazily the first time it is requested and cached for the lifetime of the
/// context.
///
/// Contexts are meant to be created per use case, for example per test or per
/// request, using a [`ContextFactory`]. Cloning a context does not clone its
/// cache. Both contexts will share the values that have been built.
///
/// ```
/// use hexagonal_di::{Adapter, Context, Port, Recipe, Svc};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// static BUILDS: AtomicUsize = AtomicUsize::new(0);
///
/// let port = Port::<String>::new("Name");
/// let recipe = Recipe::init(|builder| {
///     builder.add_port(
///         &port,
///         Adapter::new(|| {
///             BUILDS.fetch_add(1, Ordering::SeqCst);
///             "John".to_owned()
///         }),
///     )
/// })
/// .unwrap();
///
/// let context = Context::new(recipe);
/// let first = context.get(&port).unwrap();
/// let second = context.get(&port).unwrap();
///
/// assert!(Svc::ptr_eq(&first, &second));
/// assert_eq!(1, BUILDS.load(Ordering::SeqCst));
/// ```
#[derive(Clone)]
pub struct Context {
    recipe: Svc<Recipe>,
    slots: Shared<HashMap<PortId, Slot>>,
}

impl Context {
    /// Creates a new context with an empty cache.
    #[must_use]
    pub fn new(recipe: Recipe) -> Self {
        Context::from_shared(Svc::new(recipe))
    }

    /// Creates a new context from a copy of `recipe` where every port that
    /// also appears in `overrides` uses the adapter from `overrides` instead.
    /// Ports that only appear in `overrides` are ignored, so overrides can
    /// only replace capabilities and never add new ones.
    ///
    /// ```
    /// use hexagonal_di::{Adapter, Context, Port, Recipe};
    ///
    /// let name = Port::<String>::new("Name");
    /// let age = Port::<u32>::new("Age");
    ///
    /// let recipe = Recipe::init(|builder| {
    ///     builder.add_port(&name, Adapter::new(|| "John".to_owned()))
    /// })
    /// .unwrap();
    /// let overrides = Recipe::init(|builder| {
    ///     builder
    ///         .add_port(&name, Adapter::new(|| "Jack".to_owned()))?
    ///         .add_port(&age, Adapter::new(|| 42_u32))
    /// })
    /// .unwrap();
    ///
    /// let context = Context::with_overrides(&recipe, &overrides);
    /// assert_eq!("Jack", *context.get(&name).unwrap());
    /// assert!(context.get(&age).is_err());
    /// ```
    #[must_use]
    pub fn with_overrides(recipe: &Recipe, overrides: &Recipe) -> Self {
        Context::new(recipe.patched(overrides))
    }

    pub(crate) fn from_shared(recipe: Svc<Recipe>) -> Self {
        Context {
            recipe,
            slots: SharedEx::new(HashMap::new()),
        }
    }

    /// Gets the value of a port, building it first if it has not been built
    /// by this context yet. While building, the port's adapter can resolve
    /// its required ports through this same context, so each of them is also
    /// built at most once.
    ///
    /// Fails with [`InjectError::MissingAdapter`] if the recipe has no
    /// adapter for the port and no value was set with
    /// [`Context::override_value`].
    pub fn get<T>(&self, port: &Port<T>) -> InjectResult<Svc<T>>
    where
        T: ?Sized + Service,
    {
        let info = port.info();
        let value = self.get_dyn(info)?;
        value
            .downcast::<Svc<T>>()
            .map(|value| Svc::clone(&*value))
            .map_err(|_| InjectError::InvalidValue { port: info })
    }

    fn get_dyn(&self, port: PortInfo) -> InjectResult<DynSvc> {
        let slot = self.slot(port.id());
        slot.with_inner_mut(|cached| {
            if let Some(value) = cached.as_ref() {
                trace!(port = port.name(), "cache hit");
                return Ok(value.clone());
            }

            let adapter = match self.recipe.adapter(port.id()) {
                Some(adapter) => adapter,
                None => {
                    warn!(port = port.name(), "no adapter found");
                    return Err(InjectError::MissingAdapter {
                        port,
                        available: self.recipe.ports(),
                    });
                }
            };

            debug!(port = port.name(), "building");
            let resolver = Resolver {
                context: self,
                port,
                requires: adapter.requires(),
            };
            let built = adapter.build(&resolver)?;
            *cached = Some(built.clone());
            Ok(built)
        })
    }

    fn slot(&self, port: PortId) -> Slot {
        self.slots.with_inner_mut(|slots| {
            slots
                .entry(port)
                .or_insert_with(|| SharedEx::new(None))
                .clone()
        })
    }

    /// Sets the value of a port directly, bypassing its adapter. Passing
    /// `None` clears the cached value instead so the next request builds the
    /// port again.
    ///
    /// ```
    /// use hexagonal_di::{Adapter, Context, Port, Recipe, Svc};
    ///
    /// let name = Port::<String>::new("Name");
    /// let recipe = Recipe::init(|builder| {
    ///     builder.add_port(&name, Adapter::new(|| "John".to_owned()))
    /// })
    /// .unwrap();
    ///
    /// let context = Context::new(recipe);
    /// context.override_value(&name, Some(Svc::new("Jack".to_owned())));
    /// assert_eq!("Jack", *context.get(&name).unwrap());
    ///
    /// context.override_value(&name, None);
    /// assert_eq!("John", *context.get(&name).unwrap());
    /// ```
    pub fn override_value<T>(&self, port: &Port<T>, value: Option<Svc<T>>)
    where
        T: ?Sized + Service,
    {
        let info = port.info();
        match value.map(|value| Svc::new(value) as DynSvc) {
            Some(value) => {
                debug!(port = info.name(), "overriding value");
                self.slot(info.id())
                    .with_inner_mut(|slot| *slot = Some(value));
            }
            None => {
                debug!(port = info.name(), "clearing value");
                self.slots.with_inner_mut(|slots| {
                    slots.remove(&info.id());
                });
            }
        }
    }

    /// Checks whether a value is currently cached for a port.
    #[must_use]
    pub fn is_built<T>(&self, port: &Port<T>) -> bool
    where
        T: ?Sized + Service,
    {
        let id = port.info().id();
        let slot =
            self.slots.with_inner_mut(|slots| slots.get(&id).cloned());
        slot.is_some_and(|slot| {
            slot.with_inner_mut(|value| value.is_some())
        })
    }

    /// Gets the recipe this context resolves ports with.
    #[must_use]
    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("recipe", &self.recipe)
            .finish()
    }
}

/// The resolver handed to an adapter while it builds. It can only resolve the
/// ports the adapter declared as requirements.
///
/// ```
/// use hexagonal_di::{Adapter, Context, InjectError, Port, Recipe};
///
/// let name = Port::<String>::new("Name");
/// let age = Port::<u32>::new("Age");
/// let greeting = Port::<String>::new("Greeting");
///
/// let recipe = Recipe::init(|builder| {
///     builder
///         .add_port(&name, Adapter::new(|| "John".to_owned()))?
///         .add_port(&age, Adapter::new(|| 42_u32))?
///         .add_port(
///             &greeting,
///             Adapter::requiring([name.info()], move |resolver| {
///                 // `age` was not declared, so it can't be resolved here
///                 assert!(matches!(
///                     resolver.get(&age),
///                     Err(InjectError::UndeclaredDependency { .. })
///                 ));
///
///                 Ok(format!("Hello, {}!", resolver.get(&name)?))
///             }),
///         )
/// })
/// .unwrap();
///
/// let context = Context::new(recipe);
/// assert_eq!("Hello, John!", *context.get(&greeting).unwrap());
/// ```
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    context: &'a Context,
    port: PortInfo,
    requires: &'a [PortInfo],
}

impl<'a> Resolver<'a> {
    /// Gets the value of a required port from the context.
    pub fn get<T>(&self, dependency: &Port<T>) -> InjectResult<Svc<T>>
    where
        T: ?Sized + Service,
    {
        let info = dependency.info();
        if !self.requires.contains(&info) {
            warn!(
                port = self.port.name(),
                dependency = info.name(),
                "adapter resolved an undeclared dependency"
            );
            return Err(InjectError::UndeclaredDependency {
                port: self.port,
                dependency: info,
            });
        }

        self.context.get(dependency)
    }

    /// Gets the port whose adapter this resolver was created for.
    #[must_use]
    pub fn port(&self) -> PortInfo {
        self.port
    }

    /// Gets the ports this resolver can resolve.
    #[must_use]
    pub fn requires(&self) -> &'a [PortInfo] {
        self.requires
    }
}

impl Debug for Resolver<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("port", &self.port)
            .field("requires", &self.requires)
            .finish()
    }
}

/// Creates [`Context`]s bound to one [`Recipe`].
#[derive(Clone, Debug)]
pub struct ContextFactory {
    recipe: Svc<Recipe>,
}

impl ContextFactory {
    /// Creates a new factory for contexts that resolve ports using `recipe`.
    #[must_use]
    pub fn new(recipe: Recipe) -> Self {
        ContextFactory {
            recipe: Svc::new(recipe),
        }
    }

    /// Creates a new context with an empty cache.
    #[must_use]
    pub fn create(&self) -> Context {
        Context::from_shared(self.recipe.clone())
    }

    /// Creates a new context with an empty cache where the ports in
    /// `overrides` use their adapters from `overrides`. The factory's recipe
    /// is copied first, so other contexts created by this factory are not
    /// affected. See [`Context::with_overrides`].
    #[must_use]
    pub fn create_with_overrides(&self, overrides: &Recipe) -> Context {
        Context::with_overrides(&self.recipe, overrides)
    }

    /// Gets the recipe contexts are created from.
    #[must_use]
    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }
}

/// Creates a factory for contexts that resolve ports using `recipe`.
#[must_use]
pub fn make_context_factory(recipe: Recipe) -> ContextFactory {
    ContextFactory::new(recipe)
}
