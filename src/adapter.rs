use crate::{DynSvc, InjectResult, PortInfo, Resolver, Service, Svc};
use std::fmt::{Debug, Formatter};

#[cfg(feature = "arc")]
pub(crate) type BuildFn<T> =
    dyn Fn(&Resolver<'_>) -> InjectResult<Svc<T>> + Send + Sync;

#[cfg(feature = "rc")]
pub(crate) type BuildFn<T> =
    dyn Fn(&Resolver<'_>) -> InjectResult<Svc<T>>;

#[cfg(feature = "arc")]
pub(crate) type ErasedBuildFn =
    dyn Fn(&Resolver<'_>) -> InjectResult<DynSvc> + Send + Sync;

#[cfg(feature = "rc")]
pub(crate) type ErasedBuildFn =
    dyn Fn(&Resolver<'_>) -> InjectResult<DynSvc>;

/// Declares how the value of a port is produced.
///
/// An adapter is a build function plus the set of ports it is allowed to
/// resolve while building. The build function receives a [`Resolver`] that
/// only answers for those ports. Adapters are registered with
/// [`RecipeBuilder::add_port`](crate::RecipeBuilder::add_port), which rejects
/// an adapter whose requirements have not been registered yet.
///
/// ## Example
///
/// ```
/// use hexagonal_di::{Adapter, Port, Recipe};
///
/// struct Config {
///     url: String,
/// }
///
/// struct Client {
///     url: String,
/// }
///
/// let config = Port::<Config>::new("Config");
/// let client = Port::<Client>::new("Client");
///
/// let recipe = Recipe::init(|builder| {
///     builder
///         .add_port(
///             &config,
///             Adapter::new(|| Config {
///                 url: "localhost".to_owned(),
///             }),
///         )?
///         .add_port(
///             &client,
///             Adapter::requiring([config.info()], move |resolver| {
///                 let config = resolver.get(&config)?;
///                 Ok(Client {
///                     url: config.url.clone(),
///                 })
///             }),
///         )
/// })
/// .unwrap();
///
/// assert!(recipe.contains(&client));
/// ```
pub struct Adapter<T>
where
    T: ?Sized + Service,
{
    requires: Svc<[PortInfo]>,
    build: Svc<BuildFn<T>>,
}

impl<T> Adapter<T>
where
    T: ?Sized + Service,
{
    /// Creates an adapter with no requirements.
    #[must_use]
    pub fn new<F, R>(build: F) -> Self
    where
        F: Service + Fn() -> R,
        R: Into<Svc<T>>,
    {
        let build: Svc<BuildFn<T>> =
            Svc::new(move |_: &Resolver<'_>| -> InjectResult<Svc<T>> {
                Ok(build().into())
            });
        Adapter {
            requires: Svc::from(Vec::new()),
            build,
        }
    }

    /// Creates an adapter that may resolve the given ports while building.
    /// Errors from resolving those ports can be propagated with `?`.
    #[must_use]
    pub fn requiring<I, F, R>(requires: I, build: F) -> Self
    where
        I: IntoIterator<Item = PortInfo>,
        F: Service + Fn(&Resolver<'_>) -> InjectResult<R>,
        R: Into<Svc<T>>,
    {
        let mut unique = Vec::new();
        for port in requires {
            if !unique.contains(&port) {
                unique.push(port);
            }
        }

        let build: Svc<BuildFn<T>> = Svc::new(
            move |resolver: &Resolver<'_>| -> InjectResult<Svc<T>> {
                build(resolver).map(Into::into)
            },
        );
        Adapter {
            requires: Svc::from(unique),
            build,
        }
    }

    /// Creates an adapter that always produces the same, predetermined
    /// value. Every context created from a recipe containing this adapter
    /// shares that one instance.
    ///
    /// ```
    /// use hexagonal_di::{Adapter, Context, Port, Recipe, Svc};
    ///
    /// let port = Port::<i32>::new("Answer");
    /// let recipe = Recipe::init(|builder| {
    ///     builder.add_port(&port, Adapter::constant(42_i32))
    /// })
    /// .unwrap();
    ///
    /// let first = Context::new(recipe.clone()).get(&port).unwrap();
    /// let second = Context::new(recipe).get(&port).unwrap();
    /// assert_eq!(42, *first);
    /// assert!(Svc::ptr_eq(&first, &second));
    /// ```
    #[must_use]
    pub fn constant(value: impl Into<Svc<T>>) -> Self {
        let value: Svc<T> = value.into();
        let build: Svc<BuildFn<T>> =
            Svc::new(move |_: &Resolver<'_>| -> InjectResult<Svc<T>> {
                Ok(value.clone())
            });
        Adapter {
            requires: Svc::from(Vec::new()),
            build,
        }
    }

    /// Gets the ports this adapter may resolve while building.
    #[must_use]
    pub fn requires(&self) -> &[PortInfo] {
        &self.requires
    }

    pub(crate) fn into_erased(self, port: PortInfo) -> ErasedAdapter {
        let build = self.build;
        let build: Svc<ErasedBuildFn> = Svc::new(
            move |resolver: &Resolver<'_>| -> InjectResult<DynSvc> {
                let value = build(resolver)?;
                let value: DynSvc = Svc::new(value);
                Ok(value)
            },
        );

        ErasedAdapter {
            port,
            requires: self.requires,
            build,
        }
    }
}

impl<T> Clone for Adapter<T>
where
    T: ?Sized + Service,
{
    fn clone(&self) -> Self {
        Adapter {
            requires: self.requires.clone(),
            build: self.build.clone(),
        }
    }
}

impl<T> Debug for Adapter<T>
where
    T: ?Sized + Service,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("requires", &self.requires)
            .finish()
    }
}

/// An adapter bound to its port with the value type erased. This is what a
/// recipe stores.
#[derive(Clone)]
pub(crate) struct ErasedAdapter {
    port: PortInfo,
    requires: Svc<[PortInfo]>,
    build: Svc<ErasedBuildFn>,
}

impl ErasedAdapter {
    pub fn port(&self) -> PortInfo {
        self.port
    }

    pub fn requires(&self) -> &[PortInfo] {
        &self.requires
    }

    pub fn build(&self, resolver: &Resolver<'_>) -> InjectResult<DynSvc> {
        (self.build)(resolver)
    }
}

impl Debug for ErasedAdapter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErasedAdapter")
            .field("port", &self.port)
            .field("requires", &self.requires)
            .finish()
    }
}
