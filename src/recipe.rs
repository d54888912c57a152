use crate::{
    ContextFactory, ErasedAdapter, InjectResult, Port, PortId, PortInfo,
    RecipeBuilder, Service,
};
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
};

/// An immutable table mapping each port to its adapter.
///
/// Recipes are assembled once with [`Recipe::init`] and can then be merged
/// with other recipes or used to create any number of
/// [`Context`](crate::Context)s. Cloning a recipe is cheap since adapters are
/// reference-counted.
#[derive(Clone)]
pub struct Recipe {
    adapters: HashMap<PortId, ErasedAdapter>,
}

impl Recipe {
    pub(crate) fn from_adapters(adapters: HashMap<PortId, ErasedAdapter>) -> Self {
        Recipe { adapters }
    }

    /// Creates a new recipe. The setup function receives an empty
    /// [`RecipeBuilder`] and returns the builder to freeze.
    ///
    /// ```
    /// use hexagonal_di::{Adapter, Port, Recipe};
    ///
    /// let name = Port::<String>::new("Name");
    /// let age = Port::<u32>::new("Age");
    ///
    /// let recipe = Recipe::init(|builder| {
    ///     builder
    ///         .add_port(&name, Adapter::new(|| "John".to_owned()))?
    ///         .add_port(&age, Adapter::new(|| 42_u32))
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(2, recipe.len());
    /// ```
    pub fn init<F>(setup: F) -> InjectResult<Recipe>
    where
        F: FnOnce(RecipeBuilder) -> InjectResult<RecipeBuilder>,
    {
        let builder = setup(RecipeBuilder::new())?;
        Ok(builder.to_recipe())
    }

    /// Checks whether this recipe has an adapter for a port.
    #[must_use]
    pub fn contains<T>(&self, port: &Port<T>) -> bool
    where
        T: ?Sized + Service,
    {
        self.adapters.contains_key(&port.info().id())
    }

    /// Gets every port in this recipe, ordered by when the ports were
    /// created.
    #[must_use]
    pub fn ports(&self) -> Vec<PortInfo> {
        let mut ports: Vec<PortInfo> =
            self.adapters.values().map(ErasedAdapter::port).collect();
        ports.sort_by_key(PortInfo::id);
        ports
    }

    /// Gets the number of ports in this recipe.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Checks whether this recipe has no ports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Merges another recipe into a copy of this one. See [`merge_recipes`].
    #[must_use]
    pub fn merge(&self, other: &Recipe) -> Recipe {
        merge_recipes(self, other)
    }

    /// Creates a factory for contexts that resolve ports using this recipe.
    #[must_use]
    pub fn context_factory(self) -> ContextFactory {
        ContextFactory::new(self)
    }

    pub(crate) fn adapter(&self, port: PortId) -> Option<&ErasedAdapter> {
        self.adapters.get(&port)
    }

    /// Copies this recipe, replacing the adapters of ports that also appear
    /// in `overrides`. Ports that only appear in `overrides` are ignored.
    pub(crate) fn patched(&self, overrides: &Recipe) -> Recipe {
        let mut patched = self.clone();
        for (id, adapter) in &overrides.adapters {
            if let Some(slot) = patched.adapters.get_mut(id) {
                trace!(port = adapter.port().name(), "overriding adapter");
                *slot = adapter.clone();
            } else {
                trace!(
                    port = adapter.port().name(),
                    "ignoring override for a port missing from the recipe"
                );
            }
        }

        patched
    }
}

impl Debug for Recipe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recipe")
            .field("ports", &self.ports())
            .finish()
    }
}

/// Merges two recipes into a new one. Adapters in `second` win over adapters
/// in `first` for ports that appear in both. Neither input is modified.
///
/// No check is made that the merged adapters still form an acyclic graph.
///
/// ```
/// use hexagonal_di::{merge_recipes, Adapter, Context, Port, Recipe};
///
/// let first_name = Port::<String>::new("FirstName");
/// let last_name = Port::<String>::new("LastName");
///
/// let people = Recipe::init(|builder| {
///     builder
///         .add_port(&first_name, Adapter::new(|| "John".to_owned()))?
///         .add_port(&last_name, Adapter::new(|| "Smith".to_owned()))
/// })
/// .unwrap();
/// let renamed = Recipe::init(|builder| {
///     builder.add_port(&last_name, Adapter::new(|| "Doe".to_owned()))
/// })
/// .unwrap();
///
/// let context = Context::new(merge_recipes(&people, &renamed));
/// assert_eq!("John", *context.get(&first_name).unwrap());
/// assert_eq!("Doe", *context.get(&last_name).unwrap());
/// ```
#[must_use]
pub fn merge_recipes(first: &Recipe, second: &Recipe) -> Recipe {
    let mut adapters = HashMap::with_capacity(first.len() + second.len());
    for recipe in [first, second] {
        for (&id, adapter) in &recipe.adapters {
            adapters.insert(id, adapter.clone());
        }
    }

    trace!(ports = adapters.len(), "merged recipes");
    Recipe::from_adapters(adapters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Adapter, Context};

    #[test]
    fn init_propagates_builder_errors() {
        let foo = Port::<i32>::new("Foo");
        let bar = Port::<i32>::new("Bar");

        let result = Recipe::init(|builder| {
            builder.add_port(
                &bar,
                Adapter::requiring([foo.info()], move |resolver| {
                    Ok(*resolver.get(&foo)?)
                }),
            )
        });

        assert!(result.is_err());
    }

    #[test]
    fn merge_keeps_ports_from_both_recipes() {
        let foo = Port::<i32>::new("Foo");
        let bar = Port::<i32>::new("Bar");
        let baz = Port::<i32>::new("Baz");

        let first = Recipe::init(|builder| {
            builder
                .add_port(&foo, Adapter::new(|| 1))?
                .add_port(&bar, Adapter::new(|| 2))
        })
        .unwrap();
        let second = Recipe::init(|builder| {
            builder
                .add_port(&bar, Adapter::new(|| 20))?
                .add_port(&baz, Adapter::new(|| 30))
        })
        .unwrap();

        let merged = first.merge(&second);
        assert_eq!(vec![foo.info(), bar.info(), baz.info()], merged.ports());

        let context = Context::new(merged);
        assert_eq!(1, *context.get(&foo).unwrap());
        assert_eq!(20, *context.get(&bar).unwrap());
        assert_eq!(30, *context.get(&baz).unwrap());
    }

    #[test]
    fn merge_does_not_modify_inputs() {
        let foo = Port::<i32>::new("Foo");
        let bar = Port::<i32>::new("Bar");

        let first =
            Recipe::init(|builder| builder.add_port(&foo, Adapter::new(|| 1)))
                .unwrap();
        let second =
            Recipe::init(|builder| builder.add_port(&bar, Adapter::new(|| 2)))
                .unwrap();

        let _merged = merge_recipes(&first, &second);
        assert_eq!(vec![foo.info()], first.ports());
        assert_eq!(vec![bar.info()], second.ports());
    }

    #[test]
    fn patched_only_replaces_existing_ports() {
        let foo = Port::<i32>::new("Foo");
        let bar = Port::<i32>::new("Bar");

        let base =
            Recipe::init(|builder| builder.add_port(&foo, Adapter::new(|| 1)))
                .unwrap();
        let overrides = Recipe::init(|builder| {
            builder
                .add_port(&foo, Adapter::new(|| 10))?
                .add_port(&bar, Adapter::new(|| 20))
        })
        .unwrap();

        let patched = base.patched(&overrides);
        assert_eq!(vec![foo.info()], patched.ports());
        assert_eq!(vec![foo.info()], base.ports());

        let context = Context::new(patched);
        assert_eq!(10, *context.get(&foo).unwrap());
        assert!(context.get(&bar).is_err());

        let context = Context::new(base);
        assert_eq!(1, *context.get(&foo).unwrap());
    }
}
