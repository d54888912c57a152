use crate::{
    Adapter, ErasedAdapter, InjectError, InjectResult, Port, PortId, PortInfo,
    Recipe, Service,
};
use std::collections::HashMap;

struct Entry {
    position: usize,
    adapter: ErasedAdapter,
}

/// A builder for a [`Recipe`]. Builders are only handed out by
/// [`Recipe::init`].
///
/// The ports added so far form the builder's capability set. An adapter can
/// only require ports that are already in that set, so a dependency cycle
/// cannot be wired through a builder:
///
/// ```
/// use hexagonal_di::{Adapter, InjectError, Port, Recipe};
///
/// let name = Port::<String>::new("Name");
/// let greeting = Port::<String>::new("Greeting");
///
/// let result = Recipe::init(|builder| {
///     builder
///         .add_port(
///             &greeting,
///             Adapter::requiring([name.info()], move |resolver| {
///                 Ok(format!("Hello, {}!", resolver.get(&name)?))
///             }),
///         )?
///         .add_port(&name, Adapter::new(|| "John".to_owned()))
/// });
///
/// match result {
///     Err(InjectError::UnregisteredDependency { dependency, .. })
///         if dependency == name.info() => {}
///     Err(error) => Err(error).unwrap(),
///     Ok(_) => unreachable!("greeting was added before its dependency"),
/// }
/// ```
pub struct RecipeBuilder {
    entries: HashMap<PortId, Entry>,
}

impl RecipeBuilder {
    pub(crate) fn new() -> Self {
        RecipeBuilder {
            entries: HashMap::new(),
        }
    }

    /// Assigns the adapter for a port and adds the port to the capability
    /// set. Adding a port that was already added replaces its adapter.
    ///
    /// Every port the adapter requires must have been added before this port.
    /// A port that is added again keeps its original place in that order, so
    /// its new adapter can't require ports added after it.
    pub fn add_port<T>(
        mut self,
        port: &Port<T>,
        adapter: Adapter<T>,
    ) -> InjectResult<Self>
    where
        T: ?Sized + Service,
    {
        let info = port.info();
        let position = self
            .entries
            .get(&info.id())
            .map_or(self.entries.len(), |entry| entry.position);

        for &dependency in adapter.requires() {
            match self.entries.get(&dependency.id()) {
                Some(entry) if entry.position < position => {}
                _ => {
                    warn!(
                        port = info.name(),
                        dependency = dependency.name(),
                        "rejected adapter with an unregistered dependency"
                    );
                    return Err(InjectError::UnregisteredDependency {
                        port: info,
                        dependency,
                    });
                }
            }
        }

        let entry = Entry {
            position,
            adapter: adapter.into_erased(info),
        };
        if self.entries.insert(info.id(), entry).is_some() {
            debug!(port = info.name(), "replaced adapter");
        } else {
            debug!(port = info.name(), position, "added port");
        }

        Ok(self)
    }

    /// Checks whether a port has been added to this builder.
    #[must_use]
    pub fn contains<T>(&self, port: &Port<T>) -> bool
    where
        T: ?Sized + Service,
    {
        self.entries.contains_key(&port.info().id())
    }

    /// Gets the ports added so far, in the order they were first added.
    #[must_use]
    pub fn capabilities(&self) -> Vec<PortInfo> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.position);
        entries.iter().map(|entry| entry.adapter.port()).collect()
    }

    /// Freezes the builder into a [`Recipe`].
    #[must_use]
    pub fn to_recipe(self) -> Recipe {
        Recipe::from_adapters(
            self.entries
                .into_iter()
                .map(|(id, entry)| (id, entry.adapter))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_can_require_previously_added_port() {
        let foo = Port::<i32>::new("Foo");
        let bar = Port::<i32>::new("Bar");

        let builder = RecipeBuilder::new()
            .add_port(&foo, Adapter::new(|| 1))
            .and_then(|builder| {
                builder.add_port(
                    &bar,
                    Adapter::requiring([foo.info()], move |resolver| {
                        Ok(*resolver.get(&foo)? + 1)
                    }),
                )
            })
            .unwrap();

        assert!(builder.contains(&foo));
        assert!(builder.contains(&bar));
        assert_eq!(vec![foo.info(), bar.info()], builder.capabilities());
    }

    #[test]
    fn adapter_cannot_require_itself() {
        let foo = Port::<i32>::new("Foo");
        let result = RecipeBuilder::new().add_port(
            &foo,
            Adapter::requiring([foo.info()], move |resolver| {
                Ok(*resolver.get(&foo)?)
            }),
        );

        match result {
            Err(InjectError::UnregisteredDependency { port, dependency })
                if port == foo.info() && dependency == foo.info() => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("a port should not be able to require itself"),
        }
    }

    #[test]
    fn replaced_adapter_cannot_require_later_ports() {
        let foo = Port::<i32>::new("Foo");
        let bar = Port::<i32>::new("Bar");

        let result = RecipeBuilder::new()
            .add_port(&foo, Adapter::new(|| 1))
            .and_then(|builder| {
                builder.add_port(
                    &bar,
                    Adapter::requiring([foo.info()], move |resolver| {
                        Ok(*resolver.get(&foo)?)
                    }),
                )
            })
            .and_then(|builder| {
                builder.add_port(
                    &foo,
                    Adapter::requiring([bar.info()], move |resolver| {
                        Ok(*resolver.get(&bar)?)
                    }),
                )
            });

        match result {
            Err(InjectError::UnregisteredDependency { port, dependency })
                if port == foo.info() && dependency == bar.info() => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("replacing foo would have created a cycle"),
        }
    }

    #[test]
    fn replacing_adapter_keeps_position() {
        let foo = Port::<i32>::new("Foo");
        let bar = Port::<i32>::new("Bar");

        let builder = RecipeBuilder::new()
            .add_port(&foo, Adapter::new(|| 1))
            .and_then(|builder| builder.add_port(&bar, Adapter::new(|| 2)))
            .and_then(|builder| builder.add_port(&foo, Adapter::new(|| 3)))
            .unwrap();

        assert_eq!(vec![foo.info(), bar.info()], builder.capabilities());
    }
}
