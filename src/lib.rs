//! # Port and adapter dependency injection.
//!
//! Application code names the capabilities it needs as [`Port`]s, and a
//! [`Recipe`] wires each port to an [`Adapter`] that produces its value. A
//! [`Context`] built from a recipe then resolves ports on demand, building
//! each value the first time it is requested and reusing it afterwards.
//!
//! By default, values are held in thread-safe pointers. This is because
//! [`Arc<T>`](std::sync::Arc) is used to hold them. This can be changed to
//! [`Rc<T>`](std::rc::Rc) by disabling default features and enabling the "rc"
//! feature:
//!
//! ```text
//! [dependencies.hexagonal_di]
//! version = "*" # Replace with the version you want to use
//! default-features = false
//! features = ["rc"]
//! ```
//!
//! ## Capabilities
//!
//! An adapter declares up front which ports it needs, and it is handed a
//! [`Resolver`] that can only resolve those ports. When an adapter is added to
//! a recipe, every port it requires must already be in the recipe. Since an
//! adapter can only depend on ports added before it, a dependency cycle can't
//! be wired at all, and resolution never has to look for one.
//!
//! ## Swapping implementations
//!
//! Any port can be swapped without touching the code that depends on it:
//!
//! - [`merge_recipes`] combines two recipes, preferring the second one's
//!   adapters.
//! - [`ContextFactory::create_with_overrides`] replaces adapters for a single
//!   context, which is handy for tests.
//! - [`Context::override_value`] sets a port's value directly.
//!
//! ## Logging
//!
//! When the "tracing" feature is enabled, wiring and resolution events are
//! emitted through the [`tracing`](https://docs.rs/tracing) crate.
//!
//! ## Example
//!
//! ```
//! use hexagonal_di::{make_context_factory, Adapter, Port, Recipe, Svc};
//! use std::error::Error;
//!
//! // Ports can name trait objects, so the code depending on them never has
//! // to know which implementation it was given.
//! trait UserStore: Send + Sync {
//!     fn name(&self, id: u32) -> Option<String>;
//! }
//!
//! struct InMemoryUserStore;
//! impl UserStore for InMemoryUserStore {
//!     fn name(&self, id: u32) -> Option<String> {
//!         (id == 1).then(|| "John".to_owned())
//!     }
//! }
//!
//! struct Greeter {
//!     users: Svc<dyn UserStore>,
//! }
//!
//! impl Greeter {
//!     fn greet(&self, id: u32) -> String {
//!         match self.users.name(id) {
//!             Some(name) => format!("Hello, {}!", name),
//!             None => "Hello, stranger!".to_owned(),
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let users = Port::<dyn UserStore>::new("UserStore");
//!     let greeter = Port::<Greeter>::new("Greeter");
//!
//!     // Nothing is built yet. Adapters only run when their port is
//!     // requested from a context.
//!     let recipe = Recipe::init(|builder| {
//!         builder
//!             .add_port(
//!                 &users,
//!                 Adapter::new(|| {
//!                     Svc::new(InMemoryUserStore) as Svc<dyn UserStore>
//!                 }),
//!             )?
//!             .add_port(
//!                 &greeter,
//!                 Adapter::requiring([users.info()], move |resolver| {
//!                     Ok(Greeter {
//!                         users: resolver.get(&users)?,
//!                     })
//!                 }),
//!             )
//!     })?;
//!
//!     let factory = make_context_factory(recipe);
//!     let context = factory.create();
//!     let greeter = context.get(&greeter)?;
//!     assert_eq!("Hello, John!", greeter.greet(1));
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]
#![warn(missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::needless_doctest_main
)]
#![cfg_attr(test, allow(clippy::disallowed_names))]

#[cfg(not(any(feature = "arc", feature = "rc")))]
compile_error!(
    "Either the 'arc' or 'rc' feature must be enabled (but not both)."
);

#[cfg(all(feature = "arc", feature = "rc"))]
compile_error!(
    "The 'arc' and 'rc' features are mutually exclusive and cannot be enabled together."
);

#[macro_use]
mod macros;

mod adapter;
mod builder;
mod context;
mod port;
mod recipe;
mod service;

pub use adapter::Adapter;
pub(crate) use adapter::ErasedAdapter;
pub use builder::*;
pub use context::*;
pub use port::*;
pub use recipe::*;
pub use service::*;
