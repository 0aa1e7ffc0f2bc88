//! # Dependency injection with composable component behaviors.
//!
//! Components are registered with a [`Container`] together with the factory
//! that builds them. Whenever a component is requested, the container
//! resolves the arguments of its factory from the other registered
//! components. Components can depend on concrete types, on interfaces
//! (trait objects), on optional components or on collections of components.
//!
//! ## Component adapters
//!
//! Each registration becomes a [`ComponentAdapter`]. The innermost adapter of
//! a component is usually a [`ConstructorInjector`], which creates a new
//! instance on every request. Behaviors wrap that adapter to change how and
//! when instances are created:
//!
//! - **[Cached]:** the first instance is reused for every later request and
//!   takes part in the lifecycle of the container.
//! - **[ThreadCached]:** one instance is kept per thread.
//! - **[Pooled]:** instances are lent out from a bounded pool.
//! - **[HotSwappable]:** the instance can be replaced at runtime.
//! - **[Synchronized] and [Locked]:** creation is serialized.
//! - **[HiddenImplementation]:** only the interfaces of a component can be
//!   requested, never its concrete type.
//! - **[Guarded]:** creation only happens when another component allows it.
//! - **[Automated]:** the component is created as soon as the container
//!   starts.
//!
//! Which behaviors a component gets is decided by the [`ComponentFactory`]
//! of its container. By default, the [`AdaptingBehavior`] picks them from the
//! [characteristics](crate::characteristics) given at registration.
//!
//! ## Lifecycle
//!
//! Components implementing [`Startable`] or [`Disposable`] can opt into the
//! lifecycle of their container. Starting a container starts its components
//! in dependency order, and stopping or disposing it walks them in reverse.
//! Child containers follow the lifecycle of their parents.
//!
//! ## Monitors and visitors
//!
//! A [`ComponentMonitor`] is told about every instantiation and lifecycle
//! call. A [`PicoVisitor`] can walk a whole container hierarchy, for example
//! to [verify](Container::verify) that every dependency can be satisfied.
//!
//! ## Example
//!
//! ```
//! use pico_container::{
//!     characteristics::CACHE, define_module, interface, Container,
//!     PicoContainerExt, Svc,
//! };
//! use std::error::Error;
//!
//! struct User;
//!
//! trait DataService: Send + Sync {
//!     fn get_user(&self, user_id: &str) -> Option<User>;
//! }
//!
//! #[derive(Default)]
//! struct SqlDataService;
//! impl DataService for SqlDataService {
//!     fn get_user(&self, _user_id: &str) -> Option<User> { None }
//! }
//!
//! #[derive(Default)]
//! struct MockDataService;
//! impl DataService for MockDataService {
//!     fn get_user(&self, _user_id: &str) -> Option<User> { Some(User) }
//! }
//!
//! // Only registers the types as possible implementations of the interface.
//! interface!(DataService = [SqlDataService, MockDataService]);
//!
//! struct UserService {
//!     data_service: Svc<dyn DataService>,
//! }
//!
//! impl UserService {
//!     pub fn new(data_service: Svc<dyn DataService>) -> Self {
//!         UserService { data_service }
//!     }
//!
//!     pub fn get_user(&self, user_id: &str) -> Option<User> {
//!         self.data_service.get_user(user_id)
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let container = Container::new();
//!
//!     // Nothing is created until it is requested.
//!     container
//!         .register(UserService::new)
//!         .characteristics(CACHE)
//!         .add()?;
//!
//!     let module = define_module! {
//!         interfaces = {
//!             dyn DataService = [MockDataService::default],
//!         },
//!         configs = {
//!             "pool-size" = 8_usize,
//!         },
//!     };
//!     container.add_module(module)?;
//!
//!     container.verify()?;
//!     container.start()?;
//!
//!     let user_service: Svc<UserService> = container.get()?;
//!     assert!(user_service.get_user("john").is_some());
//!
//!     container.dispose()?;
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

mod adapters;
mod behaviors;
mod builder;
mod container;
mod factories;
mod iter;
mod key;
mod lifecycle;
mod module;
mod monitors;
mod requests;
mod services;
mod visitors;

pub use adapters::*;
pub use behaviors::*;
pub use builder::*;
pub use container::*;
pub use factories::*;
pub use iter::*;
pub use key::*;
pub use lifecycle::*;
pub use module::*;
pub use monitors::*;
pub use requests::*;
pub use services::*;
pub use visitors::*;

pub mod characteristics;
pub use characteristics::{Characteristic, Properties};

#[cfg(test)]
mod tests;
