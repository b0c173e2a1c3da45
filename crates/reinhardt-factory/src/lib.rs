//! Entity factories and seed collections for Reinhardt test suites.
//!
//! This crate builds fake domain entities from declarative definitions:
//!
//! - **Factories**: Register one attribute definition per class, compose it
//!   with states and lifecycle callbacks, and build, persist or export
//!   entities through a fluent builder
//! - **Fake Data**: A seedable [`Faker`] with unique value tracking
//! - **Seeds**: Immutable keyed collections of generated records, served
//!   from memory or from exported seed files
//!
//! # Features
//!
//! - `json` - JSON seed files (enabled by default)
//! - `yaml` - YAML seed files
//! - `full` - All features enabled
//!
//! # Quick Start
//!
//! Entities only need to expose their primary key. Construction, hydration
//! and storage are supplied by the host through [`EntityFactory`]:
//!
//! ```ignore
//! use reinhardt_factory::prelude::*;
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct User {
//!     id: String,
//!     username: String,
//!     email: String,
//!     is_admin: bool,
//! }
//!
//! impl Entity for User {
//!     fn primary_key(&self) -> Option<Value> {
//!         Some(Value::String(self.id.clone()))
//!     }
//! }
//!
//! let entity_factory = EntityFactory::new(DefaultInstanceStrategy::new(), SerdeHydrator::new())
//!     .with_store(my_store);
//! let mut factory = Factory::with_config(entity_factory, FactoryConfig::new().with_seed(42));
//!
//! factory
//!     .define("auth.User", |faker, _| {
//!         Ok(attributes! {
//!             "id" => faker.uuid(),
//!             "username" => faker.unique(FakerType::Username)?,
//!             "email" => faker.value(FakerType::SafeEmail),
//!         })
//!     })
//!     .named_state("auth.User", "admin", |_, _| Ok(attributes! { "is_admin" => true }));
//!
//! // A single stored entity
//! let admin = factory.of("auth.User")?.state("admin").create(attributes! {})?;
//!
//! // Ten in-memory entities with an override
//! let users = factory
//!     .of("auth.User")?
//!     .times(10)
//!     .make(attributes! { "email" => "shared@example.com" })?;
//! ```
//!
//! ## Seeds
//!
//! ```ignore
//! let repository = factory.raw(50)?;
//! let users = repository.get("auth.User")?;
//!
//! let first_page = users.take(10);
//! let sample = users.random(Some(5))?;
//! let stable = users.shuffle(Some(7));
//! ```
//!
//! # Architecture
//!
//! - [`Factory`](factory::Factory) - Registry of definitions, states and callbacks
//! - [`EntityBuilder`](factory::EntityBuilder) - Fluent builder bound to one class
//! - [`EntityFactory`](factory::EntityFactory) - Creation strategy, hydrator and store
//! - [`Seeds`](seeds::Seeds) - Keyed record collection
//! - [`SeedRepository`](seeds::SeedRepository) - In-memory and file backed repositories
//! - [`FixtureParser`](fixtures::FixtureParser) / [`FixtureSerializer`](fixtures::FixtureSerializer) - Seed files

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod factory;
pub mod faker;
pub mod fixtures;
pub mod prelude;
pub mod seeds;

// Re-export commonly used types at crate root
pub use config::FactoryConfig;
pub use error::{FactoryError, FactoryResult};
pub use factory::{AttributeMap, AttributeValue, Attributes, Entity, EntityBuilder, EntityFactory, Factory};
pub use faker::{Faker, FakerType};
pub use fixtures::FixtureFormat;
pub use seeds::{FileSeedRepository, InMemorySeedRepository, SeedKey, SeedRepository, Seeds};
