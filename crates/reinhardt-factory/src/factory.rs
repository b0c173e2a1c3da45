//! Entity factories.
//!
//! - [`Factory`] - Registry of definitions, states and callbacks per class
//! - [`EntityBuilder`] - Builds, stores and exports entities of one class
//! - [`AttributeMap`] / [`AttributeValue`] - Unresolved attributes
//! - [`EntityFactory`] - Creation strategy, hydrator and store bundle

pub mod attributes;
pub mod builder;
pub mod callbacks;
pub mod entity;
pub mod registry;

pub use attributes::{AttributeMap, AttributeValue, Attributes, LazyFn, merge};
pub use builder::{Built, DefinitionFn, EntityBuilder, StateFn, short_class_name};
pub use callbacks::{CallbackPhase, Callbacks, DEFAULT_STATE, EntityCallback};
pub use entity::{
	BatchHook, ClosureHydrator, ClosureStrategy, CreationStrategy, DefaultInstanceStrategy, Entity,
	EntityFactory, Hydrator, NullStore, SerdeHydrator, Store, StoreOptions,
};
pub use registry::Factory;
