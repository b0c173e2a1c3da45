//! Convenience re-exports for common usage.
//!
//! # Example
//!
//! ```ignore
//! use reinhardt_factory::prelude::*;
//! ```

// Error and configuration types
pub use crate::config::FactoryConfig;
pub use crate::error::{FactoryError, FactoryResult};

// Factory types
pub use crate::factory::{
	AttributeMap, AttributeValue, Attributes, Built, ClosureHydrator, ClosureStrategy,
	CreationStrategy, DefaultInstanceStrategy, Entity, EntityBuilder, EntityFactory, Factory,
	Hydrator, NullStore, SerdeHydrator, Store, StoreOptions,
};

// Fake data
pub use crate::faker::{Faker, FakerType};

// Seeds
pub use crate::seeds::{
	FileSeedRepository, InMemorySeedRepository, SeedKey, SeedRepository, Seeds,
};

// Seed files
pub use crate::fixtures::FixtureFormat;

// Attribute map literal
pub use crate::attributes;

// Common serde items used by entity definitions
pub use serde::{Deserialize, Serialize};
pub use serde_json::{Value, json};
