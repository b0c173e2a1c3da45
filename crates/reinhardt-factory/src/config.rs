//! Factory configuration.
//!
//! [`FactoryConfig`] can be built fluently or loaded from a TOML document,
//! e.g. a `[factory]` table kept next to the test suite:
//!
//! ```toml
//! seed = 42
//! max_unique_retries = 500
//! export_format = "json"
//! replace_existing_exports = false
//! ```

use serde::Deserialize;

use crate::error::{FactoryError, FactoryResult};
use crate::fixtures::FixtureFormat;

/// Default number of attempts a unique generator makes before giving up.
pub const DEFAULT_MAX_UNIQUE_RETRIES: usize = 10_000;

/// Settings shared by a [`Factory`](crate::factory::Factory) and its builders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
	/// Seed for the fake data provider. `None` seeds from system entropy.
	pub seed: Option<u64>,

	/// Attempts made by unique generators before reporting exhaustion.
	pub max_unique_retries: usize,

	/// Format written by [`EntityBuilder::export`](crate::factory::EntityBuilder::export).
	pub export_format: FixtureFormat,

	/// Whether exports overwrite files that already exist.
	pub replace_existing_exports: bool,
}

impl Default for FactoryConfig {
	fn default() -> Self {
		Self {
			seed: None,
			max_unique_retries: DEFAULT_MAX_UNIQUE_RETRIES,
			export_format: FixtureFormat::Json,
			replace_existing_exports: true,
		}
	}
}

impl FactoryConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a configuration from TOML.
	///
	/// Missing keys fall back to their defaults.
	pub fn from_toml_str(content: &str) -> FactoryResult<Self> {
		toml::from_str(content).map_err(|e| FactoryError::Config(e.to_string()))
	}

	/// Sets the fake data seed.
	pub fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	/// Sets the unique generator retry limit.
	pub fn with_max_unique_retries(mut self, retries: usize) -> Self {
		self.max_unique_retries = retries;
		self
	}

	/// Sets the export format.
	pub fn with_export_format(mut self, format: FixtureFormat) -> Self {
		self.export_format = format;
		self
	}

	/// Sets whether exports overwrite existing files.
	pub fn with_replace_existing_exports(mut self, replace: bool) -> Self {
		self.replace_existing_exports = replace;
		self
	}
}
