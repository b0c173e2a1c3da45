//! Error types for the factory module.
//!
//! This module defines the error types used throughout the reinhardt-factory crate.

use thiserror::Error;

/// Errors that can occur while building entities or querying seeds.
#[derive(Debug, Error)]
pub enum FactoryError {
	/// No definition is registered for the requested class.
	#[error("Unable to locate factory for [{0}]")]
	UndefinedFactory(String),

	/// A named state was requested that has neither a state function nor callbacks.
	#[error("Unable to locate [{state}] state for [{class}]")]
	InvalidState {
		/// Class the builder is bound to.
		class: String,
		/// Requested state name.
		state: String,
	},

	/// A sampling request exceeded the number of available items.
	#[error("You requested {requested} items, but there are only {available} items available")]
	InsufficientItems {
		/// Number of items requested.
		requested: usize,
		/// Number of items in the collection.
		available: usize,
	},

	/// A seed repository holds no data for the class.
	#[error("Seeds for entity [{0}] not found")]
	SeedsNotFound(String),

	/// The fake data provider could not produce another unique value.
	#[error("Maximum retries of {attempts} reached without finding a unique {kind} value")]
	ProviderExhausted {
		/// Faker kind that ran out of values.
		kind: String,
		/// Number of attempts made.
		attempts: usize,
	},

	/// The creation strategy failed to instantiate an entity.
	#[error("Creation error: {0}")]
	Creation(String),

	/// The hydrator failed to write attributes onto an entity.
	#[error("Hydration error: {0}")]
	Hydration(String),

	/// The storage sink failed to persist an entity.
	#[error("Storage error: {0}")]
	Storage(String),

	/// A nested builder produced an entity without a primary key.
	#[error("Entity [{0}] has no primary key to reference")]
	MissingPrimaryKey(String),

	/// Invalid seed file format detected.
	#[error("Invalid fixture format: {0}")]
	InvalidFormat(String),

	/// Error parsing seed file data.
	#[error("Parse error: {0}")]
	ParseError(String),

	/// Error serializing data to a seed file.
	#[error("Serialization error: {0}")]
	SerializationError(String),

	/// Seed file not found.
	#[error("Fixture file not found: {0}")]
	FileNotFound(String),

	/// Unsupported file extension.
	#[error("Unsupported file extension: {0}")]
	UnsupportedExtension(String),

	/// Configuration could not be parsed.
	#[error("Configuration error: {0}")]
	Config(String),

	/// I/O operation failed.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// YAML serialization/deserialization error (when yaml feature is enabled).
	#[cfg(feature = "yaml")]
	#[error("YAML error: {0}")]
	Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;
