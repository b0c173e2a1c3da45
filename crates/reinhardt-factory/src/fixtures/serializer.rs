//! Seed file serialization.

use std::path::Path;

use serde::Serialize;

use super::FixtureFormat;
use crate::error::{FactoryError, FactoryResult};

/// Serializer writing records to seed files.
#[derive(Debug, Clone)]
pub struct FixtureSerializer {
	/// Output format.
	format: FixtureFormat,

	/// Indentation for pretty printing. Zero writes compact JSON.
	indent: usize,
}

impl FixtureSerializer {
	/// Creates a serializer writing pretty-printed JSON.
	pub fn new() -> Self {
		Self {
			format: FixtureFormat::Json,
			indent: 2,
		}
	}

	/// Sets the output format.
	pub fn with_format(mut self, format: FixtureFormat) -> Self {
		self.format = format;
		self
	}

	/// Sets the indentation level.
	pub fn with_indent(mut self, indent: usize) -> Self {
		self.indent = indent;
		self
	}

	/// Serializes records to a string.
	///
	/// # Arguments
	///
	/// * `records` - Records to serialize
	///
	/// # Returns
	///
	/// Returns the serialized string.
	pub fn serialize<T: Serialize>(&self, records: &[T]) -> FactoryResult<String> {
		match self.format {
			FixtureFormat::Json => self.serialize_json(records),
			FixtureFormat::Yaml => self.serialize_yaml(records),
		}
	}

	fn serialize_json<T: Serialize>(&self, records: &[T]) -> FactoryResult<String> {
		if self.indent == 0 {
			return serde_json::to_string(records)
				.map_err(|e| FactoryError::SerializationError(e.to_string()));
		}

		let indent = " ".repeat(self.indent);
		let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
		let mut buffer = Vec::new();
		let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
		records
			.serialize(&mut serializer)
			.map_err(|e| FactoryError::SerializationError(e.to_string()))?;
		String::from_utf8(buffer).map_err(|e| FactoryError::SerializationError(e.to_string()))
	}

	#[cfg(feature = "yaml")]
	fn serialize_yaml<T: Serialize>(&self, records: &[T]) -> FactoryResult<String> {
		serde_yaml::to_string(records).map_err(|e| FactoryError::SerializationError(e.to_string()))
	}

	#[cfg(not(feature = "yaml"))]
	fn serialize_yaml<T: Serialize>(&self, _records: &[T]) -> FactoryResult<String> {
		Err(FactoryError::UnsupportedExtension(
			"YAML support requires the 'yaml' feature".to_string(),
		))
	}

	/// Writes serialized records to a file.
	pub fn write_to_file<T: Serialize>(&self, records: &[T], path: &Path) -> FactoryResult<()> {
		let content = self.serialize(records)?;
		std::fs::write(path, content)?;
		Ok(())
	}

	/// Returns the configured output format.
	pub fn format(&self) -> FixtureFormat {
		self.format
	}

	/// Returns the configured indentation level.
	pub fn indent(&self) -> usize {
		self.indent
	}
}

impl Default for FixtureSerializer {
	fn default() -> Self {
		Self::new()
	}
}
