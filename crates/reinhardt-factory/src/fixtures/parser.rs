//! Seed file parsing.
//!
//! A seed file holds either a list of records or a single record. Records
//! are deserialized into any `T: DeserializeOwned`, usually
//! [`Attributes`](crate::factory::Attributes).

use std::path::Path;

use serde::de::DeserializeOwned;

use super::FixtureFormat;
use crate::error::{FactoryError, FactoryResult};

/// Parser for seed files.
///
/// Supports both JSON and YAML formats (YAML requires the `yaml` feature).
#[derive(Debug, Default)]
pub struct FixtureParser;

impl FixtureParser {
	/// Creates a new parser.
	pub fn new() -> Self {
		Self
	}

	/// Parses a seed file from the given path.
	///
	/// The format is detected from the file extension.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - The file extension is not recognized
	/// - The file cannot be read
	/// - The file content is invalid
	pub fn parse_file<T: DeserializeOwned>(&self, path: &Path) -> FactoryResult<Vec<T>> {
		let format = FixtureFormat::from_path(path).ok_or_else(|| {
			FactoryError::UnsupportedExtension(
				path.extension()
					.and_then(|e| e.to_str())
					.unwrap_or("(none)")
					.to_string(),
			)
		})?;

		let content = std::fs::read_to_string(path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				FactoryError::FileNotFound(path.display().to_string())
			} else {
				FactoryError::Io(e)
			}
		})?;

		self.parse_string(&content, format)
	}

	/// Parses records from a string.
	pub fn parse_string<T: DeserializeOwned>(
		&self,
		content: &str,
		format: FixtureFormat,
	) -> FactoryResult<Vec<T>> {
		match format {
			FixtureFormat::Json => self.parse_json(content),
			FixtureFormat::Yaml => self.parse_yaml(content),
		}
	}

	fn parse_json<T: DeserializeOwned>(&self, content: &str) -> FactoryResult<Vec<T>> {
		let value: serde_json::Value = serde_json::from_str(content)?;

		match value {
			serde_json::Value::Array(arr) => arr
				.into_iter()
				.enumerate()
				.map(|(idx, item)| {
					serde_json::from_value(item).map_err(|e| {
						FactoryError::ParseError(format!("Invalid record at index {}: {}", idx, e))
					})
				})
				.collect(),
			serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
			_ => Err(FactoryError::InvalidFormat(
				"Expected array or object".to_string(),
			)),
		}
	}

	#[cfg(feature = "yaml")]
	fn parse_yaml<T: DeserializeOwned>(&self, content: &str) -> FactoryResult<Vec<T>> {
		let value: serde_yaml::Value = serde_yaml::from_str(content)?;

		match value {
			serde_yaml::Value::Sequence(seq) => seq
				.into_iter()
				.enumerate()
				.map(|(idx, item)| {
					serde_yaml::from_value(item).map_err(|e| {
						FactoryError::ParseError(format!("Invalid record at index {}: {}", idx, e))
					})
				})
				.collect(),
			serde_yaml::Value::Mapping(_) => Ok(vec![serde_yaml::from_value(value)?]),
			_ => Err(FactoryError::InvalidFormat(
				"Expected sequence or mapping".to_string(),
			)),
		}
	}

	#[cfg(not(feature = "yaml"))]
	fn parse_yaml<T: DeserializeOwned>(&self, _content: &str) -> FactoryResult<Vec<T>> {
		Err(FactoryError::UnsupportedExtension(
			"YAML support requires the 'yaml' feature".to_string(),
		))
	}
}
