//! Seed repositories.
//!
//! A repository hands out the [`Seeds`] of a class. The in-memory variant
//! wraps records that were just generated; the file variant reads seed
//! files written by an export, loading each one on first access.

use std::path::PathBuf;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;

use super::Seeds;
use crate::error::{FactoryError, FactoryResult};
use crate::fixtures::FixtureParser;

/// Source of seed collections keyed by class.
pub trait SeedRepository<T> {
	/// Returns the seeds of `class`.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::SeedsNotFound`] if the repository has nothing
	/// for `class`.
	fn get(&self, class: &str) -> FactoryResult<Seeds<T>>;

	/// Returns every class with its records.
	fn to_map(&self) -> FactoryResult<IndexMap<String, Vec<T>>>;
}

/// Repository over records held in memory.
#[derive(Debug, Clone)]
pub struct InMemorySeedRepository<T> {
	data: IndexMap<String, Vec<T>>,
}

impl<T> InMemorySeedRepository<T> {
	/// Wraps a class to records map.
	pub fn new(data: IndexMap<String, Vec<T>>) -> Self {
		Self { data }
	}

	/// Classes held, in insertion order.
	pub fn classes(&self) -> impl Iterator<Item = &str> {
		self.data.keys().map(String::as_str)
	}
}

impl<T: Clone> SeedRepository<T> for InMemorySeedRepository<T> {
	fn get(&self, class: &str) -> FactoryResult<Seeds<T>> {
		self.data
			.get(class)
			.map(|records| Seeds::new(class, records.clone()))
			.ok_or_else(|| FactoryError::SeedsNotFound(class.to_string()))
	}

	fn to_map(&self) -> FactoryResult<IndexMap<String, Vec<T>>> {
		Ok(self.data.clone())
	}
}

impl<T> From<IndexMap<String, Vec<T>>> for InMemorySeedRepository<T> {
	fn from(data: IndexMap<String, Vec<T>>) -> Self {
		Self::new(data)
	}
}

/// Repository over seed files, one per class.
///
/// Files are parsed on first access and kept for the lifetime of the
/// repository.
#[derive(Debug)]
pub struct FileSeedRepository<T> {
	entries: IndexMap<String, (PathBuf, OnceCell<Vec<T>>)>,
}

impl<T> FileSeedRepository<T> {
	/// Creates a repository from a class to file path map.
	pub fn new(class_map: IndexMap<String, PathBuf>) -> Self {
		Self {
			entries: class_map
				.into_iter()
				.map(|(class, path)| (class, (path, OnceCell::new())))
				.collect(),
		}
	}

	/// File backing `class`, if any.
	pub fn path(&self, class: &str) -> Option<&PathBuf> {
		self.entries.get(class).map(|(path, _)| path)
	}

	/// Returns true if the records of `class` have been read already.
	pub fn is_loaded(&self, class: &str) -> bool {
		self.entries
			.get(class)
			.is_some_and(|(_, cell)| cell.get().is_some())
	}
}

impl<T: DeserializeOwned> FileSeedRepository<T> {
	fn load(&self, class: &str) -> FactoryResult<&Vec<T>> {
		let (path, cell) = self
			.entries
			.get(class)
			.ok_or_else(|| FactoryError::SeedsNotFound(class.to_string()))?;

		cell.get_or_try_init(|| {
			let records: Vec<T> = FixtureParser::new().parse_file(path)?;
			tracing::debug!(class = %class, path = %path.display(), count = records.len(), "loaded seeds");
			Ok(records)
		})
	}
}

impl<T: DeserializeOwned + Clone> SeedRepository<T> for FileSeedRepository<T> {
	fn get(&self, class: &str) -> FactoryResult<Seeds<T>> {
		let records = self.load(class)?;
		Ok(Seeds::new(class, records.clone()))
	}

	fn to_map(&self) -> FactoryResult<IndexMap<String, Vec<T>>> {
		self.entries
			.keys()
			.map(|class| Ok((class.clone(), self.load(class)?.clone())))
			.collect()
	}
}
