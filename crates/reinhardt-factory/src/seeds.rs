//! Seed collections.
//!
//! [`Seeds`] is an immutable, ordered collection of generated records of one
//! class. Every item carries a [`SeedKey`]; `slice`, `chunk`, `reverse` and
//! `random` keep the keys of the items they return, while `shuffle`
//! renumbers from zero.
//!
//! ```ignore
//! let users = repository.get("auth.User")?;
//!
//! let admins = users.take(2);
//! let last_three = users.take(-3);
//! for page in users.chunk(10).iter() { /* ... */ }
//! ```

pub mod random;
pub mod repository;

use std::ops::Index;

use rand::seq::SliceRandom;

use crate::error::{FactoryError, FactoryResult};

pub use repository::{FileSeedRepository, InMemorySeedRepository, SeedRepository};

/// Key of an item within a [`Seeds`] collection.
pub type SeedKey = usize;

/// Borrowing iterator over `(key, item)` pairs.
pub type Iter<'a, T> = std::iter::Map<std::slice::Iter<'a, (SeedKey, T)>, fn(&(SeedKey, T)) -> (SeedKey, &T)>;

fn split_pair<T>((key, item): &(SeedKey, T)) -> (SeedKey, &T) {
	(*key, item)
}

/// Ordered, keyed collection of records of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct Seeds<T> {
	class: String,
	items: Vec<(SeedKey, T)>,
}

impl<T> Seeds<T> {
	/// Creates a collection keyed `0..n`.
	pub fn new(class: impl Into<String>, items: Vec<T>) -> Self {
		Self {
			class: class.into(),
			items: items.into_iter().enumerate().collect(),
		}
	}

	/// Creates a collection from explicit `(key, item)` pairs, kept in the
	/// given order.
	pub fn from_keyed<I>(class: impl Into<String>, items: I) -> Self
	where
		I: IntoIterator<Item = (SeedKey, T)>,
	{
		Self {
			class: class.into(),
			items: items.into_iter().collect(),
		}
	}

	/// Creates an empty collection.
	pub fn empty(class: impl Into<String>) -> Self {
		Self::new(class, Vec::new())
	}

	/// Class the records belong to.
	pub fn class(&self) -> &str {
		&self.class
	}

	/// All `(key, item)` pairs in order.
	pub fn all(&self) -> &[(SeedKey, T)] {
		&self.items
	}

	/// First item, if any.
	pub fn first(&self) -> Option<&T> {
		self.items.first().map(|(_, item)| item)
	}

	/// Calls `f` with every item and its key until it returns `false`.
	pub fn each<F>(&self, mut f: F) -> &Self
	where
		F: FnMut(&T, SeedKey) -> bool,
	{
		for (key, item) in &self.items {
			if !f(item, *key) {
				break;
			}
		}
		self
	}

	/// Number of items.
	pub fn count(&self) -> usize {
		self.items.len()
	}

	/// Returns true if the collection holds nothing.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Looks up an item by key.
	pub fn get(&self, key: SeedKey) -> Option<&T> {
		self.items
			.iter()
			.find(|(k, _)| *k == key)
			.map(|(_, item)| item)
	}

	/// Returns true if an item has the given key.
	pub fn has(&self, key: SeedKey) -> bool {
		self.items.iter().any(|(k, _)| *k == key)
	}

	/// Keys in order.
	pub fn keys(&self) -> Vec<SeedKey> {
		self.items.iter().map(|(key, _)| *key).collect()
	}

	/// Iterates `(key, item)` pairs in order.
	pub fn iter(&self) -> Iter<'_, T> {
		self.items
			.iter()
			.map(split_pair as fn(&(SeedKey, T)) -> (SeedKey, &T))
	}

	/// Iterates the items in order.
	pub fn values(&self) -> impl Iterator<Item = &T> {
		self.items.iter().map(|(_, item)| item)
	}

	/// Consumes the collection and returns its items in order.
	pub fn into_values(self) -> Vec<T> {
		self.items.into_iter().map(|(_, item)| item).collect()
	}
}

impl<T: Clone> Seeds<T> {
	/// Splits the collection into chunks of `size` items.
	///
	/// Items keep their keys inside each chunk; chunks are keyed `0..n`.
	/// A zero size yields an empty collection.
	pub fn chunk(&self, size: usize) -> Seeds<Seeds<T>> {
		if size == 0 {
			return Seeds::empty(self.class.clone());
		}

		let chunks = self
			.items
			.chunks(size)
			.map(|chunk| Seeds::from_keyed(self.class.clone(), chunk.to_vec()))
			.collect();
		Seeds::new(self.class.clone(), chunks)
	}

	/// Picks distinct items at random, `1` when `number` is `None`.
	///
	/// The picked items keep their keys and their relative order.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::InsufficientItems`] if more items are requested
	/// than the collection holds.
	pub fn random(&self, number: Option<usize>) -> FactoryResult<Self> {
		let requested = number.unwrap_or(1);
		let available = self.items.len();
		if requested > available {
			return Err(FactoryError::InsufficientItems {
				requested,
				available,
			});
		}

		let mut picked =
			random::with_ambient(|rng| rand::seq::index::sample(rng, available, requested).into_vec());
		picked.sort_unstable();

		Ok(Self::from_keyed(
			self.class.clone(),
			picked.into_iter().map(|index| self.items[index].clone()),
		))
	}

	/// Reverses the order, keeping keys.
	pub fn reverse(&self) -> Self {
		Self::from_keyed(self.class.clone(), self.items.iter().rev().cloned())
	}

	/// Shuffles the items and renumbers them from zero.
	///
	/// With a seed the order is reproducible, and the ambient generator is
	/// left as it was before the call.
	pub fn shuffle(&self, seed: Option<u64>) -> Self {
		let mut values: Vec<T> = self.values().cloned().collect();
		match seed {
			Some(seed) => {
				random::with_seed(seed, || random::with_ambient(|rng| values.shuffle(rng)))
			}
			None => random::with_ambient(|rng| values.shuffle(rng)),
		}
		Self::new(self.class.clone(), values)
	}

	/// Returns the items from `offset`, keeping keys.
	///
	/// A negative `offset` counts from the end. A positive `length` caps the
	/// number of items, a negative one stops that many items before the end,
	/// and `None` runs to the end.
	pub fn slice(&self, offset: isize, length: Option<isize>) -> Self {
		let count = self.items.len() as isize;
		let start = if offset < 0 {
			(count + offset).max(0)
		} else {
			offset.min(count)
		};
		let end = match length {
			None => count,
			Some(length) if length < 0 => (count + length).max(start),
			Some(length) => start.saturating_add(length).min(count),
		};

		Self::from_keyed(
			self.class.clone(),
			self.items[start as usize..end as usize].iter().cloned(),
		)
	}

	/// Drops the first `count` items.
	pub fn skip(&self, count: usize) -> Self {
		self.slice(count.min(isize::MAX as usize) as isize, None)
	}

	/// Takes the first `limit` items, or the last `|limit|` when negative.
	pub fn take(&self, limit: isize) -> Self {
		if limit < 0 {
			self.slice(limit, Some(limit.saturating_neg()))
		} else {
			self.slice(0, Some(limit))
		}
	}
}

impl<T> Index<SeedKey> for Seeds<T> {
	type Output = T;

	fn index(&self, key: SeedKey) -> &T {
		match self.get(key) {
			Some(item) => item,
			None => panic!("no seed with key {} in [{}]", key, self.class),
		}
	}
}

impl<T> IntoIterator for Seeds<T> {
	type Item = (SeedKey, T);
	type IntoIter = std::vec::IntoIter<(SeedKey, T)>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.into_iter()
	}
}

impl<'a, T> IntoIterator for &'a Seeds<T> {
	type Item = (SeedKey, &'a T);
	type IntoIter = Iter<'a, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}
