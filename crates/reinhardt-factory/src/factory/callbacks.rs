//! Lifecycle callbacks.
//!
//! Callbacks are kept as a flat list of `(class, phase, state, callback)`
//! entries and selected by filtering.

use std::fmt;
use std::sync::Arc;

use crate::faker::Faker;

/// State name of callbacks registered without one.
pub const DEFAULT_STATE: &str = "default";

/// Callback invoked with each built entity.
pub type EntityCallback<E> = Arc<dyn Fn(&E, &Faker) + Send + Sync>;

/// Point of the lifecycle a callback is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackPhase {
	/// After the entity is instantiated and hydrated.
	AfterMaking,
	/// After the entity is stored.
	AfterCreating,
}

struct CallbackEntry<E> {
	class: String,
	phase: CallbackPhase,
	state: String,
	callback: EntityCallback<E>,
}

impl<E> Clone for CallbackEntry<E> {
	fn clone(&self) -> Self {
		Self {
			class: self.class.clone(),
			phase: self.phase,
			state: self.state.clone(),
			callback: Arc::clone(&self.callback),
		}
	}
}

/// Registered callbacks.
pub struct Callbacks<E> {
	entries: Vec<CallbackEntry<E>>,
}

impl<E> Callbacks<E> {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self {
			entries: Vec::new(),
		}
	}

	/// Appends a callback.
	pub fn push(
		&mut self,
		class: impl Into<String>,
		phase: CallbackPhase,
		state: impl Into<String>,
		callback: EntityCallback<E>,
	) {
		self.entries.push(CallbackEntry {
			class: class.into(),
			phase,
			state: state.into(),
			callback,
		});
	}

	/// Returns the callbacks registered for `class`.
	pub fn for_class(&self, class: &str) -> Self {
		Self {
			entries: self
				.entries
				.iter()
				.filter(|entry| entry.class == class)
				.cloned()
				.collect(),
		}
	}

	/// Returns true if any phase has a callback for `class` under `state`.
	pub fn has_state(&self, class: &str, state: &str) -> bool {
		self.entries
			.iter()
			.any(|entry| entry.class == class && entry.state == state)
	}

	/// Iterates the callbacks of one bucket in registration order.
	pub fn matching<'a>(
		&'a self,
		class: &'a str,
		phase: CallbackPhase,
		state: &'a str,
	) -> impl Iterator<Item = &'a EntityCallback<E>> + 'a {
		self.entries
			.iter()
			.filter(move |entry| entry.class == class && entry.phase == phase && entry.state == state)
			.map(|entry| &entry.callback)
	}

	/// Runs the default bucket, then the bucket of every active state, for
	/// one entity.
	pub fn run(
		&self,
		class: &str,
		phase: CallbackPhase,
		active_states: &[String],
		entity: &E,
		faker: &Faker,
	) {
		let buckets = std::iter::once(DEFAULT_STATE).chain(active_states.iter().map(String::as_str));
		for state in buckets {
			for callback in self.matching(class, phase, state) {
				callback(entity, faker);
			}
		}
	}

	/// Number of registered callbacks.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if no callback is registered.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<E> Default for Callbacks<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E> Clone for Callbacks<E> {
	fn clone(&self) -> Self {
		Self {
			entries: self.entries.clone(),
		}
	}
}

impl<E> fmt::Debug for Callbacks<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(
				self.entries
					.iter()
					.map(|entry| (&entry.class, entry.phase, &entry.state)),
			)
			.finish()
	}
}
