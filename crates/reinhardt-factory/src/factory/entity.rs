//! Entity collaborators.
//!
//! A builder never constructs entities itself. It asks a
//! [`CreationStrategy`] for a bare instance, a [`Hydrator`] to write the
//! generated attributes onto it and, on `create`, a [`Store`] to persist it.
//! [`EntityFactory`] bundles the three together with the creation hooks:
//! batch hooks around the stores, and per-entity hooks run after each
//! stored entity's callbacks.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::attributes::Attributes;
use super::callbacks::EntityCallback;
use crate::error::{FactoryError, FactoryResult};
use crate::faker::Faker;

/// A value a factory can build.
pub trait Entity: 'static {
	/// Returns the primary key used when another entity references this one.
	fn primary_key(&self) -> Option<Value>;
}

/// Instantiates a bare entity for a class.
pub trait CreationStrategy<E>: Send + Sync {
	/// Creates an instance of `class`. The attributes are informational;
	/// writing them is the hydrator's job.
	fn create(&self, class: &str, attributes: &Attributes) -> FactoryResult<E>;
}

/// Strategy delegating to a closure.
pub struct ClosureStrategy<E> {
	closure: Box<dyn Fn(&str, &Attributes) -> FactoryResult<E> + Send + Sync>,
}

impl<E> ClosureStrategy<E> {
	/// Creates a strategy from a closure.
	pub fn new<F>(closure: F) -> Self
	where
		F: Fn(&str, &Attributes) -> FactoryResult<E> + Send + Sync + 'static,
	{
		Self {
			closure: Box::new(closure),
		}
	}
}

impl<E> CreationStrategy<E> for ClosureStrategy<E> {
	fn create(&self, class: &str, attributes: &Attributes) -> FactoryResult<E> {
		(self.closure)(class, attributes)
	}
}

/// Strategy returning `E::default()` without looking at the attributes.
pub struct DefaultInstanceStrategy<E>(PhantomData<fn() -> E>);

impl<E> DefaultInstanceStrategy<E> {
	/// Creates the strategy.
	pub fn new() -> Self {
		Self(PhantomData)
	}
}

impl<E> Default for DefaultInstanceStrategy<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E: Default> CreationStrategy<E> for DefaultInstanceStrategy<E> {
	fn create(&self, _class: &str, _attributes: &Attributes) -> FactoryResult<E> {
		Ok(E::default())
	}
}

/// Writes attributes onto an entity.
pub trait Hydrator<E>: Send + Sync {
	/// Returns `entity` with `attributes` applied.
	fn hydrate(&self, entity: E, attributes: &Attributes) -> FactoryResult<E>;
}

/// Hydrator going through serde: the entity is serialized to a JSON
/// object, the attributes are written over it and the result is
/// deserialized back.
///
/// Keys that do not match a field follow the entity's serde policy
/// (ignored by default, rejected with `deny_unknown_fields`).
pub struct SerdeHydrator<E>(PhantomData<fn() -> E>);

impl<E> SerdeHydrator<E> {
	/// Creates the hydrator.
	pub fn new() -> Self {
		Self(PhantomData)
	}
}

impl<E> Default for SerdeHydrator<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E: Serialize + DeserializeOwned> Hydrator<E> for SerdeHydrator<E> {
	fn hydrate(&self, entity: E, attributes: &Attributes) -> FactoryResult<E> {
		let mut fields = match serde_json::to_value(&entity)
			.map_err(|e| FactoryError::Hydration(e.to_string()))?
		{
			Value::Object(fields) => fields,
			other => {
				return Err(FactoryError::Hydration(format!(
					"Expected entity to serialize as an object, got {}",
					other
				)));
			}
		};

		for (key, value) in attributes {
			fields.insert(key.clone(), value.clone());
		}

		serde_json::from_value(Value::Object(fields))
			.map_err(|e| FactoryError::Hydration(e.to_string()))
	}
}

/// Hydrator delegating to a closure.
pub struct ClosureHydrator<E> {
	closure: Box<dyn Fn(E, &Attributes) -> FactoryResult<E> + Send + Sync>,
}

impl<E> ClosureHydrator<E> {
	/// Creates a hydrator from a closure.
	pub fn new<F>(closure: F) -> Self
	where
		F: Fn(E, &Attributes) -> FactoryResult<E> + Send + Sync + 'static,
	{
		Self {
			closure: Box::new(closure),
		}
	}
}

impl<E> Hydrator<E> for ClosureHydrator<E> {
	fn hydrate(&self, entity: E, attributes: &Attributes) -> FactoryResult<E> {
		(self.closure)(entity, attributes)
	}
}

/// Options passed to [`Store::store`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreOptions {
	/// Free-form options understood by the host's store.
	pub values: Attributes,
}

impl StoreOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an option.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.values.insert(key.into(), value.into());
		self
	}

	/// Looks up an option.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.values.get(key)
	}
}

/// Persists created entities.
pub trait Store<E>: Send + Sync {
	/// Persists a single entity.
	fn store(&self, entity: &E, options: &StoreOptions) -> FactoryResult<()>;
}

/// Store that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl<E> Store<E> for NullStore {
	fn store(&self, _entity: &E, _options: &StoreOptions) -> FactoryResult<()> {
		Ok(())
	}
}

/// Hook run once per `create` batch.
pub type BatchHook<E> = Arc<dyn Fn(&[E]) + Send + Sync>;

/// Bundle of the collaborators a builder works with.
pub struct EntityFactory<E> {
	strategy: Arc<dyn CreationStrategy<E>>,
	hydrator: Arc<dyn Hydrator<E>>,
	store: Arc<dyn Store<E>>,
	before_creation: Vec<BatchHook<E>>,
	after_creation: Vec<BatchHook<E>>,
	after_creating_entity: Vec<EntityCallback<E>>,
}

impl<E: 'static> EntityFactory<E> {
	/// Creates a bundle with the given strategy and hydrator and a
	/// [`NullStore`].
	pub fn new(
		strategy: impl CreationStrategy<E> + 'static,
		hydrator: impl Hydrator<E> + 'static,
	) -> Self {
		Self {
			strategy: Arc::new(strategy),
			hydrator: Arc::new(hydrator),
			store: Arc::new(NullStore),
			before_creation: Vec::new(),
			after_creation: Vec::new(),
			after_creating_entity: Vec::new(),
		}
	}

	/// Replaces the store.
	pub fn with_store(mut self, store: impl Store<E> + 'static) -> Self {
		self.store = Arc::new(store);
		self
	}

	/// Returns a copy of this bundle using another creation strategy.
	pub fn with_strategy(&self, strategy: Arc<dyn CreationStrategy<E>>) -> Self {
		let mut factory = self.clone();
		factory.strategy = strategy;
		factory
	}

	/// Adds a hook run before a batch is stored.
	pub fn before_creation<F>(&mut self, hook: F) -> &mut Self
	where
		F: Fn(&[E]) + Send + Sync + 'static,
	{
		self.before_creation.push(Arc::new(hook));
		self
	}

	/// Adds a hook run after a batch is stored.
	pub fn after_creation<F>(&mut self, hook: F) -> &mut Self
	where
		F: Fn(&[E]) + Send + Sync + 'static,
	{
		self.after_creation.push(Arc::new(hook));
		self
	}

	/// Adds a hook run for every created entity, after the class's
	/// after-creating callbacks.
	pub fn after_creating_entity<F>(&mut self, hook: F) -> &mut Self
	where
		F: Fn(&E, &Faker) + Send + Sync + 'static,
	{
		self.after_creating_entity.push(Arc::new(hook));
		self
	}
}

impl<E> EntityFactory<E> {
	/// Instantiates a bare entity.
	pub fn create(&self, class: &str, attributes: &Attributes) -> FactoryResult<E> {
		self.strategy.create(class, attributes)
	}

	/// Writes attributes onto an entity.
	pub fn hydrate(&self, entity: E, attributes: &Attributes) -> FactoryResult<E> {
		self.hydrator.hydrate(entity, attributes)
	}

	/// Persists an entity.
	pub fn store(&self, entity: &E, options: &StoreOptions) -> FactoryResult<()> {
		self.store.store(entity, options)
	}

	/// Hooks run before a batch is stored.
	pub fn before_creation_hooks(&self) -> &[BatchHook<E>] {
		&self.before_creation
	}

	/// Hooks run after a batch is stored.
	pub fn after_creation_hooks(&self) -> &[BatchHook<E>] {
		&self.after_creation
	}

	/// Hooks run for every created entity.
	pub fn after_creating_entity_hooks(&self) -> &[EntityCallback<E>] {
		&self.after_creating_entity
	}
}

impl<E> Clone for EntityFactory<E> {
	fn clone(&self) -> Self {
		Self {
			strategy: Arc::clone(&self.strategy),
			hydrator: Arc::clone(&self.hydrator),
			store: Arc::clone(&self.store),
			before_creation: self.before_creation.clone(),
			after_creation: self.after_creation.clone(),
			after_creating_entity: self.after_creating_entity.clone(),
		}
	}
}

impl<E> fmt::Debug for EntityFactory<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EntityFactory")
			.field("before_creation", &self.before_creation.len())
			.field("after_creation", &self.after_creation.len())
			.field("after_creating_entity", &self.after_creating_entity.len())
			.finish_non_exhaustive()
	}
}
