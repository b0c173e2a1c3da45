//! Factory registry.
//!
//! A [`Factory`] maps class identifiers (e.g. `"auth.User"`) to their
//! definition, states, callbacks and optional creation strategy, and hands
//! out [`EntityBuilder`]s bound to one class. There is no global instance:
//! each test suite owns its registry.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use super::attributes::{AttributeMap, Attributes};
use super::builder::{DefinitionFn, EntityBuilder, StateFn, short_class_name};
use super::callbacks::{CallbackPhase, Callbacks, DEFAULT_STATE};
use super::entity::{CreationStrategy, Entity, EntityFactory};
use crate::config::FactoryConfig;
use crate::error::{FactoryError, FactoryResult};
use crate::faker::Faker;
use crate::seeds::{FileSeedRepository, InMemorySeedRepository};

/// Registry of entity definitions.
///
/// # Example
///
/// ```ignore
/// let mut factory = Factory::new(entity_factory, Faker::seeded(42));
///
/// factory
///     .define("auth.User", |faker, _| {
///         Ok(attributes! {
///             "id" => faker.uuid(),
///             "username" => faker.unique(FakerType::Username)?,
///         })
///     })
///     .named_state("auth.User", "admin", |_, _| Ok(attributes! { "is_admin" => true }));
///
/// let admin = factory.of("auth.User")?.state("admin").create(attributes! {})?;
/// let users = factory.of("auth.User")?.times(10).make(attributes! {})?;
/// ```
pub struct Factory<E> {
	entity_factory: EntityFactory<E>,
	faker: Faker,
	config: FactoryConfig,
	definitions: IndexMap<String, DefinitionFn<E>>,
	states: HashMap<String, Vec<StateFn<E>>>,
	named_states: HashMap<String, IndexMap<String, StateFn<E>>>,
	callbacks: Callbacks<E>,
	strategies: HashMap<String, Arc<dyn CreationStrategy<E>>>,
}

impl<E: Entity> Factory<E> {
	/// Creates a registry with the default configuration.
	pub fn new(entity_factory: EntityFactory<E>, faker: Faker) -> Self {
		Self {
			entity_factory,
			faker,
			config: FactoryConfig::default(),
			definitions: IndexMap::new(),
			states: HashMap::new(),
			named_states: HashMap::new(),
			callbacks: Callbacks::new(),
			strategies: HashMap::new(),
		}
	}

	/// Creates a registry whose faker is seeded from `config`.
	pub fn with_config(entity_factory: EntityFactory<E>, config: FactoryConfig) -> Self {
		let faker = Faker::from_config(&config);
		let mut factory = Self::new(entity_factory, faker);
		factory.config = config;
		factory
	}

	/// Registers the definition of `class`, replacing any previous one.
	pub fn define<F>(&mut self, class: impl Into<String>, definition: F) -> &mut Self
	where
		F: Fn(&Faker, &AttributeMap<E>) -> FactoryResult<AttributeMap<E>> + Send + Sync + 'static,
	{
		let class = class.into();
		if self
			.definitions
			.insert(class.clone(), Arc::new(definition))
			.is_some()
		{
			tracing::warn!(class = %class, "factory definition replaced");
		} else {
			tracing::debug!(class = %class, "factory defined");
		}
		self
	}

	/// Appends an anonymous state applied to every build of `class`.
	pub fn state<F>(&mut self, class: impl Into<String>, state: F) -> &mut Self
	where
		F: Fn(&Faker, &AttributeMap<E>) -> FactoryResult<AttributeMap<E>> + Send + Sync + 'static,
	{
		self.states
			.entry(class.into())
			.or_default()
			.push(Arc::new(state));
		self
	}

	/// Appends several anonymous states, keeping their order.
	pub fn states<I>(&mut self, class: impl Into<String>, states: I) -> &mut Self
	where
		I: IntoIterator<Item = StateFn<E>>,
	{
		self.states.entry(class.into()).or_default().extend(states);
		self
	}

	/// Registers a state applied only when a builder selects it by name.
	pub fn named_state<F>(
		&mut self,
		class: impl Into<String>,
		name: impl Into<String>,
		state: F,
	) -> &mut Self
	where
		F: Fn(&Faker, &AttributeMap<E>) -> FactoryResult<AttributeMap<E>> + Send + Sync + 'static,
	{
		self.named_states
			.entry(class.into())
			.or_default()
			.insert(name.into(), Arc::new(state));
		self
	}

	/// Adds a callback run after each entity of `class` is made.
	pub fn after_making<F>(&mut self, class: impl Into<String>, callback: F) -> &mut Self
	where
		F: Fn(&E, &Faker) + Send + Sync + 'static,
	{
		self.after_making_state(class, DEFAULT_STATE, callback)
	}

	/// Adds an after-making callback that only runs when `state` is active.
	pub fn after_making_state<F>(
		&mut self,
		class: impl Into<String>,
		state: impl Into<String>,
		callback: F,
	) -> &mut Self
	where
		F: Fn(&E, &Faker) + Send + Sync + 'static,
	{
		self.callbacks
			.push(class, CallbackPhase::AfterMaking, state, Arc::new(callback));
		self
	}

	/// Adds a callback run after each entity of `class` is created.
	pub fn after_creating<F>(&mut self, class: impl Into<String>, callback: F) -> &mut Self
	where
		F: Fn(&E, &Faker) + Send + Sync + 'static,
	{
		self.after_creating_state(class, DEFAULT_STATE, callback)
	}

	/// Adds an after-creating callback that only runs when `state` is active.
	pub fn after_creating_state<F>(
		&mut self,
		class: impl Into<String>,
		state: impl Into<String>,
		callback: F,
	) -> &mut Self
	where
		F: Fn(&E, &Faker) + Send + Sync + 'static,
	{
		self.callbacks
			.push(class, CallbackPhase::AfterCreating, state, Arc::new(callback));
		self
	}

	/// Overrides the creation strategy for `class` only.
	pub fn creation_strategy(
		&mut self,
		class: impl Into<String>,
		strategy: impl CreationStrategy<E> + 'static,
	) -> &mut Self {
		self.strategies.insert(class.into(), Arc::new(strategy));
		self
	}

	/// Returns a builder for `class`.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::UndefinedFactory`] if `class` has no definition.
	pub fn of(&self, class: &str) -> FactoryResult<EntityBuilder<E>> {
		let definition = self
			.definitions
			.get(class)
			.cloned()
			.ok_or_else(|| FactoryError::UndefinedFactory(class.to_string()))?;

		let entity_factory = match self.strategies.get(class) {
			Some(strategy) => self.entity_factory.with_strategy(Arc::clone(strategy)),
			None => self.entity_factory.clone(),
		};

		Ok(
			EntityBuilder::new(class, entity_factory, self.faker.clone(), definition)
				.with_states(self.states.get(class).cloned().unwrap_or_default())
				.with_named_states(self.named_states.get(class).cloned().unwrap_or_default())
				.with_callbacks(self.callbacks.for_class(class))
				.with_export_format(self.config.export_format),
		)
	}

	/// Makes `times` entities of every defined class, without storing them.
	pub fn make(&self, times: i64) -> FactoryResult<InMemorySeedRepository<E>> {
		let mut data = IndexMap::new();
		for class in self.definitions.keys() {
			let entities = self.of(class)?.times(times).make(AttributeMap::new())?;
			data.insert(class.clone(), entities.into_vec());
		}
		Ok(InMemorySeedRepository::new(data))
	}

	/// Builds `times` raw attribute sets for every defined class.
	pub fn raw(&self, times: i64) -> FactoryResult<InMemorySeedRepository<Attributes>> {
		let mut data = IndexMap::new();
		for class in self.definitions.keys() {
			let records = self.of(class)?.times(times).raw(AttributeMap::new())?;
			data.insert(class.clone(), records.into_vec());
		}
		Ok(InMemorySeedRepository::new(data))
	}

	/// Exports `times` raw attribute sets of every defined class into
	/// `directory`, one file per class, and returns a repository reading
	/// them back lazily.
	///
	/// Existing files are kept when
	/// [`FactoryConfig::replace_existing_exports`] is off.
	pub fn export(
		&self,
		times: i64,
		directory: &Path,
	) -> FactoryResult<FileSeedRepository<Attributes>> {
		let mut class_map = IndexMap::new();
		for class in self.definitions.keys() {
			let path = self
				.of(class)?
				.times(times)
				.export(directory, self.config.replace_existing_exports)?;
			class_map.insert(class.clone(), path);
		}

		if class_map.len() > 1 {
			let mut names: Vec<&str> = class_map.keys().map(|c| short_class_name(c)).collect();
			names.sort_unstable();
			if names.windows(2).any(|pair| pair[0] == pair[1]) {
				tracing::warn!("several classes share a short name; their exports overwrite each other");
			}
		}

		Ok(FileSeedRepository::new(class_map))
	}
}

impl<E> Factory<E> {
	/// Collaborator bundle shared by every builder.
	pub fn entity_factory(&self) -> &EntityFactory<E> {
		&self.entity_factory
	}

	/// Mutable access to the collaborator bundle, e.g. to add creation hooks.
	pub fn entity_factory_mut(&mut self) -> &mut EntityFactory<E> {
		&mut self.entity_factory
	}

	/// Fake data provider shared by every builder.
	pub fn faker(&self) -> &Faker {
		&self.faker
	}

	/// Active configuration.
	pub fn config(&self) -> &FactoryConfig {
		&self.config
	}

	/// Returns true if `class` has a definition.
	pub fn has_definition(&self, class: &str) -> bool {
		self.definitions.contains_key(class)
	}

	/// Defined classes, in registration order.
	pub fn classes(&self) -> Vec<&str> {
		self.definitions.keys().map(String::as_str).collect()
	}

	/// Number of defined classes.
	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	/// Returns true if nothing is defined.
	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}
