//! Entity builder.
//!
//! An [`EntityBuilder`] is bound to one class of a [`Factory`](super::Factory).
//! It turns the class definition, its states and the caller's overrides into
//! attributes, and drives the make/create lifecycle:
//!
//! 1. the definition is evaluated,
//! 2. anonymous states are merged over it in registration order,
//! 3. active named states are merged in the order they were selected,
//! 4. the caller's overrides are merged last,
//! 5. lazy values and nested builders are expanded, key by key.
//!
//! `make` then instantiates and hydrates each entity and runs the
//! after-making callbacks; `create` additionally stores the batch, runs the
//! batch creation hooks, then per entity the after-creating callbacks
//! followed by the factory's per-entity hooks.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::attributes::{AttributeMap, AttributeValue, Attributes, merge};
use super::callbacks::{CallbackPhase, Callbacks};
use super::entity::{Entity, EntityFactory, StoreOptions};
use crate::error::{FactoryError, FactoryResult};
use crate::faker::Faker;
use crate::fixtures::{FixtureFormat, FixtureSerializer};

/// Function producing the base attributes of a class.
pub type DefinitionFn<E> =
	Arc<dyn Fn(&Faker, &AttributeMap<E>) -> FactoryResult<AttributeMap<E>> + Send + Sync>;

/// Function producing attributes merged over a definition.
pub type StateFn<E> = DefinitionFn<E>;

/// Result of a build: a bare value when no count was set, a sequence
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Built<T> {
	/// Single value, produced when [`EntityBuilder::times`] was not called.
	One(T),
	/// Ordered values, one per requested repetition.
	Many(Vec<T>),
}

impl<T> Built<T> {
	/// Returns true for [`Built::One`].
	pub fn is_one(&self) -> bool {
		matches!(self, Self::One(_))
	}

	/// Number of values.
	pub fn len(&self) -> usize {
		match self {
			Self::One(_) => 1,
			Self::Many(items) => items.len(),
		}
	}

	/// Returns true if no value was built.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Views the values as a slice.
	pub fn as_slice(&self) -> &[T] {
		match self {
			Self::One(item) => std::slice::from_ref(item),
			Self::Many(items) => items,
		}
	}

	/// Iterates the values.
	pub fn iter(&self) -> std::slice::Iter<'_, T> {
		self.as_slice().iter()
	}

	/// Returns the single value, or `None` for [`Built::Many`].
	pub fn into_one(self) -> Option<T> {
		match self {
			Self::One(item) => Some(item),
			Self::Many(_) => None,
		}
	}

	/// Returns the values as a vector; a single value becomes a one-element
	/// vector.
	pub fn into_vec(self) -> Vec<T> {
		match self {
			Self::One(item) => vec![item],
			Self::Many(items) => items,
		}
	}
}

impl<T> IntoIterator for Built<T> {
	type Item = T;
	type IntoIter = std::vec::IntoIter<T>;

	fn into_iter(self) -> Self::IntoIter {
		self.into_vec().into_iter()
	}
}

/// Builds attributes and entities for one registered class.
pub struct EntityBuilder<E> {
	class: String,
	factory: EntityFactory<E>,
	faker: Faker,
	definition: DefinitionFn<E>,
	states: Vec<StateFn<E>>,
	named_states: IndexMap<String, StateFn<E>>,
	callbacks: Callbacks<E>,
	amount: Option<i64>,
	active_states: Vec<String>,
	store_options: StoreOptions,
	export_format: FixtureFormat,
}

impl<E> EntityBuilder<E> {
	/// Creates a builder. Usually obtained through
	/// [`Factory::of`](super::Factory::of).
	pub fn new(
		class: impl Into<String>,
		factory: EntityFactory<E>,
		faker: Faker,
		definition: DefinitionFn<E>,
	) -> Self {
		Self {
			class: class.into(),
			factory,
			faker,
			definition,
			states: Vec::new(),
			named_states: IndexMap::new(),
			callbacks: Callbacks::new(),
			amount: None,
			active_states: Vec::new(),
			store_options: StoreOptions::default(),
			export_format: FixtureFormat::default(),
		}
	}

	/// Sets the anonymous states, applied in order to every build.
	pub fn with_states(mut self, states: Vec<StateFn<E>>) -> Self {
		self.states = states;
		self
	}

	/// Sets the named states available to [`state`](Self::state).
	pub fn with_named_states(mut self, named_states: IndexMap<String, StateFn<E>>) -> Self {
		self.named_states = named_states;
		self
	}

	/// Sets the lifecycle callbacks.
	pub fn with_callbacks(mut self, callbacks: Callbacks<E>) -> Self {
		self.callbacks = callbacks;
		self
	}

	/// Sets the options passed to the store on `create`.
	pub fn with_store_options(mut self, options: StoreOptions) -> Self {
		self.store_options = options;
		self
	}

	/// Sets the format written by [`export`](Self::export).
	pub fn with_export_format(mut self, format: FixtureFormat) -> Self {
		self.export_format = format;
		self
	}

	/// Sets the number of entities to build. Values below one produce an
	/// empty sequence.
	pub fn times(mut self, amount: i64) -> Self {
		self.amount = Some(amount);
		self
	}

	/// Activates a named state for this build.
	pub fn state(mut self, name: impl Into<String>) -> Self {
		self.active_states.push(name.into());
		self
	}

	/// Activates several named states, applied in the given order.
	pub fn states<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.active_states.extend(names.into_iter().map(Into::into));
		self
	}

	/// Class this builder is bound to.
	pub fn class(&self) -> &str {
		&self.class
	}

	/// Requested number of entities, if set.
	pub fn amount(&self) -> Option<i64> {
		self.amount
	}

	/// Named states selected for this build.
	pub fn active_states(&self) -> &[String] {
		&self.active_states
	}
}

impl<E: Entity> EntityBuilder<E> {
	/// Builds raw attributes without instantiating anything.
	///
	/// # Errors
	///
	/// Fails with [`FactoryError::InvalidState`] when an active state is
	/// unknown, and with any error raised by the definition, the states, a
	/// lazy value or a nested builder.
	pub fn raw(&self, overrides: AttributeMap<E>) -> FactoryResult<Built<Attributes>> {
		self.ensure_states_exist()?;

		match self.amount {
			None => self.raw_attributes(&overrides).map(Built::One),
			Some(amount) if amount < 1 => Ok(Built::Many(Vec::new())),
			Some(amount) => (0..amount)
				.map(|_| self.raw_attributes(&overrides))
				.collect::<FactoryResult<Vec<_>>>()
				.map(Built::Many),
		}
	}

	/// Builds entities in memory and runs the after-making callbacks.
	pub fn make(&self, overrides: AttributeMap<E>) -> FactoryResult<Built<E>> {
		self.ensure_states_exist()?;

		let built = match self.amount {
			None => Built::One(self.make_instance(&overrides)?),
			Some(amount) if amount < 1 => return Ok(Built::Many(Vec::new())),
			Some(amount) => Built::Many(
				(0..amount)
					.map(|_| self.make_instance(&overrides))
					.collect::<FactoryResult<Vec<_>>>()?,
			),
		};

		tracing::debug!(class = %self.class, count = built.len(), "made entities");

		for entity in built.iter() {
			self.callbacks.run(
				&self.class,
				CallbackPhase::AfterMaking,
				&self.active_states,
				entity,
				&self.faker,
			);
		}

		Ok(built)
	}

	/// Builds entities, stores them and runs the creation hooks and the
	/// after-creating callbacks.
	pub fn create(&self, overrides: AttributeMap<E>) -> FactoryResult<Built<E>> {
		let built = self.make(overrides)?;
		if built.is_empty() {
			return Ok(built);
		}

		self.persist(built.as_slice())?;
		Ok(built)
	}

	/// Writes the raw attributes of this build to `directory` and returns
	/// the file path.
	///
	/// The file is named after the short class name (`auth.User` becomes
	/// `User.json`). An existing file is returned untouched unless
	/// `replace_if_exists` is set.
	pub fn export(&self, directory: &Path, replace_if_exists: bool) -> FactoryResult<PathBuf> {
		let path = directory.join(format!(
			"{}.{}",
			short_class_name(&self.class),
			self.export_format.extension()
		));

		if path.exists() && !replace_if_exists {
			tracing::debug!(class = %self.class, path = %path.display(), "export skipped, file exists");
			return Ok(path);
		}

		let records = self.raw(AttributeMap::new())?.into_vec();

		std::fs::create_dir_all(directory)?;
		FixtureSerializer::new()
			.with_format(self.export_format)
			.write_to_file(&records, &path)?;

		tracing::debug!(class = %self.class, path = %path.display(), count = records.len(), "exported seeds");
		Ok(path)
	}

	fn persist(&self, entities: &[E]) -> FactoryResult<()> {
		for hook in self.factory.before_creation_hooks() {
			hook(entities);
		}

		for entity in entities {
			self.factory.store(entity, &self.store_options)?;
		}

		for hook in self.factory.after_creation_hooks() {
			hook(entities);
		}

		for entity in entities {
			self.callbacks.run(
				&self.class,
				CallbackPhase::AfterCreating,
				&self.active_states,
				entity,
				&self.faker,
			);
			for hook in self.factory.after_creating_entity_hooks() {
				hook(entity, &self.faker);
			}
		}

		tracing::debug!(class = %self.class, count = entities.len(), "created entities");
		Ok(())
	}

	/// Builds, stores and returns exactly one entity regardless of the
	/// configured amount.
	fn create_one(&self) -> FactoryResult<E> {
		self.ensure_states_exist()?;
		let entity = self.make_instance(&AttributeMap::new())?;
		self.callbacks.run(
			&self.class,
			CallbackPhase::AfterMaking,
			&self.active_states,
			&entity,
			&self.faker,
		);
		self.persist(std::slice::from_ref(&entity))?;
		Ok(entity)
	}

	fn make_instance(&self, overrides: &AttributeMap<E>) -> FactoryResult<E> {
		let attributes = self.raw_attributes(overrides)?;
		let instance = self.factory.create(&self.class, &attributes)?;
		self.factory.hydrate(instance, &attributes)
	}

	fn ensure_states_exist(&self) -> FactoryResult<()> {
		for state in &self.active_states {
			if !self.named_states.contains_key(state)
				&& !self.callbacks.has_state(&self.class, state)
			{
				return Err(FactoryError::InvalidState {
					class: self.class.clone(),
					state: state.clone(),
				});
			}
		}
		Ok(())
	}

	fn raw_attributes(&self, overrides: &AttributeMap<E>) -> FactoryResult<Attributes> {
		let mut attributes = (self.definition)(&self.faker, overrides)?;

		for state in &self.states {
			merge(&mut attributes, state(&self.faker, overrides)?);
		}

		for name in &self.active_states {
			// Callback-only states contribute no attributes.
			if let Some(state) = self.named_states.get(name) {
				merge(&mut attributes, state(&self.faker, overrides)?);
			}
		}

		merge(&mut attributes, overrides.clone());
		self.expand(attributes)
	}

	/// Resolves lazy values and nested builders in a single pass over the
	/// keys. A lazy value sees every literal plus every value resolved
	/// before it.
	fn expand(&self, attributes: AttributeMap<E>) -> FactoryResult<Attributes> {
		let mut resolved: Attributes = attributes
			.iter()
			.filter_map(|(key, value)| value.as_literal().map(|v| (key.clone(), v.clone())))
			.collect();

		for (key, value) in &attributes {
			if value.as_literal().is_some() {
				continue;
			}
			let expanded = self.resolve(key, value.clone(), &resolved)?;
			resolved.insert(key.clone(), expanded);
		}

		Ok(attributes
			.keys()
			.map(|key| {
				let value = resolved.get(key).cloned().unwrap_or(Value::Null);
				(key.clone(), value)
			})
			.collect())
	}
}

impl<E: Entity> EntityBuilder<E> {
	fn resolve(
		&self,
		key: &str,
		mut value: AttributeValue<E>,
		resolved: &Attributes,
	) -> FactoryResult<Value> {
		loop {
			value = match value {
				AttributeValue::Literal(value) => return Ok(value),
				AttributeValue::Lazy(f) => f(resolved)?,
				AttributeValue::Entity(builder) => {
					tracing::trace!(class = %self.class, attribute = %key, related = %builder.class(), "resolving related entity");
					let related = builder.create_one()?;
					return related
						.primary_key()
						.ok_or_else(|| FactoryError::MissingPrimaryKey(builder.class().to_string()));
				}
			};
		}
	}
}

impl<E> Clone for EntityBuilder<E> {
	fn clone(&self) -> Self {
		Self {
			class: self.class.clone(),
			factory: self.factory.clone(),
			faker: self.faker.clone(),
			definition: Arc::clone(&self.definition),
			states: self.states.clone(),
			named_states: self.named_states.clone(),
			callbacks: self.callbacks.clone(),
			amount: self.amount,
			active_states: self.active_states.clone(),
			store_options: self.store_options.clone(),
			export_format: self.export_format,
		}
	}
}

impl<E> fmt::Debug for EntityBuilder<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EntityBuilder")
			.field("class", &self.class)
			.field("amount", &self.amount)
			.field("states", &self.states.len())
			.field("active_states", &self.active_states)
			.finish_non_exhaustive()
	}
}

/// Returns the last segment of a class identifier, e.g. `User` for
/// `auth.User` or `app::models::User`.
pub fn short_class_name(class: &str) -> &str {
	class
		.rsplit(['.', ':', '\\', '/'])
		.find(|segment| !segment.is_empty())
		.unwrap_or(class)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::attributes;
	use crate::factory::entity::{ClosureHydrator, ClosureStrategy};
	use crate::faker::FakerType;
	use parking_lot::Mutex;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[derive(Debug, Clone, PartialEq)]
	struct Row {
		class: String,
		attributes: Attributes,
	}

	impl Entity for Row {
		fn primary_key(&self) -> Option<Value> {
			self.attributes.get("id").cloned()
		}
	}

	fn row_factory(log: Arc<Mutex<Vec<String>>>) -> EntityFactory<Row> {
		let create_log = Arc::clone(&log);
		EntityFactory::new(
			ClosureStrategy::new(move |class, _| {
				create_log.lock().push(format!("create:{}", class));
				Ok(Row {
					class: class.to_string(),
					attributes: Attributes::new(),
				})
			}),
			ClosureHydrator::new(|mut row: Row, attrs: &Attributes| {
				row.attributes = attrs.clone();
				Ok(row)
			}),
		)
	}

	fn user_definition() -> DefinitionFn<Row> {
		Arc::new(|faker, _| {
			Ok(attributes! {
				"id" => faker.uuid(),
				"username" => faker.unique(FakerType::Username)?,
				"email" => faker.unique(FakerType::SafeEmail)?,
			})
		})
	}

	type Log = Arc<Mutex<Vec<String>>>;

	struct Harness {
		builder: EntityBuilder<Row>,
		log: Log,
	}

	#[fixture]
	fn harness() -> Harness {
		let log: Log = Arc::new(Mutex::new(Vec::new()));
		let builder = EntityBuilder::new(
			"auth.User",
			row_factory(Arc::clone(&log)),
			Faker::seeded(42),
			user_definition(),
		);
		Harness { builder, log }
	}

	#[fixture]
	fn builder(harness: Harness) -> EntityBuilder<Row> {
		harness.builder
	}

	#[fixture]
	fn log() -> Log {
		Arc::new(Mutex::new(Vec::new()))
	}

	#[rstest]
	fn test_raw_single_is_bare(builder: EntityBuilder<Row>) {
		let raw = builder.raw(AttributeMap::new()).unwrap();
		assert!(raw.is_one());
		let attrs = raw.into_one().unwrap();
		let keys: Vec<&str> = attrs.keys().map(String::as_str).collect();
		assert_eq!(keys, vec!["id", "username", "email"]);
	}

	#[rstest]
	fn test_overrides_win_over_states(builder: EntityBuilder<Row>) {
		let state: StateFn<Row> = Arc::new(|_, _| Ok(attributes! { "username" => "from_state" }));
		let builder = builder.with_states(vec![state]);

		let attrs = builder
			.raw(attributes! { "username" => "X" })
			.unwrap()
			.into_one()
			.unwrap();
		assert_eq!(attrs["username"], json!("X"));
	}

	#[rstest]
	fn test_later_state_wins(builder: EntityBuilder<Row>) {
		let a: StateFn<Row> = Arc::new(|_, _| Ok(attributes! { "email" => "a@example.com" }));
		let b: StateFn<Row> = Arc::new(|_, _| Ok(attributes! { "email" => "b@example.com" }));

		let attrs = builder
			.with_states(vec![a, b])
			.raw(AttributeMap::new())
			.unwrap()
			.into_one()
			.unwrap();
		assert_eq!(attrs["email"], json!("b@example.com"));
	}

	#[rstest]
	fn test_named_states_follow_application_order(builder: EntityBuilder<Row>) {
		let mut named: IndexMap<String, StateFn<Row>> = IndexMap::new();
		named.insert("admin".into(), Arc::new(|_, _| Ok(attributes! { "role" => "admin" })));
		named.insert("guest".into(), Arc::new(|_, _| Ok(attributes! { "role" => "guest" })));

		let attrs = builder
			.with_named_states(named)
			.states(["guest", "admin"])
			.raw(AttributeMap::new())
			.unwrap()
			.into_one()
			.unwrap();
		assert_eq!(attrs["role"], json!("admin"));
	}

	#[rstest]
	fn test_unknown_state_fails(harness: Harness) {
		let Harness { builder, log } = harness;
		let result = builder.state("ghost").make(AttributeMap::new());
		assert!(matches!(
			result,
			Err(FactoryError::InvalidState { ref state, .. }) if state == "ghost"
		));
		assert!(log.lock().is_empty());
	}

	#[rstest]
	fn test_lazy_sees_resolved_attributes(builder: EntityBuilder<Row>) {
		let attrs = builder
			.raw(attributes! {
				"username" => "jane",
				"display" => AttributeValue::lazy(|attrs| {
					Ok(json!(format!("@{}", attrs["username"].as_str().unwrap_or_default())))
				}),
				"shout" => AttributeValue::lazy(|attrs| {
					Ok(json!(attrs["display"].as_str().unwrap_or_default().to_uppercase()))
				}),
			})
			.unwrap()
			.into_one()
			.unwrap();

		assert_eq!(attrs["display"], json!("@jane"));
		assert_eq!(attrs["shout"], json!("@JANE"));
	}

	#[rstest]
	fn test_zero_and_negative_times_are_empty(harness: Harness) {
		let Harness { builder, log } = harness;
		for amount in [0, -1] {
			let b = builder.clone().times(amount);
			assert!(b.raw(AttributeMap::new()).unwrap().is_empty());
			assert!(b.make(AttributeMap::new()).unwrap().is_empty());
			assert!(b.create(AttributeMap::new()).unwrap().is_empty());
		}
		assert!(log.lock().is_empty());
	}

	#[rstest]
	fn test_nested_builder_becomes_primary_key(log: Log) {
		let author = EntityBuilder::new(
			"auth.User",
			row_factory(Arc::clone(&log)),
			Faker::seeded(1),
			Arc::new(|_, _| Ok(attributes! { "id" => 7 })),
		)
		.times(5);

		let post = EntityBuilder::new(
			"blog.Post",
			row_factory(Arc::clone(&log)),
			Faker::seeded(1),
			Arc::new(|_, _| Ok(attributes! { "title" => "Hello" })),
		);

		let attrs = post
			.raw(attributes! { "author_id" => author })
			.unwrap()
			.into_one()
			.unwrap();

		assert_eq!(attrs["author_id"], json!(7));
		assert_eq!(*log.lock(), vec!["create:auth.User"]);
	}

	#[rstest]
	fn test_lazy_builder_is_created(log: Log) {
		let author = EntityBuilder::new(
			"auth.User",
			row_factory(Arc::clone(&log)),
			Faker::seeded(1),
			Arc::new(|_, _| Ok(attributes! { "id" => 9 })),
		);
		let post = EntityBuilder::new(
			"blog.Post",
			row_factory(Arc::clone(&log)),
			Faker::seeded(1),
			Arc::new(|_, _| Ok(attributes! { "draft" => false })),
		);

		let attrs = post
			.raw(attributes! {
				"author_id" => AttributeValue::<Row>::deferred(move |attrs| {
					Ok(if attrs["draft"] == json!(true) {
						Value::Null.into()
					} else {
						author.clone().into()
					})
				}),
			})
			.unwrap()
			.into_one()
			.unwrap();

		assert_eq!(attrs["author_id"], json!(9));
		assert_eq!(*log.lock(), vec!["create:auth.User"]);
	}

	#[rstest]
	fn test_nested_builder_without_key(log: Log) {
		let tag = EntityBuilder::new(
			"blog.Tag",
			row_factory(Arc::clone(&log)),
			Faker::seeded(1),
			Arc::new(|_, _| Ok(attributes! { "name" => "rust" })),
		);
		let post = EntityBuilder::new(
			"blog.Post",
			row_factory(log),
			Faker::seeded(1),
			Arc::new(|_, _| Ok(attributes! {})),
		);

		let result = post.raw(attributes! { "tag_id" => tag });
		assert!(matches!(result, Err(FactoryError::MissingPrimaryKey(ref c)) if c == "blog.Tag"));
	}

	#[rstest]
	fn test_make_hydrates_instance(builder: EntityBuilder<Row>) {
		let row = builder
			.make(attributes! { "username" => "neo" })
			.unwrap()
			.into_one()
			.unwrap();

		assert_eq!(row.class, "auth.User");
		assert_eq!(row.attributes["username"], json!("neo"));
	}

	#[rstest]
	#[case("auth.User", "User")]
	#[case("app::models::Comment", "Comment")]
	#[case("App\\Entity\\Post", "Post")]
	#[case("Plain", "Plain")]
	fn test_short_class_name(#[case] class: &str, #[case] expected: &str) {
		assert_eq!(short_class_name(class), expected);
	}

	#[rstest]
	fn test_built_helpers() {
		let one = Built::One(1);
		assert_eq!(one.len(), 1);
		assert_eq!(one.as_slice(), &[1]);
		assert_eq!(one.clone().into_vec(), vec![1]);

		let many = Built::Many(vec![1, 2]);
		assert!(!many.is_one());
		assert_eq!(many.clone().into_one(), None);
		assert_eq!(many.into_iter().sum::<i32>(), 3);
	}
}
