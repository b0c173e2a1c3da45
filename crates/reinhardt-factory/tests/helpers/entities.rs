//! Sample entities and collaborator mocks.

#![allow(dead_code)]

use std::sync::Arc;

use mockall::mock;
use parking_lot::Mutex;
use reinhardt_factory::factory::{
	Attributes, CreationStrategy, DefaultInstanceStrategy, Entity, EntityFactory, Hydrator,
	SerdeHydrator, Store, StoreOptions,
};
use reinhardt_factory::prelude::*;

/// User entity hydrated through serde.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
	pub id: String,
	pub username: String,
	pub email: String,
	pub is_admin: bool,
	pub author_id: Option<String>,
}

impl Entity for User {
	fn primary_key(&self) -> Option<Value> {
		if self.id.is_empty() {
			None
		} else {
			Some(Value::String(self.id.clone()))
		}
	}
}

mock! {
	/// Creation strategy with call verification.
	pub Strategy {}

	impl CreationStrategy<User> for Strategy {
		fn create(&self, class: &str, attributes: &Attributes) -> FactoryResult<User>;
	}
}

mock! {
	/// Hydrator with call verification.
	pub UserHydrator {}

	impl Hydrator<User> for UserHydrator {
		fn hydrate(&self, entity: User, attributes: &Attributes) -> FactoryResult<User>;
	}
}

mock! {
	/// Store with call verification.
	pub UserStore {}

	impl Store<User> for UserStore {
		fn store(&self, entity: &User, options: &StoreOptions) -> FactoryResult<()>;
	}
}

/// Store keeping every stored entity in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingStore {
	pub stored: Arc<Mutex<Vec<User>>>,
}

impl Store<User> for RecordingStore {
	fn store(&self, entity: &User, _options: &StoreOptions) -> FactoryResult<()> {
		self.stored.lock().push(entity.clone());
		Ok(())
	}
}

/// Registers the `auth.User` definition used across the scenarios.
pub fn define_user(factory: &mut Factory<User>) {
	factory.define("auth.User", |faker, _| {
		Ok(attributes! {
			"id" => faker.uuid(),
			"username" => faker.unique(FakerType::Username)?,
			"email" => faker.unique(FakerType::SafeEmail)?,
		})
	});
}

/// Registry over serde-hydrated users, recording stored entities.
pub fn user_factory(seed: u64) -> (Factory<User>, RecordingStore) {
	let store = RecordingStore::default();
	let entity_factory = EntityFactory::new(DefaultInstanceStrategy::new(), SerdeHydrator::new())
		.with_store(store.clone());
	let mut factory = Factory::with_config(entity_factory, FactoryConfig::new().with_seed(seed));
	define_user(&mut factory);
	(factory, store)
}

/// Registry over mocked collaborators.
pub fn mocked_factory(strategy: MockStrategy, hydrator: MockUserHydrator, store: MockUserStore) -> Factory<User> {
	let entity_factory = EntityFactory::new(strategy, hydrator).with_store(store);
	let mut factory = Factory::new(entity_factory, Faker::seeded(42));
	define_user(&mut factory);
	factory
}
