//! End-to-end builder scenarios.
//!
//! Exercises the make/create lifecycle against mocked collaborators and a
//! serde-backed registry.

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;

use helpers::entities::{
	MockStrategy, MockUserHydrator, MockUserStore, RecordingStore, User, mocked_factory,
	user_factory,
};
use parking_lot::Mutex;
use reinhardt_factory::factory::{
	Attributes, DefaultInstanceStrategy, EntityFactory, Hydrator, SerdeHydrator,
};
use reinhardt_factory::prelude::*;
use rstest::*;

fn is_resolved_user(attributes: &Attributes) -> bool {
	let keys: Vec<&str> = attributes.keys().map(String::as_str).collect();
	keys == ["id", "username", "email"] && attributes.values().all(Value::is_string)
}

#[rstest]
fn test_create_single_user_calls_each_collaborator_once() {
	let mut strategy = MockStrategy::new();
	strategy
		.expect_create()
		.withf(|class, attributes| class == "auth.User" && is_resolved_user(attributes))
		.times(1)
		.returning(|_, _| Ok(User::default()));

	let hydrated: Arc<Mutex<Option<User>>> = Arc::new(Mutex::new(None));
	let h = Arc::clone(&hydrated);
	let mut hydrator = MockUserHydrator::new();
	hydrator
		.expect_hydrate()
		.withf(|user, attributes| *user == User::default() && is_resolved_user(attributes))
		.times(1)
		.returning(move |user, attributes| {
			let user = SerdeHydrator::<User>::new().hydrate(user, attributes)?;
			*h.lock() = Some(user.clone());
			Ok(user)
		});

	let stored: Arc<Mutex<Vec<User>>> = Arc::new(Mutex::new(Vec::new()));
	let s = Arc::clone(&stored);
	let mut store = MockUserStore::new();
	store
		.expect_store()
		.times(1)
		.returning(move |user, _| {
			s.lock().push(user.clone());
			Ok(())
		});

	let factory = mocked_factory(strategy, hydrator, store);
	let user = factory
		.of("auth.User")
		.unwrap()
		.create(attributes! {})
		.unwrap()
		.into_one()
		.unwrap();

	assert!(!user.id.is_empty());
	assert!(!user.username.is_empty());
	assert!(user.email.contains('@'));
	assert_eq!(hydrated.lock().as_ref(), Some(&user));
	assert_eq!(*stored.lock(), vec![user]);
}

#[rstest]
fn test_raw_batch_with_constant_state() {
	// Collaborators without expectations panic when called.
	let mut factory = mocked_factory(
		MockStrategy::new(),
		MockUserHydrator::new(),
		MockUserStore::new(),
	);
	factory.state("auth.User", |_, _| {
		Ok(attributes! { "email" => "team@example.com" })
	});

	let records = factory
		.of("auth.User")
		.unwrap()
		.times(3)
		.raw(attributes! {})
		.unwrap()
		.into_vec();

	assert_eq!(records.len(), 3);
	let ids: HashSet<String> = records.iter().map(|r| r["id"].to_string()).collect();
	let usernames: HashSet<String> = records.iter().map(|r| r["username"].to_string()).collect();
	assert_eq!(ids.len(), 3);
	assert_eq!(usernames.len(), 3);
	assert!(records.iter().all(|r| r["email"] == json!("team@example.com")));
}

#[rstest]
fn test_unknown_class_touches_no_collaborator() {
	let factory = mocked_factory(
		MockStrategy::new(),
		MockUserHydrator::new(),
		MockUserStore::new(),
	);

	let error = factory.of("UnknownClass").unwrap_err();

	assert!(matches!(error, FactoryError::UndefinedFactory(ref class) if class == "UnknownClass"));
	assert_eq!(error.to_string(), "Unable to locate factory for [UnknownClass]");
}

#[rstest]
fn test_store_failure_propagates() {
	let mut strategy = MockStrategy::new();
	strategy.expect_create().returning(|_, _| Ok(User::default()));
	let mut hydrator = MockUserHydrator::new();
	hydrator
		.expect_hydrate()
		.returning(|user, attributes| SerdeHydrator::<User>::new().hydrate(user, attributes));
	let mut store = MockUserStore::new();
	store
		.expect_store()
		.times(1)
		.returning(|_, _| Err(FactoryError::Storage("disk full".to_string())));

	let factory = mocked_factory(strategy, hydrator, store);
	let result = factory.of("auth.User").unwrap().times(2).create(attributes! {});

	assert!(matches!(result, Err(FactoryError::Storage(ref m)) if m == "disk full"));
}

#[rstest]
fn test_override_precedence() {
	let (mut factory, _) = user_factory(1);
	factory
		.state("auth.User", |_, _| Ok(attributes! { "username" => "from_state" }))
		.named_state("auth.User", "admin", |_, _| {
			Ok(attributes! { "is_admin" => true, "username" => "from_named_state" })
		});

	let plain = factory
		.of("auth.User")
		.unwrap()
		.make(attributes! {})
		.unwrap()
		.into_one()
		.unwrap();
	let admin = factory
		.of("auth.User")
		.unwrap()
		.state("admin")
		.make(attributes! {})
		.unwrap()
		.into_one()
		.unwrap();
	let overridden = factory
		.of("auth.User")
		.unwrap()
		.state("admin")
		.make(attributes! { "username" => "X" })
		.unwrap()
		.into_one()
		.unwrap();

	assert_eq!(plain.username, "from_state");
	assert!(!plain.is_admin);
	assert_eq!(admin.username, "from_named_state");
	assert!(admin.is_admin);
	assert_eq!(overridden.username, "X");
}

#[rstest]
fn test_make_does_not_store() {
	let (factory, store) = user_factory(2);

	let users = factory
		.of("auth.User")
		.unwrap()
		.times(4)
		.make(attributes! {})
		.unwrap();

	assert_eq!(users.len(), 4);
	assert!(store.stored.lock().is_empty());
}

#[rstest]
fn test_create_lifecycle_order() {
	let (mut factory, store) = user_factory(3);
	let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

	let l = Arc::clone(&log);
	factory.entity_factory_mut().before_creation(move |batch: &[User]| {
		l.lock().push(format!("before:{}", batch.len()));
	});
	let l = Arc::clone(&log);
	factory.entity_factory_mut().after_creation(move |batch: &[User]| {
		l.lock().push(format!("after:{}", batch.len()));
	});
	let l = Arc::clone(&log);
	factory.entity_factory_mut().after_creating_entity(move |_: &User, _: &Faker| {
		l.lock().push("entity".to_string());
	});
	let l = Arc::clone(&log);
	factory.after_making("auth.User", move |_, _| l.lock().push("made".to_string()));
	let l = Arc::clone(&log);
	factory.after_creating("auth.User", move |_, _| l.lock().push("created".to_string()));
	let l = Arc::clone(&log);
	factory.after_creating_state("auth.User", "audited", move |_, _| {
		l.lock().push("audited".to_string())
	});

	let users = factory
		.of("auth.User")
		.unwrap()
		.state("audited")
		.times(2)
		.create(attributes! {})
		.unwrap();

	assert_eq!(users.len(), 2);
	assert_eq!(store.stored.lock().len(), 2);
	assert_eq!(
		*log.lock(),
		vec![
			"made", "made", "before:2", "after:2", "created", "audited", "entity", "created",
			"audited", "entity",
		]
	);
}

#[rstest]
fn test_zero_count_create_has_no_side_effects() {
	let (mut factory, store) = user_factory(4);
	let calls = Arc::new(Mutex::new(0usize));

	let c = Arc::clone(&calls);
	factory.entity_factory_mut().before_creation(move |_: &[User]| *c.lock() += 1);
	let c = Arc::clone(&calls);
	factory.after_creating("auth.User", move |_, _| *c.lock() += 1);

	let users = factory
		.of("auth.User")
		.unwrap()
		.times(0)
		.create(attributes! {})
		.unwrap();

	assert!(users.is_empty());
	assert!(store.stored.lock().is_empty());
	assert_eq!(*calls.lock(), 0);
}

#[rstest]
fn test_related_entity_is_created_and_referenced() {
	let (mut factory, store) = user_factory(5);
	let user_builder = factory.of("auth.User").unwrap();
	factory.define("blog.Author", move |faker, _| {
		Ok(attributes! {
			"id" => faker.uuid(),
			"username" => "author",
			"author_id" => user_builder.clone(),
		})
	});

	let author = factory
		.of("blog.Author")
		.unwrap()
		.create(attributes! {})
		.unwrap()
		.into_one()
		.unwrap();

	let stored = store.stored.lock();
	assert_eq!(stored.len(), 2);
	assert_eq!(author.author_id.as_deref(), Some(stored[0].id.as_str()));
	assert_eq!(stored[1].id, author.id);
}

#[rstest]
fn test_same_seed_same_output() {
	let run = |seed: u64| {
		let (factory, _) = user_factory(seed);
		factory
			.of("auth.User")
			.unwrap()
			.times(5)
			.raw(attributes! {})
			.unwrap()
			.into_vec()
	};

	assert_eq!(run(99), run(99));
	assert_ne!(run(99), run(100));
}

#[rstest]
fn test_exhausted_provider_aborts_batch() {
	let store = RecordingStore::default();
	let entity_factory = EntityFactory::new(DefaultInstanceStrategy::new(), SerdeHydrator::new())
		.with_store(store.clone());
	let mut factory = Factory::with_config(
		entity_factory,
		FactoryConfig::new().with_seed(6).with_max_unique_retries(50),
	);
	factory.define("auth.User", |faker, _| {
		Ok(attributes! {
			"id" => faker.uuid(),
			"flag" => faker.unique(FakerType::Boolean)?,
		})
	});
	let made = Arc::new(Mutex::new(0usize));
	let m = Arc::clone(&made);
	factory.after_making("auth.User", move |_, _| *m.lock() += 1);
	let created = Arc::new(Mutex::new(0usize));
	let c = Arc::clone(&created);
	factory.entity_factory_mut().before_creation(move |_: &[User]| *c.lock() += 1);

	let result = factory
		.of("auth.User")
		.unwrap()
		.times(3)
		.create(attributes! {});

	assert!(matches!(
		result,
		Err(FactoryError::ProviderExhausted { ref kind, attempts: 50 }) if kind == "boolean"
	));
	assert_eq!(*made.lock(), 0);
	assert_eq!(*created.lock(), 0);
	assert!(store.stored.lock().is_empty());
}
