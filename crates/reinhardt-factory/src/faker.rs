//! Fake data provider.
//!
//! [`Faker`] wraps a seedable random source and the generators of the
//! [`fake`] crate. It is a cheap, clonable handle: every clone shares the
//! same random stream and the same unique-value bookkeeping, so a
//! definition, its states and its callbacks all draw from one deterministic
//! sequence.
//!
//! # Example
//!
//! ```
//! use reinhardt_factory::faker::{Faker, FakerType};
//!
//! let faker = Faker::seeded(42);
//! let username = faker.unique(FakerType::Username).unwrap();
//! let email = faker.value(FakerType::SafeEmail);
//! assert!(username.is_string());
//! assert!(email.as_str().unwrap().contains('@'));
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use fake::Fake;
use fake::faker::address::en::{CityName, StreetName, ZipCode};
use fake::faker::chrono::en::DateTime as FakeDateTime;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{FreeEmail, SafeEmail, Username};
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use crate::config::{DEFAULT_MAX_UNIQUE_RETRIES, FactoryConfig};
use crate::error::{FactoryError, FactoryResult};

/// Kinds of fake values the provider can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakerType {
	/// Random (v4 layout) UUID string.
	Uuid,
	/// Internet user name.
	Username,
	/// Email on a reserved example domain.
	SafeEmail,
	/// Email on a free mail provider domain.
	FreeEmail,
	/// Given name.
	FirstName,
	/// Family name.
	LastName,
	/// Full name.
	Name,
	/// Single lorem word.
	Word,
	/// Lorem sentence of 4 to 10 words.
	Sentence,
	/// Lorem paragraph of 3 to 7 sentences.
	Paragraph,
	/// Company name.
	CompanyName,
	/// City name.
	CityName,
	/// Street name.
	StreetName,
	/// Postal code.
	ZipCode,
	/// Phone number.
	PhoneNumber,
	/// `true` or `false`.
	Boolean,
	/// Non-negative 32-bit integer.
	Integer,
	/// RFC 3339 timestamp.
	DateTime,
}

impl FakerType {
	/// Returns the lowercase name used in logs and errors.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Uuid => "uuid",
			Self::Username => "username",
			Self::SafeEmail => "safe_email",
			Self::FreeEmail => "free_email",
			Self::FirstName => "first_name",
			Self::LastName => "last_name",
			Self::Name => "name",
			Self::Word => "word",
			Self::Sentence => "sentence",
			Self::Paragraph => "paragraph",
			Self::CompanyName => "company_name",
			Self::CityName => "city_name",
			Self::StreetName => "street_name",
			Self::ZipCode => "zip_code",
			Self::PhoneNumber => "phone_number",
			Self::Boolean => "boolean",
			Self::Integer => "integer",
			Self::DateTime => "date_time",
		}
	}

	/// Generates a value of this kind from the given random source.
	pub fn generate_with<R: Rng>(&self, rng: &mut R) -> Value {
		match self {
			Self::Uuid => {
				let uuid = uuid::Builder::from_random_bytes(rng.r#gen()).into_uuid();
				Value::String(uuid.to_string())
			}
			Self::Username => Value::String(Username().fake_with_rng(rng)),
			Self::SafeEmail => Value::String(SafeEmail().fake_with_rng(rng)),
			Self::FreeEmail => Value::String(FreeEmail().fake_with_rng(rng)),
			Self::FirstName => Value::String(FirstName().fake_with_rng(rng)),
			Self::LastName => Value::String(LastName().fake_with_rng(rng)),
			Self::Name => Value::String(Name().fake_with_rng(rng)),
			Self::Word => Value::String(Word().fake_with_rng(rng)),
			Self::Sentence => Value::String(Sentence(4..10).fake_with_rng(rng)),
			Self::Paragraph => Value::String(Paragraph(3..7).fake_with_rng(rng)),
			Self::CompanyName => Value::String(CompanyName().fake_with_rng(rng)),
			Self::CityName => Value::String(CityName().fake_with_rng(rng)),
			Self::StreetName => Value::String(StreetName().fake_with_rng(rng)),
			Self::ZipCode => Value::String(ZipCode().fake_with_rng(rng)),
			Self::PhoneNumber => Value::String(PhoneNumber().fake_with_rng(rng)),
			Self::Boolean => Value::Bool(rng.gen_bool(0.5)),
			Self::Integer => Value::from(rng.gen_range(0..=i32::MAX)),
			Self::DateTime => {
				let date: chrono::DateTime<chrono::Utc> = FakeDateTime().fake_with_rng(rng);
				Value::String(date.to_rfc3339())
			}
		}
	}
}

impl std::fmt::Display for FakerType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

struct FakerState {
	rng: StdRng,
	unique: HashMap<String, HashSet<String>>,
	max_unique_retries: usize,
}

/// Shared, seedable fake data provider.
#[derive(Clone)]
pub struct Faker {
	state: Arc<Mutex<FakerState>>,
}

impl Faker {
	/// Creates a provider seeded from system entropy.
	pub fn new() -> Self {
		Self::with_rng(StdRng::from_entropy(), DEFAULT_MAX_UNIQUE_RETRIES)
	}

	/// Creates a provider with a fixed seed.
	pub fn seeded(seed: u64) -> Self {
		Self::with_rng(StdRng::seed_from_u64(seed), DEFAULT_MAX_UNIQUE_RETRIES)
	}

	/// Creates a provider from the seed and retry settings of a configuration.
	pub fn from_config(config: &FactoryConfig) -> Self {
		let rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};
		Self::with_rng(rng, config.max_unique_retries)
	}

	fn with_rng(rng: StdRng, max_unique_retries: usize) -> Self {
		Self {
			state: Arc::new(Mutex::new(FakerState {
				rng,
				unique: HashMap::new(),
				max_unique_retries,
			})),
		}
	}

	/// Reseeds the random stream and forgets every value handed out by
	/// [`unique`](Self::unique).
	pub fn seed(&self, seed: u64) {
		let mut state = self.state.lock();
		state.rng = StdRng::seed_from_u64(seed);
		state.unique.clear();
	}

	/// Returns the retry limit of unique generators.
	pub fn max_unique_retries(&self) -> usize {
		self.state.lock().max_unique_retries
	}

	/// Generates a value of the given kind.
	pub fn value(&self, kind: FakerType) -> Value {
		self.sample(|rng| kind.generate_with(rng))
	}

	/// Generates a value of the given kind that this provider has not
	/// returned from `unique` since the last reseed.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::ProviderExhausted`] when no new value is found
	/// within the configured number of attempts.
	pub fn unique(&self, kind: FakerType) -> FactoryResult<Value> {
		self.unique_by(kind.name(), |rng| kind.generate_with(rng))
	}

	/// Unique generation over a custom generator, tracked under `label`.
	///
	/// The provider stays locked while `generate` runs; calling back into
	/// the same `Faker` from `generate` deadlocks.
	pub fn unique_by<F>(&self, label: &str, mut generate: F) -> FactoryResult<Value>
	where
		F: FnMut(&mut StdRng) -> Value,
	{
		let mut state = self.state.lock();
		let attempts = state.max_unique_retries;
		let FakerState { rng, unique, .. } = &mut *state;
		let seen = unique.entry(label.to_string()).or_default();

		for _ in 0..attempts {
			let candidate = generate(rng);
			if seen.insert(candidate.to_string()) {
				return Ok(candidate);
			}
		}

		Err(FactoryError::ProviderExhausted {
			kind: label.to_string(),
			attempts,
		})
	}

	/// Runs `f` with exclusive access to the random stream.
	///
	/// This is the escape hatch for any generator of the [`fake`] crate:
	///
	/// ```
	/// use fake::Fake;
	/// use fake::faker::address::en::CountryName;
	/// use reinhardt_factory::faker::Faker;
	///
	/// let faker = Faker::seeded(1);
	/// let country: String = faker.sample(|rng| CountryName().fake_with_rng(rng));
	/// assert!(!country.is_empty());
	/// ```
	///
	/// The provider stays locked while `f` runs, so `f` must not call back
	/// into the same `Faker`.
	pub fn sample<T, F>(&self, f: F) -> T
	where
		F: FnOnce(&mut StdRng) -> T,
	{
		f(&mut self.state.lock().rng)
	}

	/// UUID string.
	pub fn uuid(&self) -> Value {
		self.value(FakerType::Uuid)
	}

	/// Integer between `min` and `max`, both inclusive. Reversed bounds are
	/// swapped.
	pub fn number_between(&self, min: i64, max: i64) -> Value {
		let (low, high) = if min <= max { (min, max) } else { (max, min) };
		Value::from(self.sample(|rng| rng.gen_range(low..=high)))
	}

	/// Picks one element of `items`, or `None` when it is empty.
	pub fn element<T: Clone>(&self, items: &[T]) -> Option<T> {
		if items.is_empty() {
			return None;
		}
		let index = self.sample(|rng| rng.gen_range(0..items.len()));
		Some(items[index].clone())
	}
}

impl Default for Faker {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Faker {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Faker")
			.field("max_unique_retries", &self.max_unique_retries())
			.finish_non_exhaustive()
	}
}
