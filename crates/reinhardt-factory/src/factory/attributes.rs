//! Attribute values and maps.
//!
//! Definitions and states return an [`AttributeMap`]: an ordered map whose
//! values are either literals, lazy closures evaluated once the whole map is
//! known, or references to another [`EntityBuilder`] that are resolved into
//! the primary key of a freshly created entity. A lazy closure may itself
//! return a builder, which is then resolved the same way.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::builder::EntityBuilder;
use crate::error::FactoryResult;

/// Fully resolved attributes, as handed to strategies and hydrators.
pub type Attributes = serde_json::Map<String, Value>;

/// Unresolved attributes produced by definitions, states and overrides.
pub type AttributeMap<E> = IndexMap<String, AttributeValue<E>>;

/// Closure behind [`AttributeValue::Lazy`].
pub type LazyFn<E> = Arc<dyn Fn(&Attributes) -> FactoryResult<AttributeValue<E>> + Send + Sync>;

/// A single attribute value before expansion.
pub enum AttributeValue<E> {
	/// Plain value, used as is.
	Literal(Value),
	/// Computed from the other attributes of the same entity.
	Lazy(LazyFn<E>),
	/// Another entity, created on expansion and replaced by its primary key.
	Entity(Box<EntityBuilder<E>>),
}

impl<E> AttributeValue<E> {
	/// Wraps a closure computing the value from the sibling attributes.
	///
	/// ```ignore
	/// let full_name = AttributeValue::lazy(|attrs| {
	///     Ok(json!(format!("{} {}", attrs["first_name"], attrs["last_name"])))
	/// });
	/// ```
	pub fn lazy<F>(f: F) -> Self
	where
		E: 'static,
		F: Fn(&Attributes) -> FactoryResult<Value> + Send + Sync + 'static,
	{
		Self::Lazy(Arc::new(move |attrs| f(attrs).map(Self::Literal)))
	}

	/// Wraps a closure returning any attribute value. A returned builder is
	/// created and replaced by its primary key.
	///
	/// ```ignore
	/// let reviewer = AttributeValue::deferred(move |attrs| {
	///     Ok(if attrs["is_draft"] == json!(true) {
	///         json!(null).into()
	///     } else {
	///         users.clone().into()
	///     })
	/// });
	/// ```
	pub fn deferred<F>(f: F) -> Self
	where
		F: Fn(&Attributes) -> FactoryResult<AttributeValue<E>> + Send + Sync + 'static,
	{
		Self::Lazy(Arc::new(f))
	}

	/// Returns the literal value, if this is one.
	pub fn as_literal(&self) -> Option<&Value> {
		match self {
			Self::Literal(value) => Some(value),
			_ => None,
		}
	}
}

impl<E> Clone for AttributeValue<E> {
	fn clone(&self) -> Self {
		match self {
			Self::Literal(value) => Self::Literal(value.clone()),
			Self::Lazy(f) => Self::Lazy(Arc::clone(f)),
			Self::Entity(builder) => Self::Entity(builder.clone()),
		}
	}
}

impl<E> fmt::Debug for AttributeValue<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
			Self::Lazy(_) => f.write_str("Lazy(..)"),
			Self::Entity(builder) => f.debug_tuple("Entity").field(&builder.class()).finish(),
		}
	}
}

impl<E> From<Value> for AttributeValue<E> {
	fn from(value: Value) -> Self {
		Self::Literal(value)
	}
}

impl<E> From<EntityBuilder<E>> for AttributeValue<E> {
	fn from(builder: EntityBuilder<E>) -> Self {
		Self::Entity(Box::new(builder))
	}
}

macro_rules! literal_from {
	($($ty:ty),+) => {
		$(
			impl<E> From<$ty> for AttributeValue<E> {
				fn from(value: $ty) -> Self {
					Self::Literal(Value::from(value))
				}
			}
		)+
	};
}

literal_from!(&str, String, bool, i32, i64, u32, u64, f64);

/// Builds an [`AttributeMap`] from `key => value` pairs.
///
/// Values go through `AttributeValue::from`, so literals, `serde_json`
/// values, lazy values and builders can be mixed:
///
/// ```ignore
/// let attrs = attributes! {
///     "id" => faker.uuid(),
///     "username" => faker.unique(FakerType::Username)?,
///     "is_active" => true,
///     "author_id" => factory.of("auth.User")?,
/// };
/// ```
#[macro_export]
macro_rules! attributes {
	() => {
		$crate::factory::AttributeMap::new()
	};
	($($key:expr => $value:expr),+ $(,)?) => {{
		let mut map = $crate::factory::AttributeMap::new();
		$(
			map.insert(
				::std::string::String::from($key),
				$crate::factory::AttributeValue::from($value),
			);
		)+
		map
	}};
}

/// Merges `other` over `base`. Existing keys keep their position and take
/// the new value; new keys are appended.
pub fn merge<E>(base: &mut AttributeMap<E>, other: AttributeMap<E>) {
	for (key, value) in other {
		base.insert(key, value);
	}
}
