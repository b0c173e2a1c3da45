//! Seed files.
//!
//! - [`FixtureFormat`] - Supported formats (JSON, YAML)
//! - [`FixtureParser`] - Reads records back from a seed file
//! - [`FixtureSerializer`] - Writes records to a seed file

pub mod format;
pub mod parser;
pub mod serializer;

pub use format::FixtureFormat;
pub use parser::FixtureParser;
pub use serializer::FixtureSerializer;
