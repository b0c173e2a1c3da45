//! Test helpers for reinhardt-factory integration tests.
//!
//! Provides a sample entity, mockall collaborators and registry builders
//! shared by the scenario tests.

#[path = "helpers/entities.rs"]
pub mod entities;
