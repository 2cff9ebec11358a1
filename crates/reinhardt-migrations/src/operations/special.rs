//! Schema and raw SQL operations

use serde::{Deserialize, Serialize};

/// Create the schema if the database does not have it yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsureSchemaOperation {
	pub name: String,
}

impl EnsureSchemaOperation {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSchemaOperation {
	pub name: String,
}

impl DropSchemaOperation {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}
}

/// Raw SQL emitted verbatim by every generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlOperation {
	pub sql: String,
	#[serde(default)]
	pub is_destructive_change: bool,
}

impl SqlOperation {
	pub fn new(sql: impl Into<String>) -> Self {
		Self {
			sql: sql.into(),
			is_destructive_change: false,
		}
	}

	pub fn destructive(mut self, is_destructive_change: bool) -> Self {
		self.is_destructive_change = is_destructive_change;
		self
	}
}
