//! Index operations

use serde::{Deserialize, Serialize};

/// Create an index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexOperation {
	pub schema: Option<String>,
	pub table: String,
	pub name: String,
	pub columns: Vec<String>,
	pub is_unique: bool,
}

impl CreateIndexOperation {
	pub fn new<C>(table: impl Into<String>, name: impl Into<String>, columns: C) -> Self
	where
		C: IntoIterator,
		C::Item: Into<String>,
	{
		Self {
			schema: None,
			table: table.into(),
			name: name.into(),
			columns: columns.into_iter().map(Into::into).collect(),
			is_unique: false,
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn unique(mut self, is_unique: bool) -> Self {
		self.is_unique = is_unique;
		self
	}
}

/// Drop an index. The owning table is kept because some dialects need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropIndexOperation {
	pub schema: Option<String>,
	pub table: String,
	pub name: String,
}

impl DropIndexOperation {
	pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			schema: None,
			table: table.into(),
			name: name.into(),
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameIndexOperation {
	pub schema: Option<String>,
	pub table: String,
	pub name: String,
	pub new_name: String,
}

impl RenameIndexOperation {
	pub fn new(
		table: impl Into<String>,
		name: impl Into<String>,
		new_name: impl Into<String>,
	) -> Self {
		Self {
			schema: None,
			table: table.into(),
			name: name.into(),
			new_name: new_name.into(),
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}
}
