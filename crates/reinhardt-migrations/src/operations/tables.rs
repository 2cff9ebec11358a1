//! Table operations

use super::columns::AddColumnOperation;
use super::constraints::{
	AddForeignKeyOperation, AddPrimaryKeyOperation, AddUniqueConstraintOperation,
};
use serde::{Deserialize, Serialize};

/// Create a table with its columns and inline constraints.
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::{
/// 	AddColumnOperation, AddPrimaryKeyOperation, CreateTableOperation, ValueType,
/// };
///
/// let table = CreateTableOperation::new("Blog")
/// 	.column(AddColumnOperation::new("Blog", "Id", ValueType::I32))
/// 	.column(AddColumnOperation::new("Blog", "Url", ValueType::String).nullable(true))
/// 	.primary_key(AddPrimaryKeyOperation::new("Blog", ["Id"]).with_name("PK_Blog"));
///
/// assert_eq!(table.columns.len(), 2);
/// assert!(table.primary_key.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableOperation {
	pub schema: Option<String>,
	pub name: String,
	pub columns: Vec<AddColumnOperation>,
	pub primary_key: Option<AddPrimaryKeyOperation>,
	#[serde(default)]
	pub unique_constraints: Vec<AddUniqueConstraintOperation>,
	#[serde(default)]
	pub foreign_keys: Vec<AddForeignKeyOperation>,
}

impl CreateTableOperation {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			schema: None,
			name: name.into(),
			columns: Vec::new(),
			primary_key: None,
			unique_constraints: Vec::new(),
			foreign_keys: Vec::new(),
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn column(mut self, column: AddColumnOperation) -> Self {
		self.columns.push(column);
		self
	}

	pub fn primary_key(mut self, primary_key: AddPrimaryKeyOperation) -> Self {
		self.primary_key = Some(primary_key);
		self
	}

	pub fn unique_constraint(mut self, constraint: AddUniqueConstraintOperation) -> Self {
		self.unique_constraints.push(constraint);
		self
	}

	pub fn foreign_key(mut self, foreign_key: AddForeignKeyOperation) -> Self {
		self.foreign_keys.push(foreign_key);
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTableOperation {
	pub schema: Option<String>,
	pub name: String,
}

impl DropTableOperation {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			schema: None,
			name: name.into(),
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTableOperation {
	pub schema: Option<String>,
	pub name: String,
	pub new_name: String,
}

impl RenameTableOperation {
	pub fn new(name: impl Into<String>, new_name: impl Into<String>) -> Self {
		Self {
			schema: None,
			name: name.into(),
			new_name: new_name.into(),
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}
}
