//! Column operations

use crate::types::{Literal, ValueType};
use serde::{Deserialize, Serialize};

/// Add a column to an existing table.
///
/// Also used for the column list of a [`CreateTableOperation`](super::CreateTableOperation).
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::{AddColumnOperation, ValueType};
///
/// let column = AddColumnOperation::new("Post", "Title", ValueType::String)
/// 	.with_column_type("varchar(200)")
/// 	.nullable(true);
///
/// assert_eq!(column.column_type.as_deref(), Some("varchar(200)"));
/// assert!(column.is_nullable);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddColumnOperation {
	pub schema: Option<String>,
	pub table: String,
	pub name: String,
	pub value_type: ValueType,
	/// Explicit store type. When absent the generator resolves one.
	pub column_type: Option<String>,
	pub is_nullable: bool,
	pub default_value: Option<Literal>,
	pub default_value_sql: Option<String>,
	pub computed_column_sql: Option<String>,
}

impl AddColumnOperation {
	pub fn new(table: impl Into<String>, name: impl Into<String>, value_type: ValueType) -> Self {
		Self {
			schema: None,
			table: table.into(),
			name: name.into(),
			value_type,
			column_type: None,
			is_nullable: false,
			default_value: None,
			default_value_sql: None,
			computed_column_sql: None,
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn with_column_type(mut self, column_type: impl Into<String>) -> Self {
		self.column_type = Some(column_type.into());
		self
	}

	pub fn nullable(mut self, is_nullable: bool) -> Self {
		self.is_nullable = is_nullable;
		self
	}

	pub fn with_default(mut self, value: impl Into<Literal>) -> Self {
		self.default_value = Some(value.into());
		self
	}

	pub fn with_default_sql(mut self, sql: impl Into<String>) -> Self {
		self.default_value_sql = Some(sql.into());
		self
	}

	pub fn with_computed_sql(mut self, sql: impl Into<String>) -> Self {
		self.computed_column_sql = Some(sql.into());
		self
	}
}

/// Change the definition of an existing column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterColumnOperation {
	pub schema: Option<String>,
	pub table: String,
	pub name: String,
	pub value_type: ValueType,
	pub column_type: Option<String>,
	pub is_nullable: bool,
	pub default_value: Option<Literal>,
	pub default_value_sql: Option<String>,
	pub computed_column_sql: Option<String>,
	/// Set when the new definition narrows the old one.
	pub is_destructive_change: bool,
}

impl AlterColumnOperation {
	pub fn new(table: impl Into<String>, name: impl Into<String>, value_type: ValueType) -> Self {
		Self {
			schema: None,
			table: table.into(),
			name: name.into(),
			value_type,
			column_type: None,
			is_nullable: false,
			default_value: None,
			default_value_sql: None,
			computed_column_sql: None,
			is_destructive_change: false,
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn with_column_type(mut self, column_type: impl Into<String>) -> Self {
		self.column_type = Some(column_type.into());
		self
	}

	pub fn nullable(mut self, is_nullable: bool) -> Self {
		self.is_nullable = is_nullable;
		self
	}

	pub fn with_default(mut self, value: impl Into<Literal>) -> Self {
		self.default_value = Some(value.into());
		self
	}

	pub fn with_default_sql(mut self, sql: impl Into<String>) -> Self {
		self.default_value_sql = Some(sql.into());
		self
	}

	pub fn with_computed_sql(mut self, sql: impl Into<String>) -> Self {
		self.computed_column_sql = Some(sql.into());
		self
	}

	pub fn destructive(mut self, is_destructive_change: bool) -> Self {
		self.is_destructive_change = is_destructive_change;
		self
	}

	/// The new column definition, in the shape used for column rendering.
	pub fn definition(&self) -> AddColumnOperation {
		AddColumnOperation {
			schema: self.schema.clone(),
			table: self.table.clone(),
			name: self.name.clone(),
			value_type: self.value_type,
			column_type: self.column_type.clone(),
			is_nullable: self.is_nullable,
			default_value: self.default_value.clone(),
			default_value_sql: self.default_value_sql.clone(),
			computed_column_sql: self.computed_column_sql.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumnOperation {
	pub schema: Option<String>,
	pub table: String,
	pub name: String,
}

impl DropColumnOperation {
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
pub struct RenameColumnOperation {
	pub schema: Option<String>,
	pub table: String,
	pub name: String,
	pub new_name: String,
}

impl RenameColumnOperation {
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

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_alter_column_definition_carries_every_field() {
		// Arrange
		let alter = AlterColumnOperation::new("Blog", "Rating", ValueType::I32)
			.with_schema("dbo")
			.nullable(true)
			.with_default(5)
			.destructive(true);

		// Act
		let definition = alter.definition();

		// Assert
		assert_eq!(definition.schema.as_deref(), Some("dbo"));
		assert_eq!(definition.table, "Blog");
		assert_eq!(definition.name, "Rating");
		assert!(definition.is_nullable);
		assert_eq!(definition.default_value, Some(Literal::Integer(5)));
	}

	#[rstest]
	fn test_new_column_is_not_nullable() {
		let column = AddColumnOperation::new("Blog", "Id", ValueType::I32);
		assert!(!column.is_nullable);
		assert!(column.column_type.is_none());
	}
}
