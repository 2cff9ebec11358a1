//! Relational model
//!
//! A [`DatabaseModel`] is a point-in-time description of the schema: tables with
//! their columns, keys and indexes, plus sequences. Snapshots and migration
//! metadata carry one, the differ compares two of them, and the SQL generators
//! consult one to resolve column store types.

use crate::operations::ReferentialAction;
use crate::types::{Literal, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete relational schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseModel {
	/// Tables keyed by qualified name (BTreeMap for deterministic iteration order)
	pub tables: BTreeMap<String, TableModel>,
	/// Sequences keyed by qualified name
	pub sequences: BTreeMap<String, SequenceModel>,
}

/// `schema.name`, or `name` when no schema is set.
pub fn qualified_name(schema: Option<&str>, name: &str) -> String {
	match schema {
		Some(schema) => format!("{}.{}", schema, name),
		None => name.to_string(),
	}
}

impl DatabaseModel {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.tables.is_empty() && self.sequences.is_empty()
	}

	pub fn with_table(mut self, table: TableModel) -> Self {
		self.add_table(table);
		self
	}

	pub fn with_sequence(mut self, sequence: SequenceModel) -> Self {
		self.sequences.insert(sequence.qualified_name(), sequence);
		self
	}

	pub fn add_table(&mut self, table: TableModel) {
		self.tables.insert(table.qualified_name(), table);
	}

	pub fn find_table(&self, schema: Option<&str>, name: &str) -> Option<&TableModel> {
		self.tables.get(&qualified_name(schema, name))
	}

	pub fn find_column(
		&self,
		schema: Option<&str>,
		table: &str,
		column: &str,
	) -> Option<&ColumnModel> {
		self.find_table(schema, table)?.find_column(column)
	}

	pub fn find_sequence(&self, schema: Option<&str>, name: &str) -> Option<&SequenceModel> {
		self.sequences.get(&qualified_name(schema, name))
	}

	/// Distinct schemas referenced by tables and sequences.
	pub fn schemas(&self) -> Vec<&str> {
		let mut schemas: Vec<&str> = self
			.tables
			.values()
			.filter_map(|t| t.schema.as_deref())
			.chain(self.sequences.values().filter_map(|s| s.schema.as_deref()))
			.collect();
		schemas.sort_unstable();
		schemas.dedup();
		schemas
	}
}

/// A table and everything defined on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableModel {
	pub schema: Option<String>,
	pub name: String,
	/// Columns in declaration order
	pub columns: Vec<ColumnModel>,
	pub primary_key: Option<KeyModel>,
	#[serde(default)]
	pub unique_constraints: Vec<KeyModel>,
	#[serde(default)]
	pub foreign_keys: Vec<ForeignKeyModel>,
	#[serde(default)]
	pub indexes: Vec<IndexModel>,
}

impl TableModel {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			schema: None,
			name: name.into(),
			columns: Vec::new(),
			primary_key: None,
			unique_constraints: Vec::new(),
			foreign_keys: Vec::new(),
			indexes: Vec::new(),
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn column(mut self, column: ColumnModel) -> Self {
		self.columns.push(column);
		self
	}

	pub fn primary_key(mut self, key: KeyModel) -> Self {
		self.primary_key = Some(key);
		self
	}

	pub fn unique_constraint(mut self, key: KeyModel) -> Self {
		self.unique_constraints.push(key);
		self
	}

	pub fn foreign_key(mut self, foreign_key: ForeignKeyModel) -> Self {
		self.foreign_keys.push(foreign_key);
		self
	}

	pub fn index(mut self, index: IndexModel) -> Self {
		self.indexes.push(index);
		self
	}

	pub fn qualified_name(&self) -> String {
		qualified_name(self.schema.as_deref(), &self.name)
	}

	pub fn find_column(&self, name: &str) -> Option<&ColumnModel> {
		self.columns.iter().find(|c| c.name == name)
	}
}

/// A column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnModel {
	pub name: String,
	pub value_type: ValueType,
	/// Explicit store type declared by the model
	pub column_type: Option<String>,
	pub max_length: Option<u32>,
	pub is_nullable: bool,
	pub default_value: Option<Literal>,
	pub default_value_sql: Option<String>,
	pub computed_column_sql: Option<String>,
}

impl ColumnModel {
	pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
		Self {
			name: name.into(),
			value_type,
			column_type: None,
			max_length: None,
			is_nullable: false,
			default_value: None,
			default_value_sql: None,
			computed_column_sql: None,
		}
	}

	pub fn with_column_type(mut self, column_type: impl Into<String>) -> Self {
		self.column_type = Some(column_type.into());
		self
	}

	pub fn with_max_length(mut self, max_length: u32) -> Self {
		self.max_length = Some(max_length);
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

/// Primary key or unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModel {
	pub name: String,
	pub columns: Vec<String>,
}

impl KeyModel {
	pub fn new<C>(name: impl Into<String>, columns: C) -> Self
	where
		C: IntoIterator,
		C::Item: Into<String>,
	{
		Self {
			name: name.into(),
			columns: columns.into_iter().map(Into::into).collect(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyModel {
	pub name: String,
	pub columns: Vec<String>,
	pub principal_schema: Option<String>,
	pub principal_table: String,
	pub principal_columns: Vec<String>,
	#[serde(default)]
	pub on_update: ReferentialAction,
	#[serde(default)]
	pub on_delete: ReferentialAction,
}

impl ForeignKeyModel {
	pub fn new<C, P>(
		name: impl Into<String>,
		columns: C,
		principal_table: impl Into<String>,
		principal_columns: P,
	) -> Self
	where
		C: IntoIterator,
		C::Item: Into<String>,
		P: IntoIterator,
		P::Item: Into<String>,
	{
		Self {
			name: name.into(),
			columns: columns.into_iter().map(Into::into).collect(),
			principal_schema: None,
			principal_table: principal_table.into(),
			principal_columns: principal_columns.into_iter().map(Into::into).collect(),
			on_update: ReferentialAction::NoAction,
			on_delete: ReferentialAction::NoAction,
		}
	}

	pub fn with_principal_schema(mut self, schema: impl Into<String>) -> Self {
		self.principal_schema = Some(schema.into());
		self
	}

	pub fn on_update(mut self, action: ReferentialAction) -> Self {
		self.on_update = action;
		self
	}

	pub fn on_delete(mut self, action: ReferentialAction) -> Self {
		self.on_delete = action;
		self
	}

	pub fn principal_qualified_name(&self) -> String {
		qualified_name(self.principal_schema.as_deref(), &self.principal_table)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexModel {
	pub name: String,
	pub columns: Vec<String>,
	pub is_unique: bool,
}

impl IndexModel {
	pub fn new<C>(name: impl Into<String>, columns: C) -> Self
	where
		C: IntoIterator,
		C::Item: Into<String>,
	{
		Self {
			name: name.into(),
			columns: columns.into_iter().map(Into::into).collect(),
			is_unique: false,
		}
	}

	pub fn unique(mut self, is_unique: bool) -> Self {
		self.is_unique = is_unique;
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceModel {
	pub schema: Option<String>,
	pub name: String,
	pub value_type: ValueType,
	pub start_value: i64,
	pub increment_by: i32,
	pub min_value: Option<i64>,
	pub max_value: Option<i64>,
	pub is_cyclic: bool,
}

impl SequenceModel {
	pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
		Self {
			schema: None,
			name: name.into(),
			value_type,
			start_value: 1,
			increment_by: 1,
			min_value: None,
			max_value: None,
			is_cyclic: false,
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn start_with(mut self, start_value: i64) -> Self {
		self.start_value = start_value;
		self
	}

	pub fn increment_by(mut self, increment_by: i32) -> Self {
		self.increment_by = increment_by;
		self
	}

	pub fn min_value(mut self, min_value: i64) -> Self {
		self.min_value = Some(min_value);
		self
	}

	pub fn max_value(mut self, max_value: i64) -> Self {
		self.max_value = Some(max_value);
		self
	}

	pub fn cyclic(mut self, is_cyclic: bool) -> Self {
		self.is_cyclic = is_cyclic;
		self
	}

	pub fn qualified_name(&self) -> String {
		qualified_name(self.schema.as_deref(), &self.name)
	}
}
