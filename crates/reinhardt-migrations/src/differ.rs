//! Model differ
//!
//! Computes the ordered operations that turn one [`DatabaseModel`] into another.
//!
//! Operations come out in an order the database accepts:
//!
//! 1. Foreign keys, indexes, unique constraints and primary keys that go away
//! 2. Dropped columns, then dropped tables (dependents before principals)
//! 3. Dropped sequences
//! 4. New schemas and sequences, sequence changes
//! 5. New tables, principals before dependents
//! 6. Added and altered columns, new keys, new foreign keys, new indexes
//!
//! Foreign keys between new tables that reference each other in a cycle cannot
//! be created inline; those tables are created first and the foreign keys are
//! added afterwards with `AddForeignKey`. The same happens when a new table
//! references a column or key that an existing table only gains in this diff.
//! Foreign keys of dropped tables that reference a key being dropped on a kept
//! table are dropped explicitly before that key.

use crate::model::{ColumnModel, DatabaseModel, ForeignKeyModel, IndexModel, KeyModel, SequenceModel, TableModel};
use crate::operations::*;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};

/// Computes operations between two models.
pub trait ModelDiffer: Send + Sync {
	/// Operations that turn `source` into `target`. `None` is the empty model.
	fn get_differences(
		&self,
		source: Option<&DatabaseModel>,
		target: Option<&DatabaseModel>,
	) -> Vec<Operation>;

	fn has_differences(
		&self,
		source: Option<&DatabaseModel>,
		target: Option<&DatabaseModel>,
	) -> bool {
		!self.get_differences(source, target).is_empty()
	}
}

/// Structural differ over [`DatabaseModel`].
///
/// Tables, columns, keys and sequences are matched by name. Renames are not
/// detected: a renamed column shows up as a drop and an add.
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::prelude::*;
///
/// let before = DatabaseModel::new()
/// 	.with_table(TableModel::new("Blog").column(ColumnModel::new("Id", ValueType::I32)));
/// let after = DatabaseModel::new().with_table(
/// 	TableModel::new("Blog")
/// 		.column(ColumnModel::new("Id", ValueType::I32))
/// 		.column(ColumnModel::new("Url", ValueType::String).nullable(true)),
/// );
///
/// let operations = SchemaDiffer::new().get_differences(Some(&before), Some(&after));
/// assert_eq!(operations.len(), 1);
/// assert_eq!(operations[0].kind(), "AddColumn");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaDiffer;

impl SchemaDiffer {
	pub fn new() -> Self {
		Self
	}
}

impl ModelDiffer for SchemaDiffer {
	fn get_differences(
		&self,
		source: Option<&DatabaseModel>,
		target: Option<&DatabaseModel>,
	) -> Vec<Operation> {
		let empty = DatabaseModel::default();
		let source = source.unwrap_or(&empty);
		let target = target.unwrap_or(&empty);

		let mut diff = Diff::default();
		diff.schemas(source, target);
		diff.sequences(source, target);
		diff.tables(source, target);

		let operations = diff.into_operations();
		tracing::debug!(count = operations.len(), "Computed model differences");
		operations
	}
}

/// Operations grouped by the phase they run in.
#[derive(Default)]
struct Diff {
	drop_foreign_keys: Vec<Operation>,
	drop_indexes: Vec<Operation>,
	drop_unique_constraints: Vec<Operation>,
	drop_primary_keys: Vec<Operation>,
	drop_columns: Vec<Operation>,
	drop_tables: Vec<Operation>,
	drop_sequences: Vec<Operation>,
	ensure_schemas: Vec<Operation>,
	create_sequences: Vec<Operation>,
	alter_sequences: Vec<Operation>,
	create_tables: Vec<Operation>,
	add_columns: Vec<Operation>,
	alter_columns: Vec<Operation>,
	add_primary_keys: Vec<Operation>,
	add_unique_constraints: Vec<Operation>,
	add_foreign_keys: Vec<Operation>,
	create_indexes: Vec<Operation>,
}

impl Diff {
	fn into_operations(self) -> Vec<Operation> {
		[
			self.drop_foreign_keys,
			self.drop_indexes,
			self.drop_unique_constraints,
			self.drop_primary_keys,
			self.drop_columns,
			self.drop_tables,
			self.drop_sequences,
			self.ensure_schemas,
			self.create_sequences,
			self.alter_sequences,
			self.create_tables,
			self.add_columns,
			self.alter_columns,
			self.add_primary_keys,
			self.add_unique_constraints,
			self.add_foreign_keys,
			self.create_indexes,
		]
		.into_iter()
		.flatten()
		.collect()
	}

	fn schemas(&mut self, source: &DatabaseModel, target: &DatabaseModel) {
		let existing: BTreeSet<&str> = source.schemas().into_iter().collect();
		for schema in target.schemas() {
			if !existing.contains(schema) {
				self.ensure_schemas
					.push(EnsureSchemaOperation::new(schema).into());
			}
		}
	}

	fn sequences(&mut self, source: &DatabaseModel, target: &DatabaseModel) {
		for (key, old) in &source.sequences {
			match target.sequences.get(key) {
				None => self.drop_sequences.push(drop_sequence(old)),
				Some(new) if new.value_type != old.value_type => {
					self.drop_sequences.push(drop_sequence(old));
					self.create_sequences.push(create_sequence(new));
				}
				Some(new) => {
					if sequence_options_differ(old, new) {
						self.alter_sequences.push(alter_sequence(new));
					}
					if old.start_value != new.start_value {
						self.alter_sequences.push(
							RestartSequenceOperation {
								schema: new.schema.clone(),
								name: new.name.clone(),
								start_value: new.start_value,
							}
							.into(),
						);
					}
				}
			}
		}

		for (key, new) in &target.sequences {
			if !source.sequences.contains_key(key) {
				self.create_sequences.push(create_sequence(new));
			}
		}
	}

	fn tables(&mut self, source: &DatabaseModel, target: &DatabaseModel) {
		let mut dropped = Vec::new();
		for (key, old) in &source.tables {
			match target.tables.get(key) {
				Some(new) => self.table(old, new),
				None => dropped.push(old),
			}
		}

		let created: Vec<&TableModel> = target
			.tables
			.iter()
			.filter(|(key, _)| !source.tables.contains_key(*key))
			.map(|(_, table)| table)
			.collect();

		self.drop_tables(&dropped, source, target);
		self.create_tables(&created, source, target);
	}

	fn table(&mut self, old: &TableModel, new: &TableModel) {
		for fk in &old.foreign_keys {
			if !new.foreign_keys.contains(fk) {
				self.drop_foreign_keys.push(drop_foreign_key(old, fk));
			}
		}
		for fk in &new.foreign_keys {
			if !old.foreign_keys.contains(fk) {
				self.add_foreign_keys.push(add_foreign_key(new, fk).into());
			}
		}

		for index in &old.indexes {
			if !new.indexes.contains(index) {
				self.drop_indexes.push(
					DropIndexOperation {
						schema: old.schema.clone(),
						table: old.name.clone(),
						name: index.name.clone(),
					}
					.into(),
				);
			}
		}
		for index in &new.indexes {
			if !old.indexes.contains(index) {
				self.create_indexes.push(create_index(new, index));
			}
		}

		for key in &old.unique_constraints {
			if !new.unique_constraints.contains(key) {
				self.drop_unique_constraints.push(
					DropUniqueConstraintOperation {
						schema: old.schema.clone(),
						table: old.name.clone(),
						name: key.name.clone(),
					}
					.into(),
				);
			}
		}
		for key in &new.unique_constraints {
			if !old.unique_constraints.contains(key) {
				self.add_unique_constraints
					.push(add_unique_constraint(new, key).into());
			}
		}

		if old.primary_key != new.primary_key {
			if let Some(key) = &old.primary_key {
				self.drop_primary_keys.push(
					DropPrimaryKeyOperation {
						schema: old.schema.clone(),
						table: old.name.clone(),
						name: key.name.clone(),
					}
					.into(),
				);
			}
			if let Some(key) = &new.primary_key {
				self.add_primary_keys.push(add_primary_key(new, key).into());
			}
		}

		for column in &old.columns {
			match new.find_column(&column.name) {
				None => self.drop_columns.push(
					DropColumnOperation {
						schema: old.schema.clone(),
						table: old.name.clone(),
						name: column.name.clone(),
					}
					.into(),
				),
				Some(target) if target != column => {
					self.alter_columns.push(alter_column(new, column, target));
				}
				Some(_) => {}
			}
		}
		for column in &new.columns {
			if old.find_column(&column.name).is_none() {
				self.add_columns.push(add_column(new, column).into());
			}
		}
	}

	fn drop_tables(&mut self, dropped: &[&TableModel], source: &DatabaseModel, target: &DatabaseModel) {
		let names: BTreeSet<String> = dropped.iter().map(|t| t.qualified_name()).collect();

		// Keys on kept tables are dropped before any table, so foreign keys
		// pointing at them must go first even when their table is dropped too.
		for table in dropped {
			for fk in &table.foreign_keys {
				let principal = fk.principal_qualified_name();
				if !names.contains(&principal)
					&& let (Some(old), Some(new)) = (source.tables.get(&principal), target.tables.get(&principal))
					&& referenced_key_changed(old, new, fk)
				{
					self.drop_foreign_keys.push(drop_foreign_key(table, fk));
				}
			}
		}

		let order = match dependency_order(dropped) {
			Some(order) => order,
			None => {
				for table in dropped {
					for fk in &table.foreign_keys {
						let principal = fk.principal_qualified_name();
						if principal != table.qualified_name() && names.contains(&principal) {
							self.drop_foreign_keys.push(drop_foreign_key(table, fk));
						}
					}
				}
				dropped.to_vec()
			}
		};

		for table in order.into_iter().rev() {
			self.drop_tables.push(
				DropTableOperation {
					schema: table.schema.clone(),
					name: table.name.clone(),
				}
				.into(),
			);
		}
	}

	fn create_tables(&mut self, created: &[&TableModel], source: &DatabaseModel, target: &DatabaseModel) {
		let order = dependency_order(created).unwrap_or_else(|| {
			tracing::debug!("Foreign keys between new tables form a cycle");
			created.to_vec()
		});
		let pending: BTreeSet<String> = created.iter().map(|t| t.qualified_name()).collect();
		let mut done = BTreeSet::new();

		for table in order {
			let qualified = table.qualified_name();
			let mut operation = CreateTableOperation {
				schema: table.schema.clone(),
				name: table.name.clone(),
				columns: table.columns.iter().map(|c| add_column(table, c)).collect(),
				primary_key: table.primary_key.as_ref().map(|k| add_primary_key(table, k)),
				unique_constraints: table
					.unique_constraints
					.iter()
					.map(|k| add_unique_constraint(table, k))
					.collect(),
				foreign_keys: Vec::new(),
			};

			for fk in &table.foreign_keys {
				let principal = fk.principal_qualified_name();
				// An existing principal only gains new columns and keys after the tables are created.
				let principal_changes = match (source.tables.get(&principal), target.tables.get(&principal)) {
					(Some(old), Some(new)) => referenced_key_changed(old, new, fk),
					_ => false,
				};
				let inline = principal == qualified
					|| done.contains(&principal)
					|| (!pending.contains(&principal) && !principal_changes);
				if inline {
					operation.foreign_keys.push(add_foreign_key(table, fk));
				} else {
					self.add_foreign_keys.push(add_foreign_key(table, fk).into());
				}
			}

			self.create_tables.push(operation.into());
			for index in &table.indexes {
				self.create_indexes.push(create_index(table, index));
			}
			done.insert(qualified);
		}
	}
}

/// Tables ordered principals first, or `None` when their foreign keys form a cycle.
fn dependency_order<'a>(tables: &[&'a TableModel]) -> Option<Vec<&'a TableModel>> {
	let mut graph: DiGraph<&'a TableModel, ()> = DiGraph::new();
	let nodes: HashMap<String, NodeIndex> = tables
		.iter()
		.map(|table| (table.qualified_name(), graph.add_node(*table)))
		.collect();

	for table in tables {
		let Some(&dependent) = nodes.get(&table.qualified_name()) else {
			continue;
		};
		for fk in &table.foreign_keys {
			if let Some(&principal) = nodes.get(&fk.principal_qualified_name())
				&& principal != dependent
			{
				graph.update_edge(principal, dependent, ());
			}
		}
	}

	toposort(&graph, None)
		.ok()
		.map(|order| order.into_iter().map(|node| graph[node]).collect())
}

/// Whether the columns or the key a foreign key references differ between two
/// versions of its principal table.
fn referenced_key_changed(old: &TableModel, new: &TableModel, fk: &ForeignKeyModel) -> bool {
	fk.principal_columns
		.iter()
		.any(|name| old.find_column(name) != new.find_column(name))
		|| referenced_key(old, &fk.principal_columns) != referenced_key(new, &fk.principal_columns)
}

fn referenced_key<'t>(table: &'t TableModel, columns: &[String]) -> Option<&'t KeyModel> {
	table
		.primary_key
		.iter()
		.chain(&table.unique_constraints)
		.find(|key| key.columns == columns)
}

fn is_destructive(old: &ColumnModel, new: &ColumnModel) -> bool {
	let narrowed = match (old.max_length, new.max_length) {
		(Some(old), Some(new)) => new < old,
		(None, Some(_)) => true,
		_ => false,
	};

	(old.is_nullable && !new.is_nullable)
		|| old.value_type != new.value_type
		|| old.column_type != new.column_type
		|| narrowed
}

fn sequence_options_differ(old: &SequenceModel, new: &SequenceModel) -> bool {
	old.increment_by != new.increment_by
		|| old.min_value != new.min_value
		|| old.max_value != new.max_value
		|| old.is_cyclic != new.is_cyclic
}

fn add_column(table: &TableModel, column: &ColumnModel) -> AddColumnOperation {
	AddColumnOperation {
		schema: table.schema.clone(),
		table: table.name.clone(),
		name: column.name.clone(),
		value_type: column.value_type,
		column_type: column.column_type.clone(),
		is_nullable: column.is_nullable,
		default_value: column.default_value.clone(),
		default_value_sql: column.default_value_sql.clone(),
		computed_column_sql: column.computed_column_sql.clone(),
	}
}

fn alter_column(table: &TableModel, old: &ColumnModel, new: &ColumnModel) -> Operation {
	AlterColumnOperation {
		schema: table.schema.clone(),
		table: table.name.clone(),
		name: new.name.clone(),
		value_type: new.value_type,
		column_type: new.column_type.clone(),
		is_nullable: new.is_nullable,
		default_value: new.default_value.clone(),
		default_value_sql: new.default_value_sql.clone(),
		computed_column_sql: new.computed_column_sql.clone(),
		is_destructive_change: is_destructive(old, new),
	}
	.into()
}

fn add_primary_key(table: &TableModel, key: &KeyModel) -> AddPrimaryKeyOperation {
	AddPrimaryKeyOperation {
		schema: table.schema.clone(),
		table: table.name.clone(),
		name: Some(key.name.clone()),
		columns: key.columns.clone(),
	}
}

fn add_unique_constraint(table: &TableModel, key: &KeyModel) -> AddUniqueConstraintOperation {
	AddUniqueConstraintOperation {
		schema: table.schema.clone(),
		table: table.name.clone(),
		name: Some(key.name.clone()),
		columns: key.columns.clone(),
	}
}

fn add_foreign_key(table: &TableModel, fk: &ForeignKeyModel) -> AddForeignKeyOperation {
	AddForeignKeyOperation {
		schema: table.schema.clone(),
		table: table.name.clone(),
		name: Some(fk.name.clone()),
		columns: fk.columns.clone(),
		principal_schema: fk.principal_schema.clone(),
		principal_table: fk.principal_table.clone(),
		principal_columns: fk.principal_columns.clone(),
		on_update: fk.on_update,
		on_delete: fk.on_delete,
	}
}

fn drop_foreign_key(table: &TableModel, fk: &ForeignKeyModel) -> Operation {
	DropForeignKeyOperation {
		schema: table.schema.clone(),
		table: table.name.clone(),
		name: fk.name.clone(),
	}
	.into()
}

fn create_index(table: &TableModel, index: &IndexModel) -> Operation {
	CreateIndexOperation {
		schema: table.schema.clone(),
		table: table.name.clone(),
		name: index.name.clone(),
		columns: index.columns.clone(),
		is_unique: index.is_unique,
	}
	.into()
}

fn create_sequence(sequence: &SequenceModel) -> Operation {
	CreateSequenceOperation {
		schema: sequence.schema.clone(),
		name: sequence.name.clone(),
		value_type: sequence.value_type,
		start_value: sequence.start_value,
		increment_by: sequence.increment_by,
		min_value: sequence.min_value,
		max_value: sequence.max_value,
		is_cyclic: sequence.is_cyclic,
	}
	.into()
}

fn alter_sequence(sequence: &SequenceModel) -> Operation {
	AlterSequenceOperation {
		schema: sequence.schema.clone(),
		name: sequence.name.clone(),
		increment_by: sequence.increment_by,
		min_value: sequence.min_value,
		max_value: sequence.max_value,
		is_cyclic: sequence.is_cyclic,
	}
	.into()
}

fn drop_sequence(sequence: &SequenceModel) -> Operation {
	DropSequenceOperation {
		schema: sequence.schema.clone(),
		name: sequence.name.clone(),
	}
	.into()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::ValueType;
	use rstest::rstest;

	fn kinds(operations: &[Operation]) -> Vec<&'static str> {
		operations.iter().map(Operation::kind).collect()
	}

	fn blog() -> TableModel {
		TableModel::new("Blog")
			.column(ColumnModel::new("Id", ValueType::I32))
			.column(ColumnModel::new("Url", ValueType::String).nullable(true))
			.primary_key(KeyModel::new("PK_Blog", ["Id"]))
	}

	fn post() -> TableModel {
		TableModel::new("Post")
			.column(ColumnModel::new("Id", ValueType::I32))
			.column(ColumnModel::new("BlogId", ValueType::I32))
			.primary_key(KeyModel::new("PK_Post", ["Id"]))
			.foreign_key(ForeignKeyModel::new("FK_Post_Blog", ["BlogId"], "Blog", ["Id"]))
			.index(IndexModel::new("IX_Post_BlogId", ["BlogId"]))
	}

	#[rstest]
	fn test_identical_models_have_no_differences() {
		let model = DatabaseModel::new().with_table(blog()).with_table(post());
		let differ = SchemaDiffer::new();
		assert!(differ.get_differences(Some(&model), Some(&model)).is_empty());
		assert!(!differ.has_differences(Some(&model), Some(&model)));
		assert!(!differ.has_differences(None, None));
	}

	#[rstest]
	fn test_creates_principal_before_dependent() {
		// Arrange
		let model = DatabaseModel::new().with_table(post()).with_table(blog());

		// Act
		let operations = SchemaDiffer::new().get_differences(None, Some(&model));

		// Assert
		assert_eq!(kinds(&operations), vec!["CreateTable", "CreateTable", "CreateIndex"]);
		let Operation::CreateTable(first) = &operations[0] else {
			panic!("Expected CreateTable");
		};
		let Operation::CreateTable(second) = &operations[1] else {
			panic!("Expected CreateTable");
		};
		assert_eq!(first.name, "Blog");
		assert_eq!(second.name, "Post");
		assert_eq!(second.foreign_keys.len(), 1);
	}

	#[rstest]
	fn test_drops_dependent_before_principal() {
		let model = DatabaseModel::new().with_table(blog()).with_table(post());

		let operations = SchemaDiffer::new().get_differences(Some(&model), None);

		let names: Vec<&str> = operations
			.iter()
			.map(|op| match op {
				Operation::DropTable(op) => op.name.as_str(),
				other => panic!("Unexpected {:?}", other),
			})
			.collect();
		assert_eq!(names, vec!["Post", "Blog"]);
		assert!(operations.iter().all(Operation::is_destructive_change));
	}

	#[rstest]
	fn test_foreign_key_cycle_is_added_after_tables() {
		// Arrange
		let a = TableModel::new("A")
			.column(ColumnModel::new("Id", ValueType::I32))
			.column(ColumnModel::new("BId", ValueType::I32))
			.foreign_key(ForeignKeyModel::new("FK_A_B", ["BId"], "B", ["Id"]));
		let b = TableModel::new("B")
			.column(ColumnModel::new("Id", ValueType::I32))
			.column(ColumnModel::new("AId", ValueType::I32))
			.foreign_key(ForeignKeyModel::new("FK_B_A", ["AId"], "A", ["Id"]));
		let model = DatabaseModel::new().with_table(a).with_table(b);

		// Act
		let operations = SchemaDiffer::new().get_differences(None, Some(&model));

		// Assert
		assert_eq!(
			kinds(&operations),
			vec!["CreateTable", "CreateTable", "AddForeignKey"]
		);
		let inline: usize = operations
			.iter()
			.filter_map(|op| match op {
				Operation::CreateTable(op) => Some(op.foreign_keys.len()),
				_ => None,
			})
			.sum();
		assert_eq!(inline, 1);
	}

	#[rstest]
	fn test_dropping_cyclic_tables_drops_foreign_keys_first() {
		let a = TableModel::new("A")
			.foreign_key(ForeignKeyModel::new("FK_A_B", ["BId"], "B", ["Id"]));
		let b = TableModel::new("B")
			.foreign_key(ForeignKeyModel::new("FK_B_A", ["AId"], "A", ["Id"]));
		let model = DatabaseModel::new().with_table(a).with_table(b);

		let operations = SchemaDiffer::new().get_differences(Some(&model), None);

		assert_eq!(
			kinds(&operations),
			vec!["DropForeignKey", "DropForeignKey", "DropTable", "DropTable"]
		);
	}

	#[rstest]
	#[case(ColumnModel::new("Url", ValueType::String).nullable(true), ColumnModel::new("Url", ValueType::String), true)]
	#[case(ColumnModel::new("Url", ValueType::String), ColumnModel::new("Url", ValueType::String).nullable(true), false)]
	#[case(ColumnModel::new("Url", ValueType::String), ColumnModel::new("Url", ValueType::Bytes), true)]
	#[case(ColumnModel::new("Url", ValueType::String).with_max_length(200), ColumnModel::new("Url", ValueType::String).with_max_length(100), true)]
	#[case(ColumnModel::new("Url", ValueType::String).with_max_length(100), ColumnModel::new("Url", ValueType::String).with_max_length(200), false)]
	#[case(ColumnModel::new("Url", ValueType::String), ColumnModel::new("Url", ValueType::String).with_default("x"), false)]
	fn test_alter_column_destructiveness(
		#[case] old: ColumnModel,
		#[case] new: ColumnModel,
		#[case] destructive: bool,
	) {
		// Arrange
		let before = DatabaseModel::new().with_table(TableModel::new("Blog").column(old));
		let after = DatabaseModel::new().with_table(TableModel::new("Blog").column(new));

		// Act
		let operations = SchemaDiffer::new().get_differences(Some(&before), Some(&after));

		// Assert
		assert_eq!(kinds(&operations), vec!["AlterColumn"]);
		assert_eq!(operations[0].is_destructive_change(), destructive);
	}

	#[rstest]
	fn test_removed_column_drops_its_index_first() {
		let before = DatabaseModel::new().with_table(blog()).with_table(post());
		let mut trimmed = post();
		trimmed.columns.retain(|c| c.name != "BlogId");
		trimmed.foreign_keys.clear();
		trimmed.indexes.clear();
		let after = DatabaseModel::new().with_table(blog()).with_table(trimmed);

		let operations = SchemaDiffer::new().get_differences(Some(&before), Some(&after));

		assert_eq!(
			kinds(&operations),
			vec!["DropForeignKey", "DropIndex", "DropColumn"]
		);
	}

	#[rstest]
	fn test_sequence_changes() {
		// Arrange
		let before = DatabaseModel::new()
			.with_sequence(SequenceModel::new("Order", ValueType::I64))
			.with_sequence(SequenceModel::new("Gone", ValueType::I64))
			.with_sequence(SequenceModel::new("Retyped", ValueType::I64));
		let after = DatabaseModel::new()
			.with_sequence(SequenceModel::new("Order", ValueType::I64).increment_by(5).start_with(10))
			.with_sequence(SequenceModel::new("Retyped", ValueType::I32))
			.with_sequence(SequenceModel::new("New", ValueType::I64).with_schema("sales"));

		// Act
		let operations = SchemaDiffer::new().get_differences(Some(&before), Some(&after));

		// Assert
		assert_eq!(
			kinds(&operations),
			vec![
				"DropSequence",
				"DropSequence",
				"EnsureSchema",
				"CreateSequence",
				"CreateSequence",
				"AlterSequence",
				"RestartSequence",
			]
		);
	}

	#[rstest]
	fn test_dropped_dependent_releases_renamed_primary_key_first() {
		// Arrange
		let before = DatabaseModel::new().with_table(blog()).with_table(post());
		let after = DatabaseModel::new().with_table(blog().primary_key(KeyModel::new("PK_Blogs", ["Id"])));

		// Act
		let operations = SchemaDiffer::new().get_differences(Some(&before), Some(&after));

		// Assert
		assert_eq!(
			kinds(&operations),
			vec!["DropForeignKey", "DropPrimaryKey", "DropTable", "AddPrimaryKey"]
		);
		let Operation::DropForeignKey(released) = &operations[0] else {
			panic!("Expected DropForeignKey");
		};
		assert_eq!(released.table, "Post");
		assert_eq!(released.name, "FK_Post_Blog");
	}

	#[rstest]
	fn test_dropped_dependent_of_unchanged_key_only_drops_table() {
		let before = DatabaseModel::new().with_table(blog()).with_table(post());
		let after = DatabaseModel::new().with_table(
			blog().column(ColumnModel::new("Title", ValueType::String).nullable(true)),
		);

		let operations = SchemaDiffer::new().get_differences(Some(&before), Some(&after));

		assert_eq!(kinds(&operations), vec!["DropTable", "AddColumn"]);
	}

	#[rstest]
	fn test_new_table_referencing_new_key_adds_foreign_key_last() {
		// Arrange
		let before = DatabaseModel::new().with_table(blog());
		let slugged = blog()
			.column(ColumnModel::new("Slug", ValueType::String))
			.unique_constraint(KeyModel::new("AK_Blog_Slug", ["Slug"]));
		let tag = TableModel::new("Tag")
			.column(ColumnModel::new("Id", ValueType::I32))
			.column(ColumnModel::new("BlogSlug", ValueType::String))
			.primary_key(KeyModel::new("PK_Tag", ["Id"]))
			.foreign_key(ForeignKeyModel::new("FK_Tag_Blog", ["BlogSlug"], "Blog", ["Slug"]));
		let after = DatabaseModel::new().with_table(slugged).with_table(tag);

		// Act
		let operations = SchemaDiffer::new().get_differences(Some(&before), Some(&after));

		// Assert
		assert_eq!(
			kinds(&operations),
			vec!["CreateTable", "AddColumn", "AddUniqueConstraint", "AddForeignKey"]
		);
		let Operation::CreateTable(created) = &operations[0] else {
			panic!("Expected CreateTable");
		};
		assert!(created.foreign_keys.is_empty());
		let Operation::AddForeignKey(added) = &operations[3] else {
			panic!("Expected AddForeignKey");
		};
		assert_eq!(added.table, "Tag");
		assert_eq!(added.principal_columns, vec!["Slug".to_string()]);
	}

	#[rstest]
	fn test_new_table_referencing_existing_key_keeps_foreign_key_inline() {
		let before = DatabaseModel::new().with_table(blog());
		let after = DatabaseModel::new().with_table(blog()).with_table(post());

		let operations = SchemaDiffer::new().get_differences(Some(&before), Some(&after));

		assert_eq!(kinds(&operations), vec!["CreateTable", "CreateIndex"]);
		let Operation::CreateTable(created) = &operations[0] else {
			panic!("Expected CreateTable");
		};
		assert_eq!(created.foreign_keys.len(), 1);
	}

	#[rstest]
	fn test_primary_key_change_drops_then_adds() {
		let before = DatabaseModel::new().with_table(blog());
		let after = DatabaseModel::new().with_table(
			blog().primary_key(KeyModel::new("PK_Blog", ["Id", "Url"])),
		);

		let operations = SchemaDiffer::new().get_differences(Some(&before), Some(&after));

		assert_eq!(kinds(&operations), vec!["DropPrimaryKey", "AddPrimaryKey"]);
	}

	#[rstest]
	fn test_new_schema_is_ensured_before_its_tables() {
		let after = DatabaseModel::new().with_table(blog().with_schema("blogging"));

		let operations = SchemaDiffer::new().get_differences(None, Some(&after));

		assert_eq!(kinds(&operations), vec!["EnsureSchema", "CreateTable"]);
	}
}
