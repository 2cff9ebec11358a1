//! SQL generation for migration operations
//!
//! [`MigrationsSqlGenerator`] renders a list of [`Operation`]s into
//! [`RelationalCommand`]s. The trait's default methods hold the ANSI rendering
//! rules; dialects implement the trait on their own struct and override only the
//! methods whose output differs. A handful of operations (column alteration,
//! renames, schema creation and index drops) have no portable form, so their
//! defaults fail with [`MigrationError::NotImplemented`] and every concrete
//! dialect is expected to provide them.
//!
//! ## Dialects
//!
//! - [`AnsiSqlGenerator`] - the base rules only
//! - [`PostgresSqlGenerator`] - PostgreSQL
//! - [`SqliteSqlGenerator`] - SQLite (no sequences, schemas or constraint DDL)
//! - [`MySqlSqlGenerator`] - MySQL (no sequences)
//!
//! # Examples
//!
//! ```rust
//! use reinhardt_migrations::prelude::*;
//!
//! let generator = PostgresSqlGenerator::new();
//! let operations: Vec<Operation> = vec![
//! 	EnsureSchemaOperation::new("blogging").into(),
//! 	RenameTableOperation::new("Post", "Article").with_schema("blogging").into(),
//! ];
//!
//! let commands = generator.generate(&operations, None).unwrap();
//! assert_eq!(commands.len(), 2);
//! assert_eq!(
//! 	commands[1].command_text(),
//! 	"ALTER TABLE \"blogging\".\"Post\" RENAME TO \"Article\";\n"
//! );
//! ```

pub mod ansi;
pub mod command;
pub mod helper;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use ansi::{AnsiSqlGenerator, AnsiTypeMapper};
pub use command::{CommandListBuilder, RelationalCommand};
pub use helper::{AnsiSqlHelper, SqlGenerationHelper, TypeMapper};
pub use mysql::{MySqlSqlGenerator, MySqlSqlHelper, MySqlTypeMapper};
pub use postgres::{PostgresSqlGenerator, PostgresSqlHelper, PostgresTypeMapper};
pub use sqlite::{SqliteSqlGenerator, SqliteSqlHelper, SqliteTypeMapper};

use crate::indented::Indentable;
use crate::model::DatabaseModel;
use crate::operations::*;
use crate::types::{Literal, ValueType};
use crate::{MigrationError, Result};

/// Options shared by sequence creation and alteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceOptions {
	pub increment_by: i32,
	pub min_value: Option<i64>,
	pub max_value: Option<i64>,
	pub is_cyclic: bool,
}

impl From<&CreateSequenceOperation> for SequenceOptions {
	fn from(operation: &CreateSequenceOperation) -> Self {
		Self {
			increment_by: operation.increment_by,
			min_value: operation.min_value,
			max_value: operation.max_value,
			is_cyclic: operation.is_cyclic,
		}
	}
}

impl From<&AlterSequenceOperation> for SequenceOptions {
	fn from(operation: &AlterSequenceOperation) -> Self {
		Self {
			increment_by: operation.increment_by,
			min_value: operation.min_value,
			max_value: operation.max_value,
			is_cyclic: operation.is_cyclic,
		}
	}
}

/// Operation whose rendering passes through [`MigrationsSqlGenerator::index_traits`].
#[derive(Debug, Clone, Copy)]
pub enum IndexTraitsTarget<'a> {
	Index(&'a CreateIndexOperation),
	PrimaryKey(&'a AddPrimaryKeyOperation),
	UniqueConstraint(&'a AddUniqueConstraintOperation),
}

/// Comma-and-newline before every item of a `CREATE TABLE` body but the first.
fn separate_item(builder: &mut CommandListBuilder, first: &mut bool) {
	if !*first {
		builder.append_line(",");
	}
	*first = false;
}

/// Renders migration operations into dialect-specific SQL commands.
pub trait MigrationsSqlGenerator: Send + Sync {
	/// Generator name, reported in errors.
	fn name(&self) -> &str;

	fn helper(&self) -> &dyn SqlGenerationHelper;

	fn type_mapper(&self) -> &dyn TypeMapper;

	/// Sequence value type that needs no `AS <type>` clause.
	fn default_sequence_type(&self) -> ValueType {
		ValueType::I64
	}

	/// Render `operations` in order, one command per operation.
	///
	/// `model` is the target model, used to resolve column types that the
	/// operations leave unspecified.
	fn generate(
		&self,
		operations: &[Operation],
		model: Option<&DatabaseModel>,
	) -> Result<Vec<RelationalCommand>> {
		let mut builder = CommandListBuilder::new();
		self.generate_into(operations, model, &mut builder)?;
		Ok(builder.into_commands())
	}

	/// Like [`generate`](Self::generate), rendering into a caller-owned builder.
	///
	/// On failure the commands of the operations rendered before the failing one
	/// stay in `builder`.
	fn generate_into(
		&self,
		operations: &[Operation],
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		tracing::debug!(
			generator = self.name(),
			operations = operations.len(),
			"Generating migration SQL"
		);

		for operation in operations {
			self.generate_operation(operation, model, builder)?;

			// Operations a dialect renders as nothing produce no command
			if builder.has_pending_text() {
				builder
					.append_line(self.helper().batch_terminator())
					.end_command();
			}
		}

		Ok(())
	}

	/// Dispatch one operation to its rendering method.
	fn generate_operation(
		&self,
		operation: &Operation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		match operation {
			Operation::AddColumn(op) => self.add_column(op, model, builder),
			Operation::AddForeignKey(op) => self.add_foreign_key(op, model, builder),
			Operation::AddPrimaryKey(op) => self.add_primary_key(op, model, builder),
			Operation::AddUniqueConstraint(op) => self.add_unique_constraint(op, model, builder),
			Operation::AlterColumn(op) => self.alter_column(op, model, builder),
			Operation::AlterSequence(op) => self.alter_sequence(op, model, builder),
			Operation::CreateIndex(op) => self.create_index(op, model, builder),
			Operation::CreateSequence(op) => self.create_sequence(op, model, builder),
			Operation::CreateTable(op) => self.create_table(op, model, builder),
			Operation::DropColumn(op) => self.drop_column(op, model, builder),
			Operation::DropForeignKey(op) => self.drop_foreign_key(op, model, builder),
			Operation::DropIndex(op) => self.drop_index(op, model, builder),
			Operation::DropPrimaryKey(op) => self.drop_primary_key(op, model, builder),
			Operation::DropSchema(op) => self.drop_schema(op, model, builder),
			Operation::DropSequence(op) => self.drop_sequence(op, model, builder),
			Operation::DropTable(op) => self.drop_table(op, model, builder),
			Operation::DropUniqueConstraint(op) => self.drop_unique_constraint(op, model, builder),
			Operation::EnsureSchema(op) => self.ensure_schema(op, model, builder),
			Operation::RenameColumn(op) => self.rename_column(op, model, builder),
			Operation::RenameIndex(op) => self.rename_index(op, model, builder),
			Operation::RenameSequence(op) => self.rename_sequence(op, model, builder),
			Operation::RenameTable(op) => self.rename_table(op, model, builder),
			Operation::RestartSequence(op) => self.restart_sequence(op, model, builder),
			Operation::Sql(op) => self.sql(op, model, builder),
		}
	}

	/// Error for operations the base layer leaves to dialects.
	fn not_implemented(&self, operation: &'static str) -> MigrationError {
		MigrationError::NotImplemented {
			generator: self.name().to_string(),
			operation,
		}
	}

	/// Error for operations this dialect has no rendering for.
	fn unknown_operation(&self, operation: &'static str) -> MigrationError {
		MigrationError::UnknownOperation {
			generator: self.name().to_string(),
			operation,
		}
	}

	fn add_column(
		&self,
		operation: &AddColumnOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(
				&self
					.helper()
					.delimit_qualified(&operation.table, operation.schema.as_deref()),
			)
			.append(" ADD ");
		self.column_definition(operation, model, builder)
	}

	fn add_foreign_key(
		&self,
		operation: &AddForeignKeyOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(
				&self
					.helper()
					.delimit_qualified(&operation.table, operation.schema.as_deref()),
			)
			.append(" ADD ");
		self.foreign_key_constraint(operation, model, builder)
	}

	fn add_primary_key(
		&self,
		operation: &AddPrimaryKeyOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(
				&self
					.helper()
					.delimit_qualified(&operation.table, operation.schema.as_deref()),
			)
			.append(" ADD ");
		self.primary_key_constraint(operation, model, builder)
	}

	fn add_unique_constraint(
		&self,
		operation: &AddUniqueConstraintOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(
				&self
					.helper()
					.delimit_qualified(&operation.table, operation.schema.as_deref()),
			)
			.append(" ADD ");
		self.unique_constraint(operation, model, builder)
	}

	fn alter_column(
		&self,
		_operation: &AlterColumnOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.not_implemented("AlterColumn"))
	}

	fn alter_sequence(
		&self,
		operation: &AlterSequenceOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder.append("ALTER SEQUENCE ").append(
			&self
				.helper()
				.delimit_qualified(&operation.name, operation.schema.as_deref()),
		);
		self.sequence_options(operation.into(), model, builder)
	}

	fn create_index(
		&self,
		operation: &CreateIndexOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder.append("CREATE ");
		if operation.is_unique {
			builder.append("UNIQUE ");
		}
		self.index_traits(IndexTraitsTarget::Index(operation), model, builder)?;

		let helper = self.helper();
		builder
			.append("INDEX ")
			.append(&helper.delimit_identifier(&operation.name))
			.append(" ON ")
			.append(&helper.delimit_qualified(&operation.table, operation.schema.as_deref()))
			.append(" (")
			.append(&self.column_list(&operation.columns))
			.append(")");
		Ok(())
	}

	fn create_sequence(
		&self,
		operation: &CreateSequenceOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder.append("CREATE SEQUENCE ").append(
			&self
				.helper()
				.delimit_qualified(&operation.name, operation.schema.as_deref()),
		);

		if operation.value_type != self.default_sequence_type() {
			builder.append(" AS ").append(
				&self
					.type_mapper()
					.mapping_for_value_type(operation.value_type),
			);
		}

		builder.append(" START WITH ").append(
			&self
				.helper()
				.literal(&Literal::Integer(operation.start_value)),
		);
		self.sequence_options(operation.into(), model, builder)
	}

	fn create_table(
		&self,
		operation: &CreateTableOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("CREATE TABLE ")
			.append(
				&self
					.helper()
					.delimit_qualified(&operation.name, operation.schema.as_deref()),
			)
			.append_line(" (");

		{
			let mut body = builder.indent();
			let mut first = true;

			for column in &operation.columns {
				separate_item(&mut body, &mut first);
				self.column_definition(column, model, &mut body)?;
			}

			if let Some(primary_key) = &operation.primary_key {
				separate_item(&mut body, &mut first);
				self.primary_key_constraint(primary_key, model, &mut body)?;
			}

			for unique_constraint in &operation.unique_constraints {
				separate_item(&mut body, &mut first);
				self.unique_constraint(unique_constraint, model, &mut body)?;
			}

			for foreign_key in &operation.foreign_keys {
				separate_item(&mut body, &mut first);
				self.foreign_key_constraint(foreign_key, model, &mut body)?;
			}

			body.append_line("");
		}

		builder.append(")");
		Ok(())
	}

	fn drop_column(
		&self,
		operation: &DropColumnOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		let helper = self.helper();
		builder
			.append("ALTER TABLE ")
			.append(&helper.delimit_qualified(&operation.table, operation.schema.as_deref()))
			.append(" DROP COLUMN ")
			.append(&helper.delimit_identifier(&operation.name));
		Ok(())
	}

	fn drop_foreign_key(
		&self,
		operation: &DropForeignKeyOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		self.drop_constraint(
			&operation.table,
			operation.schema.as_deref(),
			&operation.name,
			builder,
		)
	}

	fn drop_index(
		&self,
		_operation: &DropIndexOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.not_implemented("DropIndex"))
	}

	fn drop_primary_key(
		&self,
		operation: &DropPrimaryKeyOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		self.drop_constraint(
			&operation.table,
			operation.schema.as_deref(),
			&operation.name,
			builder,
		)
	}

	fn drop_schema(
		&self,
		operation: &DropSchemaOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("DROP SCHEMA ")
			.append(&self.helper().delimit_identifier(&operation.name));
		Ok(())
	}

	fn drop_sequence(
		&self,
		operation: &DropSequenceOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder.append("DROP SEQUENCE ").append(
			&self
				.helper()
				.delimit_qualified(&operation.name, operation.schema.as_deref()),
		);
		Ok(())
	}

	fn drop_table(
		&self,
		operation: &DropTableOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder.append("DROP TABLE ").append(
			&self
				.helper()
				.delimit_qualified(&operation.name, operation.schema.as_deref()),
		);
		Ok(())
	}

	fn drop_unique_constraint(
		&self,
		operation: &DropUniqueConstraintOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		self.drop_constraint(
			&operation.table,
			operation.schema.as_deref(),
			&operation.name,
			builder,
		)
	}

	fn ensure_schema(
		&self,
		_operation: &EnsureSchemaOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.not_implemented("EnsureSchema"))
	}

	fn rename_column(
		&self,
		_operation: &RenameColumnOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.not_implemented("RenameColumn"))
	}

	fn rename_index(
		&self,
		_operation: &RenameIndexOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.not_implemented("RenameIndex"))
	}

	fn rename_sequence(
		&self,
		_operation: &RenameSequenceOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.not_implemented("RenameSequence"))
	}

	fn rename_table(
		&self,
		_operation: &RenameTableOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.not_implemented("RenameTable"))
	}

	fn restart_sequence(
		&self,
		operation: &RestartSequenceOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		let helper = self.helper();
		builder
			.append("ALTER SEQUENCE ")
			.append(&helper.delimit_qualified(&operation.name, operation.schema.as_deref()))
			.append(" RESTART WITH ")
			.append(&helper.literal(&Literal::Integer(operation.start_value)));
		Ok(())
	}

	/// Raw SQL, emitted verbatim.
	fn sql(
		&self,
		operation: &SqlOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder.append(&operation.sql);
		Ok(())
	}

	/// `ALTER TABLE <table> DROP CONSTRAINT <name>`
	fn drop_constraint(
		&self,
		table: &str,
		schema: Option<&str>,
		name: &str,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		let helper = self.helper();
		builder
			.append("ALTER TABLE ")
			.append(&helper.delimit_qualified(table, schema))
			.append(" DROP CONSTRAINT ")
			.append(&helper.delimit_identifier(name));
		Ok(())
	}

	/// ` INCREMENT BY n MINVALUE m|NO MINVALUE MAXVALUE m|NO MAXVALUE CYCLE|NO CYCLE`
	///
	/// Every option is spelled out, including absent bounds.
	fn sequence_options(
		&self,
		options: SequenceOptions,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		let helper = self.helper();
		builder
			.append(" INCREMENT BY ")
			.append(&helper.literal(&Literal::from(options.increment_by)));

		match options.min_value {
			Some(min_value) => {
				builder
					.append(" MINVALUE ")
					.append(&helper.literal(&Literal::Integer(min_value)));
			}
			None => {
				builder.append(" NO MINVALUE");
			}
		}

		match options.max_value {
			Some(max_value) => {
				builder
					.append(" MAXVALUE ")
					.append(&helper.literal(&Literal::Integer(max_value)));
			}
			None => {
				builder.append(" NO MAXVALUE");
			}
		}

		builder.append(if options.is_cyclic {
			" CYCLE"
		} else {
			" NO CYCLE"
		});
		Ok(())
	}

	/// Store type of a column: its explicit type, else the mapping of the
	/// matching column in `model`, else the default mapping of its value type.
	fn column_type(&self, column: &AddColumnOperation, model: Option<&DatabaseModel>) -> String {
		if let Some(column_type) = &column.column_type {
			return column_type.clone();
		}

		let property = model.and_then(|model| {
			model.find_column(column.schema.as_deref(), &column.table, &column.name)
		});
		match property {
			Some(property) => self.type_mapper().mapping_for_column(property),
			None => self.type_mapper().mapping_for_value_type(column.value_type),
		}
	}

	fn column_definition(
		&self,
		column: &AddColumnOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append(&self.helper().delimit_identifier(&column.name))
			.append(" ");

		if let Some(computed) = &column.computed_column_sql {
			builder.append("AS (").append(computed).append(")");
			return Ok(());
		}

		builder.append(&self.column_type(column, model));

		if !column.is_nullable {
			builder.append(" NOT NULL");
		}

		self.default_value(
			column.default_value.as_ref(),
			column.default_value_sql.as_deref(),
			builder,
		)
	}

	/// Expression following `DEFAULT`, if the column has a default.
	fn default_expression(
		&self,
		default_value: Option<&Literal>,
		default_value_sql: Option<&str>,
	) -> Option<String> {
		match (default_value_sql, default_value) {
			(Some(sql), _) => Some(format!("({})", sql)),
			(None, Some(value)) => Some(self.helper().literal(value)),
			(None, None) => None,
		}
	}

	fn default_value(
		&self,
		default_value: Option<&Literal>,
		default_value_sql: Option<&str>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		if let Some(expression) = self.default_expression(default_value, default_value_sql) {
			builder.append(" DEFAULT ").append(&expression);
		}
		Ok(())
	}

	/// `CONSTRAINT <name> ` when the constraint is named.
	fn constraint_name(&self, name: Option<&str>, builder: &mut CommandListBuilder) {
		if let Some(name) = name {
			builder
				.append("CONSTRAINT ")
				.append(&self.helper().delimit_identifier(name))
				.append(" ");
		}
	}

	fn foreign_key_constraint(
		&self,
		operation: &AddForeignKeyOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		self.constraint_name(operation.name.as_deref(), builder);

		builder
			.append("FOREIGN KEY (")
			.append(&self.column_list(&operation.columns))
			.append(") REFERENCES ")
			.append(&self.helper().delimit_qualified(
				&operation.principal_table,
				operation.principal_schema.as_deref(),
			))
			.append(" (")
			.append(&self.column_list(&operation.principal_columns))
			.append(")");

		if operation.on_update != ReferentialAction::NoAction {
			builder.append(" ON UPDATE ");
			self.foreign_key_action(operation.on_update, builder)?;
		}

		if operation.on_delete != ReferentialAction::NoAction {
			builder.append(" ON DELETE ");
			self.foreign_key_action(operation.on_delete, builder)?;
		}

		Ok(())
	}

	fn primary_key_constraint(
		&self,
		operation: &AddPrimaryKeyOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		self.constraint_name(operation.name.as_deref(), builder);
		builder.append("PRIMARY KEY ");
		self.index_traits(IndexTraitsTarget::PrimaryKey(operation), model, builder)?;
		builder
			.append("(")
			.append(&self.column_list(&operation.columns))
			.append(")");
		Ok(())
	}

	fn unique_constraint(
		&self,
		operation: &AddUniqueConstraintOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		self.constraint_name(operation.name.as_deref(), builder);
		builder.append("UNIQUE ");
		self.index_traits(IndexTraitsTarget::UniqueConstraint(operation), model, builder)?;
		builder
			.append("(")
			.append(&self.column_list(&operation.columns))
			.append(")");
		Ok(())
	}

	/// Dialect clauses placed before `INDEX` or the key column list.
	fn index_traits(
		&self,
		_target: IndexTraitsTarget<'_>,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Ok(())
	}

	fn foreign_key_action(
		&self,
		action: ReferentialAction,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		if let Some(keyword) = action.to_sql_keyword() {
			builder.append(keyword);
		}
		Ok(())
	}

	fn column_list(&self, columns: &[String]) -> String {
		columns
			.iter()
			.map(|column| self.helper().delimit_identifier(column))
			.collect::<Vec<_>>()
			.join(", ")
	}
}
