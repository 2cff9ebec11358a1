//! PostgreSQL dialect

use super::MigrationsSqlGenerator;
use super::command::CommandListBuilder;
use super::helper::{SqlGenerationHelper, TypeMapper, hex_digits};
use crate::model::DatabaseModel;
use crate::operations::*;
use crate::types::ValueType;
use crate::{MigrationError, Result};

/// PostgreSQL literal rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresSqlHelper;

impl SqlGenerationHelper for PostgresSqlHelper {
	fn bytes_literal(&self, bytes: &[u8]) -> String {
		format!("'\\x{}'::bytea", hex_digits(bytes))
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresTypeMapper;

impl TypeMapper for PostgresTypeMapper {
	fn mapping_for_value_type(&self, value_type: ValueType) -> String {
		match value_type {
			ValueType::Bool => "boolean",
			ValueType::I16 => "smallint",
			ValueType::I32 => "integer",
			ValueType::I64 => "bigint",
			ValueType::F32 => "real",
			ValueType::F64 => "double precision",
			ValueType::Decimal => "numeric",
			ValueType::String => "text",
			ValueType::Bytes => "bytea",
			ValueType::DateTime => "timestamp with time zone",
			ValueType::Date => "date",
			ValueType::Time => "time without time zone",
			ValueType::Uuid => "uuid",
		}
		.to_string()
	}

	fn sized_string_type(&self, max_length: u32) -> String {
		format!("character varying({})", max_length)
	}

	fn sized_bytes_type(&self, _max_length: u32) -> String {
		"bytea".to_string()
	}
}

/// PostgreSQL migration SQL generator.
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::prelude::*;
///
/// let generator = PostgresSqlGenerator::new();
/// let operations: Vec<Operation> = vec![
/// 	RenameColumnOperation::new("Post", "Title", "Heading").into(),
/// ];
///
/// let commands = generator.generate(&operations, None).unwrap();
/// assert_eq!(
/// 	commands[0].command_text(),
/// 	"ALTER TABLE \"Post\" RENAME COLUMN \"Title\" TO \"Heading\";\n"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct PostgresSqlGenerator {
	helper: PostgresSqlHelper,
	type_mapper: PostgresTypeMapper,
}

impl PostgresSqlGenerator {
	pub fn new() -> Self {
		Self::default()
	}

	/// `ALTER TABLE <table> ALTER COLUMN <column>`
	fn alter_column_prefix(
		&self,
		operation: &AlterColumnOperation,
		builder: &mut CommandListBuilder,
	) {
		builder
			.append("ALTER TABLE ")
			.append(
				&self
					.helper
					.delimit_qualified(&operation.table, operation.schema.as_deref()),
			)
			.append(" ALTER COLUMN ")
			.append(&self.helper.delimit_identifier(&operation.name));
	}
}

impl MigrationsSqlGenerator for PostgresSqlGenerator {
	fn name(&self) -> &str {
		"PostgresSqlGenerator"
	}

	fn helper(&self) -> &dyn SqlGenerationHelper {
		&self.helper
	}

	fn type_mapper(&self) -> &dyn TypeMapper {
		&self.type_mapper
	}

	/// Type, nullability and default are altered by separate statements inside
	/// one command.
	fn alter_column(
		&self,
		operation: &AlterColumnOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		if operation.computed_column_sql.is_some() {
			return Err(MigrationError::InvalidArgument(format!(
				"PostgreSQL cannot alter column '{}' into a computed column",
				operation.name
			)));
		}

		let terminator = self.helper.batch_terminator();
		let column_type = self.column_type(&operation.definition(), model);

		self.alter_column_prefix(operation, builder);
		builder
			.append(" TYPE ")
			.append(&column_type)
			.append_line(terminator);

		self.alter_column_prefix(operation, builder);
		builder
			.append(if operation.is_nullable {
				" DROP NOT NULL"
			} else {
				" SET NOT NULL"
			})
			.append_line(terminator);

		self.alter_column_prefix(operation, builder);
		match self.default_expression(
			operation.default_value.as_ref(),
			operation.default_value_sql.as_deref(),
		) {
			Some(expression) => {
				builder.append(" SET DEFAULT ").append(&expression);
			}
			None => {
				builder.append(" DROP DEFAULT");
			}
		}
		Ok(())
	}

	fn drop_index(
		&self,
		operation: &DropIndexOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder.append("DROP INDEX ").append(
			&self
				.helper
				.delimit_qualified(&operation.name, operation.schema.as_deref()),
		);
		Ok(())
	}

	fn ensure_schema(
		&self,
		operation: &EnsureSchemaOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("CREATE SCHEMA IF NOT EXISTS ")
			.append(&self.helper.delimit_identifier(&operation.name));
		Ok(())
	}

	fn rename_column(
		&self,
		operation: &RenameColumnOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(
				&self
					.helper
					.delimit_qualified(&operation.table, operation.schema.as_deref()),
			)
			.append(" RENAME COLUMN ")
			.append(&self.helper.delimit_identifier(&operation.name))
			.append(" TO ")
			.append(&self.helper.delimit_identifier(&operation.new_name));
		Ok(())
	}

	fn rename_index(
		&self,
		operation: &RenameIndexOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("ALTER INDEX ")
			.append(
				&self
					.helper
					.delimit_qualified(&operation.name, operation.schema.as_deref()),
			)
			.append(" RENAME TO ")
			.append(&self.helper.delimit_identifier(&operation.new_name));
		Ok(())
	}

	fn rename_sequence(
		&self,
		operation: &RenameSequenceOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("ALTER SEQUENCE ")
			.append(
				&self
					.helper
					.delimit_qualified(&operation.name, operation.schema.as_deref()),
			)
			.append(" RENAME TO ")
			.append(&self.helper.delimit_identifier(&operation.new_name));
		Ok(())
	}

	fn rename_table(
		&self,
		operation: &RenameTableOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(
				&self
					.helper
					.delimit_qualified(&operation.name, operation.schema.as_deref()),
			)
			.append(" RENAME TO ")
			.append(&self.helper.delimit_identifier(&operation.new_name));
		Ok(())
	}
}
