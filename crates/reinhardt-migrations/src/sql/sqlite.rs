//! SQLite dialect
//!
//! SQLite has no schemas, no sequences and no `ALTER TABLE` form for
//! constraints or column alteration. Those operations fail with
//! `UnknownOperation`, except `EnsureSchema`, which renders nothing.

use super::MigrationsSqlGenerator;
use super::command::CommandListBuilder;
use super::helper::{SqlGenerationHelper, TypeMapper};
use crate::model::DatabaseModel;
use crate::operations::*;
use crate::types::ValueType;
use crate::Result;

/// SQLite identifier and literal rules. Schemas are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteSqlHelper;

impl SqlGenerationHelper for SqliteSqlHelper {
	fn delimit_qualified(&self, name: &str, _schema: Option<&str>) -> String {
		self.delimit_identifier(name)
	}

	fn bool_literal(&self, value: bool) -> String {
		if value { "1" } else { "0" }.to_string()
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteTypeMapper;

impl TypeMapper for SqliteTypeMapper {
	fn mapping_for_value_type(&self, value_type: ValueType) -> String {
		match value_type {
			ValueType::Bool | ValueType::I16 | ValueType::I32 | ValueType::I64 => "INTEGER",
			ValueType::F32 | ValueType::F64 => "REAL",
			ValueType::Bytes | ValueType::Uuid => "BLOB",
			ValueType::Decimal
			| ValueType::String
			| ValueType::DateTime
			| ValueType::Date
			| ValueType::Time => "TEXT",
		}
		.to_string()
	}

	fn sized_string_type(&self, _max_length: u32) -> String {
		"TEXT".to_string()
	}

	fn sized_bytes_type(&self, _max_length: u32) -> String {
		"BLOB".to_string()
	}
}

#[derive(Debug, Clone, Default)]
pub struct SqliteSqlGenerator {
	helper: SqliteSqlHelper,
	type_mapper: SqliteTypeMapper,
}

impl SqliteSqlGenerator {
	pub fn new() -> Self {
		Self::default()
	}
}

impl MigrationsSqlGenerator for SqliteSqlGenerator {
	fn name(&self) -> &str {
		"SqliteSqlGenerator"
	}

	fn helper(&self) -> &dyn SqlGenerationHelper {
		&self.helper
	}

	fn type_mapper(&self) -> &dyn TypeMapper {
		&self.type_mapper
	}

	fn add_foreign_key(
		&self,
		_operation: &AddForeignKeyOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("AddForeignKey"))
	}

	fn add_primary_key(
		&self,
		_operation: &AddPrimaryKeyOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("AddPrimaryKey"))
	}

	fn add_unique_constraint(
		&self,
		_operation: &AddUniqueConstraintOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("AddUniqueConstraint"))
	}

	fn alter_column(
		&self,
		_operation: &AlterColumnOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("AlterColumn"))
	}

	fn alter_sequence(
		&self,
		_operation: &AlterSequenceOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("AlterSequence"))
	}

	fn create_sequence(
		&self,
		_operation: &CreateSequenceOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("CreateSequence"))
	}

	fn drop_foreign_key(
		&self,
		_operation: &DropForeignKeyOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("DropForeignKey"))
	}

	fn drop_index(
		&self,
		operation: &DropIndexOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("DROP INDEX ")
			.append(&self.helper.delimit_identifier(&operation.name));
		Ok(())
	}

	fn drop_primary_key(
		&self,
		_operation: &DropPrimaryKeyOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("DropPrimaryKey"))
	}

	fn drop_schema(
		&self,
		_operation: &DropSchemaOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("DropSchema"))
	}

	fn drop_sequence(
		&self,
		_operation: &DropSequenceOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("DropSequence"))
	}

	fn drop_unique_constraint(
		&self,
		_operation: &DropUniqueConstraintOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("DropUniqueConstraint"))
	}

	fn ensure_schema(
		&self,
		_operation: &EnsureSchemaOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
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
			.append(&self.helper.delimit_identifier(&operation.table))
			.append(" RENAME COLUMN ")
			.append(&self.helper.delimit_identifier(&operation.name))
			.append(" TO ")
			.append(&self.helper.delimit_identifier(&operation.new_name));
		Ok(())
	}

	fn rename_index(
		&self,
		_operation: &RenameIndexOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("RenameIndex"))
	}

	fn rename_sequence(
		&self,
		_operation: &RenameSequenceOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("RenameSequence"))
	}

	fn rename_table(
		&self,
		operation: &RenameTableOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(&self.helper.delimit_identifier(&operation.name))
			.append(" RENAME TO ")
			.append(&self.helper.delimit_identifier(&operation.new_name));
		Ok(())
	}

	fn restart_sequence(
		&self,
		_operation: &RestartSequenceOperation,
		_model: Option<&DatabaseModel>,
		_builder: &mut CommandListBuilder,
	) -> Result<()> {
		Err(self.unknown_operation("RestartSequence"))
	}
}
