//! MySQL dialect

use super::MigrationsSqlGenerator;
use super::command::CommandListBuilder;
use super::helper::{SqlGenerationHelper, TypeMapper};
use crate::model::DatabaseModel;
use crate::operations::*;
use crate::types::ValueType;
use crate::Result;

/// MySQL identifier and literal rules: back-tick identifiers, backslash-aware
/// string literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlSqlHelper;

impl SqlGenerationHelper for MySqlSqlHelper {
	fn escape_identifier(&self, identifier: &str) -> String {
		identifier.replace('`', "``")
	}

	fn delimit_identifier(&self, identifier: &str) -> String {
		format!("`{}`", self.escape_identifier(identifier))
	}

	fn escape_literal(&self, text: &str) -> String {
		text.replace('\\', "\\\\").replace('\'', "''")
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlTypeMapper;

impl TypeMapper for MySqlTypeMapper {
	fn mapping_for_value_type(&self, value_type: ValueType) -> String {
		match value_type {
			ValueType::Bool => "tinyint(1)",
			ValueType::I16 => "smallint",
			ValueType::I32 => "int",
			ValueType::I64 => "bigint",
			ValueType::F32 => "float",
			ValueType::F64 => "double",
			ValueType::Decimal => "decimal(65, 30)",
			ValueType::String => "longtext",
			ValueType::Bytes => "longblob",
			ValueType::DateTime => "datetime(6)",
			ValueType::Date => "date",
			ValueType::Time => "time(6)",
			ValueType::Uuid => "char(36)",
		}
		.to_string()
	}
}

/// MySQL migration SQL generator.
///
/// Constraints are dropped with the MySQL-specific `DROP FOREIGN KEY`,
/// `DROP PRIMARY KEY` and `DROP INDEX` forms. Sequences are not supported.
#[derive(Debug, Clone, Default)]
pub struct MySqlSqlGenerator {
	helper: MySqlSqlHelper,
	type_mapper: MySqlTypeMapper,
}

impl MySqlSqlGenerator {
	pub fn new() -> Self {
		Self::default()
	}

	fn alter_table(&self, table: &str, schema: Option<&str>, builder: &mut CommandListBuilder) {
		builder
			.append("ALTER TABLE ")
			.append(&self.helper.delimit_qualified(table, schema));
	}
}

impl MigrationsSqlGenerator for MySqlSqlGenerator {
	fn name(&self) -> &str {
		"MySqlSqlGenerator"
	}

	fn helper(&self) -> &dyn SqlGenerationHelper {
		&self.helper
	}

	fn type_mapper(&self) -> &dyn TypeMapper {
		&self.type_mapper
	}

	fn alter_column(
		&self,
		operation: &AlterColumnOperation,
		model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		self.alter_table(&operation.table, operation.schema.as_deref(), builder);
		builder.append(" MODIFY COLUMN ");
		self.column_definition(&operation.definition(), model, builder)
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
		operation: &DropForeignKeyOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		self.alter_table(&operation.table, operation.schema.as_deref(), builder);
		builder
			.append(" DROP FOREIGN KEY ")
			.append(&self.helper.delimit_identifier(&operation.name));
		Ok(())
	}

	fn drop_index(
		&self,
		operation: &DropIndexOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		builder
			.append("DROP INDEX ")
			.append(&self.helper.delimit_identifier(&operation.name))
			.append(" ON ")
			.append(
				&self
					.helper
					.delimit_qualified(&operation.table, operation.schema.as_deref()),
			);
		Ok(())
	}

	fn drop_primary_key(
		&self,
		operation: &DropPrimaryKeyOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		self.alter_table(&operation.table, operation.schema.as_deref(), builder);
		builder.append(" DROP PRIMARY KEY");
		Ok(())
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
		operation: &DropUniqueConstraintOperation,
		_model: Option<&DatabaseModel>,
		builder: &mut CommandListBuilder,
	) -> Result<()> {
		self.alter_table(&operation.table, operation.schema.as_deref(), builder);
		builder
			.append(" DROP INDEX ")
			.append(&self.helper.delimit_identifier(&operation.name));
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
		self.alter_table(&operation.table, operation.schema.as_deref(), builder);
		builder
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
		self.alter_table(&operation.table, operation.schema.as_deref(), builder);
		builder
			.append(" RENAME INDEX ")
			.append(&self.helper.delimit_identifier(&operation.name))
			.append(" TO ")
			.append(&self.helper.delimit_identifier(&operation.new_name));
		Ok(())
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
		self.alter_table(&operation.name, operation.schema.as_deref(), builder);
		builder
			.append(" RENAME TO ")
			.append(&self.helper.delimit_qualified(&operation.new_name, operation.schema.as_deref()));
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

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::Literal;
	use rstest::rstest;

	fn render(operation: Operation) -> String {
		MySqlSqlGenerator::new()
			.generate(&[operation], None)
			.unwrap()
			.into_iter()
			.map(|c| c.into_text())
			.collect()
	}

	#[rstest]
	#[case(
		AlterColumnOperation::new("Post", "Title", ValueType::String).with_column_type("varchar(120)").nullable(true).into(),
		"ALTER TABLE `Post` MODIFY COLUMN `Title` varchar(120);\n"
	)]
	#[case(DropForeignKeyOperation::new("Post", "FK_Post_Blog").into(), "ALTER TABLE `Post` DROP FOREIGN KEY `FK_Post_Blog`;\n")]
	#[case(DropPrimaryKeyOperation::new("Post", "PK_Post").into(), "ALTER TABLE `Post` DROP PRIMARY KEY;\n")]
	#[case(DropUniqueConstraintOperation::new("Post", "AK_Post_Slug").into(), "ALTER TABLE `Post` DROP INDEX `AK_Post_Slug`;\n")]
	#[case(DropIndexOperation::new("Post", "IX_Post_Title").into(), "DROP INDEX `IX_Post_Title` ON `Post`;\n")]
	#[case(RenameIndexOperation::new("Post", "IX_A", "IX_B").into(), "ALTER TABLE `Post` RENAME INDEX `IX_A` TO `IX_B`;\n")]
	#[case(RenameTableOperation::new("Post", "Article").into(), "ALTER TABLE `Post` RENAME TO `Article`;\n")]
	#[case(EnsureSchemaOperation::new("blog").into(), "CREATE SCHEMA IF NOT EXISTS `blog`;\n")]
	fn test_dialect_operations(#[case] operation: Operation, #[case] expected: &str) {
		assert_eq!(render(operation), expected);
	}

	#[rstest]
	fn test_string_literal_escapes_backslash() {
		let operation = AddColumnOperation::new("Post", "Path", ValueType::String)
			.with_default(Literal::from("C:\\temp"));
		assert_eq!(
			render(operation.into()),
			"ALTER TABLE `Post` ADD `Path` longtext NOT NULL DEFAULT 'C:\\\\temp';\n"
		);
	}
}
