//! ANSI generator: the base rendering rules with no dialect overrides

use super::MigrationsSqlGenerator;
use super::helper::{AnsiSqlHelper, SqlGenerationHelper, TypeMapper};
use crate::types::ValueType;

/// ANSI store type names.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiTypeMapper;

impl TypeMapper for AnsiTypeMapper {
	fn mapping_for_value_type(&self, value_type: ValueType) -> String {
		match value_type {
			ValueType::Bool => "boolean",
			ValueType::I16 => "smallint",
			ValueType::I32 => "int",
			ValueType::I64 => "bigint",
			ValueType::F32 => "real",
			ValueType::F64 => "double precision",
			ValueType::Decimal => "decimal(18, 2)",
			ValueType::String => "varchar(max)",
			ValueType::Bytes => "varbinary(max)",
			ValueType::DateTime => "timestamp",
			ValueType::Date => "date",
			ValueType::Time => "time",
			ValueType::Uuid => "char(36)",
		}
		.to_string()
	}
}

/// Generator using only the portable rules.
///
/// Operations without a portable form (renames, column alteration, schema
/// creation and index drops) fail with `NotImplemented`.
#[derive(Debug, Clone, Default)]
pub struct AnsiSqlGenerator {
	helper: AnsiSqlHelper,
	type_mapper: AnsiTypeMapper,
}

impl AnsiSqlGenerator {
	pub fn new() -> Self {
		Self::default()
	}
}

impl MigrationsSqlGenerator for AnsiSqlGenerator {
	fn name(&self) -> &str {
		"AnsiSqlGenerator"
	}

	fn helper(&self) -> &dyn SqlGenerationHelper {
		&self.helper
	}

	fn type_mapper(&self) -> &dyn TypeMapper {
		&self.type_mapper
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::operations::*;
	use crate::MigrationError;
	use rstest::rstest;

	#[rstest]
	#[case(AlterColumnOperation::new("Post", "Id", ValueType::I32).into(), "AlterColumn")]
	#[case(RenameIndexOperation::new("Post", "IX_A", "IX_B").into(), "RenameIndex")]
	#[case(RenameTableOperation::new("Post", "Article").into(), "RenameTable")]
	#[case(RenameColumnOperation::new("Post", "A", "B").into(), "RenameColumn")]
	#[case(RenameSequenceOperation::new("Seq", "Seq2").into(), "RenameSequence")]
	#[case(EnsureSchemaOperation::new("dbo").into(), "EnsureSchema")]
	#[case(DropIndexOperation::new("Post", "IX_A").into(), "DropIndex")]
	fn test_base_leaves_operation_to_dialects(
		#[case] operation: Operation,
		#[case] expected: &str,
	) {
		// Arrange
		let generator = AnsiSqlGenerator::new();

		// Act
		let result = generator.generate(&[operation], None);

		// Assert
		match result {
			Err(MigrationError::NotImplemented {
				generator,
				operation,
			}) => {
				assert_eq!(generator, "AnsiSqlGenerator");
				assert_eq!(operation, expected);
			}
			other => panic!("Expected NotImplemented, got {:?}", other),
		}
	}
}
