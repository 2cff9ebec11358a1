//! Dialect strategies: identifier quoting, literal formatting and type mapping

use crate::model::ColumnModel;
use crate::types::{Literal, ValueType};

/// Identifier and literal rendering rules of a dialect.
///
/// Every method has an ANSI default. Dialects override only what differs.
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::sql::{AnsiSqlHelper, SqlGenerationHelper};
/// use reinhardt_migrations::Literal;
///
/// let helper = AnsiSqlHelper;
/// assert_eq!(helper.delimit_qualified("Blog", Some("dbo")), "\"dbo\".\"Blog\"");
/// assert_eq!(helper.literal(&Literal::from("it's")), "'it''s'");
/// ```
pub trait SqlGenerationHelper: Send + Sync {
	/// Text closing every statement of a batch.
	fn batch_terminator(&self) -> &str {
		";"
	}

	/// Escape quote characters inside an identifier.
	fn escape_identifier(&self, identifier: &str) -> String {
		identifier.replace('"', "\"\"")
	}

	fn delimit_identifier(&self, identifier: &str) -> String {
		format!("\"{}\"", self.escape_identifier(identifier))
	}

	/// Delimit a possibly schema-qualified name.
	fn delimit_qualified(&self, name: &str, schema: Option<&str>) -> String {
		match schema {
			Some(schema) => format!(
				"{}.{}",
				self.delimit_identifier(schema),
				self.delimit_identifier(name)
			),
			None => self.delimit_identifier(name),
		}
	}

	fn escape_literal(&self, text: &str) -> String {
		text.replace('\'', "''")
	}

	fn bool_literal(&self, value: bool) -> String {
		if value { "TRUE" } else { "FALSE" }.to_string()
	}

	fn bytes_literal(&self, bytes: &[u8]) -> String {
		format!("X'{}'", hex_digits(bytes))
	}

	fn literal(&self, value: &Literal) -> String {
		match value {
			Literal::Null => "NULL".to_string(),
			Literal::Bool(value) => self.bool_literal(*value),
			Literal::Integer(value) => value.to_string(),
			Literal::Float(value) => format!("{:?}", value),
			Literal::String(value) => format!("'{}'", self.escape_literal(value)),
			Literal::Bytes(value) => self.bytes_literal(value),
		}
	}
}

/// Maps value types and model columns to store type names.
pub trait TypeMapper: Send + Sync {
	/// Default store type for a value type.
	fn mapping_for_value_type(&self, value_type: ValueType) -> String;

	fn sized_string_type(&self, max_length: u32) -> String {
		format!("varchar({})", max_length)
	}

	fn sized_bytes_type(&self, max_length: u32) -> String {
		format!("varbinary({})", max_length)
	}

	/// Store type of a model column: its explicit type, else its value type
	/// sized by `max_length` where that applies.
	fn mapping_for_column(&self, column: &ColumnModel) -> String {
		if let Some(column_type) = &column.column_type {
			return column_type.clone();
		}
		match (column.value_type, column.max_length) {
			(ValueType::String, Some(max_length)) => self.sized_string_type(max_length),
			(ValueType::Bytes, Some(max_length)) => self.sized_bytes_type(max_length),
			(value_type, _) => self.mapping_for_value_type(value_type),
		}
	}
}

/// ANSI quoting and literal rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiSqlHelper;

impl SqlGenerationHelper for AnsiSqlHelper {}

/// Upper-case hex digits of `bytes`, two per byte.
pub(crate) fn hex_digits(bytes: &[u8]) -> String {
	bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
