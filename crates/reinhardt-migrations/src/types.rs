//! Value types and literal constants carried by operations and models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host value kind stored by a column or produced by a sequence.
///
/// The dialect type mapper turns a `ValueType` into a store type name when an
/// operation does not spell one out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
	Bool,
	I16,
	I32,
	I64,
	F32,
	F64,
	Decimal,
	String,
	Bytes,
	DateTime,
	Date,
	Time,
	Uuid,
}

impl ValueType {
	/// Name of the variant, as written in generated code.
	pub fn name(&self) -> &'static str {
		match self {
			ValueType::Bool => "Bool",
			ValueType::I16 => "I16",
			ValueType::I32 => "I32",
			ValueType::I64 => "I64",
			ValueType::F32 => "F32",
			ValueType::F64 => "F64",
			ValueType::Decimal => "Decimal",
			ValueType::String => "String",
			ValueType::Bytes => "Bytes",
			ValueType::DateTime => "DateTime",
			ValueType::Date => "Date",
			ValueType::Time => "Time",
			ValueType::Uuid => "Uuid",
		}
	}

	pub fn is_integer(&self) -> bool {
		matches!(self, ValueType::I16 | ValueType::I32 | ValueType::I64)
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A typed constant rendered into SQL by the dialect helper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Literal {
	Null,
	Bool(bool),
	Integer(i64),
	Float(f64),
	String(String),
	Bytes(Vec<u8>),
}

impl From<bool> for Literal {
	fn from(value: bool) -> Self {
		Literal::Bool(value)
	}
}

impl From<i32> for Literal {
	fn from(value: i32) -> Self {
		Literal::Integer(i64::from(value))
	}
}

impl From<i64> for Literal {
	fn from(value: i64) -> Self {
		Literal::Integer(value)
	}
}

impl From<f64> for Literal {
	fn from(value: f64) -> Self {
		Literal::Float(value)
	}
}

impl From<&str> for Literal {
	fn from(value: &str) -> Self {
		Literal::String(value.to_string())
	}
}

impl From<String> for Literal {
	fn from(value: String) -> Self {
		Literal::String(value)
	}
}

impl From<Vec<u8>> for Literal {
	fn from(value: Vec<u8>) -> Self {
		Literal::Bytes(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(ValueType::I16, true)]
	#[case(ValueType::I64, true)]
	#[case(ValueType::Decimal, false)]
	#[case(ValueType::String, false)]
	fn test_is_integer(#[case] value_type: ValueType, #[case] expected: bool) {
		assert_eq!(value_type.is_integer(), expected);
	}

	#[rstest]
	fn test_literal_conversions() {
		assert_eq!(Literal::from(3), Literal::Integer(3));
		assert_eq!(Literal::from("x"), Literal::String("x".to_string()));
		assert_eq!(Literal::from(true), Literal::Bool(true));
	}

	#[rstest]
	fn test_value_type_display_matches_variant() {
		assert_eq!(ValueType::DateTime.to_string(), "DateTime");
	}
}
