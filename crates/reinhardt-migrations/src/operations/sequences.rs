//! Sequence operations

use crate::types::ValueType;
use serde::{Deserialize, Serialize};

/// Create a sequence.
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::{CreateSequenceOperation, ValueType};
///
/// let sequence = CreateSequenceOperation::new("Seq", ValueType::I64)
/// 	.start_with(3)
/// 	.increment_by(5)
/// 	.min_value(2)
/// 	.max_value(4)
/// 	.cyclic(true);
///
/// assert_eq!(sequence.start_value, 3);
/// assert_eq!(sequence.max_value, Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSequenceOperation {
	pub schema: Option<String>,
	pub name: String,
	pub value_type: ValueType,
	pub start_value: i64,
	pub increment_by: i32,
	pub min_value: Option<i64>,
	pub max_value: Option<i64>,
	pub is_cyclic: bool,
}

impl CreateSequenceOperation {
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
}

/// Change the options of an existing sequence. The start value is changed
/// through [`RestartSequenceOperation`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterSequenceOperation {
	pub schema: Option<String>,
	pub name: String,
	pub increment_by: i32,
	pub min_value: Option<i64>,
	pub max_value: Option<i64>,
	pub is_cyclic: bool,
}

impl AlterSequenceOperation {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			schema: None,
			name: name.into(),
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
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSequenceOperation {
	pub schema: Option<String>,
	pub name: String,
}

impl DropSequenceOperation {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			schema: None,
			name: name.into(),
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameSequenceOperation {
	pub schema: Option<String>,
	pub name: String,
	pub new_name: String,
}

impl RenameSequenceOperation {
	pub fn new(name: impl Into<String>, new_name: impl Into<String>) -> Self {
		Self {
			schema: None,
			name: name.into(),
			new_name: new_name.into(),
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartSequenceOperation {
	pub schema: Option<String>,
	pub name: String,
	pub start_value: i64,
}

impl RestartSequenceOperation {
	pub fn new(name: impl Into<String>, start_value: i64) -> Self {
		Self {
			schema: None,
			name: name.into(),
			start_value,
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}
}
