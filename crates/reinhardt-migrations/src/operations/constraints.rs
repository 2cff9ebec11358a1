//! Key and constraint operations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Action taken on dependent rows when a referenced row changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferentialAction {
	#[default]
	NoAction,
	Restrict,
	Cascade,
	SetNull,
	SetDefault,
}

impl ReferentialAction {
	/// SQL keyword for the action, `None` for the default `NoAction`.
	pub fn to_sql_keyword(&self) -> Option<&'static str> {
		match self {
			ReferentialAction::NoAction => None,
			ReferentialAction::Restrict => Some("RESTRICT"),
			ReferentialAction::Cascade => Some("CASCADE"),
			ReferentialAction::SetNull => Some("SET NULL"),
			ReferentialAction::SetDefault => Some("SET DEFAULT"),
		}
	}
}

impl fmt::Display for ReferentialAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ReferentialAction::NoAction => "NoAction",
			ReferentialAction::Restrict => "Restrict",
			ReferentialAction::Cascade => "Cascade",
			ReferentialAction::SetNull => "SetNull",
			ReferentialAction::SetDefault => "SetDefault",
		};
		f.write_str(name)
	}
}

/// Add a foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddForeignKeyOperation {
	pub schema: Option<String>,
	pub table: String,
	pub name: Option<String>,
	pub columns: Vec<String>,
	pub principal_schema: Option<String>,
	pub principal_table: String,
	pub principal_columns: Vec<String>,
	#[serde(default)]
	pub on_update: ReferentialAction,
	#[serde(default)]
	pub on_delete: ReferentialAction,
}

impl AddForeignKeyOperation {
	pub fn new<C, P>(
		table: impl Into<String>,
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
			schema: None,
			table: table.into(),
			name: None,
			columns: columns.into_iter().map(Into::into).collect(),
			principal_schema: None,
			principal_table: principal_table.into(),
			principal_columns: principal_columns.into_iter().map(Into::into).collect(),
			on_update: ReferentialAction::NoAction,
			on_delete: ReferentialAction::NoAction,
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
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
}

/// Add a primary key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPrimaryKeyOperation {
	pub schema: Option<String>,
	pub table: String,
	pub name: Option<String>,
	pub columns: Vec<String>,
}

impl AddPrimaryKeyOperation {
	pub fn new<C>(table: impl Into<String>, columns: C) -> Self
	where
		C: IntoIterator,
		C::Item: Into<String>,
	{
		Self {
			schema: None,
			table: table.into(),
			name: None,
			columns: columns.into_iter().map(Into::into).collect(),
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}
}

/// Add a unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddUniqueConstraintOperation {
	pub schema: Option<String>,
	pub table: String,
	pub name: Option<String>,
	pub columns: Vec<String>,
}

impl AddUniqueConstraintOperation {
	pub fn new<C>(table: impl Into<String>, columns: C) -> Self
	where
		C: IntoIterator,
		C::Item: Into<String>,
	{
		Self {
			schema: None,
			table: table.into(),
			name: None,
			columns: columns.into_iter().map(Into::into).collect(),
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}
}

macro_rules! drop_constraint {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
		pub struct $name {
			pub schema: Option<String>,
			pub table: String,
			pub name: String,
		}

		impl $name {
			pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
				Self {
					schema: None,
					table: table.into(),
					name: name.into(),
				}
			}

			pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
				self.schema = Some(schema.into());
				self
			}
		}
	};
}

drop_constraint!(
	/// Drop a foreign key constraint by name.
	DropForeignKeyOperation
);
drop_constraint!(
	/// Drop the primary key constraint by name.
	DropPrimaryKeyOperation
);
drop_constraint!(
	/// Drop a unique constraint by name.
	DropUniqueConstraintOperation
);
