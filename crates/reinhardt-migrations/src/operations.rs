//! Schema-change operations
//!
//! An [`Operation`] is an atomic, named schema-change intent produced by a model
//! differ and consumed by the SQL generators and the code generator. Operations
//! are plain data: ordering inside a list is significant and is preserved by
//! every consumer.
//!
//! # Examples
//!
//! ```rust
//! use reinhardt_migrations::{Operation, DropColumnOperation, AddColumnOperation, ValueType};
//!
//! let add: Operation = AddColumnOperation::new("Post", "Title", ValueType::String).into();
//! let drop: Operation = DropColumnOperation::new("Post", "Body").into();
//!
//! assert!(!add.is_destructive_change());
//! assert!(drop.is_destructive_change());
//! assert_eq!(drop.kind(), "DropColumn");
//! ```

pub mod columns;
pub mod constraints;
pub mod indexes;
pub mod sequences;
pub mod special;
pub mod tables;

pub use columns::{AddColumnOperation, AlterColumnOperation, DropColumnOperation, RenameColumnOperation};
pub use constraints::{
	AddForeignKeyOperation, AddPrimaryKeyOperation, AddUniqueConstraintOperation,
	DropForeignKeyOperation, DropPrimaryKeyOperation, DropUniqueConstraintOperation,
	ReferentialAction,
};
pub use indexes::{CreateIndexOperation, DropIndexOperation, RenameIndexOperation};
pub use sequences::{
	AlterSequenceOperation, CreateSequenceOperation, DropSequenceOperation,
	RenameSequenceOperation, RestartSequenceOperation,
};
pub use special::{DropSchemaOperation, EnsureSchemaOperation, SqlOperation};
pub use tables::{CreateTableOperation, DropTableOperation, RenameTableOperation};

use serde::{Deserialize, Serialize};

macro_rules! operations {
	($($variant:ident($ty:ident)),+ $(,)?) => {
		/// Closed catalogue of schema-change operations.
		///
		/// Every consumer matches this enum exhaustively, so a new variant cannot be
		/// added without a rendering rule for it.
		#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
		#[serde(tag = "type")]
		pub enum Operation {
			$($variant($ty),)+
		}

		impl Operation {
			/// Variant name, used in error messages and logs.
			pub fn kind(&self) -> &'static str {
				match self {
					$(Operation::$variant(_) => stringify!($variant),)+
				}
			}
		}

		$(
			impl From<$ty> for Operation {
				fn from(operation: $ty) -> Self {
					Operation::$variant(operation)
				}
			}
		)+
	};
}

operations! {
	AddColumn(AddColumnOperation),
	AddForeignKey(AddForeignKeyOperation),
	AddPrimaryKey(AddPrimaryKeyOperation),
	AddUniqueConstraint(AddUniqueConstraintOperation),
	AlterColumn(AlterColumnOperation),
	AlterSequence(AlterSequenceOperation),
	CreateIndex(CreateIndexOperation),
	CreateSequence(CreateSequenceOperation),
	CreateTable(CreateTableOperation),
	DropColumn(DropColumnOperation),
	DropForeignKey(DropForeignKeyOperation),
	DropIndex(DropIndexOperation),
	DropPrimaryKey(DropPrimaryKeyOperation),
	DropSchema(DropSchemaOperation),
	DropSequence(DropSequenceOperation),
	DropTable(DropTableOperation),
	DropUniqueConstraint(DropUniqueConstraintOperation),
	EnsureSchema(EnsureSchemaOperation),
	RenameColumn(RenameColumnOperation),
	RenameIndex(RenameIndexOperation),
	RenameSequence(RenameSequenceOperation),
	RenameTable(RenameTableOperation),
	RestartSequence(RestartSequenceOperation),
	Sql(SqlOperation),
}

impl Operation {
	/// Whether applying this operation can lose data.
	///
	/// Drops always can. Column alterations and raw SQL carry an explicit flag
	/// set by whoever produced them.
	pub fn is_destructive_change(&self) -> bool {
		match self {
			Operation::DropColumn(_)
			| Operation::DropForeignKey(_)
			| Operation::DropIndex(_)
			| Operation::DropPrimaryKey(_)
			| Operation::DropSchema(_)
			| Operation::DropSequence(_)
			| Operation::DropTable(_)
			| Operation::DropUniqueConstraint(_) => true,
			Operation::AlterColumn(op) => op.is_destructive_change,
			Operation::Sql(op) => op.is_destructive_change,
			_ => false,
		}
	}

	/// Table the operation targets, if any.
	pub fn table(&self) -> Option<&str> {
		match self {
			Operation::AddColumn(op) => Some(&op.table),
			Operation::AddForeignKey(op) => Some(&op.table),
			Operation::AddPrimaryKey(op) => Some(&op.table),
			Operation::AddUniqueConstraint(op) => Some(&op.table),
			Operation::AlterColumn(op) => Some(&op.table),
			Operation::CreateIndex(op) => Some(&op.table),
			Operation::CreateTable(op) => Some(&op.name),
			Operation::DropColumn(op) => Some(&op.table),
			Operation::DropForeignKey(op) => Some(&op.table),
			Operation::DropIndex(op) => Some(&op.table),
			Operation::DropPrimaryKey(op) => Some(&op.table),
			Operation::DropTable(op) => Some(&op.name),
			Operation::DropUniqueConstraint(op) => Some(&op.table),
			Operation::RenameColumn(op) => Some(&op.table),
			Operation::RenameIndex(op) => Some(&op.table),
			Operation::RenameTable(op) => Some(&op.name),
			Operation::AlterSequence(_)
			| Operation::CreateSequence(_)
			| Operation::DropSchema(_)
			| Operation::DropSequence(_)
			| Operation::EnsureSchema(_)
			| Operation::RenameSequence(_)
			| Operation::RestartSequence(_)
			| Operation::Sql(_) => None,
		}
	}
}
