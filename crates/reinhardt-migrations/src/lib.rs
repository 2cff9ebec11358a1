//! # Reinhardt Migrations
//!
//! Schema migration engine for the Reinhardt framework.
//!
//! ## Features
//!
//! - **Operations**: A closed catalogue of schema-change intents (columns, tables,
//!   keys, indexes, sequences, schemas and raw SQL)
//! - **SQL Generation**: Dialect-aware DDL rendering for ANSI, PostgreSQL, SQLite and MySQL
//! - **Model Diffing**: Ordered operation lists computed between two relational models
//! - **Scaffolding**: Migration, metadata and snapshot artifacts written to the project tree
//! - **Sortable IDs**: `YYYYMMDDHHMMSS_Name` identifiers that never collide within a process
//!
//! ## Rendering Operations
//!
//! ```rust
//! use reinhardt_migrations::prelude::*;
//!
//! let generator = AnsiSqlGenerator::new();
//! let operations = vec![Operation::AddColumn(AddColumnOperation::new(
//! 	"Post",
//! 	"Id",
//! 	ValueType::I32,
//! ))];
//!
//! let commands = generator.generate(&operations, None).unwrap();
//! assert_eq!(commands[0].command_text(), "ALTER TABLE \"Post\" ADD \"Id\" int NOT NULL;\n");
//! ```
//!
//! ## Scaffolding Migrations
//!
//! [`MigrationsScaffolder`](scaffolder::MigrationsScaffolder) wires a model differ,
//! an id generator, a code generator, the migrations registry and the history
//! repository together. Scaffolding is pure: files are only touched by
//! [`save`](scaffolder::MigrationsScaffolder::save) and
//! [`remove_migration`](scaffolder::MigrationsScaffolder::remove_migration).

pub mod codegen;
pub mod differ;
pub mod history;
pub mod indented;
pub mod migration_id;
pub mod model;
pub mod operations;
pub mod registry;
pub mod scaffolder;
pub mod script;
pub mod settings;
pub mod sql;
pub mod types;

pub use codegen::{CodeGenerator, RustCodeGenerator};
pub use differ::{ModelDiffer, SchemaDiffer};
pub use history::{HistoryRepository, HistoryRow, MigrationRecorder};
pub use migration_id::{MigrationIdGenerator, TimestampIdGenerator};
pub use model::{
	ColumnModel, DatabaseModel, ForeignKeyModel, IndexModel, KeyModel, SequenceModel, TableModel,
};
pub use operations::*;
pub use registry::{
	ContextType, MigrationDescriptor, MigrationRegistry, MigrationsAssembly, SnapshotDescriptor,
};
pub use scaffolder::{MigrationFiles, MigrationsScaffolder, ScaffoldedMigration};
pub use script::MigrationScriptGenerator;
pub use settings::{MigrationSettings, SettingsError, SqlDialect};
pub use sql::{
	AnsiSqlGenerator, CommandListBuilder, MigrationsSqlGenerator, MySqlSqlGenerator,
	PostgresSqlGenerator, RelationalCommand, SqlGenerationHelper, SqliteSqlGenerator, TypeMapper,
};
pub use types::{Literal, ValueType};

/// Errors raised by the migration engine.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
	#[error("The name '{0}' is used by an existing migration")]
	DuplicateMigrationName(String),

	#[error(
		"The migration '{0}' has already been applied to the database. Unapply it and try again"
	)]
	UnapplyMigration(String),

	#[error("No model snapshot was found for this context")]
	NoSnapshot,

	#[error("'{generator}' does not support operations of type '{operation}'")]
	UnknownOperation {
		generator: String,
		operation: &'static str,
	},

	#[error("'{generator}' must override rendering of '{operation}'")]
	NotImplemented {
		generator: String,
		operation: &'static str,
	},

	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Formatting error: {0}")]
	Fmt(#[from] std::fmt::Error),

	#[error("Settings error: {0}")]
	Settings(#[from] SettingsError),
}

pub type Result<T> = std::result::Result<T, MigrationError>;

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::codegen::*;
	pub use crate::differ::*;
	pub use crate::history::*;
	pub use crate::migration_id::*;
	pub use crate::model::*;
	pub use crate::operations::*;
	pub use crate::registry::*;
	pub use crate::scaffolder::*;
	pub use crate::script::*;
	pub use crate::settings::*;
	pub use crate::sql::*;
	pub use crate::types::*;
	pub use crate::{MigrationError, Result};
}
