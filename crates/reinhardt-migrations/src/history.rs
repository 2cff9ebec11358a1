//! Migration history
//!
//! The history table records which migrations have been applied to a database.
//! [`HistoryRepository`] is the read side the scaffolder consults before
//! removing a migration; [`MigrationRecorder`] is an in-memory implementation;
//! [`HistoryScripts`] renders the DDL and DML that maintain the table.

use crate::indented::{IndentedStringBuilder, Indentable};
use crate::sql::MigrationsSqlGenerator;
use crate::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Default name of the history table
pub const DEFAULT_HISTORY_TABLE: &str = "__reinhardt_migrations_history";

/// Version recorded alongside applied migrations
pub const PRODUCT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A row of the history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
	pub migration_id: String,
	pub product_version: String,
	pub applied: DateTime<Utc>,
}

impl HistoryRow {
	pub fn new(migration_id: impl Into<String>) -> Self {
		Self {
			migration_id: migration_id.into(),
			product_version: PRODUCT_VERSION.to_string(),
			applied: Utc::now(),
		}
	}
}

/// Source of the migrations applied to a database.
pub trait HistoryRepository: Send + Sync {
	/// Applied migrations, ordered by id.
	fn applied_migrations(&self) -> Result<Vec<HistoryRow>>;

	/// Whether `migration_id` is recorded, compared case-insensitively.
	fn is_applied(&self, migration_id: &str) -> Result<bool> {
		Ok(self
			.applied_migrations()?
			.iter()
			.any(|row| row.migration_id.eq_ignore_ascii_case(migration_id)))
	}
}

/// In-memory migration history.
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::history::{HistoryRepository, MigrationRecorder};
///
/// let recorder = MigrationRecorder::new();
/// recorder.record_applied("20240101000000_Initial");
///
/// assert!(recorder.is_applied("20240101000000_Initial").unwrap());
/// recorder.unapply("20240101000000_Initial");
/// assert!(!recorder.is_applied("20240101000000_Initial").unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MigrationRecorder {
	rows: RwLock<Vec<HistoryRow>>,
}

impl MigrationRecorder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record a migration as applied. Recording an id twice keeps one row.
	pub fn record_applied(&self, migration_id: &str) {
		let mut rows = self.rows.write();
		if rows.iter().any(|r| r.migration_id == migration_id) {
			return;
		}
		rows.push(HistoryRow::new(migration_id));
		rows.sort_by(|a, b| a.migration_id.cmp(&b.migration_id));
		tracing::debug!(migration_id, "Recorded applied migration");
	}

	/// Remove a migration from the history.
	pub fn unapply(&self, migration_id: &str) {
		self.rows.write().retain(|r| r.migration_id != migration_id);
		tracing::debug!(migration_id, "Removed migration from history");
	}
}

impl HistoryRepository for MigrationRecorder {
	fn applied_migrations(&self) -> Result<Vec<HistoryRow>> {
		Ok(self.rows.read().clone())
	}
}

/// Renders the statements that maintain the history table.
///
/// ```rust
/// use reinhardt_migrations::history::HistoryScripts;
/// use reinhardt_migrations::sql::AnsiSqlGenerator;
///
/// let generator = AnsiSqlGenerator::new();
/// let scripts = HistoryScripts::new(&generator);
///
/// assert_eq!(
/// 	scripts.delete_script("20240101000000_Initial"),
/// 	"DELETE FROM \"__reinhardt_migrations_history\"\nWHERE \"migration_id\" = '20240101000000_Initial';\n"
/// );
/// ```
pub struct HistoryScripts<'a> {
	generator: &'a dyn MigrationsSqlGenerator,
	table_name: String,
	table_schema: Option<String>,
}

impl<'a> HistoryScripts<'a> {
	pub fn new(generator: &'a dyn MigrationsSqlGenerator) -> Self {
		Self {
			generator,
			table_name: DEFAULT_HISTORY_TABLE.to_string(),
			table_schema: None,
		}
	}

	pub fn with_table(mut self, name: impl Into<String>, schema: Option<String>) -> Self {
		self.table_name = name.into();
		self.table_schema = schema;
		self
	}

	fn table(&self) -> String {
		self.generator
			.helper()
			.delimit_qualified(&self.table_name, self.table_schema.as_deref())
	}

	/// `CREATE TABLE IF NOT EXISTS` for the history table.
	pub fn create_if_not_exists_script(&self) -> String {
		let helper = self.generator.helper();
		let mapper = self.generator.type_mapper();
		let mut builder = IndentedStringBuilder::new();

		builder
			.append("CREATE TABLE IF NOT EXISTS ")
			.append(&self.table())
			.append_line(" (");
		{
			let mut body = builder.indent();
			body.append(&helper.delimit_identifier("migration_id"))
				.append(" ")
				.append(&mapper.sized_string_type(150))
				.append_line(" NOT NULL,");
			body.append(&helper.delimit_identifier("product_version"))
				.append(" ")
				.append(&mapper.sized_string_type(32))
				.append_line(" NOT NULL,");
			body.append("CONSTRAINT ")
				.append(&helper.delimit_identifier(&format!("PK_{}", self.table_name)))
				.append(" PRIMARY KEY (")
				.append(&helper.delimit_identifier("migration_id"))
				.append_line(")");
		}
		builder.append(")").append(helper.batch_terminator()).append_line("");

		builder.into_string()
	}

	pub fn insert_script(&self, row: &HistoryRow) -> String {
		let helper = self.generator.helper();
		format!(
			"INSERT INTO {} ({}, {})\nVALUES ('{}', '{}'){}\n",
			self.table(),
			helper.delimit_identifier("migration_id"),
			helper.delimit_identifier("product_version"),
			helper.escape_literal(&row.migration_id),
			helper.escape_literal(&row.product_version),
			helper.batch_terminator()
		)
	}

	pub fn delete_script(&self, migration_id: &str) -> String {
		let helper = self.generator.helper();
		format!(
			"DELETE FROM {}\nWHERE {} = '{}'{}\n",
			self.table(),
			helper.delimit_identifier("migration_id"),
			helper.escape_literal(migration_id),
			helper.batch_terminator()
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sql::{AnsiSqlGenerator, MySqlSqlGenerator, SqliteSqlGenerator};
	use rstest::rstest;

	#[rstest]
	fn test_recorder_keeps_rows_sorted_and_unique() {
		// Arrange
		let recorder = MigrationRecorder::new();

		// Act
		recorder.record_applied("20240201000000_Second");
		recorder.record_applied("20240101000000_First");
		recorder.record_applied("20240201000000_Second");

		// Assert
		let ids: Vec<String> = recorder
			.applied_migrations()
			.unwrap()
			.into_iter()
			.map(|r| r.migration_id)
			.collect();
		assert_eq!(ids, vec!["20240101000000_First", "20240201000000_Second"]);
	}

	#[rstest]
	fn test_is_applied_ignores_case() {
		let recorder = MigrationRecorder::new();
		recorder.record_applied("20240101000000_Initial");
		assert!(recorder.is_applied("20240101000000_INITIAL").unwrap());
	}

	#[rstest]
	fn test_create_script() {
		let generator = AnsiSqlGenerator::new();
		let script = HistoryScripts::new(&generator).create_if_not_exists_script();
		assert_eq!(
			script,
			"CREATE TABLE IF NOT EXISTS \"__reinhardt_migrations_history\" (\n    \"migration_id\" varchar(150) NOT NULL,\n    \"product_version\" varchar(32) NOT NULL,\n    CONSTRAINT \"PK___reinhardt_migrations_history\" PRIMARY KEY (\"migration_id\")\n);\n"
		);
	}

	#[rstest]
	fn test_insert_script_escapes_id() {
		let generator = MySqlSqlGenerator::new();
		let row = HistoryRow {
			migration_id: "20240101000000_It's".to_string(),
			product_version: "0.1.0".to_string(),
			applied: Utc::now(),
		};

		let script = HistoryScripts::new(&generator).insert_script(&row);

		assert_eq!(
			script,
			"INSERT INTO `__reinhardt_migrations_history` (`migration_id`, `product_version`)\nVALUES ('20240101000000_It''s', '0.1.0');\n"
		);
	}

	#[rstest]
	fn test_custom_table_ignores_schema_on_sqlite() {
		let generator = SqliteSqlGenerator::new();
		let scripts = HistoryScripts::new(&generator).with_table("history", Some("meta".to_string()));
		assert_eq!(
			scripts.delete_script("1"),
			"DELETE FROM \"history\"\nWHERE \"migration_id\" = '1';\n"
		);
	}
}
