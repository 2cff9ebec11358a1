//! SQL scripts spanning several migrations
//!
//! A script renders the path between two points of a context's migration
//! history. Each migration's SQL is followed by the statement that records it
//! in (or removes it from) the history table, so running the script leaves the
//! history consistent with the schema.

use crate::history::{HistoryRow, HistoryScripts};
use crate::indented::IndentedStringBuilder;
use crate::registry::{MigrationDescriptor, MigrationsAssembly};
use crate::sql::MigrationsSqlGenerator;
use crate::{MigrationError, Result};

/// Marker for the database before the first migration.
pub const INITIAL_DATABASE: &str = "0";

/// Renders migration scripts for one context and dialect.
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::prelude::*;
///
/// let context = ContextType::new("BloggingContext");
/// let mut registry = MigrationRegistry::new(context.clone());
/// registry.register(
/// 	MigrationDescriptor::new("20240101000000_Initial", "Migrations", context)
/// 		.with_up(vec![SqlOperation::new("CREATE TABLE Blog (Id int)").into()]),
/// );
/// let generator = AnsiSqlGenerator::new();
///
/// let script = MigrationScriptGenerator::new(&registry, &generator)
/// 	.generate_script(None, None)
/// 	.unwrap();
///
/// assert!(script.contains("CREATE TABLE Blog (Id int);\n"));
/// assert!(script.contains("INSERT INTO \"__reinhardt_migrations_history\""));
/// ```
pub struct MigrationScriptGenerator<'a> {
	assembly: &'a dyn MigrationsAssembly,
	generator: &'a dyn MigrationsSqlGenerator,
	history: HistoryScripts<'a>,
}

impl<'a> MigrationScriptGenerator<'a> {
	pub fn new(
		assembly: &'a dyn MigrationsAssembly,
		generator: &'a dyn MigrationsSqlGenerator,
	) -> Self {
		Self {
			assembly,
			generator,
			history: HistoryScripts::new(generator),
		}
	}

	/// Use a custom history table.
	pub fn with_history_table(mut self, name: impl Into<String>, schema: Option<String>) -> Self {
		self.history = HistoryScripts::new(self.generator).with_table(name, schema);
		self
	}

	/// Script moving the database from migration `from` to migration `to`.
	///
	/// Both ends accept a migration id, a migration name or
	/// [`INITIAL_DATABASE`]. `from` defaults to the initial database and `to`
	/// to the last migration. When `to` is older than `from` the script
	/// reverts migrations, newest first.
	pub fn generate_script(&self, from: Option<&str>, to: Option<&str>) -> Result<String> {
		let migrations = self.assembly.migrations();

		let from = match from.filter(|f| !f.is_empty()) {
			None => INITIAL_DATABASE.to_string(),
			Some(from) => self.resolve(from)?,
		};
		let to = match to.filter(|t| !t.is_empty()) {
			None => migrations
				.last()
				.map(|m| m.id.clone())
				.unwrap_or_else(|| INITIAL_DATABASE.to_string()),
			Some(to) => self.resolve(to)?,
		};
		let from_key = from.to_lowercase();
		let to_key = to.to_lowercase();

		let mut builder = IndentedStringBuilder::new();

		if from_key <= to_key {
			let to_apply: Vec<&MigrationDescriptor> = migrations
				.iter()
				.copied()
				.filter(|m| {
					let key = m.id.to_lowercase();
					key > from_key && key <= to_key
				})
				.collect();

			if let (Some(first), Some(applied)) = (migrations.first(), to_apply.first())
				&& first.id == applied.id
			{
				builder.append_lines(&self.history.create_if_not_exists_script());
				builder.append_line("");
			}

			for migration in to_apply {
				tracing::debug!(migration_id = %migration.id, "Generating up script");
				let commands = self
					.generator
					.generate(&migration.up, migration.target_model.as_ref())?;
				for command in commands {
					builder.append_lines(command.command_text()).append_line("");
				}
				builder
					.append_lines(&self.history.insert_script(&HistoryRow::new(&migration.id)))
					.append_line("");
			}
		} else {
			let mut to_revert: Vec<&MigrationDescriptor> = migrations
				.iter()
				.copied()
				.filter(|m| {
					let key = m.id.to_lowercase();
					key > to_key && key <= from_key
				})
				.collect();
			to_revert.reverse();

			for migration in &to_revert {
				tracing::debug!(migration_id = %migration.id, "Generating down script");
				let previous_model = self
					.previous_migration(&migrations, migration)
					.and_then(|m| m.target_model.as_ref());
				let commands = self.generator.generate(&migration.down, previous_model)?;
				for command in commands {
					builder.append_lines(command.command_text()).append_line("");
				}
				builder
					.append_lines(&self.history.delete_script(&migration.id))
					.append_line("");
			}
		}

		Ok(builder.into_string())
	}

	fn resolve(&self, name_or_id: &str) -> Result<String> {
		if name_or_id == INITIAL_DATABASE {
			return Ok(INITIAL_DATABASE.to_string());
		}
		self.assembly.find_migration_id(name_or_id).ok_or_else(|| {
			MigrationError::InvalidArgument(format!("The migration '{}' was not found", name_or_id))
		})
	}

	/// Migration immediately before `migration` in the history.
	fn previous_migration<'m>(
		&self,
		migrations: &[&'m MigrationDescriptor],
		migration: &MigrationDescriptor,
	) -> Option<&'m MigrationDescriptor> {
		let position = migrations.iter().position(|m| m.id == migration.id)?;
		position.checked_sub(1).map(|i| migrations[i])
	}
}
