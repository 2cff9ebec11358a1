//! Migration scaffolding
//!
//! [`MigrationsScaffolder`] turns the difference between the last model
//! snapshot and the current model into migration source code, writes the
//! generated artifacts to the project tree, and removes the last migration
//! again when it has not been applied.
//!
//! Each migration produces three files:
//!
//! - `<dir>/<MigrationId><ext>`: the `up` and `down` operations
//! - `<dir>/<MigrationId><metadata suffix><ext>`: id, context and target model
//! - `<snapshot dir>/<SnapshotName><ext>`: the model snapshot, one per context
//!
//! Scaffolding itself never touches the file system; [`MigrationsScaffolder::save`]
//! writes and [`MigrationsScaffolder::remove_migration`] deletes. `save` writes
//! its files one after the other, so a failure part way leaves the files
//! written so far in place.

use crate::codegen::{CodeGenerator, RustCodeGenerator};
use crate::differ::{ModelDiffer, SchemaDiffer};
use crate::history::HistoryRepository;
use crate::migration_id::{MigrationIdGenerator, TimestampIdGenerator, sanitize_name};
use crate::model::DatabaseModel;
use crate::registry::{ContextType, MigrationsAssembly};
use crate::settings::MigrationSettings;
use crate::{MigrationError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Generated source of a new migration, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldedMigration {
	pub migration_id: String,
	/// Id of the migration this one follows, if any
	pub previous_migration_id: Option<String>,
	pub migration_code: String,
	pub metadata_code: String,
	/// Namespace of the migration relative to the root namespace
	pub migration_sub_namespace: String,
	pub snapshot_code: String,
	pub snapshot_name: String,
	pub snapshot_sub_namespace: String,
	pub file_extension: String,
}

/// Files written or deleted by a scaffolder call. Unset fields mean no file of
/// that kind was touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationFiles {
	pub migration_file: Option<PathBuf>,
	pub metadata_file: Option<PathBuf>,
	pub snapshot_file: Option<PathBuf>,
}

/// Scaffolds, saves and removes migrations of one context.
///
/// The collaborators are fixed at construction. Concurrent calls against the
/// same project directory must be serialized by the caller.
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::prelude::*;
///
/// let context = ContextType::new("Blogging.BloggingContext");
/// let model = DatabaseModel::new().with_table(
/// 	TableModel::new("Blog")
/// 		.column(ColumnModel::new("Id", ValueType::I32))
/// 		.primary_key(KeyModel::new("PK_Blog", ["Id"])),
/// );
///
/// let scaffolder = MigrationsScaffolder::with_defaults(
/// 	model,
/// 	Box::new(MigrationRegistry::new(context)),
/// 	Box::new(MigrationRecorder::new()),
/// );
///
/// let migration = scaffolder
/// 	.scaffold_migration("InitialCreate", "Blogging", None)
/// 	.unwrap();
///
/// assert!(migration.migration_id.ends_with("_InitialCreate"));
/// assert_eq!(migration.migration_sub_namespace, "Migrations");
/// assert_eq!(migration.snapshot_name, "BloggingContextModelSnapshot");
/// ```
pub struct MigrationsScaffolder {
	context_type: ContextType,
	model: DatabaseModel,
	assembly: Box<dyn MigrationsAssembly>,
	differ: Box<dyn ModelDiffer>,
	id_generator: Box<dyn MigrationIdGenerator>,
	code_generator: Box<dyn CodeGenerator>,
	history: Box<dyn HistoryRepository>,
	settings: MigrationSettings,
}

impl MigrationsScaffolder {
	pub fn new(
		model: DatabaseModel,
		assembly: Box<dyn MigrationsAssembly>,
		differ: Box<dyn ModelDiffer>,
		id_generator: Box<dyn MigrationIdGenerator>,
		code_generator: Box<dyn CodeGenerator>,
		history: Box<dyn HistoryRepository>,
	) -> Self {
		Self {
			context_type: assembly.context_type().clone(),
			model,
			assembly,
			differ,
			id_generator,
			code_generator,
			history,
			settings: MigrationSettings::default(),
		}
	}

	/// Scaffolder using [`SchemaDiffer`], [`TimestampIdGenerator`] and
	/// [`RustCodeGenerator`].
	pub fn with_defaults(
		model: DatabaseModel,
		assembly: Box<dyn MigrationsAssembly>,
		history: Box<dyn HistoryRepository>,
	) -> Self {
		Self::new(
			model,
			assembly,
			Box::new(SchemaDiffer::new()),
			Box::new(TimestampIdGenerator::new()),
			Box::new(RustCodeGenerator::new()),
			history,
		)
	}

	pub fn with_settings(mut self, settings: MigrationSettings) -> Self {
		self.settings = settings;
		self
	}

	pub fn settings(&self) -> &MigrationSettings {
		&self.settings
	}

	pub fn context_type(&self) -> &ContextType {
		&self.context_type
	}

	/// Generate the code of a new migration named `migration_name`.
	///
	/// When `sub_namespace` is `None` the migration goes next to the last
	/// migration of the context, or into the default sub-namespace when there
	/// is none.
	pub fn scaffold_migration(
		&self,
		migration_name: &str,
		root_namespace: &str,
		sub_namespace: Option<&str>,
	) -> Result<ScaffoldedMigration> {
		if root_namespace.is_empty() {
			return Err(MigrationError::InvalidArgument(
				"Root namespace must not be empty".to_string(),
			));
		}

		// Ids carry the sanitized name, so duplicates are found by it
		let name = sanitize_name(migration_name)?;
		if self.assembly.find_migration_id(&name).is_some() {
			return Err(MigrationError::DuplicateMigrationName(
				migration_name.to_string(),
			));
		}

		let (sub_namespace, defaulted) = match sub_namespace.filter(|s| !s.is_empty()) {
			Some(sub_namespace) => (sub_namespace, false),
			None => (self.settings.default_sub_namespace.as_str(), true),
		};

		let last_migration = self.assembly.last_migration();

		let mut migration_namespace = format!("{}.{}", root_namespace, sub_namespace);
		if defaulted {
			migration_namespace = self.get_namespace(
				last_migration.map(|m| (m.id.as_str(), m.namespace.as_str())),
				migration_namespace,
			);
		}

		if self.contains_foreign_migrations(&migration_namespace) {
			if defaulted {
				migration_namespace = self.context_namespace(root_namespace);
				tracing::debug!(
					namespace = %migration_namespace,
					"Using a context specific namespace next to migrations of other contexts"
				);
			} else {
				tracing::warn!(
					namespace = %migration_namespace,
					"The namespace contains migrations for a different context"
				);
			}
		}

		let snapshot = self.assembly.model_snapshot();
		let last_model = snapshot.map(|s| &s.model);
		let up = self.differ.get_differences(last_model, Some(&self.model));
		let down = if up.is_empty() {
			Vec::new()
		} else {
			self.differ.get_differences(Some(&self.model), last_model)
		};

		let migration_id = self.id_generator.generate_id(&name)?;
		let snapshot_namespace = self.get_namespace(
			snapshot.map(|s| (s.name.as_str(), s.namespace.as_str())),
			migration_namespace.clone(),
		);

		let mut snapshot_name = format!("{}{}", self.context_type.name(), self.settings.snapshot_suffix);
		if let Some(snapshot) = snapshot
			&& snapshot.name != snapshot_name
		{
			tracing::debug!(name = %snapshot.name, "Reusing model snapshot name");
			snapshot_name = snapshot.name.clone();
		}

		if up.iter().any(|op| op.is_destructive_change()) {
			tracing::warn!(
				migration_id = %migration_id,
				"An operation was scaffolded that may result in the loss of data. Please review the migration for accuracy"
			);
		}

		let migration_code = self.code_generator.generate_migration(
			&migration_namespace,
			&name,
			&up,
			&down,
		)?;
		let metadata_code = self.code_generator.generate_metadata(
			&migration_namespace,
			&self.context_type,
			&name,
			&migration_id,
			&self.model,
		)?;
		let snapshot_code = self.code_generator.generate_snapshot(
			&snapshot_namespace,
			&self.context_type,
			&snapshot_name,
			&self.model,
		)?;

		tracing::info!(migration_id = %migration_id, operations = up.len(), "Scaffolded migration");

		Ok(ScaffoldedMigration {
			migration_id,
			previous_migration_id: last_migration.map(|m| m.id.clone()),
			migration_code,
			metadata_code,
			migration_sub_namespace: get_sub_namespace(root_namespace, &migration_namespace),
			snapshot_code,
			snapshot_name,
			snapshot_sub_namespace: get_sub_namespace(root_namespace, &snapshot_namespace),
			file_extension: self.code_generator.file_extension().to_string(),
		})
	}

	/// Remove the last migration and revert the model snapshot.
	///
	/// The migration files are only deleted when the last migration's target
	/// model still matches the snapshot. When it does not, the migration was
	/// already deleted by hand and only the snapshot is reverted.
	pub fn remove_migration(
		&self,
		project_dir: impl AsRef<Path>,
		root_namespace: &str,
	) -> Result<MigrationFiles> {
		let project_dir = project_dir.as_ref();
		let mut files = MigrationFiles::default();

		let snapshot = self
			.assembly
			.model_snapshot()
			.ok_or(MigrationError::NoSnapshot)?;
		let extension = self.code_generator.file_extension();

		let migrations = self.assembly.migrations();
		let mut model: Option<&DatabaseModel> = None;
		if let Some((migration, earlier)) = migrations.split_last() {
			model = migration.target_model.as_ref();

			if !self.differ.has_differences(model, Some(&snapshot.model)) {
				if self.history.is_applied(&migration.id)? {
					return Err(MigrationError::UnapplyMigration(migration.id.clone()));
				}

				let migration_file_name = format!("{}{}", migration.id, extension);
				match self.try_get_project_file(project_dir, &migration_file_name) {
					Some(path) => {
						tracing::info!(migration_id = %migration.id, "Removing migration");
						files.migration_file = delete_file(path)?;
					}
					None => tracing::warn!(
						file = %migration_file_name,
						"No file was found for the migration. Was it deleted manually?"
					),
				}

				let metadata_file_name = format!(
					"{}{}{}",
					migration.id, self.settings.metadata_suffix, extension
				);
				match self.try_get_project_file(project_dir, &metadata_file_name) {
					Some(path) => files.metadata_file = delete_file(path)?,
					None => tracing::debug!(
						file = %metadata_file_name,
						"No metadata file was found for the migration"
					),
				}

				model = earlier.last().and_then(|m| m.target_model.as_ref());
			} else {
				tracing::debug!(
					"The model snapshot does not match the last migration. Assuming it was deleted manually"
				);
			}
		}

		let snapshot_file_name = format!("{}{}", snapshot.name, extension);
		let snapshot_file = self.try_get_project_file(project_dir, &snapshot_file_name);
		match model {
			None => match snapshot_file {
				Some(path) => {
					tracing::info!("Removing model snapshot");
					files.snapshot_file = delete_file(path)?;
				}
				None => tracing::warn!(
					file = %snapshot_file_name,
					"No file was found for the model snapshot. Was it deleted manually?"
				),
			},
			Some(model) => {
				let snapshot_code = self.code_generator.generate_snapshot(
					&snapshot.namespace,
					&self.context_type,
					&snapshot.name,
					model,
				)?;

				let path = match snapshot_file {
					Some(path) => path,
					None => {
						let directory = self.get_directory(
							project_dir,
							None,
							&get_sub_namespace(root_namespace, &snapshot.namespace),
						);
						fs::create_dir_all(&directory)?;
						directory.join(&snapshot_file_name)
					}
				};

				tracing::info!(file = %path.display(), "Reverting model snapshot");
				fs::write(&path, snapshot_code)?;
				files.snapshot_file = Some(path);
			}
		}

		Ok(files)
	}

	/// Write the files of a scaffolded migration.
	pub fn save(
		&self,
		project_dir: impl AsRef<Path>,
		migration: &ScaffoldedMigration,
	) -> Result<MigrationFiles> {
		let project_dir = project_dir.as_ref();
		let extension = &migration.file_extension;

		let last_migration_file_name = migration
			.previous_migration_id
			.as_ref()
			.map(|id| format!("{}{}", id, extension));
		let migration_directory = self.get_directory(
			project_dir,
			last_migration_file_name.as_deref(),
			&migration.migration_sub_namespace,
		);
		let migration_file = migration_directory.join(format!("{}{}", migration.migration_id, extension));
		let metadata_file = migration_directory.join(format!(
			"{}{}{}",
			migration.migration_id, self.settings.metadata_suffix, extension
		));

		let snapshot_file_name = format!("{}{}", migration.snapshot_name, extension);
		let snapshot_directory = self.get_directory(
			project_dir,
			Some(&snapshot_file_name),
			&migration.snapshot_sub_namespace,
		);
		let snapshot_file = snapshot_directory.join(&snapshot_file_name);

		tracing::debug!(file = %migration_file.display(), "Writing migration");
		fs::create_dir_all(&migration_directory)?;
		fs::write(&migration_file, &migration.migration_code)?;
		fs::write(&metadata_file, &migration.metadata_code)?;

		tracing::debug!(file = %snapshot_file.display(), "Writing model snapshot");
		fs::create_dir_all(&snapshot_directory)?;
		fs::write(&snapshot_file, &migration.snapshot_code)?;

		Ok(MigrationFiles {
			migration_file: Some(migration_file),
			metadata_file: Some(metadata_file),
			snapshot_file: Some(snapshot_file),
		})
	}

	/// Namespace of `sibling` (a `(name, namespace)` pair) when it differs from
	/// `default_namespace`, else `default_namespace`.
	pub fn get_namespace(&self, sibling: Option<(&str, &str)>, default_namespace: String) -> String {
		match sibling {
			Some((name, namespace)) if namespace != default_namespace => {
				tracing::debug!(sibling = name, namespace, "Reusing namespace");
				namespace.to_string()
			}
			_ => default_namespace,
		}
	}

	/// Directory for files of `sub_namespace`.
	///
	/// When a file named `sibling_file_name` exists under `project_dir`, its
	/// directory is used so files stay together even if they were moved.
	/// Otherwise the sub-namespace is mapped to nested directories.
	pub fn get_directory(
		&self,
		project_dir: &Path,
		sibling_file_name: Option<&str>,
		sub_namespace: &str,
	) -> PathBuf {
		let default_directory = sub_namespace
			.split('.')
			.filter(|part| !part.is_empty())
			.fold(project_dir.to_path_buf(), |path, part| path.join(part));

		if let Some(sibling_file_name) = sibling_file_name
			&& let Some(sibling) = self.try_get_project_file(project_dir, sibling_file_name)
			&& let Some(directory) = sibling.parent()
			&& !directory
				.to_string_lossy()
				.eq_ignore_ascii_case(&default_directory.to_string_lossy())
		{
			tracing::debug!(sibling = sibling_file_name, "Reusing directory");
			return directory.to_path_buf();
		}

		default_directory
	}

	/// First file named `file_name` under `project_dir`, in file name order.
	pub fn try_get_project_file(&self, project_dir: &Path, file_name: &str) -> Option<PathBuf> {
		WalkDir::new(project_dir)
			.sort_by_file_name()
			.into_iter()
			.filter_map(|entry| entry.ok())
			.find(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
			.map(|entry| entry.into_path())
	}

	/// Whether `namespace` holds migrations owned by another context.
	pub fn contains_foreign_migrations(&self, namespace: &str) -> bool {
		self.assembly
			.all_migrations()
			.iter()
			.any(|m| m.namespace == namespace && m.context_type != self.context_type)
	}

	/// `<root>.<default sub-namespace>.<name>`, where `<name>` is the context
	/// name without a trailing `Context`, or with `Migrations` appended.
	fn context_namespace(&self, root_namespace: &str) -> String {
		let context_name = self.context_type.name();
		let name = match context_name.strip_suffix("Context") {
			Some(stripped) => stripped.to_string(),
			None => format!("{}Migrations", context_name),
		};
		format!(
			"{}.{}.{}",
			root_namespace, self.settings.default_sub_namespace, name
		)
	}
}

/// `namespace` relative to `root_namespace`.
pub fn get_sub_namespace(root_namespace: &str, namespace: &str) -> String {
	if namespace == root_namespace {
		return String::new();
	}
	namespace
		.strip_prefix(root_namespace)
		.and_then(|rest| rest.strip_prefix('.'))
		.unwrap_or(namespace)
		.to_string()
}

/// Delete a file, treating a file that vanished in the meantime as deleted.
fn delete_file(path: PathBuf) -> Result<Option<PathBuf>> {
	match fs::remove_file(&path) {
		Ok(()) => Ok(Some(path)),
		Err(e) if e.kind() == io::ErrorKind::NotFound => {
			tracing::debug!(file = %path.display(), "File was already deleted");
			Ok(None)
		}
		Err(e) => Err(e.into()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::history::MigrationRecorder;
	use crate::registry::{MigrationDescriptor, MigrationRegistry};
	use rstest::rstest;
	use tempfile::TempDir;

	fn scaffolder(registry: MigrationRegistry) -> MigrationsScaffolder {
		MigrationsScaffolder::with_defaults(
			DatabaseModel::new(),
			Box::new(registry),
			Box::new(MigrationRecorder::new()),
		)
	}

	#[rstest]
	#[case("Blogging", "Blogging", "")]
	#[case("Blogging", "Blogging.Migrations", "Migrations")]
	#[case("Blogging", "Blogging.Data.Migrations", "Data.Migrations")]
	#[case("Blogging", "BloggingApp.Migrations", "BloggingApp.Migrations")]
	#[case("Blogging", "Other.Migrations", "Other.Migrations")]
	fn test_get_sub_namespace(#[case] root: &str, #[case] namespace: &str, #[case] expected: &str) {
		assert_eq!(get_sub_namespace(root, namespace), expected);
	}

	#[rstest]
	#[case("Blogging.BloggingContext", "Blogging.Migrations.Blogging")]
	#[case("Blogging.BloggingStore", "Blogging.Migrations.BloggingStoreMigrations")]
	fn test_context_namespace(#[case] context: &str, #[case] expected: &str) {
		let scaffolder = scaffolder(MigrationRegistry::new(ContextType::new(context)));
		assert_eq!(scaffolder.context_namespace("Blogging"), expected);
	}

	#[rstest]
	fn test_get_directory_prefers_sibling_location() {
		// Arrange
		let project = TempDir::new().unwrap();
		let moved = project.path().join("Data").join("Moved");
		fs::create_dir_all(&moved).unwrap();
		fs::write(moved.join("20240101000000_Initial.rs"), "").unwrap();
		let scaffolder = scaffolder(MigrationRegistry::new(ContextType::new("BloggingContext")));

		// Act
		let with_sibling =
			scaffolder.get_directory(project.path(), Some("20240101000000_Initial.rs"), "Migrations");
		let without_sibling = scaffolder.get_directory(project.path(), Some("Missing.rs"), "Data.Migrations");

		// Assert
		assert_eq!(with_sibling, moved);
		assert_eq!(without_sibling, project.path().join("Data").join("Migrations"));
	}

	#[rstest]
	fn test_contains_foreign_migrations() {
		let blogging = ContextType::new("BloggingContext");
		let mut registry = MigrationRegistry::new(blogging.clone());
		registry
			.register(MigrationDescriptor::new("1_A", "App.Migrations", blogging))
			.register(MigrationDescriptor::new(
				"2_B",
				"App.Shared",
				ContextType::new("IdentityContext"),
			));
		let scaffolder = scaffolder(registry);

		assert!(!scaffolder.contains_foreign_migrations("App.Migrations"));
		assert!(scaffolder.contains_foreign_migrations("App.Shared"));
	}

	#[rstest]
	fn test_delete_file_tolerates_missing_file() {
		let project = TempDir::new().unwrap();
		let result = delete_file(project.path().join("gone.rs")).unwrap();
		assert!(result.is_none());
	}
}
