//! Integration tests for migration scaffolding, saving and removal

use reinhardt_migrations::prelude::*;
use rstest::{fixture, rstest};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::layer::SubscriberExt;

const DATA_LOSS_WARNING: &str = "An operation was scaffolded that may result in the loss of data. Please review the migration for accuracy";

type RecordedOperations = Arc<Mutex<Vec<(Vec<Operation>, Vec<Operation>)>>>;

/// Code generator that counts calls and records the operations it is given.
#[derive(Default)]
struct RecordingCodeGenerator {
	calls: Arc<AtomicUsize>,
	operations: RecordedOperations,
	inner: RustCodeGenerator,
}

impl CodeGenerator for RecordingCodeGenerator {
	fn file_extension(&self) -> &str {
		self.inner.file_extension()
	}

	fn generate_migration(
		&self,
		namespace: &str,
		name: &str,
		up: &[Operation],
		down: &[Operation],
	) -> Result<String> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.operations
			.lock()
			.unwrap()
			.push((up.to_vec(), down.to_vec()));
		self.inner.generate_migration(namespace, name, up, down)
	}

	fn generate_metadata(
		&self,
		namespace: &str,
		context_type: &ContextType,
		name: &str,
		id: &str,
		target_model: &DatabaseModel,
	) -> Result<String> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inner
			.generate_metadata(namespace, context_type, name, id, target_model)
	}

	fn generate_snapshot(
		&self,
		namespace: &str,
		context_type: &ContextType,
		snapshot_name: &str,
		model: &DatabaseModel,
	) -> Result<String> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inner
			.generate_snapshot(namespace, context_type, snapshot_name, model)
	}
}

/// Captures log events as `[LEVEL] message` lines.
struct LogCapture {
	logs: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
		struct MessageVisitor {
			message: String,
		}

		impl tracing::field::Visit for MessageVisitor {
			fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
				if field.name() == "message" {
					self.message = format!("{:?}", value);
				}
			}
		}

		let mut visitor = MessageVisitor {
			message: String::new(),
		};
		event.record(&mut visitor);

		self.logs.lock().unwrap().push(format!(
			"[{}] {}",
			event.metadata().level(),
			visitor.message
		));
	}
}

fn blogging() -> ContextType {
	ContextType::new("Blogging.BloggingContext")
}

fn blog_table() -> TableModel {
	TableModel::new("Blog")
		.column(ColumnModel::new("Id", ValueType::I32))
		.primary_key(KeyModel::new("PK_Blog", ["Id"]))
}

#[fixture]
fn initial_model() -> DatabaseModel {
	DatabaseModel::new().with_table(blog_table())
}

#[fixture]
fn url_model() -> DatabaseModel {
	DatabaseModel::new().with_table(
		blog_table().column(ColumnModel::new("Url", ValueType::String).nullable(true)),
	)
}

/// Registry holding one applied-or-not migration whose target is `model`,
/// with a snapshot of `snapshot_model`.
fn registry_with_initial(model: DatabaseModel, snapshot_model: DatabaseModel) -> MigrationRegistry {
	let mut registry = MigrationRegistry::new(blogging());
	registry
		.register(
			MigrationDescriptor::new("20240101000000_Initial", "Blogging.Migrations", blogging())
				.with_target_model(model),
		)
		.set_snapshot(SnapshotDescriptor::new(
			"BloggingContextModelSnapshot",
			"Blogging.Migrations",
			blogging(),
			snapshot_model,
		));
	registry
}

fn scaffolder(
	model: DatabaseModel,
	registry: MigrationRegistry,
	history: MigrationRecorder,
	code_generator: RecordingCodeGenerator,
) -> MigrationsScaffolder {
	MigrationsScaffolder::new(
		model,
		Box::new(registry),
		Box::new(SchemaDiffer::new()),
		Box::new(TimestampIdGenerator::new()),
		Box::new(code_generator),
		Box::new(history),
	)
}

fn write_file(dir: &Path, relative: &str, contents: &str) {
	let path = dir.join(relative);
	std::fs::create_dir_all(path.parent().unwrap()).unwrap();
	std::fs::write(path, contents).unwrap();
}

#[rstest]
fn test_duplicate_name_fails_before_generating_code(initial_model: DatabaseModel, url_model: DatabaseModel) {
	// Arrange
	let code_generator = RecordingCodeGenerator::default();
	let calls = code_generator.calls.clone();
	let scaffolder = scaffolder(
		url_model,
		registry_with_initial(initial_model.clone(), initial_model),
		MigrationRecorder::new(),
		code_generator,
	);

	// Act
	let result = scaffolder.scaffold_migration("initial", "Blogging", None);

	// Assert
	assert!(matches!(result, Err(MigrationError::DuplicateMigrationName(name)) if name == "initial"));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[rstest]
#[case("Add Url")]
#[case("add-url")]
#[case("  Add_Url ")]
fn test_duplicate_detection_matches_sanitized_name(
	#[case] requested: &str,
	initial_model: DatabaseModel,
	url_model: DatabaseModel,
) {
	// Arrange
	let mut registry = registry_with_initial(initial_model.clone(), url_model.clone());
	registry.register(
		MigrationDescriptor::new("20240201000000_Add_Url", "Blogging.Migrations", blogging())
			.with_target_model(url_model.clone()),
	);
	let code_generator = RecordingCodeGenerator::default();
	let calls = code_generator.calls.clone();
	let scaffolder = scaffolder(url_model, registry, MigrationRecorder::new(), code_generator);

	// Act
	let result = scaffolder.scaffold_migration(requested, "Blogging", None);

	// Assert
	assert!(matches!(result, Err(MigrationError::DuplicateMigrationName(name)) if name == requested));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[rstest]
fn test_multiline_name_is_written_as_one_identifier(initial_model: DatabaseModel) {
	// Arrange
	let scaffolder = MigrationsScaffolder::with_defaults(
		initial_model,
		Box::new(MigrationRegistry::new(blogging())),
		Box::new(MigrationRecorder::new()),
	);

	// Act
	let migration = scaffolder
		.scaffold_migration("Initial\npub fn injected() {}", "Blogging", None)
		.unwrap();

	// Assert
	assert!(migration.migration_id.ends_with("_Initial_pub_fn_injected_____"));
	assert!(!migration.migration_code.contains("\npub fn injected"));
	assert!(!migration.metadata_code.contains("\npub fn injected"));
}

#[rstest]
fn test_down_operations_reverse_the_up_difference(initial_model: DatabaseModel, url_model: DatabaseModel) {
	// Arrange
	let code_generator = RecordingCodeGenerator::default();
	let recorded = code_generator.operations.clone();
	let calls = code_generator.calls.clone();
	let scaffolder = scaffolder(
		url_model.clone(),
		registry_with_initial(initial_model.clone(), initial_model.clone()),
		MigrationRecorder::new(),
		code_generator,
	);

	// Act
	let migration = scaffolder.scaffold_migration("AddUrl", "Blogging", None).unwrap();

	// Assert
	let differ = SchemaDiffer::new();
	let recorded = recorded.lock().unwrap();
	let (up, down) = &recorded[0];
	assert_eq!(up, &differ.get_differences(Some(&initial_model), Some(&url_model)));
	assert_eq!(down, &differ.get_differences(Some(&url_model), Some(&initial_model)));
	assert!(matches!(down.as_slice(), [Operation::DropColumn(op)] if op.name == "Url"));
	assert_eq!(calls.load(Ordering::SeqCst), 3);
	assert_eq!(migration.previous_migration_id.as_deref(), Some("20240101000000_Initial"));
	assert!(migration.migration_code.contains("AddColumnOperation::new(\"Blog\", \"Url\""));
}

#[rstest]
fn test_unchanged_model_scaffolds_empty_migration(initial_model: DatabaseModel) {
	let code_generator = RecordingCodeGenerator::default();
	let recorded = code_generator.operations.clone();
	let scaffolder = scaffolder(
		initial_model.clone(),
		registry_with_initial(initial_model.clone(), initial_model),
		MigrationRecorder::new(),
		code_generator,
	);

	scaffolder.scaffold_migration("Nothing", "Blogging", None).unwrap();

	let recorded = recorded.lock().unwrap();
	assert!(recorded[0].0.is_empty());
	assert!(recorded[0].1.is_empty());
}

#[rstest]
fn test_destructive_operation_logs_data_loss_warning(initial_model: DatabaseModel, url_model: DatabaseModel) {
	// Arrange
	let logs = Arc::new(Mutex::new(Vec::new()));
	let subscriber = tracing_subscriber::registry().with(LogCapture { logs: logs.clone() });
	let _guard = tracing::subscriber::set_default(subscriber);

	let scaffolder = scaffolder(
		initial_model,
		registry_with_initial(url_model.clone(), url_model),
		MigrationRecorder::new(),
		RecordingCodeGenerator::default(),
	);

	// Act
	scaffolder.scaffold_migration("RemoveUrl", "Blogging", None).unwrap();

	// Assert
	let logs = logs.lock().unwrap();
	assert!(
		logs.iter().any(|line| line == &format!("[WARN] {}", DATA_LOSS_WARNING)),
		"Captured logs: {:?}",
		*logs
	);
}

#[rstest]
fn test_additive_operation_logs_no_warning(initial_model: DatabaseModel, url_model: DatabaseModel) {
	let logs = Arc::new(Mutex::new(Vec::new()));
	let subscriber = tracing_subscriber::registry().with(LogCapture { logs: logs.clone() });
	let _guard = tracing::subscriber::set_default(subscriber);

	let scaffolder = scaffolder(
		url_model,
		registry_with_initial(initial_model.clone(), initial_model),
		MigrationRecorder::new(),
		RecordingCodeGenerator::default(),
	);
	scaffolder.scaffold_migration("AddUrl", "Blogging", None).unwrap();

	assert!(!logs.lock().unwrap().iter().any(|line| line.starts_with("[WARN]")));
}

#[rstest]
fn test_last_migration_namespace_is_reused(initial_model: DatabaseModel, url_model: DatabaseModel) {
	// Arrange
	let mut registry = MigrationRegistry::new(blogging());
	registry.register(
		MigrationDescriptor::new("20240101000000_Initial", "Blogging.Data.Migrations", blogging())
			.with_target_model(initial_model.clone()),
	);
	let scaffolder = scaffolder(
		url_model,
		registry,
		MigrationRecorder::new(),
		RecordingCodeGenerator::default(),
	);

	// Act
	let migration = scaffolder.scaffold_migration("AddUrl", "Blogging", None).unwrap();

	// Assert
	assert_eq!(migration.migration_sub_namespace, "Data.Migrations");
	assert!(migration.migration_code.contains("//! Namespace: Blogging.Data.Migrations"));
}

#[rstest]
#[case::defaulted(None, "Migrations.Blogging", false)]
#[case::explicit(Some("Migrations"), "Migrations", true)]
fn test_namespace_shared_with_another_context(
	initial_model: DatabaseModel,
	#[case] sub_namespace: Option<&str>,
	#[case] expected: &str,
	#[case] warns: bool,
) {
	// Arrange
	let logs = Arc::new(Mutex::new(Vec::new()));
	let subscriber = tracing_subscriber::registry().with(LogCapture { logs: logs.clone() });
	let _guard = tracing::subscriber::set_default(subscriber);

	let identity = ContextType::new("Identity.IdentityContext");
	let mut registry = MigrationRegistry::new(blogging());
	registry.register(MigrationDescriptor::new(
		"20240101000000_Identity",
		"Blogging.Migrations",
		identity,
	));
	let scaffolder = scaffolder(
		initial_model,
		registry,
		MigrationRecorder::new(),
		RecordingCodeGenerator::default(),
	);

	// Act
	let migration = scaffolder
		.scaffold_migration("Initial", "Blogging", sub_namespace)
		.unwrap();

	// Assert
	assert_eq!(migration.migration_sub_namespace, expected);
	let warned = logs
		.lock()
		.unwrap()
		.iter()
		.any(|line| line == "[WARN] The namespace contains migrations for a different context");
	assert_eq!(warned, warns);
}

#[rstest]
fn test_save_then_remove_restores_project(initial_model: DatabaseModel) {
	// Arrange
	let project = TempDir::new().unwrap();
	let scaffolder = MigrationsScaffolder::with_defaults(
		initial_model.clone(),
		Box::new(MigrationRegistry::new(blogging())),
		Box::new(MigrationRecorder::new()),
	);
	let migration = scaffolder
		.scaffold_migration("Initial", "Blogging", None)
		.unwrap();

	// Act
	let saved = scaffolder.save(project.path(), &migration).unwrap();

	// Assert
	let migration_file = saved.migration_file.clone().unwrap();
	let metadata_file = saved.metadata_file.clone().unwrap();
	let snapshot_file = saved.snapshot_file.clone().unwrap();
	assert_eq!(
		migration_file,
		project
			.path()
			.join("Migrations")
			.join(format!("{}.rs", migration.migration_id))
	);
	assert_eq!(
		metadata_file.file_name().unwrap().to_string_lossy(),
		format!("{}.Designer.rs", migration.migration_id)
	);
	assert_eq!(
		snapshot_file,
		project
			.path()
			.join("Migrations")
			.join("BloggingContextModelSnapshot.rs")
	);
	assert!(migration_file.exists() && metadata_file.exists() && snapshot_file.exists());

	// Arrange: the project as compiled after saving
	let mut registry = MigrationRegistry::new(blogging());
	registry
		.register(
			MigrationDescriptor::new(&migration.migration_id, "Blogging.Migrations", blogging())
				.with_target_model(initial_model.clone()),
		)
		.set_snapshot(SnapshotDescriptor::new(
			&migration.snapshot_name,
			"Blogging.Migrations",
			blogging(),
			initial_model.clone(),
		));
	let scaffolder = MigrationsScaffolder::with_defaults(
		initial_model,
		Box::new(registry),
		Box::new(MigrationRecorder::new()),
	);

	// Act
	let removed = scaffolder.remove_migration(project.path(), "Blogging").unwrap();

	// Assert
	assert_eq!(removed, saved);
	assert!(!migration_file.exists());
	assert!(!metadata_file.exists());
	assert!(!snapshot_file.exists());
}

#[rstest]
fn test_remove_last_of_two_migrations_reverts_snapshot(initial_model: DatabaseModel, url_model: DatabaseModel) {
	// Arrange
	let project = TempDir::new().unwrap();
	write_file(project.path(), "Migrations/20240101000000_Initial.rs", "// initial");
	write_file(project.path(), "Migrations/20240101000000_Initial.Designer.rs", "// initial metadata");
	write_file(project.path(), "Migrations/20240201000000_AddUrl.rs", "// add url");
	write_file(project.path(), "Migrations/20240201000000_AddUrl.Designer.rs", "// add url metadata");
	write_file(project.path(), "Migrations/BloggingContextModelSnapshot.rs", "// snapshot");
	let mut registry = registry_with_initial(initial_model, url_model.clone());
	registry.register(
		MigrationDescriptor::new("20240201000000_AddUrl", "Blogging.Migrations", blogging())
			.with_target_model(url_model.clone()),
	);
	let scaffolder = scaffolder(
		url_model,
		registry,
		MigrationRecorder::new(),
		RecordingCodeGenerator::default(),
	);
	let migrations = project.path().join("Migrations");

	// Act
	let files = scaffolder.remove_migration(project.path(), "Blogging").unwrap();

	// Assert
	assert_eq!(files.migration_file, Some(migrations.join("20240201000000_AddUrl.rs")));
	assert_eq!(
		files.metadata_file,
		Some(migrations.join("20240201000000_AddUrl.Designer.rs"))
	);
	assert_eq!(
		files.snapshot_file,
		Some(migrations.join("BloggingContextModelSnapshot.rs"))
	);
	assert!(!migrations.join("20240201000000_AddUrl.rs").exists());
	assert!(!migrations.join("20240201000000_AddUrl.Designer.rs").exists());
	assert_eq!(
		std::fs::read_to_string(migrations.join("20240101000000_Initial.rs")).unwrap(),
		"// initial"
	);
	assert!(migrations.join("20240101000000_Initial.Designer.rs").exists());
	let snapshot = std::fs::read_to_string(migrations.join("BloggingContextModelSnapshot.rs")).unwrap();
	assert!(snapshot.contains("pub fn model() -> DatabaseModel"));
	assert!(snapshot.contains("\"Blog\""));
	assert!(!snapshot.contains("\"Url\""));
}

#[rstest]
fn test_remove_applied_migration_deletes_nothing(initial_model: DatabaseModel) {
	// Arrange
	let project = TempDir::new().unwrap();
	write_file(project.path(), "Migrations/20240101000000_Initial.rs", "// migration");
	write_file(project.path(), "Migrations/BloggingContextModelSnapshot.rs", "// snapshot");
	let history = MigrationRecorder::new();
	history.record_applied("20240101000000_Initial");
	let scaffolder = scaffolder(
		initial_model.clone(),
		registry_with_initial(initial_model.clone(), initial_model),
		history,
		RecordingCodeGenerator::default(),
	);

	// Act
	let result = scaffolder.remove_migration(project.path(), "Blogging");

	// Assert
	assert!(
		matches!(result, Err(MigrationError::UnapplyMigration(id)) if id == "20240101000000_Initial")
	);
	assert!(project.path().join("Migrations/20240101000000_Initial.rs").exists());
	assert!(project.path().join("Migrations/BloggingContextModelSnapshot.rs").exists());
}

#[rstest]
fn test_remove_after_manual_delete_reverts_snapshot_only(initial_model: DatabaseModel, url_model: DatabaseModel) {
	// Arrange
	let project = TempDir::new().unwrap();
	write_file(project.path(), "Migrations/20240101000000_Initial.rs", "// migration");
	write_file(project.path(), "Migrations/BloggingContextModelSnapshot.rs", "// snapshot");
	let code_generator = RecordingCodeGenerator::default();
	let calls = code_generator.calls.clone();
	let scaffolder = scaffolder(
		url_model.clone(),
		registry_with_initial(initial_model, url_model),
		MigrationRecorder::new(),
		code_generator,
	);

	// Act
	let files = scaffolder.remove_migration(project.path(), "Blogging").unwrap();

	// Assert
	assert!(files.migration_file.is_none());
	assert!(files.metadata_file.is_none());
	assert!(project.path().join("Migrations/20240101000000_Initial.rs").exists());
	let snapshot = std::fs::read_to_string(files.snapshot_file.unwrap()).unwrap();
	assert!(snapshot.contains("pub fn model() -> DatabaseModel"));
	assert!(!snapshot.contains("\"Url\""));
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[rstest]
fn test_remove_without_snapshot_fails(initial_model: DatabaseModel) {
	let project = TempDir::new().unwrap();
	let scaffolder = MigrationsScaffolder::with_defaults(
		initial_model,
		Box::new(MigrationRegistry::new(blogging())),
		Box::new(MigrationRecorder::new()),
	);

	let result = scaffolder.remove_migration(project.path(), "Blogging");

	assert!(matches!(result, Err(MigrationError::NoSnapshot)));
}
