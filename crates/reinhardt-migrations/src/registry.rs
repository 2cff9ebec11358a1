//! Migrations registry
//!
//! Compiled migrations and the model snapshot of a project, queried explicitly
//! instead of discovered at runtime. The scaffolder asks the registry for the
//! last migration of its context, for the current snapshot, and for which
//! namespaces hold migrations of other contexts.

use crate::migration_id::migration_name;
use crate::model::DatabaseModel;
use crate::operations::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully qualified name of the context type that owns migrations, e.g.
/// `Blogging.Data.BloggingContext`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextType(String);

impl ContextType {
	pub fn new(full_name: impl Into<String>) -> Self {
		Self(full_name.into())
	}

	pub fn full_name(&self) -> &str {
		&self.0
	}

	/// Last path segment, e.g. `BloggingContext`.
	pub fn name(&self) -> &str {
		self.0.rsplit(['.', ':']).next().unwrap_or(&self.0)
	}
}

impl fmt::Display for ContextType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A compiled migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationDescriptor {
	pub id: String,
	pub namespace: String,
	pub context_type: ContextType,
	pub up: Vec<Operation>,
	pub down: Vec<Operation>,
	/// Model after the migration is applied, as recorded in its metadata
	pub target_model: Option<DatabaseModel>,
}

impl MigrationDescriptor {
	pub fn new(
		id: impl Into<String>,
		namespace: impl Into<String>,
		context_type: ContextType,
	) -> Self {
		Self {
			id: id.into(),
			namespace: namespace.into(),
			context_type,
			up: Vec::new(),
			down: Vec::new(),
			target_model: None,
		}
	}

	pub fn with_up(mut self, up: Vec<Operation>) -> Self {
		self.up = up;
		self
	}

	pub fn with_down(mut self, down: Vec<Operation>) -> Self {
		self.down = down;
		self
	}

	pub fn with_target_model(mut self, model: DatabaseModel) -> Self {
		self.target_model = Some(model);
		self
	}
}

/// The compiled model snapshot of a context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDescriptor {
	pub name: String,
	pub namespace: String,
	pub context_type: ContextType,
	pub model: DatabaseModel,
}

impl SnapshotDescriptor {
	pub fn new(
		name: impl Into<String>,
		namespace: impl Into<String>,
		context_type: ContextType,
		model: DatabaseModel,
	) -> Self {
		Self {
			name: name.into(),
			namespace: namespace.into(),
			context_type,
			model,
		}
	}
}

/// Read access to the migrations of a project.
pub trait MigrationsAssembly: Send + Sync {
	/// Context whose migrations this assembly serves.
	fn context_type(&self) -> &ContextType;

	/// Migrations of [`context_type`](Self::context_type), ordered by id.
	fn migrations(&self) -> Vec<&MigrationDescriptor>;

	/// Every registered migration, whatever context owns it.
	fn all_migrations(&self) -> Vec<&MigrationDescriptor>;

	fn model_snapshot(&self) -> Option<&SnapshotDescriptor>;

	/// Id of the migration of this context matching `name_or_id`, compared
	/// case-insensitively against both the full id and its name part.
	fn find_migration_id(&self, name_or_id: &str) -> Option<String> {
		self.migrations()
			.into_iter()
			.find(|m| {
				m.id.eq_ignore_ascii_case(name_or_id)
					|| migration_name(&m.id).eq_ignore_ascii_case(name_or_id)
			})
			.map(|m| m.id.clone())
	}

	fn last_migration(&self) -> Option<&MigrationDescriptor> {
		self.migrations().into_iter().last()
	}
}

/// In-memory [`MigrationsAssembly`].
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::registry::*;
///
/// let context = ContextType::new("Blogging.BloggingContext");
/// let mut registry = MigrationRegistry::new(context.clone());
/// registry.register(MigrationDescriptor::new(
/// 	"20240101000000_Initial",
/// 	"Blogging.Migrations",
/// 	context.clone(),
/// ));
///
/// assert_eq!(
/// 	registry.find_migration_id("initial").as_deref(),
/// 	Some("20240101000000_Initial")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MigrationRegistry {
	context_type: ContextType,
	migrations: Vec<MigrationDescriptor>,
	snapshot: Option<SnapshotDescriptor>,
}

impl MigrationRegistry {
	pub fn new(context_type: ContextType) -> Self {
		Self {
			context_type,
			migrations: Vec::new(),
			snapshot: None,
		}
	}

	/// Register a migration. Migrations of any context may be registered.
	pub fn register(&mut self, migration: MigrationDescriptor) -> &mut Self {
		self.migrations.push(migration);
		self.migrations.sort_by(|a, b| a.id.cmp(&b.id));
		self
	}

	pub fn set_snapshot(&mut self, snapshot: SnapshotDescriptor) -> &mut Self {
		self.snapshot = Some(snapshot);
		self
	}

	pub fn clear_snapshot(&mut self) -> &mut Self {
		self.snapshot = None;
		self
	}
}

impl MigrationsAssembly for MigrationRegistry {
	fn context_type(&self) -> &ContextType {
		&self.context_type
	}

	fn migrations(&self) -> Vec<&MigrationDescriptor> {
		self.migrations
			.iter()
			.filter(|m| m.context_type == self.context_type)
			.collect()
	}

	fn all_migrations(&self) -> Vec<&MigrationDescriptor> {
		self.migrations.iter().collect()
	}

	fn model_snapshot(&self) -> Option<&SnapshotDescriptor> {
		self.snapshot
			.as_ref()
			.filter(|s| s.context_type == self.context_type)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn registry() -> MigrationRegistry {
		let blogging = ContextType::new("Blogging.BloggingContext");
		let identity = ContextType::new("Identity.IdentityContext");
		let mut registry = MigrationRegistry::new(blogging.clone());
		registry
			.register(MigrationDescriptor::new(
				"20240201000000_AddUrl",
				"Blogging.Migrations",
				blogging.clone(),
			))
			.register(MigrationDescriptor::new(
				"20240101000000_Initial",
				"Blogging.Migrations",
				blogging,
			))
			.register(MigrationDescriptor::new(
				"20240301000000_Users",
				"Blogging.Migrations",
				identity,
			));
		registry
	}

	#[rstest]
	fn test_migrations_are_filtered_and_ordered(registry: MigrationRegistry) {
		// Act
		let ids: Vec<&str> = registry.migrations().iter().map(|m| m.id.as_str()).collect();

		// Assert
		assert_eq!(ids, vec!["20240101000000_Initial", "20240201000000_AddUrl"]);
		assert_eq!(registry.all_migrations().len(), 3);
		assert_eq!(
			registry.last_migration().map(|m| m.id.as_str()),
			Some("20240201000000_AddUrl")
		);
	}

	#[rstest]
	#[case("AddUrl", Some("20240201000000_AddUrl"))]
	#[case("addurl", Some("20240201000000_AddUrl"))]
	#[case("20240101000000_Initial", Some("20240101000000_Initial"))]
	#[case("Users", None)]
	#[case("Missing", None)]
	fn test_find_migration_id(
		registry: MigrationRegistry,
		#[case] name: &str,
		#[case] expected: Option<&str>,
	) {
		assert_eq!(registry.find_migration_id(name).as_deref(), expected);
	}

	#[rstest]
	fn test_snapshot_of_other_context_is_ignored(mut registry: MigrationRegistry) {
		registry.set_snapshot(SnapshotDescriptor::new(
			"IdentityContextModelSnapshot",
			"Identity.Migrations",
			ContextType::new("Identity.IdentityContext"),
			DatabaseModel::new(),
		));
		assert!(registry.model_snapshot().is_none());
	}

	#[rstest]
	#[case("Blogging.Data.BloggingContext", "BloggingContext")]
	#[case("blogging::data::BloggingContext", "BloggingContext")]
	#[case("BloggingContext", "BloggingContext")]
	fn test_context_type_name(#[case] full_name: &str, #[case] expected: &str) {
		assert_eq!(ContextType::new(full_name).name(), expected);
	}
}
