//! Code generation for scaffolded migrations
//!
//! A scaffolded migration is materialized as three source artifacts: the
//! migration itself (`up` and `down` operations), its metadata (id, owning
//! context and target model) and the model snapshot of the context.

pub mod rust_writer;

pub use rust_writer::RustCodeGenerator;

use crate::Result;
use crate::model::DatabaseModel;
use crate::operations::Operation;
use crate::registry::ContextType;

/// Produces source code for migration artifacts.
pub trait CodeGenerator: Send + Sync {
	/// Extension of generated files, including the leading dot.
	fn file_extension(&self) -> &str;

	fn generate_migration(
		&self,
		namespace: &str,
		name: &str,
		up: &[Operation],
		down: &[Operation],
	) -> Result<String>;

	/// Code binding a migration id to its context and target model.
	fn generate_metadata(
		&self,
		namespace: &str,
		context_type: &ContextType,
		name: &str,
		id: &str,
		target_model: &DatabaseModel,
	) -> Result<String>;

	fn generate_snapshot(
		&self,
		namespace: &str,
		context_type: &ContextType,
		snapshot_name: &str,
		model: &DatabaseModel,
	) -> Result<String>;
}
