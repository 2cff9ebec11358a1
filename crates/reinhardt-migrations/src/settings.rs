//! Migration settings
//!
//! Naming conventions for scaffolded artifacts and the target SQL dialect.
//! Settings come from defaults, a TOML document, or environment variables.

use crate::sql::{
	AnsiSqlGenerator, MigrationsSqlGenerator, MySqlSqlGenerator, PostgresSqlGenerator,
	SqliteSqlGenerator,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
	#[default]
	Ansi,
	Postgres,
	Sqlite,
	Mysql,
}

impl SqlDialect {
	/// Build the SQL generator for this dialect.
	pub fn generator(&self) -> Box<dyn MigrationsSqlGenerator> {
		match self {
			SqlDialect::Ansi => Box::new(AnsiSqlGenerator::new()),
			SqlDialect::Postgres => Box::new(PostgresSqlGenerator::new()),
			SqlDialect::Sqlite => Box::new(SqliteSqlGenerator::new()),
			SqlDialect::Mysql => Box::new(MySqlSqlGenerator::new()),
		}
	}
}

impl fmt::Display for SqlDialect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			SqlDialect::Ansi => "ansi",
			SqlDialect::Postgres => "postgres",
			SqlDialect::Sqlite => "sqlite",
			SqlDialect::Mysql => "mysql",
		};
		f.write_str(name)
	}
}

impl FromStr for SqlDialect {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"ansi" => Ok(SqlDialect::Ansi),
			"postgres" | "postgresql" => Ok(SqlDialect::Postgres),
			"sqlite" => Ok(SqlDialect::Sqlite),
			"mysql" => Ok(SqlDialect::Mysql),
			other => Err(SettingsError::ValidationError(format!(
				"Unknown SQL dialect '{}'",
				other
			))),
		}
	}
}

/// Settings for scaffolding and SQL generation.
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::settings::{MigrationSettings, SqlDialect};
///
/// let settings = MigrationSettings::from_toml_str(
/// 	r#"
/// 	default_sub_namespace = "Data.Migrations"
/// 	dialect = "postgres"
/// 	"#,
/// )
/// .unwrap();
///
/// assert_eq!(settings.default_sub_namespace, "Data.Migrations");
/// assert_eq!(settings.dialect, SqlDialect::Postgres);
/// assert_eq!(settings.snapshot_suffix, "ModelSnapshot");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationSettings {
	/// Sub-namespace used when the caller gives none and no migration exists yet
	pub default_sub_namespace: String,
	/// Appended to the context name to form the default snapshot name
	pub snapshot_suffix: String,
	/// Appended to the migration id to form the metadata file stem
	pub metadata_suffix: String,
	pub dialect: SqlDialect,
}

impl Default for MigrationSettings {
	fn default() -> Self {
		Self {
			default_sub_namespace: "Migrations".to_string(),
			snapshot_suffix: "ModelSnapshot".to_string(),
			metadata_suffix: ".Designer".to_string(),
			dialect: SqlDialect::Ansi,
		}
	}
}

impl MigrationSettings {
	/// Parse settings from TOML text. Missing keys keep their defaults.
	pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
		let settings: MigrationSettings = toml::from_str(contents)
			.map_err(|e| SettingsError::ParseError(format!("TOML parse error: {}", e)))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Load settings from a TOML file.
	pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
		let path = path.into();
		let contents = std::fs::read_to_string(&path).map_err(|e| {
			SettingsError::FileError(format!("Failed to read {}: {}", path.display(), e))
		})?;
		Self::from_toml_str(&contents)
	}

	/// Defaults overridden by `REINHARDT_MIGRATIONS_*` environment variables.
	pub fn from_env() -> Result<Self, SettingsError> {
		let mut settings = Self::default();

		if let Ok(namespace) = std::env::var("REINHARDT_MIGRATIONS_SUB_NAMESPACE") {
			settings.default_sub_namespace = namespace;
		}

		if let Ok(suffix) = std::env::var("REINHARDT_MIGRATIONS_SNAPSHOT_SUFFIX") {
			settings.snapshot_suffix = suffix;
		}

		if let Ok(suffix) = std::env::var("REINHARDT_MIGRATIONS_METADATA_SUFFIX") {
			settings.metadata_suffix = suffix;
		}

		if let Ok(dialect) = std::env::var("REINHARDT_MIGRATIONS_DIALECT") {
			settings.dialect = dialect.parse()?;
		}

		settings.validate()?;
		Ok(settings)
	}

	/// Validate settings
	pub fn validate(&self) -> Result<(), SettingsError> {
		if !is_namespace(&self.default_sub_namespace) {
			return Err(SettingsError::ValidationError(format!(
				"default_sub_namespace '{}' must be a dot-separated list of identifiers",
				self.default_sub_namespace
			)));
		}

		if self.snapshot_suffix.is_empty() {
			return Err(SettingsError::ValidationError(
				"snapshot_suffix must not be empty".to_string(),
			));
		}

		if self.metadata_suffix.is_empty() {
			return Err(SettingsError::ValidationError(
				"metadata_suffix must not be empty".to_string(),
			));
		}

		Ok(())
	}
}

/// Whether `value` is a non-empty, dot-separated list of identifiers.
pub(crate) fn is_namespace(value: &str) -> bool {
	!value.is_empty()
		&& value.split('.').all(|part| {
			let mut chars = part.chars();
			matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
				&& chars.all(|c| c.is_alphanumeric() || c == '_')
		})
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("File error: {0}")]
	FileError(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),
}
