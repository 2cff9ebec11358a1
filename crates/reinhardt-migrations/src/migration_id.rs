//! Migration identifiers
//!
//! Ids have the form `YYYYMMDDHHMMSS_Name` (UTC), so sorting ids as strings
//! sorts migrations in creation order.

use crate::{MigrationError, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use parking_lot::Mutex;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_LEN: usize = 14;

/// Produces and parses migration ids.
pub trait MigrationIdGenerator: Send + Sync {
	/// Generate a new id for `name`.
	fn generate_id(&self, name: &str) -> Result<String>;

	/// Name part of an id, or the input itself when it is not an id.
	fn get_name(&self, id: &str) -> String {
		migration_name(id).to_string()
	}

	fn is_valid_id(&self, value: &str) -> bool {
		is_valid_id(value)
	}
}

/// Name part of `id`, or `id` itself when it does not carry a timestamp.
pub fn migration_name(id: &str) -> &str {
	if is_valid_id(id) {
		&id[TIMESTAMP_LEN + 1..]
	} else {
		id
	}
}

/// Whether `value` is a timestamp prefix, an underscore and a non-empty name.
pub fn is_valid_id(value: &str) -> bool {
	value.len() > TIMESTAMP_LEN + 1
		&& value.is_char_boundary(TIMESTAMP_LEN)
		&& value.as_bytes()[TIMESTAMP_LEN] == b'_'
		&& value[..TIMESTAMP_LEN].bytes().all(|b| b.is_ascii_digit())
		&& NaiveDateTime::parse_from_str(&value[..TIMESTAMP_LEN], TIMESTAMP_FORMAT).is_ok()
}

/// Replace characters that cannot appear in an identifier with `_`.
pub fn sanitize_name(name: &str) -> Result<String> {
	let trimmed = name.trim();
	if trimmed.is_empty() {
		return Err(MigrationError::InvalidArgument(
			"Migration name must not be empty".to_string(),
		));
	}

	Ok(trimmed
		.chars()
		.map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
		.collect())
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Last timestamp handed out by any system-clock generator in this process.
static LAST_TIMESTAMP: Mutex<Option<NaiveDateTime>> = parking_lot::const_mutex(None);

enum LastTimestamp {
	Process,
	Instance(Mutex<Option<NaiveDateTime>>),
}

impl LastTimestamp {
	fn cell(&self) -> &Mutex<Option<NaiveDateTime>> {
		match self {
			LastTimestamp::Process => &LAST_TIMESTAMP,
			LastTimestamp::Instance(last) => last,
		}
	}
}

/// Timestamp-based id generator.
///
/// Ids are strictly increasing: when the clock has not moved past the
/// previous id's second, the timestamp is bumped by one second. Generators
/// built with [`new`](Self::new) share the previous timestamp across the
/// whole process; a generator with a custom clock tracks its own.
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::migration_id::{MigrationIdGenerator, TimestampIdGenerator};
///
/// let generator = TimestampIdGenerator::new();
/// let first = generator.generate_id("InitialCreate").unwrap();
/// let second = generator.generate_id("AddBlogUrl").unwrap();
///
/// assert!(first < second);
/// assert_eq!(generator.get_name(&second), "AddBlogUrl");
/// ```
pub struct TimestampIdGenerator {
	clock: Clock,
	last: LastTimestamp,
}

impl Default for TimestampIdGenerator {
	fn default() -> Self {
		Self::new()
	}
}

impl TimestampIdGenerator {
	pub fn new() -> Self {
		Self {
			clock: Box::new(Utc::now),
			last: LastTimestamp::Process,
		}
	}

	/// Use a custom clock, mainly for deterministic ids in tests.
	pub fn with_clock<F>(clock: F) -> Self
	where
		F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
	{
		Self {
			clock: Box::new(clock),
			last: LastTimestamp::Instance(Mutex::new(None)),
		}
	}

	fn next_timestamp(&self) -> NaiveDateTime {
		let now = (self.clock)().naive_utc();
		let now = now.with_nanosecond(0).unwrap_or(now);

		let mut last = self.last.cell().lock();
		let stamp = match *last {
			Some(previous) if now <= previous => previous + Duration::seconds(1),
			_ => now,
		};
		*last = Some(stamp);
		stamp
	}
}

impl MigrationIdGenerator for TimestampIdGenerator {
	fn generate_id(&self, name: &str) -> Result<String> {
		let name = sanitize_name(name)?;
		let id = format!("{}_{}", self.next_timestamp().format(TIMESTAMP_FORMAT), name);
		tracing::trace!(id = %id, "Generated migration id");
		Ok(id)
	}
}
