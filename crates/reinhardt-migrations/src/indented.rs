//! Indentation-aware text accumulation
//!
//! [`IndentedStringBuilder`] backs both the SQL command list builder and the code
//! generator. Indentation is acquired through [`Indentable::indent`], which
//! returns a guard that restores the previous level when dropped, so every exit
//! path of a render function (including `?`) pops what it pushed.

use std::fmt;
use std::ops::{Deref, DerefMut};

/// Something with a nesting level that can be scoped by an [`Indent`] guard.
pub trait Indentable {
	fn increment_indent(&mut self);

	fn decrement_indent(&mut self);

	/// Push one indentation level for the lifetime of the returned guard.
	///
	/// # Examples
	///
	/// ```rust
	/// use reinhardt_migrations::indented::{Indentable, IndentedStringBuilder};
	///
	/// let mut builder = IndentedStringBuilder::new();
	/// builder.append_line("(");
	/// {
	/// 	let mut inner = builder.indent();
	/// 	inner.append_line("\"Id\" int");
	/// }
	/// builder.append(")");
	///
	/// assert_eq!(builder.as_str(), "(\n    \"Id\" int\n)");
	/// ```
	fn indent(&mut self) -> Indent<'_, Self>
	where
		Self: Sized,
	{
		self.increment_indent();
		Indent { target: self }
	}
}

/// Scoped indentation level. Dereferences to the indented target.
pub struct Indent<'a, T: Indentable> {
	target: &'a mut T,
}

impl<T: Indentable> Deref for Indent<'_, T> {
	type Target = T;

	fn deref(&self) -> &T {
		self.target
	}
}

impl<T: Indentable> DerefMut for Indent<'_, T> {
	fn deref_mut(&mut self) -> &mut T {
		self.target
	}
}

impl<T: Indentable> Drop for Indent<'_, T> {
	fn drop(&mut self) {
		self.target.decrement_indent();
	}
}

const DEFAULT_INDENT_UNIT: &str = "    ";

/// String builder that prefixes each new line with the current indentation.
#[derive(Debug, Clone)]
pub struct IndentedStringBuilder {
	buffer: String,
	unit: String,
	level: usize,
	at_line_start: bool,
}

impl Default for IndentedStringBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl IndentedStringBuilder {
	/// Create a builder indenting with four spaces.
	pub fn new() -> Self {
		Self::with_unit(DEFAULT_INDENT_UNIT)
	}

	/// Create a builder with a custom indentation unit, e.g. `"\t"`.
	pub fn with_unit(unit: impl Into<String>) -> Self {
		Self {
			buffer: String::new(),
			unit: unit.into(),
			level: 0,
			at_line_start: true,
		}
	}

	pub fn level(&self) -> usize {
		self.level
	}

	pub fn len(&self) -> usize {
		self.buffer.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buffer.is_empty()
	}

	/// Append text to the current line.
	pub fn append(&mut self, text: &str) -> &mut Self {
		if text.is_empty() {
			return self;
		}
		self.write_indent();
		self.buffer.push_str(text);
		self
	}

	/// Append text and terminate the line. Empty text yields a bare newline.
	pub fn append_line(&mut self, text: &str) -> &mut Self {
		self.append(text);
		self.buffer.push('\n');
		self.at_line_start = true;
		self
	}

	/// Append multi-line text, indenting every line.
	pub fn append_lines(&mut self, text: &str) -> &mut Self {
		for line in text.lines() {
			self.append_line(line);
		}
		self
	}

	pub fn clear(&mut self) {
		self.buffer.clear();
		self.at_line_start = true;
	}

	/// Move the accumulated text out, keeping the indentation level.
	pub fn take(&mut self) -> String {
		self.at_line_start = true;
		std::mem::take(&mut self.buffer)
	}

	pub fn as_str(&self) -> &str {
		&self.buffer
	}

	pub fn into_string(self) -> String {
		self.buffer
	}

	fn write_indent(&mut self) {
		if self.at_line_start {
			for _ in 0..self.level {
				self.buffer.push_str(&self.unit);
			}
			self.at_line_start = false;
		}
	}
}

impl Indentable for IndentedStringBuilder {
	fn increment_indent(&mut self) {
		self.level += 1;
	}

	fn decrement_indent(&mut self) {
		self.level = self.level.saturating_sub(1);
	}
}

impl fmt::Display for IndentedStringBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.buffer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_guard_pops_level_on_drop() {
		// Arrange
		let mut builder = IndentedStringBuilder::with_unit("\t");

		// Act
		{
			let mut first = builder.indent();
			{
				let mut second = first.indent();
				second.append_line("deep");
				assert_eq!(second.level(), 2);
			}
			first.append_line("shallow");
		}
		builder.append_line("top");

		// Assert
		assert_eq!(builder.level(), 0);
		assert_eq!(builder.as_str(), "\t\tdeep\n\tshallow\ntop\n");
	}

	#[rstest]
	fn test_guard_pops_level_on_early_return() {
		fn render(builder: &mut IndentedStringBuilder, fail: bool) -> Result<(), String> {
			let mut inner = builder.indent();
			inner.append_line("before");
			if fail {
				return Err("failed".to_string());
			}
			inner.append_line("after");
			Ok(())
		}

		// Arrange
		let mut builder = IndentedStringBuilder::new();

		// Act
		let result = render(&mut builder, true);

		// Assert
		assert!(result.is_err());
		assert_eq!(builder.level(), 0);
	}

	#[rstest]
	fn test_empty_line_is_not_indented() {
		// Arrange
		let mut builder = IndentedStringBuilder::new();
		let mut inner = builder.indent();

		// Act
		inner.append_line("a");
		inner.append_line("");
		drop(inner);

		// Assert
		assert_eq!(builder.as_str(), "    a\n\n");
	}

	#[rstest]
	fn test_append_continues_current_line() {
		let mut builder = IndentedStringBuilder::new();
		{
			let mut inner = builder.indent();
			inner.append("ALTER TABLE ").append("\"Post\"");
		}
		assert_eq!(builder.as_str(), "    ALTER TABLE \"Post\"");
	}

	#[rstest]
	fn test_append_lines_indents_each_line() {
		let mut builder = IndentedStringBuilder::with_unit("\t");
		{
			let mut inner = builder.indent();
			inner.append_lines("one\ntwo");
		}
		assert_eq!(builder.as_str(), "\tone\n\ttwo\n");
	}
}
