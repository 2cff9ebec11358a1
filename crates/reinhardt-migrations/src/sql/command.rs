//! Relational commands and the builder that splits rendered text into them

use crate::indented::{Indentable, IndentedStringBuilder};
use std::fmt;

/// One independently executable piece of SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationalCommand {
	command_text: String,
}

impl RelationalCommand {
	pub fn new(command_text: impl Into<String>) -> Self {
		Self {
			command_text: command_text.into(),
		}
	}

	pub fn command_text(&self) -> &str {
		&self.command_text
	}

	pub fn into_text(self) -> String {
		self.command_text
	}
}

impl fmt::Display for RelationalCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.command_text)
	}
}

/// Accumulates rendered SQL and cuts it into [`RelationalCommand`]s.
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::sql::CommandListBuilder;
///
/// let mut builder = CommandListBuilder::new();
/// builder.append("DROP TABLE \"A\"").append_line(";").end_command();
/// builder.end_command();
/// builder.append_line("DROP TABLE \"B\";").end_command();
///
/// let commands = builder.into_commands();
/// assert_eq!(commands.len(), 2);
/// assert_eq!(commands[1].command_text(), "DROP TABLE \"B\";\n");
/// ```
#[derive(Debug, Default)]
pub struct CommandListBuilder {
	commands: Vec<RelationalCommand>,
	current: IndentedStringBuilder,
}

impl CommandListBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn append(&mut self, text: &str) -> &mut Self {
		self.current.append(text);
		self
	}

	pub fn append_line(&mut self, text: &str) -> &mut Self {
		self.current.append_line(text);
		self
	}

	pub fn append_lines(&mut self, text: &str) -> &mut Self {
		self.current.append_lines(text);
		self
	}

	/// Whether text has been appended since the last command boundary.
	pub fn has_pending_text(&self) -> bool {
		!self.current.is_empty()
	}

	/// Text appended since the last command boundary.
	pub fn pending_text(&self) -> &str {
		self.current.as_str()
	}

	/// Close the current command. Does nothing when no text is pending.
	pub fn end_command(&mut self) -> &mut Self {
		if self.has_pending_text() {
			let text = self.current.take();
			self.commands.push(RelationalCommand::new(text));
		}
		self
	}

	pub fn commands(&self) -> &[RelationalCommand] {
		&self.commands
	}

	pub fn into_commands(self) -> Vec<RelationalCommand> {
		self.commands
	}
}

impl Indentable for CommandListBuilder {
	fn increment_indent(&mut self) {
		self.current.increment_indent();
	}

	fn decrement_indent(&mut self) {
		self.current.decrement_indent();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_end_command_without_text_is_noop() {
		// Arrange
		let mut builder = CommandListBuilder::new();

		// Act
		builder.end_command().end_command();

		// Assert
		assert!(builder.commands().is_empty());
	}

	#[rstest]
	fn test_indent_survives_command_boundary() {
		// Arrange
		let mut builder = CommandListBuilder::new();

		// Act
		{
			let mut inner = builder.indent();
			inner.append_line("a").end_command();
			inner.append_line("b").end_command();
		}
		builder.append_line("c").end_command();

		// Assert
		let texts: Vec<&str> = builder.commands().iter().map(|c| c.command_text()).collect();
		assert_eq!(texts, vec!["    a\n", "    b\n", "c\n"]);
	}

	#[rstest]
	fn test_pending_text_is_kept_until_end_command() {
		let mut builder = CommandListBuilder::new();
		builder.append("ALTER TABLE");
		assert!(builder.has_pending_text());
		assert_eq!(builder.pending_text(), "ALTER TABLE");
		assert!(builder.commands().is_empty());
	}
}
