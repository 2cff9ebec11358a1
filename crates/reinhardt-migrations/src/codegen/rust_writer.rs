//! Rust source writer
//!
//! Operations and models are written as builder-call expressions against the
//! public API of this crate, so generated files compile into the same values
//! they were produced from.

use super::CodeGenerator;
use crate::indented::{Indentable, IndentedStringBuilder};
use crate::model::{
	ColumnModel, DatabaseModel, ForeignKeyModel, IndexModel, KeyModel, SequenceModel, TableModel,
};
use crate::operations::*;
use crate::registry::ContextType;
use crate::settings::is_namespace;
use crate::types::{Literal, ValueType};
use crate::{MigrationError, Result};

/// Writes migrations, metadata and snapshots as Rust modules.
///
/// # Examples
///
/// ```rust
/// use reinhardt_migrations::prelude::*;
///
/// let generator = RustCodeGenerator::new();
/// let up: Vec<Operation> = vec![DropTableOperation::new("Post").into()];
///
/// let code = generator
/// 	.generate_migration("Blogging.Migrations", "DropPost", &up, &[])
/// 	.unwrap();
///
/// assert!(code.contains("//! Name: DropPost"));
/// assert!(code.contains("\t\tDropTableOperation::new(\"Post\")\n\t\t\t.into(),\n"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCodeGenerator;

impl RustCodeGenerator {
	pub fn new() -> Self {
		Self
	}

	fn header(builder: &mut IndentedStringBuilder, title: &str, name: &str, namespace: &str) {
		builder
			.append_line(&format!("//! {}", title))
			.append_line(&format!("//! Name: {}", name))
			.append_line(&format!("//! Namespace: {}", namespace))
			.append_line("")
			.append_line("use reinhardt_migrations::prelude::*;")
			.append_line("");
	}

	fn operations_fn(builder: &mut IndentedStringBuilder, name: &str, operations: &[Operation]) {
		builder.append_line(&format!("pub fn {}() -> Vec<Operation> {{", name));
		{
			let mut body = builder.indent();
			if operations.is_empty() {
				body.append_line("Vec::new()");
			} else {
				body.append_line("vec![");
				{
					let mut items = body.indent();
					for operation in operations {
						operation_expr(operation).call("into", "").write(&mut items);
						items.append_line(",");
					}
				}
				body.append_line("]");
			}
		}
		builder.append_line("}");
	}

	fn model_fn(builder: &mut IndentedStringBuilder, name: &str, model: &DatabaseModel) {
		builder.append_line(&format!("pub fn {}() -> DatabaseModel {{", name));
		{
			let mut body = builder.indent();
			model_expr(model).write(&mut body);
			body.append_line("");
		}
		builder.append_line("}");
	}
}

fn check_namespace(namespace: &str) -> Result<()> {
	if is_namespace(namespace) {
		Ok(())
	} else {
		Err(MigrationError::InvalidArgument(format!(
			"'{}' is not a valid namespace",
			namespace
		)))
	}
}

/// Names end up in `//!` comments and must stay on one line.
fn check_name(name: &str) -> Result<()> {
	if name.is_empty() || name.chars().any(char::is_control) {
		return Err(MigrationError::InvalidArgument(format!(
			"{:?} is not a valid migration or snapshot name",
			name
		)));
	}
	Ok(())
}

impl CodeGenerator for RustCodeGenerator {
	fn file_extension(&self) -> &str {
		".rs"
	}

	fn generate_migration(
		&self,
		namespace: &str,
		name: &str,
		up: &[Operation],
		down: &[Operation],
	) -> Result<String> {
		check_namespace(namespace)?;
		check_name(name)?;

		let mut builder = IndentedStringBuilder::with_unit("\t");
		Self::header(&mut builder, "Auto-generated migration", name, namespace);
		Self::operations_fn(&mut builder, "up", up);
		builder.append_line("");
		Self::operations_fn(&mut builder, "down", down);

		Ok(builder.into_string())
	}

	fn generate_metadata(
		&self,
		namespace: &str,
		context_type: &ContextType,
		name: &str,
		id: &str,
		target_model: &DatabaseModel,
	) -> Result<String> {
		check_namespace(namespace)?;
		check_name(name)?;

		let mut builder = IndentedStringBuilder::with_unit("\t");
		Self::header(&mut builder, "Auto-generated migration metadata", name, namespace);
		builder
			.append_line(&format!("pub const ID: &str = {};", str_expr(id)))
			.append_line(&format!(
				"pub const CONTEXT: &str = {};",
				str_expr(context_type.full_name())
			))
			.append_line("");
		Self::model_fn(&mut builder, "target_model", target_model);

		Ok(builder.into_string())
	}

	fn generate_snapshot(
		&self,
		namespace: &str,
		context_type: &ContextType,
		snapshot_name: &str,
		model: &DatabaseModel,
	) -> Result<String> {
		check_namespace(namespace)?;
		check_name(snapshot_name)?;

		let mut builder = IndentedStringBuilder::with_unit("\t");
		Self::header(&mut builder, "Auto-generated model snapshot", snapshot_name, namespace);
		builder
			.append_line(&format!(
				"pub const CONTEXT: &str = {};",
				str_expr(context_type.full_name())
			))
			.append_line("");
		Self::model_fn(&mut builder, "model", model);

		Ok(builder.into_string())
	}
}

enum Call {
	Inline(String),
	Nested(Expr),
}

/// A constructor followed by chained method calls.
struct Expr {
	head: String,
	calls: Vec<(&'static str, Call)>,
}

impl Expr {
	fn new(head: String) -> Self {
		Self {
			head,
			calls: Vec::new(),
		}
	}

	fn call(mut self, method: &'static str, args: impl Into<String>) -> Self {
		self.calls.push((method, Call::Inline(args.into())));
		self
	}

	fn call_if(self, condition: bool, method: &'static str, args: impl Into<String>) -> Self {
		if condition { self.call(method, args) } else { self }
	}

	fn call_opt<T>(self, method: &'static str, value: Option<T>, render: impl Fn(T) -> String) -> Self {
		match value {
			Some(value) => {
				let args = render(value);
				self.call(method, args)
			}
			None => self,
		}
	}

	fn nested(mut self, method: &'static str, expr: Expr) -> Self {
		self.calls.push((method, Call::Nested(expr)));
		self
	}

	/// Single-line form, used for nested builders without nested calls.
	fn inline(&self) -> String {
		let mut text = self.head.clone();
		for (method, call) in &self.calls {
			match call {
				Call::Inline(args) => text.push_str(&format!(".{}({})", method, args)),
				Call::Nested(expr) => text.push_str(&format!(".{}({})", method, expr.inline())),
			}
		}
		text
	}

	/// Multi-line form: one chained call per line. The last line is left open.
	fn write(&self, builder: &mut IndentedStringBuilder) {
		builder.append(&self.head);
		let mut calls = builder.indent();
		for (method, call) in &self.calls {
			calls.append_line("");
			match call {
				Call::Inline(args) => {
					calls.append(&format!(".{}({})", method, args));
				}
				Call::Nested(expr) if expr.calls.len() <= 1 => {
					calls.append(&format!(".{}({})", method, expr.inline()));
				}
				Call::Nested(expr) => {
					calls.append_line(&format!(".{}(", method));
					{
						let mut inner = calls.indent();
						expr.write(&mut inner);
						inner.append_line(",");
					}
					calls.append(")");
				}
			}
		}
	}
}

fn str_expr(value: &str) -> String {
	format!("{:?}", value)
}

fn list_expr(values: &[String]) -> String {
	if values.is_empty() {
		return "Vec::<String>::new()".to_string();
	}
	let items: Vec<String> = values.iter().map(|v| str_expr(v)).collect();
	format!("[{}]", items.join(", "))
}

fn value_type_expr(value_type: ValueType) -> String {
	format!("ValueType::{}", value_type.name())
}

fn action_expr(action: ReferentialAction) -> String {
	format!("ReferentialAction::{}", action)
}

fn literal_expr(value: &Literal) -> String {
	match value {
		Literal::Null => "Literal::Null".to_string(),
		Literal::Bool(value) => format!("Literal::Bool({})", value),
		Literal::Integer(value) => format!("Literal::Integer({})", value),
		Literal::Float(value) if value.is_nan() => "Literal::Float(f64::NAN)".to_string(),
		Literal::Float(value) if value.is_infinite() && *value > 0.0 => {
			"Literal::Float(f64::INFINITY)".to_string()
		}
		Literal::Float(value) if value.is_infinite() => {
			"Literal::Float(f64::NEG_INFINITY)".to_string()
		}
		Literal::Float(value) => format!("Literal::Float({:?})", value),
		Literal::String(value) => format!("Literal::from({})", str_expr(value)),
		Literal::Bytes(value) => format!("Literal::Bytes(vec!{:?})", value),
	}
}

fn with_schema(expr: Expr, schema: &Option<String>) -> Expr {
	expr.call_opt("with_schema", schema.as_deref(), str_expr)
}

fn add_column_expr(op: &AddColumnOperation) -> Expr {
	let expr = Expr::new(format!(
		"AddColumnOperation::new({}, {}, {})",
		str_expr(&op.table),
		str_expr(&op.name),
		value_type_expr(op.value_type)
	));
	with_schema(expr, &op.schema)
		.call_opt("with_column_type", op.column_type.as_deref(), str_expr)
		.call_if(op.is_nullable, "nullable", "true")
		.call_opt("with_default", op.default_value.as_ref(), literal_expr)
		.call_opt("with_default_sql", op.default_value_sql.as_deref(), str_expr)
		.call_opt("with_computed_sql", op.computed_column_sql.as_deref(), str_expr)
}

fn add_foreign_key_expr(op: &AddForeignKeyOperation) -> Expr {
	let expr = Expr::new(format!(
		"AddForeignKeyOperation::new({}, {}, {}, {})",
		str_expr(&op.table),
		list_expr(&op.columns),
		str_expr(&op.principal_table),
		list_expr(&op.principal_columns)
	));
	with_schema(expr, &op.schema)
		.call_opt("with_name", op.name.as_deref(), str_expr)
		.call_opt("with_principal_schema", op.principal_schema.as_deref(), str_expr)
		.call_if(op.on_update != ReferentialAction::NoAction, "on_update", action_expr(op.on_update))
		.call_if(op.on_delete != ReferentialAction::NoAction, "on_delete", action_expr(op.on_delete))
}

fn key_operation_expr(
	kind: &str,
	schema: &Option<String>,
	table: &str,
	name: &Option<String>,
	columns: &[String],
) -> Expr {
	let expr = Expr::new(format!(
		"{}::new({}, {})",
		kind,
		str_expr(table),
		list_expr(columns)
	));
	with_schema(expr, schema).call_opt("with_name", name.as_deref(), str_expr)
}

/// `Kind::new(args..)` followed by `with_schema` when a schema is set.
fn simple_expr(kind: &str, args: &[&String], schema: &Option<String>) -> Expr {
	let args: Vec<String> = args.iter().map(|a| str_expr(a)).collect();
	with_schema(Expr::new(format!("{}::new({})", kind, args.join(", "))), schema)
}

fn operation_expr(operation: &Operation) -> Expr {
	match operation {
		Operation::AddColumn(op) => add_column_expr(op),
		Operation::AddForeignKey(op) => add_foreign_key_expr(op),
		Operation::AddPrimaryKey(op) => key_operation_expr(
			"AddPrimaryKeyOperation",
			&op.schema,
			&op.table,
			&op.name,
			&op.columns,
		),
		Operation::AddUniqueConstraint(op) => key_operation_expr(
			"AddUniqueConstraintOperation",
			&op.schema,
			&op.table,
			&op.name,
			&op.columns,
		),
		Operation::AlterColumn(op) => {
			let expr = Expr::new(format!(
				"AlterColumnOperation::new({}, {}, {})",
				str_expr(&op.table),
				str_expr(&op.name),
				value_type_expr(op.value_type)
			));
			with_schema(expr, &op.schema)
				.call_opt("with_column_type", op.column_type.as_deref(), str_expr)
				.call_if(op.is_nullable, "nullable", "true")
				.call_opt("with_default", op.default_value.as_ref(), literal_expr)
				.call_opt("with_default_sql", op.default_value_sql.as_deref(), str_expr)
				.call_opt("with_computed_sql", op.computed_column_sql.as_deref(), str_expr)
				.call_if(op.is_destructive_change, "destructive", "true")
		}
		Operation::AlterSequence(op) => {
			simple_expr("AlterSequenceOperation", &[&op.name], &op.schema)
				.call_if(op.increment_by != 1, "increment_by", op.increment_by.to_string())
				.call_opt("min_value", op.min_value, |v| v.to_string())
				.call_opt("max_value", op.max_value, |v| v.to_string())
				.call_if(op.is_cyclic, "cyclic", "true")
		}
		Operation::CreateIndex(op) => {
			let expr = Expr::new(format!(
				"CreateIndexOperation::new({}, {}, {})",
				str_expr(&op.table),
				str_expr(&op.name),
				list_expr(&op.columns)
			));
			with_schema(expr, &op.schema).call_if(op.is_unique, "unique", "true")
		}
		Operation::CreateSequence(op) => {
			let expr = Expr::new(format!(
				"CreateSequenceOperation::new({}, {})",
				str_expr(&op.name),
				value_type_expr(op.value_type)
			));
			with_schema(expr, &op.schema)
				.call_if(op.start_value != 1, "start_with", op.start_value.to_string())
				.call_if(op.increment_by != 1, "increment_by", op.increment_by.to_string())
				.call_opt("min_value", op.min_value, |v| v.to_string())
				.call_opt("max_value", op.max_value, |v| v.to_string())
				.call_if(op.is_cyclic, "cyclic", "true")
		}
		Operation::CreateTable(op) => {
			let mut expr = simple_expr("CreateTableOperation", &[&op.name], &op.schema);
			for column in &op.columns {
				expr = expr.nested("column", add_column_expr(column));
			}
			if let Some(key) = &op.primary_key {
				expr = expr.nested(
					"primary_key",
					key_operation_expr(
						"AddPrimaryKeyOperation",
						&key.schema,
						&key.table,
						&key.name,
						&key.columns,
					),
				);
			}
			for key in &op.unique_constraints {
				expr = expr.nested(
					"unique_constraint",
					key_operation_expr(
						"AddUniqueConstraintOperation",
						&key.schema,
						&key.table,
						&key.name,
						&key.columns,
					),
				);
			}
			for fk in &op.foreign_keys {
				expr = expr.nested("foreign_key", add_foreign_key_expr(fk));
			}
			expr
		}
		Operation::DropColumn(op) => simple_expr("DropColumnOperation", &[&op.table, &op.name], &op.schema),
		Operation::DropForeignKey(op) => {
			simple_expr("DropForeignKeyOperation", &[&op.table, &op.name], &op.schema)
		}
		Operation::DropIndex(op) => simple_expr("DropIndexOperation", &[&op.table, &op.name], &op.schema),
		Operation::DropPrimaryKey(op) => {
			simple_expr("DropPrimaryKeyOperation", &[&op.table, &op.name], &op.schema)
		}
		Operation::DropSchema(op) => simple_expr("DropSchemaOperation", &[&op.name], &None),
		Operation::DropSequence(op) => simple_expr("DropSequenceOperation", &[&op.name], &op.schema),
		Operation::DropTable(op) => simple_expr("DropTableOperation", &[&op.name], &op.schema),
		Operation::DropUniqueConstraint(op) => {
			simple_expr("DropUniqueConstraintOperation", &[&op.table, &op.name], &op.schema)
		}
		Operation::EnsureSchema(op) => simple_expr("EnsureSchemaOperation", &[&op.name], &None),
		Operation::RenameColumn(op) => simple_expr(
			"RenameColumnOperation",
			&[&op.table, &op.name, &op.new_name],
			&op.schema,
		),
		Operation::RenameIndex(op) => simple_expr(
			"RenameIndexOperation",
			&[&op.table, &op.name, &op.new_name],
			&op.schema,
		),
		Operation::RenameSequence(op) => {
			simple_expr("RenameSequenceOperation", &[&op.name, &op.new_name], &op.schema)
		}
		Operation::RenameTable(op) => {
			simple_expr("RenameTableOperation", &[&op.name, &op.new_name], &op.schema)
		}
		Operation::RestartSequence(op) => with_schema(
			Expr::new(format!(
				"RestartSequenceOperation::new({}, {})",
				str_expr(&op.name),
				op.start_value
			)),
			&op.schema,
		),
		Operation::Sql(op) => Expr::new(format!("SqlOperation::new({})", str_expr(&op.sql)))
			.call_if(op.is_destructive_change, "destructive", "true"),
	}
}

fn column_expr(column: &ColumnModel) -> Expr {
	Expr::new(format!(
		"ColumnModel::new({}, {})",
		str_expr(&column.name),
		value_type_expr(column.value_type)
	))
	.call_opt("with_column_type", column.column_type.as_deref(), str_expr)
	.call_opt("with_max_length", column.max_length, |v| v.to_string())
	.call_if(column.is_nullable, "nullable", "true")
	.call_opt("with_default", column.default_value.as_ref(), literal_expr)
	.call_opt("with_default_sql", column.default_value_sql.as_deref(), str_expr)
	.call_opt("with_computed_sql", column.computed_column_sql.as_deref(), str_expr)
}

fn key_expr(key: &KeyModel) -> Expr {
	Expr::new(format!(
		"KeyModel::new({}, {})",
		str_expr(&key.name),
		list_expr(&key.columns)
	))
}

fn foreign_key_expr(fk: &ForeignKeyModel) -> Expr {
	Expr::new(format!(
		"ForeignKeyModel::new({}, {}, {}, {})",
		str_expr(&fk.name),
		list_expr(&fk.columns),
		str_expr(&fk.principal_table),
		list_expr(&fk.principal_columns)
	))
	.call_opt("with_principal_schema", fk.principal_schema.as_deref(), str_expr)
	.call_if(fk.on_update != ReferentialAction::NoAction, "on_update", action_expr(fk.on_update))
	.call_if(fk.on_delete != ReferentialAction::NoAction, "on_delete", action_expr(fk.on_delete))
}

fn index_expr(index: &IndexModel) -> Expr {
	Expr::new(format!(
		"IndexModel::new({}, {})",
		str_expr(&index.name),
		list_expr(&index.columns)
	))
	.call_if(index.is_unique, "unique", "true")
}

fn table_expr(table: &TableModel) -> Expr {
	let mut expr = with_schema(
		Expr::new(format!("TableModel::new({})", str_expr(&table.name))),
		&table.schema,
	);
	for column in &table.columns {
		expr = expr.nested("column", column_expr(column));
	}
	if let Some(key) = &table.primary_key {
		expr = expr.nested("primary_key", key_expr(key));
	}
	for key in &table.unique_constraints {
		expr = expr.nested("unique_constraint", key_expr(key));
	}
	for fk in &table.foreign_keys {
		expr = expr.nested("foreign_key", foreign_key_expr(fk));
	}
	for index in &table.indexes {
		expr = expr.nested("index", index_expr(index));
	}
	expr
}

fn sequence_expr(sequence: &SequenceModel) -> Expr {
	with_schema(
		Expr::new(format!(
			"SequenceModel::new({}, {})",
			str_expr(&sequence.name),
			value_type_expr(sequence.value_type)
		)),
		&sequence.schema,
	)
	.call_if(sequence.start_value != 1, "start_with", sequence.start_value.to_string())
	.call_if(sequence.increment_by != 1, "increment_by", sequence.increment_by.to_string())
	.call_opt("min_value", sequence.min_value, |v| v.to_string())
	.call_opt("max_value", sequence.max_value, |v| v.to_string())
	.call_if(sequence.is_cyclic, "cyclic", "true")
}

fn model_expr(model: &DatabaseModel) -> Expr {
	let mut expr = Expr::new("DatabaseModel::new()".to_string());
	for table in model.tables.values() {
		expr = expr.nested("with_table", table_expr(table));
	}
	for sequence in model.sequences.values() {
		expr = expr.nested("with_sequence", sequence_expr(sequence));
	}
	expr
}
