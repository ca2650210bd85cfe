pub mod postgres;

use tracing::warn;

use crate::diff::{CheckChange, ColumnChanges, ColumnSpec, MigrationOp};

/// Maps structured schema operations to DBMS-specific DDL text. Every method
/// returns complete statements; operations that expand to several statements
/// return them in execution order.
pub trait Dialect {
    /// Renders a resolved type name with its optional size.
    fn type_name(&self, name: &str, size: u32) -> String;

    fn create_version_table(&self) -> String;
    fn check_version(&self) -> String;
    fn insert_version(&self) -> String;

    fn add_table(&self, name: &str, if_not_exists: bool) -> String;
    fn drop_table(&self, name: &str) -> String;

    fn add_column(&self, table: &str, column: &str, type_name: &str, size: u32) -> String;
    fn update_column(&self, table: &str, column: &str, type_name: &str, size: u32) -> String;
    fn drop_column(&self, table: &str, column: &str) -> String;

    fn add_primary_key(&self, table: &str, columns: &[String]) -> String;
    fn update_primary_key(&self, table: &str, columns: &[String]) -> Vec<String>;
    fn drop_primary_key(&self, table: &str) -> String;

    fn add_foreign_key(
        &self,
        table: &str,
        column: &str,
        ref_table: &str,
        ref_column: &str,
    ) -> String;
    fn update_foreign_key(
        &self,
        table: &str,
        column: &str,
        ref_table: &str,
        ref_column: &str,
    ) -> Vec<String>;
    fn drop_foreign_key(&self, table: &str, column: &str) -> String;

    fn add_unique(&self, id: &str, table: &str, columns: &[String]) -> String;
    fn update_unique(&self, id: &str, table: &str, columns: &[String]) -> Vec<String>;
    fn drop_unique(&self, id: &str, table: &str) -> String;

    fn set_not_null(&self, table: &str, column: &str) -> String;
    fn drop_not_null(&self, table: &str, column: &str) -> String;

    fn add_check(&self, table: &str, column: &str, expression: &str) -> String;
    fn update_check(&self, table: &str, column: &str, expression: &str) -> Vec<String>;
    fn drop_check(&self, table: &str, column: &str) -> String;

    fn add_enum(&self, name: &str, values: &[String]) -> String;
    fn append_enum_value(&self, name: &str, value: &str) -> String;
    fn drop_enum(&self, name: &str) -> String;
    /// Removing a single enum value is not expressible in every DBMS; a
    /// dialect without the capability returns `None` and the statement is
    /// skipped.
    fn drop_enum_value(&self, name: &str, value: &str) -> Option<String> {
        let _ = (name, value);
        None
    }

    fn set_default(&self, table: &str, column: &str, expression: &str) -> String;
    fn drop_default(&self, table: &str, column: &str) -> String;

    fn set_auto_increment(&self, table: &str, column: &str) -> Vec<String>;
    fn unset_auto_increment(&self, table: &str, column: &str) -> Vec<String>;
}

/// Renders an ordered operation list to SQL statements.
pub fn generate_sql(dialect: &dyn Dialect, ops: &[MigrationOp]) -> Vec<String> {
    ops.iter().flat_map(|op| op_sql(dialect, op)).collect()
}

fn op_sql(dialect: &dyn Dialect, op: &MigrationOp) -> Vec<String> {
    match op {
        MigrationOp::CreateEnum(enum_type) => {
            vec![dialect.add_enum(&enum_type.name, &enum_type.values)]
        }

        MigrationOp::AppendEnumValue { enum_name, value } => {
            vec![dialect.append_enum_value(enum_name, value)]
        }

        MigrationOp::DropEnumValue { enum_name, value } => {
            match dialect.drop_enum_value(enum_name, value) {
                Some(sql) => vec![sql],
                None => {
                    warn!(
                        enum_name = %enum_name,
                        value = %value,
                        "dialect cannot drop a single enum value, skipping"
                    );
                    Vec::new()
                }
            }
        }

        MigrationOp::DropEnum(name) => vec![dialect.drop_enum(name)],

        MigrationOp::CreateTable { name, columns } => {
            let mut statements = vec![dialect.add_table(name, false)];
            for column in columns {
                statements.extend(column_sql(dialect, name, column));
            }
            statements
        }

        MigrationOp::DropTable(name) => vec![dialect.drop_table(name)],

        MigrationOp::AddColumn { table, column } => column_sql(dialect, table, column),

        MigrationOp::AlterColumn {
            table,
            column,
            changes,
        } => column_changes_sql(dialect, table, column, changes),

        MigrationOp::DropColumn { table, column } => vec![dialect.drop_column(table, column)],

        MigrationOp::AddPrimaryKey { table, columns } => {
            vec![dialect.add_primary_key(table, columns)]
        }
        MigrationOp::UpdatePrimaryKey { table, columns } => {
            dialect.update_primary_key(table, columns)
        }
        MigrationOp::DropPrimaryKey { table } => vec![dialect.drop_primary_key(table)],

        MigrationOp::AddUnique { id, table, columns } => {
            vec![dialect.add_unique(id, table, columns)]
        }
        MigrationOp::UpdateUnique { id, table, columns } => {
            dialect.update_unique(id, table, columns)
        }
        MigrationOp::DropUnique { id, table } => vec![dialect.drop_unique(id, table)],

        MigrationOp::AddForeignKey {
            table,
            column,
            ref_table,
            ref_column,
        } => vec![dialect.add_foreign_key(table, column, ref_table, ref_column)],
        MigrationOp::UpdateForeignKey {
            table,
            column,
            ref_table,
            ref_column,
        } => dialect.update_foreign_key(table, column, ref_table, ref_column),
        MigrationOp::DropForeignKey { table, column } => {
            vec![dialect.drop_foreign_key(table, column)]
        }
    }
}

/// A new column and its attribute statements, in the order the attributes are
/// declared: the column itself, auto-increment, not-null, default, check.
fn column_sql(dialect: &dyn Dialect, table: &str, column: &ColumnSpec) -> Vec<String> {
    let mut statements = vec![dialect.add_column(
        table,
        &column.name,
        &column.type_name,
        column.size,
    )];

    if column.auto_increment {
        statements.extend(dialect.set_auto_increment(table, &column.name));
    }
    if column.not_null {
        statements.push(dialect.set_not_null(table, &column.name));
    }
    if let Some(default) = &column.default {
        statements.push(dialect.set_default(table, &column.name, default));
    }
    if let Some(check) = &column.check {
        statements.push(dialect.add_check(table, &column.name, check));
    }

    statements
}

fn column_changes_sql(
    dialect: &dyn Dialect,
    table: &str,
    column: &str,
    changes: &ColumnChanges,
) -> Vec<String> {
    let mut statements = Vec::new();

    if let Some((type_name, size)) = &changes.data_type {
        statements.push(dialect.update_column(table, column, type_name, *size));
    }

    match changes.auto_increment {
        Some(true) => statements.extend(dialect.set_auto_increment(table, column)),
        Some(false) => statements.extend(dialect.unset_auto_increment(table, column)),
        None => {}
    }

    match changes.not_null {
        Some(true) => statements.push(dialect.set_not_null(table, column)),
        Some(false) => statements.push(dialect.drop_not_null(table, column)),
        None => {}
    }

    match &changes.default {
        Some(Some(expression)) => statements.push(dialect.set_default(table, column, expression)),
        Some(None) => statements.push(dialect.drop_default(table, column)),
        None => {}
    }

    match &changes.check {
        Some(CheckChange::Add(expression)) => {
            statements.push(dialect.add_check(table, column, expression));
        }
        Some(CheckChange::Update(expression)) => {
            statements.extend(dialect.update_check(table, column, expression));
        }
        Some(CheckChange::Drop) => statements.push(dialect.drop_check(table, column)),
        None => {}
    }

    statements
}
