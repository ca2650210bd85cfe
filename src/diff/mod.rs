pub mod planner;

use crate::model::{Column, ColumnId, EnumType, Model};

/// A column rendered down to what the emitters need: the resolved type name
/// instead of the model's datatype variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub type_name: String,
    pub size: u32,
    pub not_null: bool,
    pub default: Option<String>,
    pub check: Option<String>,
    pub auto_increment: bool,
}

impl ColumnSpec {
    pub fn from_column(model: &Model, column: &Column) -> Self {
        ColumnSpec {
            name: column.name.clone(),
            type_name: model.type_name(&column.datatype),
            size: column.size,
            not_null: column.not_null,
            default: column.default.clone(),
            check: column.check.clone(),
            auto_increment: column.auto_increment,
        }
    }
}

/// A check-constraint transition. Additions and removals need different DDL
/// from a replacement, so the distinction is made here rather than at render
/// time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckChange {
    Add(String),
    Update(String),
    Drop,
}

/// Facet-level changes to an existing column. `None` means unchanged;
/// `default: Some(None)` means the default was removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnChanges {
    pub data_type: Option<(String, u32)>,
    pub auto_increment: Option<bool>,
    pub not_null: Option<bool>,
    pub default: Option<Option<String>>,
    pub check: Option<CheckChange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOp {
    CreateEnum(EnumType),
    AppendEnumValue {
        enum_name: String,
        value: String,
    },
    DropEnumValue {
        enum_name: String,
        value: String,
    },
    DropEnum(String),
    CreateTable {
        name: String,
        columns: Vec<ColumnSpec>,
    },
    DropTable(String),
    AddColumn {
        table: String,
        column: ColumnSpec,
    },
    AlterColumn {
        table: String,
        column: String,
        changes: ColumnChanges,
    },
    DropColumn {
        table: String,
        column: String,
    },
    AddPrimaryKey {
        table: String,
        columns: Vec<String>,
    },
    UpdatePrimaryKey {
        table: String,
        columns: Vec<String>,
    },
    DropPrimaryKey {
        table: String,
    },
    AddUnique {
        id: String,
        table: String,
        columns: Vec<String>,
    },
    UpdateUnique {
        id: String,
        table: String,
        columns: Vec<String>,
    },
    DropUnique {
        id: String,
        table: String,
    },
    AddForeignKey {
        table: String,
        column: String,
        ref_table: String,
        ref_column: String,
    },
    UpdateForeignKey {
        table: String,
        column: String,
        ref_table: String,
        ref_column: String,
    },
    DropForeignKey {
        table: String,
        column: String,
    },
}

/// The operations that realize a model on an empty database.
pub fn initial_ops(model: &Model) -> Vec<MigrationOp> {
    let mut ops = Vec::new();

    for enum_type in model.enums.values() {
        ops.push(MigrationOp::CreateEnum(enum_type.clone()));
    }

    for (name, columns) in &model.tables {
        ops.push(MigrationOp::CreateTable {
            name: name.clone(),
            columns: columns
                .values()
                .map(|c| ColumnSpec::from_column(model, c))
                .collect(),
        });
    }

    for members in model.primaries.values() {
        ops.push(MigrationOp::AddPrimaryKey {
            table: members[0].table.clone(),
            columns: member_names(members),
        });
    }

    for (id, members) in &model.uniques {
        ops.push(MigrationOp::AddUnique {
            id: id.clone(),
            table: members[0].table.clone(),
            columns: member_names(members),
        });
    }

    for key in model.foreigns.keys() {
        if let Some((column, target)) = foreign_target(model, key) {
            ops.push(MigrationOp::AddForeignKey {
                table: column.table.clone(),
                column: column.name.clone(),
                ref_table: target.table.clone(),
                ref_column: target.name.clone(),
            });
        }
    }

    ops
}

/// The operations that migrate `prev` into `curr`. Matching is done by key;
/// anything in `prev` with no counterpart sweeps into drops at the end of
/// each section. The result is unordered — `planner::plan_migration` imposes
/// the execution order.
pub fn compute_diff(prev: &Model, curr: &Model) -> Vec<MigrationOp> {
    let mut ops = Vec::new();

    ops.extend(diff_enums(prev, curr));
    ops.extend(diff_tables(prev, curr));
    ops.extend(diff_primaries(prev, curr));
    ops.extend(diff_uniques(prev, curr));
    ops.extend(diff_foreign_keys(prev, curr));

    ops
}

fn diff_enums(prev: &Model, curr: &Model) -> Vec<MigrationOp> {
    let mut ops = Vec::new();

    for (name, enum_type) in &curr.enums {
        match prev.enums.get(name) {
            None => ops.push(MigrationOp::CreateEnum(enum_type.clone())),
            Some(old) => {
                for value in &enum_type.values {
                    if !old.values.contains(value) {
                        ops.push(MigrationOp::AppendEnumValue {
                            enum_name: name.clone(),
                            value: value.clone(),
                        });
                    }
                }
                for value in &old.values {
                    if !enum_type.values.contains(value) {
                        ops.push(MigrationOp::DropEnumValue {
                            enum_name: name.clone(),
                            value: value.clone(),
                        });
                    }
                }
            }
        }
    }

    for name in prev.enums.keys() {
        if !curr.enums.contains_key(name) {
            ops.push(MigrationOp::DropEnum(name.clone()));
        }
    }

    ops
}

fn diff_tables(prev: &Model, curr: &Model) -> Vec<MigrationOp> {
    let mut ops = Vec::new();

    for (name, columns) in &curr.tables {
        match prev.tables.get(name) {
            None => ops.push(MigrationOp::CreateTable {
                name: name.clone(),
                columns: columns
                    .values()
                    .map(|c| ColumnSpec::from_column(curr, c))
                    .collect(),
            }),
            Some(old_columns) => {
                for (cname, column) in columns {
                    match old_columns.get(cname) {
                        None => ops.push(MigrationOp::AddColumn {
                            table: name.clone(),
                            column: ColumnSpec::from_column(curr, column),
                        }),
                        Some(old) if old.raw == column.raw => {}
                        Some(old) => {
                            let changes = column_changes(curr, column, old);
                            if changes != ColumnChanges::default() {
                                ops.push(MigrationOp::AlterColumn {
                                    table: name.clone(),
                                    column: cname.clone(),
                                    changes,
                                });
                            }
                        }
                    }
                }

                // A table emptied of every column drops as a whole, the same
                // as a table that disappeared.
                if columns.is_empty() && !old_columns.is_empty() {
                    ops.push(MigrationOp::DropTable(name.clone()));
                } else {
                    for cname in old_columns.keys() {
                        if !columns.contains_key(cname) {
                            ops.push(MigrationOp::DropColumn {
                                table: name.clone(),
                                column: cname.clone(),
                            });
                        }
                    }
                }
            }
        }
    }

    // A table that disappeared entirely drops as one statement; its columns
    // go with it.
    for name in prev.tables.keys() {
        if !curr.tables.contains_key(name) {
            ops.push(MigrationOp::DropTable(name.clone()));
        }
    }

    ops
}

fn column_changes(curr: &Model, new: &Column, old: &Column) -> ColumnChanges {
    let mut changes = ColumnChanges::default();

    if new.raw_type != old.raw_type || new.size != old.size {
        changes.data_type = Some((curr.type_name(&new.datatype), new.size));
    }
    if new.auto_increment != old.auto_increment {
        changes.auto_increment = Some(new.auto_increment);
    }
    if new.not_null != old.not_null {
        changes.not_null = Some(new.not_null);
    }
    if new.default != old.default {
        changes.default = Some(new.default.clone());
    }
    changes.check = match (&old.check, &new.check) {
        (None, Some(expr)) => Some(CheckChange::Add(expr.clone())),
        (Some(_), None) => Some(CheckChange::Drop),
        (Some(old_expr), Some(expr)) if old_expr != expr => {
            Some(CheckChange::Update(expr.clone()))
        }
        _ => None,
    };

    changes
}

fn diff_primaries(prev: &Model, curr: &Model) -> Vec<MigrationOp> {
    let mut ops = Vec::new();

    for (id, members) in &curr.primaries {
        let table = members[0].table.clone();
        let columns = member_names(members);

        match prev.primaries.get(id) {
            None => ops.push(MigrationOp::AddPrimaryKey { table, columns }),
            Some(old_members) if member_names(old_members) != columns => {
                ops.push(MigrationOp::UpdatePrimaryKey { table, columns });
            }
            Some(_) => {}
        }
    }

    for (id, members) in &prev.primaries {
        if !curr.primaries.contains_key(id) {
            ops.push(MigrationOp::DropPrimaryKey {
                table: members[0].table.clone(),
            });
        }
    }

    ops
}

fn diff_uniques(prev: &Model, curr: &Model) -> Vec<MigrationOp> {
    let mut ops = Vec::new();

    for (id, members) in &curr.uniques {
        let table = members[0].table.clone();
        let columns = member_names(members);

        match prev.uniques.get(id) {
            None => ops.push(MigrationOp::AddUnique {
                id: id.clone(),
                table,
                columns,
            }),
            Some(old_members) if member_names(old_members) != columns => {
                ops.push(MigrationOp::UpdateUnique {
                    id: id.clone(),
                    table,
                    columns,
                });
            }
            Some(_) => {}
        }
    }

    for (id, members) in &prev.uniques {
        if !curr.uniques.contains_key(id) {
            ops.push(MigrationOp::DropUnique {
                id: id.clone(),
                table: members[0].table.clone(),
            });
        }
    }

    ops
}

fn diff_foreign_keys(prev: &Model, curr: &Model) -> Vec<MigrationOp> {
    let mut ops = Vec::new();

    for key in curr.foreigns.keys() {
        let Some((column, target)) = foreign_target(curr, key) else {
            continue;
        };

        match prev.foreigns.get(key) {
            None => ops.push(MigrationOp::AddForeignKey {
                table: column.table.clone(),
                column: column.name.clone(),
                ref_table: target.table.clone(),
                ref_column: target.name.clone(),
            }),
            Some(_) => {
                // Same referencing column on both sides; emit only when the
                // referent moved.
                let old_target = foreign_target(prev, key).map(|(_, t)| t);
                if old_target != Some(target) {
                    ops.push(MigrationOp::UpdateForeignKey {
                        table: column.table.clone(),
                        column: column.name.clone(),
                        ref_table: target.table.clone(),
                        ref_column: target.name.clone(),
                    });
                }
            }
        }
    }

    for (key, id) in &prev.foreigns {
        if !curr.foreigns.contains_key(key) {
            ops.push(MigrationOp::DropForeignKey {
                table: id.table.clone(),
                column: id.name.clone(),
            });
        }
    }

    ops
}

fn member_names(members: &[ColumnId]) -> Vec<String> {
    members.iter().map(|c| c.name.clone()).collect()
}

fn foreign_target<'a>(model: &'a Model, key: &str) -> Option<(&'a Column, &'a ColumnId)> {
    let id = model.foreigns.get(key)?;
    let column = model.column(id)?;
    let target = model.reference(column)?;
    Some((column, target))
}
