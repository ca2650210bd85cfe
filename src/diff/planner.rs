use super::MigrationOp;

/// Orders migration operations so that every statement is valid at the moment
/// it executes: enums exist before the tables that use them, columns before
/// the constraints that span them, and drops run in reverse dependency order
/// after all creates.
pub fn plan_migration(ops: Vec<MigrationOp>) -> Vec<MigrationOp> {
    let mut create_enums = Vec::new();
    let mut append_enum_values = Vec::new();
    let mut create_tables = Vec::new();
    let mut add_columns = Vec::new();
    let mut alter_columns = Vec::new();
    let mut primary_keys = Vec::new();
    let mut uniques = Vec::new();
    let mut foreign_keys = Vec::new();

    let mut drop_foreign_keys = Vec::new();
    let mut drop_uniques = Vec::new();
    let mut drop_primary_keys = Vec::new();
    let mut drop_columns = Vec::new();
    let mut drop_tables = Vec::new();
    let mut drop_enum_values = Vec::new();
    let mut drop_enums = Vec::new();

    for op in ops {
        match op {
            MigrationOp::CreateEnum(_) => create_enums.push(op),
            MigrationOp::AppendEnumValue { .. } => append_enum_values.push(op),
            MigrationOp::CreateTable { .. } => create_tables.push(op),
            MigrationOp::AddColumn { .. } => add_columns.push(op),
            MigrationOp::AlterColumn { .. } => alter_columns.push(op),
            MigrationOp::AddPrimaryKey { .. } | MigrationOp::UpdatePrimaryKey { .. } => {
                primary_keys.push(op)
            }
            MigrationOp::AddUnique { .. } | MigrationOp::UpdateUnique { .. } => uniques.push(op),
            MigrationOp::AddForeignKey { .. } | MigrationOp::UpdateForeignKey { .. } => {
                foreign_keys.push(op)
            }
            MigrationOp::DropForeignKey { .. } => drop_foreign_keys.push(op),
            MigrationOp::DropUnique { .. } => drop_uniques.push(op),
            MigrationOp::DropPrimaryKey { .. } => drop_primary_keys.push(op),
            MigrationOp::DropColumn { .. } => drop_columns.push(op),
            MigrationOp::DropTable(_) => drop_tables.push(op),
            MigrationOp::DropEnumValue { .. } => drop_enum_values.push(op),
            MigrationOp::DropEnum(_) => drop_enums.push(op),
        }
    }

    let mut result = Vec::new();

    result.extend(create_enums);
    result.extend(append_enum_values);
    result.extend(create_tables);
    result.extend(add_columns);
    result.extend(alter_columns);
    result.extend(primary_keys);
    result.extend(uniques);
    result.extend(foreign_keys);

    result.extend(drop_foreign_keys);
    result.extend(drop_uniques);
    result.extend(drop_primary_keys);
    result.extend(drop_columns);
    result.extend(drop_tables);
    result.extend(drop_enum_values);
    result.extend(drop_enums);

    result
}
