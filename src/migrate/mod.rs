use sqlx::Executor;
use tracing::{debug, info};

use crate::dialect::{generate_sql, Dialect};
use crate::diff::planner::plan_migration;
use crate::diff::{compute_diff, initial_ops};
use crate::model::Model;
use crate::pg::connection::PgConnection;
use crate::util::{Result, SchemaError};

/// The SQL that realizes a model on an empty database.
pub fn initial_sql(dialect: &dyn Dialect, model: &Model) -> Vec<String> {
    generate_sql(dialect, &plan_migration(initial_ops(model)))
}

/// The SQL that migrates `prev` into `curr`.
pub fn upgrade_sql(dialect: &dyn Dialect, prev: &Model, curr: &Model) -> Vec<String> {
    generate_sql(dialect, &plan_migration(compute_diff(prev, curr)))
}

#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// The version the database is at after this run.
    pub version: i32,
    pub statements: Vec<String>,
}

/// Applies the model to the database in one transaction: ensures the versions
/// table, reads the previously applied configuration, computes the delta,
/// records the new version, and executes the statements. Any failure rolls
/// the whole transaction back.
pub async fn migrate(
    dialect: &dyn Dialect,
    connection: &PgConnection,
    model: &Model,
) -> Result<MigrationReport> {
    let mut tx = connection
        .pool()
        .begin()
        .await
        .map_err(|e| SchemaError::Database(e.to_string()))?;

    tx.execute(dialect.create_version_table().as_str())
        .await
        .map_err(|e| SchemaError::Database(e.to_string()))?;

    let (version, statements) = pending_statements(dialect, &mut tx, model).await?;

    sqlx::query(&dialect.insert_version())
        .bind(version + 1)
        .bind(&model.raw_config)
        .execute(&mut *tx)
        .await
        .map_err(|e| SchemaError::Database(e.to_string()))?;

    info!(
        version = version + 1,
        statements = statements.len(),
        "applying migration"
    );

    for statement in &statements {
        debug!(sql = %statement, "executing");
        tx.execute(statement.as_str())
            .await
            .map_err(|e| SchemaError::Database(e.to_string()))?;
    }

    tx.commit()
        .await
        .map_err(|e| SchemaError::Database(e.to_string()))?;

    Ok(MigrationReport {
        version: version + 1,
        statements,
    })
}

/// Computes what `migrate` would run, without changing anything. The version
/// table is ensured inside a transaction that is rolled back, so a pristine
/// database stays pristine.
pub async fn preview(
    dialect: &dyn Dialect,
    connection: &PgConnection,
    model: &Model,
) -> Result<MigrationReport> {
    let mut tx = connection
        .pool()
        .begin()
        .await
        .map_err(|e| SchemaError::Database(e.to_string()))?;

    tx.execute(dialect.create_version_table().as_str())
        .await
        .map_err(|e| SchemaError::Database(e.to_string()))?;

    let (version, statements) = pending_statements(dialect, &mut tx, model).await?;

    tx.rollback()
        .await
        .map_err(|e| SchemaError::Database(e.to_string()))?;

    Ok(MigrationReport {
        version: version + 1,
        statements,
    })
}

/// Reads the latest stored configuration and computes the statements that
/// bring the database up to `model`. Version 0 means nothing was ever
/// applied.
async fn pending_statements(
    dialect: &dyn Dialect,
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    model: &Model,
) -> Result<(i32, Vec<String>)> {
    let stored: Option<(i32, String)> = sqlx::query_as(&dialect.check_version())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| SchemaError::Database(e.to_string()))?;

    match stored {
        None => Ok((0, initial_sql(dialect, model))),
        Some((version, config)) => {
            let prev = Model::from_document(&config)?;
            Ok((version, upgrade_sql(dialect, &prev, model)))
        }
    }
}
