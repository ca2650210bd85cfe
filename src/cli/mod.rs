use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::dialect::postgres::PostgresDialect;
use crate::migrate::{initial_sql, migrate, preview};
use crate::model::Model;
use crate::pg::connection::PgConnection;

#[derive(Serialize)]
struct PlanOutput {
    version: i32,
    statements: Vec<String>,
    statement_count: usize,
}

#[derive(Parser)]
#[command(name = "remold")]
#[command(version)]
#[command(about = "Declarative relational schema migrations", long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SQL the next migration would execute
    Plan {
        /// Schema configuration file
        #[arg(long)]
        config: PathBuf,
        /// Database URL; when omitted the plan starts from an empty database
        #[arg(long, env = "DATABASE_URL")]
        database: Option<String>,
        /// Output the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply the configuration to the database
    Apply {
        /// Schema configuration file
        #[arg(long)]
        config: PathBuf,
        #[arg(long, env = "DATABASE_URL")]
        database: String,
    },

    /// Parse and validate the configuration
    Validate {
        /// Schema configuration file
        #[arg(long)]
        config: PathBuf,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Plan {
            config,
            database,
            json,
        } => {
            let model = load_model(&config)?;
            let dialect = PostgresDialect;

            let (version, statements) = match database {
                Some(url) => {
                    let connection = PgConnection::new(&url).await?;
                    let report = preview(&dialect, &connection, &model).await?;
                    (report.version, report.statements)
                }
                None => (1, initial_sql(&dialect, &model)),
            };

            if json {
                let output = PlanOutput {
                    version,
                    statement_count: statements.len(),
                    statements,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for statement in &statements {
                    println!("{statement}");
                }
            }
        }

        Commands::Apply { config, database } => {
            let model = load_model(&config)?;
            let connection = PgConnection::new(&database).await?;
            let report = migrate(&PostgresDialect, &connection, &model).await?;
            println!(
                "applied version {} ({} statements)",
                report.version,
                report.statements.len()
            );
        }

        Commands::Validate { config } => {
            let model = load_model(&config)?;
            println!(
                "configuration OK: {} tables, {} enums",
                model.tables.len(),
                model.enums.len()
            );
        }
    }

    Ok(())
}

fn load_model(path: &Path) -> Result<Model> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let model = Model::from_document(&input)
        .with_context(|| format!("failed to build schema model from {}", path.display()))?;
    Ok(model)
}
