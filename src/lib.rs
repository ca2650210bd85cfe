//! remold - declarative relational schema migrations.
//!
//! Describe a schema as a document of tables, typed columns, and enums; remold
//! evolves a live database to match it. The last applied description is stored
//! in the target database itself, so each run diffs the stored description
//! against the current one and applies the delta in a single transaction.
//!
//! # Quick Start
//!
//! ```no_run
//! use remold::dialect::postgres::PostgresDialect;
//! use remold::migrate::initial_sql;
//! use remold::model::Model;
//!
//! let model = Model::from_document(
//!     "accounts:\n  id: serial primary\n  name: varchar(50) notnull\n",
//! )
//! .unwrap();
//!
//! for statement in initial_sql(&PostgresDialect, &model) {
//!     println!("{statement}");
//! }
//! ```
//!
//! # Modules
//!
//! - [`model`] - the normalized schema snapshot (tables, columns, enums)
//! - [`parser`] - schema document parsing and the column attribute grammar
//! - [`diff`] - model comparison and migration operation planning
//! - [`dialect`] - DDL emitters; [`dialect::postgres`] is the reference
//! - [`migrate`] - the transactional migration runner

pub mod cli;
pub mod dialect;
pub mod diff;
pub mod migrate;
pub mod model;
pub mod parser;
pub mod pg;
pub mod util;
