use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("malformed schema document: {0}")]
    ConfigParse(String),

    #[error("entry '{key}' is neither a table nor an enum (found {observed})")]
    ConfigShape { key: String, observed: String },

    #[error("no column type found in table {table} column {column}")]
    TypeMissing { table: String, column: String },

    #[error("unrecognized datatype in table {table} column {column}: {raw_type}")]
    TypeUnknown {
        table: String,
        column: String,
        raw_type: String,
    },

    #[error("database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
