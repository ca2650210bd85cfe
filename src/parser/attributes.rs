use std::sync::LazyLock;

use regex::Regex;

use crate::util::{Result, SchemaError};

// [0] varchar(100)  [1] varchar  [2] (100)  [3] 100
static TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w\-\.]+)(\(([\d]{1,3})\))?").unwrap());

// [0] default(NOW())  [1] NOW()
static DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"default\(([\w\(\)'"]+)\)"#).unwrap());

// [0] check(x>y)  [1] x>y
static CHECK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"check\(([\w\(\)\-'"=><!%/+]+)\)"#).unwrap());

static NOT_NULL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"notnull|not null").unwrap());

// [0] primary(id_name)  [1] (id_name)  [2] id_name
static PRIMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"primary key|primarykey|primary(\((\w+)\))?").unwrap());

// [0] unique(id_name)  [1] (id_name)  [2] id_name
static UNIQUE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"unique(\((\w+)\))?").unwrap());

static AUTO_INCREMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^serial|auto ?increment").unwrap());

/// Everything a column attribute string can express, extracted but not yet
/// resolved against the model's type index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAttrs {
    pub raw_type: String,
    pub size: u32,
    pub default: Option<String>,
    pub check: Option<String>,
    pub not_null: bool,
    /// Primary-key group id. Defaults to the table name when the attribute
    /// carries no explicit `primary(<id>)` group.
    pub primary: Option<String>,
    /// Unique group id. Defaults to the column name.
    pub unique: Option<String>,
    pub auto_increment: bool,
}

/// Extracts column attributes from an attribute string such as
/// `"varchar(50) notnull unique"`.
pub fn parse(table: &str, column: &str, raw: &str) -> Result<ColumnAttrs> {
    let (raw_type, size) = match TYPE_RE.captures(raw) {
        Some(caps) => {
            let raw_type = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            // A size that fails to parse is treated as unspecified.
            let size = caps
                .get(3)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(0);
            (raw_type, size)
        }
        None => (String::new(), 0),
    };

    if raw_type.is_empty() {
        return Err(SchemaError::TypeMissing {
            table: table.to_string(),
            column: column.to_string(),
        });
    }

    Ok(ColumnAttrs {
        raw_type,
        size,
        default: first_capture(&DEFAULT_RE, raw),
        check: first_capture(&CHECK_RE, raw),
        not_null: NOT_NULL_RE.is_match(raw),
        primary: group_id(&PRIMARY_RE, raw, table),
        unique: group_id(&UNIQUE_RE, raw, column),
        auto_increment: AUTO_INCREMENT_RE.is_match(raw),
    })
}

fn first_capture(re: &Regex, raw: &str) -> Option<String> {
    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Returns the explicit `(<id>)` group when captured, the fallback name when
/// the keyword matched bare, and `None` when the keyword is absent.
fn group_id(re: &Regex, raw: &str, fallback: &str) -> Option<String> {
    let caps = re.captures(raw)?;
    match caps.get(2) {
        Some(id) => Some(id.as_str().to_string()),
        None => Some(fallback.to_string()),
    }
}
