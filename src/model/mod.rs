mod build;

use std::collections::{BTreeMap, HashSet};

/// Identifies a column by its table and name. The model stores these keys
/// instead of references so that foreign-key links can point at columns
/// declared in any order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ColumnId {
    pub table: String,
    pub name: String,
}

impl ColumnId {
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        ColumnId {
            table: table.into(),
            name: name.into(),
        }
    }

    /// The `table.column` key used in the alias and foreign-key indexes.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}

/// What a column's declared type resolved to: a primitive, a user enum, or
/// another column (which makes the declaring column a foreign key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datatype {
    Primitive(String),
    Enum(String),
    Column(ColumnId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub table: String,
    pub name: String,
    pub datatype: Datatype,
    /// 0 means unspecified.
    pub size: u32,
    pub default: Option<String>,
    pub not_null: bool,
    pub check: Option<String>,
    /// Primary-key group id this column belongs to, if any.
    pub primary: Option<String>,
    /// Unique group id this column belongs to, if any.
    pub unique: Option<String>,
    pub auto_increment: bool,
    /// The type token as written, e.g. `"varchar"` or `"accounts.id"`.
    pub raw_type: String,
    /// The full attribute string as written. Drives the fast equality path
    /// when diffing two models.
    pub raw: String,
}

impl Column {
    pub fn id(&self) -> ColumnId {
        ColumnId::new(self.table.clone(), self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<String>,
}

/// One normalized schema snapshot, built from a configuration document and
/// immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    /// table name → column name → column.
    pub tables: BTreeMap<String, BTreeMap<String, Column>>,
    pub enums: BTreeMap<String, EnumType>,
    /// primary-key group id → ordered member columns.
    pub primaries: BTreeMap<String, Vec<ColumnId>>,
    /// unique group id → ordered member columns.
    pub uniques: BTreeMap<String, Vec<ColumnId>>,
    /// qualified name of every column whose type resolved to another column.
    pub foreigns: BTreeMap<String, ColumnId>,
    /// type-alias index: primitive aliases, then user enums, then every
    /// `table.column`.
    pub(crate) aliases: BTreeMap<String, Datatype>,
    /// Verbatim document bytes, persisted with the migration.
    pub raw_config: String,
}

impl Model {
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.tables.get(&id.table)?.get(&id.name)
    }

    /// The column another column's type resolved to, when it is a foreign key.
    pub fn reference<'a>(&self, column: &'a Column) -> Option<&'a ColumnId> {
        match &column.datatype {
            Datatype::Column(id) => Some(id),
            _ => None,
        }
    }

    /// The emitted type name for a datatype. Column references resolve
    /// transitively to their referent's type; a reference cycle falls back to
    /// the last qualified name seen.
    pub fn type_name(&self, datatype: &Datatype) -> String {
        let mut current = datatype;
        let mut seen = HashSet::new();
        loop {
            match current {
                Datatype::Primitive(name) | Datatype::Enum(name) => return name.clone(),
                Datatype::Column(id) => {
                    match self.column(id) {
                        Some(col) if seen.insert(id.qualified()) => current = &col.datatype,
                        _ => return id.qualified(),
                    }
                }
            }
        }
    }
}

/// The fixed primitive aliases seeded into every model.
pub(crate) fn primitive_aliases() -> BTreeMap<String, Datatype> {
    let mut aliases = BTreeMap::new();

    let mut seed = |names: &[&str], target: &str| {
        for name in names {
            aliases.insert(name.to_string(), Datatype::Primitive(target.to_string()));
        }
    };

    seed(&["string", "varchar", "char", "character"], "varchar");
    seed(&["int", "integer", "serial"], "int");
    seed(&["float", "float32", "real"], "float");
    seed(&["timestamp", "date", "time", "datetime"], "timestamp");
    seed(&["boolean", "bool"], "boolean");
    seed(&["double", "float64"], "double");
    seed(&["text"], "text");
    seed(&["bigint"], "bigint");
    seed(&["smallint"], "smallint");

    aliases
}
