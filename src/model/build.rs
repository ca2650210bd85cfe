use std::collections::BTreeMap;

use crate::model::{primitive_aliases, Column, ColumnId, Datatype, EnumType, Model};
use crate::parser::{attributes, parse_document, RawConfig};
use crate::util::{Result, SchemaError};

impl Model {
    /// Parses a schema document and builds the normalized model from it.
    pub fn from_document(input: &str) -> Result<Model> {
        build(parse_document(input)?)
    }

    /// Builds the normalized model from an already-parsed configuration.
    pub fn from_config(config: RawConfig) -> Result<Model> {
        build(config)
    }
}

/// Registration happens before resolution so that declaration order never
/// matters: a column may reference a column or enum declared later.
fn build(config: RawConfig) -> Result<Model> {
    let mut model = Model {
        aliases: primitive_aliases(),
        raw_config: config.raw,
        ..Default::default()
    };

    register_tables(&mut model, &config.tables)?;
    register_enums(&mut model, &config.enums);
    resolve_datatypes(&mut model)?;

    Ok(model)
}

fn register_tables(
    model: &mut Model,
    tables: &BTreeMap<String, BTreeMap<String, String>>,
) -> Result<()> {
    for (table, columns) in tables {
        let entry = model.tables.entry(table.clone()).or_default();

        for (name, raw) in columns {
            let attrs = attributes::parse(table, name, raw)?;
            let id = ColumnId::new(table.clone(), name.clone());

            if let Some(group) = &attrs.primary {
                model.primaries.entry(group.clone()).or_default().push(id.clone());
            }
            if let Some(group) = &attrs.unique {
                model.uniques.entry(group.clone()).or_default().push(id.clone());
            }

            let column = Column {
                table: table.clone(),
                name: name.clone(),
                // Placeholder until the resolution pass; never observed
                // outside this function.
                datatype: Datatype::Primitive(attrs.raw_type.clone()),
                size: attrs.size,
                default: attrs.default,
                not_null: attrs.not_null,
                check: attrs.check,
                primary: attrs.primary,
                unique: attrs.unique,
                auto_increment: attrs.auto_increment,
                raw_type: attrs.raw_type,
                raw: raw.clone(),
            };

            entry.insert(name.clone(), column);
            model.aliases.insert(id.qualified(), Datatype::Column(id));
        }
    }

    Ok(())
}

fn register_enums(model: &mut Model, enums: &BTreeMap<String, Vec<String>>) {
    for (name, values) in enums {
        model.enums.insert(
            name.clone(),
            EnumType {
                name: name.clone(),
                values: values.clone(),
            },
        );
        model.aliases.insert(name.clone(), Datatype::Enum(name.clone()));
    }
}

fn resolve_datatypes(model: &mut Model) -> Result<()> {
    let Model {
        tables,
        foreigns,
        aliases,
        ..
    } = model;

    for (table, columns) in tables.iter_mut() {
        for (name, column) in columns.iter_mut() {
            let Some(datatype) = aliases.get(&column.raw_type) else {
                return Err(SchemaError::TypeUnknown {
                    table: table.clone(),
                    column: name.clone(),
                    raw_type: column.raw_type.clone(),
                });
            };

            column.datatype = datatype.clone();
            if matches!(column.datatype, Datatype::Column(_)) {
                foreigns.insert(
                    format!("{table}.{name}"),
                    ColumnId::new(table.clone(), name.clone()),
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"
enums:
  bond_type: [companion, fiance, spouse, friend]
tables:
  accounts:
    id: serial primary
    username: varchar(50) notnull unique
    email: varchar(100) notnull unique
    password: varchar(100) notnull
    bio: text
    created_at: timestamp default(NOW())
  relationships:
    id: serial primary
    account_id: accounts.id notnull
    bond: bond_type default('friend')
    verified_at: timestamp
"#;

    fn model() -> Model {
        Model::from_document(DOCUMENT).unwrap()
    }

    #[test]
    fn builds_tables_and_enums() {
        let m = model();
        assert_eq!(m.enums.len(), 1);
        assert_eq!(m.tables.len(), 2);
        assert_eq!(m.tables["accounts"].len(), 6);
        assert_eq!(
            m.enums["bond_type"].values,
            vec!["companion", "fiance", "spouse", "friend"]
        );
    }

    #[test]
    fn serial_resolves_to_int_with_auto_increment() {
        let m = model();
        let id = &m.tables["accounts"]["id"];
        assert_eq!(id.raw_type, "serial");
        assert_eq!(id.datatype, Datatype::Primitive("int".to_string()));
        assert_eq!(id.size, 0);
        assert!(id.auto_increment);
        assert!(!id.not_null);
    }

    #[test]
    fn varchar_keeps_its_size() {
        let m = model();
        let username = &m.tables["accounts"]["username"];
        assert_eq!(username.raw_type, "varchar");
        assert_eq!(username.size, 50);
        assert!(username.not_null);
    }

    #[test]
    fn default_expression_is_extracted() {
        let m = model();
        let created_at = &m.tables["accounts"]["created_at"];
        assert_eq!(created_at.default.as_deref(), Some("NOW()"));
    }

    #[test]
    fn column_reference_becomes_a_foreign_key() {
        let m = model();
        let account_id = &m.tables["relationships"]["account_id"];
        assert_eq!(account_id.raw_type, "accounts.id");
        assert_eq!(
            account_id.datatype,
            Datatype::Column(ColumnId::new("accounts", "id"))
        );
        assert_eq!(
            m.foreigns.get("relationships.account_id"),
            Some(&ColumnId::new("relationships", "account_id"))
        );
    }

    #[test]
    fn enum_typed_column_resolves_to_the_enum() {
        let m = model();
        let bond = &m.tables["relationships"]["bond"];
        assert_eq!(bond.datatype, Datatype::Enum("bond_type".to_string()));
        assert_eq!(bond.default.as_deref(), Some("'friend'"));
    }

    #[test]
    fn every_column_is_reachable_through_aliases() {
        let m = model();
        for (table, columns) in &m.tables {
            for name in columns.keys() {
                let key = format!("{table}.{name}");
                assert_eq!(
                    m.aliases.get(&key),
                    Some(&Datatype::Column(ColumnId::new(
                        table.clone(),
                        name.clone()
                    ))),
                    "alias missing for {key}"
                );
            }
        }
    }

    #[test]
    fn group_members_share_a_table() {
        let m = model();
        for groups in [&m.primaries, &m.uniques] {
            for (id, members) in groups {
                assert!(!members.is_empty(), "group {id} is empty");
                assert!(
                    members.iter().all(|c| c.table == members[0].table),
                    "group {id} spans tables"
                );
            }
        }
    }

    #[test]
    fn primary_groups_default_to_the_table_name() {
        let m = model();
        assert_eq!(
            m.primaries["accounts"],
            vec![ColumnId::new("accounts", "id")]
        );
        assert_eq!(
            m.primaries["relationships"],
            vec![ColumnId::new("relationships", "id")]
        );
    }

    #[test]
    fn unique_groups_default_to_the_column_name() {
        let m = model();
        assert_eq!(
            m.uniques["username"],
            vec![ColumnId::new("accounts", "username")]
        );
        assert_eq!(m.uniques["email"], vec![ColumnId::new("accounts", "email")]);
    }

    #[test]
    fn shared_group_id_collects_both_columns() {
        let m = Model::from_document(
            r#"
memberships:
  account_id: int primary(pair)
  group_id: int primary(pair)
"#,
        )
        .unwrap();

        assert_eq!(
            m.primaries["pair"],
            vec![
                ColumnId::new("memberships", "account_id"),
                ColumnId::new("memberships", "group_id"),
            ]
        );
    }

    #[test]
    fn forward_references_resolve() {
        // posts is declared before accounts; the alias index makes the order
        // irrelevant.
        let m = Model::from_document(
            r#"
posts:
  author: accounts.id
accounts:
  id: serial primary
"#,
        )
        .unwrap();

        assert!(m.foreigns.contains_key("posts.author"));
    }

    #[test]
    fn unknown_type_fails_closed() {
        let err = Model::from_document("accounts:\n  id: uuid\n").unwrap_err();
        match err {
            SchemaError::TypeUnknown {
                table,
                column,
                raw_type,
            } => {
                assert_eq!(table, "accounts");
                assert_eq!(column, "id");
                assert_eq!(raw_type, "uuid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rebuilding_from_raw_config_is_lossless() {
        let m = model();
        let rebuilt = Model::from_document(&m.raw_config).unwrap();
        assert_eq!(m, rebuilt);
    }
}
