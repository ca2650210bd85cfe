mod common;
use common::*;

#[test]
fn minimal_schema_emits_the_full_creation_script() {
    let m = model(
        r#"
enums:
  status: [active, inactive]
tables:
  accounts:
    id: serial primary
    name: varchar(50) notnull
"#,
    );

    let sql = initial_sql(&PostgresDialect, &m);

    assert_eq!(
        sql,
        vec![
            "CREATE TYPE status AS ENUM ('active', 'inactive');",
            "CREATE TABLE accounts();",
            "ALTER TABLE accounts ADD COLUMN id INT;",
            "CREATE SEQUENCE seq_accounts_id;",
            "SELECT setval('seq_accounts_id', (SELECT max(id) FROM accounts));",
            "ALTER TABLE accounts ALTER COLUMN id SET DEFAULT nextval('seq_accounts_id'::regclass);",
            "ALTER TABLE accounts ADD COLUMN name VARCHAR(50);",
            "ALTER TABLE accounts ALTER COLUMN name SET NOT NULL;",
            "ALTER TABLE accounts ADD CONSTRAINT pk_accounts PRIMARY KEY(id);",
        ]
    );
}

#[test]
fn empty_configuration_emits_nothing() {
    assert!(initial_sql(&PostgresDialect, &model("")).is_empty());
}

#[test]
fn foreign_keys_come_after_every_table() {
    let m = model(
        r#"
posts:
  id: serial primary
  author: accounts.id notnull
accounts:
  id: serial primary
"#,
    );

    let sql = initial_sql(&PostgresDialect, &m);

    let fk_pos = sql
        .iter()
        .position(|s| s.contains("fk_posts_author"))
        .expect("foreign key statement missing");
    let last_table_pos = sql
        .iter()
        .rposition(|s| s.starts_with("CREATE TABLE"))
        .unwrap();

    assert!(fk_pos > last_table_pos);
    assert!(sql[fk_pos].contains("FOREIGN KEY (author) REFERENCES accounts(id)"));
}

#[test]
fn every_statement_mentions_only_declared_objects() {
    let m = model(
        r#"
bond_type: [companion, friend]
accounts:
  id: serial primary
  username: varchar(50) notnull unique
relationships:
  id: serial primary
  account_id: accounts.id notnull
  bond: bond_type
"#,
    );

    let sql = initial_sql(&PostgresDialect, &m);

    for statement in &sql {
        let mentions_known = ["accounts", "relationships", "bond_type", "versions"]
            .iter()
            .any(|name| statement.contains(name));
        assert!(mentions_known, "statement names an unknown object: {statement}");
    }
}

#[test]
fn multi_column_primary_key_is_one_constraint() {
    let m = model(
        r#"
memberships:
  account_id: int primary(pair)
  group_id: int primary(pair)
"#,
    );

    let sql = initial_sql(&PostgresDialect, &m);
    assert!(sql.contains(
        &"ALTER TABLE memberships ADD CONSTRAINT pk_memberships PRIMARY KEY(account_id, group_id);"
            .to_string()
    ));
}
