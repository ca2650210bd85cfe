use super::Dialect;

/// The reference emitter. Auto-increment is emulated with a named sequence
/// because the serial pseudo-type cannot be attached to an existing column.
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn type_name(&self, name: &str, size: u32) -> String {
        let upper = match name {
            "varchar" | "string" => "VARCHAR".to_string(),
            "int" | "smallint" | "bigint" | "float" | "timestamp" | "boolean" | "double"
            | "text" => name.to_uppercase(),
            other => other.to_string(),
        };

        if (upper == "VARCHAR" || upper == "INT") && size > 0 {
            format!("{upper}({size})")
        } else {
            upper
        }
    }

    fn create_version_table(&self) -> String {
        "CREATE TABLE IF NOT EXISTS versions (id INT NOT NULL, config TEXT NOT NULL);".to_string()
    }

    fn check_version(&self) -> String {
        "SELECT id, config FROM versions ORDER BY id DESC LIMIT 1;".to_string()
    }

    fn insert_version(&self) -> String {
        "INSERT INTO versions (id, config) VALUES ($1, $2);".to_string()
    }

    fn add_table(&self, name: &str, if_not_exists: bool) -> String {
        if if_not_exists {
            format!("CREATE TABLE IF NOT EXISTS {name}();")
        } else {
            format!("CREATE TABLE {name}();")
        }
    }

    fn drop_table(&self, name: &str) -> String {
        format!("DROP TABLE {name} CASCADE;")
    }

    fn add_column(&self, table: &str, column: &str, type_name: &str, size: u32) -> String {
        format!(
            "ALTER TABLE {table} ADD COLUMN {column} {};",
            self.type_name(type_name, size)
        )
    }

    fn update_column(&self, table: &str, column: &str, type_name: &str, size: u32) -> String {
        format!(
            "ALTER TABLE {table} ALTER COLUMN {column} TYPE {};",
            self.type_name(type_name, size)
        )
    }

    fn drop_column(&self, table: &str, column: &str) -> String {
        format!("ALTER TABLE {table} DROP COLUMN {column};")
    }

    fn add_primary_key(&self, table: &str, columns: &[String]) -> String {
        format!(
            "ALTER TABLE {table} ADD CONSTRAINT pk_{table} PRIMARY KEY({});",
            columns.join(", ")
        )
    }

    fn update_primary_key(&self, table: &str, columns: &[String]) -> Vec<String> {
        vec![
            self.drop_primary_key(table),
            self.add_primary_key(table, columns),
        ]
    }

    fn drop_primary_key(&self, table: &str) -> String {
        format!("ALTER TABLE {table} DROP CONSTRAINT pk_{table};")
    }

    fn add_foreign_key(
        &self,
        table: &str,
        column: &str,
        ref_table: &str,
        ref_column: &str,
    ) -> String {
        format!(
            "ALTER TABLE {table} ADD CONSTRAINT fk_{table}_{column} FOREIGN KEY ({column}) REFERENCES {ref_table}({ref_column});"
        )
    }

    fn update_foreign_key(
        &self,
        table: &str,
        column: &str,
        ref_table: &str,
        ref_column: &str,
    ) -> Vec<String> {
        vec![
            self.drop_foreign_key(table, column),
            self.add_foreign_key(table, column, ref_table, ref_column),
        ]
    }

    fn drop_foreign_key(&self, table: &str, column: &str) -> String {
        format!("ALTER TABLE {table} DROP CONSTRAINT fk_{table}_{column};")
    }

    fn add_unique(&self, id: &str, table: &str, columns: &[String]) -> String {
        format!(
            "ALTER TABLE {table} ADD CONSTRAINT uq_{id} UNIQUE({});",
            columns.join(", ")
        )
    }

    fn update_unique(&self, id: &str, table: &str, columns: &[String]) -> Vec<String> {
        vec![
            self.drop_unique(id, table),
            self.add_unique(id, table, columns),
        ]
    }

    fn drop_unique(&self, id: &str, table: &str) -> String {
        format!("ALTER TABLE {table} DROP CONSTRAINT uq_{id};")
    }

    fn set_not_null(&self, table: &str, column: &str) -> String {
        format!("ALTER TABLE {table} ALTER COLUMN {column} SET NOT NULL;")
    }

    fn drop_not_null(&self, table: &str, column: &str) -> String {
        format!("ALTER TABLE {table} ALTER COLUMN {column} DROP NOT NULL;")
    }

    fn add_check(&self, table: &str, column: &str, expression: &str) -> String {
        format!("ALTER TABLE {table} ADD CONSTRAINT ch_{table}_{column} CHECK({expression});")
    }

    fn update_check(&self, table: &str, column: &str, expression: &str) -> Vec<String> {
        vec![
            self.drop_check(table, column),
            self.add_check(table, column, expression),
        ]
    }

    fn drop_check(&self, table: &str, column: &str) -> String {
        format!("ALTER TABLE {table} DROP CONSTRAINT ch_{table}_{column};")
    }

    fn add_enum(&self, name: &str, values: &[String]) -> String {
        format!("CREATE TYPE {name} AS ENUM ('{}');", values.join("', '"))
    }

    fn append_enum_value(&self, name: &str, value: &str) -> String {
        format!("ALTER TYPE {name} ADD VALUE '{value}';")
    }

    fn drop_enum(&self, name: &str) -> String {
        format!("DROP TYPE {name};")
    }

    fn set_default(&self, table: &str, column: &str, expression: &str) -> String {
        format!("ALTER TABLE {table} ALTER COLUMN {column} SET DEFAULT {expression};")
    }

    fn drop_default(&self, table: &str, column: &str) -> String {
        format!("ALTER TABLE {table} ALTER COLUMN {column} DROP DEFAULT;")
    }

    fn set_auto_increment(&self, table: &str, column: &str) -> Vec<String> {
        vec![
            format!("CREATE SEQUENCE seq_{table}_{column};"),
            format!(
                "SELECT setval('seq_{table}_{column}', (SELECT max({column}) FROM {table}));"
            ),
            format!(
                "ALTER TABLE {table} ALTER COLUMN {column} SET DEFAULT nextval('seq_{table}_{column}'::regclass);"
            ),
        ]
    }

    fn unset_auto_increment(&self, table: &str, column: &str) -> Vec<String> {
        vec![
            format!("ALTER TABLE {table} ALTER COLUMN {column} DROP DEFAULT;"),
            format!("DROP SEQUENCE seq_{table}_{column} CASCADE;"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_render_with_sizes() {
        let d = PostgresDialect;
        assert_eq!(d.type_name("varchar", 50), "VARCHAR(50)");
        assert_eq!(d.type_name("varchar", 0), "VARCHAR");
        assert_eq!(d.type_name("int", 4), "INT(4)");
        assert_eq!(d.type_name("int", 0), "INT");
        assert_eq!(d.type_name("text", 10), "TEXT");
        assert_eq!(d.type_name("bond_type", 0), "bond_type");
    }

    #[test]
    fn table_statements() {
        let d = PostgresDialect;
        assert_eq!(d.add_table("accounts", false), "CREATE TABLE accounts();");
        assert_eq!(
            d.add_table("accounts", true),
            "CREATE TABLE IF NOT EXISTS accounts();"
        );
        assert_eq!(d.drop_table("accounts"), "DROP TABLE accounts CASCADE;");
    }

    #[test]
    fn column_statements() {
        let d = PostgresDialect;
        assert_eq!(
            d.add_column("accounts", "name", "varchar", 50),
            "ALTER TABLE accounts ADD COLUMN name VARCHAR(50);"
        );
        assert_eq!(
            d.update_column("accounts", "name", "text", 0),
            "ALTER TABLE accounts ALTER COLUMN name TYPE TEXT;"
        );
        assert_eq!(
            d.drop_column("accounts", "name"),
            "ALTER TABLE accounts DROP COLUMN name;"
        );
    }

    #[test]
    fn constraint_names_are_derived() {
        let d = PostgresDialect;
        assert_eq!(
            d.add_primary_key("accounts", &["id".to_string()]),
            "ALTER TABLE accounts ADD CONSTRAINT pk_accounts PRIMARY KEY(id);"
        );
        assert_eq!(
            d.add_foreign_key("posts", "author", "accounts", "id"),
            "ALTER TABLE posts ADD CONSTRAINT fk_posts_author FOREIGN KEY (author) REFERENCES accounts(id);"
        );
        assert_eq!(
            d.add_unique("username", "accounts", &["username".to_string()]),
            "ALTER TABLE accounts ADD CONSTRAINT uq_username UNIQUE(username);"
        );
        assert_eq!(
            d.add_check("accounts", "age", "age>0"),
            "ALTER TABLE accounts ADD CONSTRAINT ch_accounts_age CHECK(age>0);"
        );
    }

    #[test]
    fn multi_column_constraints_join_names() {
        let d = PostgresDialect;
        assert_eq!(
            d.add_primary_key("memberships", &["account_id".to_string(), "group_id".to_string()]),
            "ALTER TABLE memberships ADD CONSTRAINT pk_memberships PRIMARY KEY(account_id, group_id);"
        );
    }

    #[test]
    fn updates_are_drop_then_add() {
        let d = PostgresDialect;
        let statements = d.update_primary_key("accounts", &["id".to_string()]);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("DROP CONSTRAINT pk_accounts"));
        assert!(statements[1].contains("ADD CONSTRAINT pk_accounts"));

        let statements = d.update_check("t", "c", "c>0");
        assert!(statements[0].contains("DROP CONSTRAINT ch_t_c"));
        assert!(statements[1].contains("CHECK(c>0)"));
    }

    #[test]
    fn enum_statements() {
        let d = PostgresDialect;
        assert_eq!(
            d.add_enum(
                "status",
                &["active".to_string(), "inactive".to_string()]
            ),
            "CREATE TYPE status AS ENUM ('active', 'inactive');"
        );
        assert_eq!(
            d.append_enum_value("status", "archived"),
            "ALTER TYPE status ADD VALUE 'archived';"
        );
        assert_eq!(d.drop_enum("status"), "DROP TYPE status;");
        assert_eq!(d.drop_enum_value("status", "active"), None);
    }

    #[test]
    fn auto_increment_is_a_sequence_triplet() {
        let d = PostgresDialect;
        let statements = d.set_auto_increment("accounts", "id");
        assert_eq!(
            statements,
            vec![
                "CREATE SEQUENCE seq_accounts_id;".to_string(),
                "SELECT setval('seq_accounts_id', (SELECT max(id) FROM accounts));".to_string(),
                "ALTER TABLE accounts ALTER COLUMN id SET DEFAULT nextval('seq_accounts_id'::regclass);"
                    .to_string(),
            ]
        );

        let statements = d.unset_auto_increment("accounts", "id");
        assert_eq!(statements.len(), 2);
        assert!(statements[1].contains("DROP SEQUENCE seq_accounts_id CASCADE"));
    }

    #[test]
    fn version_bookkeeping_statements() {
        let d = PostgresDialect;
        assert!(d.create_version_table().contains("IF NOT EXISTS versions"));
        assert!(d.check_version().contains("ORDER BY id DESC"));
        assert!(d.insert_version().contains("VALUES ($1, $2)"));
    }
}
