use crate::relation::Relation;
use crate::schema::canonical::ID;

/// Quote an identifier for SQLite
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Generate CREATE TABLE SQL for a relation's fields. The `id` key, in any
/// case, becomes the primary key.
pub fn generate_create_table(relation: &Relation, table: &str) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", quote_ident(table));

    let columns: Vec<String> = relation
        .fields
        .iter()
        .map(|field| {
            let null_constraint = if !field.nullable { " NOT NULL" } else { "" };
            // Raw and staged targets still carry the key as `ID`
            let pk = if field.name.eq_ignore_ascii_case(ID) { " PRIMARY KEY" } else { "" };
            format!(
                "    {} {}{}{}",
                quote_ident(&field.name),
                field.col_type.sql_type(),
                pk,
                null_constraint
            )
        })
        .collect();

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// INSERT statement with one placeholder per field
pub fn generate_insert(relation: &Relation, table: &str) -> String {
    let columns: Vec<String> = relation.fields.iter().map(|f| quote_ident(&f.name)).collect();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Field;
    use crate::schema::ColumnType;

    fn enriched() -> Relation {
        Relation::new(
            "pokemon",
            vec![
                Field::new("id", ColumnType::Integer, false),
                Field::new("legendary", ColumnType::Boolean, true),
                Field::new("bmi", ColumnType::Real, true),
                Field::new("type_1", ColumnType::Text, false),
            ],
        )
    }

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&enriched(), "pokemon_processed");
        assert!(sql.contains("CREATE TABLE \"pokemon_processed\""));
        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY NOT NULL"));
        assert!(sql.contains("\"legendary\" INTEGER,"));
        assert!(sql.contains("\"bmi\" REAL"));
        assert!(sql.contains("\"type_1\" TEXT NOT NULL"));
    }

    #[test]
    fn test_staged_key_is_primary_key() {
        let staged = Relation::new(
            "stg_pokemon_base",
            vec![
                Field::new("ID", ColumnType::Integer, false),
                Field::new("NAME", ColumnType::Text, false),
            ],
        );
        let sql = generate_create_table(&staged, "stg_pokemon_base");
        assert!(sql.contains("\"ID\" INTEGER PRIMARY KEY NOT NULL"));
        assert!(sql.contains("\"NAME\" TEXT NOT NULL\n"));
    }

    #[test]
    fn test_generate_insert() {
        let sql = generate_insert(&enriched(), "out");
        assert_eq!(
            sql,
            "INSERT INTO \"out\" (\"id\", \"legendary\", \"bmi\", \"type_1\") VALUES (?, ?, ?, ?)"
        );
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("Sp. \"Atk\""), "\"Sp. \"\"Atk\"\"\"");
    }
}
