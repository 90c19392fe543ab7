//! Reads table descriptions from schema files.

use serde::Deserialize;
use std::path::Path;

use crate::error::{AnnotateError, Result};
use crate::schema::Table;
use crate::sql::{Dialect, parse_sql};

#[derive(Deserialize)]
#[serde(untagged)]
enum TableDocument {
    Many(Vec<Table>),
    One(Table),
}

/// Load every table from `path`: a `.json` document (one table or a list)
/// or a SQL DDL dump.
pub fn load_tables(path: &Path, dialect: Dialect) -> Result<Vec<Table>> {
    let content = std::fs::read_to_string(path).map_err(|e| AnnotateError::io(path, e))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let tables = if is_json {
        let document: TableDocument =
            serde_json::from_str(&content).map_err(|source| AnnotateError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        match document {
            TableDocument::Many(tables) => tables,
            TableDocument::One(table) => vec![table],
        }
    } else {
        parse_sql(&content, dialect)?
    };

    for table in &tables {
        table.validate()?;
    }

    tracing::debug!(path = %path.display(), tables = tables.len(), "Loaded schema");
    Ok(tables)
}

/// Find `name` among `tables`.
pub fn find_table<'a>(tables: &'a [Table], name: &str, schema: &Path) -> Result<&'a Table> {
    tables
        .iter()
        .find(|t| t.name() == name)
        .ok_or_else(|| AnnotateError::UnknownTable {
            table: name.to_string(),
            schema: schema.to_path_buf(),
        })
}

/// Find the table a model file describes. The file stem is tried as
/// written, then in plural form (`user` → `users`, `box` → `boxes`,
/// `category` → `categories`).
pub fn table_for_file<'a>(tables: &'a [Table], file: &Path, schema: &Path) -> Result<&'a Table> {
    let stem = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let table = table_names(&stem)
        .iter()
        .find_map(|name| tables.iter().find(|t| t.name() == name))
        .ok_or_else(|| AnnotateError::UnknownTable {
            table: stem.clone(),
            schema: schema.to_path_buf(),
        })?;

    tracing::debug!(file = %file.display(), table = table.name(), "Matched table");
    Ok(table)
}

fn table_names(stem: &str) -> Vec<String> {
    let mut names = vec![stem.to_string(), format!("{}s", stem)];
    if ["s", "x", "z", "ch", "sh"].iter().any(|end| stem.ends_with(end)) {
        names.push(format!("{}es", stem));
    }
    if let Some(base) = stem.strip_suffix('y') {
        names.push(format!("{}ies", base));
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaError;
    use std::fs;

    #[test]
    fn test_load_json_single_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(
            &path,
            r#"{ "name": "users", "primary_key": "id", "columns": [{ "name": "id", "type": "integer" }] }"#,
        )
        .unwrap();

        let tables = load_tables(&path, Dialect::Auto).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name(), "users");
    }

    #[test]
    fn test_load_json_table_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(
            &path,
            r#"[
                { "name": "users", "columns": [{ "name": "id", "type": "integer" }] },
                { "name": "posts", "columns": [{ "name": "id", "type": "integer" }] }
            ]"#,
        )
        .unwrap();

        let tables = load_tables(&path, Dialect::Auto).unwrap();
        assert!(find_table(&tables, "posts", &path).is_ok());
        assert!(matches!(
            find_table(&tables, "comments", &path),
            Err(AnnotateError::UnknownTable { .. })
        ));
    }

    #[test]
    fn test_table_for_file_plural_fallback() {
        let table = |name: &str| Table::new(name, None, vec![]);
        let tables = vec![
            table("user"),
            table("posts"),
            table("boxes"),
            table("categories"),
        ];
        let schema = Path::new("structure.sql");
        let name = |file: &str| {
            table_for_file(&tables, Path::new(file), schema)
                .unwrap()
                .name()
                .to_string()
        };

        assert_eq!(name("app/models/user.rb"), "user");
        assert_eq!(name("post.rb"), "posts");
        assert_eq!(name("box.rb"), "boxes");
        assert_eq!(name("category.rb"), "categories");
    }

    #[test]
    fn test_table_for_file_unknown() {
        let tables = vec![Table::new("users", None, vec![])];
        let err = table_for_file(&tables, Path::new("comment.rb"), Path::new("s.sql")).unwrap_err();

        assert!(matches!(
            err,
            AnnotateError::UnknownTable { ref table, .. } if table == "comment"
        ));
    }

    #[test]
    fn test_load_sql() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("structure.sql");
        fs::write(&path, "CREATE TABLE users (id INT PRIMARY KEY, name TEXT);").unwrap();

        let tables = load_tables(&path, Dialect::Generic).unwrap();
        assert_eq!(tables[0].columns().len(), 2);
    }

    #[test]
    fn test_load_rejects_duplicate_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("structure.sql");
        fs::write(&path, "CREATE TABLE users (id INT, id TEXT);").unwrap();

        let err = load_tables(&path, Dialect::Generic).unwrap_err();
        assert!(matches!(
            err,
            AnnotateError::Schema(SchemaError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_tables(Path::new("/nonexistent/schema.sql"), Dialect::Auto).unwrap_err();
        assert!(matches!(err, AnnotateError::Io { .. }));
    }
}
