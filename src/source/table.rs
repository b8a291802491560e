use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};

use crate::error::{LoadError, Result};
use crate::loader::{
    SourceRow, COL_AUTHOR, COL_CATEGORY, COL_ENGLISH, COL_LATVIAN, COL_ORIGINAL, COL_RUSSIAN,
    COL_TITLE, COL_VERSE_NUMBER,
};

/// Table name used when the configuration does not name one.
pub const DEFAULT_TABLE: &str = "bhajans";

/// Source columns in the order they are selected, with whether each one
/// must be present.
const COLUMNS: [(&str, bool); 8] = [
    (COL_CATEGORY, true),
    (COL_TITLE, true),
    (COL_AUTHOR, true),
    (COL_VERSE_NUMBER, true),
    (COL_ORIGINAL, true),
    (COL_ENGLISH, true),
    (COL_RUSSIAN, false),
    (COL_LATVIAN, false),
];

/// Open the source database without creating it or allowing writes.
pub fn open_source(path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(conn)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column names of `table`, in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_identifier(table)))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(LoadError::MissingTable(table.to_string()));
    }
    Ok(columns)
}

/// Build the select list, substituting `NULL` for optional columns the table
/// does not have. Column names match case-insensitively, as SQLite does.
fn select_list(table: &str, available: &[String]) -> Result<String> {
    let mut parts = Vec::with_capacity(COLUMNS.len());
    for (column, required) in COLUMNS {
        match available
            .iter()
            .find(|name| name.eq_ignore_ascii_case(column))
        {
            Some(name) => parts.push(quote_identifier(name)),
            None if required => {
                return Err(LoadError::MissingColumn {
                    table: table.to_string(),
                    column,
                })
            }
            None => parts.push("NULL".to_string()),
        }
    }
    Ok(parts.join(", "))
}

/// Render a cell of any storage class as text. Blobs and NULL count as
/// missing.
fn cell_text(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Blob(_) => None,
        Value::Integer(number) => Some(number.to_string()),
        Value::Real(number) => Some(number.to_string()),
        Value::Text(text) => Some(text),
    }
}

/// Read every row of the source table.
pub fn fetch_rows(conn: &Connection, table: &str) -> Result<Vec<SourceRow>> {
    let columns = table_columns(conn, table)?;
    let query = format!(
        "SELECT {} FROM {}",
        select_list(table, &columns)?,
        quote_identifier(table)
    );

    let mut stmt = conn.prepare(&query)?;
    let rows = stmt
        .query_map([], |row| {
            let cell = |index: usize| row.get::<_, Value>(index).map(cell_text);
            Ok(SourceRow {
                category: cell(0)?,
                title: cell(1)?,
                author: cell(2)?,
                verse_number: cell(3)?,
                original: cell(4)?,
                english: cell(5)?,
                russian: cell(6)?,
                latvian: cell(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_table(create: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(create, []).unwrap();
        conn
    }

    #[test]
    fn reads_cells_of_any_storage_class() {
        let conn = memory_table(
            "CREATE TABLE bhajans (Category TEXT, Bhajan_Title TEXT, Author TEXT,
             Verse_Number, Original TEXT, English TEXT)",
        );
        conn.execute(
            "INSERT INTO bhajans VALUES ('Śrī Guru', 'Test', 'A', 2.0, 'line', NULL)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO bhajans VALUES ('Śrī Guru', 'Test', 'A', 1, 'first', 'en')",
            [],
        )
        .unwrap();

        let rows = fetch_rows(&conn, DEFAULT_TABLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].verse_number.as_deref(), Some("2"));
        assert_eq!(rows[0].english, None);
        assert_eq!(rows[0].russian, None);
        assert_eq!(rows[1].verse_number.as_deref(), Some("1"));
        assert_eq!(rows[1].english.as_deref(), Some("en"));
    }

    #[test]
    fn optional_columns_are_read_when_present() {
        let conn = memory_table(
            "CREATE TABLE bhajans (category, bhajan_title, author, verse_number,
             original, english, russian, latvian)",
        );
        conn.execute(
            "INSERT INTO bhajans VALUES ('C', 'T', 'A', '1', 'o', 'e', 'r', 'l')",
            [],
        )
        .unwrap();

        let rows = fetch_rows(&conn, DEFAULT_TABLE).unwrap();
        assert_eq!(rows[0].russian.as_deref(), Some("r"));
        assert_eq!(rows[0].latvian.as_deref(), Some("l"));
    }

    #[test]
    fn missing_required_column_is_reported() {
        let conn = memory_table("CREATE TABLE bhajans (Category, Bhajan_Title, Verse_Number)");
        let err = fetch_rows(&conn, DEFAULT_TABLE).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingColumn {
                column: COL_AUTHOR,
                ..
            }
        ));
    }

    #[test]
    fn missing_table_is_reported() {
        let conn = Connection::open_in_memory().unwrap();
        let err = fetch_rows(&conn, "songs").unwrap_err();
        assert!(matches!(err, LoadError::MissingTable(name) if name == "songs"));
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_identifier(r#"my "table""#), r#""my ""table""""#);
    }
}
