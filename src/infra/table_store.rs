// ============================================================
// Layer 6 — Table Store (SQLite)
// ============================================================
// Persists the cleaned table as one relation in a SQLite file
// and reads it back.
//
// save():
//   1. Open (or create) the database file
//   2. In one transaction: DROP the relation if it exists,
//      CREATE it with one column per table column, INSERT
//      every row with a prepared statement
//   3. Commit
//
// Column SQL types are derived from the data: INTEGER when
// every non-null cell is an integer, TEXT otherwise.
//
// load() is a full scan in insertion (rowid) order. A missing
// relation is a Schema error, any SQLite failure an Io error.
//
// Reference: rusqlite documentation (Transaction, params_from_iter)

use std::path::PathBuf;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension, ToSql};

use crate::domain::error::{PipelineError, Result, Stage};
use crate::domain::table::{Table, Value};

/// Relation the cleaned dataset is stored under.
pub const RELATION: &str = "disaster_response";

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null       => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Text(s)    => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null       => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r)    => Value::Text(r.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
    }
}

/// Double-quoted SQL identifier.
fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_type(table: &Table, column: usize) -> &'static str {
    let all_integer = table
        .rows()
        .iter()
        .map(|row| &row[column])
        .all(|v| matches!(v, Value::Null | Value::Integer(_)));
    if all_integer { "INTEGER" } else { "TEXT" }
}

pub struct TableStore {
    path: PathBuf,
}

impl TableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_err(&self, e: rusqlite::Error) -> PipelineError {
        PipelineError::io(Stage::TableStore, self.path.display().to_string(), e)
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.path).map_err(|e| self.io_err(e))
    }

    /// Replace `relation` with the contents of `table`.
    pub fn save(&self, table: &Table, relation: &str) -> Result<()> {
        let mut conn = self.open()?;
        let tx = conn.transaction().map_err(|e| self.io_err(e))?;

        let columns: Vec<String> = table
            .columns()
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{} {}", quote(name), sql_type(table, i)))
            .collect();
        let create = format!("CREATE TABLE {} ({})", quote(relation), columns.join(", "));
        let insert = format!(
            "INSERT INTO {} VALUES ({})",
            quote(relation),
            vec!["?"; table.columns().len()].join(", ")
        );

        tx.execute(&format!("DROP TABLE IF EXISTS {}", quote(relation)), [])
            .map_err(|e| self.io_err(e))?;
        tx.execute(&create, []).map_err(|e| self.io_err(e))?;
        {
            let mut stmt = tx.prepare(&insert).map_err(|e| self.io_err(e))?;
            for row in table.rows() {
                stmt.execute(params_from_iter(row.iter())).map_err(|e| self.io_err(e))?;
            }
        }
        tx.commit().map_err(|e| self.io_err(e))?;

        tracing::info!(
            "Saved {} rows × {} columns to '{}' in '{}'",
            table.len(),
            table.columns().len(),
            relation,
            self.path.display()
        );
        Ok(())
    }

    /// Every row of `relation`, in insertion order.
    pub fn load(&self, relation: &str) -> Result<Table> {
        if !self.path.exists() {
            return Err(PipelineError::io(
                Stage::TableStore,
                self.path.display().to_string(),
                "database file does not exist",
            ));
        }
        let conn = self.open()?;

        let exists: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [relation],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| self.io_err(e))?;
        if exists.is_none() {
            return Err(PipelineError::schema(
                Stage::TableStore,
                format!("relation '{relation}' does not exist in '{}'", self.path.display()),
            ));
        }

        let mut stmt = conn
            .prepare(&format!("SELECT * FROM {} ORDER BY rowid", quote(relation)))
            .map_err(|e| self.io_err(e))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(from_sql))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })
            .map_err(|e| self.io_err(e))?
            .collect::<rusqlite::Result<Vec<Vec<Value>>>>()
            .map_err(|e| self.io_err(e))?;

        tracing::info!("Loaded {} rows from '{}'", rows.len(), relation);
        Ok(Table::new(columns, rows))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    fn table() -> Table {
        Table::new(
            vec!["id".into(), "message".into(), "original".into(), "related".into()],
            vec![
                vec![Value::Integer(2), "flood in city".into(), Value::Null, Value::Integer(1)],
                vec![Value::Integer(1), "all quiet".into(), "tout va bien".into(), Value::Integer(0)],
            ],
        )
    }

    #[test]
    fn test_save_then_load_preserves_rows_and_order() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path().join("db.sqlite"));
        store.save(&table(), RELATION).unwrap();

        let loaded = store.load(RELATION).unwrap();
        assert_eq!(loaded, table());
    }

    #[test]
    fn test_save_replaces_existing_relation() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path().join("db.sqlite"));
        store.save(&table(), RELATION).unwrap();

        let smaller = Table::new(vec!["id".into()], vec![vec![Value::Integer(9)]]);
        store.save(&smaller, RELATION).unwrap();
        assert_eq!(store.load(RELATION).unwrap(), smaller);
    }

    #[test]
    fn test_missing_relation_is_schema_error() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path().join("db.sqlite"));
        store.save(&table(), RELATION).unwrap();

        let err = store.load("other").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path().join("absent.sqlite"));
        assert_eq!(store.load(RELATION).unwrap_err().kind(), ErrorKind::Io);
    }

    #[test]
    fn test_sql_types_follow_cells() {
        let t = table();
        assert_eq!(sql_type(&t, 0), "INTEGER");
        assert_eq!(sql_type(&t, 1), "TEXT");
        assert_eq!(sql_type(&t, 3), "INTEGER");
    }
}
