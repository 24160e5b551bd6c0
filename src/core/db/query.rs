/// Query Types Module
///
/// This module provides the statement and result types used by the facade:
/// parameter-bindable statements, typed result grids, and join handles for
/// background submissions.
use crate::core::db::listener::QueryRecord;
use crate::core::db::value::{decode_column, Value};
use crate::core::{KeysqlError, Result};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row};
use tokio::task::JoinHandle;

/// SQL statement with positionally bound parameters.
///
/// Identifiers are already interpolated into the statement text by the
/// time a `SqlQuery` exists; only values travel as parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub statement: String,
    pub params: Vec<Value>,
}

impl SqlQuery {
    /// Creates a statement with no bound parameters.
    pub fn new(statement: impl Into<String>) -> Self {
        SqlQuery {
            statement: statement.into(),
            params: Vec::new(),
        }
    }

    /// Binds the next positional parameter.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// Represents the result of a SQL query execution.
#[derive(Debug, Default)]
pub struct QueryResult {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of data as tagged values
    pub rows: Vec<Vec<Value>>,
    /// Number of rows returned
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let row_count = rows.len();
        QueryResult {
            columns,
            rows,
            row_count,
        }
    }

    /// Creates an empty result with no columns.
    pub fn empty() -> Self {
        QueryResult::default()
    }

    /// Returns true when the query matched no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up the index of a named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the value at (row, column name), if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Builds a result grid from raw driver rows.
    pub(crate) fn from_rows(rows: &[MySqlRow]) -> Self {
        let Some(first) = rows.first() else {
            return QueryResult::empty();
        };
        let columns: Vec<String> = first
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let data: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| (0..columns.len()).map(|idx| decode_column(row, idx)).collect())
            .collect();
        QueryResult::new(columns, data)
    }
}

/// Handle for one background statement submission.
///
/// The caller may await the outcome with [`PendingQuery::join`], cancel it
/// with [`PendingQuery::abort`], or drop the handle to fire and forget;
/// dropping does not cancel the submission.
#[derive(Debug)]
pub struct PendingQuery {
    record: QueryRecord,
    handle: JoinHandle<Result<u64>>,
}

impl PendingQuery {
    pub(crate) fn new(record: QueryRecord, handle: JoinHandle<Result<u64>>) -> Self {
        PendingQuery { record, handle }
    }

    /// The observability record for the submitted statement.
    pub fn record(&self) -> &QueryRecord {
        &self.record
    }

    /// Returns true once the submission has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancels the background task if it has not completed yet.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Waits for the submission and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Returns the execution error of the statement, or `KeysqlError::Task`
    /// if the background task panicked or was cancelled.
    pub async fn join(self) -> Result<u64> {
        self.handle
            .await
            .map_err(|e| KeysqlError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_query_builder() {
        let query = SqlQuery::new("UPDATE users SET coins = ? WHERE name = ?")
            .bind(500i64)
            .bind("alice");
        assert_eq!(query.statement, "UPDATE users SET coins = ? WHERE name = ?");
        assert_eq!(
            query.params,
            vec![Value::Integer(500), Value::Text("alice".to_string())]
        );
    }

    #[test]
    fn test_result_lookup_by_column_name() {
        let result = QueryResult::new(
            vec!["name".to_string(), "coins".to_string()],
            vec![
                vec![Value::Text("alice".to_string()), Value::Integer(500)],
                vec![Value::Text("bob".to_string()), Value::Integer(12)],
            ],
        );
        assert_eq!(result.row_count, 2);
        assert_eq!(result.column_index("coins"), Some(1));
        assert_eq!(result.value(0, "coins"), Some(&Value::Integer(500)));
        assert_eq!(result.value(1, "name"), Some(&Value::Text("bob".to_string())));
        assert_eq!(result.value(0, "missing"), None);
        assert_eq!(result.value(9, "name"), None);
    }

    #[test]
    fn test_empty_result() {
        let result = QueryResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.row_count, 0);
        assert!(result.columns.is_empty());
    }

    #[tokio::test]
    async fn test_pending_query_join() {
        let record = QueryRecord::new("UPDATE t SET a = ? WHERE b = ?", "app");
        let pending = PendingQuery::new(record, tokio::spawn(async { Ok(3u64) }));
        assert_eq!(pending.record().database, "app");
        assert_eq!(pending.join().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_pending_query_abort_surfaces_as_task_error() {
        let record = QueryRecord::new("SELECT SLEEP(60)", "app");
        let pending = PendingQuery::new(
            record,
            tokio::spawn(async {
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                Ok(0u64)
            }),
        );
        pending.abort();
        match pending.join().await {
            Err(KeysqlError::Task(_)) => {}
            other => panic!("Expected Task error, got {:?}", other),
        }
    }
}
