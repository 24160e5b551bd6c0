/// Listener Module
///
/// This module provides the observer hook for issued statements. A facade
/// holds at most one listener at a time; every callback has a no-op
/// default, so implementors override only the slots they care about.
use crate::core::db::value::Value;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Immutable descriptor of one issued statement.
///
/// Records are created fresh for every statement sent and exist purely for
/// observability; they are not handles to in-flight work.
#[derive(Debug, Clone)]
pub struct QueryRecord {
    /// The statement text as sent to the driver
    pub query: String,
    /// The database selected when the statement was issued ("" in root context)
    pub database: String,
    /// Unique identifier, in case a listener needs to store records
    pub id: Uuid,
    /// Time the statement was handed to the driver
    pub issued_at: DateTime<Utc>,
}

impl QueryRecord {
    /// Creates a record for a statement about to be issued.
    pub fn new(query: impl Into<String>, database: impl Into<String>) -> Self {
        QueryRecord {
            query: query.into(),
            database: database.into(),
            id: Uuid::new_v4(),
            issued_at: Utc::now(),
        }
    }
}

/// Observer for statements issued through a facade.
///
/// Callbacks run on whichever task executes the statement. `on_query_sent`
/// fires before execution starts and `on_query_complete` strictly after it
/// finishes, on every execution path.
pub trait QueryListener: Send + Sync {
    /// Called when a statement is handed to the driver, before it runs.
    fn on_query_sent(&self, _query: &QueryRecord) {}

    /// Called after a statement has finished executing.
    fn on_query_complete(&self, _query: &QueryRecord) {}

    /// Called when a keyed lookup matched no rows.
    fn on_no_data_found(&self) {}

    /// Called when a keyed lookup produced a single result.
    fn on_single_result(&self, _result: &Value) {}

    /// Called when a lookup produced multiple results.
    fn on_multiple_results(&self, _results: &[Value]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;
    impl QueryListener for Silent {}

    #[test]
    fn test_record_construction() {
        let record = QueryRecord::new("SELECT * FROM `users` WHERE name = ?", "app");
        assert_eq!(record.query, "SELECT * FROM `users` WHERE name = ?");
        assert_eq!(record.database, "app");
    }

    #[test]
    fn test_record_ids_are_unique() {
        let a = QueryRecord::new("SELECT 1", "");
        let b = QueryRecord::new("SELECT 1", "");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_default_callbacks_are_no_ops() {
        let listener = Silent;
        let record = QueryRecord::new("SELECT 1", "app");
        listener.on_query_sent(&record);
        listener.on_query_complete(&record);
        listener.on_no_data_found();
        listener.on_single_result(&Value::Integer(1));
        listener.on_multiple_results(&[Value::Integer(1), Value::Integer(2)]);
    }
}
