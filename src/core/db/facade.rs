/// Facade Module
///
/// This module provides the query-execution facade: keyed lookups,
/// updates, inserts and DDL over a connection holder, with optional
/// listener notification. Statement text is built by `sql`, parameters are
/// bound positionally as tagged values, and mutating operations are
/// submitted to the background task pool.
///
/// ## Concurrency
///
/// `execute_query` and the lookups built on it are synchronous by
/// contract: they run the statement and return its rows. `execute`,
/// `execute_update`, `set` and `insert` submit in the background and hand
/// back a [`PendingQuery`] the caller may await, abort or drop.
///
/// ## Listener ordering
///
/// On every path, `on_query_sent` fires before the statement executes and
/// `on_query_complete` strictly after it finishes.
use crate::core::db::connection::DbConnection;
use crate::core::db::listener::{QueryListener, QueryRecord};
use crate::core::db::query::{PendingQuery, QueryResult, SqlQuery};
use crate::core::db::sql;
use crate::core::db::value::{bind_value, Value};
use crate::core::{KeysqlError, Result};
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::Executor;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error};
use uuid::Uuid;

/// Keyed CRUD facade over one connection holder.
pub struct DbFacade {
    connection: Arc<DbConnection>,
    listener: RwLock<Option<Arc<dyn QueryListener>>>,
}

impl DbFacade {
    /// Creates a facade over the given connection holder.
    pub fn new(connection: Arc<DbConnection>) -> Self {
        DbFacade {
            connection,
            listener: RwLock::new(None),
        }
    }

    /// The connection holder this facade issues statements through.
    pub fn connection(&self) -> &Arc<DbConnection> {
        &self.connection
    }

    /// Attaches a listener; a previously attached listener is replaced.
    pub fn set_listener(&self, listener: Arc<dyn QueryListener>) {
        *self
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(listener);
    }

    /// Detaches the current listener, if any.
    pub fn clear_listener(&self) {
        *self
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The currently attached listener.
    pub fn listener(&self) -> Option<Arc<dyn QueryListener>> {
        self.listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn notify(&self, f: impl FnOnce(&dyn QueryListener)) {
        if let Some(listener) = self.listener() {
            f(listener.as_ref());
        }
    }

    fn record_for(&self, statement: &str) -> QueryRecord {
        QueryRecord::new(statement, self.connection.database())
    }

    /// Starts a parameter-bindable statement from raw SQL text.
    ///
    /// The driver prepares and caches the statement internally when it is
    /// first executed; bind values with [`SqlQuery::bind`].
    pub fn prepare(&self, statement: impl Into<String>) -> SqlQuery {
        SqlQuery::new(statement)
    }

    /// Executes a plain, non-parameterized statement synchronously.
    ///
    /// Used for DDL and other text-only statements.
    ///
    /// # Returns
    ///
    /// The number of rows the statement affected.
    ///
    /// # Errors
    ///
    /// `ConnectionNotFound` without a live pool; driver errors are logged
    /// and returned.
    pub async fn execute_raw(&self, statement: &str) -> Result<u64> {
        let pool = self.connection.pool()?;
        let record = self.record_for(statement);
        debug!(query = %record.query, id = %record.id, "executing raw statement");

        self.notify(|l| l.on_query_sent(&record));
        match pool.execute(statement).await {
            Ok(done) => {
                self.notify(|l| l.on_query_complete(&record));
                Ok(done.rows_affected())
            }
            Err(e) => {
                error!(query = %record.query, error = %e, "raw statement failed");
                Err(e.into())
            }
        }
    }

    /// Submits a statement to the background task pool.
    ///
    /// The returned handle resolves to the affected row count; dropping it
    /// turns the submission into fire-and-forget without cancelling it.
    ///
    /// # Errors
    ///
    /// `ConnectionNotFound` is detected before the task is spawned.
    /// Execution errors inside the task are logged and surface through
    /// [`PendingQuery::join`].
    pub fn execute(&self, query: SqlQuery) -> Result<PendingQuery> {
        let pool = self.connection.pool()?;
        let record = QueryRecord::new(query.statement.clone(), self.connection.database());
        let listener = self.listener();
        let task_record = record.clone();
        debug!(query = %record.query, id = %record.id, "submitting background statement");

        let handle = tokio::spawn(async move {
            if let Some(listener) = &listener {
                listener.on_query_sent(&task_record);
            }
            match run_statement(&pool, &query).await {
                Ok(rows_affected) => {
                    if let Some(listener) = &listener {
                        listener.on_query_complete(&task_record);
                    }
                    Ok(rows_affected)
                }
                Err(e) => {
                    error!(query = %task_record.query, error = %e, "background statement failed");
                    Err(e)
                }
            }
        });
        Ok(PendingQuery::new(record, handle))
    }

    /// Submits an update statement to the background task pool.
    ///
    /// The driver makes no distinction between general execution and
    /// updates; this delegates to [`DbFacade::execute`] and exists for
    /// call-site clarity.
    pub fn execute_update(&self, query: SqlQuery) -> Result<PendingQuery> {
        self.execute(query)
    }

    /// Runs a parameterized query and returns its rows.
    ///
    /// Synchronous by contract: the returned future completes when the
    /// rows are in hand.
    pub async fn execute_query(&self, query: &SqlQuery) -> Result<QueryResult> {
        let pool = self.connection.pool()?;
        let record = self.record_for(&query.statement);
        debug!(query = %record.query, id = %record.id, "executing query");

        self.notify(|l| l.on_query_sent(&record));
        let rows = fetch_rows(&pool, query).await.map_err(|e| {
            error!(query = %record.query, error = %e, "query failed");
            e
        })?;
        let result = QueryResult::from_rows(&rows);
        self.notify(|l| l.on_query_complete(&record));
        Ok(result)
    }

    /// Returns whether at least one row of `table` has `field = value`.
    pub async fn exists(&self, table: &str, field: &str, value: impl Into<Value>) -> Result<bool> {
        let statement = sql::select_by_key(table, field)?;
        let result = self
            .execute_query(&SqlQuery::new(statement).bind(value))
            .await?;
        Ok(!result.is_empty())
    }

    /// Returns whether a string value exists in the given field.
    pub async fn exists_string(&self, table: &str, field: &str, lookup: &str) -> Result<bool> {
        self.exists(table, field, lookup).await
    }

    /// Returns whether an integer value exists in the given field.
    pub async fn exists_int(&self, table: &str, field: &str, lookup: i32) -> Result<bool> {
        self.exists(table, field, lookup).await
    }

    /// Returns whether a long value exists in the given field.
    pub async fn exists_long(&self, table: &str, field: &str, lookup: i64) -> Result<bool> {
        self.exists(table, field, lookup).await
    }

    /// Returns whether a UUID exists in the given field.
    pub async fn exists_uuid(&self, table: &str, field: &str, lookup: Uuid) -> Result<bool> {
        self.exists(table, field, lookup).await
    }

    /// Returns whether a binary value exists in the given field.
    pub async fn exists_blob(&self, table: &str, field: &str, lookup: &[u8]) -> Result<bool> {
        self.exists(table, field, lookup).await
    }

    /// Looks up one row by key and extracts the named column.
    ///
    /// Builds ``SELECT * FROM `table` WHERE key_field = ?``, binds the
    /// key, and returns `get_field` of the first matching row as a tagged
    /// value. Use the typed variants when the column type is known.
    ///
    /// # Arguments
    ///
    /// * `table` - The table name.
    /// * `get_field` - The column to extract. Example: to read how many
    ///   coins a user has, `get_field` is `"coins"`.
    /// * `key_field` - The column to look up by. Example: looking up a
    ///   user by name, `key_field` is `"name"`.
    /// * `key` - The key value itself.
    ///
    /// # Errors
    ///
    /// `NoDataFound` when no row matches (the listener's
    /// `on_no_data_found` fires first); `Query` when the extracted column
    /// does not exist.
    pub async fn get(
        &self,
        table: &str,
        get_field: &str,
        key_field: &str,
        key: impl Into<Value>,
    ) -> Result<Value> {
        let statement = sql::select_by_key(table, key_field)?;
        let key = key.into();
        let result = self
            .execute_query(&SqlQuery::new(statement).bind(key.clone()))
            .await?;

        if result.is_empty() {
            self.notify(|l| l.on_no_data_found());
            return Err(KeysqlError::NoDataFound(format!(
                "no row in `{}` where {} = {}",
                table, key_field, key
            )));
        }

        let value = result.value(0, get_field).cloned().ok_or_else(|| {
            KeysqlError::Query(format!(
                "column `{}` is not present in `{}`",
                get_field, table
            ))
        })?;
        self.notify(|l| l.on_single_result(&value));
        Ok(value)
    }

    /// Looks up every matching row and extracts the named column from each.
    ///
    /// Fires `on_multiple_results` with whatever matched, including an
    /// empty set.
    pub async fn get_all(
        &self,
        table: &str,
        get_field: &str,
        key_field: &str,
        key: impl Into<Value>,
    ) -> Result<Vec<Value>> {
        let statement = sql::select_by_key(table, key_field)?;
        let result = self
            .execute_query(&SqlQuery::new(statement).bind(key))
            .await?;

        if result.is_empty() {
            self.notify(|l| l.on_multiple_results(&[]));
            return Ok(Vec::new());
        }

        let idx = result.column_index(get_field).ok_or_else(|| {
            KeysqlError::Query(format!(
                "column `{}` is not present in `{}`",
                get_field, table
            ))
        })?;
        let values: Vec<Value> = result
            .rows
            .iter()
            .filter_map(|row| row.get(idx).cloned())
            .collect();
        self.notify(|l| l.on_multiple_results(&values));
        Ok(values)
    }

    /// Looks up a string column by key.
    pub async fn get_string(
        &self,
        table: &str,
        get_field: &str,
        key_field: &str,
        key: impl Into<Value>,
    ) -> Result<String> {
        let value = self.get(table, get_field, key_field, key).await?;
        value
            .as_text()
            .map(str::to_string)
            .ok_or_else(|| coercion_error(get_field, "text", &value))
    }

    /// Looks up an integer column by key.
    pub async fn get_int(
        &self,
        table: &str,
        get_field: &str,
        key_field: &str,
        key: impl Into<Value>,
    ) -> Result<i32> {
        let value = self.get(table, get_field, key_field, key).await?;
        value
            .as_int()
            .ok_or_else(|| coercion_error(get_field, "int", &value))
    }

    /// Looks up a boolean column by key.
    pub async fn get_boolean(
        &self,
        table: &str,
        get_field: &str,
        key_field: &str,
        key: impl Into<Value>,
    ) -> Result<bool> {
        let value = self.get(table, get_field, key_field, key).await?;
        value
            .as_boolean()
            .ok_or_else(|| coercion_error(get_field, "boolean", &value))
    }

    /// Looks up a long column by key.
    pub async fn get_long(
        &self,
        table: &str,
        get_field: &str,
        key_field: &str,
        key: impl Into<Value>,
    ) -> Result<i64> {
        let value = self.get(table, get_field, key_field, key).await?;
        value
            .as_long()
            .ok_or_else(|| coercion_error(get_field, "long", &value))
    }

    /// Looks up a binary column by key.
    pub async fn get_blob(
        &self,
        table: &str,
        get_field: &str,
        key_field: &str,
        key: impl Into<Value>,
    ) -> Result<Vec<u8>> {
        let value = self.get(table, get_field, key_field, key).await?;
        value
            .as_blob()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| coercion_error(get_field, "blob", &value))
    }

    /// Looks up a UUID column by key.
    pub async fn get_uuid(
        &self,
        table: &str,
        get_field: &str,
        key_field: &str,
        key: impl Into<Value>,
    ) -> Result<Uuid> {
        let value = self.get(table, get_field, key_field, key).await?;
        value
            .as_uuid()
            .ok_or_else(|| coercion_error(get_field, "uuid", &value))
    }

    /// Updates one column of the rows matching a key, in the background.
    ///
    /// Builds `UPDATE table SET set_field = ? WHERE key_field = ?` and
    /// binds the new value first and the key second. Await the returned
    /// handle to synchronize with the update; a following `get` on the
    /// same key then observes the new value.
    pub fn set(
        &self,
        table: &str,
        set_field: &str,
        key_field: &str,
        value: impl Into<Value>,
        key: impl Into<Value>,
    ) -> Result<PendingQuery> {
        let statement = sql::update_by_key(table, set_field, key_field)?;
        self.execute_update(SqlQuery::new(statement).bind(value).bind(key))
    }

    /// Sets a string column by key.
    pub fn set_string(
        &self,
        table: &str,
        set_field: &str,
        key_field: &str,
        value: &str,
        key: impl Into<Value>,
    ) -> Result<PendingQuery> {
        self.set(table, set_field, key_field, value, key)
    }

    /// Sets an integer column by key.
    pub fn set_int(
        &self,
        table: &str,
        set_field: &str,
        key_field: &str,
        value: i32,
        key: impl Into<Value>,
    ) -> Result<PendingQuery> {
        self.set(table, set_field, key_field, value, key)
    }

    /// Sets a boolean column by key.
    pub fn set_boolean(
        &self,
        table: &str,
        set_field: &str,
        key_field: &str,
        value: bool,
        key: impl Into<Value>,
    ) -> Result<PendingQuery> {
        self.set(table, set_field, key_field, value, key)
    }

    /// Sets a long column by key.
    pub fn set_long(
        &self,
        table: &str,
        set_field: &str,
        key_field: &str,
        value: i64,
        key: impl Into<Value>,
    ) -> Result<PendingQuery> {
        self.set(table, set_field, key_field, value, key)
    }

    /// Sets a binary column by key.
    pub fn set_blob(
        &self,
        table: &str,
        set_field: &str,
        key_field: &str,
        value: &[u8],
        key: impl Into<Value>,
    ) -> Result<PendingQuery> {
        self.set(table, set_field, key_field, value, key)
    }

    /// Inserts one row, in the background.
    ///
    /// # Errors
    ///
    /// `DifferentArgLength` when `fields` and `values` disagree in length,
    /// raised before the connection is touched.
    pub fn insert(&self, table: &str, fields: &[&str], values: Vec<Value>) -> Result<PendingQuery> {
        if fields.len() != values.len() {
            return Err(KeysqlError::DifferentArgLength {
                fields: fields.len(),
                values: values.len(),
            });
        }
        let statement = sql::insert_into(table, fields)?;
        let mut query = SqlQuery::new(statement);
        for value in values {
            query = query.bind(value);
        }
        self.execute(query)
    }

    /// Creates a database, which requires the root context.
    ///
    /// # Errors
    ///
    /// `DatabaseCreation` when a database is already selected; no SQL is
    /// issued in that case.
    pub async fn create_database(&self, database: &str) -> Result<()> {
        if !self.connection.is_root() {
            return Err(KeysqlError::DatabaseCreation(format!(
                "cannot create `{}`: the connection already points at `{}`; switch to root first",
                database,
                self.connection.database()
            )));
        }
        let statement = sql::create_database(database)?;
        self.execute_raw(&statement).await?;
        Ok(())
    }

    /// Creates a table from full column definitions, synchronously.
    ///
    /// Column definitions carry name and SQL type, for example
    /// `["uuid varchar(256)", "level int(255)"]`.
    pub async fn create_table(&self, table: &str, columns: &[&str]) -> Result<()> {
        let statement = sql::create_table(table, columns)?;
        self.execute_raw(&statement).await?;
        Ok(())
    }
}

fn coercion_error(field: &str, expected: &str, value: &Value) -> KeysqlError {
    KeysqlError::Query(format!(
        "column `{}` does not hold a {} value (got {:?})",
        field, expected, value
    ))
}

fn build_query<'q>(query: &'q SqlQuery) -> Query<'q, MySql, MySqlArguments> {
    let mut q = sqlx::query(&query.statement);
    for value in &query.params {
        q = bind_value(q, value);
    }
    q
}

async fn run_statement(pool: &MySqlPool, query: &SqlQuery) -> Result<u64> {
    let done = build_query(query).execute(pool).await?;
    Ok(done.rows_affected())
}

async fn fetch_rows(pool: &MySqlPool, query: &SqlQuery) -> Result<Vec<MySqlRow>> {
    build_query(query).fetch_all(pool).await.map_err(Into::into)
}
