/// Database Module
///
/// This module provides the database functionality of keysql, organized
/// into focused submodules:
///
/// - **Connection Management** (`connection.rs`): credentials, the live
///   pool, and reconnect-on-switch semantics
/// - **Statement Text** (`sql.rs`): the byte-exact SQL templates and
///   identifier validation
/// - **Query Types** (`query.rs`): bindable statements, typed result
///   grids, and background submission handles
/// - **Values** (`value.rs`): the tagged parameter/result value type
/// - **Facade** (`facade.rs`): keyed exists/get/set/insert operations and
///   DDL over a connection holder
/// - **Listener** (`listener.rs`): the optional per-statement observer
///
/// ## Error Handling
///
/// All database operations use the standardized `KeysqlError` type for
/// consistent error propagation.
pub mod connection;
pub mod facade;
pub mod listener;
pub mod query;
pub mod sql;
pub mod value;

pub use connection::*;
pub use facade::*;
pub use listener::*;
pub use query::*;
pub use value::*;
