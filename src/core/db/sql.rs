/// Statement Text Module
///
/// This module builds the SQL text for every keyed operation. Identifiers
/// (table and column names) are interpolated into the statement text while
/// values are always bound as positional parameters; interpolated
/// identifiers must pass allow-list validation first.
///
/// The produced text is part of the crate's compatibility contract and is
/// matched byte-for-byte by tests: the `UPDATE` path carries no backticks
/// around the table name and `INSERT` uses the singular `VALUE` keyword.
use crate::core::{KeysqlError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// MySQL's unquoted-identifier character class.
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_$]+$").unwrap());

/// Validates a table or column name against the identifier allow-list.
///
/// # Errors
///
/// Returns `KeysqlError::Identifier` when the name is empty or contains
/// any character outside `[A-Za-z0-9_$]`.
pub fn check_identifier(name: &str) -> Result<&str> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(KeysqlError::Identifier(name.to_string()))
    }
}

/// Builds the keyed lookup statement shared by `exists` and `get`.
pub fn select_by_key(table: &str, key_field: &str) -> Result<String> {
    Ok(format!(
        "SELECT * FROM `{}` WHERE {} = ?",
        check_identifier(table)?,
        check_identifier(key_field)?
    ))
}

/// Builds the keyed update statement used by `set`.
///
/// The table name is intentionally left unquoted on this path.
pub fn update_by_key(table: &str, set_field: &str, key_field: &str) -> Result<String> {
    Ok(format!(
        "UPDATE {} SET {} = ? WHERE {} = ?",
        check_identifier(table)?,
        check_identifier(set_field)?,
        check_identifier(key_field)?
    ))
}

/// Builds the parameterized insert statement, one placeholder per field.
pub fn insert_into(table: &str, fields: &[&str]) -> Result<String> {
    let mut names = Vec::with_capacity(fields.len());
    for field in fields {
        names.push(check_identifier(field)?);
    }
    let placeholders = vec!["?"; fields.len()];
    Ok(format!(
        "INSERT INTO `{}` ({}) VALUE ({})",
        check_identifier(table)?,
        names.join(", "),
        placeholders.join(", ")
    ))
}

/// Builds the database creation statement.
pub fn create_database(name: &str) -> Result<String> {
    Ok(format!(
        "CREATE DATABASE IF NOT EXISTS `{}`",
        check_identifier(name)?
    ))
}

/// Builds the table creation statement.
///
/// Column definitions are full `NAME TYPE ...` fragments and are joined
/// verbatim; only the table name is validated.
pub fn create_table(name: &str, columns: &[&str]) -> Result<String> {
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS `{}` ({})",
        check_identifier(name)?,
        columns.join(", ")
    ))
}
