//! Property-based tests for statement construction and identifier
//! validation
//!
//! These tests verify the statement-text contract through property-based
//! testing, ensuring that:
//! - Every valid identifier combination produces the documented templates
//! - The placeholder count always matches the field count on insert
//! - Identifiers outside the allow-list are always rejected

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use keysql::core::db::sql::{
        check_identifier, create_database, create_table, insert_into, select_by_key, update_by_key,
    };

    /// Generate identifiers from MySQL's unquoted-identifier class
    fn arb_identifier() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9_]{0,29}".prop_map(|s: String| s)
    }

    /// Generate characters that must never appear in an identifier
    fn arb_hostile_char() -> impl Strategy<Value = char> {
        prop_oneof![
            Just('`'),
            Just('\''),
            Just('"'),
            Just(';'),
            Just(' '),
            Just('-'),
            Just('('),
            Just(')'),
            Just('.'),
            Just('='),
        ]
    }

    proptest! {
        /// Valid identifiers always pass validation
        #[test]
        fn prop_valid_identifiers_are_accepted(name in arb_identifier()) {
            prop_assert!(check_identifier(&name).is_ok());
        }

        /// Injecting any out-of-class character anywhere is always rejected
        #[test]
        fn prop_hostile_characters_are_rejected(
            name in arb_identifier(),
            hostile in arb_hostile_char(),
            split in 0usize..30,
        ) {
            let split = split.min(name.len());
            let mut tainted = name.clone();
            tainted.insert(split, hostile);
            prop_assert!(check_identifier(&tainted).is_err(),
                        "identifier {:?} should have been rejected", tainted);
        }

        /// The keyed lookup template is stable for every identifier pair
        #[test]
        fn prop_select_shape(table in arb_identifier(), key_field in arb_identifier()) {
            let statement = select_by_key(&table, &key_field).unwrap();
            prop_assert_eq!(
                statement,
                format!("SELECT * FROM `{}` WHERE {} = ?", table, key_field)
            );
        }

        /// The update template never gains backticks around the table name
        #[test]
        fn prop_update_shape(
            table in arb_identifier(),
            set_field in arb_identifier(),
            key_field in arb_identifier(),
        ) {
            let statement = update_by_key(&table, &set_field, &key_field).unwrap();
            prop_assert_eq!(
                statement,
                format!("UPDATE {} SET {} = ? WHERE {} = ?", table, set_field, key_field)
            );
        }

        /// Insert always emits exactly one placeholder per field
        #[test]
        fn prop_insert_placeholder_count(
            table in arb_identifier(),
            fields in prop::collection::vec(arb_identifier(), 1..8),
        ) {
            let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
            let statement = insert_into(&table, &refs).unwrap();

            prop_assert_eq!(statement.matches('?').count(), fields.len());
            let insert_prefix = format!("INSERT INTO `{}` (", table);
            prop_assert!(statement.starts_with(&insert_prefix));
            prop_assert!(statement.contains(") VALUE ("));
            prop_assert!(statement.ends_with(')'));
        }

        /// DDL templates are stable for every identifier
        #[test]
        fn prop_ddl_shapes(name in arb_identifier()) {
            prop_assert_eq!(
                create_database(&name).unwrap(),
                format!("CREATE DATABASE IF NOT EXISTS `{}`", name)
            );
            prop_assert_eq!(
                create_table(&name, &["id int", "name varchar(64)"]).unwrap(),
                format!("CREATE TABLE IF NOT EXISTS `{}` (id int, name varchar(64))", name)
            );
        }
    }
}
