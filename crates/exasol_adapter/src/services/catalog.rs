//! Catalog introspection service.
//!
//! Queries Exasol system views to build the tree shown in the host's schema
//! browser: system tables, then user schemas with their tables, views and
//! columns. Every call re-runs the queries; nothing is cached.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::driver::{query_rows, value_as_string, DriverConnection, DriverError};
use crate::error::AdapterError;
use crate::models::catalog::{
    TYPE_DATABASE, TYPE_SCHEMA, TYPE_SCHEMAS, TYPE_SYSTEM, TYPE_TABLE, TYPE_VIEW,
};
use crate::models::{Catalog, CatalogItem, Row};

/// Introspection SQL.
///
/// Filter values are interpolated as quoted literals: the driver's prepared
/// statements do not handle string escaping in these WHERE clauses.
pub mod sql {
    use super::quote_literal;

    /// All user schemas.
    pub const SCHEMAS: &str = "SELECT SCHEMA_NAME FROM EXA_ALL_SCHEMAS ORDER BY SCHEMA_NAME;";

    /// All system catalog objects with their type and schema.
    pub const SYSTEM_OBJECTS: &str = "SELECT OBJECT_NAME, OBJECT_TYPE, SCHEMA_NAME FROM EXA_SYSCAT;";

    /// Tables of one schema.
    pub fn tables(schema: &str) -> String {
        format!(
            "SELECT TABLE_NAME FROM EXA_ALL_TABLES WHERE TABLE_SCHEMA={} ORDER BY TABLE_NAME;",
            quote_literal(schema)
        )
    }

    /// Views of one schema.
    pub fn views(schema: &str) -> String {
        format!(
            "SELECT VIEW_NAME FROM EXA_ALL_VIEWS WHERE VIEW_SCHEMA={} ORDER BY VIEW_NAME;",
            quote_literal(schema)
        )
    }

    /// Columns of one table or view, in declaration order.
    pub fn columns(schema: &str, relation: &str) -> String {
        format!(
            "SELECT COLUMN_NAME, COLUMN_TYPE FROM EXA_ALL_COLUMNS \
             WHERE COLUMN_SCHEMA={} AND COLUMN_TABLE={} ORDER BY COLUMN_ORDINAL_POSITION;",
            quote_literal(schema),
            quote_literal(relation)
        )
    }
}

/// Quote an identifier for Exasol SQL: `a"b` becomes `"a""b"`.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal for Exasol SQL: `it's` becomes `'it''s'`.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Dot-joined quoted identifier, e.g. `"S"."T"."C"`.
pub fn qualified_name(parts: &[&str]) -> String {
    parts.iter().map(|part| quote_identifier(part)).collect::<Vec<_>>().join(".")
}

/// Builds catalog trees for one live connection.
pub struct CatalogBuilder {
    connection: Arc<dyn DriverConnection>,
}

impl CatalogBuilder {
    /// Bind a builder to a live driver connection.
    pub fn new(connection: Arc<dyn DriverConnection>) -> Self {
        Self { connection }
    }

    /// Run every introspection query and assemble the tree.
    ///
    /// Driver errors are returned unwrapped as [`AdapterError::Driver`].
    pub fn build(&self) -> Result<Catalog, AdapterError> {
        let start = Instant::now();
        let mut run = Introspection { connection: self.connection.as_ref(), queries: 0 };

        let system = CatalogItem::new("/SYS", "", "System Tables", TYPE_SYSTEM)
            .with_children(run.system_tables()?);
        let user = CatalogItem::new("/User", "", "Schemas", TYPE_SCHEMAS).with_children(run.schemas()?);
        let root = CatalogItem::new("/", "", "Database", TYPE_DATABASE).with_children(vec![system, user]);

        let catalog = Catalog::new(vec![root]);
        tracing::debug!(
            nodes = catalog.len(),
            queries = run.queries,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Catalog built"
        );
        Ok(catalog)
    }
}

/// One catalog build; counts the queries it issues.
struct Introspection<'a> {
    connection: &'a dyn DriverConnection,
    queries: usize,
}

impl Introspection<'_> {
    fn rows(&mut self, sql: &str) -> Result<Vec<Row>, DriverError> {
        self.queries += 1;
        query_rows(self.connection, sql)
    }

    fn names(&mut self, sql: &str) -> Result<Vec<String>, DriverError> {
        Ok(self
            .rows(sql)?
            .iter()
            .filter_map(|row| row.first().map(value_as_string))
            .collect())
    }

    fn system_tables(&mut self) -> Result<Vec<CatalogItem>, DriverError> {
        let rows = self.rows(sql::SYSTEM_OBJECTS)?;
        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(rows.len());

        for row in &rows {
            let [name, object_type, schema] = match row.as_slice() {
                [name, object_type, schema, ..] => {
                    [value_as_string(name), value_as_string(object_type), value_as_string(schema)]
                }
                _ => continue,
            };

            let identifier = qualified_name(&[schema.as_str(), name.as_str()]);
            if !seen.insert(identifier.clone()) {
                tracing::debug!(object = %identifier, "Skipping duplicate system object");
                continue;
            }

            let type_label = if object_type.eq_ignore_ascii_case("TABLE") { TYPE_TABLE } else { TYPE_VIEW };
            items.push(CatalogItem::new(identifier.clone(), identifier, name, type_label));
        }

        Ok(items)
    }

    fn schemas(&mut self) -> Result<Vec<CatalogItem>, DriverError> {
        let schemas = self.names(sql::SCHEMAS)?;
        let mut items = Vec::with_capacity(schemas.len());

        for schema in schemas {
            let mut relations = self.relations(&schema, &sql::tables(&schema), TYPE_TABLE)?;
            relations.extend(self.relations(&schema, &sql::views(&schema), TYPE_VIEW)?);

            let identifier = quote_identifier(&schema);
            items.push(
                CatalogItem::new(identifier.clone(), identifier, schema, TYPE_SCHEMA).with_children(relations),
            );
        }

        Ok(items)
    }

    fn relations(&mut self, schema: &str, sql: &str, type_label: &str) -> Result<Vec<CatalogItem>, DriverError> {
        let names = self.names(sql)?;
        let mut items = Vec::with_capacity(names.len());

        for name in names {
            let identifier = qualified_name(&[schema, name.as_str()]);
            let columns = self.columns(schema, &name)?;
            items.push(CatalogItem::new(identifier.clone(), identifier, name, type_label).with_children(columns));
        }

        Ok(items)
    }

    fn columns(&mut self, schema: &str, relation: &str) -> Result<Vec<CatalogItem>, DriverError> {
        let rows = self.rows(&sql::columns(schema, relation))?;

        Ok(rows
            .iter()
            .filter_map(|row| match row.as_slice() {
                [name, column_type, ..] => {
                    let name = value_as_string(name);
                    let identifier = qualified_name(&[schema, relation, name.as_str()]);
                    Some(CatalogItem::new(identifier.clone(), identifier, name, value_as_string(column_type)))
                }
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Script, ScriptedDriver};
    use serde_json::json;

    fn builder(driver: &ScriptedDriver) -> CatalogBuilder {
        CatalogBuilder::new(Arc::from(driver.open()))
    }

    fn sample_driver() -> ScriptedDriver {
        ScriptedDriver::new()
            .with(
                sql::SYSTEM_OBJECTS,
                Script::rows(
                    &[("OBJECT_NAME", "VARCHAR"), ("OBJECT_TYPE", "VARCHAR"), ("SCHEMA_NAME", "VARCHAR")],
                    vec![
                        vec![json!("EXA_ALL_TABLES"), json!("VIEW"), json!("SYS")],
                        vec![json!("EXA_DBA_AUDIT_SQL"), json!("table"), json!("EXA_STATISTICS")],
                        vec![json!("EXA_ALL_TABLES"), json!("VIEW"), json!("SYS")],
                    ],
                ),
            )
            .with(sql::SCHEMAS, Script::names("SCHEMA_NAME", &["RETAIL"]))
            .with(sql::tables("RETAIL"), Script::names("TABLE_NAME", &["ORDERS"]))
            .with(sql::views("RETAIL"), Script::names("VIEW_NAME", &["BIG_ORDERS"]))
            .with(
                sql::columns("RETAIL", "ORDERS"),
                Script::rows(
                    &[("COLUMN_NAME", "VARCHAR"), ("COLUMN_TYPE", "VARCHAR")],
                    vec![vec![json!("ID"), json!("DECIMAL(18,0)")], vec![json!("NOTE"), json!("VARCHAR(200) UTF8")]],
                ),
            )
            .with(
                sql::columns("RETAIL", "BIG_ORDERS"),
                Script::rows(
                    &[("COLUMN_NAME", "VARCHAR"), ("COLUMN_TYPE", "VARCHAR")],
                    vec![vec![json!("ID"), json!("DECIMAL(18,0)")]],
                ),
            )
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote_identifier("ORDERS"), r#""ORDERS""#);
        assert_eq!(quote_identifier(r#"we"ird"#), r#""we""ird""#);
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
        assert_eq!(qualified_name(&["S", "T", "C"]), r#""S"."T"."C""#);
    }

    #[test]
    fn test_filter_literals_are_escaped() {
        let sql = sql::columns("MY'SCHEMA", "T");
        assert!(sql.contains("COLUMN_SCHEMA='MY''SCHEMA'"));
        assert!(sql.contains("COLUMN_TABLE='T'"));
    }

    #[test]
    fn test_build_tree_shape() {
        let driver = sample_driver();
        let catalog = builder(&driver).build().unwrap();

        assert_eq!(catalog.items.len(), 1);
        let root = &catalog.items[0];
        assert_eq!((root.qualified_identifier.as_str(), root.type_label.as_str()), ("/", "DB"));
        assert_eq!(root.children.len(), 2);

        let system = &root.children[0];
        assert_eq!(system.qualified_identifier, "/SYS");
        assert_eq!(system.query_name, "");
        assert_eq!(system.children.len(), 2);
        assert_eq!(system.children[0].type_label, "v");
        assert_eq!(system.children[1].type_label, "t");
        assert_eq!(system.children[1].query_name, r#""EXA_STATISTICS"."EXA_DBA_AUDIT_SQL""#);

        let schemas = &root.children[1];
        assert_eq!(schemas.qualified_identifier, "/User");
        let retail = &schemas.children[0];
        assert_eq!(retail.qualified_identifier, r#""RETAIL""#);
        assert_eq!(retail.type_label, "s");

        let labels: Vec<(&str, &str)> =
            retail.children.iter().map(|i| (i.label.as_str(), i.type_label.as_str())).collect();
        assert_eq!(labels, vec![("ORDERS", "t"), ("BIG_ORDERS", "v")]);

        let id = &retail.children[0].children[0];
        assert_eq!(id.qualified_identifier, r#""RETAIL"."ORDERS"."ID""#);
        assert_eq!(id.query_name, id.qualified_identifier);
        assert_eq!(id.type_label, "DECIMAL(18,0)");
        assert!(id.is_leaf());
    }

    #[test]
    fn test_build_issues_expected_queries_and_releases_cursors() {
        let driver = sample_driver();
        builder(&driver).build().unwrap();

        // system objects + schemas + (tables + views) per schema + columns per relation
        assert_eq!(driver.executed().len(), 1 + 1 + 2 + 2);
        assert_eq!(driver.open_cursors(), 0);
    }

    #[test]
    fn test_build_is_not_cached() {
        let driver = sample_driver();
        let builder = builder(&driver);
        builder.build().unwrap();
        builder.build().unwrap();

        assert_eq!(driver.executions_of(sql::SCHEMAS), 2);
    }

    #[test]
    fn test_empty_database_keeps_both_groups() {
        let driver = ScriptedDriver::new()
            .with(sql::SYSTEM_OBJECTS, Script::names("OBJECT_NAME", &[]))
            .with(sql::SCHEMAS, Script::names("SCHEMA_NAME", &[]));

        let catalog = builder(&driver).build().unwrap();
        let root = &catalog.items[0];
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].label, "System Tables");
        assert_eq!(root.children[1].label, "Schemas");
        assert!(root.children.iter().all(CatalogItem::is_leaf));
    }

    #[test]
    fn test_driver_error_propagates_raw() {
        let driver = ScriptedDriver::new()
            .with(sql::SYSTEM_OBJECTS, Script::names("OBJECT_NAME", &[]))
            .with(sql::SCHEMAS, Script::error("insufficient privileges"));

        let err = builder(&driver).build().unwrap_err();
        assert!(matches!(err, AdapterError::Driver(_)));
        assert_eq!(err.to_string(), "insufficient privileges");
        assert_eq!(driver.open_cursors(), 0);
    }
}
