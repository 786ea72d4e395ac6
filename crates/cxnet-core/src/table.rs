//! Node/edge attribute tables and network-level attributes.

use crate::cx2::DeclaredAttribute;
use crate::value::{AttributeType, AttributeValue, is_valid_data_type};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{Map, Value};

pub type Row = IndexMap<String, AttributeValue>;

/// Where a column's type came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnOrigin {
    #[default]
    Declared,
    /// Inferred from the values seen so far; widens when a later value does not fit.
    Inferred,
    /// Inferred, but the values share no common type. Exported without a declaration.
    Mixed,
}

impl ColumnOrigin {
    fn is_declared(&self) -> bool {
        *self == ColumnOrigin::Declared
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: AttributeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<AttributeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "ColumnOrigin::is_declared")]
    pub origin: ColumnOrigin,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            data_type,
            default_value: None,
            alias: None,
            origin: ColumnOrigin::Declared,
        }
    }

    pub fn inferred(name: impl Into<String>, data_type: AttributeType) -> Self {
        Self {
            origin: ColumnOrigin::Inferred,
            ..Self::new(name, data_type)
        }
    }

    /// Folds a value that does not fit an inferred column into its type. Returns `true` when the
    /// type changed and existing cells need coercing again.
    fn absorb(&mut self, value: &AttributeValue) -> bool {
        if self.origin != ColumnOrigin::Inferred {
            return false;
        }
        match self.data_type.widen(value.infer_type()) {
            Some(widened) => {
                let changed = widened != self.data_type;
                self.data_type = widened;
                changed
            }
            None => {
                tracing::debug!(column = %self.name, "undeclared attribute has mixed value types");
                self.origin = ColumnOrigin::Mixed;
                self.data_type = AttributeType::String;
                false
            }
        }
    }

    fn from_declaration(name: &str, decl: &DeclaredAttribute) -> Self {
        let data_type = match decl.d.as_deref() {
            None => AttributeType::String,
            Some(tag) => AttributeType::parse(tag).unwrap_or_else(|| {
                tracing::warn!(attribute = name, tag, "unknown attribute type; using string");
                AttributeType::String
            }),
        };
        let default_value = decl
            .v
            .as_ref()
            .filter(|v| is_valid_data_type(v, data_type))
            .and_then(AttributeValue::from_json)
            .map(|v| v.coerce(data_type));
        Self {
            name: name.to_string(),
            data_type,
            default_value,
            alias: decl.a.clone(),
            origin: ColumnOrigin::Declared,
        }
    }

    pub fn to_declaration(&self) -> DeclaredAttribute {
        DeclaredAttribute {
            d: Some(self.data_type.as_str().to_string()),
            v: self.default_value.as_ref().map(AttributeValue::to_json),
            // Rows are always exported under full names.
            a: None,
        }
    }
}

fn columns_from_declarations(decls: &IndexMap<String, DeclaredAttribute>) -> IndexMap<String, Column> {
    decls
        .iter()
        .map(|(name, decl)| (name.clone(), Column::from_declaration(name, decl)))
        .collect()
}

/// What ingesting one element's values produced.
#[derive(Default)]
struct Ingested {
    row: Row,
    /// Cells whose value does not conform to a declared column type.
    suspect: Vec<String>,
    /// Inferred columns whose type widened; earlier rows need coercing again.
    widened: Vec<String>,
}

/// Resolves alias keys, coerces declared values, and adds columns for undeclared attributes.
fn ingest_values(
    columns: &mut IndexMap<String, Column>,
    aliases: &IndexMap<String, String>,
    values: &Map<String, Value>,
) -> Ingested {
    let mut out = Ingested::default();
    for (key, raw) in values {
        let name = aliases.get(key).unwrap_or(key);
        let Some(value) = AttributeValue::from_json(raw) else {
            continue;
        };
        match columns.get_mut(name) {
            Some(column) if column.origin == ColumnOrigin::Mixed => {
                out.row.insert(name.clone(), value);
            }
            Some(column) => {
                if !is_valid_data_type(raw, column.data_type) {
                    match column.origin {
                        ColumnOrigin::Declared => out.suspect.push(name.clone()),
                        _ => {
                            if column.absorb(&value) {
                                out.widened.push(name.clone());
                            }
                        }
                    }
                }
                out.row.insert(name.clone(), value.coerce(column.data_type));
            }
            None => {
                columns.insert(name.clone(), Column::inferred(name.clone(), value.infer_type()));
                out.row.insert(name.clone(), value);
            }
        }
    }
    for column in columns.values() {
        if let Some(default) = &column.default_value {
            out.row.entry(column.name.clone()).or_insert_with(|| default.clone());
        }
    }
    out
}

fn declarations_of(columns: &IndexMap<String, Column>) -> IndexMap<String, DeclaredAttribute> {
    columns
        .iter()
        .filter(|(_, c)| c.origin != ColumnOrigin::Mixed)
        .map(|(name, c)| (name.clone(), c.to_declaration()))
        .collect()
}

fn alias_lookup(columns: &IndexMap<String, Column>) -> IndexMap<String, String> {
    columns
        .values()
        .filter_map(|c| c.alias.clone().map(|a| (a, c.name.clone())))
        .collect()
}

fn row_to_json(row: &Row) -> Map<String, Value> {
    row.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SuspectCell {
    pub row: String,
    pub column: String,
}

/// A node or edge attribute table. Rows are keyed by internal element id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub network_id: String,
    pub columns: IndexMap<String, Column>,
    pub rows: IndexMap<String, Row>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub suspect: IndexSet<SuspectCell>,
}

impl Table {
    pub fn new(network_id: impl Into<String>) -> Self {
        Self {
            network_id: network_id.into(),
            ..Default::default()
        }
    }

    pub fn from_declarations(
        network_id: impl Into<String>,
        decls: &IndexMap<String, DeclaredAttribute>,
    ) -> Self {
        Self {
            network_id: network_id.into(),
            columns: columns_from_declarations(decls),
            ..Default::default()
        }
    }

    /// Inserts the row for one element from its CX2 `v` map.
    ///
    /// Alias keys resolve to full column names, declared defaults fill missing cells, and values
    /// that violate their column type are kept but recorded as suspect.
    pub fn insert_cx_row(&mut self, element_id: &str, values: Option<&Map<String, Value>>) {
        let aliases = alias_lookup(&self.columns);
        let empty = Map::new();
        let Ingested { row, suspect, widened } =
            ingest_values(&mut self.columns, &aliases, values.unwrap_or(&empty));
        for column in widened {
            let Some(data_type) = self.columns.get(&column).map(|c| c.data_type) else {
                continue;
            };
            for cells in self.rows.values_mut() {
                if let Some(cell) = cells.get_mut(&column) {
                    *cell = cell.clone().coerce(data_type);
                }
            }
        }
        for column in suspect {
            tracing::warn!(element = element_id, column = %column, "attribute value does not match declared type");
            self.suspect.insert(SuspectCell {
                row: element_id.to_string(),
                column,
            });
        }
        self.rows.insert(element_id.to_string(), row);
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.insert(column.name.clone(), column);
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn row(&self, element_id: &str) -> Option<&Row> {
        self.rows.get(element_id)
    }

    pub fn get(&self, element_id: &str, column: &str) -> Option<&AttributeValue> {
        self.rows.get(element_id)?.get(column)
    }

    /// Sets one cell, creating the row and an inferred column when needed.
    pub fn set_value(&mut self, element_id: &str, column: &str, value: AttributeValue) {
        let value = match self.columns.get(column) {
            Some(c) => value.coerce(c.data_type),
            None => {
                self.add_column(Column::inferred(column, value.infer_type()));
                value
            }
        };
        self.suspect.shift_remove(&SuspectCell {
            row: element_id.to_string(),
            column: column.to_string(),
        });
        self.rows
            .entry(element_id.to_string())
            .or_default()
            .insert(column.to_string(), value);
    }

    pub fn delete_rows(&mut self, element_ids: &[String]) {
        for id in element_ids {
            self.rows.shift_remove(id);
        }
        self.suspect.retain(|cell| !element_ids.contains(&cell.row));
    }

    pub fn is_suspect(&self, element_id: &str, column: &str) -> bool {
        self.suspect.iter().any(|c| c.row == element_id && c.column == column)
    }

    /// Declarations for export. Mixed-type columns stay undeclared.
    pub fn declarations(&self) -> IndexMap<String, DeclaredAttribute> {
        declarations_of(&self.columns)
    }

    /// The CX2 `v` map for one element, or `None` when the row is empty or absent.
    pub fn row_to_cx(&self, element_id: &str) -> Option<Map<String, Value>> {
        self.rows
            .get(element_id)
            .filter(|r| !r.is_empty())
            .map(row_to_json)
    }
}

/// Network-scoped attributes: one value per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkAttributes {
    pub columns: IndexMap<String, Column>,
    pub values: Row,
}

impl NetworkAttributes {
    pub fn from_cx2(decls: &IndexMap<String, DeclaredAttribute>, values: &Map<String, Value>) -> Self {
        let mut columns = columns_from_declarations(decls);
        // Network scope carries no aliases or defaults.
        for column in columns.values_mut() {
            column.alias = None;
            column.default_value = None;
        }
        let Ingested { row: values, suspect, .. } = ingest_values(&mut columns, &IndexMap::new(), values);
        for column in suspect {
            tracing::warn!(column = %column, "network attribute does not match declared type");
        }
        Self { columns, values }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(AttributeValue::as_str)
    }

    pub fn declarations(&self) -> IndexMap<String, DeclaredAttribute> {
        declarations_of(&self.columns)
    }

    pub fn to_cx(&self) -> Map<String, Value> {
        row_to_json(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decls(value: Value) -> IndexMap<String, DeclaredAttribute> {
        serde_json::from_value(value).unwrap()
    }

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn resolves_aliases_and_materializes_defaults() {
        let mut table = Table::from_declarations(
            "net",
            &decls(json!({
                "name": {"d": "string", "a": "n"},
                "weight": {"d": "double", "v": 1.5},
            })),
        );
        table.insert_cx_row("1", Some(&obj(json!({"n": "A"}))));
        table.insert_cx_row("2", Some(&obj(json!({"name": "B", "weight": 3}))));

        assert_eq!(table.get("1", "name"), Some(&AttributeValue::String("A".into())));
        assert_eq!(table.get("1", "weight"), Some(&AttributeValue::Double(1.5)));
        assert_eq!(table.get("2", "weight"), Some(&AttributeValue::Double(3.0)));
        assert!(table.suspect.is_empty());
    }

    #[test]
    fn type_violations_mark_suspect_cells() {
        let mut table = Table::from_declarations("net", &decls(json!({"degree": {"d": "integer"}})));
        table.insert_cx_row("1", Some(&obj(json!({"degree": "many"}))));
        assert!(table.is_suspect("1", "degree"));

        table.set_value("1", "degree", AttributeValue::Integer(4));
        assert!(!table.is_suspect("1", "degree"));
    }

    #[test]
    fn undeclared_attributes_get_inferred_columns() {
        let mut table = Table::new("net");
        table.insert_cx_row("1", Some(&obj(json!({"tags": ["a", "b"], "score": 0.5, "gone": null}))));
        assert_eq!(table.column("tags").unwrap().data_type, AttributeType::ListOfString);
        assert_eq!(table.column("score").unwrap().data_type, AttributeType::Double);
        assert!(table.column("gone").is_none());
        assert_eq!(table.row_to_cx("1").unwrap().len(), 2);
    }

    #[test]
    fn inferred_columns_widen_instead_of_marking_cells() {
        let mut table = Table::new("net");
        table.insert_cx_row("1", Some(&obj(json!({"score": 1, "label": 7}))));
        table.insert_cx_row("2", Some(&obj(json!({"score": 1.5, "label": "x"}))));

        assert!(table.suspect.is_empty());
        assert_eq!(table.column("score").unwrap().data_type, AttributeType::Double);
        assert_eq!(table.get("1", "score"), Some(&AttributeValue::Double(1.0)));
        assert_eq!(table.column("label").unwrap().origin, ColumnOrigin::Mixed);
        assert_eq!(table.get("1", "label"), Some(&AttributeValue::Integer(7)));
        assert_eq!(table.get("2", "label"), Some(&AttributeValue::String("x".into())));

        let decls = table.declarations();
        assert_eq!(decls["score"].d.as_deref(), Some("double"));
        assert!(!decls.contains_key("label"));
    }

    #[test]
    fn deleting_rows_drops_suspect_cells() {
        let mut table = Table::from_declarations("net", &decls(json!({"x": {"d": "boolean"}})));
        table.insert_cx_row("1", Some(&obj(json!({"x": 1}))));
        table.delete_rows(&["1".to_string()]);
        assert!(table.row("1").is_none());
        assert!(table.suspect.is_empty());
    }

    #[test]
    fn network_attributes_ignore_alias_and_default() {
        let attrs = NetworkAttributes::from_cx2(
            &decls(json!({"name": {"d": "string", "a": "n", "v": "x"}})),
            &obj(json!({"name": "My network", "version": "1.0"})),
        );
        assert_eq!(attrs.name(), Some("My network"));
        assert_eq!(attrs.columns["name"].alias, None);
        assert_eq!(attrs.declarations()["version"].d.as_deref(), Some("string"));
    }
}
