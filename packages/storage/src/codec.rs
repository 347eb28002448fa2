// ABOUTME: Converts between stored content rows and their JSON wire shapes
// ABOUTME: Decodes submitted payloads column by column and encodes rows for responses

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{StorageError, StorageResult};
use crate::schema::{ColumnKind, TableSchema};

/// Declared column values keyed by column name, in declaration order
pub type RowValues = Map<String, Value>;

/// A content row as read back from storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub id: String,
    pub project_id: String,
    /// Flattened so named resources serialize as `{id, project_id, <columns…>}`
    #[serde(flatten)]
    pub values: RowValues,
}

impl StoredRow {
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.values.get(column).and_then(Value::as_str)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.values.get(column).and_then(Value::as_i64)
    }
}

/// Wire shape of a generic section row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRow {
    pub id: String,
    pub project_id: String,
    pub section: String,
    pub table_name: String,
    pub data: RowValues,
}

/// Wrap a stored row with its section and table tags
pub fn encode(section: &str, table_name: &str, row: StoredRow) -> SectionRow {
    SectionRow {
        id: row.id,
        project_id: row.project_id,
        section: section.to_string(),
        table_name: table_name.to_string(),
        data: row.values,
    }
}

/// Project a submitted mapping onto the writable columns of `schema`.
///
/// Every writable column ends up in the result: absent keys become null and
/// undeclared keys are dropped. Text columns accept strings, numbers and
/// booleans (stringified) and nested values (stored as JSON text). Required
/// columns that end up null are rejected with `InvalidInput`.
pub fn decode(schema: &TableSchema, data: &Map<String, Value>) -> StorageResult<RowValues> {
    let mut values = RowValues::new();

    for column in schema.writable_columns() {
        let submitted = data.get(column.name).unwrap_or(&Value::Null);

        let value = match column.kind {
            ColumnKind::Text => coerce_text(submitted)?,
            ColumnKind::JsonObject => match submitted {
                Value::Null => Value::Object(Map::new()),
                Value::Object(_) => submitted.clone(),
                _ => {
                    return Err(StorageError::invalid_input(format!(
                        "'{}' must be a JSON object",
                        column.name
                    )))
                }
            },
            ColumnKind::Order => continue,
        };

        if value.is_null() && !column.nullable {
            return Err(StorageError::invalid_input(format!(
                "'{}' is required",
                column.name
            )));
        }

        values.insert(column.name.to_string(), value);
    }

    Ok(values)
}

fn coerce_text(value: &Value) -> StorageResult<Value> {
    Ok(match value {
        Value::Null => Value::Null,
        Value::String(_) => value.clone(),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Array(_) | Value::Object(_) => Value::String(serde_json::to_string(value)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn risk_schema() -> TableSchema {
        TableSchema::new(
            "section_m9_risk_exposure_history",
            &[
                ColumnDef::required("risk"),
                ColumnDef::optional("date"),
                ColumnDef::optional("exposure_value"),
            ],
        )
        .unwrap()
    }

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_decode_fills_absent_columns_with_null() {
        let values = decode(&risk_schema(), &as_map(json!({"risk": "R1"}))).unwrap();
        assert_eq!(
            Value::Object(values),
            json!({"risk": "R1", "date": null, "exposure_value": null})
        );
    }

    #[test]
    fn test_decode_coerces_scalars_and_drops_unknown_keys() {
        let data = as_map(json!({
            "risk": 7,
            "date": true,
            "exposure_value": [1, 2],
            "not_a_column": "ignored"
        }));
        let values = decode(&risk_schema(), &data).unwrap();
        assert_eq!(
            Value::Object(values),
            json!({"risk": "7", "date": "true", "exposure_value": "[1,2]"})
        );
    }

    #[test]
    fn test_decode_rejects_missing_required_column() {
        let err = decode(&risk_schema(), &as_map(json!({"date": "2024-01-01"}))).unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(msg) if msg.contains("risk")));
    }

    #[test]
    fn test_decode_json_object_columns() {
        let schema = TableSchema::new(
            "deliverables",
            &[
                ColumnDef::required("work_product"),
                ColumnDef::json_object("milestones"),
            ],
        )
        .unwrap();

        let values = decode(&schema, &as_map(json!({"work_product": "SRS"}))).unwrap();
        assert_eq!(values.get("milestones"), Some(&json!({})));

        let values = decode(
            &schema,
            &as_map(json!({"work_product": "SRS", "milestones": {"M1": "done"}})),
        )
        .unwrap();
        assert_eq!(values.get("milestones"), Some(&json!({"M1": "done"})));

        let err = decode(
            &schema,
            &as_map(json!({"work_product": "SRS", "milestones": "M1"})),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }

    #[test]
    fn test_decode_skips_server_managed_columns() {
        let schema = TableSchema::new(
            "milestone_columns",
            &[ColumnDef::required("column_name"), ColumnDef::order("order")],
        )
        .unwrap();
        let values = decode(&schema, &as_map(json!({"column_name": "M1", "order": 99}))).unwrap();
        assert_eq!(Value::Object(values), json!({"column_name": "M1"}));
    }

    #[test]
    fn test_encode_shapes() {
        let row = StoredRow {
            id: "row-1".to_string(),
            project_id: "p-1".to_string(),
            values: as_map(json!({"risk": "R1", "date": null})),
        };

        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({"id": "row-1", "project_id": "p-1", "risk": "R1", "date": null})
        );

        let encoded = encode("M9", "risk_exposure_history", row);
        assert_eq!(
            serde_json::to_value(&encoded).unwrap(),
            json!({
                "id": "row-1",
                "project_id": "p-1",
                "section": "M9",
                "table_name": "risk_exposure_history",
                "data": {"risk": "R1", "date": null}
            })
        );
    }
}
