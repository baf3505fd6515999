//! Raw rows of one configurable table, shown on the home page.

use crate::error::Error;
use crate::gateway::data_store::{DataStore, Query, Row};
use crate::value_to_string;
use serde_json::Value;
use service::config::Config;

#[derive(Debug, Clone)]
pub struct TableQuery {
    pub table: String,
    pub select: String,
    pub limit: u32,
}

impl From<&Config> for TableQuery {
    fn from(config: &Config) -> Self {
        Self {
            table: config.supabase_table.clone(),
            select: config.supabase_select.clone(),
            limit: config.supabase_limit,
        }
    }
}

/// Rows plus the union of their column names in first-seen order.
#[derive(Debug, Default, PartialEq)]
pub struct TableRows {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl TableRows {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// Display text for each cell of a row, aligned with `columns`.
    pub fn cells<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = String> + 'a {
        self.columns
            .iter()
            .map(move |column| render_cell(row.get(column)))
    }
}

pub async fn fetch_table_rows(store: &dyn DataStore, query: &TableQuery) -> Result<TableRows, Error> {
    let params: Query = vec![
        ("select".to_string(), query.select.clone()),
        ("limit".to_string(), query.limit.to_string()),
    ];
    let rows = store.select(&query.table, &params).await?;
    Ok(TableRows::from_rows(rows))
}

/// Null or missing cells render as `-`; objects and arrays as compact JSON.
pub fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(other) => value_to_string(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Row> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_columns_are_union_of_all_rows() {
        let table = TableRows::from_rows(rows(json!([
            {"id": 1, "url": "a"},
            {"id": 2, "caption": "b"}
        ])));

        assert_eq!(table.columns, ["id", "url", "caption"]);
    }

    #[test]
    fn test_columns_keep_the_order_the_store_returned() {
        let rows: Vec<Row> =
            serde_json::from_str(r#"[{"url":"https://img/1.png","id":1,"created_at":"t"}]"#)
                .unwrap();

        let table = TableRows::from_rows(rows);

        assert_eq!(table.columns, ["url", "id", "created_at"]);
    }

    #[test]
    fn test_cells_render_missing_null_and_nested_values() {
        let table = TableRows::from_rows(rows(json!([
            {"a": null, "b": {"k": 1}, "c": [1, 2], "d": true, "e": "text"},
            {"f": 3}
        ])));

        let first: Vec<String> = table.cells(&table.rows[0]).collect();
        let by_column: Vec<(&String, &String)> = table.columns.iter().zip(first.iter()).collect();
        for (column, cell) in by_column {
            let expected = match column.as_str() {
                "a" | "f" => "-",
                "b" => r#"{"k":1}"#,
                "c" => "[1,2]",
                "d" => "true",
                "e" => "text",
                other => panic!("unexpected column {other}"),
            };
            assert_eq!(cell, expected, "column {column}");
        }
    }

    #[test]
    fn test_empty_result_has_no_columns() {
        assert_eq!(TableRows::from_rows(Vec::new()), TableRows::default());
    }
}
