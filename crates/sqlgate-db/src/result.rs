//! Query results and their text rendering.

use serde::Serialize;
use serde_json::Value;

/// Outcome of one statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryResult {
    /// Rows returned by a read statement.
    Table(Table),
    /// Rows changed by a committed mutation.
    Affected { rows_affected: u64 },
}

impl QueryResult {
    /// The table, if this is a read result.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            QueryResult::Table(table) => Some(table),
            QueryResult::Affected { .. } => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            QueryResult::Table(table) => Some(table),
            QueryResult::Affected { .. } => None,
        }
    }
}

/// Ordered columns and rows of cell values.
///
/// Every row has exactly `columns.len()` cells. SQL `NULL` is [`Value::Null`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a plain-text grid.
    ///
    /// ```text
    /// id | name
    /// ---+-------
    /// 1  | widget
    /// 2  | NULL
    /// ```
    ///
    /// A table with no rows renders its header followed by `(no rows)`, or
    /// just `(no rows)` when the column list is unknown.
    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return "(no rows)".to_string();
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(render_cell).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let mut lines = Vec::with_capacity(cells.len() + 2);
        lines.push(render_line(self.columns.iter().map(String::as_str), &widths));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );

        if cells.is_empty() {
            lines.push("(no rows)".to_string());
        }
        for row in &cells {
            lines.push(render_line(row.iter().map(String::as_str), &widths));
        }

        lines.join("\n")
    }
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    padded.join(" | ").trim_end().to_string()
}

/// Text form of a single cell.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_grid() {
        let table = Table::new(
            vec!["id".into(), "name".into()],
            vec![
                vec![json!(1), json!("widget")],
                vec![json!(22), Value::Null],
            ],
        );

        assert_eq!(
            table.render(),
            "id | name\n---+-------\n1  | widget\n22 | NULL"
        );
    }

    #[test]
    fn test_render_empty_with_columns() {
        let table = Table::new(vec!["Tables_in_shop".into()], vec![]);
        assert_eq!(table.render(), "Tables_in_shop\n--------------\n(no rows)");
    }

    #[test]
    fn test_render_without_columns() {
        assert_eq!(Table::default().render(), "(no rows)");
    }

    #[test]
    fn test_render_cells() {
        assert_eq!(render_cell(&json!("abc")), "abc");
        assert_eq!(render_cell(&json!(1.5)), "1.5");
        assert_eq!(render_cell(&json!(true)), "true");
        assert_eq!(render_cell(&Value::Null), "NULL");
    }

    #[test]
    fn test_as_table() {
        let affected = QueryResult::Affected { rows_affected: 3 };
        assert!(affected.as_table().is_none());

        let table = QueryResult::Table(Table::new(vec!["n".into()], vec![vec![json!(42)]]));
        assert_eq!(table.as_table().map(Table::row_count), Some(1));
    }
}
