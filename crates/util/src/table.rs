//! Plain-text tables for command output.
//!
//! Cells may contain inline markup (see [`crate::markup`]) and embedded
//! newlines. Column widths are measured on the visible text so styled cells
//! line up with plain ones.

use indexmap::IndexMap;
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use crate::markup;

/// One table row: column key to cell text (markup allowed).
pub type Row = IndexMap<String, String>;

const COLUMN_GAP: &str = "  ";

/// Render `rows` as a table with a header line.
///
/// Columns appear in first-seen key order across all rows; a row missing a
/// column renders an empty cell. An empty slice renders nothing.
pub fn render_table(rows: &[Row], styled: bool) -> String {
    let columns = infer_columns(rows);
    if columns.is_empty() {
        return String::new();
    }

    let headers: Vec<String> = columns.iter().map(|column| format!("***{}***", normalize_header(column))).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|header| visible_width(header)).collect();
    for row in &body {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(visible_width(cell));
        }
    }

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.extend(render_row(&headers, &widths, styled));
    lines.push(
        widths
            .iter()
            .map(|width| "─".repeat(*width))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP),
    );
    for row in &body {
        lines.extend(render_row(row, &widths, styled));
    }
    lines.join("\n")
}

/// Render a key/value view of `value`.
///
/// Objects become one `key  value` line per field; arrays of objects become a
/// regular table; anything else is printed as its display text.
pub fn render_vtable(value: &Value, styled: bool) -> String {
    match value {
        Value::Object(map) => {
            let pairs: Vec<(String, String)> =
                map.iter().map(|(key, value)| (key.clone(), render_value(value))).collect();
            render_pairs(&pairs, styled)
        }
        Value::Array(items) if items.iter().all(Value::is_object) => render_table(&rows_from_values(items), styled),
        other => markup::render(&render_value(other), styled),
    }
}

/// Render ordered key/value pairs, keys padded to a common width.
pub fn render_pairs(pairs: &[(String, String)], styled: bool) -> String {
    let key_width = pairs.iter().map(|(key, _)| visible_width(key)).max().unwrap_or(0);
    let mut lines = Vec::new();
    for (key, value) in pairs {
        let key_cell = format!("***{key}***");
        let rendered = render_row(&[key_cell, value.clone()], &[key_width, 0], styled);
        lines.extend(rendered);
    }
    lines.join("\n")
}

/// Convert JSON objects into rows, rendering each field with [`render_value`].
pub fn rows_from_values(items: &[Value]) -> Vec<Row> {
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|object| {
            object
                .iter()
                .map(|(key, value)| (key.clone(), render_value(value)))
                .collect()
        })
        .collect()
}

/// Display text of a JSON value inside a cell.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) if items.iter().all(|item| !item.is_object() && !item.is_array()) => {
            items.iter().map(render_value).collect::<Vec<_>>().join(", ")
        }
        other => other.to_string(),
    }
}

fn infer_columns(rows: &[Row]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// `snake_case` keys to upper-case headers.
fn normalize_header(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn visible_width(cell: &str) -> usize {
    markup::strip(cell)
        .lines()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
}

/// Render one logical row; multi-line cells produce several physical lines.
fn render_row(cells: &[String], widths: &[usize], styled: bool) -> Vec<String> {
    let split: Vec<Vec<&str>> = cells.iter().map(|cell| cell.split('\n').collect()).collect();
    let height = split.iter().map(Vec::len).max().unwrap_or(1);
    let last = cells.len().saturating_sub(1);

    (0..height)
        .map(|line_index| {
            let mut line = String::new();
            for (column, parts) in split.iter().enumerate() {
                let text = parts.get(line_index).copied().unwrap_or_default();
                let rendered = markup::render(text, styled);
                line.push_str(&rendered);
                if column < last {
                    let padding = widths[column].saturating_sub(visible_width(text));
                    line.push_str(&" ".repeat(padding));
                    line.push_str(COLUMN_GAP);
                }
            }
            line.trim_end().to_string()
        })
        .collect()
}
