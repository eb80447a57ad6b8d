//! Shared presentation helpers: json encoding, tables, headings.

use crate::error::CommandError;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CommandError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CommandError::Generic(format!("Failed to encode output: {}", e)))
}

/// Bordered table with a header row.
pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(headers.to_vec());
    table
}

/// Section heading in bold/underline.
pub fn heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

/// `Label: value` lines, aligned on the longest label.
pub fn fields(rows: &[(&str, &str)]) -> String {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("{:<width$}  {}", format!("{}:", label), value, width = width + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
