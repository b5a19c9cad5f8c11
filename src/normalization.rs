use crate::structures::Row;

/// Turns a raw value grid (header row first) into rows keyed by header text.
///
/// Headers are trimmed. Each data row is zipped against the headers by
/// position; missing trailing cells become `""` and cells past the last
/// header are ignored. A grid with only a header (or nothing) yields no rows.
pub fn normalize_rows(values: Vec<Vec<String>>) -> Vec<Row> {
    let mut lines = values.into_iter();

    let headers: Vec<String> = match lines.next() {
        Some(header) => header.iter().map(|h| h.trim().to_string()).collect(),
        None => return Vec::new(),
    };

    lines.map(|cells| normalize_row(&headers, cells)).collect()
}

/// Zips one line of cells against `headers`.
pub fn normalize_row(headers: &[String], cells: Vec<String>) -> Row {
    let mut cells = cells.into_iter();
    let mut row = Row::new();

    for header in headers {
        row.insert(header.as_str(), cells.next().unwrap_or_default());
    }

    row
}

/// Renders a raw JSON cell as text. The sheets API returns strings for
/// formatted values, but numbers and booleans can appear with other render options.
pub fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
