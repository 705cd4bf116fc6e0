// src/utils/table.rs
use crate::extractors::{ExtractedRecord, HEADER};

/// Renders records as a column-aligned text table, header first.
pub fn render(records: &[ExtractedRecord]) -> String {
    let rows: Vec<Vec<String>> = records.iter().map(ExtractedRecord::to_row).collect();
    render_with_header(&HEADER.map(String::from), &rows)
}

/// Renders raw sheet rows; the first row is treated as data, not as a header.
pub fn render_rows(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let labels: Vec<String> = (1..=width).map(|i| format!("#{}", i)).collect();
    render_with_header(&labels, rows)
}

fn render_with_header(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).chain([header.len()]).max().unwrap_or(0);

    let mut widths = vec![0usize; columns];
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    // Trailing empty cells are dropped so short rows do not end in separators.
    let used = cells.iter().rposition(|c| !c.is_empty()).map_or(0, |p| p + 1);
    let mut line = String::new();
    for (i, width) in widths.iter().take(used).enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        if i > 0 {
            line.push_str(" | ");
        }
        line.push_str(cell);
        line.extend(std::iter::repeat(' ').take(width - cell.chars().count()));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
