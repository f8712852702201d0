use itertools::Itertools;
use novreco_core::{PageState, Record, value_text};

const MAX_COLUMN_WIDTH: usize = 32;
const DEFAULT_COLUMN_COUNT: usize = 6;

/// Columns to print: the requested ones, or the first fields of the first row.
pub fn columns_for(requested: &[String], items: &[Record]) -> Vec<String> {
    if !requested.is_empty() {
        return requested.to_vec();
    }
    items
        .first()
        .map(|record| {
            record
                .keys()
                .take(DEFAULT_COLUMN_COUNT)
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn cell(record: &Record, column: &str) -> String {
    let text = record
        .get(column)
        .and_then(value_text)
        .unwrap_or_default()
        .replace(['\n', '\r', '\t'], " ");
    if text.chars().count() > MAX_COLUMN_WIDTH {
        let cut: String = text.chars().take(MAX_COLUMN_WIDTH - 1).collect();
        format!("{}…", cut)
    } else {
        text
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// Page-number controls, e.g. `« ‹ 1 [2] 3 › »`.
pub fn page_controls(state: &PageState<'_>) -> String {
    let numbers = state
        .visible_pages
        .iter()
        .map(|&page| {
            if page == state.current_page {
                format!("[{}]", page)
            } else {
                page.to_string()
            }
        })
        .join(" ");
    let prev = if state.can_go_prev { "« ‹" } else { "     " };
    let next = if state.can_go_next { "› »" } else { "" };
    format!("{} {} {}", prev, numbers, next).trim_end().to_string()
}

/// Renders one page as a text table followed by a summary and page controls.
pub fn render_page(state: &PageState<'_>, requested_columns: &[String]) -> String {
    if state.no_data {
        return "No data".to_string();
    }

    let columns = columns_for(requested_columns, state.items);
    let rows: Vec<Vec<String>> = state
        .items
        .iter()
        .map(|record| columns.iter().map(|column| cell(record, column)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 4);
    lines.push(
        columns
            .iter()
            .zip(&widths)
            .map(|(column, &width)| pad(column, width))
            .join(" | "),
    );
    lines.push(widths.iter().map(|&width| "-".repeat(width)).join("-+-"));
    for row in &rows {
        lines.push(
            row.iter()
                .zip(&widths)
                .map(|(text, &width)| pad(text, width))
                .join(" | "),
        );
    }

    if let Some((first, last)) = state.range {
        lines.push(String::new());
        lines.push(format!(
            "Showing {}-{} of {} (page {} of {}, {} per page)",
            first, last, state.total_items, state.current_page, state.total_pages, state.page_size
        ));
    }
    lines.push(page_controls(state));

    lines
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use novreco_core::{ListConfig, ListController, record_from};
    use serde_json::json;

    fn checkins(count: usize) -> Vec<Record> {
        (1..=count)
            .map(|i| {
                record_from([
                    ("code", json!(format!("NV{:03}", i))),
                    ("name", json!(format!("Nhân viên {}", i))),
                    ("status", json!(if i % 2 == 0 { "late" } else { "on_time" })),
                ])
            })
            .collect()
    }

    #[test]
    fn test_render_last_page() {
        let mut list = ListController::new(ListConfig {
            page_size: 10,
            max_visible_pages: 5,
        });
        list.set_data(checkins(23));
        list.change_page(3);

        let output = render_page(&list.snapshot(), &[]);
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("code"));
        assert!(lines[2].starts_with("NV021"));
        assert!(output.contains("Showing 21-23 of 23 (page 3 of 3, 10 per page)"));
        assert!(output.ends_with("« ‹ 1 2 [3]"));
    }

    #[test]
    fn test_render_no_data() {
        let list = ListController::default();
        assert_eq!(render_page(&list.snapshot(), &[]), "No data");
    }

    #[test]
    fn test_requested_columns_and_truncation() {
        let mut list = ListController::default();
        list.set_data(vec![record_from([
            ("name", json!("x".repeat(40))),
            ("email", json!("a@nov.vn")),
        ])]);
        let output = render_page(&list.snapshot(), &["email".to_string(), "name".to_string()]);
        assert!(output.starts_with("email"));
        assert!(output.contains(&format!("{}…", "x".repeat(MAX_COLUMN_WIDTH - 1))));
        assert!(!output.contains("« ‹"));
    }
}
