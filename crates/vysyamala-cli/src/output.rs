//! Terminal rendering of KPI cards and row tables

use serde_json::{Value, json};
use vysyamala_dashboard::{KpiSection, TableRow, TableView};

/// Column separator of the plain-text table
const SEPARATOR: &str = " | ";

/// Render the card sections as indented text
pub fn format_cards(sections: &[KpiSection]) -> String {
    let mut out = String::new();
    for section in sections {
        out.push_str(section.title);
        out.push('\n');
        for card in &section.cards {
            let key = card.click_key();
            let key = if key.is_empty() { "-" } else { key.as_str() };
            out.push_str(&format!(
                "  {:<24} {:>14}  [{key}]\n",
                card.label,
                card.display_value()
            ));
        }
    }
    out
}

/// Render rows under their headers with padded columns
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format_line(headers.iter().copied(), &widths);
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join(SEPARATOR),
    );
    out.push('\n');
    for row in rows {
        out.push_str(&format_line(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
        .trim_end()
        .to_string()
}

/// Text shown in place of the table for the non-row states
pub fn view_message<R>(view: &TableView<R>, notice: Option<&str>) -> Option<String> {
    match view {
        TableView::Idle => Some("Nothing fetched yet".to_string()),
        TableView::Loading => Some("Loading...".to_string()),
        TableView::Failed(message) => Some(format!("Failed to load data: {message}")),
        TableView::NoRecords => Some(notice.unwrap_or("No records found").to_string()),
        TableView::Rows(_) => None,
    }
}

/// Print a whole screen, as text or as one JSON document
pub fn print_screen<R: TableRow>(
    sections: &[KpiSection],
    view: &TableView<R>,
    notice: Option<&str>,
    as_json: bool,
) -> serde_json::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&screen_json(sections, view, notice))?);
        return Ok(());
    }

    if !sections.is_empty() {
        println!("{}", format_cards(sections));
    }
    match view {
        TableView::Rows(rows) => {
            let cells: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();
            print!("{}", format_table(R::HEADERS, &cells));
            println!("{} row(s)", rows.len());
        }
        other => {
            if let Some(message) = view_message(other, notice) {
                println!("{message}");
            }
        }
    }
    Ok(())
}

fn screen_json<R: TableRow>(
    sections: &[KpiSection],
    view: &TableView<R>,
    notice: Option<&str>,
) -> Value {
    let cards: Vec<Value> = sections
        .iter()
        .flat_map(|section| {
            section.cards.iter().map(move |card| {
                json!({
                    "section": section.title,
                    "label": card.label,
                    "value": card.value.get(),
                    "display": card.display_value(),
                    "key": card.click_key().as_str(),
                })
            })
        })
        .collect();

    let rows: Vec<Value> = match view {
        TableView::Rows(rows) => rows
            .iter()
            .map(|row| {
                Value::Object(
                    R::HEADERS
                        .iter()
                        .zip(row.cells())
                        .map(|(header, cell)| ((*header).to_string(), Value::String(cell)))
                        .collect(),
                )
            })
            .collect(),
        _ => Vec::new(),
    };

    json!({
        "cards": cards,
        "rows": rows,
        "message": view_message(view, notice),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vysyamala_core::Count;
    use vysyamala_dashboard::KpiCard;

    #[test]
    fn test_format_table_pads_columns() {
        let rows = vec![
            vec!["VYS1".to_string(), "John".to_string()],
            vec!["VYS100".to_string(), "Jo".to_string()],
        ];
        let table = format_table(&["ID", "Name"], &rows);
        assert_eq!(
            table,
            "ID     | Name\n------ | ----\nVYS1   | John\nVYS100 | Jo\n"
        );
    }

    #[test]
    fn test_format_cards_marks_total_without_key() {
        let sections = vec![KpiSection::new(
            "Overall",
            vec![
                KpiCard::new("Total Profiles", Count(12), ""),
                KpiCard::new("Today Work", Count(3), "today_work"),
            ],
        )];
        let text = format_cards(&sections);
        assert!(text.starts_with("Overall\n"));
        assert!(text.contains("[-]"));
        assert!(text.contains("[today_work]"));
    }

    #[test]
    fn test_view_message() {
        let failed: TableView<()> = TableView::Failed("boom".to_string());
        assert_eq!(
            view_message(&failed, None).as_deref(),
            Some("Failed to load data: boom")
        );
        let empty: TableView<()> = TableView::NoRecords;
        assert_eq!(
            view_message(&empty, Some("No matching profiles")).as_deref(),
            Some("No matching profiles")
        );
        assert_eq!(view_message(&TableView::<()>::Rows(Vec::new()), None), None);
    }
}
