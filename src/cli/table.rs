//! Table builder wrapper around comfy-table for consistent list display.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;

/// Create a standard list table with the given headers.
///
/// Uses the NOTHING preset (no borders) for a clean CLI aesthetic.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Render the table to string with a count header.
pub fn render_list(entity_name: &str, table: &Table, total: usize) -> String {
    if total == 0 {
        return format!("No {entity_name}s found.");
    }
    let count_line = format!(
        "{} {}:",
        style(total).bold(),
        if total == 1 {
            entity_name.to_string()
        } else {
            format!("{entity_name}s")
        }
    );
    format!("{count_line}\n{table}")
}

/// Review state of a decoration, styled for the terminal
pub fn review_status(reviewed: Option<bool>) -> String {
    match reviewed {
        Some(true) => style("approved").green().to_string(),
        Some(false) => style("pending review").yellow().to_string(),
        None => style("-").dim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_list() {
        let table = list_table(&["hash"]);
        assert_eq!(render_list("decoration", &table, 0), "No decorations found.");
    }

    #[test]
    fn test_render_list_includes_rows() {
        let mut table = list_table(&["hash", "alt"]);
        table.add_row(vec!["abc", "Cube"]);
        let rendered = render_list("decoration", &table, 1);
        assert!(rendered.contains("decoration:"));
        assert!(rendered.contains("HASH"));
        assert!(rendered.contains("Cube"));
    }
}
