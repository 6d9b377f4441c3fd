pub mod info;
pub mod load;
pub mod preview;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

fn styled_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

/// Print a key-value table on stderr
pub fn print_table(header: (&str, &str), rows: &[(&str, String)]) {
    let mut table = styled_table(&[header.0, header.1]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

/// Print a multi-column table on stderr
pub fn print_grid(header: &[&str], rows: Vec<Vec<String>>) {
    let mut table = styled_table(header);
    for row in rows {
        table.add_row(row);
    }
    eprintln!("\n{table}");
}
