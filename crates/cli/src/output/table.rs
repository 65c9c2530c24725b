use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use vigil_common::{Fault, Squelch};

use super::theme::{format_time_ms, severity_cell};

pub fn build_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold))
        .collect();
    table.set_header(cells);
    table
}

pub fn fault_table(faults: &[Fault]) -> Table {
    let mut table = build_table(&["Name", "Severity", "Message", "Since", "Alerted"]);
    for f in faults {
        let since = f.since_ms.map(format_time_ms).unwrap_or_else(|| "-".into());
        table.add_row(vec![
            Cell::new(&f.name),
            severity_cell(f.severity),
            Cell::new(&f.message),
            Cell::new(since),
            Cell::new(if f.triggered { "yes" } else { "" }),
        ]);
    }
    table
}

pub fn squelch_table(squelches: &[Squelch]) -> Table {
    let mut table = build_table(&["Regex", "User", "Since", "Permanent", "Reason"]);
    for s in squelches {
        table.add_row(vec![
            s.regex.clone(),
            s.user.clone(),
            format_time_ms(s.time_ms),
            if s.permanent { "yes" } else { "no" }.to_string(),
            s.reason.clone(),
        ]);
    }
    table
}
