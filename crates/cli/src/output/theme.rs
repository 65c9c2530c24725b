use colored::Colorize;
use comfy_table::{Attribute, Cell, Color};
use vigil_common::Severity;

pub fn print_header(title: &str) {
    let width = title.chars().count() + 6;
    let border = "─".repeat(width);
    println!();
    println!("  ╭{}╮", border.cyan());
    println!("  │   {}   │", title.bright_cyan().bold());
    println!("  ╰{}╯", border.cyan());
    println!();
}

pub fn print_kv(label: &str, value: &str) {
    println!(
        "    {} {}",
        format!("{:<16}", label).dimmed(),
        value.bright_white()
    );
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), msg.yellow());
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Grey,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
        Severity::Critical => Color::Magenta,
    }
}

pub fn severity_cell(severity: Severity) -> Cell {
    let cell = Cell::new(severity.as_str()).fg(severity_color(severity));
    if severity == Severity::Critical {
        cell.add_attribute(Attribute::Bold)
    } else {
        cell
    }
}

/// Epoch milliseconds as a UTC timestamp, or the raw number if out of range.
pub fn format_time_ms(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}
