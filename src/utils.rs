use colored::Colorize;

use crate::lifecycle::MemberStatus;

/// Format an amount with the gym's currency symbol and thousands separators
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    let whole = rounded.trunc() as i64;
    let fraction = ((rounded.abs() - (whole.abs() as f64)) * 100.0).round() as i64;

    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    if fraction == 0 {
        format!("{}{}{}", sign, symbol, grouped)
    } else {
        format!("{}{}{}.{:02}", sign, symbol, grouped, fraction)
    }
}

/// Shorten long ids for table display
pub fn format_id(id: &str) -> String {
    if id.chars().count() <= 12 {
        id.to_string()
    } else {
        let prefix: String = id.chars().take(8).collect();
        format!("{}…", prefix)
    }
}

/// Status label coloured the way the dashboard badges are
pub fn format_status(status: MemberStatus) -> String {
    match status {
        MemberStatus::Active => status.as_str().green().to_string(),
        MemberStatus::Expiring => status.as_str().yellow().to_string(),
        MemberStatus::Expired => status.as_str().red().to_string(),
    }
}

/// "1 day" / "3 days"
pub fn format_days(days: i64) -> String {
    format!("{} day{}", days, if days.abs() != 1 { "s" } else { "" })
}

/// Prompt user for yes/no confirmation
pub fn confirm_action(prompt: &str) -> bool {
    use std::io::{self, Write};

    print!("{} (y/N): ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Print a formatted table border
pub fn print_table_border(width: usize) {
    println!("{}", "=".repeat(width));
}

/// Width of `s` on screen, skipping ANSI colour sequences
fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            // CSI sequence: ESC [ params final-byte
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

/// Lay out one table row. Padding counts visible characters, so coloured cells line up.
pub fn format_table_row(columns: &[&str], widths: &[usize]) -> String {
    let mut row = String::new();
    for (col, width) in columns.iter().zip(widths) {
        row.push_str(col);
        let pad = width.saturating_sub(visible_width(col)) + 2;
        row.push_str(&" ".repeat(pad));
    }
    row.trim_end().to_string()
}

/// Print a table row with columns
pub fn print_table_row(columns: &[&str], widths: &[usize]) {
    println!("{}", format_table_row(columns, widths));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0, "₹"), "₹0");
        assert_eq!(format_currency(1500.0, "₹"), "₹1,500");
        assert_eq!(format_currency(1234567.5, "$"), "$1,234,567.50");
        assert_eq!(format_currency(-42.25, "₹"), "-₹42.25");
    }

    #[test]
    fn test_format_id_and_days() {
        assert_eq!(format_id("m-17"), "m-17");
        assert_eq!(format_id("3f1c2a9e-77b0-4d0e-9c52-0d5c0c3f1b2a"), "3f1c2a9e…");
        assert_eq!(format_days(1), "1 day");
        assert_eq!(format_days(4), "4 days");
    }

    #[test]
    fn test_coloured_cells_keep_columns_aligned() {
        let plain = format_table_row(&["Asha", "active", "4 days"], &[8, 10, 8]);
        let coloured = format_table_row(
            &["Asha", "\x1b[32mactive\x1b[0m", "4 days"],
            &[8, 10, 8],
        );

        assert_eq!(plain, "Asha      active      4 days");
        assert_eq!(coloured.replace("\x1b[32m", "").replace("\x1b[0m", ""), plain);
        assert_eq!(visible_width("\x1b[1;31m2 days\x1b[0m"), 6);
    }
}
