//! User-visible number formatting, Brazilian conventions.
//!
//! Thousands separator is `.` and the decimal separator is `,`. This is part
//! of the observable contract of the dashboard, so it lives in the core and
//! is unit tested here rather than in the presentation layer.

/// Format a value as Brazilian currency: `format_brl(1234.5)` is
/// `"R$ 1.234,50"`.
pub fn format_brl(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    format!(
        "R$ {}{},{:02}",
        sign,
        group_thousands(cents / 100),
        cents % 100
    )
}

/// Format a quantity: truncated to a whole number, `.` between groups.
pub fn format_quantidade(quantity: f64) -> String {
    let sign = if quantity < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(quantity.abs() as u64))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::new();
    for (index, ch) in digits.chars().rev().enumerate() {
        if index > 0 && index % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped.chars().rev().collect()
}
