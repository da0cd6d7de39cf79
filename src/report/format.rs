//! Number and duration formatting for report output

use std::time::Duration;

/// Formats a value with comma thousands separators and a fixed number of decimals
///
/// ```
/// use dealer_inventory::report::format_thousands;
///
/// assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
/// assert_eq!(format_thousands(-24000.0, 0), "-24,000");
/// ```
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && rendered.chars().any(|c| c != '0' && c != '.');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `$25,000`
pub fn format_currency(value: f64) -> String {
    let digits = format_thousands(value, 0);
    match digits.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", digits),
    }
}

/// `+1,000`, `-1,000`, `+0`
pub fn format_signed(value: f64) -> String {
    let digits = format_thousands(value, 0);
    if digits.starts_with('-') {
        digits
    } else {
        format!("+{}", digits)
    }
}

/// `+2.50%`, `-4.00%`
pub fn format_signed_pct(value: f64) -> String {
    let digits = format_thousands(value, 2);
    if digits.starts_with('-') {
        format!("{}%", digits)
    } else {
        format!("+{}%", digits)
    }
}

/// Formats an elapsed time as `HH:MM:SS`
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1000.0, 0), "1,000");
        assert_eq!(format_thousands(25432.456, 2), "25,432.46");
        assert_eq!(format_thousands(-0.001, 2), "0.00");
    }

    #[test]
    fn test_signed_formats() {
        assert_eq!(format_currency(24000.0), "$24,000");
        assert_eq!(format_signed(-1000.0), "-1,000");
        assert_eq!(format_signed(0.0), "+0");
        assert_eq!(format_signed_pct(-4.0), "-4.00%");
        assert_eq!(format_signed_pct(2.5), "+2.50%");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_duration(Duration::from_secs(3_725)), "01:02:05");
    }
}
