/// Placeholder for a missing value
pub const MISSING: &str = "-";

/// Форматирует целое число с разделителями тысяч (запятыми)
///
/// # Примеры
/// ```
/// use backend::shared::format::format_number;
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// assert_eq!(format_number(0), "0");
/// ```
pub fn format_number(n: u64) -> String {
    group_thousands(&n.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// `$1,234.56`; negative amounts as `-$1,234.56`
pub fn format_money(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return MISSING.to_string();
    };
    let cents = (v.abs() * 100.0).round() as u64;
    let sign = if v < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}${}.{:02}",
        sign,
        group_thousands(&(cents / 100).to_string()),
        cents % 100
    )
}

/// `12.3%`
pub fn format_percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.1}%", v),
        None => MISSING.to_string(),
    }
}

pub fn format_text(value: Option<&str>) -> String {
    value.unwrap_or(MISSING).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Some(1234.56)), "$1,234.56");
        assert_eq!(format_money(Some(0.0)), "$0.00");
        assert_eq!(format_money(Some(999.999)), "$1,000.00");
        assert_eq!(format_money(Some(-25.5)), "-$25.50");
        assert_eq!(format_money(None), "-");
        assert_eq!(format_money(Some(f64::NAN)), "-");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Some(12.345)), "12.3%");
        assert_eq!(format_percent(Some(-4.0)), "-4.0%");
        assert_eq!(format_percent(None), "-");
    }
}
