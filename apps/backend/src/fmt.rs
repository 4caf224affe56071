//! Display formatting for portfolio output — amounts, USD values, percentages.
//!
//! Hand-rolled grouping, no locale dependency.

/// Thousands-separate a plain digit string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fixed-point render with grouped integer part; optionally trims trailing
/// fractional zeros.
fn format_grouped(value: f64, decimals: usize, trim: bool) -> String {
    let rendered = format!("{value:.decimals$}");
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rendered.as_str(), ""),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let frac = if trim {
        frac_part.trim_end_matches('0')
    } else {
        frac_part
    };

    if frac.is_empty() {
        format!("{sign}{}", group_thousands(digits))
    } else {
        format!("{sign}{}.{frac}", group_thousands(digits))
    }
}

/// Token quantity: up to 4 fraction digits, trailing zeros trimmed.
pub fn format_amount(value: f64) -> String {
    format_grouped(value, 4, true)
}

/// USD value: `$` prefix, exactly 2 fraction digits.
pub fn format_usd(value: f64) -> String {
    format!("${}", format_grouped(value, 2, false))
}

/// Unit price: `$` prefix, up to 6 fraction digits, trailing zeros trimmed.
pub fn format_price(value: f64) -> String {
    format!("${}", format_grouped(value, 6, true))
}

/// Percentage with an explicit sign prefix for non-negative values.
pub fn format_signed_percent(value: f64) -> String {
    let prefix = if value >= 0.0 { "+" } else { "" };
    format!("{prefix}{value:.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_trims_zeros() {
        assert_eq!(format_amount(1.0), "1");
        assert_eq!(format_amount(500.0), "500");
        assert_eq!(format_amount(0.5), "0.5");
    }

    #[test]
    fn test_format_amount_grouping() {
        assert_eq!(format_amount(1234.56789), "1,234.5679");
        assert_eq!(format_amount(1_000_000.0), "1,000,000");
    }

    #[test]
    fn test_format_usd_fixed_two_decimals() {
        assert_eq!(format_usd(52.0), "$52.00");
        assert_eq!(format_usd(2.0), "$2.00");
        assert_eq!(format_usd(1234567.891), "$1,234,567.89");
        assert_eq!(format_usd(0.0), "$0.00");
    }

    #[test]
    fn test_format_price_up_to_six_decimals() {
        assert_eq!(format_price(0.1), "$0.1");
        assert_eq!(format_price(0.000123), "$0.000123");
        assert_eq!(format_price(1234.0), "$1,234");
        assert_eq!(format_price(3.5), "$3.5");
    }

    #[test]
    fn test_format_signed_percent() {
        assert_eq!(format_signed_percent(12.345), "+12.35%");
        assert_eq!(format_signed_percent(-5.0), "-5.00%");
        assert_eq!(format_signed_percent(0.0), "+0.00%");
        assert_eq!(format_signed_percent(100.0), "+100.00%");
    }
}
