use serde::{Deserialize, Serialize};

/// Locale used to group digits in calculator display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberLocale {
    /// `1 234,5` (narrow no-break space, decimal comma)
    #[default]
    Fr,
    /// `1,234.5`
    En,
}

impl NumberLocale {
    fn separators(self) -> (&'static str, &'static str) {
        match self {
            NumberLocale::Fr => ("\u{202f}", ","),
            NumberLocale::En => (",", "."),
        }
    }
}

/// Format a floating-point number for display
/// Removes unnecessary decimal places (e.g., 4.0 -> "4")
/// Limits precision to 10 decimal places
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e12 {
        format!("{}", value as i64)
    } else {
        let formatted = format!("{:.10}", value);
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Format a number with locale digit grouping, e.g. 1234.5 -> "1 234,5" in French
pub fn format_grouped(value: f64, locale: NumberLocale) -> String {
    let raw = format_number(value);
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let (group_sep, decimal_sep) = locale.separators();
    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 * 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(group_sep);
        }
        grouped.push(*digit);
    }

    match frac_part {
        Some(frac) => format!("{}{}{}{}", sign, grouped, decimal_sep, frac),
        None => format!("{}{}", sign, grouped),
    }
}
