// Money formatting and divergence math shared by the comparators
use rust_decimal::Decimal;

/// Format a dollar amount as `$10,000.00` (two decimal places,
/// thousands separators, leading `-` for negatives)
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative();
    let text = rounded.abs().to_string();

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), format!("{:0<2}", f)),
        None => (text, "00".to_string()),
    };

    let mut grouped = String::new();
    for (idx, ch) in int_part.chars().enumerate() {
        let remaining = int_part.len() - idx;
        grouped.push(ch);
        if remaining > 1 && remaining % 3 == 1 {
            grouped.push(',');
        }
    }

    let sign = if negative { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}

/// Relative divergence of `stated` from `expected`, as a fraction
/// (0.025 = 2.5%). None when `expected` is zero.
pub fn relative_divergence(stated: Decimal, expected: Decimal) -> Option<Decimal> {
    if expected.is_zero() {
        return None;
    }
    Some(((stated - expected) / expected).abs())
}

/// Whether `stated` agrees with `expected` within a relative tolerance
/// (a value exactly at the tolerance still agrees)
pub fn within_tolerance(stated: Decimal, expected: Decimal, tolerance: Decimal) -> bool {
    match relative_divergence(stated, expected) {
        Some(divergence) => divergence <= tolerance,
        // Both zero agree; anything vs zero has no relative measure
        None => stated.is_zero(),
    }
}
