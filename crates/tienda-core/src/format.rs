use rust_decimal::{Decimal, RoundingStrategy};

/// Chilean peso label: rounded to whole pesos, `.` as thousands separator.
///
/// `9990` becomes `"$9.990"`, `-1500` becomes `"-$1.500"`.
#[must_use]
pub fn format_clp(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_clp(Decimal::from(9990)), "$9.990");
        assert_eq!(format_clp(Decimal::from(109_990)), "$109.990");
        assert_eq!(format_clp(Decimal::from(1_234_567)), "$1.234.567");
    }

    #[test]
    fn small_amounts_have_no_separator() {
        assert_eq!(format_clp(Decimal::ZERO), "$0");
        assert_eq!(format_clp(Decimal::from(990)), "$990");
    }

    #[test]
    fn rounds_to_whole_pesos() {
        assert_eq!(format_clp(Decimal::from_str("999.5").unwrap()), "$1.000");
        assert_eq!(format_clp(Decimal::from_str("1999.49").unwrap()), "$1.999");
    }

    #[test]
    fn negative_amounts() {
        assert_eq!(format_clp(Decimal::from(-1500)), "-$1.500");
        assert_eq!(format_clp(Decimal::from_str("-0.4").unwrap()), "$0");
    }
}
