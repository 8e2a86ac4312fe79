//! Money helpers for Argentine peso amounts.
//!
//! Prices are plain [`Decimal`] values in ARS. There is no multi-currency
//! support; the only formatting concern is the es-AR convention used in
//! operator notifications and display surfaces (dots for thousands, comma
//! for decimals).

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Format an ARS amount with es-AR separators.
///
/// Thousands are grouped with `.` and the decimal part uses `,`. Whole
/// amounts render without a decimal part; fractional amounts always carry
/// two decimals. `45000` → `"45.000"`, `1234.5` → `"1.234,50"`.
#[must_use]
pub fn format_ars(amount: Decimal) -> String {
    let negative = amount.is_sign_negative();
    let rounded = amount.abs().round_dp(2).normalize();

    let integer = rounded.trunc();
    let fraction = rounded.fract();

    let digits = integer.to_string();
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3 + 4);
    if negative {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if !fraction.is_zero() {
        let cents = (fraction * Decimal::ONE_HUNDRED)
            .round()
            .to_u32()
            .unwrap_or(0);
        grouped.push(',');
        grouped.push_str(&format!("{cents:02}"));
    }

    grouped
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use rust_decimal::Decimal;
    use std::str::FromStr;

    use super::format_ars;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn whole_amounts_have_no_decimal_part() {
        assert_eq!(format_ars(dec("45000")), "45.000");
        assert_eq!(format_ars(dec("12000")), "12.000");
        assert_eq!(format_ars(dec("999")), "999");
        assert_eq!(format_ars(dec("0")), "0");
    }

    #[test]
    fn fractional_amounts_carry_two_decimals() {
        assert_eq!(format_ars(dec("1234.5")), "1.234,50");
        assert_eq!(format_ars(dec("0.5")), "0,50");
        assert_eq!(format_ars(dec("1234.567")), "1.234,57");
    }

    #[test]
    fn grouping_spans_millions() {
        assert_eq!(format_ars(dec("1234567")), "1.234.567");
        assert_eq!(format_ars(dec("100000")), "100.000");
    }

    #[test]
    fn rounding_carries_into_integer_part() {
        assert_eq!(format_ars(dec("999.999")), "1.000");
    }

    #[test]
    fn negative_amounts_keep_sign() {
        assert_eq!(format_ars(dec("-45000")), "-45.000");
    }
}
