//! Money
//!
//! Amounts arrive from the backend as JSON numbers, numeric strings, `null`, or
//! not at all. They are coerced through [`Decimal`] into minor units once, at the
//! boundary; every calculation after that works on whole minor units.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde_json::Value;

/// Currency used by the storefront unless configured otherwise.
pub const DEFAULT_CURRENCY: &Currency = iso::IDR;

/// Look up one of the supported storefront currencies by its ISO code.
pub fn currency_from_code(code: &str) -> Option<&'static Currency> {
    match code.trim().to_ascii_uppercase().as_str() {
        "IDR" => Some(iso::IDR),
        "SGD" => Some(iso::SGD),
        "MYR" => Some(iso::MYR),
        "USD" => Some(iso::USD),
        "EUR" => Some(iso::EUR),
        "GBP" => Some(iso::GBP),
        _ => None,
    }
}

/// Coerce a loose wire value into a decimal amount.
///
/// Numbers and numeric strings are accepted; everything else, including strings
/// that fail to parse, becomes zero.
pub fn coerce_amount(value: &Value) -> Decimal {
    match value {
        Value::Number(number) => number
            .to_string()
            .parse::<Decimal>()
            .ok()
            .or_else(|| Decimal::from_scientific(&number.to_string()).ok())
            .or_else(|| number.as_f64().and_then(Decimal::from_f64))
            .unwrap_or(Decimal::ZERO),
        Value::String(text) => parse_amount(text).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

/// Parse a textual amount, tolerating surrounding whitespace and scientific notation.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();

    trimmed
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(trimmed).ok())
}

/// Convert a major-unit amount into minor units of `currency`, rounding half away
/// from zero. Amounts that do not fit in an `i64` become zero.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> i64 {
    let Some(scale) = 10_i64.checked_pow(currency.exponent) else {
        return 0;
    };

    amount
        .checked_mul(Decimal::from(scale))
        .and_then(|value| {
            value
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .unwrap_or(0)
}

/// Build money from a loose wire value.
pub fn money_from_value<'a>(value: &Value, currency: &'a Currency) -> Money<'a, Currency> {
    Money::from_minor(to_minor_units(coerce_amount(value), currency), currency)
}

/// Build money from an optional wire value, treating `null` as absent.
pub fn optional_money<'a>(value: &Value, currency: &'a Currency) -> Option<Money<'a, Currency>> {
    if value.is_null() {
        None
    } else {
        Some(money_from_value(value, currency))
    }
}

/// Multiply an amount by a quantity, saturating instead of overflowing.
pub fn times<'a>(amount: &Money<'a, Currency>, quantity: u32) -> Money<'a, Currency> {
    Money::from_minor(
        amount.to_minor_units().saturating_mul(i64::from(quantity)),
        amount.currency(),
    )
}

/// Sum amounts in minor units, saturating instead of overflowing.
pub fn sum<'a, 'm>(
    amounts: impl IntoIterator<Item = &'m Money<'a, Currency>>,
    currency: &'a Currency,
) -> Money<'a, Currency>
where
    'a: 'm,
{
    let minor = amounts
        .into_iter()
        .fold(0_i64, |acc, amount| acc.saturating_add(amount.to_minor_units()));

    Money::from_minor(minor, currency)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn coerces_numbers_and_numeric_strings() {
        assert_eq!(coerce_amount(&json!(100_000)), Decimal::from(100_000));
        assert_eq!(coerce_amount(&json!("100000.00")), Decimal::from(100_000));
        assert_eq!(coerce_amount(&json!(" 20000 ")), Decimal::from(20_000));
        assert_eq!(coerce_amount(&json!(12.5)), Decimal::new(125, 1));
    }

    #[test]
    fn coercion_failures_become_zero() {
        assert_eq!(coerce_amount(&json!("free")), Decimal::ZERO);
        assert_eq!(coerce_amount(&json!(null)), Decimal::ZERO);
        assert_eq!(coerce_amount(&json!({ "amount": 1 })), Decimal::ZERO);
        assert_eq!(coerce_amount(&json!([1, 2])), Decimal::ZERO);
    }

    #[test]
    fn minor_units_follow_the_currency_exponent() {
        assert_eq!(to_minor_units(Decimal::from(120_000), iso::IDR), 12_000_000);
        assert_eq!(to_minor_units(Decimal::new(299, 2), iso::GBP), 299);
    }

    #[test]
    fn minor_units_round_half_away_from_zero() {
        assert_eq!(to_minor_units(Decimal::new(1005, 3), iso::GBP), 101);
        assert_eq!(to_minor_units(Decimal::new(1015, 3), iso::GBP), 102);
        assert_eq!(to_minor_units(Decimal::new(-1005, 3), iso::GBP), -101);
        assert_eq!(money_from_value(&json!("1234.565"), iso::IDR).to_minor_units(), 123_457);
    }

    #[test]
    fn optional_money_treats_null_as_absent() {
        assert_eq!(optional_money(&json!(null), iso::IDR), None);
        assert_eq!(
            optional_money(&json!("0"), iso::IDR),
            Some(Money::from_minor(0, iso::IDR))
        );
    }

    #[test]
    fn times_and_sum_saturate() {
        let big = Money::from_minor(i64::MAX, iso::IDR);

        assert_eq!(times(&big, 2).to_minor_units(), i64::MAX);
        assert_eq!(sum([&big, &big], iso::IDR).to_minor_units(), i64::MAX);
    }

    #[test]
    fn currency_lookup_is_case_insensitive() {
        assert_eq!(currency_from_code("idr"), Some(iso::IDR));
        assert_eq!(currency_from_code("XYZ"), None);
    }
}
