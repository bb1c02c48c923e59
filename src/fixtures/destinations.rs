//! Destination Fixtures

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{
    addons::{AddOn, AddonId},
    destinations::{Destination, DestinationId},
    fixtures::FixtureError,
    money::{currency_from_code, parse_amount, to_minor_units},
};

/// Wrapper for destinations in YAML
#[derive(Debug, Deserialize)]
pub struct DestinationsFixture {
    /// Destinations, keyed by the name other fixtures refer to them by
    pub destinations: Vec<DestinationFixture>,
}

/// Destination fixture from YAML
#[derive(Debug, Deserialize)]
pub struct DestinationFixture {
    /// Fixture key, also used as the destination id
    pub key: String,

    /// Destination name
    pub name: String,

    /// Ticket price (e.g., "150000 IDR")
    pub price: String,

    /// Add-on catalog, in display order
    #[serde(default)]
    pub addons: Vec<AddOnFixture>,
}

/// Add-on fixture from YAML
#[derive(Debug, Deserialize)]
pub struct AddOnFixture {
    /// Add-on id
    pub id: AddonId,

    /// Add-on name
    pub name: String,

    /// Price per ticket (e.g., "20000 IDR")
    pub price: String,
}

impl TryFrom<DestinationFixture> for Destination<'static> {
    type Error = FixtureError;

    fn try_from(fixture: DestinationFixture) -> Result<Self, Self::Error> {
        let base_price = parse_money(&fixture.price)?;

        let addons = fixture
            .addons
            .into_iter()
            .map(|addon| Ok(AddOn::new(addon.id, addon.name, parse_money(&addon.price)?)))
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(Destination::new(DestinationId::new(fixture.key), fixture.name, base_price)
            .with_addons(addons))
    }
}

/// Parse a price string into money.
///
/// # Errors
///
/// Returns an error if the price cannot be parsed.
pub fn parse_money(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let (minor, currency) = parse_price(s)?;

    Ok(Money::from_minor(minor, currency))
}

/// Parse a price string like "150000 IDR" into minor units and currency.
///
/// # Errors
///
/// Returns an error if the amount is not a number or the currency is unknown.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    };

    let amount: Decimal =
        parse_amount(amount).ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency =
        currency_from_code(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    Ok((to_minor_units(amount, currency), currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{IDR, SGD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_reads_amount_and_currency() -> TestResult {
        assert_eq!(parse_price("150000 IDR")?, (15_000_000, IDR));
        assert_eq!(parse_price("12.50 SGD")?, (1250, SGD));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_bad_input() {
        assert!(matches!(parse_price("150000"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_price("abc IDR"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_price("1 2 IDR"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_price("10 XYZ"), Err(FixtureError::UnknownCurrency(_))));
    }

    #[test]
    fn destination_fixture_converts_with_catalog_order() -> TestResult {
        let fixture: DestinationFixture = serde_norway::from_str(
            "key: bromo\nname: Mount Bromo\nprice: 100000 IDR\naddons:\n  - { id: 2, name: Jeep, price: 30000 IDR }\n  - { id: 1, name: Lunch, price: 20000 IDR }\n",
        )?;

        let destination = Destination::try_from(fixture)?;
        let names: Vec<&str> = destination.addons.iter().map(|addon| addon.name.as_str()).collect();

        assert_eq!(destination.id.as_str(), "bromo");
        assert_eq!(names, vec!["Jeep", "Lunch"]);

        Ok(())
    }
}
