//! Pricing
//!
//! One rule prices every line item, whether it sits in a cart, on the payment
//! page or on a ticket:
//!
//! ```text
//! subtotal = persisted subtotal, when present and > 0
//!          = (unit base + Σ selected add-on prices) × quantity, otherwise
//! ```

use rusty_money::{Money, iso::Currency};
use tracing::trace;

use crate::{
    addons::AddonIds,
    items::LineItem,
    money::{sum, times},
};

/// Where a line's final subtotal came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubtotalSource {
    /// The backend's persisted subtotal was used.
    Persisted,

    /// The subtotal was recomputed from prices and quantity.
    Computed,
}

/// The priced breakdown of a single line item.
#[derive(Clone, Debug, PartialEq)]
pub struct LinePrice<'a> {
    /// Per-ticket base price used
    pub unit_base: Money<'a, Currency>,

    /// Sum of the resolved add-on prices, per ticket
    pub per_unit_addon_total: Money<'a, Currency>,

    /// `(unit_base + per_unit_addon_total) × quantity`
    pub computed_subtotal: Money<'a, Currency>,

    /// Final subtotal after applying the persisted-subtotal policy
    pub subtotal: Money<'a, Currency>,

    /// Where `subtotal` came from
    pub source: SubtotalSource,

    /// Identifiers of the add-ons that resolved against the catalog
    pub addons: AddonIds,
}

impl<'a> LinePrice<'a> {
    /// Base price across all tickets, add-ons excluded.
    pub fn base_subtotal(&self, quantity: u32) -> Money<'a, Currency> {
        times(&self.unit_base, quantity)
    }

    /// Add-on price across all tickets.
    pub fn addon_subtotal(&self, quantity: u32) -> Money<'a, Currency> {
        times(&self.per_unit_addon_total, quantity)
    }
}

/// Price a single line item.
pub fn price_line_item<'a>(item: &LineItem<'a>) -> LinePrice<'a> {
    let currency = item.currency();
    let unit_base = item.unit_base();
    let resolved = item.resolved_addons();

    let per_unit_addon_total = sum(resolved.iter().map(|addon| &addon.price), currency);

    let per_unit = Money::from_minor(
        unit_base
            .to_minor_units()
            .saturating_add(per_unit_addon_total.to_minor_units()),
        currency,
    );

    let computed_subtotal = times(&per_unit, item.quantity());

    let (subtotal, source) = match item.persisted_subtotal() {
        Some(persisted) if persisted.to_minor_units() > 0 => {
            (*persisted, SubtotalSource::Persisted)
        }
        _ => {
            trace!(line = %item.id(), "no usable persisted subtotal, using computed value");

            (computed_subtotal, SubtotalSource::Computed)
        }
    };

    LinePrice {
        unit_base,
        per_unit_addon_total,
        computed_subtotal,
        subtotal,
        source,
        addons: AddonIds::of(resolved.iter().copied()),
    }
}

/// Calculates the total of a list of line items under the line pricing rule.
pub fn total_price<'a>(items: &[LineItem<'a>], currency: &'a Currency) -> Money<'a, Currency> {
    let subtotals: Vec<Money<'a, Currency>> = items
        .iter()
        .map(|item| price_line_item(item).subtotal)
        .collect();

    sum(&subtotals, currency)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::IDR;

    use crate::{
        addons::{AddOn, AddonSelection},
        destinations::Destination,
    };

    use super::*;

    fn idr<'a>(major: i64) -> Money<'a, Currency> {
        Money::from_minor(major * 100, IDR)
    }

    fn lunch_destination<'a>() -> Destination<'a> {
        Destination::new("bromo", "Mount Bromo", idr(100_000))
            .with_addons([AddOn::new("1", "Lunch", idr(20_000))])
    }

    #[test]
    fn encoded_selection_scenario() {
        let item =
            LineItem::new("a", lunch_destination(), 2).with_selection(&AddonSelection::from("[1]"));

        let price = price_line_item(&item);

        assert_eq!(price.per_unit_addon_total, idr(20_000));
        assert_eq!(price.subtotal, idr(240_000));
        assert_eq!(price.source, SubtotalSource::Computed);
    }

    #[test]
    fn positive_persisted_subtotal_wins() {
        let item = LineItem::new("a", lunch_destination(), 2)
            .with_selection(&AddonSelection::from("[1]"))
            .with_persisted_subtotal(idr(199_000));

        let price = price_line_item(&item);

        assert_eq!(price.subtotal, idr(199_000));
        assert_eq!(price.computed_subtotal, idr(240_000));
        assert_eq!(price.source, SubtotalSource::Persisted);
    }

    #[test]
    fn zero_persisted_subtotal_falls_back_to_computed() {
        let item = LineItem::new("a", lunch_destination(), 1).with_persisted_subtotal(idr(0));

        let price = price_line_item(&item);

        assert_eq!(price.subtotal, idr(100_000));
        assert_eq!(price.source, SubtotalSource::Computed);
    }

    #[test]
    fn negative_persisted_subtotal_falls_back_to_computed() {
        let item = LineItem::new("a", lunch_destination(), 1).with_persisted_subtotal(idr(-5));

        assert_eq!(price_line_item(&item).subtotal, idr(100_000));
    }

    #[test]
    fn unit_price_snapshot_is_used_over_live_price() {
        let item = LineItem::new("a", lunch_destination(), 3).with_unit_price(idr(90_000));

        assert_eq!(price_line_item(&item).subtotal, idr(270_000));
    }

    #[test]
    fn zero_quantity_prices_to_zero() {
        let item =
            LineItem::new("a", lunch_destination(), 0).with_selection(&AddonSelection::from("[1]"));

        assert_eq!(price_line_item(&item).subtotal, idr(0));
    }

    #[test]
    fn unknown_addons_do_not_change_the_price() {
        let item =
            LineItem::new("a", lunch_destination(), 1).with_selection(&AddonSelection::from("[7]"));

        let price = price_line_item(&item);

        assert_eq!(price.subtotal, idr(100_000));
        assert!(price.addons.is_empty());
    }

    #[test]
    fn base_and_addon_subtotals_split_the_computed_subtotal() {
        let item =
            LineItem::new("a", lunch_destination(), 2).with_selection(&AddonSelection::from("[1]"));

        let price = price_line_item(&item);

        assert_eq!(price.base_subtotal(2), idr(200_000));
        assert_eq!(price.addon_subtotal(2), idr(40_000));
    }

    #[test]
    fn total_price_sums_line_subtotals() {
        let items = [
            LineItem::new("a", lunch_destination(), 1),
            LineItem::new("b", lunch_destination(), 1).with_persisted_subtotal(idr(50_000)),
        ];

        assert_eq!(total_price(&items, IDR), idr(150_000));
    }

    #[test]
    fn total_price_of_nothing_is_zero() {
        assert_eq!(total_price(&[], IDR), idr(0));
    }
}
