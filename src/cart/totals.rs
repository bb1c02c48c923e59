//! Cart Totals

use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};

use crate::{
    items::{LineId, LineItem},
    pricing::price_line_item,
};

/// Aggregated totals over a set of selected line items.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CartTotals<'a> {
    /// Number of tickets
    pub total_qty: u64,

    /// `Σ unit base × quantity`
    pub base_subtotal: Money<'a, Currency>,

    /// `Σ per-ticket add-on total × quantity`
    pub addon_subtotal: Money<'a, Currency>,

    /// Difference between persisted and computed subtotals.
    ///
    /// Zero unless a persisted subtotal overrides the computed one.
    pub persisted_adjustment: Money<'a, Currency>,

    /// `Σ line subtotal`
    pub grand_total: Money<'a, Currency>,
}

/// Aggregate the line items whose id is in `selected`.
///
/// `grand_total` always equals the sum of [`price_line_item`] subtotals over the
/// selected items, so the cart, payment and ticket views agree.
pub fn aggregate<'a>(
    items: &[LineItem<'a>],
    selected: &FxHashSet<LineId>,
    currency: &'a Currency,
) -> CartTotals<'a> {
    let mut total_qty = 0_u64;
    let mut base = 0_i64;
    let mut addon = 0_i64;
    let mut grand = 0_i64;

    for item in items.iter().filter(|item| selected.contains(item.id())) {
        let quantity = item.quantity();
        let price = price_line_item(item);

        total_qty = total_qty.saturating_add(u64::from(quantity));
        base = base.saturating_add(price.base_subtotal(quantity).to_minor_units());
        addon = addon.saturating_add(price.addon_subtotal(quantity).to_minor_units());
        grand = grand.saturating_add(price.subtotal.to_minor_units());
    }

    let adjustment = grand.saturating_sub(base.saturating_add(addon));

    CartTotals {
        total_qty,
        base_subtotal: Money::from_minor(base, currency),
        addon_subtotal: Money::from_minor(addon, currency),
        persisted_adjustment: Money::from_minor(adjustment, currency),
        grand_total: Money::from_minor(grand, currency),
    }
}
