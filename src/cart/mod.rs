//! Cart

use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    items::{LineId, LineItem},
    money::sum,
    pricing::price_line_item,
};

pub mod totals;

pub use totals::{CartTotals, aggregate};

/// Errors related to cart construction or selection.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// An item's currency differs from the cart currency (index, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// An item was not found in the cart.
    #[error("Item {0} not found")]
    ItemNotFound(LineId),
}

/// Cart with a partial-checkout selection.
#[derive(Debug)]
pub struct Cart<'a> {
    items: Vec<LineItem<'a>>,
    selected: FxHashSet<LineId>,
    currency: &'a Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    #[must_use]
    pub fn new(currency: &'a Currency) -> Self {
        Cart {
            items: Vec::new(),
            selected: FxHashSet::default(),
            currency,
        }
    }

    /// Create a new cart with the given items. Nothing starts selected.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if there was a currency mismatch error.
    pub fn with_items(
        items: impl Into<Vec<LineItem<'a>>>,
        currency: &'a Currency,
    ) -> Result<Self, CartError> {
        let items = items.into();

        check_currency(&items, currency)?;

        Ok(Cart {
            items,
            selected: FxHashSet::default(),
            currency,
        })
    }

    /// Replace the cart contents with a fresh snapshot.
    ///
    /// Selection survives only for rows that are still present.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if there was a currency mismatch error. The cart is
    /// left untouched in that case.
    pub fn refresh(&mut self, items: impl Into<Vec<LineItem<'a>>>) -> Result<(), CartError> {
        let items = items.into();

        check_currency(&items, self.currency)?;

        let present: FxHashSet<&LineId> = items.iter().map(LineItem::id).collect();
        self.selected.retain(|id| present.contains(id));
        self.items = items;

        Ok(())
    }

    /// Remove a row from the cart, along with its selection.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the row is not in the cart.
    pub fn remove(&mut self, id: &LineId) -> Result<LineItem<'a>, CartError> {
        let position = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))?;

        self.selected.remove(id);

        Ok(self.items.remove(position))
    }

    /// Flip the selection of a single row. Returns whether it is now selected.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the row is not in the cart.
    pub fn toggle(&mut self, id: &LineId) -> Result<bool, CartError> {
        self.get_item(id)?;

        if self.selected.remove(id) {
            Ok(false)
        } else {
            self.selected.insert(id.clone());
            Ok(true)
        }
    }

    /// Select every row, or clear the selection if every row is already selected.
    pub fn select_all(&mut self) {
        if self.is_all_selected() {
            self.selected.clear();
        } else {
            self.selected = self.items.iter().map(|item| item.id().clone()).collect();
        }

        debug!(selected = self.selected.len(), "toggled select all");
    }

    /// Check whether every row is selected.
    pub fn is_all_selected(&self) -> bool {
        self.items
            .iter()
            .all(|item| self.selected.contains(item.id()))
    }

    /// Check whether a row is selected.
    pub fn is_selected(&self, id: &LineId) -> bool {
        self.selected.contains(id)
    }

    /// The selected row identifiers.
    pub fn selection(&self) -> &FxHashSet<LineId> {
        &self.selected
    }

    /// Iterate over the selected rows, in cart order.
    pub fn selected_items(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.items
            .iter()
            .filter(|item| self.selected.contains(item.id()))
    }

    /// Whether checkout is possible. Requires at least one selected row.
    pub fn can_checkout(&self) -> bool {
        self.selected_items().next().is_some()
    }

    /// Totals over the selected rows.
    pub fn totals(&self) -> CartTotals<'a> {
        aggregate(&self.items, &self.selected, self.currency)
    }

    /// Subtotal over every row, selected or not.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        let subtotals: Vec<Money<'a, Currency>> = self
            .items
            .iter()
            .map(|item| price_line_item(item).subtotal)
            .collect();

        sum(&subtotals, self.currency)
    }

    /// Get a row from the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the row is not found.
    pub fn get_item(&self, id: &LineId) -> Result<&LineItem<'a>, CartError> {
        self.items
            .iter()
            .find(|item| item.id() == id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))
    }

    /// Iterate over the rows in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.items.iter()
    }

    /// Get the number of rows in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }
}

pub(crate) fn check_currency(items: &[LineItem<'_>], currency: &Currency) -> Result<(), CartError> {
    items.iter().enumerate().try_for_each(|(i, item)| {
        let item_currency = item.currency();

        if item_currency == currency {
            Ok(())
        } else {
            Err(CartError::CurrencyMismatch(
                i,
                item_currency.iso_alpha_code,
                currency.iso_alpha_code,
            ))
        }
    })
}
