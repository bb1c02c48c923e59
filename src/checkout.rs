//! Checkout
//!
//! Requests sent to the backend when the customer adds to cart or checks out.

use jiff::civil::Date;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::{
    addons::{AddonIds, AddonSelection, resolve_selected_addons},
    bookings::PaymentMethod,
    cart::Cart,
    destinations::{Destination, DestinationId},
    items::LineId,
};

/// Errors raised while building a checkout or add-to-cart request.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// No cart rows are selected.
    #[error("no cart items selected")]
    NothingSelected,

    /// At least one ticket is required.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// Checkout of the selected cart rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckoutRequest {
    /// Selected cart rows, in cart order
    pub cart_ids: Vec<LineId>,

    /// How the customer will pay
    pub payment_method: PaymentMethod,
}

impl CheckoutRequest {
    /// Build a checkout request from the cart's current selection.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NothingSelected`] if no rows are selected.
    #[tracing::instrument(skip(cart), fields(cart_len = cart.len()))]
    pub fn from_cart(
        cart: &Cart<'_>,
        payment_method: PaymentMethod,
    ) -> Result<Self, CheckoutError> {
        let cart_ids: Vec<LineId> = cart.selected_items().map(|item| item.id().clone()).collect();

        if cart_ids.is_empty() {
            return Err(CheckoutError::NothingSelected);
        }

        info!(selected = cart_ids.len(), "built checkout request");

        Ok(Self {
            cart_ids,
            payment_method,
        })
    }
}

/// A new cart row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewCartRow {
    /// Destination being booked
    pub destination_id: DestinationId,

    /// Number of tickets
    pub quantity: u32,

    /// Visit date
    pub visit_date: Date,

    /// Selected add-ons, limited to the destination's catalog
    pub addons: AddonIds,
}

impl NewCartRow {
    /// Build a cart row for `destination`. Add-ons outside the catalog are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::ZeroQuantity`] if `quantity` is zero.
    pub fn new(
        destination: &Destination<'_>,
        quantity: u32,
        visit_date: Date,
        selection: &AddonSelection,
    ) -> Result<Self, CheckoutError> {
        if quantity == 0 {
            return Err(CheckoutError::ZeroQuantity);
        }

        let addons = AddonIds::of(resolve_selected_addons(&destination.addons, selection));

        Ok(Self {
            destination_id: destination.id.clone(),
            quantity,
            visit_date,
            addons,
        })
    }
}
