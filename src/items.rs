//! Line items
//!
//! A [`LineItem`] is one destination booked for one visit date. Cart rows and
//! booking details share this shape; the booking stage adds a price snapshot and
//! the subtotal the backend persisted when the order was placed.

use jiff::civil::Date;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    addons::{AddOn, AddonIds, AddonSelection, resolve_ids},
    destinations::Destination,
    ids::wire_id,
};

wire_id! {
    /// Cart row or booking detail identifier
    LineId
}

/// A priced unit of a cart or booking.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    id: LineId,
    destination: Destination<'a>,
    quantity: u32,
    visit_date: Option<Date>,
    addons: AddonIds,
    unit_price: Option<Money<'a, Currency>>,
    persisted_subtotal: Option<Money<'a, Currency>>,
}

impl<'a> LineItem<'a> {
    /// Creates a new line item with no add-ons and no persisted pricing.
    pub fn new(id: impl Into<LineId>, destination: Destination<'a>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            destination,
            quantity,
            visit_date: None,
            addons: AddonIds::default(),
            unit_price: None,
            persisted_subtotal: None,
        }
    }

    /// Set the visit date.
    #[must_use]
    pub fn with_visit_date(mut self, visit_date: Date) -> Self {
        self.visit_date = Some(visit_date);
        self
    }

    /// Set the selected add-ons from a raw selection payload.
    #[must_use]
    pub fn with_selection(mut self, selection: &AddonSelection) -> Self {
        self.addons = selection.ids();
        self
    }

    /// Set the selected add-ons from normalised identifiers.
    #[must_use]
    pub fn with_addons(mut self, addons: AddonIds) -> Self {
        self.addons = addons;
        self
    }

    /// Set the unit price snapshot taken when the order was placed.
    #[must_use]
    pub fn with_unit_price(mut self, unit_price: Money<'a, Currency>) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    /// Set the subtotal persisted by the backend.
    #[must_use]
    pub fn with_persisted_subtotal(mut self, subtotal: Money<'a, Currency>) -> Self {
        self.persisted_subtotal = Some(subtotal);
        self
    }

    /// Returns the line identifier
    pub fn id(&self) -> &LineId {
        &self.id
    }

    /// Returns the booked destination
    pub fn destination(&self) -> &Destination<'a> {
        &self.destination
    }

    /// Returns the number of tickets
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the visit date, if known
    pub fn visit_date(&self) -> Option<Date> {
        self.visit_date
    }

    /// Returns the selected add-on identifiers, unresolved
    pub fn addons(&self) -> &AddonIds {
        &self.addons
    }

    /// Returns the unit price snapshot, if one was taken
    pub fn unit_price(&self) -> Option<&Money<'a, Currency>> {
        self.unit_price.as_ref()
    }

    /// Returns the persisted subtotal, if the backend wrote one
    pub fn persisted_subtotal(&self) -> Option<&Money<'a, Currency>> {
        self.persisted_subtotal.as_ref()
    }

    /// Per-ticket base price: the snapshot if present, else the live destination price.
    pub fn unit_base(&self) -> Money<'a, Currency> {
        self.unit_price.unwrap_or(self.destination.base_price)
    }

    /// The selected add-ons that exist in the destination's catalog.
    pub fn resolved_addons(&self) -> SmallVec<[&AddOn<'a>; 4]> {
        resolve_ids(&self.destination.addons, &self.addons)
    }

    /// Currency the line is priced in.
    pub fn currency(&self) -> &'a Currency {
        self.destination.currency()
    }
}
