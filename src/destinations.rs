//! Destinations

use rusty_money::{Money, iso::Currency};

use crate::{
    addons::{AddOn, AddonId},
    ids::wire_id,
};

wire_id! {
    /// Destination identifier
    DestinationId
}

/// A bookable destination. Read-only reference data for pricing.
#[derive(Clone, Debug, PartialEq)]
pub struct Destination<'a> {
    /// Destination identifier
    pub id: DestinationId,

    /// Destination name
    pub name: String,

    /// Current ticket price
    pub base_price: Money<'a, Currency>,

    /// Add-on catalog, in display order
    pub addons: Vec<AddOn<'a>>,
}

impl<'a> Destination<'a> {
    /// Create a destination with an empty add-on catalog.
    pub fn new(
        id: impl Into<DestinationId>,
        name: impl Into<String>,
        base_price: Money<'a, Currency>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_price,
            addons: Vec::new(),
        }
    }

    /// Replace the add-on catalog.
    #[must_use]
    pub fn with_addons(mut self, addons: impl Into<Vec<AddOn<'a>>>) -> Self {
        self.addons = addons.into();
        self
    }

    /// Look up an add-on in the catalog.
    pub fn addon(&self, id: &AddonId) -> Option<&AddOn<'a>> {
        self.addons.iter().find(|addon| &addon.id == id)
    }

    /// Currency the destination is priced in.
    pub fn currency(&self) -> &'a Currency {
        self.base_price.currency()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::IDR;

    use super::*;

    #[test]
    fn addon_lookup_by_id() {
        let destination =
            Destination::new("bromo", "Mount Bromo", Money::from_minor(10_000_000, IDR))
                .with_addons([AddOn::new("1", "Lunch", Money::from_minor(2_000_000, IDR))]);

        assert_eq!(
            destination.addon(&AddonId::from("1")).map(|addon| addon.name.as_str()),
            Some("Lunch")
        );
        assert!(destination.addon(&AddonId::from("2")).is_none());
    }

    #[test]
    fn new_destination_has_no_addons() {
        let destination = Destination::new("ijen", "Kawah Ijen", Money::from_minor(0, IDR));

        assert!(destination.addons.is_empty());
        assert_eq!(destination.currency(), IDR);
    }
}
