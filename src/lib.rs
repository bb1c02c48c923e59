//! Wayfare
//!
//! Wayfare is the order pricing and cart reconciliation core of a travel-ticket
//! storefront. It prices cart rows and booking details from destination prices,
//! selected add-ons and quantities, reconciles those figures with the totals the
//! backend persisted, and drives a booking from checkout through payment or
//! cancellation.

pub mod addons;
pub mod backend;
pub mod bookings;
pub mod cart;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod destinations;
pub mod fixtures;
pub mod ids;
pub mod items;
pub mod logging;
pub mod money;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod records;
