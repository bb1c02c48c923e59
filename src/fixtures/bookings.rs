//! Booking Fixtures

use serde::Deserialize;

use crate::{
    bookings::{BookingCode, BookingStatus, PaymentMethod},
    fixtures::carts::LineFixture,
};

/// Wrapper for bookings in YAML
#[derive(Debug, Deserialize)]
pub struct BookingsFixture {
    /// Bookings
    pub bookings: Vec<BookingFixture>,
}

/// Booking fixture from YAML
#[derive(Debug, Deserialize)]
pub struct BookingFixture {
    /// Booking code
    pub code: BookingCode,

    /// Booking status
    pub status: BookingStatus,

    /// Payment method
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,

    /// Persisted grand total (e.g., "240000 IDR")
    #[serde(default)]
    pub grand_total: Option<String>,

    /// Booking details
    #[serde(default)]
    pub details: Vec<LineFixture>,
}
