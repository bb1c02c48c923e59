//! Storefront backend
//!
//! The REST backend owns destinations, carts and bookings. This crate never talks
//! to it directly; callers hand in an implementation of [`StorefrontBackend`] and
//! feed the snapshots it returns back through [`crate::records`].

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{
    bookings::BookingCode,
    checkout::{CheckoutRequest, NewCartRow},
    items::LineId,
};

/// Errors reported by the backend.
#[derive(Debug, Error, PartialEq)]
pub enum BackendError {
    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the request.
    #[error("backend rejected the request: {0}")]
    Rejected(String),
}

/// Acknowledgement of a mutation that may have been cancelled in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ack {
    /// The backend applied the change.
    Accepted,

    /// The call was cancelled before a result arrived. Nothing is known to have changed.
    Aborted,
}

/// Mutations the storefront sends to its backend.
#[automock]
#[async_trait]
pub trait StorefrontBackend: Send + Sync {
    /// Add a row to the customer's cart.
    async fn add_to_cart(&self, row: NewCartRow) -> Result<LineId, BackendError>;

    /// Remove a row from the customer's cart.
    async fn remove_from_cart(&self, id: LineId) -> Result<(), BackendError>;

    /// Turn the selected cart rows into a pending booking.
    async fn checkout(&self, request: CheckoutRequest) -> Result<BookingCode, BackendError>;

    /// Confirm payment for a booking.
    async fn confirm_payment(&self, code: BookingCode) -> Result<Ack, BackendError>;

    /// Cancel a pending booking.
    async fn cancel_order(&self, code: BookingCode) -> Result<Ack, BackendError>;
}
