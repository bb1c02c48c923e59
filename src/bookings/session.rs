//! Payment Session
//!
//! Binds a booking to its payment countdown for as long as the payment page is
//! open. The countdown only runs while the booking is pending and is released as
//! soon as the booking leaves that state or the session is closed.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    backend::{Ack, BackendError, StorefrontBackend},
    bookings::{Booking, BookingError, BookingStatus, Transition},
    countdown::{CountdownError, CountdownTask},
};

/// Errors raised by payment session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The booking state machine rejected the action.
    #[error(transparent)]
    Booking(#[from] BookingError),

    /// The backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The countdown could not be started.
    #[error(transparent)]
    Countdown(#[from] CountdownError),
}

/// A booking being paid for.
#[derive(Debug)]
pub struct PaymentSession<'a> {
    booking: Booking<'a>,
    countdown: Option<CountdownTask>,
}

impl<'a> PaymentSession<'a> {
    /// Open a session, starting a countdown over `window` if the booking is pending.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Countdown`] if a countdown is needed but no runtime is available.
    pub fn open(booking: Booking<'a>, window: Duration) -> Result<Self, SessionError> {
        let countdown = if booking.status() == BookingStatus::Pending {
            Some(CountdownTask::start(window)?)
        } else {
            None
        };

        Ok(Self { booking, countdown })
    }

    /// The booking as currently known.
    pub fn booking(&self) -> &Booking<'a> {
        &self.booking
    }

    /// Subscribe to the countdown, if one is running.
    pub fn countdown(&self) -> Option<watch::Receiver<u64>> {
        self.countdown.as_ref().map(CountdownTask::subscribe)
    }

    /// Seconds left to pay, if a countdown is attached.
    pub fn remaining(&self) -> Option<u64> {
        self.countdown.as_ref().map(CountdownTask::remaining)
    }

    /// Confirm payment with the backend, then mark the booking as paid.
    ///
    /// Already-paid bookings succeed without calling the backend. A call aborted
    /// in flight leaves the booking and countdown untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the booking was cancelled or the backend call failed.
    #[tracing::instrument(skip_all, fields(booking_code = %self.booking.code()))]
    pub async fn confirm_payment<B>(&mut self, backend: &B) -> Result<Transition, SessionError>
    where
        B: StorefrontBackend + ?Sized,
    {
        if self.booking.status() != BookingStatus::Pending {
            return Ok(self.booking.confirm_payment()?);
        }

        match backend.confirm_payment(self.booking.code().clone()).await? {
            Ack::Accepted => {
                let transition = self.booking.confirm_payment()?;
                self.release_countdown();

                Ok(transition)
            }
            Ack::Aborted => {
                warn!("payment confirmation aborted before a result arrived");

                Ok(Transition::Unchanged)
            }
        }
    }

    /// Cancel the order with the backend, then mark the booking as cancelled.
    ///
    /// Paid bookings are rejected without calling the backend.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the booking was paid or the backend call failed.
    #[tracing::instrument(skip_all, fields(booking_code = %self.booking.code()))]
    pub async fn cancel<B>(&mut self, backend: &B) -> Result<Transition, SessionError>
    where
        B: StorefrontBackend + ?Sized,
    {
        if self.booking.status() != BookingStatus::Pending {
            return Ok(self.booking.cancel()?);
        }

        match backend.cancel_order(self.booking.code().clone()).await? {
            Ack::Accepted => {
                let transition = self.booking.cancel()?;
                self.release_countdown();

                Ok(transition)
            }
            Ack::Aborted => {
                warn!("cancellation aborted before a result arrived");

                Ok(Transition::Unchanged)
            }
        }
    }

    /// Replace the booking with a fresh snapshot from the backend.
    ///
    /// The countdown is released if the snapshot is no longer pending.
    pub fn refresh(&mut self, booking: Booking<'a>) {
        self.booking = booking;

        if self.booking.status() != BookingStatus::Pending {
            self.release_countdown();
        }
    }

    /// Close the session, releasing the countdown.
    pub fn close(mut self) -> Booking<'a> {
        self.release_countdown();
        self.booking
    }

    fn release_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            info!(remaining = countdown.remaining(), "released payment countdown");
            countdown.stop();
        }
    }
}
