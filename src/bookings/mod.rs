//! Bookings
//!
//! A booking is created at checkout in [`BookingStatus::Pending`] and ends in
//! either [`BookingStatus::Paid`] or [`BookingStatus::Cancelled`]. Both are
//! terminal. "Expired" is not a status: it is a label derived at read time for
//! paid tickets whose visit date has passed, see [`TicketLabel`].

use std::{fmt, str::FromStr};

use jiff::{Timestamp, civil::Date};
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::info;

use crate::{
    cart::{CartError, CartTotals, aggregate, check_currency},
    ids::wire_id,
    items::{LineId, LineItem},
    pricing::total_price,
};

pub mod session;

wire_id! {
    /// Booking code, the external reference used in payment and ticket links.
    BookingCode
}

/// Persisted booking status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting payment
    Pending,

    /// Payment confirmed
    Paid,

    /// Cancelled by the customer
    Cancelled,
}

impl BookingStatus {
    /// Returns the wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Check whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status or payment method.
#[derive(Debug, Error, PartialEq)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl FromStr for BookingStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(ParseEnumError {
                kind: "booking status",
                value: s.to_string(),
            }),
        }
    }
}

/// How the customer pays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// QRIS code
    Qris,

    /// Manual bank transfer
    BankTransfer,
}

impl PaymentMethod {
    /// Returns the wire name of the payment method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Qris => "qris",
            Self::BankTransfer => "bank_transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qris" => Ok(Self::Qris),
            "bank_transfer" | "bank-transfer" | "transfer" => Ok(Self::BankTransfer),
            _ => Err(ParseEnumError {
                kind: "payment method",
                value: s.to_string(),
            }),
        }
    }
}

/// A state-changing action on a booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingAction {
    /// Confirm the payment
    ConfirmPayment,

    /// Cancel the order
    Cancel,
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConfirmPayment => "confirm payment",
            Self::Cancel => "cancel",
        })
    }
}

/// Outcome of an accepted action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The status changed.
    Changed {
        /// Status before the action
        from: BookingStatus,
        /// Status after the action
        to: BookingStatus,
    },

    /// The booking was already in the requested state.
    Unchanged,
}

/// Errors raised by booking construction or transitions.
#[derive(Debug, Error, PartialEq)]
pub enum BookingError {
    /// The action is not allowed from the booking's current status.
    #[error("cannot {action} booking {code} while it is {status}")]
    InvalidTransition {
        /// Booking the action was attempted on
        code: BookingCode,
        /// Status at the time of the attempt
        status: BookingStatus,
        /// Rejected action
        action: BookingAction,
    },

    /// A detail is priced in a different currency than the booking.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Display label for a single ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketLabel {
    /// Awaiting payment
    Pending,

    /// Paid and still valid
    Paid,

    /// Cancelled
    Cancelled,

    /// Paid, but the visit date has passed
    Expired,
}

impl fmt::Display for TicketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Cancelled => "Cancelled",
            Self::Expired => "Expired",
        })
    }
}

/// Whether a detail of a booking in `status` counts as expired on `today`.
///
/// Only paid tickets expire, and only once their visit date is strictly in the
/// past. Details without a visit date never expire.
pub fn is_expired(status: BookingStatus, detail: &LineItem<'_>, today: Date) -> bool {
    status == BookingStatus::Paid && detail.visit_date().is_some_and(|visit| visit < today)
}

/// Label a detail of a booking in `status` as of `today`.
pub fn ticket_label(status: BookingStatus, detail: &LineItem<'_>, today: Date) -> TicketLabel {
    match status {
        BookingStatus::Pending => TicketLabel::Pending,
        BookingStatus::Cancelled => TicketLabel::Cancelled,
        BookingStatus::Paid if is_expired(status, detail, today) => TicketLabel::Expired,
        BookingStatus::Paid => TicketLabel::Paid,
    }
}

/// A placed order.
#[derive(Clone, Debug, PartialEq)]
pub struct Booking<'a> {
    code: BookingCode,
    status: BookingStatus,
    details: Vec<LineItem<'a>>,
    grand_total: Option<Money<'a, Currency>>,
    payment_method: Option<PaymentMethod>,
    created_at: Option<Timestamp>,
    currency: &'a Currency,
}

impl<'a> Booking<'a> {
    /// Create a booking with no details.
    pub fn new(
        code: impl Into<BookingCode>,
        status: BookingStatus,
        currency: &'a Currency,
    ) -> Self {
        Self {
            code: code.into(),
            status,
            details: Vec::new(),
            grand_total: None,
            payment_method: None,
            created_at: None,
            currency,
        }
    }

    /// Set the booking details.
    ///
    /// # Errors
    ///
    /// Returns a [`BookingError::Cart`] if a detail is priced in another currency.
    pub fn with_details(
        mut self,
        details: impl Into<Vec<LineItem<'a>>>,
    ) -> Result<Self, BookingError> {
        let details = details.into();

        check_currency(&details, self.currency)?;

        self.details = details;

        Ok(self)
    }

    /// Set the grand total persisted by the backend.
    #[must_use]
    pub fn with_grand_total(mut self, grand_total: Money<'a, Currency>) -> Self {
        self.grand_total = Some(grand_total);
        self
    }

    /// Set the payment method.
    #[must_use]
    pub fn with_payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = Some(payment_method);
        self
    }

    /// Set the creation time.
    #[must_use]
    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Booking code
    pub fn code(&self) -> &BookingCode {
        &self.code
    }

    /// Current status
    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// Booking details, in order
    pub fn details(&self) -> &[LineItem<'a>] {
        &self.details
    }

    /// Persisted grand total, as sent by the backend
    pub fn grand_total(&self) -> Option<&Money<'a, Currency>> {
        self.grand_total.as_ref()
    }

    /// Payment method
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// Creation time
    pub fn created_at(&self) -> Option<Timestamp> {
        self.created_at
    }

    /// Booking currency
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Sum of the detail subtotals under the line pricing rule.
    pub fn computed_total(&self) -> Money<'a, Currency> {
        total_price(&self.details, self.currency)
    }

    /// The total to display: the persisted grand total when present and positive,
    /// otherwise the computed total.
    pub fn display_total(&self) -> Money<'a, Currency> {
        match self.grand_total {
            Some(total) if total.to_minor_units() > 0 => total,
            _ => self.computed_total(),
        }
    }

    /// Aggregated totals over every detail.
    pub fn totals(&self) -> CartTotals<'a> {
        let all: FxHashSet<LineId> = self
            .details
            .iter()
            .map(|detail| detail.id().clone())
            .collect();

        aggregate(&self.details, &all, self.currency)
    }

    /// Labels for every detail, as of `today`.
    pub fn ticket_labels(&self, today: Date) -> SmallVec<[TicketLabel; 4]> {
        self.details
            .iter()
            .map(|detail| ticket_label(self.status, detail, today))
            .collect()
    }

    /// Mark the booking as paid.
    ///
    /// Confirming an already-paid booking is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] if the booking was cancelled.
    #[tracing::instrument(skip_all, fields(booking_code = %self.code, status = %self.status))]
    pub fn confirm_payment(&mut self) -> Result<Transition, BookingError> {
        match self.status {
            BookingStatus::Pending => Ok(self.transition(BookingStatus::Paid)),
            BookingStatus::Paid => Ok(Transition::Unchanged),
            BookingStatus::Cancelled => Err(self.rejected(BookingAction::ConfirmPayment)),
        }
    }

    /// Cancel the booking.
    ///
    /// Cancelling an already-cancelled booking is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] if the booking was paid.
    #[tracing::instrument(skip_all, fields(booking_code = %self.code, status = %self.status))]
    pub fn cancel(&mut self) -> Result<Transition, BookingError> {
        match self.status {
            BookingStatus::Pending => Ok(self.transition(BookingStatus::Cancelled)),
            BookingStatus::Cancelled => Ok(Transition::Unchanged),
            BookingStatus::Paid => Err(self.rejected(BookingAction::Cancel)),
        }
    }

    fn transition(&mut self, to: BookingStatus) -> Transition {
        let from = self.status;
        self.status = to;

        info!(%from, %to, "booking status changed");

        Transition::Changed { from, to }
    }

    fn rejected(&self, action: BookingAction) -> BookingError {
        BookingError::InvalidTransition {
            code: self.code.clone(),
            status: self.status,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use rusty_money::iso::{IDR, SGD};
    use testresult::TestResult;

    use crate::destinations::Destination;

    use super::*;

    const TODAY: Date = Date::constant(2026, 10, 16);

    fn idr<'a>(major: i64) -> Money<'a, Currency> {
        Money::from_minor(major * 100, IDR)
    }

    fn detail<'a>(id: &str, visit: Date) -> LineItem<'a> {
        LineItem::new(id, Destination::new("ubud", "Ubud", idr(50_000)), 2).with_visit_date(visit)
    }

    fn booking<'a>(status: BookingStatus, visit: Date) -> Result<Booking<'a>, BookingError> {
        Booking::new("TRX-1", status, IDR).with_details([detail("d1", visit)])
    }

    #[test]
    fn confirm_moves_pending_to_paid() -> TestResult {
        let mut booking = booking(BookingStatus::Pending, TODAY)?;

        let transition = booking.confirm_payment()?;

        assert_eq!(
            transition,
            Transition::Changed {
                from: BookingStatus::Pending,
                to: BookingStatus::Paid
            }
        );
        assert_eq!(booking.status(), BookingStatus::Paid);

        Ok(())
    }

    #[test]
    fn confirm_is_idempotent() -> TestResult {
        let mut booking = booking(BookingStatus::Paid, TODAY)?;

        assert_eq!(booking.confirm_payment()?, Transition::Unchanged);
        assert_eq!(booking.status(), BookingStatus::Paid);

        Ok(())
    }

    #[test]
    fn cancel_after_payment_is_rejected() -> TestResult {
        let mut booking = booking(BookingStatus::Pending, TODAY)?;
        booking.confirm_payment()?;

        let err = booking.cancel().err();

        assert_eq!(
            err,
            Some(BookingError::InvalidTransition {
                code: BookingCode::from("TRX-1"),
                status: BookingStatus::Paid,
                action: BookingAction::Cancel,
            })
        );
        assert_eq!(booking.status(), BookingStatus::Paid);

        Ok(())
    }

    #[test]
    fn cancel_moves_pending_to_cancelled() -> TestResult {
        let mut booking = booking(BookingStatus::Pending, TODAY)?;

        booking.cancel()?;

        assert_eq!(booking.status(), BookingStatus::Cancelled);
        assert_eq!(booking.cancel()?, Transition::Unchanged);

        Ok(())
    }

    #[test]
    fn confirm_after_cancel_is_rejected() -> TestResult {
        let mut booking = booking(BookingStatus::Cancelled, TODAY)?;

        assert!(matches!(
            booking.confirm_payment(),
            Err(BookingError::InvalidTransition {
                action: BookingAction::ConfirmPayment,
                ..
            })
        ));
        assert_eq!(booking.status(), BookingStatus::Cancelled);

        Ok(())
    }

    #[test]
    fn paid_ticket_from_yesterday_is_expired() -> TestResult {
        let yesterday = TODAY.checked_sub(1.day())?;
        let tomorrow = TODAY.checked_add(1.day())?;

        let expired = booking(BookingStatus::Paid, yesterday)?;
        let upcoming = booking(BookingStatus::Paid, tomorrow)?;
        let today = booking(BookingStatus::Paid, TODAY)?;
        let unpaid = booking(BookingStatus::Pending, yesterday)?;

        assert_eq!(expired.ticket_labels(TODAY).as_slice(), &[TicketLabel::Expired]);
        assert_eq!(upcoming.ticket_labels(TODAY).as_slice(), &[TicketLabel::Paid]);
        assert_eq!(today.ticket_labels(TODAY).as_slice(), &[TicketLabel::Paid]);
        assert_eq!(unpaid.ticket_labels(TODAY).as_slice(), &[TicketLabel::Pending]);

        Ok(())
    }

    #[test]
    fn expiry_is_evaluated_against_the_given_day() -> TestResult {
        let booking = booking(BookingStatus::Paid, TODAY)?;
        let tomorrow = TODAY.checked_add(1.day())?;

        assert_eq!(booking.ticket_labels(TODAY).as_slice(), &[TicketLabel::Paid]);
        assert_eq!(booking.ticket_labels(tomorrow).as_slice(), &[TicketLabel::Expired]);
        assert_eq!(booking.status(), BookingStatus::Paid);

        Ok(())
    }

    #[test]
    fn details_without_visit_date_never_expire() {
        let detail = LineItem::new("d", Destination::new("ubud", "Ubud", idr(1)), 1);

        assert!(!is_expired(BookingStatus::Paid, &detail, TODAY));
    }

    #[test]
    fn display_total_prefers_positive_persisted_total() -> TestResult {
        let persisted = booking(BookingStatus::Pending, TODAY)?.with_grand_total(idr(99_000));
        let zero = booking(BookingStatus::Pending, TODAY)?.with_grand_total(idr(0));
        let missing = booking(BookingStatus::Pending, TODAY)?;

        assert_eq!(persisted.display_total(), idr(99_000));
        assert_eq!(zero.display_total(), idr(100_000));
        assert_eq!(missing.display_total(), idr(100_000));

        Ok(())
    }

    #[test]
    fn totals_cover_every_detail() -> TestResult {
        let booking = Booking::new("TRX-2", BookingStatus::Paid, IDR)
            .with_details([detail("d1", TODAY), detail("d2", TODAY)])?;

        let totals = booking.totals();

        assert_eq!(totals.total_qty, 4);
        assert_eq!(totals.grand_total, booking.computed_total());

        Ok(())
    }

    #[test]
    fn details_in_another_currency_are_rejected() {
        let foreign = LineItem::new(
            "sg",
            Destination::new("sg", "Sentosa", Money::from_minor(100, SGD)),
            1,
        );

        let result = Booking::new("TRX-3", BookingStatus::Pending, IDR).with_details([foreign]);

        assert!(matches!(
            result,
            Err(BookingError::Cart(CartError::CurrencyMismatch(0, _, _)))
        ));
    }

    #[test]
    fn statuses_and_methods_parse_from_wire_names() -> TestResult {
        assert_eq!("paid".parse::<BookingStatus>()?, BookingStatus::Paid);
        assert_eq!("Canceled".parse::<BookingStatus>()?, BookingStatus::Cancelled);
        assert_eq!("bank_transfer".parse::<PaymentMethod>()?, PaymentMethod::BankTransfer);
        assert!("refunded".parse::<BookingStatus>().is_err());

        Ok(())
    }
}
