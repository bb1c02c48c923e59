//! Wayfare prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    addons::{AddOn, AddonId, AddonIds, AddonSelection, resolve_selected_addons},
    backend::{Ack, BackendError, StorefrontBackend},
    bookings::{
        Booking, BookingAction, BookingCode, BookingError, BookingStatus, PaymentMethod,
        TicketLabel, Transition,
        session::{PaymentSession, SessionError},
    },
    cart::{Cart, CartError, CartTotals},
    checkout::{CheckoutError, CheckoutRequest, NewCartRow},
    clock::{Clock, FixedClock, SystemClock},
    config::{LogFormat, LoggingConfig, StorefrontConfig},
    countdown::{Countdown, CountdownError, CountdownTask, PAYMENT_WINDOW},
    destinations::{Destination, DestinationId},
    fixtures::{Fixture, FixtureError},
    items::{LineId, LineItem},
    money::DEFAULT_CURRENCY,
    pricing::{LinePrice, SubtotalSource, price_line_item, total_price},
    receipt::{Receipt, ReceiptError},
    records::{RecordError, decode_booking, decode_cart, decode_destination},
};
