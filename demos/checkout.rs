//! Checkout Demo
//!
//! Loads a fixture set, checks out the whole cart against an in-memory backend,
//! confirms payment for the pending booking and prints every receipt.
//!
//! Use `--fixture-set` to load a fixture set by name
//! Use `--currency` to change the currency prices are quoted in

use std::io::{self, Write};

use anyhow::{Result, bail};
use async_trait::async_trait;
use wayfare::{
    backend::{Ack, BackendError, StorefrontBackend},
    bookings::{BookingCode, BookingStatus, PaymentMethod, session::PaymentSession},
    checkout::{CheckoutRequest, NewCartRow},
    clock::SystemClock,
    config::StorefrontConfig,
    fixtures::Fixture,
    items::LineId,
    logging,
    receipt::Receipt,
};

/// Backend that accepts everything.
#[derive(Debug)]
struct AcceptingBackend;

#[async_trait]
impl StorefrontBackend for AcceptingBackend {
    async fn add_to_cart(&self, row: NewCartRow) -> Result<LineId, BackendError> {
        Ok(LineId::new(format!("new-{}", row.destination_id)))
    }

    async fn remove_from_cart(&self, _id: LineId) -> Result<(), BackendError> {
        Ok(())
    }

    async fn checkout(&self, request: CheckoutRequest) -> Result<BookingCode, BackendError> {
        Ok(BookingCode::new(format!("TRX-DEMO-{:04}", request.cart_ids.len())))
    }

    async fn confirm_payment(&self, _code: BookingCode) -> Result<Ack, BackendError> {
        Ok(Ack::Accepted)
    }

    async fn cancel_order(&self, _code: BookingCode) -> Result<Ack, BackendError> {
        Ok(Ack::Accepted)
    }
}

/// Checkout Demo
#[tokio::main]
pub async fn main() -> Result<()> {
    let config = StorefrontConfig::load()?;

    logging::init(&config.logging)?;

    let mut fixture = Fixture::with_base_path(&config.fixtures);
    fixture.load_set(&config.fixture_set)?;

    if fixture.currency()? != config.currency {
        bail!(
            "fixture set {} is priced in {}, not {}",
            config.fixture_set,
            fixture.currency()?.iso_alpha_code,
            config.currency.iso_alpha_code
        );
    }

    let backend = AcceptingBackend;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let mut cart = fixture.cart()?;
    cart.select_all();

    Receipt::for_cart(&cart).write_to(&mut handle)?;

    let request = CheckoutRequest::from_cart(&cart, PaymentMethod::Qris)?;
    let code = backend.checkout(request).await?;

    writeln!(handle, "Checked out as {code}")?;

    for booking in fixture.bookings() {
        let mut session = PaymentSession::open(booking.clone(), config.payment_window())?;

        if booking.status() == BookingStatus::Pending {
            if let Some(remaining) = session.remaining() {
                writeln!(handle, "{} has {remaining}s left to pay", booking.code())?;
            }

            session.confirm_payment(&backend).await?;
        }

        Receipt::for_booking(&session.close(), &SystemClock).write_to(&mut handle)?;
    }

    Ok(())
}
