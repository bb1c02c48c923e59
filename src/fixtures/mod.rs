//! Fixtures
//!
//! YAML fixture sets for demos and tests. A set named `storefront` lives in
//! `fixtures/destinations/storefront.yml`, `fixtures/carts/storefront.yml` and
//! `fixtures/bookings/storefront.yml`; carts and bookings refer to destinations
//! by key.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    bookings::{Booking, BookingError},
    cart::{Cart, CartError},
    destinations::Destination,
    fixtures::{
        bookings::BookingsFixture,
        carts::{CartFixture, LineFixture},
        destinations::{DestinationsFixture, parse_money},
    },
    items::LineItem,
};

pub mod bookings;
pub mod carts;
pub mod destinations;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between fixtures
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No destinations loaded yet
    #[error("No destinations loaded yet; currency unknown")]
    NoCurrency,

    /// Destination not found
    #[error("Destination not found: {0}")]
    DestinationNotFound(String),

    /// Booking not found
    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),

    /// Booking creation error
    #[error("Failed to create booking: {0}")]
    Booking(#[from] BookingError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Destinations in load order
    destinations: Vec<Destination<'static>>,

    /// Fixture key -> index into `destinations`
    destination_keys: FxHashMap<String, usize>,

    /// Cart rows, nothing selected
    cart_items: Vec<LineItem<'static>>,

    bookings: Vec<Booking<'static>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            destinations: Vec::new(),
            destination_keys: FxHashMap::default(),
            cart_items: Vec::new(),
            bookings: Vec::new(),
            currency: None,
        }
    }

    /// Load destinations from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_destinations(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("destinations", name)?;
        let fixture: DestinationsFixture = serde_norway::from_str(&contents)?;

        for destination_fixture in fixture.destinations {
            let key = destination_fixture.key.clone();
            let destination = Destination::try_from(destination_fixture)?;

            self.track_currency(destination.currency())?;

            for addon in &destination.addons {
                self.track_currency(addon.price.currency())?;
            }

            self.destination_keys.insert(key, self.destinations.len());
            self.destinations.push(destination);
        }

        Ok(self)
    }

    /// Load cart rows from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it references
    /// destinations that don't exist.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("carts", name)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        for line in fixture.items {
            let item = self.line_item(line)?;

            self.cart_items.push(item);
        }

        Ok(self)
    }

    /// Load bookings from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it references
    /// destinations that don't exist.
    pub fn load_bookings(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("bookings", name)?;
        let fixture: BookingsFixture = serde_norway::from_str(&contents)?;
        let currency = self.currency()?;

        for booking_fixture in fixture.bookings {
            let details = booking_fixture
                .details
                .into_iter()
                .map(|line| self.line_item(line))
                .collect::<Result<Vec<_>, _>>()?;

            let mut booking = Booking::new(booking_fixture.code, booking_fixture.status, currency)
                .with_details(details)?;

            if let Some(grand_total) = booking_fixture.grand_total.as_deref() {
                let grand_total = parse_money(grand_total)?;

                self.track_currency(grand_total.currency())?;

                booking = booking.with_grand_total(grand_total);
            }

            if let Some(method) = booking_fixture.payment_method {
                booking = booking.with_payment_method(method);
            }

            self.bookings.push(booking);
        }

        Ok(self)
    }

    /// Load every file of a fixture set with the same name
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_destinations(name)?
            .load_cart(name)?
            .load_bookings(name)
    }

    /// Load a complete fixture set (destinations, cart and bookings with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Get a destination by its fixture key
    ///
    /// # Errors
    ///
    /// Returns an error if the destination is not found.
    pub fn destination(&self, key: &str) -> Result<&Destination<'static>, FixtureError> {
        self.destination_keys
            .get(key)
            .and_then(|&idx| self.destinations.get(idx))
            .ok_or_else(|| FixtureError::DestinationNotFound(key.to_string()))
    }

    /// Get all destinations
    pub fn destinations(&self) -> &[Destination<'static>] {
        &self.destinations
    }

    /// Create a cart from the loaded rows, with nothing selected
    ///
    /// # Errors
    ///
    /// Returns an error if no destinations are loaded or if cart creation fails.
    pub fn cart(&self) -> Result<Cart<'static>, FixtureError> {
        let currency = self.currency()?;

        Ok(Cart::with_items(self.cart_items.clone(), currency)?)
    }

    /// Get all bookings
    pub fn bookings(&self) -> &[Booking<'static>] {
        &self.bookings
    }

    /// Get a booking by its code
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is not found.
    pub fn booking(&self, code: &str) -> Result<&Booking<'static>, FixtureError> {
        self.bookings
            .iter()
            .find(|booking| booking.code().as_str() == code)
            .ok_or_else(|| FixtureError::BookingNotFound(code.to_string()))
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no destinations have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    fn read(&self, kind: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));

        Ok(fs::read_to_string(&file_path)?)
    }

    fn track_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(_) => Ok(()),
            None => {
                self.currency = Some(currency);
                Ok(())
            }
        }
    }

    fn line_item(&mut self, line: LineFixture) -> Result<LineItem<'static>, FixtureError> {
        let destination = self.destination(&line.destination)?.clone();

        let mut item =
            LineItem::new(line.id, destination, line.quantity).with_selection(&line.addons);

        if let Some(visit_date) = line.visit_date {
            item = item.with_visit_date(visit_date);
        }

        if let Some(price) = line.price.as_deref() {
            let price = parse_money(price)?;

            self.track_currency(price.currency())?;

            item = item.with_unit_price(price);
        }

        if let Some(subtotal) = line.subtotal.as_deref() {
            let subtotal = parse_money(subtotal)?;

            self.track_currency(subtotal.currency())?;

            item = item.with_persisted_subtotal(subtotal);
        }

        Ok(item)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
