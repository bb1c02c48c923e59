//! Backend records
//!
//! Snapshots as the REST backend serves them. Prices may be numbers or numeric
//! strings, add-on selections may be lists or JSON-encoded strings, and optional
//! fields may be missing or `null`. Converting a record into its domain type
//! resolves all of that once.

use jiff::{Timestamp, civil::Date};
use rust_decimal::prelude::ToPrimitive;
use rusty_money::iso::Currency;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{
    addons::{AddOn, AddonId, AddonSelection},
    bookings::{Booking, BookingCode, BookingError, BookingStatus, PaymentMethod},
    cart::{Cart, CartError},
    destinations::{Destination, DestinationId},
    items::{LineId, LineItem},
    money::{coerce_amount, money_from_value, optional_money},
};

/// Errors raised while decoding backend records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The payload is not valid JSON for the expected record.
    #[error("invalid record: {0}")]
    Json(#[from] serde_json::Error),

    /// The booking status is not one we know.
    #[error("unknown booking status: {0}")]
    UnknownStatus(String),

    /// The decoded items could not form a cart.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The decoded details could not form a booking.
    #[error(transparent)]
    Booking(#[from] BookingError),
}

/// Add-on as served inside a destination.
#[derive(Clone, Debug, Deserialize)]
pub struct AddOnRecord {
    /// Add-on identifier, a string or a number
    #[serde(default)]
    pub id: Value,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Price per ticket
    #[serde(default)]
    pub price: Value,
}

impl AddOnRecord {
    /// Convert into an add-on priced in `currency`.
    ///
    /// Returns `None` when the record carries no usable identifier, as such an
    /// add-on can never be selected.
    pub fn into_addon(self, currency: &Currency) -> Option<AddOn<'_>> {
        let Some(id) = AddonId::from_value(&self.id) else {
            debug!(id = %self.id, "dropping add-on without an identifier");
            return None;
        };

        Some(AddOn {
            id,
            name: self.name.unwrap_or_default(),
            price: money_from_value(&self.price, currency),
        })
    }
}

/// Destination as served by the backend.
#[derive(Clone, Debug, Deserialize)]
pub struct DestinationRecord {
    /// Destination identifier, a string or a number
    #[serde(default)]
    pub id: Value,

    /// Destination name
    #[serde(default)]
    pub name: Option<String>,

    /// Current ticket price
    #[serde(default)]
    pub price: Value,

    /// Add-on catalog
    #[serde(default)]
    pub addons: Option<Vec<AddOnRecord>>,
}

impl DestinationRecord {
    /// Convert into a destination priced in `currency`.
    pub fn into_destination(self, currency: &Currency) -> Destination<'_> {
        let addons = self
            .addons
            .unwrap_or_default()
            .into_iter()
            .filter_map(|addon| addon.into_addon(currency))
            .collect::<Vec<_>>();

        let id = DestinationId::from_value(&self.id).unwrap_or_else(|| {
            debug!(id = %self.id, "destination without an identifier");
            DestinationId::new(String::new())
        });

        Destination::new(
            id,
            self.name.unwrap_or_default(),
            money_from_value(&self.price, currency),
        )
        .with_addons(addons)
    }
}

/// Cart row as served by the backend.
#[derive(Clone, Debug, Deserialize)]
pub struct CartRowRecord {
    /// Row identifier
    pub id: LineId,

    /// Number of tickets
    #[serde(default)]
    pub quantity: Value,

    /// Visit date, as `YYYY-MM-DD` or a timestamp
    #[serde(default)]
    pub visit_date: Option<String>,

    /// Selected add-ons
    #[serde(default)]
    pub addons: AddonSelection,

    /// Unit price snapshot
    #[serde(default)]
    pub price: Value,

    /// Booked destination
    pub destination: DestinationRecord,
}

impl CartRowRecord {
    /// Convert into a line item priced in `currency`.
    pub fn into_line_item(self, currency: &Currency) -> LineItem<'_> {
        line_item(
            self.id,
            LineFields {
                quantity: &self.quantity,
                visit_date: self.visit_date.as_deref(),
                addons: &self.addons,
                price: &self.price,
                subtotal: &Value::Null,
            },
            self.destination,
            currency,
        )
    }
}

/// Booking detail as served by the backend.
#[derive(Clone, Debug, Deserialize)]
pub struct BookingDetailRecord {
    /// Detail identifier, when the backend sends one
    #[serde(default)]
    pub id: Option<LineId>,

    /// Ticket code
    #[serde(default)]
    pub ticket_code: Option<String>,

    /// Number of tickets
    #[serde(default)]
    pub quantity: Value,

    /// Visit date, as `YYYY-MM-DD` or a timestamp
    #[serde(default)]
    pub visit_date: Option<String>,

    /// Selected add-ons
    #[serde(default)]
    pub addons: AddonSelection,

    /// Unit price snapshot
    #[serde(default)]
    pub price: Value,

    /// Subtotal persisted at order time
    #[serde(default)]
    pub subtotal: Value,

    /// Booked destination
    pub destination: DestinationRecord,
}

impl BookingDetailRecord {
    /// Convert into a line item priced in `currency`.
    ///
    /// Details without an id are identified by their ticket code, or failing that
    /// by their position in the booking.
    pub fn into_line_item(self, position: usize, currency: &Currency) -> LineItem<'_> {
        let id = self
            .id
            .or_else(|| self.ticket_code.map(LineId::from))
            .unwrap_or_else(|| LineId::new(position.to_string()));

        line_item(
            id,
            LineFields {
                quantity: &self.quantity,
                visit_date: self.visit_date.as_deref(),
                addons: &self.addons,
                price: &self.price,
                subtotal: &self.subtotal,
            },
            self.destination,
            currency,
        )
    }
}

/// Booking as served by the backend.
#[derive(Clone, Debug, Deserialize)]
pub struct BookingRecord {
    /// Booking code
    pub booking_code: BookingCode,

    /// Persisted grand total
    #[serde(default)]
    pub grand_total: Value,

    /// Booking status
    pub status: String,

    /// Payment method
    #[serde(default)]
    pub payment_method: Option<String>,

    /// Creation time
    #[serde(default)]
    pub created_at: Option<String>,

    /// Booking details
    #[serde(default)]
    pub details: Vec<BookingDetailRecord>,
}

impl BookingRecord {
    /// Convert into a booking priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownStatus`] if the status is not recognised.
    pub fn into_booking(self, currency: &Currency) -> Result<Booking<'_>, RecordError> {
        let status = self
            .status
            .parse::<BookingStatus>()
            .map_err(|_err| RecordError::UnknownStatus(self.status.clone()))?;

        let details: Vec<LineItem<'_>> = self
            .details
            .into_iter()
            .enumerate()
            .map(|(position, detail)| detail.into_line_item(position, currency))
            .collect();

        let mut booking = Booking::new(self.booking_code, status, currency).with_details(details)?;

        if let Some(grand_total) = optional_money(&self.grand_total, currency) {
            booking = booking.with_grand_total(grand_total);
        }

        if let Some(method) = self.payment_method.as_deref().and_then(parse_payment_method) {
            booking = booking.with_payment_method(method);
        }

        if let Some(created_at) = self.created_at.as_deref().and_then(parse_timestamp) {
            booking = booking.with_created_at(created_at);
        }

        Ok(booking)
    }
}

/// Decode a booking read.
///
/// # Errors
///
/// Returns a [`RecordError`] if the payload cannot be decoded.
pub fn decode_booking<'a>(json: &str, currency: &'a Currency) -> Result<Booking<'a>, RecordError> {
    serde_json::from_str::<BookingRecord>(json)?.into_booking(currency)
}

/// Decode a cart read into a cart with nothing selected.
///
/// # Errors
///
/// Returns a [`RecordError`] if the payload cannot be decoded.
pub fn decode_cart<'a>(json: &str, currency: &'a Currency) -> Result<Cart<'a>, RecordError> {
    let rows: Vec<CartRowRecord> = serde_json::from_str(json)?;
    let items: Vec<LineItem<'a>> = rows
        .into_iter()
        .map(|row| row.into_line_item(currency))
        .collect();

    Ok(Cart::with_items(items, currency)?)
}

/// Decode a destination read.
///
/// # Errors
///
/// Returns a [`RecordError`] if the payload cannot be decoded.
pub fn decode_destination<'a>(
    json: &str,
    currency: &'a Currency,
) -> Result<Destination<'a>, RecordError> {
    Ok(serde_json::from_str::<DestinationRecord>(json)?.into_destination(currency))
}

/// Parse a visit date from `YYYY-MM-DD` or any string starting with one.
pub fn parse_visit_date(text: &str) -> Option<Date> {
    let trimmed = text.trim();
    let date = trimmed.get(..10).unwrap_or(trimmed);

    date.parse::<Date>()
        .inspect_err(|err| debug!(%err, text, "could not parse visit date"))
        .ok()
}

fn parse_payment_method(text: &str) -> Option<PaymentMethod> {
    text.parse::<PaymentMethod>()
        .inspect_err(|err| debug!(%err, "ignoring payment method"))
        .ok()
}

fn parse_timestamp(text: &str) -> Option<Timestamp> {
    text.parse::<Timestamp>()
        .inspect_err(|err| debug!(%err, text, "could not parse creation time"))
        .ok()
}

/// Coerce a loose quantity. Fractions are truncated; negatives and garbage become zero.
fn coerce_quantity(value: &Value) -> u32 {
    coerce_amount(value).trunc().to_u32().unwrap_or(0)
}

struct LineFields<'r> {
    quantity: &'r Value,
    visit_date: Option<&'r str>,
    addons: &'r AddonSelection,
    price: &'r Value,
    subtotal: &'r Value,
}

fn line_item<'a>(
    id: LineId,
    fields: LineFields<'_>,
    destination: DestinationRecord,
    currency: &'a Currency,
) -> LineItem<'a> {
    let mut item = LineItem::new(
        id,
        destination.into_destination(currency),
        coerce_quantity(fields.quantity),
    )
    .with_selection(fields.addons);

    if let Some(visit_date) = fields.visit_date.and_then(parse_visit_date) {
        item = item.with_visit_date(visit_date);
    }

    if let Some(unit_price) = optional_money(fields.price, currency) {
        item = item.with_unit_price(unit_price);
    }

    if let Some(subtotal) = optional_money(fields.subtotal, currency) {
        item = item.with_persisted_subtotal(subtotal);
    }

    item
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::IDR};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{bookings::TicketLabel, pricing::price_line_item};

    use super::*;

    fn idr<'a>(major: i64) -> Money<'a, Currency> {
        Money::from_minor(major * 100, IDR)
    }

    #[test]
    fn destination_without_addons_has_empty_catalog() -> TestResult {
        let destination = decode_destination(r#"{ "id": 7, "price": "150000.00" }"#, IDR)?;

        assert_eq!(destination.id.as_str(), "7");
        assert_eq!(destination.base_price, idr(150_000));
        assert!(destination.addons.is_empty());

        Ok(())
    }

    #[test]
    fn destination_with_null_addons_and_bad_price() -> TestResult {
        let destination = decode_destination(
            r#"{ "id": "x", "name": null, "price": "call us", "addons": null }"#,
            IDR,
        )?;

        assert_eq!(destination.base_price, idr(0));
        assert!(destination.name.is_empty());

        Ok(())
    }

    #[test]
    fn cart_rows_decode_with_encoded_addons() -> TestResult {
        let cart = decode_cart(
            &json!([{
                "id": 11,
                "quantity": 2,
                "visit_date": "2026-11-02",
                "addons": "[1]",
                "destination": {
                    "id": 3,
                    "price": 100000,
                    "addons": [{ "id": 1, "name": "Lunch", "price": "20000" }]
                }
            }])
            .to_string(),
            IDR,
        )?;

        let item = cart.get_item(&LineId::from("11"))?;

        assert_eq!(item.visit_date(), Some(Date::constant(2026, 11, 2)));
        assert_eq!(price_line_item(item).subtotal, idr(240_000));

        Ok(())
    }

    #[test]
    fn addons_without_usable_ids_are_dropped() -> TestResult {
        let destination = decode_destination(
            r#"{"id":1,"price":100,"addons":[{"id":null,"price":5},{"id":2,"price":7}]}"#,
            IDR,
        )?;

        let ids: Vec<&str> = destination.addons.iter().map(|addon| addon.id.as_str()).collect();

        assert_eq!(ids, vec!["2"]);

        Ok(())
    }

    #[test]
    fn cart_row_prices_past_an_addon_without_id() -> TestResult {
        let cart = decode_cart(
            &json!([{
                "id": 5,
                "quantity": 2,
                "addons": [1, 2],
                "destination": {
                    "price": 100_000,
                    "addons": [
                        { "id": { "nested": true }, "price": 99_000 },
                        { "id": 1, "price": 20_000 }
                    ]
                }
            }])
            .to_string(),
            IDR,
        )?;

        let item = cart.get_item(&LineId::from("5"))?;

        assert_eq!(item.destination().id.as_str(), "");
        assert_eq!(price_line_item(item).subtotal, idr(240_000));

        Ok(())
    }

    #[test]
    fn quantity_is_coerced() -> TestResult {
        let cart = decode_cart(
            &json!([
                { "id": 1, "quantity": "3", "destination": { "id": 1, "price": 10 } },
                { "id": 2, "quantity": -1, "destination": { "id": 1, "price": 10 } },
                { "id": 3, "quantity": "many", "destination": { "id": 1, "price": 10 } },
                { "id": 4, "destination": { "id": 1, "price": 10 } }
            ])
            .to_string(),
            IDR,
        )?;

        let quantities: Vec<u32> = cart.iter().map(LineItem::quantity).collect();

        assert_eq!(quantities, vec![3, 0, 0, 0]);

        Ok(())
    }

    #[test]
    fn booking_decodes_with_persisted_totals() -> TestResult {
        let booking = decode_booking(
            &json!({
                "booking_code": "TRX-20261016-0001",
                "grand_total": "230000.00",
                "status": "paid",
                "payment_method": "qris",
                "created_at": "2026-10-16T03:00:00Z",
                "details": [{
                    "ticket_code": "TCK-1",
                    "quantity": 2,
                    "price": "95000",
                    "subtotal": "230000",
                    "visit_date": "2026-10-15T00:00:00.000000Z",
                    "addons": [1],
                    "destination": {
                        "id": 3,
                        "price": 100000,
                        "addons": [{ "id": 1, "name": "Lunch", "price": 20000 }]
                    }
                }]
            })
            .to_string(),
            IDR,
        )?;

        let detail = booking.details().first().ok_or("expected a detail")?;
        let price = price_line_item(detail);

        assert_eq!(booking.status(), BookingStatus::Paid);
        assert_eq!(booking.payment_method(), Some(PaymentMethod::Qris));
        assert!(booking.created_at().is_some());
        assert_eq!(detail.id().as_str(), "TCK-1");
        assert_eq!(price.computed_subtotal, idr(230_000));
        assert_eq!(booking.display_total(), idr(230_000));
        assert_eq!(
            booking.ticket_labels(Date::constant(2026, 10, 16)).as_slice(),
            &[TicketLabel::Expired]
        );

        Ok(())
    }

    #[test]
    fn zero_persisted_values_fall_back_to_computed() -> TestResult {
        let booking = decode_booking(
            &json!({
                "booking_code": 42,
                "grand_total": 0,
                "status": "pending",
                "details": [{
                    "quantity": 1,
                    "subtotal": "0.00",
                    "visit_date": "2026-12-01",
                    "destination": { "id": 3, "price": "75000" }
                }]
            })
            .to_string(),
            IDR,
        )?;

        assert_eq!(booking.code().as_str(), "42");
        assert_eq!(booking.display_total(), idr(75_000));
        assert_eq!(
            booking.details().first().map(|detail| detail.id().as_str()),
            Some("0")
        );

        Ok(())
    }

    #[test]
    fn unknown_status_is_an_error() {
        let result = decode_booking(
            r#"{ "booking_code": "B", "status": "refunded", "details": [] }"#,
            IDR,
        );

        assert!(matches!(result, Err(RecordError::UnknownStatus(status)) if status == "refunded"));
    }

    #[test]
    fn lenient_optional_fields() -> TestResult {
        let booking = decode_booking(
            &json!({
                "booking_code": "B",
                "status": "pending",
                "payment_method": "cash",
                "created_at": "yesterday"
            })
            .to_string(),
            IDR,
        )?;

        assert_eq!(booking.payment_method(), None);
        assert_eq!(booking.created_at(), None);
        assert!(booking.details().is_empty());
        assert_eq!(booking.display_total(), idr(0));

        Ok(())
    }

    #[test]
    fn visit_dates_parse_from_dates_and_timestamps() {
        assert_eq!(parse_visit_date("2026-11-02"), Some(Date::constant(2026, 11, 2)));
        assert_eq!(
            parse_visit_date("2026-11-02T17:00:00.000000Z"),
            Some(Date::constant(2026, 11, 2))
        );
        assert_eq!(parse_visit_date("02/11/2026"), None);
        assert_eq!(parse_visit_date(""), None);
    }
}
