//! Receipt

use std::{fmt::Write, io};

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    bookings::{Booking, BookingCode, BookingStatus, PaymentMethod, TicketLabel, ticket_label},
    cart::{Cart, CartTotals},
    clock::Clock,
    items::LineItem,
    pricing::price_line_item,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// One priced line on a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Destination name
    pub destination: String,

    /// Visit date, formatted, or empty when unknown
    pub visit_date: String,

    /// Number of tickets
    pub quantity: u32,

    /// Per-ticket base price
    pub unit_base: Money<'a, Currency>,

    /// Names of the resolved add-ons
    pub addons: SmallVec<[String; 4]>,

    /// Line subtotal
    pub subtotal: Money<'a, Currency>,

    /// Ticket label, for booking receipts
    pub label: Option<TicketLabel>,
}

impl<'a> ReceiptLine<'a> {
    fn new(item: &LineItem<'a>, label: Option<TicketLabel>) -> Self {
        let price = price_line_item(item);

        Self {
            destination: item.destination().name.clone(),
            visit_date: item
                .visit_date()
                .map(|date| date.to_string())
                .unwrap_or_default(),
            quantity: item.quantity(),
            unit_base: price.unit_base,
            addons: item
                .resolved_addons()
                .iter()
                .map(|addon| addon.name.clone())
                .collect(),
            subtotal: price.subtotal,
            label,
        }
    }
}

/// Booking header shown above a booking receipt.
#[derive(Debug, Clone, PartialEq)]
struct BookingHeader {
    code: BookingCode,
    status: BookingStatus,
    payment_method: Option<PaymentMethod>,
}

/// Printable summary of a cart selection or a booking.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    /// Lines, in cart or booking order
    lines: Vec<ReceiptLine<'a>>,

    /// Aggregated totals over `lines`
    totals: CartTotals<'a>,

    /// Total to display, which may be a persisted grand total
    total: Money<'a, Currency>,

    booking: Option<BookingHeader>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt for the selected rows of a cart.
    pub fn for_cart(cart: &Cart<'a>) -> Self {
        let lines: Vec<ReceiptLine<'a>> = cart
            .selected_items()
            .map(|item| ReceiptLine::new(item, None))
            .collect();

        let totals = cart.totals();

        Self {
            lines,
            totals,
            total: totals.grand_total,
            booking: None,
        }
    }

    /// Build a receipt for a booking, labelling tickets as of `clock`'s today.
    pub fn for_booking(booking: &Booking<'a>, clock: &impl Clock) -> Self {
        let today = clock.today();

        let lines = booking
            .details()
            .iter()
            .map(|detail| {
                ReceiptLine::new(detail, Some(ticket_label(booking.status(), detail, today)))
            })
            .collect();

        Self {
            lines,
            totals: booking.totals(),
            total: booking.display_total(),
            booking: Some(BookingHeader {
                code: booking.code().clone(),
                status: booking.status(),
                payment_method: booking.payment_method(),
            }),
        }
    }

    /// Receipt lines
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Aggregated totals
    pub fn totals(&self) -> CartTotals<'a> {
        self.totals
    }

    /// Total to pay
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if let Some(header) = &self.booking {
            write_booking_header(&mut out, header)?;
        }

        let mut builder = Builder::default();

        builder.push_record(self.header_row());

        for (idx, line) in self.lines.iter().enumerate() {
            builder.push_record(self.line_row(idx, line));
        }

        write_receipt_table(&mut out, builder, self.booking.is_some())?;

        self.write_summary(&mut out)
    }

    fn header_row(&self) -> SmallVec<[&'static str; 8]> {
        let mut row: SmallVec<[&'static str; 8]> = SmallVec::from_slice(&[
            "",
            "Destination",
            "Visit date",
            "Qty",
            "Unit",
            "Add-ons",
            "Subtotal",
        ]);

        if self.booking.is_some() {
            row.push("Status");
        }

        row
    }

    fn line_row(&self, idx: usize, line: &ReceiptLine<'_>) -> SmallVec<[String; 8]> {
        let mut row: SmallVec<[String; 8]> = SmallVec::new();

        row.push(format!("#{:<3}", idx + 1));
        row.push(line.destination.clone());
        row.push(line.visit_date.clone());
        row.push(line.quantity.to_string());
        row.push(line.unit_base.to_string());
        row.push(line.addons.join("\n"));
        row.push(line.subtotal.to_string());

        if self.booking.is_some() {
            row.push(line.label.map(|label| label.to_string()).unwrap_or_default());
        }

        row
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut summary: SmallVec<[(&str, String); 6]> = SmallVec::new();

        summary.push((" Tickets:", format!("{}  ", self.totals.total_qty)));
        summary.push((" Base:", format!("{}  ", self.totals.base_subtotal)));
        summary.push((" Add-ons:", format!("{}  ", self.totals.addon_subtotal)));

        if self.totals.persisted_adjustment.to_minor_units() != 0 {
            summary.push((
                " Adjustment:",
                format!("{}  ", self.totals.persisted_adjustment),
            ));
        }

        let persisted_gap = self
            .total
            .to_minor_units()
            .saturating_sub(self.totals.grand_total.to_minor_units());

        if persisted_gap != 0 {
            summary.push((
                " Total adjustment:",
                format!("{}  ", Money::from_minor(persisted_gap, self.total.currency())),
            ));
        }

        let total_label = " \x1b[1mTotal:\x1b[0m";
        let total_val = format!("{}  ", self.total);

        let label_width = summary
            .iter()
            .map(|(label, _)| visible_width(label))
            .fold(visible_width(total_label), usize::max);

        let value_width = summary
            .iter()
            .map(|(_, value)| value.len())
            .fold(total_val.len(), usize::max);

        for (label, value) in &summary {
            write_summary_line(out, label, value, label_width, value_width)?;
        }

        write_summary_line(
            out,
            total_label,
            &format!("\x1b[1m{total_val}\x1b[0m"),
            label_width,
            value_width,
        )?;

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

fn write_booking_header(
    out: &mut impl io::Write,
    header: &BookingHeader,
) -> Result<(), ReceiptError> {
    let method = header
        .payment_method
        .map(|method| format!(" via {method}"))
        .unwrap_or_default();

    writeln!(
        out,
        "\n \x1b[1m{}\x1b[0m  {}{}\x1b[0m{method}",
        header.code,
        status_ansi(header.status),
        header.status,
    )
    .map_err(|_err| ReceiptError::IO)
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    with_status: bool,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..5), Alignment::right());
    table.modify(Columns::new(6..7), Alignment::right());
    table.modify(Columns::new(5..6), color_dark_grey());

    if with_status {
        table.modify(Columns::new(7..8), Alignment::center());
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn status_ansi(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Pending => "\x1b[33m",
        BookingStatus::Paid => "\x1b[32m",
        BookingStatus::Cancelled => "\x1b[31m",
    }
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
///
/// Box-drawing characters occupy the Unicode range U+2500..U+257F. Consecutive
/// border characters share a single escape sequence; cell content is untouched.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
