//! Cart Fixtures

use jiff::civil::Date;
use serde::Deserialize;

use crate::{addons::AddonSelection, items::LineId};

/// Wrapper for cart rows in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart rows, in display order
    pub items: Vec<LineFixture>,
}

/// A cart row or booking detail from YAML
#[derive(Debug, Deserialize)]
pub struct LineFixture {
    /// Row id
    pub id: LineId,

    /// Key of the destination fixture
    pub destination: String,

    /// Number of tickets
    pub quantity: u32,

    /// Visit date
    #[serde(default)]
    pub visit_date: Option<Date>,

    /// Selected add-ons, as a list or an encoded string
    #[serde(default)]
    pub addons: AddonSelection,

    /// Unit price snapshot (e.g., "95000 IDR")
    #[serde(default)]
    pub price: Option<String>,

    /// Persisted subtotal (e.g., "230000 IDR")
    #[serde(default)]
    pub subtotal: Option<String>,
}
