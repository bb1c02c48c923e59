//! Add-ons
//!
//! Paid extras a destination offers (guides, meals, transfers). A line item refers
//! to the add-ons it selected by identifier, and those identifiers reach us in more
//! than one shape: as a JSON array, as a string holding a JSON-encoded array, or
//! not at all. [`AddonSelection`] captures the raw shape and [`AddonSelection::ids`]
//! normalises it, so nothing downstream ever sees the ambiguity.

use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::ids::wire_id;

wire_id! {
    /// Add-on identifier, compared in string form.
    AddonId
}

/// A paid add-on from a destination's catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct AddOn<'a> {
    /// Add-on identifier
    pub id: AddonId,

    /// Display name
    pub name: String,

    /// Price per ticket
    pub price: Money<'a, Currency>,
}

impl<'a> AddOn<'a> {
    /// Create a new add-on.
    pub fn new(
        id: impl Into<AddonId>,
        name: impl Into<String>,
        price: Money<'a, Currency>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// Add-on selection exactly as it was received.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AddonSelection {
    /// An already-decoded list of identifiers.
    List(Vec<Value>),

    /// A string holding a JSON-encoded list of identifiers.
    Encoded(String),

    /// No selection was sent.
    #[default]
    Absent,

    /// Any other payload. Treated as an empty selection.
    Other(Value),
}

impl AddonSelection {
    /// Normalise the selection into a list of identifiers.
    ///
    /// Never fails: undecodable payloads and non-scalar entries are dropped.
    pub fn ids(&self) -> AddonIds {
        match self {
            Self::List(values) => ids_from_values(values),
            Self::Encoded(text) => decode_encoded(text),
            Self::Absent => AddonIds::default(),
            Self::Other(value) => {
                debug!(%value, "ignoring add-on selection with unexpected shape");
                AddonIds::default()
            }
        }
    }
}

impl From<AddonIds> for AddonSelection {
    fn from(ids: AddonIds) -> Self {
        Self::List(
            ids.iter()
                .map(|id| Value::String(id.as_str().to_string()))
                .collect(),
        )
    }
}

impl From<&str> for AddonSelection {
    fn from(encoded: &str) -> Self {
        Self::Encoded(encoded.to_string())
    }
}

fn decode_encoded(text: &str) -> AddonIds {
    if text.trim().is_empty() {
        return AddonIds::default();
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(values)) => ids_from_values(&values),
        Ok(other) => {
            debug!(%other, "encoded add-on selection is not a list");
            AddonIds::default()
        }
        Err(err) => {
            debug!(%err, "could not decode add-on selection");
            AddonIds::default()
        }
    }
}

fn ids_from_values(values: &[Value]) -> AddonIds {
    values.iter().filter_map(AddonId::from_value).collect()
}

/// Normalised, ordered list of selected add-on identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AddonIds(SmallVec<[AddonId; 4]>);

impl AddonIds {
    /// Iterate over the identifiers in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &AddonId> {
        self.0.iter()
    }

    /// Check whether the given identifier was selected.
    pub fn contains(&self, id: &AddonId) -> bool {
        self.0.contains(id)
    }

    /// Number of identifiers selected.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Identifiers of already-resolved add-ons, in catalog order.
    pub fn of<'c, 'a: 'c>(addons: impl IntoIterator<Item = &'c AddOn<'a>>) -> Self {
        addons.into_iter().map(|addon| addon.id.clone()).collect()
    }
}

impl FromIterator<AddonId> for AddonIds {
    fn from_iter<I: IntoIterator<Item = AddonId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for AddonIds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        AddonSelection::deserialize(deserializer).map(|selection| selection.ids())
    }
}

/// Resolve a raw selection against a destination's add-on catalog.
///
/// See [`resolve_ids`].
pub fn resolve_selected_addons<'c, 'a>(
    catalog: &'c [AddOn<'a>],
    selection: &AddonSelection,
) -> SmallVec<[&'c AddOn<'a>; 4]> {
    resolve_ids(catalog, &selection.ids())
}

/// Resolve normalised identifiers against a destination's add-on catalog.
///
/// Returns the catalog entries whose identifier was selected, in catalog order.
/// Identifiers that are not in the catalog are dropped.
pub fn resolve_ids<'c, 'a>(
    catalog: &'c [AddOn<'a>],
    selection: &AddonIds,
) -> SmallVec<[&'c AddOn<'a>; 4]> {
    if selection.is_empty() {
        return SmallVec::new();
    }

    let wanted: FxHashSet<&str> = selection.iter().map(AddonId::as_str).collect();

    let resolved: SmallVec<[&'c AddOn<'a>; 4]> = catalog
        .iter()
        .filter(|addon| wanted.contains(addon.id.as_str()))
        .collect();

    let known: FxHashSet<&str> = resolved.iter().map(|addon| addon.id.as_str()).collect();
    let dropped = wanted.difference(&known).count();

    if dropped > 0 {
        trace!(dropped, "dropped add-on ids missing from catalog");
    }

    resolved
}
