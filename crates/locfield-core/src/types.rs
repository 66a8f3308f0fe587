//! Domain types for the location field subsystem.

use serde::{Deserialize, Serialize};

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// An address resolved by the geocoding service, as shown in a result list.
///
/// `display_address_text` is presentation-only (it may carry highlight
/// markup) and must never be written back into the committed form value;
/// see [`AddressCandidate::to_field_value`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressCandidate {
    /// Full formatted address. Falls back to a synthesized
    /// `"Pin location {lat}, {lng}"` string when no structured component
    /// could be resolved.
    pub address: String,
    pub block_no: Option<String>,
    pub building: Option<String>,
    pub postal_code: Option<String>,
    pub road_name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// SVY21 easting, passed through from the provider when present.
    pub x: Option<f64>,
    /// SVY21 northing, passed through from the provider when present.
    pub y: Option<f64>,
    pub display_address_text: Option<String>,
}

impl AddressCandidate {
    /// The coordinate this candidate resolves to, when both parts are known.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
            _ => None,
        }
    }

    /// Rebuilds a provisional candidate from a committed value, e.g. when an
    /// error path restores the last valid selection.
    #[must_use]
    pub fn from_field_value(value: &LocationFieldValue) -> Self {
        Self {
            address: value.address.clone().unwrap_or_default(),
            block_no: value.block_no.clone(),
            building: value.building.clone(),
            postal_code: value.postal_code.clone(),
            road_name: value.road_name.clone(),
            lat: value.lat,
            lng: value.lng,
            x: value.x,
            y: value.y,
            display_address_text: None,
        }
    }

    /// Strips the presentation-only field and produces the committable value.
    #[must_use]
    pub fn to_field_value(&self) -> LocationFieldValue {
        LocationFieldValue {
            address: Some(self.address.clone()),
            block_no: self.block_no.clone(),
            building: self.building.clone(),
            postal_code: self.postal_code.clone(),
            road_name: self.road_name.clone(),
            lat: self.lat,
            lng: self.lng,
            x: self.x,
            y: self.y,
        }
    }
}

/// The value committed into the surrounding form engine's slot.
///
/// Created empty, set wholesale on modal confirm, and partially settable by
/// a pin-drop before an address has been resolved. Deliberately has no
/// `display_address_text`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationFieldValue {
    pub address: Option<String>,
    pub block_no: Option<String>,
    pub building: Option<String>,
    pub postal_code: Option<String>,
    pub road_name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl LocationFieldValue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// A value set directly from a map tap, before address resolution.
    #[must_use]
    pub fn from_coordinate(coord: Coordinate) -> Self {
        Self {
            lat: Some(coord.lat),
            lng: Some(coord.lng),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
            _ => None,
        }
    }
}

/// One remote page of forward-search results.
///
/// `api_page_num` is 1-based. Pagination merges are append-only within a
/// single query session and reset whenever the query string changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultPage {
    pub results: Vec<AddressCandidate>,
    pub api_page_num: Option<u32>,
    pub total_num_pages: Option<u32>,
}
