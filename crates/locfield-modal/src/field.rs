//! The form-facing location field: the committed value slot, its validation
//! surface, and the read-only summary shown between modal sessions.
//!
//! The field never mutates its own value incrementally; the modal hands over
//! a whole [`LocationFieldValue`] on confirm, and everything else is derived.

use locfield_core::{
    format_address, has_address_value, satisfies_postal_code, satisfies_required, AddressParts,
    Coordinate, LocationFieldValue,
};
use locfield_geocode::OneMapClient;

/// Static preview dimensions used in the collapsed field summary.
const PREVIEW_WIDTH: u32 = 512;
const PREVIEW_HEIGHT: u32 = 256;
const PREVIEW_PIN_COLOR: &str = "red";

/// One location field bound into a form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationField {
    id: String,
    required: bool,
    must_have_postal_code: bool,
    value: LocationFieldValue,
}

impl LocationField {
    #[must_use]
    pub fn new(id: impl Into<String>, required: bool, must_have_postal_code: bool) -> Self {
        Self {
            id: id.into(),
            required,
            must_have_postal_code,
            value: LocationFieldValue::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn value(&self) -> &LocationFieldValue {
        &self.value
    }

    /// Replaces the committed value wholesale (modal confirm, or a host
    /// prefill).
    pub fn set_value(&mut self, value: LocationFieldValue) {
        self.value = value;
    }

    /// Clears the field back to its initial empty state.
    pub fn reset(&mut self) {
        self.value = LocationFieldValue::default();
    }

    /// Runs the field's configured validation rules against the committed
    /// value. An unset optional field is valid regardless of rules.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.value.is_empty() {
            return !self.required;
        }
        if self.required && !satisfies_required(&self.value) {
            return false;
        }
        if self.must_have_postal_code && !satisfies_postal_code(&self.value) {
            return false;
        }
        true
    }

    /// The coordinate pinned by the committed value, when set.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.value.coordinate()
    }

    /// One-line summary shown in the collapsed field. Prefers the committed
    /// address and falls back to a pin-location line when only a coordinate
    /// was confirmed.
    #[must_use]
    pub fn summary_text(&self) -> Option<String> {
        if has_address_value(self.value.address.as_deref()) {
            return self.value.address.clone();
        }
        self.value.coordinate().map(|coord| {
            format_address(
                &AddressParts {
                    block_no: self.value.block_no.clone(),
                    road_name: self.value.road_name.clone(),
                    building: self.value.building.clone(),
                    postal_code: self.value.postal_code.clone(),
                },
                true,
                Some(coord),
            )
        })
    }

    /// URL of the static map thumbnail for the committed coordinate, or
    /// `None` when the field is unset.
    #[must_use]
    pub fn preview_url(&self, client: &OneMapClient) -> Option<String> {
        let coord = self.value.coordinate()?;
        Some(client.static_map_url(
            coord.lat,
            coord.lng,
            PREVIEW_WIDTH,
            PREVIEW_HEIGHT,
            PREVIEW_PIN_COLOR,
        ))
    }
}
