//! Address presence and formatting rules.
//!
//! OneMap-style geocoders return the literal strings `"nil"`/`"NIL"`/`"null"`
//! for absent address components. That quirk is isolated behind
//! [`has_address_value`] so a provider change touches exactly one place.

use crate::types::Coordinate;

/// Structured address components as returned by a geocoder, before formatting.
#[derive(Debug, Clone, Default)]
pub struct AddressParts {
    pub block_no: Option<String>,
    pub road_name: Option<String>,
    pub building: Option<String>,
    pub postal_code: Option<String>,
}

/// Returns `true` when `value` is a real address component: non-empty and not
/// one of the upstream placeholder sentinels (`"nil"`/`"null"`, any casing).
#[must_use]
pub fn has_address_value(value: Option<&str>) -> bool {
    match value {
        Some(v) => {
            let trimmed = v.trim();
            !trimmed.is_empty()
                && !trimmed.eq_ignore_ascii_case("nil")
                && !trimmed.eq_ignore_ascii_case("null")
        }
        None => false,
    }
}

/// Builds a display address from structured components.
///
/// Construction order: `"{block} {road}"` (road alone when there is no
/// block), then the building name, then `"SINGAPORE {postal}"`, all
/// space-joined. When none of road, postal code, or building are present and
/// `fallback_to_pin` is set with a coordinate, the output is
/// `"Pin location {lat}, {lng}"` with both values rounded to 2 decimal
/// places. Otherwise an empty string.
#[must_use]
pub fn format_address(
    parts: &AddressParts,
    fallback_to_pin: bool,
    coord: Option<Coordinate>,
) -> String {
    let block = present(parts.block_no.as_deref());
    let road = present(parts.road_name.as_deref());
    let building = present(parts.building.as_deref());
    let postal = present(parts.postal_code.as_deref());

    if road.is_none() && postal.is_none() && building.is_none() {
        if fallback_to_pin {
            if let Some(c) = coord {
                return format!("Pin location {:.2}, {:.2}", c.lat, c.lng);
            }
        }
        return String::new();
    }

    let mut segments: Vec<String> = Vec::with_capacity(3);
    match (block, road) {
        (Some(b), Some(r)) => segments.push(format!("{b} {r}")),
        (None, Some(r)) => segments.push(r.to_owned()),
        _ => {}
    }
    if let Some(b) = building {
        segments.push(b.to_owned());
    }
    if let Some(p) = postal {
        segments.push(format!("SINGAPORE {p}"));
    }
    segments.join(" ")
}

fn present(value: Option<&str>) -> Option<&str> {
    if has_address_value(value) {
        value.map(str::trim)
    } else {
        None
    }
}
