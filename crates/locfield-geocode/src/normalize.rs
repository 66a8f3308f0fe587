//! Normalization from raw OneMap records to [`locfield_core::AddressCandidate`].
//!
//! Address construction is delegated to `locfield_core::address`; this module
//! focuses on structural conversion from the string-typed wire shapes.

use locfield_core::{format_address, has_address_value, AddressCandidate, AddressParts, Coordinate};

use crate::types::{GeocodeInfo, SearchHit};

/// Normalizes a forward-search hit.
///
/// Returns `None` for records with no parsable coordinates — those cannot be
/// placed on the map and are dropped rather than shown as dead entries.
#[must_use]
pub fn candidate_from_search_hit(hit: &SearchHit) -> Option<AddressCandidate> {
    let lat = parse_coord(hit.latitude.as_deref())?;
    let lng = parse_coord(hit.longitude.as_deref())?;

    let parts = AddressParts {
        block_no: clean(hit.blk_no.as_deref()),
        road_name: clean(hit.road_name.as_deref()),
        building: clean(hit.building.as_deref()),
        postal_code: clean(hit.postal.as_deref()),
    };
    let formatted = format_address(&parts, false, None);
    // Some records format to nothing (all components NIL); fall back to the
    // provider's own ADDRESS string so the row is still selectable.
    let address = if formatted.is_empty() {
        clean(hit.address.as_deref()).unwrap_or_default()
    } else {
        formatted
    };

    Some(AddressCandidate {
        display_address_text: Some(address.clone()),
        address,
        block_no: parts.block_no,
        building: parts.building,
        postal_code: parts.postal_code,
        road_name: parts.road_name,
        lat: Some(lat),
        lng: Some(lng),
        x: parse_coord(hit.x.as_deref()),
        y: parse_coord(hit.y.as_deref()),
    })
}

/// Normalizes a reverse-geocode record.
///
/// `queried` is the coordinate the lookup was issued for; it backs the
/// `"Pin location {lat}, {lng}"` fallback when the record resolves to no
/// structured component at all (e.g. open water).
#[must_use]
pub fn candidate_from_geocode_info(info: &GeocodeInfo, queried: Coordinate) -> AddressCandidate {
    let lat = parse_coord(info.latitude.as_deref()).unwrap_or(queried.lat);
    let lng = parse_coord(info.longitude.as_deref()).unwrap_or(queried.lng);

    let parts = AddressParts {
        block_no: clean(info.block.as_deref()),
        road_name: clean(info.road.as_deref()),
        building: clean(info.building_name.as_deref()),
        postal_code: clean(info.postal_code.as_deref()),
    };
    let address = format_address(&parts, true, Some(Coordinate::new(lat, lng)));

    AddressCandidate {
        display_address_text: Some(address.clone()),
        address,
        block_no: parts.block_no,
        building: parts.building,
        postal_code: parts.postal_code,
        road_name: parts.road_name,
        lat: Some(lat),
        lng: Some(lng),
        x: parse_coord(info.x_coord.as_deref()),
        y: parse_coord(info.y_coord.as_deref()),
    }
}

/// A candidate for a coordinate with no geocode record at all: pin fallback.
#[must_use]
pub fn pin_candidate(coord: Coordinate) -> AddressCandidate {
    AddressCandidate {
        address: format_address(&AddressParts::default(), true, Some(coord)),
        lat: Some(coord.lat),
        lng: Some(coord.lng),
        ..AddressCandidate::default()
    }
}

/// Treat placeholder sentinels as absent.
fn clean(value: Option<&str>) -> Option<String> {
    if has_address_value(value) {
        value.map(|v| v.trim().to_owned())
    } else {
        None
    }
}

fn parse_coord(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(building: &str, postal: &str, lat: &str, lng: &str) -> SearchHit {
        SearchHit {
            search_val: Some(building.to_owned()),
            blk_no: Some("1".to_owned()),
            road_name: Some("TEST ROAD".to_owned()),
            building: Some(building.to_owned()),
            address: Some(format!("1 TEST ROAD {building}")),
            postal: Some(postal.to_owned()),
            x: Some("29000.1".to_owned()),
            y: Some("39000.2".to_owned()),
            latitude: Some(lat.to_owned()),
            longitude: Some(lng.to_owned()),
        }
    }

    #[test]
    fn search_hit_is_formatted_and_parsed() {
        let candidate = candidate_from_search_hit(&hit("THE BUILDING", "238823", "1.3", "103.8"))
            .expect("candidate");
        assert_eq!(candidate.address, "1 TEST ROAD THE BUILDING SINGAPORE 238823");
        assert_eq!(candidate.lat, Some(1.3));
        assert_eq!(candidate.lng, Some(103.8));
        assert_eq!(candidate.x, Some(29000.1));
        assert_eq!(candidate.postal_code.as_deref(), Some("238823"));
    }

    #[test]
    fn search_hit_without_coordinates_is_dropped() {
        let mut raw = hit("X", "238823", "1.3", "103.8");
        raw.latitude = Some("NIL".to_owned());
        assert!(candidate_from_search_hit(&raw).is_none());
    }

    #[test]
    fn nil_postal_becomes_absent() {
        let candidate =
            candidate_from_search_hit(&hit("PUNGGOL PARK", "NIL", "1.4", "103.9")).expect("candidate");
        assert!(candidate.postal_code.is_none());
    }

    #[test]
    fn geocode_info_with_nothing_resolvable_synthesizes_pin() {
        let info = GeocodeInfo {
            building_name: Some("NIL".to_owned()),
            block: None,
            road: Some("nil".to_owned()),
            postal_code: Some("".to_owned()),
            x_coord: None,
            y_coord: None,
            latitude: None,
            longitude: None,
        };
        let candidate = candidate_from_geocode_info(&info, Coordinate::new(1.20001, 103.59999));
        assert_eq!(candidate.address, "Pin location 1.20, 103.60");
        assert_eq!(candidate.lat, Some(1.20001));
    }

    #[test]
    fn pin_candidate_uses_fallback_text() {
        let candidate = pin_candidate(Coordinate::new(1.0, 104.0));
        assert_eq!(candidate.address, "Pin location 1.00, 104.00");
        assert!(candidate.postal_code.is_none());
    }
}
