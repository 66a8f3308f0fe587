//! Map picker viewport logic.
//!
//! The tile map itself is an external capability ("render a map, accept tap
//! coordinates, place markers, pan/zoom"); this module only decides where the
//! viewport should be and which taps are allowed through.

use locfield_core::{distance_between, Coordinate};

/// Center of the default regional bounding box shown when nothing is
/// selected.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 1.3437,
    lng: 103.8357,
};
/// Wide zoom used with the default bounding box.
pub const DEFAULT_ZOOM: u8 = 11;
/// Floor for any pin-focused zoom.
pub const MIN_PIN_ZOOM: u8 = 15;
/// Breakpoint-dependent defaults when focusing a pin.
pub const MOBILE_PIN_ZOOM: u8 = 18;
pub const DESKTOP_PIN_ZOOM: u8 = 17;

/// If the current center is within this distance of the focus target, the
/// view already shows it and a higher current zoom is preserved.
const ALREADY_IN_VIEW_M: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

/// Owns viewport state and tap gating for the interactive map panel.
#[derive(Debug, Clone)]
pub struct MapPicker {
    viewport: Viewport,
    locating: bool,
}

impl Default for MapPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl MapPicker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            viewport: Viewport {
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM,
            },
            locating: false,
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Centers on `coord`. The zoom is the greater of the configured minimum
    /// and the breakpoint default, except when the view is already on the
    /// target at a higher zoom, which is preserved.
    pub fn focus(&mut self, coord: Coordinate, mobile: bool) {
        let breakpoint_default = if mobile {
            MOBILE_PIN_ZOOM
        } else {
            DESKTOP_PIN_ZOOM
        };
        let target = MIN_PIN_ZOOM.max(breakpoint_default);

        let already_in_view =
            distance_between(self.viewport.center, coord) <= ALREADY_IN_VIEW_M;
        let zoom = if already_in_view && self.viewport.zoom > target {
            self.viewport.zoom
        } else {
            target
        };
        self.viewport = Viewport {
            center: coord,
            zoom,
        };
    }

    /// Resets to the regional bounding box, used when no coordinate is
    /// selected.
    pub fn clear(&mut self) {
        self.viewport = Viewport {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        };
    }

    /// Marks a "getting current location" operation as in flight; taps are
    /// suppressed meanwhile so they cannot race the geolocation result.
    pub fn set_locating(&mut self, locating: bool) {
        self.locating = locating;
    }

    #[must_use]
    pub fn is_locating(&self) -> bool {
        self.locating
    }

    /// Gates a tap on the map surface. Returns the coordinate to resolve, or
    /// `None` while geolocation is in flight.
    #[must_use]
    pub fn tap(&self, coord: Coordinate) -> Option<Coordinate> {
        if self.locating {
            None
        } else {
            Some(coord)
        }
    }
}
