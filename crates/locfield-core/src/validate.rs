//! Validation predicates run by the form engine against the committed value.

use crate::address::has_address_value;
use crate::types::LocationFieldValue;

/// `required` passes only when both coordinates are present.
#[must_use]
pub fn satisfies_required(value: &LocationFieldValue) -> bool {
    value.lat.is_some() && value.lng.is_some()
}

/// `must have postal code` passes only when `postal_code` is a real value
/// per the sentinel-aware presence rule.
#[must_use]
pub fn satisfies_postal_code(value: &LocationFieldValue) -> bool {
    has_address_value(value.postal_code.as_deref())
}
