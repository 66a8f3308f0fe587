pub mod address;
pub mod app_config;
pub mod config;
pub mod geo;
pub mod types;
pub mod validate;

pub use address::{format_address, has_address_value, AddressParts};
pub use app_config::FieldConfig;
pub use config::{load_field_config, load_field_config_from_env, ConfigError};
pub use geo::{distance_between, is_within_radius};
pub use types::{AddressCandidate, Coordinate, LocationFieldValue, SearchResultPage};
pub use validate::{satisfies_postal_code, satisfies_required};
