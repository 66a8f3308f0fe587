pub mod cancel;
pub mod client;
pub mod error;
pub mod helper;
pub mod normalize;
pub mod types;

pub use cancel::CancelHandle;
pub use client::OneMapClient;
pub use error::GeocodeError;
pub use helper::{Debouncer, LocationHelper, LocationList};
pub use types::{GeocodeInfo, OneMapSearchResponse, SearchHit};
