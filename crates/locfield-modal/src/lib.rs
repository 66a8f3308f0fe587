pub mod events;
pub mod field;
pub mod geolocate;
pub mod modal;
pub mod picker;
pub mod search;

pub use events::{Decision, EventHooks, FieldEvent, NoHooks};
pub use field::LocationField;
pub use geolocate::{GeolocateError, Geolocator};
pub use modal::{LocationModal, ModalConfig, ModalErrorState, PanelInputMode};
pub use picker::{MapPicker, Viewport};
pub use search::{ResultState, SearchPanel, SelectError};
