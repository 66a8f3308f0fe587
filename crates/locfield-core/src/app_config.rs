//! Runtime configuration for the location field subsystem.

/// Tunables shared by the geocoding adapter, helper, and modal.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// Base URL of the OneMap-style geocoding service.
    pub onemap_base_url: String,
    /// Per-request timeout for geocoding calls, in seconds.
    pub request_timeout_secs: u64,
    /// Trailing debounce applied to forward search, in milliseconds.
    pub debounce_ms: u64,
    /// Device geolocation retrieval timeout, in milliseconds.
    pub geolocation_timeout_ms: u64,
    /// Client-side result page size for the search panel.
    pub page_size: usize,
    pub user_agent: String,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            onemap_base_url: "https://www.onemap.gov.sg".to_owned(),
            request_timeout_secs: 15,
            debounce_ms: 500,
            geolocation_timeout_ms: 6_000,
            page_size: 10,
            user_agent: "locfield/0.1".to_owned(),
        }
    }
}
