//! HTTP client for the OneMap-style geocoding endpoints.
//!
//! Wraps `reqwest` with typed error handling and a fixed request timeout.
//! Forward search and reverse geocode are the only two network operations;
//! static-map URLs are derived locally. No state is retained between calls
//! beyond the connection pool.

use std::time::Duration;

use futures::future::{AbortRegistration, Abortable};
use reqwest::{Client, Url};

use locfield_core::FieldConfig;

use crate::error::GeocodeError;
use crate::types::{GeocodeInfo, OneMapSearchResponse, ReverseGeocodeResponse};

const SEARCH_PATH: &str = "api/common/elastic/search";
const REVGEOCODE_PATH: &str = "api/public/revgeocode";
const STATIC_MAP_PATH: &str = "api/staticmap/getStaticImage";

/// Client for the OneMap search and reverse-geocode endpoints.
///
/// Use [`OneMapClient::new`] for production or [`OneMapClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct OneMapClient {
    client: Client,
    base_url: Url,
}

impl OneMapClient {
    /// Creates a client from the field configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if the
    /// configured base URL does not parse.
    pub fn new(config: &FieldConfig) -> Result<Self, GeocodeError> {
        Self::with_base_url(
            &config.onemap_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: exactly one trailing slash so Url::join keeps the full
        // path instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Forward address search, one remote page at a time (`page_num` is
    /// 1-based).
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Timeout`] — the fixed request timeout elapsed.
    /// - [`GeocodeError::Http`] — network or TLS failure.
    /// - [`GeocodeError::UnexpectedStatus`] — non-2xx response.
    /// - [`GeocodeError::Deserialize`] — body is not the expected shape.
    pub async fn search_by_address(
        &self,
        query: &str,
        page_num: u32,
    ) -> Result<OneMapSearchResponse, GeocodeError> {
        let url = self.build_url(
            SEARCH_PATH,
            &[
                ("searchVal", query),
                ("returnGeom", "Y"),
                ("getAddrDetails", "Y"),
                ("pageNum", &page_num.to_string()),
            ],
        )?;
        self.request_json(url).await
    }

    /// Reverse geocode within `buffer_radius_m` meters of the point.
    ///
    /// Honors `registration`: when the owning [`crate::CancelHandle`] arms a
    /// newer request, this call resolves to [`GeocodeError::Canceled`], which
    /// callers treat as a silent no-op rather than a failure.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Canceled`] — aborted by a newer request.
    /// - [`GeocodeError::Timeout`] / [`GeocodeError::Http`] /
    ///   [`GeocodeError::UnexpectedStatus`] / [`GeocodeError::Deserialize`]
    ///   as for [`Self::search_by_address`].
    pub async fn reverse_geocode(
        &self,
        lat: f64,
        lng: f64,
        buffer_radius_m: u32,
        other_features: bool,
        registration: AbortRegistration,
    ) -> Result<Vec<GeocodeInfo>, GeocodeError> {
        let location = format!("{lat},{lng}");
        let url = self.build_url(
            REVGEOCODE_PATH,
            &[
                ("location", location.as_str()),
                ("buffer", &buffer_radius_m.to_string()),
                ("addressType", "All"),
                ("otherFeatures", if other_features { "Y" } else { "N" }),
            ],
        )?;

        let request = self.request_json::<ReverseGeocodeResponse>(url);
        match Abortable::new(request, registration).await {
            Ok(result) => result.map(|response| response.geocode_info),
            Err(_aborted) => {
                tracing::debug!(buffer_radius_m, "reverse geocode aborted by newer request");
                Err(GeocodeError::Canceled)
            }
        }
    }

    /// Derives a static-map image URL for the collapsed field preview.
    /// Pure URL construction, no network call.
    #[must_use]
    pub fn static_map_url(
        &self,
        lat: f64,
        lng: f64,
        width: u32,
        height: u32,
        pin_color: &str,
    ) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(STATIC_MAP_PATH.split('/'));
        }
        url.query_pairs_mut()
            .append_pair("layerchosen", "default")
            .append_pair("latitude", &lat.to_string())
            .append_pair("longitude", &lng.to_string())
            .append_pair("zoom", "17")
            .append_pair("width", &width.to_string())
            .append_pair("height", &height.to_string())
            .append_pair("points", &format!("[{lat},{lng},\"{pin_color}\"]"));
        url.to_string()
    }

    /// Builds the full request URL with percent-encoded query parameters.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, GeocodeError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| GeocodeError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx status, and parses the body.
    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<T, GeocodeError> {
        let url_text = url.to_string();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GeocodeError::from_transport(e, &url_text))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url_text,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::from_transport(e, &url_text))?;
        serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
            context: url_text,
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
