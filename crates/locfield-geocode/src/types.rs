//! Raw OneMap wire shapes.
//!
//! Every field arrives as a string; absent components are the literal
//! `"NIL"`. These shapes stay private to this crate's seam — consumers only
//! see the normalized [`locfield_core::AddressCandidate`].

use serde::Deserialize;

/// Envelope of the forward-search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OneMapSearchResponse {
    pub found: Option<u32>,
    #[serde(rename = "totalNumPages")]
    pub total_num_pages: Option<u32>,
    #[serde(rename = "pageNum")]
    pub page_num: Option<u32>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// One forward-search record.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "SEARCHVAL")]
    pub search_val: Option<String>,
    #[serde(rename = "BLK_NO")]
    pub blk_no: Option<String>,
    #[serde(rename = "ROAD_NAME")]
    pub road_name: Option<String>,
    #[serde(rename = "BUILDING")]
    pub building: Option<String>,
    #[serde(rename = "ADDRESS")]
    pub address: Option<String>,
    #[serde(rename = "POSTAL")]
    pub postal: Option<String>,
    #[serde(rename = "X")]
    pub x: Option<String>,
    #[serde(rename = "Y")]
    pub y: Option<String>,
    #[serde(rename = "LATITUDE")]
    pub latitude: Option<String>,
    #[serde(rename = "LONGITUDE")]
    pub longitude: Option<String>,
}

/// Envelope of the reverse-geocode endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ReverseGeocodeResponse {
    #[serde(rename = "GeocodeInfo", default)]
    pub geocode_info: Vec<GeocodeInfo>,
}

/// One reverse-geocode record.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeInfo {
    #[serde(rename = "BUILDINGNAME")]
    pub building_name: Option<String>,
    #[serde(rename = "BLOCK")]
    pub block: Option<String>,
    #[serde(rename = "ROAD")]
    pub road: Option<String>,
    #[serde(rename = "POSTALCODE")]
    pub postal_code: Option<String>,
    #[serde(rename = "XCOORD")]
    pub x_coord: Option<String>,
    #[serde(rename = "YCOORD")]
    pub y_coord: Option<String>,
    #[serde(rename = "LATITUDE")]
    pub latitude: Option<String>,
    #[serde(rename = "LONGITUDE")]
    pub longitude: Option<String>,
}
