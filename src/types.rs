//! Response types for the Geocoding API
//!
//! These mirror the provider's JSON payload. Fields the provider may omit
//! default to empty values so a bare `{"status": "..."}` body still decodes.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Status
// ============================================================================

/// Status code reported by the provider in every response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// At least one result was returned
    Ok,
    /// The lookup succeeded but returned nothing
    ZeroResults,
    /// Quota exceeded; the client cools down before issuing more requests
    OverQueryLimit,
    /// The request was rejected (bad signature, disabled API, ...)
    RequestDenied,
    /// A required parameter was missing or malformed
    InvalidRequest,
    /// Server-side failure, the request may succeed if tried again
    UnknownError,
}

impl Status {
    /// Wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::ZeroResults => "ZERO_RESULTS",
            Status::OverQueryLimit => "OVER_QUERY_LIMIT",
            Status::RequestDenied => "REQUEST_DENIED",
            Status::InvalidRequest => "INVALID_REQUEST",
            Status::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Whether the provider asked us to back off
    pub fn is_over_query_limit(&self) -> bool {
        matches!(self, Status::OverQueryLimit)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Response
// ============================================================================

/// Decoded reverse geocoding response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    /// Matches, most specific first
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<ResultSet>,
    /// Outcome of the lookup
    pub status: Status,
    /// Human-readable detail the provider attaches to non-OK statuses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl GeocodeResponse {
    /// Formatted address of the first result, if any
    pub fn first_address(&self) -> Option<&str> {
        self.results.first().map(|r| r.formatted_address.as_str())
    }
}

/// `null` and a missing field both mean "no results"
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single geocoding match
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl ResultSet {
    /// Find the first address component tagged with `kind` (e.g. "locality")
    pub fn component(&self, kind: &str) -> Option<&AddressComponent> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
    }
}

/// One piece of a structured address
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressComponent {
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Location of a result
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub location: Coordinate,
    /// ROOFTOP, RANGE_INTERPOLATED, GEOMETRIC_CENTER or APPROXIMATE
    #[serde(default)]
    pub location_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

/// Latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// Rectangular area
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub southwest: Coordinate,
    pub northeast: Coordinate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("\"OK\"", Status::Ok)]
    #[test_case("\"ZERO_RESULTS\"", Status::ZeroResults)]
    #[test_case("\"OVER_QUERY_LIMIT\"", Status::OverQueryLimit)]
    #[test_case("\"REQUEST_DENIED\"", Status::RequestDenied)]
    #[test_case("\"INVALID_REQUEST\"", Status::InvalidRequest)]
    #[test_case("\"UNKNOWN_ERROR\"", Status::UnknownError)]
    fn test_status_wire_names(json: &str, expected: Status) {
        let status: Status = serde_json::from_str(json).unwrap();
        assert_eq!(status, expected);
        assert_eq!(format!("\"{status}\""), json);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result: std::result::Result<Status, _> = serde_json::from_str("\"MAYBE\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_status_only_body() {
        let resp: GeocodeResponse =
            serde_json::from_str(r#"{"status":"OVER_QUERY_LIMIT"}"#).unwrap();
        assert!(resp.results.is_empty());
        assert!(resp.status.is_over_query_limit());
        assert_eq!(resp.first_address(), None);
    }

    #[test]
    fn test_null_results_decode_empty() {
        let resp: GeocodeResponse =
            serde_json::from_str(r#"{"results":null,"status":"ZERO_RESULTS"}"#).unwrap();
        assert!(resp.results.is_empty());
        assert_eq!(resp.status, Status::ZeroResults);
    }

    #[test]
    fn test_full_result_decodes() {
        let body = r#"{
            "results": [{
                "address_components": [
                    {"long_name": "Zweibrücken", "short_name": "ZW", "types": ["locality", "political"]},
                    {"long_name": "Germany", "short_name": "DE", "types": ["country", "political"]}
                ],
                "formatted_address": "Hauptstraße 1, 66482 Zweibrücken, Germany",
                "geometry": {
                    "location": {"lat": 49.1758444, "lng": 7.3019607},
                    "location_type": "ROOFTOP",
                    "viewport": {
                        "northeast": {"lat": 49.18, "lng": 7.31},
                        "southwest": {"lat": 49.17, "lng": 7.29}
                    }
                },
                "place_id": "ChIJabc",
                "types": ["street_address"]
            }],
            "status": "OK"
        }"#;

        let resp: GeocodeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.status, Status::Ok);
        assert_eq!(
            resp.first_address(),
            Some("Hauptstraße 1, 66482 Zweibrücken, Germany")
        );

        let result = &resp.results[0];
        assert_eq!(result.geometry.location_type, "ROOFTOP");
        assert_eq!(result.geometry.location.lat, 49.1758444);
        assert!(result.geometry.bounds.is_none());
        assert_eq!(result.geometry.viewport.unwrap().northeast.lng, 7.31);
        assert_eq!(result.component("country").unwrap().short_name, "DE");
        assert!(result.component("route").is_none());
    }

    #[test]
    fn test_error_message_kept() {
        let resp: GeocodeResponse = serde_json::from_str(
            r#"{"results":[],"status":"REQUEST_DENIED","error_message":"Invalid signature"}"#,
        )
        .unwrap();
        assert_eq!(resp.status, Status::RequestDenied);
        assert_eq!(resp.error_message.as_deref(), Some("Invalid signature"));
    }
}
