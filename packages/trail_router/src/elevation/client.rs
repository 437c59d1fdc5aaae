//! Access to elevation data. The profile builder only relies on the
//! ElevationSource trait, the HTTP client below talks to any service
//! implementing the Open-Elevation lookup API.

use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::error::ElevationError;
use crate::common::geodesy::LatLon;

/// Anything which can look up the elevation of a batch of points. Exactly one
/// elevation (in meters) must be returned per point, in the same order.
pub trait ElevationSource {
    fn fetch_elevations(
        &self,
        points: &[LatLon],
    ) -> impl Future<Output = Result<Vec<f64>, ElevationError>> + Send;
}

#[derive(Debug, Serialize, PartialEq)]
struct Location {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize, PartialEq)]
struct LookupRequest {
    locations: Vec<Location>,
}

impl From<&[LatLon]> for LookupRequest {
    fn from(points: &[LatLon]) -> LookupRequest {
        LookupRequest {
            locations: points
                .iter()
                .map(|point| Location {
                    latitude: point.lat,
                    longitude: point.lon,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    elevation: f64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

impl LookupResponse {
    /// Pull the elevations out of the response, checking that one was
    /// returned for every point which was requested
    fn into_elevations(self, expected: usize) -> Result<Vec<f64>, ElevationError> {
        if self.results.len() != expected {
            return Err(ElevationError::CountMismatch {
                expected,
                received: self.results.len(),
            });
        }
        Ok(self.results.into_iter().map(|res| res.elevation).collect())
    }
}

/// Client for an Open-Elevation compatible lookup service
#[derive(Debug, Clone)]
pub struct OpenElevationClient {
    client: Client,
    base_url: String,
}

impl OpenElevationClient {
    pub fn new(base_url: &str) -> OpenElevationClient {
        OpenElevationClient {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn lookup_url(&self) -> String {
        format!("{}/api/v1/lookup", self.base_url)
    }
}

impl ElevationSource for OpenElevationClient {
    async fn fetch_elevations(
        &self,
        points: &[LatLon],
    ) -> Result<Vec<f64>, ElevationError> {
        debug!(count = points.len(), "requesting elevations");

        let response: LookupResponse = self
            .client
            .post(self.lookup_url())
            .json(&LookupRequest::from(points))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_elevations(points.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_url() {
        let client = OpenElevationClient::new("https://elevation.example.com/");

        assert_eq!(
            client.lookup_url(),
            "https://elevation.example.com/api/v1/lookup"
        );
    }

    #[test]
    fn test_request_body() {
        let points = vec![LatLon::new(50.0, 10.0), LatLon::new(50.1, 10.1)];

        let result = serde_json::to_value(LookupRequest::from(points.as_slice()))
            .unwrap();

        let target = serde_json::json!({
            "locations": [
                {"latitude": 50.0, "longitude": 10.0},
                {"latitude": 50.1, "longitude": 10.1}
            ]
        });
        assert_eq!(result, target);
    }

    #[test]
    fn test_parse_response() {
        let raw = r#"{"results": [
            {"latitude": 50.0, "longitude": 10.0, "elevation": 120.5},
            {"latitude": 50.1, "longitude": 10.1, "elevation": 98.0}
        ]}"#;
        let response: LookupResponse = serde_json::from_str(raw).unwrap();

        let result = response.into_elevations(2).unwrap();

        assert_eq!(result, vec![120.5, 98.0]);
    }

    /// A response missing some of the requested points is rejected
    #[test]
    fn test_parse_response_short() {
        let raw = r#"{"results": [{"elevation": 120.5}]}"#;
        let response: LookupResponse = serde_json::from_str(raw).unwrap();

        let result = response.into_elevations(2);

        assert!(matches!(
            result,
            Err(ElevationError::CountMismatch {
                expected: 2,
                received: 1
            })
        ));
    }
}
