use reqwest::Client;
use serde::Deserialize;

use geofix_logic::{Coordinate, Location, prelude::*};

const fn api_host() -> &'static str {
    if let Some(host) = option_env!("GEOFIX_API_HOST") {
        host
    } else {
        "ip-api.com"
    }
}

const fn api_secure() -> bool {
    if let Some(secure) = option_env!("GEOFIX_API_SECURE") {
        const_str::eq_ignore_ascii_case!(secure, "true") || const_str::equal!(secure, "1")
    } else {
        false
    }
}

const fn api_http_proto() -> &'static str {
    if api_secure() { "https" } else { "http" }
}

const API_HOST: &str = api_host();
const API_HTTP_PROTO: &str = api_http_proto();

const API_URL: &str = const_str::concat!(API_HTTP_PROTO, "://", API_HOST, "/json");

#[derive(Debug, Deserialize)]
/// Answer of the positioning endpoint, only the fields we read
pub(crate) struct GeoResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl GeoResponse {
    pub(crate) fn into_location(self) -> Option<Location> {
        if self.status != "success" {
            return None;
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Location::new(Coordinate::new(lat, lon))),
            _ => None,
        }
    }
}

/// Ask the positioning service where this device is. `Ok(None)` means the
/// service answered but could not place us.
pub(crate) async fn fetch_position(client: &Client) -> Result<Option<Location>> {
    let resp = client
        .get(API_URL)
        .send()
        .await
        .context("Could not reach the positioning service")?
        .error_for_status()
        .context("Positioning service returned an error")?;

    let geo = resp
        .json::<GeoResponse>()
        .await
        .context("Could not parse the positioning response")?;

    Ok(geo.into_location())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_payload() {
        let geo: GeoResponse =
            serde_json::from_str(r#"{"status":"success","lat":51.509865,"lon":-0.118092}"#)
                .expect("Failed to parse");
        let location = geo.into_location().expect("No location in payload");
        assert_eq!(location.coordinate, Coordinate::new(51.509865, -0.118092));
    }

    #[test]
    fn test_failure_payload() {
        let geo: GeoResponse =
            serde_json::from_str(r#"{"status":"fail"}"#).expect("Failed to parse");
        assert!(geo.into_location().is_none());
    }

    #[test]
    fn test_incomplete_payload() {
        let geo: GeoResponse =
            serde_json::from_str(r#"{"status":"success","lat":51.509865}"#).expect("Failed to parse");
        assert!(geo.into_location().is_none());
    }
}
