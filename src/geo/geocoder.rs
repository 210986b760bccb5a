// src/geo/geocoder.rs
//! Street-address geocoding against a Nominatim-compatible search endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::GeocodeError;

/// One search hit with the address fields the resolver checks.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
    pub city: Option<String>,
    pub town: Option<String>,
    pub municipality: Option<String>,
}

impl GeocodeCandidate {
    /// True when any municipality-level field equals `name`.
    pub fn is_in(&self, name: &str) -> bool {
        [&self.city, &self.town, &self.municipality]
            .into_iter()
            .flatten()
            .any(|v| v.trim().to_lowercase() == name.to_lowercase())
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError>;
}

#[derive(Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Deserialize, Default)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    municipality: Option<String>,
}

/// Parse a Nominatim `jsonv2` search response.
pub fn parse_nominatim(body: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
    let results: Vec<NominatimResult> =
        serde_json::from_str(body).map_err(|e| GeocodeError::Malformed(e.to_string()))?;
    results
        .into_iter()
        .map(|r| {
            let lat = r
                .lat
                .trim()
                .parse::<f64>()
                .map_err(|e| GeocodeError::Malformed(format!("lat {:?}: {e}", r.lat)))?;
            let lon = r
                .lon
                .trim()
                .parse::<f64>()
                .map_err(|e| GeocodeError::Malformed(format!("lon {:?}: {e}", r.lon)))?;
            let addr = r.address.unwrap_or_default();
            Ok(GeocodeCandidate {
                lat,
                lon,
                display_name: r.display_name,
                city: addr.city,
                town: addr.town,
                municipality: addr.municipality,
            })
        })
        .collect()
}

pub struct NominatimGeocoder {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
    limit: u8,
}

impl NominatimGeocoder {
    pub fn new(url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            url: url.to_string(),
            timeout,
            limit: 3,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        let limit = self.limit.to_string();
        let resp = self
            .http
            .get(&self.url)
            .query(&[
                ("q", query),
                ("format", "jsonv2"),
                ("addressdetails", "1"),
                ("accept-language", "ru"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodeError::Timeout(self.timeout)
                } else {
                    GeocodeError::Http(e)
                }
            })?;
        if !resp.status().is_success() {
            return Err(GeocodeError::Status(resp.status().as_u16()));
        }
        let body = resp.text().await?;
        parse_nominatim(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_address_details() {
        let body = r#"[{"lat":"61.7890","lon":"34.3770",
            "display_name":"улица Куйбышева, Петрозаводск",
            "address":{"road":"улица Куйбышева","city":"Петрозаводск"}}]"#;
        let c = parse_nominatim(body).unwrap();
        assert_eq!(c.len(), 1);
        assert!((c[0].lat - 61.789).abs() < 1e-9);
        assert!(c[0].is_in("Петрозаводск"));
        assert!(!c[0].is_in("Кондопога"));
    }

    #[test]
    fn bad_coordinates_are_malformed() {
        let body = r#"[{"lat":"north","lon":"34.0"}]"#;
        assert!(matches!(parse_nominatim(body), Err(GeocodeError::Malformed(_))));
        assert!(parse_nominatim("[]").unwrap().is_empty());
    }
}
