// src/geo/mod.rs
//! Location resolver: landmark, then geocoded street, then city coordinate.
//!
//! Only the primary city gets sub-city precision. Every other town resolves to
//! its fixed coordinate from [`keywords::CITIES`].

pub mod geocoder;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::NewsConfig;
use crate::error::GeocodeError;
use crate::keywords::{self, City, Landmark, PRIMARY_CITY};
use crate::relevance;
use geocoder::{Geocoder, NominatimGeocoder};

pub const REGION_SUFFIX: &str = "Республика Карелия";
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1_100);

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub place: String,
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    fn of_city(c: &City) -> Self {
        Self {
            place: c.name.to_string(),
            longitude: c.lon,
            latitude: c.lat,
        }
    }

    fn of_landmark(l: &Landmark) -> Self {
        Self {
            place: l.name.to_string(),
            longitude: l.lon,
            latitude: l.lat,
        }
    }
}

fn street_regex() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?:^|[\s,(])(",
            r"(?i:ул\.|улиц[аеуыи]|пр-т|пр\.|проспект\w*|б-р|бульвар\w*|",
            r"пер\.|переул\w*|наб\.|набережн\w*|ш\.|шоссе|пл\.|площад\w*)",
            r"\s*[А-ЯЁ][а-яё-]+(?:\s[А-ЯЁ][а-яё]+)?)",
        ))
        .unwrap()
    })
}

/// First `<marker> <Capitalized Name>` street mention, whitespace-collapsed.
pub fn extract_street(text: &str) -> Option<String> {
    street_regex()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
}

/// First landmark whose keyword occurs in `text`.
pub fn find_landmark(text: &str) -> Option<&'static Landmark> {
    let lower = text.to_lowercase();
    keywords::LANDMARKS
        .iter()
        .find(|l| l.keywords.iter().any(|kw| lower.contains(kw)))
}

pub struct LocationResolver {
    geocoder: Option<Arc<dyn Geocoder>>,
    /// Street → accepted coordinate (lon, lat). `None` marks a street the
    /// geocoder answered for, but outside the primary city.
    streets: RwLock<HashMap<String, Option<(f64, f64)>>>,
    /// Start time of the last geocoder call. Held across the call.
    throttle: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl LocationResolver {
    pub fn new(geocoder: Option<Arc<dyn Geocoder>>, min_interval: Duration) -> Self {
        Self {
            geocoder,
            streets: RwLock::new(HashMap::new()),
            throttle: Mutex::new(None),
            min_interval,
        }
    }

    /// Landmarks and city coordinates only; no network.
    pub fn offline() -> Self {
        Self::new(None, DEFAULT_MIN_INTERVAL)
    }

    pub fn from_config(cfg: &NewsConfig) -> Result<Self, GeocodeError> {
        let p = &cfg.pipeline;
        let min_interval = Duration::from_millis(p.geocoder_min_interval_ms);
        if !p.geocoder_enabled {
            return Ok(Self::new(None, min_interval));
        }
        let geo = NominatimGeocoder::new(
            &p.geocoder_url,
            &p.user_agent,
            Duration::from_secs(p.request_timeout_secs.max(1)),
        )?;
        Ok(Self::new(Some(Arc::new(geo)), min_interval))
    }

    pub fn cached_streets(&self) -> usize {
        self.streets.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Resolve `text` to a place and coordinate. Never fails.
    pub async fn resolve(&self, text: &str) -> Location {
        let primary = keywords::primary_city();
        let city = relevance::detect_city(text).unwrap_or(primary);
        if city.name != PRIMARY_CITY {
            return Location::of_city(city);
        }

        if let Some(landmark) = find_landmark(text) {
            return Location::of_landmark(landmark);
        }

        if let Some(street) = extract_street(text) {
            if let Some((lon, lat)) = self.street_coordinate(&street).await {
                return Location {
                    place: format!("{PRIMARY_CITY}, {street}"),
                    longitude: lon,
                    latitude: lat,
                };
            }
        }

        Location::of_city(city)
    }

    async fn street_coordinate(&self, street: &str) -> Option<(f64, f64)> {
        let key = street.to_lowercase();
        if let Ok(map) = self.streets.read() {
            if let Some(hit) = map.get(&key) {
                return *hit;
            }
        }
        let geocoder = self.geocoder.as_ref()?;

        match self.geocode_throttled(geocoder.as_ref(), street).await {
            Ok(coord) => {
                if let Ok(mut map) = self.streets.write() {
                    map.insert(key, Some(coord));
                }
                Some(coord)
            }
            Err(GeocodeError::NoMatch { expected }) => {
                debug!(target: "geo", street, expected = %expected, "geocoder result outside city");
                if let Ok(mut map) = self.streets.write() {
                    map.insert(key, None);
                }
                None
            }
            Err(e) => {
                warn!(target: "geo", street, error = %e, "geocoding failed, using city coordinate");
                None
            }
        }
    }

    async fn geocode_throttled(
        &self,
        geocoder: &dyn Geocoder,
        street: &str,
    ) -> Result<(f64, f64), GeocodeError> {
        let mut last = self.throttle.lock().await;
        if let Some(prev) = *last {
            let ready = prev + self.min_interval;
            if Instant::now() < ready {
                tokio::time::sleep_until(ready).await;
            }
        }
        *last = Some(Instant::now());

        counter!("news_geocode_requests_total").increment(1);
        let query = format!("{street}, {PRIMARY_CITY}, {REGION_SUFFIX}");
        let candidates = geocoder.search(&query).await?;
        candidates
            .iter()
            .find(|c| c.is_in(PRIMARY_CITY))
            .map(|c| (c.lon, c.lat))
            .ok_or_else(|| GeocodeError::NoMatch {
                expected: PRIMARY_CITY.to_string(),
            })
    }
}
