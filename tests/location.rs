// tests/location.rs
//
// Location resolution: landmark, geocoded street, city fallback.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use karelia_news::error::GeocodeError;
use karelia_news::geo::geocoder::{GeocodeCandidate, Geocoder};
use karelia_news::geo::LocationResolver;
use karelia_news::keywords::{city, primary_city, PRIMARY_CITY};

enum Answer {
    In(&'static str, f64, f64),
    Fail,
}

struct StubGeocoder {
    answer: Answer,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl StubGeocoder {
    fn new(answer: Answer) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), Instant::now()));
        match self.answer {
            Answer::In(town, lon, lat) => Ok(vec![GeocodeCandidate {
                lat,
                lon,
                display_name: format!("{query} ({town})"),
                city: Some(town.to_string()),
                town: None,
                municipality: None,
            }]),
            Answer::Fail => Err(GeocodeError::Status(503)),
        }
    }
}

fn resolver(stub: &Arc<StubGeocoder>) -> LocationResolver {
    let geo: Arc<dyn Geocoder> = stub.clone();
    LocationResolver::new(Some(geo), Duration::from_millis(1_100))
}

#[tokio::test]
async fn other_city_resolves_to_its_coordinate() {
    let stub = StubGeocoder::new(Answer::Fail);
    let r = resolver(&stub);
    let loc = r.resolve("В Кондопоге открыли новую школу").await;
    let kondopoga = city("Кондопога").unwrap();
    assert_eq!(loc.place, "Кондопога");
    assert_eq!(loc.longitude, kondopoga.lon);
    assert_eq!(loc.latitude, kondopoga.lat);
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn landmark_beats_street() {
    let stub = StubGeocoder::new(Answer::In(PRIMARY_CITY, 34.0, 61.0));
    let r = resolver(&stub);
    let loc = r
        .resolve("Премьера в Национальном театре на ул. Пушкинская, Петрозаводск")
        .await;
    assert_eq!(loc.place, "Национальный театр Карелии");
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn geocoder_error_falls_back_to_primary_city() {
    let stub = StubGeocoder::new(Answer::Fail);
    let r = resolver(&stub);
    let loc = r.resolve("ДТП на ул. Ленина в Петрозаводске").await;
    assert_eq!(loc.place, PRIMARY_CITY);
    assert_eq!(loc.longitude, primary_city().lon);
    assert_eq!(loc.latitude, primary_city().lat);
    assert_eq!(stub.calls().len(), 1);
    assert_eq!(r.cached_streets(), 0, "transient errors are not cached");
}

#[tokio::test]
async fn result_outside_city_falls_back_and_is_remembered() {
    let stub = StubGeocoder::new(Answer::In("Кондопога", 33.9, 62.2));
    let r = resolver(&stub);
    let loc = r.resolve("ДТП на ул. Ленина в Петрозаводске").await;
    assert_eq!(loc.place, PRIMARY_CITY);
    assert_eq!(loc.longitude, primary_city().lon);

    let _ = r.resolve("Снова пробка на ул. Ленина, Петрозаводск").await;
    assert_eq!(stub.calls().len(), 1);
}

#[tokio::test]
async fn accepted_street_is_geocoded_once() {
    let stub = StubGeocoder::new(Answer::In(PRIMARY_CITY, 34.3801, 61.7802));
    let r = resolver(&stub);

    let first = r.resolve("ДТП на ул. Ленина в Петрозаводске").await;
    assert_eq!(first.place, "Петрозаводск, ул. Ленина");
    assert_eq!(first.longitude, 34.3801);
    assert_eq!(first.latitude, 61.7802);

    let second = r.resolve("Ремонт на ул. Ленина, Петрозаводск").await;
    assert_eq!(second, first);

    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "ул. Ленина, Петрозаводск, Республика Карелия");
    assert_eq!(r.cached_streets(), 1);
}

#[tokio::test(start_paused = true)]
async fn geocoder_calls_are_spaced() {
    let stub = StubGeocoder::new(Answer::In(PRIMARY_CITY, 34.38, 61.78));
    let r = resolver(&stub);

    r.resolve("ДТП на ул. Ленина в Петрозаводске").await;
    r.resolve("ДТП на ул. Ленина в Петрозаводске").await;
    r.resolve("Ремонт на проспекте Невского в Петрозаводске").await;
    r.resolve("Яма на ул. Гоголя в Петрозаводске").await;

    let calls = stub.calls();
    assert_eq!(calls.len(), 3);
    for pair in calls.windows(2) {
        let gap = pair[1].1.duration_since(pair[0].1);
        assert!(gap >= Duration::from_millis(1_100), "gap too short: {gap:?}");
    }
}

#[tokio::test]
async fn offline_resolver_never_geocodes() {
    let r = LocationResolver::offline();
    let loc = r.resolve("ДТП на ул. Ленина в Петрозаводске").await;
    assert_eq!(loc.place, PRIMARY_CITY);
}
