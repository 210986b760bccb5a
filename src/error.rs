// src/error.rs
//! Error taxonomy. Everything except [`NewsError`] is recovered at the
//! component boundary where it occurs.

use std::time::Duration;

/// A single source could not produce items this run. The source is skipped.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unknown extraction rule: {0}")]
    UnknownRule(String),
}

/// Remote classification failed; the keyword classifier takes over.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("classifier disabled")]
    Disabled,

    #[error("classifier timed out after {0:?}")]
    Timeout(Duration),

    #[error("classifier transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier returned HTTP {0}")]
    Status(u16),

    #[error("unexpected classifier response: {0}")]
    Malformed(String),

    #[error("label {0:?} is not in the label table")]
    UnknownLabel(String),
}

/// Remote geocoding failed; the city coordinate takes over.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoder transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoder returned HTTP {0}")]
    Status(u16),

    #[error("geocoder timed out after {0:?}")]
    Timeout(Duration),

    #[error("no geocoding candidate in {expected}")]
    NoMatch { expected: String },

    #[error("malformed geocoder response: {0}")]
    Malformed(String),
}

/// A refresh produced nothing at all. Surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewsError {
    #[error("no news sources configured")]
    NoSources,

    #[error("all {attempted} news sources failed")]
    AllSourcesFailed { attempted: usize },
}
