use std::sync::Arc;

use serde::Deserialize;
use shuttle_axum::axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::classify::Category;
use crate::error::NewsError;
use crate::pipeline::NewsService;

pub const CACHE_HEADER: &str = "X-News-Cache";

#[derive(Clone)]
pub struct AppState {
    pub news: Arc<NewsService>,
}

impl AppState {
    pub fn new(news: NewsService) -> Self {
        Self {
            news: Arc::new(news),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/news", get(get_news))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct NewsQuery {
    #[serde(default)]
    category: Option<String>,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, msg: String) -> Response {
    (status, Json(ErrorBody { error: msg })).into_response()
}

async fn get_news(State(state): State<AppState>, Query(q): Query<NewsQuery>) -> Response {
    let filter = match q.category.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<Category>() {
            Ok(c) => Some(c),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
        },
    };

    let lookup = match state.news.current().await {
        Ok(l) => l,
        Err(e) => {
            warn!(error = %e, "news unavailable");
            let status = match e {
                NewsError::NoSources | NewsError::AllSourcesFailed { .. } => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            };
            return error_response(status, e.to_string());
        }
    };

    let items: Vec<_> = lookup
        .snapshot
        .items
        .iter()
        .filter(|it| filter.map_or(true, |c| it.category == c))
        .cloned()
        .collect();

    let mut headers = HeaderMap::new();
    headers.insert(
        CACHE_HEADER,
        HeaderValue::from_static(if lookup.hit { "HIT" } else { "MISS" }),
    );
    (StatusCode::OK, headers, Json(items)).into_response()
}
