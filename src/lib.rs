//! Crop analysis relay.
//!
//! Serves an upload form, forwards each uploaded crop photo to an external
//! predictor service and hands its verdict back in a display-ready shape.
//! The [`signup`] module carries the field rules for the signup form.

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod predictor;
pub mod relay;
pub mod signup;
pub mod view;

use config::Config;
use predictor::PredictorClient;

#[derive(Clone, Debug)]
pub struct AppState {
    pub predictor: PredictorClient,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            predictor: PredictorClient::new(config.predictor_url.clone()),
        }
    }
}

pub fn app(config: &Config) -> Router {
    router(AppState::new(config), config.body_limit_bytes)
}

pub fn router(state: AppState, body_limit_bytes: Option<usize>) -> Router {
    let body_limit = match body_limit_bytes {
        Some(bytes) => DefaultBodyLimit::max(bytes),
        None => DefaultBodyLimit::disable(),
    };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(view::upload_form))
        .route("/api/analyze", post(relay::analyze_handler))
        .route("/api/chat/analyse", post(relay::analyze_handler))
        .layer(body_limit)
        .with_state(state)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
