use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::ContentBackend;
use crate::locale::Language;
use crate::models::Selection;
use crate::orchestrator::Orchestrator;
use crate::view::ViewModel;

pub struct AppState<B> {
    pub orchestrator: Orchestrator<B>,
    pub default_language: Language,
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
            default_language: self.default_language,
        }
    }
}

pub fn build_router<B: ContentBackend + 'static>(state: AppState<B>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/snapshot", get(snapshot_handler::<B>))
        .route("/api/view", get(view_handler::<B>))
        .route("/api/languages", get(languages_handler))
        .route("/api/selection", put(selection_handler::<B>))
        .route("/api/readings/retry", post(retry_handler::<B>))
        .route("/api/ui/readings/toggle", post(toggle_readings_handler::<B>))
        .route("/api/ui/audio", put(audio_handler::<B>))
        .route("/api/ui/news/{index}", put(open_news_handler::<B>))
        .route("/api/ui/news", delete(close_news_handler::<B>))
        .with_state(state)
}

#[derive(Deserialize)]
pub struct SelectionRequest {
    date: NaiveDate,
    language: String,
}

#[derive(Deserialize)]
pub struct AudioRequest {
    visible: bool,
}

#[derive(Serialize)]
struct Accepted {
    generation: u64,
    date: NaiveDate,
    language: Language,
}

#[derive(Serialize)]
struct LanguageEntry {
    code: &'static str,
    name: &'static str,
}

async fn snapshot_handler<B: ContentBackend + 'static>(State(state): State<AppState<B>>) -> Response {
    Json(state.orchestrator.snapshot()).into_response()
}

async fn view_handler<B: ContentBackend + 'static>(State(state): State<AppState<B>>) -> Response {
    let snapshot = state.orchestrator.snapshot();
    Json(ViewModel::from_snapshot(&snapshot, state.default_language)).into_response()
}

async fn languages_handler() -> Json<Vec<LanguageEntry>> {
    Json(
        Language::ALL
            .into_iter()
            .map(|l| LanguageEntry {
                code: l.code(),
                name: l.native_name(),
            })
            .collect(),
    )
}

async fn selection_handler<B: ContentBackend + 'static>(
    State(state): State<AppState<B>>,
    Json(request): Json<SelectionRequest>,
) -> Response {
    let language = Language::resolve(&request.language);
    let selection = Selection::new(request.date, language);
    info!(date = %selection.date, language = %language, "selection changed");

    // The fetch runs on its own tasks; clients follow progress via /api/snapshot.
    let fetch = state.orchestrator.set_selection(selection);
    (
        StatusCode::ACCEPTED,
        Json(Accepted {
            generation: fetch.generation,
            date: selection.date,
            language,
        }),
    )
        .into_response()
}

async fn retry_handler<B: ContentBackend + 'static>(State(state): State<AppState<B>>) -> Response {
    match state.orchestrator.retry_readings() {
        Some(fetch) => (StatusCode::ACCEPTED, Json(serde_json::json!({ "generation": fetch.generation }))).into_response(),
        None => {
            debug!("retry requested while readings are not in error");
            (StatusCode::CONFLICT, "Readings are not in an error state").into_response()
        }
    }
}

async fn toggle_readings_handler<B: ContentBackend + 'static>(State(state): State<AppState<B>>) -> Response {
    if state.orchestrator.snapshot().readings.is_none() {
        return (StatusCode::CONFLICT, "Readings are not loaded").into_response();
    }
    let expanded = state.orchestrator.toggle_readings();
    Json(serde_json::json!({ "readings_expanded": expanded })).into_response()
}

async fn audio_handler<B: ContentBackend + 'static>(
    State(state): State<AppState<B>>,
    Json(request): Json<AudioRequest>,
) -> Response {
    if !state.orchestrator.set_audio_player(request.visible) {
        return (StatusCode::CONFLICT, "Context is not loaded").into_response();
    }
    Json(serde_json::json!({ "audio_player_visible": request.visible })).into_response()
}

async fn open_news_handler<B: ContentBackend + 'static>(
    State(state): State<AppState<B>>,
    Path(index): Path<usize>,
) -> Response {
    if !state.orchestrator.open_news(index) {
        return (StatusCode::NOT_FOUND, format!("No news item {index}")).into_response();
    }
    Json(serde_json::json!({ "open_news": index })).into_response()
}

async fn close_news_handler<B: ContentBackend + 'static>(State(state): State<AppState<B>>) -> StatusCode {
    state.orchestrator.close_news();
    StatusCode::NO_CONTENT
}
