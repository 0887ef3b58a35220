//! HTTP routes and the grading orchestration flow.
//!
//! The grade handler is the glue the rest of the system hangs off:
//! collect input → call the grading provider → normalize its reply →
//! combine with submission metadata → append to the store → return the
//! record. Upstream-format failures never surface here (the normalizer is
//! total); only an outright failed grading call or a storage failure
//! produces an error response.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, error, warn};

use quizmark_core::model::{Submission, QUESTION_COUNT};
use quizmark_core::normalize::normalize;
use quizmark_core::store::SubmissionStore;
use quizmark_core::traits::{GradeRequest, GradingProvider, ImageAttachment};
use quizmark_providers::ProviderError;

use crate::id::IdAllocator;

/// Upload cap covering the three answer images.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
const MAX_IMAGES: usize = 3;

/// Shared state behind every handler.
pub struct AppState {
    pub store: SubmissionStore,
    pub provider: Arc<dyn GradingProvider>,
    pub ids: IdAllocator,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn storage_failure(err: quizmark_core::error::StoreError) -> ApiError {
    error!(%err, "submission store failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "storage failure".to_string(),
        }),
    )
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/grade", post(grade))
        .route("/api/results", get(list_results))
        .route("/api/results/{id}", delete(delete_result))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Grade a submission: multipart form with `nickname`, `answers` (a JSON
/// array of strings), and up to three `images` file parts.
async fn grade(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Submission>, ApiError> {
    let mut nickname = String::new();
    let mut answers_raw: Option<String> = None;
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("malformed multipart request: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "nickname" => {
                nickname = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("unreadable nickname field: {e}")))?;
            }
            "answers" => {
                answers_raw = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| bad_request(format!("unreadable answers field: {e}")))?,
                );
            }
            "images" => {
                if images.len() >= MAX_IMAGES {
                    return Err(bad_request(format!("at most {MAX_IMAGES} images allowed")));
                }
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("unreadable image upload: {e}")))?
                    .to_vec();
                images.push(ImageAttachment { mime_type, data });
            }
            _ => {}
        }
    }

    let answers = parse_answers(answers_raw.as_deref().unwrap_or("[]"))
        .ok_or_else(|| bad_request("answers must be a JSON array of strings"))?;

    let request = GradeRequest {
        nickname: nickname.clone(),
        answers: answers.clone(),
        images,
    };

    let reply = match state.provider.grade(&request).await {
        Ok(reply) => reply,
        Err(e) => {
            match e.downcast_ref::<ProviderError>() {
                Some(p) if p.is_permanent() => error!(%e, "grading call failed permanently"),
                _ => warn!(%e, "grading call failed"),
            }
            return Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: "grading service unavailable".to_string(),
                }),
            ));
        }
    };

    debug!(model = %reply.model, latency_ms = reply.latency_ms, "grading reply received");

    let result = normalize(&reply.raw_text);
    let submission = Submission::from_grading(
        state.ids.next(),
        nickname,
        answers,
        result,
        Utc::now(),
    );

    state
        .store
        .append(submission.clone())
        .await
        .map_err(storage_failure)?;

    Ok(Json(submission))
}

/// Parse the submitted answers and pad or truncate to exactly
/// [`QUESTION_COUNT`] entries, so the core only ever sees the invariant
/// shape.
fn parse_answers(raw: &str) -> Option<[String; QUESTION_COUNT]> {
    let mut answers: Vec<String> = serde_json::from_str(raw).ok()?;
    answers.resize(QUESTION_COUNT, String::new());
    let mut out: [String; QUESTION_COUNT] = Default::default();
    for (slot, answer) in out.iter_mut().zip(answers) {
        *slot = answer;
    }
    Some(out)
}

async fn list_results(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    let submissions = state.store.list_all().await.map_err(storage_failure)?;
    Ok(Json(submissions))
}

async fn delete_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let removed = state.store.delete_by_id(id).await.map_err(storage_failure)?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: format!("no submission with id {id}"),
            }),
        ))
    }
}
