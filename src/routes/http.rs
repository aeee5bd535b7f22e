//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and log include parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::error::{ClassifierError, QuizError, StoreError};
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

/// Error body + status code for every failing handler.
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.0, Json(ErrorOut { error: self.1 })).into_response()
  }
}

impl From<StoreError> for ApiError {
  fn from(e: StoreError) -> Self { ApiError(StatusCode::NOT_FOUND, e.to_string()) }
}

impl From<QuizError> for ApiError {
  fn from(e: QuizError) -> Self { ApiError(StatusCode::CONFLICT, e.to_string()) }
}

impl From<ClassifierError> for ApiError {
  fn from(e: ClassifierError) -> Self {
    let code = match e {
      ClassifierError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
      ClassifierError::Decode(_) => StatusCode::BAD_REQUEST,
      ClassifierError::Http(_) | ClassifierError::Status { .. } => StatusCode::BAD_GATEWAY,
    };
    ApiError(code, e.to_string())
  }
}

fn unknown_quiz(id: &str) -> ApiError {
  ApiError(StatusCode::NOT_FOUND, format!("Unknown quiz session: {}", id))
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, animals: state.store.len() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_animals(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ListQuery>,
) -> impl IntoResponse {
  let animals = list_animals(&state, q.status.as_deref(), q.sort);
  info!(target: "biotrack_backend", count = animals.len(), "HTTP animal list served");
  Json(animals)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_animal(
  State(state): State<Arc<AppState>>,
  Path(id): Path<usize>,
) -> Result<Json<AnimalOut>, ApiError> {
  Ok(Json(get_animal(&state, id)?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_random_animal(
  State(state): State<Arc<AppState>>,
  Query(q): Query<RandomQuery>,
) -> Result<Json<AnimalOut>, ApiError> {
  random_animal(&state, q.status.as_deref())
    .map(Json)
    .ok_or_else(|| ApiError(StatusCode::NOT_FOUND, "No animals match the filter".into()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_predators(
  State(state): State<Arc<AppState>>,
  Path(id): Path<usize>,
) -> Result<Json<Vec<PredatorOut>>, ApiError> {
  Ok(Json(predators_of(&state, id)?))
}

#[instrument(level = "info", skip(state), fields(name = %q.name))]
pub async fn http_search(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SearchQuery>,
) -> impl IntoResponse {
  Json(search_animals(&state, &q.name))
}

#[instrument(level = "info", skip(state))]
pub async fn http_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(stats(&state))
}

#[instrument(level = "info", skip(state, body), fields(b64_len = body.image_base64.len(), mime = %body.mime))]
pub async fn http_post_identify(
  State(state): State<Arc<AppState>>,
  Json(body): Json<IdentifyIn>,
) -> Result<Json<IdentifyOut>, ApiError> {
  Ok(Json(identify_image(&state, &body.image_base64, &body.mime).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_quiz(State(state): State<Arc<AppState>>) -> Result<Json<QuizOut>, ApiError> {
  let (id, session) = state.create_quiz().await?;
  Ok(Json(quiz_out(Some(&id), &session)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_quiz(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<QuizOut>, ApiError> {
  let session = state.get_quiz(&id).await.ok_or_else(|| unknown_quiz(&id))?;
  Ok(Json(quiz_out(Some(&id), &session)))
}

#[instrument(level = "info", skip(state, body), fields(choice_len = body.choice.len()))]
pub async fn http_post_quiz_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, ApiError> {
  let outcome = state
    .answer_quiz(&id, &body.choice)
    .await
    .ok_or_else(|| unknown_quiz(&id))??;
  info!(target: "quiz", %id, verdict = ?outcome.verdict, score = outcome.score, "HTTP quiz answer evaluated");
  Ok(Json(answer_out(&outcome, state.config.quiz.advance_delay_ms)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_quiz(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  if state.delete_quiz(&id).await {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(unknown_quiz(&id))
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_favorites(
  State(state): State<Arc<AppState>>,
  Path(user): Path<String>,
) -> impl IntoResponse {
  let favorites = state.users.favorites(&user).await.names().to_vec();
  Json(FavoritesOut { user, favorites })
}

#[instrument(level = "info", skip(state, body), fields(name = %body.name))]
pub async fn http_toggle_favorite(
  State(state): State<Arc<AppState>>,
  Path(user): Path<String>,
  Json(body): Json<FavoriteIn>,
) -> impl IntoResponse {
  let favorite = state.users.toggle_favorite(&user, &body.name).await;
  Json(FavoriteToggleOut { name: body.name, favorite })
}
