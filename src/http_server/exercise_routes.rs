//! Exercise HTTP Routes
//!
//! Endpoints for exercise record CRUD. Each handler parses its input,
//! invokes exactly one store operation, and maps the outcome to an HTTP
//! status plus a JSON body.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::errors::{ApiError, ApiResult};
use crate::store::{ExerciseDraft, ExercisePatch, ExerciseRecord, ExerciseStore, SeriesEntry};

// ==================
// Shared State
// ==================

/// Exercise state shared across handlers
pub struct ExerciseState {
    pub store: Arc<ExerciseStore>,
}

impl ExerciseState {
    pub fn new(store: Arc<ExerciseStore>) -> Self {
        Self { store }
    }
}

// ==================
// Request/Response Types
// ==================

/// Natural-key update body. All four fields are required; a missing field
/// is rejected at the deserialization boundary.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalKeyUpdate {
    pub date: String,
    pub exercise: String,
    pub muscle_group: String,
    pub series: Vec<SeriesEntry>,
}

/// Natural-key delete body. Both fields are required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalKeyDelete {
    pub date: String,
    pub exercise: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuscleGroupQuery {
    #[serde(default)]
    pub muscle_group: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================
// Exercise Routes
// ==================

/// Create exercise routes
pub fn exercise_routes(state: Arc<ExerciseState>) -> Router {
    Router::new()
        // Whole-collection operations
        .route("/ejercicios", post(insert_exercise_handler))
        .route("/ejercicios", get(list_exercises_handler))
        .route("/ejercicios", put(update_by_natural_key_handler))
        .route("/ejercicios", delete(delete_by_natural_key_handler))
        .route("/ejercicios/all", delete(delete_all_handler))
        // Id-addressed operations
        .route("/ejercicios/{id}", put(update_by_id_handler))
        .route("/ejercicios/{id}", delete(delete_by_id_handler))
        // Filtered read
        .route("/api/exercises", get(filter_by_muscle_group_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn insert_exercise_handler(
    State(state): State<Arc<ExerciseState>>,
    payload: Result<Json<ExerciseDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ExerciseRecord>)> {
    let Json(draft) = payload?;
    let record = state.store.insert(draft)?;

    tracing::debug!(id = %record.id, exercise = %record.exercise, "inserted exercise record");

    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_exercises_handler(
    State(state): State<Arc<ExerciseState>>,
) -> ApiResult<Json<Vec<ExerciseRecord>>> {
    let records = state.store.find_all()?;
    Ok(Json(records))
}

async fn update_by_id_handler(
    State(state): State<Arc<ExerciseState>>,
    Path(id): Path<String>,
    payload: Result<Json<ExercisePatch>, JsonRejection>,
) -> ApiResult<Json<ExerciseRecord>> {
    let Json(patch) = payload?;

    match state.store.update_by_id(&id, patch)? {
        Some(record) => {
            tracing::debug!(id = %record.id, "updated exercise record");
            Ok(Json(record))
        }
        None => Err(ApiError::NotFound),
    }
}

async fn update_by_natural_key_handler(
    State(state): State<Arc<ExerciseState>>,
    payload: Result<Json<NaturalKeyUpdate>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(body) = payload?;

    let matched = state.store.update_by_natural_key(
        &body.date,
        &body.exercise,
        body.muscle_group,
        body.series,
    )?;

    if matched == 0 {
        return Err(ApiError::NotFound);
    }

    tracing::debug!(date = %body.date, exercise = %body.exercise, "updated exercise by natural key");

    Ok(Json(MessageResponse {
        message: "Exercise updated".to_string(),
    }))
}

async fn delete_by_natural_key_handler(
    State(state): State<Arc<ExerciseState>>,
    payload: Result<Json<NaturalKeyDelete>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(body) = payload?;

    let removed = state.store.delete_by_natural_key(&body.date, &body.exercise)?;

    if removed == 0 {
        return Err(ApiError::NotFound);
    }

    tracing::debug!(date = %body.date, exercise = %body.exercise, "deleted exercise by natural key");

    Ok(Json(MessageResponse {
        message: "Exercise deleted".to_string(),
    }))
}

async fn delete_by_id_handler(
    State(state): State<Arc<ExerciseState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    // Idempotent: deleting an unknown id still succeeds
    let removed = state.store.delete_by_id(&id)?;

    tracing::debug!(id = %id, removed, "delete exercise by id");

    Ok(Json(MessageResponse {
        message: "Exercise deleted".to_string(),
    }))
}

async fn delete_all_handler(
    State(state): State<Arc<ExerciseState>>,
) -> ApiResult<Json<MessageResponse>> {
    let removed = state.store.delete_all()?;

    tracing::debug!(removed, "deleted all exercise records");

    Ok(Json(MessageResponse {
        message: format!("Deleted {} exercises", removed),
    }))
}

async fn filter_by_muscle_group_handler(
    State(state): State<Arc<ExerciseState>>,
    Query(query): Query<MuscleGroupQuery>,
) -> ApiResult<Json<Vec<ExerciseRecord>>> {
    // Presence check happens before the store is touched
    let muscle_group = match query.muscle_group.as_deref() {
        Some(value) if !value.is_empty() => value,
        _ => return Err(ApiError::MissingParam("muscleGroup")),
    };

    let records = state.store.find_by_muscle_group(muscle_group)?;
    Ok(Json(records))
}
