//! Room CRUD handlers: list/get, create, update, delete, preflight.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::AppError;
use crate::model::{NewRoom, RoomKey, RoomPatch, Stage, UNIQUE_ID_MAX_LEN};
use crate::service::RoomService;
use crate::state::AppState;

fn key_from_query(params: &HashMap<String, String>) -> Result<Option<RoomKey>, AppError> {
    RoomKey::from_params(
        params.get("id").map(String::as_str),
        params.get("uid").map(String::as_str),
    )
}

fn stages_from_value(value: &Value) -> Result<Vec<Stage>, AppError> {
    if !value.is_array() {
        return Err(AppError::Validation(
            "appliedImagesData must be an array".into(),
        ));
    }
    serde_json::from_value(value.clone()).map_err(|_| {
        AppError::Validation("appliedImagesData must be an array of stages".into())
    })
}

/// GET /api/users — all records, or a single one via `?id=` / `?uid=`
/// (`id` wins when both are present).
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    match key_from_query(&params)? {
        Some(key) => {
            let room = RoomService::find(&state.pool, &key)
                .await?
                .ok_or(AppError::NotFound)?;
            Ok(Json(room).into_response())
        }
        None => {
            let rooms = RoomService::list(&state.pool).await?;
            Ok(Json(rooms).into_response())
        }
    }
}

/// POST /api/users — create from `{name, appliedImagesData, uniqueId?}`.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body.map_err(|_| AppError::InvalidBody)?;

    let name = body
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let stages_value = body.get("appliedImagesData").filter(|v| !v.is_null());
    let (name, stages_value) = match (name.is_empty(), stages_value) {
        (false, Some(v)) => (name, v),
        _ => {
            return Err(AppError::Validation(
                "Missing name or image configurations".into(),
            ))
        }
    };
    let stages = stages_from_value(stages_value)?;

    let unique_id = match body.get("uniqueId") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            if s.len() > UNIQUE_ID_MAX_LEN {
                return Err(AppError::Validation(
                    "uniqueId must be at most 128 characters".into(),
                ));
            }
            Some(s.clone())
        }
        Some(_) => return Err(AppError::Validation("uniqueId must be a string".into())),
    };

    let room = RoomService::create(
        &state.pool,
        &NewRoom {
            unique_id,
            name,
            stages,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(room)).into_response())
}

/// PATCH /api/users?id=N|uid=S — partial update of name/appliedImagesData.
/// A malformed body is treated as an empty object (no-op update).
pub async fn update(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Response, AppError> {
    let key = key_from_query(&params)?.ok_or(AppError::MissingKey)?;
    if RoomService::find(&state.pool, &key).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let body = body
        .map(|Json(v)| v)
        .unwrap_or_else(|| Value::Object(Default::default()));

    let mut patch = RoomPatch::default();
    if let Some(v) = body.get("name").filter(|v| !v.is_null()) {
        let name = v
            .as_str()
            .ok_or_else(|| AppError::Validation("name must be a string".into()))?;
        patch.name = Some(name.to_string());
    }
    if let Some(v) = body.get("appliedImagesData").filter(|v| !v.is_null()) {
        patch.stages = Some(stages_from_value(v)?);
    }

    let room = RoomService::update(&state.pool, &key, &patch)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(room).into_response())
}

/// DELETE /api/users?id=N|uid=S — remove the record permanently.
pub async fn remove(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let key = key_from_query(&params)?.ok_or(AppError::MissingKey)?;
    if !RoomService::delete(&state.pool, &key).await? {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// OPTIONS /api/users — CORS preflight.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
