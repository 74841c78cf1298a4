//! Specialty directory endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::specialty;
use crate::models::Specialty;

#[derive(Serialize)]
pub struct SpecialtiesResponse {
    pub specialties: Vec<Specialty>,
}

/// `GET /api/v1/specialties` — list specialties, ordered by name.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<SpecialtiesResponse>, ApiError> {
    let conn = ctx.lock_db()?;
    let specialties = specialty::list_specialties(&conn)?;
    Ok(Json(SpecialtiesResponse { specialties }))
}

#[derive(Deserialize)]
pub struct CreateSpecialtyRequest {
    pub name: String,
}

/// `POST /api/v1/specialties` — register a specialty name.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(req): Json<CreateSpecialtyRequest>,
) -> Result<(StatusCode, Json<Specialty>), ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }

    let record = Specialty { id: Uuid::new_v4(), name: name.to_string() };
    let conn = ctx.lock_db()?;
    specialty::insert_specialty(&conn, &record)?;

    Ok((StatusCode::CREATED, Json(record)))
}
