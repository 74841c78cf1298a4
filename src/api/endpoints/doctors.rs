//! Doctor directory endpoints.
//!
//! The doctor collection itself carries no role restrictions; the
//! availability sub-resource is writable only by the owning doctor.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Caller;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::{availability, doctor, user};
use crate::db::DatabaseError;
use crate::models::{Availability, Doctor};

#[derive(Serialize)]
pub struct DoctorsResponse {
    pub doctors: Vec<Doctor>,
}

/// `GET /api/v1/doctors` — list doctors, ordered by name.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<DoctorsResponse>, ApiError> {
    let conn = ctx.lock_db()?;
    let doctors = doctor::list_doctors(&conn)?;
    Ok(Json(DoctorsResponse { doctors }))
}

#[derive(Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialization: String,
    pub is_active: Option<bool>,
    /// Optional login account to link; must name an existing user.
    pub user_id: Option<Uuid>,
}

/// `POST /api/v1/doctors` — register a doctor.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(req): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Doctor>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }

    let conn = ctx.lock_db()?;
    if let Some(user_id) = req.user_id {
        match user::get_user(&conn, user_id) {
            Ok(_) => {}
            Err(DatabaseError::NotFound { .. }) => {
                return Err(ApiError::Validation(
                    "user_id does not name a known account".into(),
                ))
            }
            Err(e) => return Err(e.into()),
        }
    }

    let record = Doctor {
        id: Uuid::new_v4(),
        user_id: req.user_id,
        name: req.name.trim().to_string(),
        specialization: req.specialization,
        is_active: req.is_active.unwrap_or(true),
    };
    doctor::insert_doctor(&conn, &record)?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/v1/doctors/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Doctor>, ApiError> {
    let conn = ctx.lock_db()?;
    let record = doctor::get_doctor(&conn, id)?;
    Ok(Json(record))
}

#[derive(Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub is_active: Option<bool>,
}

/// `PATCH /api/v1/doctors/:id` — absent fields are left unchanged.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDoctorRequest>,
) -> Result<Json<Doctor>, ApiError> {
    let conn = ctx.lock_db()?;
    let mut record = doctor::get_doctor(&conn, id)?;

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".into()));
        }
        record.name = name.trim().to_string();
    }
    if let Some(specialization) = req.specialization {
        record.specialization = specialization;
    }
    if let Some(is_active) = req.is_active {
        record.is_active = is_active;
    }

    doctor::update_doctor(&conn, &record)?;
    Ok(Json(record))
}

/// `DELETE /api/v1/doctors/:id` — cascades to availability, time slots,
/// and appointments.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.lock_db()?;
    doctor::delete_doctor(&conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ═══════════════════════════════════════════════════════════
// Availability sub-resource
// ═══════════════════════════════════════════════════════════

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub availability: Vec<Availability>,
}

/// `GET /api/v1/doctors/:id/availability` — weekly windows for one doctor.
pub async fn availability_list(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let conn = ctx.lock_db()?;
    doctor::get_doctor(&conn, id)?;
    let windows = availability::list_for_doctor(&conn, id)?;
    Ok(Json(AvailabilityResponse { availability: windows }))
}

#[derive(Deserialize)]
pub struct CreateAvailabilityRequest {
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// `POST /api/v1/doctors/:id/availability` — publish a weekly window.
/// Only the owning doctor may do this.
pub async fn availability_create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateAvailabilityRequest>,
) -> Result<(StatusCode, Json<Availability>), ApiError> {
    if caller.is_anonymous() {
        return Err(ApiError::Unauthorized);
    }
    match caller.doctor() {
        Some(doctor) if doctor.id == id => {}
        _ => {
            return Err(ApiError::Forbidden(
                "Only the owning doctor may publish availability".into(),
            ))
        }
    }

    if !(1..=7).contains(&req.day_of_week) {
        return Err(ApiError::Validation("day_of_week must be between 1 and 7".into()));
    }
    if req.start_time >= req.end_time {
        return Err(ApiError::Validation("start_time must be before end_time".into()));
    }

    let window = Availability {
        id: Uuid::new_v4(),
        doctor_id: id,
        day_of_week: req.day_of_week,
        start_time: req.start_time,
        end_time: req.end_time,
    };
    let conn = ctx.lock_db()?;
    availability::insert_availability(&conn, &window)?;

    Ok((StatusCode::CREATED, Json(window)))
}
