//! Patient profile endpoints.
//!
//! A caller only ever sees their own profile. Creation assigns the
//! authenticated account as owner — a payload-supplied owner is ignored
//! — and an account may hold at most one profile.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::{self, Caller};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::patient_profile;
use crate::models::PatientProfile;

#[derive(Serialize)]
pub struct PatientProfilesResponse {
    pub patient_profiles: Vec<PatientProfile>,
}

/// `GET /api/v1/patient-profiles` — the caller's own profile, as a
/// collection of zero or one.
pub async fn list(
    Extension(caller): Extension<Caller>,
) -> Result<Json<PatientProfilesResponse>, ApiError> {
    Ok(Json(PatientProfilesResponse {
        patient_profiles: access::visible_profiles(&caller),
    }))
}

#[derive(Deserialize)]
pub struct CreatePatientProfileRequest {
    /// Ignored — the profile always belongs to the authenticated account.
    pub user_id: Option<Uuid>,
    pub date_of_birth: NaiveDate,
    pub blood_type: String,
    pub allergies: Option<String>,
}

/// `POST /api/v1/patient-profiles` — create the caller's profile.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreatePatientProfileRequest>,
) -> Result<(StatusCode, Json<PatientProfile>), ApiError> {
    let user = match &caller {
        Caller::Anonymous => return Err(ApiError::Unauthorized),
        Caller::Known { user, .. } => user.clone(),
    };
    if caller.patient().is_some() {
        return Err(ApiError::Forbidden("You already have a patient profile".into()));
    }

    let profile = PatientProfile {
        id: Uuid::new_v4(),
        user_id: user.id,
        date_of_birth: req.date_of_birth,
        blood_type: req.blood_type,
        allergies: req.allergies.unwrap_or_default(),
    };
    let conn = ctx.lock_db()?;
    patient_profile::insert_profile(&conn, &profile)?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Fetch a profile the caller may see; anyone else's reads as absent.
fn fetch_visible(
    conn: &rusqlite::Connection,
    caller: &Caller,
    id: Uuid,
) -> Result<PatientProfile, ApiError> {
    let profile = patient_profile::get_profile(conn, id)
        .map_err(|_| ApiError::NotFound("Patient profile not found".into()))?;
    if !access::can_view_profile(caller, &profile) {
        return Err(ApiError::NotFound("Patient profile not found".into()));
    }
    Ok(profile)
}

/// `GET /api/v1/patient-profiles/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientProfile>, ApiError> {
    let conn = ctx.lock_db()?;
    let profile = fetch_visible(&conn, &caller, id)?;
    Ok(Json(profile))
}

#[derive(Deserialize)]
pub struct UpdatePatientProfileRequest {
    pub date_of_birth: Option<NaiveDate>,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
}

/// `PATCH /api/v1/patient-profiles/:id` — the owner edits their details.
/// The owning account is never writable.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePatientProfileRequest>,
) -> Result<Json<PatientProfile>, ApiError> {
    let conn = ctx.lock_db()?;
    let mut profile = fetch_visible(&conn, &caller, id)?;

    if let Some(date_of_birth) = req.date_of_birth {
        profile.date_of_birth = date_of_birth;
    }
    if let Some(blood_type) = req.blood_type {
        profile.blood_type = blood_type;
    }
    if let Some(allergies) = req.allergies {
        profile.allergies = allergies;
    }

    patient_profile::update_profile(&conn, &profile)?;
    Ok(Json(profile))
}
