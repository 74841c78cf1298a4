//! Appointment endpoints.
//!
//! Visibility and ownership assignment follow the role-tagged caller:
//! patients operate on their own appointments, doctors on theirs.
//! Ownership fields in the payload are never trusted; status changes go
//! through the dedicated `/status` path only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::{self, BookingParty, Caller};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::{appointment, doctor, patient_profile};
use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentStatus};

const DEFAULT_DURATION_MINUTES: u32 = 30;

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/v1/appointments` — the caller's visible appointments.
/// Anonymous and role-less callers get an empty collection.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let conn = ctx.lock_db()?;
    let appointments = access::visible_appointments(&conn, &caller)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    /// Read for patient-initiated bookings; ignored when a doctor books.
    pub doctor_id: Option<Uuid>,
    /// Read for doctor-initiated bookings; ignored when a patient books.
    pub patient_id: Option<Uuid>,
    pub date_time: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

/// `POST /api/v1/appointments` — book an appointment.
///
/// The caller's own side is always forced from the session; the other
/// side comes from the payload and must name an existing record.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let party = access::appointment_booking_party(&caller)?;
    let conn = ctx.lock_db()?;

    let (doctor_id, patient_id) = match party {
        BookingParty::AsPatient(profile) => {
            let doctor_id = req
                .doctor_id
                .ok_or(ApiError::Validation("doctor_id is required".into()))?;
            let booked = match doctor::get_doctor(&conn, doctor_id) {
                Ok(d) => d,
                Err(DatabaseError::NotFound { .. }) => {
                    return Err(ApiError::Validation(
                        "doctor_id does not name a known doctor".into(),
                    ))
                }
                Err(e) => return Err(e.into()),
            };
            if !booked.is_active {
                return Err(ApiError::Validation(
                    "this doctor is not currently accepting appointments".into(),
                ));
            }
            (booked.id, profile.id)
        }
        BookingParty::AsDoctor(doctor) => {
            let patient_id = req
                .patient_id
                .ok_or(ApiError::Validation("patient_id is required".into()))?;
            let profile = match patient_profile::get_profile(&conn, patient_id) {
                Ok(p) => p,
                Err(DatabaseError::NotFound { .. }) => {
                    return Err(ApiError::Validation(
                        "patient_id does not name a known patient".into(),
                    ))
                }
                Err(e) => return Err(e.into()),
            };
            (doctor.id, profile.id)
        }
    };

    let duration_minutes = req.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
    if duration_minutes == 0 {
        return Err(ApiError::Validation("duration_minutes must be at least 1".into()));
    }

    let appt = Appointment {
        id: Uuid::new_v4(),
        doctor_id: Some(doctor_id),
        patient_id,
        date_time: req.date_time,
        duration_minutes,
        notes: req.notes,
        status: AppointmentStatus::Booked,
    };
    appointment::insert_appointment(&conn, &appt)?;

    Ok((StatusCode::CREATED, Json(appt)))
}

/// Fetch an appointment the caller may see; anything outside the
/// caller's scope reads as absent.
fn fetch_visible(
    conn: &rusqlite::Connection,
    caller: &Caller,
    id: Uuid,
) -> Result<Appointment, ApiError> {
    let appt = match appointment::get_appointment(conn, id) {
        Ok(a) => a,
        Err(DatabaseError::NotFound { .. }) => {
            return Err(ApiError::NotFound("Appointment not found".into()))
        }
        Err(e) => return Err(e.into()),
    };
    if !access::can_view_appointment(caller, &appt) {
        return Err(ApiError::NotFound("Appointment not found".into()));
    }
    Ok(appt)
}

/// `GET /api/v1/appointments/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.lock_db()?;
    let appt = fetch_visible(&conn, &caller, id)?;
    Ok(Json(appt))
}

#[derive(Deserialize)]
pub struct UpdateAppointmentRequest {
    pub date_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

/// `PATCH /api/v1/appointments/:id` — reschedule or annotate. Status and
/// ownership are not writable here.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.lock_db()?;
    let mut appt = fetch_visible(&conn, &caller, id)?;

    if let Some(date_time) = req.date_time {
        appt.date_time = date_time;
    }
    if let Some(duration_minutes) = req.duration_minutes {
        if duration_minutes == 0 {
            return Err(ApiError::Validation("duration_minutes must be at least 1".into()));
        }
        appt.duration_minutes = duration_minutes;
    }
    if let Some(notes) = req.notes {
        appt.notes = Some(notes);
    }

    appointment::update_appointment(&conn, &appt)?;
    Ok(Json(appt))
}

/// `DELETE /api/v1/appointments/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.lock_db()?;
    fetch_visible(&conn, &caller, id)?;
    appointment::delete_appointment(&conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

/// `POST /api/v1/appointments/:id/status` — the only path that changes
/// an appointment's status.
pub async fn set_status(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.lock_db()?;
    let mut appt = fetch_visible(&conn, &caller, id)?;

    appointment::set_status(&conn, id, req.status)?;
    appt.status = req.status;
    Ok(Json(appt))
}
