//! Time slot endpoints — doctor-only.
//!
//! Non-doctor callers list an empty collection; creation and mutation
//! require the doctor role, and a created slot always belongs to the
//! caller's own doctor record regardless of payload.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::{self, Caller};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::time_slot;
use crate::db::DatabaseError;
use crate::models::TimeSlot;

#[derive(Serialize)]
pub struct TimeSlotsResponse {
    pub time_slots: Vec<TimeSlot>,
}

/// `GET /api/v1/time-slots` — the caller's own slots (empty unless the
/// caller is a doctor).
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<TimeSlotsResponse>, ApiError> {
    let conn = ctx.lock_db()?;
    let time_slots = access::visible_time_slots(&conn, &caller)?;
    Ok(Json(TimeSlotsResponse { time_slots }))
}

#[derive(Deserialize)]
pub struct CreateTimeSlotRequest {
    /// Ignored — the slot is always created under the caller's record.
    pub doctor_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_booked: Option<bool>,
}

/// `POST /api/v1/time-slots` — publish a bookable slot.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateTimeSlotRequest>,
) -> Result<(StatusCode, Json<TimeSlot>), ApiError> {
    let owner = access::time_slot_owner(&caller)?;

    if req.start_time >= req.end_time {
        return Err(ApiError::Validation("start_time must be before end_time".into()));
    }

    let slot = TimeSlot {
        id: Uuid::new_v4(),
        doctor_id: owner.id,
        date: req.date,
        start_time: req.start_time,
        end_time: req.end_time,
        is_booked: req.is_booked.unwrap_or(false),
    };
    let conn = ctx.lock_db()?;
    time_slot::insert_slot(&conn, &slot)?;

    Ok((StatusCode::CREATED, Json(slot)))
}

/// Fetch a slot the caller may see; other doctors' slots read as absent.
fn fetch_visible(
    conn: &rusqlite::Connection,
    caller: &Caller,
    id: Uuid,
) -> Result<TimeSlot, ApiError> {
    let slot = match time_slot::get_slot(conn, id) {
        Ok(s) => s,
        Err(DatabaseError::NotFound { .. }) => {
            return Err(ApiError::NotFound("Time slot not found".into()))
        }
        Err(e) => return Err(e.into()),
    };
    if !access::can_view_time_slot(caller, &slot) {
        return Err(ApiError::NotFound("Time slot not found".into()));
    }
    Ok(slot)
}

/// `GET /api/v1/time-slots/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimeSlot>, ApiError> {
    let conn = ctx.lock_db()?;
    let slot = fetch_visible(&conn, &caller, id)?;
    Ok(Json(slot))
}

#[derive(Deserialize)]
pub struct UpdateTimeSlotRequest {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub is_booked: Option<bool>,
}

/// `PATCH /api/v1/time-slots/:id` — move a slot or flip its booked flag.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTimeSlotRequest>,
) -> Result<Json<TimeSlot>, ApiError> {
    let conn = ctx.lock_db()?;
    let mut slot = fetch_visible(&conn, &caller, id)?;

    if let Some(date) = req.date {
        slot.date = date;
    }
    if let Some(start_time) = req.start_time {
        slot.start_time = start_time;
    }
    if let Some(end_time) = req.end_time {
        slot.end_time = end_time;
    }
    if let Some(is_booked) = req.is_booked {
        slot.is_booked = is_booked;
    }
    if slot.start_time >= slot.end_time {
        return Err(ApiError::Validation("start_time must be before end_time".into()));
    }

    time_slot::update_slot(&conn, &slot)?;
    Ok(Json(slot))
}

/// `DELETE /api/v1/time-slots/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.lock_db()?;
    fetch_visible(&conn, &caller, id)?;
    time_slot::delete_slot(&conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}
