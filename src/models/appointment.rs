use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AppointmentStatus;

/// `doctor_id` is `None` only for rows imported from the legacy system;
/// the startup backfill replaces those with the sentinel doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub patient_id: Uuid,
    pub date_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
}
