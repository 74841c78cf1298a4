use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentStatus};

fn row_to_appointment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Appointment> {
    let status: String = row.get(6)?;
    let status = AppointmentStatus::from_str(&status).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Appointment {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        doctor_id: row
            .get::<_, Option<String>>(1)?
            .and_then(|id| Uuid::parse_str(&id).ok()),
        patient_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap_or_default(),
        date_time: row.get::<_, DateTime<Utc>>(3)?,
        duration_minutes: row.get(4)?,
        notes: row.get(5)?,
        status,
    })
}

const APPOINTMENT_COLUMNS: &str =
    "id, doctor_id, patient_id, date_time, duration_minutes, notes, status";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, doctor_id, patient_id, date_time, duration_minutes, notes, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            appt.id.to_string(),
            appt.doctor_id.map(|id| id.to_string()),
            appt.patient_id.to_string(),
            appt.date_time,
            appt.duration_minutes,
            appt.notes,
            appt.status.as_str(),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: Uuid) -> Result<Appointment, DatabaseError> {
    conn.query_row(
        &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
        params![id.to_string()],
        row_to_appointment,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: id.to_string(),
        },
        other => other.into(),
    })
}

pub fn list_for_patient(
    conn: &Connection,
    patient_id: Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE patient_id = ?1 ORDER BY date_time"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], row_to_appointment)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn list_for_doctor(
    conn: &Connection,
    doctor_id: Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE doctor_id = ?1 ORDER BY date_time"
    ))?;
    let rows = stmt.query_map(params![doctor_id.to_string()], row_to_appointment)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Write back the fields a general update may touch. Status and the
/// ownership references have dedicated paths and are never written here.
pub fn update_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET date_time = ?2, duration_minutes = ?3, notes = ?4 WHERE id = ?1",
        params![
            appt.id.to_string(),
            appt.date_time,
            appt.duration_minutes,
            appt.notes,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: appt.id.to_string(),
        });
    }
    Ok(())
}

pub fn set_status(
    conn: &Connection,
    id: Uuid,
    status: AppointmentStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET status = ?2 WHERE id = ?1",
        params![id.to_string(), status.as_str()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_appointment(conn: &Connection, id: Uuid) -> Result<(), DatabaseError> {
    let changed =
        conn.execute("DELETE FROM appointments WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
