use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::TimeSlot;

fn row_to_slot(row: &rusqlite::Row<'_>) -> rusqlite::Result<TimeSlot> {
    Ok(TimeSlot {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        doctor_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        date: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        is_booked: row.get(5)?,
    })
}

const SLOT_COLUMNS: &str = "id, doctor_id, date, start_time, end_time, is_booked";

/// Insert a slot. `(doctor_id, date, start_time)` uniqueness is enforced
/// by the storage layer, not here.
pub fn insert_slot(conn: &Connection, slot: &TimeSlot) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO time_slots (id, doctor_id, date, start_time, end_time, is_booked)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            slot.id.to_string(),
            slot.doctor_id.to_string(),
            slot.date,
            slot.start_time,
            slot.end_time,
            slot.is_booked,
        ],
    )
    .map_err(|e| {
        if DatabaseError::is_constraint_violation(&e) {
            DatabaseError::ConstraintViolation(
                "a time slot already exists for this doctor, date, and start time".into(),
            )
        } else {
            e.into()
        }
    })?;
    Ok(())
}

pub fn get_slot(conn: &Connection, id: Uuid) -> Result<TimeSlot, DatabaseError> {
    conn.query_row(
        &format!("SELECT {SLOT_COLUMNS} FROM time_slots WHERE id = ?1"),
        params![id.to_string()],
        row_to_slot,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
            entity_type: "time slot".into(),
            id: id.to_string(),
        },
        other => other.into(),
    })
}

pub fn list_for_doctor(conn: &Connection, doctor_id: Uuid) -> Result<Vec<TimeSlot>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SLOT_COLUMNS} FROM time_slots WHERE doctor_id = ?1 ORDER BY date, start_time"
    ))?;
    let rows = stmt.query_map(params![doctor_id.to_string()], row_to_slot)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_slot(conn: &Connection, slot: &TimeSlot) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE time_slots SET date = ?2, start_time = ?3, end_time = ?4, is_booked = ?5
             WHERE id = ?1",
            params![
                slot.id.to_string(),
                slot.date,
                slot.start_time,
                slot.end_time,
                slot.is_booked,
            ],
        )
        .map_err(|e| {
            if DatabaseError::is_constraint_violation(&e) {
                DatabaseError::ConstraintViolation(
                    "a time slot already exists for this doctor, date, and start time".into(),
                )
            } else {
                DatabaseError::from(e)
            }
        })?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "time slot".into(),
            id: slot.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_slot(conn: &Connection, id: Uuid) -> Result<(), DatabaseError> {
    let changed =
        conn.execute("DELETE FROM time_slots WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "time slot".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
