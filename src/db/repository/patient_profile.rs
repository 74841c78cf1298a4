use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::PatientProfile;

fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientProfile> {
    Ok(PatientProfile {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        date_of_birth: row.get(2)?,
        blood_type: row.get(3)?,
        allergies: row.get(4)?,
    })
}

const PROFILE_COLUMNS: &str = "id, user_id, date_of_birth, blood_type, allergies";

pub fn insert_profile(conn: &Connection, profile: &PatientProfile) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patient_profiles (id, user_id, date_of_birth, blood_type, allergies)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            profile.id.to_string(),
            profile.user_id.to_string(),
            profile.date_of_birth,
            profile.blood_type,
            profile.allergies,
        ],
    )
    .map_err(|e| {
        if DatabaseError::is_constraint_violation(&e) {
            DatabaseError::ConstraintViolation("user already has a patient profile".into())
        } else {
            e.into()
        }
    })?;
    Ok(())
}

pub fn get_profile(conn: &Connection, id: Uuid) -> Result<PatientProfile, DatabaseError> {
    conn.query_row(
        &format!("SELECT {PROFILE_COLUMNS} FROM patient_profiles WHERE id = ?1"),
        params![id.to_string()],
        row_to_profile,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
            entity_type: "patient profile".into(),
            id: id.to_string(),
        },
        other => other.into(),
    })
}

/// Profile owned by the given account, if any. `user_id` is unique, so
/// this is at most one row.
pub fn find_by_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Option<PatientProfile>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {PROFILE_COLUMNS} FROM patient_profiles WHERE user_id = ?1"),
        params![user_id.to_string()],
        row_to_profile,
    );
    match result {
        Ok(profile) => Ok(Some(profile)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_profile(conn: &Connection, profile: &PatientProfile) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE patient_profiles SET date_of_birth = ?2, blood_type = ?3, allergies = ?4
         WHERE id = ?1",
        params![
            profile.id.to_string(),
            profile.date_of_birth,
            profile.blood_type,
            profile.allergies,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patient profile".into(),
            id: profile.id.to_string(),
        });
    }
    Ok(())
}
