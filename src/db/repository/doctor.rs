use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Doctor;

fn row_to_doctor(row: &rusqlite::Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        user_id: row
            .get::<_, Option<String>>(1)?
            .and_then(|id| Uuid::parse_str(&id).ok()),
        name: row.get(2)?,
        specialization: row.get(3)?,
        is_active: row.get(4)?,
    })
}

const DOCTOR_COLUMNS: &str = "id, user_id, name, specialization, is_active";

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, user_id, name, specialization, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            doctor.id.to_string(),
            doctor.user_id.map(|id| id.to_string()),
            doctor.name,
            doctor.specialization,
            doctor.is_active,
        ],
    )
    .map_err(|e| {
        if DatabaseError::is_constraint_violation(&e) {
            DatabaseError::ConstraintViolation(
                "a doctor record already exists for this user".into(),
            )
        } else {
            e.into()
        }
    })?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, id: Uuid) -> Result<Doctor, DatabaseError> {
    conn.query_row(
        &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1"),
        params![id.to_string()],
        row_to_doctor,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
            entity_type: "doctor".into(),
            id: id.to_string(),
        },
        other => other.into(),
    })
}

/// Doctor record linked to the given login account, if any.
pub fn find_by_user(conn: &Connection, user_id: Uuid) -> Result<Option<Doctor>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE user_id = ?1"),
        params![user_id.to_string()],
        row_to_doctor,
    );
    match result {
        Ok(doctor) => Ok(Some(doctor)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Find a doctor by display name or create one. Used by the sentinel
/// backfill; matches on name alone.
pub fn find_or_create_by_name(
    conn: &Connection,
    name: &str,
    specialization: &str,
) -> Result<Doctor, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE name = ?1 LIMIT 1"),
        params![name],
        row_to_doctor,
    );

    match result {
        Ok(doctor) => Ok(doctor),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            let doctor = Doctor {
                id: Uuid::new_v4(),
                user_id: None,
                name: name.to_string(),
                specialization: specialization.to_string(),
                is_active: true,
            };
            insert_doctor(conn, &doctor)?;
            Ok(doctor)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY name"))?;
    let rows = stmt.query_map([], row_to_doctor)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Write back the mutable fields of an existing doctor row.
pub fn update_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctors SET name = ?2, specialization = ?3, is_active = ?4 WHERE id = ?1",
        params![
            doctor.id.to_string(),
            doctor.name,
            doctor.specialization,
            doctor.is_active,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "doctor".into(),
            id: doctor.id.to_string(),
        });
    }
    Ok(())
}

/// Delete a doctor. Availability, time slots, and appointments cascade.
pub fn delete_doctor(conn: &Connection, id: Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM doctors WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "doctor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::make_doctor as test_doctor;
    use super::*;
    use crate::db::open_memory_database;

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_memory_database().unwrap();
        let d = test_doctor("Dr. Chen");
        insert_doctor(&conn, &d).unwrap();
        let fetched = get_doctor(&conn, d.id).unwrap();
        assert_eq!(fetched.name, "Dr. Chen");
        assert!(fetched.is_active);
        assert!(fetched.user_id.is_none());
    }

    #[test]
    fn list_is_ordered_by_name() {
        let conn = open_memory_database().unwrap();
        insert_doctor(&conn, &test_doctor("Zhao")).unwrap();
        insert_doctor(&conn, &test_doctor("Abara")).unwrap();
        insert_doctor(&conn, &test_doctor("Meier")).unwrap();

        let names: Vec<String> =
            list_doctors(&conn).unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Abara", "Meier", "Zhao"]);
    }

    #[test]
    fn find_or_create_reuses_existing() {
        let conn = open_memory_database().unwrap();
        let first = find_or_create_by_name(&conn, "Dr. House", "Diagnostics").unwrap();
        let second = find_or_create_by_name(&conn, "Dr. House", "Diagnostics").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(list_doctors(&conn).unwrap().len(), 1);
    }

    #[test]
    fn update_writes_mutable_fields() {
        let conn = open_memory_database().unwrap();
        let mut d = test_doctor("Dr. Osei");
        insert_doctor(&conn, &d).unwrap();

        d.specialization = "Neurology".into();
        d.is_active = false;
        update_doctor(&conn, &d).unwrap();

        let fetched = get_doctor(&conn, d.id).unwrap();
        assert_eq!(fetched.specialization, "Neurology");
        assert!(!fetched.is_active);
    }

    #[test]
    fn delete_missing_doctor_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = delete_doctor(&conn, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn one_doctor_record_per_user() {
        let conn = open_memory_database().unwrap();
        let user = crate::models::User {
            id: Uuid::new_v4(),
            username: "drlogin".into(),
            display_name: String::new(),
        };
        crate::db::repository::user::insert_user(&conn, &user, None).unwrap();

        let mut first = test_doctor("Dr. One");
        first.user_id = Some(user.id);
        insert_doctor(&conn, &first).unwrap();

        let mut second = test_doctor("Dr. Two");
        second.user_id = Some(user.id);
        let err = insert_doctor(&conn, &second).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }
}
