use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Availability;

fn row_to_availability(row: &rusqlite::Row<'_>) -> rusqlite::Result<Availability> {
    Ok(Availability {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        doctor_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        day_of_week: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
    })
}

pub fn insert_availability(
    conn: &Connection,
    window: &Availability,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO availability (id, doctor_id, day_of_week, start_time, end_time)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            window.id.to_string(),
            window.doctor_id.to_string(),
            window.day_of_week,
            window.start_time,
            window.end_time,
        ],
    )?;
    Ok(())
}

/// Weekly windows for one doctor, ordered by day then start time.
pub fn list_for_doctor(
    conn: &Connection,
    doctor_id: Uuid,
) -> Result<Vec<Availability>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, day_of_week, start_time, end_time
         FROM availability WHERE doctor_id = ?1
         ORDER BY day_of_week, start_time",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string()], row_to_availability)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::doctor::{insert_doctor, test_support};
    use chrono::NaiveTime;

    fn window(doctor_id: Uuid, day: u8, start: (u32, u32), end: (u32, u32)) -> Availability {
        Availability {
            id: Uuid::new_v4(),
            doctor_id,
            day_of_week: day,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        }
    }

    #[test]
    fn windows_are_scoped_and_ordered() {
        let conn = open_memory_database().unwrap();
        let dr_a = test_support::make_doctor("Dr. A");
        let dr_b = test_support::make_doctor("Dr. B");
        insert_doctor(&conn, &dr_a).unwrap();
        insert_doctor(&conn, &dr_b).unwrap();

        insert_availability(&conn, &window(dr_a.id, 3, (14, 0), (17, 0))).unwrap();
        insert_availability(&conn, &window(dr_a.id, 1, (9, 0), (12, 0))).unwrap();
        insert_availability(&conn, &window(dr_b.id, 1, (8, 0), (11, 0))).unwrap();

        let windows = list_for_doctor(&conn, dr_a.id).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].day_of_week, 1);
        assert_eq!(windows[1].day_of_week, 3);
    }

    #[test]
    fn day_out_of_range_is_rejected_by_schema() {
        let conn = open_memory_database().unwrap();
        let dr = test_support::make_doctor("Dr. C");
        insert_doctor(&conn, &dr).unwrap();

        let err = insert_availability(&conn, &window(dr.id, 8, (9, 0), (12, 0))).unwrap_err();
        assert!(matches!(err, DatabaseError::Sqlite(_)));
    }

    #[test]
    fn deleting_doctor_cascades() {
        let conn = open_memory_database().unwrap();
        let dr = test_support::make_doctor("Dr. D");
        insert_doctor(&conn, &dr).unwrap();
        insert_availability(&conn, &window(dr.id, 5, (9, 0), (12, 0))).unwrap();

        crate::db::repository::doctor::delete_doctor(&conn, dr.id).unwrap();
        assert!(list_for_doctor(&conn, dr.id).unwrap().is_empty());
    }
}
