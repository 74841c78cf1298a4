//! Role resolution and record scoping.
//!
//! Every request resolves its caller once into a role-tagged identity:
//! anonymous, or a known account tagged as patient, doctor, or neither.
//! All visibility and creation rules derive from that tag:
//! - appointments: patients see their own, doctors see theirs, everyone
//!   else sees nothing
//! - time slots: doctor-only, scoped to the owning doctor
//! - patient profiles: each account sees only its own
//!
//! Ownership fields are never taken from the client payload — they are
//! re-derived here from the authenticated identity. Patient takes
//! precedence if an account somehow holds both roles.

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::{appointment, doctor, patient_profile, time_slot};
use crate::db::DatabaseError;
use crate::models::{Appointment, Doctor, PatientProfile, TimeSlot, User};

// ═══════════════════════════════════════════════════════════
// Role-tagged identity
// ═══════════════════════════════════════════════════════════

/// The role a known account carries for the current request.
#[derive(Debug, Clone)]
pub enum Role {
    Patient(PatientProfile),
    Doctor(Doctor),
    None,
}

/// Caller identity, resolved once per request by the identity middleware.
#[derive(Debug, Clone)]
pub enum Caller {
    Anonymous,
    Known { user: User, role: Role },
}

impl Caller {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Caller::Anonymous)
    }

    pub fn patient(&self) -> Option<&PatientProfile> {
        match self {
            Caller::Known { role: Role::Patient(profile), .. } => Some(profile),
            _ => None,
        }
    }

    pub fn doctor(&self) -> Option<&Doctor> {
        match self {
            Caller::Known { role: Role::Doctor(doctor), .. } => Some(doctor),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Caller::Known { user, .. } => Some(user),
            Caller::Anonymous => None,
        }
    }
}

/// Resolve the role for an account: patient profile first, then doctor
/// record. The patient check winning the tie is load-bearing — accounts
/// holding both roles act as patients.
pub fn resolve_role(conn: &Connection, user_id: Uuid) -> Result<Role, DatabaseError> {
    if let Some(profile) = patient_profile::find_by_user(conn, user_id)? {
        return Ok(Role::Patient(profile));
    }
    if let Some(doctor) = doctor::find_by_user(conn, user_id)? {
        return Ok(Role::Doctor(doctor));
    }
    Ok(Role::None)
}

// ═══════════════════════════════════════════════════════════
// Denial reasons
// ═══════════════════════════════════════════════════════════

/// Why a creation was refused. The API layer maps these onto HTTP 401/403.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("authentication required")]
    Unauthenticated,
    /// Authenticated but holding neither a patient profile nor a doctor
    /// record. The response names both profile-creation URLs.
    #[error("caller has no patient or doctor profile")]
    MissingRole,
    #[error("only doctors may perform this operation")]
    DoctorOnly,
}

// ═══════════════════════════════════════════════════════════
// Appointments
// ═══════════════════════════════════════════════════════════

/// The appointments the caller is allowed to see. Anonymous callers and
/// role-less accounts get an empty collection, not an error.
pub fn visible_appointments(
    conn: &Connection,
    caller: &Caller,
) -> Result<Vec<Appointment>, DatabaseError> {
    if let Some(profile) = caller.patient() {
        return appointment::list_for_patient(conn, profile.id);
    }
    if let Some(doctor) = caller.doctor() {
        return appointment::list_for_doctor(conn, doctor.id);
    }
    Ok(Vec::new())
}

pub fn can_view_appointment(caller: &Caller, appt: &Appointment) -> bool {
    if let Some(profile) = caller.patient() {
        return appt.patient_id == profile.id;
    }
    if let Some(doctor) = caller.doctor() {
        return appt.doctor_id == Some(doctor.id);
    }
    false
}

/// Which side of a new appointment the caller fills in.
#[derive(Debug, Clone)]
pub enum BookingParty {
    /// Caller is a patient: patient reference forced to their profile,
    /// doctor reference comes from the payload.
    AsPatient(PatientProfile),
    /// Caller is a doctor: doctor reference forced to their record,
    /// patient reference comes from the payload.
    AsDoctor(Doctor),
}

/// Decide who the caller books as. Anonymous callers are refused
/// outright; authenticated callers without a role get a denial the API
/// layer turns into a self-remediation payload.
pub fn appointment_booking_party(caller: &Caller) -> Result<BookingParty, AccessDenied> {
    match caller {
        Caller::Anonymous => Err(AccessDenied::Unauthenticated),
        Caller::Known { role: Role::Patient(profile), .. } => {
            Ok(BookingParty::AsPatient(profile.clone()))
        }
        Caller::Known { role: Role::Doctor(doctor), .. } => {
            Ok(BookingParty::AsDoctor(doctor.clone()))
        }
        Caller::Known { role: Role::None, .. } => Err(AccessDenied::MissingRole),
    }
}

// ═══════════════════════════════════════════════════════════
// Time slots
// ═══════════════════════════════════════════════════════════

/// Doctors see their own slots; everyone else sees an empty collection.
pub fn visible_time_slots(
    conn: &Connection,
    caller: &Caller,
) -> Result<Vec<TimeSlot>, DatabaseError> {
    match caller.doctor() {
        Some(doctor) => time_slot::list_for_doctor(conn, doctor.id),
        None => Ok(Vec::new()),
    }
}

pub fn can_view_time_slot(caller: &Caller, slot: &TimeSlot) -> bool {
    caller.doctor().map(|d| d.id == slot.doctor_id).unwrap_or(false)
}

/// Only doctor-role callers may create slots; the slot is always created
/// under the caller's own doctor record.
pub fn time_slot_owner(caller: &Caller) -> Result<Doctor, AccessDenied> {
    match caller {
        Caller::Anonymous => Err(AccessDenied::Unauthenticated),
        Caller::Known { role: Role::Doctor(doctor), .. } => Ok(doctor.clone()),
        Caller::Known { .. } => Err(AccessDenied::DoctorOnly),
    }
}

// ═══════════════════════════════════════════════════════════
// Patient profiles
// ═══════════════════════════════════════════════════════════

pub fn visible_profiles(caller: &Caller) -> Vec<PatientProfile> {
    caller.patient().cloned().into_iter().collect()
}

pub fn can_view_profile(caller: &Caller, profile: &PatientProfile) -> bool {
    caller.patient().map(|p| p.id == profile.id).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::doctor::{insert_doctor, test_support};
    use crate::db::repository::{appointment as appt_repo, patient_profile, user};
    use crate::models::{AppointmentStatus, User};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn seed_user(conn: &Connection, username: &str) -> User {
        let u = User {
            id: Uuid::new_v4(),
            username: username.into(),
            display_name: String::new(),
        };
        user::insert_user(conn, &u, None).unwrap();
        u
    }

    fn seed_profile(conn: &Connection, user_id: Uuid) -> PatientProfile {
        let p = PatientProfile {
            id: Uuid::new_v4(),
            user_id,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            blood_type: "B+".into(),
            allergies: String::new(),
        };
        patient_profile::insert_profile(conn, &p).unwrap();
        p
    }

    fn known(user: User, role: Role) -> Caller {
        Caller::Known { user, role }
    }

    fn seed_appointment(conn: &Connection, doctor_id: Uuid, patient_id: Uuid) -> Uuid {
        let a = Appointment {
            id: Uuid::new_v4(),
            doctor_id: Some(doctor_id),
            patient_id,
            date_time: Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap(),
            duration_minutes: 30,
            notes: None,
            status: AppointmentStatus::Booked,
        };
        appt_repo::insert_appointment(conn, &a).unwrap();
        a.id
    }

    #[test]
    fn patient_role_wins_over_doctor() {
        let conn = open_memory_database().unwrap();
        let u = seed_user(&conn, "both");
        let profile = seed_profile(&conn, u.id);
        let mut dr = test_support::make_doctor("Dr. Both");
        dr.user_id = Some(u.id);
        insert_doctor(&conn, &dr).unwrap();

        match resolve_role(&conn, u.id).unwrap() {
            Role::Patient(p) => assert_eq!(p.id, profile.id),
            other => panic!("expected patient role, got {other:?}"),
        }
    }

    #[test]
    fn role_is_none_without_records() {
        let conn = open_memory_database().unwrap();
        let u = seed_user(&conn, "plain");
        assert!(matches!(resolve_role(&conn, u.id).unwrap(), Role::None));
    }

    #[test]
    fn anonymous_sees_no_appointments() {
        let conn = open_memory_database().unwrap();
        let dr = test_support::make_doctor("Dr. O");
        insert_doctor(&conn, &dr).unwrap();
        let u = seed_user(&conn, "alice");
        let p = seed_profile(&conn, u.id);
        seed_appointment(&conn, dr.id, p.id);

        assert!(visible_appointments(&conn, &Caller::Anonymous).unwrap().is_empty());
    }

    #[test]
    fn patient_sees_exactly_their_appointments() {
        let conn = open_memory_database().unwrap();
        let dr = test_support::make_doctor("Dr. P");
        insert_doctor(&conn, &dr).unwrap();
        let alice = seed_user(&conn, "alice");
        let p7 = seed_profile(&conn, alice.id);
        let other = seed_user(&conn, "other");
        let p9 = seed_profile(&conn, other.id);

        let a1 = seed_appointment(&conn, dr.id, p7.id);
        let _a2 = seed_appointment(&conn, dr.id, p9.id);
        let a3 = seed_appointment(&conn, dr.id, p7.id);

        let caller = known(alice, Role::Patient(p7));
        let visible: Vec<Uuid> = visible_appointments(&conn, &caller)
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(visible.len(), 2);
        assert!(visible.contains(&a1));
        assert!(visible.contains(&a3));
    }

    #[test]
    fn role_less_account_sees_nothing() {
        let conn = open_memory_database().unwrap();
        let dr = test_support::make_doctor("Dr. Q");
        insert_doctor(&conn, &dr).unwrap();
        let u = seed_user(&conn, "norole");
        let patient_user = seed_user(&conn, "patient");
        let p = seed_profile(&conn, patient_user.id);
        seed_appointment(&conn, dr.id, p.id);

        let caller = known(u, Role::None);
        assert!(visible_appointments(&conn, &caller).unwrap().is_empty());
    }

    #[test]
    fn booking_party_cascade() {
        let conn = open_memory_database().unwrap();
        let u = seed_user(&conn, "alice");
        let p = seed_profile(&conn, u.id);

        assert_eq!(
            appointment_booking_party(&Caller::Anonymous).unwrap_err(),
            AccessDenied::Unauthenticated
        );

        let patient = known(u, Role::Patient(p.clone()));
        assert!(matches!(
            appointment_booking_party(&patient).unwrap(),
            BookingParty::AsPatient(profile) if profile.id == p.id
        ));

        let dr = test_support::make_doctor("Dr. R");
        let doc_user = seed_user(&conn, "doc");
        let doctor = known(doc_user, Role::Doctor(dr.clone()));
        assert!(matches!(
            appointment_booking_party(&doctor).unwrap(),
            BookingParty::AsDoctor(d) if d.id == dr.id
        ));

        let norole_user = seed_user(&conn, "norole");
        let norole = known(norole_user, Role::None);
        assert_eq!(
            appointment_booking_party(&norole).unwrap_err(),
            AccessDenied::MissingRole
        );
    }

    #[test]
    fn time_slot_owner_is_doctor_only() {
        let conn = open_memory_database().unwrap();
        let u = seed_user(&conn, "alice");
        let p = seed_profile(&conn, u.id);

        assert_eq!(
            time_slot_owner(&Caller::Anonymous).unwrap_err(),
            AccessDenied::Unauthenticated
        );
        assert_eq!(
            time_slot_owner(&known(u, Role::Patient(p))).unwrap_err(),
            AccessDenied::DoctorOnly
        );

        let dr = test_support::make_doctor("Dr. S");
        let doc_user = seed_user(&conn, "doc");
        let owner = time_slot_owner(&known(doc_user, Role::Doctor(dr.clone()))).unwrap();
        assert_eq!(owner.id, dr.id);
    }

    #[test]
    fn profile_visibility_is_own_only() {
        let conn = open_memory_database().unwrap();
        let alice = seed_user(&conn, "alice");
        let pa = seed_profile(&conn, alice.id);
        let bob = seed_user(&conn, "bob");
        let pb = seed_profile(&conn, bob.id);

        let caller = known(alice, Role::Patient(pa.clone()));
        let visible = visible_profiles(&caller);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, pa.id);
        assert!(can_view_profile(&caller, &pa));
        assert!(!can_view_profile(&caller, &pb));
        assert!(visible_profiles(&Caller::Anonymous).is_empty());
    }

    #[test]
    fn appointment_view_check_matches_scope() {
        let conn = open_memory_database().unwrap();
        let dr = test_support::make_doctor("Dr. T");
        insert_doctor(&conn, &dr).unwrap();
        let alice = seed_user(&conn, "alice");
        let p = seed_profile(&conn, alice.id);
        let id = seed_appointment(&conn, dr.id, p.id);
        let appt = appt_repo::get_appointment(&conn, id).unwrap();

        let patient = known(alice, Role::Patient(p));
        assert!(can_view_appointment(&patient, &appt));

        let doc_user = seed_user(&conn, "doc");
        let doctor = known(doc_user, Role::Doctor(dr));
        assert!(can_view_appointment(&doctor, &appt));

        assert!(!can_view_appointment(&Caller::Anonymous, &appt));
    }
}
