pub mod appointment;
pub mod availability;
pub mod doctor;
pub mod patient_profile;
pub mod specialty;
pub mod time_slot;
pub mod user;
