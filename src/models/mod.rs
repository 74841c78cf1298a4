pub mod appointment;
pub mod availability;
pub mod doctor;
pub mod enums;
pub mod patient;
pub mod specialty;
pub mod time_slot;
pub mod user;

pub use appointment::Appointment;
pub use availability::Availability;
pub use doctor::Doctor;
pub use enums::AppointmentStatus;
pub use patient::PatientProfile;
pub use specialty::Specialty;
pub use time_slot::TimeSlot;
pub use user::User;
