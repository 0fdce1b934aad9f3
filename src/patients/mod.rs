// Patient records, age filtering and appointment scheduling

pub mod age;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::{Appointment, BloodType, Patient, Sex};
pub use repository::PatientRepository;
pub use service::PatientService;
