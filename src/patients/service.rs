// Patient service - business logic layer

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::auth::models::Role;
use crate::error::ApiError;
use crate::patients::age::birth_date_window;
use crate::patients::models::{
    Appointment, CreatePatientRequest, Patient, ScheduleAppointmentRequest, UpdatePatientRequest,
};
use crate::patients::repository::{PatientRepository, PATIENT_COLUMNS};
use crate::query::{PatientFilter, PatientQueryBuilder};

#[derive(Debug, Clone)]
pub struct PatientService {
    repo: PatientRepository,
}

impl PatientService {
    pub fn new(repo: PatientRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, request: CreatePatientRequest) -> Result<Patient, ApiError> {
        let patient = self.repo.create(&request).await?;
        info!("Created patient id={}", patient.id);
        Ok(patient)
    }

    /// Fetch a patient with its appointments
    pub async fn get(&self, id: i64) -> Result<Patient, ApiError> {
        let patient = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Patient", id))?;

        let mut patients = [patient];
        self.repo.attach_appointments(&mut patients).await?;
        let [patient] = patients;
        Ok(patient)
    }

    /// List patients matching the filter, ages computed against today's date
    pub async fn list(&self, filter: PatientFilter) -> Result<Vec<Patient>, ApiError> {
        self.list_as_of(filter, Utc::now().date_naive()).await
    }

    pub async fn list_as_of(
        &self,
        filter: PatientFilter,
        today: NaiveDate,
    ) -> Result<Vec<Patient>, ApiError> {
        let mut builder = PatientQueryBuilder::new(PATIENT_COLUMNS);

        if let Some(name) = &filter.name {
            builder.add_name_filter(name);
        }
        if let Some(age) = filter.age {
            let (from, to) = birth_date_window(age, today)
                .ok_or_else(|| ApiError::InvalidArgument(format!("Age out of range: {}", age)))?;
            builder.add_birth_date_range(from, to);
        }

        let mut patients = self.repo.list(&builder).await?;
        self.repo.attach_appointments(&mut patients).await?;

        debug!("Listed {} patients with {:?}", patients.len(), filter);
        Ok(patients)
    }

    /// Partial update; an id that matches nothing is not an error here
    pub async fn update(&self, id: i64, request: UpdatePatientRequest) -> Result<(), ApiError> {
        let affected = self.repo.update(id, &request).await?;
        info!("Updated patient id={} ({} rows)", id, affected);
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        if self.repo.delete(id).await? == 0 {
            return Err(ApiError::not_found("Patient", id));
        }
        info!("Deleted patient id={}", id);
        Ok(())
    }

    /// Both references are mandatory and the staff account must be a doctor;
    /// unknown ids fail the foreign keys
    pub async fn schedule_appointment(
        &self,
        patient_id: i64,
        request: ScheduleAppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        if patient_id <= 0 || request.doctor_id <= 0 {
            return Err(ApiError::InvalidArgument(
                "Appointment requires both patient and doctor".to_string(),
            ));
        }

        if let Some(role) = self.repo.find_staff_role(request.doctor_id).await? {
            if role != Role::Doctor {
                return Err(ApiError::InvalidArgument(format!(
                    "User {} is a {}, not a doctor",
                    request.doctor_id, role
                )));
            }
        }

        let appointment = self
            .repo
            .create_appointment(patient_id, request.doctor_id, request.date)
            .await?;

        info!(
            "Scheduled appointment id={} patient_id={} doctor_id={}",
            appointment.id, patient_id, request.doctor_id
        );
        Ok(appointment)
    }
}
