// Database repository for patients and their appointments

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::auth::models::Role;
use crate::error::{is_unique_violation, ApiError};
use crate::patients::models::{Appointment, CreatePatientRequest, Patient, UpdatePatientRequest};
use crate::query::PatientQueryBuilder;

pub(crate) const PATIENT_COLUMNS: &str = "id, name, birth_date, cpf, sex, phone_number, address, \
     email, blood_type, allergies, created_at, updated_at";

pub(crate) const APPOINTMENT_COLUMNS: &str = "id, patient_id, doctor_id, date, created_at";

/// Patient repository for database operations
#[derive(Debug, Clone)]
pub struct PatientRepository {
    pool: SqlitePool,
}

impl PatientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_write_error(error: sqlx::Error, cpf: Option<&str>) -> ApiError {
        match cpf {
            Some(cpf) if is_unique_violation(&error) => ApiError::Duplicate {
                field: "cpf".to_string(),
                value: cpf.to_string(),
            },
            _ => ApiError::PersistenceError(error),
        }
    }

    pub async fn create(&self, request: &CreatePatientRequest) -> Result<Patient, ApiError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO patients (name, birth_date, cpf, sex, phone_number, address, email, \
             blood_type, allergies, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            PATIENT_COLUMNS
        );

        sqlx::query_as::<_, Patient>(&sql)
            .bind(&request.name)
            .bind(request.birth_date)
            .bind(&request.cpf)
            .bind(request.sex)
            .bind(&request.phone_number)
            .bind(&request.address)
            .bind(&request.email)
            .bind(request.blood_type)
            .bind(&request.allergies)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(e, Some(&request.cpf)))
    }

    /// Find a patient by ID (without appointments)
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Patient>, ApiError> {
        let sql = format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS);
        let patient = sqlx::query_as::<_, Patient>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(patient)
    }

    /// Run a query produced by `PatientQueryBuilder`
    pub async fn list(&self, builder: &PatientQueryBuilder) -> Result<Vec<Patient>, ApiError> {
        let (sql, params) = builder.build();

        let mut query = sqlx::query_as::<_, Patient>(&sql);
        for param in params {
            query = query.bind(param);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Overwrite only the provided, non-empty fields
    /// Returns the number of rows affected (0 when the id does not exist)
    pub async fn update(&self, id: i64, request: &UpdatePatientRequest) -> Result<u64, ApiError> {
        let result = sqlx::query(
            "UPDATE patients SET \
                 name = COALESCE(NULLIF(?, ''), name), \
                 birth_date = COALESCE(?, birth_date), \
                 cpf = COALESCE(NULLIF(?, ''), cpf), \
                 sex = COALESCE(?, sex), \
                 phone_number = COALESCE(NULLIF(?, ''), phone_number), \
                 address = COALESCE(NULLIF(?, ''), address), \
                 email = COALESCE(NULLIF(?, ''), email), \
                 blood_type = COALESCE(?, blood_type), \
                 allergies = COALESCE(NULLIF(?, ''), allergies), \
                 updated_at = ? \
             WHERE id = ?",
        )
        .bind(&request.name)
        .bind(request.birth_date)
        .bind(&request.cpf)
        .bind(request.sex)
        .bind(&request.phone_number)
        .bind(&request.address)
        .bind(&request.email)
        .bind(request.blood_type)
        .bind(&request.allergies)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, request.cpf.as_deref()))?;

        Ok(result.rows_affected())
    }

    /// Delete a patient; appointments go with it through the FK cascade
    pub async fn delete(&self, id: i64) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Role of the staff account an appointment would reference
    pub async fn find_staff_role(&self, user_id: i64) -> Result<Option<Role>, ApiError> {
        let role = sqlx::query_scalar::<_, Role>("SELECT role FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    pub async fn create_appointment(
        &self,
        patient_id: i64,
        doctor_id: i64,
        date: DateTime<Utc>,
    ) -> Result<Appointment, ApiError> {
        let sql = format!(
            "INSERT INTO appointments (patient_id, doctor_id, date, created_at) \
             VALUES (?, ?, ?, ?) RETURNING {}",
            APPOINTMENT_COLUMNS
        );

        let appointment = sqlx::query_as::<_, Appointment>(&sql)
            .bind(patient_id)
            .bind(doctor_id)
            .bind(date)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(appointment)
    }

    pub async fn find_appointment(&self, id: i64) -> Result<Option<Appointment>, ApiError> {
        let sql = format!("SELECT {} FROM appointments WHERE id = ?", APPOINTMENT_COLUMNS);
        let appointment = sqlx::query_as::<_, Appointment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(appointment)
    }

    /// Load appointments of every given patient
    pub async fn attach_appointments(&self, patients: &mut [Patient]) -> Result<(), ApiError> {
        let ids: Vec<i64> = patients.iter().map(|patient| patient.id).collect();
        let appointments = appointments_where_in(&self.pool, "patient_id", &ids).await?;

        let mut by_patient: HashMap<i64, Vec<Appointment>> = HashMap::new();
        for appointment in appointments {
            by_patient.entry(appointment.patient_id).or_default().push(appointment);
        }
        for patient in patients.iter_mut() {
            patient.appointments = by_patient.remove(&patient.id).unwrap_or_default();
        }

        Ok(())
    }
}

/// Ids bound per `IN (...)` query; SQLite caps host parameters per statement
const ID_BATCH_SIZE: usize = 500;

/// Appointments whose `column` (`patient_id` or `doctor_id`) is one of `ids`,
/// ordered by id within each batch
pub(crate) async fn appointments_where_in(
    pool: &SqlitePool,
    column: &str,
    ids: &[i64],
) -> Result<Vec<Appointment>, ApiError> {
    let mut appointments = Vec::new();

    for batch in ids.chunks(ID_BATCH_SIZE) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM appointments WHERE {} IN (",
            APPOINTMENT_COLUMNS, column
        ));
        let mut separated = builder.separated(", ");
        for id in batch {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        appointments.extend(
            builder
                .build_query_as::<Appointment>()
                .fetch_all(pool)
                .await?,
        );
    }

    Ok(appointments)
}
