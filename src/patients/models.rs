// Patient and appointment data models and DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{
    validate_national_id, validate_not_blank, validate_optional_email, validate_optional_national_id,
    validate_optional_not_blank,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Sex {
    Male,
    // legacy clients send the misspelled form
    #[serde(alias = "famale")]
    Female,
}

/// ABO/Rh blood group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum BloodType {
    #[serde(rename = "A+")]
    #[sqlx(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    #[sqlx(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    #[sqlx(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    #[sqlx(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    #[sqlx(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    #[sqlx(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    #[sqlx(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    #[sqlx(rename = "O-")]
    ONegative,
}

/// Scheduled visit of a patient with a staff member
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[schema(example = 1)]
    pub id: i64,
    #[serde(rename = "pacientId")]
    #[schema(example = 1)]
    pub patient_id: i64,
    #[schema(example = 2)]
    pub doctor_id: i64,
    pub date: DateTime<Utc>,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Patient database model
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Jane Smith")]
    pub name: String,
    #[schema(value_type = String, format = Date, example = "1994-06-15")]
    pub birth_date: NaiveDate,
    #[schema(example = "123.456.789-09")]
    pub cpf: String,
    pub sex: Sex,
    #[schema(example = "+55 91 99999-0000")]
    pub phone_number: String,
    #[schema(example = "Rua A, 100")]
    pub address: String,
    pub email: Option<String>,
    pub blood_type: Option<BloodType>,
    pub allergies: Option<String>,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub appointments: Vec<Appointment>,
}

/// Create patient request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Jane Smith")]
    pub name: String,
    #[serde(deserialize_with = "birth_date::deserialize")]
    #[schema(value_type = String, format = Date, example = "1994-06-15")]
    pub birth_date: NaiveDate,
    #[validate(custom = "validate_national_id")]
    #[schema(example = "123.456.789-09")]
    pub cpf: String,
    pub sex: Sex,
    #[validate(custom = "validate_not_blank")]
    pub phone_number: String,
    #[validate(custom = "validate_not_blank")]
    pub address: String,
    #[validate(email)]
    pub email: Option<String>,
    pub blood_type: Option<BloodType>,
    pub allergies: Option<String>,
}

/// Partial update DTO
///
/// Absent fields and empty strings leave the stored value unchanged.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    #[validate(custom = "validate_optional_not_blank")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "birth_date::deserialize_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Option<NaiveDate>,
    #[validate(custom = "validate_optional_national_id")]
    pub cpf: Option<String>,
    pub sex: Option<Sex>,
    #[validate(custom = "validate_optional_not_blank")]
    pub phone_number: Option<String>,
    #[validate(custom = "validate_optional_not_blank")]
    pub address: Option<String>,
    #[validate(custom = "validate_optional_email")]
    pub email: Option<String>,
    pub blood_type: Option<BloodType>,
    pub allergies: Option<String>,
}

/// Schedule appointment request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAppointmentRequest {
    #[validate(range(min = 1, message = "doctorId must be a positive id"))]
    #[schema(example = 2)]
    pub doctor_id: i64,
    #[schema(example = "2024-07-01T14:30:00Z")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientEnvelope {
    pub pacient: Patient,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientListEnvelope {
    pub pacients: Vec<Patient>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentEnvelope {
    pub appointment: Appointment,
}

/// Birth dates accept `YYYY-MM-DD` or a full RFC 3339 timestamp (date part kept)
mod birth_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de::Error, Deserialize, Deserializer};

    fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid birth date '{}'", raw)))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid birth date '{}'", raw))),
        }
    }
}
