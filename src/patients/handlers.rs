// HTTP handlers for patient endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::error::{ApiError, ErrorResponse};
use crate::extractors::{EntityId, ValidatedJson};
use crate::patients::models::{
    AppointmentEnvelope, CreatePatientRequest, PatientEnvelope, PatientListEnvelope,
    ScheduleAppointmentRequest, UpdatePatientRequest,
};
use crate::query::{PatientListParams, QueryValidator};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/pacients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = PatientEnvelope),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Persistence failure (e.g. duplicate CPF)", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pacients"
)]
pub async fn create_patient(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreatePatientRequest>,
) -> Result<(StatusCode, Json<PatientEnvelope>), ApiError> {
    let pacient = state.patient_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(PatientEnvelope { pacient })))
}

/// List patients, optionally filtered by name substring and exact age
#[utoipa::path(
    get,
    path = "/pacients",
    params(PatientListParams),
    responses(
        (status = 200, description = "Matching patients (possibly empty)", body = PatientListEnvelope),
        (status = 400, description = "Age is not a non-negative integer", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pacients"
)]
pub async fn list_patients(
    State(state): State<AppState>,
    Query(params): Query<PatientListParams>,
) -> Result<Json<PatientListEnvelope>, ApiError> {
    let filter = QueryValidator::patient_filter(params)?;
    let pacients = state.patient_service.list(filter).await?;
    Ok(Json(PatientListEnvelope { pacients }))
}

#[utoipa::path(
    get,
    path = "/pacients/{id}",
    params(("id" = i64, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient with appointments", body = PatientEnvelope),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pacients"
)]
pub async fn get_patient(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<PatientEnvelope>, ApiError> {
    let pacient = state.patient_service.get(id).await?;
    Ok(Json(PatientEnvelope { pacient }))
}

/// Partially update a patient and return the stored record
#[utoipa::path(
    put,
    path = "/pacients/{id}",
    params(("id" = i64, Path, description = "Patient ID")),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = PatientEnvelope),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Persistence failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pacients"
)]
pub async fn update_patient(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    ValidatedJson(request): ValidatedJson<UpdatePatientRequest>,
) -> Result<Json<PatientEnvelope>, ApiError> {
    state.patient_service.get(id).await?;
    state.patient_service.update(id, request).await?;
    let pacient = state.patient_service.get(id).await?;
    Ok(Json(PatientEnvelope { pacient }))
}

/// Delete a patient and its appointments, returning the deleted record
#[utoipa::path(
    delete,
    path = "/pacients/{id}",
    params(("id" = i64, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient deleted", body = PatientEnvelope),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pacients"
)]
pub async fn delete_patient(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<PatientEnvelope>, ApiError> {
    let pacient = state.patient_service.get(id).await?;
    state.patient_service.delete(id).await?;
    Ok(Json(PatientEnvelope { pacient }))
}

#[utoipa::path(
    post,
    path = "/pacients/{id}/appointment",
    params(("id" = i64, Path, description = "Patient ID")),
    request_body = ScheduleAppointmentRequest,
    responses(
        (status = 201, description = "Appointment scheduled", body = AppointmentEnvelope),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Persistence failure (e.g. unknown doctor)", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pacients"
)]
pub async fn schedule_appointment(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    ValidatedJson(request): ValidatedJson<ScheduleAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentEnvelope>), ApiError> {
    state.patient_service.get(id).await?;
    let appointment = state.patient_service.schedule_appointment(id, request).await?;
    Ok((StatusCode::CREATED, Json(AppointmentEnvelope { appointment })))
}
