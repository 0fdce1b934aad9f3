// Staff listing models

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::auth::models::Role;
use crate::patients::models::Appointment;

/// Staff account as exposed by the user listing endpoints
/// The password hash is never selected.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StaffMember {
    #[schema(example = 2)]
    pub id: i64,
    #[schema(example = "Dr House")]
    pub name: String,
    #[schema(example = "222")]
    pub cpf: String,
    pub role: Role,
    /// Appointments where this account is the doctor
    #[sqlx(skip)]
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    pub user: StaffMember,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListEnvelope {
    pub users: Vec<StaffMember>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DoctorListEnvelope {
    pub doctors: Vec<StaffMember>,
}
