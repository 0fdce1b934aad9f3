// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{validate_national_id, validate_not_blank};

/// Staff role governing endpoint access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Receptionist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Receptionist => "receptionist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "receptionist" => Ok(Role::Receptionist),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// User database model
/// Never serialized: the password hash must not leave the service.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User response model (excludes password_hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(example = "111")]
    pub cpf: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            cpf: user.cpf,
            role: user.role,
        }
    }
}

/// Registration request DTO
#[derive(Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Alice")]
    pub name: String,
    #[validate(custom = "validate_national_id")]
    #[schema(example = "111")]
    pub cpf: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "secret")]
    pub password: String,
    pub role: Role,
}

/// Login request DTO
#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "111")]
    pub cpf: String,
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "secret")]
    pub password: String,
}

// Plaintext passwords stay out of logs
impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("cpf", &self.cpf)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("cpf", &self.cpf)
            .finish_non_exhaustive()
    }
}

/// Login response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}
