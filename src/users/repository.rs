// Read-only queries over staff accounts

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::auth::models::Role;
use crate::error::ApiError;
use crate::patients::models::Appointment;
use crate::patients::repository::appointments_where_in;
use crate::users::models::StaffMember;

const STAFF_COLUMNS: &str = "id, name, cpf, role";

#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<StaffMember>, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", STAFF_COLUMNS);
        let member = sqlx::query_as::<_, StaffMember>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(member)
    }

    /// All accounts whose role is in `roles`; an empty slice means every account
    pub async fn list(&self, roles: &[Role]) -> Result<Vec<StaffMember>, ApiError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM users", STAFF_COLUMNS));

        if !roles.is_empty() {
            builder.push(" WHERE role IN (");
            let mut separated = builder.separated(", ");
            for role in roles {
                separated.push_bind(*role);
            }
            separated.push_unseparated(")");
        }
        builder.push(" ORDER BY id");

        let members = builder
            .build_query_as::<StaffMember>()
            .fetch_all(&self.pool)
            .await?;

        Ok(members)
    }

    /// Load each member's appointments as doctor
    pub async fn attach_appointments(&self, members: &mut [StaffMember]) -> Result<(), ApiError> {
        let ids: Vec<i64> = members.iter().map(|member| member.id).collect();
        let appointments = appointments_where_in(&self.pool, "doctor_id", &ids).await?;

        let mut by_doctor: HashMap<i64, Vec<Appointment>> = HashMap::new();
        for appointment in appointments {
            by_doctor.entry(appointment.doctor_id).or_default().push(appointment);
        }
        for member in members.iter_mut() {
            member.appointments = by_doctor.remove(&member.id).unwrap_or_default();
        }

        Ok(())
    }
}
