// User query service

use tracing::debug;

use crate::auth::models::Role;
use crate::error::ApiError;
use crate::users::models::StaffMember;
use crate::users::repository::StaffRepository;

#[derive(Debug, Clone)]
pub struct UserService {
    repo: StaffRepository,
}

impl UserService {
    pub fn new(repo: StaffRepository) -> Self {
        Self { repo }
    }

    /// Fetch an account with its appointments
    pub async fn get(&self, id: i64) -> Result<StaffMember, ApiError> {
        let member = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User", id))?;

        let mut members = [member];
        self.repo.attach_appointments(&mut members).await?;
        let [member] = members;
        Ok(member)
    }

    /// Accounts whose role is any of `roles` (all accounts when empty)
    pub async fn list(&self, roles: &[Role]) -> Result<Vec<StaffMember>, ApiError> {
        let mut members = self.repo.list(roles).await?;
        self.repo.attach_appointments(&mut members).await?;

        debug!("Listed {} users for roles {:?}", members.len(), roles);
        Ok(members)
    }

    pub async fn list_doctors(&self) -> Result<Vec<StaffMember>, ApiError> {
        self.list(&[Role::Doctor]).await
    }
}
