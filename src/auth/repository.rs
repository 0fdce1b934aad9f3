// Database repository for staff accounts

use chrono::Utc;
use sqlx::SqlitePool;

use crate::auth::{
    error::AuthError,
    models::{Role, User},
};
use crate::error::is_unique_violation;

const USER_COLUMNS: &str = "id, name, cpf, password_hash, role, created_at, updated_at";

/// User repository for database operations
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(
        &self,
        name: &str,
        cpf: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (name, cpf, password_hash, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(name)
            .bind(cpf)
            .bind(password_hash)
            .bind(role)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AuthError::DuplicateCpf(cpf.to_string())
                } else {
                    AuthError::DatabaseError(e)
                }
            })
    }

    /// Find a user by national identifier (exact match)
    pub async fn find_by_cpf(&self, cpf: &str) -> Result<Option<User>, AuthError> {
        let sql = format!("SELECT {} FROM users WHERE cpf = ?", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(cpf)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = UserRepository::new(test_pool().await);

        let created = repo.create("Alice", "111", "hash", Role::Doctor).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.role, Role::Doctor);

        let by_cpf = repo.find_by_cpf("111").await.unwrap().unwrap();
        assert_eq!(by_cpf.id, created.id);
        assert_eq!(by_cpf.name, "Alice");

        let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.cpf, "111");
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let repo = UserRepository::new(test_pool().await);
        assert!(repo.find_by_cpf("999").await.unwrap().is_none());
        assert!(repo.find_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_cpf_is_reported() {
        let repo = UserRepository::new(test_pool().await);
        repo.create("Alice", "111", "hash", Role::Doctor).await.unwrap();

        let result = repo.create("Bob", "111", "hash", Role::Receptionist).await;
        assert!(matches!(result, Err(AuthError::DuplicateCpf(cpf)) if cpf == "111"));
    }
}
