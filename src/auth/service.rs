// Authentication service - business logic layer

use tracing::{debug, info};

use crate::auth::{
    error::AuthError,
    models::{RegisterRequest, Role, User},
    password::PasswordService,
    repository::UserRepository,
    token::TokenService,
};
use crate::config::AdminSeed;

/// Authentication service coordinating registration and login
#[derive(Debug, Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    token_service: TokenService,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(user_repo: UserRepository, token_service: TokenService) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    /// Register a new staff account
    ///
    /// The plaintext password is replaced by its Argon2 hash before the
    /// record reaches storage.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        let password_hash = PasswordService::hash_password(&request.password)?;

        let user = self
            .user_repo
            .create(&request.name, &request.cpf, &password_hash, request.role)
            .await?;

        info!("Registered user id={} role={}", user.id, user.role);
        Ok(user)
    }

    /// Login with national identifier and password, returning a signed token
    pub async fn login(&self, cpf: &str, password: &str) -> Result<String, AuthError> {
        let Some(user) = self.user_repo.find_by_cpf(cpf).await? else {
            PasswordService::verify_dummy(password);
            return Err(AuthError::UserNotFound);
        };

        if !PasswordService::verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        debug!("User id={} authenticated", user.id);
        self.token_service.issue(user.id)
    }

    /// Create the bootstrap admin account unless its CPF is already taken
    ///
    /// Returns true when an account was created.
    pub async fn ensure_admin(&self, seed: &AdminSeed) -> Result<bool, AuthError> {
        if self.user_repo.find_by_cpf(&seed.cpf).await?.is_some() {
            debug!("Bootstrap admin already present");
            return Ok(false);
        }

        let password_hash = PasswordService::hash_password(&seed.password)?;
        let user = self
            .user_repo
            .create(&seed.name, &seed.cpf, &password_hash, Role::Admin)
            .await?;

        info!("Created bootstrap admin id={}", user.id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn test_service() -> AuthService {
        let pool = test_pool().await;
        AuthService::new(UserRepository::new(pool), TokenService::new("test-secret"))
    }

    fn alice() -> RegisterRequest {
        RegisterRequest {
            name: "Alice".to_string(),
            cpf: "111".to_string(),
            password: "secret".to_string(),
            role: Role::Doctor,
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let service = test_service().await;
        let user = service.register(alice()).await.unwrap();

        assert_eq!(user.name, "Alice");
        assert_ne!(user.password_hash, "secret");
        assert!(PasswordService::verify_password("secret", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_cpf_fails() {
        let service = test_service().await;
        service.register(alice()).await.unwrap();

        let result = service.register(alice()).await;
        assert!(matches!(result, Err(AuthError::DuplicateCpf(_))));
    }

    #[tokio::test]
    async fn test_login_issues_token_for_user() {
        let service = test_service().await;
        let user = service.register(alice()).await.unwrap();

        let token = service.login("111", "secret").await.unwrap();
        assert!(!token.is_empty());
        assert_eq!(TokenService::new("test-secret").validate(&token).unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_distinguished() {
        let service = test_service().await;
        service.register(alice()).await.unwrap();

        let unknown = service.login("222", "secret").await;
        assert!(matches!(unknown, Err(AuthError::UserNotFound)));

        let wrong = service.login("111", "wrong-password").await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let service = test_service().await;
        let seed = AdminSeed {
            name: "Root".to_string(),
            cpf: "000".to_string(),
            password: "rootpass".to_string(),
        };

        assert!(service.ensure_admin(&seed).await.unwrap());
        assert!(!service.ensure_admin(&seed).await.unwrap());

        let admin = service.user_repo.find_by_cpf("000").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(service.login("000", "rootpass").await.is_ok());
    }
}
