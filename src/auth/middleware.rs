// Authorization gate for protected routes
//
// Stage 1 (`require_auth`) resolves the bearer token to an account and stores
// an `AuthenticatedUser` in the request extensions. Stage 2 (`require_role`)
// checks that user's role against a per-route allow-list. Stage 1 is layered
// on the whole protected router so it always runs first.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{error::AuthError, models::Role, repository::UserRepository, token::TokenService};

/// Identity of the caller, attached by `require_auth`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(AuthError::MissingAuthContext)
    }
}

/// Collaborators needed to resolve a bearer token to an account
#[derive(Debug, Clone)]
pub struct IdentityGate {
    tokens: TokenService,
    users: UserRepository,
}

impl IdentityGate {
    pub fn new(tokens: TokenService, users: UserRepository) -> Self {
        Self { tokens, users }
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header
fn bearer_token(request: &Request) -> Result<&str, AuthError> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MissingToken)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Stage 1: identity extraction
pub async fn require_auth(
    State(gate): State<IdentityGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user_id = {
        let token = bearer_token(&request)?;
        gate.tokens.validate(token)?
    };

    // a failed lookup is reported like an unresolvable subject
    let user = gate
        .users
        .find_by_id(user_id)
        .await
        .unwrap_or_else(|e| {
            warn!("Account lookup failed for user_id={}: {}", user_id, e);
            None
        })
        .ok_or(AuthError::UnknownUser(user_id))?;

    debug!(
        "Authenticated user_id={} role={} for {}",
        user.id,
        user.role,
        request.uri().path()
    );

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Stage 2: role allow-list configured per route
#[derive(Debug, Clone, Copy)]
pub struct RequireRole {
    allowed: &'static [Role],
}

impl RequireRole {
    pub const ADMIN: RequireRole = RequireRole::new(&[Role::Admin]);
    pub const RECEPTION_OR_ADMIN: RequireRole =
        RequireRole::new(&[Role::Receptionist, Role::Admin]);
    pub const RECEPTION_OR_DOCTOR: RequireRole =
        RequireRole::new(&[Role::Receptionist, Role::Doctor]);

    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }
}

pub async fn require_role(
    State(policy): State<RequireRole>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .copied()
        .ok_or(AuthError::MissingAuthContext)?;

    if !policy.allows(user.role) {
        warn!(
            "Forbidden: user_id={} role={} endpoint={}",
            user.user_id,
            user.role,
            request.uri().path()
        );
        return Err(AuthError::InsufficientPermissions {
            allowed: policy.allowed,
            actual: user.role,
        });
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, DbPool};
    use axum::{http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
    use axum_test::TestServer;

    const SECRET: &str = "test_secret_key_for_testing_purposes";

    async fn whoami(user: AuthenticatedUser) -> String {
        format!("{}:{}", user.user_id, user.role)
    }

    struct Fixture {
        server: TestServer,
        tokens: TokenService,
        users: UserRepository,
        pool: DbPool,
    }

    async fn fixture() -> Fixture {
        let pool = test_pool().await;
        let users = UserRepository::new(pool.clone());
        let tokens = TokenService::new(SECRET);
        let gate = IdentityGate::new(tokens.clone(), users.clone());

        let app = Router::new()
            .route(
                "/admin",
                get(whoami).route_layer(from_fn_with_state(RequireRole::ADMIN, require_role)),
            )
            .route("/any", get(whoami))
            .route_layer(from_fn_with_state(gate, require_auth))
            .route(
                "/misconfigured",
                get(whoami).route_layer(from_fn_with_state(RequireRole::ADMIN, require_role)),
            );

        Fixture {
            server: TestServer::new(app).unwrap(),
            tokens,
            users,
            pool,
        }
    }

    async fn bearer_for(fixture: &Fixture, cpf: &str, role: Role) -> String {
        let user = fixture.users.create("Someone", cpf, "hash", role).await.unwrap();
        format!("Bearer {}", fixture.tokens.issue(user.id).unwrap())
    }

    #[test]
    fn test_presets() {
        assert!(RequireRole::ADMIN.allows(Role::Admin));
        assert!(!RequireRole::ADMIN.allows(Role::Receptionist));
        assert!(RequireRole::RECEPTION_OR_ADMIN.allows(Role::Receptionist));
        assert!(!RequireRole::RECEPTION_OR_ADMIN.allows(Role::Doctor));
        assert!(RequireRole::RECEPTION_OR_DOCTOR.allows(Role::Doctor));
        assert!(!RequireRole::RECEPTION_OR_DOCTOR.allows(Role::Admin));
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let fixture = fixture().await;
        let response = fixture.server.get("/admin").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_headers_are_unauthorized() {
        let fixture = fixture().await;

        for value in ["Basic dXNlcjpwYXNz", "Bearer ", "Bearer not.a.jwt", "token"] {
            let response = fixture
                .server
                .get("/any")
                .add_header(header::AUTHORIZATION, value.parse().unwrap())
                .await;
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED, "{}", value);
        }
    }

    #[tokio::test]
    async fn test_token_for_deleted_account_is_unauthorized() {
        let fixture = fixture().await;
        let token = fixture.tokens.issue(4242).unwrap();

        let response = fixture
            .server
            .get("/any")
            .add_header(header::AUTHORIZATION, format!("Bearer {}", token).parse().unwrap())
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_storage_failure_during_lookup_is_unauthorized() {
        let fixture = fixture().await;
        let bearer = bearer_for(&fixture, "111", Role::Admin).await;
        fixture.pool.close().await;

        let response = fixture
            .server
            .get("/any")
            .add_header(header::AUTHORIZATION, bearer.parse().unwrap())
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error_code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_disallowed_role_is_forbidden() {
        let fixture = fixture().await;
        let bearer = bearer_for(&fixture, "111", Role::Doctor).await;

        let response = fixture
            .server
            .get("/admin")
            .add_header(header::AUTHORIZATION, bearer.parse().unwrap())
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error_code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_allowed_role_passes_with_identity() {
        let fixture = fixture().await;
        let bearer = bearer_for(&fixture, "111", Role::Admin).await;

        let response = fixture
            .server
            .get("/admin")
            .add_header(header::AUTHORIZATION, bearer.parse().unwrap())
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.text().ends_with(":admin"));
    }

    #[tokio::test]
    async fn test_role_check_without_identity_is_internal_error() {
        let fixture = fixture().await;
        let response = fixture.server.get("/misconfigured").await;
        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
