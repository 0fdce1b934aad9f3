pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod patients;
pub mod query;
pub mod users;
pub mod validation;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    login_handler, register_handler, require_auth, require_role, AuthService, IdentityGate,
    RequireRole, TokenService, UserRepository,
};
use config::AppConfig;
use db::DbPool;
use patients::{handlers as patient_handlers, PatientRepository, PatientService};
use users::{handlers as user_handlers, StaffRepository, UserService};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::login_handler,
        auth::handlers::register_handler,
        patients::handlers::create_patient,
        patients::handlers::list_patients,
        patients::handlers::get_patient,
        patients::handlers::update_patient,
        patients::handlers::delete_patient,
        patients::handlers::schedule_appointment,
        users::handlers::list_users,
        users::handlers::get_user,
        users::handlers::list_doctors,
    ),
    components(
        schemas(
            error::ErrorResponse,
            auth::models::Role,
            auth::models::LoginRequest,
            auth::models::RegisterRequest,
            auth::models::TokenResponse,
            auth::models::UserResponse,
            patients::models::Sex,
            patients::models::BloodType,
            patients::models::Patient,
            patients::models::Appointment,
            patients::models::CreatePatientRequest,
            patients::models::UpdatePatientRequest,
            patients::models::ScheduleAppointmentRequest,
            patients::models::PatientEnvelope,
            patients::models::PatientListEnvelope,
            patients::models::AppointmentEnvelope,
            users::models::StaffMember,
            users::models::UserEnvelope,
            users::models::UserListEnvelope,
            users::models::DoctorListEnvelope,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login and staff registration"),
        (name = "pacients", description = "Patient records and appointment scheduling"),
        (name = "users", description = "Staff account queries")
    ),
    info(
        title = "Hospital API",
        version = "1.0.0",
        description = "Hospital management REST API: staff accounts, patients and appointments"
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub patient_service: PatientService,
    pub user_service: UserService,
    pub identity_gate: IdentityGate,
}

impl AppState {
    /// Wire every service onto one pool and the immutable configuration
    pub fn new(db: DbPool, config: AppConfig) -> Self {
        let tokens = TokenService::new(&config.secret_key);
        let accounts = UserRepository::new(db.clone());

        Self {
            auth_service: AuthService::new(accounts.clone(), tokens.clone()),
            patient_service: PatientService::new(PatientRepository::new(db.clone())),
            user_service: UserService::new(StaffRepository::new(db)),
            identity_gate: IdentityGate::new(tokens, accounts),
            config: Arc::new(config),
        }
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!("Ignoring unusable CORS origin '{}'", origin);
            cors
        }
    }
}

/// Build the application router
///
/// Every route except `/login` and the API docs passes `require_auth` first,
/// then the per-route role check.
pub fn create_router(state: AppState) -> Router {
    let admin = || from_fn_with_state(RequireRole::ADMIN, require_role);
    let reception_or_admin = || from_fn_with_state(RequireRole::RECEPTION_OR_ADMIN, require_role);
    let reception_or_doctor =
        || from_fn_with_state(RequireRole::RECEPTION_OR_DOCTOR, require_role);

    let protected = Router::new()
        .route("/register", post(register_handler).route_layer(admin()))
        .route("/doctors", get(user_handlers::list_doctors).route_layer(reception_or_admin()))
        .route(
            "/pacients",
            post(patient_handlers::create_patient).route_layer(reception_or_admin()),
        )
        .route(
            "/pacients",
            get(patient_handlers::list_patients).route_layer(reception_or_doctor()),
        )
        .route(
            "/pacients/:id",
            get(patient_handlers::get_patient).route_layer(reception_or_doctor()),
        )
        .route(
            "/pacients/:id",
            put(patient_handlers::update_patient).route_layer(reception_or_admin()),
        )
        .route(
            "/pacients/:id",
            delete(patient_handlers::delete_patient).route_layer(reception_or_admin()),
        )
        .route(
            "/pacients/:id/appointment",
            post(patient_handlers::schedule_appointment).route_layer(reception_or_admin()),
        )
        .route("/users", get(user_handlers::list_users).route_layer(admin()))
        .route("/users/:id", get(user_handlers::get_user).route_layer(admin()))
        .route_layer(from_fn_with_state(state.identity_gate.clone(), require_auth));

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origin));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/login", post(login_handler))
        .merge(protected)
        .layer(middleware)
        .with_state(state)
}
