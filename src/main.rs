use hospital_api::{config::AppConfig, create_router, db, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Hospital API - Starting...");

    let config = AppConfig::from_env().expect("Invalid configuration");

    tracing::info!("Opening database {}...", config.database_url);
    let db_pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Running database migrations...");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let addr = config.bind_address();
    let admin_seed = config.admin_seed.clone();
    let state = AppState::new(db_pool, config);

    match admin_seed {
        Some(seed) => {
            state
                .auth_service
                .ensure_admin(&seed)
                .await
                .expect("Failed to create bootstrap admin");
        }
        None => tracing::info!("No ADMIN_* variables set, skipping bootstrap admin"),
    }

    let app = create_router(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Hospital API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
