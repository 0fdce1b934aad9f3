// Runtime configuration
// Loaded once at startup and shared read-only through AppState

/// Errors raised while reading configuration at startup
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Optional administrator account created at startup
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub name: String,
    pub cpf: String,
    pub password: String,
}

// Keeps the seed password out of Debug output
impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("name", &self.name)
            .field("cpf", &self.cpf)
            .finish_non_exhaustive()
    }
}

/// Immutable application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub secret_key: String,
    pub cors_origin: String,
    pub admin_seed: Option<AdminSeed>,
}

impl AppConfig {
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_DATABASE_URL: &'static str = "dev.db";
    pub const DEFAULT_CORS_ORIGIN: &'static str = "http://localhost:3000";

    /// Read configuration from the process environment (after `.env` is loaded)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret_key = get("SECRET_KEY").ok_or(ConfigError::Missing("SECRET_KEY"))?;

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => Self::DEFAULT_PORT,
        };

        let admin_seed = match (get("ADMIN_NAME"), get("ADMIN_CPF"), get("ADMIN_PASSWORD")) {
            (Some(name), Some(cpf), Some(password)) => Some(AdminSeed { name, cpf, password }),
            _ => None,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: get("DB_URL").unwrap_or_else(|| Self::DEFAULT_DATABASE_URL.to_string()),
            secret_key,
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| Self::DEFAULT_CORS_ORIGIN.to_string()),
            admin_seed,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
