//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

use crate::game::arena::ArenaConfig;

/// Default access-token lifetime: 30 minutes
const DEFAULT_TOKEN_TTL_SECS: u64 = 30 * 60;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// HS256 secret for access tokens
    pub jwt_secret: String,
    /// Access-token lifetime in seconds
    pub token_ttl_secs: u64,

    /// Allowed client origin(s) for CORS, comma-separated
    pub client_origin: String,

    /// Fixed seed for the simulation RNG; unset means seeded from entropy
    pub rng_seed: Option<u64>,
    /// Arena dimensions for the simulation core
    pub arena: ArenaConfig,

    /// Admin account created at startup if it does not exist
    pub bootstrap_admin: Option<AdminBootstrap>,
}

/// Credentials for the startup admin account
#[derive(Clone, Debug)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let arena_defaults = ArenaConfig::default();
        let arena = ArenaConfig {
            cells_x: optional_parse("ARENA_CELLS_X")?.unwrap_or(arena_defaults.cells_x),
            cells_y: optional_parse("ARENA_CELLS_Y")?.unwrap_or(arena_defaults.cells_y),
            cells_z: optional_parse("ARENA_CELLS_Z")?.unwrap_or(arena_defaults.cells_z),
            spacing: optional_parse("ARENA_SPACING")?.unwrap_or(arena_defaults.spacing),
        };

        let bootstrap_admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(AdminBootstrap { username, password }),
            (Err(_), Err(_)) => None,
            _ => return Err(ConfigError::IncompleteAdminBootstrap),
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,
            token_ttl_secs: optional_parse("TOKEN_TTL_SECS")?.unwrap_or(DEFAULT_TOKEN_TTL_SECS),

            client_origin: env::var("CLIENT_ORIGIN")
                .map_err(|_| ConfigError::Missing("CLIENT_ORIGIN"))?,

            rng_seed: optional_parse("RNG_SEED")?,
            arena,

            bootstrap_admin,
        })
    }
}

fn optional_parse<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid numeric value for {0}")]
    InvalidNumber(&'static str),

    #[error("ADMIN_USERNAME and ADMIN_PASSWORD must be set together")]
    IncompleteAdminBootstrap,
}
