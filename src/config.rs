//! Configuration management for Outreach.
//!
//! Loads configuration from environment variables (and `.env`) with support for:
//! - Server bind address and logging format
//! - SQLite database location
//! - JWT signing secret and token lifetimes
//! - Public storage root used by uploads and the gallery scan

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Default folders walked by the gallery scan, in display order.
pub const DEFAULT_GALLERY_FOLDERS: &[&str] = &[
    "gallery",
    "campaigns",
    "projects",
    "stories",
    "blog",
    "team",
    "sponsors",
];

/// Get the global configuration
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Initialize configuration (call once at startup)
pub fn init() -> &'static Config {
    config()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub contact: ContactConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Log output format, read from `LOG_FORMAT` before the rest of the
/// configuration so that config warnings are already formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::from_value(env::var("LOG_FORMAT").ok().as_deref())
    }

    /// Unset or unknown values fall back to pretty output.
    fn from_value(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or(Self::Pretty)
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Access token lifetime in minutes.
    pub token_ttl_minutes: i64,
    /// Window after issue during which a token may be refreshed, in minutes.
    pub refresh_ttl_minutes: i64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Admin account created at startup when it does not exist yet.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory of publicly served files.
    pub public_path: PathBuf,
    /// URL prefix the public root is served under.
    pub public_url: String,
    pub max_upload_size: usize,
    pub gallery_folders: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ContactConfig {
    /// Contact form submissions allowed per client per minute.
    pub rate_limit_per_minute: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using a random secret for this process");
                nanoid::nanoid!(48)
            }
        };

        Self {
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: env_or("PORT", "8080").parse().unwrap_or(8080),
            },
            database: DatabaseConfig {
                path: env_or("DATABASE_PATH", "./data/outreach.db"),
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_minutes: env_or("JWT_TTL", "60").parse().unwrap_or(60),
                refresh_ttl_minutes: env_or("JWT_REFRESH_TTL", "20160")
                    .parse()
                    .unwrap_or(20160), // 2 weeks
                bootstrap_admin: Self::parse_bootstrap_admin(),
            },
            storage: StorageConfig {
                public_path: PathBuf::from(env_or("STORAGE_PATH", "./storage/public")),
                public_url: env_or("STORAGE_URL", "/storage"),
                max_upload_size: env_or("MAX_UPLOAD_SIZE", "10485760")
                    .parse()
                    .unwrap_or(10 * 1024 * 1024), // 10MB
                gallery_folders: env::var("GALLERY_FOLDERS")
                    .map(|v| parse_folder_list(&v))
                    .unwrap_or_else(|_| default_gallery_folders()),
            },
            contact: ContactConfig {
                rate_limit_per_minute: env_or("CONTACT_RATE_LIMIT", "5").parse().unwrap_or(5),
            },
        }
    }

    /// Configuration suitable for tests: in-memory database, fixed secret.
    pub fn for_tests(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                path: ":memory:".to_string(),
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-with-enough-entropy-for-hs256".to_string(),
                token_ttl_minutes: 60,
                refresh_ttl_minutes: 20160,
                bootstrap_admin: None,
            },
            storage: StorageConfig {
                public_path: storage_root.into(),
                public_url: "/storage".to_string(),
                max_upload_size: 1024 * 1024,
                gallery_folders: default_gallery_folders(),
            },
            contact: ContactConfig {
                rate_limit_per_minute: 5,
            },
        }
    }

    fn parse_bootstrap_admin() -> Option<BootstrapAdmin> {
        let email = env::var("ADMIN_EMAIL").ok().filter(|v| !v.is_empty())?;
        let password = env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty())?;

        Some(BootstrapAdmin {
            name: env_or("ADMIN_NAME", "Administrator"),
            email,
            password,
        })
    }
}

fn default_gallery_folders() -> Vec<String> {
    DEFAULT_GALLERY_FOLDERS.iter().map(|f| f.to_string()).collect()
}

/// Parse a comma-separated folder list, dropping blanks and path separators.
fn parse_folder_list(value: &str) -> Vec<String> {
    let folders: Vec<String> = value
        .split(',')
        .map(|f| f.trim().trim_matches('/').to_string())
        .filter(|f| !f.is_empty() && !f.contains("..") && !f.contains('\\'))
        .collect();

    if folders.is_empty() {
        default_gallery_folders()
    } else {
        folders
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
