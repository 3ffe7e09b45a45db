//! Application configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment variable overrides. The
//! configuration file path defaults to `config.yaml` but can be specified via `-f` flag or the
//! `SHOWCASE_CONFIG` environment variable. A missing file is not an error: every field has a default,
//! so the server starts on port 5000 with the stock upload rules when nothing is configured.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `SHOWCASE_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `SHOWCASE_UPLOADS__MAX_FILE_SIZE=1048576` sets the `uploads.max_file_size` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use showcase::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}", config.bind_address());
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding
//! - **Docs**: `docs.path`, `docs.title` - Where the interactive API documentation is served
//! - **Uploads**: `uploads.max_file_size`, `uploads.allowed_mime_types` - Image upload filter rules
//! - **CORS**: `cors.allowed_origins`, `cors.allow_credentials`, `cors.max_age`
//! - **Features**: `enable_metrics`, `enable_otel_export` - Optional feature toggles

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use mime::Mime;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "SHOWCASE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Interactive documentation settings
    pub docs: DocsConfig,
    /// Image upload filter settings
    pub uploads: UploadConfig,
    /// CORS settings applied to every route
    pub cors: CorsConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Where and how the generated API documentation is served.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    /// Path of the interactive documentation page. The raw document is served at `{path}/openapi.json`.
    pub path: String,
    /// Title of the documentation page
    pub title: String,
}

impl DocsConfig {
    pub fn openapi_json_path(&self) -> String {
        format!("{}/openapi.json", self.path.trim_end_matches('/'))
    }
}

/// Rules for the image upload filter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Maximum accepted file size in bytes (inclusive)
    pub max_file_size: u64,
    /// MIME types accepted by the filter, compared against the part's declared content type
    pub allowed_mime_types: Vec<String>,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

/// A single allowed CORS origin.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

/// 10 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub const DEFAULT_IMAGE_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            docs: DocsConfig::default(),
            uploads: UploadConfig::default(),
            cors: CorsConfig::default(),
            enable_metrics: false,
            enable_otel_export: false,
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            path: "/api/docs".to_string(),
            title: "Swagger example project".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: DEFAULT_IMAGE_MIME_TYPES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allow_credentials: false,
            max_age: Some(3600), // Cache preflight for 1 hour
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.uploads.allowed_mime_types.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: uploads.allowed_mime_types is empty, no upload could ever be accepted".to_string(),
            });
        }

        if let Some(bad) = self.uploads.allowed_mime_types.iter().find(|m| m.parse::<Mime>().is_err()) {
            return Err(Error::Internal {
                operation: format!("Config validation: '{bad}' in uploads.allowed_mime_types is not a valid MIME type"),
            });
        }

        if self.uploads.max_file_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: uploads.max_file_size must be greater than 0".to_string(),
            });
        }

        if !self.docs.path.starts_with('/') {
            return Err(Error::Internal {
                operation: format!("Config validation: docs.path ({}) must start with '/'", self.docs.path),
            });
        }

        let has_wildcard = self.cors.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard));
        if has_wildcard && self.cors.allow_credentials {
            return Err(Error::Internal {
                operation: "Config validation: CORS cannot use wildcard origin '*' with allow_credentials=true. Specify explicit origins."
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values.
            // SHOWCASE_CONFIG names the file itself and is not a config key.
            .merge(Env::prefixed("SHOWCASE_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
