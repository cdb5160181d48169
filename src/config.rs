use axum::http::HeaderValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub sharing: SharingConfig,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsPolicy,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory uploaded PDFs are written to
    pub upload_dir: String,
}

#[derive(Debug, Clone)]
pub struct SharingConfig {
    /// Serve `/share/:id` and point share links at it
    pub preview_page: bool,
    /// Fixed origin for generated links, e.g. `https://pdf.example.com`.
    /// When absent the origin is taken from the request.
    pub public_base_url: Option<String>,
}

/// Cross-origin policy applied to every route.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsPolicy {
    Disabled,
    Any,
    Origins(Vec<HeaderValue>),
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors: CorsPolicy::Disabled,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: "uploads".to_string(),
        }
    }
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            preview_page: true,
            public_base_url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            sharing: SharingConfig::default(),
            max_upload_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl CorsPolicy {
    /// Parse `CORS_ALLOWED_ORIGINS`: `*` allows any origin, otherwise a comma separated list.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(CorsPolicy::Disabled);
        }
        if raw == "*" {
            return Ok(CorsPolicy::Any);
        }

        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| {
                    ConfigError::ValidationError(format!("invalid CORS origin '{origin}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if origins.is_empty() {
            Ok(CorsPolicy::Disabled)
        } else {
            Ok(CorsPolicy::Origins(origins))
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match std::env::var("PORT") {
            Ok(p) => p
                .trim()
                .parse()
                .map_err(|_| ConfigError::ValidationError(format!("PORT '{p}' is not a port")))?,
            Err(_) => 3000,
        };

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let max_upload_size = match std::env::var("MAX_UPLOAD_BYTES") {
            Ok(v) => v.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("MAX_UPLOAD_BYTES '{v}' is not a byte count"))
            })?,
            Err(_) => 10 * 1024 * 1024, // 10MB
        };

        let cors = match std::env::var("CORS_ALLOWED_ORIGINS") {
            Ok(v) => CorsPolicy::parse(&v)?,
            Err(_) => CorsPolicy::Disabled,
        };

        let preview_page = std::env::var("PREVIEW_PAGE")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "off"))
            .unwrap_or(true);

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());

        let config = Config {
            server: ServerConfig { host, port, cors },
            storage: StorageConfig { upload_dir },
            sharing: SharingConfig {
                preview_page,
                public_base_url,
            },
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_BYTES must be greater than 0".to_string(),
            ));
        }

        if self.storage.upload_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "UPLOAD_DIR cannot be empty".to_string(),
            ));
        }

        if let Some(ref base) = self.sharing.public_base_url {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "PUBLIC_BASE_URL '{base}' must start with http:// or https://"
                )));
            }
        }

        if self.server.cors == CorsPolicy::Any {
            tracing::warn!("CORS allows any origin. Restrict CORS_ALLOWED_ORIGINS in production.");
        }

        Ok(())
    }

    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
