//! MCTL Connection Configuration
//!
//! Settings for reaching the control endpoint and for the channel viewer front
//! end: a `key = value` file, then environment overrides.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

pub const DEFAULT_CONNSTRING: &str = "Meta:tcp -h 127.0.0.1 -p 6502";
pub const DEFAULT_SLICE: &str = "/usr/share/slice/Murmur.ice";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

pub const ENV_CONNSTRING: &str = "MUMBLE_CONNSTRING";
pub const ENV_ICESECRET: &str = "MUMBLE_ICESECRET";
pub const ENV_SLICE: &str = "MUMBLE_SLICE";
pub const ENV_HOST: &str = "FLASKCVP_HOST";
pub const ENV_PORT: &str = "FLASKCVP_PORT";
pub const ENV_CONNECT_URL: &str = "MURMUR_CONNECT_URL";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Endpoint proxy string (from "connstring" option)
    pub connstring: String,
    /// Shared secret sent with every call (from "icesecret" option)
    pub ice_secret: Option<String>,
    /// Interface definition file (from "slice" option)
    pub slice: String,
    /// Front end bind address (from "host" option)
    pub host: String,
    /// Front end bind port (from "port" option)
    pub port: u16,
    /// Connect URL advertised in viewer documents (from "connecturl" option)
    pub connect_url: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connstring: DEFAULT_CONNSTRING.into(),
            ice_secret: None,
            slice: DEFAULT_SLICE.into(),
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            connect_url: None,
        }
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl ConnectionConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Parse `key = value` lines; `#` starts a comment line
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config.parse_option(key.trim(), value.trim())?;
            }
        }

        Ok(config)
    }

    fn parse_option(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "connstring" => self.connstring = value.into(),
            "icesecret" => self.ice_secret = optional(value),
            "slice" => self.slice = value.into(),
            "host" => self.host = value.into(),
            "port" => {
                self.port = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.into(),
                    value: value.into(),
                })?;
            }
            "connecturl" => self.connect_url = optional(value),
            _ => tracing::debug!("Unknown config option: {} = {}", key, value),
        }
        Ok(())
    }

    /// Apply overrides from `lookup` (variable name to value)
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_CONNSTRING) {
            self.connstring = v;
        }
        if let Some(v) = lookup(ENV_ICESECRET) {
            self.ice_secret = optional(&v);
        }
        if let Some(v) = lookup(ENV_SLICE) {
            self.slice = v;
        }
        if let Some(v) = lookup(ENV_HOST) {
            self.host = v;
        }
        if let Some(v) = lookup(ENV_PORT) {
            self.port = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_PORT.into(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup(ENV_CONNECT_URL) {
            self.connect_url = optional(&v);
        }
        Ok(())
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    pub fn validate(&self) -> Result<()> {
        if self.connstring.trim().is_empty() {
            return Err(ConfigError::Invalid("connstring is empty".into()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must not be 0".into()));
        }
        if self.slice.contains(' ') {
            return Err(ConfigError::Invalid(format!(
                "slice path {:?} contains a space",
                self.slice
            )));
        }
        if !self.slice.ends_with(".ice") {
            return Err(ConfigError::Invalid(format!(
                "slice path {:?} must end with .ice",
                self.slice
            )));
        }
        Ok(())
    }

    /// Front end bind address
    pub fn bind_address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "host".into(),
                value: self.host.clone(),
            })
    }

    /// Log the settings; the secret is masked
    pub fn display(&self) {
        tracing::info!("Connection settings:");
        tracing::info!("  Connection string: {}", self.connstring);
        tracing::info!("  Slice file: {}", self.slice);
        tracing::info!(
            "  Ice secret: {}",
            if self.ice_secret.is_some() { "(set)" } else { "(none)" }
        );
        tracing::info!("  Bind: {}:{}", self.host, self.port);
        if let Some(url) = &self.connect_url {
            tracing::info!("  Connect URL: {}", url);
        }
    }
}
