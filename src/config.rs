use crate::constants::*;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: String,
    pub data_path: String,
    pub session_secret: String,
    pub session_secure: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SESSION_SECRET environment variable is required")]
    MissingSessionSecret,
    #[error("Invalid session secret: {0}")]
    InvalidSessionSecret(String),
    #[error("Invalid port number: {0}")]
    InvalidPort(String),
    #[error("Invalid SESSION_SECURE value: {0}")]
    InvalidSecureFlag(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env::var("SERVER_PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let data_path = env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());

        if port.parse::<u16>().is_err() {
            return Err(ConfigError::InvalidPort(port));
        }

        let session_secret =
            env::var("SESSION_SECRET").map_err(|_| ConfigError::MissingSessionSecret)?;
        validate_session_secret(&session_secret)?;

        let session_secure = match env::var("SESSION_SECURE") {
            Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidSecureFlag(value))?,
            Err(_) => false,
        };

        Ok(Config {
            host,
            port,
            data_path,
            session_secret,
            session_secure,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn validate_session_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InvalidSessionSecret(format!(
            "must be at least {} bytes long",
            MIN_SESSION_SECRET_LENGTH
        )));
    }
    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
