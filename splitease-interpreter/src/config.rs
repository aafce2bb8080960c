use splitease_domain::{MemberId, services::MAX_TOKEN_DECIMALS};
use std::env;
use thiserror::Error;

const DEFAULT_TOKEN_DECIMALS: u32 = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SPLITEASE_TOKEN_DECIMALS must be a non-negative integer (got `{0}`)")]
    InvalidTokenDecimals(String),
    #[error("SPLITEASE_TOKEN_DECIMALS must be at most {max_supported} (got {decimals})")]
    UnsupportedTokenDecimals { decimals: u32, max_supported: u32 },
}

/// Settings read from the environment, after loading `.env` if present.
#[derive(Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub token_decimals: u32,
    pub default_viewer: Option<MemberId>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token_decimals = match lookup("SPLITEASE_TOKEN_DECIMALS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidTokenDecimals(raw))?,
            None => DEFAULT_TOKEN_DECIMALS,
        };
        if token_decimals > MAX_TOKEN_DECIMALS {
            return Err(ConfigError::UnsupportedTokenDecimals {
                decimals: token_decimals,
                max_supported: MAX_TOKEN_DECIMALS,
            });
        }

        let default_viewer = lookup("SPLITEASE_VIEWER")
            .map(|raw| raw.trim().to_owned())
            .filter(|viewer| !viewer.is_empty())
            .map(MemberId::new);

        Ok(Self {
            token_decimals,
            default_viewer,
        })
    }
}
