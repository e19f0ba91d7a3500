use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use anyhow::{Result, anyhow};
use reqwest::Url;
use tracing::{debug, info, warn};

pub const DEFAULT_UPSTREAM_URL: &str = "https://openapi.foodsafetykorea.go.kr/api";

pub struct Config {
    pub port: u16,
    pub upstream_url: Url,
    pub api_key_name: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            port: try_load("RUST_PORT", "1111")?,
            upstream_url: try_load("FOOD_API_URL", DEFAULT_UPSTREAM_URL)?,
            api_key_name: try_load("FOOD_API_KEY_NAME", "FOOD_API_KEY")?,
        })
    }
}

/// Source of the upstream credential, consulted on every request.
pub trait Credentials: Send + Sync {
    fn api_key(&self) -> Option<String>;
}

/// Reads the key from the environment, then from `/run/secrets/<name>`.
pub struct EnvCredentials {
    name: String,
}

impl EnvCredentials {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Credentials for EnvCredentials {
    fn api_key(&self) -> Option<String> {
        env::var(&self.name)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .or_else(|| read_secret(&self.name))
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow!("Invalid {key} value {raw}: {e}"))
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            debug!("Failed to read {secret_name} from file: {e}");
        })
        .ok()
        .filter(|s| !s.is_empty())
}
