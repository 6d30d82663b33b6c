use dotenv::dotenv;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::slot::{GridKind, SlotGrid};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DATA_DIR: &str = "/app/data";
const DEFAULT_CACHE_TTL_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Where profiles are loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Csv { data_dir: PathBuf },
    Supabase { url: String, service_key: String },
    /// Built-in demo dataset
    Sample,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub is_production: bool,
    pub grid: SlotGrid,
    pub store: StoreBackend,
    /// Zero disables the profile cache
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Read configuration from the process environment, after loading `.env`
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR)?;

        let is_production = lookup("ENVIRONMENT")
            .map(|val| val.to_lowercase() == "production")
            .unwrap_or(false);

        let grid_kind: GridKind = parse_or(&lookup, "SLOT_GRID", GridKind::TwoHour.name())?;

        let backend = lookup("PROFILE_STORE").unwrap_or_else(|| "csv".to_string());
        let store = match backend.to_lowercase().as_str() {
            "csv" => StoreBackend::Csv {
                data_dir: PathBuf::from(
                    lookup("PROFILE_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
                ),
            },
            "supabase" => StoreBackend::Supabase {
                url: lookup("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?,
                service_key: lookup("SUPABASE_SERVICE_KEY")
                    .ok_or(ConfigError::Missing("SUPABASE_SERVICE_KEY"))?,
            },
            "sample" => StoreBackend::Sample,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "PROFILE_STORE",
                    value: backend,
                })
            }
        };

        let cache_ttl_secs: u64 = parse_or(
            &lookup,
            "PROFILE_CACHE_TTL_SECS",
            &DEFAULT_CACHE_TTL_SECS.to_string(),
        )?;
        let timeout_secs: u64 = parse_or(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
        )?;

        Ok(Self {
            bind_addr,
            is_production,
            grid: SlotGrid::new(grid_kind),
            store,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
