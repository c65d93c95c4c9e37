use anyhow::{Context, Result};
use std::env;

/// Configuration for the Cortex agent endpoint.
#[derive(Debug, Clone)]
pub struct CortexConfig {
    pub host: String,
    pub token: String,
    pub model: String,
    pub semantic_model_file: String,
    pub search_service: String,
    pub search_limit: u32,
    pub search_id_column: String,
}

impl CortexConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("SNOWFLAKE_HOST").context("SNOWFLAKE_HOST is not set")?,
            token: env::var("SNOWFLAKE_TOKEN").context("SNOWFLAKE_TOKEN is not set")?,
            model: env::var("CORTEX_MODEL").unwrap_or_else(|_| "claude-4-sonnet".to_string()),
            semantic_model_file: env::var("SEMANTIC_MODEL_FILE")
                .context("SEMANTIC_MODEL_FILE is not set")?,
            search_service: env::var("CORTEX_SEARCH_SERVICE")
                .context("CORTEX_SEARCH_SERVICE is not set")?,
            search_limit: 5,
            search_id_column: env::var("SEARCH_ID_COLUMN")
                .unwrap_or_else(|_| "conversation_id".to_string()),
        })
    }
}

/// Configuration for the HERE geocoding and routing endpoints.
#[derive(Debug, Clone)]
pub struct HereConfig {
    pub geocode_host: String,
    pub router_host: String,
    pub api_key: String,
}

impl HereConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            geocode_host: env::var("HERE_GEOCODE_HOST")
                .unwrap_or_else(|_| "https://geocode.search.hereapi.com".to_string()),
            router_host: env::var("HERE_ROUTER_HOST")
                .unwrap_or_else(|_| "https://router.hereapi.com".to_string()),
            api_key: env::var("HERE_API_KEY").context("HERE_API_KEY is not set")?,
        })
    }
}

/// Configuration for the warehouse SQL endpoint.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub host: String,
    pub token: String,
}

impl WarehouseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("SNOWFLAKE_HOST").context("SNOWFLAKE_HOST is not set")?,
            token: env::var("SNOWFLAKE_TOKEN").context("SNOWFLAKE_TOKEN is not set")?,
        })
    }
}
