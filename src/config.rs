//! Environment configuration.

use std::env;
use std::path::PathBuf;

use chat_api::DEFAULT_BASE_URL;

pub const API_BASE_URL_VAR: &str = "AGENT_CHAT_API_BASE_URL";
pub const STORAGE_DIR_VAR: &str = "AGENT_CHAT_STORAGE_DIR";
pub const LOG_FILTER_VAR: &str = "AGENT_CHAT_LOG";
const FALLBACK_LOG_FILTER_VAR: &str = "RUST_LOG";

pub const DEFAULT_STORAGE_DIR: &str = "./.agent_chat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub api_base_url: String,
    pub storage_dir: PathBuf,
    pub log_filter: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env_string_opt(API_BASE_URL_VAR)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            storage_dir: env_string_opt(STORAGE_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR)),
            log_filter: env_string_opt(LOG_FILTER_VAR)
                .or_else(|| env_string_opt(FALLBACK_LOG_FILTER_VAR)),
        }
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
