// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for Baxter
//!
//! Handles loading and saving settings from ~/.baxter/settings.json.
//! Settings are loaded once at startup and passed by reference; nothing in
//! the runtime reads configuration through globals.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

/// Main settings structure, stored in ~/.baxter/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Upstream completion API configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Generation parameters for completion requests
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Default conversation context for new sessions
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Configuration for the upstream chat completion API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Chat completions endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default model to use
    #[serde(default = "default_model")]
    pub default_model: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            default_model: default_model(),
        }
    }
}

/// Generation parameters applied to every completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum tokens in a response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Seconds to wait for the next stream fragment before failing the turn
    #[serde(default = "default_stall_timeout_secs")]
    pub stall_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            stall_timeout_secs: default_stall_timeout_secs(),
        }
    }
}

/// Default conversation context for new sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Perspective the assistant is helping (e.g. "Senior PM")
    #[serde(default = "default_user_role")]
    pub user_role: String,

    /// Company/business context injected into prompts (may be empty)
    #[serde(default)]
    pub company_context: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            user_role: default_user_role(),
            company_context: String::new(),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Override for the SQLite database path (defaults to ~/.baxter/baxter.db)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

fn default_stall_timeout_secs() -> u64 {
    120
}

fn default_user_role() -> String {
    "Senior PM".to_string()
}

impl Settings {
    /// Get the default settings file path.
    pub fn default_path() -> PathBuf {
        Self::baxter_home().join("settings.json")
    }

    /// Load settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load settings from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the baxter home directory (~/.baxter or $BAXTER_HOME).
    pub fn baxter_home() -> PathBuf {
        if let Ok(home) = std::env::var("BAXTER_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".baxter")
    }

    /// Ensure the home directory exists.
    pub fn ensure_directories() -> Result<()> {
        std::fs::create_dir_all(Self::baxter_home())?;
        Ok(())
    }

    /// Resolve the API key: direct value first, then the configured env var.
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.upstream.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var(&self.upstream.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
    }

    /// Resolve the SQLite database path.
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::baxter_home().join("baxter.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.upstream.api_key_env, "OPENAI_API_KEY");
        assert_eq!(settings.upstream.default_model, "gpt-4o");
        assert!(settings.upstream.base_url.contains("chat/completions"));
        assert_eq!(settings.generation.max_tokens, 4096);
        assert!((settings.generation.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(settings.generation.stall_timeout_secs, 120);
        assert_eq!(settings.defaults.user_role, "Senior PM");
        assert!(settings.defaults.company_context.is_empty());
    }

    #[test]
    fn test_settings_load_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.upstream.default_model, "gpt-4o");
    }

    #[test]
    fn test_settings_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.upstream.default_model = "gpt-4o-mini".to_string();
        settings.defaults.user_role = "Tech Lead".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.upstream.default_model, "gpt-4o-mini");
        assert_eq!(loaded.defaults.user_role, "Tech Lead");
    }

    #[test]
    fn test_settings_load_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{"upstream": {"default_model": "gpt-4.1"}}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.upstream.default_model, "gpt-4.1");
        // Untouched sections come from defaults
        assert_eq!(settings.generation.max_tokens, 4096);
        assert_eq!(settings.upstream.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_get_api_key_prefers_direct_value() {
        let mut settings = Settings::default();
        settings.upstream.api_key = Some("sk-direct".to_string());
        settings.upstream.api_key_env = "BAXTER_TEST_KEY_UNSET_12345".to_string();
        assert_eq!(settings.get_api_key(), Some("sk-direct".to_string()));
    }

    #[test]
    fn test_get_api_key_missing_everywhere() {
        let mut settings = Settings::default();
        settings.upstream.api_key = None;
        settings.upstream.api_key_env = "BAXTER_TEST_KEY_UNSET_12345".to_string();
        assert_eq!(settings.get_api_key(), None);
    }

    #[test]
    fn test_get_api_key_empty_direct_value_ignored() {
        let mut settings = Settings::default();
        settings.upstream.api_key = Some(String::new());
        settings.upstream.api_key_env = "BAXTER_TEST_KEY_UNSET_12345".to_string();
        assert_eq!(settings.get_api_key(), None);
    }

    #[test]
    fn test_database_path_override() {
        let mut settings = Settings::default();
        assert!(settings
            .database_path()
            .to_string_lossy()
            .ends_with("baxter.db"));

        settings.storage.database_path = Some(PathBuf::from("/tmp/custom.db"));
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/custom.db"));
    }
}
