//! Configuration loading and management for localclaw.
//!
//! Loads settings from `~/.localclaw/config.toml`, falling back to defaults
//! for anything missing. `LOCALCLAW_HOME` overrides the data directory,
//! which also holds the to-do file and the long-term memory file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Basic information about the human user, woven into the system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default = "default_user_name")]
    pub name: String,

    /// Free-form notes about the user ("lives in Berlin, prefers metric").
    #[serde(default)]
    pub info: String,
}

fn default_user_name() -> String {
    "User".into()
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: default_user_name(),
            info: String::new(),
        }
    }
}

/// Controls the agent's character and behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPersona {
    #[serde(default = "default_persona_name")]
    pub name: String,

    #[serde(default = "default_persona_role")]
    pub role: String,

    /// Extra instructions appended to the system prompt.
    #[serde(default)]
    pub system_instructions: String,
}

fn default_persona_name() -> String {
    "Claw".into()
}
fn default_persona_role() -> String {
    "Personal Assistant".into()
}

impl Default for AgentPersona {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            role: default_persona_role(),
            system_instructions: String::new(),
        }
    }
}

/// Connection and generation parameters for the Ollama backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Token budget for the short-term transcript window.
    #[serde(default = "default_context_window")]
    pub context_window: usize,
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "phi4-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_context_window() -> usize {
    4096
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            context_window: default_context_window(),
        }
    }
}

/// Long-term memory recall tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum recalled facts injected per turn.
    #[serde(default = "default_recall_limit")]
    pub recall_limit: usize,

    /// Results at or above this cosine distance are discarded as noise.
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f32,
}

fn default_recall_limit() -> usize {
    5
}
fn default_distance_threshold() -> f32 {
    1.0
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            recall_limit: default_recall_limit(),
            distance_threshold: default_distance_threshold(),
        }
    }
}

/// Top-level container for all application settings.
///
/// Maps directly to `~/.localclaw/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub user: UserProfile,

    #[serde(default)]
    pub persona: AgentPersona,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub memory: MemoryConfig,
}

impl AppSettings {
    /// The data directory: `$LOCALCLAW_HOME` or `~/.localclaw`.
    pub fn data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("LOCALCLAW_HOME") {
            return PathBuf::from(dir);
        }
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".localclaw")
    }

    /// Default config file path inside the data directory.
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Path of the to-do persistence file.
    pub fn todos_path() -> PathBuf {
        Self::data_dir().join("todos.json")
    }

    /// Path of the long-term memory file.
    pub fn memory_path() -> PathBuf {
        Self::data_dir().join("memory.jsonl")
    }

    /// Load settings from the default path; defaults if the file is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from an explicit path; defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        debug!(path = %path.display(), "Loaded config");
        Ok(settings)
    }

    /// Persist settings to the given path as TOML.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
