//! Layered configuration.
//!
//! Three layers, in priority order: compiled defaults, an optional JSON
//! settings file, then `GABLE_*` environment variable overrides. The loaded
//! value is passed explicitly to the components that need it; there is no
//! global settings singleton.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Settings loading errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("failed to read settings file {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for the schema.
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// Root settings for the agent server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GableSettings {
    /// Network settings.
    pub server: ServerSettings,
    /// Database settings.
    pub database: DatabaseSettings,
    /// Generative provider settings.
    pub llm: LlmSettings,
    /// Notice generation settings.
    pub notices: NoticeSettings,
    /// Turn bounds.
    pub agent: AgentSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

impl Default for GableSettings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            llm: LlmSettings::default(),
            notices: NoticeSettings::default(),
            agent: AgentSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Network settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8385)),
        }
    }
}

/// Database settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// SQLite database file path.
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("gable.db"),
        }
    }
}

/// Generative provider settings. The API key is only ever read from the
/// environment, never from the settings file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmSettings {
    /// Messages-API base URL.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_owned(),
            model: "claude-sonnet-4-5".to_owned(),
            api_key_env: "ANTHROPIC_API_KEY".to_owned(),
        }
    }
}

/// Notice generation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoticeSettings {
    /// Directory rendered notice documents are written to.
    pub artifact_dir: PathBuf,
}

impl Default for NoticeSettings {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("notices"),
        }
    }
}

/// Turn bounds, mapped onto the runtime's `TurnConfig`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSettings {
    /// Maximum generative round-trips per turn.
    pub max_round_trips: usize,
    /// Per-round-trip timeout in seconds.
    pub llm_timeout_secs: u64,
    /// Output token cap per round-trip.
    pub max_tokens: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_round_trips: 4,
            llm_timeout_secs: 30,
            max_tokens: 1024,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `tracing_subscriber` env-filter directive.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

/// Load settings: defaults, then the file at `path` (if given and present),
/// then `GABLE_*` environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<GableSettings, SettingsError> {
    let mut settings = match path {
        Some(path) if path.exists() => {
            let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
                path: path.to_owned(),
                source,
            })?;
            let loaded = serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
                path: path.to_owned(),
                source,
            })?;
            info!(path = %path.display(), "settings loaded from file");
            loaded
        }
        _ => GableSettings::default(),
    };
    apply_env_overrides(&mut settings);
    Ok(settings)
}

fn apply_env_overrides(settings: &mut GableSettings) {
    if let Some(addr) = env_var("GABLE_BIND_ADDR").and_then(|v| v.parse().ok()) {
        settings.server.bind_addr = addr;
    }
    if let Some(path) = env_var("GABLE_DB_PATH") {
        settings.database.path = PathBuf::from(path);
    }
    if let Some(url) = env_var("GABLE_LLM_BASE_URL") {
        settings.llm.base_url = url;
    }
    if let Some(model) = env_var("GABLE_LLM_MODEL") {
        settings.llm.model = model;
    }
    if let Some(dir) = env_var("GABLE_ARTIFACT_DIR") {
        settings.notices.artifact_dir = PathBuf::from(dir);
    }
    if let Some(filter) = env_var("GABLE_LOG_FILTER") {
        settings.logging.filter = filter;
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn defaults_without_a_file() {
        let settings = load_settings(None).unwrap();
        assert_eq!(settings.agent.max_round_trips, 4);
        assert_eq!(settings.llm.api_key_env, "ANTHROPIC_API_KEY");
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"agent": {{"maxRoundTrips": 2}}, "llm": {{"model": "claude-haiku-4-5"}}}}"#
        )
        .unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.agent.max_round_trips, 2);
        assert_eq!(settings.agent.llm_timeout_secs, 30);
        assert_eq!(settings.llm.model, "claude-haiku-4-5");
        assert_eq!(settings.llm.base_url, "https://api.anthropic.com");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert_matches::assert_matches!(
            load_settings(Some(file.path())),
            Err(SettingsError::Parse { .. })
        );
    }

    #[test]
    fn missing_file_path_falls_back_to_defaults() {
        let settings = load_settings(Some(Path::new("/nonexistent/gable.json"))).unwrap();
        assert_eq!(settings.database.path, PathBuf::from("gable.db"));
    }
}
