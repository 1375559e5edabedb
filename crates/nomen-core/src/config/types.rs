//! Configuration type definitions
//!
//! Every section is optional in YAML and falls back to the defaults below, so
//! an empty document is a valid configuration. Command-line flags are applied
//! on top by the binary.

use crate::assembler::{UnresolvedPolicy, DEFAULT_PLACEHOLDER};
use crate::errors::NomenError;
use crate::fetcher::DEFAULT_DEFINITION_PATTERN;
use crate::markers::Delimiters;
use crate::resolver::ResolutionMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NomenConfig {
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    #[serde(default)]
    pub requests: RequestConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub markers: Delimiters,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryConfig {
    #[serde(default = "default_dictionary_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RequestConfig {
    #[serde(default)]
    pub terms: Vec<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default)]
    pub mode: ResolutionMode,
    #[serde(default = "default_external_url_template")]
    pub external_url_template: String,
    #[serde(default = "default_external_anchor")]
    pub external_anchor: Option<String>,
    #[serde(default)]
    pub unresolved: UnresolvedPolicy,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_definition_pattern")]
    pub definition_pattern: String,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub metadata_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_dictionary_path() -> PathBuf {
    PathBuf::from("goldbook_terms.json")
}
fn default_output_path() -> PathBuf {
    PathBuf::from("extracted_terms.csv")
}
fn default_external_url_template() -> String {
    "https://goldbook.iupac.org/terms/view/{id}/json".to_string()
}
fn default_external_anchor() -> Option<String> {
    Some("\"title\":".to_string())
}
fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!("nomen/{}", env!("CARGO_PKG_VERSION"))
}
fn default_definition_pattern() -> String {
    DEFAULT_DEFINITION_PATTERN.to_string()
}
fn default_concurrency() -> usize {
    1
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: default_dictionary_path(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            mode: ResolutionMode::default(),
            external_url_template: default_external_url_template(),
            external_anchor: default_external_anchor(),
            unresolved: UnresolvedPolicy::default(),
            placeholder: default_placeholder(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            definition_pattern: default_definition_pattern(),
            concurrency: default_concurrency(),
            metadata_only: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl NomenConfig {
    pub fn validate(&self) -> Result<(), NomenError> {
        if self.dictionary.path.as_os_str().is_empty() {
            return Err(NomenError::ConfigError("Dictionary path cannot be empty".to_string()));
        }

        if self.output.path.as_os_str().is_empty() {
            return Err(NomenError::ConfigError("Output path cannot be empty".to_string()));
        }

        if self.markers.open.is_empty() || self.markers.close.is_empty() {
            return Err(NomenError::ConfigError("Marker delimiters cannot be empty".to_string()));
        }

        if self.resolution.mode.needs_external()
            && !self.resolution.external_url_template.contains("{id}")
        {
            return Err(NomenError::ConfigError(format!(
                "External URL template '{}' must contain an {{id}} placeholder",
                self.resolution.external_url_template
            )));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(NomenError::ConfigError("Fetch timeout must be greater than 0".to_string()));
        }

        if self.fetch.concurrency == 0 {
            return Err(NomenError::ConfigError(
                "Fetch concurrency must be greater than 0".to_string(),
            ));
        }

        if self.fetch.user_agent.trim().is_empty() {
            return Err(NomenError::ConfigError("User agent cannot be empty".to_string()));
        }

        Ok(())
    }
}
