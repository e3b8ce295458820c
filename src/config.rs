use crate::error::Result;
use crate::search::Dialect;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Search behaviour
    #[serde(default)]
    pub search: SearchSettings,

    /// Widget settings embedded into host pages
    #[serde(default)]
    pub widget: WidgetConfig,

    /// Issue display formatting
    #[serde(default)]
    pub display: DisplayConfig,

    /// Issue store configuration
    pub storage: StorageConfig,

    /// Session handling
    #[serde(default)]
    pub auth: AuthConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the embedded defaults, `CONFIG_PATH` and environment
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Load configuration with an explicit override file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::from(path.to_path_buf()).required(false))
            // Override with environment variables, e.g. ISSUE_AC__SEARCH__MIN_SEARCH_LENGTH
            .add_source(
                config::Environment::with_prefix("ISSUE_AC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the sections that carry constraints
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.display.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Path of the issue search endpoint
    #[serde(default = "default_search_path")]
    pub search_path: String,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Server-side search settings, read-only after load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SearchSettings {
    /// Terms shorter than this are never sent to the server
    #[validate(range(min = 1, max = 64))]
    #[serde(default = "default_min_search_length")]
    pub min_search_length: usize,

    /// Hard cap on returned rows
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_search_issue_limit")]
    pub search_issue_limit: u32,

    /// Status codes never returned
    #[serde(default = "default_exclude_view_states")]
    pub exclude_view_states: Vec<i32>,

    /// Optional searchable columns; summary is always searched
    #[serde(default)]
    pub search_by_fields: SearchFields,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_search_length: default_min_search_length(),
            search_issue_limit: default_search_issue_limit(),
            exclude_view_states: default_exclude_view_states(),
            search_by_fields: SearchFields::default(),
        }
    }
}

/// Which optional columns participate in the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFields {
    #[serde(default = "default_true")]
    pub id: bool,

    #[serde(default)]
    pub description: bool,

    #[serde(default)]
    pub additional_information: bool,
}

impl Default for SearchFields {
    fn default() -> Self {
        Self {
            id: true,
            description: false,
            additional_information: false,
        }
    }
}

/// Settings the host page embeds for the autocomplete widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default)]
    pub autocomplete_issue_window_settings: WindowSettings,

    /// Names of the inputs that get autocomplete
    #[serde(default = "default_search_input_names")]
    pub search_input_names: Vec<String>,

    /// Glyph rendered between row fields, may contain markup
    #[serde(default = "default_field_separator")]
    pub field_separator: String,

    /// Submit the input's form after a selection
    #[serde(default = "default_true")]
    pub submit_on_select: bool,

    #[serde(default)]
    pub messages: WidgetMessages,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            autocomplete_issue_window_settings: WindowSettings::default(),
            search_input_names: default_search_input_names(),
            field_separator: default_field_separator(),
            submit_on_select: true,
            messages: WidgetMessages::default(),
        }
    }
}

/// Overlay sizing as CSS strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowSettings {
    pub width: String,
    pub height: String,
    pub background: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: "60%".to_string(),
            height: "50%".to_string(),
            background: "rgba(0, 0, 0, 0.8)".to_string(),
        }
    }
}

/// Pre-localized widget messages.
///
/// `min_search_length_message` may contain `{min}`, replaced with the
/// configured minimum search length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetMessages {
    #[serde(default = "default_min_search_length_message")]
    pub min_search_length_message: String,

    #[serde(default = "default_no_issue_found_message")]
    pub no_issue_found_message: String,

    #[serde(default = "default_search_for_issue_message")]
    pub search_for_issue_message: String,

    #[serde(default = "default_search_failed_message")]
    pub search_failed_message: String,
}

impl Default for WidgetMessages {
    fn default() -> Self {
        Self {
            min_search_length_message: default_min_search_length_message(),
            no_issue_found_message: default_no_issue_found_message(),
            search_for_issue_message: default_search_for_issue_message(),
            search_failed_message: default_search_failed_message(),
        }
    }
}

/// How issues are presented in results
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DisplayConfig {
    /// Zero padding width of issue ids
    #[validate(range(max = 20))]
    #[serde(default = "default_id_padding")]
    pub id_padding: usize,

    /// Status code to label mapping, `code:label` pairs separated by commas
    #[validate(length(min = 1))]
    #[serde(default = "default_status_enum_string")]
    pub status_enum_string: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            id_padding: default_id_padding(),
            status_enum_string: default_status_enum_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend type
    #[serde(default)]
    pub backend: StorageBackend,

    /// SQL dialect the store speaks
    #[serde(default)]
    pub dialect: Dialect,

    /// JSON fixture with issues, projects and users for the in-memory backend
    pub seed_path: Option<PathBuf>,

    /// Table name prefix (`<prefix>bug<suffix>`)
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,

    /// Table name suffix
    #[serde(default = "default_table_suffix")]
    pub table_suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Cookie holding the session token
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie: default_session_cookie(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_search_path() -> String {
    "/plugin/issue-search".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_min_search_length() -> usize {
    3
}

fn default_search_issue_limit() -> u32 {
    100
}

fn default_exclude_view_states() -> Vec<i32> {
    vec![90]
}

fn default_true() -> bool {
    true
}

fn default_search_input_names() -> Vec<String> {
    vec!["dest_bug_id".to_string(), "bug_id".to_string()]
}

fn default_field_separator() -> String {
    "&#x276F;".to_string()
}

fn default_min_search_length_message() -> String {
    "Type at least {min} characters to search".to_string()
}

fn default_no_issue_found_message() -> String {
    "No issues found".to_string()
}

fn default_search_for_issue_message() -> String {
    "Search for issue".to_string()
}

fn default_search_failed_message() -> String {
    "Search failed, please try again".to_string()
}

fn default_id_padding() -> usize {
    7
}

fn default_status_enum_string() -> String {
    "10:new,20:feedback,30:acknowledged,40:confirmed,50:assigned,80:resolved,90:closed"
        .to_string()
}

fn default_table_prefix() -> String {
    "mantis_".to_string()
}

fn default_table_suffix() -> String {
    "_table".to_string()
}

fn default_session_cookie() -> String {
    "MANTIS_STRING_COOKIE".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "issue-autocomplete".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_http_port(), 8080);
        assert_eq!(default_min_search_length(), 3);
        assert_eq!(default_search_issue_limit(), 100);
        assert_eq!(default_log_level(), "info");
        assert!(default_true());
    }

    #[test]
    fn test_default_search_fields() {
        let fields = SearchFields::default();
        assert!(fields.id);
        assert!(!fields.description);
        assert!(!fields.additional_information);
    }

    #[test]
    fn test_search_settings_validation() {
        let mut settings = SearchSettings::default();
        assert!(settings.validate().is_ok());

        settings.min_search_length = 0;
        assert!(settings.validate().is_err());

        settings.min_search_length = 3;
        settings.search_issue_limit = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_with_file_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[search]\nmin_search_length = 5\nexclude_view_states = [80, 90]\n\n[storage]\ndialect = \"mysql\""
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.search.min_search_length, 5);
        assert_eq!(config.search.exclude_view_states, vec![80, 90]);
        assert_eq!(config.storage.dialect, Dialect::Mysql);
        assert_eq!(config.server.search_path, "/plugin/issue-search");
    }

    #[test]
    fn test_env_override_requires_double_underscore_after_prefix() {
        std::env::set_var("ISSUE_AC_OBSERVABILITY__SERVICE_NAME", "single");
        std::env::set_var("ISSUE_AC__OBSERVABILITY__SERVICE_NAME", "from-env");

        let config = Config::load_from(Path::new("/nonexistent/override.toml"));

        std::env::remove_var("ISSUE_AC_OBSERVABILITY__SERVICE_NAME");
        std::env::remove_var("ISSUE_AC__OBSERVABILITY__SERVICE_NAME");

        assert_eq!(config.unwrap().observability.service_name, "from-env");
    }

    #[test]
    fn test_load_rejects_invalid_limit() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[search]\nsearch_issue_limit = 5000").unwrap();

        assert!(Config::load_from(file.path()).is_err());
    }
}
