use std::path::{Path, PathBuf};

use chatdock::WidgetConfig;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu, ensure};

pub const CONFIG_DIRECTORY_NAME: &str = "chatdock";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const STATE_FILE_NAME: &str = "state.json";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const ENV_PREFIX: &str = "CHATDOCK_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Origin the widget's relative endpoint is resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where the session id is kept between runs.
    #[serde(default)]
    pub state_path: Option<PathBuf>,
    #[serde(default)]
    pub widget: WidgetConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            state_path: None,
            widget: WidgetConfig::default(),
        }
    }
}

impl CliConfig {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(CONFIG_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".chatdock"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(CONFIG_FILE_NAME)
    }

    /// Layers defaults, the JSON config file and `CHATDOCK_*` variables.
    ///
    /// Without `explicit_path` the default location is used and may be absent.
    /// An explicit path has to exist.
    pub fn load(explicit_path: Option<&Path>) -> ConfigResult<Self> {
        let path = match explicit_path {
            Some(path) => {
                ensure!(
                    path.exists(),
                    MissingFileSnafu {
                        stage: "locate-config-file",
                        path: path.to_path_buf(),
                    }
                );
                path.to_path_buf()
            }
            None => Self::default_config_path(),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if path.exists() {
            figment = figment.merge(Json::file(&path));
        } else {
            tracing::info!("config file not found at {:?}, using defaults", path);
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
            .context(ExtractSnafu {
                stage: "extract-config",
                path,
            })?;

        Ok(config.normalized())
    }

    /// Command-line flags win over every other layer.
    pub fn with_overrides(mut self, base_url: Option<String>, endpoint: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if let Some(endpoint) = endpoint {
            self.widget.endpoint = endpoint;
        }
        self.normalized()
    }

    /// Absolute URL for the chat endpoint.
    pub fn chat_url(&self) -> String {
        let endpoint = self.widget.endpoint.as_str();
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }

        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .unwrap_or_else(|| Self::default_config_dir().join(STATE_FILE_NAME))
    }

    fn normalized(mut self) -> Self {
        self.base_url = self.base_url.trim().to_string();
        if self.base_url.is_empty() {
            self.base_url = default_base_url();
        }
        self.widget = self.widget.normalized();
        self
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("config file {path:?} does not exist on `{stage}`"))]
    MissingFile { stage: &'static str, path: PathBuf },
    #[snafu(display("failed to load config from {path:?} on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        path: PathBuf,
        source: Box<figment::Error>,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn file_and_env_layers_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.json",
                r#"{
                    "base_url": "https://support.example.com",
                    "widget": { "history_limit": 4 }
                }"#,
            )?;
            jail.set_env("CHATDOCK_WIDGET__FALLBACK_MESSAGE", "Support is offline.");

            let config = CliConfig::load(Some(Path::new("config.json")))
                .map_err(|error| error.to_string())?;

            assert_eq!(config.base_url, "https://support.example.com");
            assert_eq!(config.widget.history_limit, 4);
            assert_eq!(config.widget.fallback_message, "Support is offline.");
            assert_eq!(config.widget.endpoint, "/chat");
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = CliConfig::load(Some(Path::new("/definitely/not/here/config.json")));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn chat_url_joins_base_and_endpoint() {
        let config = CliConfig::default();
        assert_eq!(config.chat_url(), "http://127.0.0.1:8000/chat");

        let config = config.with_overrides(
            Some("https://support.example.com/".to_string()),
            Some("api/chat".to_string()),
        );
        assert_eq!(config.chat_url(), "https://support.example.com/api/chat");

        let config = config.with_overrides(None, Some("https://other.example.com/chat".to_string()));
        assert_eq!(config.chat_url(), "https://other.example.com/chat");
    }
}
