use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "sanketbani.toml",
    "config/sanketbani.toml",
    "crates/config/sanketbani.toml",
    "../sanketbani.toml",
    "../config/sanketbani.toml",
    "backend/sanketbani.toml",
    "backend/config/sanketbani.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Behaviour of the realtime relay.
///
/// ```
/// use sanketbani_config::RelayConfig;
///
/// assert!(RelayConfig::default().echo_to_sender);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Deliver `receiveMessage` to the sending connection as well.
    #[serde(default = "RelayConfig::default_echo_to_sender")]
    pub echo_to_sender: bool,
}

impl RelayConfig {
    const fn default_echo_to_sender() -> bool {
        true
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            echo_to_sender: Self::default_echo_to_sender(),
        }
    }
}

/// Endpoints of the remote conversion providers.
///
/// ```
/// use sanketbani_config::ProvidersConfig;
///
/// let providers = ProvidersConfig::default();
/// assert_eq!(providers.request_timeout_seconds, 30);
/// assert!(providers.translate_url.is_none());
/// assert!(providers.api_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub translate_url: Option<String>,
    #[serde(default)]
    pub speech_to_text_url: Option<String>,
    #[serde(default)]
    pub image_to_text_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "ProvidersConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ProvidersConfig {
    const fn default_request_timeout() -> u64 {
        30
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            translate_url: None,
            speech_to_text_url: None,
            image_to_text_url: None,
            api_key: None,
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use sanketbani_config::load;
///
/// std::env::remove_var("SANKETBANI_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let request_timeout =
        i64::try_from(defaults.providers.request_timeout_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("relay.echo_to_sender", defaults.relay.echo_to_sender)?
        .set_default("providers.request_timeout_seconds", request_timeout)?;

    let environment_overrides = config::Environment::with_prefix("SANKETBANI").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("SANKETBANI_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via SANKETBANI_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.providers.request_timeout_seconds == 0 {
        config.providers.request_timeout_seconds = ProvidersConfig::default_request_timeout();
    }

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
