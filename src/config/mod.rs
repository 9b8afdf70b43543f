use std::{
    env, fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use url::Url;

use crate::{
    error::{AkkiError, InvalidConfigSnafu},
    utils::Ellipse,
};

pub const CONFIG_NAME: &str = "akkichat.toml";
pub const ENV_PREFIX: &str = "AKKICHAT_";
pub const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Origins allowed to call the service from a browser
pub const DEFAULT_CORS_ORIGINS: [&str; 5] = [
    "https://nimble-gnome-f8228f.netlify.app/home",
    "http://localhost:5173",
    "https://api.akki.ai/run",
    "https://beta.akki.ai/",
    "https://beta.akki.ai",
];

/// Unprefixed variable names understood for compatibility with existing
/// deployments, mapped to their config field
const LEGACY_ENV: [(&str, &str); 5] = [
    ("ANTHROPIC_API", "anthropic_api_key"),
    ("CHAT_USERNAME", "username"),
    ("CHAT_PASSWORD", "password"),
    ("API_KEY", "api_key"),
    ("SECRET_KEY", "secret_key"),
];

/// String fields taken verbatim from the environment. Figment's env parser
/// would read `0042` as an integer, `true` as a bool and trim padding.
const VERBATIM_FIELDS: [&str; 7] = [
    "anthropic_api_key",
    "username",
    "password",
    "api_key",
    "secret_key",
    "model",
    "proxy",
];

fn default_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8000
}

fn default_endpoint() -> Url {
    Url::parse(ANTHROPIC_ENDPOINT).expect("static endpoint is a valid url")
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    300
}

fn default_cors_origins() -> Vec<String> {
    DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()
}

/// Process-wide configuration, built once at startup and shared read-only
#[derive(Clone, Serialize, Deserialize)]
pub struct AkkiConfig {
    #[serde(default = "default_ip")]
    pub ip: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,

    // Provider
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub anthropic_endpoint: Url,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    // Gate credentials, all required
    pub username: String,
    pub password: String,
    pub api_key: String,
    pub secret_key: String,

    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl fmt::Debug for AkkiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AkkiConfig")
            .field("ip", &self.ip)
            .field("port", &self.port)
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_deref().map(|k| k.ellipse()),
            )
            .field("anthropic_endpoint", &self.anthropic_endpoint.as_str())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("proxy", &self.proxy)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cors_origins", &self.cors_origins)
            .field("username", &self.username)
            .field("password", &"***")
            .field("api_key", &self.api_key.ellipse())
            .field("secret_key", &"***")
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl AkkiConfig {
    /// Loads the TOML file, then `AKKICHAT_*` variables,
    /// then the legacy unprefixed variables
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AkkiError> {
        let config: AkkiConfig = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment(path: impl AsRef<Path>) -> Figment {
        let mut figment = Figment::from(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&VERBATIM_FIELDS));
        for field in VERBATIM_FIELDS {
            let name = format!("{ENV_PREFIX}{}", field.to_ascii_uppercase());
            if let Ok(value) = env::var(name) {
                figment = figment.merge(Serialized::default(field, value));
            }
        }
        for (name, field) in LEGACY_ENV {
            if let Ok(value) = env::var(name) {
                figment = figment.merge(Serialized::default(field, value));
            }
        }
        figment
    }

    /// Rejects empty credentials; an empty API key would let a request
    /// without the header through
    pub fn validate(&self) -> Result<(), AkkiError> {
        for (name, value) in [
            ("username", &self.username),
            ("password", &self.password),
            ("api_key", &self.api_key),
            ("secret_key", &self.secret_key),
        ] {
            ensure!(
                !value.is_empty(),
                InvalidConfigSnafu {
                    msg: format!("`{name}` must not be empty"),
                }
            );
        }
        ensure!(
            self.max_tokens > 0,
            InvalidConfigSnafu {
                msg: "`max_tokens` must be greater than zero",
            }
        );
        ensure!(
            !self.model.trim().is_empty(),
            InvalidConfigSnafu {
                msg: "`model` must not be empty",
            }
        );
        Ok(())
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `v1/messages` appended to the configured endpoint, keeping any path
    /// prefix it already has
    pub fn messages_url(&self) -> Result<Url, AkkiError> {
        let mut url = self.anthropic_endpoint.to_owned();
        url.path_segments_mut()
            .map_err(|_| AkkiError::InvalidConfig {
                msg: format!(
                    "anthropic endpoint {} cannot carry a path",
                    self.anthropic_endpoint
                ),
            })?
            .pop_if_empty()
            .extend(["v1", "messages"]);
        Ok(url)
    }
}
