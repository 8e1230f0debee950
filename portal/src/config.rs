//! Portal configuration loaded via OrthoConfig.
//!
//! [`PortalSettings`] is the raw layered input (configuration file and
//! `PORTAL_*` environment variables). [`PortalSettings::resolve`] validates it
//! into a [`PortalConfig`] the adapters consume.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEVELOPMENT_API_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STATE_DIR: &str = ".portal";

/// Deployment environment selecting the backend base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiEnvironment {
    /// Local backend on the development port.
    #[default]
    Development,
    /// Deployed backend; the base URL must be configured.
    Production,
}

impl ApiEnvironment {
    /// Lowercase name accepted in configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for ApiEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiEnvironment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::UnknownEnvironment {
                value: value.to_owned(),
            }),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Layered sources could not be merged.
    #[error("failed to load portal configuration: {message}")]
    Load {
        /// Loader diagnostic.
        message: String,
    },
    /// `environment` named neither development nor production.
    #[error("unknown environment `{value}`; expected development or production")]
    UnknownEnvironment {
        /// Rejected value.
        value: String,
    },
    /// Production was selected without a base URL.
    #[error("api_base_url must be set when environment is production")]
    MissingBaseUrl,
    /// The base URL did not parse or is not http(s).
    #[error("invalid api_base_url `{value}`: {message}")]
    InvalidBaseUrl {
        /// Rejected value.
        value: String,
        /// Parser diagnostic.
        message: String,
    },
    /// A timeout was configured as zero.
    #[error("{field} must be greater than zero")]
    ZeroTimeout {
        /// Offending setting name.
        field: &'static str,
    },
    /// The state directory is not valid UTF-8.
    #[error("state_dir must be valid UTF-8: {path}")]
    NonUtf8StateDir {
        /// Lossy rendering of the path.
        path: String,
    },
}

/// Raw configuration values for the portal client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// `development` or `production`.
    pub environment: Option<String>,
    /// Backend base URL override.
    pub api_base_url: Option<String>,
    /// Bound on startup token verification, in seconds.
    pub verify_timeout_secs: Option<u64>,
    /// Bound on every other backend request, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Directory holding the persisted admin token.
    pub state_dir: Option<PathBuf>,
}

impl PortalSettings {
    /// Load settings from the configuration file and environment only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a source is malformed.
    pub fn load_ambient() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("portal")]).map_err(|error| ConfigError::Load {
            message: error.to_string(),
        })
    }

    /// Selected environment, defaulting to development.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownEnvironment`] for unrecognised names.
    pub fn environment(&self) -> Result<ApiEnvironment, ConfigError> {
        self.environment
            .as_deref()
            .map_or(Ok(ApiEnvironment::default()), str::parse)
    }

    /// Verification bound, falling back to the default.
    pub fn verify_timeout_secs(&self) -> u64 {
        self.verify_timeout_secs
            .unwrap_or(DEFAULT_VERIFY_TIMEOUT_SECS)
    }

    /// Request bound, falling back to the default.
    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    /// State directory, falling back to the default.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
    }

    /// Validate into a [`PortalConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first invalid value.
    pub fn resolve(&self) -> Result<PortalConfig, ConfigError> {
        let environment = self.environment()?;
        let raw_url = match (environment, self.api_base_url.as_deref()) {
            (_, Some(url)) => url,
            (ApiEnvironment::Development, None) => DEVELOPMENT_API_BASE_URL,
            (ApiEnvironment::Production, None) => return Err(ConfigError::MissingBaseUrl),
        };
        let api_base_url = parse_base_url(raw_url)?;

        let verify_timeout = positive_secs("verify_timeout_secs", self.verify_timeout_secs())?;
        let request_timeout = positive_secs("request_timeout_secs", self.request_timeout_secs())?;

        let state_dir = self.state_dir();
        let state_dir =
            Utf8PathBuf::from_path_buf(state_dir).map_err(|path| ConfigError::NonUtf8StateDir {
                path: path.to_string_lossy().into_owned(),
            })?;

        Ok(PortalConfig {
            environment,
            api_base_url,
            verify_timeout,
            request_timeout,
            state_dir,
        })
    }
}

/// Validated configuration consumed by the adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Selected environment.
    pub environment: ApiEnvironment,
    /// Backend base URL; always ends with `/`.
    pub api_base_url: Url,
    /// Bound on startup token verification.
    pub verify_timeout: Duration,
    /// Bound on every other backend request.
    pub request_timeout: Duration,
    /// Directory holding the persisted admin token.
    pub state_dir: Utf8PathBuf,
}

impl PortalConfig {
    /// Load and validate configuration from the ambient environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        PortalSettings::load_ambient()?.resolve()
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidBaseUrl {
        value: raw.to_owned(),
        message,
    };
    let mut url = Url::parse(raw.trim()).map_err(|error| invalid(error.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn positive_secs(field: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::ZeroTimeout { field });
    }
    Ok(Duration::from_secs(secs))
}
