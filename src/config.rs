//! Environment-driven configuration.
//!
//! Everything is read from the process environment, optionally seeded from a
//! dotenv file first. Empty variables are treated as unset so that `VAR=`
//! lines in a `.env` behave the same as absent ones.

use std::path::{Path, PathBuf};
use std::time::Duration;

use paleo_core::PaleoError;
use tracing::debug;

/// WSDL location of the Regione Marche Paleo 2020 deployment. The
/// `singleWsdl` query makes the service publish one flattened document with
/// every schema inlined.
pub const DEFAULT_WSDL_URL: &str =
    "https://paleows.regione.marche.it/PaleoWebServices2020R_Marche/PaleoWebService2.svc?singleWsdl";

pub const DEFAULT_ENV_FILE: &str = ".env";

const DEFAULT_OUTPUT_DIR: &str = "downloads";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct PaleoConfig {
    pub wsdl_url: String,
    pub username: String,
    pub password: String,
    pub org_code: String,
    pub fascicolo_id: String,
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub list_method: Option<String>,
    pub download_method: Option<String>,
    pub service_name: Option<String>,
    pub port_name: Option<String>,
}

impl PaleoConfig {
    /// Load from the process environment, seeded from `./.env` when present.
    pub fn from_env() -> Result<Self, PaleoError> {
        Self::from_env_path(Path::new(DEFAULT_ENV_FILE))
    }

    /// Load from the process environment, seeding it from `env_file` first.
    /// A missing dotenv file is not an error, and variables already exported
    /// take precedence over file entries.
    pub fn from_env_path(env_file: &Path) -> Result<Self, PaleoError> {
        if dotenvy::from_path(env_file).is_err() {
            debug!(path = %env_file.display(), "no dotenv file loaded");
        }

        Ok(Self {
            wsdl_url: optional("PALEO_WSDL_URL").unwrap_or_else(|| DEFAULT_WSDL_URL.to_string()),
            username: require("PALEO_USERNAME")?,
            password: require("PALEO_PASSWORD")?,
            org_code: require("PALEO_ORG_CODE")?,
            fascicolo_id: require("PALEO_FASCICOLO_ID")?,
            output_dir: optional("PALEO_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            timeout: Duration::from_secs(parse_secs(
                "PALEO_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            list_method: optional("PALEO_LIST_METHOD"),
            download_method: optional("PALEO_DOWNLOAD_METHOD"),
            service_name: optional("PALEO_SERVICE_NAME"),
            port_name: optional("PALEO_PORT_NAME"),
        })
    }

    /// Explicit service/port binding, available only when both halves are
    /// configured.
    pub fn binding(&self) -> Option<(&str, &str)> {
        match (&self.service_name, &self.port_name) {
            (Some(service), Some(port)) => Some((service.as_str(), port.as_str())),
            _ => None,
        }
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn require(name: &'static str) -> Result<String, PaleoError> {
    optional(name).ok_or(PaleoError::MissingConfig(name))
}

fn parse_secs(name: &'static str, default: u64) -> Result<u64, PaleoError> {
    match optional(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| PaleoError::InvalidConfig {
            name,
            reason: format!("expected a number of seconds, got '{raw}'"),
        }),
    }
}
