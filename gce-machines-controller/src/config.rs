use std::{borrow::Cow, env::var, time::Duration};

use thiserror::Error;

use crate::compute::gce::{DEFAULT_COMPUTE_ENDPOINT, DEFAULT_METADATA_ENDPOINT};

pub const NAMESPACE_ENV: &str = "MACHINES_CONTROLLER_NAMESPACE";
pub const CALL_TIMEOUT_ENV: &str = "MACHINES_CONTROLLER_CALL_TIMEOUT_SECS";
pub const COMPUTE_ENDPOINT_ENV: &str = "GCE_COMPUTE_ENDPOINT";
pub const METADATA_ENDPOINT_ENV: &str = "GCE_METADATA_ENDPOINT";
pub const ACCESS_TOKEN_ENV: &str = "GCE_ACCESS_TOKEN";

const DEFAULT_CALL_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// namespace to watch machines in, all namespaces when unset
    pub namespace: Option<String>,
    /// upper bound for a single compute API call
    pub call_timeout: Duration,
    pub gce: GceConfig,
}

#[derive(Clone)]
pub struct GceConfig {
    pub compute_endpoint: String,
    pub metadata_endpoint: String,
    pub access_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("'{}' has an invalid value: {}", .0, .1)]
    InvalidValue(&'static str, Cow<'static, str>),
}

impl ControllerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Ok(Self {
            namespace: lookup(NAMESPACE_ENV),
            call_timeout: match lookup(CALL_TIMEOUT_ENV) {
                Some(raw) => parse_timeout(&raw)?,
                None => Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
            },
            gce: GceConfig {
                compute_endpoint: lookup(COMPUTE_ENDPOINT_ENV)
                    .unwrap_or_else(|| DEFAULT_COMPUTE_ENDPOINT.to_owned()),
                metadata_endpoint: lookup(METADATA_ENDPOINT_ENV)
                    .unwrap_or_else(|| DEFAULT_METADATA_ENDPOINT.to_owned()),
                access_token: lookup(ACCESS_TOKEN_ENV),
            },
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue(
            CALL_TIMEOUT_ENV,
            "timeout must be greater than zero".into(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(error) => Err(ConfigError::InvalidValue(
            CALL_TIMEOUT_ENV,
            error.to_string().into(),
        )),
    }
}

impl std::fmt::Debug for GceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GceConfig")
            .field("compute_endpoint", &self.compute_endpoint)
            .field("metadata_endpoint", &self.metadata_endpoint)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
