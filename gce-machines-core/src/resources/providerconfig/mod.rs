use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use self::{
    aws::{AwsProviderConfig, AWS_PROVIDER_CONFIG_API_VERSION, AWS_PROVIDER_CONFIG_KIND},
    gce::{GceProviderConfig, GCE_PROVIDER_CONFIG_API_VERSION, GCE_PROVIDER_CONFIG_KIND},
};

pub mod aws;
pub mod gce;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Couldn't parse the provider config! Reason: {}", .0)]
    Malformed(serde_yaml::Error),
    #[error("Provider config is missing '{}'!", .0)]
    MissingTypeMeta(&'static str),
    #[error("Provider config kind '{}/{}' is not recognized!", .api_version, .kind)]
    UnknownKind { api_version: String, kind: String },
    #[error("Provider config is of the wrong type! Expected '{}', got '{}'", .expected, .actual)]
    TypeMismatch { expected: String, actual: String },
}

/// Every provider configuration kind the universal decoder recognizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderConfig {
    Gce(GceProviderConfig),
    Aws(AwsProviderConfig),
}

/// A concrete provider configuration type, identified by its `apiVersion` and `kind` tags.
pub trait ProviderConfigKind: Sized {
    const API_VERSION: &'static str;
    const KIND: &'static str;

    /// Narrows a decoded config to this type, handing the config back when it's of another kind.
    fn from_config(config: ProviderConfig) -> Result<Self, ProviderConfig>;

    fn type_name() -> String {
        format!("{}/{}", Self::API_VERSION, Self::KIND)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypeMeta {
    api_version: Option<String>,
    kind: Option<String>,
}

impl ProviderConfig {
    pub fn api_version(&self) -> &'static str {
        match self {
            ProviderConfig::Gce(_) => GceProviderConfig::API_VERSION,
            ProviderConfig::Aws(_) => AwsProviderConfig::API_VERSION,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProviderConfig::Gce(_) => GceProviderConfig::KIND,
            ProviderConfig::Aws(_) => AwsProviderConfig::KIND,
        }
    }

    pub fn type_name(&self) -> String {
        format!("{}/{}", self.api_version(), self.kind())
    }
}

/// Decodes a YAML or JSON provider config blob into whichever known kind its
/// `apiVersion` and `kind` tags select.
pub fn decode_universal(blob: &str) -> Result<ProviderConfig, DecodeError> {
    let type_meta: RawTypeMeta = serde_yaml::from_str(blob).map_err(DecodeError::Malformed)?;
    let api_version = type_meta
        .api_version
        .ok_or(DecodeError::MissingTypeMeta("apiVersion"))?;
    let kind = type_meta.kind.ok_or(DecodeError::MissingTypeMeta("kind"))?;

    match (api_version.as_str(), kind.as_str()) {
        (GCE_PROVIDER_CONFIG_API_VERSION, GCE_PROVIDER_CONFIG_KIND) => {
            Ok(ProviderConfig::Gce(deserialize(blob)?))
        }
        (AWS_PROVIDER_CONFIG_API_VERSION, AWS_PROVIDER_CONFIG_KIND) => {
            Ok(ProviderConfig::Aws(deserialize(blob)?))
        }
        _ => Err(DecodeError::UnknownKind { api_version, kind }),
    }
}

fn deserialize<T: DeserializeOwned>(blob: &str) -> Result<T, DecodeError> {
    serde_yaml::from_str(blob).map_err(DecodeError::Malformed)
}

/// Decoder bound to exactly one provider config kind. Blobs of any other kind,
/// known or not, are rejected.
#[derive(Debug)]
pub struct ProviderConfigDecoder<T> {
    kind: PhantomData<fn() -> T>,
}

impl<T: ProviderConfigKind> ProviderConfigDecoder<T> {
    pub fn new() -> Self {
        Self { kind: PhantomData }
    }

    pub fn decode(&self, blob: &str) -> Result<T, DecodeError> {
        let config = decode_universal(blob)?;

        T::from_config(config).map_err(|actual| DecodeError::TypeMismatch {
            expected: T::type_name(),
            actual: actual.type_name(),
        })
    }
}

impl<T: ProviderConfigKind> Default for ProviderConfigDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}
