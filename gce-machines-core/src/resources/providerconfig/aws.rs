use serde::{Deserialize, Serialize};

use super::{ProviderConfig, ProviderConfigKind};

pub const AWS_PROVIDER_CONFIG_API_VERSION: &str = "awsproviderconfig/v1alpha1";
pub const AWS_PROVIDER_CONFIG_KIND: &str = "AWSProviderConfig";

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AwsProviderConfig {
    pub region: String,
    pub instance_type: String,
    pub ami: String,
}

impl ProviderConfigKind for AwsProviderConfig {
    const API_VERSION: &'static str = AWS_PROVIDER_CONFIG_API_VERSION;
    const KIND: &'static str = AWS_PROVIDER_CONFIG_KIND;

    fn from_config(config: ProviderConfig) -> Result<Self, ProviderConfig> {
        match config {
            ProviderConfig::Aws(config) => Ok(config),
            other => Err(other),
        }
    }
}
