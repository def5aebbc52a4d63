use serde::{Deserialize, Serialize};

use super::{ProviderConfig, ProviderConfigKind};

pub const GCE_PROVIDER_CONFIG_API_VERSION: &str = "gceproviderconfig/v1alpha1";
pub const GCE_PROVIDER_CONFIG_KIND: &str = "GCEProviderConfig";

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GceProviderConfig {
    /// GCP project the instance lives in
    pub project: String,
    /// zone the instance is scheduled in, e.g. us-central1-a
    pub zone: String,
    /// machine type name, without the zone prefix
    pub machine_type: String,
    /// boot disk source image
    pub image: String,
}

impl GceProviderConfig {
    /// Zone-qualified machine type, the form the compute API expects.
    pub fn qualified_machine_type(&self) -> String {
        format!("zones/{}/machineTypes/{}", self.zone, self.machine_type)
    }
}

impl ProviderConfigKind for GceProviderConfig {
    const API_VERSION: &'static str = GCE_PROVIDER_CONFIG_API_VERSION;
    const KIND: &'static str = GCE_PROVIDER_CONFIG_KIND;

    fn from_config(config: ProviderConfig) -> Result<Self, ProviderConfig> {
        match config {
            ProviderConfig::Gce(config) => Ok(config),
            other => Err(other),
        }
    }
}
