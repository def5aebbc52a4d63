use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use thiserror::Error;

pub mod gce;

#[cfg(test)]
pub mod fake;

pub const DEFAULT_NETWORK: &str = "global/networks/default";
pub const EXTERNAL_NAT_TYPE: &str = "ONE_TO_ONE_NAT";
pub const EXTERNAL_NAT_NAME: &str = "External NAT";
pub const BOOT_DISK_SIZE_GB: i64 = 10;

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Couldn't reach the compute API! Reason: {}", .0)]
    Http(reqwest::Error),
    #[error("Compute API call failed with status {}: {}", .status, .message)]
    Api { status: u16, message: String },
}

/// The compute provider's remote API. Implementations hold a session established once and are
/// shared by every call.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn insert_instance(
        &self,
        project: &str,
        zone: &str,
        instance: &Instance,
    ) -> Result<(), ComputeError>;

    async fn delete_instance(&self, project: &str, zone: &str, name: &str)
        -> Result<(), ComputeError>;
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub name: String,
    /// zone-qualified machine type
    pub machine_type: String,
    pub zone: String,
    pub network_interfaces: Vec<NetworkInterface>,
    pub disks: Vec<AttachedDisk>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub network: String,
    pub access_configs: Vec<AccessConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AccessConfig {
    #[serde(rename = "type")]
    pub type_: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    pub auto_delete: bool,
    pub boot: bool,
    pub initialize_params: AttachedDiskInitializeParams,
}

#[serde_as]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDiskInitializeParams {
    pub source_image: String,
    // int64 fields travel as strings on the compute API
    #[serde_as(as = "DisplayFromStr")]
    pub disk_size_gb: i64,
}

impl NetworkInterface {
    /// Interface on the default network with an ephemeral external address.
    pub fn default_with_external_nat() -> Self {
        Self {
            network: DEFAULT_NETWORK.to_owned(),
            access_configs: vec![AccessConfig {
                type_: EXTERNAL_NAT_TYPE.to_owned(),
                name: EXTERNAL_NAT_NAME.to_owned(),
            }],
        }
    }
}

impl AttachedDisk {
    /// Boot disk removed together with its instance.
    pub fn boot_from_image(image: &str) -> Self {
        Self {
            auto_delete: true,
            boot: true,
            initialize_params: AttachedDiskInitializeParams {
                source_image: image.to_owned(),
                disk_size_gb: BOOT_DISK_SIZE_GB,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AttachedDisk, Instance, NetworkInterface};

    #[test]
    fn instance_serializes_to_compute_api_shape() {
        let instance = Instance {
            name: "vm-a".into(),
            machine_type: "zones/us-central1-a/machineTypes/n1-standard-1".into(),
            zone: "us-central1-a".into(),
            network_interfaces: vec![NetworkInterface::default_with_external_nat()],
            disks: vec![AttachedDisk::boot_from_image("debian-9")],
        };

        assert_eq!(
            serde_json::to_value(&instance).unwrap(),
            json!({
                "name": "vm-a",
                "machineType": "zones/us-central1-a/machineTypes/n1-standard-1",
                "zone": "us-central1-a",
                "networkInterfaces": [{
                    "network": "global/networks/default",
                    "accessConfigs": [{ "type": "ONE_TO_ONE_NAT", "name": "External NAT" }]
                }],
                "disks": [{
                    "autoDelete": true,
                    "boot": true,
                    "initializeParams": { "sourceImage": "debian-9", "diskSizeGb": "10" }
                }]
            })
        );
    }
}
