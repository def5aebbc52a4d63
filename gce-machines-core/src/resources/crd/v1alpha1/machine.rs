use k8s_openapi::chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(CustomResource, Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[kube(
    group = "cluster-api.k8s.io",
    version = "v1alpha1",
    kind = "Machine",
    namespaced,
    status = "MachineStatus",
    derive = "Default"
)]
pub struct MachineSpec {
    /// serialized, versioned configuration understood only by the matching provider
    pub provider_config: String,
    /// software versions the node is expected to run
    pub versions: MachineVersionInfo,
    /// roles this machine fulfills in the cluster
    pub roles: Option<Vec<MachineRole>>,
}

#[skip_serializing_none]
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineVersionInfo {
    /// kubelet version, the field other versions are compared against
    pub kubelet: String,
    /// control plane version, only meaningful for masters
    pub control_plane: Option<String>,
    pub container_runtime: Option<ContainerRuntimeInfo>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct ContainerRuntimeInfo {
    pub name: String,
    pub version: String,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum MachineRole {
    Master,
    Node,
}

#[skip_serializing_none]
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatus {
    /// name of the node backed by this machine
    pub node_ref: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl MachineVersionInfo {
    /// Describes how `self` changed into `new`, one `field: 'old' -> 'new'` entry per version field
    /// that either side sets.
    pub fn describe_change(&self, new: &MachineVersionInfo) -> String {
        let mut entries = vec![format!("kubelet: '{}' -> '{}'", self.kubelet, new.kubelet)];

        if self.control_plane.is_some() || new.control_plane.is_some() {
            entries.push(format!(
                "control plane: '{}' -> '{}'",
                self.control_plane.as_deref().unwrap_or_default(),
                new.control_plane.as_deref().unwrap_or_default()
            ));
        }

        entries.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use kube::{CustomResourceExt, Resource};

    use crate::RESOURCE_GROUP;

    use super::{Machine, MachineVersionInfo};

    #[test]
    fn machine_resource_is_served_under_cluster_api_group() {
        assert_eq!(Machine::group(&()), RESOURCE_GROUP);
        assert_eq!(Machine::plural(&()), "machines");
        assert_eq!(Machine::crd_name(), "machines.cluster-api.k8s.io");
    }

    #[test]
    fn machine_spec_parses_from_camel_case_manifest() {
        let machine: Machine = serde_yaml::from_str(
            r#"
apiVersion: cluster-api.k8s.io/v1alpha1
kind: Machine
metadata:
  name: vm-a
  namespace: default
spec:
  providerConfig: |
    apiVersion: gceproviderconfig/v1alpha1
    kind: GCEProviderConfig
  versions:
    kubelet: 1.7.4
    controlPlane: 1.7.4
  roles:
    - Master
"#,
        )
        .unwrap();

        assert_eq!(machine.metadata.name.as_deref(), Some("vm-a"));
        assert_eq!(machine.spec.versions.kubelet, "1.7.4");
        assert_eq!(machine.spec.versions.control_plane.as_deref(), Some("1.7.4"));
        assert!(machine.spec.provider_config.contains("GCEProviderConfig"));
    }

    #[test]
    fn describe_change_reports_kubelet_only_when_no_control_plane() {
        let old = MachineVersionInfo {
            kubelet: "1.7.3".into(),
            ..Default::default()
        };
        let new = MachineVersionInfo {
            kubelet: "1.7.4".into(),
            ..Default::default()
        };

        assert_eq!(old.describe_change(&new), "kubelet: '1.7.3' -> '1.7.4'");
    }

    #[test]
    fn describe_change_includes_control_plane_when_set_on_either_side() {
        let old = MachineVersionInfo {
            kubelet: "1.7.4".into(),
            ..Default::default()
        };
        let new = MachineVersionInfo {
            kubelet: "1.7.4".into(),
            control_plane: Some("1.8.0".into()),
            ..Default::default()
        };

        assert_eq!(
            old.describe_change(&new),
            "kubelet: '1.7.4' -> '1.7.4', control plane: '' -> '1.8.0'"
        );
    }
}
