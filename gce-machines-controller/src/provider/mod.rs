use std::{future::Future, sync::Arc, time::Duration};

use gce_machines_core::{
    helpers::RequireMetadata,
    resources::{
        crd::v1alpha1::machine::Machine,
        providerconfig::{gce::GceProviderConfig, ProviderConfigDecoder},
    },
};
use log::debug;

use crate::compute::{AttachedDisk, ComputeApi, ComputeError, Instance, NetworkInterface};

use self::error::ProviderError;

pub mod error;

/// Turns machines into compute API calls. Neither operation is idempotent, provider errors such
/// as "already exists" or "not found" are handed back as they are.
pub struct ProviderClient<A> {
    compute: Arc<A>,
    decoder: ProviderConfigDecoder<GceProviderConfig>,
    call_timeout: Duration,
}

impl<A: ComputeApi> ProviderClient<A> {
    pub fn new(compute: Arc<A>, call_timeout: Duration) -> Self {
        Self {
            compute,
            decoder: ProviderConfigDecoder::new(),
            call_timeout,
        }
    }

    pub async fn create_instance(&self, machine: &Machine) -> Result<(), ProviderError> {
        let config = self.provider_config(machine)?;
        let name = machine.require_name_or(ProviderError::MissingObjectMetadata)?;
        let instance = build_instance(name, &config);

        debug!(
            "Inserting instance '{}' ({}) in {}/{}",
            instance.name, instance.machine_type, config.project, config.zone
        );

        self.call(
            self.compute
                .insert_instance(&config.project, &config.zone, &instance),
        )
        .await
    }

    pub async fn delete_instance(&self, machine: &Machine) -> Result<(), ProviderError> {
        let config = self.provider_config(machine)?;
        let name = machine.require_name_or(ProviderError::MissingObjectMetadata)?;

        debug!(
            "Deleting instance '{name}' in {}/{}",
            config.project, config.zone
        );

        self.call(self.compute.delete_instance(&config.project, &config.zone, name))
            .await
    }

    fn provider_config(&self, machine: &Machine) -> Result<GceProviderConfig, ProviderError> {
        self.decoder
            .decode(&machine.spec.provider_config)
            .map_err(ProviderError::Decode)
    }

    async fn call(
        &self,
        call: impl Future<Output = Result<(), ComputeError>>,
    ) -> Result<(), ProviderError> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(ProviderError::Compute),
            Err(_) => Err(ProviderError::Timeout(self.call_timeout)),
        }
    }
}

fn build_instance(name: &str, config: &GceProviderConfig) -> Instance {
    Instance {
        name: name.to_owned(),
        machine_type: config.qualified_machine_type(),
        zone: config.zone.to_owned(),
        network_interfaces: vec![NetworkInterface::default_with_external_nat()],
        disks: vec![AttachedDisk::boot_from_image(&config.image)],
    }
}
