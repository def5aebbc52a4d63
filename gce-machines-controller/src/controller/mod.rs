use std::sync::Arc;

use futures::Stream;
use gce_machines_core::{
    kubernetes::{
        informer::{informer, ResourceEvent},
        GetApi,
    },
    resources::crd::v1alpha1::machine::Machine,
};
use kube::{
    runtime::watcher::{watcher, Config, Error as WatcherError},
    Client,
};
use log::info;
use tokio_util::sync::CancellationToken;

use crate::{compute::ComputeApi, config::ControllerConfig, provider::ProviderClient};

use self::machine::MachineController;

pub mod machine;
pub mod outcome;

pub type MachineEvent = ResourceEvent<Machine>;

pub async fn main_controller<A: ComputeApi>(
    client: Client,
    config: &ControllerConfig,
    compute: Arc<A>,
    shutdown: CancellationToken,
) {
    info!(
        "Creating machine controller for {}...",
        match &config.namespace {
            Some(namespace) => format!("'{namespace}' namespace"),
            None => "all namespaces".to_owned(),
        }
    );

    let provider = ProviderClient::new(compute, config.call_timeout);
    let controller = MachineController::new(provider);
    let events = watch_machines(&client, config.namespace.as_deref());

    controller.run(events, shutdown).await
}

/// Change stream of machines, starting with the current state of every machine in scope.
pub fn watch_machines(
    client: &Client,
    namespace: Option<&str>,
) -> impl Stream<Item = Result<MachineEvent, WatcherError>> {
    informer(watcher(
        client.scoped_api::<Machine>(namespace),
        Config::default(),
    ))
}
