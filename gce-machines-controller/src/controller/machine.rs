use std::{fmt::Display, pin::pin, time::Duration};

use futures::{Stream, StreamExt};
use gce_machines_core::{
    kubernetes::informer::ResourceEvent, resources::crd::v1alpha1::machine::Machine,
};
use kube::ResourceExt;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::{compute::ComputeApi, helpers::log_outcome, provider::ProviderClient};

use super::{
    outcome::{Operation, Outcome},
    MachineEvent,
};

const WATCH_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Dispatches machine events to the provider one at a time, in delivery order. Failed events are
/// logged and dropped, nothing is retried.
pub struct MachineController<A> {
    provider: ProviderClient<A>,
}

impl<A: ComputeApi> MachineController<A> {
    pub fn new(provider: ProviderClient<A>) -> Self {
        Self { provider }
    }

    /// Consumes `events` until `shutdown` is cancelled or the stream ends. Cancellation is only
    /// observed between events, an in-flight provider call always runs to completion or timeout.
    pub async fn run<S, E>(&self, events: S, shutdown: CancellationToken)
    where
        S: Stream<Item = Result<MachineEvent, E>>,
        E: Display,
    {
        let mut events = pin!(events);

        info!("Machine controller started!");

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                event = events.next() => event,
            };

            match event {
                Some(Ok(event)) => {
                    let outcome = self.handle(event).await;
                    log_outcome(&outcome);
                }
                Some(Err(error)) => {
                    warn!("Machine watch failed, retrying in {WATCH_RETRY_DELAY:?}! {error}");

                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(WATCH_RETRY_DELAY) => (),
                    }
                }
                None => {
                    warn!("Machine watch has ended!");
                    break;
                }
            }
        }

        info!("Machine controller stopped!");
    }

    pub async fn handle(&self, event: MachineEvent) -> Outcome {
        match event {
            ResourceEvent::Added(machine) => self.on_add(&machine).await,
            ResourceEvent::Updated { old, new } => self.on_update(&old, &new),
            ResourceEvent::Deleted(machine) => self.on_delete(&machine).await,
        }
    }

    async fn on_add(&self, machine: &Machine) -> Outcome {
        let name = describe(machine);

        info!("Machine {name} added");

        Outcome {
            machine: name,
            operation: Operation::Create,
            result: self.provider.create_instance(machine).await,
        }
    }

    // updates are only reported, instances are never changed in place
    fn on_update(&self, old: &Machine, new: &Machine) -> Outcome {
        let name = describe(new);

        info!("Machine {name} updated");
        info!("  {}", old.spec.versions.describe_change(&new.spec.versions));

        Outcome {
            machine: name,
            operation: Operation::Observe,
            result: Ok(()),
        }
    }

    async fn on_delete(&self, machine: &Machine) -> Outcome {
        let name = describe(machine);

        info!("Machine {name} deleted");

        Outcome {
            machine: name,
            operation: Operation::Delete,
            result: self.provider.delete_instance(machine).await,
        }
    }
}

fn describe(machine: &Machine) -> String {
    format!(
        "'{}' in '{}' namespace",
        machine.name_any(),
        machine.namespace().as_deref().unwrap_or("---")
    )
}
