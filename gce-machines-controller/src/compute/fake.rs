use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;

use super::{ComputeApi, ComputeError, Instance};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputeCall {
    Insert {
        project: String,
        zone: String,
        instance: Instance,
    },
    Delete {
        project: String,
        zone: String,
        name: String,
    },
}

/// Records every call and answers with a canned result.
#[derive(Default)]
pub struct FakeComputeApi {
    calls: Mutex<Vec<ComputeCall>>,
    failure_status: Option<u16>,
    delay: Option<Duration>,
}

impl FakeComputeApi {
    pub fn failing_with(status: u16) -> Self {
        Self {
            failure_status: Some(status),
            ..Default::default()
        }
    }

    pub fn delayed_by(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<ComputeCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn respond(&self, call: ComputeCall) -> Result<(), ComputeError> {
        self.calls.lock().unwrap().push(call);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.failure_status {
            Some(status) => Err(ComputeError::Api {
                status,
                message: "canned failure".into(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ComputeApi for FakeComputeApi {
    async fn insert_instance(
        &self,
        project: &str,
        zone: &str,
        instance: &Instance,
    ) -> Result<(), ComputeError> {
        self.respond(ComputeCall::Insert {
            project: project.into(),
            zone: zone.into(),
            instance: instance.clone(),
        })
        .await
    }

    async fn delete_instance(
        &self,
        project: &str,
        zone: &str,
        name: &str,
    ) -> Result<(), ComputeError> {
        self.respond(ComputeCall::Delete {
            project: project.into(),
            zone: zone.into(),
            name: name.into(),
        })
        .await
    }
}
