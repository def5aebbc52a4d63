use std::time::Duration;

use gce_machines_core::resources::providerconfig::DecodeError;
use thiserror::Error;

use crate::compute::ComputeError;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Machine is missing metadata!")]
    MissingObjectMetadata,
    #[error("Couldn't decode the provider config! Reason: {}", .0)]
    Decode(DecodeError),
    #[error("{}", .0)]
    Compute(ComputeError),
    #[error("Compute API call didn't finish within {:?}!", .0)]
    Timeout(Duration),
}
