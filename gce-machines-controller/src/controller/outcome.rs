use std::fmt::Display;

use crate::provider::error::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Observe,
    Delete,
}

/// What handling a single machine event came down to.
#[derive(Debug)]
pub struct Outcome {
    /// machine identity as shown in logs
    pub machine: String,
    pub operation: Operation,
    pub result: Result<(), ProviderError>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.operation, &self.result) {
            (Operation::Create, Ok(())) => write!(f, "Created instance for machine {}", self.machine),
            (Operation::Create, Err(error)) => write!(
                f,
                "Couldn't create instance for machine {}! {error}",
                self.machine
            ),
            (Operation::Observe, _) => {
                write!(f, "Observed machine {}, no action taken", self.machine)
            }
            (Operation::Delete, Ok(())) => write!(f, "Deleted instance for machine {}", self.machine),
            (Operation::Delete, Err(error)) => write!(
                f,
                "Couldn't delete instance for machine {}! {error}",
                self.machine
            ),
        }
    }
}
