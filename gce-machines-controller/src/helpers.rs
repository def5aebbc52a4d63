use log::{error, info};

use crate::controller::outcome::Outcome;

pub fn log_outcome(outcome: &Outcome) {
    if outcome.is_success() {
        info!("{outcome}");
    } else {
        error!("{outcome}");
    }
}
