//! Steady-state marking probability: the long-run fraction of simulated
//! time a run spends in a target marking, batch-averaged over many
//! independent runs (spec §4.7).
//!
//! Unlike `TransientMarkingProbability` there is no externally chosen time
//! horizon: each run simply contributes the sojourn time it actually
//! accumulated before it stopped.
//!
//! Every instant of a run's clock is covered by exactly one firing's
//! half-open `[t_minus, t_plus)` parent interval — a run's elapsed time
//! never advances past its last firing's `t_plus` before `RunEnd` arrives,
//! so there is no untracked tail to attribute once the loop below has
//! walked every `FiringExecuted`.

use crate::net::marking::Marking;
use crate::sim::{SequencerObserver, SimEvent};

use super::{Reward, RewardResult};

pub struct SteadyStateMarkingProbability {
    target: Marking,
    time_in_target: f64,
    total_time: f64,
}

impl SteadyStateMarkingProbability {
    pub fn new(target: Marking) -> Self {
        Self {
            target,
            time_in_target: 0.0,
            total_time: 0.0,
        }
    }
}

impl SequencerObserver for SteadyStateMarkingProbability {
    fn notify(&mut self, event: &SimEvent) {
        if let SimEvent::FiringExecuted {
            parent, t_minus, t_plus, ..
        } = event
        {
            let duration = *t_plus - *t_minus;
            if duration > 0.0 {
                if let Some(held) = parent.petri().map(|p| &p.marking) {
                    if *held == self.target {
                        self.time_in_target += duration;
                    }
                }
                self.total_time += duration;
            }
        }
    }
}

impl Reward for SteadyStateMarkingProbability {
    fn evaluate(&self) -> RewardResult {
        if self.total_time <= 0.0 {
            RewardResult::Scalar(0.0)
        } else {
            RewardResult::Scalar(self.time_in_target / self.total_time)
        }
    }
}
