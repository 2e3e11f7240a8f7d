//! Symbolic prefix reward: the fraction of runs whose firing sequence
//! begins with a fixed sequence of transition names, estimated by Monte
//! Carlo (spec §4.7, §8's convergence property).

use crate::sim::{SequencerObserver, SimEvent};

use super::{Reward, RewardResult};

pub struct SymbolicPrefixReward {
    prefix: Vec<String>,
    progress: usize,
    matched_runs: u64,
    total_runs: u64,
}

impl SymbolicPrefixReward {
    pub fn new(prefix: Vec<String>) -> Self {
        Self {
            prefix,
            progress: 0,
            matched_runs: 0,
            total_runs: 0,
        }
    }
}

impl SequencerObserver for SymbolicPrefixReward {
    fn notify(&mut self, event: &SimEvent) {
        match event {
            SimEvent::RunStart { .. } => {
                self.progress = 0;
            }
            SimEvent::FiringExecuted { event_name, .. } => {
                if self.progress < self.prefix.len() && self.prefix[self.progress] == *event_name {
                    self.progress += 1;
                }
            }
            SimEvent::RunEnd { .. } => {
                self.total_runs += 1;
                if self.progress >= self.prefix.len() {
                    self.matched_runs += 1;
                }
            }
            _ => {}
        }
    }
}

impl Reward for SymbolicPrefixReward {
    fn evaluate(&self) -> RewardResult {
        if self.total_runs == 0 {
            RewardResult::Scalar(0.0)
        } else {
            RewardResult::Scalar(self.matched_runs as f64 / self.total_runs as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prefix_matches_every_run_immediately() {
        let mut reward = SymbolicPrefixReward::new(vec![]);
        reward.notify(&SimEvent::RunStart { run: 0 });
        reward.notify(&SimEvent::RunEnd { run: 0 });
        assert_eq!(reward.evaluate().as_scalar(), Some(1.0));
    }

    #[test]
    fn wrong_order_never_completes_the_prefix() {
        let mut reward = SymbolicPrefixReward::new(vec!["a".to_string(), "b".to_string()]);
        let s = crate::state::State::new();
        reward.notify(&SimEvent::RunStart { run: 0 });
        reward.notify(&SimEvent::FiringExecuted {
            run: 0,
            parent: &s,
            child: &s,
            fired: crate::net::TransitionId(0),
            event_name: "b",
            t_minus: 0.0,
            t_plus: 1.0,
        });
        reward.notify(&SimEvent::FiringExecuted {
            run: 0,
            parent: &s,
            child: &s,
            fired: crate::net::TransitionId(1),
            event_name: "a",
            t_minus: 1.0,
            t_plus: 2.0,
        });
        reward.notify(&SimEvent::RunEnd { run: 0 });
        assert_eq!(reward.evaluate().as_scalar(), Some(0.0));
    }
}
