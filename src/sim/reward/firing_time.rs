//! Transition absolute firing time: collects, over many runs, the absolute
//! simulated time at which a transition first fires (spec §4.7).

use crate::net::TransitionId;
use crate::sim::{SequencerObserver, SimEvent};

use super::{Reward, RewardResult};

pub struct TransitionAbsoluteFiringTime {
    transition: TransitionId,
    samples: Vec<f64>,
    seen_this_run: bool,
}

impl TransitionAbsoluteFiringTime {
    pub fn new(transition: TransitionId) -> Self {
        Self {
            transition,
            samples: Vec::new(),
            seen_this_run: false,
        }
    }
}

impl SequencerObserver for TransitionAbsoluteFiringTime {
    fn notify(&mut self, event: &SimEvent) {
        match event {
            SimEvent::RunStart { .. } => {
                self.seen_this_run = false;
            }
            SimEvent::FiringExecuted { fired, t_plus, .. } => {
                if *fired == self.transition && !self.seen_this_run {
                    self.samples.push(*t_plus);
                    self.seen_this_run = true;
                }
            }
            _ => {}
        }
    }
}

impl Reward for TransitionAbsoluteFiringTime {
    fn evaluate(&self) -> RewardResult {
        RewardResult::Samples(self.samples.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;

    #[test]
    fn only_the_first_firing_of_the_run_is_recorded() {
        let mut reward = TransitionAbsoluteFiringTime::new(TransitionId(0));
        let s = State::new();
        reward.notify(&SimEvent::RunStart { run: 0 });
        reward.notify(&SimEvent::FiringExecuted {
            run: 0,
            parent: &s,
            child: &s,
            fired: TransitionId(0),
            event_name: "t0",
            t_minus: 0.0,
            t_plus: 1.5,
        });
        reward.notify(&SimEvent::FiringExecuted {
            run: 0,
            parent: &s,
            child: &s,
            fired: TransitionId(0),
            event_name: "t0",
            t_minus: 1.5,
            t_plus: 3.0,
        });
        match reward.evaluate() {
            RewardResult::Samples(s) => assert_eq!(s, vec![1.5]),
            other => panic!("expected samples, got {other:?}"),
        }
    }

    #[test]
    fn a_different_run_contributes_its_own_first_firing() {
        let mut reward = TransitionAbsoluteFiringTime::new(TransitionId(0));
        let s = State::new();
        for (run, t) in [(0u64, 1.0_f64), (1, 2.0)] {
            reward.notify(&SimEvent::RunStart { run });
            reward.notify(&SimEvent::FiringExecuted {
                run,
                parent: &s,
                child: &s,
                fired: TransitionId(0),
                event_name: "t0",
                t_minus: 0.0,
                t_plus: t,
            });
        }
        match reward.evaluate() {
            RewardResult::Samples(s) => assert_eq!(s, vec![1.0, 2.0]),
            other => panic!("expected samples, got {other:?}"),
        }
    }
}
