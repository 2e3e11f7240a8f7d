//! Drives a `Sequencer` on behalf of a single `Reward`: subscribes it as an
//! observer, runs the sequencer for a fixed run count or a wall-clock
//! budget, unsubscribes, and returns the accumulated `RewardResult` (spec
//! §4.7's "evaluator" interface over rewards).

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::error::CoreResult;

use super::reward::{Reward, RewardResult};
use super::sequencer::Sequencer;
use super::{SequencerObserver, SimEvent};

/// Forwards sequencer notifications to a shared, interior-mutable reward so
/// the evaluator can hand the sequencer a boxed observer while retaining its
/// own handle to read the reward back out afterwards.
struct Forward<R>(Rc<RefCell<R>>);

impl<R: Reward> SequencerObserver for Forward<R> {
    fn notify(&mut self, event: &SimEvent) {
        self.0.borrow_mut().notify(event);
    }
}

const OBSERVER_ID: &str = "reward-evaluator";

/// Runs a sequencer for exactly `runs` traces, then evaluates the reward.
pub struct RewardEvaluator<R: Reward> {
    reward: Rc<RefCell<R>>,
    runs: u64,
}

impl<R: Reward + 'static> RewardEvaluator<R> {
    pub fn new(reward: R, runs: u64) -> Self {
        Self {
            reward: Rc::new(RefCell::new(reward)),
            runs,
        }
    }

    pub fn run(&self, sequencer: &mut Sequencer<'_>) -> CoreResult<RewardResult> {
        sequencer.add_observer(OBSERVER_ID, Box::new(Forward(self.reward.clone())));
        let outcome = sequencer.simulate(self.runs);
        sequencer.remove_observer(OBSERVER_ID);
        outcome?;
        Ok(self.reward.borrow().evaluate())
    }

    pub fn into_reward(self) -> Rc<RefCell<R>> {
        self.reward
    }
}

/// Runs a sequencer until a wall-clock deadline measured from
/// `SIMULATION_START`, then evaluates the reward regardless of how many
/// runs completed in that window.
pub struct RewardEvaluatorTimeout<R: Reward> {
    reward: Rc<RefCell<R>>,
    timeout: Duration,
}

impl<R: Reward + 'static> RewardEvaluatorTimeout<R> {
    pub fn new(reward: R, timeout: Duration) -> Self {
        Self {
            reward: Rc::new(RefCell::new(reward)),
            timeout,
        }
    }

    pub fn run(&self, sequencer: &mut Sequencer<'_>) -> CoreResult<RewardResult> {
        sequencer.add_observer(OBSERVER_ID, Box::new(Forward(self.reward.clone())));
        let deadline = Instant::now() + self.timeout;
        let outcome = sequencer.simulate_until(|_completed| Instant::now() >= deadline);
        sequencer.remove_observer(OBSERVER_ID);
        outcome?;
        Ok(self.reward.borrow().evaluate())
    }

    pub fn into_reward(self) -> Rc<RefCell<R>> {
        self.reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::marking::Marking;
    use crate::net::{features, PetriNet, PlaceId};
    use crate::sim::reward::SteadyStateMarkingProbability;
    use crate::sim::sequencer::SequencerConfig;

    fn exp_cycle_net() -> (PetriNet, PlaceId) {
        let mut net = PetriNet::new();
        let p0 = net.add_place("p0");
        let p1 = net.add_place("p1");
        let t0 = net.add_transition("t0");
        let t1 = net.add_transition("t1");
        net.add_precondition(p0, t0, 1).unwrap();
        net.add_postcondition(t0, p1, 1).unwrap();
        net.add_precondition(p1, t1, 1).unwrap();
        net.add_postcondition(t1, p0, 1).unwrap();
        for t in [t0, t1] {
            net.transition_mut(t)
                .features
                .set(features::StochasticTransitionFeature::constant_rate(1.0));
            net.transition_mut(t).features.set(features::SamplerFeature(
                crate::sim::sampler::Sampler::ShiftedExponential { rate: 1.0, shift: 0.0 },
            ));
        }
        (net, p0)
    }

    #[test]
    fn fixed_run_evaluator_returns_a_scalar_in_zero_one() {
        let (net, p0) = exp_cycle_net();
        let mut marking = Marking::new();
        marking.set_tokens(p0, 1);
        let mut sequencer = Sequencer::new(&net, marking.clone(), SequencerConfig::default());
        // The cycle never deadlocks on its own, so bound each run's
        // simulated time or it would never reach RUN_END.
        let abort = sequencer.run_abort_handle();
        sequencer.add_observer("horizon", Box::new(crate::sim::HorizonAbort::new(20.0, abort)));

        let evaluator = RewardEvaluator::new(SteadyStateMarkingProbability::new(marking), 20);
        let result = evaluator.run(&mut sequencer).unwrap();
        let p = result.as_scalar().expect("steady-state reward returns a scalar");
        assert!((0.0..=1.0).contains(&p));
    }
}
