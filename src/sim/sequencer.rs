//! The sequencer: runs independent Monte-Carlo firing traces from an
//! initial marking, selecting at each step the enabled transition with the
//! smallest (rate-scaled) time-to-fire, per spec.md §4.7.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{CoreError, CoreResult, StateError};
use crate::net::features::{Priority, SamplerFeature, StochasticTransitionFeature, TimedTransitionFeature};
use crate::net::{MarkingBindings, Marking, PetriNet, TransitionId};
use crate::petri;
use crate::state::{PetriStateFeature, State, TimedSimulatorStateFeature};

use super::sampler::pseudo_next;
use super::{RunAbort, SequencerObserver, SimEvent};

/// Ambient knobs that aren't part of the net itself: whether state
/// equivalence tracks newly-enabled sets, and the sequencer's RNG seed.
/// Mirrors `SimulationConfig` in SPEC_FULL.md §2.3.
#[derive(Debug, Clone, Copy)]
pub struct SequencerConfig {
    pub check_newly_enabled: bool,
    pub seed: u64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            check_newly_enabled: false,
            seed: 0,
        }
    }
}

pub struct Sequencer<'a> {
    net: &'a PetriNet,
    initial_marking: Marking,
    config: SequencerConfig,
    rng: StdRng,
    observers: Vec<(String, Box<dyn SequencerObserver>)>,
    run_observers: Vec<(String, Box<dyn SequencerObserver>)>,
    run_abort: RunAbort,
}

impl<'a> Sequencer<'a> {
    pub fn new(net: &'a PetriNet, initial_marking: Marking, config: SequencerConfig) -> Self {
        Self {
            net,
            initial_marking,
            rng: StdRng::seed_from_u64(config.seed),
            config,
            observers: Vec::new(),
            run_observers: Vec::new(),
            run_abort: RunAbort::new(),
        }
    }

    /// A handle a `Reward` can clone and hold on to, to request the
    /// current run stop early (spec §5's "reward's `abortCurrentRun()`
    /// path").
    pub fn run_abort_handle(&self) -> RunAbort {
        self.run_abort.clone()
    }

    pub fn add_observer(&mut self, id: impl Into<String>, observer: Box<dyn SequencerObserver>) {
        self.observers.push((id.into(), observer));
    }

    pub fn remove_observer(&mut self, id: &str) {
        self.observers.retain(|(existing, _)| existing != id);
    }

    /// Subscribes an observer for the *next* run only; it is dropped once
    /// that run ends.
    pub fn add_current_run_observer(&mut self, id: impl Into<String>, observer: Box<dyn SequencerObserver>) {
        self.run_observers.push((id.into(), observer));
    }

    fn notify(&mut self, event: &SimEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer.notify(event);
        }
        for (_, observer) in self.run_observers.iter_mut() {
            observer.notify(event);
        }
    }

    /// Runs exactly `runs` traces.
    pub fn simulate(&mut self, runs: u64) -> CoreResult<()> {
        self.simulate_until(|completed| completed >= runs)
    }

    /// Runs traces until `should_stop(completed_runs)` returns true,
    /// checked before every run (including the first). Used directly by
    /// `RewardEvaluator` (a fixed run count) and `RewardEvaluatorTimeout`
    /// (a wall-clock deadline).
    pub fn simulate_until(&mut self, mut should_stop: impl FnMut(u64) -> bool) -> CoreResult<()> {
        self.notify(&SimEvent::SimulationStart);
        let mut run: u64 = 0;
        while !should_stop(run) {
            self.run_one(run)?;
            run += 1;
            self.run_observers.clear();
        }
        self.notify(&SimEvent::SimulationEnd);
        Ok(())
    }

    fn rate(&self, transition: TransitionId, marking: &Marking) -> CoreResult<f64> {
        match self
            .net
            .transition(transition)
            .features
            .get::<StochasticTransitionFeature>()
        {
            Some(feature) => {
                let bindings = MarkingBindings {
                    net: self.net,
                    marking,
                };
                let value = crate::expr::eval::eval(&feature.rate, &bindings)?;
                let rate = value.as_f64()?;
                if rate <= 0.0 {
                    return Err(CoreError::Domain(format!(
                        "clock rate for transition '{}' evaluated to non-positive {rate}",
                        self.net.transition(transition).name
                    )));
                }
                Ok(rate)
            }
            None => Ok(1.0),
        }
    }

    fn priority(&self, transition: TransitionId) -> i64 {
        self.net
            .transition(transition)
            .features
            .get::<Priority>()
            .map(|p| p.0)
            .unwrap_or(Priority::ABSENT)
    }

    /// Draws a fresh time-to-fire for a transition that just became newly
    /// enabled: via its `SamplerFeature` if present (handling `Pseudo`'s
    /// cursor-based cycling specially), else uniformly within a
    /// `TimedTransitionFeature`'s `[min, max]` window.
    fn sample_ttf(
        &mut self,
        transition: TransitionId,
        pseudo_cursors: &mut HashMap<TransitionId, usize>,
    ) -> CoreResult<f64> {
        let features = &self.net.transition(transition).features;
        if let Some(SamplerFeature(sampler)) = features.get::<SamplerFeature>() {
            if let crate::sim::sampler::Sampler::Pseudo(sequence) = sampler {
                let cursor = pseudo_cursors.entry(transition).or_insert_with(|| {
                    if sequence.is_empty() {
                        0
                    } else {
                        self.rng.gen_range(0..sequence.len())
                    }
                });
                return Ok(pseudo_next(sequence, cursor));
            }
            return sampler.sample(&mut self.rng);
        }
        if let Some(timed) = features.get::<TimedTransitionFeature>() {
            if (timed.max - timed.min).abs() < f64::EPSILON {
                return Ok(timed.min);
            }
            return Ok(timed.min + self.rng.gen::<f64>() * (timed.max - timed.min));
        }
        Err(CoreError::State(StateError::MissingFeature(
            "transition has neither a SamplerFeature nor a TimedTransitionFeature",
        )))
    }

    fn run_one(&mut self, run: u64) -> CoreResult<()> {
        self.run_abort.reset();
        self.notify(&SimEvent::RunStart { run });

        let mut current =
            petri::initial::initial_state(self.net, self.initial_marking.clone(), self.config.check_newly_enabled)?;
        let mut pseudo_cursors: HashMap<TransitionId, usize> = HashMap::new();

        let initial_newly_enabled: Vec<TransitionId> = current
            .petri()
            .expect("initial_state always sets PetriStateFeature")
            .newly_enabled
            .iter()
            .copied()
            .collect();
        let mut ttf = HashMap::new();
        for t in initial_newly_enabled {
            let v = self.sample_ttf(t, &mut pseudo_cursors)?;
            ttf.insert(t, v);
        }
        current.features_mut().set(TimedSimulatorStateFeature { ttf });

        let mut elapsed = 0.0_f64;

        loop {
            if self.run_abort.requested() {
                break;
            }
            let petri: PetriStateFeature = current.petri().expect("state always carries PetriStateFeature").clone();
            if petri.enabled.is_empty() {
                break;
            }
            let timed: TimedSimulatorStateFeature = current
                .features()
                .get::<TimedSimulatorStateFeature>()
                .expect("populated at run start and after every firing")
                .clone();

            let mut candidates: Vec<(TransitionId, f64, i64)> = Vec::new();
            for t in self.net.transitions().map(|t| t.id) {
                if !petri.enabled.contains(&t) {
                    continue;
                }
                let raw = *timed
                    .ttf
                    .get(&t)
                    .ok_or(CoreError::State(StateError::MissingFeature("ttf for an enabled transition")))?;
                let rate = self.rate(t, &petri.marking)?;
                candidates.push((t, raw / rate, self.priority(t)));
            }

            let min_scaled = candidates
                .iter()
                .map(|(_, scaled, _)| *scaled)
                .fold(f64::INFINITY, f64::min);
            candidates.retain(|(_, scaled, _)| (*scaled - min_scaled).abs() < 1e-12);
            let max_priority = candidates.iter().map(|(_, _, p)| *p).max().unwrap_or(Priority::ABSENT);
            candidates.retain(|(_, _, p)| *p == max_priority);
            let (fired, _, _) = candidates[0];

            let fired_raw_ttf = *timed.ttf.get(&fired).expect("fired transition had a ttf entry");
            let fired_rate = self.rate(fired, &petri.marking)?;
            let delta_real = fired_raw_ttf / fired_rate;

            let t_minus = elapsed;
            let t_plus = elapsed + delta_real;

            let next_state = petri::evaluator::fire(self.net, &current, fired)?;
            let next_petri: PetriStateFeature = next_state.petri().expect("fire always sets PetriStateFeature").clone();

            let mut new_ttf = HashMap::with_capacity(next_petri.enabled.len());
            for &t in &next_petri.persistent {
                let rate_t = self.rate(t, &petri.marking)?;
                let old = *timed.ttf.get(&t).unwrap_or(&0.0);
                new_ttf.insert(t, old - delta_real * rate_t);
            }
            for &t in &next_petri.newly_enabled {
                let v = self.sample_ttf(t, &mut pseudo_cursors)?;
                new_ttf.insert(t, v);
            }

            let mut next_state = next_state;
            next_state.features_mut().set(TimedSimulatorStateFeature { ttf: new_ttf });

            let event_name = self.net.transition(fired).name.clone();
            self.notify(&SimEvent::FiringExecuted {
                run,
                parent: &current,
                child: &next_state,
                fired,
                event_name: &event_name,
                t_minus,
                t_plus,
            });

            elapsed = t_plus;
            current = next_state;
        }

        self.notify(&SimEvent::RunEnd { run });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::features;

    fn exp_cycle_net() -> (PetriNet, crate::net::PlaceId, crate::net::PlaceId) {
        let mut net = PetriNet::new();
        let p0 = net.add_place("p0");
        let p1 = net.add_place("p1");
        let t0 = net.add_transition("t0");
        let t1 = net.add_transition("t1");
        net.add_precondition(p0, t0, 1).unwrap();
        net.add_postcondition(t0, p1, 1).unwrap();
        net.add_precondition(p1, t1, 1).unwrap();
        net.add_postcondition(t1, p0, 1).unwrap();
        net.transition_mut(t0)
            .features
            .set(features::StochasticTransitionFeature::constant_rate(1.0));
        net.transition_mut(t0)
            .features
            .set(features::SamplerFeature(crate::sim::sampler::Sampler::ShiftedExponential {
                rate: 1.0,
                shift: 0.0,
            }));
        net.transition_mut(t1)
            .features
            .set(features::StochasticTransitionFeature::constant_rate(1.0));
        net.transition_mut(t1)
            .features
            .set(features::SamplerFeature(crate::sim::sampler::Sampler::ShiftedExponential {
                rate: 1.0,
                shift: 0.0,
            }));
        (net, p0, p1)
    }

    #[test]
    fn simulate_runs_exactly_the_requested_number_of_times() {
        let (net, p0, _p1) = exp_cycle_net();
        let mut marking = Marking::new();
        marking.set_tokens(p0, 1);
        let mut seq = Sequencer::new(&net, marking, SequencerConfig::default());

        struct RunCounter(u64);
        impl SequencerObserver for RunCounter {
            fn notify(&mut self, event: &SimEvent) {
                if matches!(event, SimEvent::RunEnd { .. }) {
                    self.0 += 1;
                }
            }
        }
        let counter = std::sync::Arc::new(std::sync::Mutex::new(RunCounter(0)));
        struct Forwarder(std::sync::Arc<std::sync::Mutex<RunCounter>>);
        impl SequencerObserver for Forwarder {
            fn notify(&mut self, event: &SimEvent) {
                self.0.lock().unwrap().notify(event);
            }
        }
        seq.add_observer("counter", Box::new(Forwarder(counter.clone())));
        seq.simulate(5).unwrap();
        assert_eq!(counter.lock().unwrap().0, 5);
    }

    #[test]
    fn firings_never_go_backwards_in_time() {
        let (net, p0, _p1) = exp_cycle_net();
        let mut marking = Marking::new();
        marking.set_tokens(p0, 1);
        let mut seq = Sequencer::new(&net, marking, SequencerConfig::default());

        struct Monotonic(f64);
        impl SequencerObserver for Monotonic {
            fn notify(&mut self, event: &SimEvent) {
                if let SimEvent::FiringExecuted { t_minus, t_plus, .. } = event {
                    assert!(*t_plus >= *t_minus);
                    assert!(*t_minus >= self.0 - 1e-9);
                    self.0 = *t_plus;
                }
            }
        }
        seq.add_observer("monotonic", Box::new(Monotonic(0.0)));
        seq.simulate(3).unwrap();
    }
}
