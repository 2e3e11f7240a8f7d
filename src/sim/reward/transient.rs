//! Transient marking probability rewards: estimate `P(X(t) = m)` (or `P(X(t)
//! satisfies cond)`) at a grid of time points, by averaging a 0/1 occupancy
//! indicator over many sequencer runs (spec §4.7 "Rewards").
//!
//! The accumulator assigns each firing's parent marking to the half-open
//! interval `[t_minus, t_plus)` it was held for, and samples a tick `k`
//! (real time `k * time_step`) into that interval whenever `k * time_step`
//! falls inside it. This plain "sample point belongs to the side that
//! starts the interval" rule is what makes a covering set of markings sum
//! to 1 at every tick without any special-casing of interval endpoints: a
//! boundary instant is never double-counted because it belongs to exactly
//! one half-open interval.

use crate::engine::stop::MarkingCond;
use crate::net::marking::Marking;
use crate::sim::{SequencerObserver, SimEvent};

use super::{Reward, RewardResult, TimeSeriesRewardResult};

/// Shared bucket accumulator: holds a 0/1-weighted histogram over
/// `samples` ticks spaced `time_step` apart, fed one half-open occupancy
/// interval at a time and averaged over however many runs were observed.
#[derive(Debug, Clone)]
struct IntervalAccumulator {
    time_step: f64,
    samples: usize,
    counts: Vec<f64>,
    runs: u64,
    current_marking: Option<Marking>,
    current_start: f64,
}

impl IntervalAccumulator {
    fn new(time_step: f64, samples: usize) -> Self {
        Self {
            time_step,
            samples,
            counts: vec![0.0; samples],
            runs: 0,
            current_marking: None,
            current_start: 0.0,
        }
    }

    fn begin_run(&mut self, initial_marking: Marking) {
        self.current_marking = Some(initial_marking);
        self.current_start = 0.0;
    }

    fn record(&mut self, enter: f64, exit: f64, matches: bool) {
        if !matches || exit <= enter {
            return;
        }
        let step = self.time_step;
        let k_min = (enter / step).ceil().max(0.0) as i64;
        let k_max_exclusive = (exit / step).ceil() as i64;
        for k in k_min..k_max_exclusive {
            if k < 0 {
                continue;
            }
            let k = k as usize;
            if k >= self.samples {
                break;
            }
            self.counts[k] += 1.0;
        }
    }

    fn on_event(&mut self, event: &SimEvent, matches: impl Fn(&Marking) -> bool) {
        match event {
            SimEvent::FiringExecuted {
                parent, t_minus, t_plus, ..
            } => {
                if let Some(held) = parent.petri().map(|p| &p.marking) {
                    self.record(*t_minus, *t_plus, matches(held));
                }
                self.current_marking = Some(
                    event_child_marking(event).expect("FiringExecuted child always carries PetriStateFeature"),
                );
                self.current_start = *t_plus;
            }
            SimEvent::RunEnd { .. } => {
                if let Some(held) = self.current_marking.take() {
                    let horizon = self.samples as f64 * self.time_step;
                    let held_matches = matches(&held);
                    self.record(self.current_start, horizon, held_matches);
                }
                self.runs += 1;
            }
            SimEvent::RunStart { .. } => {
                self.current_marking = None;
                self.current_start = 0.0;
            }
            _ => {}
        }
    }

    fn series(&self) -> Vec<f64> {
        if self.runs == 0 {
            return vec![0.0; self.samples];
        }
        self.counts.iter().map(|c| c / self.runs as f64).collect()
    }
}

fn event_child_marking(event: &SimEvent) -> Option<Marking> {
    if let SimEvent::FiringExecuted { child, .. } = event {
        child.petri().map(|p| p.marking.clone())
    } else {
        None
    }
}

/// `P(X(t) = target)`: the probability the process occupies exactly
/// `target` at time `t`, estimated over a grid `t = k * time_step` for `k`
/// in `0..samples`.
pub struct TransientMarkingProbability {
    target: Marking,
    acc: IntervalAccumulator,
}

impl TransientMarkingProbability {
    pub fn new(target: Marking, time_step: f64, samples: usize) -> Self {
        Self {
            target,
            acc: IntervalAccumulator::new(time_step, samples),
        }
    }
}

impl SequencerObserver for TransientMarkingProbability {
    fn notify(&mut self, event: &SimEvent) {
        let target = &self.target;
        self.acc.on_event(event, |m| m == target);
    }
}

impl Reward for TransientMarkingProbability {
    fn evaluate(&self) -> RewardResult {
        let mut series = std::collections::HashMap::new();
        series.insert(self.target.clone(), self.acc.series());
        RewardResult::TimeSeries(TimeSeriesRewardResult {
            time_step: self.acc.time_step,
            samples: self.acc.samples,
            series,
        })
    }
}

/// `P(cond(X(t)))`: like `TransientMarkingProbability` but the occupancy
/// test is an arbitrary marking condition (an expression over place names,
/// or an opaque predicate) rather than equality to one target marking.
pub struct TransientMarkingConditionProbability {
    cond: MarkingCond,
    acc: IntervalAccumulator,
    label: Marking,
}

impl TransientMarkingConditionProbability {
    /// `label` is an arbitrary marking used only as this reward's key in a
    /// `TimeSeriesRewardResult`'s `series` map (condition-based rewards
    /// have no single marking of their own to key by).
    pub fn new(cond: MarkingCond, label: Marking, time_step: f64, samples: usize) -> Self {
        Self {
            cond,
            acc: IntervalAccumulator::new(time_step, samples),
            label,
        }
    }
}

impl SequencerObserver for TransientMarkingConditionProbability {
    fn notify(&mut self, event: &SimEvent) {
        let cond = &self.cond;
        self.acc.on_event(event, |m| cond.holds(m).unwrap_or(false));
    }
}

impl Reward for TransientMarkingConditionProbability {
    fn evaluate(&self) -> RewardResult {
        let mut series = std::collections::HashMap::new();
        series.insert(self.label.clone(), self.acc.series());
        RewardResult::TimeSeries(TimeSeriesRewardResult {
            time_step: self.acc.time_step,
            samples: self.acc.samples,
            series,
        })
    }
}
