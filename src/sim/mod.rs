//! The stochastic simulation kernel: a sequencer that repeatedly samples
//! timers for enabled transitions, fires the minimum, and streams firing
//! events to reward observers.
//!
//! Grounded on `knhk-mu-kernel`'s Monte-Carlo worker loop (the workspace's
//! other `rand`-driven simulation) for the run/observer shape, generalized
//! from a single workload distribution to the full per-transition sampler
//! set spec.md §4.7 requires.

pub mod batch;
pub mod evaluator;
pub mod reward;
pub mod sampler;
pub mod sequencer;

pub use batch::parallel_replications;
pub use evaluator::{RewardEvaluator, RewardEvaluatorTimeout};
pub use reward::Reward;
pub use sampler::Sampler;
pub use sequencer::Sequencer;

use crate::net::TransitionId;
use crate::state::State;

/// Lifecycle events the sequencer fans out to observers, in the exact
/// order spec.md §4.7 specifies:
/// `SIMULATION_START`, {per run: `RUN_START`, `FIRING_EXECUTED`*,
/// `RUN_END`}, `SIMULATION_END`.
#[derive(Debug, Clone, Copy)]
pub enum SimEvent<'a> {
    SimulationStart,
    RunStart {
        run: u64,
    },
    FiringExecuted {
        run: u64,
        parent: &'a State,
        child: &'a State,
        fired: TransitionId,
        event_name: &'a str,
        /// Absolute simulated time at which the parent marking was entered.
        t_minus: f64,
        /// Absolute simulated time at which this firing occurs.
        t_plus: f64,
    },
    RunEnd {
        run: u64,
    },
    SimulationEnd,
}

/// A passive observer of sequencer notifications. `Reward`s are the
/// primary implementors; `BasicReward` wires subscription bookkeeping for
/// them so concrete rewards only implement the accumulation logic.
pub trait SequencerObserver {
    fn notify(&mut self, event: &SimEvent);
}

/// Cooperative per-run cancellation: a reward observer may call this to
/// request the current run stop early (e.g. once it has seen everything it
/// needs from this trace). It does not affect the rest of the simulation.
#[derive(Debug, Default, Clone)]
pub struct RunAbort(std::sync::Arc<std::sync::atomic::AtomicBool>);

impl RunAbort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn requested(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, std::sync::atomic::Ordering::Relaxed);
    }
}

/// Requests a `RunAbort` once simulated time in the current run passes
/// `horizon`. A live net (one with no reachable deadlock) never satisfies
/// the sequencer's other stopping condition ("no transition is firable"),
/// so estimating a long-run quantity over it — `SteadyStateMarkingProbability`
/// in particular — requires pairing the reward with this observer; without
/// it the run never ends.
pub struct HorizonAbort {
    horizon: f64,
    abort: RunAbort,
}

impl HorizonAbort {
    pub fn new(horizon: f64, abort: RunAbort) -> Self {
        Self { horizon, abort }
    }
}

impl SequencerObserver for HorizonAbort {
    fn notify(&mut self, event: &SimEvent) {
        if let SimEvent::FiringExecuted { t_plus, .. } = event {
            if *t_plus >= self.horizon {
                self.abort.request();
            }
        }
    }
}
