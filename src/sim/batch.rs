//! Parallel batch replication.
//!
//! The sequencer is strictly sequential and a single run mutates no shared
//! state, but nothing stops two sequencers over the same net from running
//! on different threads at once. `parallel_replications` exploits that:
//! it splits a target run count into independent replications, each with
//! its own `Sequencer` and its own `Reward` instance, and fans them out
//! over `rayon`'s thread pool.
//!
//! Grounded on `knhk-mu-kernel`'s worker-pool fan-out (many independent
//! Monte-Carlo workers reduced to one result) adapted to this crate's
//! sequencer/reward split rather than a single accumulator.

use rayon::prelude::*;

use crate::error::CoreResult;
use crate::net::{Marking, PetriNet};

use super::evaluator::RewardEvaluator;
use super::reward::{Reward, RewardResult};
use super::sequencer::{Sequencer, SequencerConfig};
use super::HorizonAbort;

/// Runs `replications` independent evaluations of `runs_per_replication`
/// traces each, one per `rayon` task, each with its own RNG stream seeded
/// from `base_seed + replication index` so results are reproducible and no
/// two replications draw the same sequence. `make_reward` is called once
/// per replication (on whichever thread runs it) to build a fresh,
/// unshared `Reward` instance — rewards hold per-run accumulator state, so
/// they are never reused across replications.
///
/// `horizon`, when set, bounds every run's simulated time: required for
/// nets with no reachable deadlock (a live cycle, say), which otherwise
/// never satisfy the sequencer's other stopping condition.
///
/// Returns one `RewardResult` per replication, in replication order,
/// regardless of completion order; callers needing a single estimate
/// reduce the vector themselves (e.g. `scalar_mean`).
pub fn parallel_replications<R, F>(
    net: &PetriNet,
    initial_marking: &Marking,
    base_seed: u64,
    replications: u64,
    runs_per_replication: u64,
    horizon: Option<f64>,
    make_reward: F,
) -> CoreResult<Vec<RewardResult>>
where
    R: Reward + Send + 'static,
    F: Fn() -> R + Sync,
{
    (0..replications)
        .into_par_iter()
        .map(|i| {
            let config = SequencerConfig {
                check_newly_enabled: false,
                seed: base_seed.wrapping_add(i),
            };
            let mut sequencer = Sequencer::new(net, initial_marking.clone(), config);
            if let Some(horizon) = horizon {
                let abort = sequencer.run_abort_handle();
                sequencer.add_observer("horizon", Box::new(HorizonAbort::new(horizon, abort)));
            }
            let evaluator = RewardEvaluator::new(make_reward(), runs_per_replication);
            evaluator.run(&mut sequencer)
        })
        .collect()
}

/// Arithmetic mean of a batch of scalar reward results; `None` if the batch
/// is empty or any result isn't a `RewardResult::Scalar`.
pub fn scalar_mean(results: &[RewardResult]) -> Option<f64> {
    if results.is_empty() {
        return None;
    }
    let mut sum = 0.0;
    for r in results {
        sum += r.as_scalar()?;
    }
    Some(sum / results.len() as f64)
}
