//! Concrete end-to-end simulation scenarios: the sequencer, samplers, and
//! rewards wired together over a real net, checked against closed-form or
//! by-construction expectations.

use stpn_analyzer::net::{features, Marking, PetriNet, PlaceId};
use stpn_analyzer::sim::reward::{SteadyStateMarkingProbability, SymbolicPrefixReward, TransientMarkingProbability};
use stpn_analyzer::sim::sequencer::SequencerConfig;
use stpn_analyzer::sim::{RunAbort, Sampler, SequencerObserver, SimEvent};
use stpn_analyzer::{RewardEvaluator, Sequencer};

fn exp_cycle_net() -> (PetriNet, PlaceId, PlaceId) {
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
        net.transition_mut(t)
            .features
            .set(features::SamplerFeature(Sampler::ShiftedExponential { rate: 1.0, shift: 0.0 }));
    }
    (net, p0, p1)
}

/// Aborts the current run as soon as the observed marking is reached,
/// leaving the net "stuck" there for the remainder of the sampling
/// horizon — the mechanism `TransientMarkingProbability` over such runs
/// turns into a first-passage-time estimator.
struct AbortOnMarking {
    target: Marking,
    abort: RunAbort,
}

impl SequencerObserver for AbortOnMarking {
    fn notify(&mut self, event: &SimEvent) {
        if let SimEvent::FiringExecuted { child, .. } = event {
            if child.petri().map(|p| &p.marking) == Some(&self.target) {
                self.abort.request();
            }
        }
    }
}

/// First-passage time from {p0=1} to {p1=1} over an EXP(1)/EXP(1) cycle is
/// itself Exp(1)-distributed, so stopping each run the instant p1 is
/// reached turns `TransientMarkingProbability(p1=1)` into a Monte-Carlo
/// estimator of `1 - e^{-t}` (spec.md §8 scenario 2).
#[test]
fn exp_exp_cycle_first_passage_matches_one_minus_e_to_the_minus_t() {
    let (net, p0, p1) = exp_cycle_net();
    let mut marking = Marking::new();
    marking.set_tokens(p0, 1);

    let mut target = Marking::new();
    target.set_tokens(p1, 1);

    let mut sequencer = Sequencer::new(&net, marking, SequencerConfig { check_newly_enabled: false, seed: 42 });
    sequencer.add_observer(
        "abort-on-target",
        Box::new(AbortOnMarking { target: target.clone(), abort: sequencer.run_abort_handle() }),
    );

    let time_step = 0.25;
    let samples = 16;
    let evaluator = RewardEvaluator::new(TransientMarkingProbability::new(target, time_step, samples), 20_000);
    let result = evaluator.run(&mut sequencer).unwrap();
    let series = result.as_time_series().expect("transient reward returns a time series");

    let (_, probs) = series.series.iter().next().expect("one tracked marking");
    for (k, &p) in probs.iter().enumerate() {
        let t = k as f64 * time_step;
        let expected = 1.0 - (-t).exp();
        assert!(
            (p - expected).abs() < 0.03,
            "tick {k} (t={t}): estimated {p}, expected {expected}"
        );
    }
}

/// Over the long run, a symmetric EXP(1)/EXP(1) cycle spends half its time
/// in each marking.
#[test]
fn exp_exp_cycle_steady_state_probability_is_one_half() {
    let (net, p0, _p1) = exp_cycle_net();
    let mut marking = Marking::new();
    marking.set_tokens(p0, 1);
    let mut sequencer = Sequencer::new(&net, marking.clone(), SequencerConfig { check_newly_enabled: false, seed: 7 });
    // The cycle never deadlocks on its own, so bound each run's simulated
    // time or it would never reach RUN_END.
    let abort = sequencer.run_abort_handle();
    sequencer.add_observer(
        "horizon",
        Box::new(stpn_analyzer::sim::HorizonAbort::new(50.0, abort)),
    );

    let evaluator = RewardEvaluator::new(SteadyStateMarkingProbability::new(marking), 5_000);
    let result = evaluator.run(&mut sequencer).unwrap();
    let p = result.as_scalar().expect("steady-state reward returns a scalar");
    assert!((p - 0.5).abs() < 0.03, "steady-state occupancy of p0 was {p}, expected ~0.5");
}

/// A net whose only firing sequence is "a" then "b" then "c": the prefix
/// reward's estimate must converge to exactly 1 (every run matches).
#[test]
fn symbolic_prefix_reward_converges_to_one_for_a_forced_sequence() {
    let mut net = PetriNet::new();
    let p0 = net.add_place("p0");
    let p1 = net.add_place("p1");
    let p2 = net.add_place("p2");
    let p3 = net.add_place("p3");
    let a = net.add_transition("a");
    let b = net.add_transition("b");
    let c = net.add_transition("c");
    net.add_precondition(p0, a, 1).unwrap();
    net.add_postcondition(a, p1, 1).unwrap();
    net.add_precondition(p1, b, 1).unwrap();
    net.add_postcondition(b, p2, 1).unwrap();
    net.add_precondition(p2, c, 1).unwrap();
    net.add_postcondition(c, p3, 1).unwrap();
    for t in [a, b, c] {
        net.transition_mut(t)
            .features
            .set(features::StochasticTransitionFeature::constant_rate(1.0));
        net.transition_mut(t)
            .features
            .set(features::SamplerFeature(Sampler::ShiftedExponential { rate: 1.0, shift: 0.0 }));
    }
    let mut marking = Marking::new();
    marking.set_tokens(p0, 1);

    let mut sequencer = Sequencer::new(&net, marking, SequencerConfig::default());
    let evaluator = RewardEvaluator::new(
        SymbolicPrefixReward::new(vec!["a".to_string(), "b".to_string(), "c".to_string()]),
        200,
    );
    let result = evaluator.run(&mut sequencer).unwrap();
    assert_eq!(result.as_scalar(), Some(1.0));
}

/// Two chained empirical-CDF transitions driving a net toward an absorbing
/// marking: sampling three complementary markings over the same traces
/// must sum to (approximately) 1 at every tick (spec.md §8 scenario 4).
#[test]
fn empirical_sampler_time_series_is_valid_across_complementary_markings() {
    let mut net = PetriNet::new();
    let p0 = net.add_place("p0");
    let p1 = net.add_place("p1");
    let p2 = net.add_place("p2");
    let t0 = net.add_transition("t0");
    let t1 = net.add_transition("t1");
    net.add_precondition(p0, t0, 1).unwrap();
    net.add_postcondition(t0, p1, 1).unwrap();
    net.add_precondition(p1, t1, 1).unwrap();
    net.add_postcondition(t1, p2, 1).unwrap();

    // A roughly-uniform(0,10) CDF for both hops.
    let bins: Vec<(f64, f64)> = (1..=10).map(|i| (i as f64, i as f64 / 10.0)).collect();
    for t in [t0, t1] {
        net.transition_mut(t)
            .features
            .set(features::StochasticTransitionFeature::constant_rate(1.0));
        net.transition_mut(t).features.set(features::SamplerFeature(Sampler::empirical(bins.clone(), 0.0, 10.0)));
    }

    let mut marking = Marking::new();
    marking.set_tokens(p0, 1);

    let mut m0 = Marking::new();
    m0.set_tokens(p0, 1);
    let mut m1 = Marking::new();
    m1.set_tokens(p1, 1);
    let mut m2 = Marking::new();
    m2.set_tokens(p2, 1);

    let time_step = 1.0;
    let samples = 20;
    let runs = 5_000;
    let seed = 99;

    let mut series = std::collections::HashMap::new();
    for target in [m0, m1, m2] {
        let mut sequencer = Sequencer::new(&net, marking.clone(), SequencerConfig { check_newly_enabled: false, seed });
        let evaluator = RewardEvaluator::new(TransientMarkingProbability::new(target.clone(), time_step, samples), runs);
        let result = evaluator.run(&mut sequencer).unwrap();
        let ts = result.as_time_series().unwrap();
        let (_, probs) = ts.series.iter().next().unwrap();
        series.insert(target, probs.clone());
    }

    let combined = stpn_analyzer::sim::reward::TimeSeriesRewardResult { time_step, samples, series };
    assert!(combined.is_valid(0.05), "complementary markings must sum to ~1 at every tick");
}
