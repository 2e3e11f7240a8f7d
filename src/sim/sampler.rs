//! `SamplerFeature`'s concrete values: the probability distributions a
//! stochastic transition draws its time-to-fire from.
//!
//! Grounded on `knhk-mu-kernel`'s Monte-Carlo sampling helpers (the
//! workspace's only other `rand`/`rand_distr` consumer) for the general
//! shape of a `Sampler::sample(&self, rng) -> f64` seam; the individual
//! distribution formulas follow spec.md §4.7 directly.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::error::{CoreError, CoreResult};

/// A concrete sampler. Cheap to clone: recursive/closure-bearing variants
/// are `Arc`-wrapped so attaching the same sampler to many transitions (or
/// cloning a `PetriNet`) never deep-copies distribution state.
#[derive(Clone)]
pub enum Sampler {
    ShiftedExponential {
        rate: f64,
        shift: f64,
    },
    TruncatedExponential {
        rate: f64,
        shift: f64,
        limit: f64,
    },
    Erlang {
        rate: f64,
        shape: u32,
    },
    Uniform {
        min: f64,
        max: f64,
    },
    MetropolisHastings(Arc<MetropolisHastingsSpec>),
    Empirical {
        cdf_bins: Arc<Vec<(f64, f64)>>,
        lower: f64,
        upper: f64,
    },
    Partitioned(Arc<Vec<(f64, Sampler)>>),
    /// Cycles through an explicit sample list from a random start offset.
    /// The cursor is owned by the caller (the sequencer, one per run per
    /// transition) rather than by the sampler itself, so the same
    /// `Sampler` can be shared read-only across parallel runs.
    Pseudo(Arc<Vec<f64>>),
}

/// Adaptive-step Metropolis-Hastings sampler around an arbitrary pdf.
///
/// Per the source CHANGELOG note this is grounded on: the burn-in's
/// "cached second Box-Muller draw" was never actually persisted across
/// calls in the original, making the cache branch dead code. We keep the
/// always-recompute behaviour explicitly (spec.md Design Notes) rather
/// than resurrect a cache that would change the sample path.
pub struct MetropolisHastingsSpec {
    pub pdf: Box<dyn Fn(f64) -> f64 + Send + Sync>,
    pub support: (f64, f64),
    pub initial: f64,
}

impl fmt::Debug for MetropolisHastingsSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetropolisHastingsSpec")
            .field("support", &self.support)
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}

impl PartialEq for MetropolisHastingsSpec {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

const MH_BURN_IN: usize = 10_000;
const MH_BATCH: usize = 100;
const MH_THINNING: usize = 100;

impl MetropolisHastingsSpec {
    pub fn new(
        pdf: Box<dyn Fn(f64) -> f64 + Send + Sync>,
        support: (f64, f64),
        initial: f64,
    ) -> Self {
        Self {
            pdf,
            support,
            initial,
        }
    }

    fn sample(&self, rng: &mut impl Rng) -> f64 {
        let (lo, hi) = self.support;
        let mut current = self.initial;
        let mut sigma = 1.0_f64;
        let mut accepted_in_batch = 0usize;

        for i in 0..MH_BURN_IN {
            if mh_step(self.pdf.as_ref(), &mut current, sigma, lo, hi, rng) {
                accepted_in_batch += 1;
            }
            if (i + 1) % MH_BATCH == 0 {
                let refusal = 1.0 - (accepted_in_batch as f64 / MH_BATCH as f64);
                if refusal < 0.70 {
                    sigma *= 10.0;
                } else if refusal > 0.80 {
                    sigma /= 10.0;
                }
                accepted_in_batch = 0;
            }
        }
        for _ in 0..MH_THINNING {
            mh_step(self.pdf.as_ref(), &mut current, sigma, lo, hi, rng);
        }
        current
    }
}

fn mh_step(
    pdf: &(dyn Fn(f64) -> f64 + Send + Sync),
    current: &mut f64,
    sigma: f64,
    lo: f64,
    hi: f64,
    rng: &mut impl Rng,
) -> bool {
    let candidate = *current + sigma * box_muller(rng);
    if candidate < lo || candidate > hi {
        return false;
    }
    let p_cur = pdf(*current);
    let p_cand = pdf(candidate);
    let accept_prob = if p_cur <= 0.0 {
        1.0
    } else {
        (p_cand / p_cur).min(1.0)
    };
    if rng.gen::<f64>() < accept_prob {
        *current = candidate;
        true
    } else {
        false
    }
}

/// Standard Gaussian variate via the classic Box-Muller transform.
fn box_muller(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

impl Sampler {
    pub fn partitioned(pieces: Vec<(f64, Sampler)>) -> CoreResult<Self> {
        let total: f64 = pieces.iter().map(|(mass, _)| *mass).sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(CoreError::Domain(format!(
                "partitioned sampler masses sum to {total}, expected 1.0 (+/- 1e-6)"
            )));
        }
        if pieces.is_empty() {
            return Err(CoreError::Domain(
                "partitioned sampler must have at least one piece".into(),
            ));
        }
        Ok(Sampler::Partitioned(Arc::new(pieces)))
    }

    pub fn empirical(cdf_bins: Vec<(f64, f64)>, lower: f64, upper: f64) -> Self {
        Sampler::Empirical {
            cdf_bins: Arc::new(cdf_bins),
            lower,
            upper,
        }
    }

    pub fn pseudo(sequence: Vec<f64>) -> Self {
        Sampler::Pseudo(Arc::new(sequence))
    }

    /// Reads an eagerly-loaded sample sequence from a file, one value per
    /// whitespace-separated token, closing the file before returning (the
    /// only sampler variant with an `Io` failure mode, per spec §5).
    pub fn pseudo_from_file(path: &std::path::Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut values = Vec::new();
        for token in content.split_whitespace() {
            let value: f64 = token
                .parse()
                .map_err(|_| CoreError::Io(format!("invalid sample value '{token}' in {path:?}")))?;
            values.push(value);
        }
        Ok(Sampler::pseudo(values))
    }

    /// Draws one value. `Sampler::Pseudo` cannot be sampled through this
    /// method (it needs caller-owned cursor state); use
    /// [`crate::sim::sequencer`]'s per-run cursor bookkeeping instead.
    pub fn sample(&self, rng: &mut impl Rng) -> CoreResult<f64> {
        match self {
            Sampler::ShiftedExponential { rate, shift } => {
                let dist = make_exp(*rate)?;
                Ok(shift + dist.sample(rng))
            }
            Sampler::TruncatedExponential { rate, shift, limit } => {
                let dist = make_exp(*rate)?;
                loop {
                    let value = shift + dist.sample(rng);
                    if value <= *limit {
                        return Ok(value);
                    }
                }
            }
            Sampler::Erlang { rate, shape } => {
                let dist = make_exp(*rate)?;
                Ok((0..*shape).map(|_| dist.sample(rng)).sum())
            }
            Sampler::Uniform { min, max } => {
                if (max - min).abs() < f64::EPSILON {
                    return Ok(*min);
                }
                Ok(min + rng.gen::<f64>() * (max - min))
            }
            Sampler::MetropolisHastings(spec) => Ok(spec.sample(rng)),
            Sampler::Empirical {
                cdf_bins,
                lower,
                upper,
            } => sample_empirical(cdf_bins, *lower, *upper, rng),
            Sampler::Partitioned(pieces) => {
                let u = rng.gen::<f64>();
                let mut acc = 0.0;
                for (mass, piece) in pieces.iter() {
                    acc += mass;
                    if u <= acc {
                        return piece.sample(rng);
                    }
                }
                pieces
                    .last()
                    .expect("validated non-empty at construction")
                    .1
                    .sample(rng)
            }
            Sampler::Pseudo(_) => Err(CoreError::Runtime(
                "Pseudo sampler requires cursor-based sampling via the sequencer".into(),
            )),
        }
    }
}

fn make_exp(rate: f64) -> CoreResult<Exp<f64>> {
    Exp::new(rate).map_err(|e| CoreError::Domain(format!("invalid exponential rate {rate}: {e}")))
}

fn sample_empirical(bins: &[(f64, f64)], lower: f64, upper: f64, rng: &mut impl Rng) -> CoreResult<f64> {
    if bins.is_empty() {
        return Err(CoreError::Domain("empirical sampler has no CDF bins".into()));
    }
    let u = rng.gen::<f64>();
    let mut prev_x = lower;
    let mut prev_cdf = 0.0;
    for &(x, cdf) in bins {
        if u <= cdf {
            if (cdf - prev_cdf).abs() < f64::EPSILON {
                return Ok(x);
            }
            let frac = (u - prev_cdf) / (cdf - prev_cdf);
            return Ok(prev_x + frac * (x - prev_x));
        }
        prev_x = x;
        prev_cdf = cdf;
    }
    Ok(upper)
}

/// Advances a `Pseudo` sampler's cursor and returns the value at its
/// previous position, wrapping around the sequence. The start offset is
/// chosen once, at random, by the caller (see
/// `Sequencer::initial_pseudo_cursor`).
pub fn pseudo_next(sequence: &[f64], cursor: &mut usize) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    let value = sequence[*cursor % sequence.len()];
    *cursor += 1;
    value
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sampler::ShiftedExponential { rate, shift } => f
                .debug_struct("ShiftedExponential")
                .field("rate", rate)
                .field("shift", shift)
                .finish(),
            Sampler::TruncatedExponential { rate, shift, limit } => f
                .debug_struct("TruncatedExponential")
                .field("rate", rate)
                .field("shift", shift)
                .field("limit", limit)
                .finish(),
            Sampler::Erlang { rate, shape } => f
                .debug_struct("Erlang")
                .field("rate", rate)
                .field("shape", shape)
                .finish(),
            Sampler::Uniform { min, max } => {
                f.debug_struct("Uniform").field("min", min).field("max", max).finish()
            }
            Sampler::MetropolisHastings(spec) => f.debug_tuple("MetropolisHastings").field(spec).finish(),
            Sampler::Empirical { lower, upper, cdf_bins } => f
                .debug_struct("Empirical")
                .field("bins", &cdf_bins.len())
                .field("lower", lower)
                .field("upper", upper)
                .finish(),
            Sampler::Partitioned(pieces) => f.debug_tuple("Partitioned").field(&pieces.len()).finish(),
            Sampler::Pseudo(values) => f.debug_tuple("Pseudo").field(&values.len()).finish(),
        }
    }
}

impl PartialEq for Sampler {
    fn eq(&self, other: &Self) -> bool {
        use Sampler::*;
        match (self, other) {
            (ShiftedExponential { rate: r1, shift: s1 }, ShiftedExponential { rate: r2, shift: s2 }) => {
                r1 == r2 && s1 == s2
            }
            (
                TruncatedExponential { rate: r1, shift: s1, limit: l1 },
                TruncatedExponential { rate: r2, shift: s2, limit: l2 },
            ) => r1 == r2 && s1 == s2 && l1 == l2,
            (Erlang { rate: r1, shape: h1 }, Erlang { rate: r2, shape: h2 }) => r1 == r2 && h1 == h2,
            (Uniform { min: a1, max: b1 }, Uniform { min: a2, max: b2 }) => a1 == a2 && b1 == b2,
            (MetropolisHastings(a), MetropolisHastings(b)) => Arc::ptr_eq(a, b),
            (
                Empirical { cdf_bins: c1, lower: l1, upper: u1 },
                Empirical { cdf_bins: c2, lower: l2, upper: u2 },
            ) => (Arc::ptr_eq(c1, c2) || c1 == c2) && l1 == l2 && u1 == u2,
            (Partitioned(a), Partitioned(b)) => Arc::ptr_eq(a, b),
            (Pseudo(a), Pseudo(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}
