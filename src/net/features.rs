//! Transition features. Each is a small, nearly-immutable record
//! attached to a `Transition` through its `FeatureMap`.

use super::ids::TransitionId;
use crate::expr::Expr;
use crate::sim::sampler::Sampler;
use std::collections::HashSet;

/// Marking-dependent clock-rate scaling for a stochastic transition. The
/// sampled time-to-fire is divided by this rate, evaluated against the
/// current marking, at every step of the sequencer.
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticTransitionFeature {
    pub rate: Expr,
}

impl StochasticTransitionFeature {
    pub fn constant_rate(rate: f64) -> Self {
        Self {
            rate: Expr::Literal(crate::expr::Value::Real(rate)),
        }
    }
}

/// Time Petri Net semantics: a firing window `[min, max]` relative to the
/// instant the transition became enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedTransitionFeature {
    pub min: f64,
    pub max: f64,
}

/// Boolean expression over place token counts that gates enabling in
/// addition to the structural precondition/inhibitor arcs.
///
/// Equality is structural equality of the parsed expression's AST. Earlier
/// engines of this kind have shipped an `EnablingFunction` equality that
/// compared source text or object identity instead of parsed structure,
/// which let semantically-identical guards (e.g. differing only in
/// whitespace) register as distinct and silently duplicate states during
/// enumeration; we deliberately compare ASTs instead, so two
/// `EnablingFunction`s are equal iff their expressions parse to the same
/// tree.
#[derive(Debug, Clone, PartialEq)]
pub struct EnablingFunction {
    pub source: String,
    pub expr: Expr,
}

impl EnablingFunction {
    pub fn parse(source: &str) -> crate::error::CoreResult<Self> {
        Ok(Self {
            source: source.to_string(),
            expr: crate::expr::parser::parse(source)?,
        })
    }
}

/// Integer priority used to break ties among enabled immediate transitions.
/// Absent feature means `-infinity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority(pub i64);

impl Priority {
    pub const ABSENT: i64 = i64::MIN;
}

/// Peer transitions whose clocks are forcibly resampled when this
/// transition fires.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResetSet(pub HashSet<TransitionId>);

/// Places zeroed when this transition fires, applied as part of the token
/// removal step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaceFlusher(pub HashSet<super::ids::PlaceId>);

/// Ordered place -> expression rewrite applied after the default
/// post-condition token addition. All expressions are evaluated against the
/// marking *before* any of them are applied, then bulk-assigned
/// (simultaneous-assignment semantics).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PostUpdater(pub Vec<(super::ids::PlaceId, Expr)>);

/// The concrete sampler used to draw a fresh time-to-fire whenever this
/// transition becomes newly enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerFeature(pub Sampler);
