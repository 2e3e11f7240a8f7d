//! Symbolic state-space enumeration and stochastic simulation for
//! stochastic time Petri nets (STPNs) and their restrictions (time Petri
//! nets, CTMCs, Markov-regenerative processes, semi-Markov processes).
//!
//! This crate provides the core the rest of such an analysis tool is built
//! on: a generic, pluggable state-space **enumeration engine** (`engine`,
//! `graph`), the **Petri-net firing model** (`net`, `petri`), the small
//! **expression calculator** post-updaters and enabling functions are
//! written in (`expr`), and a **stochastic simulation kernel** that runs
//! Monte-Carlo firing traces and reduces them to transient/steady-state
//! estimates (`sim`).
//!
//! Deliberately out of scope: closed-form analytical kernels (regenerative
//! transient, GSPN uniformization, one-general transient analysis), the
//! DBM/continuous-PDF algebra backing symbolic STPN states, a CLI, and any
//! persistence format. `state::TimedStateFeature` and
//! `state::StochasticStateFeature` are stable, opaque seams an external
//! analytical kernel would consume; `graph::SuccessionGraph::modify_states`
//! is the transform such a kernel would apply to reduce a firing-level
//! graph to a symbolic-class graph.

pub mod config;
pub mod engine;
pub mod error;
pub mod expr;
pub mod featurizable;
pub mod graph;
pub mod logging;
pub mod net;
pub mod pair;
pub mod petri;
pub mod sim;
pub mod state;
pub mod succession;

pub use config::{AnalysisConfig, EngineConfig, SimulationConfig};
pub use engine::{AnalyzeOutcome, Analyzer};
pub use error::{CoreError, CoreResult, StateError, ValidationLevel, ValidationMessage};
pub use featurizable::{Feature, FeatureMap};
pub use graph::{NodeId, SuccessionGraph};
pub use net::{Marking, PetriNet, PlaceId, TransitionId};
pub use pair::Pair;
pub use petri::PetriComponentsFactory;
pub use sim::{parallel_replications, RewardEvaluator, RewardEvaluatorTimeout, Sequencer};
pub use state::State;
pub use succession::Succession;
