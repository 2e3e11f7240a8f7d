//! Ambient operational configuration: knobs that are not part of the net
//! itself (queue discipline, safety caps, run counts, RNG seed), loaded
//! from TOML with `serde` (mirroring `knhk-config::config::load_from_file`'s
//! "deserialize, then validate" shape, simplified to this crate's needs —
//! no environment-variable override layer, since that belongs to a CLI
//! front-end this crate deliberately doesn't have).

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Which built-in `EnumerationPolicy` a `PetriComponentsFactory` should
/// install by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueDiscipline {
    Fifo,
    Lifo,
}

impl Default for QueueDiscipline {
    fn default() -> Self {
        QueueDiscipline::Fifo
    }
}

/// Operational knobs for `Analyzer`/`PetriComponentsFactory` construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub queue_discipline: QueueDiscipline,
    /// A safety cap on enumerated node count; `0` means unbounded. A host
    /// application wires this into an `IterationsNumber` stop criterion
    /// rather than the engine enforcing it directly, since the engine
    /// itself is agnostic to stop-criterion choice.
    pub max_nodes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_discipline: QueueDiscipline::default(),
            max_nodes: 0,
        }
    }
}

/// Operational knobs for `Sequencer`/`RewardEvaluator` construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub runs: u64,
    pub timeout_seconds: Option<u64>,
    pub seed: u64,
    pub check_newly_enabled: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: 1_000,
            timeout_seconds: None,
            seed: 0,
            check_newly_enabled: false,
        }
    }
}

impl SimulationConfig {
    pub fn to_sequencer_config(self) -> crate::sim::sequencer::SequencerConfig {
        crate::sim::sequencer::SequencerConfig {
            check_newly_enabled: self.check_newly_enabled,
            seed: self.seed,
        }
    }
}

/// The full configuration document a host application loads from disk:
/// `[engine]` and `[simulation]` TOML tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub engine: EngineConfig,
    pub simulation: SimulationConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(source: &str) -> CoreResult<Self> {
        toml::from_str(source).map_err(|e| CoreError::Validation(format!("invalid configuration: {e}")))
    }

    pub fn from_file(path: &std::path::Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Validation(format!("cannot serialize configuration: {e}")))
    }
}
