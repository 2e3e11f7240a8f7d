//! The generic enumeration engine: grows a `SuccessionGraph` from an
//! initial state using pluggable policies, event builders, successor
//! evaluators, pre/post processors, and stop criteria (spec §4.1).
//!
//! Model-agnostic: `crate::petri` supplies the concrete
//! `ComponentsFactory<PetriNet, TransitionId>` this module's `Analyzer`
//! is parameterized over.

pub mod analyzer;
pub mod components;
pub mod observer;
pub mod policy;
pub mod stop;

pub use analyzer::{AnalyzeOutcome, Analyzer};
pub use components::{ComponentsFactory, EnabledEventsBuilder, SuccessionProcessor, SuccessorEvaluator};
pub use observer::{EngineObserver, Notification, ObserverList};
pub use policy::EnumerationPolicy;
pub use stop::{StopCriterion, StopSignal};
