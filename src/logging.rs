//! Structured logging conventions.
//!
//! The engine and simulation kernel emit `tracing` spans and events
//! (`tracing::debug!`/`trace!` around enumeration steps, per-run/per-firing
//! spans in the sequencer); this crate never installs a global subscriber
//! on its own (library hygiene, as in `knhk-workflow-engine` and the other
//! `knhk-*` library crates — only their binaries call an init function).
//!
//! `init_tracing` is that init function, for host binaries and tests that
//! want a ready-made `EnvFilter`-driven subscriber without pulling in their
//! own `tracing-subscriber` setup. It is gated behind the `tracing-init`
//! feature so the dependency stays out of the default build.

#[cfg(feature = "tracing-init")]
/// Installs a global `tracing` subscriber honoring `RUST_LOG` (defaulting to
/// `info` when unset). Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[cfg(all(test, feature = "tracing-init"))]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
