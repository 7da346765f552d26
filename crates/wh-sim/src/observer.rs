//! Simulation observer trait for progress reporting and data collection.

use wh_core::Tick;
use wh_agent::AgentStore;

/// Callbacks fired at well-defined points in the tick loop. All methods have
/// no-op default bodies, so an observer only implements what it needs.
///
/// ```ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, agents: &AgentStore) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {} agents", agents.count);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after positions have advanced and the render frame has been
    /// queued, but before the tick boundary sleep.
    fn on_tick_end(&mut self, _tick: Tick, _agents: &AgentStore) {}

    /// Called once, after the run loop exits (normal shutdown signal, not an
    /// error).
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
