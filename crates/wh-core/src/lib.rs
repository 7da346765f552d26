//! `wh-core` — foundational types for the warehouse simulation.
//!
//! This crate is a dependency of every other `wh-*` crate. It intentionally
//! has no `wh-*` dependencies and minimal external ones (only `rand`,
//! `thiserror`, and `tracing`, plus optional `serde`).
//!
//! | Module     | Contents                                   |
//! |------------|---------------------------------------------|
//! | [`ids`]    | `AgentId`, `PalletId`, `StackId`, `PickupId`, `OrderId` |
//! | [`time`]   | `Tick`, `TickClock`                        |
//! | [`rng`]    | `AgentRng` (per-agent), `SimRng` (global)  |
//! | [`config`] | `SimConfig::from_env`, `ConfigError`       |

pub mod config;
pub mod ids;
pub mod rng;
pub mod time;

pub use config::{ConfigError, ConfigResult, SimConfig};
pub use ids::{AgentId, OrderId, PalletId, PickupId, StackId};
pub use rng::{AgentRng, SimRng};
pub use time::{Tick, TickClock};
