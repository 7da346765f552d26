//! Environment-variable configuration surface.
//!
//! Every value has a documented default so a bare `SimConfig::from_env()` (no
//! variables set) produces a small, runnable simulation. A malformed or
//! out-of-range value is rejected eagerly, before the grid or any agent is
//! constructed.

use std::env;
use std::str::FromStr;

use thiserror::Error;

/// Errors surfaced while loading configuration from the environment.
///
/// Always fatal: the binary logs this and exits with code `2` without
/// starting the tick loop.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var} must be positive, got {value}")]
    NotPositive { var: &'static str, value: i64 },

    #[error("RESERVATION_HORIZON ({horizon}) must be >= PLANNING_WINDOW ({window})")]
    HorizonTooShort { horizon: u64, window: u64 },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level simulation configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub grid_width: u32,
    pub grid_height: u32,

    pub num_agents: u32,
    pub num_stacks: u32,
    pub num_pickups: u32,
    pub num_obstacles: u32,

    /// `W_plan`: how many ticks ahead each per-agent search extends.
    pub planning_window: u64,
    /// `W_res`: how far ahead the reservation table retains entries.
    pub reservation_horizon: u64,

    pub tick_period_ms: u64,
    pub random_seed: u64,

    pub render_transport_url: String,

    /// "Plan in the past" anchor offset `k`.
    pub plan_in_past_k: u64,
    /// Consecutive replan failures tolerated before an agent's task is
    /// abandoned and it is returned to `Idle`.
    pub r_max: u32,
    /// Maximum open (unassigned or in-progress) orders before generation
    /// pauses.
    pub o_max: u32,
    /// Probability that a generated order's destination is a pickup zone
    /// rather than another stack.
    pub p_pick: f64,
    /// Capacity of the render transport's in-memory frame queue.
    pub render_queue_capacity: usize,
}

impl SimConfig {
    /// Load and validate configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        let grid_width = positive_u32("GRID_WIDTH", 20)?;
        let grid_height = positive_u32("GRID_HEIGHT", 20)?;

        let num_agents = positive_u32("NUM_AGENTS", 4)?;
        let num_stacks = positive_u32("NUM_STACKS", 6)?;
        let num_pickups = positive_u32("NUM_PICKUPS", 2)?;
        let num_obstacles = parsed_or("NUM_OBSTACLES", 0u32)?;

        let planning_window = positive_u64("PLANNING_WINDOW", 16)?;
        let reservation_horizon = positive_u64("RESERVATION_HORIZON", planning_window)?;
        if reservation_horizon < planning_window {
            return Err(ConfigError::HorizonTooShort {
                horizon: reservation_horizon,
                window: planning_window,
            });
        }

        let tick_period_ms = positive_u64("TICK_PERIOD_MS", 1000)?;
        let random_seed = parsed_or("RANDOM_SEED", 42u64)?;

        let render_transport_url =
            env::var("RENDER_TRANSPORT_URL").unwrap_or_else(|_| "stdout://".to_string());

        let plan_in_past_k = parsed_or("PLAN_IN_PAST_K", 1u64)?;
        let r_max = positive_u32("R_MAX", 5)?;
        let o_max = positive_u32("O_MAX", 32)?;
        let p_pick = parsed_or("P_PICK", 0.6f64)?;
        if !(0.0..=1.0).contains(&p_pick) {
            return Err(ConfigError::Invalid {
                var: "P_PICK",
                value: p_pick.to_string(),
                reason: "must be in [0, 1]".into(),
            });
        }
        let render_queue_capacity = positive_u32("RENDER_QUEUE_CAPACITY", 64)? as usize;

        Ok(Self {
            grid_width,
            grid_height,
            num_agents,
            num_stacks,
            num_pickups,
            num_obstacles,
            planning_window,
            reservation_horizon,
            tick_period_ms,
            random_seed,
            render_transport_url,
            plan_in_past_k,
            r_max,
            o_max,
            p_pick,
            render_queue_capacity,
        })
    }
}

// ── Parsing helpers ───────────────────────────────────────────────────────────

fn parsed_or<T>(var: &'static str, default: T) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

fn positive_u32(var: &'static str, default: u32) -> ConfigResult<u32> {
    let value = parsed_or(var, default)?;
    if value == 0 {
        return Err(ConfigError::NotPositive { var, value: 0 });
    }
    Ok(value)
}

fn positive_u64(var: &'static str, default: u64) -> ConfigResult<u64> {
    let value = parsed_or(var, default)?;
    if value == 0 {
        return Err(ConfigError::NotPositive { var, value: 0 });
    }
    Ok(value)
}
