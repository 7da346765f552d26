//! Tick-loop error type.

use thiserror::Error;

use wh_core::AgentId;

#[derive(Debug, Error)]
pub enum SimError {
    /// An agent's reservation commit conflicted with a reservation the
    /// planner itself believed was free — a bug in commit ordering, not a
    /// normal planning outcome. Fatal: the tick loop aborts rather than
    /// running on an inconsistent reservation table.
    #[error("reservation conflict committing agent {agent}'s plan: {source}")]
    ReservationConflict {
        agent: AgentId,
        #[source]
        source: wh_reservation::ReservationError,
    },

    /// `agent` exhausted `R_max` consecutive planning failures. Recovered
    /// locally by the tick loop (task returned to the pool, agent
    /// reassigned) — surfaced here only so observers can count it.
    #[error("agent {0} exhausted its planning retries")]
    PlannerExhausted(AgentId),
}

pub type SimResult<T> = Result<T, SimError>;
