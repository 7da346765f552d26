//! Planner error type.

use thiserror::Error;

use wh_core::AgentId;
use wh_grid::Cell;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PlannerError {
    /// The space-time search exhausted its open set before reaching the goal
    /// or producing any partial path — the goal is unreachable from `start`
    /// given the current obstacles and reservations.
    #[error("agent {agent} cannot reach {goal} from {start}")]
    Unreachable {
        agent: AgentId,
        start: Cell,
        goal: Cell,
    },
}

pub type PlannerResult<T> = Result<T, PlannerError>;
