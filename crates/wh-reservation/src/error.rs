//! Reservation-table error type.

use thiserror::Error;

use wh_core::{AgentId, Tick};
use wh_grid::Cell;

/// Errors produced by [`crate::ReservationTable`].
///
/// `Conflict` is recoverable: the caller (the planner) simply treats the
/// contested step as unavailable and searches around it. It only becomes
/// fatal (`ReservationConflict` in the error taxonomy) if it occurs on a
/// commit the planner itself believed was collision-free — i.e. a bug in
/// commit ordering, not a normal planning outcome.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ReservationError {
    #[error("agent {other} already holds ({cell}, {tick})")]
    Conflict {
        other: AgentId,
        cell: Cell,
        tick: Tick,
    },

    #[error("agent {other} already holds the edge ({from} -> {to}, {tick})")]
    EdgeConflict {
        other: AgentId,
        from: Cell,
        to: Cell,
        tick: Tick,
    },
}

pub type ReservationResult<T> = Result<T, ReservationError>;
