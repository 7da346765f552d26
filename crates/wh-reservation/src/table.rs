//! The space-time reservation table.
//!
//! Maps `(cell, tick)` and directed `(from, to, tick)` edges to the agent
//! that owns them. Vertex reservations alone would let two agents swap
//! positions between `t` and `t+1` without ever occupying the same cell at
//! the same tick; the edge map plus its reciprocal check in
//! [`ReservationTable::edge_free`] closes that hole.

use std::collections::HashMap;

use wh_core::{AgentId, Tick};
use wh_grid::Cell;

use crate::error::{ReservationError, ReservationResult};

/// One space-time step of a planned path: the agent occupies `cell` at `tick`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PathStep {
    pub cell: Cell,
    pub tick: Tick,
}

/// Space-time occupancy index shared by all agents' planners.
pub struct ReservationTable {
    cell_owner: HashMap<(Cell, Tick), AgentId>,
    /// Keyed by the directed move `(from, to)` and the tick at which the move
    /// begins (the agent is at `from` at `tick` and `to` at `tick + 1`).
    edge_owner: HashMap<(Cell, Cell, Tick), AgentId>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self {
            cell_owner: HashMap::new(),
            edge_owner: HashMap::new(),
        }
    }

    /// `true` iff `(cell, tick)` is unowned or owned by `agent`.
    pub fn is_free(&self, agent: AgentId, cell: Cell, tick: Tick) -> bool {
        match self.cell_owner.get(&(cell, tick)) {
            None => true,
            Some(&owner) => owner == agent,
        }
    }

    /// `true` iff moving `from -> to` at `tick` does not collide with another
    /// agent's edge reservation and does not swap with an agent moving the
    /// opposite way in the same tick window.
    pub fn edge_free(&self, agent: AgentId, from: Cell, to: Cell, tick: Tick) -> bool {
        let forward_free = match self.edge_owner.get(&(from, to, tick)) {
            None => true,
            Some(&owner) => owner == agent,
        };
        let reciprocal_free = match self.edge_owner.get(&(to, from, tick)) {
            None => true,
            Some(&owner) => owner == agent,
        };
        forward_free && reciprocal_free
    }

    /// Atomically install every `(cell, tick)` and edge entry implied by
    /// `path` (a sequence of consecutive space-time steps). On any conflict,
    /// no entry from this call is written — the table is left exactly as it
    /// was before the call.
    pub fn reserve(&mut self, agent: AgentId, path: &[PathStep]) -> ReservationResult<()> {
        // ── Validate first, write second: keeps the commit atomic. ────────
        for step in path {
            if let Some(&owner) = self.cell_owner.get(&(step.cell, step.tick)) {
                if owner != agent {
                    return Err(ReservationError::Conflict {
                        other: owner,
                        cell: step.cell,
                        tick: step.tick,
                    });
                }
            }
        }
        for pair in path.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if from.cell == to.cell {
                continue; // a wait step reserves no edge
            }
            if !self.edge_free(agent, from.cell, to.cell, from.tick) {
                let owner = self
                    .edge_owner
                    .get(&(from.cell, to.cell, from.tick))
                    .copied()
                    .or_else(|| self.edge_owner.get(&(to.cell, from.cell, from.tick)).copied())
                    .unwrap_or(agent);
                return Err(ReservationError::EdgeConflict {
                    other: owner,
                    from: from.cell,
                    to: to.cell,
                    tick: from.tick,
                });
            }
        }

        for step in path {
            self.cell_owner.insert((step.cell, step.tick), agent);
        }
        for pair in path.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if from.cell != to.cell {
                self.edge_owner.insert((from.cell, to.cell, from.tick), agent);
            }
        }
        Ok(())
    }

    /// Remove every entry owned by `agent`.
    pub fn release(&mut self, agent: AgentId) {
        self.cell_owner.retain(|_, &mut owner| owner != agent);
        self.edge_owner.retain(|_, &mut owner| owner != agent);
    }

    /// Drop every entry with `tick < now`. Bounds table size to
    /// `O(N_agents * reservation_horizon)` regardless of run length.
    pub fn advance(&mut self, now: Tick) {
        self.cell_owner.retain(|&(_, tick), _| tick >= now);
        self.edge_owner.retain(|&(_, _, tick), _| tick >= now);
    }

    /// Total number of live vertex + edge entries. Exposed for the `O(N *
    /// W_res)` size-bound property test.
    pub fn len(&self) -> usize {
        self.cell_owner.len() + self.edge_owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReservationTable {
    fn default() -> Self {
        Self::new()
    }
}
