//! Structure-of-Arrays storage for all agent state.
//!
//! Every `Vec` field has exactly `count` elements; `AgentId` is the index
//! into all of them.

use std::collections::VecDeque;

use wh_core::{AgentId, PalletId, Tick};
use wh_grid::Cell;
use wh_orders::Order;
use wh_reservation::PathStep;

use crate::state::AgentState;

/// Structure-of-Arrays storage for all agent state.
pub struct AgentStore {
    /// Number of agents. Equals the length of every field below.
    pub count: usize,

    pub position: Vec<Cell>,
    pub carrying: Vec<Option<PalletId>>,
    pub state: Vec<AgentState>,
    pub order: Vec<Option<Order>>,
    pub plan: Vec<Vec<PathStep>>,
    pub plan_start_tick: Vec<Tick>,
    /// Number of consecutive planning failures since the last successful
    /// plan. Reset to `0` on success; when it reaches `R_max` the agent's
    /// task returns to the order pool.
    pub stuck_counter: Vec<u32>,

    /// Ring buffer of an agent's actual positions over the last
    /// `history_capacity` ticks, most recent last. Used to validate a
    /// "plan in the past" replan's anchor steps against what really
    /// happened.
    history: Vec<VecDeque<Cell>>,
    history_capacity: usize,
}

impl AgentStore {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId)
    }

    /// Append `cell` to `agent`'s position history, evicting the oldest
    /// entry once `history_capacity` is exceeded.
    pub fn record_position(&mut self, agent: AgentId, cell: Cell) {
        let h = &mut self.history[agent.index()];
        h.push_back(cell);
        while h.len() > self.history_capacity {
            h.pop_front();
        }
    }

    /// `agent`'s recorded position `ticks_ago` ticks before the most recent
    /// one recorded (`0` = current). Clamped to the oldest entry still held
    /// if `ticks_ago` exceeds `history_capacity`.
    pub fn position_ago(&self, agent: AgentId, ticks_ago: usize) -> Cell {
        let h = &self.history[agent.index()];
        let idx = h.len().saturating_sub(1 + ticks_ago);
        h[idx]
    }

    /// `true` iff `agent`'s actual history, ending just *before* the most
    /// recently recorded position, matches `steps` exactly — the
    /// precondition for accepting a "plan in the past" anchor without
    /// falling back to `now`.
    ///
    /// The most recent entry is the agent's position at the current tick,
    /// already recorded by this tick's `advance_one`; `steps` only covers
    /// ticks strictly before `now`, so it is excluded from the comparison
    /// window.
    pub fn history_matches(&self, agent: AgentId, steps: &[Cell]) -> bool {
        let h = &self.history[agent.index()];
        if h.is_empty() {
            return steps.is_empty();
        }
        let usable = h.len() - 1;
        if steps.len() > usable {
            return false;
        }
        let offset = usable - steps.len();
        h.iter().take(usable).skip(offset).copied().eq(steps.iter().copied())
    }
}

/// Fluent builder for [`AgentStore`]. All arrays are pre-allocated so later
/// field writes are indexed assignments, not pushes.
pub struct AgentStoreBuilder {
    count: usize,
    positions: Vec<Cell>,
    history_capacity: usize,
}

impl AgentStoreBuilder {
    pub fn new(count: usize, positions: Vec<Cell>) -> Self {
        assert_eq!(positions.len(), count, "one initial position per agent");
        Self {
            count,
            positions,
            history_capacity: 2,
        }
    }

    /// How many ticks of position history to retain per agent. Should be at
    /// least `PLAN_IN_PAST_K + 1`.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> AgentStore {
        let mut history = Vec::with_capacity(self.count);
        for &pos in &self.positions {
            let mut h = VecDeque::with_capacity(self.history_capacity);
            h.push_back(pos);
            history.push(h);
        }
        AgentStore {
            count: self.count,
            position: self.positions,
            carrying: vec![None; self.count],
            state: vec![AgentState::Idle; self.count],
            order: std::iter::repeat_with(|| None).take(self.count).collect(),
            plan: vec![Vec::new(); self.count],
            plan_start_tick: vec![Tick::ZERO; self.count],
            stuck_counter: vec![0; self.count],
            history,
            history_capacity: self.history_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_ring_buffer_evicts_oldest() {
        let mut store = AgentStoreBuilder::new(1, vec![Cell::new(0, 0)])
            .history_capacity(3)
            .build();
        store.record_position(AgentId(0), Cell::new(1, 0));
        store.record_position(AgentId(0), Cell::new(2, 0));
        // History is now [0,0 -> 1,0 -> 2,0]; the most recent entry (2,0) is
        // the current position and is excluded from the comparison window.
        assert!(store.history_matches(AgentId(0), &[Cell::new(0, 0), Cell::new(1, 0)]));
        assert!(!store.history_matches(AgentId(0), &[Cell::new(1, 0), Cell::new(2, 0)]));

        store.record_position(AgentId(0), Cell::new(3, 0));
        // Oldest entry (0,0) evicted; usable window is now [1,0 -> 2,0].
        assert!(store.history_matches(AgentId(0), &[Cell::new(1, 0), Cell::new(2, 0)]));
        assert!(!store.history_matches(AgentId(0), &[Cell::new(0, 0), Cell::new(1, 0)]));
    }

    #[test]
    fn fresh_store_starts_idle_and_empty_handed() {
        let store = AgentStoreBuilder::new(3, vec![Cell::new(0, 0); 3]).build();
        assert!(store.state.iter().all(|&s| s == AgentState::Idle));
        assert!(store.carrying.iter().all(Option::is_none));
    }
}
