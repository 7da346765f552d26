//! Reverse resumable A*: a per-agent backward search rooted at the agent's
//! goal, used to supply the true-distance heuristic to the forward
//! space-time search without re-running a full search from scratch on every
//! query.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use wh_grid::{Cell, Grid};

/// A resumable Dijkstra search backward from a fixed goal cell. The grid has
/// no directed edges (moves are symmetric), so the same `neighbors` relation
/// used by the forward search also gives this search its predecessors.
///
/// Queries are served by resuming the search exactly as far as needed: a
/// cell closed by an earlier query is never re-expanded, so the total work
/// across a sequence of queries against the same goal is bounded by one full
/// search of the grid.
pub struct GoalHeuristic {
    goal: Cell,
    open: BinaryHeap<Reverse<(u32, i64, Cell)>>,
    dist: HashMap<Cell, u32>,
    closed: HashSet<Cell>,
}

impl GoalHeuristic {
    pub fn new(goal: Cell) -> Self {
        let mut dist = HashMap::new();
        dist.insert(goal, 0);
        let mut open = BinaryHeap::new();
        open.push(Reverse((0, goal.order_key(), goal)));
        Self {
            goal,
            open,
            dist,
            closed: HashSet::new(),
        }
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    /// Reset the search for a new goal. Cheap to call every time a task
    /// changes; the old search state is simply discarded.
    pub fn reset(&mut self, goal: Cell) {
        *self = Self::new(goal);
    }

    /// The true shortest-path distance from `cell` to the goal on `grid`, or
    /// `None` if `cell` cannot reach the goal at all.
    pub fn cost(&mut self, grid: &Grid, cell: Cell) -> Option<u32> {
        if self.closed.contains(&cell) {
            return self.dist.get(&cell).copied();
        }
        while let Some(Reverse((d, _, c))) = self.open.pop() {
            if self.closed.contains(&c) {
                continue;
            }
            self.closed.insert(c);
            let found = c == cell;
            for n in grid.neighbors(c) {
                if n == c || self.closed.contains(&n) {
                    continue;
                }
                let nd = d + 1;
                let improves = self.dist.get(&n).map_or(true, |&cur| nd < cur);
                if improves {
                    self.dist.insert(n, nd);
                    self.open.push(Reverse((nd, n.order_key(), n)));
                }
            }
            if found {
                return Some(d);
            }
        }
        None
    }
}
