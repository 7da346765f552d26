//! Windowed, reservation-aware space-time A* for a single agent.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use wh_core::{AgentId, Tick};
use wh_grid::{Cell, Grid};
use wh_reservation::{PathStep, ReservationTable};

use crate::error::{PlannerError, PlannerResult};
use crate::heuristic::GoalHeuristic;

type Node = (Cell, Tick);

/// Best partial-path endpoint seen so far, tracked for the window-exhausted
/// fallback. Ordered by ascending `h`, then by descending path length
/// (`g`, preferring progress), then by `Cell::order_key` for a reproducible
/// tie-break.
struct BestPartial {
    h: u32,
    g: u32,
    cell: Cell,
    tick: Tick,
}

impl BestPartial {
    fn consider(&mut self, h: u32, g: u32, cell: Cell, tick: Tick) {
        let better = h < self.h
            || (h == self.h && g > self.g)
            || (h == self.h && g == self.g && cell.order_key() < self.cell.order_key());
        if better {
            *self = BestPartial { h, g, cell, tick };
        }
    }
}

/// Search a collision-free path for `agent` from `(start, t_s)` to `goal`,
/// exploring at most `window` ticks ahead. `reservations` is consulted as it
/// stands at call time — the caller is responsible for releasing `agent`'s
/// own prior reservations first so this search doesn't treat them as
/// obstacles.
///
/// On success the returned path always spans exactly `window + 1` steps
/// (`t_s` through `t_s + window`), the tail padded with waits at the final
/// cell when the goal is reached early.
pub fn plan(
    agent: AgentId,
    start: Cell,
    t_s: Tick,
    goal: Cell,
    window: u32,
    grid: &Grid,
    reservations: &ReservationTable,
    heuristic: &mut GoalHeuristic,
) -> PlannerResult<Vec<PathStep>> {
    let deadline = t_s.offset(window as u64);

    let h_start = match heuristic.cost(grid, start) {
        Some(h) => h,
        None => {
            return Err(PlannerError::Unreachable { agent, start, goal });
        }
    };

    let mut g_score: HashMap<Node, u32> = HashMap::new();
    let mut came_from: HashMap<Node, Node> = HashMap::new();
    g_score.insert((start, t_s), 0);

    let mut open: BinaryHeap<Reverse<(u32, u64, i64, Cell, Tick, u32)>> = BinaryHeap::new();
    open.push(Reverse((h_start, t_s.0, start.order_key(), start, t_s, 0)));

    let mut best = BestPartial {
        h: h_start,
        g: 0,
        cell: start,
        tick: t_s,
    };

    while let Some(Reverse((_, _, _, cell, tick, g))) = open.pop() {
        // Stale entry: a cheaper path to this node was already found.
        if g_score.get(&(cell, tick)).copied() != Some(g) {
            continue;
        }

        if cell == goal {
            return Ok(reconstruct(&came_from, start, t_s, cell, tick, deadline));
        }

        let h = heuristic.cost(grid, cell).unwrap_or(u32::MAX);
        best.consider(h, g, cell, tick);

        if tick == deadline {
            continue;
        }

        let next_tick = tick.offset(1);
        for next_cell in grid.neighbors(cell) {
            if !reservations.is_free(agent, next_cell, next_tick) {
                continue;
            }
            if next_cell != cell && !reservations.edge_free(agent, cell, next_cell, tick) {
                continue;
            }
            let tentative_g = g + 1;
            let key = (next_cell, next_tick);
            if g_score.get(&key).map_or(true, |&cur| tentative_g < cur) {
                g_score.insert(key, tentative_g);
                came_from.insert(key, (cell, tick));
                let h_next = heuristic.cost(grid, next_cell).unwrap_or(u32::MAX);
                let f = tentative_g.saturating_add(h_next);
                open.push(Reverse((
                    f,
                    next_tick.0,
                    next_cell.order_key(),
                    next_cell,
                    next_tick,
                    tentative_g,
                )));
            }
        }
    }

    if best.cell == start && best.tick == t_s {
        // Not even a single wait step was available from the start cell:
        // the agent is completely boxed in by other agents' reservations.
        return Err(PlannerError::Unreachable { agent, start, goal });
    }

    Ok(reconstruct(&came_from, start, t_s, best.cell, best.tick, deadline))
}

/// Walk `came_from` back to `(start, t_s)`, then pad the tail with waits at
/// the final cell up to `deadline` so every returned path covers the full
/// window.
fn reconstruct(
    came_from: &HashMap<Node, Node>,
    start: Cell,
    t_s: Tick,
    end_cell: Cell,
    end_tick: Tick,
    deadline: Tick,
) -> Vec<PathStep> {
    let mut steps = vec![PathStep {
        cell: end_cell,
        tick: end_tick,
    }];
    let mut cur = (end_cell, end_tick);
    while cur != (start, t_s) {
        let prev = came_from[&cur];
        steps.push(PathStep {
            cell: prev.0,
            tick: prev.1,
        });
        cur = prev;
    }
    steps.reverse();

    let mut last = *steps.last().unwrap();
    while last.tick < deadline {
        last = PathStep {
            cell: last.cell,
            tick: last.tick.offset(1),
        };
        steps.push(last);
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use wh_grid::GridBuilder;

    fn agent() -> AgentId {
        AgentId(0)
    }

    #[test]
    fn direct_path_reaches_goal_and_pads_tail() {
        let grid = GridBuilder::new(5, 5).unwrap().build();
        let reservations = ReservationTable::new();
        let mut h = GoalHeuristic::new(Cell::new(2, 0));
        let path = plan(
            agent(),
            Cell::new(0, 0),
            Tick(0),
            Cell::new(2, 0),
            10,
            &grid,
            &reservations,
            &mut h,
        )
        .unwrap();
        assert_eq!(path.len(), 11); // t=0..=10
        assert_eq!(path[0], PathStep { cell: Cell::new(0, 0), tick: Tick(0) });
        assert_eq!(path[2], PathStep { cell: Cell::new(2, 0), tick: Tick(2) });
        assert_eq!(path.last().unwrap().cell, Cell::new(2, 0));
        assert_eq!(path.last().unwrap().tick, Tick(10));
    }

    #[test]
    fn blocked_cell_forces_detour() {
        let mut b = GridBuilder::new(3, 3).unwrap();
        b.add_obstacle(Cell::new(1, 0)).unwrap();
        let grid = b.build();
        let reservations = ReservationTable::new();
        let mut h = GoalHeuristic::new(Cell::new(2, 0));
        let path = plan(
            agent(),
            Cell::new(0, 0),
            Tick(0),
            Cell::new(2, 0),
            10,
            &grid,
            &reservations,
            &mut h,
        )
        .unwrap();
        assert_eq!(path.last().unwrap().cell, Cell::new(2, 0));
        assert!(path.iter().all(|s| s.cell != Cell::new(1, 0)));
    }

    #[test]
    fn reserved_cell_is_avoided() {
        let grid = GridBuilder::new(3, 1).unwrap().build();
        let mut reservations = ReservationTable::new();
        reservations
            .reserve(
                AgentId(9),
                &[PathStep { cell: Cell::new(1, 0), tick: Tick(1) }],
            )
            .unwrap();
        let mut h = GoalHeuristic::new(Cell::new(2, 0));
        let path = plan(
            agent(),
            Cell::new(0, 0),
            Tick(0),
            Cell::new(2, 0),
            5,
            &grid,
            &reservations,
            &mut h,
        )
        .unwrap();
        assert!(!path.iter().any(|s| s.cell == Cell::new(1, 0) && s.tick == Tick(1)));
    }

    #[test]
    fn window_exhausted_returns_best_partial() {
        let grid = GridBuilder::new(10, 1).unwrap().build();
        let reservations = ReservationTable::new();
        let mut h = GoalHeuristic::new(Cell::new(9, 0));
        let path = plan(
            agent(),
            Cell::new(0, 0),
            Tick(0),
            Cell::new(9, 0),
            3,
            &grid,
            &reservations,
            &mut h,
        )
        .unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.last().unwrap().cell, Cell::new(3, 0));
    }

    #[test]
    fn fully_boxed_in_agent_is_unreachable() {
        let grid = GridBuilder::new(2, 1).unwrap().build();
        let mut reservations = ReservationTable::new();
        reservations
            .reserve(
                AgentId(9),
                &[
                    PathStep { cell: Cell::new(0, 0), tick: Tick(1) },
                    PathStep { cell: Cell::new(1, 0), tick: Tick(1) },
                ],
            )
            .unwrap();
        let mut h = GoalHeuristic::new(Cell::new(1, 0));
        let err = plan(
            agent(),
            Cell::new(0, 0),
            Tick(0),
            Cell::new(1, 0),
            5,
            &grid,
            &reservations,
            &mut h,
        );
        assert!(matches!(err, Err(PlannerError::Unreachable { .. })));
    }
}
