//! Continuous order generation, the open-order pool, and nearest-order
//! assignment.

use std::collections::VecDeque;

use wh_core::{OrderId, PickupId, SimRng, Tick};
use wh_grid::{Cell, Grid};

use crate::stacks::StackYard;
use crate::task::{Order, Task};

/// Produces new [`Order`]s by sampling pallets and destinations, per the
/// task-assignment loop's generation rule.
pub struct OrderGenerator {
    next_id: u64,
    p_pick: f64,
}

impl OrderGenerator {
    pub fn new(p_pick: f64) -> Self {
        Self { next_id: 0, p_pick }
    }

    /// Produce one order, or `None` if no pallet is currently on a stack.
    pub fn generate(&mut self, stacks: &StackYard, grid: &Grid, rng: &mut SimRng, now: Tick) -> Option<Order> {
        let candidates = stacks.all_pallets_with_depth();
        if candidates.is_empty() {
            return None;
        }
        let (pallet, stack, depth) = candidates[rng.gen_range(0..candidates.len())];

        let mut tasks = VecDeque::new();
        if depth > 0 {
            // Tracks pallets already routed to each stack earlier in this
            // same order, so consecutive blockers spread across stacks
            // instead of all landing on whatever was least loaded before
            // the order started.
            let mut counts: Vec<usize> = (0..stacks.num_stacks())
                .map(|i| stacks.depth(wh_core::StackId(i as u32)))
                .collect();
            for blocker in stacks.pallets_above(stack, depth) {
                let dest = (0..stacks.num_stacks())
                    .filter(|&i| i != stack.index())
                    .min_by_key(|&i| (counts[i], i))
                    .map(|i| wh_core::StackId(i as u32))
                    .unwrap_or(stack);
                tasks.push_back(Task::FreeUp {
                    pallet: blocker,
                    from_stack: stack,
                    to_stack: dest,
                });
                counts[dest.index()] += 1;
            }
        }
        tasks.push_back(Task::Pickup { pallet, from_stack: stack });

        if grid.num_pickups() > 0 && rng.gen_bool(self.p_pick) {
            let to_pickup = PickupId(rng.gen_range(0..grid.num_pickups()) as u32);
            tasks.push_back(Task::Delivery { pallet, to_pickup });
        } else {
            let dest = stacks.least_loaded_excluding(stack);
            tasks.push_back(Task::FreeUp {
                pallet,
                from_stack: stack,
                to_stack: dest,
            });
        }

        let id = OrderId(self.next_id);
        self.next_id += 1;
        Some(Order {
            id,
            tasks,
            created_tick: now,
        })
    }
}

/// The set of orders awaiting assignment, bounded by `o_max` backpressure.
pub struct OrderPool {
    open: Vec<Order>,
    o_max: usize,
}

impl OrderPool {
    pub fn new(o_max: usize) -> Self {
        Self {
            open: Vec::new(),
            o_max,
        }
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// `true` iff generation should pause: the pool is already at capacity.
    pub fn is_full(&self) -> bool {
        self.open.len() >= self.o_max
    }

    pub fn push(&mut self, order: Order) {
        if !self.is_full() {
            self.open.push(order);
        }
    }

    /// Return an in-progress order to the pool regardless of `o_max` — used
    /// when a `Stuck` agent gives up a task it already partially completed.
    /// Dropping a bound order here would silently lose a pallet.
    pub fn return_order(&mut self, order: Order) {
        self.open.push(order);
    }

    /// Assign the open order whose first task's start cell is nearest
    /// `agent_pos` (Manhattan distance), ties broken by earlier creation
    /// tick. Removes and returns it, or `None` if the pool is empty.
    pub fn assign_nearest(&mut self, agent_pos: Cell, grid: &Grid) -> Option<Order> {
        let best_idx = self
            .open
            .iter()
            .enumerate()
            .filter_map(|(i, order)| order.first_task().map(|t| (i, t.start_cell(grid))))
            .min_by_key(|&(i, cell)| (agent_pos.manhattan(cell), self.open[i].created_tick))
            .map(|(i, _)| i)?;
        Some(self.open.remove(best_idx))
    }
}
