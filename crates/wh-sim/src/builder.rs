//! Fluent construction of a [`Sim`] with sane defaults for every tunable.

use wh_agent::AgentStoreBuilder;
use wh_core::{SimRng, TickClock};
use wh_grid::{Cell, Grid};
use wh_orders::{OrderGenerator, OrderPool, StackYard};
use wh_planner::GoalHeuristic;

use crate::sim::Sim;

pub struct SimBuilder {
    grid: Grid,
    stacks: StackYard,
    positions: Vec<Cell>,
    window: u32,
    plan_in_past_k: u64,
    r_max: u32,
    p_pick: f64,
    o_max: usize,
    render_queue_capacity: usize,
    seed: u64,
    tick_period_ms: u64,
}

impl SimBuilder {
    pub fn new(grid: Grid, stacks: StackYard) -> Self {
        Self {
            grid,
            stacks,
            positions: Vec::new(),
            window: 16,
            plan_in_past_k: 1,
            r_max: 5,
            p_pick: 0.6,
            o_max: 32,
            render_queue_capacity: 64,
            seed: 0,
            tick_period_ms: 1000,
        }
    }

    pub fn agents(mut self, positions: Vec<Cell>) -> Self {
        self.positions = positions;
        self
    }

    pub fn window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    pub fn plan_in_past_k(mut self, k: u64) -> Self {
        self.plan_in_past_k = k;
        self
    }

    pub fn r_max(mut self, r_max: u32) -> Self {
        self.r_max = r_max;
        self
    }

    pub fn p_pick(mut self, p_pick: f64) -> Self {
        self.p_pick = p_pick;
        self
    }

    pub fn o_max(mut self, o_max: usize) -> Self {
        self.o_max = o_max;
        self
    }

    pub fn render_queue_capacity(mut self, capacity: usize) -> Self {
        self.render_queue_capacity = capacity;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn tick_period_ms(mut self, ms: u64) -> Self {
        self.tick_period_ms = ms;
        self
    }

    pub fn build(self) -> Sim {
        let count = self.positions.len();
        let agents = AgentStoreBuilder::new(count, self.positions.clone())
            .history_capacity(self.plan_in_past_k as usize + 1)
            .build();
        // Every agent starts idle with no goal yet; the heuristic is reset
        // to the real goal the first time that agent is assigned a task.
        let heuristics = self
            .positions
            .iter()
            .map(|&p| GoalHeuristic::new(p))
            .collect();

        Sim::new(
            self.grid,
            self.stacks,
            agents,
            heuristics,
            OrderGenerator::new(self.p_pick),
            OrderPool::new(self.o_max),
            SimRng::new(self.seed),
            TickClock::new(self.tick_period_ms),
            self.window,
            self.plan_in_past_k,
            self.r_max,
            self.render_queue_capacity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wh_core::StackId;

    fn tiny_grid() -> (Grid, StackYard) {
        let mut b = wh_grid::GridBuilder::new(5, 5).unwrap();
        b.add_stack(Cell::new(0, 0)).unwrap();
        b.add_pickup(Cell::new(4, 4)).unwrap();
        let grid = b.build();
        let mut stacks = StackYard::new(1);
        stacks.push(StackId(0), wh_core::PalletId(0));
        (grid, stacks)
    }

    #[test]
    fn builder_applies_overrides() {
        let (grid, stacks) = tiny_grid();
        let sim = SimBuilder::new(grid, stacks)
            .agents(vec![Cell::new(1, 1)])
            .window(8)
            .r_max(3)
            .seed(42)
            .build();
        assert_eq!(sim.agents.count, 1);
    }

    #[test]
    fn defaults_produce_a_runnable_sim() {
        let (grid, stacks) = tiny_grid();
        let mut sim = SimBuilder::new(grid, stacks).agents(vec![Cell::new(2, 2)]).build();
        assert_eq!(sim.open_order_count(), 0);
        sim.process_tick().unwrap();
    }
}
