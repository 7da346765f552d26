//! The per-tick simulation loop: the single-threaded mutator of the grid,
//! reservation table, and agents.

use wh_agent::{transition, AgentEvent, AgentState, AgentStore};
use wh_core::{AgentId, SimRng, Tick, TickClock};
use wh_grid::{Cell, CellKind, Grid};
use wh_orders::{OrderGenerator, OrderPool, StackYard, Task};
use wh_planner::{GoalHeuristic, PlannerError};
use wh_reservation::{PathStep, ReservationTable};
use wh_render::{FrameQueue, ObjectKind, RenderCellKind, RenderMessage, RenderTransport};

use crate::error::{SimError, SimResult};
use crate::observer::SimObserver;

/// Render-unit size in pixels for a grid cell. Not configurable — the
/// render wire format's `draw_grid.unit_pixel_size` is a renderer hint, not
/// a simulation concern.
const UNIT_PIXEL_SIZE: u32 = 32;

/// The live simulation: static floor plan, mutable reservation and pallet
/// state, agents, and the small amount of bookkeeping the tick loop needs.
pub struct Sim {
    pub grid: Grid,
    pub reservations: ReservationTable,
    pub stacks: StackYard,
    pub agents: AgentStore,

    heuristics: Vec<GoalHeuristic>,
    order_generator: OrderGenerator,
    order_pool: OrderPool,
    sim_rng: SimRng,

    pub clock: TickClock,
    window: u32,
    plan_in_past_k: u64,
    r_max: u32,

    render_queue: FrameQueue,
    grid_sent: bool,

    /// Non-fatal conditions recorded during the last `process_tick` call
    /// (currently just exhausted planner retries), drained by the caller.
    recoverable: Vec<SimError>,
}

impl Sim {
    pub(crate) fn new(
        grid: Grid,
        stacks: StackYard,
        agents: AgentStore,
        heuristics: Vec<GoalHeuristic>,
        order_generator: OrderGenerator,
        order_pool: OrderPool,
        sim_rng: SimRng,
        clock: TickClock,
        window: u32,
        plan_in_past_k: u64,
        r_max: u32,
        render_queue_capacity: usize,
    ) -> Self {
        Self {
            grid,
            reservations: ReservationTable::new(),
            stacks,
            agents,
            heuristics,
            order_generator,
            order_pool,
            sim_rng,
            clock,
            window,
            plan_in_past_k,
            r_max,
            render_queue: FrameQueue::new(render_queue_capacity),
            grid_sent: false,
            recoverable: Vec::new(),
        }
    }

    pub fn take_recoverable_errors(&mut self) -> Vec<SimError> {
        std::mem::take(&mut self.recoverable)
    }

    pub fn open_order_count(&self) -> usize {
        self.order_pool.len()
    }

    // ── The five-step tick algorithm ───────────────────────────────────────

    /// Advance the simulation by exactly one tick, without pacing or
    /// rendering I/O (the caller drains `render_queue` separately).
    pub fn process_tick(&mut self) -> SimResult<()> {
        let now = self.clock.current_tick;

        self.reservations.advance(now);
        self.generate_orders(now);
        self.assign_idle_agents();
        self.reserve_stationary_agents(now);

        for agent in self.priority_order(now) {
            if self.needs_replan(agent, now) {
                self.replan_agent(agent, now)?;
            }
        }

        self.advance_positions(now);
        self.queue_render_frame(now);

        self.clock.advance();
        Ok(())
    }

    /// Run until `end_tick` (exclusive), pacing against wall-clock time and
    /// draining render frames through `transport` after every tick.
    pub fn run<T: RenderTransport, O: SimObserver>(
        &mut self,
        transport: &mut T,
        observer: &mut O,
        end_tick: Tick,
    ) -> SimResult<()> {
        while self.clock.current_tick < end_tick {
            let now = self.clock.current_tick;
            observer.on_tick_start(now);
            self.process_tick()?;
            self.render_queue.drain_into(transport);
            observer.on_tick_end(now, &self.agents);
            self.clock.sleep_until_next();
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Drive exactly `n` ticks with no wall-clock sleep — for tests, which
    /// need thousands of deterministic ticks at zero real-time cost.
    pub fn run_ticks<T: RenderTransport, O: SimObserver>(
        &mut self,
        n: u64,
        transport: &mut T,
        observer: &mut O,
    ) -> SimResult<()> {
        for _ in 0..n {
            let now = self.clock.current_tick;
            observer.on_tick_start(now);
            self.process_tick()?;
            self.render_queue.drain_into(transport);
            observer.on_tick_end(now, &self.agents);
        }
        Ok(())
    }

    // ── Step: order generation & assignment ────────────────────────────────

    fn generate_orders(&mut self, now: Tick) {
        while !self.order_pool.is_full() {
            match self
                .order_generator
                .generate(&self.stacks, &self.grid, &mut self.sim_rng, now)
            {
                Some(order) => self.order_pool.push(order),
                None => break,
            }
        }
    }

    fn assign_idle_agents(&mut self) {
        for agent in self.agents.agent_ids().collect::<Vec<_>>() {
            if self.agents.state[agent.index()] != AgentState::Idle {
                continue;
            }
            if self.agents.order[agent.index()].is_some() {
                continue;
            }
            let pos = self.agents.position[agent.index()];
            if let Some(order) = self.order_pool.assign_nearest(pos, &self.grid) {
                let starts_with_grab = order
                    .first_task()
                    .map(Task::requires_grab)
                    .unwrap_or(false);
                tracing::debug!(agent = agent.0, order = order.id.0, "order assigned");
                self.agents.order[agent.index()] = Some(order);
                self.agents.state[agent.index()] = if starts_with_grab {
                    AgentState::MovingToSource
                } else {
                    AgentState::MovingToTarget
                };
            }
        }
    }

    // ── Step: replanning ────────────────────────────────────────────────────

    /// `Idle`/`Stuck` agents never replan and so never hold a reservation of
    /// their own past the last plan they walked. Without this, another
    /// agent's planner sees their cell as free once that plan's reservation
    /// lapses and can route straight onto it. Install a one-tick wait
    /// reservation for every such agent before anyone replans this tick.
    fn reserve_stationary_agents(&mut self, now: Tick) {
        for agent in self.agents.agent_ids().collect::<Vec<_>>() {
            if !matches!(self.agents.state[agent.index()], AgentState::Idle | AgentState::Stuck) {
                continue;
            }
            let cell = self.agents.position[agent.index()];
            if let Err(source) = self.reservations.reserve(agent, &[PathStep { cell, tick: now }]) {
                tracing::warn!(agent = agent.0, %source, "stationary agent's cell already claimed this tick");
            }
        }
    }

    fn needs_replan(&self, agent: AgentId, now: Tick) -> bool {
        match self.agents.state[agent.index()] {
            AgentState::MovingToSource | AgentState::MovingToTarget => {
                let plan = &self.agents.plan[agent.index()];
                match plan.last() {
                    None => true,
                    Some(last) => last.tick.since(now) < (self.window as u64 / 2),
                }
            }
            AgentState::Idle | AgentState::Grabbing | AgentState::Dropping | AgentState::Stuck => false,
        }
    }

    /// First agents whose plan has expired, then ascending agent id.
    fn priority_order(&self, now: Tick) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.agents.agent_ids().collect();
        ids.sort_by_key(|&a| (!self.needs_replan(a, now), a.0));
        ids
    }

    fn goal_cell(&self, agent: AgentId) -> Option<Cell> {
        let order = self.agents.order[agent.index()].as_ref()?;
        let task = order.first_task()?;
        match self.agents.state[agent.index()] {
            AgentState::MovingToSource => self.grid.adjacent_passable(task.start_cell(&self.grid)),
            AgentState::MovingToTarget => task
                .target_cell(&self.grid)
                .and_then(|c| self.grid.adjacent_passable(c)),
            _ => None,
        }
    }

    fn replan_agent(&mut self, agent: AgentId, now: Tick) -> SimResult<()> {
        let goal = match self.goal_cell(agent) {
            Some(g) => g,
            None => return Ok(()),
        };

        self.reservations.release(agent);

        if self.heuristics[agent.index()].goal() != goal {
            self.heuristics[agent.index()].reset(goal);
        }

        let mut t_s = now.saturating_sub(self.plan_in_past_k);
        let ticks_ago = now.since(t_s) as usize;
        let anchored_start = self.agents.position_ago(agent, ticks_ago);

        let mut path = wh_planner::plan(
            agent,
            anchored_start,
            t_s,
            goal,
            self.window,
            &self.grid,
            &self.reservations,
            &mut self.heuristics[agent.index()],
        );

        // Validate the anchor against what actually happened; fall back to
        // anchoring at `now` with a forced wait if another agent preempted
        // a cell the plan assumed was still free.
        if let Ok(candidate) = &path {
            let prefix: Vec<Cell> = candidate
                .iter()
                .filter(|s| s.tick < now)
                .map(|s| s.cell)
                .collect();
            if !self.agents.history_matches(agent, &prefix) {
                let here = self.agents.position[agent.index()];
                t_s = now;
                path = wh_planner::plan(
                    agent,
                    here,
                    now,
                    goal,
                    self.window,
                    &self.grid,
                    &self.reservations,
                    &mut self.heuristics[agent.index()],
                );
            }
        }

        let (path, t_s) = match path {
            Ok(path) => {
                self.agents.stuck_counter[agent.index()] = 0;
                (path, t_s)
            }
            Err(PlannerError::Unreachable { .. }) => {
                self.agents.stuck_counter[agent.index()] += 1;
                tracing::warn!(
                    agent = agent.0,
                    attempts = self.agents.stuck_counter[agent.index()],
                    "planner found no path"
                );
                if self.agents.stuck_counter[agent.index()] >= self.r_max {
                    self.release_agent_to_pool(agent);
                    return Ok(());
                }
                let here = self.agents.position[agent.index()];
                (vec![PathStep { cell: here, tick: now }], now)
            }
        };

        self.reservations
            .reserve(agent, &path)
            .map_err(|source| SimError::ReservationConflict { agent, source })?;
        self.agents.plan[agent.index()] = path;
        self.agents.plan_start_tick[agent.index()] = t_s;
        Ok(())
    }

    fn release_agent_to_pool(&mut self, agent: AgentId) {
        self.reservations.release(agent);
        self.agents.plan[agent.index()].clear();
        self.agents.stuck_counter[agent.index()] = 0;
        self.agents.carrying[agent.index()] = None;
        self.agents.state[agent.index()] = AgentState::Idle;
        if let Some(order) = self.agents.order[agent.index()].take() {
            self.recoverable.push(SimError::PlannerExhausted(agent));
            self.order_pool.return_order(order);
        }
    }

    // ── Step: advance positions, grab/drop side effects ─────────────────────

    fn advance_positions(&mut self, now: Tick) {
        for agent in self.agents.agent_ids().collect::<Vec<_>>() {
            self.advance_one(agent, now);
        }
    }

    fn advance_one(&mut self, agent: AgentId, now: Tick) {
        let state = self.agents.state[agent.index()];
        if matches!(state, AgentState::Idle | AgentState::Stuck) {
            let here = self.agents.position[agent.index()];
            self.agents.record_position(agent, here);
            return;
        }

        let next_tick = now.offset(1);
        let next_cell = self.agents.plan[agent.index()]
            .iter()
            .find(|s| s.tick == next_tick)
            .map(|s| s.cell)
            .unwrap_or(self.agents.position[agent.index()]);
        self.agents.position[agent.index()] = next_cell;
        self.agents.record_position(agent, next_cell);

        match state {
            AgentState::MovingToSource => {
                if Some(next_cell) == self.goal_cell(agent) {
                    self.agents.state[agent.index()] = transition(state, AgentEvent::ReachedSource);
                }
            }
            AgentState::Grabbing => self.do_grab(agent),
            AgentState::MovingToTarget => {
                if Some(next_cell) == self.goal_cell(agent) {
                    self.agents.state[agent.index()] = transition(state, AgentEvent::ReachedTarget);
                }
            }
            AgentState::Dropping => self.do_drop(agent),
            AgentState::Idle | AgentState::Stuck => unreachable!("handled above"),
        }
    }

    fn current_task(&self, agent: AgentId) -> Option<Task> {
        self.agents.order[agent.index()].as_ref()?.first_task().copied()
    }

    /// Advance to the next task (or `Idle` if the order is complete),
    /// returning the agent's post-pop state.
    fn advance_task_queue(&mut self, agent: AgentId) -> AgentState {
        self.agents.order[agent.index()]
            .as_mut()
            .expect("advance_task_queue called with a bound order")
            .tasks
            .pop_front();
        match self.current_task(agent) {
            Some(next) if next.requires_grab() => AgentState::MovingToSource,
            Some(_) => AgentState::MovingToTarget,
            None => {
                self.agents.order[agent.index()] = None;
                AgentState::Idle
            }
        }
    }

    fn do_grab(&mut self, agent: AgentId) {
        let task = match self.current_task(agent) {
            Some(t) => t,
            None => return,
        };
        let (pallet, from_stack) = match task {
            Task::FreeUp { pallet, from_stack, .. } => (pallet, from_stack),
            Task::Pickup { pallet, from_stack } => (pallet, from_stack),
            Task::Delivery { .. } => return,
        };

        if !self.stacks.is_top(from_stack, pallet) {
            tracing::debug!(agent = agent.0, pallet = pallet.0, "grab blocked: not top of stack");
            self.agents.state[agent.index()] = transition(AgentState::Grabbing, AgentEvent::GrabBlocked);
            return;
        }

        self.stacks.pop(from_stack);
        self.agents.carrying[agent.index()] = Some(pallet);

        self.agents.state[agent.index()] = if task.requires_drop() {
            transition(AgentState::Grabbing, AgentEvent::GrabComplete)
        } else {
            self.advance_task_queue(agent)
        };
    }

    fn do_drop(&mut self, agent: AgentId) {
        let task = match self.current_task(agent) {
            Some(t) => t,
            None => return,
        };
        match task {
            Task::FreeUp { pallet, to_stack, .. } => self.stacks.push(to_stack, pallet),
            Task::Delivery { .. } => {} // delivered: removed from the simulation
            Task::Pickup { .. } => return,
        }
        self.agents.carrying[agent.index()] = None;
        self.agents.state[agent.index()] = self.advance_task_queue(agent);
    }

    // ── Step: render frame ───────────────────────────────────────────────────

    fn queue_render_frame(&mut self, now: Tick) {
        let mut frame = Vec::new();

        if !self.grid_sent {
            frame.push(RenderMessage::ScreenSize {
                width: self.grid.width,
                height: self.grid.height,
            });
            frame.push(RenderMessage::DrawGrid { unit_pixel_size: UNIT_PIXEL_SIZE });
            self.grid_sent = true;
        }

        frame.push(RenderMessage::ClearScreen);

        // `draw_grid` carries only the rendering unit, not the floor plan
        // itself, and `clear_screen` wipes the renderer's buffer every
        // frame — so every non-free cell is redrawn as an object each tick.
        for y in 0..self.grid.height {
            for x in 0..self.grid.width {
                let cell = Cell::new(x as i32, y as i32);
                let kind = self.grid.kind(cell).unwrap();
                if kind == CellKind::Free {
                    continue;
                }
                frame.push(RenderMessage::draw_object(
                    format!("cell_{x}_{y}"),
                    ObjectKind::Cell(RenderCellKind::from(kind)),
                    x as i32,
                    y as i32,
                ));
            }
        }

        for (pallet, stack, _depth) in self.stacks.all_pallets_with_depth() {
            let cell = self.grid.stack_cell(stack);
            frame.push(RenderMessage::draw_object(
                format!("pallet_{}", pallet.0),
                ObjectKind::Pallet,
                cell.x,
                cell.y,
            ));
        }

        for agent in self.agents.agent_ids() {
            let cell = self.agents.position[agent.index()];
            let carried = self.agents.carrying[agent.index()];
            frame.push(RenderMessage::draw_object(
                format!("agent_{}", agent.0),
                ObjectKind::Agent { carrying: carried.is_some() },
                cell.x,
                cell.y,
            ));
            if let Some(pallet) = carried {
                frame.push(RenderMessage::draw_object(
                    format!("pallet_{}", pallet.0),
                    ObjectKind::Pallet,
                    cell.x,
                    cell.y,
                ));
            }
        }

        if self.render_queue.push_frame(frame) {
            tracing::warn!(tick = now.0, "render queue backpressure: dropped oldest frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wh_core::{PalletId, StackId};
    use wh_grid::GridBuilder;
    use wh_render::LineWriterTransport;

    use crate::builder::SimBuilder;
    use crate::observer::NoopObserver;

    fn corridor_sim(agents: Vec<Cell>) -> Sim {
        let mut b = GridBuilder::new(6, 1).unwrap();
        b.add_stack(Cell::new(0, 0)).unwrap();
        let grid = b.build();
        let mut stacks = StackYard::new(1);
        stacks.push(StackId(0), PalletId(0));
        SimBuilder::new(grid, stacks)
            .agents(agents)
            .window(8)
            .seed(7)
            .build()
    }

    #[test]
    fn agent_completes_a_full_pickup_and_delivery_cycle() {
        let mut sim = corridor_sim(vec![Cell::new(3, 0)]);
        let agent = AgentId(0);

        let mut sink = LineWriterTransport::new(Vec::new());
        let mut observer = NoopObserver;
        for _ in 0..60 {
            sim.process_tick().unwrap();
            sim.render_queue.drain_into(&mut sink);
            observer.on_tick_end(sim.clock.current_tick, &sim.agents);
            if sim.agents.state[agent.index()] == AgentState::Idle
                && sim.agents.order[agent.index()].is_none()
                && sim.clock.current_tick.0 > 1
            {
                break;
            }
        }

        // The only pallet should have moved off the source stack: either
        // delivered (gone) or relocated to another stack.
        assert!(sim.stacks.locate(PalletId(0)) != Some((StackId(0), 0)) || sim.stacks.depth(StackId(0)) == 0);
    }

    #[test]
    fn reservations_never_double_book_a_cell() {
        let mut sim = corridor_sim(vec![Cell::new(1, 0), Cell::new(4, 0)]);
        for _ in 0..30 {
            sim.process_tick().unwrap();
            // Every reserved path step for every agent must agree with the
            // reservation table's own view, which `reserve` already
            // enforces atomically — this just exercises many ticks without
            // panicking or erroring.
        }
        assert!(sim.clock.current_tick.0 >= 30);
    }

    #[test]
    fn stuck_agent_returns_its_order_to_the_pool() {
        // Start away from the task's goal cell, since a planner call with
        // start == goal succeeds trivially before any reservation check.
        let mut sim = corridor_sim(vec![Cell::new(3, 0)]);
        let agent = AgentId(0);
        sim.agents.state[agent.index()] = AgentState::MovingToSource;
        sim.agents.order[agent.index()] = Some(wh_orders::Order {
            id: wh_core::OrderId(0),
            tasks: std::collections::VecDeque::from([Task::Pickup {
                pallet: PalletId(0),
                from_stack: StackId(0),
            }]),
            created_tick: Tick::ZERO,
        });
        sim.agents.stuck_counter[agent.index()] = sim.r_max - 1;

        // Box the agent in completely: every successor of its start cell
        // (including waiting in place) is reserved by another agent.
        let here = sim.agents.position[agent.index()];
        for n in sim.grid.neighbors(here) {
            sim.reservations
                .reserve(AgentId(99), &[PathStep { cell: n, tick: Tick(1) }])
                .ok();
        }

        sim.replan_agent(agent, Tick::ZERO).unwrap();
        assert_eq!(sim.agents.state[agent.index()], AgentState::Idle);
        assert!(sim.agents.order[agent.index()].is_none());
        assert_eq!(sim.open_order_count(), 1);
    }
}
