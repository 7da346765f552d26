//! End-to-end scenario and property tests driving the full tick loop,
//! distinct from the per-module unit tests in `sim.rs`/`builder.rs`.

use std::collections::VecDeque;

use wh_agent::AgentState;
use wh_core::{AgentId, OrderId, PalletId, StackId, Tick};
use wh_grid::{Cell, GridBuilder};
use wh_orders::{Order, StackYard, Task};
use wh_reservation::PathStep;
use wh_render::LineWriterTransport;

use crate::builder::SimBuilder;
use crate::observer::NoopObserver;

fn sink() -> LineWriterTransport<Vec<u8>> {
    LineWriterTransport::new(Vec::new())
}

/// A single-task order that drives an agent (placed directly in
/// `MovingToTarget`) toward whatever cell is adjacent to `to_stack`.
fn relocate_order(id: u64, pallet: PalletId, to_stack: StackId) -> Order {
    let mut tasks = VecDeque::new();
    tasks.push_back(Task::FreeUp { pallet, from_stack: to_stack, to_stack });
    Order { id: OrderId(id), tasks, created_tick: Tick::ZERO }
}

// ── S1: corridor swap ───────────────────────────────────────────────────────
//
// Two agents approaching head-on in a 1-wide corridor must never occupy each
// other's cell in a swap (the reciprocal-edge check in
// `ReservationTable::edge_free`), even though both need to cross the same
// stretch of floor.

#[test]
fn corridor_swap_never_produces_a_head_on_trade() {
    let mut b = GridBuilder::new(9, 1).unwrap();
    b.add_stack(Cell::new(8, 0)).unwrap(); // StackId(0), agent A's destination end
    b.add_stack(Cell::new(0, 0)).unwrap(); // StackId(1), agent B's destination end
    let grid = b.build();
    let stacks = StackYard::new(2);

    let mut sim = SimBuilder::new(grid, stacks)
        .agents(vec![Cell::new(1, 0), Cell::new(7, 0)])
        .window(14)
        .seed(3)
        .build();

    let a = AgentId(0);
    let b_agent = AgentId(1);
    sim.agents.state[a.index()] = AgentState::MovingToTarget;
    sim.agents.order[a.index()] = Some(relocate_order(0, PalletId(0), StackId(0)));
    sim.agents.state[b_agent.index()] = AgentState::MovingToTarget;
    sim.agents.order[b_agent.index()] = Some(relocate_order(1, PalletId(1), StackId(1)));

    let mut transport = sink();
    let mut observer = NoopObserver;
    let mut prev_a = sim.agents.position[a.index()];
    let mut prev_b = sim.agents.position[b_agent.index()];
    for _ in 0..20 {
        sim.run_ticks(1, &mut transport, &mut observer).unwrap();
        let cur_a = sim.agents.position[a.index()];
        let cur_b = sim.agents.position[b_agent.index()];
        assert!(
            !(cur_a == prev_b && cur_b == prev_a),
            "agents swapped cells without ever sharing one: {prev_a:?}<->{prev_b:?}"
        );
        prev_a = cur_a;
        prev_b = cur_b;
    }
}

// ── S2: cross intersection ───────────────────────────────────────────────────
//
// Four agents converging on the center of an open area must never occupy the
// same cell at the same tick — the vertex-reservation invariant the
// reservation table enforces directly.

#[test]
fn cross_intersection_never_double_books_a_cell() {
    let mut b = GridBuilder::new(5, 5).unwrap();
    b.add_stack(Cell::new(2, 0)).unwrap();
    b.add_stack(Cell::new(4, 2)).unwrap();
    b.add_stack(Cell::new(2, 4)).unwrap();
    b.add_stack(Cell::new(0, 2)).unwrap();
    let grid = b.build();
    let stacks = StackYard::new(4);

    let starts = [Cell::new(2, 1), Cell::new(3, 2), Cell::new(2, 3), Cell::new(1, 2)];
    // Send each agent toward the stack opposite its own starting arm.
    let targets = [StackId(2), StackId(3), StackId(0), StackId(1)];

    let mut sim = SimBuilder::new(grid, stacks)
        .agents(starts.to_vec())
        .window(10)
        .seed(11)
        .build();

    for (i, &stack) in targets.iter().enumerate() {
        let agent = AgentId(i as u32);
        sim.agents.state[agent.index()] = AgentState::MovingToTarget;
        sim.agents.order[agent.index()] = Some(relocate_order(i as u64, PalletId(i as u32), stack));
    }

    let mut transport = sink();
    let mut observer = NoopObserver;
    for _ in 0..15 {
        sim.run_ticks(1, &mut transport, &mut observer).unwrap();
        let mut seen = std::collections::HashSet::new();
        for agent in sim.agents.agent_ids() {
            let pos = sim.agents.position[agent.index()];
            assert!(seen.insert(pos), "two agents occupy {pos:?} at the same tick");
        }
    }
}

// ── S3: stack uncovering ─────────────────────────────────────────────────────
//
// Generating an order for a buried pallet must produce FreeUp tasks for
// every blocking pallet above it, top-to-bottom, before the Pickup.

#[test]
fn stack_uncovering_frees_blockers_before_pickup() {
    let mut b = GridBuilder::new(5, 5).unwrap();
    b.add_stack(Cell::new(0, 0)).unwrap();
    b.add_stack(Cell::new(4, 0)).unwrap();
    let grid = b.build();
    let mut stacks = StackYard::new(2);
    stacks.push(StackId(0), PalletId(0));
    stacks.push(StackId(0), PalletId(1));
    stacks.push(StackId(0), PalletId(2));

    let mut gen = wh_orders::OrderGenerator::new(0.5);
    let mut rng = wh_core::SimRng::new(9);
    let mut order = None;
    for _ in 0..200 {
        if let Some(o) = gen.generate(&stacks, &grid, &mut rng, Tick::ZERO) {
            if o.tasks.iter().any(|t| matches!(t, Task::Pickup { pallet: PalletId(0), .. })) {
                order = Some(o);
                break;
            }
        }
    }
    let order = order.expect("bottom pallet eventually sampled across 200 draws");

    let freeups: Vec<PalletId> = order
        .tasks
        .iter()
        .take_while(|t| matches!(t, Task::FreeUp { .. }))
        .map(Task::pallet)
        .collect();
    assert_eq!(freeups, vec![PalletId(2), PalletId(1)]);
    let pickup_index = order.tasks.iter().position(|t| matches!(t, Task::Pickup { .. })).unwrap();
    assert_eq!(pickup_index, freeups.len());
}

// ── S4: plan-in-the-past consistency ─────────────────────────────────────────
//
// When an agent's recorded history matches what the previous plan predicted,
// replanning anchored `PLAN_IN_PAST_K` ticks back must not force a wasted
// wait: over an open corridor the agent should never accumulate a stuck
// counter.

#[test]
fn plan_in_past_anchor_is_accepted_when_history_matches() {
    let mut b = GridBuilder::new(10, 1).unwrap();
    b.add_stack(Cell::new(9, 0)).unwrap();
    let grid = b.build();
    let stacks = StackYard::new(1);

    let mut sim = SimBuilder::new(grid, stacks)
        .agents(vec![Cell::new(0, 0)])
        .window(8)
        .plan_in_past_k(1)
        .seed(5)
        .build();

    let agent = AgentId(0);
    sim.agents.state[agent.index()] = AgentState::MovingToTarget;
    sim.agents.order[agent.index()] = Some(relocate_order(0, PalletId(0), StackId(0)));

    let mut transport = sink();
    let mut observer = NoopObserver;
    // window=8, so the first plan (t_s=0) spans t=0..=8 and the next replan
    // fires once its last step is within window/2=4 ticks of `now`, i.e. at
    // tick 5. Run past that point so the past-anchored replan actually
    // happens, then confirm it really anchored in the past instead of
    // silently falling back to `now`.
    sim.run_ticks(6, &mut transport, &mut observer).unwrap();
    assert_eq!(sim.agents.stuck_counter[agent.index()], 0);
    assert_eq!(sim.agents.plan_start_tick[agent.index()], Tick(4));
    assert!(sim.agents.plan[agent.index()].first().unwrap().tick < sim.clock.current_tick);
}

// ── S5: replanning under preemption ─────────────────────────────────────────
//
// A reservation made by another agent after a plan was computed must be
// respected: the next plan over the same corridor routes around it.

#[test]
fn replanning_routes_around_a_newly_placed_reservation() {
    let grid = GridBuilder::new(5, 1).unwrap().build();
    let mut reservations = wh_reservation::ReservationTable::new();
    reservations
        .reserve(AgentId(77), &[PathStep { cell: Cell::new(2, 0), tick: Tick(1) }])
        .unwrap();

    let mut heuristic = wh_planner::GoalHeuristic::new(Cell::new(4, 0));
    let path = wh_planner::plan(
        AgentId(0),
        Cell::new(0, 0),
        Tick(0),
        Cell::new(4, 0),
        6,
        &grid,
        &reservations,
        &mut heuristic,
    )
    .unwrap();
    assert!(!path.iter().any(|s| s.cell == Cell::new(2, 0) && s.tick == Tick(1)));
}

// ── S6: reservation GC bound ──────────────────────────────────────────────────
//
// The reservation table's size must stay bounded by `agents * (window + 1)`
// vertex entries regardless of how many ticks have elapsed, since `advance`
// prunes everything before `now` every tick.

#[test]
fn reservation_table_size_stays_bounded_across_many_ticks() {
    let grid = GridBuilder::new(20, 20).unwrap().build();
    let stacks = StackYard::new(0);
    let mut sim = SimBuilder::new(grid, stacks)
        .agents(vec![Cell::new(0, 0), Cell::new(19, 19), Cell::new(0, 19)])
        .window(8)
        .seed(21)
        .build();

    let mut transport = sink();
    let mut observer = NoopObserver;
    let mut max_len = 0;
    for _ in 0..100 {
        sim.run_ticks(1, &mut transport, &mut observer).unwrap();
        max_len = max_len.max(sim.reservations.len());
    }
    assert!(max_len <= 3 * 9, "reservation table grew past its windowed bound: {max_len}");
}
