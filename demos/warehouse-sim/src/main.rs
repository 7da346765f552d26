//! warehouse-sim — drives the grid, order generator, and planner through a
//! live tick loop, rendering frames to stdout or a TCP viewer.

use std::collections::HashSet;

use anyhow::{Context, Result};

use wh_core::{PalletId, SimConfig, SimRng, Tick};
use wh_grid::{Cell, Grid, GridBuilder};
use wh_orders::StackYard;
use wh_render::{LineWriterTransport, RenderTransport, TcpTransport};
use wh_sim::{NoopObserver, SimBuilder};

fn main() {
    tracing_subscriber::fmt::init();

    let config = match SimConfig::from_env() {
        Ok(c) => c,
        Err(err) => {
            tracing::error!(%err, "configuration error");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(config) {
        tracing::error!(%err, "simulation aborted");
        std::process::exit(3);
    }
}

fn run(config: SimConfig) -> Result<()> {
    tracing::info!(
        width = config.grid_width,
        height = config.grid_height,
        agents = config.num_agents,
        seed = config.random_seed,
        "starting warehouse simulation"
    );

    let mut rng = SimRng::new(config.random_seed);
    let (grid, stacks, agent_positions) = build_layout(&config, &mut rng);

    let mut sim = SimBuilder::new(grid, stacks)
        .agents(agent_positions)
        .window(config.planning_window as u32)
        .plan_in_past_k(config.plan_in_past_k)
        .r_max(config.r_max)
        .p_pick(config.p_pick)
        .o_max(config.o_max as usize)
        .render_queue_capacity(config.render_queue_capacity)
        .seed(config.random_seed)
        .tick_period_ms(config.tick_period_ms)
        .build();

    let mut observer = NoopObserver;

    // The reservation table must never hold entries past the configured
    // horizon; the planner itself never reserves beyond `planning_window`
    // ticks ahead, so this is an invariant check rather than a limiter.
    debug_assert!(config.reservation_horizon >= config.planning_window);

    match transport_scheme(&config.render_transport_url) {
        Scheme::Stdout => {
            let mut transport = LineWriterTransport::new(std::io::stdout());
            run_forever(&mut sim, &mut transport, &mut observer)
        }
        Scheme::Tcp(addr) => {
            let mut transport = TcpTransport::new(addr);
            run_forever(&mut sim, &mut transport, &mut observer)
        }
    }
}

fn run_forever<T: RenderTransport>(
    sim: &mut wh_sim::Sim,
    transport: &mut T,
    observer: &mut NoopObserver,
) -> Result<()> {
    // This binary is the interactive demo: it runs until killed. Scenario
    // tests drive `Sim::run_ticks` directly instead of going through it.
    sim.run(transport, observer, Tick(u64::MAX))
        .context("tick loop")
}

enum Scheme {
    Stdout,
    Tcp(String),
}

fn transport_scheme(url: &str) -> Scheme {
    match url.strip_prefix("tcp://") {
        Some(addr) => Scheme::Tcp(addr.to_string()),
        None => Scheme::Stdout,
    }
}

/// Scatter obstacles, stacks, pickup zones, and agent start positions across
/// the grid without collisions, then seed every stack with one pallet so the
/// order generator has something to work with from tick zero.
fn build_layout(config: &SimConfig, rng: &mut SimRng) -> (Grid, StackYard, Vec<Cell>) {
    let width = config.grid_width;
    let height = config.grid_height;
    let total_cells = (width as u64 * height as u64) as usize;

    let mut taken: HashSet<Cell> = HashSet::new();
    let mut draw = || -> Cell {
        loop {
            let x = rng.gen_range(0..width) as i32;
            let y = rng.gen_range(0..height) as i32;
            let cell = Cell::new(x, y);
            if taken.insert(cell) {
                return cell;
            }
        }
    };

    let wanted = config.num_obstacles as usize
        + config.num_stacks as usize
        + config.num_pickups as usize
        + config.num_agents as usize;
    assert!(
        wanted <= total_cells,
        "grid too small ({width}x{height}) for {wanted} placed entities"
    );

    let mut builder = GridBuilder::new(width, height).expect("validated positive by SimConfig");

    for _ in 0..config.num_obstacles {
        builder.add_obstacle(draw()).expect("cell reserved unique by `taken`");
    }

    let mut stack_ids = Vec::with_capacity(config.num_stacks as usize);
    for _ in 0..config.num_stacks {
        stack_ids.push(builder.add_stack(draw()).expect("cell reserved unique by `taken`"));
    }

    for _ in 0..config.num_pickups {
        builder.add_pickup(draw()).expect("cell reserved unique by `taken`");
    }

    let grid = builder.build();

    let mut stacks = StackYard::new(stack_ids.len());
    for (i, &stack_id) in stack_ids.iter().enumerate() {
        stacks.push(stack_id, PalletId(i as u32));
    }

    let agent_positions: Vec<Cell> = (0..config.num_agents)
        .map(|_| {
            loop {
                let cell = draw();
                if grid.passable(cell) {
                    return cell;
                }
            }
        })
        .collect();

    (grid, stacks, agent_positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SimConfig {
        SimConfig {
            grid_width: 10,
            grid_height: 10,
            num_agents: 3,
            num_stacks: 4,
            num_pickups: 2,
            num_obstacles: 5,
            planning_window: 16,
            reservation_horizon: 16,
            tick_period_ms: 1000,
            random_seed: 1,
            render_transport_url: "stdout://".into(),
            plan_in_past_k: 1,
            r_max: 5,
            o_max: 32,
            p_pick: 0.6,
            render_queue_capacity: 64,
        }
    }

    #[test]
    fn layout_places_every_requested_entity_without_collision() {
        let config = test_config();
        let mut rng = SimRng::new(1);
        let (grid, stacks, positions) = build_layout(&config, &mut rng);
        assert_eq!(grid.num_stacks(), 4);
        assert_eq!(grid.num_pickups(), 2);
        assert_eq!(stacks.num_stacks(), 4);
        assert_eq!(positions.len(), 3);
        assert!(positions.iter().all(|&c| grid.passable(c)));
    }

    #[test]
    fn stdout_is_the_default_transport_scheme() {
        assert!(matches!(transport_scheme("stdout://"), Scheme::Stdout));
        assert!(matches!(transport_scheme("tcp://127.0.0.1:9000"), Scheme::Tcp(_)));
    }
}
