//! The task kinds a delivery order expands into, and the order container.

use std::collections::VecDeque;

use wh_core::{OrderId, PalletId, PickupId, StackId, Tick};
use wh_grid::{Cell, Grid};

/// One step of an order, consumed in order by a single agent.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Task {
    /// Move a blocking pallet between stacks, uncovering the pallet beneath
    /// it. Also doubles as "relocate to another stack" when an order's final
    /// destination is a stack rather than a pickup zone.
    FreeUp {
        pallet: PalletId,
        from_stack: StackId,
        to_stack: StackId,
    },
    /// Grab a pallet. Requires the pallet to be at the top of `from_stack`.
    Pickup { pallet: PalletId, from_stack: StackId },
    /// Carry the currently-held pallet to a pickup zone.
    Delivery { pallet: PalletId, to_pickup: PickupId },
}

impl Task {
    /// The pallet this task concerns.
    pub fn pallet(&self) -> PalletId {
        match *self {
            Task::FreeUp { pallet, .. } => pallet,
            Task::Pickup { pallet, .. } => pallet,
            Task::Delivery { pallet, .. } => pallet,
        }
    }

    /// The cell an agent must stand adjacent to in order to begin this task —
    /// used both to drive `MovingToSource`/`MovingToTarget` and to rank
    /// orders by proximity at assignment time.
    pub fn start_cell(&self, grid: &Grid) -> Cell {
        match *self {
            Task::FreeUp { from_stack, .. } => grid.stack_cell(from_stack),
            Task::Pickup { from_stack, .. } => grid.stack_cell(from_stack),
            Task::Delivery { to_pickup, .. } => grid.pickup_cell(to_pickup),
        }
    }

    /// `true` if this task begins with a `MovingToSource` + `Grabbing`
    /// cycle. `false` for `Delivery`, which always follows a task that
    /// already left the agent holding the pallet.
    pub fn requires_grab(&self) -> bool {
        matches!(self, Task::FreeUp { .. } | Task::Pickup { .. })
    }

    /// `true` if this task ends with a `MovingToTarget` + `Dropping` cycle.
    /// `false` for `Pickup`, whose pallet is carried into the next task
    /// rather than dropped immediately.
    pub fn requires_drop(&self) -> bool {
        matches!(self, Task::FreeUp { .. } | Task::Delivery { .. })
    }

    /// The cell to carry the pallet to, for tasks that end in a drop.
    pub fn target_cell(&self, grid: &Grid) -> Option<Cell> {
        match *self {
            Task::FreeUp { to_stack, .. } => Some(grid.stack_cell(to_stack)),
            Task::Delivery { to_pickup, .. } => Some(grid.pickup_cell(to_pickup)),
            Task::Pickup { .. } => None,
        }
    }
}

/// A bound sequence of tasks delivering one pallet, generated together and
/// assigned to exactly one agent.
#[derive(Clone, Debug)]
pub struct Order {
    pub id: OrderId,
    pub tasks: VecDeque<Task>,
    pub created_tick: Tick,
}

impl Order {
    pub fn first_task(&self) -> Option<&Task> {
        self.tasks.front()
    }

    pub fn is_complete(&self) -> bool {
        self.tasks.is_empty()
    }
}
