//! Grid coordinates and cell kinds.

use wh_core::{PickupId, StackId};

/// An integer grid coordinate. Signed so off-grid neighbor candidates (e.g.
/// `x == -1`) can be represented before the bounds check rejects them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`.
    #[inline]
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// A single scalar ordering key, used to break heuristic/search ties
    /// reproducibly ("lower cell id" in the search's tie-break rule).
    #[inline]
    pub fn order_key(self) -> i64 {
        (self.x as i64) << 32 | (self.y as i64 & 0xffff_ffff)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The static kind of a grid cell. Does not change once the grid is built,
/// except that a `Stack`'s pallet contents (tracked elsewhere) evolve over
/// the simulation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    Free,
    Obstacle,
    MaintenanceSlot,
    Stack(StackId),
    PickupZone(PickupId),
}

impl CellKind {
    /// Stack and pickup-zone cells are impassable to agents; pickup/drop
    /// happen from an adjacent free cell (source is ambiguous on this point —
    /// see the design notes on stack-cell occupancy).
    #[inline]
    pub fn is_passable(self) -> bool {
        matches!(self, CellKind::Free | CellKind::MaintenanceSlot)
    }
}
