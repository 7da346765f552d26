//! The static warehouse floor plan and its builder.

use wh_core::{PickupId, StackId};

use crate::cell::{Cell, CellKind};
use crate::error::{GridError, GridResult};

/// Deterministic neighbor directions, in the order ties must break: North,
/// East, South, West, then Wait-in-place. North decreases `y`; the grid's
/// origin `(0, 0)` is the top-left cell, matching the render transport's
/// screen-space convention.
const DIRECTIONS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// The static warehouse floor: dimensions, cell kinds, and named stack /
/// pickup-zone locations. Built once at simulation init and never mutated.
pub struct Grid {
    pub width: u32,
    pub height: u32,
    cells: Vec<CellKind>,
    /// `StackId` → its fixed cell, for reverse lookup by the order generator.
    stack_cells: Vec<Cell>,
    /// `PickupId` → its fixed cell.
    pickup_cells: Vec<Cell>,
}

impl Grid {
    #[inline]
    fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    #[inline]
    fn idx(&self, cell: Cell) -> usize {
        cell.y as usize * self.width as usize + cell.x as usize
    }

    /// The static kind of `cell`. Cells outside the grid have no kind;
    /// callers should check [`Grid::passable`] instead, which treats
    /// out-of-bounds as impassable without panicking.
    pub fn kind(&self, cell: Cell) -> Option<CellKind> {
        self.in_bounds(cell).then(|| self.cells[self.idx(cell)])
    }

    /// `true` iff `cell` is inside the grid and not an obstacle, stack, or
    /// pickup zone.
    #[inline]
    pub fn passable(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && self.cells[self.idx(cell)].is_passable()
    }

    /// Up to 5 candidate successor cells in deterministic order: N, E, S, W,
    /// then Wait (the agent's own cell). Out-of-bounds and impassable cells
    /// are filtered out; Wait is always included.
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        let mut out = Vec::with_capacity(5);
        for (dx, dy) in DIRECTIONS {
            let candidate = Cell::new(cell.x + dx, cell.y + dy);
            if self.passable(candidate) {
                out.push(candidate);
            }
        }
        out.push(cell);
        out
    }

    pub fn stack_cell(&self, id: StackId) -> Cell {
        self.stack_cells[id.index()]
    }

    pub fn pickup_cell(&self, id: PickupId) -> Cell {
        self.pickup_cells[id.index()]
    }

    pub fn num_stacks(&self) -> usize {
        self.stack_cells.len()
    }

    pub fn num_pickups(&self) -> usize {
        self.pickup_cells.len()
    }

    /// An adjacent passable cell to stand on while interacting with `cell`
    /// (stacks and pickup zones are themselves impassable). Deterministically
    /// picks the first passable neighbor in N/E/S/W order.
    pub fn adjacent_passable(&self, cell: Cell) -> Option<Cell> {
        DIRECTIONS
            .iter()
            .map(|&(dx, dy)| Cell::new(cell.x + dx, cell.y + dy))
            .find(|&c| self.passable(c))
    }
}

/// Incrementally constructs a [`Grid`], then [`build`](Self::build)s it.
pub struct GridBuilder {
    width: u32,
    height: u32,
    cells: Vec<CellKind>,
    stack_cells: Vec<Cell>,
    pickup_cells: Vec<Cell>,
}

impl GridBuilder {
    pub fn new(width: u32, height: u32) -> GridResult<Self> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![CellKind::Free; (width * height) as usize],
            stack_cells: Vec::new(),
            pickup_cells: Vec::new(),
        })
    }

    fn set(&mut self, cell: Cell, kind: CellKind) -> GridResult<()> {
        if cell.x < 0 || cell.y < 0 || cell.x as u32 >= self.width || cell.y as u32 >= self.height
        {
            return Err(GridError::OutOfBounds(cell));
        }
        let idx = cell.y as usize * self.width as usize + cell.x as usize;
        if self.cells[idx] != CellKind::Free {
            return Err(GridError::CellOccupied(cell));
        }
        self.cells[idx] = kind;
        Ok(())
    }

    pub fn add_obstacle(&mut self, cell: Cell) -> GridResult<()> {
        self.set(cell, CellKind::Obstacle)
    }

    pub fn add_maintenance_slot(&mut self, cell: Cell) -> GridResult<()> {
        self.set(cell, CellKind::MaintenanceSlot)
    }

    pub fn add_stack(&mut self, cell: Cell) -> GridResult<StackId> {
        let id = StackId(self.stack_cells.len() as u32);
        self.set(cell, CellKind::Stack(id))?;
        self.stack_cells.push(cell);
        Ok(id)
    }

    pub fn add_pickup(&mut self, cell: Cell) -> GridResult<PickupId> {
        let id = PickupId(self.pickup_cells.len() as u32);
        self.set(cell, CellKind::PickupZone(id))?;
        self.pickup_cells.push(cell);
        Ok(id)
    }

    pub fn build(self) -> Grid {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells,
            stack_cells: self.stack_cells,
            pickup_cells: self.pickup_cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_order_is_n_e_s_w_wait() {
        let grid = GridBuilder::new(5, 5).unwrap().build();
        let c = Cell::new(2, 2);
        let ns = grid.neighbors(c);
        assert_eq!(
            ns,
            vec![
                Cell::new(2, 1),
                Cell::new(3, 2),
                Cell::new(2, 3),
                Cell::new(1, 2),
                Cell::new(2, 2),
            ]
        );
    }

    #[test]
    fn out_of_bounds_is_impassable() {
        let grid = GridBuilder::new(3, 3).unwrap().build();
        assert!(!grid.passable(Cell::new(-1, 0)));
        assert!(!grid.passable(Cell::new(3, 0)));
        assert!(grid.passable(Cell::new(0, 0)));
    }

    #[test]
    fn obstacle_is_impassable_and_excluded_from_neighbors() {
        let mut b = GridBuilder::new(3, 3).unwrap();
        b.add_obstacle(Cell::new(1, 0)).unwrap();
        let grid = b.build();
        assert!(!grid.passable(Cell::new(1, 0)));
        let ns = grid.neighbors(Cell::new(0, 0));
        assert!(!ns.contains(&Cell::new(1, 0)));
    }

    #[test]
    fn stack_cells_are_impassable() {
        let mut b = GridBuilder::new(3, 3).unwrap();
        let id = b.add_stack(Cell::new(1, 1)).unwrap();
        let grid = b.build();
        assert!(!grid.passable(Cell::new(1, 1)));
        assert_eq!(grid.stack_cell(id), Cell::new(1, 1));
    }

    #[test]
    fn duplicate_placement_rejected() {
        let mut b = GridBuilder::new(3, 3).unwrap();
        b.add_obstacle(Cell::new(0, 0)).unwrap();
        assert!(matches!(
            b.add_stack(Cell::new(0, 0)),
            Err(GridError::CellOccupied(_))
        ));
    }
}
