//! Grid-subsystem error type.

use thiserror::Error;

use crate::Cell;

/// Errors produced while building or querying a [`crate::Grid`].
#[derive(Debug, Error)]
pub enum GridError {
    #[error("cell {0:?} is outside the grid bounds")]
    OutOfBounds(Cell),

    #[error("cell {0:?} is already occupied")]
    CellOccupied(Cell),

    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },
}

pub type GridResult<T> = Result<T, GridError>;
