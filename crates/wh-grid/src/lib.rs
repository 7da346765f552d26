//! `wh-grid` — the static warehouse floor plan.
//!
//! | Module   | Contents                                  |
//! |----------|---------------------------------------------|
//! | [`cell`] | `Cell`, `CellKind`                        |
//! | [`grid`] | `Grid`, `GridBuilder`                     |
//! | [`error`]| `GridError`, `GridResult`                 |

pub mod cell;
pub mod error;
pub mod grid;

pub use cell::{Cell, CellKind};
pub use error::{GridError, GridResult};
pub use grid::{Grid, GridBuilder};
