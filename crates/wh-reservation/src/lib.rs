//! `wh-reservation` — the shared space-time occupancy table agents plan
//! against.
//!
//! | Module    | Contents                                |
//! |-----------|------------------------------------------|
//! | [`table`] | `ReservationTable`, `PathStep`           |
//! | [`error`] | `ReservationError`, `ReservationResult`  |

pub mod error;
pub mod table;

pub use error::{ReservationError, ReservationResult};
pub use table::{PathStep, ReservationTable};
