//! `wh-planner` — true-distance heuristics and the windowed, reservation-
//! aware space-time path search each agent replans against.
//!
//! | Module        | Contents                        |
//! |----------------|---------------------------------|
//! | [`heuristic`]  | `GoalHeuristic`                 |
//! | [`planner`]    | `plan`                          |
//! | [`error`]      | `PlannerError`, `PlannerResult` |

pub mod error;
pub mod heuristic;
pub mod planner;

pub use error::{PlannerError, PlannerResult};
pub use heuristic::GoalHeuristic;
pub use planner::plan;
