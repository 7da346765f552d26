//! `wh-agent` — Structure-of-Arrays storage for agent state, and the
//! explicit state machine each agent's task lifecycle runs through.
//!
//! | Module   | Contents                              |
//! |----------|-----------------------------------------|
//! | [`store`]| `AgentStore`, `AgentStoreBuilder`     |
//! | [`state`]| `AgentState`, `AgentEvent`, `transition` |

pub mod state;
pub mod store;

pub use state::{transition, AgentEvent, AgentState};
pub use store::{AgentStore, AgentStoreBuilder};
