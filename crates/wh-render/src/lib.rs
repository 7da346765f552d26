//! `wh-render` — the render transport: a small wire protocol for streaming
//! frames of the simulation to an external viewer, with a bounded queue so
//! a slow or absent viewer can never stall the tick loop.
//!
//! | Module       | Contents                                          |
//! |---------------|----------------------------------------------------|
//! | [`message`]   | `RenderMessage`, `RenderCellKind`, `ObjectKind`   |
//! | [`transport`] | `RenderTransport`, `LineWriterTransport`, `TcpTransport` |
//! | [`queue`]     | `FrameQueue`, `Frame`                             |
//! | [`error`]     | `RenderError`, `RenderResult`                     |

pub mod error;
pub mod message;
pub mod queue;
pub mod transport;

pub use error::{RenderError, RenderResult};
pub use message::{ObjectKind, RenderCellKind, RenderMessage};
pub use queue::{Frame, FrameQueue};
pub use transport::{LineWriterTransport, RenderTransport, TcpTransport};
