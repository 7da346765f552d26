//! Render-transport error type.

use thiserror::Error;

/// Errors that can occur sending render frames.
///
/// All are non-fatal to the tick loop: a `RenderTransport` consumer is a
/// best-effort sink, never a correctness dependency of the simulation.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode render message: {0}")]
    Encode(#[from] serde_json::Error),

    /// The in-memory frame queue was full; the oldest buffered frame was
    /// dropped to make room.
    #[error("render queue backpressure: dropped oldest frame")]
    Backpressure,
}

pub type RenderResult<T> = Result<T, RenderError>;
