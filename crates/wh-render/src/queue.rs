//! A small bounded queue of render frames sitting in front of a
//! [`RenderTransport`], so a slow or disconnected renderer never blocks tick
//! progress.

use std::collections::VecDeque;

use crate::message::RenderMessage;
use crate::transport::RenderTransport;

/// One complete frame: a `ClearScreen` plus the draws that followed it.
pub type Frame = Vec<RenderMessage>;

/// Bounded FIFO of frames. When full, the oldest frame is dropped to make
/// room for the newest — recency matters more than completeness for a live
/// view of the simulation.
pub struct FrameQueue {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl FrameQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Push a new frame. Returns `true` if an older frame was dropped to
    /// make room.
    pub fn push_frame(&mut self, frame: Frame) -> bool {
        let dropped = if self.frames.len() >= self.capacity {
            self.frames.pop_front();
            true
        } else {
            false
        };
        self.frames.push_back(frame);
        dropped
    }

    /// Send every buffered frame through `transport`, logging (never
    /// propagating) individual send failures.
    pub fn drain_into<T: RenderTransport>(&mut self, transport: &mut T) {
        while let Some(frame) = self.frames.pop_front() {
            for message in frame {
                if let Err(err) = transport.send(message) {
                    tracing::warn!(%err, "render transport send failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RenderMessage;
    use crate::transport::LineWriterTransport;

    #[test]
    fn oldest_frame_dropped_when_full() {
        let mut q = FrameQueue::new(1);
        assert!(!q.push_frame(vec![RenderMessage::ClearScreen]));
        assert!(q.push_frame(vec![RenderMessage::ClearScreen]));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn drain_sends_all_buffered_frames_in_order() {
        let mut q = FrameQueue::new(4);
        q.push_frame(vec![RenderMessage::ScreenSize { width: 1, height: 1 }]);
        q.push_frame(vec![RenderMessage::ClearScreen]);
        let mut transport = LineWriterTransport::new(Vec::new());
        q.drain_into(&mut transport);
        assert!(q.is_empty());
        let out = String::from_utf8(transport.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 2);
    }
}
