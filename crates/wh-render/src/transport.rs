//! `RenderTransport` and its two concrete shapes: a line-delimited JSON
//! writer over any `std::io::Write`, and a lazily (re)connecting TCP writer.

use std::io::Write;
use std::net::TcpStream;

use crate::error::{RenderError, RenderResult};
use crate::message::RenderMessage;

/// Sends one render message at a time. Implementations never treat a send
/// failure as fatal to the caller beyond the `Result` itself — the tick loop
/// logs and moves on rather than aborting the simulation.
pub trait RenderTransport {
    fn send(&mut self, message: RenderMessage) -> RenderResult<()>;
}

/// Line-delimited JSON over any writer. Used for both a stdout transport and
/// tests (writing into a `Vec<u8>`).
pub struct LineWriterTransport<W: Write> {
    inner: W,
}

impl<W: Write> LineWriterTransport<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> RenderTransport for LineWriterTransport<W> {
    fn send(&mut self, message: RenderMessage) -> RenderResult<()> {
        serde_json::to_writer(&mut self.inner, &message)?;
        self.inner.write_all(b"\n")?;
        Ok(())
    }
}

/// Line-delimited JSON over TCP. Dials `addr` once at construction; if a
/// send fails, the connection is dropped and the next `send` call
/// transparently redials before retrying once.
pub struct TcpTransport {
    addr: String,
    conn: Option<TcpStream>,
}

impl TcpTransport {
    /// Dial `addr` immediately. A failed initial dial is not fatal — `send`
    /// will keep retrying on every call until the peer is reachable.
    pub fn new(addr: impl Into<String>) -> Self {
        let addr = addr.into();
        let conn = TcpStream::connect(&addr).ok();
        Self { addr, conn }
    }

    fn ensure_connected(&mut self) -> RenderResult<&mut TcpStream> {
        if self.conn.is_none() {
            self.conn = Some(TcpStream::connect(&self.addr)?);
        }
        Ok(self.conn.as_mut().unwrap())
    }
}

impl RenderTransport for TcpTransport {
    fn send(&mut self, message: RenderMessage) -> RenderResult<()> {
        let payload = serde_json::to_vec(&message)?;
        let stream = self.ensure_connected()?;
        let write_result = stream.write_all(&payload).and_then(|_| stream.write_all(b"\n"));
        if write_result.is_err() {
            self.conn = None;
        }
        write_result.map_err(RenderError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RenderMessage;

    #[test]
    fn line_writer_emits_newline_delimited_json() {
        let mut transport = LineWriterTransport::new(Vec::new());
        transport.send(RenderMessage::ClearScreen).unwrap();
        transport
            .send(RenderMessage::ScreenSize { width: 10, height: 5 })
            .unwrap();
        let out = transport.into_inner();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("clear_screen"));
        assert!(lines[1].contains("screen_size"));
    }
}
