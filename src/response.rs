//! The response writer handed to a registered handler.
//!
//! Grounded in `original_source/include/reqresp.h`'s `http_response_send`
//! idempotent-with-warning contract: the first `send` writes the status
//! line and headers, every subsequent call is a logged no-op. The teacher's
//! `process_request`/`send_error` (`examples/jackwickham-rust-webserver/src/main.rs`)
//! showed the shape of hand-assembling a status line and writing it to the
//! stream directly; this generalizes that into a stateful writer with a
//! real header table instead of two literal format strings.

use std::io::Write;
use std::net::TcpStream;

use crate::error::{EngineError, Result};
use crate::http::status;
use crate::http::Headers;

/// A response writer bound to one connection.
///
/// `send` may be called at most once with effect; headers registered via
/// [`Response::add_header`] before that call are emitted in registration
/// order (a `Content-Length` among them is skipped, since the canonical
/// value is always sent first). Body chunks written before `send` are
/// dropped with a warning rather than corrupting the wire framing.
pub struct Response<'a> {
    version: (u16, u16),
    headers: Headers,
    content_length: u64,
    peer: &'a TcpStream,
    sent: bool,
}

impl<'a> Response<'a> {
    pub(crate) fn new(peer: &'a TcpStream) -> Self {
        Response {
            version: (1, 1),
            headers: Headers::new(),
            content_length: 0,
            peer,
            sent: false,
        }
    }

    pub fn set_content_length(&mut self, len: u64) {
        self.content_length = len;
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push(name, value);
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Writes the status line, the mandatory `Content-Length` header, every
    /// registered header, and the terminating blank line.
    ///
    /// A second call is a no-op: it logs a warning and returns `Ok(())`
    /// rather than writing anything or failing, matching the original's
    /// "idempotent with warning" contract.
    pub fn send(&mut self, status: u16) -> Result<()> {
        if self.sent {
            log::warn!("Response::send called more than once; ignoring");
            return Ok(());
        }

        let mut out = Vec::new();
        write!(
            out,
            "HTTP/{}.{} {} {}\r\n",
            self.version.0,
            self.version.1,
            status,
            status::reason_phrase(status)
        )
        .map_err(EngineError::FailedWrite)?;
        write!(out, "Content-Length: {}\r\n", self.content_length).map_err(EngineError::FailedWrite)?;
        for header in self.headers.iter() {
            if header.name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            write!(out, "{}: {}\r\n", header.name, header.value).map_err(EngineError::FailedWrite)?;
        }
        write!(out, "\r\n").map_err(EngineError::FailedWrite)?;

        let mut stream = self.peer;
        stream.write_all(&out).map_err(EngineError::FailedWrite)?;

        self.sent = true;
        Ok(())
    }

    /// Writes a raw body chunk to the connection, with no framing applied.
    ///
    /// A call before `send` is a logged no-op: writing body bytes ahead of
    /// the status line would corrupt the response, so this drops the chunk
    /// rather than sending malformed output.
    pub fn write_body_chunk(&mut self, data: &[u8]) -> Result<()> {
        if !self.sent {
            log::warn!("write_body_chunk called before send; ignoring");
            return Ok(());
        }
        let mut stream = self.peer;
        stream.write_all(data).map_err(EngineError::FailedWrite)
    }
}
