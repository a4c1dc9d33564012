//! The request facade handed to a registered handler.
//!
//! Grounded in the teacher's `Request` (`examples/jackwickham-rust-webserver/src/http/request/mod.rs`),
//! which likewise exposes immutable getters over a struct assembled from a
//! stream parse. Here the parser itself is retained (not discarded after
//! construction) so the handler can keep streaming the body through it.

use std::net::TcpStream;

use crate::error::{EngineError, Result};
use crate::http::method::Method;
use crate::http::parser::{BodyProgress, Parser};
use crate::http::Headers;
use crate::path::PathComponents;
use crate::url::Url;

/// A parsed HTTP request, bound to the connection it was read from.
///
/// Holds everything the start-line and headers stages produced, plus the
/// parser itself so [`Request::read_body_chunk`] can keep streaming the
/// body. The connection descriptor is a borrowed `&TcpStream` — this
/// request cannot outlive the connection, and cannot close it.
pub struct Request<'a> {
    method: Method,
    version: (u16, u16),
    url: Url,
    path: PathComponents,
    headers: Headers,
    content_length: u64,
    peer: &'a TcpStream,
    parser: Parser<&'a TcpStream>,
}

impl<'a> Request<'a> {
    /// Builds a `Request` from a parser that has completed its start-line
    /// and headers stages. Fails if the parser never reached a parsed URL
    /// (i.e. `request_line` was never called or failed before producing one).
    pub(crate) fn from_parser(peer: &'a TcpStream, parser: Parser<&'a TcpStream>) -> Result<Self> {
        let url = parser.url().cloned().ok_or(EngineError::WrongStage)?;
        let path = PathComponents::parse(url.path.as_deref().unwrap_or("/"));
        Ok(Request {
            method: parser.method(),
            version: parser.version(),
            url,
            path,
            headers: parser.headers().clone(),
            content_length: parser.content_length(),
            peer,
            parser,
        })
    }

    /// Replaces the path components with ones annotated by route matching
    /// (wildcard ordinals resolved against the winning pattern).
    pub(crate) fn set_matched_path(&mut self, path: PathComponents) {
        self.path = path;
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn version(&self) -> (u16, u16) {
        self.version
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &PathComponents {
        &self.path
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn peer(&self) -> &TcpStream {
        self.peer
    }

    /// The path components a wildcard slot at ordinal `pos` absorbed, after
    /// route matching has resolved this request's path against the winning
    /// pattern. See `path::PathPattern::matches`.
    pub fn pathvar(&self, pos: usize) -> PathComponents {
        self.path.pathvar(pos)
    }

    /// Streams the next chunk of the request body into `buf`.
    pub fn read_body_chunk(&mut self, buf: &mut [u8]) -> Result<BodyProgress> {
        self.parser.read_body_chunk(buf)
    }

    pub fn is_body_finished(&self) -> bool {
        self.parser.is_finished()
    }
}
