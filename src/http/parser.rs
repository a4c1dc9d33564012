//! The staged HTTP request parser.
//!
//! Grounded in `original_source/http/parser.h` (`HTTP_Parser`, `receive_line`,
//! the `_next_token` lexer, `request_line`/`headers`/`stream_body`), with the
//! teacher's `src/http/request/mod.rs` contributing the struct-of-fields
//! shape. The four-stage state machine (start-line, headers, body, done)
//! never moves backward; each public operation checks the stage it expects
//! before doing any work, then advances unconditionally, win or lose, so a
//! caller can always see what was parsed even out of a failed call.

use crate::byte_reader::ByteReader;
use crate::config::ServerConfig;
use crate::error::{EngineError, Result};
use crate::http::headers::Headers;
use crate::http::method::Method;
use crate::url::{self, Url};
use std::io::Read;

/// Which half of a message this parser is reading.
///
/// Only [`ParserKind::Request`] is implemented; `Response` is carried so the
/// stage machine's shape already accommodates a client mode, but
/// [`Parser::status_line`] always fails until one is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    Request,
    Response,
}

/// The parser's current position in the strict linear stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    StartLine,
    Headers,
    Body,
    Done,
}

/// The outcome of one body-streaming call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyProgress {
    /// `n` bytes were copied into the caller's buffer; more may remain.
    Continuing(usize),
    /// The body is fully consumed (or there never was one).
    Done,
}

const RFC2616_SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={} \t";

fn is_separator(c: u8) -> bool {
    RFC2616_SEPARATORS.contains(&c)
}

fn is_ctl(c: u8) -> bool {
    c < 0x20 || c == 0x7f
}

/// A cursor-based lexer over one already-reassembled line, producing the
/// GENTOK/SEP/NUMBER/CRLF tokens of §4.4. Whitespace is skipped by a
/// dedicated step, not folded into the tokenizer.
struct Lexer<'a> {
    line: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(line: &'a [u8]) -> Self {
        Lexer { line, pos: 0 }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.line.len() && matches!(self.line[self.pos], b' ' | b'\t') {
            self.pos += 1;
        }
    }

    /// A run of bytes that are neither control characters nor separators.
    fn gentok(&mut self) -> Option<String> {
        let start = self.pos;
        while self.pos < self.line.len() && !is_separator(self.line[self.pos]) && !is_ctl(self.line[self.pos]) {
            self.pos += 1;
        }
        if self.pos == start {
            None
        } else {
            Some(String::from_utf8_lossy(&self.line[start..self.pos]).into_owned())
        }
    }

    fn expect_gentok(&mut self, expect: &str) -> Result<()> {
        match self.gentok() {
            Some(ref t) if t == expect => Ok(()),
            other => Err(EngineError::FailedParse(format!(
                "expected {:?}, found {:?}",
                expect, other
            ))),
        }
    }

    fn expect_sep(&mut self, c: u8) -> Result<()> {
        if self.pos < self.line.len() && self.line[self.pos] == c {
            self.pos += 1;
            Ok(())
        } else {
            Err(EngineError::FailedParse(format!(
                "expected separator {:?}",
                c as char
            )))
        }
    }

    fn expect_number(&mut self) -> Result<u16> {
        let start = self.pos;
        while self.pos < self.line.len() && self.line[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(EngineError::FailedParse("expected a number".into()));
        }
        std::str::from_utf8(&self.line[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .ok_or_else(|| EngineError::FailedParse("numeric token overflowed u16".into()))
    }

    fn expect_crlf(&mut self) -> Result<()> {
        if self.pos < self.line.len() && self.line[self.pos] == b'\r' {
            self.pos += 1;
            if self.pos < self.line.len() && self.line[self.pos] == b'\n' {
                self.pos += 1;
            }
            return Ok(());
        }
        if self.pos < self.line.len() && self.line[self.pos] == b'\n' {
            self.pos += 1;
            return Ok(());
        }
        Err(EngineError::FailedParse("expected line terminator".into()))
    }

    /// The raw URI token: bytes up to the next whitespace or terminator,
    /// not run through the GENTOK classifier (the URI legitimately contains
    /// separator bytes like '/' and '?'). Fails `UrlTooLong` rather than a
    /// generic parse failure, since the caller needs to distinguish the two.
    fn raw_token(&mut self, max_len: usize) -> Result<String> {
        let start = self.pos;
        while self.pos < self.line.len() && !matches!(self.line[self.pos], b' ' | b'\t' | b'\r' | b'\n') {
            self.pos += 1;
        }
        if self.pos - start > max_len {
            return Err(EngineError::UrlTooLong);
        }
        Ok(String::from_utf8_lossy(&self.line[start..self.pos]).into_owned())
    }
}

/// A staged HTTP message parser reading from a borrowed byte source.
pub struct Parser<R: Read> {
    kind: ParserKind,
    stage: Stage,
    method: Method,
    status: u16,
    version: (u16, u16),
    url_string: String,
    url: Option<Url>,
    headers: Headers,
    content_length: u64,
    reader: ByteReader<R>,
    body_start_offset: i64,
    ignore_lf: bool,
    last_read_count: usize,
    total_read_count: u64,
    max_url_len: usize,
    max_method_len: usize,
    max_line_len: usize,
}

impl<R: Read> Parser<R> {
    /// Builds a parser of `kind` reading from `source`, sized by `config`.
    pub fn new(source: R, kind: ParserKind, config: &ServerConfig) -> Self {
        Parser {
            kind,
            stage: Stage::StartLine,
            method: Method::Unknown,
            status: 0,
            version: (1, 1),
            url_string: String::new(),
            url: None,
            headers: Headers::new(),
            content_length: 0,
            reader: ByteReader::new(source, config.reader_buffer_capacity),
            body_start_offset: -1,
            ignore_lf: false,
            last_read_count: 0,
            total_read_count: 0,
            max_url_len: config.max_url_len,
            max_method_len: config.max_method_len,
            max_line_len: config.max_url_len + config.max_method_len + 32,
        }
    }

    pub fn kind(&self) -> ParserKind {
        self.kind
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn version(&self) -> (u16, u16) {
        self.version
    }

    pub fn url_string(&self) -> &str {
        &self.url_string
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Total bytes consumed from the underlying connection so far, across
    /// every stage.
    pub fn total_consumed(&self) -> u64 {
        self.reader.total_consumed()
    }

    /// Bytes delivered by the most recent [`Parser::read_body_chunk`] call.
    pub fn last_read_count(&self) -> usize {
        self.last_read_count
    }

    /// Cumulative body bytes delivered since the body stage began.
    pub fn total_read_count(&self) -> u64 {
        self.total_read_count
    }

    /// Alias for [`Parser::total_read_count`], matching the body-size
    /// terminology used for the `body_size <= content_length` invariant.
    pub fn body_size(&self) -> u64 {
        self.total_read_count
    }

    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Reassembles one line from the byte reader, consuming and including
    /// its terminator. A bare CR sets a flag that swallows a leading LF on
    /// the very next byte read, so a CRLF split across two buffer refills
    /// is still treated as one terminator.
    fn receive_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        loop {
            self.reader.prefetch(1)?;
            let b = match self.reader.peek_byte() {
                Some(b) => b,
                None => return Err(EngineError::Eof),
            };
            self.reader.consume_n(None, 1);

            if self.ignore_lf {
                self.ignore_lf = false;
                if b == b'\n' {
                    continue;
                }
            }

            line.push(b);

            if b == b'\r' {
                self.reader.prefetch(1).ok();
                if self.reader.peek_byte() == Some(b'\n') {
                    self.reader.consume_n(None, 1);
                    line.push(b'\n');
                } else {
                    self.ignore_lf = true;
                }
                break;
            }
            if b == b'\n' {
                break;
            }
            if line.len() > self.max_line_len {
                return Err(EngineError::FailedParse("line exceeds maximum length".into()));
            }
        }
        Ok(line)
    }

    /// Parses the request-line: `GENTOK(method) SP token(URI) SP "HTTP" "/" NUMBER "." NUMBER CRLF`.
    ///
    /// Requires the parser to be at [`Stage::StartLine`]; fails
    /// [`EngineError::WrongStage`] without side effects otherwise. On any
    /// other outcome the stage advances to [`Stage::Headers`] regardless,
    /// so a caller can still inspect whatever was parsed before the failure.
    pub fn request_line(&mut self) -> Result<()> {
        if self.stage != Stage::StartLine {
            return Err(EngineError::WrongStage);
        }
        let result = self.do_request_line();
        self.stage = Stage::Headers;
        result
    }

    fn do_request_line(&mut self) -> Result<()> {
        let line = self.receive_line()?;
        let mut lx = Lexer::new(&line);

        lx.skip_ws();
        let method_tok = lx
            .gentok()
            .ok_or_else(|| EngineError::FailedParse("missing request method".into()))?;
        if method_tok.len() > self.max_method_len {
            return Err(EngineError::FailedParse("method token too long".into()));
        }
        self.method = Method::from_token(&method_tok);

        lx.skip_ws();
        let uri = lx.raw_token(self.max_url_len)?;

        lx.skip_ws();
        lx.expect_gentok("HTTP")?;
        lx.expect_sep(b'/')?;
        let major = lx.expect_number()?;
        lx.expect_sep(b'.')?;
        let minor = lx.expect_number()?;
        lx.skip_ws();
        lx.expect_crlf()?;

        self.version = (major, minor);
        self.url_string = uri.clone();
        self.url = Some(url::parse(&uri)?);
        Ok(())
    }

    /// Response status-line parsing, for an eventual client mode. Not
    /// implemented: this engine is server-only.
    pub fn status_line(&mut self) -> Result<()> {
        Err(EngineError::NotImplemented("status-line parsing (client mode)"))
    }

    /// Parses header lines until the terminating blank line.
    ///
    /// Requires [`Stage::Headers`]; advances to [`Stage::Body`] regardless
    /// of outcome. A `Content-Length` header (compared case-insensitively)
    /// sets [`Parser::content_length`]; a malformed value is logged and
    /// ignored rather than failing the whole stage.
    pub fn parse_headers(&mut self) -> Result<()> {
        if self.stage != Stage::Headers {
            return Err(EngineError::WrongStage);
        }
        let result = self.do_parse_headers();
        self.stage = Stage::Body;
        result
    }

    fn do_parse_headers(&mut self) -> Result<()> {
        loop {
            let line = self.receive_line()?;
            if matches!(line.as_slice(), [b'\r', b'\n'] | [b'\n'] | [b'\r']) {
                return Ok(());
            }

            let mut lx = Lexer::new(&line);
            let name = lx
                .gentok()
                .ok_or_else(|| EngineError::FailedParse("missing header field-name".into()))?;
            lx.expect_sep(b':')?;
            lx.skip_ws();

            let mut value_end = line.len();
            if line.ends_with(b"\r\n") {
                value_end -= 2;
            } else if line.ends_with(b"\r") || line.ends_with(b"\n") {
                value_end -= 1;
            }
            let value = String::from_utf8_lossy(&line[lx.pos..value_end]).into_owned();

            if name.eq_ignore_ascii_case("content-length") {
                match value.trim().parse::<u64>() {
                    Ok(n) => self.content_length = n,
                    Err(_) => log::warn!("malformed Content-Length header value: {:?}", value),
                }
            }

            self.headers.push(name, value);
        }
    }

    /// Streams up to `buf.len()` bytes of the message body into `buf`.
    ///
    /// Requires the parser to have reached [`Stage::Body`] at least once;
    /// fails [`EngineError::WrongStage`] if called before the headers stage
    /// has completed. Once the body is exhausted the stage advances to
    /// [`Stage::Done`] and subsequent calls return `Ok(BodyProgress::Done)`
    /// rather than erroring, so callers can poll without tracking
    /// completion themselves.
    pub fn read_body_chunk(&mut self, buf: &mut [u8]) -> Result<BodyProgress> {
        match self.stage {
            Stage::StartLine | Stage::Headers => return Err(EngineError::WrongStage),
            Stage::Done => {
                self.last_read_count = 0;
                return Ok(BodyProgress::Done);
            }
            Stage::Body => {}
        }

        if self.body_start_offset < 0 {
            self.body_start_offset = self.reader.total_consumed() as i64;
        }

        if self.content_length == 0 || self.total_read_count >= self.content_length {
            self.stage = Stage::Done;
            self.last_read_count = 0;
            return Ok(BodyProgress::Done);
        }

        let remaining = self.content_length - self.total_read_count;
        let to_read = (buf.len() as u64).min(remaining) as usize;
        self.reader.read_n(&mut buf[..to_read], to_read)?;
        self.last_read_count = to_read;
        self.total_read_count += to_read as u64;

        if self.total_read_count == self.content_length {
            self.stage = Stage::Done;
        }
        Ok(BodyProgress::Continuing(to_read))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;

    fn parser_over(bytes: &'static [u8]) -> Parser<Cursor<&'static [u8]>> {
        Parser::new(Cursor::new(bytes), ParserKind::Request, &ServerConfig::default())
    }

    /// A `Read` source that hands back one queued chunk per call, so a test
    /// can force a byte sequence to straddle two distinct underlying reads
    /// regardless of the `ByteReader`'s buffer capacity. `None` entries
    /// simulate a read that currently has nothing to offer (the peer's next
    /// byte hasn't arrived on the wire yet) without signalling permanent EOF.
    struct StaggeredReader {
        chunks: VecDeque<Option<Vec<u8>>>,
    }

    impl StaggeredReader {
        fn new(chunks: Vec<Option<&[u8]>>) -> Self {
            StaggeredReader {
                chunks: chunks.into_iter().map(|c| c.map(|b| b.to_vec())).collect(),
            }
        }
    }

    impl Read for StaggeredReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            loop {
                match self.chunks.front_mut() {
                    Some(Some(chunk)) => {
                        if chunk.is_empty() {
                            self.chunks.pop_front();
                            continue;
                        }
                        let n = chunk.len().min(buf.len());
                        buf[..n].copy_from_slice(&chunk[..n]);
                        chunk.drain(..n);
                        return Ok(n);
                    }
                    Some(None) => {
                        self.chunks.pop_front();
                        return Ok(0);
                    }
                    None => return Ok(0),
                }
            }
        }
    }

    #[test]
    fn parses_simple_get_request_line() {
        let mut p = parser_over(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
        p.request_line().unwrap();
        assert_eq!(p.method(), Method::Get);
        assert_eq!(p.url_string(), "/");
        assert_eq!(p.version(), (1, 1));
        assert_eq!(p.stage(), Stage::Headers);
    }

    #[test]
    fn wrong_stage_is_rejected_without_side_effects() {
        let mut p = parser_over(b"GET / HTTP/1.1\r\n\r\n");
        assert!(matches!(p.parse_headers(), Err(EngineError::WrongStage)));
        assert_eq!(p.stage(), Stage::StartLine);
    }

    #[test]
    fn headers_stage_collects_pairs_and_stops_at_blank_line() {
        let mut p = parser_over(b"GET /echo HTTP/1.1\r\nContent-Length: 5\r\nX-Foo: bar\r\n\r\nhello");
        p.request_line().unwrap();
        p.parse_headers().unwrap();
        assert_eq!(p.content_length(), 5);
        assert_eq!(p.headers().get("X-Foo"), Some("bar"));
        assert_eq!(p.stage(), Stage::Body);
    }

    #[test]
    fn content_length_header_name_is_case_insensitive() {
        let mut p = parser_over(b"POST / HTTP/1.1\r\ncontent-length: 3\r\n\r\nabc");
        p.request_line().unwrap();
        p.parse_headers().unwrap();
        assert_eq!(p.content_length(), 3);
    }

    #[test]
    fn malformed_content_length_is_ignored_not_fatal() {
        let mut p = parser_over(b"POST / HTTP/1.1\r\nContent-Length: notanumber\r\n\r\n");
        p.request_line().unwrap();
        assert!(p.parse_headers().is_ok());
        assert_eq!(p.content_length(), 0);
    }

    #[test]
    fn body_streams_in_caller_sized_chunks() {
        let mut p = parser_over(b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello");
        p.request_line().unwrap();
        p.parse_headers().unwrap();

        let mut buf = [0u8; 2];
        let mut collected = Vec::new();
        loop {
            match p.read_body_chunk(&mut buf).unwrap() {
                BodyProgress::Continuing(n) => collected.extend_from_slice(&buf[..n]),
                BodyProgress::Done => break,
            }
        }
        assert_eq!(collected, b"hello");
        assert!(p.is_finished());
    }

    #[test]
    fn zero_content_length_finishes_immediately() {
        let mut p = parser_over(b"GET / HTTP/1.1\r\n\r\n");
        p.request_line().unwrap();
        p.parse_headers().unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(p.read_body_chunk(&mut buf).unwrap(), BodyProgress::Done);
    }

    #[test]
    fn single_byte_reader_buffer_still_reassembles_the_request_line() {
        let config = ServerConfig::with_reader_buffer_capacity(1);
        let mut p = Parser::new(Cursor::new(&b"GET / HTTP/1.1\r\n\r\n"[..]), ParserKind::Request, &config);
        p.request_line().unwrap();
        assert_eq!(p.method(), Method::Get);
        assert_eq!(p.url_string(), "/");
    }

    #[test]
    fn bare_cr_and_lf_split_across_lines_are_each_a_terminator() {
        let mut p = parser_over(b"GET / HTTP/1.1\nHost: x\n\n");
        p.request_line().unwrap();
        p.parse_headers().unwrap();
        assert_eq!(p.headers().get("Host"), Some("x"));
    }

    #[test]
    fn oversized_url_is_rejected() {
        let config = ServerConfig {
            max_url_len: 4,
            ..ServerConfig::default()
        };
        let mut p = Parser::new(
            Cursor::new(&b"GET /too/long/a/path HTTP/1.1\r\n\r\n"[..]),
            ParserKind::Request,
            &config,
        );
        assert!(matches!(p.request_line(), Err(EngineError::UrlTooLong)));
    }

    #[test]
    fn status_line_is_not_implemented() {
        let mut p = parser_over(b"");
        assert!(matches!(p.status_line(), Err(EngineError::NotImplemented(_))));
    }

    #[test]
    fn url_exactly_at_max_length_is_accepted() {
        let config = ServerConfig {
            max_url_len: 8,
            ..ServerConfig::default()
        };
        let uri = "/abcdefg"; // exactly 8 bytes
        let request = format!("GET {} HTTP/1.1\r\n\r\n", uri);
        let mut p = Parser::new(Cursor::new(request.into_bytes()), ParserKind::Request, &config);
        p.request_line().unwrap();
        assert_eq!(p.url_string(), uri);
        assert_eq!(p.stage(), Stage::Headers);
    }

    #[test]
    fn one_byte_buffer_with_cr_lf_split_across_separate_reads_is_one_terminator() {
        // The request line's CR arrives in one underlying read, the peer's
        // LF hasn't landed yet (simulated by a zero-byte read), and the
        // rest of the request arrives in a third read. A 1-byte reader
        // buffer rules out the line simply being reassembled from bytes
        // already sitting in one larger prefetch.
        let config = ServerConfig::with_reader_buffer_capacity(1);
        let source = StaggeredReader::new(vec![
            Some(b"GET / HTTP/1.1\r".as_ref()),
            None,
            Some(b"\nHost: x\r\n\r\n".as_ref()),
        ]);
        let mut p = Parser::new(source, ParserKind::Request, &config);
        p.request_line().unwrap();
        assert_eq!(p.method(), Method::Get);
        assert_eq!(p.url_string(), "/");
        p.parse_headers().unwrap();
        assert_eq!(p.headers().get("Host"), Some("x"));
    }

    #[test]
    fn zero_content_length_leaves_surplus_body_bytes_unconsumed() {
        let head = b"POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n";
        let body_surplus = b"unexpected-body";
        let mut bytes = Vec::new();
        bytes.extend_from_slice(head);
        bytes.extend_from_slice(body_surplus);

        let mut p = Parser::new(Cursor::new(bytes), ParserKind::Request, &ServerConfig::default());
        p.request_line().unwrap();
        p.parse_headers().unwrap();
        let consumed_after_headers = p.total_consumed();
        assert_eq!(consumed_after_headers, head.len() as u64);

        let mut buf = [0u8; 64];
        assert_eq!(p.read_body_chunk(&mut buf).unwrap(), BodyProgress::Done);
        assert_eq!(
            p.total_consumed(),
            consumed_after_headers,
            "content_length=0 must not consume the surplus body bytes already buffered"
        );
    }
}
