//! The accept loop, handler registry, and process-level shutdown flag.
//!
//! Grounded in the teacher's `main`/`handle_connection`
//! (`examples/jackwickham-rust-webserver/src/main.rs`), which loops over
//! `TcpListener::incoming()` and dispatches each stream to a per-connection
//! function. This generalizes that fixed dispatch into a registered
//! Path-Pattern router and adds the cancellable loop and structured logging
//! the original lacked.

use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::{EngineError, Result};
use crate::http::parser::{Parser, ParserKind};
use crate::path::{self, PathPattern};
use crate::request::Request;
use crate::response::Response;

/// A handler bound to a registered path pattern: given a response to write
/// to and the matched request, it drives the exchange to completion.
pub type Handler = Box<dyn Fn(&mut Response, &mut Request) + 'static>;

/// An embeddable single-threaded HTTP server: a bound listening socket plus
/// an ordered list of pattern-to-handler registrations.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    routes: Vec<(PathPattern, Handler)>,
    should_run: Arc<AtomicBool>,
}

impl Server {
    /// Binds `addr` with the default [`ServerConfig`].
    pub fn new(addr: &str) -> Result<Self> {
        Self::with_config(addr, ServerConfig::default())
    }

    /// Binds `addr` with an explicit configuration.
    ///
    /// `addr` is resolved via the system resolver (`std::net::ToSocketAddrs`);
    /// `config.socket_backlog` is retained for API and documentation parity
    /// with the original's `listen(2)` backlog argument, but `std::net`
    /// exposes no way to pass a backlog to the OS listen call, so this
    /// configuration value is currently descriptive only — see DESIGN.md.
    pub fn with_config(addr: &str, config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|e| match e.kind() {
            std::io::ErrorKind::AddrInUse => EngineError::AddressInUse,
            _ => EngineError::BadAddress(addr.to_string()),
        })?;
        Ok(Server {
            listener,
            config,
            routes: Vec::new(),
            should_run: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Registers `handler` under `pattern` (see `path` module for pattern
    /// syntax). Patterns are matched in registration order among ties.
    pub fn register(&mut self, pattern: &str, handler: impl Fn(&mut Response, &mut Request) + 'static) {
        self.routes.push((PathPattern::parse(pattern), Box::new(handler)));
    }

    /// The address this server is actually listening on — useful when
    /// binding to an ephemeral port (`:0`) in tests.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.listener.local_addr().map_err(EngineError::from)
    }

    /// A clonable handle to the process-level "should run" flag. An
    /// embedder wires this to whatever shutdown signal it wants to honor
    /// (SIGINT, a control endpoint, a test harness) by calling `store(false, ...)`
    /// on it; this crate does not install a signal handler itself.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.should_run)
    }

    /// Accepts connections until the shutdown flag is cleared.
    ///
    /// A single malformed connection never stops the loop: parse failures
    /// and unmatched routes are logged and the connection is closed. Only a
    /// failure of `accept` itself (not an interrupted syscall, which is
    /// retried) ends the loop with an error.
    pub fn run(&self) -> Result<()> {
        while self.should_run.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, peer_addr)) => {
                    log::info!("accepted connection from {}", peer_addr);
                    self.handle_connection(stream);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(EngineError::from(e)),
            }
        }
        Ok(())
    }

    fn handle_connection(&self, stream: TcpStream) {
        let mut parser = Parser::new(&stream, ParserKind::Request, &self.config);

        if let Err(e) = parser.request_line() {
            log::warn!("failed to parse request line: {}", e);
            return;
        }
        if let Err(e) = parser.parse_headers() {
            log::warn!("failed to parse headers: {}", e);
            return;
        }

        let mut request = match Request::from_parser(&stream, parser) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("failed to build request: {}", e);
                return;
            }
        };

        let mut path = request.path().clone();
        let patterns: Vec<PathPattern> = self.routes.iter().map(|(p, _)| p.clone()).collect();

        match path::match_patterns(&patterns, &mut path) {
            Some(index) => {
                request.set_matched_path(path);
                let mut response = Response::new(&stream);
                (self.routes[index].1)(&mut response, &mut request);
            }
            None => {
                log::info!("no handler matched path {:?}", request.url().path);
            }
        }
    }
}
