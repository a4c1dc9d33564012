//! The engine's closed error taxonomy.
//!
//! Every fallible operation in this crate returns [`Result<T, EngineError>`](EngineError).
//! Variants mirror the error table of the original design: transport failures,
//! bounds violations, parser failures, and capability gaps. There is no
//! "out of memory" variant — Rust's global allocator aborts the process on
//! allocation failure rather than handing back a `Result`, so that condition
//! has no reachable equivalent here.

use thiserror::Error;

/// The error type returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The socket passed to a connection-level operation was not usable.
    #[error("bad socket")]
    BadSocket,
    /// A socket could not be created.
    #[error("failed to create socket")]
    FailedSocket,
    /// An address representation could not be parsed or resolved.
    #[error("bad address: {0}")]
    BadAddress(String),
    /// `bind`/`listen` failed because the address was already in use.
    #[error("address already in use")]
    AddressInUse,
    /// A read from the connection failed.
    #[error("failed to read from connection: {0}")]
    FailedRead(#[source] std::io::Error),
    /// A write to the connection failed.
    #[error("failed to write to connection: {0}")]
    FailedWrite(#[source] std::io::Error),
    /// The peer closed the connection before the expected data arrived.
    #[error("unexpected end of stream")]
    Eof,
    /// Fewer bytes were buffered than the caller asked to peek or consume.
    #[error("out of bounds: requested {requested} bytes, {available} available")]
    OutOfBounds {
        /// Number of bytes the caller requested.
        requested: usize,
        /// Number of bytes actually buffered.
        available: usize,
    },
    /// The request or response URL exceeded the configured maximum length.
    #[error("url exceeds maximum length")]
    UrlTooLong,
    /// An operation was attempted while the parser was at the wrong stage.
    #[error("parser is at the wrong stage for this operation")]
    WrongStage,
    /// The bytes on the wire did not conform to the expected grammar.
    #[error("failed to parse HTTP message: {0}")]
    FailedParse(String),
    /// The requested capability is not implemented by this engine.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => EngineError::Eof,
            std::io::ErrorKind::AddrInUse => EngineError::AddressInUse,
            _ => EngineError::FailedRead(err),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
