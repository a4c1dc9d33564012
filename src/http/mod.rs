//! HTTP wire-format building blocks: the closed method and status tables,
//! and the staged request parser that sits on top of a [`ByteReader`](crate::byte_reader::ByteReader).

pub mod headers;
pub mod method;
pub mod parser;
pub mod status;

pub use headers::{Header, Headers};
pub use method::Method;
pub use parser::{BodyProgress, Parser, ParserKind, Stage};
