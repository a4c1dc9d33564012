//! An embeddable, single-threaded HTTP/1.1 server engine.
//!
//! The crate is organized leaves-first: [`byte_reader`] is the buffered
//! adapter over a descriptor; [`url`] and [`path`] are standalone parsers;
//! [`http`] builds the staged request parser on top of [`byte_reader`];
//! [`request`] and [`response`] are the facade handed to application
//! handlers; [`server`] ties it all together behind a registered router.
//!
//! Logging is done through the `log` facade only — install a logger (such
//! as `env_logger`, used by the `webserver-demo` binary) to see it.

pub mod byte_reader;
pub mod config;
pub mod error;
pub mod http;
pub mod path;
pub mod request;
pub mod response;
pub mod server;
pub mod url;

pub use config::ServerConfig;
pub use error::{EngineError, Result};
pub use http::{BodyProgress, Method};
pub use request::Request;
pub use response::Response;
pub use server::Server;
