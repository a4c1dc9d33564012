//! Compile-time tunables, exposed as runtime-overridable configuration.
//!
//! The original design fixed these as C preprocessor constants
//! (`HTTP_SOCK_BACKLOG`, `HTTP_PARSER_BUF_SZ`, `HTTP_PARSER_URI_MAX_LEN`,
//! `HTTP_METHOD_MAX_LEN`). Here they're fields on [`ServerConfig`] so an
//! embedder can shrink the reader buffer to force line reassembly in tests
//! without recompiling.

/// Tunables for a [`Server`](crate::server::Server) and the components it owns.
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    /// Capacity, in bytes, of the [`ByteReader`](crate::byte_reader::ByteReader)'s
    /// internal buffer. Small values (even 1) are supported and are used by
    /// tests to exercise line reassembly across refills.
    pub reader_buffer_capacity: usize,
    /// Maximum accepted length, in bytes, of the request-line URI token.
    pub max_url_len: usize,
    /// Maximum accepted length, in bytes, of the request-line method token.
    pub max_method_len: usize,
    /// Pending-connection backlog passed to `listen(2)`.
    pub socket_backlog: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            reader_buffer_capacity: 4096,
            max_url_len: 256,
            max_method_len: 16,
            socket_backlog: 420,
        }
    }
}

impl ServerConfig {
    /// A configuration with a deliberately tiny reader buffer, useful for
    /// exercising cross-refill line reassembly in tests.
    pub fn with_reader_buffer_capacity(capacity: usize) -> Self {
        ServerConfig {
            reader_buffer_capacity: capacity,
            ..ServerConfig::default()
        }
    }
}
