//! The closed HTTP method table.
//!
//! Grounded in the teacher's `Method` enum (`examples/jackwickham-rust-webserver/src/http/request/mod.rs`)
//! and in `original_source/http/common.h`'s `HTTP_METHOD_MAP`, which
//! restricts the known set to the methods RFC 2616 names and maps anything
//! else to `UNKNOWN` rather than rejecting the request.

/// An HTTP request method, restricted to the set named in §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Options,
    Get,
    Head,
    Post,
    Put,
    Delete,
    Trace,
    Connect,
    /// Any method token that doesn't match the closed table above.
    Unknown,
}

impl Method {
    /// Maps a case-sensitive method token to its `Method`, defaulting to
    /// [`Method::Unknown`] for anything not in the closed table.
    pub fn from_token(token: &str) -> Method {
        match token {
            "OPTIONS" => Method::Options,
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "TRACE" => Method::Trace,
            "CONNECT" => Method::Connect,
            _ => Method::Unknown,
        }
    }

    /// The canonical token for this method, as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Options => "OPTIONS",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
            Method::Unknown => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens_map_to_variants() {
        assert_eq!(Method::from_token("GET"), Method::Get);
        assert_eq!(Method::from_token("POST"), Method::Post);
        assert_eq!(Method::from_token("CONNECT"), Method::Connect);
    }

    #[test]
    fn unknown_token_maps_to_unknown() {
        assert_eq!(Method::from_token("PATCH"), Method::Unknown);
    }

    #[test]
    fn as_str_round_trips_known_methods() {
        for token in ["OPTIONS", "GET", "HEAD", "POST", "PUT", "DELETE", "TRACE", "CONNECT"] {
            assert_eq!(Method::from_token(token).as_str(), token);
        }
    }
}
