//! Sans-IO HTTP/1.1 server codec for the AirPlay control channel
//!
//! AirPlay remote-control traffic is plain HTTP with a couple of quirks
//! (the `PTTH/1.0` reverse upgrade, persistent connections, bodies that
//! are not HTTP-shaped). This module only implements the server side:
//! request parsing and response generation.

pub mod codec;
pub mod headers;
pub mod request;
pub mod response;

pub use codec::{HttpServerCodec, ParseError};
pub use headers::Headers;
pub use request::HttpRequest;
pub use response::{HttpResponse, ResponseBuilder, StatusCode, encode_response};

/// HTTP methods used by AirPlay clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET (state queries)
    Get,
    /// POST (commands)
    Post,
    /// PUT (photo upload)
    Put,
}

impl Method {
    /// Convert to the wire method string
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }

    /// Parse from the wire (methods are case-sensitive per RFC 9110)
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_roundtrip() {
        assert_eq!(Method::parse("GET"), Some(Method::Get));
        assert_eq!(Method::parse("POST"), Some(Method::Post));
        assert_eq!(Method::parse("PUT"), Some(Method::Put));
        assert_eq!(Method::Post.as_str(), "POST");
    }

    #[test]
    fn test_method_case_sensitive() {
        assert_eq!(Method::parse("get"), None);
        assert_eq!(Method::parse("DELETE"), None);
    }
}
