use super::{Headers, Method};

/// An HTTP request message
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method
    pub method: Method,
    /// Request URI as sent, including any query string
    pub uri: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (may be empty)
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a new request with no headers or body
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Request path without the query string
    ///
    /// Paths are matched case-sensitively by the dispatcher, so no
    /// normalization happens here.
    #[must_use]
    pub fn path(&self) -> &str {
        match self.uri.split_once('?') {
            Some((path, _)) => path,
            None => &self.uri,
        }
    }

    /// Look up a query parameter by name
    ///
    /// AirPlay query values are plain numerics, so no percent-decoding
    /// is applied. The first occurrence wins.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        let (_, query) = self.uri.split_once('?')?;

        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then_some(value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_strips_query() {
        let request = HttpRequest::new(Method::Post, "/scrub?position=42");
        assert_eq!(request.path(), "/scrub");
    }

    #[test]
    fn test_path_without_query() {
        let request = HttpRequest::new(Method::Get, "/server-info");
        assert_eq!(request.path(), "/server-info");
    }

    #[test]
    fn test_query_param() {
        let request = HttpRequest::new(Method::Post, "/rate?value=1.000000");
        assert_eq!(request.query_param("value"), Some("1.000000"));
        assert_eq!(request.query_param("position"), None);
    }

    #[test]
    fn test_query_param_multiple() {
        let request = HttpRequest::new(Method::Post, "/x?a=1&b=2");
        assert_eq!(request.query_param("a"), Some("1"));
        assert_eq!(request.query_param("b"), Some("2"));
    }

    #[test]
    fn test_query_param_no_query() {
        let request = HttpRequest::new(Method::Post, "/stop");
        assert_eq!(request.query_param("value"), None);
    }
}
