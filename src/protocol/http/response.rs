use super::{Headers, headers::names};

/// HTTP status codes used on the AirPlay control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const SWITCHING_PROTOCOLS: StatusCode = StatusCode(101);
    pub const OK: StatusCode = StatusCode(200);
    pub const NOT_FOUND: StatusCode = StatusCode(404);

    /// Check if this is a success status (2xx)
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Get status code as u16
    #[must_use]
    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

/// An HTTP response message
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP version (always "HTTP/1.1")
    pub version: String,
    /// Status code
    pub status: StatusCode,
    /// Reason phrase
    pub reason: String,
    /// Response headers
    pub headers: Headers,
    /// Response body (may be empty)
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Check if response indicates success
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body interpreted as UTF-8, for assertions and logging
    #[must_use]
    pub fn body_as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Builder for HTTP responses
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Headers,
    body: Option<Vec<u8>>,
}

impl ResponseBuilder {
    /// Create a new response builder with the given status
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: None,
        }
    }

    /// Create an OK (200) response builder
    #[must_use]
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Create a 101 upgrade response with the fixed `PTTH/1.0` handshake
    /// headers the AirPlay client expects on `/reverse`
    #[must_use]
    pub fn upgrade() -> Self {
        Self::new(StatusCode::SWITCHING_PROTOCOLS)
            .header(names::UPGRADE, "PTTH/1.0")
            .header(names::CONNECTION, "Upgrade")
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Set a plain text body
    #[must_use]
    pub fn text_body(mut self, body: &str) -> Self {
        self.body = Some(body.as_bytes().to_vec());
        self.headers
            .insert(names::CONTENT_TYPE.to_string(), "text/plain".to_string());
        self
    }

    /// Set a body with an explicit content type
    #[must_use]
    pub fn typed_body(mut self, body: Vec<u8>, content_type: &str) -> Self {
        self.body = Some(body);
        self.headers
            .insert(names::CONTENT_TYPE.to_string(), content_type.to_string());
        self
    }

    /// Build into an `HttpResponse`
    ///
    /// Content-Length is filled in for everything except the 101
    /// handshake, so clients on the persistent connection know where
    /// each response ends.
    #[must_use]
    pub fn build(mut self) -> HttpResponse {
        let body = self.body.unwrap_or_default();

        if self.status != StatusCode::SWITCHING_PROTOCOLS {
            self.headers
                .insert(names::CONTENT_LENGTH.to_string(), body.len().to_string());
        }

        HttpResponse {
            version: "HTTP/1.1".to_string(),
            status: self.status,
            reason: status_reason(self.status).to_string(),
            headers: self.headers,
            body,
        }
    }
}

/// Encode an HTTP response to bytes
#[must_use]
pub fn encode_response(response: &HttpResponse) -> Vec<u8> {
    let mut output = Vec::with_capacity(256 + response.body.len());

    output.extend_from_slice(
        format!(
            "{} {} {}\r\n",
            response.version,
            response.status.as_u16(),
            response.reason
        )
        .as_bytes(),
    );

    for (name, value) in response.headers.iter() {
        output.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }

    output.extend_from_slice(b"\r\n");

    if !response.body.is_empty() {
        output.extend_from_slice(&response.body);
    }

    output
}

/// Get reason phrase for status code
fn status_reason(status: StatusCode) -> &'static str {
    match status.as_u16() {
        101 => "Switching Protocols",
        200 => "OK",
        404 => "Not Found",
        _ => "Unknown",
    }
}
