//! Minimal HTTP/1.1 framing
//!
//! [`HttpCodec`] decodes requests with an optional `Content-Length` body
//! and encodes responses. Chunked request bodies are not accepted. The
//! body cap is enforced from the declared length, before any body byte is
//! buffered.

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::GatewayError;

/// Largest accepted request line plus headers
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

// =============================================================================
// Request
// =============================================================================

/// Request method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `OPTIONS`
    Options,
    /// Anything else, as sent
    Other(String),
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "OPTIONS" => Method::Options,
            other => Method::Other(other.to_string()),
        }
    }
}

/// A decoded request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method
    pub method: Method,
    /// Request target, path plus optional query
    pub target: String,
    /// `true` for HTTP/1.1, `false` for HTTP/1.0
    pub http11: bool,
    /// Header pairs in arrival order
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: Bytes,
}

impl HttpRequest {
    /// Path component of the target
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Raw query string, empty when absent
    pub fn query(&self) -> &str {
        self.target.split_once('?').map_or("", |(_, query)| query)
    }

    /// First header with this name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the connection stays open after the response
    pub fn keep_alive(&self) -> bool {
        match self.header("connection") {
            Some(value) if value.eq_ignore_ascii_case("close") => false,
            Some(value) if value.eq_ignore_ascii_case("keep-alive") => true,
            _ => self.http11,
        }
    }
}

// =============================================================================
// Response
// =============================================================================

/// A response ready for encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Header pairs; `Content-Length` is added by the encoder
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Empty response with the given status
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// 200 with a JSON body
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::new(200)
            .with_header("Content-Type", "application/json; charset=utf-8")
            .with_body(body)
    }

    /// Append a header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Replace the body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// First header with this name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Reason phrase for the status codes the gateway emits
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        403 => "Forbidden",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

// =============================================================================
// Codec
// =============================================================================

#[derive(Debug)]
struct PendingHead {
    method: Method,
    target: String,
    http11: bool,
    headers: Vec<(String, String)>,
    content_length: usize,
}

/// Tokio codec for HTTP/1.1 requests and responses
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use tokio_util::codec::Decoder;
/// use docgate_server::http::{HttpCodec, Method};
///
/// let mut codec = HttpCodec::new(1024);
/// let mut buf = BytesMut::from("GET /?get=u1 HTTP/1.1\r\nHost: x\r\n\r\n");
///
/// let request = codec.decode(&mut buf).unwrap().unwrap();
/// assert_eq!(request.method, Method::Get);
/// assert_eq!(request.query(), "get=u1");
/// ```
#[derive(Debug)]
pub struct HttpCodec {
    max_body_bytes: usize,
    pending: Option<PendingHead>,
}

impl HttpCodec {
    /// Create a codec that refuses bodies above `max_body_bytes`
    pub fn new(max_body_bytes: usize) -> Self {
        Self {
            max_body_bytes,
            pending: None,
        }
    }

    fn parse_head(&self, head: &[u8]) -> Result<PendingHead, GatewayError> {
        let text = std::str::from_utf8(head)
            .map_err(|_| GatewayError::Malformed("request head is not UTF-8".into()))?;
        let mut lines = text.split("\r\n");

        let request_line = lines.next().unwrap_or_default();
        let mut parts = request_line.split(' ');
        let (Some(method), Some(target), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(GatewayError::Malformed(format!(
                "bad request line: {request_line:?}"
            )));
        };
        let http11 = match version {
            "HTTP/1.1" => true,
            "HTTP/1.0" => false,
            other => {
                return Err(GatewayError::Malformed(format!(
                    "unsupported version {other:?}"
                )))
            }
        };
        if method.is_empty() || target.is_empty() {
            return Err(GatewayError::Malformed("empty method or target".into()));
        }

        let mut headers = Vec::new();
        for line in lines.filter(|l| !l.is_empty()) {
            let Some((name, value)) = line.split_once(':') else {
                return Err(GatewayError::Malformed(format!("bad header line: {line:?}")));
            };
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }

        let mut declared: Option<usize> = None;
        for (name, value) in &headers {
            if name.eq_ignore_ascii_case("transfer-encoding") {
                return Err(GatewayError::Malformed(
                    "transfer-encoding is not supported".into(),
                ));
            }
            if name.eq_ignore_ascii_case("content-length") {
                let length: usize = value.parse().map_err(|_| {
                    GatewayError::Malformed(format!("bad content-length {value:?}"))
                })?;
                // Repeats must agree (RFC 9112 section 6.3)
                if declared.is_some_and(|first| first != length) {
                    return Err(GatewayError::Malformed(
                        "conflicting content-length headers".into(),
                    ));
                }
                declared = Some(length);
            }
        }
        let content_length = declared.unwrap_or(0);
        if content_length > self.max_body_bytes {
            return Err(GatewayError::PayloadTooLarge {
                length: content_length,
                limit: self.max_body_bytes,
            });
        }

        Ok(PendingHead {
            method: Method::parse(method),
            target: target.to_string(),
            http11,
            headers,
            content_length,
        })
    }
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
}

impl Decoder for HttpCodec {
    type Item = HttpRequest;
    type Error = GatewayError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<HttpRequest>, GatewayError> {
        if self.pending.is_none() {
            // Stray CRLFs between pipelined requests
            while src.starts_with(b"\r\n") {
                let _ = src.split_to(2);
            }

            let Some(end) = find_terminator(src) else {
                if src.len() > MAX_HEAD_BYTES {
                    return Err(GatewayError::Malformed("request head too large".into()));
                }
                return Ok(None);
            };
            if end > MAX_HEAD_BYTES {
                return Err(GatewayError::Malformed("request head too large".into()));
            }

            let head = src.split_to(end + HEAD_TERMINATOR.len());
            self.pending = Some(self.parse_head(&head[..end])?);
        }

        let needed = self.pending.as_ref().map_or(0, |p| p.content_length);
        if src.len() < needed {
            src.reserve(needed - src.len());
            return Ok(None);
        }

        let Some(head) = self.pending.take() else {
            return Ok(None);
        };
        let body = src.split_to(head.content_length).freeze();
        Ok(Some(HttpRequest {
            method: head.method,
            target: head.target,
            http11: head.http11,
            headers: head.headers,
            body,
        }))
    }
}

impl Encoder<HttpResponse> for HttpCodec {
    type Error = GatewayError;

    fn encode(&mut self, item: HttpResponse, dst: &mut BytesMut) -> Result<(), GatewayError> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\n",
            item.status,
            reason_phrase(item.status)
        );
        for (name, value) in &item.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str(&format!("Content-Length: {}\r\n\r\n", item.body.len()));

        dst.reserve(head.len() + item.body.len());
        dst.put_slice(head.as_bytes());
        dst.put_slice(&item.body);
        Ok(())
    }
}
