/// `200 OK` (RFC 2326 §7.1.1).
pub const STATUS_OK: u16 = 200;

/// `401 Unauthorized`: the request must be reissued with credentials.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Response headers as received.
///
/// Lookups are case-insensitive per RFC 2326 §4.2. A name that appears
/// several times keeps every value, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, value: &str) {
        self.0.push((name.to_string(), value.to_string()));
    }

    /// First value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    /// Every value for `name`, in arrival order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        self.0
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A parsed RTSP control response (RFC 2326 §7).
///
/// ```text
/// RTSP/1.0 200 OK\r\n
/// CSeq: 1\r\n
/// Content-Length: 142\r\n
/// \r\n
/// v=0\r\n...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlResponse {
    pub status_code: u16,
    pub reason: String,
    pub headers: Headers,
    /// `Content-Length` bytes following the header block. Only read for
    /// `200 OK`; empty otherwise.
    pub body: Vec<u8>,
}

impl ControlResponse {
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }

    pub fn is_challenge(&self) -> bool {
        self.status_code == STATUS_UNAUTHORIZED
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Declared `Content-Length`; absent or unparseable counts as 0.
    pub fn content_length(&self) -> usize {
        self.headers
            .get("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Session identifier from the `Session` header (RFC 2326 §12.37),
    /// without parameters: `"ABCD;timeout=60"` -> `"ABCD"`.
    pub fn session_id(&self) -> Option<&str> {
        self.headers
            .get("Session")
            .and_then(|s| s.split(';').next())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// An interleaved binary block (RFC 2326 §10.12).
///
/// ```text
/// | '$' | channel | length (u16 BE) | payload ... |
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Interleaved channel; sub-stream `channel / 2`, RTP on even, RTCP on odd.
    pub channel: u8,
    pub payload: Vec<u8>,
}

impl Block {
    /// Index of the sub-stream this block belongs to.
    pub fn stream_index(&self) -> usize {
        usize::from(self.channel / 2)
    }
}

/// One logical unit read off the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Control(ControlResponse),
    Block(Block),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(headers: &[(&str, &str)]) -> ControlResponse {
        let mut h = Headers::new();
        for (name, value) in headers {
            h.push(name, value);
        }
        ControlResponse {
            status_code: STATUS_OK,
            reason: "OK".to_string(),
            headers: h,
            body: Vec::new(),
        }
    }

    #[test]
    fn multiple_values_preserved() {
        let resp = response(&[
            ("WWW-Authenticate", "Digest realm=\"a\", nonce=\"b\""),
            ("www-authenticate", "Basic realm=\"a\""),
        ]);
        let all: Vec<&str> = resp.headers.get_all("WWW-AUTHENTICATE").collect();
        assert_eq!(all, vec!["Digest realm=\"a\", nonce=\"b\"", "Basic realm=\"a\""]);
        assert_eq!(resp.get_header("www-authenticate"), Some(all[0]));
    }

    #[test]
    fn content_length_defaults_to_zero() {
        assert_eq!(response(&[]).content_length(), 0);
        assert_eq!(response(&[("Content-Length", "abc")]).content_length(), 0);
        assert_eq!(response(&[("content-length", " 42 ")]).content_length(), 42);
    }

    #[test]
    fn session_id_strips_parameters() {
        let resp = response(&[("Session", "47112344;timeout=60")]);
        assert_eq!(resp.session_id(), Some("47112344"));
        assert_eq!(response(&[("Session", "")]).session_id(), None);
    }

    #[test]
    fn block_stream_index() {
        let rtcp = Block {
            channel: 3,
            payload: vec![],
        };
        assert_eq!(rtcp.stream_index(), 1);
    }
}
