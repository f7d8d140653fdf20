use std::io::Write;

use crate::error::Result;

/// Protocol version written on every request line.
pub const RTSP_VERSION: &str = "RTSP/1.0";

/// An outbound RTSP request (RFC 2326 §6).
///
/// RTSP requests follow HTTP/1.1 syntax:
///
/// ```text
/// Method SP Request-URI SP RTSP-Version CRLF
/// *(Header: Value CRLF)
/// CSeq: n CRLF
/// CRLF
/// ```
///
/// The `CSeq` header is not part of the request itself; it is assigned
/// at send time by [`Client`](crate::Client) and passed to
/// [`serialize`](Self::serialize).
#[derive(Debug, Clone)]
#[must_use]
pub struct Request {
    /// RTSP method (OPTIONS, DESCRIBE, SETUP, PLAY, etc.).
    pub method: String,
    /// Request-URI (e.g. `rtsp://host:port/stream/track1`).
    pub target: String,
    /// Header lines in the order they are written.
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: &str, target: &str) -> Self {
        Request {
            method: method.to_string(),
            target: target.to_string(),
            headers: Vec::new(),
        }
    }

    pub fn add_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Look up a header value by name (case-insensitive, per RFC 2326 §4.2).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Serialize to the RTSP text wire format with the given sequence number.
    pub fn serialize(&self, cseq: u32) -> String {
        let mut request = format!("{} {} {}\r\n", self.method, self.target, RTSP_VERSION);

        for (name, value) in &self.headers {
            request.push_str(&format!("{}: {}\r\n", name, value));
        }

        request.push_str(&format!("CSeq: {}\r\n", cseq));
        request.push_str("\r\n");
        request
    }

    /// Write the serialized request in one piece and flush.
    ///
    /// A failure part-way leaves the peer with a truncated request; the
    /// connection must be treated as dead.
    pub fn write_to<W: Write>(&self, writer: &mut W, cseq: u32) -> Result<()> {
        writer.write_all(self.serialize(cseq).as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RtspError;
    use std::io;

    #[test]
    fn serialize_options() {
        let req = Request::new("OPTIONS", "rtsp://localhost:8554/test");
        assert_eq!(
            req.serialize(1),
            "OPTIONS rtsp://localhost:8554/test RTSP/1.0\r\nCSeq: 1\r\n\r\n"
        );
    }

    #[test]
    fn cseq_follows_extra_headers() {
        let req = Request::new("SETUP", "rtsp://localhost:8554/test/track1")
            .add_header("Transport", "RTP/AVP/TCP;unicast;interleaved=0-1")
            .add_header("Session", "12345678");
        let s = req.serialize(3);
        assert_eq!(
            s,
            "SETUP rtsp://localhost:8554/test/track1 RTSP/1.0\r\n\
             Transport: RTP/AVP/TCP;unicast;interleaved=0-1\r\n\
             Session: 12345678\r\n\
             CSeq: 3\r\n\
             \r\n"
        );
    }

    #[test]
    fn header_lookup_case_insensitive() {
        let req = Request::new("OPTIONS", "*").add_header("User-Agent", "ping");
        assert_eq!(req.get_header("user-agent"), Some("ping"));
        assert_eq!(req.get_header("Accept"), None);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_io_error() {
        let req = Request::new("OPTIONS", "rtsp://localhost/test");
        let err = req.write_to(&mut BrokenPipe, 1).unwrap_err();
        assert!(matches!(err, RtspError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe));
    }
}
