//! RTSP client protocol (RFC 2326).
//!
//! This module handles the wire formats: serializing requests, parsing
//! responses, and separating interleaved binary blocks from control
//! messages on the shared TCP connection.
//!
//! ## RTSP message format (RFC 2326 §4)
//!
//! RTSP messages follow HTTP/1.1 syntax with a different method set:
//!
//! ```text
//! OPTIONS rtsp://server/stream RTSP/1.0\r\n
//! CSeq: 1\r\n
//! \r\n
//! ```
//!
//! ```text
//! RTSP/1.0 200 OK\r\n
//! CSeq: 1\r\n
//! Public: OPTIONS, DESCRIBE, SETUP, PLAY, TEARDOWN\r\n
//! \r\n
//! ```
//!
//! Once media is set up over TCP (RFC 2326 §10.12), `$`-framed binary
//! blocks appear between responses; see [`frame`].
//!
//! ## Handled status codes
//!
//! | Code | Meaning | Handling |
//! |------|---------|----------|
//! | 200 | OK | Body read, `Session` captured |
//! | 401 | Unauthorized | Digest challenge negotiated, no body read |
//! | other | Anything else | [`RtspError::Protocol`](crate::RtspError::Protocol) |

pub mod frame;
pub mod request;
pub mod response;

pub use frame::FrameReader;
pub use request::Request;
pub use response::{Block, ControlResponse, Headers, Response};
