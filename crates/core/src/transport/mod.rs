//! Byte-level plumbing beneath the RTSP engine.
//!
//! - **Reader** ([`reader`]): a buffered reader with push-back, so bytes
//!   peeked while classifying the next unit on the wire are replayed
//!   rather than lost.
//!
//! - **TCP** ([`tcp`]): turns an `rtsp://` URL into an open connection,
//!   the request target, and any credentials embedded in the URL.
//!
//! Control messages and interleaved blocks (RFC 2326 §10.12) share the
//! one TCP connection; demultiplexing happens in
//! [`protocol::frame`](crate::protocol::frame).

pub mod reader;
pub mod tcp;

pub use reader::PushbackReader;
pub use tcp::Endpoint;
