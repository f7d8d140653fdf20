//! Demultiplexing of control messages and interleaved blocks.
//!
//! After SETUP with `RTP/AVP/TCP;interleaved=...` (RFC 2326 §10.12) the
//! server writes RTP/RTCP packets onto the RTSP connection between
//! responses. Every unit therefore starts with one of two prefixes:
//!
//! ```text
//! $ <channel> <len_hi> <len_lo> <payload...>        block
//! R T S P /1.0 200 OK\r\n ...                      control response
//! ```
//!
//! Anything else means the reader is misaligned (a partial read, a peer
//! bug, or a payload length that lied). The reader then scans forward for
//! the next `$` whose channel maps to a registered sub-stream.

use std::io::{self, Read};

use crate::error::{MalformedKind, Result, RtspError};
use crate::protocol::response::{
    Block, ControlResponse, Headers, Response, STATUS_OK, STATUS_UNAUTHORIZED,
};
use crate::transport::PushbackReader;

/// First byte of an interleaved block header.
pub const BLOCK_MARKER: u8 = b'$';

/// First four bytes of every RTSP status line.
const PROTOCOL_SIGNATURE: &[u8; 4] = b"RTSP";

/// Reads one logical unit at a time off a shared connection.
pub struct FrameReader<R> {
    reader: PushbackReader<R>,
    max_resync_scan: Option<usize>,
    max_line_len: Option<usize>,
}

impl<R> FrameReader<R> {
    /// `max_resync_scan` bounds how many bytes a resync may skip before
    /// giving up with [`RtspError::Desync`]; `None` scans until EOF.
    pub fn new(inner: R, max_resync_scan: Option<usize>) -> Self {
        Self {
            reader: PushbackReader::new(inner),
            max_resync_scan,
            max_line_len: None,
        }
    }

    /// Bound the status line and each header line; a longer line is
    /// [`MalformedKind::LineTooLong`]. `None` leaves lines unbounded.
    pub fn with_max_line_len(mut self, max_line_len: Option<usize>) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }

    /// Underlying stream, for writing requests.
    pub fn get_mut(&mut self) -> &mut R {
        self.reader.get_mut()
    }

    pub fn into_parts(self) -> (R, Vec<u8>) {
        self.reader.into_parts()
    }
}

impl<R: Read> FrameReader<R> {
    /// Consume exactly one unit: a block, or a control response with its body.
    ///
    /// `stream_count` is the number of registered sub-streams; during a
    /// resync, a candidate header is accepted only if `channel / 2` is
    /// below it.
    pub fn read_response(&mut self, stream_count: usize) -> Result<Response> {
        let mut head = [0u8; 4];
        self.reader.read_exact(&mut head)?;

        if head[0] == BLOCK_MARKER {
            return self.read_block(head).map(Response::Block);
        }

        if &head == PROTOCOL_SIGNATURE {
            self.reader.unread(&head);
            return self.read_control().map(Response::Control);
        }

        tracing::warn!(prefix = ?head, "stream misaligned, scanning for block header");
        self.reader.unread(&head[1..]);
        self.resync(stream_count).map(Response::Block)
    }

    fn read_block(&mut self, head: [u8; 4]) -> Result<Block> {
        let channel = head[1];
        let len = usize::from(u16::from_be_bytes([head[2], head[3]]));
        let mut payload = vec![0u8; len];
        self.reader.read_exact(&mut payload)?;
        tracing::trace!(channel, len, "block");
        Ok(Block { channel, payload })
    }

    fn resync(&mut self, stream_count: usize) -> Result<Block> {
        let mut scanned = 0usize;
        loop {
            self.skip_to_marker(&mut scanned)?;

            let mut head = [BLOCK_MARKER, 0, 0, 0];
            self.reader.read_exact(&mut head[1..])?;

            let channel = head[1];
            if usize::from(channel / 2) < stream_count {
                tracing::debug!(channel, scanned, "resynchronized");
                return self.read_block(head);
            }

            tracing::warn!(channel, stream_count, "rejected block candidate");
            self.reader.unread(&head[1..]);
        }
    }

    /// Advance past the next block marker.
    fn skip_to_marker(&mut self, scanned: &mut usize) -> Result<()> {
        let limit = self.max_resync_scan;
        for byte in self.reader.scan() {
            *scanned += 1;
            if byte? == BLOCK_MARKER {
                return Ok(());
            }
            if let Some(limit) = limit
                && *scanned >= limit
            {
                return Err(RtspError::Desync { scanned: *scanned });
            }
        }
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stream closed while resynchronizing").into())
    }

    fn read_line(&mut self) -> Result<String> {
        let line = self.reader.read_line(self.max_line_len).map_err(|e| {
            if e.kind() == io::ErrorKind::InvalidData {
                RtspError::malformed(MalformedKind::LineTooLong)
            } else {
                RtspError::Io(e)
            }
        })?;
        String::from_utf8(line).map_err(|_| RtspError::malformed(MalformedKind::InvalidEncoding))
    }

    fn read_control(&mut self) -> Result<ControlResponse> {
        let status_line = self.read_line()?;
        let fields: Vec<&str> = status_line.splitn(3, ' ').collect();
        if fields.len() < 2 {
            return Err(RtspError::malformed(MalformedKind::InvalidStatusLine));
        }
        let status: i64 = fields[1]
            .parse()
            .map_err(|_| RtspError::malformed(MalformedKind::InvalidStatusCode))?;
        let reason = fields.get(2).copied().unwrap_or_default().to_string();

        let mut headers = Headers::new();
        loop {
            let line = self.read_line()?;
            if line.is_empty() {
                break;
            }
            let colon_pos = line
                .find(':')
                .ok_or(RtspError::malformed(MalformedKind::InvalidHeader))?;
            headers.push(line[..colon_pos].trim(), line[colon_pos + 1..].trim());
        }

        tracing::debug!(status, %reason, headers = headers.len(), "control response");

        let status_code = match u16::try_from(status) {
            Ok(code @ (STATUS_OK | STATUS_UNAUTHORIZED)) => code,
            _ => return Err(RtspError::Protocol { status }),
        };

        let mut response = ControlResponse {
            status_code,
            reason,
            headers,
            body: Vec::new(),
        };

        if response.is_success() {
            // Content-Length is untrusted: buffer only what actually arrives.
            let len = response.content_length() as u64;
            let read = (&mut self.reader).take(len).read_to_end(&mut response.body)?;
            if (read as u64) < len {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("body ended after {read} of {len} bytes"),
                )
                .into());
            }
        }

        Ok(response)
    }
}
