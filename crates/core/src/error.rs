//! Error types for the RTSP client engine.

use std::fmt;

/// Errors that can occur while driving an RTSP connection.
///
/// Variants map to specific failure modes across the stack:
///
/// - **Transport**: [`Io`](Self::Io): socket failures and premature EOF.
///   Always fatal to the connection.
/// - **Framing**: [`Malformed`](Self::Malformed),
///   [`Desync`](Self::Desync): the byte stream could not be parsed.
/// - **Protocol**: [`Protocol`](Self::Protocol): a status code the engine
///   does not handle.
/// - **Auth**: [`Auth`](Self::Auth): a challenge that cannot be answered.
/// - **Connector**: [`InvalidUrl`](Self::InvalidUrl).
#[derive(Debug, thiserror::Error)]
pub enum RtspError {
    /// Underlying I/O or socket error, including EOF in the middle of a unit.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The status line or header block of a response could not be parsed.
    #[error("malformed RTSP response: {kind}")]
    Malformed { kind: MalformedKind },

    /// The peer answered with a status code other than 200 or 401.
    #[error("unexpected RTSP status {status}")]
    Protocol { status: i64 },

    /// The peer requested authentication that cannot be satisfied.
    #[error("RTSP authentication failed: {kind}")]
    Auth { kind: AuthErrorKind },

    /// Resynchronization gave up after the configured scan window.
    #[error("lost framing: no valid block header within {scanned} bytes")]
    Desync { scanned: usize },

    /// The connection URL is not a usable `rtsp://` URL.
    #[error("invalid RTSP URL: {0}")]
    InvalidUrl(String),
}

/// Specific kind of response parse failure.
#[derive(Debug)]
pub enum MalformedKind {
    /// Status line did not have at least `Version Status-Code`.
    InvalidStatusLine,
    /// Status code was not an integer.
    InvalidStatusCode,
    /// A header line did not contain a colon separator.
    InvalidHeader,
    /// A line was not valid UTF-8.
    InvalidEncoding,
    /// A status or header line exceeded the configured maximum length.
    LineTooLong,
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStatusLine => write!(f, "invalid status line"),
            Self::InvalidStatusCode => write!(f, "invalid status code"),
            Self::InvalidHeader => write!(f, "invalid header"),
            Self::InvalidEncoding => write!(f, "invalid encoding"),
            Self::LineTooLong => write!(f, "line too long"),
        }
    }
}

/// Why a `401 Unauthorized` challenge could not be answered.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// The challenge is valid but no username or password was supplied.
    MissingCredentials,
    /// The challenge lacks a realm or a nonce, or does not parse.
    IncompleteChallenge,
    /// The challenge uses a scheme other than `Digest`.
    UnsupportedScheme(String),
    /// A 401 arrived without a `WWW-Authenticate` header.
    MissingChallenge,
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "username and password required"),
            Self::IncompleteChallenge => write!(f, "challenge missing realm or nonce"),
            Self::UnsupportedScheme(scheme) => write!(f, "unsupported scheme {scheme:?}"),
            Self::MissingChallenge => write!(f, "401 without WWW-Authenticate"),
        }
    }
}

impl RtspError {
    pub(crate) fn malformed(kind: MalformedKind) -> Self {
        Self::Malformed { kind }
    }

    pub(crate) fn auth(kind: AuthErrorKind) -> Self {
        Self::Auth { kind }
    }
}

/// Convenience alias for `Result<T, RtspError>`.
pub type Result<T> = std::result::Result<T, RtspError>;
