pub mod auth;
pub mod client;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use auth::{Challenge, Credential, derive_credential};
pub use client::{Client, ClientConfig};
pub use error::{AuthErrorKind, MalformedKind, Result, RtspError};
pub use protocol::{Block, ControlResponse, Request, Response};
