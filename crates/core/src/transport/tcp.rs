use std::net::TcpStream;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{Result, RtspError};

/// Default RTSP port (RFC 2326 §3.2).
pub const DEFAULT_RTSP_PORT: u16 = 554;

/// A resolved `rtsp://` URL, split into what the connection needs.
///
/// Credentials in the URL's userinfo are lifted out and removed from the
/// request target, so they never appear on the wire in a request line.
#[derive(Debug, Clone)]
pub struct Endpoint {
    url: Url,
    default_port: u16,
    /// Request target sent in every request line (URL without userinfo).
    pub target: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Endpoint {
    /// Parse an `rtsp://[user[:password]@]host[:port]/path` URL.
    pub fn parse(raw: &str, default_port: u16) -> Result<Self> {
        let mut url = Url::parse(raw).map_err(|e| RtspError::InvalidUrl(format!("{raw}: {e}")))?;

        if url.scheme() != "rtsp" {
            return Err(RtspError::InvalidUrl(format!(
                "{raw}: only the rtsp scheme is supported"
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(RtspError::InvalidUrl(format!("{raw}: missing host")));
        }

        let username = decode_userinfo(raw, Some(url.username()))?;
        let password = decode_userinfo(raw, url.password())?;

        url.set_username("")
            .and_then(|_| url.set_password(None))
            .map_err(|_| RtspError::InvalidUrl(format!("{raw}: cannot strip credentials")))?;

        Ok(Self {
            target: url.to_string(),
            url,
            default_port,
            username,
            password,
        })
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> u16 {
        self.url.port().unwrap_or(self.default_port)
    }

    /// Open the TCP connection to the URL's host and port.
    pub fn connect(&self) -> Result<TcpStream> {
        let addrs = self.url.socket_addrs(|| Some(self.default_port))?;
        let stream = TcpStream::connect(&*addrs)?;
        tracing::info!(host = self.host(), port = self.port(), "connected");
        Ok(stream)
    }
}

/// Percent-decode a userinfo component; empty counts as absent.
fn decode_userinfo(raw: &str, component: Option<&str>) -> Result<Option<String>> {
    let Some(encoded) = component.filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|decoded| Some(decoded.into_owned()))
        .map_err(|_| RtspError::InvalidUrl(format!("{raw}: credentials are not valid UTF-8")))
}
