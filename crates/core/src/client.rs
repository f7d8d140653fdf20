use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::TcpStream;

use crate::auth::Challenge;
use crate::error::{AuthErrorKind, Result, RtspError};
use crate::protocol::frame::FrameReader;
use crate::protocol::{Block, ControlResponse, Request, Response};
use crate::session::SessionState;
use crate::transport::Endpoint;
use crate::transport::tcp::DEFAULT_RTSP_PORT;

/// Default bound on a status or header line.
pub const DEFAULT_MAX_LINE_LEN: usize = 8192;

/// Client-level configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on bytes skipped while resynchronizing a misaligned
    /// stream. `None` keeps scanning until the peer closes the connection.
    pub max_resync_scan: Option<usize>,
    /// Longest status or header line accepted, excluding the line ending.
    /// `None` removes the bound.
    pub max_line_len: Option<usize>,
    /// Sent as `User-Agent` on every request when set.
    pub user_agent: Option<String>,
    /// Port used by [`Client::connect`] when the URL has none.
    pub default_port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_resync_scan: None,
            max_line_len: Some(DEFAULT_MAX_LINE_LEN),
            user_agent: None,
            default_port: DEFAULT_RTSP_PORT,
        }
    }
}

/// The request currently awaiting its response.
#[derive(Debug)]
struct InFlight {
    method: String,
    target: String,
    cseq: u32,
    authorized: bool,
}

/// Synchronous RTSP client over one interleaved connection.
///
/// Owns the connection for its whole lifetime; dropping the client closes
/// it. All I/O blocks the calling thread and there are no timeouts; set
/// socket timeouts on the stream before handing it over if a stalled peer
/// must not hang the caller.
///
/// Only one request is in flight at a time. Interleaved blocks that arrive
/// while waiting for a response are queued and returned, in order, by
/// later [`read_response`](Self::read_response) calls.
pub struct Client<S> {
    frames: FrameReader<S>,
    session: SessionState,
    config: ClientConfig,
    target: String,
    username: Option<String>,
    password: Option<String>,
    streams: Vec<String>,
    in_flight: Option<InFlight>,
    queued_blocks: VecDeque<Block>,
}

impl Client<TcpStream> {
    /// Connect to an `rtsp://[user[:password]@]host[:port]/path` URL.
    ///
    /// Credentials in the URL are used to answer digest challenges and are
    /// stripped from the request target.
    pub fn connect(url: &str, config: ClientConfig) -> Result<Self> {
        let endpoint = Endpoint::parse(url, config.default_port)?;
        let stream = endpoint.connect()?;
        let client = Client::new(stream, &endpoint.target, config);
        Ok(match (endpoint.username, endpoint.password) {
            (None, None) => client,
            (username, password) => client.with_credentials(
                username.as_deref().unwrap_or_default(),
                password.as_deref().unwrap_or_default(),
            ),
        })
    }
}

impl<S> Client<S> {
    /// Wrap an already-open connection. `target` is the default request
    /// target, normally the presentation URL.
    pub fn new(stream: S, target: &str, config: ClientConfig) -> Self {
        Self {
            frames: FrameReader::new(stream, config.max_resync_scan)
                .with_max_line_len(config.max_line_len),
            session: SessionState::new(),
            config,
            target: target.to_string(),
            username: None,
            password: None,
            streams: Vec::new(),
            in_flight: None,
            queued_blocks: VecDeque::new(),
        }
    }

    /// Username and password used to answer digest challenges.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    /// Register a sub-stream (e.g. after SETUP) and return its base
    /// interleaved channel: RTP on `channel`, RTCP on `channel + 1`.
    ///
    /// Returns `None` once all 128 channel pairs are taken.
    pub fn register_stream(&mut self, control: &str) -> Option<u8> {
        let channel = u8::try_from(self.streams.len() * 2).ok()?;
        self.streams.push(control.to_string());
        tracing::debug!(control, channel, "registered stream");
        Some(channel)
    }

    pub fn streams(&self) -> &[String] {
        &self.streams
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.session_id()
    }

    /// Last `CSeq` sent (0 before the first request).
    pub fn cseq(&self) -> u32 {
        self.session.cseq()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &S {
        self.frames.get_ref()
    }

    /// Release the connection along with bytes read but not yet consumed.
    /// Queued blocks are dropped.
    pub fn into_parts(self) -> (S, Vec<u8>) {
        self.frames.into_parts()
    }

    fn credentials(&self) -> (&str, &str) {
        (
            self.username.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
        )
    }
}

impl<S: Read + Write> Client<S> {
    /// Send `request` and return the `CSeq` it was sent with.
    ///
    /// Adds `User-Agent` (if configured) and `Authorization` (once a
    /// challenge has been received) unless the request already has them.
    /// A write failure leaves the connection unusable.
    pub fn send(&mut self, mut request: Request) -> Result<u32> {
        if let Some(agent) = &self.config.user_agent
            && request.get_header("User-Agent").is_none()
        {
            request = request.add_header("User-Agent", agent);
        }

        if request.get_header("Authorization").is_none() {
            let (username, password) = self.credentials();
            let (username, password) = (username.to_string(), password.to_string());
            if let Some(authorization) = self.session.authorization_for(
                &request.method,
                &request.target,
                &username,
                &password,
            )? {
                request = request.add_header("Authorization", &authorization);
            }
        }

        let cseq = self.session.next_cseq();
        let authorized = request.get_header("Authorization").is_some();

        tracing::debug!(
            method = %request.method,
            target = %request.target,
            cseq,
            authorized,
            "request"
        );

        request.write_to(self.frames.get_mut(), cseq)?;

        self.in_flight = Some(InFlight {
            method: request.method,
            target: request.target,
            cseq,
            authorized,
        });
        Ok(cseq)
    }

    /// Read the next unit: a queued block, or whatever comes off the wire.
    pub fn read_response(&mut self) -> Result<Response> {
        if let Some(block) = self.queued_blocks.pop_front() {
            return Ok(Response::Block(block));
        }
        self.read_from_wire()
    }

    fn read_from_wire(&mut self) -> Result<Response> {
        let response = self.frames.read_response(self.streams.len())?;
        if let Response::Control(control) = &response {
            self.on_control(control)?;
        }
        Ok(response)
    }

    fn on_control(&mut self, control: &ControlResponse) -> Result<()> {
        let in_flight = self.in_flight.take();

        if control.is_success() {
            if let Some(id) = control.session_id() {
                self.session.capture_session(id);
            }
            return Ok(());
        }

        let header = control
            .get_header("WWW-Authenticate")
            .ok_or(RtspError::auth(AuthErrorKind::MissingChallenge))?;
        let challenge = Challenge::parse(header)?;

        if let Some(req) = &in_flight
            && req.authorized
        {
            tracing::warn!(
                method = %req.method,
                cseq = req.cseq,
                realm = %challenge.realm,
                "credentials rejected"
            );
        }

        let (username, password) = self.credentials();
        if username.is_empty() || password.is_empty() {
            return Err(RtspError::auth(AuthErrorKind::MissingCredentials));
        }
        let (username, password) = (username.to_string(), password.to_string());

        tracing::info!(realm = %challenge.realm, "authentication requested");
        self.session.set_challenge(challenge);

        if let Some(req) = in_flight {
            self.session
                .authorization_for(&req.method, &req.target, &username, &password)?;
        }
        Ok(())
    }

    /// Send `method` to the default target and wait for its response.
    pub fn request(&mut self, method: &str, headers: &[(&str, &str)]) -> Result<ControlResponse> {
        let target = self.target.clone();
        self.request_to(method, &target, headers)
    }

    /// Send `method` to `target` and wait for its response.
    ///
    /// A `401` is returned as a response, not an error, once a credential
    /// has been derived from it; reissuing the request attaches that
    /// credential automatically.
    pub fn request_to(
        &mut self,
        method: &str,
        target: &str,
        headers: &[(&str, &str)],
    ) -> Result<ControlResponse> {
        let request = headers
            .iter()
            .fold(Request::new(method, target), |req, (name, value)| {
                req.add_header(name, value)
            });
        self.send(request)?;

        loop {
            match self.read_from_wire()? {
                Response::Control(control) => return Ok(control),
                Response::Block(block) => {
                    tracing::trace!(channel = block.channel, "queued block while awaiting response");
                    self.queued_blocks.push_back(block);
                }
            }
        }
    }

    /// Capability discovery (`OPTIONS`, RFC 2326 §10.1). The body is discarded.
    pub fn options(&mut self) -> Result<ControlResponse> {
        let mut response = self.request("OPTIONS", &[])?;
        response.body.clear();
        Ok(response)
    }
}
