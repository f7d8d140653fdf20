//! Per-connection RTSP client state (RFC 2326 §3, §12.17, §12.37).
//!
//! - `CSeq`: every request carries a sequence number, starting at 1 and
//!   strictly increasing. Numbers are never reused, including across
//!   requests that failed.
//! - Session identifier: assigned by the server (normally in the SETUP
//!   response). The first value seen is kept for the lifetime of the
//!   connection; later, different values are ignored.
//! - Authentication: the last digest challenge, plus the credential derived
//!   from it for the most recent method and target.

use crate::auth::{self, Challenge, Credential};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct SessionState {
    cseq: u32,
    session_id: Option<String>,
    challenge: Option<Challenge>,
    credential: Option<Credential>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the sequence counter and return the new value.
    pub fn next_cseq(&mut self) -> u32 {
        self.cseq += 1;
        self.cseq
    }

    /// Last sequence number handed out (0 before the first request).
    pub fn cseq(&self) -> u32 {
        self.cseq
    }

    /// Record `id` unless a session identifier is already set.
    ///
    /// Returns `true` if `id` was captured.
    pub fn capture_session(&mut self, id: &str) -> bool {
        match &self.session_id {
            Some(existing) => {
                if existing != id {
                    tracing::debug!(%existing, ignored = id, "session id already set");
                }
                false
            }
            None => {
                tracing::info!(session_id = id, "session established");
                self.session_id = Some(id.to_string());
                true
            }
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Replace the current challenge. Any credential derived from the old
    /// one is dropped.
    pub fn set_challenge(&mut self, challenge: Challenge) {
        self.challenge = Some(challenge);
        self.credential = None;
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// `Authorization` header value for `method` on `target`.
    ///
    /// `None` until a challenge has been received. The cached credential is
    /// reused when method and target match; otherwise it is recomputed from
    /// the stored realm and nonce.
    pub fn authorization_for(
        &mut self,
        method: &str,
        target: &str,
        username: &str,
        password: &str,
    ) -> Result<Option<String>> {
        let Some(challenge) = &self.challenge else {
            return Ok(None);
        };

        if let Some(cred) = &self.credential
            && cred.matches(method, target)
        {
            return Ok(Some(cred.authorization.clone()));
        }

        let cred = auth::respond(challenge, method, target, username, password)?;
        tracing::info!(method, target, realm = %cred.realm, "derived digest credential");
        let authorization = cred.authorization.clone();
        self.credential = Some(cred);
        Ok(Some(authorization))
    }
}
