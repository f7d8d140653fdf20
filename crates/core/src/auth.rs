//! Digest authentication (RFC 2069 style, as used by RTSP cameras).
//!
//! A server that wants credentials answers `401 Unauthorized` with a
//! challenge:
//!
//! ```text
//! WWW-Authenticate: Digest realm="LIVE555 Streaming Media", nonce="c633aaf8b831..."
//! ```
//!
//! The client reissues the request with:
//!
//! ```text
//! HA1      = MD5(username:realm:password)
//! HA2      = MD5(method:uri)
//! response = MD5(HA1:nonce:HA2)
//!
//! Authorization: Digest username="..", realm="..", nonce="..", uri="..", response=".."
//! ```
//!
//! `qop`, `cnonce` and `algorithm` are not negotiated.

use digest_auth::WwwAuthenticateHeader;
use md5::{Digest, Md5};

use crate::error::{AuthErrorKind, Result, RtspError};

/// `realm` and `nonce` from a `WWW-Authenticate: Digest ...` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub realm: String,
    pub nonce: String,
}

impl Challenge {
    /// Parse a challenge header value.
    ///
    /// Unknown attributes are ignored. A scheme other than `Digest` is
    /// [`AuthErrorKind::UnsupportedScheme`]; a missing or empty realm or
    /// nonce, or an attribute list that does not parse, is
    /// [`AuthErrorKind::IncompleteChallenge`].
    pub fn parse(header: &str) -> Result<Self> {
        let header = header.trim();
        let (scheme, params) = header.split_once(' ').unwrap_or((header, ""));
        if !scheme.eq_ignore_ascii_case("Digest") {
            return Err(RtspError::auth(AuthErrorKind::UnsupportedScheme(
                scheme.to_string(),
            )));
        }

        let parsed = WwwAuthenticateHeader::parse(&format!("Digest {}", params.trim()))
            .map_err(|e| {
                tracing::debug!(error = %e, "unparseable digest challenge");
                RtspError::auth(AuthErrorKind::IncompleteChallenge)
            })?;
        if parsed.realm.is_empty() || parsed.nonce.is_empty() {
            return Err(RtspError::auth(AuthErrorKind::IncompleteChallenge));
        }

        Ok(Challenge {
            realm: parsed.realm,
            nonce: parsed.nonce,
        })
    }
}

/// An `Authorization` header value bound to one method and target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub realm: String,
    pub nonce: String,
    pub method: String,
    pub target: String,
    /// The final digest (`response=` attribute).
    pub response: String,
    /// Full header value, attached verbatim to the request.
    pub authorization: String,
}

impl Credential {
    /// Whether this credential was derived for `method` on `target`.
    pub fn matches(&self, method: &str, target: &str) -> bool {
        self.method == method && self.target == target
    }
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}

/// Compute the credential answering `challenge` for `method` on `target`.
pub fn respond(
    challenge: &Challenge,
    method: &str,
    target: &str,
    username: &str,
    password: &str,
) -> Result<Credential> {
    if username.is_empty() || password.is_empty() {
        return Err(RtspError::auth(AuthErrorKind::MissingCredentials));
    }

    let Challenge { realm, nonce } = challenge;
    let ha1 = md5_hex(&format!("{username}:{realm}:{password}"));
    let ha2 = md5_hex(&format!("{method}:{target}"));
    let response = md5_hex(&format!("{ha1}:{nonce}:{ha2}"));

    let authorization = format!(
        r#"Digest username="{username}", realm="{realm}", nonce="{nonce}", uri="{target}", response="{response}""#
    );

    Ok(Credential {
        realm: realm.clone(),
        nonce: nonce.clone(),
        method: method.to_string(),
        target: target.to_string(),
        response,
        authorization,
    })
}

/// Parse `header` and derive the credential in one step.
pub fn derive_credential(
    header: &str,
    method: &str,
    target: &str,
    username: &str,
    password: &str,
) -> Result<Credential> {
    let challenge = Challenge::parse(header)?;
    respond(&challenge, method, target, username, password)
}
