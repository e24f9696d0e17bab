//! Webhook sender authentication

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;
use tracing::error;

type HmacSha1 = Hmac<Sha1>;

/// GitHub signs the raw body and sends the digest in this header.
pub const GITHUB_SIGNATURE_HEADER: &str = "X-Hub-Signature";
/// GitLab sends the shared secret back verbatim in this header.
pub const GITLAB_TOKEN_HEADER: &str = "X-GitLab-Token";

/// Credential found on an incoming request. The GitHub header wins when
/// both are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// `X-Hub-Signature` value, expected as `sha1=<hex digest>`.
    GithubSignature(String),
    /// `X-GitLab-Token` value.
    GitlabToken(String),
    /// Neither header present.
    None,
}

/// Picks the credential out of the request headers.
///
/// Header values are not guaranteed to be UTF-8; a non-UTF-8 value can
/// never match a hex digest or a configured secret, so it is decoded
/// lossily and left to fail verification like any other mismatch.
pub fn credential_from_headers(headers: &HeaderMap) -> Credential {
    if let Some(signature) = headers.get(GITHUB_SIGNATURE_HEADER) {
        return Credential::GithubSignature(
            String::from_utf8_lossy(signature.as_bytes()).into_owned(),
        );
    }
    if let Some(token) = headers.get(GITLAB_TOKEN_HEADER) {
        return Credential::GitlabToken(String::from_utf8_lossy(token.as_bytes()).into_owned());
    }
    Credential::None
}

/// Verifies a GitHub `X-Hub-Signature` header against the raw request body.
///
/// The expected value is `"sha1=" + hex(HMAC-SHA1(secret, body))`. The
/// comparison runs in constant time so mismatches do not leak how much of
/// the digest was correct. An empty secret is a valid HMAC key and is not
/// special-cased.
pub fn verify_github_signature(secret: &str, payload: &[u8], signature_header: &str) -> bool {
    let mut mac = match HmacSha1::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);
    let digest = format!("sha1={}", hex::encode(mac.finalize().into_bytes()));

    if bytes_eq_ct(digest.as_bytes(), signature_header.as_bytes()) {
        return true;
    }

    error!(
        "Failed GitHub validation (signature = {} | digest = {})",
        signature_header, digest
    );
    false
}

/// Verifies a GitLab `X-GitLab-Token` header against the shared secret.
/// The token must match byte for byte, case-sensitive.
pub fn verify_gitlab_token(secret: &str, token: &str) -> bool {
    if bytes_eq_ct(token.as_bytes(), secret.as_bytes()) {
        return true;
    }

    error!("Failed GitLab validation (token = {})", token);
    false
}

/// Constant-time byte comparison. Unequal lengths return early; the
/// length of a hex digest is not a secret.
fn bytes_eq_ct(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
