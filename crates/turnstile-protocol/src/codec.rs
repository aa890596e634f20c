//! Decoding compact three-part tokens into [`Claims`].
//!
//! A compact token is `header.payload.signature`, each segment URL-safe
//! base64. We only ever read the payload — signature verification is the
//! backend's job, and the header carries nothing we need. Decoding is
//! deliberately infallible at the API level: any malformed input yields
//! `None`, and the caller treats "no claims" as "no session".

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};

use crate::Claims;

/// Decodes the claims out of a raw compact token.
///
/// Returns `None` for every flavor of malformed input: no payload
/// segment, invalid base64, or a payload that isn't a JSON object with
/// the expected shape. Never panics, never returns an error.
pub fn decode(raw: &str) -> Option<Claims> {
    let payload = raw.split('.').nth(1)?;
    if payload.is_empty() {
        return None;
    }

    // Token segments are unpadded URL-safe base64; restore the padding
    // so the standard engine accepts them either way.
    let mut padded = payload.to_owned();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let bytes = URL_SAFE.decode(padded.as_bytes()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Encodes claims as an *unsigned* compact token (`alg: none`, empty
/// signature segment).
///
/// This exists for fixtures: the session and client crates need to
/// fabricate tokens with chosen expiries without a signing key. The
/// backend would reject such a token; [`decode`] accepts it because it
/// never looks at the signature.
pub fn encode_unsigned(claims: &Claims) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD
        .encode(serde_json::to_vec(claims).unwrap_or_default());
    format!("{header}.{payload}.")
}
