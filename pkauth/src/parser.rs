//! Digest authorization header parsing.

use crate::auth::DigestCredential;
use crate::error::{AuthError, Result};

const USERNAME: &str = "username";
const NONCE: &str = "nonce";
const NC: &str = "nc";
const CNONCE: &str = "cnonce";
const QOP: &str = "qop";
const URI: &str = "uri";
const RESPONSE: &str = "response";

/// Every key that must appear in the header. No key is a prefix of another,
/// so at most one can match at a given scan position.
const REQUIRED: [&str; 7] = [USERNAME, NONCE, NC, CNONCE, QOP, URI, RESPONSE];

/// Parses the value of an `Authorization: Digest` header into a
/// [`DigestCredential`].
///
/// Scans `raw` for `key=value` and `key="value"` pairs for the seven
/// required keys. Values may be quoted with `"` or `'` (terminated by the
/// matching quote) or unquoted (terminated by comma or whitespace); the
/// quoted form wins when both could apply. A key seen more than once keeps
/// its last value.
///
/// Fails with [`AuthError::MalformedHeader`] if any required key is absent —
/// there is no partial result. Field *content* is not validated here: in
/// particular `uri` is taken as-is and never compared to the real request
/// target; that check is deliberately outside this parser.
pub fn parse_digest_header(raw: &str) -> Result<DigestCredential> {
    let mut username = None;
    let mut nonce = None;
    let mut nc = None;
    let mut cnonce = None;
    let mut qop = None;
    let mut uri = None;
    let mut response = None;

    let mut pos = 0;
    while pos < raw.len() {
        if !raw.is_char_boundary(pos) {
            pos += 1;
            continue;
        }

        match scan_pair(&raw[pos..]) {
            Some((key, value, consumed)) => {
                let value = Some(value.to_string());
                match key {
                    USERNAME => username = value,
                    NONCE => nonce = value,
                    NC => nc = value,
                    CNONCE => cnonce = value,
                    QOP => qop = value,
                    URI => uri = value,
                    RESPONSE => response = value,
                    _ => unreachable!("scan_pair only yields required keys"),
                }
                pos += consumed;
            }
            None => pos += 1,
        }
    }

    Ok(DigestCredential {
        username: username.ok_or(AuthError::MalformedHeader)?,
        nonce: nonce.ok_or(AuthError::MalformedHeader)?,
        nc: nc.ok_or(AuthError::MalformedHeader)?,
        cnonce: cnonce.ok_or(AuthError::MalformedHeader)?,
        qop: qop.ok_or(AuthError::MalformedHeader)?,
        uri: uri.ok_or(AuthError::MalformedHeader)?,
        response: response.ok_or(AuthError::MalformedHeader)?,
    })
}

/// Tries to read one `key=value` pair at the start of `rest`.
///
/// Returns the key, the raw value and how many bytes the pair consumed, or
/// `None` when `rest` does not start with a required key followed by `=` and
/// a value.
fn scan_pair(rest: &str) -> Option<(&'static str, &str, usize)> {
    for key in REQUIRED {
        let Some(after_key) = rest.strip_prefix(key) else {
            continue;
        };
        let Some(after_eq) = after_key.strip_prefix('=') else {
            continue;
        };

        let (value, consumed) = scan_value(after_eq)?;

        return Some((key, value, key.len() + 1 + consumed));
    }

    None
}

/// Reads a quoted or unquoted value at the start of `s`.
fn scan_value(s: &str) -> Option<(&str, usize)> {
    match s.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &s[1..];
            match body.find(quote) {
                // value plus the two quote characters
                Some(end) => Some((&body[..end], end + 2)),
                // unmatched opening quote, fall back to an unquoted read
                None => scan_unquoted(s),
            }
        }
        _ => scan_unquoted(s),
    }
}

fn scan_unquoted(s: &str) -> Option<(&str, usize)> {
    let end = s
        .find(|c: char| c == ',' || c.is_whitespace())
        .unwrap_or(s.len());

    if end == 0 {
        return None;
    }

    Some((&s[..end], end))
}
