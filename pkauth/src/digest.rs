//! MD5 response computation for the digest exchange.
//!
//! MD5 and the exact lowercase-hex format are dictated by RFC 2617 wire
//! compatibility. Do not reach for this hash outside the digest exchange.

use md5::{Digest, Md5};

use crate::auth::DigestCredential;

/// MD5 over `parts` joined with `:`, as lowercase hex.
fn md5_hex(parts: &[&str]) -> String {
    let mut md5 = Md5::new();

    if let Some((first, rest)) = parts.split_first() {
        md5.update(first.as_bytes());

        for part in rest {
            md5.update(b":");
            md5.update(part.as_bytes());
        }
    }

    hex::encode(md5.finalize())
}

/// The `opaque` value for a realm: `MD5(realm)`.
///
/// Deterministic, so every challenge for one realm carries the same opaque.
pub fn opaque_for_realm(realm: &str) -> String {
    md5_hex(&[realm])
}

/// Computes the response digest the client must have produced for
/// `credential` to be valid.
///
/// ```text
/// A1       = MD5(username:realm:password)
/// A2       = MD5(method:uri)
/// response = MD5(A1:nonce:nc:cnonce:qop:A2)
/// ```
///
/// `method` is the method of the current inbound request, not whatever the
/// client computed against. `uri` comes from the credential, unvalidated.
pub fn compute_response(credential: &DigestCredential, password: &str, realm: &str, method: &str) -> String {
    let a1 = md5_hex(&[&credential.username, realm, password]);
    let a2 = md5_hex(&[method, &credential.uri]);

    md5_hex(&[
        &a1,
        &credential.nonce,
        &credential.nc,
        &credential.cnonce,
        &credential.qop,
        &a2,
    ])
}

/// Returns true iff the client-supplied response matches the computed one.
///
/// Exact string comparison on the hex digests, matching the reference
/// behavior. Any mismatch, including case, fails closed.
pub fn validate(credential: &DigestCredential, password: &str, realm: &str, method: &str) -> bool {
    compute_response(credential, password, realm, method) == credential.response
}
