//! Digest auth wire types.
//!
use std::fmt;

use uuid::Uuid;

use crate::digest;

/// A server-issued authentication challenge.
///
/// Created per unauthenticated request and not persisted: validation later
/// recomputes everything from the values the client echoes back, so the
/// server keeps no record of which nonces it handed out. The `qop` is fixed
/// to `"auth"`.
///
/// # Examples
///
/// ```
/// # use pkauth::DigestChallenge;
/// let challenge = DigestChallenge::new("atlanta.com");
///
/// let value = challenge.to_string();
/// assert!(value.starts_with("Digest realm=\"atlanta.com\", qop=\"auth\", nonce=\""));
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DigestChallenge {
    /// The protection domain this challenge covers.
    pub realm: String,

    /// Server-generated token, distinct per challenge.
    pub nonce: String,

    /// Stable value derived from the realm, echoed back by the client.
    pub opaque: String,
}

impl DigestChallenge {
    /// Creates a challenge for `realm` with a fresh nonce.
    ///
    /// The nonce is a v4 UUID; two challenges for the same realm share
    /// their `opaque` but never their `nonce`.
    pub fn new<T: AsRef<str>>(realm: T) -> Self {
        let realm = realm.as_ref();

        DigestChallenge {
            realm: realm.to_string(),
            nonce: Uuid::new_v4().to_string(),
            opaque: digest::opaque_for_realm(realm),
        }
    }
}

impl fmt::Display for DigestChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Digest realm=\"{}\", qop=\"auth\", nonce=\"{}\", opaque=\"{}\"",
            self.realm, self.nonce, self.opaque
        )
    }
}

/// The parsed fields of a client's `Authorization: Digest` value.
///
/// All seven fields are required; [`crate::parser::parse_digest_header`]
/// refuses to produce a partial credential. A `realm` supplied in the header
/// is ignored — validation always uses the realm the gate was configured
/// with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DigestCredential {
    /// The username the client authenticates as.
    pub username: String,

    /// The server nonce echoed back by the client.
    pub nonce: String,

    /// The nonce count.
    pub nc: String,

    /// The client nonce.
    pub cnonce: String,

    /// The quality of protection the client applied.
    pub qop: String,

    /// The URI the digest was computed for. Not checked against the actual
    /// request target; it feeds A2 exactly as the client sent it.
    pub uri: String,

    /// The client-computed response digest, lowercase hex.
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_format() {
        let challenge = DigestChallenge {
            realm: "Restricted Area".to_string(),
            nonce: "n1".to_string(),
            opaque: "de7d27e200c0609db205b9a5900564b9".to_string(),
        };

        assert_eq!(
            challenge.to_string(),
            "Digest realm=\"Restricted Area\", qop=\"auth\", nonce=\"n1\", \
             opaque=\"de7d27e200c0609db205b9a5900564b9\""
        );
    }

    #[test]
    fn test_same_realm_same_opaque_fresh_nonce() {
        let a = DigestChallenge::new("Restricted Area");
        let b = DigestChallenge::new("Restricted Area");

        assert_eq!(a.opaque, b.opaque);
        assert_ne!(a.nonce, b.nonce);
    }
}
