//! The digest authentication gate and its builder.

use std::collections::HashMap;

use hyper::Method;
use tracing::{debug, warn};

use crate::auth::DigestChallenge;
use crate::digest;
use crate::error::{AuthError, Result};
use crate::parser;

/// A source of plaintext passwords for known usernames.
///
/// The gate never owns credential provisioning; the caller supplies an
/// implementation (a plain `HashMap<String, String>` works) when building
/// the gate.
pub trait CredentialStore: Send + Sync + 'static {
    /// Returns the password for `username`, or `None` if the user is
    /// unknown.
    fn password(&self, username: &str) -> Option<&str>;
}

impl CredentialStore for HashMap<String, String> {
    fn password(&self, username: &str) -> Option<&str> {
        self.get(username).map(String::as_str)
    }
}

/// Server-side HTTP Digest Authentication gate.
///
/// One gate guards one protection domain (realm). Each request is
/// authenticated independently: no session, no token, no state carried
/// between requests. Nonces are generated per challenge and never tracked
/// afterwards, so replay of a captured response is not detected.
///
/// # Examples
///
/// ```
/// # use pkauth::DigestGate;
/// let gate = DigestGate::builder()
///     .with_realm("Restricted Area")
///     .add_user("alice", "secret123")
///     .build();
///
/// assert_eq!(gate.realm(), "Restricted Area");
/// ```
pub struct DigestGate {
    realm: String,
    allowed_methods: Vec<Method>,
    store: Box<dyn CredentialStore>,
}

impl DigestGate {
    /// Creates a new [`DigestGateBuilder`].
    pub fn builder() -> DigestGateBuilder {
        DigestGateBuilder::new()
    }

    /// The realm this gate protects.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// The methods advertised in `Access-Control-Allow-Methods`.
    pub fn allowed_methods(&self) -> &[Method] {
        &self.allowed_methods
    }

    /// Issues a fresh challenge for this gate's realm.
    pub fn challenge(&self) -> DigestChallenge {
        DigestChallenge::new(&self.realm)
    }

    /// Authenticates one request.
    ///
    /// `authorization` is the raw `Authorization` header value, if any, and
    /// `method` is the method of the current inbound request. On success the
    /// authenticated username is returned and the caller continues request
    /// processing; every error maps to a `401` with a fixed body (see
    /// [`AuthError`]).
    ///
    /// The flow fails closed, in order:
    ///
    /// 1. no digest authorization value → [`AuthError::MissingCredentials`],
    /// 2. required fields missing → [`AuthError::MalformedHeader`],
    /// 3. username not in the store → [`AuthError::UnknownUser`],
    /// 4. response digest mismatch → [`AuthError::InvalidResponse`].
    pub fn authorize(&self, authorization: Option<&str>, method: &Method) -> Result<String> {
        let raw = authorization
            .and_then(digest_value)
            .ok_or(AuthError::MissingCredentials)?;

        let credential = match parser::parse_digest_header(raw) {
            Ok(credential) => credential,
            Err(err) => {
                debug!("digest header rejected: {err}");
                return Err(err);
            }
        };

        let Some(password) = self.store.password(&credential.username) else {
            debug!(username = %credential.username, "unknown user");
            return Err(AuthError::UnknownUser);
        };

        if !digest::validate(&credential, password, &self.realm, method.as_str()) {
            warn!(username = %credential.username, "digest response mismatch");
            return Err(AuthError::InvalidResponse);
        }

        Ok(credential.username)
    }
}

/// Extracts the digest parameter list from an `Authorization` header value.
///
/// Accepts the full header form (`Digest username=...`, scheme matched
/// case-insensitively) and the bare parameter list (`username=...`), the
/// shape a front server hands over after stripping the scheme. Any other
/// scheme yields `None` — for this gate a `Basic` header is the same as no
/// header at all.
fn digest_value(header: &str) -> Option<&str> {
    let header = header.trim();

    if let Some(rest) = strip_scheme(header) {
        let rest = rest.trim_start();
        return if rest.is_empty() { None } else { Some(rest) };
    }

    // A bare parameter list has `=` inside its first token; a foreign
    // scheme name does not.
    let first_token = header.split_whitespace().next()?;
    if first_token.contains('=') { Some(header) } else { None }
}

fn strip_scheme(header: &str) -> Option<&str> {
    let scheme = header.get(..6)?;
    if !scheme.eq_ignore_ascii_case("Digest") {
        return None;
    }

    let rest = &header[6..];
    // require a separator so e.g. `DigestX` is not treated as the scheme
    rest.starts_with([' ', '\t']).then_some(rest)
}

/// Builder for a [`DigestGate`].
///
/// # Examples
///
/// ```
/// # use pkauth::DigestGate;
/// # use hyper::Method;
/// let gate = DigestGate::builder()
///     .with_realm("Restricted Area")
///     .with_allowed_methods([Method::GET, Method::POST])
///     .add_user("alice", "secret123")
///     .build();
/// ```
pub struct DigestGateBuilder {
    realm: String,
    allowed_methods: Vec<Method>,
    users: HashMap<String, String>,
    store: Option<Box<dyn CredentialStore>>,
}

impl DigestGateBuilder {
    /// Creates a builder with the default realm (`Restricted Area`) and
    /// method list (`GET, POST, PUT, DELETE`).
    pub fn new() -> Self {
        DigestGateBuilder {
            realm: String::from("Restricted Area"),
            allowed_methods: vec![Method::GET, Method::POST, Method::PUT, Method::DELETE],
            users: HashMap::new(),
            store: None,
        }
    }

    /// Sets the realm.
    pub fn with_realm<T: AsRef<str>>(mut self, realm: T) -> Self {
        self.realm = realm.as_ref().to_string();

        self
    }

    /// Replaces the advertised method list.
    pub fn with_allowed_methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        self.allowed_methods = methods.into_iter().collect();

        self
    }

    /// Adds a username/password pair to the built-in credential map.
    ///
    /// Ignored if [`DigestGateBuilder::with_credentials`] installs a custom
    /// store.
    pub fn add_user<T: AsRef<str>>(mut self, username: T, password: T) -> Self {
        self.users
            .insert(username.as_ref().to_string(), password.as_ref().to_string());

        self
    }

    /// Installs a caller-supplied credential store, replacing the built-in
    /// map.
    pub fn with_credentials(mut self, store: impl CredentialStore) -> Self {
        self.store = Some(Box::new(store));

        self
    }

    /// Builds the gate.
    pub fn build(self) -> DigestGate {
        let store = self.store.unwrap_or_else(|| Box::new(self.users));

        DigestGate {
            realm: self.realm,
            allowed_methods: self.allowed_methods,
            store,
        }
    }
}

impl Default for DigestGateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> DigestGate {
        DigestGate::builder()
            .with_realm("Restricted Area")
            .add_user("alice", "secret123")
            .build()
    }

    // alice:Restricted Area:secret123, GET /api/resource, nonce n1,
    // nc 00000001, cnonce c1
    const GOOD: &str = "Digest username=\"alice\", realm=\"Restricted Area\", nonce=\"n1\", \
                        uri=\"/api/resource\", qop=auth, nc=00000001, cnonce=\"c1\", \
                        response=\"91e791069365be92f0913cd63ae453e0\"";

    #[test_log::test]
    fn test_authorize_success_returns_username() {
        assert_eq!(gate().authorize(Some(GOOD), &Method::GET).unwrap(), "alice");
    }

    #[test]
    fn test_authorize_without_header() {
        assert_matches!(
            gate().authorize(None, &Method::GET),
            Err(AuthError::MissingCredentials)
        );
    }

    #[test]
    fn test_authorize_with_foreign_scheme() {
        assert_matches!(
            gate().authorize(Some("Basic dXNlcjpwYXNz"), &Method::GET),
            Err(AuthError::MissingCredentials)
        );
    }

    #[test]
    fn test_authorize_with_missing_field() {
        let src = GOOD.replace("cnonce=\"c1\", ", "");

        assert_matches!(
            gate().authorize(Some(&src), &Method::GET),
            Err(AuthError::MalformedHeader)
        );
    }

    #[test]
    fn test_authorize_with_unknown_user() {
        let src = GOOD.replace("alice", "mallory");

        assert_matches!(
            gate().authorize(Some(&src), &Method::GET),
            Err(AuthError::UnknownUser)
        );
    }

    #[test_log::test]
    fn test_authorize_with_wrong_server_password() {
        let gate = DigestGate::builder()
            .with_realm("Restricted Area")
            .add_user("alice", "wrongpass")
            .build();

        assert_matches!(
            gate.authorize(Some(GOOD), &Method::GET),
            Err(AuthError::InvalidResponse)
        );
    }

    #[test]
    fn test_authorize_binds_to_inbound_method() {
        // same header, different inbound method: A2 no longer matches
        assert_matches!(
            gate().authorize(Some(GOOD), &Method::POST),
            Err(AuthError::InvalidResponse)
        );
    }

    #[test]
    fn test_authorize_accepts_bare_parameter_list() {
        let bare = GOOD.trim_start_matches("Digest ");

        assert_eq!(gate().authorize(Some(bare), &Method::GET).unwrap(), "alice");
    }

    #[test]
    fn test_custom_credential_store() {
        struct SingleUser;

        impl CredentialStore for SingleUser {
            fn password(&self, username: &str) -> Option<&str> {
                (username == "alice").then_some("secret123")
            }
        }

        let gate = DigestGate::builder()
            .with_realm("Restricted Area")
            .with_credentials(SingleUser)
            .build();

        assert_eq!(gate.authorize(Some(GOOD), &Method::GET).unwrap(), "alice");
    }
}
