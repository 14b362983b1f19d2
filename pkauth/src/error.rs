use hyper::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

/// Reasons a request fails digest authentication.
///
/// Every variant is terminal for the current request: the HTTP layer writes
/// the `401` response described by [`AuthError::status`] and
/// [`AuthError::body`] and stops processing. There is no retry and no
/// partial success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No digest authorization value was present on the request.
    #[error("no digest authorization value present")]
    MissingCredentials,

    /// The digest authorization value was present but one of the required
    /// fields could not be extracted from it.
    #[error("digest authorization header is malformed")]
    MalformedHeader,

    /// The username from the digest response is not in the credential store.
    #[error("username not found in credential store")]
    UnknownUser,

    /// The client-supplied response digest does not match the one computed
    /// from the stored password.
    #[error("digest response mismatch")]
    InvalidResponse,
}

impl AuthError {
    /// The HTTP status for this failure. Always `401 Unauthorized`.
    pub fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    /// The fixed plain-text response body for this failure.
    ///
    /// These literals are part of the wire contract. `MalformedHeader` and
    /// `UnknownUser` share one body on purpose so the response does not leak
    /// whether a username exists.
    pub fn body(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "Failed authentication.",
            AuthError::MalformedHeader | AuthError::UnknownUser => "Wrong Credentials!",
            AuthError::InvalidResponse => "Wrong Credentials!!",
        }
    }
}
