//! Response header emission for gated requests.

use bytes::Bytes;
use http_body_util::Full;
use hyper::http;
use hyper::{Response, header};
use itertools::Itertools;

use crate::error::AuthError;
use crate::gate::DigestGate;

/// Response body type used by the gate.
pub type Body = Full<Bytes>;

impl DigestGate {
    /// A response builder carrying the headers every gated response gets,
    /// whatever the authentication outcome:
    ///
    /// - the `Access-Control-Allow-*` quartet,
    /// - `X-Frame-Options: DENY`,
    /// - `X-Powered-By: <realm, uppercased>`.
    ///
    /// Success responses should be built from this too, so the header set
    /// does not depend on whether authentication passed.
    pub fn response_builder(&self) -> http::response::Builder {
        Response::builder()
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(header::ACCESS_CONTROL_ALLOW_METHODS, self.methods_header())
            .header(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                "Content-Type, Access-Control-Allow-Headers, Authorization, X-Requested-With",
            )
            .header(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true")
            .header(header::X_FRAME_OPTIONS, "DENY")
            .header("X-Powered-By", self.realm().to_uppercase())
    }

    /// Builds the `401` response for a failed authentication.
    ///
    /// The body is the fixed literal for `err` (see [`AuthError::body`]).
    /// When credentials were missing entirely the response also carries a
    /// `WWW-Authenticate` header with a fresh [`challenge`] so a compliant
    /// client can retry.
    ///
    /// [`challenge`]: DigestGate::challenge
    pub fn unauthorized_response(&self, err: &AuthError) -> http::Result<Response<Body>> {
        let mut builder = self.response_builder().status(err.status());

        if matches!(err, AuthError::MissingCredentials) {
            builder = builder.header(header::WWW_AUTHENTICATE, self.challenge().to_string());
        }

        builder.body(Full::new(Bytes::from_static(err.body().as_bytes())))
    }

    /// The `Access-Control-Allow-Methods` value: allowed methods, uppercase,
    /// comma-joined.
    fn methods_header(&self) -> String {
        self.allowed_methods()
            .iter()
            .map(|method| method.as_str())
            .join(", ")
            .to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::{Method, StatusCode};

    fn gate() -> DigestGate {
        DigestGate::builder()
            .with_realm("Restricted Area")
            .add_user("alice", "secret123")
            .build()
    }

    #[test]
    fn test_common_headers_on_every_response() {
        let response = gate().response_builder().body(()).unwrap();
        let headers = response.headers();

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, PUT, DELETE");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Access-Control-Allow-Headers, Authorization, X-Requested-With"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers["X-Powered-By"], "RESTRICTED AREA");
    }

    #[test]
    fn test_frame_options_emitted_once() {
        let response = gate().response_builder().body(()).unwrap();

        assert_eq!(response.headers().get_all(header::X_FRAME_OPTIONS).iter().count(), 1);
    }

    #[test]
    fn test_methods_header_respects_configuration() {
        let gate = DigestGate::builder()
            .with_allowed_methods([Method::GET, Method::OPTIONS])
            .build();
        let response = gate.response_builder().body(()).unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, OPTIONS"
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_response_challenges() {
        let response = gate()
            .unauthorized_response(&AuthError::MissingCredentials)
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let www = response.headers()[header::WWW_AUTHENTICATE].to_str().unwrap().to_string();
        assert!(www.starts_with("Digest realm=\"Restricted Area\", qop=\"auth\", nonce=\""));
        assert!(www.ends_with("opaque=\"de7d27e200c0609db205b9a5900564b9\""));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Failed authentication.");
    }

    #[tokio::test]
    async fn test_rejection_responses_carry_fixed_bodies() {
        for (err, expected) in [
            (AuthError::MalformedHeader, "Wrong Credentials!"),
            (AuthError::UnknownUser, "Wrong Credentials!"),
            (AuthError::InvalidResponse, "Wrong Credentials!!"),
        ] {
            let response = gate().unauthorized_response(&err).unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));

            let body = response.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(&body[..], expected.as_bytes());
        }
    }
}
