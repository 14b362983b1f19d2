use std::error::Error;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode, header};
use hyper_util::rt::TokioIo;
use pkauth::{Body, DigestGate};
use tokio::net::TcpListener;
use tracing::{Level, info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

/// Every request goes through the gate; a valid digest response gets a
/// greeting, everything else gets the gate's 401.
async fn handle(gate: Arc<DigestGate>, request: Request<Incoming>) -> hyper::http::Result<Response<Body>> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match gate.authorize(authorization, request.method()) {
        Ok(username) => gate
            .response_builder()
            .status(StatusCode::OK)
            .body(Full::new(Bytes::from(format!("Hello, {username}!\n")))),
        Err(err) => gate.unauthorized_response(&err),
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_env_filter("pkauth=trace")
        .with_timer(ChronoLocal::new(String::from("%H:%M:%S%.3f")))
        .init();

    let gate = Arc::new(
        DigestGate::builder()
            .with_realm("Restricted Area")
            .add_user("alice", "secret123")
            .build(),
    );

    let listener = TcpListener::bind("127.0.0.1:8080").await?;
    info!("listening on {}", listener.local_addr()?);
    info!("try: curl -v --digest -u alice:secret123 http://127.0.0.1:8080/api/resource");

    loop {
        let (stream, addr) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let gate = gate.clone();

        tokio::spawn(async move {
            let service = service_fn(move |request| {
                let gate = gate.clone();
                async move { handle(gate, request).await }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!("connection from {addr} failed: {err}");
            }
        });
    }
}
