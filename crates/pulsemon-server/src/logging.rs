use axum::{
    extract::{ConnectInfo, Request},
    http::header,
    middleware::Next,
    response::Response,
};
use rand::Rng;
use std::fmt::Write;
use std::net::SocketAddr;
use std::time::Instant;

/// Newtype wrapper for trace IDs stored in request extensions.
///
/// A dedicated type instead of a bare `String` avoids collisions with other
/// extensions and silent 500s when the extension is missing.
#[derive(Clone)]
pub struct TraceId(pub String);

impl std::ops::Deref for TraceId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

/// Remote address of the client, when the listener captured one.
///
/// Inserted by the logging middleware for every request so handlers can use
/// a plain `Extension` extractor; `None` under test harnesses that bypass
/// the TCP listener.
#[derive(Clone)]
pub struct ClientAddr(pub Option<String>);

/// Generate a 16-character hex trace ID (8 random bytes).
fn generate_trace_id() -> String {
    let bytes: [u8; 8] = rand::thread_rng().gen();
    let mut s = String::with_capacity(16);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Format elapsed time as a human-readable string.
fn format_elapsed(elapsed_us: u128) -> String {
    if elapsed_us < 1000 {
        format!("{elapsed_us}µs")
    } else if elapsed_us < 1_000_000 {
        format!("{}ms", elapsed_us / 1000)
    } else {
        format!("{:.1}s", elapsed_us as f64 / 1_000_000.0)
    }
}

/// Request/response logging middleware.
///
/// Mints a trace ID, stashes it (plus the peer address) in request
/// extensions, and echoes it back in an `x-trace-id` response header.
pub async fn request_logging(mut req: Request, next: Next) -> Response {
    let trace_id = generate_trace_id();
    req.extensions_mut().insert(TraceId(trace_id.clone()));

    let client_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());
    req.extensions_mut().insert(ClientAddr(client_addr));

    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = uri.path().to_string();

    // Swagger UI static assets are noise
    if path.starts_with("/docs") {
        return next.run(req).await;
    }

    let url = match uri.query() {
        Some(q) => format!("{path}?{q}"),
        None => path,
    };
    tracing::info!(trace_id = %trace_id, method = %method, path = %url, "--> request");

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = format_elapsed(start.elapsed().as_micros());

    let status = response.status();
    if status.is_server_error() {
        tracing::error!(trace_id = %trace_id, status = status.as_u16(), elapsed = %elapsed, "<-- response");
    } else if status.is_client_error() {
        tracing::warn!(trace_id = %trace_id, status = status.as_u16(), elapsed = %elapsed, "<-- response");
    } else {
        tracing::info!(trace_id = %trace_id, status = status.as_u16(), elapsed = %elapsed, "<-- response");
    }

    if let Ok(value) = header::HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert("x-trace-id", value);
    }
    response
}
