use std::{fmt, net::SocketAddr, time::Instant};

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

/// Identifier attached to every inbound request for log correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Tags the request with a [`RequestId`], logs where it came from and how long
/// it took
///
/// The remote address comes from the connection when available, falling back
/// to proxy headers.
pub async fn request_monitor(mut request: Request, next: Next) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|connect_info| connect_info.0.ip().to_string())
        .or_else(|| {
            request
                .headers()
                .get("x-forwarded-for")
                .or_else(|| request.headers().get("x-real-ip"))
                .and_then(|h| h.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(|v| v.trim().to_string())
        });

    let id = RequestId::new();
    request.extensions_mut().insert(id);
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let span = info_span!("request", %id);

    async move {
        info!(
            %method,
            %path,
            remote = remote_addr.as_deref().unwrap_or("-"),
            "[REQ]"
        );
        let stopwatch = Instant::now();
        let response = next.run(request).await;
        info!(
            status = response.status().as_u16(),
            elapsed_secs = %stopwatch.elapsed().as_secs_f32(),
            "[FIN]"
        );
        response
    }
    .instrument(span)
    .await
}
