//! Built-in middleware.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: structured tracing, metrics, request-id
//! injection, authentication-header inspection. A middleware receives the
//! request, its matched parameters, the current data snapshot, and a
//! [`Next`] continuation; it may answer directly, short-circuiting
//! everything matched after it, or drive `next` exactly once and decorate
//! the response on the way out.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::chain::Next;
use crate::data::Data;
use crate::error::Error;
use crate::params::Params;
use crate::request::Request;
use crate::response::Response;

/// Per-request tracing: method, path, status, latency.
///
/// Register on a wildcard so every route is covered:
///
/// ```rust,no_run
/// use trellis::{Router, middleware};
///
/// let app = Router::new()
///     .middleware_all("*", middleware::trace);
/// ```
pub async fn trace(
    request: Arc<Request>,
    _params: Params,
    _data: Data,
    next: Next,
) -> Result<Response, Error> {
    let start = Instant::now();
    let response = next.run().await?;

    info!(
        method = %request.method(),
        path = request.path(),
        status = response.status_code().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "request"
    );

    Ok(response)
}
