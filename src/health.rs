//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Register them like any other handler:
//!
//! ```rust,no_run
//! use trellis::{Router, health};
//!
//! let app = Router::new()
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness);
//! ```
//!
//! Replace `readiness` with your own handler to gate on dependency
//! availability (database connections, downstream services, and so on).

use std::sync::Arc;

use crate::data::Data;
use crate::error::Error;
use crate::params::Params;
use crate::request::Request;
use crate::response::Response;

/// Kubernetes liveness probe handler.
///
/// Always returns `200 OK` with body `"ok"`. If the process can respond to
/// HTTP at all, it is alive; this handler intentionally has no dependencies.
pub async fn liveness(
    _request: Arc<Request>,
    _params: Params,
    _data: Data,
) -> Result<Response, Error> {
    Ok(Response::text("ok"))
}

/// Kubernetes readiness probe handler (default implementation).
///
/// Returns `200 OK` with body `"ready"`. Replace with your own handler if
/// your application needs a warm-up period or must verify dependency health
/// before accepting traffic.
pub async fn readiness(
    _request: Arc<Request>,
    _params: Params,
    _data: Data,
) -> Result<Response, Error> {
    Ok(Response::text("ready"))
}
