//! Minimal trellis example — a blog-shaped routing table with a wildcard
//! fallback and per-request tracing.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl http://localhost:3000/about
//!   curl http://localhost:3000/posts/1
//!   curl http://localhost:3000/nope
//!   curl http://localhost:3000/healthz

use std::sync::Arc;

use trellis::{
    Data, Error, Params, Request, Response, Router, Server, StatusCode, health, middleware,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::with_data(Data::new().with("site", "trellis demo"))
        .middleware_all("*", middleware::trace)
        .get("/", home)
        .get("/about", about)
        .get("/posts/:id", show_post)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
        .all("*", missing);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /
async fn home(_req: Arc<Request>, _params: Params, data: Data) -> Result<Response, Error> {
    let site = data.get("site").and_then(|v| v.as_str()).unwrap_or("?");
    Ok(Response::text(format!("Home of {site}")))
}

// GET /about
async fn about(_req: Arc<Request>, _params: Params, _data: Data) -> Result<Response, Error> {
    Ok(Response::text("About"))
}

// GET /posts/:id
async fn show_post(_req: Arc<Request>, params: Params, _data: Data) -> Result<Response, Error> {
    let id = params.get("id").unwrap_or("unknown");
    Ok(Response::text(format!("Post: {id}")))
}

// Any method, any unmatched path. Beats the router's built-in empty 404.
async fn missing(_req: Arc<Request>, _params: Params, _data: Data) -> Result<Response, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .html("<h1>Page not found</h1>"))
}
