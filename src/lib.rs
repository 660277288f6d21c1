//! # trellis
//!
//! A minimal HTTP request router: a hand-built path trie per method, an
//! ordered match enumerator, and a continuation-passing middleware chain.
//! The serving layer around it is the thinnest one that can carry it.
//!
//! ## The contract
//!
//! A request runs the chain of *everything* its path matches, in one fixed
//! order: literal segments beat named parameters, named parameters beat
//! wildcards, at every depth. Middleware matched anywhere along the way
//! wrap the innermost handler; the first handler matched is the one that
//! answers. A middleware may short-circuit (resolve without driving its
//! continuation) and nothing deeper runs; driving the continuation twice is
//! a defect and fails loudly instead of running the chain again.
//!
//! Registration happens before serving. The route table is not built for
//! concurrent mutation while requests are in flight, and does not pretend
//! to be.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trellis::{Data, Error, Params, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .get("/", home)
//!         .get("/posts/:id", show_post)
//!         .all("*", missing);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn home(_req: Arc<Request>, _params: Params, _data: Data) -> Result<Response, Error> {
//!     Ok(Response::text("Home"))
//! }
//!
//! async fn show_post(_req: Arc<Request>, params: Params, _data: Data) -> Result<Response, Error> {
//!     let id = params.get("id").unwrap_or("unknown");
//!     Ok(Response::text(format!("Post: {id}")))
//! }
//!
//! async fn missing(_req: Arc<Request>, _params: Params, _data: Data) -> Result<Response, Error> {
//!     Ok(Response::builder()
//!         .status(trellis::StatusCode::NOT_FOUND)
//!         .html("<h1>Page not found</h1>"))
//! }
//! ```
//!
//! ## Template syntax
//!
//! - `/posts/recent` — literal segments, matched verbatim
//! - `/posts/:id` — named parameter, one segment, bound into [`Params`]
//! - `/files/*` — trailing wildcard, matches the remainder of the path
//!
//! Middleware register through [`Router::middleware`] and
//! [`Router::middleware_all`]; a wildcard template turns one into an
//! application-wide layer. See [`middleware::trace`] for a ready-made one.

mod chain;
mod data;
mod error;
mod handler;
mod method;
mod params;
mod pattern;
mod request;
mod response;
mod router;
mod server;
mod trie;

pub mod health;
pub mod middleware;

pub use chain::Next;
pub use data::Data;
pub use error::{BoxError, Error};
pub use handler::{Handler, Middleware};
pub use method::Method;
pub use params::Params;
pub use request::Request;
pub use response::{Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;

/// Re-exported from the `http` crate; statuses are not worth wrapping.
pub use http::StatusCode;
