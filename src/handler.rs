//! Callback traits and type erasure.
//!
//! # How callbacks are stored
//!
//! The router holds callbacks of *different* concrete types in a single
//! table per method. Rust collections can only hold one concrete type, so we
//! use trait objects to hide the concrete callback type behind a common
//! interface and store everything uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn show(req, params, data) -> Result<Response, Error>  ← user writes this
//!        ↓ router.get("/posts/:id", show)
//! show.into_boxed_handler()                  ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(show))                  ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req, params, data)            ← one vtable dispatch per request
//! ```
//!
//! Handlers take (request, params, data) and produce the response that ends
//! the chain. Middleware take the same three plus a [`Next`] continuation
//! and either answer directly or drive `next` once and decorate the result.
//! Which kind a callback is gets stated at registration and stored as the
//! [`Entry`] tag; it is never inferred from the callback's shape.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::chain::Next;
use crate::data::Data;
use crate::error::Error;
use crate::params::Params;
use crate::request::Request;
use crate::response::Response;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future resolving to the chain outcome.
///
/// `Pin<Box<…>>` because the runtime polls the future in place; `Send +
/// 'static` so tokio may move it across threads.
pub(crate) type BoxFuture =
    Pin<Box<dyn Future<Output = Result<Response, Error>> + Send + 'static>>;

/// Internal dispatch interface for terminal handlers.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, request: Arc<Request>, params: Params, data: Data) -> BoxFuture;
}

/// Internal dispatch interface for middleware.
#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, request: Arc<Request>, params: Params, data: Data, next: Next) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// A heap-allocated, type-erased middleware shared across concurrent requests.
#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

/// A registered callback with its kind stated explicitly.
///
/// The tag is fixed by which registration method the caller used, so the
/// dispatcher never has to guess what a callback is.
#[derive(Clone)]
pub(crate) enum Entry {
    Middleware(BoxedMiddleware),
    Handler(BoxedHandler),
}

// ── Public callback traits ────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(req: Arc<Request>, params: Params, data: Data) -> Result<Response, Error>
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it, which
/// keeps the API surface stable across versions.
pub trait Handler: private::SealedHandler + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// Implemented for every valid middleware.
///
/// Automatically satisfied for any `async fn` with the signature:
///
/// ```text
/// async fn name(req: Arc<Request>, params: Params, data: Data, next: Next) -> Result<Response, Error>
/// ```
///
/// The continuation argument is what makes a middleware a middleware: it may
/// resolve without driving `next` (a short-circuit; nothing matched after it
/// runs), or drive `next` exactly once and return the downstream response,
/// transformed or not. Sealed like [`Handler`].
pub trait Middleware: private::SealedMiddleware + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

/// The sealing module. Because these traits are private, external crates
/// cannot name them and therefore cannot implement the callback traits on
/// their own types.
mod private {
    pub trait SealedHandler {}
    pub trait SealedMiddleware {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut> private::SealedHandler for F
where
    F: Fn(Arc<Request>, Params, Data) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Arc<Request>, Params, Data) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

impl<F, Fut> private::SealedMiddleware for F
where
    F: Fn(Arc<Request>, Params, Data, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
}

impl<F, Fut> Middleware for F
where
    F: Fn(Arc<Request>, Params, Data, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

/// Newtype holding a concrete handler `F`, bridging the typed world to the
/// trait-object world.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Arc<Request>, Params, Data) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn call(&self, request: Arc<Request>, params: Params, data: Data) -> BoxFuture {
        Box::pin((self.0)(request, params, data))
    }
}

/// Newtype holding a concrete middleware `F`.
struct FnMiddleware<F>(F);

impl<F, Fut> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Arc<Request>, Params, Data, Next) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn call(&self, request: Arc<Request>, params: Params, data: Data, next: Next) -> BoxFuture {
        Box::pin((self.0)(request, params, data, next))
    }
}
