//! The request router.
//!
//! One path trie per HTTP method. Registration appends to a per-method log
//! and marks that method's compiled matcher stale; the matcher is rebuilt
//! from the log, lazily, on the next request that needs it. Each
//! registration call returns `self`, so a routing table reads as one chained
//! expression.
//!
//! Registration is a startup-phase affair: `handle` works through `&self`
//! and swaps the compiled matcher atomically, but nothing synchronizes
//! registration against in-flight requests. Register first, serve second.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::debug;

use crate::chain::Chain;
use crate::data::Data;
use crate::error::Error;
use crate::handler::{Entry, Handler, Middleware};
use crate::method::Method;
use crate::pattern;
use crate::request::Request;
use crate::response::Response;
use crate::trie::{Registration, Trie};

/// Per-method state: the registration log and the compiled matcher derived
/// from it. An empty `compiled` slot means stale — something was registered
/// since the last build.
#[derive(Default)]
struct MethodTable {
    registrations: Vec<Registration>,
    compiled: ArcSwapOption<Trie>,
}

impl MethodTable {
    fn attach(&mut self, segments: Vec<pattern::Segment>, entry: Entry) {
        self.registrations.push(Registration { segments, entry });
        self.compiled.store(None);
    }

    fn matcher(&self) -> Arc<Trie> {
        if let Some(compiled) = self.compiled.load_full() {
            return compiled;
        }

        debug!(registrations = self.registrations.len(), "rebuilding matcher");
        let built = Arc::new(Trie::build(&self.registrations));
        self.compiled.store(Some(Arc::clone(&built)));
        built
    }
}

/// The application router.
///
/// Handlers answer requests; middleware wrap everything matched after them.
/// Which kind a callback is gets stated by the registration method used —
/// [`on`](Router::on)/[`get`](Router::get)/… take handlers,
/// [`middleware`](Router::middleware) takes middleware. A request runs the
/// chain of *everything* its path matches, most specific first: literal
/// segments beat named parameters, named parameters beat wildcards, at every
/// depth.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use trellis::{Data, Error, Params, Request, Response, Router};
///
/// async fn show_post(_req: Arc<Request>, params: Params, _data: Data) -> Result<Response, Error> {
///     let id = params.get("id").unwrap_or("unknown");
///     Ok(Response::text(format!("Post: {id}")))
/// }
///
/// async fn missing(_req: Arc<Request>, _params: Params, _data: Data) -> Result<Response, Error> {
///     Ok(Response::builder()
///         .status(trellis::StatusCode::NOT_FOUND)
///         .html("<h1>Page not found</h1>"))
/// }
///
/// let app = Router::new()
///     .get("/posts/:id", show_post)
///     .all("*", missing);
/// ```
pub struct Router {
    tables: HashMap<Method, MethodTable>,
    default_data: Data,
}

impl Router {
    pub fn new() -> Self {
        Self::with_data(Data::new())
    }

    /// A router whose requests each start from a fresh copy of `data`.
    pub fn with_data(data: Data) -> Self {
        let tables = Method::ALL
            .iter()
            .map(|method| (*method, MethodTable::default()))
            .collect();
        Self {
            tables,
            default_data: data,
        }
    }

    /// Registers a handler for a method + template pair.
    ///
    /// Template syntax: `/literal`, `/:name` (named parameter), `/*`
    /// (trailing wildcard). Registering a second handler on the same method
    /// and template replaces the first.
    pub fn on(mut self, method: Method, template: &str, handler: impl Handler) -> Self {
        self.attach(method, template, Entry::Handler(handler.into_boxed_handler()));
        self
    }

    /// Registers a middleware for a method + template pair. Middleware
    /// accumulate: every registration on the same template runs, in
    /// registration order.
    pub fn middleware(mut self, method: Method, template: &str, middleware: impl Middleware) -> Self {
        self.attach(
            method,
            template,
            Entry::Middleware(middleware.into_boxed_middleware()),
        );
        self
    }

    /// Registers a handler on every method.
    pub fn all(mut self, template: &str, handler: impl Handler) -> Self {
        let handler = handler.into_boxed_handler();
        for method in Method::ALL {
            self.attach(method, template, Entry::Handler(Arc::clone(&handler)));
        }
        self
    }

    /// Registers a middleware on every method.
    pub fn middleware_all(mut self, template: &str, middleware: impl Middleware) -> Self {
        let middleware = middleware.into_boxed_middleware();
        for method in Method::ALL {
            self.attach(method, template, Entry::Middleware(Arc::clone(&middleware)));
        }
        self
    }

    pub fn connect(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Connect, template, handler)
    }

    pub fn delete(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, template, handler)
    }

    pub fn get(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, template, handler)
    }

    pub fn head(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Head, template, handler)
    }

    pub fn options(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Options, template, handler)
    }

    pub fn patch(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Patch, template, handler)
    }

    pub fn post(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, template, handler)
    }

    pub fn put(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, template, handler)
    }

    pub fn trace(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Trace, template, handler)
    }

    fn attach(&mut self, method: Method, template: &str, entry: Entry) {
        let segments = pattern::compile(template);
        if let Some(table) = self.tables.get_mut(&method) {
            table.attach(segments, entry);
        }
    }

    /// Dispatches one request through the chain of everything its path
    /// matches and resolves to a single response.
    ///
    /// Matching nothing is not an error: the default not-found response
    /// (404, empty body) comes back without any user code running. An `Err`
    /// is either a failing user callback, passed through unmodified, or a
    /// middleware that drove its continuation twice.
    pub async fn handle(&self, request: Request) -> Result<Response, Error> {
        let Some(table) = self.tables.get(&request.method()) else {
            return Ok(Response::not_found());
        };

        let matcher = table.matcher();
        let matched = matcher.matches(request.path());
        if matched.is_empty() {
            return Ok(Response::not_found());
        }

        let chain = Chain::compose(matched);
        chain
            .execute(Arc::new(request), self.default_data.clone())
            .await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
