//! The middleware chain: composition and dispatch.
//!
//! The ordered match list becomes one nested continuation. Every matched
//! middleware participates, in match order, each wrapping whatever comes
//! after it; the first matched handler is the innermost terminus. Later
//! handlers never displace it, which is what lets a wildcard fallback route
//! coexist with specific routes: the specific handler answers when it
//! matches, the fallback answers otherwise. When nothing terminal matches at
//! all, the terminus is the router's default not-found response.
//!
//! A middleware may resolve without driving its continuation (a
//! short-circuit: nothing nested deeper runs), or drive it exactly once and
//! transform the response on the way out. Driving it twice is a defect in
//! the middleware, answered with [`Error::DoubleContinuation`] rather than a
//! second pass over the downstream chain.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::data::Data;
use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, BoxedMiddleware, Entry};
use crate::params::Params;
use crate::request::Request;
use crate::response::Response;
use crate::trie::Matched;

/// A composed dispatch chain for one request.
pub(crate) struct Chain {
    middleware: Vec<(BoxedMiddleware, Params)>,
    terminus: Option<(BoxedHandler, Params)>,
}

impl Chain {
    /// Folds the ordered match list into a chain.
    ///
    /// The terminus slot is first-write-wins: match order is priority
    /// order, so the first handler to match is the one that answers.
    /// Middleware are collected unconditionally; one matched through a
    /// wildcard still wraps a handler that matched ahead of it.
    pub(crate) fn compose(matched: Vec<Matched>) -> Self {
        let mut middleware = Vec::new();
        let mut terminus = None;

        for m in matched {
            match m.entry {
                Entry::Middleware(mw) => middleware.push((mw, m.params)),
                Entry::Handler(handler) => {
                    if terminus.is_none() {
                        terminus = Some((handler, m.params));
                    }
                }
            }
        }

        Self { middleware, terminus }
    }

    /// Runs the chain to a single response.
    pub(crate) async fn execute(
        self,
        request: Arc<Request>,
        data: Data,
    ) -> Result<Response, Error> {
        proceed(Arc::new(self), 0, request, data).await
    }
}

/// Advances the chain from `index`: the next middleware if one remains,
/// otherwise the terminus. Boxed because the recursion passes through the
/// middleware's own future.
fn proceed(chain: Arc<Chain>, index: usize, request: Arc<Request>, data: Data) -> BoxFuture {
    Box::pin(async move {
        if let Some((middleware, params)) = chain.middleware.get(index) {
            let middleware = Arc::clone(middleware);
            let params = params.clone();
            let next = Next {
                chain: Arc::clone(&chain),
                index: index + 1,
                request: Arc::clone(&request),
                snapshot: data.clone(),
                used: AtomicBool::new(false),
            };
            middleware.call(request, params, data, next).await
        } else if let Some((handler, params)) = &chain.terminus {
            handler.call(request, params.clone(), data).await
        } else {
            Ok(Response::not_found())
        }
    })
}

/// The continuation handed to a middleware: runs the rest of the chain and
/// resolves to its response.
///
/// Single-use. The token owns a flag that is checked-and-set on first use,
/// so a second [`run`](Next::run) within the same invocation fails with
/// [`Error::DoubleContinuation`] instead of executing the downstream chain
/// again.
pub struct Next {
    chain: Arc<Chain>,
    index: usize,
    request: Arc<Request>,
    snapshot: Data,
    used: AtomicBool,
}

impl Next {
    /// Runs the rest of the chain.
    pub async fn run(&self) -> Result<Response, Error> {
        self.advance(None).await
    }

    /// Like [`run`](Next::run), with `update` merged shallowly over the data
    /// snapshot this middleware received (later keys win) before the rest of
    /// the chain sees it.
    pub async fn run_with(&self, update: Data) -> Result<Response, Error> {
        self.advance(Some(update)).await
    }

    async fn advance(&self, update: Option<Data>) -> Result<Response, Error> {
        if self.used.swap(true, Ordering::SeqCst) {
            return Err(Error::DoubleContinuation);
        }

        let mut data = self.snapshot.clone();
        if let Some(update) = update {
            data.merge(update);
        }

        proceed(
            Arc::clone(&self.chain),
            self.index,
            Arc::clone(&self.request),
            data,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::handler::{Handler, Middleware};
    use crate::method::Method;

    fn request() -> Arc<Request> {
        Arc::new(Request::new(Method::Get, "/"))
    }

    fn matched(entry: Entry) -> Matched {
        Matched {
            entry,
            params: Params::new(),
        }
    }

    #[tokio::test]
    async fn empty_chain_falls_back_to_not_found() {
        let chain = Chain::compose(Vec::new());
        let response = chain.execute(request(), Data::new()).await.unwrap();

        assert_eq!(response.status_code(), http::StatusCode::NOT_FOUND);
        assert!(response.body().is_empty());
    }

    #[tokio::test]
    async fn short_circuit_skips_the_terminus() {
        let hits = Arc::new(AtomicUsize::new(0));

        let blocker = |_request: Arc<Request>, _params: Params, _data: Data, _next: Next| async {
            Ok::<_, Error>(Response::text("blocked"))
        };
        let handler = {
            let hits = Arc::clone(&hits);
            move |_request: Arc<Request>, _params: Params, _data: Data| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Error>(Response::text("handler"))
                }
            }
        };

        let chain = Chain::compose(vec![
            matched(Entry::Middleware(blocker.into_boxed_middleware())),
            matched(Entry::Handler(handler.into_boxed_handler())),
        ]);
        let response = chain.execute(request(), Data::new()).await.unwrap();

        assert_eq!(response.body(), b"blocked");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_continuation_run_fails_and_the_handler_runs_once() {
        let hits = Arc::new(AtomicUsize::new(0));

        let greedy = |_request: Arc<Request>, _params: Params, _data: Data, next: Next| async move {
            let _first = next.run().await?;
            next.run().await
        };
        let handler = {
            let hits = Arc::clone(&hits);
            move |_request: Arc<Request>, _params: Params, _data: Data| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Error>(Response::text("handler"))
                }
            }
        };

        let chain = Chain::compose(vec![
            matched(Entry::Middleware(greedy.into_boxed_middleware())),
            matched(Entry::Handler(handler.into_boxed_handler())),
        ]);
        let outcome = chain.execute(request(), Data::new()).await;

        assert!(matches!(outcome, Err(Error::DoubleContinuation)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn continuation_updates_merge_over_the_snapshot() {
        let stamping = |_request: Arc<Request>, _params: Params, _data: Data, next: Next| async move {
            next.run_with(Data::new().with("who", "middleware")).await
        };
        let echoing = |_request: Arc<Request>, _params: Params, data: Data| async move {
            let who = data
                .get("who")
                .and_then(|v| v.as_str())
                .unwrap_or("nobody")
                .to_owned();
            let seed = data
                .get("seed")
                .and_then(|v| v.as_str())
                .unwrap_or("missing")
                .to_owned();
            Ok::<_, Error>(Response::text(format!("{who}:{seed}")))
        };

        let chain = Chain::compose(vec![
            matched(Entry::Middleware(stamping.into_boxed_middleware())),
            matched(Entry::Handler(echoing.into_boxed_handler())),
        ]);
        let data = Data::new().with("who", "default").with("seed", "kept");
        let response = chain.execute(request(), data).await.unwrap();

        // Updated key overridden, untouched key carried through.
        assert_eq!(response.body(), b"middleware:kept");
    }

    #[tokio::test]
    async fn first_handler_wins_the_terminus() {
        let first = |_request: Arc<Request>, _params: Params, _data: Data| async {
            Ok::<_, Error>(Response::text("first"))
        };
        let second = |_request: Arc<Request>, _params: Params, _data: Data| async {
            Ok::<_, Error>(Response::text("second"))
        };

        let chain = Chain::compose(vec![
            matched(Entry::Handler(first.into_boxed_handler())),
            matched(Entry::Handler(second.into_boxed_handler())),
        ]);
        let response = chain.execute(request(), Data::new()).await.unwrap();

        assert_eq!(response.body(), b"first");
    }

    #[tokio::test]
    async fn middleware_matched_after_the_terminus_still_wraps_it() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let outer = {
            let order = Arc::clone(&order);
            move |_request: Arc<Request>, _params: Params, _data: Data, next: Next| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().unwrap().push("middleware");
                    next.run().await
                }
            }
        };
        let handler = {
            let order = Arc::clone(&order);
            move |_request: Arc<Request>, _params: Params, _data: Data| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().unwrap().push("handler");
                    Ok::<_, Error>(Response::text("ok"))
                }
            }
        };

        // Handler ahead of the middleware in match order, the way a literal
        // route sorts ahead of a wildcard.
        let chain = Chain::compose(vec![
            matched(Entry::Handler(handler.into_boxed_handler())),
            matched(Entry::Middleware(outer.into_boxed_middleware())),
        ]);
        chain.execute(request(), Data::new()).await.unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["middleware", "handler"]);
    }
}
