//! End-to-end dispatch behavior, driven through `Router::handle` with
//! directly-built requests — no sockets involved.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use trellis::{Data, Error, Method, Next, Params, Request, Response, Router, StatusCode};

fn body_text(response: &Response) -> &str {
    std::str::from_utf8(response.body()).expect("utf-8 body")
}

async fn home(_req: Arc<Request>, _params: Params, _data: Data) -> Result<Response, Error> {
    Ok(Response::text("Home"))
}

async fn about(_req: Arc<Request>, _params: Params, _data: Data) -> Result<Response, Error> {
    Ok(Response::text("About"))
}

async fn show_post(_req: Arc<Request>, params: Params, _data: Data) -> Result<Response, Error> {
    let id = params.get("id").unwrap_or("unknown");
    Ok(Response::text(format!("Post: {id}")))
}

#[tokio::test]
async fn literal_route_dispatches_to_its_handler_only() {
    let other_hits = Arc::new(AtomicUsize::new(0));
    let other = {
        let hits = Arc::clone(&other_hits);
        move |_req: Arc<Request>, _params: Params, _data: Data| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(Response::text("Contact"))
            }
        }
    };

    let router = Router::new().get("/about", about).get("/contact", other);

    let response = router
        .handle(Request::new(Method::Get, "/about"))
        .await
        .unwrap();

    assert_eq!(body_text(&response), "About");
    assert_eq!(other_hits.load(Ordering::SeqCst), 0);

    // Same path, wrong method: nothing matches.
    let response = router
        .handle(Request::new(Method::Post, "/about"))
        .await
        .unwrap();
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn parameter_routes_bind_exactly_their_segments() {
    let echo = |_req: Arc<Request>, params: Params, _data: Data| async move {
        assert_eq!(params.len(), 1);
        let id = params.get("id").expect("id bound");
        Ok::<_, Error>(Response::text(id.to_owned()))
    };

    let router = Router::new().get("/posts/:id", echo);

    let response = router
        .handle(Request::new(Method::Get, "/posts/42"))
        .await
        .unwrap();

    assert_eq!(body_text(&response), "42");
}

#[tokio::test]
async fn trailing_wildcard_matches_any_depth() {
    let router = Router::new().get("/files/*", |_req: Arc<Request>, _params: Params, _data: Data| async {
        Ok::<_, Error>(Response::text("file"))
    });

    for path in ["/files/a", "/files/a/b", "/files/a/b/c"] {
        let response = router.handle(Request::new(Method::Get, path)).await.unwrap();
        assert_eq!(body_text(&response), "file", "path {path}");
    }

    // The wildcard needs at least one remaining segment to consume.
    let response = router
        .handle(Request::new(Method::Get, "/files"))
        .await
        .unwrap();
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn prefix_middleware_runs_before_a_deeper_handler() {
    let order = Arc::new(Mutex::new(Vec::new()));

    let gate = {
        let order = Arc::clone(&order);
        move |_req: Arc<Request>, _params: Params, _data: Data, next: Next| {
            let order = Arc::clone(&order);
            async move {
                order.lock().unwrap().push("middleware");
                next.run().await
            }
        }
    };
    let panel = {
        let order = Arc::clone(&order);
        move |_req: Arc<Request>, _params: Params, _data: Data| {
            let order = Arc::clone(&order);
            async move {
                order.lock().unwrap().push("handler");
                Ok::<_, Error>(Response::text("panel"))
            }
        }
    };

    let router = Router::new()
        .middleware(Method::Get, "/admin/*", gate)
        .get("/admin/panel", panel);

    let response = router
        .handle(Request::new(Method::Get, "/admin/panel"))
        .await
        .unwrap();

    assert_eq!(body_text(&response), "panel");
    assert_eq!(*order.lock().unwrap(), vec!["middleware", "handler"]);
}

#[tokio::test]
async fn short_circuiting_middleware_prevents_the_handler() {
    let handler_hits = Arc::new(AtomicUsize::new(0));

    let deny = |_req: Arc<Request>, _params: Params, _data: Data, _next: Next| async {
        Ok::<_, Error>(Response::status(StatusCode::UNAUTHORIZED))
    };
    let panel = {
        let hits = Arc::clone(&handler_hits);
        move |_req: Arc<Request>, _params: Params, _data: Data| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(Response::text("panel"))
            }
        }
    };

    let router = Router::new()
        .middleware(Method::Get, "/admin/*", deny)
        .get("/admin/panel", panel);

    let response = router
        .handle(Request::new(Method::Get, "/admin/panel"))
        .await
        .unwrap();

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(handler_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn double_continuation_is_fatal_and_never_reruns_the_handler() {
    let handler_hits = Arc::new(AtomicUsize::new(0));

    let greedy = |_req: Arc<Request>, _params: Params, _data: Data, next: Next| async move {
        let _first = next.run().await?;
        next.run().await
    };
    let counting = {
        let hits = Arc::clone(&handler_hits);
        move |_req: Arc<Request>, _params: Params, _data: Data| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(Response::text("once"))
            }
        }
    };

    let router = Router::new()
        .middleware(Method::Get, "/", greedy)
        .get("/", counting);

    let outcome = router.handle(Request::new(Method::Get, "/")).await;

    assert!(matches!(outcome, Err(Error::DoubleContinuation)));
    assert_eq!(handler_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unmatched_paths_get_the_default_not_found_on_every_method() {
    let router = Router::new().get("/only-this", about);

    for method in Method::ALL {
        let response = router
            .handle(Request::new(method, "/missing"))
            .await
            .unwrap();

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "{method}");
        assert!(response.body().is_empty(), "{method}");
    }
}

#[tokio::test]
async fn the_blog_scenario_end_to_end() {
    let passthrough = |_req: Arc<Request>, _params: Params, _data: Data, next: Next| async move {
        next.run().await
    };

    let router = Router::new()
        .middleware(Method::Get, "*", passthrough)
        .get("/", home)
        .get("/about", about)
        .get("/posts/:id", show_post);

    let cases = [
        ("/", "Home"),
        ("/about", "About"),
        ("/posts/1", "Post: 1"),
    ];
    for (path, expected) in cases {
        let response = router.handle(Request::new(Method::Get, path)).await.unwrap();
        assert_eq!(body_text(&response), expected, "path {path}");
    }

    let response = router
        .handle(Request::new(Method::Get, "/nope"))
        .await
        .unwrap();
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn wildcard_fallback_beats_the_built_in_not_found() {
    let fallback = |_req: Arc<Request>, _params: Params, _data: Data| async {
        Ok::<_, Error>(
            Response::builder()
                .status(StatusCode::NOT_FOUND)
                .text("custom not found"),
        )
    };

    let router = Router::new().get("/", home).all("*", fallback);

    let response = router
        .handle(Request::new(Method::Get, "/non-existent-route"))
        .await
        .unwrap();

    // The fallback's response, not the router's empty default.
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(&response), "custom not found");

    // Specific routes still win over the fallback.
    let response = router.handle(Request::new(Method::Get, "/")).await.unwrap();
    assert_eq!(body_text(&response), "Home");
}

#[tokio::test]
async fn later_handler_registration_replaces_the_earlier_one() {
    let router = Router::new().get("/about", home).get("/about", about);

    let response = router
        .handle(Request::new(Method::Get, "/about"))
        .await
        .unwrap();

    assert_eq!(body_text(&response), "About");
}

#[tokio::test]
async fn ambiguous_parameter_names_both_match_in_registration_order() {
    // Two different parameter names at the same trie position: both match;
    // the first registered wins the terminus.
    let by_id = |_req: Arc<Request>, params: Params, _data: Data| async move {
        Ok::<_, Error>(Response::text(format!("id={}", params.get("id").unwrap_or(""))))
    };
    let by_slug = |_req: Arc<Request>, params: Params, _data: Data| async move {
        Ok::<_, Error>(Response::text(format!(
            "slug={}",
            params.get("slug").unwrap_or("")
        )))
    };

    let router = Router::new().get("/posts/:id", by_id).get("/posts/:slug", by_slug);

    let response = router
        .handle(Request::new(Method::Get, "/posts/7"))
        .await
        .unwrap();

    assert_eq!(body_text(&response), "id=7");
}

#[tokio::test]
async fn requests_never_observe_each_others_data() {
    let tag_from_header = |req: Arc<Request>, _params: Params, _data: Data, next: Next| async move {
        match req.header("x-tag") {
            Some(tag) => {
                next.run_with(Data::new().with("tag", tag.to_owned())).await
            }
            None => next.run().await,
        }
    };
    let echo_tag = |_req: Arc<Request>, _params: Params, data: Data| async move {
        let tag = data
            .get("tag")
            .and_then(|v| v.as_str())
            .unwrap_or("untagged")
            .to_owned();
        Ok::<_, Error>(Response::text(tag))
    };

    let router = Router::new()
        .middleware(Method::Get, "/", tag_from_header)
        .get("/", echo_tag);

    let (a, b) = tokio::join!(
        router.handle(Request::new(Method::Get, "/").with_header("x-tag", "alpha")),
        router.handle(Request::new(Method::Get, "/").with_header("x-tag", "beta")),
    );

    assert_eq!(body_text(&a.unwrap()), "alpha");
    assert_eq!(body_text(&b.unwrap()), "beta");

    // Merged updates never leak back into the router defaults.
    let untouched = router.handle(Request::new(Method::Get, "/")).await.unwrap();
    assert_eq!(body_text(&untouched), "untagged");
}

#[tokio::test]
async fn callback_failures_propagate_unmodified() {
    let failing = |_req: Arc<Request>, _params: Params, _data: Data| async {
        Err::<Response, _>(Error::callback("the database is on fire"))
    };

    let router = Router::new().get("/boom", failing);

    let outcome = router.handle(Request::new(Method::Get, "/boom")).await;

    match outcome {
        Err(Error::Callback(err)) => assert_eq!(err.to_string(), "the database is on fire"),
        Err(other) => panic!("expected a callback error, got {other}"),
        Ok(_) => panic!("expected a callback error, got a response"),
    }
}

#[tokio::test]
async fn registration_after_a_request_is_visible_to_the_next_request() {
    // The compiled matcher goes stale on registration and is rebuilt on the
    // next request that needs it.
    let router = Router::new().get("/", home);

    let response = router.handle(Request::new(Method::Get, "/")).await.unwrap();
    assert_eq!(body_text(&response), "Home");

    let router = router.get("/about", about);

    let response = router
        .handle(Request::new(Method::Get, "/about"))
        .await
        .unwrap();
    assert_eq!(body_text(&response), "About");
}
