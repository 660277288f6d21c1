//! Per-method path trie and match enumeration.
//!
//! One trie exists per HTTP method, rebuilt from that method's registration
//! log whenever the compiled view has gone stale. Each node keys its
//! children by segment shape: a map of literal segments, a list of named
//! parameters, and at most one wildcard slot. Entries live at the node where
//! their template ends; middleware accumulate there, while the handler slot
//! keeps only the most recent registration.
//!
//! Enumeration order is the routing policy and is fixed: at every level the
//! literal child is tried first, then every parameter child in registration
//! order, then the wildcard. The dispatcher treats this order as priority,
//! so it must never change.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::{BoxedHandler, BoxedMiddleware, Entry};
use crate::params::Params;
use crate::pattern::{self, Segment};

/// One record of the per-method registration log, replayed into the
/// compiled trie on rebuild.
pub(crate) struct Registration {
    pub(crate) segments: Vec<Segment>,
    pub(crate) entry: Entry,
}

/// One template match: the registered entry plus the bindings its parameter
/// segments captured on the way down.
pub(crate) struct Matched {
    pub(crate) entry: Entry,
    pub(crate) params: Params,
}

#[derive(Default)]
struct Node {
    literal: HashMap<String, Node>,
    // A Vec, not a map: every parameter child at a level is attempted at
    // match time, in the order its name first appeared.
    parameters: Vec<(String, Node)>,
    wildcard: Option<Box<Node>>,
    middleware: Vec<BoxedMiddleware>,
    handler: Option<BoxedHandler>,
}

/// The compiled matcher for one HTTP method.
#[derive(Default)]
pub(crate) struct Trie {
    root: Node,
}

impl Trie {
    /// Replays a registration log, in order, into a fresh trie.
    pub(crate) fn build(registrations: &[Registration]) -> Self {
        let mut trie = Self::default();
        for registration in registrations {
            trie.insert(&registration.segments, registration.entry.clone());
        }
        trie
    }

    fn insert(&mut self, segments: &[Segment], entry: Entry) {
        let mut node = &mut self.root;
        for segment in segments {
            node = match segment {
                Segment::Literal(text) => node.literal.entry(text.clone()).or_default(),
                Segment::Parameter(name) => node.parameter_child(name),
                Segment::Wildcard => &mut **node.wildcard.get_or_insert_with(Box::default),
            };
        }
        match entry {
            // Middleware accumulate; the handler slot keeps only the most
            // recent registration.
            Entry::Middleware(middleware) => node.middleware.push(middleware),
            Entry::Handler(handler) => node.handler = Some(handler),
        }
    }

    /// Enumerates every registered template matching `path`, with its
    /// bindings, in match order.
    ///
    /// Result sets are small and bounded by path depth, so the walk
    /// materializes them eagerly rather than streaming.
    pub(crate) fn matches(&self, path: &str) -> Vec<Matched> {
        let segments = pattern::split_path(path);
        let mut matched = Vec::new();
        self.root.collect(&segments, Params::new(), &mut matched);
        matched
    }
}

impl Node {
    fn parameter_child(&mut self, name: &str) -> &mut Node {
        let index = match self.parameters.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.parameters.push((name.to_owned(), Node::default()));
                self.parameters.len() - 1
            }
        };
        &mut self.parameters[index].1
    }

    fn collect(&self, segments: &[&str], params: Params, matched: &mut Vec<Matched>) {
        let Some((segment, rest)) = segments.split_first() else {
            // Terminal: everything stored here matches, middleware before
            // the handler.
            for middleware in &self.middleware {
                matched.push(Matched {
                    entry: Entry::Middleware(Arc::clone(middleware)),
                    params: params.clone(),
                });
            }
            if let Some(handler) = &self.handler {
                matched.push(Matched {
                    entry: Entry::Handler(Arc::clone(handler)),
                    params,
                });
            }
            return;
        };

        // Exact text is the most specific routing intent, so it always
        // goes first.
        if let Some(child) = self.literal.get(*segment) {
            child.collect(rest, params.clone(), matched);
        }

        // Every parameter child is attempted: two different names at the
        // same position yield two simultaneous matches. Each branch gets
        // its own binding set.
        for (name, child) in &self.parameters {
            let mut bound = params.clone();
            bound.bind(name.clone(), *segment);
            child.collect(rest, bound, matched);
        }

        // A wildcard is an immediate terminal no matter how much path is
        // left, and binds nothing.
        if let Some(wildcard) = &self.wildcard {
            wildcard.collect(&[], params, matched);
        }
    }
}
