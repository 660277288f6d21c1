//! Path templates and their segment shapes.
//!
//! A template is compiled once, at registration, into a flat list of
//! [`Segment`]s; request paths are split the same way at match time, so the
//! two sides always agree. In particular `"/"` yields a single empty segment
//! on both sides — the bare root is matched like any other path instead of
//! being a special zero-length case.
//!
//! There is no syntax validation. A `:` with nothing after it is a parameter
//! with an empty name; a `*` before the end of a template registers fine and
//! simply shadows everything beneath it, because matching treats a wildcard
//! as terminal. Both behave exactly as their derived shape dictates. Known
//! gap, traded for a compiler that cannot fail.

/// One segment of a compiled path template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Segment {
    /// Fixed text, matched verbatim.
    Literal(String),
    /// `:name` — matches any single path segment, binding it to `name`.
    Parameter(String),
    /// `*` — matches the remainder of the path, binding nothing.
    Wildcard,
}

const PARAMETER_SIGIL: char = ':';
const WILDCARD_TOKEN: &str = "*";

/// Compiles a template string into its segment list.
pub(crate) fn compile(template: &str) -> Vec<Segment> {
    // Root templates always trail: "/" is one empty literal, never an
    // empty list.
    if template == "/" {
        return vec![Segment::Literal(String::new())];
    }

    // A lone wildcard matches every path from the root.
    if template == WILDCARD_TOKEN || template == "/*" {
        return vec![Segment::Wildcard];
    }

    template.split('/').map(classify).collect()
}

fn classify(part: &str) -> Segment {
    if part == WILDCARD_TOKEN {
        Segment::Wildcard
    } else if let Some(name) = part.strip_prefix(PARAMETER_SIGIL) {
        Segment::Parameter(name.to_owned())
    } else {
        Segment::Literal(part.to_owned())
    }
}

/// Splits a request path the same way templates are compiled.
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    if path == "/" {
        return vec![""];
    }

    path.split('/').collect()
}
