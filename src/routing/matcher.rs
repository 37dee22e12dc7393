//! Route matching module
//!
//! Matches request paths against `/literal/:param` patterns and resolves a
//! method + path pair against a route table.

use hyper::Method;

/// Parameters captured from `:name` pattern segments
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathParams {
    pairs: Vec<(String, String)>,
}

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A single route table entry
#[derive(Debug, Clone)]
pub struct Route<E> {
    pub method: Method,
    pub pattern: &'static str,
    pub endpoint: E,
}

impl<E> Route<E> {
    pub const fn new(method: Method, pattern: &'static str, endpoint: E) -> Self {
        Self {
            method,
            pattern,
            endpoint,
        }
    }
}

/// Outcome of resolving a request against a route table
#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch<E> {
    Found(E, PathParams),
    /// The path exists but not for this method; carries the allowed methods
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// Find the first route whose method and pattern both match
pub fn match_route<E: Copy>(method: &Method, path: &str, routes: &[Route<E>]) -> RouteMatch<E> {
    // One trailing slash is ignored: "/employee/" matches "/employee"
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    let mut allowed = Vec::new();

    for route in routes {
        let Some(params) = match_pattern(route.pattern, path) else {
            continue;
        };
        if route.method == *method {
            return RouteMatch::Found(route.endpoint, params);
        }
        if !allowed.contains(&route.method) {
            allowed.push(route.method.clone());
        }
    }

    if allowed.is_empty() {
        RouteMatch::NotFound
    } else {
        RouteMatch::MethodNotAllowed(allowed)
    }
}

/// Match a path against a pattern such as `/employee/:id`
///
/// Segments must line up one to one. A `:name` segment captures any
/// non-empty path segment.
pub fn match_pattern(pattern: &str, path: &str) -> Option<PathParams> {
    let mut pattern_segments = segments(pattern);
    let mut path_segments = segments(path);
    let mut params = PathParams::default();

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return Some(params),
            (Some(expected), Some(actual)) => {
                if let Some(name) = expected.strip_prefix(':') {
                    if actual.is_empty() {
                        return None;
                    }
                    params.pairs.push((name.to_string(), actual.to_string()));
                } else if expected != actual {
                    return None;
                }
            }
            _ => return None,
        }
    }
}

fn segments(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}
