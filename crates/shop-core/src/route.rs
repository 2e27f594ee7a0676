//! Route patterns and the route table.

use crate::context::{Method, RouteParams};

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// A path pattern such as `/products/:slug`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn new(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Static(s.to_string()),
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path, returning captured parameters.
    ///
    /// A trailing slash is ignored; parameter values are percent-decoded.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let parts: Vec<&str> = split_path(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = RouteParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(expected) if expected == part => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), percent_decode(part)?);
                }
            }
        }
        Some(params)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Decode `%XX` escapes in a path segment; malformed input yields `None`.
fn percent_decode(segment: &str) -> Option<String> {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = segment.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Result of looking a request up in the table.
#[derive(Debug, PartialEq)]
pub enum RouteMatch<'a, T> {
    Found(&'a T, RouteParams),
    /// The path exists but not for this method.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// Ordered route table; the first matching entry wins.
#[derive(Debug, Clone)]
pub struct Router<T> {
    routes: Vec<(Method, RoutePattern, T)>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<T> Router<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, method: Method, pattern: &str, handler: T) -> Self {
        self.routes.push((method, RoutePattern::new(pattern), handler));
        self
    }

    pub fn get(self, pattern: &str, handler: T) -> Self {
        self.route(Method::Get, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: T) -> Self {
        self.route(Method::Post, pattern, handler)
    }

    /// Find the handler for a request. HEAD is served by GET routes.
    pub fn lookup(&self, method: Method, path: &str) -> RouteMatch<'_, T> {
        let effective = if method == Method::Head { Method::Get } else { method };
        let mut allowed = Vec::new();

        for (route_method, pattern, handler) in &self.routes {
            if let Some(params) = pattern.matches(path) {
                if *route_method == effective {
                    return RouteMatch::Found(handler, params);
                }
                if !allowed.contains(route_method) {
                    allowed.push(*route_method);
                }
            }
        }

        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed(allowed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_and_param_segments() {
        let p = RoutePattern::new("/products/:slug");
        let params = p.matches("/products/round-frame").unwrap();
        assert_eq!(params.get("slug").map(String::as_str), Some("round-frame"));
        assert!(p.matches("/products").is_none());
        assert!(p.matches("/products/a/b").is_none());
        assert!(p.matches("/blog/a").is_none());
    }

    #[test]
    fn test_trailing_slash_and_decoding() {
        let p = RoutePattern::new("/blog/:slug");
        let params = p.matches("/blog/summer%20styles/").unwrap();
        assert_eq!(params.get("slug").map(String::as_str), Some("summer styles"));
        assert!(p.matches("/blog/bad%zz").is_none());
    }

    #[test]
    fn test_root_pattern() {
        let p = RoutePattern::new("/");
        assert!(p.matches("/").is_some());
        assert!(p.matches("/x").is_none());
    }

    #[test]
    fn test_router_lookup() {
        let router = Router::new()
            .get("/", "home")
            .get("/contact", "contact_page")
            .post("/contact", "contact_submit")
            .get("/products/:slug", "product");

        match router.lookup(Method::Post, "/contact") {
            RouteMatch::Found(h, _) => assert_eq!(*h, "contact_submit"),
            other => panic!("unexpected {:?}", other),
        }
        match router.lookup(Method::Head, "/products/x") {
            RouteMatch::Found(h, params) => {
                assert_eq!(*h, "product");
                assert_eq!(params.get("slug").map(String::as_str), Some("x"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            router.lookup(Method::Delete, "/contact"),
            RouteMatch::MethodNotAllowed(vec![Method::Get, Method::Post])
        );
        assert_eq!(router.lookup(Method::Get, "/nope"), RouteMatch::NotFound);
    }
}
