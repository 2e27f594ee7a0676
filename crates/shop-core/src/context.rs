//! Request context with typed parameters.

use std::collections::HashMap;

use rand::Rng;
use url::form_urlencoded;

use crate::lifecycle::TimingContext;

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID: millisecond timestamp plus 32 random bits.
    pub fn generate() -> Self {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let salt: u32 = rand::thread_rng().gen();
        Self(format!("{:x}-{:08x}", millis, salt))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extracted route parameters (e.g., `:slug` from `/products/:slug`).
pub type RouteParams = HashMap<String, String>;

/// HTTP headers, names lowercased.
pub type Headers = HashMap<String, String>;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            "PATCH" => Some(Method::Patch),
            "HEAD" => Some(Method::Head),
            "OPTIONS" => Some(Method::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// GET and HEAD render pages; everything else is a form action.
    pub fn is_read(&self) -> bool {
        matches!(self, Method::Get | Method::Head)
    }
}

/// Typed request context passed to page handlers.
#[derive(Debug)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Request path without the query string.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query_string: String,
    /// Extracted route parameters.
    pub params: RouteParams,
    /// Decoded query pairs, in request order.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: Headers,
    /// Decoded `application/x-www-form-urlencoded` body pairs.
    pub form: Vec<(String, String)>,
    /// Timing context for observability.
    pub timing: TimingContext,
}

impl RequestContext {
    /// Create a context from a method and a path that may carry a query string.
    pub fn new(method: Method, path_with_query: impl AsRef<str>) -> Self {
        let raw = path_with_query.as_ref();
        let (path, query_string) = match raw.split_once('?') {
            Some((p, q)) => (p, q),
            None => (raw, ""),
        };
        let path = if path.is_empty() { "/" } else { path };

        Self {
            request_id: RequestId::generate(),
            method,
            path: path.to_string(),
            query_string: query_string.to_string(),
            params: HashMap::new(),
            query: decode_pairs(query_string.as_bytes()),
            headers: HashMap::new(),
            form: Vec::new(),
            timing: TimingContext::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Decode a urlencoded form body.
    pub fn with_form_body(mut self, body: &[u8]) -> Self {
        self.form = decode_pairs(body);
        self
    }

    pub fn with_request_id(mut self, id: RequestId) -> Self {
        self.request_id = id;
        self
    }

    /// Get a route parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    /// Get the first query parameter with this name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        first(&self.query, name)
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        let name_lower = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_ascii_lowercase() == name_lower)
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie value from the `Cookie` header.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie")?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.trim())
    }

    /// Get the first form field with this name.
    pub fn form_field(&self, name: &str) -> Option<&str> {
        first(&self.form, name)
    }

    /// Form field as trimmed text, empty when missing.
    pub fn form_text(&self, name: &str) -> String {
        self.form_field(name).unwrap_or_default().trim().to_string()
    }

    /// Form fields whose names start with `prefix`, with the prefix removed.
    ///
    /// Used for grouped inputs such as `option[Color]=Black`, which comes
    /// back as `("Color]", ...)` for prefix `option[`; the caller strips the
    /// closing bracket.
    pub fn form_fields_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.form
            .iter()
            .filter_map(move |(k, v)| k.strip_prefix(prefix).map(|rest| (rest, v.as_str())))
    }
}

fn decode_pairs(input: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(input).into_owned().collect()
}

fn first<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_query_split() {
        let ctx = RequestContext::new(Method::Get, "/products?category=sun+glasses&page=2");
        assert_eq!(ctx.path, "/products");
        assert_eq!(ctx.query_string, "category=sun+glasses&page=2");
        assert_eq!(ctx.query_param("category"), Some("sun glasses"));
        assert_eq!(ctx.query_param("page"), Some("2"));
        assert_eq!(ctx.query_param("missing"), None);
    }

    #[test]
    fn test_empty_path_is_root() {
        assert_eq!(RequestContext::new(Method::Get, "").path, "/");
        assert_eq!(RequestContext::new(Method::Get, "?a=1").path, "/");
    }

    #[test]
    fn test_header_and_cookie() {
        let ctx = RequestContext::new(Method::Get, "/")
            .with_header("Cookie", "theme=dark; sid=sess_abc ; other=1");
        assert!(ctx.header("COOKIE").is_some());
        assert_eq!(ctx.cookie("sid"), Some("sess_abc"));
        assert_eq!(ctx.cookie("nope"), None);
    }

    #[test]
    fn test_form_body() {
        let ctx = RequestContext::new(Method::Post, "/cart/add")
            .with_form_body(b"product=4&quantity=2&option%5BColor%5D=Matte+Black&option%5BSize%5D=L");
        assert_eq!(ctx.form_field("product"), Some("4"));
        assert_eq!(ctx.form_text("quantity"), "2");
        let options: Vec<_> = ctx.form_fields_with_prefix("option[").collect();
        assert_eq!(options, vec![("Color]", "Matte Black"), ("Size]", "L")]);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(Method::parse("post"), Some(Method::Post));
        assert_eq!(Method::parse("BREW"), None);
        assert!(Method::Head.is_read());
        assert!(!Method::Post.is_read());
    }

    #[test]
    fn test_request_ids_differ() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
