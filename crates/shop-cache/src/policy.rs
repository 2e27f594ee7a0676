//! Route cache policies rendered as response headers.

use std::time::Duration;

/// Who may cache the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheScope {
    /// Cacheable by CDN and browser.
    Public,
    /// Browser only.
    Private,
    #[default]
    None,
}

impl CacheScope {
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::None => "no-store",
        }
    }
}

/// Cache policy for a route.
///
/// Catalog and content pages are public and short-lived. Anything that reads
/// the session is `private, no-store`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CachePolicy {
    pub scope: CacheScope,
    pub ttl: Duration,
    pub stale_while_revalidate: Option<Duration>,
    /// Request headers the response varies on.
    pub vary: Vec<String>,
}

impl CachePolicy {
    pub fn public(ttl: Duration) -> Self {
        Self {
            scope: CacheScope::Public,
            ttl,
            ..Default::default()
        }
    }

    pub fn private_no_store() -> Self {
        Self {
            scope: CacheScope::Private,
            ..Default::default()
        }
    }

    pub fn with_swr(mut self, window: Duration) -> Self {
        self.stale_while_revalidate = Some(window);
        self
    }

    pub fn vary_on(mut self, header: impl Into<String>) -> Self {
        let header = header.into();
        if !self.vary.iter().any(|h| h.eq_ignore_ascii_case(&header)) {
            self.vary.push(header);
        }
        self
    }

    pub fn is_cacheable(&self) -> bool {
        self.scope == CacheScope::Public && !self.ttl.is_zero()
    }

    /// `Cache-Control` header value.
    pub fn cache_control_header(&self) -> String {
        match self.scope {
            CacheScope::None => "no-store".to_string(),
            CacheScope::Private if self.ttl.is_zero() => "private, no-store".to_string(),
            scope => {
                let mut parts = vec![
                    scope.directive().to_string(),
                    format!("max-age={}", self.ttl.as_secs()),
                ];
                if let Some(swr) = self.stale_while_revalidate {
                    parts.push(format!("stale-while-revalidate={}", swr.as_secs()));
                }
                parts.join(", ")
            }
        }
    }

    /// `Vary` header value, if any.
    pub fn vary_header(&self) -> Option<String> {
        (!self.vary.is_empty()).then(|| self.vary.join(", "))
    }

    /// Header pairs to attach to a response.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("cache-control".to_string(), self.cache_control_header())];
        if let Some(vary) = self.vary_header() {
            headers.push(("vary".to_string(), vary));
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_with_swr() {
        let policy = CachePolicy::public(Duration::from_secs(60))
            .with_swr(Duration::from_secs(300))
            .vary_on("Accept-Encoding");
        assert_eq!(
            policy.cache_control_header(),
            "public, max-age=60, stale-while-revalidate=300"
        );
        assert_eq!(policy.vary_header().as_deref(), Some("Accept-Encoding"));
        assert!(policy.is_cacheable());
    }

    #[test]
    fn test_private_no_store() {
        let policy = CachePolicy::private_no_store().vary_on("Cookie").vary_on("cookie");
        assert_eq!(policy.cache_control_header(), "private, no-store");
        assert!(!policy.is_cacheable());
        assert_eq!(
            policy.headers(),
            vec![
                ("cache-control".to_string(), "private, no-store".to_string()),
                ("vary".to_string(), "Cookie".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_is_no_store() {
        assert_eq!(CachePolicy::default().cache_control_header(), "no-store");
        assert!(CachePolicy::default().vary_header().is_none());
    }
}
