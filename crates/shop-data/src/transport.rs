//! Transports that carry requests to the backend.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use shop_core::Method;

use crate::{FetchError, HttpRequest, Response};

/// Sends one request and returns the raw response. No retries.
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<Response, FetchError>;
}

#[async_trait(?Send)]
impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    async fn send(&self, request: HttpRequest) -> Result<Response, FetchError> {
        (**self).send(request).await
    }
}

/// Outbound HTTP through the Spin SDK.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinTransport;

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl HttpTransport for SpinTransport {
    async fn send(&self, request: HttpRequest) -> Result<Response, FetchError> {
        use spin_sdk::http::{Method as SpinMethod, Request};

        let method = match request.method {
            Method::Get => SpinMethod::Get,
            Method::Post => SpinMethod::Post,
            Method::Put => SpinMethod::Put,
            Method::Patch => SpinMethod::Patch,
            Method::Delete => SpinMethod::Delete,
            Method::Head => SpinMethod::Head,
            Method::Options => SpinMethod::Options,
        };

        let mut builder = Request::builder();
        builder.method(method).uri(request.url.as_str());
        for (key, value) in &request.headers {
            builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder.body(body);
        }

        let response: spin_sdk::http::Response = spin_sdk::http::send(builder.build())
            .await
            .map_err(|e| FetchError::RequestError(format!("{}: {}", request.url, e)))?;

        let status = *response.status();
        let headers: HashMap<String, String> = response
            .headers()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.body().to_vec();

        Ok(Response::new(status, headers, body).with_url(request.url))
    }
}

#[derive(Debug, Clone)]
enum Canned {
    Reply { status: u16, body: Vec<u8> },
    Fail(String),
}

/// Canned responses keyed by method and URL path, with every request
/// recorded. Unmatched requests get a 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Vec<(Method, String, Canned)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with a JSON body. `path` is matched against the
    /// URL path; the query string is ignored.
    pub fn with_json(self, method: Method, path: &str, body: serde_json::Value) -> Self {
        self.with_status(method, path, 200, body)
    }

    pub fn with_status(
        mut self,
        method: Method,
        path: &str,
        status: u16,
        body: serde_json::Value,
    ) -> Self {
        self.routes.push((
            method,
            path.to_string(),
            Canned::Reply {
                status,
                body: body.to_string().into_bytes(),
            },
        ));
        self
    }

    /// Fail `method path` as if the connection broke.
    pub fn with_failure(mut self, method: Method, path: &str) -> Self {
        self.routes.push((
            method,
            path.to_string(),
            Canned::Fail("connection refused".to_string()),
        ));
        self
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| url_path(&r.url) == path)
            .collect()
    }
}

fn url_path(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.split('?').next().unwrap_or(url).to_string())
}

#[async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<Response, FetchError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }

        let path = url_path(&request.url);
        let canned = self
            .routes
            .iter()
            .find(|(m, p, _)| *m == request.method && path.ends_with(p.as_str()))
            .map(|(_, _, c)| c.clone());

        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        match canned {
            Some(Canned::Reply { status, body }) => {
                Ok(Response::new(status, headers, body).with_url(request.url))
            }
            Some(Canned::Fail(reason)) => Err(FetchError::RequestError(reason)),
            None => Ok(Response::new(
                404,
                headers,
                br#"{"detail":"Not found."}"#.to_vec(),
            )
            .with_url(request.url)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_mock_matches_path_and_records() {
        let mock = MockTransport::new().with_json(
            Method::Get,
            "/api/v1/faqs/",
            serde_json::json!([{"question": "Q", "answer": "A"}]),
        );

        let resp = block_on(mock.send(HttpRequest::new(
            Method::Get,
            "http://api.test/api/v1/faqs/?page=1",
        )))
        .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(mock.requests_to("/api/v1/faqs/").len(), 1);
    }

    #[test]
    fn test_mock_unmatched_is_404_and_failure_errors() {
        let mock = MockTransport::new().with_failure(Method::Post, "/orders/");

        let resp = block_on(mock.send(HttpRequest::new(Method::Get, "http://api.test/nope/"))).unwrap();
        assert_eq!(resp.status, 404);

        let err = block_on(mock.send(HttpRequest::new(Method::Post, "http://api.test/orders/")))
            .unwrap_err();
        assert!(matches!(err, FetchError::RequestError(_)));
        assert_eq!(mock.requests().len(), 2);
    }
}
