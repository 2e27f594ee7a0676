//! Backend HTTP client with base URL and default headers.

use serde::Serialize;
use shop_core::Method;
use url::Url;

use crate::{FetchError, HttpRequest, HttpTransport, Response};

/// HTTP client bound to the backend's base URL.
pub struct FetchClient<T> {
    transport: T,
    base_url: Url,
    default_headers: Vec<(String, String)>,
}

impl<T: HttpTransport> FetchClient<T> {
    /// `base_url` is the API root, e.g. `https://api.example.com/api/v1`.
    pub fn new(transport: T, base_url: &str) -> Result<Self, FetchError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }
        // Keep the base path when joining relative paths.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            transport,
            base_url: base,
            default_headers: vec![("Accept".to_string(), "application/json".to_string())],
        })
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((key.into(), value.into()));
        self
    }

    /// Resolve a path such as `/products/` against the base URL.
    pub fn url(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", path, e)))
    }

    pub fn get(&self, path: &str) -> ClientRequest<'_, T> {
        self.request(Method::Get, path)
    }

    pub fn post(&self, path: &str) -> ClientRequest<'_, T> {
        self.request(Method::Post, path)
    }

    pub fn request(&self, method: Method, path: &str) -> ClientRequest<'_, T> {
        ClientRequest {
            client: self,
            method,
            url: self.url(path),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

/// A request builder bound to a client.
pub struct ClientRequest<'a, T> {
    client: &'a FetchClient<T>,
    method: Method,
    url: Result<Url, FetchError>,
    query: Vec<(String, String)>,
    body: Option<Result<Vec<u8>, FetchError>>,
}

impl<'a, T: HttpTransport> ClientRequest<'a, T> {
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter only when present.
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Self {
        self.body = Some(serde_json::to_vec(body).map_err(FetchError::from));
        self
    }

    /// The final URL including query parameters.
    pub fn build(self) -> Result<HttpRequest, FetchError> {
        let mut url = self.url?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &self.query {
                pairs.append_pair(k, v);
            }
        }

        let mut request = HttpRequest::new(self.method, url.as_str());
        for (k, v) in &self.client.default_headers {
            request = request.header(k.clone(), v.clone());
        }
        if let Some(body) = self.body {
            request = request
                .header("Content-Type", "application/json")
                .body(body?);
        }
        Ok(request)
    }

    /// Send the request; non-2xx answers are returned as-is.
    pub async fn send(self) -> Result<Response, FetchError> {
        let client = self.client;
        let request = self.build()?;
        client.transport.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockTransport;
    use futures::executor::block_on;

    #[test]
    fn test_url_keeps_base_path() {
        let client = FetchClient::new(MockTransport::new(), "https://api.example.com/api/v1").unwrap();
        assert_eq!(
            client.url("/products/aviator/").unwrap().as_str(),
            "https://api.example.com/api/v1/products/aviator/"
        );
        let client = FetchClient::new(MockTransport::new(), "https://api.example.com/api/v1/").unwrap();
        assert_eq!(
            client.url("faqs/").unwrap().as_str(),
            "https://api.example.com/api/v1/faqs/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            FetchClient::new(MockTransport::new(), "not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_query_is_encoded() {
        let client = FetchClient::new(MockTransport::new(), "http://api.test/api/v1").unwrap();
        let req = client
            .get("/products/")
            .query("search", "round & gold")
            .query_opt("category", None::<String>)
            .query("page", 2)
            .build()
            .unwrap();
        assert_eq!(
            req.url,
            "http://api.test/api/v1/products/?search=round+%26+gold&page=2"
        );
        assert_eq!(req.header_value("accept"), Some("application/json"));
    }

    #[test]
    fn test_send_json_body() {
        let mock = MockTransport::new().with_json(
            Method::Post,
            "/promo-codes/validate/",
            serde_json::json!({"valid": false}),
        );
        let client = FetchClient::new(&mock, "http://api.test/api/v1").unwrap();
        let resp = block_on(
            client
                .post("/promo-codes/validate/")
                .json(&serde_json::json!({"code": "SAVE10"}))
                .send(),
        )
        .unwrap();
        assert!(resp.is_success());

        let sent = &mock.requests()[0];
        assert_eq!(sent.json_body().unwrap()["code"], "SAVE10");
        assert_eq!(sent.header_value("content-type"), Some("application/json"));
    }
}
