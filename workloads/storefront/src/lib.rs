//! NepGlass storefront.
//!
//! A single Spin component serving the whole shop: catalog and content pages
//! streamed shell-first, a session-backed cart, and a checkout that places
//! cash-on-delivery orders with the commerce backend.
//!
//! Every request goes through [`App::dispatch`], which routes it, runs the
//! page handler against the backend and the session store, and returns a
//! [`reply::Reply`]. The component entry point turns that reply into a
//! streamed HTTP response and reports logs and metrics for it.

pub mod app;
pub mod layout;
pub mod pages;
pub mod reply;
pub mod session;

pub use app::{App, Route};

use shop_sdk::prelude::*;

use crate::reply::Reply;

/// Name reported in logs and metrics.
pub const WORKLOAD: &str = "storefront";

/// Response headers for a reply: content type, request id, then whatever the
/// route set (cache policy, cookies, redirects).
pub fn response_headers(reply: &Reply<'_>, request_id: &RequestId) -> Vec<(String, String)> {
    let mut headers = Vec::with_capacity(reply.headers.len() + 2);
    if reply.page.is_some() {
        headers.push((
            "content-type".to_string(),
            "text/html; charset=utf-8".to_string(),
        ));
    }
    headers.push(("x-request-id".to_string(), request_id.to_string()));
    headers.extend(reply.headers.iter().cloned());
    headers
}

/// Record streamed sections; sections that fell back are logged.
pub fn record_sections(
    metrics: &mut MetricsCollector,
    logger: &StructuredLogger,
    sections: &[SectionOutput],
) {
    for section in sections {
        metrics.record_section_sent(&section.name, section.html.len(), section.used_fallback);
        if let Some(error) = &section.error {
            logger
                .warn_builder("Section rendered without its data")
                .field("section", section.name.clone())
                .field("error", error.clone())
                .field_bool("fallback", section.used_fallback)
                .emit();
        }
    }
}

/// Record the backend calls made while serving the request.
pub fn record_calls(metrics: &mut MetricsCollector, logger: &StructuredLogger, calls: Vec<CallRecord>) {
    for call in calls {
        if let Some(error) = &call.error {
            logger
                .warn_builder("Backend call failed")
                .field("dependency", call.tag.name())
                .field("method", call.method.as_str())
                .field("url", call.url.clone())
                .field("error", error.clone())
                .duration_ms("duration_ms", call.duration)
                .emit();
        } else {
            logger
                .debug_builder("Backend call")
                .field("dependency", call.tag.name())
                .field("url", call.url.clone())
                .duration_ms("duration_ms", call.duration)
                .emit();
        }
        metrics.record_dependency(call.tag.name(), &call.url, call.duration, call.status, call.error);
    }
}

#[cfg(target_arch = "wasm32")]
mod component {
    use spin_sdk::http::{Fields, IncomingRequest, Method as SpinMethod, OutgoingResponse, ResponseOutparam};
    use spin_sdk::http_component;

    use shop_sdk::prelude::*;

    use crate::reply::stream_page;
    use crate::{record_calls, record_sections, response_headers, App, WORKLOAD};

    fn method_of(method: &SpinMethod) -> Option<Method> {
        match method {
            SpinMethod::Get => Some(Method::Get),
            SpinMethod::Head => Some(Method::Head),
            SpinMethod::Post => Some(Method::Post),
            SpinMethod::Put => Some(Method::Put),
            SpinMethod::Delete => Some(Method::Delete),
            SpinMethod::Patch => Some(Method::Patch),
            SpinMethod::Options => Some(Method::Options),
            _ => None,
        }
    }

    /// Bodiless response for failures before the app is up.
    fn plain(response_out: ResponseOutparam, status: u16) {
        let response = OutgoingResponse::new(Fields::new());
        let _ = response.set_status_code(status);
        response_out.set(response);
    }

    #[http_component]
    async fn handle(req: IncomingRequest, response_out: ResponseOutparam) {
        let Some(method) = method_of(&req.method()) else {
            plain(response_out, 405);
            return;
        };

        let path = req.path_with_query().unwrap_or_default();
        let mut ctx = RequestContext::new(method, &path);
        for (name, value) in req.headers().entries() {
            ctx = ctx.with_header(&name, String::from_utf8_lossy(&value).into_owned());
        }
        let upstream_id = ctx
            .header("x-request-id")
            .filter(|id| !id.is_empty())
            .map(|id| RequestId::from_string(id.to_string()));
        if let Some(id) = upstream_id {
            ctx = ctx.with_request_id(id);
        }
        let request_id = ctx.request_id.clone();

        let config = match StoreConfig::from_lookup(|name| spin_sdk::variables::get(name).ok()) {
            Ok(config) => config,
            Err(e) => {
                StructuredLogger::new(request_id)
                    .with_workload(WORKLOAD)
                    .error_builder("Invalid configuration")
                    .field("error", format!("{:#}", e))
                    .emit();
                plain(response_out, 500);
                return;
            }
        };

        let logger = StructuredLogger::new(request_id.clone())
            .with_workload(WORKLOAD)
            .with_route(&ctx.path)
            .with_min_level(LogLevel::parse(&config.log_level))
            .with_format(LogFormat::parse(&config.log_format));

        if !method.is_read() {
            match req.into_body().await {
                Ok(body) => ctx = ctx.with_form_body(&body),
                Err(e) => {
                    logger
                        .warn_builder("Unreadable request body")
                        .field("error", format!("{:?}", e))
                        .emit();
                    plain(response_out, 400);
                    return;
                }
            }
        }

        let store = match SpinKvStore::open(&config.kv_store) {
            Ok(store) => store,
            Err(e) => {
                logger
                    .error_builder("Session store unavailable")
                    .field("store", config.kv_store.clone())
                    .field("error", e.to_string())
                    .emit();
                plain(response_out, 500);
                return;
            }
        };
        let app = match App::new(config, SpinTransport, store) {
            Ok(app) => app,
            Err(e) => {
                logger
                    .error_builder("Backend client setup failed")
                    .field("error", e.to_string())
                    .emit();
                plain(response_out, 500);
                return;
            }
        };

        let mut metrics = MetricsCollector::new(request_id.clone());
        logger
            .info_builder("Request started")
            .field("method", method.as_str())
            .field("path", ctx.path.clone())
            .emit();

        let (route, reply) = app.dispatch(&mut ctx).await;
        metrics.set_route(route.map(|r| r.name()).unwrap_or("unmatched"));
        let status = reply.status.as_u16();

        let header_list: Vec<(String, Vec<u8>)> = response_headers(&reply, &request_id)
            .into_iter()
            .map(|(name, value)| (name, value.into_bytes()))
            .collect();
        let headers = match Fields::from_list(&header_list) {
            Ok(headers) => headers,
            Err(e) => {
                logger
                    .error_builder("Invalid response headers")
                    .field("error", format!("{:?}", e))
                    .emit();
                plain(response_out, 500);
                return;
            }
        };
        let response = OutgoingResponse::new(headers);
        let _ = response.set_status_code(status);

        match reply.page {
            Some(page) if method != Method::Head => {
                let body = response.take_body();
                response_out.set(response);
                let mut sink = StreamingSink::new(body, ctx.timing.clone());

                match stream_page(&app.config, page, &mut sink).await {
                    Ok(sections) => {
                        let section_bytes: usize = sections.iter().map(|s| s.html.len()).sum();
                        metrics.record_shell_sent(sink.bytes_sent().saturating_sub(section_bytes));
                        record_sections(&mut metrics, &logger, &sections);
                        let timing = sink.timing();
                        let mut streamed = logger
                            .debug_builder("Page streamed")
                            .field_u64("bytes", sink.bytes_sent() as u64);
                        if let Some(shell) = timing.time_to_shell() {
                            streamed = streamed.duration_ms("time_to_shell_ms", shell);
                        }
                        if let Some(first) = timing.time_to_first_section() {
                            streamed = streamed.duration_ms("time_to_first_section_ms", first);
                        }
                        streamed.emit();
                    }
                    Err(e) => {
                        logger
                            .error_builder("Streaming failed")
                            .field("error", e.to_string())
                            .emit();
                    }
                }
            }
            _ => response_out.set(response),
        }

        record_calls(&mut metrics, &logger, app.api.take_calls());
        let summary = metrics.finalize(Some(status));
        logger
            .info_builder("Request completed")
            .field_u64("status", u64::from(status))
            .field("metrics", summary.to_summary())
            .emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::stream_page;
    use futures::executor::block_on;
    use http::StatusCode;
    use serde_json::json;

    type TestApp<'m> = App<&'m MockTransport, MemoryStore>;

    struct Served {
        status: StatusCode,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl Served {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        }

        /// `sid=...` from the `Set-Cookie` header.
        fn session_cookie(&self) -> String {
            self.header("set-cookie")
                .and_then(|c| c.split(';').next())
                .unwrap_or_default()
                .to_string()
        }
    }

    fn app(mock: &MockTransport) -> TestApp<'_> {
        let config = StoreConfig {
            api_base_url: "http://api.test/api/v1".to_string(),
            ..StoreConfig::default()
        };
        App::new(config, mock, MemoryStore::new()).unwrap()
    }

    fn serve(app: &TestApp<'_>, ctx: RequestContext) -> Served {
        block_on(async {
            let mut ctx = ctx;
            let (_, reply) = app.dispatch(&mut ctx).await;
            let status = reply.status;
            let headers = response_headers(&reply, &ctx.request_id);
            let body = match reply.page {
                Some(page) => {
                    let mut sink = StreamingSink::new(Vec::new(), TimingContext::new());
                    stream_page(&app.config, page, &mut sink).await.unwrap();
                    String::from_utf8(sink.into_inner().concat()).unwrap()
                }
                None => String::new(),
            };
            Served {
                status,
                headers,
                body,
            }
        })
    }

    fn get(app: &TestApp<'_>, path: &str, cookie: &str) -> Served {
        let mut ctx = RequestContext::new(Method::Get, path);
        if !cookie.is_empty() {
            ctx = ctx.with_header("cookie", cookie);
        }
        serve(app, ctx)
    }

    fn post(app: &TestApp<'_>, path: &str, form: &str, cookie: &str) -> Served {
        let mut ctx = RequestContext::new(Method::Post, path).with_form_body(form.as_bytes());
        if !cookie.is_empty() {
            ctx = ctx.with_header("cookie", cookie);
        }
        serve(app, ctx)
    }

    fn aviator() -> serde_json::Value {
        json!({
            "id": 7,
            "name": "Aviator Classic",
            "slug": "aviator",
            "price": "2500.00",
            "stock": 5,
            "track_stock": true,
            "weight": "150 g",
            "category": {"id": 2, "name": "Sunglasses", "slug": "sunglasses"}
        })
    }

    fn page_of(results: Vec<serde_json::Value>) -> serde_json::Value {
        json!({"count": results.len(), "next": null, "previous": null, "results": results})
    }

    #[test]
    fn test_home_streams_with_failed_section() {
        let mock = MockTransport::new()
            .with_json(Method::Get, "/categories/", json!([]))
            .with_json(Method::Get, "/products/", page_of(vec![aviator()]))
            .with_failure(Method::Get, "/testimonials/")
            .with_json(Method::Get, "/faqs/", json!([]));
        let app = app(&mock);

        let served = get(&app, "/", "");
        assert_eq!(served.status, StatusCode::OK);
        assert_eq!(served.header("content-type"), Some("text/html; charset=utf-8"));
        assert!(served.header("cache-control").unwrap().starts_with("public"));
        assert!(served.body.contains("Premium Eyewear"));
        assert!(served.body.contains("Aviator Classic"));
        assert!(!served.body.contains("See Through Our Customers"));
        assert!(served.body.ends_with("</html>"));

        let mut metrics = MetricsCollector::new(RequestId::generate());
        let logger = StructuredLogger::new(RequestId::generate()).with_min_level(LogLevel::Error);
        record_calls(&mut metrics, &logger, app.api.take_calls());
        assert_eq!(metrics.failed_dependencies(), 1);
    }

    #[test]
    fn test_missing_product_is_404() {
        let mock = MockTransport::new();
        let app = app(&mock);

        let served = get(&app, "/products/no-such-frame", "");
        assert_eq!(served.status, StatusCode::NOT_FOUND);
        assert!(served.body.contains("Page not found"));
        assert_eq!(served.header("cache-control"), Some("private, no-store"));
    }

    #[test]
    fn test_unknown_method_is_405() {
        let mock = MockTransport::new();
        let app = app(&mock);

        let served = serve(&app, RequestContext::new(Method::Delete, "/contact"));
        assert_eq!(served.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(served.header("allow"), Some("GET, POST"));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_add_to_cart_sets_session() {
        let mock = MockTransport::new().with_json(Method::Get, "/products/aviator/", aviator());
        let app = app(&mock);

        let added = post(&app, "/cart/add", "slug=aviator&quantity=2", "");
        assert_eq!(added.status, StatusCode::SEE_OTHER);
        assert_eq!(added.header("location"), Some("/cart"));
        let cookie = added.session_cookie();
        assert!(cookie.starts_with("sid="));

        // HEAD leaves the flash for the next GET.
        let head = serve(
            &app,
            RequestContext::new(Method::Head, "/cart").with_header("cookie", cookie.as_str()),
        );
        assert_eq!(head.status, StatusCode::OK);
        assert!(head.header("set-cookie").is_none());

        let cart = get(&app, "/cart", &cookie);
        assert_eq!(cart.status, StatusCode::OK);
        assert!(cart.body.contains("Added Aviator Classic to your cart."));
        assert!(cart.body.contains(r#"<span class="cart-count">2</span>"#));
        assert!(cart.body.contains("Rs. 5000.00"));
        // Consuming the flash writes the session, which refreshes the cookie.
        assert_eq!(cart.session_cookie(), cookie);

        // The flash is shown once.
        let again = get(&app, "/cart", &cookie);
        assert!(!again.body.contains("Added Aviator Classic"));
        assert!(again.header("set-cookie").is_none());

        let too_many = post(&app, "/cart/add", "slug=aviator&quantity=4", &cookie);
        assert_eq!(too_many.header("location"), Some("/products/aviator"));
        let flashed = get(&app, "/cart", &cookie);
        assert!(flashed.body.contains("Only 5 of Aviator Classic available."));
    }

    #[test]
    fn test_checkout_places_order() {
        let mock = MockTransport::new()
            .with_json(Method::Get, "/products/aviator/", aviator())
            .with_json(Method::Get, "/delivery-charges/cities/", json!(["Kathmandu", "Pokhara"]))
            .with_json(
                Method::Get,
                "/delivery-charges/calculate/",
                json!({"delivery_charge": "150.00"}),
            )
            .with_json(
                Method::Post,
                "/orders/",
                json!({
                    "id": 41,
                    "customer_name": "Sita Rai",
                    "customer_email": "sita@example.com",
                    "total_amount": "5150.00"
                }),
            );
        let app = app(&mock);

        let cookie = post(&app, "/cart/add", "slug=aviator&quantity=2", "").session_cookie();

        let info_page = get(&app, "/checkout", &cookie);
        assert!(info_page.body.contains(r#"<option value="Pokhara">Pokhara</option>"#));

        let invalid = post(&app, "/checkout/information", "email=sita%40example.com", &cookie);
        assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(invalid.body.contains("Select a city or district"));

        let form = "email=sita%40example.com&first_name=Sita&last_name=Rai\
                    &address=Thamel&city=Kathmandu&phone=9801234567";
        let saved = post(&app, "/checkout/information", form, &cookie);
        assert_eq!(saved.header("location"), Some("/checkout"));

        let review = get(&app, "/checkout", &cookie);
        assert!(review.body.contains("Payment &amp; Review"));
        assert!(review.body.contains("Rs. 150.00"));
        assert!(review.body.contains("Rs. 5150.00"));

        let placed = post(&app, "/checkout/place-order", "", &cookie);
        assert_eq!(placed.status, StatusCode::SEE_OTHER);
        assert_eq!(placed.header("location"), Some("/order-confirmation/41"));

        let orders = mock.requests_to("/api/v1/orders/");
        assert_eq!(orders.len(), 1);
        let sent: serde_json::Value =
            serde_json::from_slice(orders[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["city"], "Kathmandu");
        assert_eq!(sent["total_amount"], "5150.00");
        assert_eq!(sent["items"][0]["quantity"], 2);

        let cart = get(&app, "/cart", &cookie);
        assert!(cart.body.contains("Your cart is empty"));
    }

    #[test]
    fn test_sold_out_product_is_not_added() {
        let mut product = aviator();
        product["stock"] = json!(0);
        product["track_stock"] = json!(false);
        let mock = MockTransport::new().with_json(Method::Get, "/products/aviator/", product);
        let app = app(&mock);

        let refused = post(&app, "/cart/add", "slug=aviator&quantity=1", "");
        assert_eq!(refused.header("location"), Some("/products/aviator"));

        let cart = get(&app, "/cart", &refused.session_cookie());
        assert!(cart.body.contains("Aviator Classic is out of stock."));
        assert!(cart.body.contains("Your cart is empty"));
    }

    fn checkout_mock() -> MockTransport {
        MockTransport::new()
            .with_json(Method::Get, "/products/aviator/", aviator())
            .with_json(Method::Get, "/delivery-charges/cities/", json!(["Kathmandu"]))
            .with_json(
                Method::Get,
                "/delivery-charges/calculate/",
                json!({"delivery_charge": "150.00"}),
            )
    }

    const SHIPPING_FORM: &str = "email=sita%40example.com&first_name=Sita&last_name=Rai\
                                 &address=Thamel&city=Kathmandu&phone=9801234567";

    #[test]
    fn test_promo_apply_remove_and_order() {
        let mock = checkout_mock()
            .with_json(
                Method::Post,
                "/promo-codes/validate/",
                json!({
                    "valid": true,
                    "promo_code": {"id": 3, "code": "SAVE10", "discount_percentage": "10.00"}
                }),
            )
            .with_json(
                Method::Post,
                "/orders/",
                json!({
                    "id": 42,
                    "customer_name": "Sita Rai",
                    "customer_email": "sita@example.com",
                    "total_amount": "4650.00"
                }),
            );
        let app = app(&mock);

        let cookie = post(&app, "/cart/add", "slug=aviator&quantity=2", "").session_cookie();
        post(&app, "/checkout/information", SHIPPING_FORM, &cookie);

        let applied = post(&app, "/checkout/promo", "code=SAVE10", &cookie);
        assert_eq!(applied.header("location"), Some("/checkout"));
        let review = get(&app, "/checkout", &cookie);
        assert!(review.body.contains("Promo code SAVE10 applied: 10% off."));
        assert!(review.body.contains("<span>-Rs. 500.00</span>"));
        assert!(review.body.contains("Rs. 4650.00"));

        post(&app, "/checkout/promo", "action=remove", &cookie);
        let review = get(&app, "/checkout", &cookie);
        assert!(review.body.contains("Promo code removed."));
        assert!(!review.body.contains("-Rs. 500.00"));
        assert!(review.body.contains("Rs. 5150.00"));

        post(&app, "/checkout/promo", "code=SAVE10", &cookie);
        let placed = post(&app, "/checkout/place-order", "", &cookie);
        assert_eq!(placed.header("location"), Some("/order-confirmation/42"));

        let orders = mock.requests_to("/api/v1/orders/");
        let sent: serde_json::Value =
            serde_json::from_slice(orders[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["promo_code"], 3);
        assert_eq!(sent["discount_amount"], "500.00");
        assert_eq!(sent["delivery_charge"], "150.00");
        assert_eq!(sent["total_amount"], "4650.00");
    }

    #[test]
    fn test_promo_rejections() {
        let mock = checkout_mock().with_status(
            Method::Post,
            "/promo-codes/validate/",
            400,
            json!({"valid": false, "message": "This code has expired."}),
        );
        let app = app(&mock);
        let cookie = post(&app, "/cart/add", "slug=aviator&quantity=1", "").session_cookie();

        let rejected = post(&app, "/checkout/promo", "code=OLD", &cookie);
        assert_eq!(rejected.status, StatusCode::SEE_OTHER);
        let page = get(&app, "/checkout", &cookie);
        assert!(page.body.contains("This code has expired."));

        post(&app, "/checkout/promo", "code=", &cookie);
        let page = get(&app, "/checkout", &cookie);
        assert!(page.body.contains("Enter a promo code."));
        assert_eq!(mock.requests_to("/api/v1/promo-codes/validate/").len(), 1);
    }

    const CONTACT_FORM: &str = "name=Sita&email=sita%40example.com&subject=Frames&message=Hello";

    #[test]
    fn test_contact_submission_sent() {
        let mock = MockTransport::new().with_json(Method::Post, "/contact/", json!({"id": 1}));
        let app = app(&mock);

        let sent = post(&app, "/contact", CONTACT_FORM, "");
        assert_eq!(sent.status, StatusCode::SEE_OTHER);
        assert_eq!(sent.header("location"), Some("/contact?sent=1"));

        let requests = mock.requests_to("/api/v1/contact/");
        let body: serde_json::Value =
            serde_json::from_slice(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["email"], "sita@example.com");
        assert_eq!(body["message"], "Subject: Frames\n\nHello");

        let thanks = get(&app, "/contact?sent=1", "");
        assert!(thanks.body.contains("Your message has been sent"));
    }

    #[test]
    fn test_contact_backend_errors() {
        let mock = MockTransport::new().with_status(
            Method::Post,
            "/contact/",
            400,
            json!({"detail": "Too many messages from this address."}),
        );
        let app = app(&mock);
        let rejected = post(&app, "/contact", CONTACT_FORM, "");
        assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(rejected.body.contains("Too many messages from this address."));
        assert!(rejected.body.contains(r#"name="name" value="Sita""#));

        let mock = MockTransport::new().with_status(Method::Post, "/contact/", 503, json!({}));
        let app = self::app(&mock);
        let down = post(&app, "/contact", CONTACT_FORM, "");
        assert_eq!(down.status, StatusCode::BAD_GATEWAY);
        assert!(down.body.contains("send your message right now"));
    }

    #[test]
    fn test_contact_validation() {
        let mock = MockTransport::new();
        let app = app(&mock);

        let served = post(&app, "/contact", "name=&email=bad&message=", "");
        assert_eq!(served.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(served.body.contains("Enter a valid email address"));
        assert!(mock.requests().is_empty());
    }
}
