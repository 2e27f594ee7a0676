//! Typed calls to each backend endpoint.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use shop_commerce::checkout::{needs_quote, DeliveryQuote, Order, OrderRequest, PromoValidation};
use shop_commerce::content::{BlogPost, ContactMessage, Faq, Testimonial};
use shop_commerce::listing::{Paginated, ProductFilters, MAX_PRICE, MIN_PRICE};
use shop_commerce::{catalog::*, OrderId};
use shop_core::Method;

use crate::client::{ClientRequest, FetchClient};
use crate::{DependencyTag, FetchError, HttpTransport, Response};

/// One backend call, as seen by the page for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub tag: DependencyTag,
    pub method: Method,
    pub url: String,
    pub status: Option<u16>,
    pub duration: Duration,
    pub error: Option<String>,
}

impl CallRecord {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Some collection endpoints answer with a bare array, others with the
/// paginated envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrPage<T> {
    List(Vec<T>),
    Page(Paginated<T>),
}

impl<T> ListOrPage<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListOrPage::List(items) => items,
            ListOrPage::Page(page) => page.results,
        }
    }
}

/// The commerce backend API.
pub struct StoreApi<T> {
    client: FetchClient<T>,
    calls: Mutex<Vec<CallRecord>>,
}

impl<T: HttpTransport> StoreApi<T> {
    pub fn new(client: FetchClient<T>) -> Self {
        Self {
            client,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Build from a transport and the API base URL.
    pub fn connect(transport: T, base_url: &str) -> Result<Self, FetchError> {
        Ok(Self::new(FetchClient::new(transport, base_url)?))
    }

    pub fn client(&self) -> &FetchClient<T> {
        &self.client
    }

    /// Drain the calls made so far.
    pub fn take_calls(&self) -> Vec<CallRecord> {
        self.calls
            .lock()
            .map(|mut calls| std::mem::take(&mut *calls))
            .unwrap_or_default()
    }

    async fn execute(
        &self,
        tag: DependencyTag,
        request: ClientRequest<'_, T>,
    ) -> Result<Response, FetchError> {
        let request = request.build()?;
        let method = request.method;
        let url = request.url.clone();
        let started = Instant::now();

        let result = self
            .client
            .transport()
            .send(request)
            .await
            .and_then(Response::error_for_status);

        let record = CallRecord {
            tag,
            method,
            url,
            status: match &result {
                Ok(resp) => Some(resp.status),
                Err(e) => e.status(),
            },
            duration: started.elapsed(),
            error: result.as_ref().err().map(|e| e.to_string()),
        };
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(record);
        }

        result
    }

    async fn fetch<R: DeserializeOwned>(
        &self,
        tag: DependencyTag,
        request: ClientRequest<'_, T>,
    ) -> Result<R, FetchError> {
        self.execute(tag, request).await?.json()
    }

    /// `GET /products/` with the listing filters.
    pub async fn list_products(
        &self,
        filters: &ProductFilters,
        page_size: u32,
    ) -> Result<Paginated<Product>, FetchError> {
        let min = filters.price.min();
        let max = filters.price.max();
        let request = self
            .client
            .get("/products/")
            .query("page", filters.page.max(1))
            .query("page_size", page_size)
            .query_opt("category", filters.category.as_deref())
            .query_opt("sub_category", filters.sub_category.as_deref())
            .query_opt("min_price", (min != MIN_PRICE).then_some(min))
            .query_opt("max_price", (max != MAX_PRICE).then_some(max))
            .query_opt("ordering", filters.sort.ordering())
            .query_opt("search", filters.search.as_deref());
        self.fetch(DependencyTag::Catalog, request).await
    }

    /// Products sharing a category, excluding `exclude`, at most `limit`.
    pub async fn related_products(
        &self,
        category_id: i64,
        exclude: shop_commerce::ProductId,
        limit: usize,
    ) -> Result<Vec<Product>, FetchError> {
        let request = self
            .client
            .get("/products/")
            .query("category_id", category_id)
            .query("page_size", limit + 1);
        let page: Paginated<Product> = self.fetch(DependencyTag::Catalog, request).await?;
        Ok(page
            .results
            .into_iter()
            .filter(|p| p.id != exclude)
            .take(limit)
            .collect())
    }

    pub async fn product(&self, slug: &str) -> Result<Product, FetchError> {
        let request = self.client.get(&format!("/products/{}/", slug));
        self.fetch(DependencyTag::Catalog, request).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, FetchError> {
        let list: ListOrPage<Category> = self
            .fetch(DependencyTag::Catalog, self.client.get("/categories/"))
            .await?;
        Ok(list.into_vec())
    }

    pub async fn category(&self, slug: &str) -> Result<Category, FetchError> {
        let request = self.client.get(&format!("/categories/{}/", slug));
        self.fetch(DependencyTag::Catalog, request).await
    }

    pub async fn subcategories(&self, category: &str) -> Result<Vec<SubCategory>, FetchError> {
        let request = self.client.get("/subcategories/").query("category", category);
        let list: ListOrPage<SubCategory> = self.fetch(DependencyTag::Catalog, request).await?;
        Ok(list.into_vec())
    }

    pub async fn blogs(&self, page: u32, page_size: u32) -> Result<Paginated<BlogPost>, FetchError> {
        let request = self
            .client
            .get("/blogs/")
            .query("page", page.max(1))
            .query("page_size", page_size);
        self.fetch(DependencyTag::Content, request).await
    }

    pub async fn blog(&self, slug: &str) -> Result<BlogPost, FetchError> {
        let request = self.client.get(&format!("/blogs/{}/", slug));
        self.fetch(DependencyTag::Content, request).await
    }

    pub async fn testimonials(&self) -> Result<Vec<Testimonial>, FetchError> {
        let list: ListOrPage<Testimonial> = self
            .fetch(DependencyTag::Content, self.client.get("/testimonials/"))
            .await?;
        Ok(list.into_vec())
    }

    pub async fn faqs(&self) -> Result<Vec<Faq>, FetchError> {
        let list: ListOrPage<Faq> = self
            .fetch(DependencyTag::Content, self.client.get("/faqs/"))
            .await?;
        Ok(list.into_vec())
    }

    /// `POST /contact/`; any 2xx is success.
    pub async fn submit_contact(&self, message: &ContactMessage) -> Result<(), FetchError> {
        let request = self.client.post("/contact/").json(message);
        self.execute(DependencyTag::Contact, request).await?;
        Ok(())
    }

    /// Validate a promo code. A 4xx answer carrying the validation shape
    /// (`{"valid": false, "message": ..}`) is a normal rejection.
    pub async fn validate_promo(&self, code: &str) -> Result<PromoValidation, FetchError> {
        let request = self
            .client
            .post("/promo-codes/validate/")
            .json(&serde_json::json!({ "code": code.trim() }));
        match self.execute(DependencyTag::Promo, request).await {
            Ok(resp) => resp.json(),
            Err(FetchError::HttpError {
                status, message, ..
            }) if (400..500).contains(&status) => {
                Ok(serde_json::from_str(&message).unwrap_or(PromoValidation {
                    valid: false,
                    message: None,
                    promo_code: None,
                }))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delivery_cities(&self) -> Result<Vec<String>, FetchError> {
        self.fetch(
            DependencyTag::Delivery,
            self.client.get("/delivery-charges/cities/"),
        )
        .await
    }

    /// Delivery charge for a city and total weight. No call is made until a
    /// city is chosen.
    pub async fn delivery_charge(&self, city: &str, weight: f64) -> Result<DeliveryQuote, FetchError> {
        if !needs_quote(city) {
            return Ok(DeliveryQuote::none());
        }
        let request = self
            .client
            .get("/delivery-charges/calculate/")
            .query("city_district", city.trim())
            .query("weight", weight);
        self.fetch(DependencyTag::Delivery, request).await
    }

    pub async fn create_order(&self, order: &OrderRequest) -> Result<Order, FetchError> {
        let request = self.client.post("/orders/").json(order);
        self.fetch(DependencyTag::Orders, request).await
    }

    pub async fn order(&self, id: OrderId) -> Result<Order, FetchError> {
        let request = self.client.get(&format!("/orders/{}/", id));
        self.fetch(DependencyTag::Orders, request).await
    }
}
