//! Route table and request dispatch.

use std::time::Duration;

use shop_sdk::prelude::*;

use crate::pages::{self, error_page};
use crate::reply::Reply;
use crate::session::{StoreSession, Visit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Products,
    Product,
    Category,
    Blog,
    BlogPost,
    Faqs,
    Contact,
    ContactSubmit,
    Cart,
    CartAdd,
    CartUpdate,
    CartRemove,
    Checkout,
    CheckoutInformation,
    CheckoutPromo,
    PlaceOrder,
    OrderConfirmation,
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Products => "products",
            Route::Product => "product",
            Route::Category => "category",
            Route::Blog => "blog",
            Route::BlogPost => "blog_post",
            Route::Faqs => "faqs",
            Route::Contact => "contact",
            Route::ContactSubmit => "contact_submit",
            Route::Cart => "cart",
            Route::CartAdd => "cart_add",
            Route::CartUpdate => "cart_update",
            Route::CartRemove => "cart_remove",
            Route::Checkout => "checkout",
            Route::CheckoutInformation => "checkout_information",
            Route::CheckoutPromo => "checkout_promo",
            Route::PlaceOrder => "place_order",
            Route::OrderConfirmation => "order_confirmation",
        }
    }

    /// Catalog and content pages: identical for every visitor without a
    /// session, so they may be cached publicly.
    pub fn is_shared(&self) -> bool {
        matches!(
            self,
            Route::Home
                | Route::Products
                | Route::Product
                | Route::Category
                | Route::Blog
                | Route::BlogPost
                | Route::Faqs
                | Route::Contact
        )
    }
}

pub fn routes() -> Router<Route> {
    Router::new()
        .get("/", Route::Home)
        .get("/products", Route::Products)
        .get("/products/:slug", Route::Product)
        .get("/categories/:slug", Route::Category)
        .get("/blog", Route::Blog)
        .get("/blog/:slug", Route::BlogPost)
        .get("/faqs", Route::Faqs)
        .get("/contact", Route::Contact)
        .post("/contact", Route::ContactSubmit)
        .get("/cart", Route::Cart)
        .post("/cart/add", Route::CartAdd)
        .post("/cart/update", Route::CartUpdate)
        .post("/cart/remove", Route::CartRemove)
        .get("/checkout", Route::Checkout)
        .post("/checkout/information", Route::CheckoutInformation)
        .post("/checkout/promo", Route::CheckoutPromo)
        .post("/checkout/place-order", Route::PlaceOrder)
        .get("/order-confirmation/:id", Route::OrderConfirmation)
}

/// The storefront: configuration, backend API and session store.
pub struct App<T, S> {
    pub config: StoreConfig,
    pub api: StoreApi<T>,
    pub sessions: Session<StoreSession, S>,
    router: Router<Route>,
}

impl<T: HttpTransport, S: KvStore> App<T, S> {
    pub fn new(config: StoreConfig, transport: T, store: S) -> Result<Self, FetchError> {
        let api = StoreApi::connect(transport, &config.api_base_url)?;
        let sessions = Session::new(store, config.session_ttl_secs);
        Ok(Self {
            config,
            api,
            sessions,
            router: routes(),
        })
    }

    /// Persist the visit's session state.
    pub fn commit(&self, visit: &mut Visit) -> Result<(), PageError> {
        visit.save(&self.sessions, self.config.session_ttl_secs)
    }

    /// Route a request and produce its reply. Handler errors become error
    /// pages; nothing here fails.
    pub async fn dispatch(&self, ctx: &mut RequestContext) -> (Option<Route>, Reply<'_>) {
        let route = match self.router.lookup(ctx.method, &ctx.path) {
            RouteMatch::Found(route, params) => {
                ctx.params = params;
                *route
            }
            RouteMatch::MethodNotAllowed(allowed) => {
                let allow = allowed
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let error = PageError::MethodNotAllowed(ctx.method.as_str().to_string());
                let reply = error_page(&self.config, &error)
                    .with_header("allow", allow)
                    .with_header("cache-control", "no-store");
                return (None, reply);
            }
            RouteMatch::NotFound => {
                let error = PageError::NotFound(ctx.path.clone());
                let reply =
                    error_page(&self.config, &error).with_header("cache-control", "no-store");
                return (None, reply);
            }
        };

        let mut visit = match Visit::load(ctx, &self.sessions) {
            Ok(visit) => visit,
            Err(e) => return (Some(route), error_page(&self.config, &e)),
        };
        let shared = route.is_shared() && !visit.has_session();

        let ctx = &*ctx;
        let result = match route {
            Route::Home => pages::home::page(self, ctx).await,
            Route::Products => pages::listing::products(self, ctx).await,
            Route::Product => pages::product::page(self, ctx).await,
            Route::Category => pages::listing::category(self, ctx).await,
            Route::Blog => pages::blog::index(self, ctx).await,
            Route::BlogPost => pages::blog::post(self, ctx).await,
            Route::Faqs => pages::faqs::page(self, ctx).await,
            Route::Contact => pages::contact::page(self, ctx).await,
            Route::ContactSubmit => pages::contact::submit(self, ctx).await,
            Route::Cart => pages::cart::page(self, &visit),
            Route::CartAdd => pages::cart::add(self, ctx, &mut visit).await,
            Route::CartUpdate => pages::cart::update(self, ctx, &mut visit),
            Route::CartRemove => pages::cart::remove(self, ctx, &mut visit),
            Route::Checkout => pages::checkout::page(self, ctx, &visit).await,
            Route::CheckoutInformation => {
                pages::checkout::information(self, ctx, &mut visit).await
            }
            Route::CheckoutPromo => pages::checkout::promo(self, ctx, &mut visit).await,
            Route::PlaceOrder => pages::checkout::place_order(self, &mut visit).await,
            Route::OrderConfirmation => pages::order::confirmation(self, ctx).await,
        };

        let mut reply = match result {
            Ok(reply) => reply,
            Err(e) => error_page(&self.config, &e),
        };

        if let Some(page) = reply.page.as_mut() {
            // HEAD sends no body, so the flash waits for the next GET.
            if ctx.method == Method::Get {
                match visit.take_flash(&self.sessions, self.config.session_ttl_secs) {
                    Ok(flash) => page.flash = flash,
                    Err(e) => return (Some(route), error_page(&self.config, &e)),
                }
            }
            page.cart_count = visit.state.cart.item_count();
        }

        let policy = if shared && reply.status.is_success() && reply.page.is_some() {
            CachePolicy::public(Duration::from_secs(60))
                .with_swr(Duration::from_secs(300))
                .vary_on("Cookie")
        } else {
            CachePolicy::private_no_store().vary_on("Cookie")
        };
        for (name, value) in policy.headers() {
            reply = reply.with_header(&name, value);
        }
        if let Some(cookie) = visit.set_cookie.take() {
            reply = reply.with_header("set-cookie", cookie);
        }

        (Some(route), reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table() {
        let router = routes();
        assert!(matches!(
            router.lookup(Method::Get, "/products/aviator"),
            RouteMatch::Found(Route::Product, _)
        ));
        assert!(matches!(
            router.lookup(Method::Post, "/checkout/place-order"),
            RouteMatch::Found(Route::PlaceOrder, _)
        ));
        assert!(matches!(
            router.lookup(Method::Head, "/faqs"),
            RouteMatch::Found(Route::Faqs, _)
        ));
        assert_eq!(
            router.lookup(Method::Delete, "/contact"),
            RouteMatch::MethodNotAllowed(vec![Method::Get, Method::Post])
        );
        assert_eq!(router.lookup(Method::Get, "/wishlist"), RouteMatch::NotFound);
    }

    #[test]
    fn test_shared_routes() {
        assert!(Route::Product.is_shared());
        assert!(!Route::Cart.is_shared());
        assert!(!Route::OrderConfirmation.is_shared());
    }
}
