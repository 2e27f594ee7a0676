//! Checkout: shipping information, payment review, promo codes and order
//! placement.
//!
//! The draft lives in the session. `GET /checkout` renders whichever step the
//! draft is on; each form posts to an action that updates the draft and
//! redirects back.

use http::StatusCode;
use shop_sdk::prelude::*;
use shop_sdk::shop_commerce::checkout::NO_CITY;

use crate::app::App;
use crate::layout::field_error;
use crate::pages::cart::render_line_options;
use crate::pages::commerce_error;
use crate::reply::{Page, Reply};
use crate::session::{Flash, Visit};

pub async fn page<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
    visit: &Visit,
) -> Result<Reply<'a>, PageError> {
    let cart = &visit.state.cart;
    if cart.is_empty() {
        return Ok(empty_checkout(app));
    }

    let mut draft = visit.state.checkout.clone();
    if ctx.query_param("step") == Some("information") {
        draft.edit_information();
    }

    match (draft.step, draft.shipping.as_ref()) {
        (CheckoutStep::Payment, Some(shipping)) => {
            let (quote, notice) = match quote_delivery(&app.api, shipping, cart).await {
                Ok(quote) => (quote, None),
                Err(_) => (
                    DeliveryQuote::none(),
                    Some("We couldn't calculate delivery right now. It will be confirmed when we call to verify your order."),
                ),
            };
            let subtotal = cart.total_price().map_err(commerce_error)?;
            let totals =
                CheckoutTotals::compute(subtotal, quote.delivery_charge, draft.promo.as_ref())
                    .map_err(commerce_error)?;
            let main = render_review(shipping, draft.promo.as_ref(), notice);
            Ok(checkout_page(app, CheckoutStep::Payment, main, cart, Some(&totals)))
        }
        _ => {
            let info = draft.shipping.clone().unwrap_or_default();
            let cities = app.api.delivery_cities().await.ok();
            let main = render_information_form(&info, &[], cities.as_deref());
            Ok(checkout_page(app, CheckoutStep::Information, main, cart, None))
        }
    }
}

/// `POST /checkout/information`.
pub async fn information<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
    visit: &mut Visit,
) -> Result<Reply<'a>, PageError> {
    if visit.state.cart.is_empty() {
        return Ok(Reply::redirect("/cart"));
    }

    let info = ShippingInfo {
        email: ctx.form_text("email"),
        first_name: ctx.form_text("first_name"),
        last_name: ctx.form_text("last_name"),
        address: ctx.form_text("address"),
        city: ctx.form_text("city"),
        phone: ctx.form_text("phone"),
        note: ctx.form_text("note"),
    };

    let errors = info.errors();
    if !errors.is_empty() {
        let cities = app.api.delivery_cities().await.ok();
        let main = render_information_form(&info, &errors, cities.as_deref());
        return Ok(checkout_page(
            app,
            CheckoutStep::Information,
            main,
            &visit.state.cart,
            None,
        )
        .with_status(StatusCode::UNPROCESSABLE_ENTITY));
    }

    visit
        .state
        .checkout
        .submit_information(info)
        .map_err(commerce_error)?;
    app.commit(visit)?;
    Ok(Reply::redirect("/checkout"))
}

/// `POST /checkout/promo`: apply `code`, or `action=remove`.
pub async fn promo<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
    visit: &mut Visit,
) -> Result<Reply<'a>, PageError> {
    if ctx.form_field("action") == Some("remove") {
        if visit.state.checkout.remove_promo() {
            visit.state.flash = Some(Flash::success("Promo code removed."));
        }
        app.commit(visit)?;
        return Ok(Reply::redirect("/checkout"));
    }

    let code = ctx.form_text("code");
    let flash = if code.is_empty() {
        Flash::error("Enter a promo code.")
    } else {
        match app.api.validate_promo(&code).await {
            Ok(validation) => match validation.into_applied() {
                Ok(applied) => {
                    let flash = Flash::success(format!(
                        "Promo code {} applied: {}.",
                        applied.code,
                        applied.label()
                    ));
                    visit.state.checkout.apply_promo(applied);
                    flash
                }
                Err(reason) => Flash::error(reason),
            },
            Err(e) if e.is_client_error() => Flash::error(
                e.backend_message()
                    .unwrap_or_else(|| "Invalid promo code".to_string()),
            ),
            Err(_) => Flash::error("We couldn't check that code right now. Please try again."),
        }
    };

    visit.state.flash = Some(flash);
    app.commit(visit)?;
    Ok(Reply::redirect("/checkout"))
}

/// `POST /checkout/place-order`: quote delivery, total the cart and create
/// the order. The cart and draft are cleared only once the backend accepts.
pub async fn place_order<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    visit: &mut Visit,
) -> Result<Reply<'a>, PageError> {
    if visit.state.cart.is_empty() {
        visit.state.flash = Some(Flash::error("Your cart is empty."));
        app.commit(visit)?;
        return Ok(Reply::redirect("/cart"));
    }
    let shipping = match visit.state.checkout.ready_shipping() {
        Ok(shipping) => shipping.clone(),
        Err(_) => {
            visit.state.flash = Some(Flash::error("Please enter your shipping details first."));
            app.commit(visit)?;
            return Ok(Reply::redirect("/checkout"));
        }
    };

    let cart = &visit.state.cart;
    let promo = visit.state.checkout.promo.clone();
    let quote = quote_delivery(&app.api, &shipping, cart)
        .await
        .map_err(|e| PageError::Upstream(e.to_string()))?;
    let subtotal = cart.total_price().map_err(commerce_error)?;
    let totals = CheckoutTotals::compute(subtotal, quote.delivery_charge, promo.as_ref())
        .map_err(commerce_error)?;
    let request =
        OrderRequest::build(cart, &shipping, &totals, promo.as_ref()).map_err(commerce_error)?;

    match app.api.create_order(&request).await {
        Ok(order) => {
            visit.state.cart.clear();
            visit.state.checkout = CheckoutDraft::new();
            app.commit(visit)?;
            Ok(Reply::redirect(format!("/order-confirmation/{}", order.id)))
        }
        Err(e) if e.is_client_error() => {
            visit.state.flash = Some(Flash::error(e.backend_message().unwrap_or_else(|| {
                "We couldn't place your order. Please review your details.".to_string()
            })));
            app.commit(visit)?;
            Ok(Reply::redirect("/checkout"))
        }
        Err(e) => Err(PageError::Upstream(e.to_string())),
    }
}

async fn quote_delivery<T: HttpTransport>(
    api: &StoreApi<T>,
    shipping: &ShippingInfo,
    cart: &Cart,
) -> Result<DeliveryQuote, FetchError> {
    api.delivery_charge(&shipping.city, cart.total_weight()).await
}

fn empty_checkout<'a, T: HttpTransport, S: KvStore>(app: &'a App<T, S>) -> Reply<'a> {
    let meta = PageMeta::titled(&app.config, "Checkout").no_index();
    Reply::page(Page::new(meta).section(
        "checkout",
        r#"<section class="empty-state">
    <h1>Your cart is empty</h1>
    <p>Add something you love before checking out.</p>
    <a class="btn" href="/products">Shop now</a>
</section>"#,
    ))
}

fn checkout_page<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    step: CheckoutStep,
    main: String,
    cart: &Cart,
    totals: Option<&CheckoutTotals>,
) -> Reply<'a> {
    let meta = PageMeta::titled(&app.config, "Checkout").no_index();
    let page = Page::new(meta)
        .section("progress", render_progress(step))
        .section(
            "checkout",
            format!(
                r#"<div class="checkout"><div><h1>{}</h1>{}</div>{}</div>"#,
                escape_html(step.heading()),
                main,
                render_summary(cart, totals)
            ),
        );
    Reply::page(page)
}

fn render_progress(step: CheckoutStep) -> String {
    let steps: String = CheckoutStep::ALL
        .iter()
        .map(|s| {
            let class = if *s == step { r#" class="step--active""# } else { "" };
            format!(r#"<li{}>{}. {}</li>"#, class, s.number(), s.display_name())
        })
        .collect();
    format!(
        r#"<div class="progress"><div class="progress-bar" style="width: {}%"></div></div><ol class="steps">{}</ol>"#,
        step.progress_percent(),
        steps
    )
}

fn render_information_form(
    info: &ShippingInfo,
    errors: &[CommerceError],
    cities: Option<&[String]>,
) -> String {
    let text = |name: &str, label: &str, value: &str, kind: &str| {
        format!(
            r#"<div class="form-row"><label>{label} <input type="{kind}" name="{name}" value="{value}"></label>{error}</div>"#,
            label = label,
            kind = kind,
            name = name,
            value = escape_attr(value),
            error = field_error(errors, name)
        )
    };

    // Without the city list, fall back to free text; the backend still quotes it.
    let city = match cities {
        Some(cities) if !cities.is_empty() => {
            let mut select = format!(
                r#"<select name="city"><option value="{none}">Select city / district</option>"#,
                none = NO_CITY
            );
            for c in cities {
                select.push_str(&format!(
                    r#"<option value="{v}"{sel}>{label}</option>"#,
                    v = escape_attr(c),
                    sel = if *c == info.city { " selected" } else { "" },
                    label = escape_html(c)
                ));
            }
            select.push_str("</select>");
            select
        }
        _ => format!(
            r#"<input name="city" value="{}">"#,
            escape_attr(&info.city)
        ),
    };

    format!(
        r#"<form method="post" action="/checkout/information">
    {email}
    {first_name}
    {last_name}
    {address}
    <div class="form-row"><label>City / District {city}</label>{city_error}</div>
    {phone}
    <div class="form-row"><label>Order note <textarea name="note" rows="3">{note}</textarea></label></div>
    <button class="btn" type="submit">Continue to payment</button>
    <a href="/cart">Return to cart</a>
</form>"#,
        email = text("email", "Email", &info.email, "email"),
        first_name = text("first_name", "First name", &info.first_name, "text"),
        last_name = text("last_name", "Last name", &info.last_name, "text"),
        address = text("address", "Address", &info.address, "text"),
        city = city,
        city_error = field_error(errors, "city"),
        phone = text("phone", "Phone", &info.phone, "tel"),
        note = escape_html(&info.note)
    )
}

fn render_review(
    shipping: &ShippingInfo,
    promo: Option<&AppliedPromo>,
    notice: Option<&str>,
) -> String {
    let notice = notice
        .map(|n| format!(r#"<p class="notice">{}</p>"#, escape_html(n)))
        .unwrap_or_default();

    let promo_form = match promo {
        Some(p) => format!(
            r#"<form method="post" action="/checkout/promo">
    <p>Promo <strong>{code}</strong> ({label})</p>
    <input type="hidden" name="action" value="remove">
    <button class="btn btn--small btn--outline" type="submit">Remove</button>
</form>"#,
            code = escape_html(&p.code),
            label = escape_html(&p.label())
        ),
        None => r#"<form method="post" action="/checkout/promo">
    <label>Promo code <input name="code"></label>
    <button class="btn btn--small" type="submit">Apply</button>
</form>"#
            .to_string(),
    };

    format!(
        r#"{notice}<section>
    <h2>Ship to</h2>
    <p>{name}<br>{address}, {city}<br>{phone}<br>{email}</p>
    <a href="/checkout?step=information">Edit</a>
</section>
<section>
    <h2>Payment</h2>
    <label><input type="radio" name="payment" checked disabled> {payment}</label>
</section>
{promo_form}
<form method="post" action="/checkout/place-order">
    <button class="btn" type="submit">Place order</button>
</form>"#,
        notice = notice,
        name = escape_html(&shipping.customer_name()),
        address = escape_html(&shipping.address),
        city = escape_html(&shipping.city),
        phone = escape_html(&shipping.phone),
        email = escape_html(&shipping.email),
        payment = PaymentType::CashOnDelivery.display_name(),
        promo_form = promo_form
    )
}

fn render_summary(cart: &Cart, totals: Option<&CheckoutTotals>) -> String {
    let lines: String = cart
        .items
        .iter()
        .map(|item| {
            let total = item
                .line_total()
                .map(|m| m.to_string())
                .unwrap_or_default();
            format!(
                r#"<li><span>{name} &times; {qty}</span>{options}<span>{total}</span></li>"#,
                name = escape_html(&item.product.name),
                qty = item.quantity,
                options = render_line_options(item),
                total = total
            )
        })
        .collect();

    let figures = match totals {
        Some(t) => {
            let discount = if t.discount.is_positive() {
                format!(
                    r#"<p class="summary-row"><span>Discount</span><span>-{}</span></p>"#,
                    t.discount
                )
            } else {
                String::new()
            };
            format!(
                r#"<p class="summary-row"><span>Subtotal</span><span>{}</span></p>
<p class="summary-row"><span>Delivery</span><span>{}</span></p>
{}<p class="summary-row summary-total"><span>Total</span><span>{}</span></p>"#,
                t.subtotal,
                t.shipping_label(),
                discount,
                t.total
            )
        }
        None => format!(
            r#"<p class="summary-row"><span>Subtotal</span><span>{}</span></p>
<p class="summary-row"><span>Delivery</span><span>Calculated next</span></p>"#,
            cart.total_price().map(|m| m.to_string()).unwrap_or_default()
        ),
    };

    format!(
        r#"<aside class="cart-summary"><h2>Order summary</h2><ul class="cart-lines">{}</ul>{}</aside>"#,
        lines, figures
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            email: "sita@example.com".to_string(),
            first_name: "Sita".to_string(),
            last_name: "Rai".to_string(),
            address: "Jhamsikhel".to_string(),
            city: "Lalitpur".to_string(),
            phone: "9801234567".to_string(),
            note: String::new(),
        }
    }

    #[test]
    fn test_information_form_selects_city() {
        let cities = vec!["Kathmandu".to_string(), "Lalitpur".to_string()];
        let html = render_information_form(&shipping(), &[], Some(&cities));
        assert!(html.contains(r#"<option value="Lalitpur" selected>Lalitpur</option>"#));
        assert!(html.contains(r#"<option value="None">"#));

        let html = render_information_form(&shipping(), &[], None);
        assert!(html.contains(r#"<input name="city" value="Lalitpur">"#));
    }

    #[test]
    fn test_information_form_shows_errors() {
        let info = ShippingInfo {
            city: NO_CITY.to_string(),
            ..shipping()
        };
        let html = render_information_form(&info, &info.errors(), None);
        assert!(html.contains("Select a city or district"));
    }

    #[test]
    fn test_summary_totals() {
        let totals = CheckoutTotals {
            subtotal: Money::from_rupees(2000),
            delivery_charge: Money::ZERO,
            discount: Money::from_rupees(200),
            total: Money::from_rupees(1800),
        };
        let html = render_summary(&Cart::new(), Some(&totals));
        assert!(html.contains("<span>FREE</span>"));
        assert!(html.contains("<span>-Rs. 200.00</span>"));
        assert!(html.contains("<span>Rs. 1800.00</span>"));
    }

    #[test]
    fn test_review_promo_and_notice() {
        let promo = AppliedPromo {
            id: PromoCodeId::new(1),
            code: "DASHAIN".to_string(),
            discount_percentage: 10.0,
        };
        let html = render_review(&shipping(), Some(&promo), Some("Delivery unavailable"));
        assert!(html.contains("DASHAIN"));
        assert!(html.contains("10% off"));
        assert!(html.contains(r#"value="remove""#));
        assert!(html.contains(r#"<p class="notice">Delivery unavailable</p>"#));
        assert!(html.contains("Cash on Delivery"));
    }

    #[test]
    fn test_progress_marks_step() {
        let html = render_progress(CheckoutStep::Payment);
        assert!(html.contains(r#"<li class="step--active">3. Payment</li>"#));
        assert!(html.contains("width: 66%"));
    }
}
