//! Order confirmation page.

use shop_sdk::prelude::*;
use shop_sdk::shop_commerce::checkout::payment_display;

use crate::app::App;
use crate::layout::render_image;
use crate::pages::backend_error;
use crate::reply::{Page, Reply};

pub async fn confirmation<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
) -> Result<Reply<'a>, PageError> {
    let raw = ctx.param("id").unwrap_or_default();
    let id: OrderId = raw
        .parse()
        .map_err(|_| PageError::NotFound(format!("order {:?}", raw)))?;
    let order = app.api.order(id).await.map_err(backend_error)?;

    let meta = PageMeta::titled(&app.config, "Order Confirmed").no_index();
    Ok(Reply::page(
        Page::new(meta).section("order", render_order(&order)),
    ))
}

fn render_order(order: &Order) -> String {
    let items: String = order
        .items
        .iter()
        .map(|item| {
            let options = item
                .variant
                .as_ref()
                .map(|v| {
                    v.option_values
                        .iter()
                        .map(|o| o.value.as_str())
                        .collect::<Vec<_>>()
                        .join(" / ")
                })
                .filter(|s| !s.is_empty())
                .map(|s| format!(r#"<p class="line-options">{}</p>"#, escape_html(&s)))
                .unwrap_or_default();
            let line_total = item
                .price
                .try_multiply(item.quantity)
                .map(|m| m.to_string())
                .unwrap_or_default();
            format!(
                r#"<li>{image}<div><strong>{name}</strong>{options}<p>Qty {qty}</p></div><span>{total}</span></li>"#,
                image = render_image(item.image(), item.name(), "cart-thumb"),
                name = escape_html(item.name()),
                options = options,
                qty = item.quantity,
                total = line_total
            )
        })
        .collect();

    let delivery = order.delivery_charge.unwrap_or_default();
    let delivery = if delivery.is_zero() {
        "FREE".to_string()
    } else {
        delivery.to_string()
    };
    let discount = order
        .discount_amount
        .filter(|d| d.is_positive())
        .map(|d| {
            format!(
                r#"<p class="summary-row"><span>Discount</span><span>-{}</span></p>"#,
                d
            )
        })
        .unwrap_or_default();

    format!(
        r#"<section class="order-confirmation">
    <h1>Thank you for your order!</h1>
    <p>Order <strong>#{reference}</strong> has been placed. A confirmation has been sent to {email}.</p>
    <div class="checkout">
        <div>
            <h2>Items</h2>
            <ul class="cart-lines">{items}</ul>
            <h2>Shipping to</h2>
            <p>{name}<br>{address}, {city}<br>{phone}</p>
            <h2>Payment</h2>
            <p>{payment}</p>
        </div>
        <aside class="cart-summary">
            <p class="summary-row"><span>Subtotal</span><span>{subtotal}</span></p>
            <p class="summary-row"><span>Delivery</span><span>{delivery}</span></p>
            {discount}
            <p class="summary-row summary-total"><span>Total</span><span>{total}</span></p>
        </aside>
    </div>
    <a class="btn" href="/products">Continue shopping</a>
</section>"#,
        reference = escape_html(&order.reference()),
        email = escape_html(&order.customer_email),
        items = items,
        name = escape_html(&order.customer_name),
        address = escape_html(&order.shipping_address),
        city = escape_html(&order.city),
        phone = escape_html(&order.customer_phone),
        payment = escape_html(&payment_display(&order.payment_type)),
        subtotal = order.subtotal(),
        delivery = delivery,
        discount = discount,
        total = order.total_amount
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_order() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": 41,
            "order_number": "NG-0041",
            "customer_name": "Sita Rai",
            "customer_email": "sita@example.com",
            "city": "Lalitpur",
            "total_amount": "2150.00",
            "delivery_charge": "150.00",
            "payment_type": "cod",
            "items": [{
                "product": {"id": 7, "name": "Aviator Classic"},
                "variant": {"id": 70, "option_values": [{"value": "Gold"}, {"value": "M"}]},
                "quantity": 2,
                "price": "1000.00"
            }]
        }))
        .unwrap();

        let html = render_order(&order);
        assert!(html.contains("#NG-0041"));
        assert!(html.contains("Gold / M"));
        assert!(html.contains("<span>Rs. 2000.00</span>"));
        assert!(html.contains("<span>Rs. 150.00</span>"));
        assert!(html.contains("Cash on Delivery"));
        assert!(!html.contains("Discount"));
    }
}
