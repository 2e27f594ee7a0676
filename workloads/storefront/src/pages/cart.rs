//! Cart page and cart form actions.

use shop_sdk::prelude::*;
use shop_sdk::shop_commerce::cart::parse_line_key;

use crate::app::App;
use crate::layout::render_image;
use crate::pages::product::{selection_from, selection_href};
use crate::pages::{backend_error, commerce_error, is_valid_slug};
use crate::reply::{Page, Reply};
use crate::session::{Flash, Visit};

pub fn page<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    visit: &Visit,
) -> Result<Reply<'a>, PageError> {
    let cart = &visit.state.cart;
    let meta = PageMeta::titled(&app.config, "Your Cart").no_index();
    let page = Page::new(meta).section("cart", render_cart(cart).map_err(commerce_error)?);
    Ok(Reply::page(page))
}

/// `POST /cart/add`: `slug`, `quantity` and `option[Name]` fields.
pub async fn add<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
    visit: &mut Visit,
) -> Result<Reply<'a>, PageError> {
    let slug = ctx.form_text("slug");
    if !is_valid_slug(&slug) {
        return Err(PageError::BadRequest("Unknown product".to_string()));
    }
    let quantity = parse_quantity(&ctx.form_text("quantity"), 1)?;
    let product = app.api.product(&slug).await.map_err(backend_error)?;
    let selection = selection_from(
        &product,
        ctx.form.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    );

    match add_to_cart(&mut visit.state.cart, &product, &selection, quantity) {
        Ok(_) => {
            visit.state.flash = Some(Flash::success(format!(
                "Added {} to your cart.",
                product.name
            )));
            app.commit(visit)?;
            Ok(Reply::redirect("/cart"))
        }
        Err(e) if e.is_user_error() => {
            visit.state.flash = Some(Flash::error(shopper_message(&e)));
            app.commit(visit)?;
            Ok(Reply::redirect(selection_href(&product.slug, &selection)))
        }
        Err(e) => Err(commerce_error(e)),
    }
}

/// `POST /cart/update`: `line` token and the new `quantity`; zero removes.
pub fn update<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
    visit: &mut Visit,
) -> Result<Reply<'a>, PageError> {
    let (product_id, variant_id) = line_key(ctx)?;
    let quantity = parse_quantity(&ctx.form_text("quantity"), 0)?;

    if let Err(e) = visit
        .state
        .cart
        .update_quantity(product_id, quantity, variant_id)
    {
        visit.state.flash = Some(Flash::error(shopper_message(&e)));
    }
    app.commit(visit)?;
    Ok(Reply::redirect("/cart"))
}

pub fn remove<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
    visit: &mut Visit,
) -> Result<Reply<'a>, PageError> {
    let (product_id, variant_id) = line_key(ctx)?;
    if visit.state.cart.remove(product_id, variant_id) {
        visit.state.flash = Some(Flash::success("Item removed from your cart."));
    }
    app.commit(visit)?;
    Ok(Reply::redirect("/cart"))
}

/// Resolve the variant, check stock against what is already in the cart,
/// then add. Stock is checked whether or not the product shows its count.
pub fn add_to_cart(
    cart: &mut Cart,
    product: &Product,
    selection: &OptionSelection,
    quantity: i64,
) -> Result<i64, CommerceError> {
    let variant = product.resolve_variant(selection)?;

    let available = product.available_stock(variant);
    let in_cart = cart
        .get(product.id, variant.map(|v| v.id))
        .map(|item| item.quantity)
        .unwrap_or(0);
    let requested = in_cart.saturating_add(quantity);
    if product.is_out_of_stock(variant) || requested > available {
        return Err(CommerceError::InsufficientStock {
            product: product.name.clone(),
            requested,
            available: available.max(0),
        });
    }

    cart.add(
        CartProduct::snapshot(product, variant),
        quantity,
        variant.map(CartVariant::from),
    )
}

/// Flash wording for cart errors.
fn shopper_message(e: &CommerceError) -> String {
    match e {
        CommerceError::InsufficientStock {
            product,
            available: 0,
            ..
        } => format!("{} is out of stock.", product),
        CommerceError::InsufficientStock {
            product, available, ..
        } => format!("Only {} of {} available.", available, product),
        CommerceError::QuantityExceedsLimit(_, max) => {
            format!("You can order at most {} of an item.", max)
        }
        other => other.to_string(),
    }
}

fn parse_quantity(raw: &str, default: i64) -> Result<i64, PageError> {
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse()
        .map_err(|_| PageError::BadRequest(format!("Invalid quantity {:?}", raw)))
}

fn line_key(ctx: &RequestContext) -> Result<(ProductId, Option<VariantId>), PageError> {
    let token = ctx.form_text("line");
    parse_line_key(&token).ok_or_else(|| PageError::BadRequest(format!("Invalid cart line {:?}", token)))
}

/// `Color: Gold, Size: M` for a line's chosen variant.
pub fn render_line_options(item: &CartItem) -> String {
    match &item.variant {
        Some(v) if !v.option_values.is_empty() => {
            let text = v
                .option_values
                .iter()
                .map(|(name, value)| format!("{}: {}", name, value))
                .collect::<Vec<_>>()
                .join(", ");
            format!(r#"<p class="line-options">{}</p>"#, escape_html(&text))
        }
        _ => String::new(),
    }
}

fn render_cart(cart: &Cart) -> Result<String, CommerceError> {
    if cart.is_empty() {
        return Ok(r#"<section class="empty-state">
    <h1>Your cart is empty</h1>
    <p>Looks like you haven't added anything yet.</p>
    <a class="btn" href="/products">Continue shopping</a>
</section>"#
            .to_string());
    }

    let mut lines = String::new();
    for item in &cart.items {
        let key = escape_attr(&item.form_key());
        lines.push_str(&format!(
            r#"<li>
    {image}
    <div>
        <a href="/products/{slug}">{name}</a>
        {options}
        <p>{unit}</p>
    </div>
    <form method="post" action="/cart/update" class="qty-form">
        <input type="hidden" name="line" value="{key}">
        <button class="btn btn--small btn--outline" name="quantity" value="{less}" aria-label="Decrease">-</button>
        <span>{quantity}</span>
        <button class="btn btn--small btn--outline" name="quantity" value="{more}" aria-label="Increase">+</button>
    </form>
    <strong>{total}</strong>
    <form method="post" action="/cart/remove">
        <input type="hidden" name="line" value="{key}">
        <button class="btn btn--small btn--outline" type="submit">Remove</button>
    </form>
</li>"#,
            image = render_image(
                item.product.thumbnail_image.as_deref(),
                &item.product.name,
                "cart-thumb"
            ),
            slug = escape_attr(&item.product.slug),
            name = escape_html(&item.product.name),
            options = render_line_options(item),
            unit = item.unit_price(),
            key = key,
            less = item.quantity - 1,
            more = (item.quantity + 1).min(MAX_QUANTITY_PER_ITEM),
            quantity = item.quantity,
            total = item.line_total()?
        ));
    }

    Ok(format!(
        r#"<h1>Your Cart</h1>
<div class="checkout">
    <ul class="cart-lines">{lines}</ul>
    <aside class="cart-summary">
        <p class="summary-row"><span>Items</span><span>{count}</span></p>
        <p class="summary-row summary-total"><span>Subtotal</span><span>{subtotal}</span></p>
        <p>Delivery and discounts are calculated at checkout.</p>
        <a class="btn" href="/checkout">Proceed to checkout</a>
        <a href="/products">Continue shopping</a>
    </aside>
</div>"#,
        lines = lines,
        count = cart.item_count(),
        subtotal = cart.total_price()?
    ))
}
