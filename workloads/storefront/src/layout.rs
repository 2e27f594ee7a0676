//! Page chrome and small render helpers shared by every page.

use shop_sdk::prelude::*;

use crate::session::{Flash, FlashKind};

/// Wrap a page in the site header and footer.
pub fn shell(config: &StoreConfig, meta: &PageMeta, cart_count: i64) -> Shell {
    let head = meta.to_head(config).with_style(STORE_STYLES);

    let badge = if cart_count > 0 {
        format!(r#"<span class="cart-count">{}</span>"#, cart_count)
    } else {
        String::new()
    };

    Shell::new(head)
        .with_body_start(format!(
            r#"<body>
<header class="site-header">
    <a class="logo" href="/">{site}</a>
    <nav class="site-nav">
        <a href="/products">Shop</a>
        <a href="/blog">Blog</a>
        <a href="/faqs">FAQs</a>
        <a href="/contact">Contact</a>
    </nav>
    <a class="cart-link" href="/cart" aria-label="Cart">Cart {badge}</a>
</header>
<main class="site-main">
"#,
            site = escape_html(&config.site_name),
            badge = badge
        ))
        .with_body_end(format!(
            r#"
</main>
<footer class="site-footer">
    <p>{site} &middot; Premium eyewear, delivered across Nepal</p>
    <nav><a href="/products">Shop</a> <a href="/blog">Blog</a> <a href="/faqs">FAQs</a> <a href="/contact">Contact</a></nav>
</footer>
</body>
</html>"#,
            site = escape_html(&config.site_name)
        ))
}

pub fn render_flash(flash: &Flash) -> String {
    let class = match flash.kind {
        FlashKind::Success => "flash flash--success",
        FlashKind::Error => "flash flash--error",
    };
    format!(
        r#"<div class="{}" role="status">{}</div>"#,
        class,
        escape_html(&flash.message)
    )
}

/// Five stars, the first `rating` of them filled.
pub fn render_stars(rating: f64) -> String {
    let filled = rating.floor().clamp(0.0, 5.0) as usize;
    format!(
        r#"<span class="stars" aria-label="{} out of 5">{}{}</span>"#,
        filled,
        "★".repeat(filled),
        "☆".repeat(5 - filled)
    )
}

pub fn render_image(src: Option<&str>, alt: &str, class: &str) -> String {
    match src.filter(|s| !s.is_empty()) {
        Some(src) => format!(
            r#"<img src="{}" alt="{}" class="{}" loading="lazy">"#,
            escape_attr(src),
            escape_attr(alt),
            class
        ),
        None => format!(r#"<div class="{} image-placeholder"></div>"#, class),
    }
}

/// Product tile used by grids and showcases.
pub fn render_product_card(product: &Product) -> String {
    let compare = product
        .compare_at_price(None)
        .map(|m| format!(r#" <s class="price-compare">{}</s>"#, m))
        .unwrap_or_default();
    let rating = product
        .average_rating
        .map(|r| {
            format!(
                r#"<p class="card-rating">{} <span>({})</span></p>"#,
                render_stars(r),
                product.reviews_count.unwrap_or(0)
            )
        })
        .unwrap_or_default();
    let sold_out = if product.is_out_of_stock(None) && product.variants.is_empty() {
        r#"<span class="badge">Sold out</span>"#
    } else if product.is_on_sale() {
        r#"<span class="badge badge--sale">Sale</span>"#
    } else {
        ""
    };

    format!(
        r#"<article class="product-card">
    <a href="/products/{slug}">
        {image}
        {badge}
        <h3 class="card-name">{name}</h3>
    </a>
    {rating}
    <p class="card-price">{price}{compare}</p>
</article>"#,
        slug = escape_attr(&product.slug),
        image = render_image(product.display_image(None).as_deref(), &product.name, "card-image"),
        badge = sold_out,
        name = escape_html(&product.name),
        rating = rating,
        price = product.price,
        compare = compare
    )
}

pub fn render_product_grid(products: &[Product]) -> String {
    if products.is_empty() {
        return r#"<p class="empty-state">No products found.</p>"#.to_string();
    }
    let cards: String = products.iter().map(render_product_card).collect();
    format!(r#"<div class="product-grid">{}</div>"#, cards)
}

/// Field-level messages from validation errors, keyed by field name.
pub fn field_error(errors: &[CommerceError], field: &str) -> String {
    errors
        .iter()
        .find_map(|e| match e {
            CommerceError::Validation { field: f, message } if f == field => Some(format!(
                r#"<span class="field-error">{}</span>"#,
                escape_html(message)
            )),
            _ => None,
        })
        .unwrap_or_default()
}

const STORE_STYLES: &str = r#"
* { box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; color: #1f2937; background: #fff; }
a { color: inherit; }
.site-header { display: flex; align-items: center; justify-content: space-between; padding: 1rem 2rem; border-bottom: 1px solid #eee; }
.logo { font-weight: 800; font-size: 1.4rem; text-decoration: none; color: #0f2a44; }
.site-nav a { margin: 0 0.75rem; text-decoration: none; }
.cart-link { text-decoration: none; font-weight: 600; }
.cart-count { background: #c8963e; color: #fff; border-radius: 999px; padding: 0.1rem 0.5rem; font-size: 0.75rem; }
.site-main { max-width: 1200px; margin: 0 auto; padding: 2rem; min-height: 60vh; }
.site-footer { background: #0f2a44; color: #fff; padding: 2rem; text-align: center; }
.site-footer a { margin: 0 0.5rem; }
.flash { padding: 0.75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.flash--success { background: #ecfdf5; color: #065f46; }
.flash--error { background: #fef2f2; color: #991b1b; }
.hero { display: grid; grid-template-columns: 1fr 1fr; gap: 2rem; align-items: center; padding: 3rem 0; }
.hero h1 { font-size: 3rem; margin: 0 0 1rem; color: #0f2a44; }
.hero h1 span { color: #c8963e; }
.btn { display: inline-block; background: #0f2a44; color: #fff; border: none; border-radius: 999px; padding: 0.75rem 1.75rem; text-decoration: none; cursor: pointer; font-size: 1rem; }
.btn--outline { background: transparent; color: #0f2a44; border: 1px solid #0f2a44; }
.btn--small { padding: 0.35rem 0.9rem; font-size: 0.85rem; }
.product-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 1.5rem; }
.product-card a { text-decoration: none; }
.card-image, .image-placeholder { width: 100%; aspect-ratio: 1; object-fit: cover; border-radius: 8px; background: #f3f4f6; }
.card-name { font-size: 1rem; margin: 0.5rem 0 0.25rem; }
.card-price { font-weight: 700; margin: 0; }
.price-compare { color: #9ca3af; font-weight: 400; margin-left: 0.5rem; }
.badge { background: #6b7280; color: #fff; font-size: 0.7rem; padding: 0.15rem 0.5rem; border-radius: 4px; }
.badge--sale { background: #b91c1c; }
.stars { color: #f59e0b; letter-spacing: 1px; }
.category-tiles { display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 1rem; }
.category-tile { position: relative; display: block; border-radius: 12px; overflow: hidden; text-decoration: none; }
.category-tile h3 { position: absolute; bottom: 1rem; left: 1rem; color: #fff; margin: 0; text-shadow: 0 1px 4px rgba(0,0,0,.5); }
.listing { display: grid; grid-template-columns: 240px 1fr; gap: 2rem; }
.filters fieldset { border: none; padding: 0; margin: 0 0 1.5rem; }
.chips { display: flex; flex-wrap: wrap; gap: 0.5rem; margin-bottom: 1.5rem; }
.chip { border: 1px solid #d1d5db; border-radius: 999px; padding: 0.35rem 0.9rem; text-decoration: none; }
.chip--active { background: #0f2a44; color: #fff; border-color: #0f2a44; }
.pagination { display: flex; gap: 0.5rem; justify-content: center; margin-top: 2rem; }
.pagination a, .pagination span { padding: 0.4rem 0.8rem; border-radius: 6px; border: 1px solid #e5e7eb; text-decoration: none; }
.pagination .current { background: #0f2a44; color: #fff; }
.pdp { display: grid; grid-template-columns: 1fr 1fr; gap: 3rem; }
.gallery-main { width: 100%; border-radius: 12px; }
.gallery-thumbs { display: flex; gap: 0.5rem; margin-top: 0.75rem; }
.gallery-thumbs img { width: 72px; height: 72px; object-fit: cover; border-radius: 6px; }
.pdp-price { font-size: 2rem; font-weight: 800; color: #0f2a44; }
.stock--in { color: #047857; }
.stock--low { color: #b45309; }
.stock--out { color: #b91c1c; }
.option-values { display: flex; gap: 0.5rem; flex-wrap: wrap; margin: 0.5rem 0 1rem; }
.option-value { border: 1px solid #d1d5db; border-radius: 6px; padding: 0.35rem 0.8rem; text-decoration: none; }
.option-value--active { border-color: #0f2a44; background: #0f2a44; color: #fff; }
.qty-input { width: 4.5rem; padding: 0.5rem; }
.reviews, .related { margin-top: 4rem; border-top: 1px solid #f3f4f6; padding-top: 2rem; }
.review { padding: 1rem 0; border-bottom: 1px solid #f9fafb; }
.testimonials { background: #0f2a44; color: #fff; padding: 3rem 2rem; border-radius: 16px; margin: 3rem 0; }
.testimonial-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1.5rem; }
.faq-list details { border-bottom: 1px solid #e5e7eb; padding: 1rem 0; }
.faq-list summary { font-weight: 600; cursor: pointer; }
.blog-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 2rem; }
.blog-card a { text-decoration: none; }
.blog-meta { color: #6b7280; font-size: 0.85rem; }
.post-body { line-height: 1.7; max-width: 760px; }
.contact { display: grid; grid-template-columns: 1fr 1.4fr; gap: 3rem; }
.form-row { display: flex; flex-direction: column; margin-bottom: 1rem; }
.form-row input, .form-row select, .form-row textarea { padding: 0.6rem; border: 1px solid #d1d5db; border-radius: 6px; font: inherit; }
.field-error { color: #b91c1c; font-size: 0.8rem; margin-top: 0.25rem; }
.cart-lines { width: 100%; border-collapse: collapse; }
.cart-lines td, .cart-lines th { padding: 0.75rem; border-bottom: 1px solid #f3f4f6; text-align: left; vertical-align: middle; }
.cart-thumb { width: 64px; height: 64px; object-fit: cover; border-radius: 6px; }
.line-options { color: #6b7280; font-size: 0.85rem; }
.qty-form { display: inline-flex; align-items: center; gap: 0.25rem; }
.cart-summary, .order-summary { background: #f9fafb; border-radius: 12px; padding: 1.5rem; }
.summary-row { display: flex; justify-content: space-between; margin: 0.5rem 0; }
.summary-total { font-weight: 800; font-size: 1.2rem; border-top: 1px solid #e5e7eb; padding-top: 0.75rem; }
.checkout { display: grid; grid-template-columns: 1.4fr 1fr; gap: 3rem; }
.progress { height: 6px; background: #e5e7eb; border-radius: 999px; margin: 1rem 0 2rem; }
.progress-bar { height: 100%; background: #c8963e; border-radius: 999px; }
.steps { display: flex; gap: 1.5rem; color: #9ca3af; }
.steps .step--active { color: #0f2a44; font-weight: 700; }
.empty-state { text-align: center; color: #6b7280; padding: 3rem 0; }
.notice { color: #6b7280; font-size: 0.9rem; }
.error-page { text-align: center; padding: 4rem 0; }
.section-fallback { color: #9ca3af; }
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_shows_cart_badge() {
        let config = StoreConfig::default();
        let meta = PageMeta::titled(&config, "Cart");
        let html = shell(&config, &meta, 3).render_opening();
        assert!(html.contains("<title>Cart | NepGlass</title>"));
        assert!(html.contains(r#"<span class="cart-count">3</span>"#));

        let empty = shell(&config, &meta, 0).render_opening();
        assert!(!empty.contains("cart-count\">"));
    }

    #[test]
    fn test_render_stars() {
        assert_eq!(
            render_stars(3.7),
            r#"<span class="stars" aria-label="3 out of 5">★★★☆☆</span>"#
        );
        assert!(render_stars(9.0).contains("★★★★★"));
    }

    #[test]
    fn test_field_error_picks_matching_field() {
        let errors = vec![
            CommerceError::validation("email", "Enter a valid email address"),
            CommerceError::validation("name", "This field is required"),
        ];
        assert_eq!(
            field_error(&errors, "name"),
            r#"<span class="field-error">This field is required</span>"#
        );
        assert_eq!(field_error(&errors, "phone"), "");
    }
}
