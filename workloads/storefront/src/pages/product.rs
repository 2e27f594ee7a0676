//! Product detail page.

use shop_sdk::prelude::*;
use url::form_urlencoded;

use crate::app::App;
use crate::layout::{render_image, render_product_grid, render_stars};
use crate::pages::{backend_error, checked_slug, section_fallback};
use crate::reply::{Page, Reply};

const RELATED_LIMIT: usize = 3;
const LOW_STOCK: i64 = 5;

/// Reviews shown until the backend exposes per-product reviews.
const REVIEWS: [(&str, u8, &str, &str); 2] = [
    (
        "Anish T.",
        5,
        "2 weeks ago",
        "Excellent quality and very stylish. The fit is perfect for me.",
    ),
    (
        "Suman K.",
        4,
        "1 month ago",
        "Good sunglasses, delivery was fast. I would recommend NepGlass.",
    ),
];

/// Start from the first value of every option and apply `option[Name]`
/// pairs. Unknown options and values are ignored.
pub fn selection_from<'a>(
    product: &Product,
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> OptionSelection {
    let mut selection = product.default_selection();
    for (key, value) in pairs {
        let Some(name) = key
            .strip_prefix("option[")
            .and_then(|rest| rest.strip_suffix(']'))
        else {
            continue;
        };
        let known = product
            .options
            .iter()
            .any(|o| o.name == name && o.values.iter().any(|v| v.value == value));
        if known {
            selection.insert(name.to_string(), value.to_string());
        }
    }
    selection
}

pub async fn page<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
) -> Result<Reply<'a>, PageError> {
    let slug = checked_slug(ctx, "slug")?;
    let product = app.api.product(slug).await.map_err(backend_error)?;

    let selection = selection_from(
        &product,
        ctx.query.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    );
    let variant = product.resolve_variant(&selection);

    let mut meta = PageMeta::titled(&app.config, &product.name)
        .with_image(product.display_image(None).as_deref())
        .with_path(format!("/products/{}", product.slug));
    if let Some(description) = &product.description {
        meta = meta.with_description(plain_text(description, 160));
    }

    let mut page = Page::new(meta).section("product", render_detail(&product, &selection, variant));

    if let Some(category) = &product.category {
        let api = &app.api;
        let category_id = category.id;
        let product_id = product.id;
        page = page.deferred(async move {
            Section::new("related")
                .depends_on(DependencyTag::Catalog.name())
                .with_fallback(section_fallback("More styles are on their way."))
                .resolve(
                    api.related_products(category_id, product_id, RELATED_LIMIT)
                        .await
                        .map(|related| {
                            if related.is_empty() {
                                String::new()
                            } else {
                                format!(
                                    r#"<section class="related"><h2>You may also like</h2>{}</section>"#,
                                    render_product_grid(&related)
                                )
                            }
                        }),
                )
        });
    }

    Ok(Reply::page(page))
}

fn render_detail(
    product: &Product,
    selection: &OptionSelection,
    variant: Result<Option<&ProductVariant>, CommerceError>,
) -> String {
    let (variant, unavailable) = match variant {
        Ok(v) => (v, false),
        Err(_) => (None, true),
    };

    let price = product.unit_price(variant);
    let compare = product
        .compare_at_price(variant)
        .map(|m| format!(r#" <s class="price-compare">{}</s>"#, m))
        .unwrap_or_default();

    let rating = product
        .average_rating
        .map(|r| {
            format!(
                r#"<p>{} <span>{} reviews</span></p>"#,
                render_stars(r),
                product.reviews_count.unwrap_or(0)
            )
        })
        .unwrap_or_default();

    let category = product
        .category
        .as_ref()
        .map(|c| match &c.slug {
            Some(slug) => format!(
                r#"<a class="eyebrow" href="/categories/{}">{}</a>"#,
                escape_attr(slug),
                escape_html(&c.name)
            ),
            None => format!(r#"<p class="eyebrow">{}</p>"#, escape_html(&c.name)),
        })
        .unwrap_or_default();

    let sold_out = unavailable || product.is_out_of_stock(variant);
    let buy = if sold_out {
        r#"<button class="btn" type="submit" disabled>Unavailable</button>"#
    } else {
        r#"<button class="btn" type="submit">Add to cart</button>"#
    };
    let hidden_options: String = selection
        .iter()
        .map(|(name, value)| {
            format!(
                r#"<input type="hidden" name="option[{}]" value="{}">"#,
                escape_attr(name),
                escape_attr(value)
            )
        })
        .collect();

    let mut details = String::new();
    if product.fast_shipping {
        details.push_str("<li>Fast shipping</li>");
    }
    if let Some(warranty) = product.warranty.as_deref().filter(|w| !w.is_empty()) {
        details.push_str(&format!("<li>Warranty: {}</li>", escape_html(warranty)));
    }
    if let Some(weight) = product.weight.as_deref().filter(|w| !w.is_empty()) {
        details.push_str(&format!("<li>Weight: {}</li>", escape_html(weight)));
    }

    format!(
        r#"<div class="pdp">
    {gallery}
    <div>
        {category}
        <h1>{name}</h1>
        {rating}
        <p class="pdp-price">{price}{compare}</p>
        {stock}
        {options}
        <form method="post" action="/cart/add" class="qty-form">
            <input type="hidden" name="slug" value="{slug}">
            {hidden_options}
            <label>Quantity <input class="qty-input" type="number" name="quantity" value="1" min="1" max="{max}"></label>
            {buy}
        </form>
        <ul class="product-details">{details}</ul>
    </div>
</div>
<section class="description"><h2>Description</h2>{description}</section>
{reviews}"#,
        gallery = render_gallery(product, variant),
        category = category,
        name = escape_html(&product.name),
        rating = rating,
        price = price,
        compare = compare,
        stock = render_stock(product, variant, unavailable),
        options = render_options(product, selection),
        slug = escape_attr(&product.slug),
        hidden_options = hidden_options,
        max = MAX_QUANTITY_PER_ITEM,
        buy = buy,
        details = details,
        description = product.description.as_deref().unwrap_or(""),
        reviews = render_reviews()
    )
}

fn render_gallery(product: &Product, variant: Option<&ProductVariant>) -> String {
    let main = product.display_image(variant);
    let images = product.gallery();
    let thumbs: String = if images.len() > 1 {
        images
            .iter()
            .map(|src| render_image(Some(src), &product.name, "gallery-thumb"))
            .collect()
    } else {
        String::new()
    };
    format!(
        r#"<div class="gallery">{}<div class="gallery-thumbs">{}</div></div>"#,
        render_image(main.as_deref(), &product.name, "gallery-main"),
        thumbs
    )
}

fn render_stock(product: &Product, variant: Option<&ProductVariant>, unavailable: bool) -> String {
    if unavailable {
        return r#"<p class="stock--out">This combination is not available</p>"#.to_string();
    }
    // `track_stock` only decides whether the count is shown.
    match product.available_stock(variant) {
        n if n <= 0 => r#"<p class="stock--out">Out of stock</p>"#.to_string(),
        n if product.track_stock && n <= LOW_STOCK => {
            format!(r#"<p class="stock--low">Only {} left</p>"#, n)
        }
        n if product.track_stock => format!(r#"<p class="stock--in">In stock ({} available)</p>"#, n),
        _ => r#"<p class="stock--in">In stock</p>"#.to_string(),
    }
}

/// Each value links to the same page with that value selected.
fn render_options(product: &Product, selection: &OptionSelection) -> String {
    product
        .options
        .iter()
        .map(|option| {
            let values: String = option
                .values
                .iter()
                .map(|v| {
                    let mut next = selection.clone();
                    next.insert(option.name.clone(), v.value.clone());
                    let active = selection.get(&option.name) == Some(&v.value);
                    format!(
                        r#"<a class="{}" href="{}">{}</a>"#,
                        if active {
                            "option-value option-value--active"
                        } else {
                            "option-value"
                        },
                        escape_attr(&selection_href(&product.slug, &next)),
                        escape_html(&v.value)
                    )
                })
                .collect();
            format!(
                r#"<fieldset><legend>{}</legend><div class="option-values">{}</div></fieldset>"#,
                escape_html(&option.name),
                values
            )
        })
        .collect()
}

pub fn selection_href(slug: &str, selection: &OptionSelection) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (name, value) in selection {
        query.append_pair(&format!("option[{}]", name), value);
    }
    let query = query.finish();
    if query.is_empty() {
        format!("/products/{}", slug)
    } else {
        format!("/products/{}?{}", slug, query)
    }
}

fn render_reviews() -> String {
    let items: String = REVIEWS
        .iter()
        .map(|(name, rating, when, comment)| {
            format!(
                r#"<div class="review">{} <strong>{}</strong> <span>{}</span><p>{}</p></div>"#,
                render_stars(f64::from(*rating)),
                name,
                when,
                comment
            )
        })
        .collect();
    format!(
        r#"<section class="reviews"><h2>Customer Reviews</h2>{}</section>"#,
        items
    )
}

/// Strip tags from backend HTML for meta descriptions.
fn plain_text(html: &str, max_chars: usize) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn frame() -> Product {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Aviator Classic",
            "slug": "aviator-classic",
            "price": "2500.00",
            "market_price": "3000.00",
            "stock": 10,
            "track_stock": true,
            "options": [
                {"name": "Color", "values": [{"value": "Gold"}, {"value": "Black"}]}
            ],
            "variants_read": [
                {"id": 70, "price": "2500.00", "stock": 3, "option_values": {"Color": "Gold"}},
                {"id": 71, "price": "2700.00", "stock": 0, "option_values": {"Color": "Black"}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_selection_from_query() {
        let product = frame();
        let selection = selection_from(&product, [("option[Color]", "Black"), ("page", "2")]);
        assert_eq!(selection.get("Color").map(String::as_str), Some("Black"));

        let ignored = selection_from(&product, [("option[Color]", "Purple"), ("option[Size]", "L")]);
        assert_eq!(ignored, BTreeMap::from([("Color".to_string(), "Gold".to_string())]));
    }

    #[test]
    fn test_detail_reflects_variant_stock() {
        let product = frame();
        let gold = product.default_selection();
        let html = render_detail(&product, &gold, product.resolve_variant(&gold));
        assert!(html.contains("Only 3 left"));
        assert!(html.contains(r#"<input type="hidden" name="option[Color]" value="Gold">"#));
        assert!(html.contains("option-value option-value--active"));
        assert!(html.contains(r#"<s class="price-compare">Rs. 3000.00</s>"#));

        let black = selection_from(&product, [("option[Color]", "Black")]);
        let html = render_detail(&product, &black, product.resolve_variant(&black));
        assert!(html.contains("Out of stock"));
        assert!(html.contains("disabled"));
    }

    #[test]
    fn test_untracked_stock_hides_count_but_not_sold_out() {
        let mut product = frame();
        product.track_stock = false;
        let gold = product.default_selection();
        let html = render_detail(&product, &gold, product.resolve_variant(&gold));
        assert!(html.contains(r#"<p class="stock--in">In stock</p>"#));
        assert!(!html.contains("Only 3 left"));
        assert!(!html.contains("disabled"));

        let black = selection_from(&product, [("option[Color]", "Black")]);
        let html = render_detail(&product, &black, product.resolve_variant(&black));
        assert!(html.contains("Out of stock"));
        assert!(html.contains(r#"<button class="btn" type="submit" disabled>"#));
    }

    #[test]
    fn test_option_links() {
        let selection = BTreeMap::from([("Color".to_string(), "Matte Black".to_string())]);
        assert_eq!(
            selection_href("aviator", &selection),
            "/products/aviator?option%5BColor%5D=Matte+Black"
        );
        assert_eq!(selection_href("aviator", &OptionSelection::new()), "/products/aviator");
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(plain_text("<p>UV400 <b>lenses</b></p>", 100), "UV400 lenses");
        assert_eq!(plain_text("abcdef", 3), "abc");
    }
}
