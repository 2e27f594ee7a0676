//! Home page: hero, categories, featured products, testimonials, FAQ teaser.

use shop_sdk::prelude::*;

use crate::app::App;
use crate::layout::{render_image, render_product_grid};
use crate::pages::faqs::render_faq_list;
use crate::pages::section_fallback;
use crate::reply::{Page, Reply};

const SHOWCASE_SIZE: u32 = 8;
const FAQ_TEASER_SIZE: usize = 4;

pub async fn page<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    _ctx: &RequestContext,
) -> Result<Reply<'a>, PageError> {
    let meta = PageMeta::new().with_path("/");
    let api = &app.api;

    let page = Page::new(meta)
        .section("hero", render_hero())
        .deferred(async move {
            Section::new("categories")
                .depends_on(DependencyTag::Catalog.name())
                .with_fallback(section_fallback("Categories are unavailable right now."))
                .resolve(api.categories().await.map(|c| render_categories(&c)))
        })
        .deferred(async move {
            Section::new("showcase")
                .depends_on(DependencyTag::Catalog.name())
                .with_fallback(section_fallback("Our collection will be back shortly."))
                .resolve(
                    api.list_products(&ProductFilters::new(), SHOWCASE_SIZE)
                        .await
                        .map(|p| render_showcase(&p.results)),
                )
        })
        .deferred(async move {
            Section::new("testimonials")
                .depends_on(DependencyTag::Content.name())
                .resolve(api.testimonials().await.map(|t| render_testimonials(&t)))
        })
        .deferred(async move {
            Section::new("faq")
                .depends_on(DependencyTag::Content.name())
                .resolve(api.faqs().await.map(|f| render_faq_teaser(&f)))
        });

    Ok(Reply::page(page))
}

fn render_hero() -> String {
    r#"<section class="hero">
    <div>
        <h1>Premium Eyewear<br><span>Made for Nepal</span></h1>
        <p>Thoughtfully designed eyewear that blends comfort, clarity, and modern style for everyday life.</p>
        <a class="btn" href="/products">Explore Collection</a>
        <a class="btn btn--outline" href="/blog">Our Story</a>
    </div>
    <img src="/images/hero.jpg" alt="Model wearing NepGlass frames" class="gallery-main">
</section>"#
        .to_string()
}

fn render_categories(categories: &[Category]) -> String {
    if categories.is_empty() {
        return String::new();
    }
    let tiles: String = categories
        .iter()
        .map(|c| {
            format!(
                r#"<a class="category-tile" href="/categories/{slug}">{image}<h3>{name}</h3></a>"#,
                slug = escape_attr(&c.slug),
                image = render_image(c.image.as_deref(), &c.name, "card-image"),
                name = escape_html(&c.name)
            )
        })
        .collect();
    format!(
        r#"<section class="shop-by-category"><h2>Shop by Category</h2><div class="category-tiles">{}</div></section>"#,
        tiles
    )
}

fn render_showcase(products: &[Product]) -> String {
    format!(
        r#"<section class="showcase">
    <p class="eyebrow">Trending Now</p>
    <h2>Featured Eyewear</h2>
    {grid}
    <a class="btn btn--outline" href="/products">View all</a>
</section>"#,
        grid = render_product_grid(products)
    )
}

pub fn render_testimonials(testimonials: &[Testimonial]) -> String {
    if testimonials.is_empty() {
        return String::new();
    }
    let cards: String = testimonials
        .iter()
        .map(|t| {
            let stars = t
                .rating
                .map(|r| crate::layout::render_stars(f64::from(r)))
                .unwrap_or_default();
            format!(
                r#"<figure class="testimonial">
    {stars}
    <blockquote>&quot;{comment}&quot;</blockquote>
    <figcaption>{image}<strong>{name}</strong> <span>{designation}</span></figcaption>
</figure>"#,
                stars = stars,
                comment = escape_html(&t.comment),
                image = render_image(t.image.as_deref(), &t.name, "avatar"),
                name = escape_html(&t.name),
                designation = escape_html(t.designation.as_deref().unwrap_or(""))
            )
        })
        .collect();
    format!(
        r#"<section class="testimonials"><p class="eyebrow">Testimonials</p><h2>See Through Our Customers' Eyes</h2><div class="testimonial-grid">{}</div></section>"#,
        cards
    )
}

fn render_faq_teaser(faqs: &[Faq]) -> String {
    if faqs.is_empty() {
        return String::new();
    }
    let teaser = &faqs[..faqs.len().min(FAQ_TEASER_SIZE)];
    format!(
        r#"<section class="faq-teaser"><h2>Frequently Asked Questions</h2>{}<a href="/faqs">See all questions</a></section>"#,
        render_faq_list(teaser)
    )
}
