//! Product listing and category pages.

use futures::future;
use shop_sdk::prelude::*;

use crate::app::App;
use crate::layout::render_product_grid;
use crate::pages::{backend_error, checked_slug};
use crate::reply::{Page, Reply};

/// `GET /products` with category chips, filters, sort and pagination.
pub async fn products<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
) -> Result<Reply<'a>, PageError> {
    let filters = ProductFilters::from_query(&ctx.query_string);
    let page_size = app.config.products_page_size;
    let api = &app.api;

    let subcategories = async {
        match filters.category.as_deref() {
            Some(category) => api.subcategories(category).await,
            None => Ok(Vec::new()),
        }
    };
    let (listing, categories, subcategories) = future::join3(
        api.list_products(&filters, page_size),
        api.categories(),
        subcategories,
    )
    .await;

    let listing = listing.map_err(backend_error)?;
    // Chips and the subcategory filter are optional; the failed call is logged.
    let categories = categories.unwrap_or_default();
    let subcategories = subcategories.unwrap_or_default();

    let pagination = Pagination::new(filters.page, listing.total_pages(page_size));
    let heading = match &filters.search {
        Some(q) => format!("Results for \"{}\"", escape_html(q)),
        None => categories
            .iter()
            .find(|c| Some(c.slug.as_str()) == filters.category.as_deref())
            .map(|c| escape_html(&c.name))
            .unwrap_or_else(|| "Shop All Eyewear".to_string()),
    };

    let mut meta = PageMeta::titled(&app.config, "Shop")
        .with_description("Browse sunglasses, frames and lenses, delivered across Nepal.")
        .with_path("/products");
    if filters.search.is_some() {
        meta = meta.no_index();
    }

    let page = Page::new(meta)
        .section(
            "listing-header",
            format!(
                r#"<header class="page-header"><h1>{}</h1><p>{} products</p></header>"#,
                heading, listing.count
            ),
        )
        .section("chips", render_category_chips(&filters, &categories))
        .section(
            "listing",
            format!(
                r#"<div class="listing">{sidebar}<div>{grid}</div></div>"#,
                sidebar = render_filter_sidebar(&filters, &subcategories),
                grid = render_product_grid(&listing.results)
            ),
        )
        .section(
            "pagination",
            render_pagination(&pagination, |p| products_href(&filters.with_page(p))),
        );

    Ok(Reply::page(page))
}

/// `GET /categories/{slug}`: category header and its products.
pub async fn category<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
) -> Result<Reply<'a>, PageError> {
    let slug = checked_slug(ctx, "slug")?;
    let page_number = ctx
        .query_param("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let filters = ProductFilters::new()
        .with_category(Some(slug))
        .with_page(page_number);
    let page_size = app.config.products_page_size;

    let (category, listing) = future::join(
        app.api.category(slug),
        app.api.list_products(&filters, page_size),
    )
    .await;
    let category = category.map_err(backend_error)?;
    let listing = listing.map_err(|e| PageError::Upstream(e.to_string()))?;

    let pagination = Pagination::new(filters.page, listing.total_pages(page_size));
    let meta = PageMeta::titled(&app.config, &category.name)
        .with_description(category.headline())
        .with_image(category.image.as_deref())
        .with_path(format!("/categories/{}", category.slug));

    let base = format!("/categories/{}", category.slug);
    let page = Page::new(meta)
        .section(
            "category-header",
            format!(
                r#"<header class="page-header"><h1>{}</h1><p>{}</p></header>"#,
                escape_html(&category.name),
                escape_html(&category.headline())
            ),
        )
        .section("products", render_product_grid(&listing.results))
        .section(
            "pagination",
            render_pagination(&pagination, |p| {
                if p > 1 {
                    format!("{}?page={}", base, p)
                } else {
                    base.clone()
                }
            }),
        );

    Ok(Reply::page(page))
}

fn products_href(filters: &ProductFilters) -> String {
    let query = filters.to_query();
    if query.is_empty() {
        "/products".to_string()
    } else {
        format!("/products?{}", query)
    }
}

fn render_category_chips(filters: &ProductFilters, categories: &[Category]) -> String {
    if categories.is_empty() {
        return String::new();
    }
    let active = filters.active_category();
    let chip = |slug: Option<&str>, name: &str| {
        let class = if slug.unwrap_or("all") == active {
            "chip chip--active"
        } else {
            "chip"
        };
        format!(
            r#"<a class="{}" href="{}">{}</a>"#,
            class,
            escape_attr(&products_href(&filters.with_category(slug))),
            escape_html(name)
        )
    };

    let mut html = String::from(r#"<nav class="chips">"#);
    html.push_str(&chip(None, "All"));
    for c in categories {
        html.push_str(&chip(Some(&c.slug), &c.name));
    }
    html.push_str("</nav>");
    html
}

/// A plain GET form; submitting it reloads the listing with new filters.
fn render_filter_sidebar(filters: &ProductFilters, subcategories: &[SubCategory]) -> String {
    let mut html = String::from(r#"<aside class="filters"><form method="get" action="/products">"#);

    if let Some(category) = &filters.category {
        html.push_str(&format!(
            r#"<input type="hidden" name="category" value="{}">"#,
            escape_attr(category)
        ));
    }
    if let Some(search) = &filters.search {
        html.push_str(&format!(
            r#"<input type="hidden" name="q" value="{}">"#,
            escape_attr(search)
        ));
    }

    if !subcategories.is_empty() {
        html.push_str(r#"<fieldset><legend>Type</legend><select name="sub_category"><option value="">All</option>"#);
        for sub in subcategories {
            html.push_str(&option(
                &sub.slug,
                &sub.name,
                filters.sub_category.as_deref() == Some(sub.slug.as_str()),
            ));
        }
        html.push_str("</select></fieldset>");
    }

    let range = filters.price;
    html.push_str(r#"<fieldset><legend>Price</legend><select name="min_price">"#);
    for value in range.min_options() {
        html.push_str(&option(
            &value.to_string(),
            &PriceRange::label(value),
            value == range.min(),
        ));
    }
    html.push_str(r#"</select> to <select name="max_price">"#);
    for value in range.max_options() {
        html.push_str(&option(
            &value.to_string(),
            &PriceRange::label(value),
            value == range.max(),
        ));
    }
    html.push_str("</select></fieldset>");

    html.push_str(r#"<fieldset><legend>Sort by</legend><select name="sort">"#);
    for sort in SortOption::ALL {
        html.push_str(&option(sort.as_str(), sort.display_name(), sort == filters.sort));
    }
    html.push_str("</select></fieldset>");

    html.push_str(r#"<button class="btn btn--small" type="submit">Apply</button>"#);
    if *filters != ProductFilters::new().with_category(filters.category.as_deref()) {
        html.push_str(&format!(
            r#" <a href="{}">Clear filters</a>"#,
            escape_attr(&products_href(&ProductFilters::new().with_category(filters.category.as_deref())))
        ));
    }
    html.push_str("</form></aside>");
    html
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape_attr(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    )
}

/// Prev, numbered links with ellipses, next. Empty for a single page.
pub fn render_pagination<F>(pagination: &Pagination, href: F) -> String
where
    F: Fn(u32) -> String,
{
    if pagination.total_pages <= 1 {
        return String::new();
    }

    let mut html = String::from(r#"<nav class="pagination" aria-label="Pagination">"#);
    if pagination.has_prev() {
        html.push_str(&format!(
            r#"<a href="{}" rel="prev">Previous</a>"#,
            escape_attr(&href(pagination.page - 1))
        ));
    }
    for link in pagination.visible_pages() {
        match link {
            PageLink::Page(p) if p == pagination.page => {
                html.push_str(&format!(r#"<span class="current">{}</span>"#, p))
            }
            PageLink::Page(p) => {
                html.push_str(&format!(r#"<a href="{}">{}</a>"#, escape_attr(&href(p)), p))
            }
            PageLink::Ellipsis => html.push_str("<span>…</span>"),
        }
    }
    if pagination.has_next() {
        html.push_str(&format!(
            r#"<a href="{}" rel="next">Next</a>"#,
            escape_attr(&href(pagination.page + 1))
        ));
    }
    html.push_str("</nav>");
    html
}
