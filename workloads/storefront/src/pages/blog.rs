//! Blog index and post pages.

use shop_sdk::prelude::*;

use crate::app::App;
use crate::layout::render_image;
use crate::pages::listing::render_pagination;
use crate::pages::{backend_error, checked_slug};
use crate::reply::{Page, Reply};

const EXCERPT_CHARS: usize = 160;

pub async fn index<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
) -> Result<Reply<'a>, PageError> {
    let page_number: u32 = ctx
        .query_param("page")
        .and_then(|p| p.parse().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);
    let page_size = app.config.blog_page_size;

    let posts = app
        .api
        .blogs(page_number, page_size)
        .await
        .map_err(backend_error)?;
    let pagination = Pagination::new(page_number, posts.total_pages(page_size));

    let meta = PageMeta::titled(&app.config, "Blog")
        .with_description("Eyewear guides, style tips and news from our team.")
        .with_path("/blog");

    let grid = if posts.is_empty() {
        r#"<p class="empty-state">No posts yet. Check back soon.</p>"#.to_string()
    } else {
        let cards: String = posts.results.iter().map(render_blog_card).collect();
        format!(r#"<div class="blog-grid">{}</div>"#, cards)
    };

    let page = Page::new(meta)
        .section(
            "blog-header",
            r#"<header class="page-header"><h1>Our Journal</h1><p>Insights, trends and guides from the world of eyewear.</p></header>"#,
        )
        .section("posts", grid)
        .section(
            "pagination",
            render_pagination(&pagination, |p| {
                if p > 1 {
                    format!("/blog?page={}", p)
                } else {
                    "/blog".to_string()
                }
            }),
        );

    Ok(Reply::page(page))
}

pub async fn post<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
) -> Result<Reply<'a>, PageError> {
    let slug = checked_slug(ctx, "slug")?;
    let post = app.api.blog(slug).await.map_err(backend_error)?;

    let meta = PageMeta::titled(&app.config, &post.title)
        .with_description(post.excerpt(EXCERPT_CHARS))
        .with_image(post.thumbnail_image.as_deref())
        .with_path(format!("/blog/{}", post.slug));

    let date = post
        .published_on()
        .map(|d| format!(r#"<time>{}</time> · "#, d))
        .unwrap_or_default();

    let article = format!(
        r#"<article class="post">
    <a href="/blog">&larr; Back to blog</a>
    <p class="blog-meta"><span class="tag">{tag}</span> {date}By {author}</p>
    <h1>{title}</h1>
    {image}
    <div class="post-body">{content}</div>
</article>"#,
        tag = escape_html(post.primary_tag("Eyewear")),
        date = date,
        author = escape_html(&post.author_name()),
        title = escape_html(&post.title),
        image = render_image(post.thumbnail_image.as_deref(), &post.title, "gallery-main"),
        content = post.content
    );

    Ok(Reply::page(Page::new(meta).section("post", article)))
}

fn render_blog_card(post: &BlogPost) -> String {
    format!(
        r#"<article class="blog-card">
    <a href="/blog/{slug}">
        {image}
        <p class="blog-meta">{tag} · {date}</p>
        <h2>{title}</h2>
    </a>
    <p>{excerpt}</p>
</article>"#,
        slug = escape_attr(&post.slug),
        image = render_image(post.thumbnail_image.as_deref(), &post.title, "card-image"),
        tag = escape_html(post.primary_tag("Eyewear")),
        date = post.published_on().unwrap_or_default(),
        title = escape_html(&post.title),
        excerpt = escape_html(&post.excerpt(EXCERPT_CHARS))
    )
}
