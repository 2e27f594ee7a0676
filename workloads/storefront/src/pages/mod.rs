//! Route handlers, one module per page family.

pub mod blog;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod faqs;
pub mod home;
pub mod listing;
pub mod order;
pub mod product;

use http::StatusCode;
use shop_sdk::prelude::*;

use crate::reply::{Page, Reply};

/// Map a failed backend call for the page's primary resource.
pub fn backend_error(e: FetchError) -> PageError {
    if e.is_not_found() {
        PageError::NotFound(e.to_string())
    } else {
        PageError::Upstream(e.to_string())
    }
}

/// A domain rule the shopper broke is a 422; anything else is ours.
pub fn commerce_error(e: CommerceError) -> PageError {
    if e.is_user_error() {
        PageError::Unprocessable(e.to_string())
    } else {
        PageError::Internal(e.into())
    }
}

/// Backend slugs are `[A-Za-z0-9_-]`; anything else cannot exist.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

pub fn checked_slug<'a>(ctx: &'a RequestContext, name: &str) -> Result<&'a str, PageError> {
    let slug = ctx.param(name).unwrap_or_default();
    if is_valid_slug(slug) {
        Ok(slug)
    } else {
        Err(PageError::NotFound(format!("invalid slug {:?}", slug)))
    }
}

pub fn section_fallback(message: &str) -> String {
    format!(r#"<p class="section-fallback">{}</p>"#, escape_html(message))
}

/// Page shown for any handler error, with the error's status.
pub fn error_page<'a>(config: &StoreConfig, error: &PageError) -> Reply<'a> {
    let status = error.status();
    let heading = match status {
        StatusCode::NOT_FOUND => "Page not found",
        StatusCode::METHOD_NOT_ALLOWED => "Not allowed",
        StatusCode::BAD_GATEWAY => "Temporarily unavailable",
        s if s.is_client_error() => "Something is not right",
        _ => "Something went wrong",
    };

    let page = Page::new(PageMeta::titled(config, heading).no_index()).section(
        "error",
        format!(
            r#"<section class="error-page">
    <h1>{heading}</h1>
    <p>{message}</p>
    <a class="btn" href="/">Back to home</a>
</section>"#,
            heading = heading,
            message = escape_html(&error.public_message())
        ),
    );
    Reply::page(page).with_status(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_mapping() {
        let missing = FetchError::HttpError {
            status: 404,
            url: "http://api.test/products/x/".into(),
            message: "{}".into(),
        };
        assert!(matches!(backend_error(missing), PageError::NotFound(_)));
        assert!(matches!(
            backend_error(FetchError::RequestError("refused".into())),
            PageError::Upstream(_)
        ));
    }

    #[test]
    fn test_checked_slug() {
        let mut ctx = RequestContext::new(Method::Get, "/products/aviator-gold");
        ctx.params.insert("slug".into(), "aviator-gold".into());
        assert_eq!(checked_slug(&ctx, "slug").unwrap(), "aviator-gold");

        ctx.params.insert("slug".into(), "../orders".into());
        assert!(checked_slug(&ctx, "slug").is_err());
    }

    #[test]
    fn test_error_page_status() {
        let reply = error_page(&StoreConfig::default(), &PageError::Upstream("timeout".into()));
        assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
        assert!(reply.page.is_some());
    }
}
