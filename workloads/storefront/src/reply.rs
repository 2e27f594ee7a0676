//! What a route hands back, and how a page is streamed.

use futures::future::{self, LocalBoxFuture};
use futures::stream::{FuturesOrdered, StreamExt};
use futures::{FutureExt, Sink};
use http::StatusCode;
use shop_sdk::prelude::*;

use crate::layout::{render_flash, shell};
use crate::session::Flash;

/// A part of the page body, streamed in declaration order.
pub enum Part<'a> {
    /// Rendered before the shell goes out.
    Ready(SectionOutput),
    /// Loaded after the shell; polled concurrently with the other deferred
    /// parts.
    Deferred(LocalBoxFuture<'a, SectionOutput>),
}

/// An HTML page: metadata plus the sections that make up its body.
pub struct Page<'a> {
    pub meta: PageMeta,
    pub flash: Option<Flash>,
    pub cart_count: i64,
    pub parts: Vec<Part<'a>>,
}

impl<'a> Page<'a> {
    pub fn new(meta: PageMeta) -> Self {
        Self {
            meta,
            flash: None,
            cart_count: 0,
            parts: Vec::new(),
        }
    }

    pub fn section(mut self, name: &str, html: impl Into<String>) -> Self {
        self.parts.push(Part::Ready(SectionOutput {
            name: name.to_string(),
            html: html.into(),
            used_fallback: false,
            error: None,
        }));
        self
    }

    pub fn deferred<F>(mut self, section: F) -> Self
    where
        F: std::future::Future<Output = SectionOutput> + 'a,
    {
        self.parts.push(Part::Deferred(section.boxed_local()));
        self
    }
}

/// Response produced by a route.
pub struct Reply<'a> {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub page: Option<Page<'a>>,
}

impl<'a> Reply<'a> {
    pub fn page(page: Page<'a>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            page: Some(page),
        }
    }

    /// `303 See Other`, the answer to a handled form post.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SEE_OTHER,
            headers: vec![("location".to_string(), location.into())],
            page: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }
}

/// Stream a page shell first, then each part in order.
///
/// Returns the sections as sent, for logging and metrics.
pub async fn stream_page<S>(
    config: &StoreConfig,
    page: Page<'_>,
    sink: &mut StreamingSink<S>,
) -> Result<Vec<SectionOutput>, PageError>
where
    S: Sink<Vec<u8>> + Unpin,
    S::Error: std::fmt::Display,
{
    let shell = shell(config, &page.meta, page.cart_count);
    sink.send_shell(&shell.render_opening()).await?;

    if let Some(flash) = &page.flash {
        sink.send_section("flash", &render_flash(flash)).await?;
    }

    let mut pending: FuturesOrdered<LocalBoxFuture<'_, SectionOutput>> = page
        .parts
        .into_iter()
        .map(|part| match part {
            Part::Ready(output) => future::ready(output).boxed_local(),
            Part::Deferred(section) => section,
        })
        .collect();

    let mut sent = Vec::new();
    while let Some(output) = pending.next().await {
        sink.send_output(&output).await?;
        sent.push(output);
    }

    sink.send_raw(shell.render_closing().into_bytes()).await?;
    sink.complete().await?;
    Ok(sent)
}
