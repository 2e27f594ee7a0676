//! FAQ page.

use shop_sdk::prelude::*;

use crate::app::App;
use crate::pages::section_fallback;
use crate::reply::{Page, Reply};

pub async fn page<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    _ctx: &RequestContext,
) -> Result<Reply<'a>, PageError> {
    let meta = PageMeta::titled(&app.config, "FAQs")
        .with_description("Answers to common questions about orders, delivery, lenses and frames.")
        .with_path("/faqs");
    let api = &app.api;

    let page = Page::new(meta)
        .section(
            "faq-header",
            r#"<header class="page-header"><h1>Frequently Asked Questions</h1><p>Everything you need to know about shopping with us.</p></header>"#,
        )
        .deferred(async move {
            Section::new("faqs")
                .depends_on(DependencyTag::Content.name())
                .with_fallback(section_fallback(
                    "We couldn't load the questions right now. Please try again shortly.",
                ))
                .resolve(api.faqs().await.map(|faqs| {
                    if faqs.is_empty() {
                        r#"<p class="empty-state">No questions yet.</p>"#.to_string()
                    } else {
                        render_faq_list(&faqs)
                    }
                }))
        });

    Ok(Reply::page(page))
}

/// Collapsible question list. Answers are trusted backend HTML.
pub fn render_faq_list(faqs: &[Faq]) -> String {
    let items: String = faqs
        .iter()
        .map(|faq| {
            format!(
                r#"<details><summary>{}</summary><div class="faq-answer">{}</div></details>"#,
                escape_html(&faq.question),
                faq.answer
            )
        })
        .collect();
    format!(r#"<div class="faq-list">{}</div>"#, items)
}
