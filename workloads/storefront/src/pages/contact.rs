//! Contact page and form submission.

use http::StatusCode;
use shop_sdk::prelude::*;

use crate::app::App;
use crate::layout::field_error;
use crate::reply::{Page, Reply};

pub async fn page<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
) -> Result<Reply<'a>, PageError> {
    let notice = if ctx.query_param("sent") == Some("1") {
        Some(Notice::Sent)
    } else {
        None
    };
    Ok(render(app, &ContactForm::default(), &[], notice))
}

/// `POST /contact`. Invalid input re-renders the form with its values.
pub async fn submit<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    ctx: &RequestContext,
) -> Result<Reply<'a>, PageError> {
    let form = ContactForm {
        name: ctx.form_text("name"),
        email: ctx.form_text("email"),
        phone: ctx.form_text("phone"),
        subject: ctx.form_text("subject"),
        message: ctx.form_text("message"),
    };

    let message = match form.clone().into_message() {
        Ok(message) => message,
        Err(errors) => {
            return Ok(render(app, &form, &errors, None).with_status(StatusCode::UNPROCESSABLE_ENTITY))
        }
    };

    match app.api.submit_contact(&message).await {
        Ok(()) => Ok(Reply::redirect("/contact?sent=1")),
        Err(e) if e.is_client_error() => {
            let reason = e
                .backend_message()
                .unwrap_or_else(|| "Please check your details and try again.".to_string());
            Ok(render(app, &form, &[], Some(Notice::Rejected(reason)))
                .with_status(StatusCode::UNPROCESSABLE_ENTITY))
        }
        Err(_) => Ok(render(app, &form, &[], Some(Notice::Unavailable))
            .with_status(StatusCode::BAD_GATEWAY)),
    }
}

enum Notice {
    Sent,
    Rejected(String),
    Unavailable,
}

impl Notice {
    fn render(&self) -> String {
        let (class, text) = match self {
            Notice::Sent => (
                "flash flash--success",
                "Thank you! Your message has been sent. We'll get back to you soon.",
            ),
            Notice::Rejected(reason) => ("flash flash--error", reason.as_str()),
            Notice::Unavailable => (
                "flash flash--error",
                "We couldn't send your message right now. Please try again shortly.",
            ),
        };
        format!(r#"<div class="{}" role="status">{}</div>"#, class, escape_html(text))
    }
}

fn render<'a, T: HttpTransport, S: KvStore>(
    app: &'a App<T, S>,
    form: &ContactForm,
    errors: &[CommerceError],
    notice: Option<Notice>,
) -> Reply<'a> {
    let meta = PageMeta::titled(&app.config, "Contact Us")
        .with_description("Questions about frames, lenses or an order? Get in touch.")
        .with_path("/contact");

    let page = Page::new(meta)
        .section(
            "contact-header",
            r#"<header class="page-header"><h1>Get in Touch</h1><p>Have a question about our eyewear? We'd love to hear from you.</p></header>"#,
        )
        .section(
            "contact",
            format!(
                r#"<div class="contact">
    <aside>
        <h2>Email</h2>
        <p>hello@nepglass.com.np<br>support@nepglass.com.np</p>
        <h2>Phone</h2>
        <p>+977-1-4XXXXXX</p>
        <h2>Visit</h2>
        <p>Kathmandu, Nepal<br>Durbarmarg Branch<br>New Road Branch</p>
    </aside>
    <div>
        {notice}
        {form}
    </div>
</div>"#,
                notice = notice.map(|n| n.render()).unwrap_or_default(),
                form = render_form(form, errors)
            ),
        );
    Reply::page(page)
}

fn render_form(form: &ContactForm, errors: &[CommerceError]) -> String {
    format!(
        r#"<form method="post" action="/contact">
    <div class="form-row"><label>Name <input name="name" value="{name}" required></label>{name_error}</div>
    <div class="form-row"><label>Email <input type="email" name="email" value="{email}" required></label>{email_error}</div>
    <div class="form-row"><label>Phone <input name="phone" value="{phone}"></label></div>
    <div class="form-row"><label>Subject <input name="subject" value="{subject}"></label></div>
    <div class="form-row"><label>Message <textarea name="message" rows="5" required>{message}</textarea></label>{message_error}</div>
    <button class="btn" type="submit">Send Message</button>
</form>"#,
        name = escape_attr(&form.name),
        name_error = field_error(errors, "name"),
        email = escape_attr(&form.email),
        email_error = field_error(errors, "email"),
        phone = escape_attr(&form.phone),
        subject = escape_attr(&form.subject),
        message = escape_html(&form.message),
        message_error = field_error(errors, "message")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_keeps_values_and_errors() {
        let form = ContactForm {
            name: "Sita".to_string(),
            email: "not-an-email".to_string(),
            message: "<hello>".to_string(),
            ..ContactForm::default()
        };
        let html = render_form(&form, &form.errors());
        assert!(html.contains(r#"name="name" value="Sita""#));
        assert!(html.contains("&lt;hello&gt;</textarea>"));
        assert!(html.contains(r#"<span class="field-error">Enter a valid email address</span>"#));
        assert!(!html.contains("This field is required"));
    }

    #[test]
    fn test_notice_escapes_backend_reason() {
        let html = Notice::Rejected("Bad <email>".to_string()).render();
        assert!(html.contains("flash--error"));
        assert!(html.contains("Bad &lt;email&gt;"));
    }
}
