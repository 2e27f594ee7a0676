//! Editorial content: blog posts, FAQs, testimonials and the contact form.

use crate::checkout::is_valid_email;
use crate::error::CommerceError;
use crate::ids::BlogId;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogTag {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogAuthor {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogPost {
    pub id: BlogId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub thumbnail_image: Option<String>,
    /// Trusted HTML from the backend CMS.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub author: Option<BlogAuthor>,
    #[serde(default)]
    pub tags: Vec<BlogTag>,
}

impl BlogPost {
    /// First tag name, or the given fallback.
    pub fn primary_tag<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.tags.first().map(|t| t.name.as_str()).unwrap_or(fallback)
    }

    pub fn author_name(&self) -> String {
        match &self.author {
            Some(a) => format!("{} {}", a.first_name, a.last_name).trim().to_string(),
            None => "Admin".to_string(),
        }
    }

    /// Publication date as `Jan 05, 2026`.
    ///
    /// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates.
    pub fn published_on(&self) -> Option<String> {
        let raw = self.created_at.as_deref()?.trim();
        let date = DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .ok()?;
        Some(date.format("%b %d, %Y").to_string())
    }

    /// Plain-text teaser built from the HTML content.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let text = strip_tags(&self.content);
        if text.chars().count() <= max_chars {
            return text;
        }
        let cut: String = text.chars().take(max_chars).collect();
        match cut.rfind(' ') {
            Some(idx) if idx > 0 => format!("{}…", &cut[..idx]),
            _ => format!("{}…", cut),
        }
    }
}

/// Drop markup and collapse whitespace.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Faq {
    #[serde(alias = "q")]
    pub question: String,
    #[serde(alias = "a")]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Testimonial {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "message")]
    pub comment: String,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
}

/// The contact form as submitted by a visitor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

/// Body of the contact endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub message: String,
}

impl ContactForm {
    pub fn errors(&self) -> Vec<CommerceError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(CommerceError::validation("name", "This field is required"));
        }
        if !is_valid_email(&self.email) {
            errors.push(CommerceError::validation("email", "Enter a valid email address"));
        }
        if self.message.trim().is_empty() {
            errors.push(CommerceError::validation("message", "This field is required"));
        }
        errors
    }

    /// Validate and build the payload; the subject is folded into the message.
    pub fn into_message(self) -> Result<ContactMessage, Vec<CommerceError>> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(errors);
        }
        let subject = self.subject.trim();
        let message = if subject.is_empty() {
            self.message
        } else {
            format!("Subject: {}\n\n{}", subject, self.message)
        };
        Ok(ContactMessage {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: self.phone.trim().to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> BlogPost {
        BlogPost {
            id: BlogId::new(1),
            title: "Choosing frames".to_string(),
            slug: "choosing-frames".to_string(),
            thumbnail_image: None,
            content: "<p>Round faces suit <b>angular</b> frames.</p><p>Square faces suit round ones.</p>"
                .to_string(),
            created_at: Some("2026-01-05T09:30:00Z".to_string()),
            author: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_published_on() {
        assert_eq!(post().published_on().as_deref(), Some("Jan 05, 2026"));

        let mut p = post();
        p.created_at = Some("2025-12-24".to_string());
        assert_eq!(p.published_on().as_deref(), Some("Dec 24, 2025"));

        p.created_at = Some("yesterday".to_string());
        assert_eq!(p.published_on(), None);
    }

    #[test]
    fn test_tag_and_author_fallbacks() {
        let mut p = post();
        assert_eq!(p.primary_tag("Style Guide"), "Style Guide");
        assert_eq!(p.author_name(), "Admin");
        p.tags.push(BlogTag {
            name: "Trends".to_string(),
        });
        assert_eq!(p.primary_tag("Style Guide"), "Trends");
    }

    #[test]
    fn test_excerpt_strips_markup() {
        let p = post();
        assert_eq!(
            p.excerpt(200),
            "Round faces suit angular frames. Square faces suit round ones."
        );
        assert_eq!(p.excerpt(20), "Round faces suit…");
    }

    #[test]
    fn test_faq_accepts_short_keys() {
        let faq: Faq = serde_json::from_str(r#"{"q": "Do you ship?", "a": "Yes."}"#).unwrap();
        assert_eq!(faq.question, "Do you ship?");
    }

    #[test]
    fn test_contact_subject_folded_into_message() {
        let form = ContactForm {
            name: "Gita".to_string(),
            email: "gita@example.com".to_string(),
            phone: "".to_string(),
            subject: "Returns".to_string(),
            message: "Can I exchange a frame?".to_string(),
        };
        let msg = form.into_message().unwrap();
        assert_eq!(msg.message, "Subject: Returns\n\nCan I exchange a frame?");
    }

    #[test]
    fn test_contact_validation() {
        let errors = ContactForm::default().into_message().unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
