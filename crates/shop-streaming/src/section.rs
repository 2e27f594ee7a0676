//! Named, independently streamable page parts.

use std::fmt::Display;

/// A section of a page streamed after the shell.
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    /// Backend dependency tags this section reads.
    pub dependencies: Vec<String>,
    /// HTML streamed instead when the section's data cannot be loaded.
    pub fallback: Option<String>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            fallback: None,
        }
    }

    pub fn depends_on(mut self, tag: impl Into<String>) -> Self {
        self.dependencies.push(tag.into());
        self
    }

    pub fn with_fallback(mut self, html: impl Into<String>) -> Self {
        self.fallback = Some(html.into());
        self
    }

    /// Pick the HTML to stream from a rendering attempt.
    ///
    /// A failed attempt uses the fallback, or an empty string when none is set.
    pub fn resolve<E: Display>(&self, rendered: Result<String, E>) -> SectionOutput {
        match rendered {
            Ok(html) => SectionOutput {
                name: self.name.clone(),
                html,
                used_fallback: false,
                error: None,
            },
            Err(e) => SectionOutput {
                name: self.name.clone(),
                html: self.fallback.clone().unwrap_or_default(),
                used_fallback: true,
                error: Some(e.to_string()),
            },
        }
    }
}

/// HTML ready to stream for a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOutput {
    pub name: String,
    pub html: String,
    pub used_fallback: bool,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_success() {
        let section = Section::new("testimonials").depends_on("content");
        let out = section.resolve::<String>(Ok("<ul></ul>".to_string()));
        assert_eq!(out.html, "<ul></ul>");
        assert!(!out.used_fallback);
        assert_eq!(section.dependencies, vec!["content".to_string()]);
    }

    #[test]
    fn test_resolve_failure_uses_fallback() {
        let section = Section::new("faqs").with_fallback("<p>FAQs are unavailable.</p>");
        let out = section.resolve::<&str>(Err("HTTP 503"));
        assert!(out.used_fallback);
        assert_eq!(out.html, "<p>FAQs are unavailable.</p>");
        assert_eq!(out.error.as_deref(), Some("HTTP 503"));

        let bare = Section::new("related").resolve::<&str>(Err("timeout"));
        assert_eq!(bare.html, "");
    }
}
