//! Shell template abstraction.

use crate::escape::{escape_attr, escape_html};

/// Head content for the shell.
#[derive(Debug, Clone, Default)]
pub struct HeadContent {
    /// Page title.
    pub title: Option<String>,
    /// `<meta name=..>` tags.
    pub meta: Vec<(String, String)>,
    /// `<meta property=..>` tags (Open Graph).
    pub properties: Vec<(String, String)>,
    pub canonical: Option<String>,
    pub icon: Option<String>,
    /// Link tags and inline styles, rendered verbatim.
    pub links: Vec<String>,
}

impl HeadContent {
    /// Create new head content with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Add a meta tag.
    pub fn with_meta(mut self, name: &str, content: &str) -> Self {
        self.meta.push((name.to_string(), content.to_string()));
        self
    }

    /// Add an Open Graph style `property` meta tag.
    pub fn with_property(mut self, property: &str, content: &str) -> Self {
        self.properties
            .push((property.to_string(), content.to_string()));
        self
    }

    pub fn with_canonical(mut self, href: impl Into<String>) -> Self {
        self.canonical = Some(href.into());
        self
    }

    pub fn with_icon(mut self, href: impl Into<String>) -> Self {
        self.icon = Some(href.into());
        self
    }

    pub fn with_robots(self, directive: &str) -> Self {
        self.with_meta("robots", directive)
    }

    /// Add a stylesheet link.
    pub fn with_stylesheet(mut self, href: &str) -> Self {
        self.links.push(format!(
            r#"<link rel="stylesheet" href="{}">"#,
            escape_attr(href)
        ));
        self
    }

    /// Add inline CSS styles.
    pub fn with_style(mut self, css: &str) -> Self {
        self.links.push(format!("<style>{}</style>", css));
        self
    }

    /// Look up a `name` meta tag.
    pub fn meta_content(&self, name: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_str())
    }

    /// Render head content to HTML.
    pub fn render(&self) -> String {
        let mut html = String::from(
            "<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        );

        if let Some(title) = &self.title {
            html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
        }

        for (name, content) in &self.meta {
            html.push_str(&format!(
                "<meta name=\"{}\" content=\"{}\">\n",
                escape_attr(name),
                escape_attr(content)
            ));
        }

        for (property, content) in &self.properties {
            html.push_str(&format!(
                "<meta property=\"{}\" content=\"{}\">\n",
                escape_attr(property),
                escape_attr(content)
            ));
        }

        if let Some(href) = &self.canonical {
            html.push_str(&format!(
                "<link rel=\"canonical\" href=\"{}\">\n",
                escape_attr(href)
            ));
        }

        if let Some(href) = &self.icon {
            html.push_str(&format!("<link rel=\"icon\" href=\"{}\">\n", escape_attr(href)));
        }

        for link in &self.links {
            html.push_str(link);
            html.push('\n');
        }

        html
    }
}

/// Document skeleton wrapped around the streamed sections.
#[derive(Debug, Clone)]
pub struct Shell {
    /// Include doctype declaration.
    pub doctype: bool,
    pub lang: String,
    pub head: HeadContent,
    /// HTML before sections (opening body, header, wrapper divs).
    pub body_start: String,
    /// HTML after sections (footer and closing tags).
    pub body_end: String,
}

impl Shell {
    pub fn new(head: HeadContent) -> Self {
        Self {
            doctype: true,
            lang: "en".to_string(),
            head,
            body_start: "<body>\n<main>\n".to_string(),
            body_end: "</main>\n</body>\n</html>".to_string(),
        }
    }

    pub fn with_body_start(mut self, html: impl Into<String>) -> Self {
        self.body_start = html.into();
        self
    }

    pub fn with_body_end(mut self, html: impl Into<String>) -> Self {
        self.body_end = html.into();
        self
    }

    /// Render the opening part of the shell (before sections).
    pub fn render_opening(&self) -> String {
        let mut html = String::new();

        if self.doctype {
            html.push_str("<!DOCTYPE html>\n");
        }

        html.push_str(&format!("<html lang=\"{}\">\n<head>\n", escape_attr(&self.lang)));
        html.push_str(&self.head.render());
        html.push_str("</head>\n");
        html.push_str(&self.body_start);

        html
    }

    /// Render the closing part of the shell (after sections).
    pub fn render_closing(&self) -> String {
        self.body_end.clone()
    }
}
