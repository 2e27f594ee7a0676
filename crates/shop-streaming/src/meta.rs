//! Per-page metadata with site-wide defaults.

use shop_core::StoreConfig;

use crate::shell::HeadContent;

pub const DEFAULT_ICON: &str = "/favicon.ico";

/// Metadata a page may override. Unset fields fall back to the site config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Path of the page, used for the canonical and `og:url` links.
    pub path: Option<String>,
    pub no_index: bool,
}

impl PageMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title shown as `"{title} | {site}"`.
    pub fn titled(config: &StoreConfig, title: &str) -> Self {
        Self {
            title: Some(format!("{} | {}", title, config.site_name)),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        if !description.trim().is_empty() {
            self.description = Some(description);
        }
        self
    }

    pub fn with_image(mut self, image: Option<&str>) -> Self {
        self.image = image.filter(|i| !i.is_empty()).map(str::to_string);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn no_index(mut self) -> Self {
        self.no_index = true;
        self
    }

    /// Build the `<head>` for this page.
    pub fn to_head(&self, config: &StoreConfig) -> HeadContent {
        construct_metadata(
            config,
            self.title.as_deref(),
            self.description.as_deref(),
            self.image.as_deref(),
            self.path.as_deref(),
            self.no_index,
        )
    }
}

/// Title, description, sharing image and robots tags for a page.
///
/// Open Graph and Twitter cards repeat the title and description; the image
/// defaults to the configured `og_image`. `no_index` adds
/// `robots: noindex, nofollow`.
pub fn construct_metadata(
    config: &StoreConfig,
    title: Option<&str>,
    description: Option<&str>,
    image: Option<&str>,
    path: Option<&str>,
    no_index: bool,
) -> HeadContent {
    let title = title.unwrap_or(&config.default_title);
    let description = description.unwrap_or(&config.default_description);
    let image = config.absolute_url(image.unwrap_or(&config.og_image));

    let mut head = HeadContent::new(title)
        .with_meta("description", description)
        .with_property("og:title", title)
        .with_property("og:description", description)
        .with_property("og:site_name", &config.site_name)
        .with_property("og:type", "website")
        .with_property("og:locale", "en_US")
        .with_property("og:image", &image)
        .with_meta("twitter:card", "summary_large_image")
        .with_meta("twitter:title", title)
        .with_meta("twitter:description", description)
        .with_meta("twitter:image", &image)
        .with_icon(DEFAULT_ICON);

    if let Some(path) = path {
        let url = config.absolute_url(path);
        head = head.with_property("og:url", &url).with_canonical(url);
    }

    if no_index {
        head = head.with_robots("noindex, nofollow");
    }

    head
}
