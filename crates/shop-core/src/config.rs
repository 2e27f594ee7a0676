//! Storefront configuration.
//!
//! Values come from a TOML document (local runs and tests) or from a
//! variable lookup; the component passes Spin application variables.
//! Every field has a default so a bare deployment only needs the API URL.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Brand name used in titles and the header.
    pub site_name: String,
    /// Public origin, used for canonical and Open Graph URLs.
    pub site_url: String,
    /// Base URL of the commerce backend, e.g. `https://api.example.com/api/v1`.
    pub api_base_url: String,
    /// Title used when a page does not set its own.
    pub default_title: String,
    /// Default meta description.
    pub default_description: String,
    /// Path of the default social sharing image.
    pub og_image: String,
    pub products_page_size: u32,
    pub blog_page_size: u32,
    /// Session lifetime in seconds.
    pub session_ttl_secs: u64,
    /// Minimum log level (`debug`, `info`, `warn`, `error`).
    pub log_level: String,
    /// `json` or `human`.
    pub log_format: String,
    /// Key-value store label.
    pub kv_store: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            site_name: "NepGlass".to_string(),
            site_url: "https://nepglass.com".to_string(),
            api_base_url: "http://localhost:8000/api/v1".to_string(),
            default_title: "NepGlass | Premium Eyewear in Nepal".to_string(),
            default_description: "Specializing in premium lens solutions, stylish frames, \
                                  and trendsetting sunglasses designed for style and comfort."
                .to_string(),
            og_image: "/og-image.jpg".to_string(),
            products_page_size: 12,
            blog_page_size: 9,
            session_ttl_secs: 60 * 60 * 24 * 30,
            log_level: "info".to_string(),
            log_format: "json".to_string(),
            kv_store: "default".to_string(),
        }
    }
}

/// Variable names read by [`StoreConfig::from_lookup`].
pub const CONFIG_VARIABLES: [&str; 12] = [
    "site_name",
    "site_url",
    "api_base_url",
    "default_title",
    "default_description",
    "og_image",
    "products_page_size",
    "blog_page_size",
    "session_ttl_secs",
    "log_level",
    "log_format",
    "kv_store",
];

impl StoreConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: StoreConfig =
            toml::from_str(source).context("Failed to parse storefront config")?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from a variable provider onto the defaults.
    ///
    /// Missing or empty variables keep the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StoreConfig::default();
        for name in CONFIG_VARIABLES {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                config
                    .set(name, value.trim())
                    .with_context(|| format!("Invalid value for variable '{}'", name))?;
            }
        }
        config.validate()?;
        Ok(config)
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "site_name" => self.site_name = value.to_string(),
            "site_url" => self.site_url = value.trim_end_matches('/').to_string(),
            "api_base_url" => self.api_base_url = value.to_string(),
            "default_title" => self.default_title = value.to_string(),
            "default_description" => self.default_description = value.to_string(),
            "og_image" => self.og_image = value.to_string(),
            "products_page_size" => self.products_page_size = value.parse()?,
            "blog_page_size" => self.blog_page_size = value.parse()?,
            "session_ttl_secs" => self.session_ttl_secs = value.parse()?,
            "log_level" => self.log_level = value.to_string(),
            "log_format" => self.log_format = value.to_string(),
            "kv_store" => self.kv_store = value.to_string(),
            other => bail!("Unknown config variable '{}'", other),
        }
        Ok(())
    }

    /// Check the values a request cannot work without.
    pub fn validate(&self) -> Result<()> {
        let api = Url::parse(&self.api_base_url)
            .with_context(|| format!("api_base_url is not a URL: {}", self.api_base_url))?;
        if !matches!(api.scheme(), "http" | "https") {
            bail!("api_base_url must be http or https, got '{}'", api.scheme());
        }
        if self.products_page_size == 0 || self.blog_page_size == 0 {
            bail!("page sizes must be greater than zero");
        }
        if self.session_ttl_secs == 0 {
            bail!("session_ttl_secs must be greater than zero");
        }
        Ok(())
    }

    /// Absolute URL on the public site for a path.
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.site_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_validate() {
        assert!(StoreConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = StoreConfig::from_toml(
            r#"
            api_base_url = "https://api.nepglass.com/api/v1"
            products_page_size = 24
            "#,
        )
        .unwrap();
        assert_eq!(config.products_page_size, 24);
        assert_eq!(config.blog_page_size, 9);
        assert_eq!(config.site_name, "NepGlass");
    }

    #[test]
    fn test_from_toml_rejects_bad_url() {
        let err = StoreConfig::from_toml(r#"api_base_url = "not a url""#).unwrap_err();
        assert!(err.to_string().contains("api_base_url"));
        assert!(StoreConfig::from_toml(r#"api_base_url = "ftp://x.example""#).is_err());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("api_base_url", "https://api.example.com/v1"),
            ("site_url", "https://shop.example.com/"),
            ("log_format", "human"),
            ("site_name", ""),
        ]
        .into_iter()
        .collect();

        let config = StoreConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com/v1");
        assert_eq!(config.site_url, "https://shop.example.com");
        assert_eq!(config.log_format, "human");
        assert_eq!(config.site_name, "NepGlass");
    }

    #[test]
    fn test_from_lookup_bad_number() {
        let err = StoreConfig::from_lookup(|k| {
            (k == "products_page_size").then(|| "twelve".to_string())
        })
        .unwrap_err();
        assert!(format!("{:#}", err).contains("products_page_size"));
    }

    #[test]
    fn test_absolute_url() {
        let config = StoreConfig::default();
        assert_eq!(config.absolute_url("/og-image.jpg"), "https://nepglass.com/og-image.jpg");
        assert_eq!(
            config.absolute_url("https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
    }
}
