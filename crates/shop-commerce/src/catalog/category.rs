//! Category types.

use crate::ids::{CategoryId, SubCategoryId};
use serde::{Deserialize, Serialize};

/// The short category reference embedded in products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Category {
    /// Description for the category header, with a generic fallback.
    pub fn headline(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => format!(
                "Browse our curated selection of {}. Find the perfect pair that matches your style.",
                self.name
            ),
        }
    }
}

/// A subcategory within a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubCategory {
    pub id: SubCategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub category: Option<CategoryId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_falls_back() {
        let mut c = Category {
            id: CategoryId::new(1),
            name: "Sunglasses".to_string(),
            slug: "sunglasses".to_string(),
            description: Some("  ".to_string()),
            image: None,
        };
        assert!(c.headline().starts_with("Browse our curated selection of Sunglasses"));

        c.description = Some("Shades for every season".to_string());
        assert_eq!(c.headline(), "Shades for every season");
    }
}
