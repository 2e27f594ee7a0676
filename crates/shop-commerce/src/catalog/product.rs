//! Product and variant types as served by the catalog API.

use crate::catalog::CategoryRef;
use crate::error::CommerceError;
use crate::ids::{ProductId, VariantId};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Selected option values keyed by option name, e.g. `{"Color": "Black"}`.
pub type OptionSelection = BTreeMap<String, String>;

/// An image attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImage {
    #[serde(default)]
    pub id: Option<i64>,
    pub image: String,
}

/// One value of a product option (e.g. "Black" for "Color").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionValue {
    #[serde(default)]
    pub id: Option<i64>,
    pub value: String,
}

/// A configurable product option (e.g. "Color", "Size").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductOption {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub values: Vec<OptionValue>,
}

/// A purchasable configuration of a product with its own price and stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductVariant {
    pub id: VariantId,
    pub price: Money,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub option_values: OptionSelection,
}

impl ProductVariant {
    /// Whether this variant carries every selected value.
    pub fn matches(&self, selection: &OptionSelection) -> bool {
        selection
            .iter()
            .all(|(name, value)| self.option_values.get(name) == Some(value))
    }

    /// Option values joined for display, e.g. "Color: Black, Size: L".
    pub fn describe(&self) -> String {
        self.option_values
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Money,
    /// Reference price shown struck through when higher than `price`.
    #[serde(default)]
    pub market_price: Option<Money>,
    #[serde(default)]
    pub stock: i64,
    /// Whether the available count is shown to shoppers.
    #[serde(default)]
    pub track_stock: bool,
    #[serde(default)]
    pub fast_shipping: bool,
    /// Free text such as "250g"; used for delivery charge calculation.
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub warranty: Option<String>,
    #[serde(default)]
    pub thumbnail_image: Option<String>,
    /// Trusted HTML from the backend CMS.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub sub_category: Option<CategoryRef>,
    #[serde(default)]
    pub options: Vec<ProductOption>,
    #[serde(default, rename = "variants_read")]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub reviews_count: Option<i64>,
}

impl Product {
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn variant(&self, id: VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// First value of every option; the selection a detail page opens with.
    pub fn default_selection(&self) -> OptionSelection {
        self.options
            .iter()
            .filter_map(|opt| opt.values.first().map(|v| (opt.name.clone(), v.value.clone())))
            .collect()
    }

    /// Find the variant matching every selected option value.
    ///
    /// Products without variants resolve to `None`. A product with options
    /// whose selection matches no variant is an error, since it cannot be
    /// added to the cart.
    pub fn resolve_variant(
        &self,
        selection: &OptionSelection,
    ) -> Result<Option<&ProductVariant>, CommerceError> {
        if self.variants.is_empty() {
            return Ok(None);
        }
        if selection.is_empty() && self.has_options() {
            return Err(CommerceError::OptionsIncomplete);
        }

        match self.variants.iter().find(|v| v.matches(selection)) {
            Some(variant) => Ok(Some(variant)),
            None if self.has_options() => Err(CommerceError::OptionsIncomplete),
            None => Ok(None),
        }
    }

    pub fn unit_price(&self, variant: Option<&ProductVariant>) -> Money {
        variant.map(|v| v.price).unwrap_or(self.price)
    }

    pub fn available_stock(&self, variant: Option<&ProductVariant>) -> i64 {
        variant.map(|v| v.stock).unwrap_or(self.stock)
    }

    pub fn is_out_of_stock(&self, variant: Option<&ProductVariant>) -> bool {
        self.available_stock(variant) <= 0
    }

    /// Market price, when it is above the current price.
    pub fn compare_at_price(&self, variant: Option<&ProductVariant>) -> Option<Money> {
        let current = self.unit_price(variant);
        self.market_price.filter(|m| *m > current)
    }

    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price(None).is_some()
    }

    /// Gallery images, falling back to the thumbnail.
    pub fn gallery(&self) -> Vec<String> {
        if !self.images.is_empty() {
            return self.images.iter().map(|i| i.image.clone()).collect();
        }
        self.thumbnail_image.iter().cloned().collect()
    }

    /// Image for cards and cart lines: the variant image when it has one.
    pub fn display_image(&self, variant: Option<&ProductVariant>) -> Option<String> {
        variant
            .and_then(|v| v.image.clone())
            .or_else(|| self.thumbnail_image.clone())
            .or_else(|| self.images.first().map(|i| i.image.clone()))
    }

    /// Numeric part of the free-text weight, `0.0` when absent or unreadable.
    pub fn weight_value(&self) -> f64 {
        parse_weight(self.weight.as_deref().unwrap_or(""))
    }
}

/// Keep digits and dots, then parse: `"250 g"` becomes `250.0`.
pub fn parse_weight(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: i64, price: i64, stock: i64, opts: &[(&str, &str)]) -> ProductVariant {
        ProductVariant {
            id: VariantId::new(id),
            price: Money::from_rupees(price),
            stock,
            image: None,
            option_values: opts
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn option(name: &str, values: &[&str]) -> ProductOption {
        ProductOption {
            id: None,
            name: name.to_string(),
            values: values
                .iter()
                .map(|v| OptionValue {
                    id: None,
                    value: v.to_string(),
                })
                .collect(),
        }
    }

    fn sunglasses() -> Product {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Aviator",
            "slug": "aviator",
            "price": "2500.00",
            "market_price": "3000.00",
            "stock": 5,
            "weight": "150g",
            "thumbnail_image": "/media/aviator.jpg"
        }))
        .unwrap()
    }

    fn selection(pairs: &[(&str, &str)]) -> OptionSelection {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_deserialize_minimal_product() {
        let p = sunglasses();
        assert_eq!(p.price, Money::from_rupees(2500));
        assert!(p.variants.is_empty());
        assert!(p.is_on_sale());
        assert_eq!(p.gallery(), vec!["/media/aviator.jpg".to_string()]);
    }

    #[test]
    fn test_default_selection_takes_first_values() {
        let mut p = sunglasses();
        p.options = vec![option("Color", &["Black", "Gold"]), option("Size", &["M", "L"])];
        let sel = p.default_selection();
        assert_eq!(sel.get("Color").map(String::as_str), Some("Black"));
        assert_eq!(sel.get("Size").map(String::as_str), Some("M"));
    }

    #[test]
    fn test_resolve_variant() {
        let mut p = sunglasses();
        p.options = vec![option("Color", &["Black", "Gold"])];
        p.variants = vec![
            variant(10, 2600, 2, &[("Color", "Black")]),
            variant(11, 2800, 0, &[("Color", "Gold")]),
        ];

        let v = p.resolve_variant(&selection(&[("Color", "Gold")])).unwrap().unwrap();
        assert_eq!(v.id, VariantId::new(11));
        assert_eq!(p.unit_price(Some(v)), Money::from_rupees(2800));
        assert!(p.is_out_of_stock(Some(v)));
    }

    #[test]
    fn test_resolve_variant_unmatched_selection() {
        let mut p = sunglasses();
        p.options = vec![option("Color", &["Black"])];
        p.variants = vec![variant(10, 2600, 2, &[("Color", "Black")])];

        assert_eq!(
            p.resolve_variant(&selection(&[("Color", "Red")])),
            Err(CommerceError::OptionsIncomplete)
        );
        assert_eq!(
            p.resolve_variant(&OptionSelection::new()),
            Err(CommerceError::OptionsIncomplete)
        );
    }

    #[test]
    fn test_resolve_variant_without_variants() {
        let p = sunglasses();
        assert_eq!(p.resolve_variant(&OptionSelection::new()), Ok(None));
        assert_eq!(p.unit_price(None), Money::from_rupees(2500));
        assert_eq!(p.available_stock(None), 5);
    }

    #[test]
    fn test_compare_at_price_hidden_when_lower() {
        let mut p = sunglasses();
        p.market_price = Some(Money::from_rupees(2000));
        assert_eq!(p.compare_at_price(None), None);
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("250g"), 250.0);
        assert_eq!(parse_weight("1.5 kg"), 1.5);
        assert_eq!(parse_weight("n/a"), 0.0);
        assert_eq!(sunglasses().weight_value(), 150.0);
    }
}
