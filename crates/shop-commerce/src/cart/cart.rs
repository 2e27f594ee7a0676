//! Session cart and line item types.

use crate::catalog::{OptionSelection, Product, ProductVariant};
use crate::error::CommerceError;
use crate::ids::{ProductId, VariantId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 99;

/// Product fields captured when a line is added.
///
/// The snapshot is what the cart renders and prices from until checkout,
/// so a later catalog change does not rewrite an open cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Money,
    #[serde(default)]
    pub thumbnail_image: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
}

/// The variant fields a cart line needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartVariant {
    pub id: VariantId,
    pub price: Money,
    #[serde(default)]
    pub option_values: OptionSelection,
}

impl CartProduct {
    pub fn snapshot(product: &Product, variant: Option<&ProductVariant>) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            price: product.price,
            thumbnail_image: product.display_image(variant),
            weight: product.weight.clone(),
        }
    }
}

impl From<&ProductVariant> for CartVariant {
    fn from(v: &ProductVariant) -> Self {
        Self {
            id: v.id,
            price: v.price,
            option_values: v.option_values.clone(),
        }
    }
}

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product: CartProduct,
    #[serde(default)]
    pub variant: Option<CartVariant>,
    pub quantity: i64,
}

impl CartItem {
    /// Line identity: one line per product-variant pair.
    pub fn key(&self) -> (ProductId, Option<VariantId>) {
        (self.product.id, self.variant.as_ref().map(|v| v.id))
    }

    pub fn matches(&self, product_id: ProductId, variant_id: Option<VariantId>) -> bool {
        self.key() == (product_id, variant_id)
    }

    /// Variant price when a variant is chosen, otherwise the product price.
    pub fn unit_price(&self) -> Money {
        self.variant
            .as_ref()
            .map(|v| v.price)
            .unwrap_or(self.product.price)
    }

    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price().try_multiply(self.quantity)
    }

    pub fn weight(&self) -> f64 {
        crate::catalog::parse_weight(self.product.weight.as_deref().unwrap_or("")) * self.quantity as f64
    }

    /// Stable token identifying the line in forms, e.g. `"12:34"` or `"12:-"`.
    pub fn form_key(&self) -> String {
        match &self.variant {
            Some(v) => format!("{}:{}", self.product.id, v.id),
            None => format!("{}:-", self.product.id),
        }
    }
}

/// Parse a line token produced by [`CartItem::form_key`].
pub fn parse_line_key(token: &str) -> Option<(ProductId, Option<VariantId>)> {
    let (product, variant) = token.split_once(':')?;
    let product = product.parse().ok()?;
    let variant = match variant {
        "-" | "" => None,
        v => Some(v.parse().ok()?),
    };
    Some((product, variant))
}

/// The shopping cart held in a browsing session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product to the cart.
    ///
    /// A line with the same product and variant absorbs the quantity;
    /// otherwise a new line is appended. Returns an error if:
    /// - Quantity is not positive
    /// - The resulting line would exceed MAX_QUANTITY_PER_ITEM
    pub fn add(
        &mut self,
        product: CartProduct,
        quantity: i64,
        variant: Option<CartVariant>,
    ) -> Result<i64, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        let variant_id = variant.as_ref().map(|v| v.id);
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.matches(product.id, variant_id))
        {
            let new_quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            if new_quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }
            existing.quantity = new_quantity;
            return Ok(new_quantity);
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        self.items.push(CartItem {
            product,
            variant,
            quantity,
        });
        Ok(quantity)
    }

    /// Remove the line for a product-variant pair.
    pub fn remove(&mut self, product_id: ProductId, variant_id: Option<VariantId>) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| !i.matches(product_id, variant_id));
        self.items.len() < len_before
    }

    /// Set the quantity of a line.
    ///
    /// A quantity below one removes the line. Returns whether a line matched.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
        variant_id: Option<VariantId>,
    ) -> Result<bool, CommerceError> {
        if quantity < 1 {
            return Ok(self.remove(product_id, variant_id));
        }
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        match self
            .items
            .iter_mut()
            .find(|i| i.matches(product_id, variant_id))
        {
            Some(item) => {
                item.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, product_id: ProductId, variant_id: Option<VariantId>) -> Option<&CartItem> {
        self.items.iter().find(|i| i.matches(product_id, variant_id))
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of unit price times quantity over all lines.
    pub fn total_price(&self) -> Result<Money, CommerceError> {
        self.items
            .iter()
            .try_fold(Money::ZERO, |acc, item| acc.try_add(&item.line_total()?))
    }

    /// Sum of line weights, in the unit the catalog uses.
    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(CartItem::weight).sum()
    }
}
