//! Order payloads: the request checkout submits and the order the backend returns.

use crate::cart::Cart;
use crate::checkout::{AppliedPromo, CheckoutTotals, ShippingInfo};
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId, PromoCodeId, VariantId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Payment methods the storefront offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentType {
    /// Cash on delivery.
    #[default]
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::CashOnDelivery => "cod",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentType::CashOnDelivery => "Cash on Delivery",
        }
    }
}

/// Display name for a payment type string returned by the backend.
pub fn payment_display(raw: &str) -> String {
    if raw == PaymentType::CashOnDelivery.as_str() {
        PaymentType::CashOnDelivery.display_name().to_string()
    } else {
        raw.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRequestItem {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: i64,
    /// Unit price at the time of ordering.
    pub price: Money,
}

/// Body of the create-order call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub shipping_address: String,
    pub city: String,
    pub total_amount: Money,
    pub delivery_charge: Money,
    pub note: String,
    pub items: Vec<OrderRequestItem>,
    pub payment_type: PaymentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<PromoCodeId>,
    pub discount_amount: Money,
}

impl OrderRequest {
    pub fn build(
        cart: &Cart,
        shipping: &ShippingInfo,
        totals: &CheckoutTotals,
        promo: Option<&AppliedPromo>,
    ) -> Result<Self, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        shipping.validate()?;

        let items = cart
            .items
            .iter()
            .map(|item| OrderRequestItem {
                product_id: item.product.id,
                variant_id: item.variant.as_ref().map(|v| v.id),
                quantity: item.quantity,
                price: item.unit_price(),
            })
            .collect();

        Ok(Self {
            customer_name: shipping.customer_name(),
            customer_email: shipping.email.trim().to_string(),
            customer_phone: shipping.phone.trim().to_string(),
            customer_address: shipping.address.trim().to_string(),
            shipping_address: shipping.address.trim().to_string(),
            city: shipping.city.clone(),
            total_amount: totals.total,
            delivery_charge: totals.delivery_charge,
            note: shipping.note.clone(),
            items,
            payment_type: PaymentType::CashOnDelivery,
            promo_code: promo.map(|p| p.id),
            discount_amount: totals.discount,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub thumbnail_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderOptionValue {
    #[serde(default)]
    pub id: Option<i64>,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderVariant {
    pub id: VariantId,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub option_values: Vec<OrderOptionValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub product: Option<OrderProduct>,
    #[serde(default)]
    pub variant: Option<OrderVariant>,
    pub quantity: i64,
    pub price: Money,
}

impl OrderItem {
    pub fn image(&self) -> Option<&str> {
        self.variant
            .as_ref()
            .and_then(|v| v.image.as_deref())
            .or_else(|| self.product.as_ref().and_then(|p| p.thumbnail_image.as_deref()))
    }

    pub fn name(&self) -> &str {
        self.product.as_ref().map(|p| p.name.as_str()).unwrap_or("Product")
    }
}

/// An order as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub city: String,
    pub total_amount: Money,
    #[serde(default)]
    pub delivery_charge: Option<Money>,
    #[serde(default)]
    pub discount_amount: Option<Money>,
    #[serde(default)]
    pub payment_type: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Order number when the backend assigns one, otherwise the id.
    pub fn reference(&self) -> String {
        self.order_number
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Goods total: the order total with delivery removed and discount added back.
    pub fn subtotal(&self) -> Money {
        self.total_amount - self.delivery_charge.unwrap_or_default()
            + self.discount_amount.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartProduct, CartVariant};
    use std::collections::BTreeMap;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            email: "hari@example.com".to_string(),
            first_name: "Hari".to_string(),
            last_name: "KC".to_string(),
            address: "Bagbazar".to_string(),
            city: "Kathmandu".to_string(),
            phone: "9812345678".to_string(),
            note: "Call first".to_string(),
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        let product = CartProduct {
            id: ProductId::new(5),
            name: "Round".to_string(),
            slug: "round".to_string(),
            price: Money::from_rupees(1000),
            thumbnail_image: None,
            weight: None,
        };
        cart.add(product.clone(), 2, None).unwrap();
        cart.add(
            product,
            1,
            Some(CartVariant {
                id: VariantId::new(51),
                price: Money::from_rupees(1250),
                option_values: BTreeMap::new(),
            }),
        )
        .unwrap();
        cart
    }

    #[test]
    fn test_build_order_request() {
        let cart = cart();
        let promo = AppliedPromo {
            id: PromoCodeId::new(9),
            code: "NEW10".to_string(),
            discount_percentage: 10.0,
        };
        let totals = CheckoutTotals::compute(
            cart.total_price().unwrap(),
            Money::from_rupees(100),
            Some(&promo),
        )
        .unwrap();

        let req = OrderRequest::build(&cart, &shipping(), &totals, Some(&promo)).unwrap();
        assert_eq!(req.customer_name, "Hari KC");
        assert_eq!(req.shipping_address, "Bagbazar");
        assert_eq!(req.items.len(), 2);
        assert_eq!(req.items[1].variant_id, Some(VariantId::new(51)));
        assert_eq!(req.items[1].price, Money::from_rupees(1250));

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["total_amount"], "3025.00");
        assert_eq!(json["delivery_charge"], "100.00");
        assert_eq!(json["discount_amount"], "325.00");
        assert_eq!(json["payment_type"], "cod");
        assert_eq!(json["promo_code"], 9);
        assert_eq!(json["items"][0]["variant_id"], serde_json::Value::Null);
    }

    #[test]
    fn test_build_rejects_empty_cart() {
        let totals = CheckoutTotals::compute(Money::ZERO, Money::ZERO, None).unwrap();
        assert_eq!(
            OrderRequest::build(&Cart::new(), &shipping(), &totals, None),
            Err(CommerceError::EmptyCart)
        );
    }

    #[test]
    fn test_order_deserialize_and_subtotal() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": 44,
            "customer_name": "Hari KC",
            "customer_email": "hari@example.com",
            "total_amount": "3025.00",
            "delivery_charge": "100.00",
            "discount_amount": "325.00",
            "payment_type": "cod",
            "items": [{
                "id": 1,
                "product": {"id": 5, "name": "Round", "thumbnail_image": "/r.jpg"},
                "variant": {"id": 51, "image": null, "option_values": [{"id": 2, "value": "Black"}]},
                "quantity": 1,
                "price": "1250.00"
            }]
        }))
        .unwrap();

        assert_eq!(order.reference(), "44");
        assert_eq!(order.subtotal(), Money::from_rupees(3250));
        assert_eq!(order.items[0].image(), Some("/r.jpg"));
        assert_eq!(payment_display(&order.payment_type), "Cash on Delivery");
    }
}
