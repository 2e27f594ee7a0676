//! Shopping cart module.

mod cart;

pub use cart::{
    parse_line_key, Cart, CartItem, CartProduct, CartVariant, MAX_QUANTITY_PER_ITEM,
};
