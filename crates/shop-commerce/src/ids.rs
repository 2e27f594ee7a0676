//! Newtype IDs for the backend's numeric identifiers.
//!
//! The backend keys every resource by an integer primary key. Wrapping each
//! kind keeps a `VariantId` from being passed where a `ProductId` belongs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

define_id!(ProductId);
define_id!(VariantId);
define_id!(CategoryId);
define_id!(SubCategoryId);
define_id!(OrderId);
define_id!(PromoCodeId);
define_id!(BlogId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_str() {
        let id: ProductId = " 42 ".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert!("abc".parse::<VariantId>().is_err());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(format!("{}", OrderId::new(789)), "789");
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id: CategoryId = serde_json::from_str("7").unwrap();
        assert_eq!(id, CategoryId::new(7));
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }
}
