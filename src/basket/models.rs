use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Basket Models
// ============================================================================

/// A customer's shopping cart, keyed by user name.
///
/// The cart has no concurrency token: the store applies last-write-wins
/// semantics per key.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingCart {
    pub user_name: String,
    pub items: Vec<ShoppingCartItem>,
}

impl ShoppingCart {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            items: Vec::new(),
        }
    }

    /// Derived total: sum of unit price x quantity over all lines.
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum()
    }
}

/// One cart line. `price` is the post-discount unit price. The wire shape is
/// camelCase so the order side can deserialize the item snapshot straight
/// into its own item DTO (which drops name, size and color).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingCartItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub size: String,
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(name: &str, price: Decimal, quantity: u32) -> ShoppingCartItem {
        ShoppingCartItem {
            product_id: Uuid::new_v4(),
            product_name: name.to_string(),
            price,
            quantity,
            size: "M".to_string(),
            color: "Black".to_string(),
        }
    }

    #[test]
    fn test_total_price_sums_lines() {
        let mut cart = ShoppingCart::new("alice");
        cart.items.push(item("Shirt", dec!(19.99), 2));
        cart.items.push(item("Cap", dec!(10.00), 1));

        assert_eq!(cart.total_price(), dec!(49.98));
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        let cart = ShoppingCart::new("bob");
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_cart_serialization_round_trip() {
        let mut cart = ShoppingCart::new("alice");
        cart.items.push(item("Shirt", dec!(12.50), 3));

        let json = serde_json::to_string(&cart).unwrap();
        let deserialized: ShoppingCart = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.user_name, "alice");
        assert_eq!(deserialized.items, cart.items);
    }
}
