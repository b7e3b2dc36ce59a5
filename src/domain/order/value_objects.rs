use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================
//
// Each value object is constructed through a single validating factory and is
// immutable afterwards; equality is by value. Malformed input is rejected
// before any aggregate sees it.
//
// ============================================================================

/// Opaque order identity wrapping a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn of(value: Uuid) -> Self {
        Self(value)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(Uuid);

impl CustomerId {
    pub fn of(value: Uuid) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// Human-readable order name; non-empty, uniqueness not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderName(String);

impl OrderName {
    pub fn of(value: impl Into<String>) -> Result<Self, OrderError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(OrderError::EmptyOrderName);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Shipping or billing address; every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub address_line: String,
    pub country: String,
    pub state: String,
    pub zip_code: String,
}

impl Address {
    #[allow(clippy::too_many_arguments)]
    pub fn of(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email_address: impl Into<String>,
        address_line: impl Into<String>,
        country: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Result<Self, OrderError> {
        let address = Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email_address: email_address.into(),
            address_line: address_line.into(),
            country: country.into(),
            state: state.into(),
            zip_code: zip_code.into(),
        };

        for (field, value) in [
            ("firstName", &address.first_name),
            ("lastName", &address.last_name),
            ("emailAddress", &address.email_address),
            ("addressLine", &address.address_line),
            ("country", &address.country),
            ("state", &address.state),
            ("zipCode", &address.zip_code),
        ] {
            if value.trim().is_empty() {
                return Err(OrderError::MissingAddressField(field));
            }
        }

        if !address.email_address.contains('@') {
            return Err(OrderError::InvalidEmail(address.email_address.clone()));
        }

        Ok(address)
    }
}

/// Payment instrument attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub card_name: String,
    pub card_number: String,
    pub expiration: String,
    pub cvv: String,
    pub payment_method: i32,
}

impl Payment {
    pub fn of(
        card_name: impl Into<String>,
        card_number: impl Into<String>,
        expiration: impl Into<String>,
        cvv: impl Into<String>,
        payment_method: i32,
    ) -> Result<Self, OrderError> {
        let payment = Self {
            card_name: card_name.into(),
            card_number: card_number.into(),
            expiration: expiration.into(),
            cvv: cvv.into(),
            payment_method,
        };

        if payment.card_name.trim().is_empty()
            || payment.card_number.trim().is_empty()
            || payment.expiration.trim().is_empty()
        {
            return Err(OrderError::InvalidPayment);
        }

        if payment.cvv.len() < 3
            || payment.cvv.len() > 4
            || !payment.cvv.chars().all(|c| c.is_ascii_digit())
        {
            return Err(OrderError::InvalidCvv);
        }

        Ok(payment)
    }
}

/// One order line: quantity must be positive, price non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderItem {
    pub fn of(product_id: Uuid, quantity: u32, price: Decimal) -> Result<Self, OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity(quantity));
        }
        if price < Decimal::ZERO {
            return Err(OrderError::NegativePrice(price));
        }
        Ok(Self {
            product_id,
            quantity,
            price,
        })
    }
}

/// Order lifecycle status. Pending -> {Confirmed, Cancelled}; transitions are
/// externally driven and deliberately not graph-validated on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_address() -> Result<Address, OrderError> {
        Address::of(
            "Alice", "Smith", "alice@example.com", "1 Main St", "US", "WA", "98101",
        )
    }

    #[test]
    fn test_order_name_rejects_empty() {
        assert!(matches!(OrderName::of(""), Err(OrderError::EmptyOrderName)));
        assert!(matches!(OrderName::of("  "), Err(OrderError::EmptyOrderName)));
        assert_eq!(OrderName::of("alice").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_address_requires_every_field() {
        assert!(valid_address().is_ok());

        let missing_zip =
            Address::of("Alice", "Smith", "alice@example.com", "1 Main St", "US", "WA", "");
        assert!(matches!(
            missing_zip,
            Err(OrderError::MissingAddressField("zipCode"))
        ));

        let missing_first =
            Address::of("", "Smith", "alice@example.com", "1 Main St", "US", "WA", "98101");
        assert!(matches!(
            missing_first,
            Err(OrderError::MissingAddressField("firstName"))
        ));
    }

    #[test]
    fn test_address_rejects_malformed_email() {
        let bad_email =
            Address::of("Alice", "Smith", "not-an-email", "1 Main St", "US", "WA", "98101");
        assert!(matches!(bad_email, Err(OrderError::InvalidEmail(_))));
    }

    #[test]
    fn test_payment_validates_card_and_cvv() {
        assert!(Payment::of("Alice Smith", "4111111111111111", "12/27", "123", 1).is_ok());
        assert!(matches!(
            Payment::of("", "4111111111111111", "12/27", "123", 1),
            Err(OrderError::InvalidPayment)
        ));
        assert!(matches!(
            Payment::of("Alice Smith", "4111111111111111", "12/27", "12", 1),
            Err(OrderError::InvalidCvv)
        ));
        assert!(matches!(
            Payment::of("Alice Smith", "4111111111111111", "12/27", "abc", 1),
            Err(OrderError::InvalidCvv)
        ));
    }

    #[test]
    fn test_order_item_rejects_zero_quantity_and_negative_price() {
        let product_id = Uuid::new_v4();
        assert!(OrderItem::of(product_id, 1, dec!(0.00)).is_ok());
        assert!(matches!(
            OrderItem::of(product_id, 0, dec!(1.00)),
            Err(OrderError::InvalidQuantity(0))
        ));
        assert!(matches!(
            OrderItem::of(product_id, 1, dec!(-1.00)),
            Err(OrderError::NegativePrice(_))
        ));
    }

    #[test]
    fn test_value_objects_compare_by_value() {
        let id = Uuid::new_v4();
        assert_eq!(OrderId::of(id), OrderId::of(id));
        assert_ne!(OrderId::generate(), OrderId::generate());
        assert_eq!(
            OrderName::of("alice").unwrap(),
            OrderName::of("alice").unwrap()
        );
    }
}
