use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::commands::{AddressDto, OrderDto, OrderItemDto, PaymentDto};
use super::errors::OrderError;
use super::events::{OrderCreated, OrderDomainEvent, OrderUpdated};
use super::value_objects::{Address, CustomerId, OrderId, OrderItem, OrderName, OrderStatus, Payment};

// ============================================================================
// Order Aggregate
// ============================================================================
//
// The aggregate is one consistency unit: it can only be constructed through
// `create` (full validation, raises Created) or `rehydrate` (storage load,
// raises nothing). `update` re-validates every mutable field atomically and
// raises Updated. Pending events stay on the aggregate until the unit of
// work commits and drains them.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    order_name: OrderName,
    shipping_address: Address,
    billing_address: Address,
    payment: Payment,
    status: OrderStatus,
    items: Vec<OrderItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pending_events: Vec<OrderDomainEvent>,
}

impl Order {
    /// Validating factory. Fails atomically: either every value object is
    /// well-formed and the items list is non-empty, or no aggregate exists.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: OrderId,
        customer_id: CustomerId,
        order_name: OrderName,
        billing_address: Address,
        shipping_address: Address,
        payment: Payment,
        items: Vec<OrderItem>,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        let now = Utc::now();
        let mut order = Self {
            id,
            customer_id,
            order_name,
            shipping_address,
            billing_address,
            payment,
            status: OrderStatus::Pending,
            items,
            created_at: now,
            updated_at: now,
            pending_events: Vec::new(),
        };

        order.pending_events.push(OrderDomainEvent::Created(OrderCreated {
            order: order.to_dto(),
            occurred_at: now,
        }));

        Ok(order)
    }

    /// Replaces all mutable fields after re-validation and raises Updated.
    /// Items are not updatable through this operation. Status is applied as
    /// given; transition-graph validation is intentionally absent.
    pub fn update(
        &mut self,
        order_name: OrderName,
        billing_address: Address,
        shipping_address: Address,
        payment: Payment,
        status: OrderStatus,
    ) {
        self.order_name = order_name;
        self.billing_address = billing_address;
        self.shipping_address = shipping_address;
        self.payment = payment;
        self.status = status;
        self.updated_at = Utc::now();

        self.pending_events.push(OrderDomainEvent::Updated(OrderUpdated {
            order: self.to_dto(),
            occurred_at: self.updated_at,
        }));
    }

    /// Rebuilds the aggregate from a stored snapshot. Runs the same
    /// validation as `create` but raises no events.
    pub fn rehydrate(dto: OrderDto) -> Result<Self, OrderError> {
        if dto.items.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        let items = dto
            .items
            .iter()
            .map(|i| OrderItem::of(i.product_id, i.quantity, i.price))
            .collect::<Result<Vec<_>, _>>()?;

        let now = Utc::now();
        Ok(Self {
            id: OrderId::of(dto.id),
            customer_id: CustomerId::of(dto.customer_id),
            order_name: OrderName::of(dto.order_name)?,
            shipping_address: address_of(&dto.shipping_address)?,
            billing_address: address_of(&dto.billing_address)?,
            payment: payment_of(&dto.payment)?,
            status: dto.status,
            items,
            created_at: now,
            updated_at: now,
            pending_events: Vec::new(),
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn order_name(&self) -> &OrderName {
        &self.order_name
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum()
    }

    /// Events raised since the last commit. Read by the unit of work only.
    pub fn pending_events(&self) -> &[OrderDomainEvent] {
        &self.pending_events
    }

    pub fn clear_pending_events(&mut self) {
        self.pending_events.clear();
    }

    pub fn to_dto(&self) -> OrderDto {
        OrderDto {
            id: self.id.value(),
            customer_id: self.customer_id.value(),
            order_name: self.order_name.as_str().to_string(),
            shipping_address: address_dto(&self.shipping_address),
            billing_address: address_dto(&self.billing_address),
            payment: PaymentDto {
                card_name: self.payment.card_name.clone(),
                card_number: self.payment.card_number.clone(),
                expiration: self.payment.expiration.clone(),
                cvv: self.payment.cvv.clone(),
                payment_method: self.payment.payment_method,
            },
            status: self.status,
            items: self
                .items
                .iter()
                .map(|i| OrderItemDto {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price: i.price,
                })
                .collect(),
        }
    }
}

fn address_dto(address: &Address) -> AddressDto {
    AddressDto {
        first_name: address.first_name.clone(),
        last_name: address.last_name.clone(),
        email_address: address.email_address.clone(),
        address_line: address.address_line.clone(),
        country: address.country.clone(),
        state: address.state.clone(),
        zip_code: address.zip_code.clone(),
    }
}

pub(crate) fn address_of(dto: &AddressDto) -> Result<Address, OrderError> {
    Address::of(
        dto.first_name.clone(),
        dto.last_name.clone(),
        dto.email_address.clone(),
        dto.address_line.clone(),
        dto.country.clone(),
        dto.state.clone(),
        dto.zip_code.clone(),
    )
}

pub(crate) fn payment_of(dto: &PaymentDto) -> Result<Payment, OrderError> {
    Payment::of(
        dto.card_name.clone(),
        dto.card_number.clone(),
        dto.expiration.clone(),
        dto.cvv.clone(),
        dto.payment_method,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn address() -> Address {
        Address::of(
            "Alice", "Smith", "alice@example.com", "1 Main St", "US", "WA", "98101",
        )
        .unwrap()
    }

    fn payment() -> Payment {
        Payment::of("Alice Smith", "4111111111111111", "12/27", "123", 1).unwrap()
    }

    fn items() -> Vec<OrderItem> {
        vec![OrderItem::of(Uuid::new_v4(), 2, dec!(75.00)).unwrap()]
    }

    #[test]
    fn test_create_raises_created_event_with_pending_status() {
        let order = Order::create(
            OrderId::generate(),
            CustomerId::of(Uuid::new_v4()),
            OrderName::of("alice").unwrap(),
            address(),
            address(),
            payment(),
            items(),
        )
        .unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total_price(), dec!(150.00));
        assert_eq!(order.pending_events().len(), 1);
        assert!(matches!(
            order.pending_events()[0],
            OrderDomainEvent::Created(_)
        ));
    }

    #[test]
    fn test_create_rejects_empty_items() {
        let result = Order::create(
            OrderId::generate(),
            CustomerId::of(Uuid::new_v4()),
            OrderName::of("alice").unwrap(),
            address(),
            address(),
            payment(),
            vec![],
        );
        assert!(matches!(result, Err(OrderError::EmptyItems)));
    }

    #[test]
    fn test_update_replaces_fields_and_raises_updated() {
        let mut order = Order::create(
            OrderId::generate(),
            CustomerId::of(Uuid::new_v4()),
            OrderName::of("alice").unwrap(),
            address(),
            address(),
            payment(),
            items(),
        )
        .unwrap();
        order.clear_pending_events();

        order.update(
            OrderName::of("alice-2").unwrap(),
            address(),
            address(),
            payment(),
            OrderStatus::Confirmed,
        );

        assert_eq!(order.order_name().as_str(), "alice-2");
        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert_eq!(order.pending_events().len(), 1);
        assert!(matches!(
            order.pending_events()[0],
            OrderDomainEvent::Updated(_)
        ));
    }

    #[test]
    fn test_rehydrate_raises_no_events() {
        let order = Order::create(
            OrderId::generate(),
            CustomerId::of(Uuid::new_v4()),
            OrderName::of("alice").unwrap(),
            address(),
            address(),
            payment(),
            items(),
        )
        .unwrap();

        let rehydrated = Order::rehydrate(order.to_dto()).unwrap();
        assert!(rehydrated.pending_events().is_empty());
        assert_eq!(rehydrated.id(), order.id());
        assert_eq!(rehydrated.total_price(), order.total_price());
    }

    #[test]
    fn test_rehydrate_rejects_malformed_snapshot() {
        let order = Order::create(
            OrderId::generate(),
            CustomerId::of(Uuid::new_v4()),
            OrderName::of("alice").unwrap(),
            address(),
            address(),
            payment(),
            items(),
        )
        .unwrap();

        let mut dto = order.to_dto();
        dto.shipping_address.zip_code = String::new();
        assert!(matches!(
            Order::rehydrate(dto),
            Err(OrderError::MissingAddressField("zipCode"))
        ));
    }
}
