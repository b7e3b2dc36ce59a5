use std::sync::Arc;

use uuid::Uuid;

use super::errors::OrderingError;
use super::store::OrderStore;
use super::unit_of_work::{EventDispatcher, UnitOfWork};
use crate::domain::order::aggregate::{address_of, payment_of};
use crate::domain::order::{
    CreateOrderCommand, CustomerId, DeleteOrderCommand, Order, OrderDto, OrderId, OrderItem,
    OrderName, UpdateOrderCommand,
};
use crate::metrics::Metrics;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Command -> validated aggregate -> unit of work -> storage commit -> events.
// Validation happens entirely before the unit of work is touched; a rejected
// command persists nothing.
//
// ============================================================================

pub struct OrderCommandHandler {
    store: Arc<dyn OrderStore>,
    dispatcher: Arc<EventDispatcher>,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(
        store: Arc<dyn OrderStore>,
        dispatcher: Arc<EventDispatcher>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            metrics,
        }
    }

    pub async fn create_order(&self, command: CreateOrderCommand) -> Result<Uuid, OrderingError> {
        let order = build_order(&command.order)?;
        let id = order.id().value();

        let mut uow = UnitOfWork::new();
        uow.register_new(order);
        uow.commit(self.store.as_ref(), &self.dispatcher)
            .await
            .map_err(OrderingError::Storage)?;

        self.metrics.orders_created.inc();
        tracing::info!(order_id = %id, "Order created");
        Ok(id)
    }

    /// Re-validates every value object and replaces the order's mutable
    /// fields. The order must already exist.
    pub async fn update_order(&self, command: UpdateOrderCommand) -> Result<(), OrderingError> {
        let dto = &command.order;
        let mut order = self
            .store
            .find(OrderId::of(dto.id))
            .await
            .map_err(OrderingError::Storage)?
            .ok_or(OrderingError::NotFound(dto.id))?;

        order.update(
            OrderName::of(dto.order_name.clone())?,
            address_of(&dto.billing_address)?,
            address_of(&dto.shipping_address)?,
            payment_of(&dto.payment)?,
            dto.status,
        );

        let mut uow = UnitOfWork::new();
        uow.register_dirty(order);
        uow.commit(self.store.as_ref(), &self.dispatcher)
            .await
            .map_err(OrderingError::Storage)?;

        self.metrics.orders_updated.inc();
        tracing::info!(order_id = %dto.id, "Order updated");
        Ok(())
    }

    pub async fn delete_order(&self, command: DeleteOrderCommand) -> Result<(), OrderingError> {
        let order = self
            .store
            .find(OrderId::of(command.order_id))
            .await
            .map_err(OrderingError::Storage)?
            .ok_or(OrderingError::NotFound(command.order_id))?;

        let mut uow = UnitOfWork::new();
        uow.register_removed(order.id());
        uow.commit(self.store.as_ref(), &self.dispatcher)
            .await
            .map_err(OrderingError::Storage)?;

        tracing::info!(order_id = %command.order_id, "Order deleted");
        Ok(())
    }

    pub async fn get_orders_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<OrderDto>, OrderingError> {
        let orders = self
            .store
            .find_by_customer(CustomerId::of(customer_id))
            .await
            .map_err(OrderingError::Storage)?;
        Ok(orders.iter().map(Order::to_dto).collect())
    }

    pub async fn get_orders_by_name(
        &self,
        order_name: &str,
    ) -> Result<Vec<OrderDto>, OrderingError> {
        let orders = self
            .store
            .find_by_name(order_name)
            .await
            .map_err(OrderingError::Storage)?;
        Ok(orders.iter().map(Order::to_dto).collect())
    }
}

/// Builds the aggregate from a command DTO. Every nested value object is
/// constructed through its validating factory; the first failure aborts the
/// whole build.
fn build_order(dto: &OrderDto) -> Result<Order, OrderingError> {
    let shipping_address = address_of(&dto.shipping_address)?;
    let billing_address = address_of(&dto.billing_address)?;
    let payment = payment_of(&dto.payment)?;

    let items = dto
        .items
        .iter()
        .map(|i| OrderItem::of(i.product_id, i.quantity, i.price))
        .collect::<Result<Vec<_>, _>>()?;

    let order = Order::create(
        OrderId::of(dto.id),
        CustomerId::of(dto.customer_id),
        OrderName::of(dto.order_name.clone())?,
        billing_address,
        shipping_address,
        payment,
        items,
    )?;

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{AddressDto, OrderError, OrderItemDto, OrderStatus, PaymentDto};
    use crate::ordering::store::InMemoryOrderStore;
    use rust_decimal_macros::dec;

    fn address() -> AddressDto {
        AddressDto {
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            email_address: "alice@example.com".to_string(),
            address_line: "1 Main St".to_string(),
            country: "US".to_string(),
            state: "WA".to_string(),
            zip_code: "98101".to_string(),
        }
    }

    fn dto() -> OrderDto {
        OrderDto {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            order_name: "alice".to_string(),
            shipping_address: address(),
            billing_address: address(),
            payment: PaymentDto {
                card_name: "Alice Smith".to_string(),
                card_number: "4111111111111111".to_string(),
                expiration: "12/27".to_string(),
                cvv: "123".to_string(),
                payment_method: 1,
            },
            status: OrderStatus::Pending,
            items: vec![OrderItemDto {
                product_id: Uuid::new_v4(),
                quantity: 2,
                price: dec!(75.00),
            }],
        }
    }

    fn handler(store: Arc<InMemoryOrderStore>) -> OrderCommandHandler {
        let metrics = Arc::new(Metrics::new().unwrap());
        let dispatcher = Arc::new(EventDispatcher::new(vec![], metrics.clone()));
        OrderCommandHandler::new(store, dispatcher, metrics)
    }

    #[tokio::test]
    async fn test_create_order_persists_aggregate() {
        let store = Arc::new(InMemoryOrderStore::new());
        let handler = handler(store.clone());
        let dto = dto();

        let id = handler
            .create_order(CreateOrderCommand { order: dto.clone() })
            .await
            .unwrap();

        assert_eq!(id, dto.id);
        let stored = store.find(OrderId::of(id)).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Pending);
        assert_eq!(stored.total_price(), dec!(150.00));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_items_without_persisting() {
        let store = Arc::new(InMemoryOrderStore::new());
        let handler = handler(store.clone());

        let mut dto = dto();
        dto.items.clear();

        let result = handler.create_order(CreateOrderCommand { order: dto }).await;
        assert!(matches!(
            result,
            Err(OrderingError::Validation(OrderError::EmptyItems))
        ));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_incomplete_address_without_persisting() {
        let store = Arc::new(InMemoryOrderStore::new());
        let handler = handler(store.clone());

        let mut dto = dto();
        dto.shipping_address.country = String::new();

        let result = handler.create_order(CreateOrderCommand { order: dto }).await;
        assert!(matches!(
            result,
            Err(OrderingError::Validation(OrderError::MissingAddressField(
                "country"
            )))
        ));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_update_missing_order_is_not_found() {
        let store = Arc::new(InMemoryOrderStore::new());
        let handler = handler(store);

        let result = handler
            .update_order(UpdateOrderCommand { order: dto() })
            .await;
        assert!(matches!(result, Err(OrderingError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_status() {
        let store = Arc::new(InMemoryOrderStore::new());
        let handler = handler(store.clone());
        let mut dto = dto();

        handler
            .create_order(CreateOrderCommand { order: dto.clone() })
            .await
            .unwrap();

        dto.order_name = "alice-renamed".to_string();
        dto.status = OrderStatus::Confirmed;
        handler
            .update_order(UpdateOrderCommand { order: dto.clone() })
            .await
            .unwrap();

        let stored = store.find(OrderId::of(dto.id)).await.unwrap().unwrap();
        assert_eq!(stored.order_name().as_str(), "alice-renamed");
        assert_eq!(stored.status(), OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_delete_order_removes_it() {
        let store = Arc::new(InMemoryOrderStore::new());
        let handler = handler(store.clone());
        let dto = dto();

        handler
            .create_order(CreateOrderCommand { order: dto.clone() })
            .await
            .unwrap();
        handler
            .delete_order(DeleteOrderCommand { order_id: dto.id })
            .await
            .unwrap();

        assert_eq!(store.count().await, 0);

        // Deleting again reports NotFound.
        let result = handler
            .delete_order(DeleteOrderCommand { order_id: dto.id })
            .await;
        assert!(matches!(result, Err(OrderingError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_queries_return_dtos() {
        let store = Arc::new(InMemoryOrderStore::new());
        let handler = handler(store);
        let dto = dto();

        handler
            .create_order(CreateOrderCommand { order: dto.clone() })
            .await
            .unwrap();

        let by_customer = handler
            .get_orders_by_customer(dto.customer_id)
            .await
            .unwrap();
        assert_eq!(by_customer.len(), 1);

        let by_name = handler.get_orders_by_name("alice").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, dto.id);
    }
}
