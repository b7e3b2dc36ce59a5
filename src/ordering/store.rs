use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::order::{
    AddressDto, CustomerId, Order, OrderDomainEvent, OrderDto, OrderId, OrderItemDto, OrderStatus,
    PaymentDto,
};

// ============================================================================
// Order Store - set-oriented CRUD with query-by-predicate
// ============================================================================

/// One storage mutation inside a unit of work. Insert and Update carry the
/// aggregate so the unit of work can scan its pending events before the
/// commit; stores persist only the snapshot, never the event list.
#[derive(Debug)]
pub enum StorageOp {
    Insert(Order),
    Update(Order),
    Delete(OrderId),
}

impl StorageOp {
    pub fn pending_events(&self) -> &[OrderDomainEvent] {
        match self {
            StorageOp::Insert(order) | StorageOp::Update(order) => order.pending_events(),
            StorageOp::Delete(_) => &[],
        }
    }

    pub fn clear_pending_events(&mut self) {
        if let StorageOp::Insert(order) | StorageOp::Update(order) = self {
            order.clear_pending_events();
        }
    }
}

/// Storage contract for order aggregates. Per-row last-committer-wins; no
/// optimistic concurrency token. `apply` commits a whole batch atomically.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find(&self, id: OrderId) -> Result<Option<Order>>;

    async fn find_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>>;

    async fn find_by_name(&self, order_name: &str) -> Result<Vec<Order>>;

    async fn apply(&self, ops: &[StorageOp]) -> Result<()>;
}

// ============================================================================
// In-Memory Store
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<Uuid, OrderDto>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn find(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        orders
            .get(&id.value())
            .cloned()
            .map(|dto| Order::rehydrate(dto).context("stored order snapshot is malformed"))
            .transpose()
    }

    async fn find_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        orders
            .values()
            .filter(|dto| dto.customer_id == customer_id.value())
            .cloned()
            .map(|dto| Order::rehydrate(dto).context("stored order snapshot is malformed"))
            .collect()
    }

    async fn find_by_name(&self, order_name: &str) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        orders
            .values()
            .filter(|dto| dto.order_name == order_name)
            .cloned()
            .map(|dto| Order::rehydrate(dto).context("stored order snapshot is malformed"))
            .collect()
    }

    async fn apply(&self, ops: &[StorageOp]) -> Result<()> {
        // One write lock for the whole batch: all ops land or none are seen.
        let mut orders = self.orders.write().await;
        for op in ops {
            match op {
                StorageOp::Insert(order) | StorageOp::Update(order) => {
                    orders.insert(order.id().value(), order.to_dto());
                }
                StorageOp::Delete(id) => {
                    orders.remove(&id.value());
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Postgres Store
// ============================================================================

/// Postgres-backed order store. Value objects are stored as JSONB columns;
/// the batch in `apply` runs inside one transaction.
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS orders (
                id UUID PRIMARY KEY,
                customer_id UUID NOT NULL,
                order_name TEXT NOT NULL,
                shipping_address JSONB NOT NULL,
                billing_address JSONB NOT NULL,
                payment JSONB NOT NULL,
                status TEXT NOT NULL,
                items JSONB NOT NULL
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    fn row_to_order(row: &sqlx::postgres::PgRow) -> Result<Order> {
        let shipping_address: AddressDto = serde_json::from_value(row.try_get("shipping_address")?)?;
        let billing_address: AddressDto = serde_json::from_value(row.try_get("billing_address")?)?;
        let payment: PaymentDto = serde_json::from_value(row.try_get("payment")?)?;
        let items: Vec<OrderItemDto> = serde_json::from_value(row.try_get("items")?)?;

        let dto = OrderDto {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            order_name: row.try_get("order_name")?,
            shipping_address,
            billing_address,
            payment,
            status: status_from_str(row.try_get("status")?)?,
            items,
        };

        Order::rehydrate(dto).context("stored order row is malformed")
    }
}

fn status_to_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending",
        OrderStatus::Confirmed => "confirmed",
        OrderStatus::Cancelled => "cancelled",
    }
}

fn status_from_str(raw: &str) -> Result<OrderStatus> {
    match raw {
        "pending" => Ok(OrderStatus::Pending),
        "confirmed" => Ok(OrderStatus::Confirmed),
        "cancelled" => Ok(OrderStatus::Cancelled),
        other => anyhow::bail!("unknown order status: {}", other),
    }
}

async fn upsert_order<'e, E>(executor: E, dto: &OrderDto) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query(
        "INSERT INTO orders
            (id, customer_id, order_name, shipping_address, billing_address, payment, status, items)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (id) DO UPDATE SET
            customer_id = EXCLUDED.customer_id,
            order_name = EXCLUDED.order_name,
            shipping_address = EXCLUDED.shipping_address,
            billing_address = EXCLUDED.billing_address,
            payment = EXCLUDED.payment,
            status = EXCLUDED.status,
            items = EXCLUDED.items",
    )
    .bind(dto.id)
    .bind(dto.customer_id)
    .bind(&dto.order_name)
    .bind(serde_json::to_value(&dto.shipping_address)?)
    .bind(serde_json::to_value(&dto.billing_address)?)
    .bind(serde_json::to_value(&dto.payment)?)
    .bind(status_to_str(dto.status))
    .bind(serde_json::to_value(&dto.items)?)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn find(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn find_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders WHERE customer_id = $1")
            .bind(customer_id.value())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_order).collect()
    }

    async fn find_by_name(&self, order_name: &str) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders WHERE order_name = $1")
            .bind(order_name)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_order).collect()
    }

    async fn apply(&self, ops: &[StorageOp]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for op in ops {
            match op {
                StorageOp::Insert(order) | StorageOp::Update(order) => {
                    upsert_order(&mut *tx, &order.to_dto()).await?;
                }
                StorageOp::Delete(id) => {
                    sqlx::query("DELETE FROM orders WHERE id = $1")
                        .bind(id.value())
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Address, OrderItem, OrderName, Payment};
    use rust_decimal_macros::dec;

    fn order(name: &str) -> Order {
        let mut order = Order::create(
            OrderId::generate(),
            CustomerId::of(Uuid::new_v4()),
            OrderName::of(name).unwrap(),
            Address::of("Alice", "Smith", "alice@example.com", "1 Main St", "US", "WA", "98101")
                .unwrap(),
            Address::of("Alice", "Smith", "alice@example.com", "1 Main St", "US", "WA", "98101")
                .unwrap(),
            Payment::of("Alice Smith", "4111111111111111", "12/27", "123", 1).unwrap(),
            vec![OrderItem::of(Uuid::new_v4(), 1, dec!(10.00)).unwrap()],
        )
        .unwrap();
        order.clear_pending_events();
        order
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let store = InMemoryOrderStore::new();
        let order = order("alice");
        let id = order.id();

        store.apply(&[StorageOp::Insert(order)]).await.unwrap();

        let found = store.find(id).await.unwrap().unwrap();
        assert_eq!(found.id(), id);
        assert_eq!(found.order_name().as_str(), "alice");
    }

    #[tokio::test]
    async fn test_find_missing_is_none() {
        let store = InMemoryOrderStore::new();
        assert!(store.find(OrderId::generate()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_by_customer_and_name() {
        let store = InMemoryOrderStore::new();
        let first = order("alice");
        let customer = first.customer_id();
        store
            .apply(&[StorageOp::Insert(first), StorageOp::Insert(order("bob"))])
            .await
            .unwrap();

        assert_eq!(store.find_by_customer(customer).await.unwrap().len(), 1);
        assert_eq!(store.find_by_name("bob").await.unwrap().len(), 1);
        assert!(store.find_by_name("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_order() {
        let store = InMemoryOrderStore::new();
        let order = order("alice");
        let id = order.id();

        store.apply(&[StorageOp::Insert(order)]).await.unwrap();
        store.apply(&[StorageOp::Delete(id)]).await.unwrap();

        assert!(store.find(id).await.unwrap().is_none());
        assert_eq!(store.count().await, 0);
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status_from_str(status_to_str(status)).unwrap(), status);
        }
        assert!(status_from_str("shipped").is_err());
    }
}
