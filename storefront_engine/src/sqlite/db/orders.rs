use chrono::{DateTime, Utc};
use log::{debug, trace};
use serde_json::Value;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{
        ActorId,
        Amount,
        DeliveryStatus,
        LineItem,
        NewOrder,
        Order,
        OrderId,
        PaymentStatus,
        ProviderId,
        SalesMethod,
    },
    traits::{OrderLedgerError, OrderQueryFilter},
};

const ORDER_COLUMNS: &str = "id, purchased_by, provided_by, amount, currency, payment_status, delivery_status, \
                             sales_method, payment_intent_id, payment_result, tags, created_at, updated_at";

/// The two physical copies of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderCopy {
    Provider,
    Buyer,
}

impl OrderCopy {
    pub fn table(&self) -> &'static str {
        match self {
            OrderCopy::Provider => "provider_orders",
            OrderCopy::Buyer => "buyer_orders",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct OrderRow {
    id: OrderId,
    purchased_by: ActorId,
    provided_by: ProviderId,
    amount: Amount,
    currency: String,
    payment_status: PaymentStatus,
    delivery_status: DeliveryStatus,
    sales_method: SalesMethod,
    payment_intent_id: Option<String>,
    payment_result: Option<String>,
    tags: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<LineItem>) -> Result<Order, OrderLedgerError> {
        let payment_result: Option<Value> = self.payment_result.as_deref().map(serde_json::from_str).transpose()?;
        let tags: Vec<String> = serde_json::from_str(&self.tags)?;
        Ok(Order {
            id: self.id,
            purchased_by: self.purchased_by,
            provided_by: self.provided_by,
            items,
            amount: self.amount,
            currency: self.currency,
            payment_status: self.payment_status,
            delivery_status: self.delivery_status,
            sales_method: self.sales_method,
            payment_intent_id: self.payment_intent_id,
            payment_result,
            tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Writes one copy of a new order. This is not atomic, and does not write line items. Use [`insert_order`] inside a
/// transaction instead.
async fn insert_copy(
    copy: OrderCopy,
    order: &NewOrder,
    tags: &str,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), OrderLedgerError> {
    let sql = format!(
        "INSERT INTO {} (id, purchased_by, provided_by, amount, currency, payment_status, delivery_status, \
         sales_method, payment_intent_id, payment_result, tags, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, \
         $6, $7, $8, $9, NULL, $10, $11, $12)",
        copy.table()
    );
    sqlx::query(&sql)
        .bind(&order.id)
        .bind(&order.purchased_by)
        .bind(&order.provided_by)
        .bind(order.amount)
        .bind(&order.currency)
        .bind(order.payment_status)
        .bind(DeliveryStatus::None)
        .bind(order.sales_method)
        .bind(&order.payment_intent_id)
        .bind(tags)
        .bind(now)
        .bind(now)
        .execute(conn)
        .await?;
    Ok(())
}

/// Inserts both copies of the order and its line items. This is not atomic on its own. Callers must run it inside
/// a transaction and pass `&mut *tx` as the connection.
pub async fn insert_order(
    order: &NewOrder,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), OrderLedgerError> {
    let tags = serde_json::to_string(&order.tags)?;
    insert_copy(OrderCopy::Provider, order, &tags, now, conn).await?;
    insert_copy(OrderCopy::Buyer, order, &tags, now, conn).await?;
    for (index, item) in order.items.iter().enumerate() {
        sqlx::query(
            r#"INSERT INTO order_items (order_id, line_index, product_reference, sku_reference, quantity, amount,
            currency, mediated_by) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(&order.id)
        .bind(index as i64)
        .bind(&item.product_reference)
        .bind(&item.sku_reference)
        .bind(item.quantity)
        .bind(item.amount)
        .bind(&item.currency)
        .bind(&item.mediated_by)
        .execute(&mut *conn)
        .await?;
    }
    debug!("🗃️ Order {} stored for provider {} and buyer {}", order.id, order.provided_by, order.purchased_by);
    Ok(())
}

pub async fn fetch_items(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Vec<LineItem>, OrderLedgerError> {
    let items = sqlx::query_as::<_, LineItem>(
        r#"SELECT product_reference, sku_reference, quantity, amount, currency, mediated_by
        FROM order_items WHERE order_id = $1 ORDER BY line_index ASC"#,
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

async fn hydrate(rows: Vec<OrderRow>, conn: &mut SqliteConnection) -> Result<Vec<Order>, OrderLedgerError> {
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        let items = fetch_items(&row.id, conn).await?;
        orders.push(row.into_order(items)?);
    }
    Ok(orders)
}

/// Fetches one copy of the order, regardless of who owns it.
pub async fn fetch_order(
    copy: OrderCopy,
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderLedgerError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM {} WHERE id = $1", copy.table());
    let row = sqlx::query_as::<_, OrderRow>(&sql).bind(order_id).fetch_optional(&mut *conn).await?;
    match row {
        Some(row) => {
            let items = fetch_items(&row.id, conn).await?;
            Ok(Some(row.into_order(items)?))
        },
        None => Ok(None),
    }
}

/// Compare-and-set update of the payment fields of one copy. The row is only written if its payment status is still
/// `observed`. A `None` result leaves the stored payment result untouched.
///
/// Returns the number of rows written, which is 1 on success and 0 if the row changed underneath us.
pub async fn update_payment(
    copy: OrderCopy,
    order_id: &OrderId,
    observed: PaymentStatus,
    status: PaymentStatus,
    payment_result: Option<&str>,
    updated_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, OrderLedgerError> {
    let sql = format!(
        "UPDATE {} SET payment_status = $1, payment_result = COALESCE($2, payment_result), updated_at = $3 WHERE id \
         = $4 AND payment_status = $5",
        copy.table()
    );
    let result = sqlx::query(&sql)
        .bind(status)
        .bind(payment_result)
        .bind(updated_at)
        .bind(order_id)
        .bind(observed)
        .execute(conn)
        .await?;
    trace!("🗃️ {} copy of order {order_id}: {observed} -> {status} ({} rows)", copy.table(), result.rows_affected());
    Ok(result.rows_affected())
}

pub async fn fetch_orders_for_buyer(
    buyer_id: &ActorId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, OrderLedgerError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM buyer_orders WHERE purchased_by = $1 ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, OrderRow>(&sql).bind(buyer_id).fetch_all(&mut *conn).await?;
    hydrate(rows, conn).await
}

/// Fetches the provider's orders according to the criteria in `filter`, newest first.
pub async fn search_provider_orders(
    provider_id: &ProviderId,
    filter: OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, OrderLedgerError> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {ORDER_COLUMNS} FROM provider_orders WHERE "));
    let mut where_clause = builder.separated(" AND ");
    where_clause.push("provided_by = ");
    where_clause.push_bind_unseparated(provider_id.as_str().to_string());
    if let Some(status) = filter.payment_status {
        where_clause.push("payment_status = ");
        where_clause.push_bind_unseparated(status.as_str());
    }
    if let Some(status) = filter.delivery_status {
        where_clause.push("delivery_status = ");
        where_clause.push_bind_unseparated(status.as_str());
    }
    if let Some(method) = filter.sales_method {
        where_clause.push("sales_method = ");
        where_clause.push_bind_unseparated(method.as_str());
    }
    builder.push(" ORDER BY created_at DESC");
    trace!("🗃️ Executing query: {}", builder.sql());
    let rows = builder.build_query_as::<OrderRow>().fetch_all(&mut *conn).await?;
    trace!("🗃️ {} orders found for provider {provider_id}", rows.len());
    hydrate(rows, conn).await
}
