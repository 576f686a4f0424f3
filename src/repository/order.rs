//! Order queries.

use crate::repository::{Database, Order};

/// Insert an order and return it with its new id.
#[tracing::instrument(name = "create_order", skip(db), err)]
pub async fn create_order(
    db: &Database,
    product_id: i64,
    quantity: i64,
    total_cents: i64,
) -> Result<Order, sqlx::Error> {
    const SQL: &str =
        "INSERT INTO orders (product_id, quantity, total_cents) VALUES ($1, $2, $3) RETURNING id";
    let id: i64 = db
        .tracing()
        .trace(
            SQL,
            sqlx::query_scalar::<_, i64>(SQL)
                .bind(product_id)
                .bind(quantity)
                .bind(total_cents)
                .fetch_one(db.pool()),
        )
        .await?;

    Ok(Order {
        id,
        product_id,
        quantity,
        total_cents,
    })
}

/// One order, `None` if the id is unknown.
#[tracing::instrument(name = "get_order", skip(db), err)]
pub async fn get_order(db: &Database, order_id: i64) -> Result<Option<Order>, sqlx::Error> {
    const SQL: &str =
        "SELECT id, product_id, quantity, total_cents FROM orders WHERE id = $1";
    db.tracing()
        .trace(
            SQL,
            sqlx::query_as::<_, Order>(SQL)
                .bind(order_id)
                .fetch_optional(db.pool()),
        )
        .await
}

/// Number of stored orders.
pub async fn count_orders(db: &Database) -> Result<i64, sqlx::Error> {
    const SQL: &str = "SELECT COUNT(*) FROM orders";
    db.tracing()
        .trace(SQL, sqlx::query_scalar::<_, i64>(SQL).fetch_one(db.pool()))
        .await
}
