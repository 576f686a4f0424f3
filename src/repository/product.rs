//! Product queries.

use crate::repository::{Database, Product};

/// All products, ordered by id.
#[tracing::instrument(name = "get_products", skip_all, err)]
pub async fn get_products(db: &Database) -> Result<Vec<Product>, sqlx::Error> {
    const SQL: &str = "SELECT id, name, price_cents FROM products ORDER BY id";
    db.tracing()
        .trace(SQL, sqlx::query_as::<_, Product>(SQL).fetch_all(db.pool()))
        .await
}

/// One product, `None` if the id is unknown.
#[tracing::instrument(name = "get_product", skip(db), err)]
pub async fn get_product(db: &Database, product_id: i64) -> Result<Option<Product>, sqlx::Error> {
    const SQL: &str = "SELECT id, name, price_cents FROM products WHERE id = $1";
    db.tracing()
        .trace(
            SQL,
            sqlx::query_as::<_, Product>(SQL)
                .bind(product_id)
                .fetch_optional(db.pool()),
        )
        .await
}

/// Insert a product with a fixed id (catalogue imports, fixtures).
pub async fn insert_product(db: &Database, product: &Product) -> Result<(), sqlx::Error> {
    const SQL: &str = "INSERT INTO products (id, name, price_cents) VALUES ($1, $2, $3)";
    db.tracing()
        .trace(
            SQL,
            sqlx::query(SQL)
                .bind(product.id)
                .bind(product.name.as_str())
                .bind(product.price_cents)
                .execute(db.pool()),
        )
        .await?;
    Ok(())
}
