//! Request handlers.
//!
//! Handlers contain business logic only. The HTTP span around them comes from
//! the observability layer and SQL spans come from the database handle; the
//! only telemetry here is the `checkout_handler` span name.

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;

use crate::http::{views, AppError, AppState};
use crate::repository::{format_cents, order, product};

/// Iterations of the synthetic CPU load run on every checkout.
const CPU_WORK_ITERATIONS: u64 = 2_000_000;

/// `GET /`: product listing.
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let products = product::get_products(&state.db).await?;
    Ok(Html(views::product_list(&products)))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub product_id: i64,
    pub quantity: i64,
}

/// `POST /checkout`: place an order and redirect to its confirmation page.
#[tracing::instrument(
    name = "checkout_handler",
    skip_all,
    fields(product.id = form.product_id, order.quantity = form.quantity)
)]
pub async fn checkout(
    State(state): State<AppState>,
    Form(form): Form<CheckoutForm>,
) -> Result<Redirect, AppError> {
    if form.quantity < 1 {
        return Err(AppError::InvalidInput(format!(
            "quantity must be at least 1, got {}",
            form.quantity
        )));
    }

    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(simulate_cpu_work)).await?;

    let product = match product::get_product(&state.db, form.product_id).await? {
        Some(product) => product,
        None => {
            tracing::info!(product.id = form.product_id, "Product not found");
            return Err(AppError::NotFound("Product not found"));
        }
    };

    let total_cents = product
        .price_cents
        .checked_mul(form.quantity)
        .ok_or_else(|| AppError::InvalidInput("order total is too large".to_string()))?;

    let order = order::create_order(&state.db, product.id, form.quantity, total_cents).await?;

    tracing::info!(
        order.id = order.id,
        product = %product.name,
        total = %format_cents(total_cents),
        "Order created"
    );

    Ok(Redirect::to(&format!("/success?order_id={}", order.id)))
}

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub order_id: i64,
}

/// `GET /success?order_id=N`: order confirmation.
pub async fn success(
    State(state): State<AppState>,
    Query(query): Query<SuccessQuery>,
) -> Result<Html<String>, AppError> {
    let order = order::get_order(&state.db, query.order_id)
        .await?
        .ok_or(AppError::NotFound("Order not found"))?;
    let product = product::get_product(&state.db, order.product_id).await?;

    Ok(Html(views::order_confirmation(&order, product.as_ref())))
}

/// `GET /healthz`: liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}

/// Burn some CPU and allocate so checkouts stand out in flame graphs.
///
/// Blocking; run it off the async workers.
pub fn simulate_cpu_work() -> u64 {
    let mut acc: u64 = 0;
    for i in 0..CPU_WORK_ITERATIONS {
        acc = acc.wrapping_add(i.wrapping_mul(i).wrapping_mul(i));
    }
    let scratch: Vec<u64> = (0..10_000).collect();
    std::hint::black_box(&scratch);
    std::hint::black_box(acc)
}
