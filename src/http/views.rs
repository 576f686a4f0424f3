//! HTML pages.

use std::fmt::Write;

use crate::repository::{format_cents, Order, Product};

/// Product listing with one checkout form per product.
pub fn product_list(products: &[Product]) -> String {
    let mut body = String::from("<h1>Products</h1>\n");
    if products.is_empty() {
        body.push_str("<p>No products available.</p>\n");
    }
    for product in products {
        let _ = write!(
            body,
            r#"<form method="post" action="/checkout">
  <strong>{name}</strong> &mdash; ${price}
  <input type="hidden" name="product_id" value="{id}">
  <input type="number" name="quantity" value="1" min="1">
  <button type="submit">Buy</button>
</form>
"#,
            name = escape(&product.name),
            price = format_cents(product.price_cents),
            id = product.id,
        );
    }
    page("Shop", &body)
}

/// Confirmation page for a placed order.
pub fn order_confirmation(order: &Order, product: Option<&Product>) -> String {
    let product_name = product
        .map(|p| escape(&p.name))
        .unwrap_or_else(|| format!("Product #{}", order.product_id));
    let body = format!(
        r#"<h1>Order confirmed</h1>
<p>Order <strong>#{id}</strong></p>
<p>{quantity} &times; {product}</p>
<p>Total: ${total}</p>
<a href="/">Continue shopping</a>
"#,
        id = order.id,
        quantity = order.quantity,
        product = product_name,
        total = format_cents(order.total_cents),
    );
    page("Order confirmed", &body)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        body
    )
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
