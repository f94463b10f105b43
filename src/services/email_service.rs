use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::Entity as Orders,
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    models::Order,
    services::order_service::{order_from_entity, order_item_from_entity},
    state::AppState,
};

/// One rendered invoice row: the order line joined with its product name.
#[derive(Debug, Clone)]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub material: Option<String>,
}

/// Send the buyer invoice and the store notification for a paid order,
/// at most once per order across all reconciliation paths.
///
/// The buyer email failing fails the whole operation; the store
/// notification is best-effort once the buyer copy is out.
pub async fn send_order_confirmation_emails(state: &AppState, order_id: Uuid) -> AppResult<()> {
    if !claim_confirmation_email(&state.pool, order_id).await? {
        tracing::debug!(order_id = %order_id, "confirmation email already claimed");
        return Ok(());
    }

    let (order, lines) = load_order_with_lines(state, order_id).await?;

    let buyer_email = order.shipping_address.email.trim().to_string();
    if buyer_email.is_empty() {
        return Err(AppError::Internal(anyhow::anyhow!(
            "order {order_id} has no buyer email"
        )));
    }

    let invoice = render_buyer_invoice(&order, &lines);
    state
        .mailer
        .send(
            &buyer_email,
            &format!("Your Make The Print order {}", short_id(order.id)),
            &invoice,
        )
        .await?;
    tracing::info!(order_id = %order_id, "buyer confirmation email sent");

    let notification = render_store_notification(&order, &lines);
    if let Err(err) = state
        .mailer
        .send(
            &state.config.store_notification_email,
            &format!("New paid order {}", short_id(order.id)),
            &notification,
        )
        .await
    {
        tracing::warn!(order_id = %order_id, error = %err, "store notification email failed");
    }

    Ok(())
}

/// Claim the right to send by flipping the sentinel from null, exactly
/// once. Zero affected rows means another caller got there first.
pub async fn claim_confirmation_email(pool: &DbPool, order_id: Uuid) -> AppResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE orders
        SET confirmation_email_sent_at = now()
        WHERE id = $1 AND confirmation_email_sent_at IS NULL
        "#,
    )
    .bind(order_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

async fn load_order_with_lines(
    state: &AppState,
    order_id: Uuid,
) -> AppResult<(Order, Vec<InvoiceLine>)> {
    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let order = order_from_entity(order);

    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .find_also_related(Products)
        .all(&state.orm)
        .await?;

    let lines = rows
        .into_iter()
        .map(|(item, product)| {
            let name = product.map(|p| p.name).unwrap_or_else(|| "Item".into());
            let item = order_item_from_entity(item);
            InvoiceLine {
                name,
                quantity: item.quantity,
                line_total: item.price * Decimal::from(item.quantity),
                unit_price: item.price,
                material: item.material,
            }
        })
        .collect();

    Ok((order, lines))
}

pub fn render_buyer_invoice(order: &Order, lines: &[InvoiceLine]) -> String {
    let mut rows = String::new();
    for line in lines {
        let detail = line
            .material
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(|m| format!("<br/><small>{}</small>", esc(m)))
            .unwrap_or_default();
        rows.push_str(&format!(
            "<tr><td>{}{}</td><td>{}</td><td>${}</td><td>${}</td></tr>",
            esc(&line.name),
            detail,
            line.quantity,
            money(line.unit_price),
            money(line.line_total),
        ));
    }

    let address = &order.shipping_address;
    format!(
        r#"<html><body>
<h2>Thank you for your order, {name}!</h2>
<p>Order <strong>{order_id}</strong> is confirmed and will be prepared for shipping.</p>
<table border="1" cellpadding="6" cellspacing="0">
<tr><th>Item</th><th>Qty</th><th>Unit</th><th>Total</th></tr>
{rows}
</table>
<p><strong>Order total: ${total}</strong></p>
<p>Shipping to:<br/>{address}</p>
</body></html>"#,
        name = esc(&address.name),
        order_id = short_id(order.id),
        rows = rows,
        total = money(order.total_amount),
        address = format_address(address),
    )
}

pub fn render_store_notification(order: &Order, lines: &[InvoiceLine]) -> String {
    let mut rows = String::new();
    for line in lines {
        rows.push_str(&format!(
            "<li>{} &times; {} ({})</li>",
            line.quantity,
            esc(&line.name),
            esc(line.material.as_deref().unwrap_or("-")),
        ));
    }

    let address = &order.shipping_address;
    format!(
        r#"<html><body>
<h2>New paid order {order_id}</h2>
<p>Total: <strong>${total}</strong></p>
<ul>{rows}</ul>
<p>Ship to:<br/>{address}</p>
<p>Buyer: {email}</p>
</body></html>"#,
        order_id = short_id(order.id),
        total = money(order.total_amount),
        rows = rows,
        address = format_address(address),
        email = esc(&address.email),
    )
}

fn format_address(address: &crate::models::Address) -> String {
    let mut parts = vec![esc(&address.name), esc(&address.line1)];
    if let Some(line2) = address.line2.as_deref().filter(|l| !l.is_empty()) {
        parts.push(esc(line2));
    }
    parts.push(format!(
        "{} {}",
        esc(&address.postal_code),
        esc(&address.city)
    ));
    if !address.country.is_empty() {
        parts.push(esc(&address.country));
    }
    parts.join("<br/>")
}

fn money(amount: Decimal) -> String {
    amount.round_dp(2).to_string()
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_uppercase()
}

fn esc(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
