use super::{to_cents, Repository};
use crate::domain::{
    CartLine, Category, ItemId, Money, Purchase, PurchaseDraft, PurchaseId, ShippingDetails,
    UserId,
};
use crate::recorder::{PersistenceError, PurchasePage, PurchaseRecorder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{info, warn};

fn cents(amount: Money) -> Result<i64, PersistenceError> {
    to_cents(amount).map_err(PersistenceError)
}

fn line_from_row(row: &SqliteRow) -> Result<CartLine, PersistenceError> {
    let category_str: String = row.try_get("category")?;
    let category = Category::from_str(&category_str).map_err(|e| {
        warn!(category = %category_str, "Stored purchase line has unknown category");
        PersistenceError(e.to_string())
    })?;
    let quantity: i64 = row.try_get("quantity")?;
    let quantity = u32::try_from(quantity)
        .map_err(|_| PersistenceError(format!("stored quantity out of range: {}", quantity)))?;

    Ok(CartLine {
        item_id: ItemId::new(row.try_get("item_id")?),
        title: row.try_get("title")?,
        category,
        unit_price: Money::from_minor_units(row.try_get("unit_price_cents")?),
        quantity,
    })
}

fn purchase_from_row(row: &SqliteRow, lines: Vec<CartLine>) -> Result<Purchase, PersistenceError> {
    let id_str: String = row.try_get("id")?;
    let id = PurchaseId::from_str(&id_str)
        .map_err(|e| PersistenceError(format!("bad purchase id {}: {}", id_str, e)))?;
    let shipping_json: String = row.try_get("shipping_details")?;
    let shipping_details: ShippingDetails = serde_json::from_str(&shipping_json)
        .map_err(|e| PersistenceError(format!("bad shipping details for {}: {}", id, e)))?;
    let created_ms: i64 = row.try_get("created_at")?;
    let created_at: DateTime<Utc> = DateTime::from_timestamp_millis(created_ms)
        .ok_or_else(|| PersistenceError(format!("bad created_at for {}", id)))?;

    Ok(Purchase {
        id,
        user_id: UserId::new(row.try_get("user_id")?),
        lines,
        subtotal: Money::from_minor_units(row.try_get("subtotal_cents")?),
        sales_tax: Money::from_minor_units(row.try_get("sales_tax_cents")?),
        luxury_tax: Money::from_minor_units(row.try_get("luxury_tax_cents")?),
        shipping: Money::from_minor_units(row.try_get("shipping_cents")?),
        total: Money::from_minor_units(row.try_get("total_cents")?),
        shipping_details,
        created_at,
    })
}

#[async_trait]
impl PurchaseRecorder for Repository {
    /// Purchase row and line rows go in one transaction.
    async fn create(&self, draft: &PurchaseDraft) -> Result<PurchaseId, PersistenceError> {
        let id = PurchaseId::new_v4();
        let breakdown = &draft.breakdown;
        let shipping_json = serde_json::to_string(&draft.shipping_details)
            .map_err(|e| PersistenceError(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, user_id, subtotal_cents, sales_tax_cents, luxury_tax_cents,
                shipping_cents, total_cents, shipping_details, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(draft.user_id.as_str())
        .bind(cents(breakdown.subtotal)?)
        .bind(cents(breakdown.sales_tax)?)
        .bind(cents(breakdown.luxury_tax)?)
        .bind(cents(breakdown.shipping)?)
        .bind(cents(breakdown.total)?)
        .bind(shipping_json)
        .bind(draft.created_at.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        for (line_no, line) in draft.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO purchase_items (
                    purchase_id, line_no, item_id, title, category,
                    unit_price_cents, quantity
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(id.to_string())
            .bind(line_no as i64)
            .bind(line.item_id.as_str())
            .bind(line.title.as_str())
            .bind(line.category.as_str())
            .bind(cents(line.unit_price)?)
            .bind(i64::from(line.quantity))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            purchase_id = %id,
            user = %draft.user_id,
            lines = draft.lines.len(),
            total = %breakdown.total,
            "Recorded purchase"
        );
        Ok(id)
    }

    /// Keyset pagination on `(created_at, rowid)`, read in one transaction so
    /// the lines match the page.
    async fn list_by_user(
        &self,
        user: &UserId,
        page: PurchasePage,
    ) -> Result<Vec<Purchase>, PersistenceError> {
        let mut tx = self.pool.begin().await?;

        let (anchor_ms, anchor_rowid) = match page.before {
            Some(before) => {
                let anchor: Option<(i64, i64)> = sqlx::query_as(
                    "SELECT created_at, rowid FROM purchases WHERE id = ? AND user_id = ?",
                )
                .bind(before.to_string())
                .bind(user.as_str())
                .fetch_optional(&mut *tx)
                .await?;
                match anchor {
                    Some(anchor) => anchor,
                    None => return Ok(Vec::new()),
                }
            }
            None => (i64::MAX, i64::MAX),
        };
        let limit = i64::from(page.limit);

        let purchase_rows = sqlx::query(
            r#"
            SELECT id, user_id, subtotal_cents, sales_tax_cents, luxury_tax_cents,
                   shipping_cents, total_cents, shipping_details, created_at
            FROM purchases
            WHERE user_id = ?
              AND (created_at < ? OR (created_at = ? AND rowid < ?))
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(user.as_str())
        .bind(anchor_ms)
        .bind(anchor_ms)
        .bind(anchor_rowid)
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        let line_rows = sqlx::query(
            r#"
            SELECT purchase_id, item_id, title, category, unit_price_cents, quantity
            FROM purchase_items
            WHERE purchase_id IN (
                SELECT id FROM purchases
                WHERE user_id = ?
                  AND (created_at < ? OR (created_at = ? AND rowid < ?))
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?
            )
            ORDER BY purchase_id, line_no
            "#,
        )
        .bind(user.as_str())
        .bind(anchor_ms)
        .bind(anchor_ms)
        .bind(anchor_rowid)
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut lines_by_purchase: HashMap<String, Vec<CartLine>> = HashMap::new();
        for row in &line_rows {
            let purchase_id: String = row.try_get("purchase_id")?;
            lines_by_purchase
                .entry(purchase_id)
                .or_default()
                .push(line_from_row(row)?);
        }

        purchase_rows
            .iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                let lines = lines_by_purchase.remove(&id).unwrap_or_default();
                purchase_from_row(row, lines)
            })
            .collect()
    }
}
