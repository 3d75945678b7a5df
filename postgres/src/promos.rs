use crate::{PostgresStore, db_error, to_u32};
use async_trait::async_trait;
use experiences_core::{DiscountKind, Promo, PromoCode, PromoStore, StoreError};
use sqlx::Row;

#[async_trait]
impl PromoStore for PostgresStore {
    async fn find_promo(&self, code: &PromoCode) -> Result<Option<Promo>, StoreError> {
        let Some(row) = sqlx::query(
            "SELECT code, discount_type, amount, expires_at, active FROM promos WHERE code = $1",
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        else {
            return Ok(None);
        };

        let stored_code: String = row.try_get("code").map_err(db_error)?;
        let kind: String = row.try_get("discount_type").map_err(db_error)?;

        Ok(Some(Promo {
            code: PromoCode::parse(&stored_code)
                .ok_or_else(|| StoreError::Database("blank promo code stored".to_string()))?,
            kind: DiscountKind::parse(&kind)
                .ok_or_else(|| StoreError::Database(format!("unknown discount type '{kind}'")))?,
            amount: to_u32(row.try_get("amount").map_err(db_error)?, "amount")?,
            expires_at: row.try_get("expires_at").map_err(db_error)?,
            active: row.try_get("active").map_err(db_error)?,
        }))
    }
}
