//! Experience catalog queries and seeding.

use crate::{PostgresStore, db_error, to_i32, to_u32};
use async_trait::async_trait;
use experiences_core::{
    CatalogSeeder, Experience, ExperienceId, ExperienceStore, Promo, ScheduledDate, StoreError,
};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Postgres, Row, Transaction};

const EXPERIENCE_COLUMNS: &str = "id, title, description, price, location, image, minimum_age, \
     included_items, requirements, available_dates, active, created_at, updated_at";

fn experience_from_row(row: &PgRow) -> Result<Experience, StoreError> {
    let Json(available_dates): Json<Vec<ScheduledDate>> =
        row.try_get("available_dates").map_err(db_error)?;

    Ok(Experience {
        id: ExperienceId::from_uuid(row.try_get("id").map_err(db_error)?),
        title: row.try_get("title").map_err(db_error)?,
        description: row.try_get("description").map_err(db_error)?,
        price: to_u32(row.try_get("price").map_err(db_error)?, "price")?,
        location: row.try_get("location").map_err(db_error)?,
        image: row.try_get("image").map_err(db_error)?,
        minimum_age: to_u32(row.try_get("minimum_age").map_err(db_error)?, "minimum_age")?,
        included_items: row.try_get("included_items").map_err(db_error)?,
        requirements: row.try_get("requirements").map_err(db_error)?,
        available_dates,
        active: row.try_get("active").map_err(db_error)?,
        created_at: row.try_get("created_at").map_err(db_error)?,
        updated_at: row.try_get("updated_at").map_err(db_error)?,
    })
}

#[async_trait]
impl ExperienceStore for PostgresStore {
    #[tracing::instrument(skip(self))]
    async fn list_experiences(&self) -> Result<Vec<Experience>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {EXPERIENCE_COLUMNS} FROM experiences WHERE active ORDER BY created_at, title"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(experience_from_row).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn get_experience(&self, id: ExperienceId) -> Result<Option<Experience>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {EXPERIENCE_COLUMNS} FROM experiences WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(experience_from_row).transpose()
    }
}

async fn insert_experience(
    tx: &mut Transaction<'_, Postgres>,
    experience: &Experience,
) -> Result<(), StoreError> {
    sqlx::query(
        r"
        INSERT INTO experiences (
            id, title, description, price, location, image, minimum_age,
            included_items, requirements, available_dates, active, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ",
    )
    .bind(experience.id.as_uuid())
    .bind(&experience.title)
    .bind(&experience.description)
    .bind(to_i32(experience.price, "price")?)
    .bind(&experience.location)
    .bind(&experience.image)
    .bind(to_i32(experience.minimum_age, "minimum_age")?)
    .bind(&experience.included_items)
    .bind(&experience.requirements)
    .bind(Json(&experience.available_dates))
    .bind(experience.active)
    .bind(experience.created_at)
    .bind(experience.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(db_error)?;
    Ok(())
}

async fn insert_promo(tx: &mut Transaction<'_, Postgres>, promo: &Promo) -> Result<(), StoreError> {
    sqlx::query(
        r"
        INSERT INTO promos (code, discount_type, amount, expires_at, active)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(promo.code.as_str())
    .bind(promo.kind.as_str())
    .bind(to_i32(promo.amount, "amount")?)
    .bind(promo.expires_at)
    .bind(promo.active)
    .execute(&mut **tx)
    .await
    .map_err(db_error)?;
    Ok(())
}

#[async_trait]
impl CatalogSeeder for PostgresStore {
    #[tracing::instrument(skip_all, fields(experiences = experiences.len(), promos = promos.len()))]
    async fn replace_catalog(
        &self,
        experiences: &[Experience],
        promos: &[Promo],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for table in ["bookings", "experiences", "promos"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        for experience in experiences {
            insert_experience(&mut tx, experience).await?;
        }
        for promo in promos {
            insert_promo(&mut tx, promo).await?;
        }

        tx.commit().await.map_err(db_error)?;
        tracing::info!("Catalog replaced");
        Ok(())
    }

    async fn experience_count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM experiences")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        crate::to_u64(count, "count")
    }
}
