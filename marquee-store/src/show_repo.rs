use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use marquee_core::{Show, ShowCatalog, StoreResult};

use crate::retry::with_retry;

/// Read-only view over the catalog's `shows` table. The catalog service
/// owns writes; this engine only looks up price, layout and blocked seats.
pub struct PgShowCatalog {
    pool: PgPool,
}

impl PgShowCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ShowRow {
    id: Uuid,
    title: String,
    starts_at: DateTime<Utc>,
    price_cents: i64,
    seats: Vec<String>,
    unavailable_seats: Vec<String>,
}

impl From<ShowRow> for Show {
    fn from(row: ShowRow) -> Self {
        Show {
            id: row.id,
            title: row.title,
            starts_at: row.starts_at,
            price_cents: row.price_cents,
            seats: row.seats,
            unavailable_seats: row.unavailable_seats,
        }
    }
}

#[async_trait]
impl ShowCatalog for PgShowCatalog {
    async fn get_show(&self, id: Uuid) -> StoreResult<Option<Show>> {
        let row = with_retry("show fetch", || async {
            let row: Option<ShowRow> = sqlx::query_as(
                "SELECT id, title, starts_at, price_cents, seats, unavailable_seats \
                 FROM shows WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        })
        .await?;
        Ok(row.map(Show::from))
    }
}
