use sqlx::PgPool;

use crate::db::models::Fact;

pub(crate) async fn list_newest_first(pool: &PgPool) -> Result<Vec<Fact>, sqlx::Error> {
    sqlx::query_as::<_, Fact>(
        "SELECT id, text, created_at
         FROM facts
         ORDER BY created_at DESC, id",
    )
    .fetch_all(pool)
    .await
}
