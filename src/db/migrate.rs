use sqlx::PgPool;

/// Create every table and index if missing, then make sure the clock row exists.
///
/// Safe to run repeatedly; an existing clock keeps its tick.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_str!("../../sql/schema.sql"))
        .execute(pool)
        .await?;
    sqlx::query("INSERT INTO world_clock (id, current_tick) VALUES (1, 0) ON CONFLICT (id) DO NOTHING")
        .execute(pool)
        .await?;
    Ok(())
}
