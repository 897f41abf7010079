use serde::Serialize;
use sqlx::PgPool;

use super::DbError;
use crate::model::{PoliticalMemory, World};

/// Load an entire `World` into empty tables using COPY FROM STDIN (text format),
/// and set the clock to the world's current tick.
pub async fn load_world(pool: &PgPool, world: &World) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO world_clock (id, current_tick) VALUES (1, $1) \
         ON CONFLICT (id) DO UPDATE SET current_tick = EXCLUDED.current_tick",
    )
    .bind(world.current_tick as i64)
    .execute(pool)
    .await?;

    // Factions
    {
        let mut buf = String::new();
        for f in world.factions.values() {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                escape(&f.id),
                escape(&f.name),
                f.treasury,
                f.stability,
                f.territories,
                f.military_strength,
                escape(&json(&f.relations, "factions.relations")?),
                escape(&json(&f.objectives, "factions.objectives")?),
                escape(&json(&f.llm, "factions.llm")?),
                escape(&json(&f.alerts, "factions.alerts")?),
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_factions.sql"), &buf).await?;
    }

    // Settlements
    {
        let mut buf = String::new();
        for s in world.settlements.values() {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\n",
                escape(&s.id),
                escape(&s.name),
                escape(&s.owner_faction_id),
                s.population,
                s.market_tier,
                s.garrison,
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_settlements.sql"), &buf).await?;
    }

    // Political memories
    {
        let mut buf = String::new();
        for m in world.political_memories.values() {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                m.id,
                escape(&m.source_faction_id),
                escape(&m.target_faction_id),
                escape(&m.factor_key),
                m.modifier_value,
                m.is_static,
                opt(m.expires_at_tick),
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_political_memories.sql"), &buf).await?;
    }

    // Conflicts
    {
        let mut buf = String::new();
        for c in world.conflicts.values() {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                c.id,
                escape(&c.aggressor_faction_id),
                escape(&c.defender_faction_id),
                c.status,
                c.start_tick,
                opt(c.last_combat_tick),
                opt_str(c.victory_faction_id.as_deref()),
                opt(c.resolution),
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_conflicts.sql"), &buf).await?;
    }

    // Tick metrics
    {
        let mut buf = String::new();
        for m in &world.metrics {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                m.id,
                m.tick,
                opt_str(m.faction_id.as_deref()),
                m.system,
                escape(&m.metric_key),
                m.value,
                m.created_at,
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_tick_metrics.sql"), &buf).await?;
    }

    // Narrative events
    {
        let mut buf = String::new();
        for n in &world.narratives {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\n",
                n.id,
                n.tick,
                escape(&n.faction_id),
                escape(&n.text),
                n.created_at,
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_narrative_events.sql"), &buf).await?;
    }

    // Suggestions
    {
        let mut buf = String::new();
        for s in world.suggestions.values() {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                s.id,
                escape(&s.faction_id),
                s.tick,
                escape(&s.text),
                s.status,
                s.created_at,
                opt(s.processed_at),
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_suggestions.sql"), &buf).await?;
    }

    Ok(())
}

/// Insert one political memory, surfacing the (source, target, factor) uniqueness
/// constraint as `DbError::DuplicatePoliticalMemory`.
pub async fn insert_political_memory(
    pool: &PgPool,
    memory: &PoliticalMemory,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "INSERT INTO political_memories \
         (id, source_faction_id, target_faction_id, factor_key, modifier_value, is_static, expires_at_tick) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(memory.id as i64)
    .bind(&memory.source_faction_id)
    .bind(&memory.target_faction_id)
    .bind(&memory.factor_key)
    .bind(memory.modifier_value)
    .bind(memory.is_static)
    .bind(memory.expires_at_tick.map(|t| t as i64))
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            Err(DbError::DuplicatePoliticalMemory {
                source_faction_id: memory.source_faction_id.clone(),
                target_faction_id: memory.target_faction_id.clone(),
                factor_key: memory.factor_key.clone(),
            })
        }
        Err(err) => Err(err.into()),
    }
}

/// Execute a COPY FROM STDIN with the given text-format payload.
async fn copy_in(pool: &PgPool, statement: &str, data: &str) -> Result<(), sqlx::Error> {
    if data.is_empty() {
        return Ok(());
    }
    let mut conn = pool.acquire().await?;
    let mut copy = conn.copy_in_raw(statement).await?;
    copy.send(data.as_bytes()).await?;
    copy.finish().await?;
    Ok(())
}

/// Escape a string for Postgres COPY text format.
/// Backslash must be escaped first, then the special whitespace characters.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Render an optional value as a COPY text value (`\N` for NULL).
fn opt<T: std::fmt::Display>(v: Option<T>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => "\\N".to_string(),
    }
}

fn opt_str(v: Option<&str>) -> String {
    v.map(escape).unwrap_or_else(|| "\\N".to_string())
}

/// Serialize a JSONB column value.
fn json<T: Serialize>(val: &T, column: &'static str) -> Result<String, DbError> {
    serde_json::to_string(val).map_err(|source| DbError::Json { column, source })
}
