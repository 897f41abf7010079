use serde::de::DeserializeOwned;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::DbError;
use crate::model::{
    Conflict, ConflictResolution, ConflictStatus, Faction, NarrativeEvent, PoliticalMemory,
    Settlement, Suggestion, SuggestionStatus, SystemType, TickMetric, World,
};

/// Read every table back into a `World`.
///
/// The id generator is re-seated past the largest id read, so the returned
/// world can keep simulating.
pub async fn fetch_world(pool: &PgPool) -> Result<World, DbError> {
    let mut world = World::new();

    let tick: Option<i64> =
        sqlx::query_scalar("SELECT current_tick FROM world_clock WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    world.current_tick = unsigned(tick.unwrap_or(0), "world_clock.current_tick")?;

    let rows = sqlx::query(
        "SELECT id, name, treasury, stability, territories, military_strength, \
         relations::text AS relations, objectives::text AS objectives, \
         llm::text AS llm, alerts::text AS alerts \
         FROM factions ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    for row in &rows {
        let faction = Faction {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            treasury: row.try_get("treasury")?,
            stability: row.try_get("stability")?,
            territories: unsigned_i32(row.try_get("territories")?, "factions.territories")?,
            military_strength: row.try_get("military_strength")?,
            relations: json_column(row, "relations", "factions.relations")?,
            objectives: json_column(row, "objectives", "factions.objectives")?,
            llm: json_column(row, "llm", "factions.llm")?,
            alerts: json_column(row, "alerts", "factions.alerts")?,
        };
        world.factions.insert(faction.id.clone(), faction);
    }

    let rows = sqlx::query(
        "SELECT id, name, owner_faction_id, population, market_tier, garrison \
         FROM settlements ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    for row in &rows {
        let settlement = Settlement {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            owner_faction_id: row.try_get("owner_faction_id")?,
            population: unsigned(row.try_get("population")?, "settlements.population")?,
            market_tier: unsigned_i32(row.try_get("market_tier")?, "settlements.market_tier")?,
            garrison: unsigned_i32(row.try_get("garrison")?, "settlements.garrison")?,
        };
        world.settlements.insert(settlement.id.clone(), settlement);
    }

    let rows = sqlx::query(
        "SELECT id, source_faction_id, target_faction_id, factor_key, modifier_value, \
         is_static, expires_at_tick FROM political_memories ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    for row in &rows {
        let memory = PoliticalMemory {
            id: unsigned(row.try_get("id")?, "political_memories.id")?,
            source_faction_id: row.try_get("source_faction_id")?,
            target_faction_id: row.try_get("target_faction_id")?,
            factor_key: row.try_get("factor_key")?,
            modifier_value: row.try_get("modifier_value")?,
            is_static: row.try_get("is_static")?,
            expires_at_tick: opt_unsigned(
                row.try_get("expires_at_tick")?,
                "political_memories.expires_at_tick",
            )?,
        };
        world.political_memories.insert(memory.id, memory);
    }

    let rows = sqlx::query(
        "SELECT id, aggressor_faction_id, defender_faction_id, status, start_tick, \
         last_combat_tick, victory_faction_id, resolution FROM conflicts ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    for row in &rows {
        let resolution: Option<String> = row.try_get("resolution")?;
        let conflict = Conflict {
            id: unsigned(row.try_get("id")?, "conflicts.id")?,
            aggressor_faction_id: row.try_get("aggressor_faction_id")?,
            defender_faction_id: row.try_get("defender_faction_id")?,
            status: parse::<ConflictStatus>(row.try_get("status")?, "conflicts.status")?,
            start_tick: unsigned(row.try_get("start_tick")?, "conflicts.start_tick")?,
            last_combat_tick: opt_unsigned(
                row.try_get("last_combat_tick")?,
                "conflicts.last_combat_tick",
            )?,
            victory_faction_id: row.try_get("victory_faction_id")?,
            resolution: resolution
                .map(|r| parse::<ConflictResolution>(r, "conflicts.resolution"))
                .transpose()?,
        };
        world.conflicts.insert(conflict.id, conflict);
    }

    let rows = sqlx::query(
        "SELECT id, tick, faction_id, system_type, metric_key, value, created_at \
         FROM tick_metrics ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    for row in &rows {
        world.metrics.push(TickMetric {
            id: unsigned(row.try_get("id")?, "tick_metrics.id")?,
            tick: unsigned(row.try_get("tick")?, "tick_metrics.tick")?,
            faction_id: row.try_get("faction_id")?,
            system: parse::<SystemType>(row.try_get("system_type")?, "tick_metrics.system_type")?,
            metric_key: row.try_get("metric_key")?,
            value: row.try_get("value")?,
            created_at: row.try_get("created_at")?,
        });
    }

    let rows = sqlx::query(
        "SELECT id, tick, faction_id, text, created_at FROM narrative_events ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    for row in &rows {
        world.narratives.push(NarrativeEvent {
            id: unsigned(row.try_get("id")?, "narrative_events.id")?,
            tick: unsigned(row.try_get("tick")?, "narrative_events.tick")?,
            faction_id: row.try_get("faction_id")?,
            text: row.try_get("text")?,
            created_at: row.try_get("created_at")?,
        });
    }

    let rows = sqlx::query(
        "SELECT id, faction_id, tick, text, status, created_at, processed_at \
         FROM suggestions ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    for row in &rows {
        let suggestion = Suggestion {
            id: unsigned(row.try_get("id")?, "suggestions.id")?,
            faction_id: row.try_get("faction_id")?,
            tick: unsigned(row.try_get("tick")?, "suggestions.tick")?,
            text: row.try_get("text")?,
            status: parse::<SuggestionStatus>(row.try_get("status")?, "suggestions.status")?,
            created_at: row.try_get("created_at")?,
            processed_at: row.try_get("processed_at")?,
        };
        world.suggestions.insert(suggestion.id, suggestion);
    }

    world.reindex_metrics();
    world.sync_id_gen();
    Ok(world)
}

/// Decode a JSONB column selected as `::text`.
fn json_column<T: DeserializeOwned>(
    row: &PgRow,
    name: &str,
    column: &'static str,
) -> Result<T, DbError> {
    let raw: String = row.try_get(name)?;
    serde_json::from_str(&raw).map_err(|source| DbError::Json { column, source })
}

fn parse<T: TryFrom<String, Error = String>>(
    value: String,
    column: &'static str,
) -> Result<T, DbError> {
    T::try_from(value).map_err(|message| DbError::Invalid { column, message })
}

fn unsigned(value: i64, column: &'static str) -> Result<u64, DbError> {
    u64::try_from(value).map_err(|_| DbError::Invalid {
        column,
        message: format!("negative value {value}"),
    })
}

fn unsigned_i32(value: i32, column: &'static str) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|_| DbError::Invalid {
        column,
        message: format!("negative value {value}"),
    })
}

fn opt_unsigned(value: Option<i64>, column: &'static str) -> Result<Option<u64>, DbError> {
    value.map(|v| unsigned(v, column)).transpose()
}
