use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::model::World;

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Flush the world state to JSONL files in the given output directory, one
/// file per table:
///
/// `factions`, `settlements`, `political_memories`, `conflicts`,
/// `tick_metrics`, `narrative_events` and `suggestions`, each `.jsonl`.
///
/// Creates the directory if needed. Existing files are overwritten.
pub fn flush_to_jsonl(world: &World, output_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;

    write_jsonl(&output_dir.join("factions.jsonl"), world.factions.values())?;
    write_jsonl(
        &output_dir.join("settlements.jsonl"),
        world.settlements.values(),
    )?;
    write_jsonl(
        &output_dir.join("political_memories.jsonl"),
        world.political_memories.values(),
    )?;
    write_jsonl(&output_dir.join("conflicts.jsonl"), world.conflicts.values())?;
    write_jsonl(&output_dir.join("tick_metrics.jsonl"), world.metrics.iter())?;
    write_jsonl(
        &output_dir.join("narrative_events.jsonl"),
        world.narratives.iter(),
    )?;
    write_jsonl(
        &output_dir.join("suggestions.jsonl"),
        world.suggestions.values(),
    )?;

    tracing::debug!(dir = %output_dir.display(), tick = world.current_tick, "world flushed");
    Ok(())
}
