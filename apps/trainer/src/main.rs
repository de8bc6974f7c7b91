//! Headless trainer session.
//!
//! Loads a unit, prints its mastery summary, plays the first word through
//! the audio fallback engine, and records the visit in the progress
//! store.

mod content;
mod driver;
mod store;

use anyhow::Context;
use chrono::Utc;
use content::{ContentLibrary, DEFAULT_UNIT};
use driver::{host_channel, AudioDriver, FsMediaHost};
use drill_core::progress::{overall_mastery, SectionStats, StarBook, UnitStats};
use drill_core::{AudioEngine, AudioKey, ControlId, UnitContext};
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use store::ProgressStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

const STAR_DATA_KEY: &str = "star_data";
const LEARNING_STATS_KEY: &str = "learning_stats";

fn data_dir() -> PathBuf {
    env::var_os("DRILL_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(env::temp_dir)
        .join("dictation-trainer")
        .join("progress.json")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let unit_id = env::args().nth(1).unwrap_or_else(|| DEFAULT_UNIT.to_string());
    let library = ContentLibrary::new(data_dir());

    let index = library
        .index()
        .with_context(|| format!("loading unit index from {}", library.data_dir().display()))?;
    let unit = library
        .unit(&unit_id)
        .with_context(|| format!("loading unit {unit_id}"))?;
    info!(
        unit = unit_id,
        title = unit.unit_title.as_deref().unwrap_or(""),
        available = index.units.len(),
        "unit loaded"
    );

    let mut progress = ProgressStore::open(store_path()).context("opening progress store")?;
    let book: StarBook = progress
        .get_json(STAR_DATA_KEY)
        .context("decoding star data")?
        .unwrap_or_default();

    let words = SectionStats::aggregate(unit.words.iter().map(|w| w.id.as_str()), &book);
    let sentences = SectionStats::aggregate(unit.sentences.iter().map(|s| s.id.as_str()), &book);
    let mastery = overall_mastery(&words, &sentences);

    println!(
        "{}: {} words ({}% mastered), {} sentences ({}% mastered), {mastery}% overall",
        unit.unit_title.as_deref().unwrap_or(&unit_id),
        words.total,
        words.mastery_percent,
        sentences.total,
        sentences.mastery_percent,
    );

    if let Some(word) = unit.words.first() {
        let key = AudioKey::new(word.audio.as_str());
        let text = unit.resolve_text(&key).to_string();
        let (tx, rx) = host_channel();
        let host = FsMediaHost::new(data_dir(), tx.clone());
        let mut audio = AudioDriver::new(AudioEngine::default(), host, tx, rx);

        // Candidate paths are joined onto the host's root, so the audio
        // base is relative to the data directory here.
        let unit_context = UnitContext::new(unit_id.as_str()).with_audio_path("audio/");
        audio.play(
            &key,
            &ControlId::new(format!("word-{}", word.id)),
            &unit_context,
            Some(&text),
        );
        let settled = audio.run_until_settled().await;
        info!(?settled, word = word.id, "playback settled");
        audio.stop();
    }

    let now = Utc::now();
    let mut stats: BTreeMap<String, UnitStats> = progress
        .get_json(LEARNING_STATS_KEY)
        .context("decoding learning stats")?
        .unwrap_or_default();
    match stats.get_mut(&unit_id) {
        Some(unit_stats) => unit_stats.record_session(now),
        None => {
            stats.insert(unit_id.clone(), UnitStats::new_session(now));
        }
    }
    if let Some(unit_stats) = stats.get_mut(&unit_id) {
        unit_stats.mastery = mastery;
    }

    progress
        .set_json(LEARNING_STATS_KEY, &stats)
        .context("encoding learning stats")?;
    progress.flush().context("writing progress store")?;
    info!(path = %progress.path().display(), "progress saved");

    Ok(())
}
