//! Play a full seeded game against a JSON corpus and summarize the selections

use chronoquiz_core::config::{level_config, Event, SelectorSettings, MAX_LEVEL};
use chronoquiz_core::selection::{SelectionRequest, Selector, UsedEvents};
use chronoquiz_core::timeline::{DateCache, Era};
use chronoquiz_core::NoopHooks;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Simulated wall clock start; each turn advances it by one second
const CLOCK_START_MS: i64 = 1_700_000_000_000;
const TURN_MS: i64 = 1_000;

#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(about = "Simulate a game of the timeline quiz against an event corpus")]
struct Args {
    /// JSON array of events
    #[arg(short, long)]
    corpus: PathBuf,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum number of turns
    #[arg(short, long, default_value = "150")]
    turns: u32,

    /// Base probability of a correct answer (0..1)
    #[arg(long, default_value = "0.6")]
    skill: f64,

    #[arg(long, default_value = "3")]
    lives: u32,

    /// Optional JSON engine settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the JSON summary here instead of stdout
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct FinalState {
    level: u32,
    lives: u32,
    turns: u32,
    total_correct: u32,
}

#[derive(Debug, Default, Serialize)]
struct Counts {
    proposed: usize,
    correct: usize,
    errors: usize,
    unique_proposed: usize,
    temporal_jumps: usize,
    bonus_events: usize,
    anti_frustration: usize,
    malformed_dates: u64,
}

#[derive(Debug, Serialize)]
struct NotorietyStats {
    count: usize,
    min: Option<i32>,
    median: Option<f64>,
    max: Option<i32>,
    avg: Option<f64>,
}

impl NotorietyStats {
    fn from_values(mut values: Vec<i32>) -> Self {
        values.sort_unstable();
        let count = values.len();
        let median = match count {
            0 => None,
            n if n % 2 == 1 => Some(values[n / 2] as f64),
            n => Some((values[n / 2 - 1] + values[n / 2]) as f64 / 2.0),
        };
        let avg = (count > 0).then(|| values.iter().map(|v| *v as f64).sum::<f64>() / count as f64);
        Self {
            count,
            min: values.first().copied(),
            median,
            max: values.last().copied(),
            avg,
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    player_skill: f64,
    #[serde(rename = "final")]
    final_state: FinalState,
    counts: Counts,
    era_distribution: BTreeMap<&'static str, usize>,
    fallback_rungs: BTreeMap<&'static str, usize>,
    notoriety_proposed: NotorietyStats,
}

/// Chance that the simulated player answers correctly
fn prob_correct(skill: f64, gap_years: f64, pick: &Event, level: u32) -> f64 {
    let gap_ease = ((1.0 + gap_years.max(0.0)).log10() / 10.0).min(0.35);
    let difficulty = pick.difficulty_level.unwrap_or(3);
    let difficulty_malus = ((difficulty - 3) as f64 * 0.05).min(0.25);
    let notoriety_bonus = (pick.notoriety.unwrap_or(50) - 50) as f64 / 1000.0;
    let level_tension = ((level.saturating_sub(1)) as f64 * 0.02).min(0.10);
    let mut p = skill + gap_ease - difficulty_malus + notoriety_bonus - level_tension;
    if level <= 2 {
        p += 0.03;
    }
    p.clamp(0.05, 0.95)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let raw = std::fs::read_to_string(&args.corpus)?;
    let corpus: Vec<Event> = Event::corpus_from_json(&raw)?
        .into_iter()
        .filter(|event| event.date_str().is_some() && !event.title.is_empty())
        .collect();
    if corpus.is_empty() {
        return Err("corpus has no dated events".into());
    }

    let settings = match &args.settings {
        Some(path) => SelectorSettings::from_json(&std::fs::read_to_string(path)?)?,
        None => SelectorSettings::default(),
    };
    info!(events = corpus.len(), seed, "starting simulation");

    let mut selector = Selector::with_settings(settings, Some(seed))?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);
    let mut dates = DateCache::new();

    let mut level = 1;
    let mut lives = args.lives;
    let mut streak = 0;
    let mut in_level = 0;
    let mut turns = 0;
    let mut total_correct = 0;

    let mut reference = corpus[rng.gen_range(0..corpus.len())].clone();
    let mut used: UsedEvents = std::iter::once(reference.id.clone()).collect();

    let mut counts = Counts::default();
    let mut unique = HashSet::new();
    let mut era_distribution: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut fallback_rungs: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut notoriety = Vec::new();

    while lives > 0 && turns < args.turns {
        let now_ms = CLOCK_START_MS + turns as i64 * TURN_MS;
        let request = SelectionRequest {
            events: &corpus,
            reference: Some(&reference),
            level,
            used: &mut used,
            streak,
        };
        let Some(selected) = selector.select_new_event_at(now_ms, request, &mut NoopHooks)? else {
            break;
        };
        let pick = &selected.event;
        let meta = &selected.meta;

        counts.proposed += 1;
        unique.insert(pick.id.clone());
        counts.temporal_jumps += usize::from(meta.is_temporal_jump);
        counts.bonus_events += usize::from(meta.is_bonus_event);
        counts.anti_frustration += usize::from(meta.is_anti_frustration);
        let rung = match meta.fallback_rung {
            Some(rung) => rung.label(),
            None => "temporal_jump",
        };
        *fallback_rungs.entry(rung).or_default() += 1;
        let era = pick.date_str().and_then(Era::of_date);
        *era_distribution.entry(era.map_or("unknown", Era::label)).or_default() += 1;
        if let Some(value) = pick.notoriety {
            notoriety.push(value);
        }

        let gap_years = dates.time_difference_years(&reference, pick);
        let p = prob_correct(args.skill, gap_years, pick, level);
        let correct = rng.gen::<f64>() < p;

        if correct {
            total_correct += 1;
            streak += 1;
            in_level += 1;
            selector.record_correct_answer();
            let needed = level_config(level).map_or(u32::MAX, |config| config.events_needed);
            if in_level >= needed && level < MAX_LEVEL {
                level += 1;
                in_level = 0;
                selector.begin_level(level);
                info!(level, "level up");
            }
        } else {
            lives -= 1;
            streak = 0;
            in_level = 0;
            selector.record_incorrect_answer();
        }

        info!(
            turn = turns + 1,
            title = %pick.title,
            date = pick.date_str().unwrap_or("?"),
            rung,
            p = %format!("{:.2}", p),
            correct,
            level,
            lives,
            "turn"
        );

        reference = selected.event;
        turns += 1;
    }

    counts.correct = total_correct as usize;
    counts.errors = counts.proposed - counts.correct;
    counts.unique_proposed = unique.len();
    counts.malformed_dates = selector.date_cache().malformed_count();

    let summary = Summary {
        seed,
        player_skill: args.skill,
        final_state: FinalState {
            level,
            lives,
            turns,
            total_correct,
        },
        counts,
        era_distribution,
        fallback_rungs,
        notoriety_proposed: NotorietyStats::from_values(notoriety),
    };

    let json = serde_json::to_string_pretty(&summary)?;
    match &args.summary {
        Some(path) => {
            std::fs::write(path, json)?;
            info!(path = %path.display(), "summary written");
        }
        None => println!("{}", json),
    }
    Ok(())
}
