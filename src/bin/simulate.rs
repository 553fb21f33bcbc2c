use clap::Parser;
use maze_chase_engine::config::{ConfigError, SessionConfig};
use maze_chase_engine::constants::{ticks_for_seconds, TICK_RATE};
use maze_chase_engine::engine::Session;
use maze_chase_engine::rng::{RandomSource, Rng};
use maze_chase_engine::types::{
    Direction, InputIntents, PursuerMode, SceneState, Snapshot, TickEvent, TileCode,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON session config; the classic maze is used when omitted.
    #[arg(long)]
    layout: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 1)]
    episodes: u32,
    #[arg(long)]
    max_ticks: Option<u64>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum EpisodeOutcome {
    Won,
    Lost,
    Timeout,
}

#[derive(Clone, Debug, Serialize)]
struct EpisodeResultLine {
    episode: u32,
    seed: u32,
    outcome: EpisodeOutcome,
    ticks: u64,
    score: u32,
    #[serde(rename = "smallPickups")]
    small_pickups: u32,
    #[serde(rename = "powerPickups")]
    power_pickups: u32,
    #[serde(rename = "pursuersCaught")]
    pursuers_caught: u32,
    #[serde(rename = "frightenedExpirations")]
    frightened_expirations: u32,
    #[serde(rename = "remainingPickups")]
    remaining_pickups: usize,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct EpisodeRunResult {
    result: EpisodeResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "generatedAtIso")]
    generated_at_iso: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "episodeCount")]
    episode_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "averageTicks")]
    average_ticks: u64,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    episodes: Vec<EpisodeResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

/// Seeded stand-in for a human at the keyboard: holds one direction and
/// re-picks an open one at tile centers or when stuck.
struct Autopilot {
    rng: Rng,
    dir: Direction,
    last_position: Option<(f64, f64)>,
}

impl Autopilot {
    fn new(seed: u32) -> Self {
        Self {
            rng: Rng::new(seed ^ 0x5eed_a11e),
            dir: Direction::None,
            last_position: None,
        }
    }

    fn intents(&mut self, snapshot: &Snapshot, speed: f64) -> InputIntents {
        let (x, y) = (snapshot.player.x, snapshot.player.y);
        let tile_size = snapshot.tile_size;
        let tile_x = (x / tile_size).floor() as i32;
        let tile_y = (y / tile_size).floor() as i32;
        let center_x = tile_x as f64 * tile_size + tile_size / 2.0;
        let center_y = tile_y as f64 * tile_size + tile_size / 2.0;
        let centered = (x - center_x).abs() < speed && (y - center_y).abs() < speed;
        let stuck = self.last_position == Some((x, y));
        self.last_position = Some((x, y));

        if centered || stuck || self.dir == Direction::None {
            let open: Vec<Direction> = Direction::CARDINALS
                .into_iter()
                .filter(|dir| {
                    let (nx, ny) = dir.offset(tile_x, tile_y);
                    snapshot.tile_at(nx, ny) != TileCode::Wall
                })
                .collect();
            let keep_going = open.contains(&self.dir) && !stuck && self.rng.bool(0.6);
            if !keep_going && !open.is_empty() {
                let forward: Vec<Direction> = open
                    .iter()
                    .copied()
                    .filter(|dir| *dir != self.dir.opposite())
                    .collect();
                let choices = if forward.is_empty() || stuck { &open } else { &forward };
                self.dir = choices[self.rng.pick_index(choices.len())];
            }
        }
        InputIntents::none().with(self.dir)
    }
}

fn main() {
    let cli = Cli::parse();
    let run_started_at_ms = now_ms();
    let base_seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(base_seed, run_started_at_ms));

    let config = match resolve_config(cli.layout.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            emit_log(
                "error",
                "config_rejected",
                &run_id,
                None,
                None,
                json!({
                    "path": cli.layout.as_ref().map(|path| path.to_string_lossy().to_string()),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
    };
    let max_ticks = cli
        .max_ticks
        .unwrap_or_else(|| ticks_for_seconds(3 * 60))
        .max(1);

    emit_log(
        "info",
        "run_started",
        &run_id,
        Some(base_seed),
        None,
        json!({
            "episodes": cli.episodes,
            "maxTicks": max_ticks,
            "tickRate": TICK_RATE,
            "width": config.layout.dimensions().0,
            "height": config.layout.dimensions().1,
            "pursuers": config.pursuers.len(),
        }),
    );

    let mut has_anomaly = false;
    let mut episode_results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for episode in 0..cli.episodes {
        let seed = base_seed.wrapping_add(episode);
        let run = match run_episode(&config, episode, seed, max_ticks) {
            Ok(run) => run,
            Err(error) => {
                emit_log(
                    "error",
                    "session_rejected",
                    &run_id,
                    Some(seed),
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        };

        for anomaly in &run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(seed),
                Some(anomaly.tick),
                json!({ "episode": episode, "message": anomaly.message }),
            );
        }
        if !run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += run.anomaly_records.len();
        *outcome_counts
            .entry(outcome_key(run.result.outcome))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "episode_finished",
            &run_id,
            Some(seed),
            Some(run.result.ticks),
            json!({
                "episode": episode,
                "outcome": run.result.outcome,
                "score": run.result.score,
                "remainingPickups": run.result.remaining_pickups,
            }),
        );

        match serde_json::to_string(&run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                "error",
                "result_serialize_failed",
                &run_id,
                Some(seed),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        episode_results.push(run.result);
    }

    let summary = build_run_summary(
        run_id.clone(),
        run_started_at_ms,
        now_ms(),
        episode_results,
        outcome_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        Some(base_seed),
        None,
        json!({
            "episodeCount": summary.episode_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn resolve_config(path: Option<&Path>) -> Result<SessionConfig, ConfigError> {
    match path {
        Some(path) => SessionConfig::load(path),
        None => Ok(SessionConfig::classic()),
    }
}

fn run_episode(
    config: &SessionConfig,
    episode: u32,
    seed: u32,
    max_ticks: u64,
) -> Result<EpisodeRunResult, ConfigError> {
    let mut session = Session::new(config.clone(), seed)?;
    let mut autopilot = Autopilot::new(seed);
    let frightened_limit = config.rules.frightened_ticks;

    let mut result = EpisodeResultLine {
        episode,
        seed,
        outcome: EpisodeOutcome::Timeout,
        ticks: 0,
        score: 0,
        small_pickups: 0,
        power_pickups: 0,
        pursuers_caught: 0,
        frightened_expirations: 0,
        remaining_pickups: 0,
        anomalies: Vec::new(),
    };
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut previous = session.snapshot();

    while session.tick() < max_ticks {
        let Some(current) = previous.as_ref() else {
            break;
        };
        let intents = autopilot.intents(current, config.player.speed);
        let state = session.advance(&intents);

        for event in session.drain_events() {
            match event {
                TickEvent::PickupConsumed {
                    tile: TileCode::SmallPickup,
                    ..
                } => result.small_pickups += 1,
                TickEvent::PickupConsumed {
                    tile: TileCode::PowerPickup,
                    ..
                } => result.power_pickups += 1,
                TickEvent::PursuerCaught { .. } => result.pursuers_caught += 1,
                TickEvent::FrightenedExpired { .. } => result.frightened_expirations += 1,
                _ => {}
            }
        }

        match state {
            SceneState::Playing(snapshot) => {
                for message in collect_snapshot_anomalies(current, &snapshot, frightened_limit) {
                    push_anomaly(
                        &mut result.anomalies,
                        &mut anomaly_records,
                        &mut anomaly_seen,
                        snapshot.tick,
                        message,
                    );
                }
                result.remaining_pickups = snapshot.remaining_pickups;
                previous = Some(snapshot);
            }
            SceneState::Lost { .. } => {
                result.outcome = EpisodeOutcome::Lost;
                break;
            }
            SceneState::Won { .. } => {
                result.outcome = EpisodeOutcome::Won;
                result.remaining_pickups = 0;
                break;
            }
        }
    }

    result.ticks = session.tick();
    result.score = session.score();
    Ok(EpisodeRunResult {
        result,
        anomaly_records,
    })
}

fn collect_snapshot_anomalies(
    before: &Snapshot,
    after: &Snapshot,
    frightened_limit: u32,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    if after.score < before.score {
        anomalies.push(format!(
            "score decreased: {} -> {}",
            before.score, after.score
        ));
    }
    if after.remaining_pickups > before.remaining_pickups {
        anomalies.push(format!(
            "pickups reappeared: {} -> {}",
            before.remaining_pickups, after.remaining_pickups
        ));
    }

    let max_x = after.width as f64 * after.tile_size;
    let max_y = after.height as f64 * after.tile_size;
    let outside = |x: f64, y: f64| !(0.0..max_x).contains(&x) || !(0.0..max_y).contains(&y);
    if outside(after.player.x, after.player.y) {
        anomalies.push(format!(
            "player outside grid: ({:.1}, {:.1})",
            after.player.x, after.player.y
        ));
    }
    for pursuer in &after.pursuers {
        if outside(pursuer.x, pursuer.y) {
            anomalies.push(format!("pursuer {} outside grid", pursuer.index));
        }
        if pursuer.heading == Direction::None {
            anomalies.push(format!("pursuer {} lost its heading", pursuer.index));
        }
        if pursuer.frightened_ticks > frightened_limit
            || (pursuer.mode == PursuerMode::Normal && pursuer.frightened_ticks != 0)
        {
            anomalies.push(format!(
                "pursuer {} frightened timer out of range: {}",
                pursuer.index, pursuer.frightened_ticks
            ));
        }
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    episodes: Vec<EpisodeResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let episode_count = episodes.len();
    let (average_score, average_ticks) = if episode_count == 0 {
        (0, 0)
    } else {
        let total_score: u64 = episodes.iter().map(|e| e.score as u64).sum();
        let total_ticks: u64 = episodes.iter().map(|e| e.ticks).sum();
        (
            (total_score / episode_count as u64) as u32,
            total_ticks / episode_count as u64,
        )
    };
    RunSummary {
        run_id,
        generated_at_iso: chrono::Utc::now()
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        started_at_ms,
        finished_at_ms,
        episode_count,
        anomaly_count,
        average_score,
        average_ticks,
        outcome_counts,
        episodes,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        seed,
        tick,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(text) => eprintln!("{text}"),
        Err(error) => eprintln!("[simulate] failed to serialize log line {event}: {error}"),
    }
}

fn outcome_key(outcome: EpisodeOutcome) -> String {
    match outcome {
        EpisodeOutcome::Won => "won",
        EpisodeOutcome::Lost => "lost",
        EpisodeOutcome::Timeout => "timeout",
    }
    .to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
