use crate::config::{ConfigError, GameRules, SessionConfig};
use crate::constants::footprint_radius;
use crate::grid::GridMap;
use crate::rng::{RandomSource, Rng};
use crate::types::{
    Direction, InputIntents, PlayerView, PursuerMode, PursuerView, SceneState, Snapshot,
    TickEvent,
};

pub mod collision;
pub mod intersection;
pub mod movement;
pub mod pursuit;
mod resolve_system;

use self::intersection::is_at_decision_point;
use self::movement::{move_player, try_step, Body};
use self::pursuit::choose_heading;

#[derive(Clone, Debug)]
struct PursuerInternal {
    body: Body,
    heading: Direction,
    mode: PursuerMode,
    frightened_ticks: u32,
    spawn: (f64, f64),
}

impl PursuerInternal {
    fn set_frightened(&mut self, ticks: u32) {
        if ticks == 0 {
            return;
        }
        self.mode = PursuerMode::Frightened;
        self.frightened_ticks = ticks;
    }

    /// Counts the frightened timer down. Returns true on the tick it expires.
    fn tick_frightened(&mut self) -> bool {
        if self.mode != PursuerMode::Frightened {
            return false;
        }
        self.frightened_ticks = self.frightened_ticks.saturating_sub(1);
        if self.frightened_ticks == 0 {
            self.mode = PursuerMode::Normal;
            return true;
        }
        false
    }

    fn reset_to_spawn(&mut self) {
        self.body.x = self.spawn.0;
        self.body.y = self.spawn.1;
        self.mode = PursuerMode::Normal;
        self.frightened_ticks = 0;
    }

    fn view(&self, index: usize) -> PursuerView {
        PursuerView {
            index,
            x: self.body.x,
            y: self.body.y,
            heading: self.heading,
            mode: self.mode,
            frightened_ticks: self.frightened_ticks,
            spawn_x: self.spawn.0,
            spawn_y: self.spawn.1,
        }
    }
}

/// Everything that only exists while a round is being played.
#[derive(Clone, Debug)]
struct PlayField {
    grid: GridMap,
    player: Body,
    pursuers: Vec<PursuerInternal>,
    score: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TickOutcome {
    Continue,
    Lost,
    Won,
}

#[derive(Clone, Debug)]
enum Scene {
    Playing(Box<PlayField>),
    Lost { score: u32 },
    Won { score: u32 },
}

/// One round of the maze chase: owns the grid, the agents and the score, and
/// advances them one tick per `advance` call.
#[derive(Clone, Debug)]
pub struct Session<R: RandomSource = Rng> {
    config: SessionConfig,
    initial: Box<PlayField>,
    source: R,
    scene: Scene,
    tick_counter: u64,
    events: Vec<TickEvent>,
}

impl Session<Rng> {
    pub fn new(config: SessionConfig, seed: u32) -> Result<Self, ConfigError> {
        Self::with_random_source(config, Rng::new(seed))
    }
}

impl<R: RandomSource> Session<R> {
    pub fn with_random_source(config: SessionConfig, source: R) -> Result<Self, ConfigError> {
        let initial = Box::new(build_field(&config)?);
        Ok(Self {
            config,
            scene: Scene::Playing(initial.clone()),
            initial,
            source,
            tick_counter: 0,
            events: Vec::new(),
        })
    }

    /// Discards the current round and starts over from the stored config.
    pub fn reset(&mut self) {
        self.scene = Scene::Playing(self.initial.clone());
        self.tick_counter = 0;
        self.events.clear();
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn score(&self) -> u32 {
        match &self.scene {
            Scene::Playing(field) => field.score,
            Scene::Lost { score } | Scene::Won { score } => *score,
        }
    }

    pub fn is_ended(&self) -> bool {
        !matches!(self.scene, Scene::Playing(_))
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    pub fn drain_events(&mut self) -> Vec<TickEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        match &self.scene {
            Scene::Playing(field) => Some(field.snapshot(self.tick_counter)),
            _ => None,
        }
    }

    pub fn scene_state(&self) -> SceneState {
        match &self.scene {
            Scene::Playing(field) => SceneState::Playing(field.snapshot(self.tick_counter)),
            Scene::Lost { score } => SceneState::Lost { score: *score },
            Scene::Won { score } => SceneState::Won { score: *score },
        }
    }

    /// Runs one tick. Terminal scenes ignore input and report themselves.
    pub fn advance(&mut self, intents: &InputIntents) -> SceneState {
        let Scene::Playing(field) = &mut self.scene else {
            return self.scene_state();
        };
        self.tick_counter += 1;
        let outcome = field.step(
            intents,
            &self.config.rules,
            &mut self.source,
            &mut self.events,
        );
        let score = field.score;
        match outcome {
            TickOutcome::Continue => {}
            TickOutcome::Lost => self.scene = Scene::Lost { score },
            TickOutcome::Won => self.scene = Scene::Won { score },
        }
        self.scene_state()
    }
}

fn build_field(config: &SessionConfig) -> Result<PlayField, ConfigError> {
    let grid = config.build_grid()?;
    let radius = footprint_radius(config.tile_size, config.rules.footprint_ratio);
    let player = Body {
        x: config.player.x,
        y: config.player.y,
        speed: config.player.speed,
        radius,
    };
    let pursuers = config
        .pursuers
        .iter()
        .map(|spec| PursuerInternal {
            body: Body {
                x: spec.x,
                y: spec.y,
                speed: spec.speed,
                radius,
            },
            heading: spec.heading,
            mode: PursuerMode::Normal,
            frightened_ticks: 0,
            spawn: spec.spawn_point(),
        })
        .collect();
    Ok(PlayField {
        grid,
        player,
        pursuers,
        score: 0,
    })
}

impl PlayField {
    fn step<R: RandomSource + ?Sized>(
        &mut self,
        intents: &InputIntents,
        rules: &GameRules,
        source: &mut R,
        events: &mut Vec<TickEvent>,
    ) -> TickOutcome {
        move_player(&mut self.player, intents, &self.grid);
        self.update_pursuers(rules, source, events);
        self.resolve_pickup(rules, events);
        if self.resolve_contacts(rules, events) {
            return TickOutcome::Lost;
        }
        if !self.grid.has_pickups() {
            events.push(TickEvent::StageCleared);
            return TickOutcome::Won;
        }
        TickOutcome::Continue
    }

    fn update_pursuers<R: RandomSource + ?Sized>(
        &mut self,
        rules: &GameRules,
        source: &mut R,
        events: &mut Vec<TickEvent>,
    ) {
        let target = (self.player.x, self.player.y);
        for idx in 0..self.pursuers.len() {
            if self.pursuers[idx].tick_frightened() {
                events.push(TickEvent::FrightenedExpired { pursuer: idx });
            }

            let pursuer = &mut self.pursuers[idx];
            let moved = try_step(&mut pursuer.body, pursuer.heading, &self.grid);
            let needs_decision = !moved
                || is_at_decision_point(
                    pursuer.body.x,
                    pursuer.body.y,
                    &self.grid,
                    rules.decision_tolerance,
                );
            if !needs_decision {
                continue;
            }
            if let Some(dir) = choose_heading(
                (pursuer.body.x, pursuer.body.y),
                pursuer.heading,
                pursuer.mode,
                &self.grid,
                target,
                source,
            ) {
                pursuer.heading = dir;
            }
        }
    }

    fn snapshot(&self, tick: u64) -> Snapshot {
        Snapshot {
            tick,
            score: self.score,
            tile_size: self.grid.tile_size(),
            width: self.grid.width(),
            height: self.grid.height(),
            tiles: self.grid.cells().to_vec(),
            remaining_pickups: self.grid.remaining_pickups(),
            player: PlayerView {
                x: self.player.x,
                y: self.player.y,
            },
            pursuers: self
                .pursuers
                .iter()
                .enumerate()
                .map(|(index, pursuer)| pursuer.view(index))
                .collect(),
        }
    }
}
