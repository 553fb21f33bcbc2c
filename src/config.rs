use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{
    CATCH_SCORE, DECISION_TOLERANCE, FOOTPRINT_RATIO, FRIGHTENED_TICKS, PLAYER_BASE_SPEED,
    POWER_PICKUP_SCORE, PURSUER_BASE_SPEED, SMALL_PICKUP_SCORE, TILE_SIZE,
};
use crate::grid::GridMap;
use crate::layout::{Layout, CLASSIC_PLAYER_TILE, CLASSIC_PURSUER_TILE};
use crate::types::Direction;

/// Reasons a session cannot be built from its configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("maze layout has no tiles")]
    EmptyGrid,
    #[error("row {row} has {actual} tiles, expected {expected}")]
    NonRectangular {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("layout declares {width}x{height} tiles but provides {actual} codes")]
    CellCountMismatch {
        width: usize,
        height: usize,
        actual: usize,
    },
    #[error("unknown tile symbol {symbol:?} at ({x}, {y})")]
    UnknownSymbol { x: usize, y: usize, symbol: char },
    #[error("unknown tile code {code} at ({x}, {y})")]
    UnknownCode { x: usize, y: usize, code: u8 },
    #[error("tile size must be a positive finite number, got {0}")]
    InvalidTileSize(f64),
    #[error("{agent} speed must be a positive finite number, got {speed}")]
    InvalidSpeed { agent: String, speed: f64 },
    #[error("{agent} position ({x}, {y}) is not finite")]
    InvalidPosition { agent: String, x: f64, y: f64 },
    #[error("{agent} position ({x}, {y}) lies outside the {width}x{height} maze")]
    OutOfBounds {
        agent: String,
        x: f64,
        y: f64,
        width: usize,
        height: usize,
    },
    #[error("pursuer {index} heading must be a cardinal direction")]
    InvalidHeading { index: usize },
    #[error("invalid rules: {0}")]
    InvalidRules(&'static str),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Gameplay tuning. Every field falls back to the stock value.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameRules {
    pub frightened_ticks: u32,
    pub small_pickup_score: u32,
    pub power_pickup_score: u32,
    pub catch_score: u32,
    pub decision_tolerance: f64,
    pub footprint_ratio: f64,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            frightened_ticks: FRIGHTENED_TICKS,
            small_pickup_score: SMALL_PICKUP_SCORE,
            power_pickup_score: POWER_PICKUP_SCORE,
            catch_score: CATCH_SCORE,
            decision_tolerance: DECISION_TOLERANCE,
            footprint_ratio: FOOTPRINT_RATIO,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PlayerSpec {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SpawnPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PursuerSpec {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    #[serde(default = "default_heading")]
    pub heading: Direction,
    /// Where the pursuer returns after being caught. Defaults to `(x, y)`.
    #[serde(default)]
    pub spawn: Option<SpawnPoint>,
}

fn default_heading() -> Direction {
    Direction::Right
}

impl PursuerSpec {
    pub fn spawn_point(&self) -> (f64, f64) {
        self.spawn
            .as_ref()
            .map(|spawn| (spawn.x, spawn.y))
            .unwrap_or((self.x, self.y))
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default = "default_tile_size")]
    pub tile_size: f64,
    pub layout: Layout,
    pub player: PlayerSpec,
    #[serde(default)]
    pub pursuers: Vec<PursuerSpec>,
    #[serde(default)]
    pub rules: GameRules,
}

fn default_tile_size() -> f64 {
    TILE_SIZE
}

impl SessionConfig {
    /// Built-in 32x17 maze with one pursuer in the central pen.
    pub fn classic() -> Self {
        let half = TILE_SIZE / 2.0;
        let (px, py) = CLASSIC_PLAYER_TILE;
        let (gx, gy) = CLASSIC_PURSUER_TILE;
        let ghost_x = gx as f64 * TILE_SIZE + half;
        let ghost_y = gy as f64 * TILE_SIZE + half;
        Self {
            tile_size: TILE_SIZE,
            layout: Layout::classic(),
            player: PlayerSpec {
                x: px as f64 * TILE_SIZE + half,
                y: py as f64 * TILE_SIZE + half,
                speed: PLAYER_BASE_SPEED,
            },
            pursuers: vec![PursuerSpec {
                x: ghost_x,
                y: ghost_y,
                speed: PURSUER_BASE_SPEED,
                heading: Direction::Right,
                spawn: Some(SpawnPoint {
                    x: ghost_x,
                    y: ghost_y,
                }),
            }],
            rules: GameRules::default(),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks everything except the layout shape, which `build_grid` covers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        let rules = &self.rules;
        if !(rules.footprint_ratio > 0.0 && rules.footprint_ratio <= 0.5) {
            return Err(ConfigError::InvalidRules(
                "footprintRatio must be within (0, 0.5]",
            ));
        }
        if !rules.decision_tolerance.is_finite() || rules.decision_tolerance < 0.0 {
            return Err(ConfigError::InvalidRules(
                "decisionTolerance must be a non-negative finite number",
            ));
        }

        let (width, height) = self.layout.dimensions();
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        let area = PlayArea {
            width,
            height,
            max_x: width as f64 * self.tile_size,
            max_y: height as f64 * self.tile_size,
        };

        let player = &self.player;
        area.check("player", player.x, player.y)?;
        check_speed("player", player.speed)?;
        for (index, pursuer) in self.pursuers.iter().enumerate() {
            let agent = format!("pursuer {index}");
            area.check(&agent, pursuer.x, pursuer.y)?;
            let (sx, sy) = pursuer.spawn_point();
            area.check(&format!("pursuer {index} spawn"), sx, sy)?;
            check_speed(&agent, pursuer.speed)?;
            if pursuer.heading == Direction::None {
                return Err(ConfigError::InvalidHeading { index });
            }
        }
        Ok(())
    }

    pub fn build_grid(&self) -> Result<GridMap, ConfigError> {
        self.validate()?;
        self.layout.build_grid(self.tile_size)
    }
}

/// Pixel extent of the maze; agents must start inside it.
struct PlayArea {
    width: usize,
    height: usize,
    max_x: f64,
    max_y: f64,
}

impl PlayArea {
    fn check(&self, agent: &str, x: f64, y: f64) -> Result<(), ConfigError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ConfigError::InvalidPosition {
                agent: agent.to_string(),
                x,
                y,
            });
        }
        if !(0.0..self.max_x).contains(&x) || !(0.0..self.max_y).contains(&y) {
            return Err(ConfigError::OutOfBounds {
                agent: agent.to_string(),
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

fn check_speed(agent: &str, speed: f64) -> Result<(), ConfigError> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(ConfigError::InvalidSpeed {
            agent: agent.to_string(),
            speed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn temp_file(prefix: &str) -> std::path::PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}-{now}.json"))
    }

    #[test]
    fn classic_config_is_valid() {
        let config = SessionConfig::classic();
        config.validate().expect("classic config validates");
        let grid = config.build_grid().expect("classic grid builds");
        assert_eq!(grid.tile_of(config.player.x, config.player.y), (1, 1));
        assert_eq!(
            grid.tile_of(config.pursuers[0].x, config.pursuers[0].y),
            (16, 9)
        );
        assert_eq!(config.player.x, 45.0);
    }

    #[test]
    fn json_fills_defaults() {
        let payload = serde_json::json!({
            "layout": {"rows": ["#####", "#. o#", "#####"]},
            "player": {"x": 45, "y": 45, "speed": 2},
            "pursuers": [{"x": 105, "y": 45, "speed": 1.5}],
            "rules": {"frightenedTicks": 120}
        });
        let config = SessionConfig::from_json_str(&payload.to_string()).expect("config parses");
        assert_eq!(config.tile_size, TILE_SIZE);
        assert_eq!(config.rules.frightened_ticks, 120);
        assert_eq!(config.rules.catch_score, CATCH_SCORE);
        assert_eq!(config.pursuers[0].heading, Direction::Right);
        assert_eq!(config.pursuers[0].spawn_point(), (105.0, 45.0));
    }

    #[test]
    fn json_accepts_numeric_layout() {
        let config = SessionConfig::from_json_str(
            r#"{
                "tileSize": 10,
                "layout": {"width": 3, "height": 3, "codes": [1,1,1, 1,2,1, 1,1,1]},
                "player": {"x": 15, "y": 15, "speed": 1}
            }"#,
        )
        .expect("config parses");
        let grid = config.build_grid().expect("grid builds");
        assert_eq!(grid.remaining_pickups(), 1);
        assert!(config.pursuers.is_empty());
    }

    #[test]
    fn zero_speed_is_rejected() {
        let mut config = SessionConfig::classic();
        config.pursuers[0].speed = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSpeed { .. }));
        assert_eq!(err.to_string(), "pursuer 0 speed must be a positive finite number, got 0");
    }

    #[test]
    fn negative_tile_size_is_rejected() {
        let mut config = SessionConfig::classic();
        config.tile_size = -30.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTileSize(_))
        ));
        config.tile_size = f64::NAN;
        assert!(matches!(
            config.build_grid(),
            Err(ConfigError::InvalidTileSize(_))
        ));
    }

    #[test]
    fn agents_outside_the_maze_are_rejected() {
        let mut config = SessionConfig::classic();
        config.pursuers[0].x = 1e12;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfBounds { ref agent, width: 32, height: 17, .. })
                if agent == "pursuer 0"
        ));

        let mut config = SessionConfig::classic();
        config.pursuers[0].spawn = Some(SpawnPoint { x: 45.0, y: -1.0 });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfBounds { ref agent, .. }) if agent == "pursuer 0 spawn"
        ));

        // The far edge belongs to the next, nonexistent tile.
        let mut config = SessionConfig::classic();
        config.player.x = 32.0 * TILE_SIZE;
        assert!(matches!(
            config.build_grid(),
            Err(ConfigError::OutOfBounds { .. })
        ));
        config.player.x = 32.0 * TILE_SIZE - 0.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_layout_is_rejected_before_bounds() {
        let mut config = SessionConfig::classic();
        config.layout = Layout::Rows { rows: Vec::new() };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyGrid)));
    }

    #[test]
    fn stationary_heading_is_rejected() {
        let mut config = SessionConfig::classic();
        config.pursuers[0].heading = Direction::None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHeading { index: 0 })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let path = temp_file("maze-chase-missing");
        assert!(matches!(
            SessionConfig::load(&path),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let path = temp_file("maze-chase-config");
        let payload = serde_json::json!({
            "layout": {"rows": ["###", "#.#", "###"]},
            "player": {"x": 45, "y": 45, "speed": 2}
        });
        std::fs::write(&path, payload.to_string()).expect("write temp config");
        let config = SessionConfig::load(&path).expect("config loads");
        assert_eq!(config.layout.dimensions(), (3, 3));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            SessionConfig::from_json_str("{\"layout\": 3"),
            Err(ConfigError::Json(_))
        ));
    }
}
