use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Enumeration order used by every neighbour scan; ties resolve to the
    /// earliest entry.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn unit(self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::None => (0.0, 0.0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    pub fn offset(self, tile_x: i32, tile_y: i32) -> (i32, i32) {
        match self {
            Direction::Up => (tile_x, tile_y.saturating_sub(1)),
            Direction::Down => (tile_x, tile_y.saturating_add(1)),
            Direction::Left => (tile_x.saturating_sub(1), tile_y),
            Direction::Right => (tile_x.saturating_add(1), tile_y),
            Direction::None => (tile_x, tile_y),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileCode {
    Empty,
    Wall,
    SmallPickup,
    PowerPickup,
}

impl TileCode {
    /// Numeric coding used by row-major layout payloads.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Empty),
            1 => Some(Self::Wall),
            2 => Some(Self::SmallPickup),
            3 => Some(Self::PowerPickup),
            _ => None,
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            ' ' | '_' => Some(Self::Empty),
            '#' => Some(Self::Wall),
            '.' => Some(Self::SmallPickup),
            'o' => Some(Self::PowerPickup),
            _ => None,
        }
    }

    pub fn is_pickup(self) -> bool {
        matches!(self, TileCode::SmallPickup | TileCode::PowerPickup)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PursuerMode {
    Normal,
    Frightened,
}

/// Directional requests held down during one tick. Opposite directions may be
/// set together; each one is attempted on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputIntents {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputIntents {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, dir: Direction) -> Self {
        match dir {
            Direction::Up => self.up = true,
            Direction::Down => self.down = true,
            Direction::Left => self.left = true,
            Direction::Right => self.right = true,
            Direction::None => {}
        }
        self
    }

    pub fn pressed(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::None => false,
        }
    }
}

impl FromIterator<Direction> for InputIntents {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter()
            .fold(InputIntents::none(), |intents, dir| intents.with(dir))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerView {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PursuerView {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub heading: Direction,
    pub mode: PursuerMode,
    #[serde(rename = "frightenedTicks")]
    pub frightened_ticks: u32,
    #[serde(rename = "spawnX")]
    pub spawn_x: f64,
    #[serde(rename = "spawnY")]
    pub spawn_y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub score: u32,
    #[serde(rename = "tileSize")]
    pub tile_size: f64,
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<TileCode>,
    #[serde(rename = "remainingPickups")]
    pub remaining_pickups: usize,
    pub player: PlayerView,
    pub pursuers: Vec<PursuerView>,
}

impl Snapshot {
    pub fn tile_at(&self, tile_x: i32, tile_y: i32) -> TileCode {
        if tile_x < 0 || tile_y < 0 {
            return TileCode::Wall;
        }
        let (tile_x, tile_y) = (tile_x as usize, tile_y as usize);
        if tile_x >= self.width || tile_y >= self.height {
            return TileCode::Wall;
        }
        self.tiles
            .get(tile_y * self.width + tile_x)
            .copied()
            .unwrap_or(TileCode::Wall)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "scene", rename_all = "snake_case")]
pub enum SceneState {
    Playing(Snapshot),
    Lost { score: u32 },
    Won { score: u32 },
}

impl SceneState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SceneState::Playing(_))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TickEvent {
    PickupConsumed {
        #[serde(rename = "tileX")]
        tile_x: i32,
        #[serde(rename = "tileY")]
        tile_y: i32,
        tile: TileCode,
        points: u32,
    },
    PursuersFrightened {
        ticks: u32,
    },
    FrightenedExpired {
        pursuer: usize,
    },
    PursuerCaught {
        pursuer: usize,
        points: u32,
    },
    PlayerCaught {
        pursuer: usize,
    },
    StageCleared,
}
