pub const TICK_RATE: u32 = 60;

pub const TILE_SIZE: f64 = 30.0;
pub const FOOTPRINT_RATIO: f64 = 1.0 / 3.0;
pub const DECISION_TOLERANCE: f64 = 5.0;

pub const FRIGHTENED_TICKS: u32 = 300;
pub const SMALL_PICKUP_SCORE: u32 = 10;
pub const POWER_PICKUP_SCORE: u32 = 50;
pub const CATCH_SCORE: u32 = 200;

pub const PLAYER_BASE_SPEED: f64 = 2.0;
pub const PURSUER_BASE_SPEED: f64 = 1.5;

/// Initial best distances for the greedy heading choice. A candidate has to
/// beat these strictly to be picked without falling back to the random source.
pub const CHASE_SENTINEL: f64 = 999_999.0;
pub const FLEE_SENTINEL: f64 = -1.0;

pub fn footprint_radius(tile_size: f64, ratio: f64) -> f64 {
    tile_size * ratio
}

pub fn ticks_for_seconds(seconds: u32) -> u64 {
    seconds as u64 * TICK_RATE as u64
}
