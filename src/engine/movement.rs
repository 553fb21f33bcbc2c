use super::collision::is_blocked;
use crate::grid::GridMap;
use crate::types::{Direction, InputIntents};

/// Continuous-position footprint shared by the player and pursuers.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub radius: f64,
}

impl Body {
    pub fn tile(&self, grid: &GridMap) -> (i32, i32) {
        grid.tile_of(self.x, self.y)
    }

    pub fn distance_sq(&self, other: &Body) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        let reach = self.radius + other.radius;
        self.distance_sq(other) < reach * reach
    }
}

/// Commits `body + delta` unless the footprint there is blocked. Returns
/// whether the body moved.
pub fn try_move(body: &mut Body, delta_x: f64, delta_y: f64, grid: &GridMap) -> bool {
    let next_x = body.x + delta_x;
    let next_y = body.y + delta_y;
    if is_blocked(next_x, next_y, body.radius, grid) {
        return false;
    }
    body.x = next_x;
    body.y = next_y;
    true
}

/// Moves along `dir` at the body's own speed.
pub fn try_step(body: &mut Body, dir: Direction, grid: &GridMap) -> bool {
    let (ux, uy) = dir.unit();
    let speed = body.speed;
    try_move(body, ux * speed, uy * speed, grid)
}

/// Applies every held direction as its own move, in up/down/left/right
/// order, so a blocked axis never cancels a clear one.
pub fn move_player(body: &mut Body, intents: &InputIntents, grid: &GridMap) {
    for dir in Direction::CARDINALS {
        if intents.pressed(dir) {
            try_step(body, dir, grid);
        }
    }
}
