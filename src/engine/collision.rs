use crate::grid::GridMap;
use crate::types::TileCode;

/// Corner-sampled footprint test: the four corners of the square
/// `center ± radius` are mapped to tiles, and any wall or out-of-bounds
/// corner blocks the position.
pub fn is_blocked(center_x: f64, center_y: f64, radius: f64, grid: &GridMap) -> bool {
    let corners = [
        (center_x - radius, center_y - radius),
        (center_x + radius, center_y - radius),
        (center_x - radius, center_y + radius),
        (center_x + radius, center_y + radius),
    ];
    corners.iter().any(|&(px, py)| {
        let (tile_x, tile_y) = grid.tile_of(px, py);
        grid.tile_at(tile_x, tile_y) == TileCode::Wall
    })
}
