use crate::grid::GridMap;

/// True when `(x, y)` lies within `tolerance` of its tile's center on both
/// axes and that tile has more than two open neighbours.
pub fn is_at_decision_point(x: f64, y: f64, grid: &GridMap, tolerance: f64) -> bool {
    let (tile_x, tile_y) = grid.tile_of(x, y);
    if !grid.in_bounds(tile_x, tile_y) {
        return false;
    }
    let (center_x, center_y) = grid.tile_center(tile_x, tile_y);
    if (x - center_x).abs() >= tolerance || (y - center_y).abs() >= tolerance {
        return false;
    }
    grid.open_neighbors(tile_x, tile_y).count() > 2
}
