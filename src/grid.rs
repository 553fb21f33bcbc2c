use crate::types::{Direction, TileCode};

/// Rectangular tile store. The shape is fixed at construction; only pickup
/// cells ever change, and only to `Empty`.
#[derive(Clone, Debug, PartialEq)]
pub struct GridMap {
    width: usize,
    height: usize,
    tile_size: f64,
    cells: Vec<TileCode>,
}

impl GridMap {
    /// Callers are expected to have validated the shape (`cells.len() ==
    /// width * height`, positive tile size); see `config::SessionConfig`.
    pub(crate) fn from_cells(
        width: usize,
        height: usize,
        tile_size: f64,
        cells: Vec<TileCode>,
    ) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            tile_size,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    pub fn cells(&self) -> &[TileCode] {
        &self.cells
    }

    fn index_of(&self, tile_x: i32, tile_y: i32) -> Option<usize> {
        if tile_x < 0 || tile_y < 0 {
            return None;
        }
        let (x, y) = (tile_x as usize, tile_y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Out-of-bounds coordinates read as `Wall`.
    pub fn tile_at(&self, tile_x: i32, tile_y: i32) -> TileCode {
        self.index_of(tile_x, tile_y)
            .map(|idx| self.cells[idx])
            .unwrap_or(TileCode::Wall)
    }

    pub fn is_open(&self, tile_x: i32, tile_y: i32) -> bool {
        self.tile_at(tile_x, tile_y) != TileCode::Wall
    }

    pub fn in_bounds(&self, tile_x: i32, tile_y: i32) -> bool {
        self.index_of(tile_x, tile_y).is_some()
    }

    /// Clears a pickup and returns what was there. Non-pickup tiles are
    /// returned unchanged and left alone.
    pub fn consume(&mut self, tile_x: i32, tile_y: i32) -> TileCode {
        let Some(idx) = self.index_of(tile_x, tile_y) else {
            return TileCode::Wall;
        };
        let tile = self.cells[idx];
        if tile.is_pickup() {
            self.cells[idx] = TileCode::Empty;
        }
        tile
    }

    pub fn remaining_pickups(&self) -> usize {
        self.cells.iter().filter(|tile| tile.is_pickup()).count()
    }

    pub fn has_pickups(&self) -> bool {
        self.cells.iter().any(|tile| tile.is_pickup())
    }

    /// Tile containing a continuous coordinate (floor division, so negative
    /// coordinates land outside the grid).
    pub fn tile_of(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.tile_size).floor() as i32,
            (y / self.tile_size).floor() as i32,
        )
    }

    pub fn tile_center(&self, tile_x: i32, tile_y: i32) -> (f64, f64) {
        let half = self.tile_size / 2.0;
        (
            tile_x as f64 * self.tile_size + half,
            tile_y as f64 * self.tile_size + half,
        )
    }

    pub fn open_neighbors(
        &self,
        tile_x: i32,
        tile_y: i32,
    ) -> impl Iterator<Item = Direction> + '_ {
        Direction::CARDINALS.into_iter().filter(move |dir| {
            let (nx, ny) = dir.offset(tile_x, tile_y);
            self.is_open(nx, ny)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::GridMap;
    use crate::types::{Direction, TileCode};

    fn parse(rows: &[&str]) -> GridMap {
        let width = rows[0].len();
        let cells = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| TileCode::from_symbol(c).expect("known symbol"))
            .collect();
        GridMap::from_cells(width, rows.len(), 30.0, cells)
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let grid = parse(&["###", "#.#", "###"]);
        assert_eq!(grid.tile_at(1, 1), TileCode::SmallPickup);
        assert_eq!(grid.tile_at(-1, 1), TileCode::Wall);
        assert_eq!(grid.tile_at(1, 3), TileCode::Wall);
        assert_eq!(grid.tile_at(3, 0), TileCode::Wall);
        assert!(!grid.in_bounds(-1, 0));
    }

    #[test]
    fn consume_clears_pickup_once() {
        let mut grid = parse(&["####", "#.o#", "####"]);
        assert_eq!(grid.remaining_pickups(), 2);
        assert_eq!(grid.consume(1, 1), TileCode::SmallPickup);
        assert_eq!(grid.consume(1, 1), TileCode::Empty);
        assert_eq!(grid.consume(2, 1), TileCode::PowerPickup);
        assert_eq!(grid.consume(2, 1), TileCode::Empty);
        assert!(!grid.has_pickups());
    }

    #[test]
    fn consume_leaves_walls_untouched() {
        let mut grid = parse(&["###", "# #", "###"]);
        assert_eq!(grid.consume(0, 0), TileCode::Wall);
        assert_eq!(grid.tile_at(0, 0), TileCode::Wall);
        assert_eq!(grid.consume(9, 9), TileCode::Wall);
        assert_eq!(grid.consume(1, 1), TileCode::Empty);
    }

    #[test]
    fn tile_of_uses_floor_division() {
        let grid = parse(&["###", "# #", "###"]);
        assert_eq!(grid.tile_of(45.0, 45.0), (1, 1));
        assert_eq!(grid.tile_of(59.9, 30.0), (1, 1));
        assert_eq!(grid.tile_of(-0.5, 10.0), (-1, 0));
        assert_eq!(grid.tile_center(1, 1), (45.0, 45.0));
    }

    #[test]
    fn open_neighbors_follow_enumeration_order() {
        let grid = parse(&["#####", "## ##", "#   #", "## ##", "#####"]);
        let dirs: Vec<Direction> = grid.open_neighbors(2, 2).collect();
        assert_eq!(
            dirs,
            vec![Direction::Up, Direction::Down, Direction::Left, Direction::Right]
        );
        let dirs: Vec<Direction> = grid.open_neighbors(1, 2).collect();
        assert_eq!(dirs, vec![Direction::Right]);
    }

    #[test]
    fn neighbors_of_saturated_tiles_are_walls() {
        let grid = parse(&["###", "# #", "###"]);
        let (tile_x, tile_y) = grid.tile_of(1e12, 45.0);
        assert_eq!(tile_x, i32::MAX);
        assert_eq!(grid.open_neighbors(tile_x, tile_y).count(), 0);
    }
}
