use serde::Deserialize;

use crate::config::ConfigError;
use crate::grid::GridMap;
use crate::types::TileCode;

pub const CLASSIC_ROWS: [&str; 17] = [
    "################################",
    "#..............................#",
    "#.####o#####.######.#####o####.#",
    "#..............................#",
    "#.####.#.#############.#.####.##",
    "#......#...............#.......#",
    "######.#####.######.####.#######",
    "#..............................#",
    "######.#.##  ######  #.#.#######",
    "#........#           #.........#",
    "######.#.# ######### #.#.#######",
    "#..............................#",
    "######.#####.######.####.#######",
    "#..............................#",
    "#.####.#####.######.#####.####.#",
    "#o............................o#",
    "################################",
];

pub const CLASSIC_PLAYER_TILE: (i32, i32) = (1, 1);
pub const CLASSIC_PURSUER_TILE: (i32, i32) = (16, 9);

/// Maze payload. Either text rows (`#` wall, `.` small pickup, `o` power
/// pickup, space or `_` empty) or row-major numeric codes
/// (0 empty, 1 wall, 2 small, 3 power).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Layout {
    Rows {
        rows: Vec<String>,
    },
    Codes {
        width: usize,
        height: usize,
        codes: Vec<u8>,
    },
}

impl Layout {
    pub fn classic() -> Self {
        Layout::Rows {
            rows: CLASSIC_ROWS.iter().map(|row| row.to_string()).collect(),
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            Layout::Rows { rows } => {
                let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
                (width, rows.len())
            }
            Layout::Codes { width, height, .. } => (*width, *height),
        }
    }

    pub fn build_grid(&self, tile_size: f64) -> Result<GridMap, ConfigError> {
        let (width, height, cells) = match self {
            Layout::Rows { rows } => parse_rows(rows)?,
            Layout::Codes {
                width,
                height,
                codes,
            } => parse_codes(*width, *height, codes)?,
        };
        Ok(GridMap::from_cells(width, height, tile_size, cells))
    }
}

fn parse_rows(rows: &[String]) -> Result<(usize, usize, Vec<TileCode>), ConfigError> {
    let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
    if rows.is_empty() || width == 0 {
        return Err(ConfigError::EmptyGrid);
    }
    let mut cells = Vec::with_capacity(width * rows.len());
    for (y, row) in rows.iter().enumerate() {
        let actual = row.chars().count();
        if actual != width {
            return Err(ConfigError::NonRectangular {
                row: y,
                expected: width,
                actual,
            });
        }
        for (x, symbol) in row.chars().enumerate() {
            let tile =
                TileCode::from_symbol(symbol).ok_or(ConfigError::UnknownSymbol { x, y, symbol })?;
            cells.push(tile);
        }
    }
    Ok((width, rows.len(), cells))
}

fn parse_codes(
    width: usize,
    height: usize,
    codes: &[u8],
) -> Result<(usize, usize, Vec<TileCode>), ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::EmptyGrid);
    }
    if width.checked_mul(height) != Some(codes.len()) {
        return Err(ConfigError::CellCountMismatch {
            width,
            height,
            actual: codes.len(),
        });
    }
    codes
        .iter()
        .enumerate()
        .map(|(idx, &code)| {
            TileCode::from_code(code).ok_or(ConfigError::UnknownCode {
                x: idx % width,
                y: idx / width,
                code,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|cells| (width, height, cells))
}
