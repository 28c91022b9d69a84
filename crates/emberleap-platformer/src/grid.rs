use serde::{Deserialize, Serialize};

use emberleap_core::{TouchTarget, Vector};

/// Static classification of one grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Wall,
    Lava,
}

impl Tile {
    /// Map a plan glyph to its tile. Unrecognized glyphs are empty.
    pub fn from_glyph(ch: char) -> Self {
        match ch {
            'x' => Self::Wall,
            '!' => Self::Lava,
            _ => Self::Empty,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Wall => 'x',
            Self::Lava => '!',
        }
    }

    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    /// Touch reported when the player bumps into this tile.
    pub fn touch(self) -> Option<TouchTarget> {
        match self {
            Self::Empty => None,
            Self::Wall => Some(TouchTarget::Wall),
            Self::Lava => Some(TouchTarget::Lava),
        }
    }
}

/// The static tile layer of a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Tile data stored row-major (row * width + col).
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile at `(col, row)`. Out-of-range cells read as empty.
    pub fn tile(&self, col: usize, row: usize) -> Tile {
        if col >= self.width || row >= self.height {
            return Tile::Empty;
        }
        self.tiles[row * self.width + col]
    }

    pub(crate) fn set(&mut self, col: usize, row: usize, tile: Tile) {
        if col < self.width && row < self.height {
            self.tiles[row * self.width + col] = tile;
        }
    }

    /// Classify what the box `[pos, pos + size)` runs into.
    ///
    /// Leaving the grid to the left, right or top counts as a wall; leaving it
    /// through the bottom counts as lava. Inside the grid the covered tiles are
    /// scanned row by row, left to right, and the first non-empty one wins.
    pub fn obstacle_at(&self, pos: Vector, size: Vector) -> Tile {
        let x_start = pos.x.floor() as i64;
        let x_end = (pos.x + size.x).ceil() as i64;
        let y_start = pos.y.floor() as i64;
        let y_end = (pos.y + size.y).ceil() as i64;

        if x_start < 0 || x_end > self.width as i64 || y_start < 0 {
            return Tile::Wall;
        }
        if y_end > self.height as i64 {
            return Tile::Lava;
        }

        for row in y_start..y_end {
            for col in x_start..x_end {
                let tile = self.tile(col as usize, row as usize);
                if !tile.is_empty() {
                    return tile;
                }
            }
        }
        Tile::Empty
    }

    /// Render the tile layer back into plan rows (actors omitted).
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|row| {
                (0..self.width)
                    .map(|col| self.tile(col, row).glyph())
                    .collect()
            })
            .collect()
    }
}
