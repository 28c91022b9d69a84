use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Rows in every generated level.
pub const LEVEL_HEIGHT: usize = 15;
/// Width of a tier-0 level; each tier adds [`TIER_WIDTH`] columns.
const BASE_WIDTH: usize = 20;
const TIER_WIDTH: usize = 10;
/// Highest tier accepted by the generator.
pub const MAX_TIER: u32 = 1000;

/// Chance that a floor column (tier > 1) is left open.
const FLOOR_GAP_CHANCE: f64 = 0.1;
/// Columns at each end of the floor that never get gaps.
const FLOOR_MARGIN: usize = 2;
/// Floor columns forced solid under the spawn point.
const SAFE_START_COLUMNS: usize = 10;
/// Column where platform layout starts.
const PLATFORM_START_X: usize = 12;
/// Platform layout stops once the cursor is this close to the right edge.
const RIGHT_MARGIN: usize = 5;
/// Highest row (smallest index) a platform may sit on.
const PLATFORM_MIN_ROW: usize = 5;
const COIN_CHANCE: f64 = 0.5;
const HAZARD_CHANCE_PER_TIER: f64 = 0.1;
const HAZARD_CHANCE_MAX: f64 = 0.5;
/// Player marker column; its row is just above the floor.
const PLAYER_COL: usize = 2;

const WALL: char = 'x';
const LAVA: char = '!';
const COIN: char = 'o';
const PLAYER: char = '@';
const EMPTY: char = ' ';

/// Why a level could not be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateError {
    /// Tier was 0 or above [`MAX_TIER`].
    InvalidTier(u32),
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTier(tier) => {
                write!(f, "invalid tier {tier}, expected 1..={MAX_TIER}")
            },
        }
    }
}

impl std::error::Error for GenerateError {}

/// Width in columns of a level generated at `tier`.
pub fn level_width(tier: u32) -> usize {
    BASE_WIDTH + tier as usize * TIER_WIDTH
}

/// Reject tiers the generator does not accept.
pub fn check_tier(tier: u32) -> Result<(), GenerateError> {
    if tier == 0 || tier > MAX_TIER {
        return Err(GenerateError::InvalidTier(tier));
    }
    Ok(())
}

/// Chance that a platform gets a lava tile stamped on top of it.
pub fn hazard_chance(tier: u32) -> f64 {
    (HAZARD_CHANCE_PER_TIER * f64::from(tier.saturating_sub(1))).min(HAZARD_CHANCE_MAX)
}

struct Canvas {
    width: usize,
    cells: Vec<Vec<char>>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            cells: vec![vec![EMPTY; width]; height],
        }
    }

    fn get(&self, col: usize, row: usize) -> Option<char> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Paint inside the side walls only.
    fn paint(&mut self, col: usize, row: usize, glyph: char) -> bool {
        if col == 0 || col + 1 >= self.width {
            return false;
        }
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = glyph;
                true
            },
            None => false,
        }
    }

    /// Paint `glyph` only over an empty cell.
    fn place(&mut self, col: usize, row: usize, glyph: char) -> bool {
        self.get(col, row) == Some(EMPTY) && self.paint(col, row, glyph)
    }

    fn into_rows(self) -> Vec<String> {
        self.cells
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect()
    }
}

/// Visible part of a platform placed by the layout pass.
#[derive(Debug, Clone, Copy)]
struct Platform {
    start: usize,
    len: usize,
    row: usize,
}

/// Generate a level plan for `tier` using `rng`.
///
/// The output uses the plan alphabet and can be passed straight to
/// [`crate::Level::from_plan`]. Platform spacing follows a local jump-distance
/// heuristic; the generator does not prove that every coin is reachable.
///
/// Tiers run from 1 to [`MAX_TIER`]; anything else is
/// [`GenerateError::InvalidTier`]. Width grows linearly with tier, so the
/// upper bound caps how large a grid one call can allocate.
pub fn generate_level<R: Rng + ?Sized>(
    tier: u32,
    rng: &mut R,
) -> Result<Vec<String>, GenerateError> {
    check_tier(tier)?;

    let width = level_width(tier);
    let height = LEVEL_HEIGHT;
    let floor = height - 1;
    let mut canvas = Canvas::new(width, height);

    // Floor, with random gaps from tier 2 on
    for (col, cell) in canvas.cells[floor].iter_mut().enumerate() {
        let in_margin = col < FLOOR_MARGIN || col + FLOOR_MARGIN >= width;
        let gap = tier > 1 && !in_margin && rng.random_bool(FLOOR_GAP_CHANCE);
        if !gap {
            *cell = WALL;
        }
    }

    // Side walls override everything
    for row in canvas.cells.iter_mut() {
        row[0] = WALL;
        row[width - 1] = WALL;
    }

    // Safe landing under the spawn
    for cell in canvas.cells[floor].iter_mut().take(SAFE_START_COLUMNS) {
        *cell = WALL;
    }

    // Platforms
    let hazard_p = hazard_chance(tier);
    let max_row = height - 3;
    let mut cursor = PLATFORM_START_X;
    let mut row = height - 4;
    let mut coins = 0usize;
    let mut last: Option<Platform> = None;

    while cursor + RIGHT_MARGIN < width {
        let mut gap = rng.random_range(2..=4usize);
        let dy: i64 = rng.random_range(-2..=2);
        row = (row as i64 + dy).clamp(PLATFORM_MIN_ROW as i64, max_row as i64) as usize;
        if dy == -2 {
            // Steep climb: bring the platform a column closer
            gap -= 1;
        }

        let start = cursor + gap;
        let len = rng.random_range(3..=5usize);
        let painted = (start..start + len)
            .filter(|&col| canvas.paint(col, row, WALL))
            .count();
        if rng.random_bool(hazard_p) {
            // Interior cells only, keeping both landing edges clear
            let col = rng.random_range(start + 1..start + len - 1);
            canvas.paint(col, row - 1, LAVA);
        }
        if painted > 0 {
            last = Some(Platform {
                start,
                len: painted,
                row,
            });
        }

        cursor = start + len;
        if rng.random_bool(COIN_CHANCE) {
            let col = cursor - 2;
            let coin_row = row - 2;
            if canvas.place(col, coin_row, COIN) {
                coins += 1;
            }
        }
    }

    // Every level needs something to collect
    if coins == 0 && place_fallback_coin(&mut canvas, last, floor) {
        coins += 1;
    }

    canvas.paint(PLAYER_COL, floor - 1, PLAYER);

    tracing::info!(tier, width, height, coins, hazard_p, "Generated level");

    Ok(canvas.into_rows())
}

/// Put a coin above the middle of `last`, or failing that above the safe
/// start floor, which nothing else paints on.
fn place_fallback_coin(canvas: &mut Canvas, last: Option<Platform>, floor: usize) -> bool {
    let above_platform = last.map(|p| (p.start + p.len / 2, p.row - 2));
    above_platform
        .into_iter()
        .chain(std::iter::once((SAFE_START_COLUMNS / 2, floor - 1)))
        .any(|(col, row)| canvas.place(col, row, COIN))
}

/// Deterministic variant of [`generate_level`] seeded from `seed`.
pub fn generate_level_seeded(tier: u32, seed: u64) -> Result<Vec<String>, GenerateError> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_level(tier, &mut rng)
}
