//! Hand-built levels played before the generator takes over.

/// Short warm-up: a raised coin shelf over a lava pit.
pub const FIRST_STEPS: &[&str] = &[
    "                      ",
    "                      ",
    "  x              = x  ",
    "  x         o o    x  ",
    "  x @      xxxxx   x  ",
    "  xxxxx            x  ",
    "      x!!!!!!!!!!!!x  ",
    "      xxxxxxxxxxxxxx  ",
    "                      ",
];

/// Stepping stones under dripping lava.
pub const DRIP_HALL: &[&str] = &[
    "                                  ",
    "  x    v      v      v        x   ",
    "  x                           x   ",
    "  x      o      o      o      x   ",
    "  x                           x   ",
    "  x @   xxxx   xxxx   xxxx    x   ",
    "  xxxxx                   xxxxx   ",
    "      x!!!!!!!!!!!!!!!!!!!x       ",
    "      xxxxxxxxxxxxxxxxxxxxx       ",
    "                                  ",
];

/// Bobbing lava columns guard the shelves; a patrol sweeps the far bank.
pub const LAVA_RIVER: &[&str] = &[
    "                                        ",
    "  x                                  x  ",
    "  x              o       o           x  ",
    "  x    |       xxxx    xxxx    |     x  ",
    "  x                                  x  ",
    "  x @    xxx            =      o     x  ",
    "  xxxxxxxx  xx       xxxxxxxxxxxxxxxxx  ",
    "         x!!x!!!!!!!x                   ",
    "         xxxxxxxxxxxx                   ",
    "                                        ",
];

/// Preset levels in campaign order.
pub const PRESETS: &[&[&str]] = &[FIRST_STEPS, DRIP_HALL, LAVA_RIVER];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use emberleap_core::LevelStatus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn presets_build_valid_levels() {
        for (i, plan) in PRESETS.iter().copied().enumerate() {
            let level = Level::from_plan(plan, &mut StdRng::seed_from_u64(i as u64))
                .unwrap_or_else(|e| panic!("preset {i} rejected: {e}"));
            assert!(level.coins_remaining() > 0, "preset {i} has no coins");
            assert_eq!(level.status(), LevelStatus::Running);
        }
    }

    #[test]
    fn idle_player_survives_the_first_second() {
        for (i, plan) in PRESETS.iter().copied().enumerate() {
            let mut level = Level::from_plan(plan, &mut StdRng::seed_from_u64(0)).unwrap();
            for _ in 0..60 {
                level.advance(1.0 / 60.0, &Default::default());
            }
            assert_eq!(level.status(), LevelStatus::Running, "preset {i}");
        }
    }
}
