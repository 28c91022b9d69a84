use serde::{Deserialize, Serialize};

/// Snapshot of the held movement keys for one tick.
///
/// Flags are level-triggered: the simulation polls them on every sub-step
/// and never looks for press/release edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
}

impl InputState {
    /// Net horizontal direction: -1 (left), 0, or +1 (right).
    /// Holding both directions cancels out.
    pub fn horizontal(&self) -> f32 {
        let mut dir = 0.0;
        if self.left {
            dir -= 1.0;
        }
        if self.right {
            dir += 1.0;
        }
        dir
    }
}
