use serde::{Deserialize, Serialize};

use crate::actor::ActorKind;
use crate::status::LevelStatus;

/// Identifier of an actor, unique within one level.
pub type ActorId = u32;

/// What the player collided with during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum TouchTarget {
    /// A wall tile or the left/right/top edge of the grid.
    Wall,
    /// A static lava tile or the bottom edge of the grid.
    Lava,
    /// Another actor whose box overlaps the player.
    Actor { kind: ActorKind, id: ActorId },
}

impl TouchTarget {
    /// Whether touching this target kills the player.
    pub fn is_lethal(&self) -> bool {
        matches!(
            self,
            Self::Lava
                | Self::Actor {
                    kind: ActorKind::Lava,
                    ..
                }
        )
    }
}

/// Events emitted by a level while it advances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LevelEvent {
    Touched { touch: TouchTarget },
    CoinCollected { id: ActorId },
    StatusChanged { status: LevelStatus },
}
