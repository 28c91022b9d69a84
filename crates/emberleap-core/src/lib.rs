pub mod actor;
pub mod episode;
pub mod events;
pub mod input;
pub mod status;
pub mod time;
pub mod vector;

pub use actor::{ActorKind, Facing, Pose};
pub use events::{ActorId, LevelEvent, TouchTarget};
pub use input::InputState;
pub use status::LevelStatus;
pub use vector::Vector;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::actor::ActorKind;
    use crate::episode::{ActorFrame, Episode, EpisodeRecorder};
    use crate::events::{LevelEvent, TouchTarget};
    use crate::input::InputState;
    use crate::status::LevelStatus;
    use crate::vector::Vector;

    /// Build an episode with `levels` attempts of `frames_per_level` frames
    /// each. Every attempt ends in a lava touch and a loss.
    pub fn make_episode(levels: usize, frames_per_level: usize) -> Episode {
        let mut rec = EpisodeRecorder::new();
        for i in 0..levels {
            rec.begin_level(format!("preset {i}"), None);
            for f in 0..frames_per_level {
                let actors = vec![ActorFrame {
                    kind: ActorKind::Player,
                    pos: Vector::new(2.0 + f as f32 * 0.1, 3.5),
                    size: Vector::new(0.8, 1.5),
                }];
                let input = InputState {
                    right: true,
                    ..Default::default()
                };
                rec.record_frame(1.0 / 60.0, input, LevelStatus::Running, actors);
            }
            rec.record_events(&[
                LevelEvent::Touched {
                    touch: TouchTarget::Lava,
                },
                LevelEvent::StatusChanged {
                    status: LevelStatus::Lost,
                },
            ]);
            rec.end_level(LevelStatus::Lost);
        }
        rec.finish()
    }
}
