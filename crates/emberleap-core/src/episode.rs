use serde::{Deserialize, Serialize};

use crate::actor::ActorKind;
use crate::events::LevelEvent;
use crate::input::InputState;
use crate::status::LevelStatus;
use crate::vector::Vector;

/// Default cap on recorded frames per level.
pub const DEFAULT_MAX_FRAMES_PER_LEVEL: usize = 36_000;

/// Position and extents of one actor at the end of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorFrame {
    pub kind: ActorKind,
    pub pos: Vector,
    pub size: Vector,
}

/// One rendered frame of a level attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Seconds since the level attempt started.
    pub t: f32,
    pub input: InputState,
    pub status: LevelStatus,
    pub actors: Vec<ActorFrame>,
}

/// A level event stamped with the attempt-relative time it occurred at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeEvent {
    pub t: f32,
    pub event: LevelEvent,
}

/// Telemetry for a single level attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    /// Human-readable label ("preset 2", "generated tier 3").
    pub label: String,
    /// Difficulty tier for generated levels, `None` for presets.
    #[serde(default)]
    pub tier: Option<u32>,
    #[serde(default)]
    pub frames: Vec<Frame>,
    #[serde(default)]
    pub events: Vec<EpisodeEvent>,
    /// Final status, `None` if the attempt was abandoned mid-level.
    #[serde(default)]
    pub outcome: Option<LevelStatus>,
}

/// A full play session: every level attempt in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub started_at: String,
    #[serde(default)]
    pub levels: Vec<LevelRecord>,
}

impl Episode {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: crate::time::timestamp_now(),
            levels: Vec::new(),
        }
    }

    pub fn total_frames(&self) -> usize {
        self.levels.iter().map(|l| l.frames.len()).sum()
    }

    pub fn total_events(&self) -> usize {
        self.levels.iter().map(|l| l.events.len()).sum()
    }
}

impl Default for Episode {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates frames and events into an [`Episode`].
///
/// The recorder is passive: the game loop feeds it after each tick and
/// decides when to upload the finished episode.
pub struct EpisodeRecorder {
    episode: Episode,
    current: Option<LevelRecord>,
    clock: f32,
    max_frames: usize,
    truncated: bool,
}

impl Default for EpisodeRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl EpisodeRecorder {
    pub fn new() -> Self {
        Self::with_frame_cap(DEFAULT_MAX_FRAMES_PER_LEVEL)
    }

    /// Create a recorder that keeps at most `max_frames` frames per level.
    pub fn with_frame_cap(max_frames: usize) -> Self {
        Self {
            episode: Episode::new(),
            current: None,
            clock: 0.0,
            max_frames,
            truncated: false,
        }
    }

    /// Start recording a new level attempt. An attempt still open is closed
    /// without an outcome.
    pub fn begin_level(&mut self, label: impl Into<String>, tier: Option<u32>) {
        self.close_current(None);
        self.clock = 0.0;
        self.truncated = false;
        self.current = Some(LevelRecord {
            label: label.into(),
            tier,
            frames: Vec::new(),
            events: Vec::new(),
            outcome: None,
        });
    }

    /// Advance the attempt clock by `dt` and store a frame.
    pub fn record_frame(
        &mut self,
        dt: f32,
        input: InputState,
        status: LevelStatus,
        actors: Vec<ActorFrame>,
    ) {
        self.clock += dt;
        let Some(level) = self.current.as_mut() else {
            return;
        };
        if level.frames.len() >= self.max_frames {
            if !self.truncated {
                tracing::warn!(
                    label = %level.label,
                    cap = self.max_frames,
                    "Frame cap reached, dropping further frames for this level"
                );
                self.truncated = true;
            }
            return;
        }
        level.frames.push(Frame {
            t: self.clock,
            input,
            status,
            actors,
        });
    }

    /// Store events at the current attempt time.
    pub fn record_events(&mut self, events: &[LevelEvent]) {
        let t = self.clock;
        if let Some(level) = self.current.as_mut() {
            level
                .events
                .extend(events.iter().map(|&event| EpisodeEvent { t, event }));
        }
    }

    /// Close the open attempt with its final status.
    pub fn end_level(&mut self, outcome: LevelStatus) {
        self.close_current(Some(outcome));
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    pub fn current_level(&self) -> Option<&LevelRecord> {
        self.current.as_ref()
    }

    /// Close any open attempt and hand over the finished episode.
    pub fn finish(mut self) -> Episode {
        self.close_current(None);
        self.episode
    }

    /// Serialize everything recorded so far, including the open attempt.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut snapshot = self.episode.clone();
        if let Some(level) = &self.current {
            snapshot.levels.push(level.clone());
        }
        serde_json::to_string(&snapshot)
    }

    fn close_current(&mut self, outcome: Option<LevelStatus>) {
        if let Some(mut level) = self.current.take() {
            level.outcome = outcome;
            tracing::debug!(
                label = %level.label,
                frames = level.frames.len(),
                events = level.events.len(),
                ?outcome,
                "Level attempt recorded"
            );
            self.episode.levels.push(level);
        }
    }
}
