use rand::RngCore;

use emberleap_core::episode::ActorFrame;
use emberleap_core::{
    ActorId, ActorKind, InputState, LevelEvent, LevelStatus, TouchTarget, Vector,
};

use crate::actors::{Actor, Scene, SpawnTable, TouchSink};
use crate::config::PhysicsConfig;
use crate::grid::{Grid, Tile};

/// Why a textual plan could not become a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// No rows, or rows with no columns.
    Empty,
    /// A row's length differs from the first row's.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    MissingPlayer,
    MultiplePlayers { count: usize },
}

impl std::fmt::Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "plan is empty"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "plan row {row} has {found} columns, expected {expected}"
            ),
            Self::MissingPlayer => write!(f, "plan has no player marker"),
            Self::MultiplePlayers { count } => {
                write!(f, "plan has {count} player markers, expected exactly one")
            },
        }
    }
}

impl std::error::Error for PlanError {}

/// Tracks the outcome of a level and collects what the player touched.
///
/// Status changes take effect immediately so later code in the same
/// sub-step sees them; coin removals are queued until the acting actor
/// returns.
#[derive(Debug, Clone)]
struct Referee {
    status: LevelStatus,
    finish_delay: f32,
    collected: Vec<ActorId>,
    events: Vec<LevelEvent>,
}

impl Referee {
    fn new(finish_delay: f32) -> Self {
        Self {
            status: LevelStatus::Running,
            finish_delay,
            collected: Vec::new(),
            events: Vec::new(),
        }
    }

    fn finish(&mut self, status: LevelStatus) {
        if self.status.is_terminal() {
            return;
        }
        tracing::debug!(?status, "Level outcome decided");
        self.status = status;
        self.events.push(LevelEvent::StatusChanged { status });
    }
}

impl TouchSink for Referee {
    fn touch(&mut self, target: TouchTarget) {
        // Resting against walls happens every step and is not worth reporting.
        if target == TouchTarget::Wall {
            return;
        }
        self.events.push(LevelEvent::Touched { touch: target });
        match target {
            t if t.is_lethal() => self.finish(LevelStatus::Lost),
            TouchTarget::Actor {
                kind: ActorKind::Coin,
                id,
            } => {
                if !self.collected.contains(&id) {
                    self.collected.push(id);
                }
            },
            _ => {},
        }
    }

    fn status(&self) -> LevelStatus {
        self.status
    }
}

/// A single level: static grid, actors and the win/loss state machine.
#[derive(Debug, Clone)]
pub struct Level {
    grid: Grid,
    actors: Vec<Actor>,
    /// Index of the player in `actors`; only coins are ever removed.
    player: usize,
    physics: PhysicsConfig,
    referee: Referee,
}

impl Level {
    /// Build a level from plan rows with the standard glyphs and physics.
    pub fn from_plan<S: AsRef<str>>(plan: &[S], rng: &mut dyn RngCore) -> Result<Self, PlanError> {
        Self::with_options(plan, &SpawnTable::standard(), PhysicsConfig::default(), rng)
    }

    /// Build a level from plan rows.
    ///
    /// Glyphs found in `spawns` become actors on an empty tile; every other
    /// glyph is classified with [`Tile::from_glyph`]. Actors are created in
    /// scan order (top to bottom, left to right). `rng` seeds per-actor
    /// randomness such as coin phases.
    pub fn with_options<S: AsRef<str>>(
        plan: &[S],
        spawns: &SpawnTable,
        physics: PhysicsConfig,
        rng: &mut dyn RngCore,
    ) -> Result<Self, PlanError> {
        let height = plan.len();
        let width = plan.first().map_or(0, |row| row.as_ref().chars().count());
        if height == 0 || width == 0 {
            return Err(PlanError::Empty);
        }

        let mut grid = Grid::new(width, height);
        let mut actors = Vec::new();
        let mut next_id: ActorId = 0;

        for (row, line) in plan.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(PlanError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let origin = Vector::new(col as f32, row as f32);
                if let Some(spawn) = spawns.get(glyph) {
                    actors.push(Actor::new(next_id, spawn(origin, rng)));
                    next_id += 1;
                } else {
                    grid.set(col, row, Tile::from_glyph(glyph));
                }
            }
        }

        let mut players = actors
            .iter()
            .enumerate()
            .filter(|(_, a)| a.kind() == ActorKind::Player)
            .map(|(idx, _)| idx);
        let player = match (players.next(), players.count()) {
            (Some(idx), 0) => idx,
            (None, _) => return Err(PlanError::MissingPlayer),
            (Some(_), extra) => {
                return Err(PlanError::MultiplePlayers { count: extra + 1 });
            },
        };

        tracing::debug!(width, height, actors = actors.len(), "Level built from plan");

        let referee = Referee::new(physics.finish_delay);
        Ok(Self {
            grid,
            actors,
            player,
            physics,
            referee,
        })
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    /// All live actors in list order.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn player(&self) -> &Actor {
        &self.actors[self.player]
    }

    pub fn status(&self) -> LevelStatus {
        self.referee.status
    }

    /// Seconds left before a decided level reports finished.
    pub fn finish_delay(&self) -> f32 {
        self.referee.finish_delay
    }

    /// Whether the outcome is decided and its grace period has run out.
    pub fn is_finished(&self) -> bool {
        self.referee.status.is_terminal() && self.referee.finish_delay < 0.0
    }

    pub fn coins_remaining(&self) -> usize {
        self.actors
            .iter()
            .filter(|a| a.kind() == ActorKind::Coin)
            .count()
    }

    /// Advance the simulation by `elapsed` seconds of held `input`.
    ///
    /// Time is consumed in sub-steps no longer than the configured maximum;
    /// every actor acts once per sub-step in list order. Returns the events
    /// raised during this call.
    pub fn advance(&mut self, elapsed: f32, input: &InputState) -> Vec<LevelEvent> {
        let elapsed = if elapsed.is_finite() && elapsed > 0.0 {
            elapsed
        } else {
            0.0
        };

        if self.referee.status.is_terminal() {
            self.referee.finish_delay -= elapsed;
        }

        let max_step = self.physics.effective_max_step();
        let mut remaining = elapsed;
        while remaining > 0.0 {
            let step = remaining.min(max_step);
            self.step_actors(step, input);
            remaining -= step;
        }

        std::mem::take(&mut self.referee.events)
    }

    fn step_actors(&mut self, step: f32, input: &InputState) {
        let mut i = 0;
        while i < self.actors.len() {
            let (before, rest) = self.actors.split_at_mut(i);
            if let Some((actor, after)) = rest.split_first_mut() {
                let scene = Scene {
                    grid: &self.grid,
                    physics: &self.physics,
                    before,
                    after,
                };
                actor.act(step, &scene, input, &mut self.referee);
            }

            // Apply pickups before the next actor acts. Removing an actor
            // that was already processed shifts the current one left.
            for id in std::mem::take(&mut self.referee.collected) {
                if let Some(idx) = self.actors.iter().position(|a| a.id == id) {
                    self.actors.remove(idx);
                    if idx < i {
                        i -= 1;
                    }
                    if idx < self.player {
                        self.player -= 1;
                    }
                    self.referee.events.push(LevelEvent::CoinCollected { id });
                    if self.coins_remaining() == 0 {
                        self.referee.finish(LevelStatus::Won);
                    }
                }
            }
            i += 1;
        }
    }

    /// Telemetry snapshot of every actor.
    pub fn actor_frames(&self) -> Vec<ActorFrame> {
        self.actors
            .iter()
            .map(|a| ActorFrame {
                kind: a.kind(),
                pos: a.pos(),
                size: a.size(),
            })
            .collect()
    }
}
