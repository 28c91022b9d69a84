use std::collections::HashMap;
use std::f32::consts::TAU;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use emberleap_core::{
    ActorId, ActorKind, Facing, InputState, LevelStatus, Pose, TouchTarget, Vector,
};

use crate::config::PhysicsConfig;
use crate::grid::Grid;

/// Player bounding box extents.
pub const PLAYER_SIZE: Vector = Vector::new(0.8, 1.5);
/// Offset from the `@` cell origin to the player's top-left corner.
const PLAYER_OFFSET: Vector = Vector::new(0.0, -0.5);
/// Coin bounding box extents.
pub const COIN_SIZE: Vector = Vector::new(0.6, 0.6);
/// Offset from the `o` cell origin to the coin's resting top-left corner.
const COIN_OFFSET: Vector = Vector::new(0.2, 0.1);
/// Moving lava occupies one full tile.
pub const LAVA_SIZE: Vector = Vector::new(1.0, 1.0);
/// Vertical speed below which the player counts as not airborne.
pub const POSE_EPSILON: f32 = 0.1;

/// Axis-aligned bounding box, `pos` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vector,
    pub size: Vector,
}

impl Rect {
    pub const fn new(pos: Vector, size: Vector) -> Self {
        Self { pos, size }
    }

    /// Strict overlap test: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.pos.x + self.size.x > other.pos.x
            && self.pos.x < other.pos.x + other.size.x
            && self.pos.y + self.size.y > other.pos.y
            && self.pos.y < other.pos.y + other.size.y
    }
}

/// Per-kind motion state of the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    pub speed: Vector,
    pub facing: Facing,
    pub pose: Pose,
}

/// Moving lava. With a respawn anchor it drips: when blocked it jumps back
/// to the anchor instead of bouncing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LavaBody {
    pub speed: Vector,
    pub respawn: Option<Vector>,
}

/// A collectible bobbing around its base position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoinBody {
    pub base: Vector,
    /// Phase accumulator in radians.
    pub wobble: f32,
}

/// Kind-specific state carried by an actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Body {
    Player(PlayerBody),
    Lava(LavaBody),
    Coin(CoinBody),
}

impl Body {
    pub fn kind(&self) -> ActorKind {
        match self {
            Self::Player(_) => ActorKind::Player,
            Self::Lava(_) => ActorKind::Lava,
            Self::Coin(_) => ActorKind::Coin,
        }
    }
}

/// Anything living on top of the tile grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub rect: Rect,
    pub body: Body,
}

impl Actor {
    pub fn new(id: ActorId, spawn: Spawn) -> Self {
        Self {
            id,
            rect: spawn.rect,
            body: spawn.body,
        }
    }

    pub fn kind(&self) -> ActorKind {
        self.body.kind()
    }

    pub fn pos(&self) -> Vector {
        self.rect.pos
    }

    pub fn size(&self) -> Vector {
        self.rect.size
    }

    /// Run this actor's behaviour for one sub-step.
    pub fn act(
        &mut self,
        step: f32,
        scene: &Scene<'_>,
        input: &InputState,
        sink: &mut dyn TouchSink,
    ) {
        match &mut self.body {
            Body::Player(body) => body.act(&mut self.rect, step, scene, input, sink),
            Body::Lava(body) => body.act(&mut self.rect, step, scene, input, sink),
            Body::Coin(body) => body.act(&mut self.rect, step, scene, input, sink),
        }
    }
}

/// Receiver of the player's collision notifications.
pub trait TouchSink {
    fn touch(&mut self, target: TouchTarget);

    /// Current level status, as seen after every touch so far.
    fn status(&self) -> LevelStatus;
}

/// Read-only view of the level handed to an acting actor.
pub struct Scene<'a> {
    pub grid: &'a Grid,
    pub physics: &'a PhysicsConfig,
    /// Actors before the acting one in list order.
    pub before: &'a [Actor],
    /// Actors after the acting one in list order.
    pub after: &'a [Actor],
}

impl Scene<'_> {
    /// All other actors, in list order.
    pub fn others(&self) -> impl Iterator<Item = &Actor> {
        self.before.iter().chain(self.after.iter())
    }

    /// First other actor whose box overlaps `rect`.
    pub fn actor_at(&self, rect: &Rect) -> Option<&Actor> {
        self.others().find(|other| other.rect.overlaps(rect))
    }
}

/// Uniform per-step contract every actor kind implements.
pub trait Behavior {
    fn act(
        &mut self,
        rect: &mut Rect,
        step: f32,
        scene: &Scene<'_>,
        input: &InputState,
        sink: &mut dyn TouchSink,
    );
}

impl Behavior for PlayerBody {
    fn act(
        &mut self,
        rect: &mut Rect,
        step: f32,
        scene: &Scene<'_>,
        input: &InputState,
        sink: &mut dyn TouchSink,
    ) {
        let physics = scene.physics;

        // Horizontal: instantaneous speed from the held keys
        self.speed.x = input.horizontal() * physics.player_speed;
        let candidate = rect.pos + Vector::new(self.speed.x * step, 0.0);
        match scene.grid.obstacle_at(candidate, rect.size).touch() {
            Some(touch) => sink.touch(touch),
            None => rect.pos = candidate,
        }

        // Vertical: gravity always accumulates, landing resolves it
        self.speed.y += physics.gravity * step;
        let candidate = rect.pos + Vector::new(0.0, self.speed.y * step);
        match scene.grid.obstacle_at(candidate, rect.size).touch() {
            Some(touch) => {
                sink.touch(touch);
                if input.up && self.speed.y > 0.0 {
                    self.speed.y = -physics.jump_speed;
                } else {
                    self.speed.y = 0.0;
                }
            },
            None => rect.pos = candidate,
        }

        if self.speed.x < 0.0 {
            self.facing = Facing::Left;
        } else if self.speed.x > 0.0 {
            self.facing = Facing::Right;
        }
        self.pose = if self.speed.y.abs() > POSE_EPSILON {
            Pose::Jump
        } else if self.speed.x != 0.0 {
            Pose::Run
        } else {
            Pose::Idle
        };

        if let Some(other) = scene.actor_at(rect) {
            sink.touch(TouchTarget::Actor {
                kind: other.kind(),
                id: other.id,
            });
        }

        // Death animation: sink into the floor until the level tears down
        if sink.status() == LevelStatus::Lost {
            rect.pos.y += step;
            rect.size.y = (rect.size.y - step).max(0.0);
        }
    }
}

impl Behavior for LavaBody {
    fn act(
        &mut self,
        rect: &mut Rect,
        step: f32,
        scene: &Scene<'_>,
        _input: &InputState,
        _sink: &mut dyn TouchSink,
    ) {
        let candidate = rect.pos + self.speed * step;
        if scene.grid.obstacle_at(candidate, rect.size).is_empty() {
            rect.pos = candidate;
        } else if let Some(respawn) = self.respawn {
            rect.pos = respawn;
        } else {
            self.speed = self.speed * -1.0;
        }
    }
}

impl Behavior for CoinBody {
    fn act(
        &mut self,
        rect: &mut Rect,
        step: f32,
        scene: &Scene<'_>,
        _input: &InputState,
        _sink: &mut dyn TouchSink,
    ) {
        self.wobble += step * scene.physics.wobble_speed;
        let offset = self.wobble.sin() * scene.physics.wobble_dist;
        rect.pos = self.base + Vector::new(0.0, offset);
    }
}

/// Initial box and body produced by a spawn glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub rect: Rect,
    pub body: Body,
}

/// Constructor for the actor behind a spawn glyph. `origin` is the top-left
/// corner of the glyph's cell.
pub type SpawnFn = fn(origin: Vector, rng: &mut dyn RngCore) -> Spawn;

pub fn spawn_player(origin: Vector, _rng: &mut dyn RngCore) -> Spawn {
    Spawn {
        rect: Rect::new(origin + PLAYER_OFFSET, PLAYER_SIZE),
        body: Body::Player(PlayerBody::default()),
    }
}

pub fn spawn_coin(origin: Vector, rng: &mut dyn RngCore) -> Spawn {
    let base = origin + COIN_OFFSET;
    Spawn {
        rect: Rect::new(base, COIN_SIZE),
        body: Body::Coin(CoinBody {
            base,
            wobble: rng.random_range(0.0..TAU),
        }),
    }
}

fn spawn_lava(origin: Vector, speed: Vector, respawn: Option<Vector>) -> Spawn {
    Spawn {
        rect: Rect::new(origin, LAVA_SIZE),
        body: Body::Lava(LavaBody { speed, respawn }),
    }
}

pub fn spawn_lava_horizontal(origin: Vector, _rng: &mut dyn RngCore) -> Spawn {
    spawn_lava(origin, Vector::new(2.0, 0.0), None)
}

pub fn spawn_lava_vertical(origin: Vector, _rng: &mut dyn RngCore) -> Spawn {
    spawn_lava(origin, Vector::new(0.0, 2.0), None)
}

pub fn spawn_lava_drip(origin: Vector, _rng: &mut dyn RngCore) -> Spawn {
    spawn_lava(origin, Vector::new(0.0, 3.0), Some(origin))
}

/// Glyph → actor constructor lookup passed to level construction.
#[derive(Debug, Clone)]
pub struct SpawnTable {
    entries: HashMap<char, SpawnFn>,
}

impl SpawnTable {
    /// Table with no spawn glyphs at all.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The standard symbol set: `@ o = | v`.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.register('@', spawn_player);
        table.register('o', spawn_coin);
        table.register('=', spawn_lava_horizontal);
        table.register('|', spawn_lava_vertical);
        table.register('v', spawn_lava_drip);
        table
    }

    pub fn register(&mut self, glyph: char, spawn: SpawnFn) {
        self.entries.insert(glyph, spawn);
    }

    pub fn get(&self, glyph: char) -> Option<SpawnFn> {
        self.entries.get(&glyph).copied()
    }
}

impl Default for SpawnTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const GRAVITY_STEP: f32 = crate::config::GRAVITY * 0.05;

    /// Collects touches and flips to `Lost` on lethal ones, mirroring the level.
    #[derive(Default)]
    struct RecordingSink {
        touches: Vec<TouchTarget>,
        status: LevelStatus,
    }

    impl TouchSink for RecordingSink {
        fn touch(&mut self, target: TouchTarget) {
            if target.is_lethal() {
                self.status = LevelStatus::Lost;
            }
            self.touches.push(target);
        }

        fn status(&self) -> LevelStatus {
            self.status
        }
    }

    /// 10x8 grid with a wall floor on row 7 and wall columns on both sides.
    fn boxed_grid() -> Grid {
        let mut grid = Grid::new(10, 8);
        for col in 0..10 {
            grid.set(col, 7, Tile::Wall);
        }
        for row in 0..8 {
            grid.set(0, row, Tile::Wall);
            grid.set(9, row, Tile::Wall);
        }
        grid
    }

    fn player_at(x: f32, y: f32) -> Actor {
        Actor::new(0, spawn_player(Vector::new(x, y), &mut StdRng::seed_from_u64(0)))
    }

    fn act_alone(actor: &mut Actor, grid: &Grid, input: &InputState, sink: &mut RecordingSink) {
        let physics = PhysicsConfig::default();
        let scene = Scene {
            grid,
            physics: &physics,
            before: &[],
            after: &[],
        };
        actor.act(0.05, &scene, input, sink);
    }

    fn player_body(actor: &Actor) -> PlayerBody {
        match actor.body {
            Body::Player(body) => body,
            other => panic!("expected player body, got {other:?}"),
        }
    }

    #[test]
    fn rect_overlap_is_strict() {
        let a = Rect::new(Vector::new(0.0, 0.0), Vector::new(1.0, 1.0));
        let touching = Rect::new(Vector::new(1.0, 0.0), Vector::new(1.0, 1.0));
        let overlapping = Rect::new(Vector::new(0.9, 0.9), Vector::new(1.0, 1.0));
        assert!(!a.overlaps(&touching));
        assert!(!touching.overlaps(&a));
        assert!(a.overlaps(&overlapping));
        assert!(overlapping.overlaps(&a));
    }

    #[test]
    fn spawn_offsets() {
        let mut rng = StdRng::seed_from_u64(1);
        let player = spawn_player(Vector::new(3.0, 5.0), &mut rng);
        assert_eq!(player.rect.pos, Vector::new(3.0, 4.5));
        assert_eq!(player.rect.size, PLAYER_SIZE);

        let coin = spawn_coin(Vector::new(3.0, 5.0), &mut rng);
        assert!((coin.rect.pos.x - 3.2).abs() < 1e-6);
        assert!((coin.rect.pos.y - 5.1).abs() < 1e-6);
        match coin.body {
            Body::Coin(c) => {
                assert_eq!(c.base, coin.rect.pos);
                assert!((0.0..TAU).contains(&c.wobble));
            },
            other => panic!("expected coin, got {other:?}"),
        }

        let drip = spawn_lava_drip(Vector::new(4.0, 1.0), &mut rng);
        match drip.body {
            Body::Lava(l) => {
                assert_eq!(l.speed, Vector::new(0.0, 3.0));
                assert_eq!(l.respawn, Some(Vector::new(4.0, 1.0)));
            },
            other => panic!("expected lava, got {other:?}"),
        }
    }

    #[test]
    fn player_runs_right_and_faces_right() {
        let grid = boxed_grid();
        let mut player = player_at(3.0, 6.0);
        let mut sink = RecordingSink::default();
        let input = InputState {
            right: true,
            ..Default::default()
        };
        act_alone(&mut player, &grid, &input, &mut sink);

        assert!((player.pos().x - 3.35).abs() < 1e-5);
        let body = player_body(&player);
        assert_eq!(body.facing, Facing::Right);
        assert_eq!(body.pose, Pose::Run);
        // Resting on the floor: the vertical move is blocked every step.
        assert_eq!(body.speed.y, 0.0);
        assert_eq!(sink.touches, vec![TouchTarget::Wall]);
    }

    #[test]
    fn facing_unchanged_when_standing_still() {
        let grid = boxed_grid();
        let mut player = player_at(3.0, 6.0);
        let mut sink = RecordingSink::default();
        let left = InputState {
            left: true,
            ..Default::default()
        };
        act_alone(&mut player, &grid, &left, &mut sink);
        assert_eq!(player_body(&player).facing, Facing::Left);

        act_alone(&mut player, &grid, &InputState::default(), &mut sink);
        let body = player_body(&player);
        assert_eq!(body.facing, Facing::Left);
        assert_eq!(body.pose, Pose::Idle);
    }

    #[test]
    fn wall_blocks_horizontal_move() {
        let grid = boxed_grid();
        // Box spans x = 1.0..1.8; one step left would enter column 0.
        let mut player = player_at(1.0, 6.0);
        let mut sink = RecordingSink::default();
        let input = InputState {
            left: true,
            ..Default::default()
        };
        act_alone(&mut player, &grid, &input, &mut sink);
        assert_eq!(player.pos().x, 1.0);
        assert_eq!(sink.touches[0], TouchTarget::Wall);
    }

    #[test]
    fn gravity_accumulates_in_free_fall() {
        let grid = boxed_grid();
        let mut player = player_at(3.0, 2.0);
        let mut sink = RecordingSink::default();
        let mut last_vy = 0.0;
        for _ in 0..4 {
            act_alone(&mut player, &grid, &InputState::default(), &mut sink);
            let vy = player_body(&player).speed.y;
            assert!((vy - last_vy - GRAVITY_STEP).abs() < 1e-4);
            last_vy = vy;
        }
        assert!(sink.touches.is_empty());
        assert_eq!(player_body(&player).pose, Pose::Jump);
    }

    #[test]
    fn jump_only_on_landing_with_up_held() {
        let grid = boxed_grid();
        let mut player = player_at(3.0, 6.0);
        let mut sink = RecordingSink::default();
        let up = InputState {
            up: true,
            ..Default::default()
        };
        act_alone(&mut player, &grid, &up, &mut sink);
        assert_eq!(player_body(&player).speed.y, -crate::config::JUMP_SPEED);

        // Airborne next step: up held, no collision, gravity keeps acting.
        let y_before = player.pos().y;
        act_alone(&mut player, &grid, &up, &mut sink);
        assert!(player.pos().y < y_before, "player should be rising");
    }

    #[test]
    fn head_bump_zeroes_upward_speed() {
        let mut grid = boxed_grid();
        grid.set(3, 4, Tile::Wall);
        // Box spans y = 5.0..6.5, just under the ceiling tile on row 4.
        let mut player = player_at(3.0, 5.5);
        if let Body::Player(body) = &mut player.body {
            body.speed.y = -10.0;
        }
        let mut sink = RecordingSink::default();
        act_alone(&mut player, &grid, &InputState::default(), &mut sink);
        assert_eq!(player_body(&player).speed.y, 0.0);
        assert_eq!(player.pos().y, 5.0);
    }

    #[test]
    fn touching_lava_tile_starts_death_animation() {
        let mut grid = boxed_grid();
        grid.set(4, 6, Tile::Lava);
        let mut player = player_at(3.1, 6.0);
        let mut sink = RecordingSink::default();
        let input = InputState {
            right: true,
            ..Default::default()
        };
        act_alone(&mut player, &grid, &input, &mut sink);
        assert_eq!(sink.touches[0], TouchTarget::Lava);
        assert_eq!(sink.status, LevelStatus::Lost);
        assert!((player.size().y - (PLAYER_SIZE.y - 0.05)).abs() < 1e-6);
        assert!((player.pos().y - 5.55).abs() < 1e-5);
    }

    #[test]
    fn player_reports_first_overlapping_actor() {
        let grid = boxed_grid();
        let mut rng = StdRng::seed_from_u64(3);
        let mut player = player_at(3.0, 6.0);
        let coin = Actor::new(5, spawn_coin(Vector::new(3.0, 6.0), &mut rng));
        let lava = Actor::new(6, spawn_lava_horizontal(Vector::new(3.0, 5.0), &mut rng));
        let physics = PhysicsConfig::default();
        let before = [coin];
        let after = [lava];
        let scene = Scene {
            grid: &grid,
            physics: &physics,
            before: &before,
            after: &after,
        };
        let mut sink = RecordingSink::default();
        player.act(0.05, &scene, &InputState::default(), &mut sink);
        assert_eq!(
            sink.touches.last(),
            Some(&TouchTarget::Actor {
                kind: ActorKind::Coin,
                id: 5
            })
        );
    }

    #[test]
    fn patrolling_lava_bounces() {
        let grid = boxed_grid();
        let mut rng = StdRng::seed_from_u64(0);
        let mut lava = Actor::new(1, spawn_lava_horizontal(Vector::new(7.95, 3.0), &mut rng));
        let mut sink = RecordingSink::default();
        act_alone(&mut lava, &grid, &InputState::default(), &mut sink);
        assert_eq!(lava.pos(), Vector::new(7.95, 3.0));
        match lava.body {
            Body::Lava(l) => assert_eq!(l.speed, Vector::new(-2.0, 0.0)),
            other => panic!("expected lava, got {other:?}"),
        }
        assert!(sink.touches.is_empty(), "lava never reports touches");
    }

    #[test]
    fn dripping_lava_resets_to_anchor() {
        let grid = boxed_grid();
        let mut rng = StdRng::seed_from_u64(0);
        let mut drip = Actor::new(1, spawn_lava_drip(Vector::new(4.0, 1.0), &mut rng));
        drip.rect.pos = Vector::new(4.0, 5.9);
        let mut sink = RecordingSink::default();
        act_alone(&mut drip, &grid, &InputState::default(), &mut sink);
        assert_eq!(drip.pos(), Vector::new(4.0, 1.0));
    }

    #[test]
    fn coin_wobbles_around_base() {
        let grid = boxed_grid();
        let mut rng = StdRng::seed_from_u64(9);
        let mut coin = Actor::new(2, spawn_coin(Vector::new(4.0, 3.0), &mut rng));
        let base = match coin.body {
            Body::Coin(c) => c.base,
            other => panic!("expected coin, got {other:?}"),
        };
        let mut sink = RecordingSink::default();
        for _ in 0..40 {
            act_alone(&mut coin, &grid, &InputState::default(), &mut sink);
            assert_eq!(coin.pos().x, base.x);
            assert!((coin.pos().y - base.y).abs() <= crate::config::WOBBLE_DIST + 1e-6);
            assert_eq!(coin.size(), COIN_SIZE);
        }
    }

    #[test]
    fn standard_table_glyphs() {
        let table = SpawnTable::standard();
        for glyph in ['@', 'o', '=', '|', 'v'] {
            assert!(table.get(glyph).is_some(), "missing spawn for {glyph:?}");
        }
        assert!(table.get('x').is_none());
        assert!(table.get('!').is_none());
        assert!(SpawnTable::empty().get('@').is_none());
    }
}
