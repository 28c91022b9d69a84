use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use emberleap_core::episode::{Episode, EpisodeRecorder};
use emberleap_core::{InputState, LevelEvent, LevelStatus};

use crate::actors::SpawnTable;
use crate::config::{PhysicsConfig, PlatformerConfig};
use crate::level::{Level, PlanError};
use crate::level_gen::{GenerateError, MAX_TIER, check_tier, generate_level};
use crate::plans::PRESETS;

/// Whether the campaign still accepts ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignState {
    #[default]
    Playing,
    GameOver,
}

/// Where the current level came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    Preset { index: usize },
    Generated { tier: u32 },
}

impl Stage {
    pub fn label(&self) -> String {
        match self {
            Self::Preset { index } => format!("preset {index}"),
            Self::Generated { tier } => format!("generated tier {tier}"),
        }
    }

    pub fn tier(&self) -> Option<u32> {
        match self {
            Self::Preset { .. } => None,
            Self::Generated { tier } => Some(*tier),
        }
    }
}

/// Failure to build the next level of a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignError {
    Plan(PlanError),
    Generate(GenerateError),
}

impl std::fmt::Display for CampaignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plan(e) => write!(f, "bad level plan: {e}"),
            Self::Generate(e) => write!(f, "level generation failed: {e}"),
        }
    }
}

impl std::error::Error for CampaignError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Plan(e) => Some(e),
            Self::Generate(e) => Some(e),
        }
    }
}

impl From<PlanError> for CampaignError {
    fn from(e: PlanError) -> Self {
        Self::Plan(e)
    }
}

impl From<GenerateError> for CampaignError {
    fn from(e: GenerateError) -> Self {
        Self::Generate(e)
    }
}

/// A run through the preset levels followed by generated ones of rising tier.
///
/// Winning moves on to the next stage; losing costs a life and replays the
/// same plan. Running out of lives ends the campaign.
pub struct Campaign {
    presets: Vec<Vec<String>>,
    spawns: SpawnTable,
    physics: PhysicsConfig,
    starting_lives: u32,
    start_tier: u32,
    rng: StdRng,
    stage: Stage,
    plan: Vec<String>,
    level: Level,
    lives: u32,
    levels_won: u32,
    state: CampaignState,
    recorder: Option<EpisodeRecorder>,
}

impl Campaign {
    /// Campaign over the built-in presets.
    pub fn new(config: &PlatformerConfig) -> Result<Self, CampaignError> {
        let presets = PRESETS
            .iter()
            .map(|plan| plan.iter().map(|row| (*row).to_string()).collect())
            .collect();
        Self::with_presets(presets, config)
    }

    /// Campaign over custom presets. With no presets it starts directly on
    /// generated levels. `start_tier` is checked up front even when presets
    /// come first.
    pub fn with_presets(
        presets: Vec<Vec<String>>,
        config: &PlatformerConfig,
    ) -> Result<Self, CampaignError> {
        check_tier(config.campaign.start_tier)?;
        let mut rng = StdRng::seed_from_u64(config.campaign.seed);
        let spawns = SpawnTable::standard();
        let stage = Self::first_stage(&presets, config.campaign.start_tier);
        let plan = Self::plan_for(&presets, stage, &mut rng)?;
        let level = Level::with_options(&plan, &spawns, config.physics.clone(), &mut rng)?;

        tracing::info!(
            presets = presets.len(),
            lives = config.campaign.lives,
            stage = %stage.label(),
            "Campaign started"
        );

        Ok(Self {
            presets,
            spawns,
            physics: config.physics.clone(),
            starting_lives: config.campaign.lives,
            start_tier: config.campaign.start_tier,
            rng,
            stage,
            plan,
            level,
            lives: config.campaign.lives,
            levels_won: 0,
            state: CampaignState::Playing,
            recorder: None,
        })
    }

    /// Record every tick into `recorder` from the current level on.
    pub fn with_recorder(mut self, mut recorder: EpisodeRecorder) -> Self {
        recorder.begin_level(self.stage.label(), self.stage.tier());
        self.recorder = Some(recorder);
        self
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn levels_won(&self) -> u32 {
        self.levels_won
    }

    pub fn state(&self) -> CampaignState {
        self.state
    }

    pub fn recorder(&self) -> Option<&EpisodeRecorder> {
        self.recorder.as_ref()
    }

    /// Detach the recorder and return everything it captured.
    pub fn take_episode(&mut self) -> Option<Episode> {
        self.recorder.take().map(EpisodeRecorder::finish)
    }

    /// Advance the current level and move on once it has finished.
    ///
    /// Returns the events of the level that was ticked. After game over this
    /// is a no-op. If the next level cannot be built the error is returned and
    /// the campaign stays on the finished level.
    pub fn advance(
        &mut self,
        elapsed: f32,
        input: &InputState,
    ) -> Result<Vec<LevelEvent>, CampaignError> {
        if self.state == CampaignState::GameOver {
            return Ok(Vec::new());
        }

        let events = self.level.advance(elapsed, input);
        if let Some(rec) = self.recorder.as_mut() {
            rec.record_frame(
                elapsed,
                *input,
                self.level.status(),
                self.level.actor_frames(),
            );
            rec.record_events(&events);
        }

        if self.level.is_finished() {
            match self.level.status() {
                LevelStatus::Won => self.move_on()?,
                LevelStatus::Lost => self.lose_life()?,
                LevelStatus::Running => {},
            }
        }

        Ok(events)
    }

    fn move_on(&mut self) -> Result<(), CampaignError> {
        let next = self.next_stage();
        let plan = Self::plan_for(&self.presets, next, &mut self.rng)?;
        let level = self.build_level(&plan)?;

        tracing::info!(from = %self.stage.label(), to = %next.label(), "Level won");
        self.end_level(LevelStatus::Won);
        self.levels_won += 1;
        self.install(next, plan, level);
        Ok(())
    }

    fn lose_life(&mut self) -> Result<(), CampaignError> {
        if self.lives <= 1 {
            self.end_level(LevelStatus::Lost);
            self.lives = 0;
            tracing::info!(
                stage = %self.stage.label(),
                levels_won = self.levels_won,
                "Campaign over"
            );
            self.state = CampaignState::GameOver;
            return Ok(());
        }

        let level = Level::with_options(
            &self.plan,
            &self.spawns,
            self.physics.clone(),
            &mut self.rng,
        )?;
        self.end_level(LevelStatus::Lost);
        self.lives -= 1;
        tracing::info!(lives = self.lives, stage = %self.stage.label(), "Life lost");
        self.level = level;
        self.begin_level();
        Ok(())
    }

    /// Start over from the first stage with full lives. The recorder, if
    /// any, keeps recording into the same episode.
    pub fn restart(&mut self) -> Result<(), CampaignError> {
        let stage = Self::first_stage(&self.presets, self.start_tier);
        let plan = Self::plan_for(&self.presets, stage, &mut self.rng)?;
        let level = self.build_level(&plan)?;

        self.lives = self.starting_lives;
        self.levels_won = 0;
        self.state = CampaignState::Playing;
        tracing::info!(stage = %stage.label(), "Campaign restarted");
        self.install(stage, plan, level);
        Ok(())
    }

    fn first_stage(presets: &[Vec<String>], start_tier: u32) -> Stage {
        if presets.is_empty() {
            Stage::Generated { tier: start_tier }
        } else {
            Stage::Preset { index: 0 }
        }
    }

    fn next_stage(&self) -> Stage {
        match self.stage {
            Stage::Preset { index } if index + 1 < self.presets.len() => {
                Stage::Preset { index: index + 1 }
            },
            Stage::Preset { .. } => Stage::Generated {
                tier: self.start_tier,
            },
            Stage::Generated { tier } => Stage::Generated {
                tier: (tier + 1).min(MAX_TIER),
            },
        }
    }

    fn plan_for(
        presets: &[Vec<String>],
        stage: Stage,
        rng: &mut StdRng,
    ) -> Result<Vec<String>, CampaignError> {
        match stage {
            Stage::Preset { index } => presets
                .get(index)
                .cloned()
                .ok_or(CampaignError::Plan(PlanError::Empty)),
            Stage::Generated { tier } => Ok(generate_level(tier, rng)?),
        }
    }

    fn build_level(&mut self, plan: &[String]) -> Result<Level, CampaignError> {
        Ok(Level::with_options(
            plan,
            &self.spawns,
            self.physics.clone(),
            &mut self.rng,
        )?)
    }

    /// Switch to a level that was built successfully.
    fn install(&mut self, stage: Stage, plan: Vec<String>, level: Level) {
        self.stage = stage;
        self.plan = plan;
        self.level = level;
        self.begin_level();
    }

    fn begin_level(&mut self) {
        if let Some(rec) = self.recorder.as_mut() {
            rec.begin_level(self.stage.label(), self.stage.tier());
        }
    }

    fn end_level(&mut self, outcome: LevelStatus) {
        if let Some(rec) = self.recorder.as_mut() {
            rec.end_level(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The player walks straight into lava.
    const DEATH_TRAP: &[&str] = &[
        "x     x", //
        "x@!  ox", //
        "xxxxxxx", //
    ];

    /// The player walks straight into the only coin.
    const FREE_COIN: &[&str] = &[
        "x    x", //
        "x@o  x", //
        "xxxxxx", //
    ];

    fn owned(plan: &[&str]) -> Vec<String> {
        plan.iter().map(|r| (*r).to_string()).collect()
    }

    fn config(lives: u32) -> PlatformerConfig {
        let mut cfg = PlatformerConfig::default();
        cfg.campaign.lives = lives;
        cfg.campaign.start_tier = 2;
        cfg
    }

    fn right() -> InputState {
        InputState {
            right: true,
            ..Default::default()
        }
    }

    /// Tick at 20 Hz until the stage or life count changes, or game over.
    fn play_out_level(campaign: &mut Campaign, input: InputState) {
        let stage = campaign.stage();
        let lives = campaign.lives();
        for _ in 0..200 {
            campaign.advance(0.05, &input).unwrap();
            if campaign.stage() != stage
                || campaign.lives() != lives
                || campaign.state() == CampaignState::GameOver
            {
                return;
            }
        }
        panic!("level never finished");
    }

    #[test]
    fn builtin_campaign_starts_on_first_preset() {
        let campaign = Campaign::new(&PlatformerConfig::default()).unwrap();
        assert_eq!(campaign.stage(), Stage::Preset { index: 0 });
        assert_eq!(campaign.lives(), crate::config::STARTING_LIVES);
        assert_eq!(campaign.state(), CampaignState::Playing);
        assert_eq!(campaign.level().status(), LevelStatus::Running);
    }

    #[test]
    fn losing_costs_a_life_and_replays_the_plan() {
        let mut campaign =
            Campaign::with_presets(vec![owned(DEATH_TRAP), owned(FREE_COIN)], &config(3)).unwrap();
        play_out_level(&mut campaign, right());
        assert_eq!(campaign.lives(), 2);
        assert_eq!(campaign.stage(), Stage::Preset { index: 0 });
        assert_eq!(campaign.level().status(), LevelStatus::Running);
        assert_eq!(campaign.levels_won(), 0);
    }

    #[test]
    fn running_out_of_lives_ends_the_campaign() {
        let mut campaign = Campaign::with_presets(vec![owned(DEATH_TRAP)], &config(2)).unwrap();
        play_out_level(&mut campaign, right());
        play_out_level(&mut campaign, right());
        assert_eq!(campaign.lives(), 0);
        assert_eq!(campaign.state(), CampaignState::GameOver);

        // Further ticks do nothing.
        assert!(campaign.advance(0.05, &right()).unwrap().is_empty());
        assert_eq!(campaign.state(), CampaignState::GameOver);
    }

    #[test]
    fn winning_walks_presets_then_generated_tiers() {
        let mut campaign =
            Campaign::with_presets(vec![owned(FREE_COIN), owned(FREE_COIN)], &config(3)).unwrap();
        play_out_level(&mut campaign, right());
        assert_eq!(campaign.stage(), Stage::Preset { index: 1 });
        play_out_level(&mut campaign, right());
        assert_eq!(campaign.stage(), Stage::Generated { tier: 2 });
        assert_eq!(campaign.levels_won(), 2);
        assert_eq!(campaign.lives(), 3);
        assert_eq!(campaign.level().width(), crate::level_gen::level_width(2));
    }

    #[test]
    fn generated_stages_increase_tier() {
        let stage = Stage::Generated { tier: 4 };
        let campaign = Campaign::with_presets(Vec::new(), &config(1)).unwrap();
        assert_eq!(campaign.stage(), Stage::Generated { tier: 2 });
        let next = Campaign {
            stage,
            ..campaign
        }
        .next_stage();
        assert_eq!(next, Stage::Generated { tier: 5 });
    }

    #[test]
    fn invalid_start_tier_surfaces_generate_error() {
        let mut cfg = config(1);
        cfg.campaign.start_tier = 0;
        let err = Campaign::with_presets(Vec::new(), &cfg).err().unwrap();
        assert_eq!(err, CampaignError::Generate(GenerateError::InvalidTier(0)));
        assert!(err.to_string().starts_with("level generation failed"));
    }

    #[test]
    fn start_tier_is_checked_even_with_presets() {
        for tier in [0, MAX_TIER + 1] {
            let mut cfg = config(1);
            cfg.campaign.start_tier = tier;
            let err = Campaign::with_presets(vec![owned(FREE_COIN)], &cfg)
                .err()
                .unwrap();
            assert_eq!(err, CampaignError::Generate(GenerateError::InvalidTier(tier)));
        }
    }

    #[test]
    fn failed_transition_leaves_campaign_unchanged() {
        let broken = owned(&["x  x", "xxxx"]);
        let mut campaign =
            Campaign::with_presets(vec![owned(FREE_COIN), broken], &config(3))
                .unwrap()
                .with_recorder(EpisodeRecorder::new());

        let mut first_err = None;
        for _ in 0..200 {
            if let Err(e) = campaign.advance(0.05, &right()) {
                first_err = Some(e);
                break;
            }
        }
        assert_eq!(first_err, Some(CampaignError::Plan(PlanError::MissingPlayer)));
        assert_eq!(campaign.stage(), Stage::Preset { index: 0 });
        assert_eq!(campaign.levels_won(), 0);
        assert_eq!(campaign.level().status(), LevelStatus::Won);

        // Retrying fails the same way without counting the win again.
        for _ in 0..3 {
            assert!(campaign.advance(0.05, &right()).is_err());
        }
        assert_eq!(campaign.stage(), Stage::Preset { index: 0 });
        assert_eq!(campaign.levels_won(), 0);
        assert_eq!(campaign.lives(), 3);

        let episode = campaign.take_episode().unwrap();
        assert_eq!(episode.levels.len(), 1);
        assert_eq!(episode.levels[0].outcome, None);
    }

    #[test]
    fn bad_preset_surfaces_plan_error() {
        let err = Campaign::with_presets(vec![owned(&["x  x", "xxxx"])], &config(1))
            .err()
            .unwrap();
        assert_eq!(err, CampaignError::Plan(PlanError::MissingPlayer));
    }

    #[test]
    fn restart_resets_lives_and_stage() {
        let mut campaign =
            Campaign::with_presets(vec![owned(FREE_COIN), owned(DEATH_TRAP)], &config(1)).unwrap();
        play_out_level(&mut campaign, right());
        play_out_level(&mut campaign, right());
        assert_eq!(campaign.state(), CampaignState::GameOver);

        campaign.restart().unwrap();
        assert_eq!(campaign.state(), CampaignState::Playing);
        assert_eq!(campaign.stage(), Stage::Preset { index: 0 });
        assert_eq!(campaign.lives(), 1);
        assert_eq!(campaign.levels_won(), 0);
    }

    #[test]
    fn recorder_captures_each_attempt() {
        let mut campaign =
            Campaign::with_presets(vec![owned(DEATH_TRAP), owned(FREE_COIN)], &config(2))
                .unwrap()
                .with_recorder(EpisodeRecorder::new());
        play_out_level(&mut campaign, right());
        play_out_level(&mut campaign, right());
        assert_eq!(campaign.state(), CampaignState::GameOver);

        let episode = campaign.take_episode().unwrap();
        assert_eq!(episode.levels.len(), 2);
        for level in &episode.levels {
            assert_eq!(level.label, "preset 0");
            assert_eq!(level.outcome, Some(LevelStatus::Lost));
            assert!(!level.frames.is_empty());
            assert!(level.events.iter().any(|e| e.event
                == LevelEvent::StatusChanged {
                    status: LevelStatus::Lost
                }));
        }
        assert!(campaign.take_episode().is_none());

        let json = serde_json::to_string(&episode).unwrap();
        assert!(json.contains(r#""event":"status_changed""#));
        assert!(json.contains(r#""outcome":"lost""#));
    }

    #[test]
    fn stage_labels() {
        assert_eq!(Stage::Preset { index: 1 }.label(), "preset 1");
        assert_eq!(Stage::Generated { tier: 3 }.label(), "generated tier 3");
        assert_eq!(Stage::Generated { tier: 3 }.tier(), Some(3));
        assert_eq!(Stage::Preset { index: 0 }.tier(), None);
    }
}
