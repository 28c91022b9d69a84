pub mod actors;
pub mod campaign;
pub mod config;
pub mod grid;
pub mod level;
pub mod level_gen;
pub mod plans;

pub use actors::{Actor, Body, SpawnTable};
pub use campaign::{Campaign, CampaignError, CampaignState, Stage};
pub use config::{CampaignConfig, PhysicsConfig, PlatformerConfig};
pub use grid::{Grid, Tile};
pub use level::{Level, PlanError};
pub use level_gen::{GenerateError, generate_level, generate_level_seeded};
