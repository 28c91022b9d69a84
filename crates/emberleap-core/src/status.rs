use serde::{Deserialize, Serialize};

/// Outcome state of a level.
///
/// Transitions only from `Running` to one of the terminal states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelStatus {
    #[default]
    Running,
    Won,
    Lost,
}

impl LevelStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}
