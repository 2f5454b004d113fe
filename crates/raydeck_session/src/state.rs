//! Session lifecycle states.

use std::fmt;

/// Where a render session is in its lifecycle.
///
/// `Idle -> Loading -> SceneBuilt -> Rendering -> (DenoisePass) -> Converting -> Complete`,
/// with `Failed` reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Loading,
    SceneBuilt,
    Rendering,
    DenoisePass,
    Converting,
    Complete,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Complete | SessionState::Failed)
    }

    pub fn name(self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Loading => "Loading",
            SessionState::SceneBuilt => "SceneBuilt",
            SessionState::Rendering => "Rendering",
            SessionState::DenoisePass => "DenoisePass",
            SessionState::Converting => "Converting",
            SessionState::Complete => "Complete",
            SessionState::Failed => "Failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
