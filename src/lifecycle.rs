/// Simulation lifecycle. `Idle` until a first scene load, then `Paused`
/// (editable) or `Running` (physics stepping). Reset is a transition back to
/// `Paused`, not a state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Idle,
    Paused,
    Running,
}

impl Default for SimState {
    fn default() -> Self {
        SimState::Idle
    }
}

impl SimState {
    pub fn label(self) -> &'static str {
        match self {
            SimState::Idle => "idle",
            SimState::Paused => "paused",
            SimState::Running => "running",
        }
    }

    pub fn is_running(self) -> bool {
        self == SimState::Running
    }

    /// Gizmo manipulation is only accepted while paused; attaching it while
    /// the solver steps would race a user edit against physics on the same
    /// transform every tick.
    pub fn accepts_gizmo(self) -> bool {
        self == SimState::Paused
    }

    pub fn can_start(self) -> bool {
        self == SimState::Paused
    }

    pub fn can_pause(self) -> bool {
        self == SimState::Running
    }

    pub fn can_reset(self) -> bool {
        self != SimState::Idle
    }
}
