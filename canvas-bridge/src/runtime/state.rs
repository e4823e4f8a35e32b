use std::fmt;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoopState {
    #[default]
    Uninitialized,
    WaitingForEngineReady,
    Running,
    Resizing,
    Terminated,
}

impl LoopState {
    pub fn can_transition_to(self, next: Self) -> bool {
        use LoopState::*;

        matches!(
            (self, next),
            (Uninitialized, WaitingForEngineReady)
                | (WaitingForEngineReady, Running)
                | (Running, Resizing)
                | (Resizing, Running)
                | (Uninitialized | WaitingForEngineReady, Terminated)
                | (Running | Resizing, Terminated)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Terminated
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::WaitingForEngineReady => "waiting for engine",
            Self::Running => "running",
            Self::Resizing => "resizing",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::LoopState::*;

    #[test]
    fn lifecycle_transitions() {
        assert!(Uninitialized.can_transition_to(WaitingForEngineReady));
        assert!(WaitingForEngineReady.can_transition_to(Running));
        assert!(Running.can_transition_to(Resizing));
        assert!(Resizing.can_transition_to(Running));
        assert!(Running.can_transition_to(Terminated));
    }

    #[test]
    fn refused_transitions() {
        assert!(!Uninitialized.can_transition_to(Running));
        assert!(!WaitingForEngineReady.can_transition_to(Resizing));
        assert!(!Running.can_transition_to(WaitingForEngineReady));
        assert!(!Terminated.can_transition_to(Running));
        assert!(!Terminated.can_transition_to(Terminated));
    }
}
