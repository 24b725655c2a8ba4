/// Action that can be taken each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Do nothing; gravity keeps acting
    Idle,
    /// Reset vertical velocity to the flap impulse
    Flap,
}

impl Action {
    /// Convert a discrete action index to an Action
    ///
    /// - 0 → Idle
    /// - 1 → Flap
    /// - other → Idle (default for invalid indices)
    pub fn from_index(idx: usize) -> Self {
        match idx {
            1 => Action::Flap,
            _ => Action::Idle,
        }
    }

    /// Discrete index of this action
    pub fn index(&self) -> usize {
        match self {
            Action::Idle => 0,
            Action::Flap => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_mapping() {
        assert_eq!(Action::from_index(0), Action::Idle);
        assert_eq!(Action::from_index(1), Action::Flap);
        assert_eq!(Action::from_index(999), Action::Idle);
    }

    #[test]
    fn test_index_round_trip() {
        assert_eq!(Action::from_index(Action::Idle.index()), Action::Idle);
        assert_eq!(Action::from_index(Action::Flap.index()), Action::Flap);
    }
}
