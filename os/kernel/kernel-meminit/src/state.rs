use core::fmt;

/// Progress of memory discovery.
///
/// ```text
/// Start ─► RequestingConfig ─► DerivingSizes ─► Probing ─► Done
///                 │                  │             │ ▲
///                 ▼                  ▼             └─┘ one increment
///              Aborted ◄─────────────┴──── Probing
/// ```
///
/// Only protocol exhaustion leaves `RequestingConfig` for `Aborted`; the
/// later edges into `Aborted` are the invalid-layout and unexpected-fault
/// cases.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MemoryInitState {
    #[default]
    Start,
    RequestingConfig,
    DerivingSizes,
    Probing,
    Done,
    Aborted,
}

impl MemoryInitState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use MemoryInitState::{Aborted, DerivingSizes, Done, Probing, RequestingConfig, Start};
        matches!(
            (self, next),
            (Start, RequestingConfig)
                | (RequestingConfig, DerivingSizes)
                | (DerivingSizes, Probing)
                | (Probing, Probing | Done)
                | (RequestingConfig | DerivingSizes | Probing, Aborted)
        )
    }

    /// Move to `next`, logging the step.
    pub(crate) fn advance(&mut self, next: Self) {
        debug_assert!(
            self.can_transition_to(next),
            "invalid memory init transition {self} -> {next}"
        );
        if *self == next {
            log::trace!("meminit: {self} again");
        } else {
            log::debug!("meminit: {self} -> {next}");
        }
        *self = next;
    }
}

impl fmt::Display for MemoryInitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "START",
            Self::RequestingConfig => "REQUESTING_CONFIG",
            Self::DerivingSizes => "DERIVING_SIZES",
            Self::Probing => "PROBING",
            Self::Done => "DONE",
            Self::Aborted => "ABORTED",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryInitState::*;

    #[test]
    fn happy_path() {
        let path = [Start, RequestingConfig, DerivingSizes, Probing, Probing, Done];
        for step in path.windows(2) {
            assert!(step[0].can_transition_to(step[1]), "{} -> {}", step[0], step[1]);
        }
    }

    #[test]
    fn no_shortcuts_or_exits_from_terminal_states() {
        assert!(!Start.can_transition_to(Probing));
        assert!(!RequestingConfig.can_transition_to(Done));
        assert!(!Start.can_transition_to(Aborted));
        assert!(!Done.can_transition_to(Aborted));
        assert!(!Aborted.can_transition_to(Start));
        assert!(Done.is_terminal() && Aborted.is_terminal());
    }

    #[test]
    fn probing_loops_per_increment() {
        let mut state = Probing;
        state.advance(Probing);
        state.advance(Probing);
        assert_eq!(state, Probing);
        assert!(!DerivingSizes.can_transition_to(DerivingSizes));
    }

    #[test]
    fn exhaustion_aborts_from_config_request() {
        assert!(RequestingConfig.can_transition_to(Aborted));
    }
}
