use derive_more::Display;

/// Stages of a protection run, in order.
///
/// ```text
/// Idle ─> Previewing ─> Confirming ─> Processing ─> Summarizing ─> Done
///   │          └──────(dry run)──────────^                          ^
///   └────────(nothing to do)─────────────────────────────────────────┤
///                          Confirming ──(declined)───────────────────┘
/// ```
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    #[display("idle")]
    Idle,
    #[display("previewing")]
    Previewing,
    /// Waiting for the user to approve a live run.
    #[display("confirming")]
    Confirming,
    #[display("processing")]
    Processing,
    #[display("summarizing")]
    Summarizing,
    #[display("done")]
    Done,
}

impl Phase {
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, Previewing)
                | (Idle, Done)
                | (Previewing, Confirming)
                | (Previewing, Processing)
                | (Confirming, Processing)
                | (Confirming, Done)
                | (Processing, Summarizing)
                | (Summarizing, Done)
        )
    }

    /// Moves to `next` if the transition is allowed.
    pub fn advance(&mut self, next: Phase) -> bool {
        if self.can_advance_to(next) {
            tracing::debug!(from = %self, to = %next, "Phase change");
            *self = next;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[Phase::Previewing, Phase::Confirming, Phase::Processing, Phase::Summarizing, Phase::Done])]
    #[case(&[Phase::Previewing, Phase::Processing, Phase::Summarizing, Phase::Done])]
    #[case(&[Phase::Previewing, Phase::Confirming, Phase::Done])]
    #[case(&[Phase::Done])]
    fn test_valid_runs(#[case] steps: &[Phase]) {
        let mut phase = Phase::default();
        for step in steps {
            assert!(phase.advance(*step), "{phase} -> {step}");
        }
        assert_eq!(phase, Phase::Done);
    }

    #[rstest]
    #[case(Phase::Idle, Phase::Processing)]
    #[case(Phase::Processing, Phase::Done)]
    #[case(Phase::Done, Phase::Idle)]
    #[case(Phase::Summarizing, Phase::Processing)]
    fn test_invalid_transitions(#[case] from: Phase, #[case] to: Phase) {
        let mut phase = from;
        assert!(!phase.advance(to));
        assert_eq!(phase, from);
    }
}
