//! [`DialogueState`] — where the conversation currently stands.

use std::fmt;

/// The single active dialogue mode.
///
/// ```text
/// Idle ──wake──▶ AwaitingIntent ──edit──▶ AwaitingSetupValue ──20/40/60/80──▶ Idle
///                               ──check─▶ AwaitingCheckTarget ──light/moisture/fertilizer──▶ Idle
/// any state ──no keyword──▶ unchanged
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DialogueState {
    /// Waiting for the wake phrase.
    #[default]
    Idle,

    /// Wake phrase heard; waiting for "edit" or "check".
    AwaitingIntent,

    /// Waiting for which reading to report.
    AwaitingCheckTarget,

    /// Waiting for a target moisture percentage.
    AwaitingSetupValue,
}

impl DialogueState {
    pub const ALL: [DialogueState; 4] = [
        DialogueState::Idle,
        DialogueState::AwaitingIntent,
        DialogueState::AwaitingCheckTarget,
        DialogueState::AwaitingSetupValue,
    ];

    /// Short label for log lines.
    ///
    /// ```
    /// use garden_voice::dialogue::DialogueState;
    ///
    /// assert_eq!(DialogueState::Idle.label(), "idle");
    /// assert_eq!(DialogueState::AwaitingSetupValue.label(), "awaiting-setup-value");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            DialogueState::Idle => "idle",
            DialogueState::AwaitingIntent => "awaiting-intent",
            DialogueState::AwaitingCheckTarget => "awaiting-check-target",
            DialogueState::AwaitingSetupValue => "awaiting-setup-value",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DialogueState::Idle)
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(DialogueState::default(), DialogueState::Idle);
        assert!(DialogueState::default().is_idle());
    }

    #[test]
    fn labels_are_distinct() {
        let mut labels: Vec<_> = DialogueState::ALL.iter().map(|s| s.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), DialogueState::ALL.len());
    }
}
