/// Observable lifecycle of one reaction trial.
///
/// Transitions only move forward: `Idle -> ArmedActive | ArmedPrecondFailed ->
/// Terminated`. A precondition-failed watchdog falls back to `Idle` when it
/// expires; nothing ever re-enters `ArmedActive` without a fresh setup.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum PhaseKind {
    #[default]
    Idle,
    ArmedPrecondFailed,
    ArmedActive,
    Terminated,
}

impl PhaseKind {
    pub fn is_armed(&self) -> bool {
        matches!(self, Self::ArmedActive | Self::ArmedPrecondFailed)
    }
}
