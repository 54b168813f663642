//! Loop supervision state

/// Supervision state of the monitor loop
///
/// There is no terminal state; the loop only stops when the device does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopState {
    /// Ticking at the normal cadence
    #[default]
    Running,
    /// Last tick failed; backing off before the next one
    Recovering,
}

impl LoopState {
    /// Check if the loop is backing off after a failure
    pub fn is_recovering(&self) -> bool {
        matches!(self, LoopState::Recovering)
    }
}
