//! Round budget for the model/tool sub-loop of a single user turn.

/// Caps consecutive tool rounds so a model that never stops requesting tools
/// cannot spin forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundBudget {
    max_rounds: u32,
    used: u32,
}

impl RoundBudget {
    pub fn new(max_rounds: u32) -> Self {
        Self {
            max_rounds,
            used: 0,
        }
    }

    /// Record a finished round. Saturates at the cap.
    pub fn consume(&mut self) {
        self.used = (self.used + 1).min(self.max_rounds);
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max_rounds
    }

    pub fn used(&self) -> u32 {
        self.used
    }
}
