//! Countdown cadence shared by the agent's session loop and the client's
//! local simulator.

/// Fires on every `every`-th tick. Counts ticks rather than reading the wall
/// clock, so a late tick still counts and no emission is skipped.
#[derive(Debug, Clone)]
pub struct Cadence {
    every: u32,
    remaining: u32,
}

impl Cadence {
    pub fn new(every: u32) -> Self {
        let every = every.max(1);
        Self {
            every,
            remaining: every,
        }
    }

    pub fn tick(&mut self) -> bool {
        self.remaining -= 1;
        if self.remaining == 0 {
            self.remaining = self.every;
            true
        } else {
            false
        }
    }
}
