use std::time::{Duration, Instant};

/// Drag distance past which a release triggers a reload.
pub const ACTIVATION_DISTANCE: f32 = 50.0;
/// Visual pull offset never exceeds this.
pub const MAX_PULL: f32 = 100.0;
/// Time the indicator lingers after a reload before going idle.
pub const SETTLE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Tracking { start_y: f32 },
    Armed { start_y: f32 },
    /// `settle_at` is set once the reload has finished.
    Refreshing { settle_at: Option<Instant> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Refresh,
    Ignored,
}

/// Pull-to-refresh state machine driven by press/drag/release events.
///
/// Tracking only starts when the list is scrolled to the very top; the
/// caller passes the current scroll offset with every event.
#[derive(Debug, Clone)]
pub struct PullToRefresh {
    state: GestureState,
    pull: f32,
    activation: f32,
    max_pull: f32,
}

impl Default for PullToRefresh {
    fn default() -> Self {
        Self::new(ACTIVATION_DISTANCE, MAX_PULL)
    }
}

impl PullToRefresh {
    pub fn new(activation: f32, max_pull: f32) -> Self {
        Self {
            state: GestureState::Idle,
            pull: 0.0,
            activation,
            max_pull: max_pull.max(activation),
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Current clamped pull offset, for drawing the indicator.
    pub fn pull(&self) -> f32 {
        self.pull
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, GestureState::Armed { .. })
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(self.state, GestureState::Refreshing { .. })
    }

    pub fn press(&mut self, y: f32, scroll_offset: usize) {
        if self.is_refreshing() || scroll_offset != 0 {
            return;
        }
        self.state = GestureState::Tracking { start_y: y };
        self.pull = 0.0;
    }

    pub fn drag(&mut self, y: f32, scroll_offset: usize) {
        let start_y = match self.state {
            GestureState::Tracking { start_y } | GestureState::Armed { start_y } => start_y,
            GestureState::Idle | GestureState::Refreshing { .. } => return,
        };
        if scroll_offset != 0 {
            return;
        }

        let distance = y - start_y;
        if distance <= 0.0 {
            self.pull = 0.0;
            self.state = GestureState::Tracking { start_y };
            return;
        }

        self.pull = distance.min(self.max_pull);
        self.state = if distance > self.activation {
            GestureState::Armed { start_y }
        } else {
            GestureState::Tracking { start_y }
        };
    }

    /// Ends the drag. Returns `Refresh` only when armed and no load is
    /// already in flight.
    pub fn release(&mut self, loading: bool) -> GestureOutcome {
        self.pull = 0.0;
        match self.state {
            GestureState::Armed { .. } if !loading => {
                self.state = GestureState::Refreshing { settle_at: None };
                GestureOutcome::Refresh
            }
            GestureState::Refreshing { .. } => GestureOutcome::Ignored,
            _ => {
                self.state = GestureState::Idle;
                GestureOutcome::Ignored
            }
        }
    }

    /// Called once the reload completes, whatever its outcome.
    pub fn refresh_finished(&mut self, now: Instant) {
        if let GestureState::Refreshing { settle_at: None } = self.state {
            self.state = GestureState::Refreshing {
                settle_at: Some(now + SETTLE_DELAY),
            };
        }
    }

    /// Returns to idle once the settle delay elapsed. Returns `true` on that
    /// transition.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.state {
            GestureState::Refreshing {
                settle_at: Some(at),
            } if now >= at => {
                self.state = GestureState::Idle;
                true
            }
            _ => false,
        }
    }
}
