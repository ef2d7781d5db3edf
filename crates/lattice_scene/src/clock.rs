//! Game time bookkeeping.

use std::time::{Duration, Instant};

use crate::config::ClockConfig;

/// Time values for one update pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameTime {
    /// Time since the clock started.
    pub total: Duration,
    /// Time since the previous update.
    pub delta: Duration,
    /// Number of updates so far, starting at 1.
    pub frame: u64,
}

impl GameTime {
    /// Delta in seconds.
    #[must_use]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

#[derive(Clone, Copy, Debug)]
enum ClockMode {
    Fixed(Duration),
    RealTime { last: Instant },
}

/// Advances game time once per update, either by a fixed step or by wall
/// clock.
#[derive(Clone, Debug)]
pub struct GameClock {
    mode: ClockMode,
    time: GameTime,
}

impl GameClock {
    /// Clock that advances by `step` on every tick.
    #[must_use]
    pub fn fixed(step: Duration) -> Self {
        Self {
            mode: ClockMode::Fixed(step),
            time: GameTime::default(),
        }
    }

    /// Clock driven by [`Instant`].
    #[must_use]
    pub fn real_time() -> Self {
        Self {
            mode: ClockMode::RealTime {
                last: Instant::now(),
            },
            time: GameTime::default(),
        }
    }

    /// Builds a clock from configuration.
    #[must_use]
    pub fn from_config(config: &ClockConfig) -> Self {
        match config.fixed_step_ms {
            Some(ms) => Self::fixed(Duration::from_millis(ms)),
            None => Self::real_time(),
        }
    }

    /// Advances and returns the new time.
    pub fn tick(&mut self) -> GameTime {
        let delta = match &mut self.mode {
            ClockMode::Fixed(step) => *step,
            ClockMode::RealTime { last } => {
                let now = Instant::now();
                let delta = now.duration_since(*last);
                *last = now;
                delta
            }
        };
        self.time.delta = delta;
        self.time.total += delta;
        self.time.frame += 1;
        self.time
    }

    /// Time as of the last tick.
    #[must_use]
    pub fn current(&self) -> GameTime {
        self.time
    }

    /// Resets to frame zero.
    pub fn reset(&mut self) {
        self.time = GameTime::default();
        if let ClockMode::RealTime { last } = &mut self.mode {
            *last = Instant::now();
        }
    }
}
