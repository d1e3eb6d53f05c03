//! Auto-play scheduling
//!
//! [`AutoPlay`] is a cooperative, deadline-based scheduler. It owns no thread
//! and no timer: the host event loop asks it when the next tick is due and
//! polls it with the current time. Cancelling simply drops the deadline, so a
//! superseded tick can never fire.

use std::fmt;
use std::time::{Duration, Instant};

/// Playback speed presets, slowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackSpeed {
    Quarter,
    Half,
    #[default]
    Normal,
    Double,
    Quadruple,
}

impl PlaybackSpeed {
    pub const ALL: [PlaybackSpeed; 5] = [
        PlaybackSpeed::Quarter,
        PlaybackSpeed::Half,
        PlaybackSpeed::Normal,
        PlaybackSpeed::Double,
        PlaybackSpeed::Quadruple,
    ];

    /// Delay between automatic steps
    pub fn interval(self) -> Duration {
        Duration::from_millis(match self {
            PlaybackSpeed::Quarter => 2000,
            PlaybackSpeed::Half => 1000,
            PlaybackSpeed::Normal => 500,
            PlaybackSpeed::Double => 250,
            PlaybackSpeed::Quadruple => 125,
        })
    }

    /// Next faster preset (saturates)
    pub fn faster(self) -> Self {
        let i = self.position();
        Self::ALL[(i + 1).min(Self::ALL.len() - 1)]
    }

    /// Next slower preset (saturates)
    pub fn slower(self) -> Self {
        Self::ALL[self.position().saturating_sub(1)]
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(2)
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlaybackSpeed::Quarter => "0.25x",
            PlaybackSpeed::Half => "0.5x",
            PlaybackSpeed::Normal => "1x",
            PlaybackSpeed::Double => "2x",
            PlaybackSpeed::Quadruple => "4x",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone)]
pub struct AutoPlay {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Default for AutoPlay {
    fn default() -> Self {
        AutoPlay::new(PlaybackSpeed::default().interval())
    }
}

impl AutoPlay {
    pub fn new(interval: Duration) -> Self {
        AutoPlay {
            interval,
            deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Arm the schedule; the first tick is one interval from `now`
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// Drop any pending tick
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Change the interval. A running schedule is cancelled and re-armed at
    /// the new interval; a stopped one stays stopped.
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        if self.deadline.is_some() {
            self.cancel();
            self.start(now);
        }
    }

    /// Time left until the next tick, if one is scheduled
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Report whether a tick is due at `now`, re-arming for the next one.
    /// At most one tick is reported per poll, so a late poll never makes the
    /// timeline skip positions.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
