//! The replay state machine
//!
//! A [`Timeline`] pairs an immutable [`CommandLog`] with a cursor and the
//! container snapshot at that cursor. The snapshot is always exactly what
//! replaying `log[0..=cursor]` from genesis produces:
//!
//! - stepping forward applies one command to the current snapshot;
//! - every other move (back, jump, reset) re-derives from genesis with a
//!   fresh identity counter, since commands are not invertible.
//!
//! Auto-play is cooperative. The host polls [`Timeline::tick`] from its
//! event loop; every transition that replaces state cancels any pending tick
//! first.

use super::autoplay::{AutoPlay, PlaybackSpeed};
use super::{replay_from_genesis, IdCounter, SnapshotSet};
use crate::runtime::{Command, CommandLog};
use std::time::{Duration, Instant};

/// Where the cursor sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineState {
    /// No command applied yet
    Idle,
    /// `k` commands applied, more to come
    Positioned(usize),
    /// Every command applied
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    log: CommandLog,
    snapshot: SnapshotSet,
    ids: IdCounter,
    /// Index of the last applied command; `None` is genesis
    cursor: Option<usize>,
    autoplay: AutoPlay,
}

impl Timeline {
    pub fn new(log: CommandLog) -> Self {
        let mut timeline = Timeline::default();
        timeline.load(log);
        timeline
    }

    /// Use a custom auto-play interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.autoplay = AutoPlay::new(interval);
        self
    }

    /// Replace the log and return to genesis
    pub fn load(&mut self, log: CommandLog) {
        self.autoplay.cancel();
        tracing::debug!(commands = log.len(), "timeline loaded");
        self.log = log;
        self.rewind();
    }

    /// Back to genesis, keeping the log
    pub fn reset(&mut self) {
        self.autoplay.cancel();
        tracing::debug!("timeline reset");
        self.rewind();
    }

    /// Apply the next command. At the end this is a no-op that also stops
    /// auto-play; reaching the last command stops it too.
    pub fn step_forward(&mut self) -> bool {
        let next = self.cursor.map_or(0, |k| k + 1);
        let Some(command) = self.log.get(next) else {
            self.autoplay.cancel();
            return false;
        };

        self.snapshot.apply(command, &mut self.ids);
        self.cursor = Some(next);
        if self.state() == TimelineState::Finished {
            self.autoplay.cancel();
        }
        true
    }

    /// Undo the last applied command by re-deriving from genesis
    pub fn step_back(&mut self) -> bool {
        match self.cursor {
            None => false,
            Some(k) => {
                self.rebuild(k.checked_sub(1));
                true
            }
        }
    }

    /// Move to any cursor (clamped to the log); `None` is genesis
    pub fn jump_to(&mut self, cursor: Option<usize>) {
        self.autoplay.cancel();
        let cursor = match (cursor, self.log.last_index()) {
            (Some(k), Some(last)) => Some(k.min(last)),
            _ => None,
        };
        self.rebuild(cursor);
    }

    pub fn jump_to_end(&mut self) {
        self.jump_to(self.log.last_index());
    }

    /// Start auto-play at the current speed
    pub fn run(&mut self, now: Instant) {
        self.autoplay.cancel();
        self.autoplay.start(now);
    }

    pub fn pause(&mut self) {
        self.autoplay.cancel();
    }

    /// Change the auto-play interval without moving the cursor
    pub fn set_speed(&mut self, interval: Duration, now: Instant) {
        self.autoplay.set_interval(interval, now);
    }

    /// Poll the scheduler; steps forward when a tick is due
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.autoplay.poll(now) {
            self.step_forward()
        } else {
            false
        }
    }

    pub fn state(&self) -> TimelineState {
        match (self.cursor, self.log.last_index()) {
            (None, _) => TimelineState::Idle,
            (Some(k), Some(last)) if k >= last => TimelineState::Finished,
            (Some(k), _) => TimelineState::Positioned(k),
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn snapshot(&self) -> &SnapshotSet {
        &self.snapshot
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// The most recently applied command
    pub fn current_command(&self) -> Option<&Command> {
        self.cursor.and_then(|k| self.log.get(k))
    }

    pub fn is_playing(&self) -> bool {
        self.autoplay.is_running()
    }

    pub fn interval(&self) -> Duration {
        self.autoplay.interval()
    }

    /// Time until the next auto-play tick, for the host's poll timeout
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.autoplay.time_until_tick(now)
    }

    /// Pick the preset matching the current interval, if any
    pub fn speed(&self) -> Option<PlaybackSpeed> {
        PlaybackSpeed::ALL
            .into_iter()
            .find(|s| s.interval() == self.interval())
    }

    fn rewind(&mut self) {
        self.cursor = None;
        self.snapshot = SnapshotSet::new();
        self.ids.reset();
    }

    fn rebuild(&mut self, cursor: Option<usize>) {
        let (snapshot, ids) = replay_from_genesis(&self.log, cursor);
        self.snapshot = snapshot;
        self.ids = ids;
        self.cursor = cursor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{CommandKind, Scalar, Target};
    use crate::snapshot::replay;

    const MS: Duration = Duration::from_millis(1);

    fn stack_log() -> CommandLog {
        let push = |v| Command::new(CommandKind::Push, Target::Stack, "s", "").with_value(Some(Scalar::Int(v)));
        CommandLog::from(vec![
            push(10),
            push(20),
            Command::new(CommandKind::Pop, Target::Stack, "s", ""),
            push(30),
        ])
    }

    #[test]
    fn test_state_labels() {
        let mut timeline = Timeline::new(stack_log());
        assert_eq!(timeline.state(), TimelineState::Idle);
        timeline.step_forward();
        assert_eq!(timeline.state(), TimelineState::Positioned(0));
        timeline.jump_to_end();
        assert_eq!(timeline.state(), TimelineState::Finished);
        assert!(!timeline.step_forward());
        assert_eq!(timeline.cursor(), Some(3));
    }

    #[test]
    fn test_step_back_matches_forward_replay() {
        let mut timeline = Timeline::new(stack_log());
        while timeline.step_forward() {}

        for k in (0..4).rev() {
            assert_eq!(timeline.snapshot(), &replay(timeline.log(), Some(k)));
            timeline.step_back();
        }
        assert_eq!(timeline.state(), TimelineState::Idle);
        assert!(timeline.snapshot().is_empty());
        assert!(!timeline.step_back());
    }

    #[test]
    fn test_forward_after_back_reuses_identities() {
        let mut forward = Timeline::new(stack_log());
        forward.jump_to(Some(3));

        let mut wandering = Timeline::new(stack_log());
        wandering.jump_to_end();
        wandering.step_back();
        wandering.step_back();
        wandering.step_forward();
        wandering.step_forward();

        assert_eq!(forward.snapshot(), wandering.snapshot());
    }

    #[test]
    fn test_reset_keeps_log() {
        let mut timeline = Timeline::new(stack_log());
        timeline.jump_to(Some(2));
        timeline.reset();
        assert_eq!(timeline.cursor(), None);
        assert_eq!(timeline.log().len(), 4);
        assert!(timeline.snapshot().is_empty());
    }

    #[test]
    fn test_autoplay_stops_at_last_command() {
        let t0 = Instant::now();
        let mut timeline = Timeline::new(stack_log()).with_interval(100 * MS);
        timeline.run(t0);

        let mut now = t0;
        let mut steps = 0;
        for _ in 0..10 {
            now += 100 * MS;
            if timeline.tick(now) {
                steps += 1;
            }
        }
        assert_eq!(steps, 4);
        assert_eq!(timeline.state(), TimelineState::Finished);
        assert!(!timeline.is_playing());
    }

    #[test]
    fn test_speed_change_keeps_cursor() {
        let t0 = Instant::now();
        let mut timeline = Timeline::new(stack_log()).with_interval(100 * MS);
        timeline.run(t0);
        assert!(timeline.tick(t0 + 100 * MS));

        timeline.set_speed(250 * MS, t0 + 150 * MS);
        assert_eq!(timeline.cursor(), Some(0));
        assert!(timeline.is_playing());
        assert!(!timeline.tick(t0 + 300 * MS));
        assert!(timeline.tick(t0 + 400 * MS));
        assert_eq!(timeline.cursor(), Some(1));
        assert_eq!(timeline.speed(), Some(PlaybackSpeed::Double));
    }

    #[test]
    fn test_load_cancels_playback() {
        let t0 = Instant::now();
        let mut timeline = Timeline::new(stack_log());
        timeline.run(t0);
        timeline.load(CommandLog::new());
        assert!(!timeline.is_playing());
        assert!(!timeline.tick(t0 + 10_000 * MS));
        assert_eq!(timeline.state(), TimelineState::Idle);
    }
}
