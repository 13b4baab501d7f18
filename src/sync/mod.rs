//! Seek coordination between user intent and engine time updates.
//!
//! Time flows one way: the engine reports positions, the coordinator decides
//! which position is current, the resolver and renderers read it. A user seek
//! updates the local time immediately and marks the last intent as
//! user-originated; engine positions that arrive before the engine
//! acknowledges the seek are treated as stale.
//!
//! The adapter is assumed to deliver events in order. Each applied seek is
//! acknowledged once, so the seek stays pending until every outstanding
//! acknowledgement has arrived (or a position near the latest target is
//! seen). Only then is every later position trusted.

use crate::player::{PlaybackClock, SeekOutcome};

/// Engine positions within this distance of a pending seek target are taken
/// as the engine having caught up.
pub const SEEK_TOLERANCE: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Time last came from the engine.
    Engine,
    /// Time last came from a user seek; `pending` until the engine confirms.
    User { target: f64, pending: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineUpdate {
    Accepted,
    /// Dropped: reported before the engine caught up with a user seek.
    Stale,
}

/// Per-session playhead. Never shared between sessions.
#[derive(Debug, Clone)]
pub struct SeekCoordinator {
    time: f64,
    duration: Option<f64>,
    intent: Intent,
    /// Applied seeks the engine has not acknowledged yet.
    unacked: u32,
}

impl Default for SeekCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SeekCoordinator {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            duration: None,
            intent: Intent::Engine,
            unacked: 0,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn seek_pending(&self) -> bool {
        matches!(self.intent, Intent::User { pending: true, .. })
    }

    /// Forget everything about the previous source.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn set_duration(&mut self, seconds: f64) {
        self.duration = (seconds.is_finite() && seconds > 0.0).then_some(seconds);
    }

    /// Seek requested by a click, a scrub or a key.
    ///
    /// The target is clamped into the known duration. When the clock ignores
    /// the seek (nothing loaded) local time is left untouched.
    pub fn user_seek<C: PlaybackClock + ?Sized>(
        &mut self,
        clock: &mut C,
        target: f64,
    ) -> anyhow::Result<SeekOutcome> {
        if !target.is_finite() {
            anyhow::bail!("invalid seek target {target}");
        }
        let target = match self.duration {
            Some(d) => target.clamp(0.0, d),
            None => target.max(0.0),
        };
        let outcome = clock.seek(target)?;
        if outcome == SeekOutcome::Applied {
            self.time = target;
            self.unacked = self.unacked.saturating_add(1);
            self.intent = Intent::User {
                target,
                pending: true,
            };
        }
        Ok(outcome)
    }

    pub fn user_seek_relative<C: PlaybackClock + ?Sized>(
        &mut self,
        clock: &mut C,
        delta: f64,
    ) -> anyhow::Result<SeekOutcome> {
        self.user_seek(clock, self.time + delta)
    }

    /// Seek to a horizontal fraction of the timeline.
    pub fn user_seek_fraction<C: PlaybackClock + ?Sized>(
        &mut self,
        clock: &mut C,
        fraction: f64,
    ) -> anyhow::Result<SeekOutcome> {
        let Some(duration) = self.duration else {
            return Ok(SeekOutcome::Ignored);
        };
        self.user_seek(clock, crate::render::timeline::seek_fraction(fraction, duration))
    }

    /// Native time update from the engine.
    pub fn engine_update(&mut self, seconds: f64) -> EngineUpdate {
        if let Intent::User {
            target,
            pending: true,
        } = self.intent
            && (seconds - target).abs() > SEEK_TOLERANCE
        {
            tracing::trace!(seconds, target, "stale position dropped");
            return EngineUpdate::Stale;
        }
        self.time = seconds;
        self.intent = Intent::Engine;
        self.unacked = 0;
        EngineUpdate::Accepted
    }

    /// The engine finished repositioning after one seek. Earlier seeks are
    /// acknowledged first, so the latest target is only reached on the last.
    pub fn engine_seeked(&mut self) {
        self.unacked = self.unacked.saturating_sub(1);
        if let Intent::User { target, .. } = self.intent {
            self.intent = Intent::User {
                target,
                pending: self.unacked > 0,
            };
        }
    }

    /// Playback reached the end of the source.
    pub fn engine_ended(&mut self) {
        if let Some(d) = self.duration {
            self.time = d;
        }
        self.intent = Intent::Engine;
        self.unacked = 0;
    }
}
