//! Playback clock abstraction.
//!
//! The rest of the crate talks to audio through [`PlaybackClock`] only; the
//! mpv process behind [`mpv::MpvHandle`] is one implementation, tests use a
//! fake.

pub mod mpv;

#[cfg(test)]
pub mod fake;

/// Playback speed, restricted to 0.5–1.0 in 0.1 steps.
///
/// Stored in tenths so equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaybackRate(u8);

impl PlaybackRate {
    pub const SLOWEST: Self = Self(5);
    pub const NORMAL: Self = Self(10);

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    pub fn faster(self) -> Option<Self> {
        (self < Self::NORMAL).then_some(Self(self.0 + 1))
    }

    pub fn slower(self) -> Option<Self> {
        (self > Self::SLOWEST).then_some(Self(self.0 - 1))
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (Self::SLOWEST.0..=Self::NORMAL.0).map(Self)
    }

    pub fn label(self) -> String {
        format!("{:.1}x", self.as_f64())
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = anyhow::Error;

    /// Only the exact steps are accepted; anything else is rejected rather
    /// than clamped.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let tenths = (value * 10.0).round();
        if (value * 10.0 - tenths).abs() > 1e-6 {
            anyhow::bail!("unsupported playback rate {value}");
        }
        match tenths as i64 {
            t @ 5..=10 => Ok(Self(t as u8)),
            _ => anyhow::bail!("unsupported playback rate {value} (allowed 0.5-1.0)"),
        }
    }
}

/// Whether a seek reached the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOutcome {
    Applied,
    /// No source loaded yet; nothing happened.
    Ignored,
}

pub trait PlaybackClock {
    fn play(&mut self) -> anyhow::Result<()>;
    fn pause(&mut self) -> anyhow::Result<()>;
    fn toggle_pause(&mut self) -> anyhow::Result<()>;
    /// Absolute seek. Must not fail when no source is loaded.
    fn seek(&mut self, seconds: f64) -> anyhow::Result<SeekOutcome>;
    fn set_rate(&mut self, rate: PlaybackRate) -> anyhow::Result<()>;
    fn rate(&self) -> PlaybackRate;
    /// Last position reported by the engine.
    fn current_time(&self) -> f64;
    /// Known once the source has loaded.
    fn duration(&self) -> Option<f64>;
}
