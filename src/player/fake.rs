//! In-memory clock for tests.

use super::{PlaybackClock, PlaybackRate, SeekOutcome};

#[derive(Debug, Default)]
pub struct FakeClock {
    pub time: f64,
    pub duration: Option<f64>,
    pub paused: bool,
    pub rate: PlaybackRate,
    pub seeks: Vec<f64>,
}

impl FakeClock {
    pub fn loaded(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }
}

impl PlaybackClock for FakeClock {
    fn play(&mut self) -> anyhow::Result<()> {
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) -> anyhow::Result<()> {
        self.paused = true;
        Ok(())
    }

    fn toggle_pause(&mut self) -> anyhow::Result<()> {
        self.paused = !self.paused;
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> anyhow::Result<SeekOutcome> {
        if self.duration.is_none() {
            return Ok(SeekOutcome::Ignored);
        }
        self.seeks.push(seconds);
        self.time = seconds;
        Ok(SeekOutcome::Applied)
    }

    fn set_rate(&mut self, rate: PlaybackRate) -> anyhow::Result<()> {
        self.rate = rate;
        Ok(())
    }

    fn rate(&self) -> PlaybackRate {
        self.rate
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }
}
