//! Player screen control. Every clock mutation goes through the session's
//! seek coordinator so the local playhead and the engine stay in step.

use super::actions::Action;
use super::events::PlayerEvent;
use super::state::{AppState, Toast};
use crate::lyrics::model::Segment;
use crate::lyrics::resolve::first_active;
use crate::player::{PlaybackClock, SeekOutcome};
use crate::sync::EngineUpdate;

pub const SEEK_STEP_SECS: f64 = 5.0;

/// Apply a clock-driving action. Other actions are ignored.
pub fn apply(state: &mut AppState, clock: &mut dyn PlaybackClock, action: &Action) -> anyhow::Result<()> {
    let session = &mut state.session;
    let outcome = match *action {
        Action::TogglePause => {
            clock.toggle_pause()?;
            return Ok(());
        }
        Action::SeekBy(delta) => session.coordinator.user_seek_relative(clock, delta)?,
        Action::SeekTo(t) => session.coordinator.user_seek(clock, t)?,
        Action::SeekFraction(f) => session.coordinator.user_seek_fraction(clock, f)?,
        Action::PrevSegment | Action::NextSegment => {
            let forward = *action == Action::NextSegment;
            let target = session
                .document
                .as_ref()
                .and_then(|doc| segment_jump(&doc.segments, session.coordinator.time(), forward));
            match target {
                Some(t) => session.coordinator.user_seek(clock, t)?,
                None => return Ok(()),
            }
        }
        Action::RateUp | Action::RateDown => {
            let next = if *action == Action::RateUp {
                state.rate.faster()
            } else {
                state.rate.slower()
            };
            match next {
                Some(rate) => {
                    clock.set_rate(rate)?;
                    state.rate = rate;
                    state.status = format!("Speed {}", rate.label());
                }
                None => state.toast = Some(Toast::error(format!("Speed stays at {}", state.rate.label()))),
            }
            return Ok(());
        }
        _ => return Ok(()),
    };

    if outcome == SeekOutcome::Ignored {
        state.status = "Nothing loaded yet".into();
    }
    Ok(())
}

pub fn on_event(state: &mut AppState, event: PlayerEvent) {
    let session = &mut state.session;
    match event {
        PlayerEvent::Started => session.paused = false,
        PlayerEvent::Paused => session.paused = true,
        PlayerEvent::Position { seconds } => {
            if session.coordinator.engine_update(seconds) == EngineUpdate::Stale {
                tracing::trace!(seconds, "position ignored while seeking");
            }
        }
        PlayerEvent::Duration { seconds } => session.coordinator.set_duration(seconds),
        PlayerEvent::Seeked => session.coordinator.engine_seeked(),
        PlayerEvent::Ended => {
            session.coordinator.engine_ended();
            session.paused = true;
            state.status = "Playback ended".into();
        }
        PlayerEvent::Error(e) => {
            state.toast = Some(Toast::error(format!("Player: {e}")));
        }
    }
}

/// Start time of the neighbouring segment.
///
/// Forward picks the earliest segment starting after `time`. Backward picks
/// the latest segment starting before the current one (or before `time`
/// between segments).
pub fn segment_jump(segments: &[Segment], time: f64, forward: bool) -> Option<f64> {
    if time.is_nan() {
        return None;
    }
    let starts = segments.iter().map(|s| s.start).filter(|s| s.is_finite());
    if forward {
        starts.filter(|s| *s > time).min_by(f64::total_cmp)
    } else {
        let anchor = first_active(time, segments)
            .map(|i| segments[i].start)
            .unwrap_or(time);
        starts.filter(|s| *s < anchor).max_by(f64::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::model::{LyricsDocument, Word};
    use crate::player::PlaybackRate;
    use crate::player::fake::FakeClock;

    fn seg(id: u32, start: f64, end: f64) -> Segment {
        Segment {
            id: id.to_string(),
            text: format!("s{id}"),
            start,
            end,
            words: vec![Word {
                text: format!("w{id}"),
                start,
                end,
                confidence: 1.0,
                syllables: Vec::new(),
                translation: None,
            }],
        }
    }

    fn state_with_doc() -> AppState {
        let mut state = AppState::new();
        state.new_session(None, "t".into(), "doc.json".into());
        state.session.document = Some(LyricsDocument {
            metadata: Default::default(),
            segments: vec![seg(0, 0.0, 4.0), seg(1, 5.0, 9.0), seg(2, 10.0, 14.0)],
        });
        state.session.coordinator.set_duration(20.0);
        state
    }

    #[test]
    fn test_segment_jump() {
        let segs = vec![seg(0, 0.0, 4.0), seg(1, 5.0, 9.0), seg(2, 10.0, 14.0)];
        assert_eq!(segment_jump(&segs, 6.0, true), Some(10.0));
        assert_eq!(segment_jump(&segs, 6.0, false), Some(0.0));
        assert_eq!(segment_jump(&segs, 4.5, false), Some(0.0));
        assert_eq!(segment_jump(&segs, 12.0, true), None);
        assert_eq!(segment_jump(&segs, 2.0, false), None);
        assert_eq!(segment_jump(&segs, f64::NAN, true), None);
    }

    #[test]
    fn test_click_seek_updates_highlight_before_engine() {
        let mut state = state_with_doc();
        let mut clock = FakeClock::loaded(20.0);
        apply(&mut state, &mut clock, &Action::SeekTo(6.0)).unwrap();
        assert_eq!(clock.seeks, vec![6.0]);
        assert_eq!(state.session.activation().segment, Some(1));

        // Engine still reports the old position: ignored.
        on_event(&mut state, PlayerEvent::Position { seconds: 1.0 });
        assert_eq!(state.session.activation().segment, Some(1));

        on_event(&mut state, PlayerEvent::Seeked);
        on_event(&mut state, PlayerEvent::Position { seconds: 6.1 });
        assert_eq!(state.session.coordinator.time(), 6.1);
    }

    #[test]
    fn test_next_segment_key() {
        let mut state = state_with_doc();
        let mut clock = FakeClock::loaded(20.0);
        apply(&mut state, &mut clock, &Action::NextSegment).unwrap();
        assert_eq!(clock.seeks, vec![5.0]);
        apply(&mut state, &mut clock, &Action::PrevSegment).unwrap();
        assert_eq!(clock.seeks, vec![5.0, 0.0]);
    }

    #[test]
    fn test_rate_stops_at_bounds() {
        let mut state = state_with_doc();
        let mut clock = FakeClock::loaded(20.0);
        apply(&mut state, &mut clock, &Action::RateUp).unwrap();
        assert_eq!(state.rate, PlaybackRate::NORMAL);
        assert!(state.toast.is_some());

        for _ in 0..10 {
            apply(&mut state, &mut clock, &Action::RateDown).unwrap();
        }
        assert_eq!(state.rate, PlaybackRate::SLOWEST);
        assert_eq!(clock.rate(), PlaybackRate::SLOWEST);
    }

    #[test]
    fn test_seek_before_load_keeps_time() {
        let mut state = state_with_doc();
        let mut clock = FakeClock::default();
        apply(&mut state, &mut clock, &Action::SeekBy(SEEK_STEP_SECS)).unwrap();
        assert_eq!(state.session.coordinator.time(), 0.0);
        assert_eq!(state.status, "Nothing loaded yet");
    }

    #[test]
    fn test_end_of_track_pauses() {
        let mut state = state_with_doc();
        on_event(&mut state, PlayerEvent::Started);
        on_event(&mut state, PlayerEvent::Ended);
        assert!(state.session.paused);
        assert_eq!(state.session.coordinator.time(), 20.0);
    }
}
