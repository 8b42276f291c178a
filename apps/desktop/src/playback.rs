//! Current position and duration of the loaded video.

use crate::clock::PlaybackClock;
use std::time::Instant;

fn sanitize(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// Position is kept within `[0, duration]` once a duration is known
/// (non-zero). Before metadata arrives only the lower bound applies.
#[derive(Debug, Default, Clone)]
pub struct PlaybackController {
    current_time: f64,
    duration: f64,
    clock: PlaybackClock,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.clock.playing
    }

    fn clamp(&self, seconds: f64) -> f64 {
        let seconds = sanitize(seconds);
        if self.duration > 0.0 {
            seconds.min(self.duration)
        } else {
            seconds
        }
    }

    pub fn on_time_update(&mut self, seconds: f64) {
        self.current_time = self.clamp(seconds);
        self.clock.seek_to(self.current_time);
    }

    pub fn on_metadata_loaded(&mut self, duration: f64) {
        self.duration = sanitize(duration);
        self.current_time = self.clamp(self.current_time);
        self.clock.seek_to(self.current_time);
    }

    /// Returns the position actually applied.
    pub fn seek_to(&mut self, seconds: f64) -> f64 {
        self.current_time = self.clamp(seconds);
        self.clock.seek_to(self.current_time);
        self.current_time
    }

    pub fn play(&mut self) {
        if self.duration > 0.0 && self.current_time >= self.duration {
            self.current_time = 0.0;
        }
        self.clock.play(self.current_time);
    }

    pub fn pause(&mut self) {
        self.clock.pause(self.current_time);
    }

    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Advance from the clock. Returns the new position while playing;
    /// playback stops on reaching the end.
    pub fn tick(&mut self) -> Option<f64> {
        self.tick_at(Instant::now())
    }

    pub(crate) fn tick_at(&mut self, at: Instant) -> Option<f64> {
        if !self.is_playing() {
            return None;
        }
        self.current_time = self.clamp(self.clock.now_at(at));
        if self.duration > 0.0 && self.current_time >= self.duration {
            self.pause();
        }
        Some(self.current_time)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
