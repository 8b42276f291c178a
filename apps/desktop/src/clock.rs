use std::time::Instant;

/// Wall-clock driven media position.
#[derive(Default, Debug, Clone)]
pub(crate) struct PlaybackClock {
    pub(crate) playing: bool,
    pub(crate) anchor_instant: Option<Instant>,
    pub(crate) anchor_media_sec: f64, // media time at anchor
}

impl PlaybackClock {
    pub(crate) fn play(&mut self, current_media_sec: f64) {
        self.playing = true;
        self.anchor_media_sec = current_media_sec;
        self.anchor_instant = Some(Instant::now());
    }
    pub(crate) fn pause(&mut self, current_media_sec: f64) {
        self.playing = false;
        self.anchor_media_sec = current_media_sec;
        self.anchor_instant = None;
    }
    pub(crate) fn now(&self) -> f64 {
        self.now_at(Instant::now())
    }
    pub(crate) fn now_at(&self, at: Instant) -> f64 {
        match (self.playing, self.anchor_instant) {
            (true, Some(anchor)) => {
                self.anchor_media_sec + at.saturating_duration_since(anchor).as_secs_f64()
            }
            _ => self.anchor_media_sec,
        }
    }
    pub(crate) fn seek_to(&mut self, media_sec: f64) {
        self.anchor_media_sec = media_sec;
        if self.playing {
            self.anchor_instant = Some(Instant::now());
        }
    }
}
