use std::time::Duration;

use serde::Serialize;

use crate::types::track::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Playback {
    progress: Progress,
    playing: bool,
    percent_per_second: f64,
}

impl Playback {
    pub fn new(percent_per_second: f64) -> Self {
        Self {
            progress: Progress::START,
            playing: false,
            percent_per_second: percent_per_second.max(0.0),
        }
    }

    pub fn over(duration: Duration) -> Self {
        let seconds = duration.as_secs_f64();
        if seconds <= f64::EPSILON {
            return Self {
                progress: Progress::END,
                playing: false,
                percent_per_second: 0.0,
            };
        }
        Self {
            progress: Progress::START,
            playing: true,
            percent_per_second: 100.0 / seconds,
        }
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing && !self.progress.is_complete();
    }

    pub fn advance(&mut self, delta: Duration) -> Progress {
        if !self.playing {
            return self.progress;
        }

        let step = self.percent_per_second * delta.as_secs_f64();
        self.progress = Progress::new(self.progress.value() + step);
        if self.progress.is_complete() {
            self.playing = false;
        }
        self.progress
    }

    pub fn scrub(&mut self, pct: f64) -> Progress {
        self.progress = Progress::new(pct);
        if self.progress.is_complete() {
            self.playing = false;
        }
        self.progress
    }
}
