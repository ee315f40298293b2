//! Now-playing status and progress projections
//!
//! These are the plain values the controller publishes for the view: a
//! phase-tagged status for the current track and a progress snapshot with
//! pre-formatted time and bar text.

use super::track::Track;

const BAR_FILLED: char = '▓';
const BAR_EMPTY: char = '░';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Failed,
}

impl PlaybackPhase {
    pub fn label(self) -> &'static str {
        match self {
            PlaybackPhase::Idle => "Stopped",
            PlaybackPhase::Loading => "Loading...",
            PlaybackPhase::Playing => "Playing",
            PlaybackPhase::Paused => "Paused",
            PlaybackPhase::Failed => "Playback failed",
        }
    }
}

/// Status projection of the current track.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NowPlaying {
    pub phase: PlaybackPhase,
    pub track: Option<Track>,
    pub index: Option<usize>,
    /// Free-form detail, e.g. the failure reason
    pub detail: Option<String>,
}

impl NowPlaying {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn with_track(phase: PlaybackPhase, track: Track, index: usize) -> Self {
        Self {
            phase,
            track: Some(track),
            index: Some(index),
            detail: None,
        }
    }

    pub fn failed(track: Option<Track>, index: Option<usize>, reason: impl Into<String>) -> Self {
        Self {
            phase: PlaybackPhase::Failed,
            track,
            index,
            detail: Some(reason.into()),
        }
    }

    /// One-line summary, e.g. `Playing: Title - Artist`
    pub fn headline(&self) -> String {
        match &self.track {
            Some(track) => format!("{}: {} - {}", self.phase.label(), track.title, track.artist),
            None => self.phase.label().to_string(),
        }
    }
}

/// Result of one progress sample.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressSnapshot {
    pub position: f64,
    pub duration: f64,
    pub volume: Option<f64>,
    pub paused: bool,
}

impl ProgressSnapshot {
    pub fn fraction(&self) -> f64 {
        progress_fraction(self.position, self.duration)
    }

    /// `MM:SS/MM:SS`
    pub fn time_text(&self) -> String {
        format!(
            "{}/{}",
            format_duration(self.position.max(0.0) as u64),
            format_duration(self.duration.max(0.0) as u64)
        )
    }

    /// `NN%`, or `??` when the volume could not be read
    pub fn volume_text(&self) -> String {
        match self.volume {
            Some(volume) => format!("{:.0}%", volume),
            None => "??".to_string(),
        }
    }

    pub fn bar(&self, width: usize) -> String {
        progress_bar(self.fraction(), width)
    }
}

/// Position over duration, clamped to `[0, 1]`. Zero when the duration is
/// unknown or either value is not a number.
pub fn progress_fraction(position: f64, duration: f64) -> f64 {
    if duration.is_nan() || duration <= 0.0 || position.is_nan() {
        return 0.0;
    }
    (position / duration).clamp(0.0, 1.0)
}

/// Fixed-width bar followed by the percentage, e.g. `▓▓▓░░░░ 42.0%`.
/// The fraction is clamped first so the bar never exceeds `width` cells.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let filled = ((fraction * width as f64) as usize).min(width);

    let mut bar = String::with_capacity(width * 3 + 8);
    bar.extend(std::iter::repeat_n(BAR_FILLED, filled));
    bar.extend(std::iter::repeat_n(BAR_EMPTY, width - filled));
    bar.push_str(&format!(" {:.1}%", fraction * 100.0));
    bar
}

/// Format whole seconds as `MM:SS`
pub fn format_duration(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(bar: &str) -> usize {
        bar.chars().filter(|c| *c == BAR_FILLED || *c == BAR_EMPTY).count()
    }

    #[test]
    fn fraction_is_clamped() {
        assert_eq!(progress_fraction(30.0, 60.0), 0.5);
        assert_eq!(progress_fraction(90.0, 60.0), 1.0);
        assert_eq!(progress_fraction(-5.0, 60.0), 0.0);
        assert_eq!(progress_fraction(10.0, 0.0), 0.0);
        assert_eq!(progress_fraction(10.0, -1.0), 0.0);
        assert_eq!(progress_fraction(f64::NAN, 60.0), 0.0);
        assert_eq!(progress_fraction(10.0, f64::NAN), 0.0);
    }

    #[test]
    fn bar_width_is_fixed() {
        for fraction in [-1.0, 0.0, 0.33, 1.0, 2.5, f64::NAN] {
            assert_eq!(cells(&progress_bar(fraction, 30)), 30);
        }
        assert!(progress_bar(2.5, 10).ends_with(" 100.0%"));
        assert!(progress_bar(-1.0, 10).ends_with(" 0.0%"));
    }

    #[test]
    fn bar_fills_proportionally() {
        let bar = progress_bar(0.5, 10);
        assert!(bar.starts_with("▓▓▓▓▓░░░░░"));
        assert!(bar.ends_with(" 50.0%"));
    }

    #[test]
    fn snapshot_text() {
        let snapshot = ProgressSnapshot {
            position: 75.4,
            duration: 200.0,
            volume: Some(65.0),
            paused: false,
        };
        assert_eq!(snapshot.time_text(), "01:15/03:20");
        assert_eq!(snapshot.volume_text(), "65%");

        let overrun = ProgressSnapshot {
            position: 250.0,
            volume: None,
            ..snapshot
        };
        assert_eq!(overrun.fraction(), 1.0);
        assert_eq!(overrun.volume_text(), "??");
    }

    #[test]
    fn headline_includes_phase_and_track() {
        let track = Track {
            title: "Song".into(),
            artist: "Band".into(),
            ..Default::default()
        };
        let status = NowPlaying::with_track(PlaybackPhase::Loading, track, 2);
        assert_eq!(status.headline(), "Loading...: Song - Band");
        assert_eq!(NowPlaying::idle().headline(), "Stopped");
    }
}
