//! Timeline arithmetic over an ordered clip list

use serde::{Deserialize, Serialize};

use crate::clip::{ClipPlacement, ClipRecord};

/// A clip with its offset in the composed video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub clip: ClipRecord,
    /// Seconds from the start of the video, the sum of all preceding durations
    pub start: f64,
    /// Seconds
    pub duration: f64,
    pub placement: ClipPlacement,
}

impl TimelineEntry {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Sum of the clip durations in seconds
pub fn total_duration(clips: &[ClipRecord]) -> f64 {
    clips.iter().map(ClipRecord::duration).sum()
}

/// Lay clips back to back: each clip starts where the previous one ends
pub fn to_timeline(clips: &[ClipRecord]) -> Vec<TimelineEntry> {
    let len = clips.len();
    clips
        .iter()
        .enumerate()
        .scan(0.0, |start, (index, clip)| {
            let entry = TimelineEntry {
                clip: clip.clone(),
                start: *start,
                duration: clip.duration(),
                placement: ClipPlacement::for_index(index, len),
            };
            *start += clip.duration();
            Some(entry)
        })
        .collect()
}

/// Format a duration as `HH : MM : SS`, rounded to the nearest second
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    format!("{hours:02} : {minutes:02} : {secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(id: &str, duration: f64) -> ClipRecord {
        ClipRecord::new(id, duration).unwrap()
    }

    #[test]
    fn test_total_duration() {
        assert_eq!(total_duration(&[clip("a", 10.0), clip("b", 5.5)]), 15.5);
        assert_eq!(total_duration(&[]), 0.0);
    }

    #[test]
    fn test_timeline_is_gapless() {
        let timeline = to_timeline(&[clip("a", 3.0), clip("b", 4.0), clip("c", 2.0)]);

        let starts: Vec<(&str, f64)> = timeline.iter().map(|e| (e.clip.id(), e.start)).collect();
        assert_eq!(starts, vec![("a", 0.0), ("b", 3.0), ("c", 7.0)]);
        for pair in timeline.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start);
        }
        assert_eq!(timeline[0].placement, ClipPlacement::Start);
        assert_eq!(timeline[1].placement, ClipPlacement::Middle);
        assert_eq!(timeline[2].placement, ClipPlacement::End);
        assert!(to_timeline(&[]).is_empty());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00 : 00 : 00");
        assert_eq!(format_duration(59.6), "00 : 01 : 00");
        assert_eq!(format_duration(3725.0), "01 : 02 : 05");
        assert_eq!(format_duration(f64::NAN), "00 : 00 : 00");
    }
}
