//! Offset-minutes editor for sunrise/sunset-relative schedule events.
//!
//! The platform stores a single signed offset; the editor exposes the
//! magnitude and a before/after flag the way the schedule form shows it.

use crate::scheduling::TimeMode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OffsetMinutes {
    offset_minutes: i32,
}

impl OffsetMinutes {
    pub fn new(offset_minutes: i32) -> Self {
        Self { offset_minutes }
    }

    /// The signed platform value
    pub fn offset_minutes(&self) -> i32 {
        self.offset_minutes
    }

    /// Magnitude shown in the spinner
    pub fn offset_minutes_abs(&self) -> u32 {
        self.offset_minutes.unsigned_abs()
    }

    /// True when the event fires before sunrise/sunset
    pub fn offset_before(&self) -> bool {
        self.offset_minutes < 0
    }

    pub fn set_abs(&mut self, abs: u32) {
        let abs = abs.min(i32::MAX as u32) as i32;
        self.offset_minutes = if self.offset_before() { -abs } else { abs };
    }

    pub fn set_before(&mut self, before: bool) {
        let abs = self.offset_minutes.abs();
        self.offset_minutes = if before { -abs } else { abs };
    }

    /// `5 minutes before sunset` style display
    pub fn display(&self, mode: TimeMode) -> String {
        let anchor = match mode {
            TimeMode::Sunrise => "sunrise",
            TimeMode::Sunset => "sunset",
            TimeMode::Absolute => return String::new(),
        };
        if self.offset_minutes == 0 {
            return format!("at {anchor}");
        }
        let direction = if self.offset_before() {
            "before"
        } else {
            "after"
        };
        format!(
            "{} minutes {direction} {anchor}",
            self.offset_minutes_abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_offset_is_before() {
        let offset = OffsetMinutes::new(-5);
        assert_eq!(offset.offset_minutes_abs(), 5);
        assert!(offset.offset_before());
    }

    #[test]
    fn test_positive_offset_is_after() {
        let offset = OffsetMinutes::new(15);
        assert_eq!(offset.offset_minutes_abs(), 15);
        assert!(!offset.offset_before());
    }

    #[test]
    fn test_direction_flip_keeps_magnitude() {
        let mut offset = OffsetMinutes::new(-5);
        offset.set_before(false);
        assert_eq!(offset.offset_minutes(), 5);
        offset.set_before(true);
        assert_eq!(offset.offset_minutes(), -5);
    }

    #[test]
    fn test_set_abs_keeps_direction() {
        let mut offset = OffsetMinutes::new(-5);
        offset.set_abs(20);
        assert_eq!(offset.offset_minutes(), -20);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            OffsetMinutes::new(-5).display(TimeMode::Sunset),
            "5 minutes before sunset"
        );
        assert_eq!(
            OffsetMinutes::new(10).display(TimeMode::Sunrise),
            "10 minutes after sunrise"
        );
        assert_eq!(OffsetMinutes::new(0).display(TimeMode::Sunset), "at sunset");
    }
}
