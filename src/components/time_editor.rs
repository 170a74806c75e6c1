//! 12-hour time editor backing schedule event forms.
//!
//! The platform stores times as 24-hour `HH:MM:SS`; the editor exposes
//! the display parts a user actually dials: hour 1–12, two minute
//! digits, AM/PM.

use chrono::NaiveTime;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unparseable time `{0}`, expected HH:MM:SS")]
pub struct ParseTimeError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeEditor {
    /// Display hour, 1–12
    pub hour: u8,
    /// Tens digit of the minute, 0–5
    pub minute_tens: u8,
    /// Ones digit of the minute, 0–9
    pub minute_ones: u8,
    pub is_pm: bool,
}

impl Default for TimeEditor {
    fn default() -> Self {
        // 6:00 PM, the common schedule starting point
        Self {
            hour: 6,
            minute_tens: 0,
            minute_ones: 0,
            is_pm: true,
        }
    }
}

impl TimeEditor {
    /// Parse a platform `HH:MM:SS` string into display parts
    pub fn parse(text: &str) -> Result<Self, ParseTimeError> {
        let time = NaiveTime::parse_from_str(text, "%H:%M:%S")
            .map_err(|_| ParseTimeError(text.to_string()))?;
        Ok(Self::from_time(time))
    }

    pub fn from_time(time: NaiveTime) -> Self {
        use chrono::Timelike;
        let hour24 = time.hour();
        let hour = match hour24 % 12 {
            0 => 12,
            h => h as u8,
        };
        Self {
            hour,
            minute_tens: (time.minute() / 10) as u8,
            minute_ones: (time.minute() % 10) as u8,
            is_pm: hour24 >= 12,
        }
    }

    pub fn minute(&self) -> u8 {
        self.minute_tens * 10 + self.minute_ones
    }

    fn hour24(&self) -> u32 {
        let base = u32::from(self.hour % 12);
        if self.is_pm {
            base + 12
        } else {
            base
        }
    }

    pub fn to_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour24(), u32::from(self.minute()), 0)
            .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).expect("midnight exists"))
    }

    /// Recompose the platform `HH:MM:SS` string
    pub fn to_time_string(&self) -> String {
        self.to_time().format("%H:%M:%S").to_string()
    }

    /// `4:31 PM` style display
    pub fn display(&self) -> String {
        format!(
            "{}:{}{} {}",
            self.hour,
            self.minute_tens,
            self.minute_ones,
            if self.is_pm { "PM" } else { "AM" }
        )
    }

    pub fn increment_hour(&mut self) {
        self.hour = if self.hour == 12 { 1 } else { self.hour + 1 };
    }

    pub fn decrement_hour(&mut self) {
        self.hour = if self.hour == 1 { 12 } else { self.hour - 1 };
    }

    pub fn increment_minute(&mut self) {
        let next = (u32::from(self.minute()) + 1) % 60;
        self.minute_tens = (next / 10) as u8;
        self.minute_ones = (next % 10) as u8;
    }

    pub fn decrement_minute(&mut self) {
        let prev = (u32::from(self.minute()) + 59) % 60;
        self.minute_tens = (prev / 10) as u8;
        self.minute_ones = (prev % 10) as u8;
    }

    pub fn toggle_meridiem(&mut self) {
        self.is_pm = !self.is_pm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_afternoon_time_into_parts() {
        let editor = TimeEditor::parse("16:31:00").unwrap();
        assert_eq!(editor.hour, 4);
        assert_eq!(editor.minute_tens, 3);
        assert_eq!(editor.minute_ones, 1);
        assert!(editor.is_pm);
    }

    #[test]
    fn test_noon_and_midnight_edges() {
        let noon = TimeEditor::parse("12:00:00").unwrap();
        assert_eq!(noon.hour, 12);
        assert!(noon.is_pm);

        let midnight = TimeEditor::parse("00:30:00").unwrap();
        assert_eq!(midnight.hour, 12);
        assert!(!midnight.is_pm);
        assert_eq!(midnight.minute(), 30);
    }

    #[test]
    fn test_recomposes_platform_string() {
        let editor = TimeEditor::parse("16:31:00").unwrap();
        assert_eq!(editor.to_time_string(), "16:31:00");
        assert_eq!(editor.display(), "4:31 PM");

        let midnight = TimeEditor::parse("00:05:00").unwrap();
        assert_eq!(midnight.to_time_string(), "00:05:00");
    }

    #[test]
    fn test_hour_wraps_without_crossing_meridiem() {
        let mut editor = TimeEditor::parse("12:00:00").unwrap();
        editor.increment_hour();
        assert_eq!(editor.hour, 1);
        assert!(editor.is_pm);

        editor.decrement_hour();
        editor.decrement_hour();
        assert_eq!(editor.hour, 11);
    }

    #[test]
    fn test_minute_wraps() {
        let mut editor = TimeEditor::parse("08:59:00").unwrap();
        editor.increment_minute();
        assert_eq!(editor.minute(), 0);
        editor.decrement_minute();
        assert_eq!(editor.minute(), 59);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(TimeEditor::parse("4:31 PM").is_err());
        assert!(TimeEditor::parse("25:00:00").is_err());
    }
}
