//! Cameras subsystem panel state

use crate::client::Attributes;

use super::{attr_bool, attr_len, attr_u64};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CamerasSummary {
    pub available: bool,
    pub total: usize,
    pub offline: usize,
    /// Clips recorded in the last day, if the platform reports it
    pub recent_recordings: Option<u64>,
}

impl CamerasSummary {
    pub fn from_attributes(attrs: Option<&Attributes>) -> Self {
        Self {
            available: attr_bool(attrs, "subcameras:available").unwrap_or(false),
            total: attr_len(attrs, "subcameras:cameras"),
            offline: attr_len(attrs, "subcameras:offlineCameras"),
            recent_recordings: attr_u64(attrs, "subcameras:recentRecordings"),
        }
    }

    pub fn online(&self) -> usize {
        self.total.saturating_sub(self.offline)
    }

    pub fn status_line(&self) -> String {
        if !self.available {
            return "No cameras".to_string();
        }
        let mut line = format!("{}/{} online", self.online(), self.total);
        if let Some(clips) = self.recent_recordings {
            line.push_str(&format!(" • {clips} clips today"));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_online_count() {
        let attrs: Attributes = [
            ("subcameras:available".to_string(), json!(true)),
            (
                "subcameras:cameras".to_string(),
                json!(["c1", "c2", "c3"]),
            ),
            ("subcameras:offlineCameras".to_string(), json!(["c2"])),
        ]
        .into_iter()
        .collect();

        let summary = CamerasSummary::from_attributes(Some(&attrs));
        assert_eq!(summary.online(), 2);
        assert_eq!(summary.status_line(), "2/3 online");
    }
}
