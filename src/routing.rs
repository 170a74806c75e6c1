//! Route parsing: `/page/subpage/action` paths decide which screen the
//! console mounts, the same surface the platform's other clients use
//! for deep links.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("empty route")]
pub struct ParseRouteError;

/// A parsed route with named segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub page: String,
    pub subpage: Option<String>,
    pub action: Option<String>,
}

impl Route {
    pub fn new(page: &str) -> Self {
        Self {
            page: page.to_string(),
            subpage: None,
            action: None,
        }
    }

    pub fn with_subpage(mut self, subpage: &str) -> Self {
        self.subpage = Some(subpage.to_string());
        self
    }

    /// Which screen this route mounts, if it maps to one
    pub fn screen(&self) -> Option<Screen> {
        match (self.page.as_str(), self.subpage.as_deref()) {
            ("home", _) | ("dashboard", _) => Some(Screen::Dashboard),
            ("signup", _) => Some(Screen::Signup),
            ("promon", Some("signup")) => Some(Screen::Signup),
            ("schedules", _) => Some(Screen::Schedules),
            _ => None,
        }
    }
}

impl Default for Route {
    fn default() -> Self {
        Route::new("home")
    }
}

impl FromStr for Route {
    type Err = ParseRouteError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let mut segments = path.trim().trim_matches('/').split('/').filter(|s| !s.is_empty());
        let page = segments.next().ok_or(ParseRouteError)?;
        Ok(Route {
            page: page.to_string(),
            subpage: segments.next().map(String::from),
            action: segments.next().map(String::from),
        })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.page)?;
        if let Some(subpage) = &self.subpage {
            write!(f, "/{subpage}")?;
        }
        if let Some(action) = &self.action {
            write!(f, "/{action}")?;
        }
        Ok(())
    }
}

/// Top-level screens the console can mount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Signup,
    Schedules,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let route: Route = "/promon/signup/resume".parse().unwrap();
        assert_eq!(route.page, "promon");
        assert_eq!(route.subpage.as_deref(), Some("signup"));
        assert_eq!(route.action.as_deref(), Some("resume"));
        assert_eq!(route.to_string(), "/promon/signup/resume");
    }

    #[test]
    fn test_parse_tolerates_missing_segments_and_slashes() {
        let route: Route = "home".parse().unwrap();
        assert_eq!(route.page, "home");
        assert!(route.subpage.is_none());

        let route: Route = "/schedules/".parse().unwrap();
        assert_eq!(route.page, "schedules");

        assert!("".parse::<Route>().is_err());
        assert!("///".parse::<Route>().is_err());
    }

    #[test]
    fn test_screen_mapping() {
        assert_eq!(Route::new("home").screen(), Some(Screen::Dashboard));
        assert_eq!(Route::new("signup").screen(), Some(Screen::Signup));
        assert_eq!(
            Route::new("promon").with_subpage("signup").screen(),
            Some(Screen::Signup)
        );
        assert_eq!(Route::new("schedules").screen(), Some(Screen::Schedules));
        assert_eq!(Route::new("nonsense").screen(), None);
    }
}
