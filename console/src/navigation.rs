//! Back-button navigation

use serde::Serialize;
use tracing::debug;

/// Page history as seen by the console
pub trait Navigator: Send + Sync {
    /// Number of entries in the session history, current page included
    fn history_len(&self) -> usize;

    fn back(&mut self);

    fn navigate(&mut self, path: &str);
}

/// In-memory session history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionHistory {
    entries: Vec<String>,
}

impl SessionHistory {
    /// A history holding only `current`
    pub fn new<S: Into<String>>(current: S) -> Self {
        Self {
            entries: vec![current.into()],
        }
    }

    /// The page being shown
    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }
}

impl Navigator for SessionHistory {
    fn history_len(&self) -> usize {
        self.entries.len()
    }

    fn back(&mut self) {
        if self.entries.len() > 1 {
            self.entries.pop();
        }
    }

    fn navigate(&mut self, path: &str) {
        self.entries.push(path.to_string());
    }
}

/// Where a press of the back button led
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    WentBack,
    WentHome,
}

pub struct BackButton;

impl BackButton {
    /// Go back when there is somewhere to go, else to the site root
    pub fn press(navigator: &mut dyn Navigator) -> BackAction {
        if navigator.history_len() > 1 {
            navigator.back();
            debug!("Navigated back");
            BackAction::WentBack
        } else {
            navigator.navigate("/");
            debug!("No history, navigated home");
            BackAction::WentHome
        }
    }
}
