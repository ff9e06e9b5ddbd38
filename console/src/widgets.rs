//! View-state building blocks shared by the console features

use serde::Serialize;

/// Label shown while a provisioning request is in flight
pub const BUSY_LABEL: &str = "Provisioning…";

/// Label after a successful provisioning run
pub const SUCCESS_LABEL: &str = "Provisioned ✓";

/// Label after a failed provisioning run
pub const RETRY_LABEL: &str = "Provision (retry)";

/// Health signal shown by a status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorState {
    /// Never painted
    Unknown,
    Ok,
    Down,
    /// The status request itself failed
    Error,
}

/// CSS class applied to an indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndicatorStyle {
    #[serde(rename = "status-ok")]
    Ok,
    #[serde(rename = "status-bad")]
    Bad,
}

impl IndicatorStyle {
    pub fn class_name(&self) -> &'static str {
        match self {
            IndicatorStyle::Ok => "status-ok",
            IndicatorStyle::Bad => "status-bad",
        }
    }
}

/// An element whose text and style reflect a boolean health signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Indicator {
    pub state: IndicatorState,
}

impl Indicator {
    pub fn new() -> Self {
        Self {
            state: IndicatorState::Unknown,
        }
    }

    /// Paint a health signal: `true` is OK, `false` is DOWN
    pub fn paint(&mut self, healthy: bool) {
        self.state = if healthy {
            IndicatorState::Ok
        } else {
            IndicatorState::Down
        };
    }

    pub fn paint_error(&mut self) {
        self.state = IndicatorState::Error;
    }

    pub fn text(&self) -> &'static str {
        match self.state {
            IndicatorState::Unknown => "…",
            IndicatorState::Ok => "OK",
            IndicatorState::Down => "DOWN",
            IndicatorState::Error => "error",
        }
    }

    pub fn style(&self) -> Option<IndicatorStyle> {
        match self.state {
            IndicatorState::Unknown => None,
            IndicatorState::Ok => Some(IndicatorStyle::Ok),
            IndicatorState::Down | IndicatorState::Error => Some(IndicatorStyle::Bad),
        }
    }
}

impl Default for Indicator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of an actionable button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Idle,
    Busy,
    Success,
    ErrorRetry,
}

impl ButtonState {
    /// Only a busy button is disabled
    pub fn is_disabled(&self) -> bool {
        matches!(self, ButtonState::Busy)
    }
}

/// A button whose label and `disabled` flag are governed by its state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub state: ButtonState,
    pub label: String,
    pub disabled: bool,
    idle_label: String,
}

impl Button {
    pub fn new<S: Into<String>>(label: S) -> Self {
        let label = label.into();
        Self {
            state: ButtonState::Idle,
            label: label.clone(),
            disabled: false,
            idle_label: label,
        }
    }

    /// Move to `state`, updating the label and the disabled flag
    pub fn transition(&mut self, state: ButtonState) {
        self.state = state;
        self.disabled = state.is_disabled();
        self.label = match state {
            ButtonState::Idle => self.idle_label.clone(),
            ButtonState::Busy => BUSY_LABEL.to_string(),
            ButtonState::Success => SUCCESS_LABEL.to_string(),
            ButtonState::ErrorRetry => RETRY_LABEL.to_string(),
        };
    }
}

/// A block of text that stays hidden until there is something to show
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Panel {
    pub visible: bool,
    pub text: String,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reveal the panel with `text`
    pub fn show<S: Into<String>>(&mut self, text: S) {
        self.visible = true;
        self.text = text.into();
    }
}
