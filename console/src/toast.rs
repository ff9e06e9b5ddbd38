//! Transient outcome banner

use serde::Serialize;

/// Banner tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastTone {
    Success,
    Failure,
}

/// Toast view state. `html` is trusted markup and is never escaped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub visible: bool,
    pub tone: Option<ToastTone>,
    pub html: String,
}

impl Toast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reveal an empty banner
    pub fn clear(&mut self) {
        self.visible = true;
        self.tone = None;
        self.html.clear();
    }
}

/// Paints toasts
pub struct ToastNotifier;

impl ToastNotifier {
    /// Paint `html` with the tone picked by `success`
    pub fn notify<S: Into<String>>(toast: &mut Toast, success: bool, html: S) {
        toast.visible = true;
        toast.tone = Some(if success {
            ToastTone::Success
        } else {
            ToastTone::Failure
        });
        toast.html = html.into();
    }
}
