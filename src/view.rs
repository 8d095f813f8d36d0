//! Named UI slots the components drive, plus the browser facilities they rely on.

/// "Select all" checkbox state derived from the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    All,
    Some,
    None,
}

/// The challenge page: loader, error banner and retry button.
pub trait VerificationView {
    fn set_loader_visible(&mut self, visible: bool);
    /// `None` hides the banner.
    fn set_error_message(&mut self, message: Option<&str>);
    fn set_retry_visible(&mut self, visible: bool);
}

/// The floating multi-action panel and the "select all" checkbox.
pub trait SelectionView {
    fn set_selected_count(&mut self, text: &str);
    fn set_panel_active(&mut self, active: bool);
    fn set_actions_enabled(&mut self, enabled: bool);
    fn set_select_all_state(&mut self, state: TriState);
}

/// Blocking dialogs.
pub trait Dialogs {
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, message: &str) -> bool;
}

pub trait Navigator {
    /// Leaves the current page for `target`, relative to the server root.
    fn navigate(&mut self, target: &str);
    fn reload(&mut self);
    /// Hands a downloaded blob to the user under `filename`.
    fn save(&mut self, filename: &str, contents: &[u8]);
}
