use std::cell::RefCell;

use crate::{
    backend::{Backend, RequestError},
    view::{Dialogs, Navigator, SelectionView, TriState, VerificationView},
};

#[derive(Debug, Clone, Copy, Default)]
pub enum Reply {
    #[default]
    Ok,
    Status(u16),
    Transport(&'static str),
}

impl Reply {
    fn result(self) -> Result<(), RequestError> {
        match self {
            Reply::Ok => Ok(()),
            Reply::Status(status) => Err(RequestError::Status { status }),
            Reply::Transport(message) => Err(RequestError::Transport {
                source: message.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Validate {
        csrf_token: String,
    },
    DownloadMultiple {
        csrf_token: String,
        files: Vec<String>,
    },
    DeleteMultiple {
        csrf_token: String,
        files: Vec<String>,
        folders: Vec<String>,
    },
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub cookies: String,
    pub validate: Reply,
    pub download: Reply,
    pub delete: Reply,
    pub archive: Vec<u8>,
    pub calls: RefCell<Vec<Call>>,
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl Backend for FakeBackend {
    fn cookie_string(&self) -> String {
        self.cookies.clone()
    }

    fn validate_browser(&self, csrf_token: &str) -> Result<(), RequestError> {
        self.calls.borrow_mut().push(Call::Validate {
            csrf_token: csrf_token.to_string(),
        });
        self.validate.result()
    }

    fn download_multiple(&self, csrf_token: &str, files: &[String]) -> Result<Vec<u8>, RequestError> {
        self.calls.borrow_mut().push(Call::DownloadMultiple {
            csrf_token: csrf_token.to_string(),
            files: files.to_vec(),
        });
        self.download.result().map(|()| self.archive.clone())
    }

    fn delete_multiple(
        &self,
        csrf_token: &str,
        files: &[String],
        folders: &[String],
    ) -> Result<(), RequestError> {
        self.calls.borrow_mut().push(Call::DeleteMultiple {
            csrf_token: csrf_token.to_string(),
            files: files.to_vec(),
            folders: folders.to_vec(),
        });
        self.delete.result()
    }
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub loader_visible: bool,
    pub error_message: Option<String>,
    pub retry_visible: bool,
    pub selected_count: String,
    pub panel_active: bool,
    pub actions_enabled: bool,
    pub select_all: Option<TriState>,
}

impl VerificationView for RecordingView {
    fn set_loader_visible(&mut self, visible: bool) {
        self.loader_visible = visible;
    }

    fn set_error_message(&mut self, message: Option<&str>) {
        self.error_message = message.map(str::to_string);
    }

    fn set_retry_visible(&mut self, visible: bool) {
        self.retry_visible = visible;
    }
}

impl SelectionView for RecordingView {
    fn set_selected_count(&mut self, text: &str) {
        self.selected_count = text.to_string();
    }

    fn set_panel_active(&mut self, active: bool) {
        self.panel_active = active;
    }

    fn set_actions_enabled(&mut self, enabled: bool) {
        self.actions_enabled = enabled;
    }

    fn set_select_all_state(&mut self, state: TriState) {
        self.select_all = Some(state);
    }
}

#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    pub answer: bool,
    pub alerts: Vec<String>,
    pub confirmations: Vec<String>,
}

impl Dialogs for ScriptedDialogs {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirmations.push(message.to_string());
        self.answer
    }
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub navigations: Vec<String>,
    pub reloads: usize,
    pub saved: Vec<(String, Vec<u8>)>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, target: &str) {
        self.navigations.push(target.to_string());
    }

    fn reload(&mut self) {
        self.reloads += 1;
    }

    fn save(&mut self, filename: &str, contents: &[u8]) {
        self.saved.push((filename.to_string(), contents.to_vec()));
    }
}
