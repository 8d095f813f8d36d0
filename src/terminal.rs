use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use dialoguer::{theme::ColorfulTheme, Confirm};
use log::{debug, error, info};
use percent_encoding::percent_decode_str;
use regex::Regex;
use reqwest::{
    header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    Url,
};

use crate::{
    challenge::is_challenge_page,
    client::S3ManagerClient,
    util::{BROWSER_PATH, DOWNLOAD_FILE_PATH, LOGIN_PATH},
    view::{Dialogs, Navigator, SelectionView, TriState, VerificationView},
};

static FILENAME_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Default)]
pub struct TerminalView {
    retry_visible: bool,
}

impl TerminalView {
    pub fn retry_visible(&self) -> bool {
        self.retry_visible
    }
}

impl VerificationView for TerminalView {
    fn set_loader_visible(&mut self, visible: bool) {
        if visible {
            info!("Verifying browser...");
        }
    }

    fn set_error_message(&mut self, message: Option<&str>) {
        if let Some(message) = message {
            eprintln!("{}", message);
        }
    }

    fn set_retry_visible(&mut self, visible: bool) {
        self.retry_visible = visible;
    }
}

impl SelectionView for TerminalView {
    fn set_selected_count(&mut self, text: &str) {
        debug!("Selected: {}", text);
    }

    fn set_panel_active(&mut self, active: bool) {
        debug!("Action panel {}", if active { "active" } else { "hidden" });
    }

    fn set_actions_enabled(&mut self, _enabled: bool) {}

    fn set_select_all_state(&mut self, state: TriState) {
        debug!("Select all: {:?}", state);
    }
}

#[derive(Debug, Default)]
pub struct TerminalDialogs {
    assume_yes: bool,
    prompt_error: Option<dialoguer::Error>,
}

impl TerminalDialogs {
    pub fn new(assume_yes: bool) -> TerminalDialogs {
        TerminalDialogs {
            assume_yes,
            prompt_error: None,
        }
    }

    /// The error of the last confirmation that could not be read, if any.
    pub fn take_prompt_error(&mut self) -> Option<dialoguer::Error> {
        self.prompt_error.take()
    }

    pub(crate) fn record_answer(&mut self, answer: Result<bool, dialoguer::Error>) -> bool {
        match answer {
            Ok(answer) => answer,
            Err(err) => {
                error!("Could not read confirmation: {}", err);
                self.prompt_error = Some(err);
                false
            }
        }
    }
}

impl Dialogs for TerminalDialogs {
    fn alert(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            info!("{} yes", message);
            return true;
        }

        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(false)
            .interact();
        self.record_answer(answer)
    }
}

/// Follows navigations through the HTTP session and writes downloads to disk.
pub struct TerminalNavigator<'a> {
    client: &'a S3ManagerClient,
    output_dir: PathBuf,
    location: Option<Url>,
    reload_requested: bool,
    failed: bool,
}

impl<'a> TerminalNavigator<'a> {
    pub fn new(client: &'a S3ManagerClient, output_dir: PathBuf) -> TerminalNavigator<'a> {
        TerminalNavigator {
            client,
            output_dir,
            location: None,
            reload_requested: false,
            failed: false,
        }
    }

    /// Where the last navigation ended up after redirects.
    pub fn location(&self) -> Option<&Url> {
        self.location.as_ref()
    }

    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    fn fail(&mut self, message: String) {
        error!("{}", message);
        eprintln!("{}", message);
        self.failed = true;
    }
}

impl Navigator for TerminalNavigator<'_> {
    fn navigate(&mut self, target: &str) {
        let response = match self.client.resolve(target).and_then(|url| self.client.get(url)) {
            Ok(response) => response,
            Err(err) => return self.fail(format!("Navigation to {} failed: {}", target, err)),
        };
        let url = response.url().to_owned();
        info!("Navigated to {}", url);

        if target.starts_with(DOWNLOAD_FILE_PATH) {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok());
            if is_page_instead_of_file(self.client.base_url(), &url, content_type) {
                self.fail(format!(
                    "Download of {} failed: the server answered with the page {}",
                    target, url
                ));
                self.location = Some(url);
                return;
            }

            let disposition = response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let filename = download_filename(disposition.as_deref(), &url);
            match response.bytes() {
                Ok(contents) => self.save(&filename, &contents),
                Err(err) => self.fail(format!("Download of {} failed: {}", filename, err)),
            }
        }

        self.location = Some(url);
    }

    fn reload(&mut self) {
        self.reload_requested = true;
    }

    fn save(&mut self, filename: &str, contents: &[u8]) {
        let path = self.output_dir.join(filename);
        if let Err(err) = fs::create_dir_all(&self.output_dir) {
            return self.fail(format!("Could not create {}: {}", self.output_dir.display(), err));
        }
        match fs::write(&path, contents) {
            Ok(()) => println!("Saved {} ({} bytes)", path.display(), contents.len()),
            Err(err) => self.fail(format!("Could not write {}: {}", path.display(), err)),
        }
    }
}

/// A direct download that ends on one of the server's own HTML pages (the listing it
/// falls back to on errors, the login page, the browser challenge) carries no file.
pub fn is_page_instead_of_file(base_url: &Url, landed: &Url, content_type: Option<&str>) -> bool {
    if landed.origin() != base_url.origin() {
        return false;
    }

    let path = landed.path();
    path.starts_with(BROWSER_PATH)
        || path.starts_with(LOGIN_PATH)
        || is_challenge_page(landed)
        || content_type.is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("text/html"))
}

/// Name to store a direct download under: the `Content-Disposition` filename if the
/// server sent one, else the last path segment. Directory parts are always dropped.
pub fn download_filename(content_disposition: Option<&str>, url: &Url) -> String {
    let regex = FILENAME_REGEX.get_or_init(|| {
        Regex::new(r#"filename\*?=(?:UTF-8'')?"?(?<name>[^";]+)"?"#).expect("Could not parse regex")
    });

    let from_header = content_disposition
        .and_then(|value| regex.captures(value))
        .and_then(|captures| captures.name("name"))
        .map(|name| name.as_str().trim().to_string());
    let from_path = || {
        url.path_segments()
            .and_then(|segments| segments.filter(|segment| !segment.is_empty()).last())
            .map(str::to_string)
    };

    from_header
        .or_else(from_path)
        .map(|name| percent_decode_str(&name).decode_utf8_lossy().into_owned())
        .and_then(|name| {
            Path::new(&name)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| String::from("download"))
}
