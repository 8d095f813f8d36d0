use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use log::{debug, error, info};
use snafu::{OptionExt, Snafu};

use crate::{
    backend::{Backend, RequestError},
    util::download_file_querypath,
    view::{Dialogs, Navigator, SelectionView, TriState},
};

pub const NO_FILES_TO_DOWNLOAD: &str = "Выберите хотя бы один файл для скачивания";
pub const NOTHING_TO_DELETE: &str = "Выберите хотя бы один элемент для удаления";
pub const ARCHIVE_FAILED: &str = "Ошибка при создании архива";
pub const DELETE_FAILED: &str = "Ошибка при удалении элементов";
pub const ARCHIVE_FILENAME: &str = "files.zip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemKind {
    File,
    Folder,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::File => "file",
            ItemKind::Folder => "folder",
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Snafu)]
pub enum ParseItemKeyError {
    #[snafu(display("Item key {key:?} has no kind prefix"))]
    MissingSeparator { key: String },
    #[snafu(display("Unknown item kind {kind:?}, expected file or folder"))]
    UnknownKind { kind: String },
}

impl FromStr for ItemKind {
    type Err = ParseItemKeyError;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "file" => Ok(ItemKind::File),
            "folder" => Ok(ItemKind::Folder),
            _ => UnknownKindSnafu { kind }.fail(),
        }
    }
}

/// `{kind}:{path}`, identifying one selectable row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub kind: ItemKind,
    pub path: String,
}

impl ItemKey {
    pub fn new(kind: ItemKind, path: impl Into<String>) -> ItemKey {
        ItemKey {
            kind,
            path: path.into(),
        }
    }
}

impl Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.path)
    }
}

impl FromStr for ItemKey {
    type Err = ParseItemKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        // Paths may themselves contain ':'.
        let (kind, path) = key.split_once(':').context(MissingSeparatorSnafu { key })?;
        Ok(ItemKey::new(kind.parse()?, path))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkbox {
    pub key: ItemKey,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    NoFiles,
    Direct { target: String },
    Archive { files: usize },
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    NothingSelected,
    Declined,
    Deleted,
    Failed,
}

pub fn confirmation_message(file_count: usize, folder_count: usize) -> String {
    let mut message = String::from("Вы уверены, что хотите удалить ");
    if file_count > 0 && folder_count > 0 {
        message += &format!("{} файл(ов) и {} папку(папок)?", file_count, folder_count);
    } else if file_count > 0 {
        message += &format!("{} файл(ов)?", file_count);
    } else {
        message += &format!("{} папку(папок) и всё их содержимое?", folder_count);
    }
    message
}

/// Multi-select state of one listing page.
///
/// Every mutation updates the checkboxes and the selection set together and then
/// pushes the derived panel state to the view, so both always agree.
pub struct SelectionManager<'a, B: Backend, V: SelectionView> {
    backend: &'a B,
    view: V,
    checkboxes: Vec<Checkbox>,
    /// Ordered by kind, then path. Posted paths follow this order, not click order.
    selected: BTreeSet<ItemKey>,
}

impl<'a, B: Backend, V: SelectionView> SelectionManager<'a, B, V> {
    pub fn new(backend: &'a B, view: V, checkboxes: Vec<Checkbox>) -> SelectionManager<'a, B, V> {
        let mut seen = BTreeSet::new();
        let checkboxes: Vec<Checkbox> = checkboxes
            .into_iter()
            .filter(|checkbox| {
                let fresh = seen.insert(checkbox.key.clone());
                if !fresh {
                    debug!("Ignoring duplicate checkbox for {}", checkbox.key);
                }
                fresh
            })
            .collect();
        let selected = checkboxes
            .iter()
            .filter(|checkbox| checkbox.checked)
            .map(|checkbox| checkbox.key.clone())
            .collect();

        let mut manager = SelectionManager {
            backend,
            view,
            checkboxes,
            selected,
        };
        manager.update_panel();
        manager
    }

    pub fn checkboxes(&self) -> &[Checkbox] {
        &self.checkboxes
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    #[cfg(test)]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn tri_state(&self) -> TriState {
        let count = self.selected.len();
        if count > 0 && count == self.checkboxes.len() {
            TriState::All
        } else if count > 0 {
            TriState::Some
        } else {
            TriState::None
        }
    }

    fn update_panel(&mut self) {
        let count = self.selected.len();
        self.view.set_selected_count(&count.to_string());

        let active = count > 0;
        self.view.set_panel_active(active);
        self.view.set_actions_enabled(active);

        if !self.checkboxes.is_empty() {
            let state = self.tri_state();
            self.view.set_select_all_state(state);
        }
    }

    fn apply(&mut self, index: usize, checked: bool) {
        let checkbox = &mut self.checkboxes[index];
        checkbox.checked = checked;
        if checked {
            self.selected.insert(checkbox.key.clone());
        } else {
            self.selected.remove(&checkbox.key);
        }
    }

    /// A single item checkbox changed. Returns false for an unknown index.
    pub fn toggle(&mut self, index: usize, checked: bool) -> bool {
        if index >= self.checkboxes.len() {
            return false;
        }
        self.apply(index, checked);
        self.update_panel();
        true
    }

    pub fn toggle_key(&mut self, key: &ItemKey, checked: bool) -> bool {
        match self.checkboxes.iter().position(|checkbox| &checkbox.key == key) {
            Some(index) => self.toggle(index, checked),
            None => false,
        }
    }

    /// The "select all" checkbox changed.
    pub fn set_all(&mut self, checked: bool) {
        for index in 0..self.checkboxes.len() {
            self.apply(index, checked);
        }
        self.update_panel();
    }

    pub fn select_all(&mut self) {
        self.set_all(true);
    }

    pub fn deselect_all(&mut self) {
        for checkbox in &mut self.checkboxes {
            checkbox.checked = false;
        }
        self.selected.clear();
        self.update_panel();
    }

    fn selected_paths(&self, kind: ItemKind) -> Vec<String> {
        self.selected
            .iter()
            .filter(|key| key.kind == kind)
            .map(|key| key.path.clone())
            .collect()
    }

    /// One file is fetched directly, several are bundled by the server into an archive.
    pub fn download_selected<D, N>(&self, dialogs: &mut D, navigator: &mut N) -> DownloadOutcome
    where
        D: Dialogs,
        N: Navigator,
    {
        let files = self.selected_paths(ItemKind::File);

        match files.as_slice() {
            [] => {
                dialogs.alert(NO_FILES_TO_DOWNLOAD);
                DownloadOutcome::NoFiles
            }
            [path] => {
                let target = download_file_querypath(path);
                info!("Downloading single file from {}", target);
                navigator.navigate(&target);
                DownloadOutcome::Direct { target }
            }
            _ => {
                let csrf_token = self.backend.csrf_token();
                match self.backend.download_multiple(&csrf_token, &files) {
                    Ok(archive) => {
                        info!("Received archive of {} files ({} bytes)", files.len(), archive.len());
                        navigator.save(ARCHIVE_FILENAME, &archive);
                        DownloadOutcome::Archive { files: files.len() }
                    }
                    Err(request_error) => {
                        error!("Archive request failed: {}", request_error);
                        dialogs.alert(&failure_text(&request_error, ARCHIVE_FAILED));
                        DownloadOutcome::Failed
                    }
                }
            }
        }
    }

    /// Asks for confirmation, then deletes every selected file and folder. The selection
    /// is left untouched unless the server accepted the request.
    pub fn delete_selected<D, N>(&self, dialogs: &mut D, navigator: &mut N) -> DeleteOutcome
    where
        D: Dialogs,
        N: Navigator,
    {
        if self.selected.is_empty() {
            dialogs.alert(NOTHING_TO_DELETE);
            return DeleteOutcome::NothingSelected;
        }

        let files = self.selected_paths(ItemKind::File);
        let folders = self.selected_paths(ItemKind::Folder);

        if !dialogs.confirm(&confirmation_message(files.len(), folders.len())) {
            debug!("Deletion declined");
            return DeleteOutcome::Declined;
        }

        let csrf_token = self.backend.csrf_token();
        match self.backend.delete_multiple(&csrf_token, &files, &folders) {
            Ok(()) => {
                info!("Deleted {} files and {} folders", files.len(), folders.len());
                navigator.reload();
                DeleteOutcome::Deleted
            }
            Err(request_error) => {
                error!("Delete request failed: {}", request_error);
                dialogs.alert(&failure_text(&request_error, DELETE_FAILED));
                DeleteOutcome::Failed
            }
        }
    }
}

/// Rejections get the fixed message, anything thrown on the way shows its own text.
fn failure_text(request_error: &RequestError, rejected: &str) -> String {
    match request_error {
        RequestError::Status { .. } => rejected.to_string(),
        other => other.to_string(),
    }
}
