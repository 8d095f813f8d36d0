use std::path::PathBuf;

use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Confirm, MultiSelect, Select};
use log::{info, warn};
use reqwest::Url;
use snafu::{whatever, OptionExt, ResultExt, Whatever};

use crate::{
    arguments::{Arguments, Command},
    challenge::{is_challenge_page, VerificationRunner},
    client::S3ManagerClient,
    config::Config,
    page::Page,
    preselect_setting::PreselectSetting,
    selection::{DeleteOutcome, DownloadOutcome, ItemKey, SelectionManager},
    session::resolve_session_id,
    terminal::{TerminalDialogs, TerminalNavigator, TerminalView},
    util::{browser_querypath, CHALLENGE_PATH},
};

mod arguments;
mod backend;
mod challenge;
mod client;
mod config;
mod csrf;
mod page;
mod preselect_setting;
mod selection;
mod session;
mod terminal;
#[cfg(test)]
mod test_server;
#[cfg(test)]
mod testing;
mod util;
mod view;

#[snafu::report]
fn main() -> Result<(), Whatever> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let arguments = Arguments::parse();
    let config = Config::load(&arguments.config)?;

    let base_url = arguments
        .base_url
        .or(config.base_url)
        .whatever_context("No server URL given, pass --base-url or set base_url in the config file")?;
    let base_url = Url::parse(&base_url)
        .with_whatever_context(|_| format!("Invalid server URL {}", base_url))?;
    let username = arguments.username.or(config.username);
    let output_dir = arguments
        .output_dir
        .or(config.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let client = S3ManagerClient::new(base_url).whatever_context("Unable to create HTTP client")?;
    if let Some(session_id) = resolve_session_id(
        arguments.session_id,
        username.as_deref(),
        arguments.store_session,
    )? {
        client.add_session_cookie(&session_id);
    }

    let mut navigator = TerminalNavigator::new(&client, output_dir);

    match arguments.command {
        Command::Verify { next } => {
            let mut page_url = client.url_for_querypath(CHALLENGE_PATH);
            if let Some(next) = next {
                page_url.query_pairs_mut().append_pair("next", &next);
            }
            verify(&client, page_url, &mut navigator)?;
            if let Some(location) = navigator.location() {
                println!("Verified, now at {}", location);
            }
        }
        Command::List { path } => {
            let page = open_listing(&client, &path, &mut navigator)?;
            print_listing(&page);
        }
        Command::Select { path, preselect } => {
            select_interactively(&client, &path, preselect, &mut navigator)?;
        }
        Command::Download { path, keys } => {
            let page = open_listing(&client, &path, &mut navigator)?;
            let mut manager = SelectionManager::new(&client, TerminalView::default(), page.items);
            select_keys(&mut manager, &keys)?;
            download(&manager, &mut navigator)?;
        }
        Command::Delete { path, keys, yes } => {
            let page = open_listing(&client, &path, &mut navigator)?;
            let mut manager = SelectionManager::new(&client, TerminalView::default(), page.items);
            select_keys(&mut manager, &keys)?;
            delete(&manager, yes, &mut navigator)?;
            if navigator.take_reload_request() {
                print_listing(&open_listing(&client, &path, &mut navigator)?);
            }
        }
    }

    Ok(())
}

/// Runs the browser challenge, offering a manual retry after every failure.
fn verify(
    client: &S3ManagerClient,
    page_url: Url,
    navigator: &mut TerminalNavigator,
) -> Result<(), Whatever> {
    let runner = VerificationRunner::new(client, page_url);
    let mut view = TerminalView::default();

    let mut result = runner.run(&mut view, navigator);
    while let Err(err) = &result {
        let retry = view.retry_visible()
            && Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Retry verification?")
                .default(true)
                .interact()
                .whatever_context("Unable to read answer")?;
        if !retry {
            whatever!("Browser verification failed: {}", err);
        }
        result = runner.retry(&mut view, navigator);
    }

    Ok(())
}

fn open_listing(
    client: &S3ManagerClient,
    path: &str,
    navigator: &mut TerminalNavigator,
) -> Result<Page, Whatever> {
    let querypath = browser_querypath(path);
    let (mut url, mut body) = client
        .get_page(&querypath)
        .with_whatever_context(|_| format!("Unable to load {}", querypath))?;

    if is_challenge_page(&url) {
        info!("Server requested browser verification");
        verify(client, url, navigator)?;

        (url, body) = client
            .get_page(&querypath)
            .with_whatever_context(|_| format!("Unable to load {}", querypath))?;
        if is_challenge_page(&url) {
            whatever!("Server still requires browser verification");
        }
    }

    if url.path() != querypath {
        warn!("Landed on {} instead of the listing, is the session valid?", url);
    }

    Ok(Page::parse(url, &body))
}

fn print_listing(page: &Page) {
    if page.items.is_empty() {
        println!("No items in {}", page.url.path());
    }
    for item in &page.items {
        println!("{}", item.key);
    }
}

fn select_keys(
    manager: &mut SelectionManager<S3ManagerClient, TerminalView>,
    keys: &[String],
) -> Result<(), Whatever> {
    manager.deselect_all();
    for key in keys {
        let item_key: ItemKey = key
            .parse()
            .with_whatever_context(|_| format!("Invalid item key {}", key))?;
        if !manager.toggle_key(&item_key, true) {
            warn!("{} is not listed on this page, skipping", item_key);
        }
    }
    Ok(())
}

fn download(
    manager: &SelectionManager<S3ManagerClient, TerminalView>,
    navigator: &mut TerminalNavigator,
) -> Result<(), Whatever> {
    let mut dialogs = TerminalDialogs::default();
    match manager.download_selected(&mut dialogs, navigator) {
        DownloadOutcome::NoFiles | DownloadOutcome::Failed => whatever!("Nothing was downloaded"),
        _ if navigator.failed() => whatever!("Download failed"),
        DownloadOutcome::Direct { target } => {
            info!("Fetched {}", target);
            Ok(())
        }
        DownloadOutcome::Archive { files } => {
            println!("Archived {} files", files);
            Ok(())
        }
    }
}

fn delete(
    manager: &SelectionManager<S3ManagerClient, TerminalView>,
    assume_yes: bool,
    navigator: &mut TerminalNavigator,
) -> Result<(), Whatever> {
    let mut dialogs = TerminalDialogs::new(assume_yes);
    let outcome = manager.delete_selected(&mut dialogs, navigator);
    finish_delete(outcome, &mut dialogs)
}

/// A confirmation that could not be asked is an error, not a "no".
fn finish_delete(outcome: DeleteOutcome, dialogs: &mut TerminalDialogs) -> Result<(), Whatever> {
    match outcome {
        DeleteOutcome::NothingSelected | DeleteOutcome::Failed => whatever!("Nothing was deleted"),
        DeleteOutcome::Declined => match dialogs.take_prompt_error() {
            Some(err) => whatever!("Could not ask for confirmation, nothing was deleted: {}", err),
            None => {
                println!("Cancelled");
                Ok(())
            }
        },
        DeleteOutcome::Deleted => Ok(()),
    }
}

fn select_interactively(
    client: &S3ManagerClient,
    path: &str,
    preselect: PreselectSetting,
    navigator: &mut TerminalNavigator,
) -> Result<(), Whatever> {
    let page = open_listing(client, path, navigator)?;
    if page.items.is_empty() {
        print_listing(&page);
        return Ok(());
    }

    let mut manager = SelectionManager::new(client, TerminalView::default(), page.items);
    let choices: Vec<(String, bool)> = manager
        .checkboxes()
        .iter()
        .map(|checkbox| (checkbox.key.to_string(), preselect.preselected(checkbox.checked)))
        .collect();

    let chosen = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Which items do you want to select")
        .items_checked(&choices)
        .interact()
        .whatever_context("Unable to read selection")?;
    for index in 0..choices.len() {
        manager.toggle(index, chosen.contains(&index));
    }
    println!("Selected {} of {}", manager.selected_count(), choices.len());

    let actions = ["Скачать выбранное", "Удалить выбранное", "Отмена"];
    let action = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Action")
        .items(&actions)
        .default(0)
        .interact()
        .whatever_context("Unable to read action")?;

    match action {
        0 => download(&manager, navigator)?,
        1 => {
            delete(&manager, false, navigator)?;
            if navigator.take_reload_request() {
                print_listing(&open_listing(client, path, navigator)?);
            }
        }
        _ => println!("Cancelled"),
    }

    Ok(())
}
