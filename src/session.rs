use dialoguer::{theme::ColorfulTheme, Password};
use keyring::Entry;
use log::{debug, info, warn};
use snafu::{ResultExt, Whatever};

const KEYRING_SERVICE: &str = "s3_manager_client";

/// Finds the session cookie to present to the server.
///
/// An explicit value wins. Otherwise the keyring entry for `username` is used, and
/// failing that the user is prompted. An empty answer means browsing anonymously,
/// in which case the server will answer with its login page.
pub fn resolve_session_id(
    explicit: Option<String>,
    username: Option<&str>,
    store: bool,
) -> Result<Option<String>, Whatever> {
    let keyring_entry = match username {
        Some(username) => Some(
            Entry::new(KEYRING_SERVICE, username)
                .whatever_context("Unable to open keyring entry")?,
        ),
        None => None,
    };

    let session_id = match explicit {
        Some(session_id) => session_id,
        None => {
            let stored = keyring_entry.as_ref().and_then(|entry| match entry.get_password() {
                Ok(session_id) => Some(session_id),
                Err(keyring::Error::NoEntry) => None,
                Err(err) => {
                    warn!("Could not read session from keyring: {}", err);
                    None
                }
            });

            match stored {
                Some(session_id) => {
                    debug!("Using session stored in keyring");
                    return Ok(Some(session_id));
                }
                None => Password::with_theme(&ColorfulTheme::default())
                    .with_prompt("Session id (leave empty to continue without one)")
                    .allow_empty_password(true)
                    .interact()
                    .whatever_context("Unable to read session id")?,
            }
        }
    };

    if session_id.is_empty() {
        return Ok(None);
    }

    if store {
        match &keyring_entry {
            Some(entry) => {
                entry
                    .set_password(&session_id)
                    .whatever_context("Unable to store session in keyring")?;
                info!("Stored session in keyring");
            }
            None => warn!("Not storing session: no username given"),
        }
    }

    Ok(Some(session_id))
}
