use log::debug;
use percent_encoding::percent_decode_str;

pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Looks up `name` in a `Cookie`-style string (`a=1; b=2`).
///
/// Entries are split on `;` and trimmed, then split at the first `=`. The value is
/// percent-decoded. Returns `None` when no entry carries that exact name.
pub fn get_cookie(cookie_string: &str, name: &str) -> Option<String> {
    cookie_string
        .split(';')
        .map(str::trim)
        .filter_map(|cookie| cookie.split_once('='))
        .find(|(cookie_name, _)| *cookie_name == name)
        .map(|(_, value)| percent_decode_str(value).decode_utf8_lossy().into_owned())
}

/// The anti-forgery token, or an empty string when the cookie is missing.
pub fn csrf_token(cookie_string: &str) -> String {
    get_cookie(cookie_string, CSRF_COOKIE_NAME).unwrap_or_else(|| {
        debug!("No {} cookie present, sending empty token", CSRF_COOKIE_NAME);
        String::new()
    })
}
