use reqwest::Url;

pub const VALIDATION_PATH: &str = "/browser-challenge/validate/";
pub const CHALLENGE_PATH: &str = "/browser-challenge/";
pub const BROWSER_PATH: &str = "/s3app/browser/";
pub const LOGIN_PATH: &str = "/login/";
pub const DOWNLOAD_FILE_PATH: &str = "/s3app/download-file/";
pub const DOWNLOAD_MULTIPLE_PATH: &str = "/download-multiple/";
pub const DELETE_MULTIPLE_PATH: &str = "/delete-multiple/";

pub trait Querypath {
    fn set_querypath(&mut self, querypath: &str);
}

impl Querypath for Url {
    fn set_querypath(&mut self, querypath: &str) {
        let (path, query) = match querypath.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (querypath, None),
        };
        self.set_path(path);
        self.set_query(query);
    }
}

/// Listing page for a server-relative folder path, `""` being the root.
pub fn browser_querypath(path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        BROWSER_PATH.to_string()
    } else {
        format!("{}{}/", BROWSER_PATH, path)
    }
}

/// Paths are interpolated as-is; the server resolves them.
pub fn download_file_querypath(path: &str) -> String {
    format!("{}{}", DOWNLOAD_FILE_PATH, path)
}
