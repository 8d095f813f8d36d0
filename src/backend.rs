use snafu::Snafu;

use crate::csrf::csrf_token;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RequestError {
    #[snafu(display("{source}"))]
    Transport {
        #[snafu(source(from(reqwest::Error, Box::new)))]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[snafu(display("Server responded with status {status}"))]
    Status { status: u16 },
    #[snafu(display("Could not resolve {target} against the server URL"))]
    InvalidUrl { target: String },
}

/// The server endpoints the verification runner and the selection manager talk to.
pub trait Backend {
    /// Cookies visible to the current page, formatted like a `Cookie` header.
    fn cookie_string(&self) -> String;

    fn validate_browser(&self, csrf_token: &str) -> Result<(), RequestError>;

    fn download_multiple(&self, csrf_token: &str, files: &[String]) -> Result<Vec<u8>, RequestError>;

    fn delete_multiple(
        &self,
        csrf_token: &str,
        files: &[String],
        folders: &[String],
    ) -> Result<(), RequestError>;

    fn csrf_token(&self) -> String {
        csrf_token(&self.cookie_string())
    }
}
