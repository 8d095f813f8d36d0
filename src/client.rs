use std::sync::Arc;

use log::debug;
use reqwest::{
    blocking::{multipart::Form, Client, Response},
    cookie::{CookieStore, Jar},
    Url,
};
use serde_json::json;
use snafu::{OptionExt, ResultExt};

use crate::{
    backend::{Backend, InvalidUrlSnafu, RequestError, StatusSnafu, TransportSnafu},
    util::{Querypath, DELETE_MULTIPLE_PATH, DOWNLOAD_MULTIPLE_PATH, VALIDATION_PATH},
};

pub const SESSION_COOKIE_NAME: &str = "sessionid";

/// Blocking HTTP session against one S3 manager deployment.
///
/// All requests share a cookie jar, so the verification cookie set by the challenge
/// endpoint and the CSRF cookie set by rendered pages are sent on every later request.
#[derive(Debug)]
pub struct S3ManagerClient {
    client: Client,
    cookie_jar: Arc<Jar>,
    base_url: Url,
}

impl S3ManagerClient {
    pub fn new(base_url: Url) -> Result<S3ManagerClient, RequestError> {
        let cookie_jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(cookie_jar.clone())
            .build()
            .context(TransportSnafu)?;

        Ok(S3ManagerClient {
            client,
            cookie_jar,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn add_session_cookie(&self, session_id: &str) {
        let cookie = format!("{}={}; Path=/", SESSION_COOKIE_NAME, session_id);
        self.cookie_jar.add_cookie_str(&cookie, &self.base_url);
    }

    pub fn url_for_querypath(&self, querypath: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_querypath(querypath);
        url
    }

    /// Resolves a navigation target the way a browser resolves `location.href`.
    pub fn resolve(&self, target: &str) -> Result<Url, RequestError> {
        self.base_url
            .join(target)
            .ok()
            .context(InvalidUrlSnafu { target })
    }

    pub fn get(&self, url: Url) -> Result<Response, RequestError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().context(TransportSnafu)?;
        check_status(response)
    }

    /// Fetches a page and returns the URL it finally landed on together with its body.
    pub fn get_page(&self, querypath: &str) -> Result<(Url, String), RequestError> {
        let response = self.get(self.url_for_querypath(querypath))?;
        let url = response.url().to_owned();
        let body = response.text().context(TransportSnafu)?;
        Ok((url, body))
    }

    fn post_querypath_multipart(
        &self,
        querypath: &str,
        csrf_token: &str,
        form: Form,
    ) -> Result<Response, RequestError> {
        let url = self.url_for_querypath(querypath);
        debug!("POST {} (multipart)", url);

        let response = self
            .client
            .post(url)
            .header("X-CSRFToken", csrf_token)
            .multipart(form)
            .send()
            .context(TransportSnafu)?;
        check_status(response)
    }
}

fn check_status(response: Response) -> Result<Response, RequestError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        debug!("{} answered {}", response.url(), status);
        StatusSnafu {
            status: status.as_u16(),
        }
        .fail()
    }
}

impl Backend for S3ManagerClient {
    fn cookie_string(&self) -> String {
        self.cookie_jar
            .cookies(&self.base_url)
            .and_then(|header| header.to_str().ok().map(str::to_owned))
            .unwrap_or_default()
    }

    fn validate_browser(&self, csrf_token: &str) -> Result<(), RequestError> {
        let url = self.url_for_querypath(VALIDATION_PATH);
        debug!("POST {} (browser challenge)", url);

        let response = self
            .client
            .post(url)
            .header("X-CSRFToken", csrf_token)
            .header("X-Requested-With", "XMLHttpRequest")
            .json(&json!({ "verification_signal": "running_js" }))
            .send()
            .context(TransportSnafu)?;
        check_status(response)?;
        Ok(())
    }

    fn download_multiple(&self, csrf_token: &str, files: &[String]) -> Result<Vec<u8>, RequestError> {
        let form = files
            .iter()
            .fold(Form::new(), |form, path| form.text("files[]", path.clone()));

        let response = self.post_querypath_multipart(DOWNLOAD_MULTIPLE_PATH, csrf_token, form)?;
        let archive = response.bytes().context(TransportSnafu)?;
        Ok(archive.to_vec())
    }

    fn delete_multiple(
        &self,
        csrf_token: &str,
        files: &[String],
        folders: &[String],
    ) -> Result<(), RequestError> {
        let mut form = Form::new();
        for path in files {
            form = form.text("files[]", path.clone());
        }
        for path in folders {
            form = form.text("folders[]", path.clone());
        }

        self.post_querypath_multipart(DELETE_MULTIPLE_PATH, csrf_token, form)?;
        Ok(())
    }
}
