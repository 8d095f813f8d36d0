use log::{error, info};
use reqwest::Url;
use snafu::Snafu;

use crate::{
    backend::{Backend, RequestError},
    util::{CHALLENGE_PATH, VALIDATION_PATH},
    view::{Navigator, VerificationView},
};

/// Why the server did not hand out a verification cookie. The display text is what
/// the error banner shows.
#[derive(Debug, Snafu)]
pub enum VerificationError {
    #[snafu(display("Ошибка проверки на сервере (Код: {status_code}). Попробуйте снова."))]
    ServerRejected { status_code: u16 },
    #[snafu(display(
        "Не удалось выполнить проверку. Проверьте ваше интернет-соединение и попробуйте снова."
    ))]
    NetworkOrClient { source: RequestError },
}

impl From<RequestError> for VerificationError {
    fn from(error: RequestError) -> Self {
        match error {
            RequestError::Status { status } => VerificationError::ServerRejected {
                status_code: status,
            },
            source => VerificationError::NetworkOrClient { source },
        }
    }
}

/// True for the page the server's challenge middleware redirects unverified clients to.
pub fn is_challenge_page(url: &Url) -> bool {
    url.path().starts_with(CHALLENGE_PATH) && !url.path().starts_with(VALIDATION_PATH)
}

/// The `next` query parameter, or `/` when it is absent or empty.
pub fn next_target(page_url: &Url) -> String {
    page_url
        .query_pairs()
        .find(|(name, _)| name == "next")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| String::from("/"))
}

pub struct VerificationRunner<'a, B: Backend> {
    backend: &'a B,
    page_url: Url,
}

impl<'a, B: Backend> VerificationRunner<'a, B> {
    pub fn new(backend: &'a B, page_url: Url) -> VerificationRunner<'a, B> {
        VerificationRunner { backend, page_url }
    }

    /// Performs the challenge once. On success the navigator is sent to the `next`
    /// target, which is also returned. Nothing is retried automatically.
    pub fn run<V, N>(&self, view: &mut V, navigator: &mut N) -> Result<String, VerificationError>
    where
        V: VerificationView,
        N: Navigator,
    {
        view.set_loader_visible(true);
        view.set_error_message(None);
        view.set_retry_visible(false);

        let csrf_token = self.backend.csrf_token();
        match self.backend.validate_browser(&csrf_token) {
            Ok(()) => {
                let next = next_target(&self.page_url);
                info!("Browser verified. Redirecting to: {}", next);
                navigator.navigate(&next);
                Ok(next)
            }
            Err(request_error) => {
                error!("Browser verification failed: {}", request_error);
                let verification_error = VerificationError::from(request_error);

                view.set_error_message(Some(&verification_error.to_string()));
                view.set_loader_visible(false);
                view.set_retry_visible(true);
                Err(verification_error)
            }
        }
    }

    /// What the retry button does.
    pub fn retry<V, N>(&self, view: &mut V, navigator: &mut N) -> Result<String, VerificationError>
    where
        V: VerificationView,
        N: Navigator,
    {
        info!("Retrying browser verification");
        self.run(view, navigator)
    }
}
