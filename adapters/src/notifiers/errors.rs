use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    /// Transport failure. The request URL is stripped: it carries the bot
    /// token or the webhook secret.
    #[error("http error: {0}")]
    Http(reqwest::Error),

    #[error("{channel} rejected message with status {status}: {body}")]
    Rejected {
        channel: &'static str,
        status: u16,
        body: String,
    },
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Http(e.without_url())
    }
}
