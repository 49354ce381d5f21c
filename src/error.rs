use reqwest::StatusCode;
use thiserror::Error;

/// The message shown to the user whenever a page could not be loaded.
pub const FETCH_FAILED_MESSAGE: &str = "Error fetching data. Please try again later.";

#[derive(Debug, Error)]
pub enum Error {
  #[error("Network error: {0}")]
  Network(#[from] reqwest::Error),

  #[error("Failed to fetch data: {0}")]
  UnexpectedStatus(StatusCode),

  #[error("Failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("Invalid api url: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("Page numbers start at 1, got {0}")]
  InvalidPage(u32),
}

impl Error {
  /// Every fetch failure collapses into a single user facing message, the detail goes to the log.
  pub fn user_message(&self) -> String {
    String::from(FETCH_FAILED_MESSAGE)
  }
}
