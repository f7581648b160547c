use std::fmt;
use std::path::PathBuf;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{FramesiftError, Result};
use crate::models::Task;

/// Where the task JSON comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSource {
    Http(String),
    File(PathBuf),
}

impl TaskSource {
    /// URLs with an http(s) scheme are fetched; anything else is a file path,
    /// with `~` expanded.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Http(location.to_string())
        } else {
            Self::File(PathBuf::from(shellexpand::tilde(location).into_owned()))
        }
    }

    /// Reads and validates the task. No retries.
    pub async fn fetch(&self, client: &Client) -> Result<Task> {
        debug!(source = %self, "fetching task");
        let task: Task = match self {
            Self::Http(url) => {
                client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?
            }
            Self::File(path) => {
                let raw = tokio::fs::read_to_string(path).await?;
                serde_json::from_str(&raw)?
            }
        };
        task.validate()?;
        Ok(task)
    }

    /// Like [`TaskSource::fetch`], but gives up as soon as `cancel` fires.
    pub async fn fetch_until_cancelled(&self, client: &Client, cancel: CancellationToken) -> Result<Task> {
        tokio::select! {
            _ = cancel.cancelled() => Err(FramesiftError::Cancelled),
            result = self.fetch(client) => result,
        }
    }
}

impl fmt::Display for TaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
