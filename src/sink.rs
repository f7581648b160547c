use tracing::info;

use crate::error::Result;
use crate::models::{Completion, FrameId};

/// Receives the selection of a finished review.
pub trait SelectionSink {
    fn submit(&mut self, completion: &Completion) -> Result<()>;
}

/// Writes the completion as a structured log record and keeps the latest one
/// so it can be printed after the terminal is restored.
#[derive(Debug, Default)]
pub struct LogSink {
    last: Option<Completion>,
}

impl LogSink {
    pub fn last(&self) -> Option<&Completion> {
        self.last.as_ref()
    }
}

impl SelectionSink for LogSink {
    fn submit(&mut self, completion: &Completion) -> Result<()> {
        let record = serde_json::to_string(completion)?;
        info!(
            task_id = %completion.task_id,
            selected = completion.selected.len(),
            %record,
            "selection submitted"
        );
        self.last = Some(completion.clone());
        Ok(())
    }
}

/// Comma separated ids, the format used for the summary popup and clipboard.
pub fn format_ids(ids: &[FrameId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
