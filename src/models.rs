use std::collections::HashSet;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{FramesiftError, Result};

/// Stable identifier of a frame within a task.
pub type FrameId = i64;

/// One reviewable image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub id: FrameId,
    #[serde(rename = "url")]
    pub image_ref: String,
    #[serde(default)]
    pub marked: bool,
}

impl Frame {
    pub fn new(id: FrameId, image_ref: impl Into<String>) -> Self {
        Self {
            id,
            image_ref: image_ref.into(),
            marked: false,
        }
    }

    pub fn marked(mut self) -> Self {
        self.marked = true;
        self
    }
}

/// A review task as delivered by the task source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "task_id")]
    pub id: String,
    #[serde(rename = "task_title")]
    pub title: String,
    pub frames: Vec<Frame>,
}

impl Task {
    /// Rejects tasks the engine cannot page through consistently.
    pub fn validate(&self) -> Result<()> {
        if self.frames.is_empty() {
            return Err(FramesiftError::invalid_task(format!(
                "task {} has no frames",
                self.id
            )));
        }
        let mut seen = HashSet::with_capacity(self.frames.len());
        for frame in &self.frames {
            if !seen.insert(frame.id) {
                return Err(FramesiftError::invalid_task(format!(
                    "task {} lists frame {} more than once",
                    self.id, frame.id
                )));
            }
        }
        Ok(())
    }
}

/// The output of a finished review session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub task_id: String,
    pub selected: Vec<FrameId>,
    pub completed_at: DateTime<Local>,
}

/// Summary popup shown after the last page was saved.
#[derive(Debug, Default)]
pub struct CompletionPopup {
    pub visible: bool,
    pub text: String,
}
