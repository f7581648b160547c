use std::process::{Child, Command, Stdio};

use tracing::warn;

/// Out-of-band display of a single image reference.
pub trait PreviewWindow {
    /// Opens the preview, or reuses it if already open, showing `image_ref`.
    fn open(&mut self, image_ref: &str);
    /// Replaces the displayed image. Does nothing once the preview is closed.
    fn show(&mut self, image_ref: &str);
    fn close(&mut self);
    fn is_open(&self) -> bool;
}

/// Preview drawn as a pane inside the terminal, optionally mirrored to an
/// external viewer command that receives the image reference as its argument.
/// At most one viewer runs at a time.
#[derive(Debug, Default)]
pub struct PreviewPane {
    image_ref: Option<String>,
    command: Option<String>,
    viewer: Option<Child>,
}

impl PreviewPane {
    pub fn new(command: Option<String>) -> Self {
        Self {
            image_ref: None,
            command: command.filter(|c| !c.trim().is_empty()),
            viewer: None,
        }
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }

    /// Process id of the running external viewer.
    pub fn viewer_pid(&self) -> Option<u32> {
        self.viewer.as_ref().map(Child::id)
    }

    fn launch_external(&mut self, image_ref: &str) {
        let Some(command) = self.command.clone() else {
            return;
        };
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return;
        };
        self.stop_external();
        let spawned = Command::new(program)
            .args(parts)
            .arg(image_ref)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => self.viewer = Some(child),
            Err(err) => warn!(%command, error = %err, "could not launch preview command"),
        }
    }

    /// Kills and reaps the running viewer.
    fn stop_external(&mut self) {
        let Some(mut child) = self.viewer.take() else {
            return;
        };
        // fails when the viewer already exited; wait reaps it either way
        let _ = child.kill();
        if let Err(err) = child.wait() {
            warn!(pid = child.id(), error = %err, "could not reap preview command");
        }
    }
}

impl PreviewWindow for PreviewPane {
    fn open(&mut self, image_ref: &str) {
        self.image_ref = Some(image_ref.to_string());
        self.launch_external(image_ref);
    }

    fn show(&mut self, image_ref: &str) {
        if !self.is_open() || self.image_ref.as_deref() == Some(image_ref) {
            return;
        }
        self.image_ref = Some(image_ref.to_string());
        self.launch_external(image_ref);
    }

    fn close(&mut self) {
        self.image_ref = None;
        self.stop_external();
    }

    fn is_open(&self) -> bool {
        self.image_ref.is_some()
    }
}

impl Drop for PreviewPane {
    fn drop(&mut self) {
        self.stop_external();
    }
}
