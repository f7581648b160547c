//! Page through a large ordered set of image frames in the terminal and mark
//! ranges of them as selected.
//!
//! The core is split in two: [`windower`] decides how many frames fit on a
//! page from the measured layout and slices the frame list, and [`selection`]
//! keeps the per-frame `marked` flags and the selected-id set in step across
//! clicks, two-click ranges, bulk operations and right-click run deselection.
//! [`session`] ties both to task loading and page advance; the remaining
//! modules are the terminal front-end around it.

pub mod app;
pub mod coalesce;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod network;
pub mod preview;
pub mod selection;
pub mod session;
pub mod sink;
pub mod theme;
pub mod ui;
pub mod viewport;
pub mod width;
pub mod windower;

pub use error::{FramesiftError, Result};
pub use models::{Frame, FrameId, Task};
