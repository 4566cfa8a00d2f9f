mod host;
mod list;

pub use crate::host::ListScrollHost;
pub use crate::list::*;

pub use gpui_reorder_core::{LayoutEntry, ReorderConfig, ReorderEvent, ScrollAxis};
