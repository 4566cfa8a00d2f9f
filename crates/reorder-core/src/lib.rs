mod cell;
mod commit;
mod config;
mod context;
mod error;
mod gesture;
mod layout;

pub use crate::cell::*;
pub use crate::commit::*;
pub use crate::config::*;
pub use crate::context::{ActiveDrag, DragContextReader, DragSnapshot};
pub use crate::error::*;
pub use crate::gesture::*;
pub use crate::layout::*;
