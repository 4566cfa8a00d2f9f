use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::layout::ScrollAxis;

/// The item being dragged and the index it was picked up from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDrag {
    pub key: String,
    pub index: usize,
}

/// Everything a row needs to know about the drag in progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragSnapshot {
    pub active: Option<ActiveDrag>,
    /// Offset applied to the active row along the axis.
    pub pan: f32,
    /// Index the active item would land on if dropped now.
    pub pan_index: usize,
    pub reordering: bool,
    pub axis: ScrollAxis,
    /// Bumped whenever the item sequence is replaced.
    pub generation: u64,
    /// Bumped on every write.
    pub version: u64,
}

impl DragSnapshot {
    pub fn new(axis: ScrollAxis) -> Self {
        Self {
            active: None,
            pan: 0.0,
            pan_index: 0,
            reordering: false,
            axis,
            generation: 0,
            version: 0,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_active_key(&self, key: &str) -> bool {
        self.active.as_ref().is_some_and(|active| active.key == key)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.as_ref().map(|active| active.index)
    }
}

/// Write side of the per-list drag state. Only the gesture controller holds one.
#[derive(Debug)]
pub(crate) struct DragContext {
    inner: Rc<RefCell<DragSnapshot>>,
}

impl DragContext {
    pub(crate) fn new(axis: ScrollAxis) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DragSnapshot::new(axis))),
        }
    }

    pub(crate) fn reader(&self) -> DragContextReader {
        DragContextReader {
            inner: Rc::clone(&self.inner),
        }
    }

    pub(crate) fn snapshot(&self) -> DragSnapshot {
        self.inner.borrow().clone()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&DragSnapshot) -> R) -> R {
        f(&self.inner.borrow())
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut DragSnapshot)) {
        let mut state = self.inner.borrow_mut();
        f(&mut state);
        state.version = state.version.wrapping_add(1);
    }
}

/// Read-only handle handed to rows.
#[derive(Clone, Debug)]
pub struct DragContextReader {
    inner: Rc<RefCell<DragSnapshot>>,
}

impl DragContextReader {
    pub fn snapshot(&self) -> DragSnapshot {
        self.inner.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&DragSnapshot) -> R) -> R {
        f(&self.inner.borrow())
    }

    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_observe_writes_and_version_bumps() {
        let context = DragContext::new(ScrollAxis::Vertical);
        let reader = context.reader();
        assert_eq!(reader.version(), 0);

        context.update(|state| {
            state.active = Some(ActiveDrag {
                key: "a".into(),
                index: 2,
            });
            state.pan_index = 2;
        });

        assert_eq!(reader.version(), 1);
        assert!(reader.read(|state| state.is_active_key("a")));
        assert_eq!(reader.snapshot().active_index(), Some(2));
        assert!(!reader.snapshot().is_active_key("b"));
    }
}
