#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use gpui_reorder_core::{
    DragCallbacks, GestureController, LayoutEntry, ReorderConfig, ReorderEvent, ScrollHost,
};

/// A scroll container that applies scroll requests immediately.
pub struct FakeHost {
    pub offset: f32,
    pub max_offset: f32,
    pub container: LayoutEntry,
    pub scroll_requests: Vec<f32>,
}

impl FakeHost {
    pub fn new(container_pos: f32, container_extent: f32, content_extent: f32) -> Self {
        Self {
            offset: 0.0,
            max_offset: (content_extent - container_extent).max(0.0),
            container: LayoutEntry::new(container_pos, container_extent),
            scroll_requests: Vec::new(),
        }
    }
}

impl ScrollHost for FakeHost {
    fn scroll_offset(&self) -> f32 {
        self.offset
    }

    fn scroll_to_offset(&mut self, offset: f32) {
        self.scroll_requests.push(offset);
        self.offset = offset.min(self.max_offset);
    }

    fn measure_container(&self) -> Option<LayoutEntry> {
        Some(self.container)
    }
}

pub fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// A controller over `names`, every row measured with the same extent.
pub fn controller(names: &[&str], extent: f32) -> GestureController {
    let mut controller = GestureController::new(ReorderConfig::default());
    controller.set_keys(keys(names)).unwrap();
    measure(&controller, names, extent);
    controller
}

pub fn measure(controller: &GestureController, names: &[&str], extent: f32) {
    let layouts = controller.layouts();
    let mut layouts = layouts.borrow_mut();
    for (ix, name) in names.iter().enumerate() {
        layouts.record(*name, LayoutEntry::new(ix as f32 * extent, extent));
    }
}

/// Callbacks recording every reorder and splicing it into `items`.
pub fn recording_callbacks(
    items: Rc<RefCell<Vec<String>>>,
    calls: Rc<RefCell<Vec<(usize, usize)>>>,
) -> DragCallbacks {
    DragCallbacks::new().on_reordered(move |event: ReorderEvent| {
        calls.borrow_mut().push((event.from, event.to));
        gpui_reorder_core::apply_reorder(&mut items.borrow_mut(), &event);
        async { Ok(()) }
    })
}

/// Press the item at `index` at its center, then move it by `delta`.
pub fn drag(controller: &mut GestureController, host: &mut FakeHost, index: usize, delta: f32) {
    assert!(controller.begin_drag(index).unwrap());
    let key = controller.keys()[index].clone();
    let entry = controller.layouts().borrow().get(&key).unwrap();
    let origin = host.container.pos + entry.center() - host.offset;
    controller.on_grant(origin, host);
    controller.on_move(delta, host);
}
