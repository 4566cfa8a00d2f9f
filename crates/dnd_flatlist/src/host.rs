use gpui::{Bounds, Pixels, px};
use gpui_component::VirtualListScrollHandle;
use gpui_reorder_core::{LayoutEntry, ScrollAxis, ScrollHost};

/// [`ScrollHost`] backed by a `gpui-component` virtual list.
///
/// gpui stores scroll offsets as a negative translation of the content; the
/// gesture controller works with positive distances from the content start.
pub struct ListScrollHost<'a> {
    handle: &'a VirtualListScrollHandle,
    axis: ScrollAxis,
    container: Option<Bounds<Pixels>>,
    max_offset: f32,
}

impl<'a> ListScrollHost<'a> {
    pub fn new(handle: &'a VirtualListScrollHandle, axis: ScrollAxis) -> Self {
        Self {
            handle,
            axis,
            container: None,
            max_offset: f32::INFINITY,
        }
    }

    /// Window bounds of the scroll container, as last painted.
    pub fn container(mut self, bounds: Option<Bounds<Pixels>>) -> Self {
        self.container = bounds;
        self
    }

    /// Largest offset the content can be scrolled to.
    pub fn max_offset(mut self, max_offset: f32) -> Self {
        self.max_offset = max_offset.max(0.0);
        self
    }
}

impl ScrollHost for ListScrollHost<'_> {
    fn scroll_offset(&self) -> f32 {
        let offset = self.handle.offset();
        -f32::from(self.axis.pick(offset.x, offset.y))
    }

    fn scroll_to_offset(&mut self, offset: f32) {
        let offset = offset.clamp(0.0, self.max_offset);
        let mut current = self.handle.offset();
        match self.axis {
            ScrollAxis::Vertical => current.y = px(-offset),
            ScrollAxis::Horizontal => current.x = px(-offset),
        }
        self.handle.set_offset(current);
    }

    fn measure_container(&self) -> Option<LayoutEntry> {
        let bounds = self.container?;
        Some(LayoutEntry::along(
            self.axis,
            bounds.origin.x.into(),
            bounds.origin.y.into(),
            bounds.size.width.into(),
            bounds.size.height.into(),
        ))
    }
}
