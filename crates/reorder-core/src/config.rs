use std::time::Duration;

use crate::layout::ScrollAxis;

pub const DEFAULT_AUTO_SCROLL_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_DISPLACEMENT_DURATION: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReorderConfig {
    pub axis: ScrollAxis,
    /// Delay between two auto-scroll steps while the dragged item is held past an edge.
    pub auto_scroll_interval: Duration,
    /// How long displaced rows take to slide out of the way.
    pub displacement_duration: Duration,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            axis: ScrollAxis::Vertical,
            auto_scroll_interval: DEFAULT_AUTO_SCROLL_INTERVAL,
            displacement_duration: DEFAULT_DISPLACEMENT_DURATION,
        }
    }
}

impl ReorderConfig {
    pub fn axis(mut self, axis: ScrollAxis) -> Self {
        self.axis = axis;
        self
    }

    pub fn auto_scroll_interval(mut self, interval: Duration) -> Self {
        self.auto_scroll_interval = interval;
        self
    }

    pub fn displacement_duration(mut self, duration: Duration) -> Self {
        self.displacement_duration = duration;
        self
    }
}
