use std::time::{Duration, Instant};

use crate::config::DEFAULT_DISPLACEMENT_DURATION;
use crate::context::DragSnapshot;
use crate::layout::{LayoutCache, LayoutEntry};

/// Quadratic ease-in-out on `0.0..=1.0`.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        let x = -2.0 * t + 2.0;
        1.0 - x * x / 2.0
    }
}

/// A numeric transition from `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlideAnimation {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
}

impl SlideAnimation {
    pub fn settled(value: f32, now: Instant) -> Self {
        Self {
            from: value,
            to: value,
            start: now,
            duration: Duration::ZERO,
        }
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.from == self.to || now.saturating_duration_since(self.start) >= self.duration
    }

    pub fn sample(&self, now: Instant) -> f32 {
        if self.is_done(now) {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.start);
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * ease_in_out(t)
    }

    /// Start a new transition from wherever the current one is at `now`.
    pub fn retarget(&mut self, to: f32, duration: Duration, now: Instant) {
        let from = if duration.is_zero() { to } else { self.sample(now) };
        *self = Self {
            from,
            to,
            start: now,
            duration,
        };
    }
}

/// What a row should draw this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellFrame {
    /// Offset along the list axis.
    pub offset: f32,
    pub is_active: bool,
    /// Paint above sibling rows.
    pub elevated: bool,
    /// The offset is still moving; hosts should schedule another frame.
    pub animating: bool,
}

/// Offset a non-active row should slide to so the active item fits at its
/// current target index.
pub fn displacement(
    index: usize,
    key: &str,
    snapshot: &DragSnapshot,
    layouts: &LayoutCache,
) -> f32 {
    let Some(active) = snapshot.active.as_ref() else {
        return 0.0;
    };
    if snapshot.reordering || active.key == key || !layouts.contains(key) {
        return 0.0;
    }
    let Some(active_entry) = layouts.get(&active.key) else {
        return 0.0;
    };

    let target = snapshot.pan_index;
    if target <= index && index <= active.index {
        active_entry.extent
    } else if active.index <= index && index <= target {
        -active_entry.extent
    } else {
        0.0
    }
}

/// Per-row drag state: decides between following the pointer and sliding out
/// of the way, and reports the row's layout.
#[derive(Clone, Debug)]
pub struct CellState {
    key: String,
    generation: u64,
    duration: Duration,
    slide: SlideAnimation,
}

impl CellState {
    pub fn new(key: impl Into<String>, generation: u64, now: Instant) -> Self {
        Self {
            key: key.into(),
            generation,
            duration: DEFAULT_DISPLACEMENT_DURATION,
            slide: SlideAnimation::settled(0.0, now),
        }
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record this row's layout, after giving `external` a look at it.
    pub fn report_layout(
        &self,
        layouts: &mut LayoutCache,
        entry: LayoutEntry,
        external: Option<&dyn Fn(&str, LayoutEntry)>,
    ) {
        if let Some(external) = external {
            external(&self.key, entry);
        }
        layouts.record(self.key.clone(), entry);
    }

    pub fn frame(
        &mut self,
        index: usize,
        snapshot: &DragSnapshot,
        layouts: &LayoutCache,
        now: Instant,
    ) -> CellFrame {
        if snapshot.generation != self.generation {
            self.generation = snapshot.generation;
            self.slide = SlideAnimation::settled(0.0, now);
        }

        if snapshot.is_active_key(&self.key) {
            return CellFrame {
                offset: snapshot.pan,
                is_active: true,
                elevated: true,
                animating: false,
            };
        }

        // While a reorder commits, the host may rebuild rows in any order;
        // keep whatever targets were set before.
        if !snapshot.reordering {
            let target = displacement(index, &self.key, snapshot, layouts);
            if target != self.slide.target() {
                let duration = if snapshot.is_dragging() {
                    self.duration
                } else {
                    Duration::ZERO
                };
                self.slide.retarget(target, duration, now);
            }
        }

        CellFrame {
            offset: self.slide.sample(now),
            is_active: false,
            elevated: false,
            animating: !self.slide.is_done(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ActiveDrag;
    use crate::layout::ScrollAxis;

    fn layouts(keys: &[&str], extent: f32) -> LayoutCache {
        let mut cache = LayoutCache::new();
        for (ix, key) in keys.iter().enumerate() {
            cache.record(*key, LayoutEntry::new(ix as f32 * extent, extent));
        }
        cache
    }

    fn dragging(key: &str, index: usize, target: usize) -> DragSnapshot {
        let mut snapshot = DragSnapshot::new(ScrollAxis::Vertical);
        snapshot.active = Some(ActiveDrag {
            key: key.into(),
            index,
        });
        snapshot.pan_index = target;
        snapshot
    }

    #[test]
    fn ease_in_out_is_symmetric_and_clamped() {
        assert_eq!(ease_in_out(-1.0), 0.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(ease_in_out(2.0), 1.0);
        assert!((ease_in_out(0.25) + ease_in_out(0.75) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rows_between_target_and_active_make_room() {
        let cache = layouts(&["a", "b", "c", "d", "e"], 10.0);

        // `a` dragged down to slot 3: b, c, d move up.
        let down = dragging("a", 0, 3);
        assert_eq!(displacement(1, "b", &down, &cache), -10.0);
        assert_eq!(displacement(3, "d", &down, &cache), -10.0);
        assert_eq!(displacement(4, "e", &down, &cache), 0.0);
        assert_eq!(displacement(0, "a", &down, &cache), 0.0);

        // `d` dragged up to slot 1: b, c move down.
        let up = dragging("d", 3, 1);
        assert_eq!(displacement(0, "a", &up, &cache), 0.0);
        assert_eq!(displacement(1, "b", &up, &cache), 10.0);
        assert_eq!(displacement(2, "c", &up, &cache), 10.0);
        assert_eq!(displacement(4, "e", &up, &cache), 0.0);
    }

    #[test]
    fn unmeasured_rows_and_commits_do_not_move() {
        let cache = layouts(&["a", "b"], 10.0);
        let snapshot = dragging("a", 0, 2);
        assert_eq!(displacement(2, "c", &snapshot, &cache), 0.0);

        let mut reordering = dragging("a", 0, 1);
        reordering.reordering = true;
        assert_eq!(displacement(1, "b", &reordering, &cache), 0.0);
    }

    #[test]
    fn displaced_row_animates_then_snaps_back_when_drag_ends() {
        let cache = layouts(&["a", "b", "c"], 10.0);
        let start = Instant::now();
        let mut cell = CellState::new("b", 0, start);

        let snapshot = dragging("a", 0, 2);
        let frame = cell.frame(1, &snapshot, &cache, start);
        assert!(frame.animating);
        assert_eq!(frame.offset, 0.0);

        let mid = cell.frame(1, &snapshot, &cache, start + Duration::from_millis(100));
        assert!(mid.offset < 0.0 && mid.offset > -10.0);

        let done = cell.frame(1, &snapshot, &cache, start + Duration::from_millis(250));
        assert_eq!(done.offset, -10.0);
        assert!(!done.animating);

        let idle = DragSnapshot::new(ScrollAxis::Vertical);
        let after = cell.frame(1, &idle, &cache, start + Duration::from_millis(260));
        assert_eq!(after.offset, 0.0);
        assert!(!after.animating);
    }

    #[test]
    fn active_row_follows_pan_and_is_elevated() {
        let cache = layouts(&["a", "b"], 10.0);
        let now = Instant::now();
        let mut cell = CellState::new("a", 0, now);
        let mut snapshot = dragging("a", 0, 1);
        snapshot.pan = 14.0;

        let frame = cell.frame(0, &snapshot, &cache, now);
        assert_eq!(
            frame,
            CellFrame {
                offset: 14.0,
                is_active: true,
                elevated: true,
                animating: false,
            }
        );
    }

    #[test]
    fn reordering_freezes_and_generation_change_resets() {
        let cache = layouts(&["a", "b", "c"], 10.0);
        let start = Instant::now();
        let mut cell = CellState::new("c", 0, start);

        let later = start + Duration::from_millis(300);
        let snapshot = dragging("a", 0, 2);
        cell.frame(2, &snapshot, &cache, start);
        assert_eq!(cell.frame(2, &snapshot, &cache, later).offset, -10.0);

        let mut committing = snapshot.clone();
        committing.reordering = true;
        committing.pan_index = 0;
        assert_eq!(cell.frame(2, &committing, &cache, later).offset, -10.0);

        committing.generation = 1;
        let frame = cell.frame(2, &committing, &cache, later);
        assert_eq!(frame.offset, 0.0);
        assert!(!frame.animating);
    }

    #[test]
    fn report_layout_calls_external_handler_before_recording() {
        use std::cell::RefCell;

        let now = Instant::now();
        let cell = CellState::new("a", 0, now);
        let mut cache = LayoutCache::new();
        let seen = RefCell::new(Vec::new());
        let external: &dyn Fn(&str, LayoutEntry) =
            &|key, entry| seen.borrow_mut().push((key.to_string(), entry));

        cell.report_layout(&mut cache, LayoutEntry::new(5.0, 20.0), Some(external));

        assert_eq!(
            seen.borrow().as_slice(),
            &[("a".to_string(), LayoutEntry::new(5.0, 20.0))]
        );
        assert_eq!(cache.get("a"), Some(LayoutEntry::new(5.0, 20.0)));
    }
}
