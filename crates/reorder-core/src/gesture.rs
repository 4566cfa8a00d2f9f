use std::cell::Cell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::ReorderConfig;
use crate::context::{ActiveDrag, DragContext, DragContextReader, DragSnapshot};
use crate::error::{ReorderError, Result};
use crate::layout::{LayoutCache, LayoutEntry, SharedLayoutCache, resolve_target_index};

pub type ReorderFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>>>>;

/// What the gesture controller needs from the scroll container.
///
/// Offsets are measured along the list axis, `0` being the start of the content.
pub trait ScrollHost {
    fn scroll_offset(&self) -> f32;

    fn scroll_to_offset(&mut self, offset: f32);

    /// Absolute position and size of the scroll container along the axis.
    ///
    /// Called on every gesture grant: the container may have moved without
    /// being resized, which not every host reports as a layout change.
    fn measure_container(&self) -> Option<LayoutEntry>;
}

/// A committed move: `from` is the index the item was picked up at, `to` the
/// index it should be inserted at, in `0..=len` (`len` meaning "at the end").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderEvent {
    pub key: String,
    pub from: usize,
    pub to: usize,
}

/// Callbacks invoked by the controller.
///
/// The controller keeps a single copy and always calls the one currently set,
/// so replacing them with [`GestureController::set_callbacks`] takes effect for
/// gestures already in flight.
#[derive(Clone, Default)]
pub struct DragCallbacks {
    on_drag_begin: Option<Rc<dyn Fn()>>,
    on_drag_end: Option<Rc<dyn Fn()>>,
    on_hover_changed: Option<Rc<dyn Fn(usize)>>,
    on_reordered: Option<Rc<dyn Fn(ReorderEvent) -> ReorderFuture>>,
}

impl DragCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_drag_begin(mut self, f: impl Fn() + 'static) -> Self {
        self.on_drag_begin = Some(Rc::new(f));
        self
    }

    pub fn on_drag_end(mut self, f: impl Fn() + 'static) -> Self {
        self.on_drag_end = Some(Rc::new(f));
        self
    }

    pub fn on_hover_changed(mut self, f: impl Fn(usize) + 'static) -> Self {
        self.on_hover_changed = Some(Rc::new(f));
        self
    }

    /// Set the callback that applies a reorder to the caller's data.
    ///
    /// The list resets its drag state only once the returned future settles.
    pub fn on_reordered<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ReorderEvent) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.on_reordered = Some(Rc::new(move |event| Box::pin(f(event)) as ReorderFuture));
        self
    }

    pub(crate) fn reordered(&self) -> Option<Rc<dyn Fn(ReorderEvent) -> ReorderFuture>> {
        self.on_reordered.clone()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Dragging,
    Committing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoScrollDirection {
    Backward,
    Forward,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoScroll {
    pub direction: AutoScrollDirection,
    /// Distance scrolled per step: the dragged item's own extent.
    pub step: f32,
}

/// Result of releasing a gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Release {
    /// Nothing moved; the drag state was already reset.
    Reset,
    /// The item moved. The list is now reordering until
    /// [`GestureController::finish_commit`] runs.
    Commit(ReorderEvent),
    /// A previous reorder is still committing; nothing was touched.
    Busy,
}

#[derive(Clone, Copy, Debug)]
struct Gesture {
    touch_origin: f32,
    delta: f32,
    baseline_scroll: f32,
    container: LayoutEntry,
    center_offset: f32,
}

impl Gesture {
    /// Touch position relative to the container start.
    fn wrap_pos(&self) -> f32 {
        self.touch_origin + self.delta - self.container.pos
    }
}

/// Drag-to-reorder state machine for one list.
pub struct GestureController {
    config: ReorderConfig,
    context: DragContext,
    layouts: SharedLayoutCache,
    keys: Vec<String>,
    callbacks: DragCallbacks,
    gesture: Option<Gesture>,
    auto_scroll: Option<AutoScroll>,
    /// Set by a commit that settled while the controller was borrowed.
    settle_pending: Rc<Cell<bool>>,
}

impl GestureController {
    pub fn new(config: ReorderConfig) -> Self {
        Self {
            context: DragContext::new(config.axis),
            config,
            layouts: LayoutCache::shared(),
            keys: Vec::new(),
            callbacks: DragCallbacks::default(),
            gesture: None,
            auto_scroll: None,
            settle_pending: Rc::default(),
        }
    }

    pub fn callbacks(mut self, callbacks: DragCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn set_callbacks(&mut self, callbacks: DragCallbacks) {
        self.callbacks = callbacks;
    }

    pub(crate) fn callbacks_ref(&self) -> &DragCallbacks {
        &self.callbacks
    }

    pub(crate) fn settle_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.settle_pending)
    }

    /// Run a [`Self::finish_commit`] that could not run when its commit
    /// settled. Every mutating entry point calls this first.
    pub fn settle_deferred(&mut self) {
        if self.settle_pending.replace(false) {
            log::debug!("settling a deferred reorder");
            self.finish_commit();
        }
    }

    fn is_committing(&self) -> bool {
        !self.settle_pending.get() && self.context.read(|state| state.reordering)
    }

    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn layouts(&self) -> SharedLayoutCache {
        Rc::clone(&self.layouts)
    }

    pub fn context(&self) -> DragContextReader {
        self.context.reader()
    }

    pub fn snapshot(&self) -> DragSnapshot {
        self.context.snapshot()
    }

    pub fn generation(&self) -> u64 {
        self.context.read(|state| state.generation)
    }

    /// Replace the item keys with a new sequence and bump the generation.
    pub fn set_keys(&mut self, keys: Vec<String>) -> Result<()> {
        self.settle_deferred();
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(keys.len());
        for (ix, key) in keys.iter().enumerate() {
            if let Some(first) = seen.insert(key.as_str(), ix) {
                return Err(ReorderError::DuplicateKey {
                    key: key.clone(),
                    first,
                    second: ix,
                });
            }
        }

        let snapshot = self.context.snapshot();
        let relocated = snapshot
            .active
            .as_ref()
            .map(|active| keys.iter().position(|key| *key == active.key));
        self.keys = keys;

        match relocated {
            Some(None) => {
                log::debug!("active item left the list, dropping the drag");
                self.context.update(|state| state.generation += 1);
                self.reset();
            }
            Some(Some(index)) => {
                let len = self.keys.len();
                self.context.update(|state| {
                    state.generation += 1;
                    if state.reordering {
                        // The new sequence already contains the drop.
                        state.pan = 0.0;
                    } else if let Some(active) = state.active.as_mut() {
                        active.index = index;
                        state.pan_index = state.pan_index.min(len);
                    }
                });
            }
            None => self.context.update(|state| state.generation += 1),
        }
        Ok(())
    }

    pub fn pipeline_state(&self) -> PipelineState {
        if self.settle_pending.get() {
            return PipelineState::Idle;
        }
        self.context.read(|state| {
            if state.reordering {
                PipelineState::Committing
            } else if state.active.is_some() {
                PipelineState::Dragging
            } else {
                PipelineState::Idle
            }
        })
    }

    /// Whether this controller, rather than the scroll container, should own
    /// the current pointer stream.
    pub fn should_capture(&self) -> bool {
        !self.settle_pending.get()
            && self
                .context
                .read(|state| state.active.is_some() && !state.reordering)
    }

    pub fn is_granted(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn auto_scroll(&self) -> Option<AutoScroll> {
        self.auto_scroll
    }

    pub fn is_auto_scrolling(&self) -> bool {
        self.auto_scroll.is_some()
    }

    /// Mark the item at `index` as the one being dragged.
    ///
    /// Returns `Ok(false)` when dragging is not possible right now: lists with
    /// fewer than two items, or while a previous reorder is still committing.
    pub fn begin_drag(&mut self, index: usize) -> Result<bool> {
        self.settle_deferred();
        let len = self.keys.len();
        if len <= 1 {
            return Ok(false);
        }
        if self.is_committing() {
            log::debug!("refusing drag start at {index}: reorder still committing");
            return Ok(false);
        }
        let key = self
            .keys
            .get(index)
            .cloned()
            .ok_or(ReorderError::IndexOutOfRange { index, len })?;

        log::debug!("drag start: `{key}` at {index}");
        self.gesture = None;
        self.auto_scroll = None;
        self.context.update(|state| {
            state.active = Some(ActiveDrag { key, index });
            state.pan_index = index;
            state.pan = 0.0;
        });
        Ok(true)
    }

    /// Like [`Self::begin_drag`], looking the item up by key.
    pub fn begin_drag_key(&mut self, key: &str) -> Result<bool> {
        let index = self
            .keys
            .iter()
            .position(|k| k == key)
            .ok_or_else(|| ReorderError::NoSuchKey(key.to_string()))?;
        self.begin_drag(index)
    }

    /// Take over the pointer stream. `touch_origin` is the absolute pointer
    /// position along the axis where the gesture started.
    pub fn on_grant(&mut self, touch_origin: f32, host: &mut dyn ScrollHost) {
        if !self.should_capture() {
            return;
        }

        let baseline_scroll = host.scroll_offset();
        let container = host.measure_container().unwrap_or_default();
        let active_entry = self.active_entry();
        let center_offset = active_entry
            .map(|entry| entry.center() - (touch_origin - container.pos + baseline_scroll))
            .unwrap_or(0.0);

        self.auto_scroll = None;
        self.gesture = Some(Gesture {
            touch_origin,
            delta: 0.0,
            baseline_scroll,
            container,
            center_offset,
        });
        self.context.update(|state| state.pan = 0.0);
        log::trace!("gesture granted at {touch_origin} (center offset {center_offset})");

        if let Some(on_drag_begin) = self.callbacks.on_drag_begin.clone() {
            on_drag_begin();
        }
    }

    /// Handle a pointer move; `delta` is relative to the grant position.
    pub fn on_move(&mut self, delta: f32, host: &mut dyn ScrollHost) {
        self.auto_scroll = None;
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        gesture.delta = delta;

        let scroll = host.scroll_offset();
        self.recompute(scroll);

        if let Some(auto_scroll) = self.edge_auto_scroll() {
            log::trace!("auto-scroll {:?} by {}", auto_scroll.direction, auto_scroll.step);
            self.auto_scroll = Some(auto_scroll);
            scroll_by(auto_scroll, host);
        }
    }

    /// Run one auto-scroll step. Hosts call this every
    /// [`ReorderConfig::auto_scroll_interval`] while [`Self::is_auto_scrolling`]
    /// holds; returns whether another step is due.
    pub fn auto_scroll_tick(&mut self, host: &mut dyn ScrollHost) -> bool {
        let Some(auto_scroll) = self.auto_scroll else {
            return false;
        };
        if self.gesture.is_none() {
            self.auto_scroll = None;
            return false;
        }

        scroll_by(auto_scroll, host);
        self.recompute(host.scroll_offset());
        true
    }

    /// End the gesture and decide whether a reorder happened.
    pub fn release(&mut self) -> Release {
        self.settle_deferred();
        if self.is_committing() {
            log::debug!("release ignored: reorder still committing");
            return Release::Busy;
        }
        self.auto_scroll = None;
        self.gesture = None;

        if let Some(on_drag_end) = self.callbacks.on_drag_end.clone() {
            on_drag_end();
        }

        let snapshot = self.context.snapshot();
        let Some(active) = snapshot.active else {
            self.reset();
            return Release::Reset;
        };

        let to = snapshot.pan_index;
        if !is_effective_move(active.index, to, self.keys.len()) {
            log::debug!("drop of `{}` at {to} is a no-op", active.key);
            self.reset();
            return Release::Reset;
        }

        log::debug!("committing `{}` {} -> {to}", active.key, active.index);
        self.context.update(|state| state.reordering = true);
        Release::Commit(ReorderEvent {
            key: active.key,
            from: active.index,
            to,
        })
    }

    /// Leave the committing state once the external reorder settled.
    pub fn finish_commit(&mut self) {
        self.settle_pending.set(false);
        self.context.update(|state| state.reordering = false);
        self.reset();
    }

    /// The row-level "drag end" hook: a press that never turned into a granted
    /// gesture (a tap) must still clear the active item.
    pub fn cancel_tap(&mut self) {
        self.settle_deferred();
        if self.gesture.is_some() {
            return;
        }
        if self.is_committing() {
            return;
        }
        if self.context.read(|state| state.active.is_some()) {
            log::trace!("drag cancelled before any move");
            self.reset();
        }
    }

    /// Drop every piece of per-gesture state.
    pub fn reset(&mut self) {
        self.gesture = None;
        self.auto_scroll = None;
        self.context.update(|state| {
            state.active = None;
            state.pan = 0.0;
            state.pan_index = 0;
        });
    }

    fn active_entry(&self) -> Option<LayoutEntry> {
        let key = self
            .context
            .read(|state| state.active.as_ref().map(|active| active.key.clone()))?;
        self.layouts.borrow().get(&key)
    }

    fn recompute(&mut self, scroll: f32) {
        let Some(gesture) = self.gesture else {
            return;
        };

        let client_pos = gesture.wrap_pos() + scroll;
        let probe = client_pos + gesture.center_offset;
        let previous = self.context.read(|state| state.pan_index);
        let resolved = {
            let layouts = self.layouts.borrow();
            resolve_target_index(&layouts, self.keys.iter().map(String::as_str), probe)
        };
        if resolved.is_none() {
            log::trace!("layout incomplete at probe {probe}, keeping target {previous}");
        }
        let target = resolved.unwrap_or(previous);
        let pan = (scroll - gesture.baseline_scroll) + gesture.delta;

        self.context.update(|state| {
            state.pan = pan;
            state.pan_index = target;
        });

        if target != previous {
            log::trace!("hover index {previous} -> {target}");
            if let Some(on_hover_changed) = self.callbacks.on_hover_changed.clone() {
                on_hover_changed(target);
            }
        }
    }

    fn edge_auto_scroll(&self) -> Option<AutoScroll> {
        let gesture = self.gesture?;
        let extent = self
            .active_entry()
            .map(|entry| entry.extent)
            .filter(|extent| *extent > 0.0)
            .unwrap_or(gesture.container.extent);
        if extent <= 0.0 {
            return None;
        }

        let center = gesture.wrap_pos() + gesture.center_offset;
        let leading = center - extent / 2.0;
        let trailing = center + extent / 2.0;

        let direction = if leading < 0.0 {
            AutoScrollDirection::Backward
        } else if trailing > gesture.container.extent {
            AutoScrollDirection::Forward
        } else {
            return None;
        };
        Some(AutoScroll {
            direction,
            step: extent,
        })
    }
}

fn scroll_by(auto_scroll: AutoScroll, host: &mut dyn ScrollHost) {
    let current = host.scroll_offset();
    let next = match auto_scroll.direction {
        AutoScrollDirection::Backward => current - auto_scroll.step,
        AutoScrollDirection::Forward => current + auto_scroll.step,
    };
    host.scroll_to_offset(next.max(0.0));
}

/// Whether dropping the item picked up at `from` onto slot `to` changes the order.
///
/// Dragging the last item past its own end lands on `len`, which is the same
/// place it already occupies.
pub fn is_effective_move(from: usize, to: usize, len: usize) -> bool {
    if to == from || to > len {
        return false;
    }
    !(from + 1 == len && to == len)
}
