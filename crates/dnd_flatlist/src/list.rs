use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::rc::Rc;
use std::time::Instant;

use gpui::{
    AnyElement, App, Bounds, Context, CursorStyle, DispatchPhase, ElementId, Entity,
    InteractiveElement as _, IntoElement, ListSizingBehavior, MouseButton, MouseMoveEvent,
    MouseUpEvent, ParentElement as _, Pixels, Point, Render, RenderOnce, ScrollStrategy,
    SharedString, Size, StyleRefinement, Styled, Task, Window, canvas, deferred, div,
    prelude::FluentBuilder as _, px, size,
};
use gpui_component::scroll::{Scrollbar, ScrollbarState};
use gpui_component::{
    StyledExt as _, VirtualListScrollHandle, h_flex, h_virtual_list, v_flex, v_virtual_list,
};
use gpui_reorder_core::{
    CellState, DragCallbacks, DragContextReader, DragSnapshot, GestureController, LayoutEntry,
    PipelineState, Release, ReorderConfig, ReorderEvent, ScrollAxis, ScrollHost as _,
    apply_reorder, commit_with,
};

use crate::host::ListScrollHost;

const DEFAULT_ITEM_EXTENT: Pixels = px(28.);

type RenderRow<T> = Rc<dyn Fn(DndFlatListRow<'_, T>, &mut Window, &mut App) -> AnyElement>;
type ReorderHandler = Rc<dyn Fn(ReorderEvent, &mut Window, &mut App) -> Task<anyhow::Result<()>>>;

/// Create a [`DndFlatList`].
pub fn dnd_flatlist<T, R>(state: &Entity<DndFlatListState<T>>, render_item: R) -> DndFlatList<T>
where
    T: 'static,
    R: Fn(DndFlatListRow<'_, T>, &mut Window, &mut App) -> AnyElement + 'static,
{
    DndFlatList::new(state, render_item)
}

/// Hooks a row wires to whatever element starts a drag (a handle, or the whole row).
#[derive(Clone)]
pub struct DragHandle {
    start: Rc<dyn Fn(Point<Pixels>, &mut Window, &mut App)>,
    end: Rc<dyn Fn(&mut Window, &mut App)>,
}

impl DragHandle {
    fn new<T: 'static>(state: &Entity<DndFlatListState<T>>, key: SharedString) -> Self {
        let start_state = state.clone();
        let end_state = state.clone();
        Self {
            start: Rc::new(
                move |position: Point<Pixels>, _: &mut Window, cx: &mut App| {
                    start_state.update(cx, |state, cx| state.on_drag_start(&key, position, cx));
                },
            ),
            end: Rc::new(move |_: &mut Window, cx: &mut App| {
                end_state.update(cx, |state, cx| state.on_drag_cancel(cx));
            }),
        }
    }

    /// Call from a left mouse-down with the pointer position.
    pub fn drag_start(&self, position: Point<Pixels>, window: &mut Window, cx: &mut App) {
        (self.start)(position, window, cx);
    }

    /// Call from a left mouse-up. A press that never moved is dropped here;
    /// released drags are handled by the list itself.
    pub fn drag_end(&self, window: &mut Window, cx: &mut App) {
        (self.end)(window, cx);
    }
}

/// What `render_item` gets for each visible row.
pub struct DndFlatListRow<'a, T> {
    pub item: &'a T,
    pub index: usize,
    pub key: SharedString,
    /// This row is the one being dragged.
    pub is_active: bool,
    pub handle: DragHandle,
}

/// State for a drag-to-reorder list on top of `gpui-component`'s virtual list.
///
/// The list never reorders its own items: a drop is reported through
/// [`Self::on_reordered`] and the caller hands back the new sequence with
/// [`Self::set_items`] (or [`Self::reorder_items`]).
pub struct DndFlatListState<T> {
    items: Vec<T>,
    keys: Vec<SharedString>,
    key_extractor: Rc<dyn Fn(&T, usize) -> SharedString>,
    item_size: Rc<dyn Fn(&T, usize) -> Size<Pixels>>,
    item_sizes: Rc<Vec<Size<Pixels>>>,
    item_origins: Vec<f32>,
    content_extent: f32,
    config: ReorderConfig,
    callbacks: DragCallbacks,
    controller: Rc<RefCell<GestureController>>,
    cells: HashMap<SharedString, CellState>,
    press_origin: Option<Point<Pixels>>,
    container_bounds: Rc<Cell<Option<Bounds<Pixels>>>>,
    auto_scroll_task: Option<Task<()>>,
    scrollbar_state: ScrollbarState,
    scroll_handle: VirtualListScrollHandle,
    last_scroll_offset: f32,
    on_reordered: Option<ReorderHandler>,
    on_item_layout: Option<Rc<dyn Fn(&str, LayoutEntry)>>,
    on_scroll: Option<Rc<dyn Fn(f32)>>,
    render_item: RenderRow<T>,
}

impl<T: 'static> Default for DndFlatListState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> DndFlatListState<T> {
    pub fn new() -> Self {
        let config = ReorderConfig::default();
        Self {
            items: Vec::new(),
            keys: Vec::new(),
            key_extractor: Rc::new(|_: &T, ix: usize| SharedString::from(ix.to_string())),
            item_size: Rc::new(|_: &T, _: usize| size(DEFAULT_ITEM_EXTENT, DEFAULT_ITEM_EXTENT)),
            item_sizes: Rc::new(Vec::new()),
            item_origins: Vec::new(),
            content_extent: 0.0,
            config,
            callbacks: DragCallbacks::default(),
            controller: Rc::new(RefCell::new(GestureController::new(config))),
            cells: HashMap::new(),
            press_origin: None,
            container_bounds: Rc::new(Cell::new(None)),
            auto_scroll_task: None,
            scrollbar_state: ScrollbarState::default(),
            scroll_handle: VirtualListScrollHandle::new(),
            last_scroll_offset: 0.0,
            on_reordered: None,
            on_item_layout: None,
            on_scroll: None,
            render_item: Rc::new(|_: DndFlatListRow<'_, T>, _: &mut Window, _: &mut App| {
                div().into_any_element()
            }),
        }
    }

    pub fn items(mut self, items: impl Into<Vec<T>>) -> Self {
        self.items = items.into();
        self.sync_items_or_log();
        self
    }

    /// Stable identity of an item. Defaults to its index, which is only
    /// correct for lists whose items are never reordered by anyone else.
    pub fn key_extractor(mut self, f: impl Fn(&T, usize) -> SharedString + 'static) -> Self {
        self.key_extractor = Rc::new(f);
        self.sync_items_or_log();
        self
    }

    /// Size of an item. Only the component along the list axis is used.
    pub fn item_size(mut self, f: impl Fn(&T, usize) -> Size<Pixels> + 'static) -> Self {
        self.item_size = Rc::new(f);
        self.sync_items_or_log();
        self
    }

    pub fn axis(self, axis: ScrollAxis) -> Self {
        let config = self.config.axis(axis);
        self.config(config)
    }

    pub fn config(mut self, config: ReorderConfig) -> Self {
        self.config = config;
        self.controller = Rc::new(RefCell::new(
            GestureController::new(config).callbacks(self.callbacks.clone()),
        ));
        self.cells.clear();
        self.sync_items_or_log();
        self
    }

    /// Called once the pointer takes over an item.
    ///
    /// This and the other drag callbacks run while the list is being updated;
    /// they must not update the list entity themselves.
    pub fn on_drag_begin(self, f: impl Fn() + 'static) -> Self {
        self.with_callbacks(|callbacks| callbacks.on_drag_begin(f))
    }

    pub fn on_drag_end(self, f: impl Fn() + 'static) -> Self {
        self.with_callbacks(|callbacks| callbacks.on_drag_end(f))
    }

    pub fn on_hover_changed(self, f: impl Fn(usize) + 'static) -> Self {
        self.with_callbacks(|callbacks| callbacks.on_hover_changed(f))
    }

    /// Apply a drop to the caller's data.
    ///
    /// `event.to` is in `0..=len`, `len` meaning "move to the end". The drag
    /// state stays frozen until the returned task finishes; new drags are
    /// refused meanwhile.
    pub fn on_reordered(
        mut self,
        f: impl Fn(ReorderEvent, &mut Window, &mut App) -> Task<anyhow::Result<()>> + 'static,
    ) -> Self {
        self.on_reordered = Some(Rc::new(f));
        self
    }

    /// Observe row layouts before the list records them.
    pub fn on_item_layout(mut self, f: impl Fn(&str, LayoutEntry) + 'static) -> Self {
        self.on_item_layout = Some(Rc::new(f));
        self
    }

    /// Observe the scroll offset along the list axis.
    pub fn on_scroll(mut self, f: impl Fn(f32) + 'static) -> Self {
        self.on_scroll = Some(Rc::new(f));
        self
    }

    /// Replace the items. Any drag in progress is kept if its item survived.
    pub fn set_items(
        &mut self,
        items: impl Into<Vec<T>>,
        cx: &mut Context<Self>,
    ) -> gpui_reorder_core::Result<()> {
        self.items = items.into();
        let result = self.sync_items();
        cx.notify();
        result
    }

    /// Splice a reorder event into the current items.
    pub fn reorder_items(
        &mut self,
        event: &ReorderEvent,
        cx: &mut Context<Self>,
    ) -> gpui_reorder_core::Result<()> {
        let result = self.apply_reorder_event(event);
        cx.notify();
        result
    }

    pub fn items_ref(&self) -> &[T] {
        &self.items
    }

    pub fn keys(&self) -> &[SharedString] {
        &self.keys
    }

    pub fn snapshot(&self) -> DragSnapshot {
        self.controller.borrow().snapshot()
    }

    pub fn drag_context(&self) -> DragContextReader {
        self.controller.borrow().context()
    }

    pub fn pipeline_state(&self) -> PipelineState {
        self.controller.borrow().pipeline_state()
    }

    pub fn scroll_handle(&self) -> VirtualListScrollHandle {
        self.scroll_handle.clone()
    }

    pub fn scroll_to_item(&mut self, ix: usize, cx: &mut Context<Self>) {
        self.scroll_handle.scroll_to_item(ix, ScrollStrategy::Center);
        cx.notify();
    }

    fn with_callbacks(mut self, f: impl FnOnce(DragCallbacks) -> DragCallbacks) -> Self {
        self.callbacks = f(std::mem::take(&mut self.callbacks));
        self.controller
            .borrow_mut()
            .set_callbacks(self.callbacks.clone());
        self
    }

    fn apply_reorder_event(&mut self, event: &ReorderEvent) -> gpui_reorder_core::Result<()> {
        apply_reorder(&mut self.items, event);
        self.sync_items()
    }

    fn sync_items_or_log(&mut self) {
        if let Err(err) = self.sync_items() {
            log::error!("drag to reorder disabled: {err}");
        }
    }

    fn sync_items(&mut self) -> gpui_reorder_core::Result<()> {
        let axis = self.config.axis;
        let keys: Vec<SharedString> = self
            .items
            .iter()
            .enumerate()
            .map(|(ix, item)| (self.key_extractor)(item, ix))
            .collect();
        let sizes: Vec<Size<Pixels>> = self
            .items
            .iter()
            .enumerate()
            .map(|(ix, item)| sanitize_item_size((self.item_size)(item, ix), axis))
            .collect();

        let (origins, extent) = item_origins(&sizes, axis);
        {
            // Every position is known up front; rows scrolled past without
            // being rendered must still count for target resolution.
            let layouts = self.controller.borrow().layouts();
            let mut layouts = layouts.borrow_mut();
            for ((key, size), pos) in keys.iter().zip(&sizes).zip(&origins) {
                let extent = f32::from(axis.pick(size.width, size.height));
                layouts.record(key.to_string(), LayoutEntry::new(*pos, extent));
            }
        }
        self.item_sizes = Rc::new(sizes);
        self.item_origins = origins;
        self.content_extent = extent;

        let live: HashSet<&SharedString> = keys.iter().collect();
        self.cells.retain(|key, _| live.contains(key));

        let result = self
            .controller
            .borrow_mut()
            .set_keys(keys.iter().map(ToString::to_string).collect());
        if result.is_err() {
            // Keys that cannot be told apart cannot be dragged either.
            self.controller.borrow_mut().set_keys(Vec::new()).ok();
        }
        self.keys = keys;
        result
    }

    fn scroll_host(&self) -> ListScrollHost<'_> {
        let bounds = self.container_bounds.get();
        let viewport = bounds
            .map(|bounds| f32::from(self.config.axis.pick(bounds.size.width, bounds.size.height)))
            .unwrap_or(0.0);
        ListScrollHost::new(&self.scroll_handle, self.config.axis)
            .container(bounds)
            .max_offset(self.content_extent - viewport)
    }

    fn on_drag_start(
        &mut self,
        key: &SharedString,
        position: Point<Pixels>,
        cx: &mut Context<Self>,
    ) {
        let started = self.controller.borrow_mut().begin_drag_key(key);
        match started {
            Ok(true) => {
                self.press_origin = Some(position);
                self.auto_scroll_task = None;
                cx.notify();
            }
            Ok(false) => {}
            Err(err) => log::error!("ignoring drag start: {err}"),
        }
    }

    fn on_drag_cancel(&mut self, cx: &mut Context<Self>) {
        let mut controller = self.controller.borrow_mut();
        if controller.is_granted() {
            return;
        }
        controller.cancel_tap();
        drop(controller);
        self.press_origin = None;
        cx.notify();
    }

    fn on_pointer_move(&mut self, event: &MouseMoveEvent, cx: &mut Context<Self>) {
        if event.pressed_button != Some(MouseButton::Left) {
            return;
        }
        if !self.controller.borrow().should_capture() {
            return;
        }
        let axis = self.config.axis;
        let Some(origin) = self
            .press_origin
            .map(|origin| f32::from(axis.pick(origin.x, origin.y)))
        else {
            return;
        };
        let position = f32::from(axis.pick(event.position.x, event.position.y));

        {
            let mut host = self.scroll_host();
            let mut controller = self.controller.borrow_mut();
            if !controller.is_granted() {
                controller.on_grant(origin, &mut host);
            }
            controller.on_move(position - origin, &mut host);
        }

        self.restart_auto_scroll(cx);
        cx.notify();
    }

    fn restart_auto_scroll(&mut self, cx: &mut Context<Self>) {
        self.auto_scroll_task = None;
        let (scrolling, interval) = {
            let controller = self.controller.borrow();
            (
                controller.is_auto_scrolling(),
                controller.config().auto_scroll_interval,
            )
        };
        if !scrolling {
            return;
        }

        self.auto_scroll_task = Some(cx.spawn(async move |this, cx| {
            loop {
                cx.background_executor().timer(interval).await;
                let more = this
                    .update(cx, |this, cx| this.auto_scroll_step(cx))
                    .unwrap_or(false);
                if !more {
                    break;
                }
            }
        }));
    }

    fn auto_scroll_step(&mut self, cx: &mut Context<Self>) -> bool {
        let more = self.scroll_tick();
        cx.notify();
        more
    }

    fn scroll_tick(&mut self) -> bool {
        let more = {
            let mut host = self.scroll_host();
            self.controller.borrow_mut().auto_scroll_tick(&mut host)
        };
        self.notify_scroll();
        more
    }

    fn release(state: &Entity<Self>, window: &mut Window, cx: &mut App) {
        let (release, on_reordered) = state.update(cx, |state, cx| {
            state.auto_scroll_task = None;
            state.press_origin = None;
            cx.notify();

            let mut controller = state.controller.borrow_mut();
            if !controller.is_granted() {
                controller.cancel_tap();
                return (Release::Reset, None);
            }
            (controller.release(), state.on_reordered.clone())
        });

        let Release::Commit(event) = release else {
            return;
        };
        let Some(on_reordered) = on_reordered else {
            state.update(cx, |state, cx| {
                state.controller.borrow_mut().finish_commit();
                cx.notify();
            });
            return;
        };

        // Outside of `update`: the handler is free to update this list.
        let commit = on_reordered(event, window, cx);
        state.update(cx, |state, cx| state.settle(commit, cx));
    }

    fn settle(&mut self, commit: Task<anyhow::Result<()>>, cx: &mut Context<Self>) {
        let settled = commit_with(&self.controller, commit);
        cx.spawn(async move |this, cx| {
            let result = settled.await;
            this.update(cx, |this, cx| {
                this.controller.borrow_mut().settle_deferred();
                cx.notify();
            })
            .ok();
            result
        })
        .detach_and_log_err(cx);
    }

    fn notify_scroll(&mut self) {
        let offset = self.scroll_host().scroll_offset();
        if offset == self.last_scroll_offset {
            return;
        }
        self.last_scroll_offset = offset;
        if let Some(on_scroll) = self.on_scroll.as_ref() {
            on_scroll(offset);
        }
    }

    fn render_rows(
        &mut self,
        visible_range: Range<usize>,
        render_item: &RenderRow<T>,
        state: &Entity<Self>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Vec<AnyElement> {
        let now = Instant::now();
        let axis = self.config.axis;
        let duration = self.config.displacement_duration;
        let (snapshot, layouts) = {
            let controller = self.controller.borrow();
            (controller.snapshot(), controller.layouts())
        };
        let external = self.on_item_layout.clone();

        let mut animating = false;
        let mut rows = Vec::with_capacity(visible_range.len());
        for ix in visible_range {
            let (Some(item), Some(key)) = (self.items.get(ix), self.keys.get(ix)) else {
                continue;
            };
            let cell = self.cells.entry(key.clone()).or_insert_with(|| {
                CellState::new(key.to_string(), snapshot.generation, now).duration(duration)
            });

            let extent = self
                .item_sizes
                .get(ix)
                .map(|size| f32::from(axis.pick(size.width, size.height)))
                .unwrap_or(0.0);
            let pos = self.item_origins.get(ix).copied().unwrap_or(0.0);
            cell.report_layout(
                &mut layouts.borrow_mut(),
                LayoutEntry::new(pos, extent),
                external.as_deref(),
            );
            let frame = cell.frame(ix, &snapshot, &layouts.borrow(), now);
            animating |= frame.animating;

            let content = render_item(
                DndFlatListRow {
                    item,
                    index: ix,
                    key: key.clone(),
                    is_active: frame.is_active,
                    handle: DragHandle::new(state, key.clone()),
                },
                window,
                cx,
            );

            let offset = px(frame.offset);
            let body = div()
                .relative()
                .size_full()
                .map(|this| match axis {
                    ScrollAxis::Vertical => this.top(offset),
                    ScrollAxis::Horizontal => this.left(offset),
                })
                .when(frame.is_active, |this| this.cursor(CursorStyle::ClosedHand))
                .child(content);
            let body = if frame.elevated {
                deferred(body).with_priority(1).into_any_element()
            } else {
                body.into_any_element()
            };

            // The generation in the id drops recycled rows' element state
            // whenever the sequence is replaced.
            let render_key = SharedString::from(format!("{key}-{}", snapshot.generation));
            rows.push(
                div()
                    .id(ElementId::Name(render_key))
                    .size_full()
                    .child(body)
                    .into_any_element(),
            );
        }

        if animating {
            window.request_animation_frame();
        }
        rows
    }
}

impl<T: 'static> Render for DndFlatListState<T> {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.notify_scroll();

        let axis = self.config.axis;
        let render_item = Rc::clone(&self.render_item);
        let state_entity = cx.entity();
        let item_sizes = self.item_sizes.clone();
        let scroll_handle = self.scroll_handle.clone();
        let container_bounds = self.container_bounds.clone();
        let dragging = self.controller.borrow().snapshot().is_dragging();

        let rows = move |state: &mut Self,
                         visible_range: Range<usize>,
                         window: &mut Window,
                         cx: &mut Context<Self>| {
            state.render_rows(visible_range, &render_item, &state_entity, window, cx)
        };
        let list = match axis {
            ScrollAxis::Vertical => v_virtual_list(cx.entity(), "items", item_sizes, rows),
            ScrollAxis::Horizontal => h_virtual_list(cx.entity(), "items", item_sizes, rows),
        };

        // Tracks the container bounds, and the pointer anywhere in the window
        // while a drag is active.
        let tracker = canvas(
            move |bounds, _, _| container_bounds.set(Some(bounds)),
            {
                let state = cx.entity();
                move |_, _, window, _| {
                    if !dragging {
                        return;
                    }
                    window.on_mouse_event({
                        let state = state.clone();
                        move |event: &MouseMoveEvent, phase, _, cx| {
                            if phase == DispatchPhase::Bubble {
                                state.update(cx, |state, cx| state.on_pointer_move(event, cx));
                            }
                        }
                    });
                    window.on_mouse_event(move |event: &MouseUpEvent, phase, window, cx| {
                        if phase == DispatchPhase::Bubble && event.button == MouseButton::Left {
                            Self::release(&state, window, cx);
                        }
                    });
                }
            },
        )
        .absolute()
        .size_full();

        div()
            .id("dnd-flatlist-state")
            .size_full()
            .relative()
            .child(tracker)
            .child(
                list.track_scroll(&scroll_handle)
                    .flex_grow()
                    .size_full()
                    .with_sizing_behavior(ListSizingBehavior::Auto)
                    .into_any_element(),
            )
            .when(axis == ScrollAxis::Vertical, |this| {
                this.child(
                    div()
                        .absolute()
                        .top_0()
                        .right_0()
                        .bottom_0()
                        .w(px(12.))
                        .child(Scrollbar::uniform_scroll(
                            &self.scrollbar_state,
                            &self.scroll_handle,
                        )),
                )
            })
    }
}

/// A drag-to-reorder list element (virtual, variable item sizes).
#[derive(IntoElement)]
pub struct DndFlatList<T: 'static> {
    id: ElementId,
    state: Entity<DndFlatListState<T>>,
    style: StyleRefinement,
    header: Option<AnyElement>,
    footer: Option<AnyElement>,
    render_item: RenderRow<T>,
}

impl<T: 'static> DndFlatList<T> {
    pub fn new<R>(state: &Entity<DndFlatListState<T>>, render_item: R) -> Self
    where
        R: Fn(DndFlatListRow<'_, T>, &mut Window, &mut App) -> AnyElement + 'static,
    {
        Self {
            id: ElementId::Name(format!("dnd-flatlist-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            header: None,
            footer: None,
            render_item: Rc::new(render_item),
        }
    }

    /// Rendered before the first item, outside of the scrolled area.
    pub fn header(mut self, header: impl IntoElement) -> Self {
        self.header = Some(header.into_any_element());
        self
    }

    pub fn footer(mut self, footer: impl IntoElement) -> Self {
        self.footer = Some(footer.into_any_element());
        self
    }
}

impl<T: 'static> Styled for DndFlatList<T> {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl<T: 'static> RenderOnce for DndFlatList<T> {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let axis = self.state.read(cx).config.axis;
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        let container = match axis {
            ScrollAxis::Vertical => v_flex(),
            ScrollAxis::Horizontal => h_flex(),
        };
        container
            .id(self.id)
            .size_full()
            .children(self.header)
            .child(
                div()
                    .flex_1()
                    .min_w(px(0.))
                    .min_h(px(0.))
                    .child(self.state),
            )
            .children(self.footer)
            .refine_style(&self.style)
    }
}

fn sanitize_item_size(mut size: Size<Pixels>, axis: ScrollAxis) -> Size<Pixels> {
    let extent = match axis {
        ScrollAxis::Vertical => &mut size.height,
        ScrollAxis::Horizontal => &mut size.width,
    };
    let value = f32::from(*extent);
    if !value.is_finite() || value <= 0.0 {
        *extent = px(1.);
    }
    size
}

/// Start of every item along `axis`, and the total content extent.
fn item_origins(sizes: &[Size<Pixels>], axis: ScrollAxis) -> (Vec<f32>, f32) {
    let mut pos = 0.0;
    let origins = sizes
        .iter()
        .map(|size| {
            let origin = pos;
            pos += f32::from(axis.pick(size.width, size.height));
            origin
        })
        .collect();
    (origins, pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui_reorder_core::ReorderError;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: &'static str,
        extent: f32,
    }

    fn row(id: &'static str, extent: f32) -> Row {
        Row { id, extent }
    }

    fn state(rows: Vec<Row>) -> DndFlatListState<Row> {
        DndFlatListState::new()
            .key_extractor(|row: &Row, _| row.id.into())
            .item_size(|row: &Row, _| size(px(row.extent * 2.), px(row.extent)))
            .items(rows)
    }

    fn key_strings(state: &DndFlatListState<Row>) -> Vec<String> {
        state.keys().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn items_are_keyed_and_measured() {
        let state = state(vec![row("a", 10.), row("b", 20.), row("c", 30.)]);

        assert_eq!(key_strings(&state), ["a", "b", "c"]);
        assert_eq!(state.controller.borrow().keys(), ["a", "b", "c"]);
        assert_eq!(state.item_origins, vec![0.0, 10.0, 30.0]);
        assert_eq!(state.content_extent, 60.0);
    }

    #[test]
    fn horizontal_lists_measure_widths() {
        let state = state(vec![row("a", 10.), row("b", 20.)]).axis(ScrollAxis::Horizontal);

        assert_eq!(state.item_origins, vec![0.0, 20.0]);
        assert_eq!(state.content_extent, 60.0);
        assert_eq!(state.controller.borrow().config().axis, ScrollAxis::Horizontal);
        assert_eq!(state.controller.borrow().keys(), ["a", "b"]);
    }

    #[test]
    fn duplicate_keys_disable_dragging() {
        let state = state(vec![row("a", 10.), row("a", 10.)]);

        assert!(state.controller.borrow().is_empty());
        assert_eq!(
            state.controller.borrow_mut().begin_drag_key("a"),
            Err(ReorderError::NoSuchKey("a".into()))
        );
    }

    #[test]
    fn reorder_event_moves_items_and_bumps_generation() {
        let mut state = state(vec![row("a", 10.), row("b", 20.), row("c", 30.)]);
        let generation = state.snapshot().generation;

        state
            .apply_reorder_event(&ReorderEvent {
                key: "a".into(),
                from: 0,
                to: 3,
            })
            .unwrap();

        assert_eq!(key_strings(&state), ["b", "c", "a"]);
        assert_eq!(state.item_origins, vec![0.0, 20.0, 50.0]);
        assert_eq!(state.snapshot().generation, generation + 1);
    }

    #[test]
    fn callbacks_reach_the_controller() {
        let begins = Rc::new(Cell::new(0));
        let state = state(vec![row("a", 10.), row("b", 10.)]).on_drag_begin({
            let begins = begins.clone();
            move || begins.set(begins.get() + 1)
        });

        let mut controller = state.controller.borrow_mut();
        assert!(controller.begin_drag(0).unwrap());
        let mut host = ListScrollHost::new(&state.scroll_handle, ScrollAxis::Vertical);
        controller.on_grant(5.0, &mut host);
        assert_eq!(begins.get(), 1);
    }

    struct ScrolledHost {
        offset: f32,
    }

    impl gpui_reorder_core::ScrollHost for ScrolledHost {
        fn scroll_offset(&self) -> f32 {
            self.offset
        }

        fn scroll_to_offset(&mut self, offset: f32) {
            self.offset = offset.max(0.0);
        }

        fn measure_container(&self) -> Option<LayoutEntry> {
            Some(LayoutEntry::new(0.0, 300.0))
        }
    }

    #[test]
    fn rows_never_rendered_still_resolve_targets() {
        let rows = (0..80).map(|_| row("", 25.)).collect::<Vec<_>>();
        let state = DndFlatListState::new()
            .key_extractor(|_: &Row, ix| format!("t{ix:02}").into())
            .item_size(|row: &Row, _| size(px(0.), px(row.extent)))
            .items(rows);
        assert_eq!(state.content_extent, 2000.0);

        // Jumped straight to offset 1000 without rendering anything.
        let mut host = ScrolledHost { offset: 1000.0 };
        let mut controller = state.controller.borrow_mut();
        assert!(controller.begin_drag(48).unwrap());
        controller.on_grant(212.5, &mut host);
        controller.on_move(-120.0, &mut host);
        assert_eq!(controller.snapshot().pan_index, 43);

        let Release::Commit(event) = controller.release() else {
            panic!("expected a commit");
        };
        assert_eq!((event.key.as_str(), event.from, event.to), ("t48", 48, 43));
    }

    #[test]
    fn auto_scroll_ticks_report_the_new_offset() {
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let mut state = state((0..10).map(|_| row("", 20.)).collect())
            .key_extractor(|_: &Row, ix| ix.to_string().into())
            .on_scroll({
                let offsets = offsets.clone();
                move |offset| offsets.borrow_mut().push(offset)
            });
        state.container_bounds.set(Some(Bounds::new(
            gpui::point(px(0.), px(0.)),
            size(px(400.), px(100.)),
        )));

        {
            let mut host = state.scroll_host();
            let mut controller = state.controller.borrow_mut();
            assert!(controller.begin_drag(0).unwrap());
            controller.on_grant(10.0, &mut host);
            controller.on_move(85.0, &mut host);
            assert!(controller.is_auto_scrolling());
        }

        assert!(state.scroll_tick());
        assert_eq!(offsets.borrow().as_slice(), &[40.0]);
    }

    #[test]
    fn sanitize_item_size_clamps_non_positive_extents() {
        let s = sanitize_item_size(size(px(0.), px(0.)), ScrollAxis::Vertical);
        assert!(f32::from(s.height) > 0.0);
        assert_eq!(f32::from(s.width), 0.0);

        let s = sanitize_item_size(size(px(f32::NAN), px(4.)), ScrollAxis::Horizontal);
        assert_eq!(f32::from(s.width), 1.0);
    }
}
