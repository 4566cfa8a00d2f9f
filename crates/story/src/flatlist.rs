use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme as _, h_flex, v_flex};
use gpui_dnd_flatlist::{DndFlatListRow, DndFlatListState, ScrollAxis, dnd_flatlist};

/// Pretend the reorder is persisted somewhere slow.
const COMMIT_DELAY: Duration = Duration::from_millis(600);
const MAX_EVENTS: usize = 12;

#[derive(Clone, Debug)]
struct Track {
    id: String,
    title: String,
    extent: f32,
}

type EventLog = Rc<RefCell<Vec<String>>>;

pub struct FlatListExample {
    list: Entity<DndFlatListState<Track>>,
    chips: Entity<DndFlatListState<Track>>,
    events: EventLog,
}

impl FlatListExample {
    pub fn view(_window: &mut Window, cx: &mut App) -> Entity<Self> {
        let events = EventLog::default();

        let list = cx.new(|cx: &mut Context<DndFlatListState<Track>>| {
            let this = cx.entity().downgrade();
            DndFlatListState::new()
                .key_extractor(|track: &Track, _| track.id.clone().into())
                .item_size(|track: &Track, _| size(px(0.), px(track.extent)))
                .on_drag_begin(record(&events, "drag begin"))
                .on_drag_end(record(&events, "drag end"))
                .on_hover_changed({
                    let events = events.clone();
                    move |ix| push_event(&events, format!("hover -> {ix}"))
                })
                .on_reordered(move |event, _window, cx| {
                    let this = this.clone();
                    cx.spawn(async move |cx| {
                        cx.background_executor().timer(COMMIT_DELAY).await;
                        log::info!("saved `{}` {} -> {}", event.key, event.from, event.to);
                        this.update(cx, |list, cx| list.reorder_items(&event, cx))??;
                        Ok(())
                    })
                })
                .items(demo_tracks())
        });

        let chips = cx.new(|cx: &mut Context<DndFlatListState<Track>>| {
            let this = cx.entity().downgrade();
            DndFlatListState::new()
                .axis(ScrollAxis::Horizontal)
                .key_extractor(|track: &Track, _| track.id.clone().into())
                .item_size(|track: &Track, _| size(px(track.extent), px(0.)))
                .on_reordered(move |event, _window, cx| {
                    let result = this
                        .update(cx, |chips, cx| chips.reorder_items(&event, cx))
                        .and_then(|result| result.map_err(anyhow::Error::from));
                    Task::ready(result)
                })
                .items(demo_chips())
        });

        cx.new(|cx| {
            cx.observe(&list, |_, _, cx| cx.notify()).detach();
            cx.observe(&chips, |_, _, cx| cx.notify()).detach();
            Self {
                list,
                chips,
                events,
            }
        })
    }
}

impl Render for FlatListExample {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let list = self.list.read(cx);
        let pipeline = format!("{:?}", list.pipeline_state());
        let snapshot = serde_json::to_string_pretty(&list.snapshot())
            .unwrap_or_else(|err| format!("<{err}>"));
        let order = list
            .items_ref()
            .iter()
            .map(|track| track.id.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let events = self.events.borrow().join("\n");

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(
                        div()
                            .text_xl()
                            .font_weight(FontWeight::BOLD)
                            .child("DnD FlatList"),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child("Drag a row by its handle. Hold it near an edge to auto-scroll; the drop is saved after a short delay."),
                    ),
            )
            .child(
                div()
                    .h(px(56.))
                    .rounded(px(12.))
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.background)
                    .child(dnd_flatlist(&self.chips, |row, _window, cx| {
                        render_chip(row, cx)
                    })),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .child(
                        div()
                            .w(px(420.))
                            .h_full()
                            .rounded(px(12.))
                            .border_1()
                            .border_color(theme.border)
                            .bg(theme.background)
                            .child(
                                dnd_flatlist(&self.list, |row, _window, cx| {
                                    render_track_row(row, cx)
                                })
                                .header(
                                    div()
                                        .px_3()
                                        .py_2()
                                        .text_sm()
                                        .font_weight(FontWeight::MEDIUM)
                                        .border_b_1()
                                        .border_color(theme.border)
                                        .child("Playlist"),
                                ),
                            ),
                    )
                    .child(
                        v_flex()
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .p(px(12.))
                            .rounded(px(12.))
                            .border_1()
                            .border_color(theme.border)
                            .bg(theme.background)
                            .text_sm()
                            .child(format!("state: {pipeline}"))
                            .child(format!("order: {order}"))
                            .child(render_lines(snapshot))
                            .child(
                                div()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("Events"),
                            )
                            .child(render_lines(events)),
                    ),
            )
    }
}

fn render_track_row(row: DndFlatListRow<'_, Track>, cx: &mut App) -> AnyElement {
    let theme = cx.theme();
    let track = row.item;
    let press = row.handle.clone();
    let lift = row.handle;

    h_flex()
        .size_full()
        .px_3()
        .gap_x_2()
        .items_center()
        .border_b_1()
        .border_color(theme.border)
        .bg(if row.is_active {
            theme.accent
        } else {
            theme.background
        })
        .when(row.is_active, |this| this.shadow_md())
        .child(
            div()
                .px_1()
                .cursor(CursorStyle::OpenHand)
                .text_color(theme.muted_foreground)
                .on_mouse_down(MouseButton::Left, move |event, window, cx| {
                    press.drag_start(event.position, window, cx)
                })
                .on_mouse_up(MouseButton::Left, move |_, window, cx| {
                    lift.drag_end(window, cx)
                })
                .child("::"),
        )
        .child(div().flex_1().child(track.title.clone()))
        .child(
            div()
                .text_xs()
                .text_color(theme.muted_foreground)
                .child(format!("#{} {:.0}px", row.index, track.extent)),
        )
        .into_any_element()
}

fn render_chip(row: DndFlatListRow<'_, Track>, cx: &mut App) -> AnyElement {
    let theme = cx.theme();
    let press = row.handle.clone();
    let lift = row.handle;

    div().size_full().p_1().child(
        h_flex()
            .size_full()
            .px_2()
            .items_center()
            .justify_center()
            .rounded(px(8.))
            .border_1()
            .border_color(theme.border)
            .bg(if row.is_active {
                theme.accent
            } else {
                theme.secondary
            })
            .text_sm()
            .cursor(CursorStyle::OpenHand)
            .on_mouse_down(MouseButton::Left, move |event, window, cx| {
                press.drag_start(event.position, window, cx)
            })
            .on_mouse_up(MouseButton::Left, move |_, window, cx| lift.drag_end(window, cx))
            .child(row.item.title.clone()),
    )
    .into_any_element()
}

fn render_lines(text: String) -> impl IntoElement {
    let lines = text
        .lines()
        .map(|line| div().text_xs().child(line.to_string()));
    v_flex().gap_y_0p5().children(lines)
}

fn record(events: &EventLog, label: &'static str) -> impl Fn() + 'static {
    let events = events.clone();
    move || push_event(&events, label.to_string())
}

fn push_event(events: &RefCell<Vec<String>>, event: String) {
    let mut events = events.borrow_mut();
    events.push(event);
    let overflow = events.len().saturating_sub(MAX_EVENTS);
    events.drain(..overflow);
}

fn demo_tracks() -> Vec<Track> {
    let extents = [36., 52., 44., 68.];

    (0..40)
        .map(|ix| Track {
            id: format!("t{ix:02}"),
            title: format!("Track {ix:02}"),
            extent: extents[ix % extents.len()],
        })
        .collect()
}

fn demo_chips() -> Vec<Track> {
    ["rock", "jazz", "ambient", "drum & bass", "folk", "classical", "lo-fi", "hip hop"]
        .into_iter()
        .map(|name| Track {
            id: name.to_string(),
            title: name.to_string(),
            extent: 24. + name.len() as f32 * 8.,
        })
        .collect()
}
