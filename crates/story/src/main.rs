use gpui::*;
use gpui_component::{Root, TitleBar};
use gpui_dnd_flatlist_story::flatlist::FlatListExample;

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("gpui_reorder_core=debug,info"),
    )
    .format_timestamp_millis()
    .init();

    let app = Application::new();

    app.run(move |cx| {
        gpui_component::init(cx);
        cx.activate(true);

        cx.spawn(async move |cx| {
            cx.open_window(
                WindowOptions {
                    titlebar: Some(TitleBar::title_bar_options()),
                    ..Default::default()
                },
                |window, cx| {
                    window.set_window_title("DnD FlatList");
                    let view = FlatListExample::view(window, cx);
                    cx.new(|cx| Root::new(view, window, cx))
                },
            )?;

            Ok::<_, anyhow::Error>(())
        })
        .detach();
    });
}
