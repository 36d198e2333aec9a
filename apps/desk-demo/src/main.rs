use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use desk_app_shell::{DesktopShell, ShellConfig};
use desk_core::{
    Container, DesktopSurface, DrawerAdapter, FolderInfo, HostError, ItemKind, ItemRecord,
    LiveFolderInfo, ShortcutInfo, SurfaceEvent, ViewHandle, WidgetHost, WidgetId,
    WidgetMetadata, WidgetRecord,
};
use desk_grid::CellSpan;

/// Stand-in for the widget host: knows every id below 100.
struct DemoHost {
    next_view: u64,
}

impl WidgetHost for DemoHost {
    fn widget_info(&self, widget_id: WidgetId) -> Result<WidgetMetadata, HostError> {
        if widget_id >= 100 {
            return Err(HostError::UnknownWidget(widget_id));
        }
        Ok(WidgetMetadata {
            provider: format!("demo.widget.{widget_id}"),
            label: format!("Widget {widget_id}"),
            min_width: 150,
            min_height: 70,
        })
    }

    fn create_view(
        &mut self,
        _widget_id: WidgetId,
        _info: &WidgetMetadata,
    ) -> Result<ViewHandle, HostError> {
        self.next_view += 1;
        Ok(ViewHandle(self.next_view))
    }

    fn delete_widget_id(&mut self, widget_id: WidgetId) {
        log::info!("released widget id {widget_id}");
    }
}

fn app(title: &str) -> ShortcutInfo {
    ShortcutInfo {
        title: title.to_string(),
        target: format!("launch:{}", title.to_lowercase()),
    }
}

fn sample_items() -> Vec<ItemRecord> {
    let titles = [
        "Phone", "Contacts", "Browser", "Camera", "Gallery", "Music", "Calendar", "Clock",
        "Settings", "Maps", "Mail", "Notes", "Calculator", "Weather",
    ];
    let mut items: Vec<ItemRecord> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let screen = i / 8;
            let cell = i % 8;
            ItemRecord::new(i as u64 + 1, screen, ItemKind::Application(app(title)))
                .at(cell % 4, 1 + cell / 4)
        })
        .collect();

    items.push(ItemRecord::new(20, 0, ItemKind::SearchWidget).at(0, 0).with_span(4, 1));
    items.push(
        ItemRecord::new(
            21,
            2,
            ItemKind::UserFolder(FolderInfo {
                id: 7,
                title: "Games".to_string(),
                contents: vec![app("Chess"), app("Solitaire")],
            }),
        )
        .at(0, 0),
    );
    items.push(ItemRecord::new(
        22,
        2,
        ItemKind::LiveFolder(LiveFolderInfo {
            id: 8,
            title: "Starred".to_string(),
            source: "content://contacts/starred".to_string(),
        }),
    ));
    items.push(
        ItemRecord::new(23, 0, ItemKind::Application(app("Market")))
            .in_container(Container::DockBar),
    );
    items.push(
        ItemRecord::new(24, 0, ItemKind::Application(app("Dialer")))
            .in_container(Container::LeftAction),
    );
    items
}

fn sample_widgets() -> Vec<WidgetRecord> {
    vec![
        WidgetRecord::new(1, CellSpan::new(3, 0, 0, 4, 2)),
        WidgetRecord::new(2, CellSpan::new(0, 0, 3, 2, 1)),
        WidgetRecord::new(3, CellSpan::new(4, 1, 1, 2, 2)),
        WidgetRecord::new(150, CellSpan::new(1, 0, 3, 1, 1)),
    ]
}

fn main() {
    env_logger::init();

    println!("=== Desk binding demo ===");
    println!("Binds a sample desk in chunks and logs every placement.");
    println!();

    let config = ShellConfig::default();
    let mut shell = DesktopShell::new(
        config.memory_surface(),
        DemoHost { next_view: 10_000 },
        config,
    );
    let wakes = Arc::new(AtomicUsize::new(0));
    {
        let wakes = Arc::clone(&wakes);
        shell.runtime().set_pass_waker(move || {
            wakes.fetch_add(1, Ordering::Relaxed);
        });
    }

    let drawer = DrawerAdapter::new(
        ["Phone", "Browser", "Camera", "Maps", "Market"]
            .iter()
            .map(|title| app(title))
            .collect(),
    );
    let binder = shell.start_binding(sample_items(), sample_widgets(), drawer);

    let mut step = 0;
    while shell.should_pump() {
        if !shell.run_next() {
            break;
        }
        step += 1;
        let events = shell.surface_mut().take_events();
        for event in events {
            match event {
                SurfaceEvent::Placed(placed) => log::info!(
                    "step {step}: view {} at screen {} ({}, {}) {}x{}",
                    placed.view.0,
                    placed.span.screen,
                    placed.span.x,
                    placed.span.y,
                    placed.span.span_x,
                    placed.span.span_y
                ),
                other => log::info!("step {step}: {other:?}"),
            }
        }
        log::debug!("step {step}: binder stage {:?}", binder.stage());
    }

    match shell.add_widget(5, None) {
        Ok(record) => log::info!("added widget 5 at {:?}", record.span()),
        Err(err) => log::warn!("could not add widget 5: {err}"),
    }

    let surface = shell.surface();
    println!(
        "Finished as {:?} after {} steps ({} wake-ups).",
        binder.stage(),
        binder.steps(),
        wakes.load(Ordering::Relaxed)
    );
    for screen in 0..surface.screen_count() {
        println!("  screen {screen}: {} views", surface.placed_on(screen).count());
    }
    if !shell.failures().is_empty() {
        println!("  failures: {:?}", shell.failures());
    }
}
