use desk_core::{
    Container, DrawerAdapter, FolderId, FolderInfo, HostError, ItemId, ItemKind, ItemRecord,
    LiveFolderInfo, Runtime, ShortcutInfo, ViewHandle, WidgetHost, WidgetId, WidgetMetadata,
    WidgetRecord,
};
use desk_grid::{CellSpan, ScreenIndex};
use indexmap::IndexMap;

/// A [`WidgetHost`] that keeps its registry in memory and logs every call.
///
/// Widgets are unknown until [`RecordingHost::register`] is called for them.
#[derive(Debug, Default)]
pub struct RecordingHost {
    registry: IndexMap<WidgetId, WidgetMetadata>,
    unavailable: bool,
    next_view: u64,
    created: Vec<WidgetId>,
    deleted: Vec<WidgetId>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            next_view: 1000,
            ..Self::default()
        }
    }

    /// A host that knows every id in `ids`.
    pub fn with_widgets(ids: impl IntoIterator<Item = WidgetId>) -> Self {
        let mut host = Self::new();
        for id in ids {
            host.register(id);
        }
        host
    }

    pub fn register(&mut self, widget_id: WidgetId) {
        self.registry.insert(
            widget_id,
            WidgetMetadata {
                provider: format!("provider.{widget_id}"),
                label: format!("Widget {widget_id}"),
                min_width: 80,
                min_height: 100,
            },
        );
    }

    pub fn register_sized(&mut self, widget_id: WidgetId, min_width: u32, min_height: u32) {
        self.register(widget_id);
        if let Some(info) = self.registry.get_mut(&widget_id) {
            info.min_width = min_width;
            info.min_height = min_height;
        }
    }

    /// Makes every later call fail with [`HostError::Unavailable`].
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Ids a view was created for, in call order.
    pub fn created(&self) -> &[WidgetId] {
        &self.created
    }

    /// Ids handed back through [`WidgetHost::delete_widget_id`].
    pub fn deleted(&self) -> &[WidgetId] {
        &self.deleted
    }

    pub fn is_registered(&self, widget_id: WidgetId) -> bool {
        self.registry.contains_key(&widget_id)
    }
}

impl WidgetHost for RecordingHost {
    fn widget_info(&self, widget_id: WidgetId) -> Result<WidgetMetadata, HostError> {
        if self.unavailable {
            return Err(HostError::Unavailable);
        }
        self.registry
            .get(&widget_id)
            .cloned()
            .ok_or(HostError::UnknownWidget(widget_id))
    }

    fn create_view(
        &mut self,
        widget_id: WidgetId,
        _info: &WidgetMetadata,
    ) -> Result<ViewHandle, HostError> {
        if self.unavailable {
            return Err(HostError::Unavailable);
        }
        if !self.registry.contains_key(&widget_id) {
            return Err(HostError::UnknownWidget(widget_id));
        }
        self.created.push(widget_id);
        let view = ViewHandle(self.next_view);
        self.next_view += 1;
        Ok(view)
    }

    fn delete_widget_id(&mut self, widget_id: WidgetId) {
        self.registry.shift_remove(&widget_id);
        self.deleted.push(widget_id);
    }
}

pub fn shortcut_info(title: &str) -> ShortcutInfo {
    ShortcutInfo {
        title: title.to_string(),
        target: format!("launch:{}", title.to_lowercase()),
    }
}

/// A 1×1 shortcut at `(x, y)` on `screen`.
pub fn shortcut(id: ItemId, screen: ScreenIndex, x: usize, y: usize) -> ItemRecord {
    ItemRecord::new(id, screen, ItemKind::Shortcut(shortcut_info(&format!("item {id}")))).at(x, y)
}

pub fn application(id: ItemId, screen: ScreenIndex, x: usize, y: usize) -> ItemRecord {
    ItemRecord::new(id, screen, ItemKind::Application(shortcut_info(&format!("app {id}")))).at(x, y)
}

pub fn user_folder(
    id: ItemId,
    folder: FolderId,
    screen: ScreenIndex,
    x: usize,
    y: usize,
) -> ItemRecord {
    let info = FolderInfo {
        id: folder,
        title: format!("folder {folder}"),
        contents: vec![shortcut_info("inside")],
    };
    ItemRecord::new(id, screen, ItemKind::UserFolder(info)).at(x, y)
}

pub fn live_folder(
    id: ItemId,
    folder: FolderId,
    screen: ScreenIndex,
    x: usize,
    y: usize,
) -> ItemRecord {
    let info = LiveFolderInfo {
        id: folder,
        title: format!("live {folder}"),
        source: format!("content://live/{folder}"),
    };
    ItemRecord::new(id, screen, ItemKind::LiveFolder(info)).at(x, y)
}

/// The search widget, which spans a full row.
pub fn search_widget(id: ItemId, screen: ScreenIndex, y: usize, width: usize) -> ItemRecord {
    ItemRecord::new(id, screen, ItemKind::SearchWidget)
        .at(0, y)
        .with_span(width, 1)
}

pub fn dock_item(id: ItemId) -> ItemRecord {
    shortcut(id, 0, 0, 0).in_container(Container::DockBar)
}

pub fn action_item(id: ItemId, container: Container) -> ItemRecord {
    shortcut(id, 0, 0, 0).in_container(container)
}

/// `count` shortcuts filling `screen` row by row on a grid `width` wide.
pub fn shortcut_row(
    first_id: ItemId,
    count: usize,
    screen: ScreenIndex,
    width: usize,
) -> Vec<ItemRecord> {
    (0..count)
        .map(|i| shortcut(first_id + i as ItemId, screen, i % width, i / width))
        .collect()
}

pub fn widget(
    widget_id: WidgetId,
    screen: ScreenIndex,
    x: usize,
    y: usize,
    span_x: usize,
    span_y: usize,
) -> WidgetRecord {
    WidgetRecord::new(widget_id, CellSpan::new(screen, x, y, span_x, span_y))
}

pub fn drawer(titles: &[&str]) -> DrawerAdapter {
    DrawerAdapter::new(titles.iter().map(|title| shortcut_info(title)).collect())
}

/// Runs queued tasks one at a time, up to `limit`, and returns how many ran.
pub fn run_steps(runtime: &Runtime, limit: usize) -> usize {
    let mut ran = 0;
    while ran < limit && runtime.run_next() {
        ran += 1;
    }
    ran
}

/// Drains the runtime, panicking if it does not settle within `limit` tasks.
pub fn drain(runtime: &Runtime, limit: usize) -> usize {
    let ran = run_steps(runtime, limit);
    assert!(
        !runtime.has_tasks(),
        "runtime still has work after {limit} tasks"
    );
    ran
}
