//! Seams to the presentation layer and the widget host.

use desk_grid::{CellSpan, GridError, GridSize, OccupancyGrid, ScreenIndex};
use indexmap::IndexSet;

use crate::record::{
    Container, DrawerAdapter, FolderId, FolderInfo, ItemId, ItemRecord, LiveFolderInfo,
    ShortcutInfo, WidgetId,
};

/// Opaque handle to a view created by the presentation layer or the
/// widget host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u64);

/// Transient user-facing notices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    OutOfSpace,
}

/// The live presentation: screens, views on them, and the side surfaces.
pub trait DesktopSurface {
    fn grid_size(&self) -> GridSize;
    fn screen_count(&self) -> usize;
    fn current_screen(&self) -> ScreenIndex;
    fn set_current_screen(&mut self, screen: ScreenIndex);
    /// Spans of everything currently placed on `screen`.
    fn occupied_spans(&self, screen: ScreenIndex) -> Vec<CellSpan>;

    fn create_shortcut(&mut self, info: &ShortcutInfo) -> Option<ViewHandle>;
    fn create_user_folder(&mut self, folder: &FolderInfo) -> Option<ViewHandle>;
    fn create_live_folder(&mut self, folder: &LiveFolderInfo) -> Option<ViewHandle>;
    fn create_search_widget(&mut self) -> Option<ViewHandle>;
    fn place_at(&mut self, span: CellSpan, view: ViewHandle);
    fn request_layout(&mut self) {}
    /// Removes every placed view ahead of a fresh binding run.
    fn clear_screens(&mut self);

    fn update_action_slot(&mut self, container: Container, item: &ItemRecord);
    fn add_to_dock_bar(&mut self, item: &ItemRecord);
    fn set_drawer_adapter(&mut self, adapter: DrawerAdapter);

    fn has_focus(&self) -> bool;
    fn focus_screen(&mut self, screen: ScreenIndex);
    fn open_folder(&mut self, folder: &ItemRecord);
    fn open_folder_ids(&self) -> Vec<FolderId>;
    /// Moves focus to the most recently opened folder, if any.
    fn focus_open_folder(&mut self);
    fn show_all_items(&mut self);
    fn is_all_items_open(&self) -> bool;
    fn open_quick_access_bar(&mut self);
    fn is_quick_access_open(&self) -> bool;
    fn show_notice(&mut self, notice: Notice);
}

/// Occupancy of every screen, built from what the surface has placed.
pub fn live_grids(surface: &dyn DesktopSurface) -> Result<Vec<OccupancyGrid>, GridError> {
    let size = surface.grid_size();
    (0..surface.screen_count())
        .map(|screen| OccupancyGrid::build(screen, size, &surface.occupied_spans(screen)))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetMetadata {
    pub provider: String,
    pub label: String,
    pub min_width: u32,
    pub min_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The widget host process is gone; every later call will fail too.
    Unavailable,
    UnknownWidget(WidgetId),
}

impl HostError {
    /// Whether binding can carry on past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, HostError::UnknownWidget(_))
    }
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::Unavailable => write!(f, "widget host unavailable"),
            HostError::UnknownWidget(id) => write!(f, "widget {id} unknown to host"),
        }
    }
}

impl std::error::Error for HostError {}

/// The out-of-process widget host.
pub trait WidgetHost {
    fn widget_info(&self, widget_id: WidgetId) -> Result<WidgetMetadata, HostError>;
    fn create_view(
        &mut self,
        widget_id: WidgetId,
        info: &WidgetMetadata,
    ) -> Result<ViewHandle, HostError>;
    /// Gives back an id that will not be placed.
    fn delete_widget_id(&mut self, widget_id: WidgetId);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedView {
    pub view: ViewHandle,
    pub span: CellSpan,
}

/// Everything a [`MemorySurface`] was asked to do, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    Placed(PlacedView),
    ActionSlot { container: Container, item: ItemId },
    DockBar(ItemId),
    Drawer { entries: usize },
    FocusScreen(ScreenIndex),
    FolderOpened(FolderId),
    FolderFocused(FolderId),
    AllItemsShown,
    QuickAccessOpened,
    Notice(Notice),
}

/// In-memory presentation used by tests, demos and headless hosts.
#[derive(Debug)]
pub struct MemorySurface {
    grid: GridSize,
    screens: usize,
    current_screen: ScreenIndex,
    next_view: u64,
    placed: Vec<PlacedView>,
    events: Vec<SurfaceEvent>,
    focus: Option<ScreenIndex>,
    open_folders: IndexSet<FolderId>,
    focused_folder: Option<FolderId>,
    all_items_open: bool,
    quick_access_open: bool,
    drawer: Option<DrawerAdapter>,
    refuse_kinds: Vec<&'static str>,
}

impl MemorySurface {
    pub fn new(grid: GridSize, screens: usize) -> Self {
        Self {
            grid,
            screens,
            current_screen: 0,
            next_view: 1,
            placed: Vec::new(),
            events: Vec::new(),
            focus: None,
            open_folders: IndexSet::new(),
            focused_folder: None,
            all_items_open: false,
            quick_access_open: false,
            drawer: None,
            refuse_kinds: Vec::new(),
        }
    }

    /// Makes the view factory for `kind` (see [`ItemKind::name`]) return
    /// nothing.
    ///
    /// [`ItemKind::name`]: crate::ItemKind::name
    pub fn refuse(&mut self, kind: &'static str) {
        self.refuse_kinds.push(kind);
    }

    pub fn placed(&self) -> &[PlacedView] {
        &self.placed
    }

    pub fn placed_on(&self, screen: ScreenIndex) -> impl Iterator<Item = &PlacedView> {
        self.placed.iter().filter(move |view| view.span.screen == screen)
    }

    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drawer(&self) -> Option<&DrawerAdapter> {
        self.drawer.as_ref()
    }

    pub fn focused_screen(&self) -> Option<ScreenIndex> {
        self.focus
    }

    pub fn focused_folder(&self) -> Option<FolderId> {
        self.focused_folder
    }

    fn new_view(&mut self, kind: &'static str) -> Option<ViewHandle> {
        if self.refuse_kinds.contains(&kind) {
            return None;
        }
        let view = ViewHandle(self.next_view);
        self.next_view += 1;
        Some(view)
    }
}

impl DesktopSurface for MemorySurface {
    fn grid_size(&self) -> GridSize {
        self.grid
    }

    fn screen_count(&self) -> usize {
        self.screens
    }

    fn current_screen(&self) -> ScreenIndex {
        self.current_screen
    }

    fn set_current_screen(&mut self, screen: ScreenIndex) {
        self.current_screen = screen.min(self.screens.saturating_sub(1));
    }

    fn occupied_spans(&self, screen: ScreenIndex) -> Vec<CellSpan> {
        self.placed_on(screen).map(|view| view.span).collect()
    }

    fn create_shortcut(&mut self, _info: &ShortcutInfo) -> Option<ViewHandle> {
        self.new_view("shortcut")
    }

    fn create_user_folder(&mut self, _folder: &FolderInfo) -> Option<ViewHandle> {
        self.new_view("user folder")
    }

    fn create_live_folder(&mut self, _folder: &LiveFolderInfo) -> Option<ViewHandle> {
        self.new_view("live folder")
    }

    fn create_search_widget(&mut self) -> Option<ViewHandle> {
        self.new_view("search widget")
    }

    fn place_at(&mut self, span: CellSpan, view: ViewHandle) {
        let placed = PlacedView { view, span };
        self.events.push(SurfaceEvent::Placed(placed.clone()));
        self.placed.push(placed);
    }

    fn clear_screens(&mut self) {
        self.placed.clear();
    }

    fn update_action_slot(&mut self, container: Container, item: &ItemRecord) {
        self.events.push(SurfaceEvent::ActionSlot {
            container,
            item: item.id,
        });
    }

    fn add_to_dock_bar(&mut self, item: &ItemRecord) {
        self.events.push(SurfaceEvent::DockBar(item.id));
    }

    fn set_drawer_adapter(&mut self, adapter: DrawerAdapter) {
        self.events.push(SurfaceEvent::Drawer {
            entries: adapter.len(),
        });
        self.drawer = Some(adapter);
    }

    fn has_focus(&self) -> bool {
        self.focus.is_some() || self.focused_folder.is_some()
    }

    fn focus_screen(&mut self, screen: ScreenIndex) {
        self.focus = Some(screen);
        self.events.push(SurfaceEvent::FocusScreen(screen));
    }

    fn open_folder(&mut self, folder: &ItemRecord) {
        if let Some(id) = folder.kind.folder_id() {
            self.open_folders.shift_remove(&id);
            self.open_folders.insert(id);
            self.events.push(SurfaceEvent::FolderOpened(id));
        }
    }

    fn open_folder_ids(&self) -> Vec<FolderId> {
        self.open_folders.iter().copied().collect()
    }

    fn focus_open_folder(&mut self) {
        if let Some(&id) = self.open_folders.last() {
            self.focused_folder = Some(id);
            self.events.push(SurfaceEvent::FolderFocused(id));
        }
    }

    fn show_all_items(&mut self) {
        self.all_items_open = true;
        self.events.push(SurfaceEvent::AllItemsShown);
    }

    fn is_all_items_open(&self) -> bool {
        self.all_items_open
    }

    fn open_quick_access_bar(&mut self) {
        self.quick_access_open = true;
        self.events.push(SurfaceEvent::QuickAccessOpened);
    }

    fn is_quick_access_open(&self) -> bool {
        self.quick_access_open
    }

    fn show_notice(&mut self, notice: Notice) {
        self.events.push(SurfaceEvent::Notice(notice));
    }
}

#[cfg(test)]
#[path = "tests/surface_tests.rs"]
mod tests;
