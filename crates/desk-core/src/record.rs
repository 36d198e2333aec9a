//! Records handed over by the loader.
//!
//! These are read-only inputs. The binder never edits an [`ItemRecord`];
//! the only thing it adds to a [`WidgetRecord`] is the host view, and only
//! at the moment that widget is bound.

use desk_grid::{CellSpan, ScreenIndex};

use crate::surface::ViewHandle;

pub type ItemId = u64;
pub type FolderId = u64;
pub type WidgetId = u32;

/// Where an item lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Container {
    Desktop,
    DockBar,
    LeftAction,
    RightAction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutInfo {
    pub title: String,
    pub target: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderInfo {
    pub id: FolderId,
    pub title: String,
    pub contents: Vec<ShortcutInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveFolderInfo {
    pub id: FolderId,
    pub title: String,
    pub source: String,
}

/// What kind of item a record describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Application(ShortcutInfo),
    Shortcut(ShortcutInfo),
    UserFolder(FolderInfo),
    LiveFolder(LiveFolderInfo),
    /// Host widgets are bound from the widget list, not the item list.
    Widget(WidgetId),
    SearchWidget,
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Application(_) => "application",
            ItemKind::Shortcut(_) => "shortcut",
            ItemKind::UserFolder(_) => "user folder",
            ItemKind::LiveFolder(_) => "live folder",
            ItemKind::Widget(_) => "widget",
            ItemKind::SearchWidget => "search widget",
        }
    }

    /// The folder id, if this is any kind of folder.
    pub fn folder_id(&self) -> Option<FolderId> {
        match self {
            ItemKind::UserFolder(folder) => Some(folder.id),
            ItemKind::LiveFolder(folder) => Some(folder.id),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: ItemId,
    pub container: Container,
    pub screen: ScreenIndex,
    /// Top-left cell. `None` means the item still needs a place.
    pub cell: Option<(usize, usize)>,
    pub span_x: usize,
    pub span_y: usize,
    pub kind: ItemKind,
}

impl ItemRecord {
    /// A 1×1 desktop item with no cell yet.
    pub fn new(id: ItemId, screen: ScreenIndex, kind: ItemKind) -> Self {
        Self {
            id,
            container: Container::Desktop,
            screen,
            cell: None,
            span_x: 1,
            span_y: 1,
            kind,
        }
    }

    pub fn at(mut self, x: usize, y: usize) -> Self {
        self.cell = Some((x, y));
        self
    }

    pub fn with_span(mut self, span_x: usize, span_y: usize) -> Self {
        self.span_x = span_x;
        self.span_y = span_y;
        self
    }

    pub fn in_container(mut self, container: Container) -> Self {
        self.container = container;
        self
    }

    /// The stored span, if the record has a cell.
    pub fn span(&self) -> Option<CellSpan> {
        self.cell
            .map(|(x, y)| CellSpan::new(self.screen, x, y, self.span_x, self.span_y))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetRecord {
    pub widget_id: WidgetId,
    pub screen: ScreenIndex,
    pub cell_x: usize,
    pub cell_y: usize,
    pub span_x: usize,
    pub span_y: usize,
    /// Filled in when the widget is bound.
    pub host_view: Option<ViewHandle>,
}

impl WidgetRecord {
    pub fn new(widget_id: WidgetId, span: CellSpan) -> Self {
        Self {
            widget_id,
            screen: span.screen,
            cell_x: span.x,
            cell_y: span.y,
            span_x: span.span_x,
            span_y: span.span_y,
            host_view: None,
        }
    }

    pub fn span(&self) -> CellSpan {
        CellSpan::new(self.screen, self.cell_x, self.cell_y, self.span_x, self.span_y)
    }
}

/// Contents of the drawer (the browsable list of everything installed).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawerAdapter {
    pub entries: Vec<ShortcutInfo>,
}

impl DrawerAdapter {
    pub fn new(entries: Vec<ShortcutInfo>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
