#![doc = r"Core runtime pieces for binding a loaded desk into its presentation."]

pub mod binder;
pub mod collections;
pub mod generation;
pub mod platform;
pub mod record;
pub mod runtime;
pub mod surface;

pub use binder::{
    allocate_span, create_view_for, prioritize_widgets, BindError, BindRequest, BindStage,
    BinderConfig, DesktopBinder, DEFAULT_ITEMS_PER_CHUNK,
};
pub use generation::{GenerationCursor, GenerationToken};
pub use platform::RuntimeScheduler;
pub use record::{
    Container, DrawerAdapter, FolderId, FolderInfo, ItemId, ItemKind, ItemRecord, LiveFolderInfo,
    ShortcutInfo, WidgetId, WidgetRecord,
};
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle};
pub use surface::{
    live_grids, DesktopSurface, HostError, MemorySurface, Notice, PlacedView, SurfaceEvent,
    ViewHandle, WidgetHost, WidgetMetadata,
};

#[cfg(test)]
pub use runtime::TestScheduler;

pub use desk_grid;
