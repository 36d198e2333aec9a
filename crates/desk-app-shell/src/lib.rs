//! The owning context for desk binding.
//!
//! [`DesktopShell`] keeps the generation cursor, supersedes binders, restores
//! pending presentation state once items are bound, and carries the saved
//! state across a teardown.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

use desk_core::collections::map::HashMap;
use desk_core::{
    create_view_for, live_grids, BindError, BindRequest, BindStage, BinderConfig, DesktopBinder,
    DesktopSurface, DrawerAdapter, FolderId, GenerationCursor, HostError, ItemRecord,
    MemorySurface, Notice, WidgetHost, WidgetId, WidgetRecord,
};
use desk_grid::{
    find_all_vacant, AllocationExhausted, CellInfo, CellSpan, GridError, GridMetrics, GridSize,
    OccupancyGrid, SavedOccupancy, ScreenIndex,
};
use desk_runtime_std::StdRuntime;

mod state;

pub use state::*;

pub const DEFAULT_SCREEN_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShellConfig {
    pub grid: GridSize,
    pub screen_count: usize,
    pub binder: BinderConfig,
    pub metrics: GridMetrics,
}

impl ShellConfig {
    /// An empty in-memory surface with this grid and screen count.
    pub fn memory_surface(&self) -> MemorySurface {
        MemorySurface::new(self.grid, self.screen_count)
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::default(),
            screen_count: DEFAULT_SCREEN_COUNT,
            binder: BinderConfig::default(),
            metrics: GridMetrics::default(),
        }
    }
}

/// Why a new item could not be added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddError {
    Exhausted(AllocationExhausted),
    Host(HostError),
}

impl fmt::Display for AddError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddError::Exhausted(err) => write!(f, "{err}"),
            AddError::Host(err) => write!(f, "widget host refused the widget: {err}"),
        }
    }
}

impl std::error::Error for AddError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AddError::Exhausted(err) => Some(err),
            AddError::Host(err) => Some(err),
        }
    }
}

impl From<AllocationExhausted> for AddError {
    fn from(err: AllocationExhausted) -> Self {
        AddError::Exhausted(err)
    }
}

impl From<HostError> for AddError {
    fn from(err: HostError) -> Self {
        AddError::Host(err)
    }
}

/// Presentation state to bring back once the next binding run has placed
/// its items.
#[derive(Debug, Default)]
struct PendingRestore {
    open_folders: Vec<FolderId>,
    all_items_open: bool,
    quick_access_open: bool,
    rename_folder: Option<FolderId>,
}

#[derive(Debug, Default)]
struct ShellState {
    restore: PendingRestore,
    restoring: bool,
    pending_add: Option<CellInfo>,
    pending_saved: Option<SavedOccupancy>,
    /// Adds made while restoring; merged into the next binding run.
    deferred_items: Vec<ItemRecord>,
    deferred_widgets: Vec<WidgetRecord>,
    folders: HashMap<FolderId, ItemRecord>,
    rename_target: Option<ItemRecord>,
    failures: Vec<BindError>,
}

fn index_folders(items: &[ItemRecord]) -> HashMap<FolderId, ItemRecord> {
    let mut folders = HashMap::default();
    for item in items {
        if let Some(id) = item.kind.folder_id() {
            folders.insert(id, item.clone());
        }
    }
    folders
}

/// Runs after the last item chunk. Every target that no longer resolves is
/// skipped.
fn restore_pending(surface: &mut dyn DesktopSurface, state: &mut ShellState) {
    if !surface.has_focus() {
        let screen = surface.current_screen();
        surface.focus_screen(screen);
    }

    let restore = mem::take(&mut state.restore);
    let mut opened = false;
    for id in restore.open_folders {
        match state.folders.get(&id) {
            Some(folder) => {
                surface.open_folder(folder);
                opened = true;
            }
            None => log::debug!("open folder {id} no longer exists"),
        }
    }
    if opened {
        surface.focus_open_folder();
    }

    if restore.all_items_open {
        surface.show_all_items();
    }
    if restore.quick_access_open {
        surface.open_quick_access_bar();
    }

    if let Some(id) = restore.rename_folder {
        state.rename_target = state.folders.get(&id).cloned();
        if state.rename_target.is_none() {
            log::debug!("folder {id} pending rename no longer exists");
        }
    }
}

pub struct DesktopShell<S, H>
where
    S: DesktopSurface + 'static,
    H: WidgetHost + 'static,
{
    runtime: StdRuntime,
    generation: GenerationCursor,
    surface: Rc<RefCell<S>>,
    host: Rc<RefCell<H>>,
    config: ShellConfig,
    binder: Option<DesktopBinder>,
    state: Rc<RefCell<ShellState>>,
}

impl<S, H> DesktopShell<S, H>
where
    S: DesktopSurface + 'static,
    H: WidgetHost + 'static,
{
    pub fn new(surface: S, host: H, config: ShellConfig) -> Self {
        Self {
            runtime: StdRuntime::new(),
            generation: GenerationCursor::new(),
            surface: Rc::new(RefCell::new(surface)),
            host: Rc::new(RefCell::new(host)),
            config,
            binder: None,
            state: Rc::new(RefCell::new(ShellState::default())),
        }
    }

    pub fn runtime(&self) -> &StdRuntime {
        &self.runtime
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn surface(&self) -> std::cell::Ref<'_, S> {
        self.surface.borrow()
    }

    pub fn surface_mut(&self) -> std::cell::RefMut<'_, S> {
        self.surface.borrow_mut()
    }

    pub fn host(&self) -> std::cell::Ref<'_, H> {
        self.host.borrow()
    }

    pub fn host_mut(&self) -> std::cell::RefMut<'_, H> {
        self.host.borrow_mut()
    }

    /// The binder of the latest run, if any.
    pub fn binder(&self) -> Option<&DesktopBinder> {
        self.binder.as_ref()
    }

    pub fn stage(&self) -> Option<BindStage> {
        self.binder.as_ref().map(DesktopBinder::stage)
    }

    pub fn is_restoring(&self) -> bool {
        self.state.borrow().restoring
    }

    /// Failures reported by binders since the shell was created.
    pub fn failures(&self) -> Vec<BindError> {
        self.state.borrow().failures.clone()
    }

    /// The folder a rename was pending on, once the run that brought it back
    /// has bound its items.
    pub fn rename_target(&self) -> Option<ItemRecord> {
        self.state.borrow().rename_target.clone()
    }

    pub fn pending_add(&self) -> Option<CellInfo> {
        self.state.borrow().pending_add.clone()
    }

    /// Supersedes any running binder and starts binding freshly loaded data.
    ///
    /// The current screen is read once here. Items and widgets added while
    /// restoring are appended to the loaded ones.
    pub fn start_binding(
        &mut self,
        mut items: Vec<ItemRecord>,
        mut widgets: Vec<WidgetRecord>,
        drawer: DrawerAdapter,
    ) -> DesktopBinder {
        if let Some(previous) = self.binder.take() {
            previous.cancel();
        }
        let token = self.generation.advance();

        let current_screen = {
            let mut surface = self.surface.borrow_mut();
            surface.clear_screens();
            surface.current_screen()
        };

        {
            let mut state = self.state.borrow_mut();
            items.append(&mut state.deferred_items);
            widgets.append(&mut state.deferred_widgets);
            state.folders = index_folders(&items);
            state.rename_target = None;
            state.restoring = false;
        }

        let surface: Rc<RefCell<dyn DesktopSurface>> = self.surface.clone();
        let host: Rc<RefCell<dyn WidgetHost>> = self.host.clone();
        let binder = DesktopBinder::new(
            BindRequest {
                items,
                widgets,
                drawer,
                current_screen,
            },
            token,
            self.runtime.runtime_handle(),
            surface,
            host,
            self.config.binder,
        );

        {
            let surface = Rc::clone(&self.surface);
            let state = Rc::clone(&self.state);
            binder.on_items_bound(move || {
                let mut surface = surface.borrow_mut();
                restore_pending(&mut *surface, &mut state.borrow_mut());
            });
        }
        {
            let state = Rc::clone(&self.state);
            binder.on_failure(move |err| {
                log::error!("desk binding stopped: {err}");
                state.borrow_mut().failures.push(err.clone());
            });
        }

        binder.start();
        self.binder = Some(binder.clone());
        binder
    }

    /// Cancels the running binder, if any.
    pub fn cancel(&mut self) {
        if let Some(binder) = &self.binder {
            binder.cancel();
        }
    }

    /// Tears the shell down: the running binder stops and every outstanding
    /// token goes stale.
    pub fn destroy(&mut self) {
        self.cancel();
        self.generation.invalidate();
        self.runtime.clear_pass_waker();
        log::debug!("shell destroyed at generation {}", self.generation.current());
    }

    /// Whether the host should drive [`pump`](Self::pump).
    pub fn should_pump(&self) -> bool {
        self.runtime.take_pass_request() || self.runtime.runtime().has_tasks()
    }

    /// Runs one queued task.
    pub fn run_next(&self) -> bool {
        self.runtime.run_next()
    }

    /// Runs queued tasks until none remain and returns how many ran.
    pub fn pump(&self) -> usize {
        self.runtime.run_until_idle()
    }

    /// Marks a new placement aimed at `(x, y)` on `screen`, capturing that
    /// screen's live occupancy.
    pub fn begin_add(&mut self, screen: ScreenIndex, x: usize, y: usize) -> Result<(), GridError> {
        let grid = {
            let surface = self.surface.borrow();
            let screens = surface.screen_count();
            if screen >= screens {
                return Err(GridError::ScreenOutOfRange { screen, screens });
            }
            OccupancyGrid::build(screen, surface.grid_size(), &surface.occupied_spans(screen))?
        };
        let mut state = self.state.borrow_mut();
        state.pending_add = Some(CellInfo::for_screen(grid).with_cell(x, y, 1, 1));
        state.pending_saved = None;
        Ok(())
    }

    /// Finds room for a `span_x × span_y` span.
    ///
    /// `cell_info`, or else the pending placement, is tried first. Failing
    /// that every screen is searched on the live surface. The saved mask of
    /// a pending placement replaces its screen only while restoring. When
    /// nothing fits, an out-of-space notice is shown.
    pub fn find_slot(
        &self,
        cell_info: Option<&CellInfo>,
        span_x: usize,
        span_y: usize,
    ) -> Result<CellSpan, AllocationExhausted> {
        let state = self.state.borrow();
        let cached = cell_info.or(state.pending_add.as_ref());
        if let Some(span) = cached.and_then(|info| info.find_cell_for_span(span_x, span_y)) {
            return Ok(span);
        }

        let saved = if state.restoring {
            state.pending_saved.as_ref()
        } else {
            None
        };
        let widened = {
            let surface = self.surface.borrow();
            live_grids(&*surface).and_then(|grids| {
                find_all_vacant(&grids, saved).or_else(|err| {
                    log::debug!("saved occupancy ignored: {err}");
                    find_all_vacant(&grids, None)
                })
            })
        };
        drop(state);

        match widened {
            Ok(info) => {
                if let Some(span) = info.find_cell_for_span(span_x, span_y) {
                    return Ok(span);
                }
            }
            Err(err) => log::warn!("live occupancy unavailable: {err}"),
        }

        self.surface.borrow_mut().show_notice(Notice::OutOfSpace);
        Err(AllocationExhausted { span_x, span_y })
    }

    /// Places a new desktop item in the first slot that fits its span.
    ///
    /// While restoring, the item is only recorded and shows up in the next
    /// binding run.
    pub fn add_shortcut(
        &mut self,
        record: ItemRecord,
        cell_info: Option<&CellInfo>,
    ) -> Result<ItemRecord, AllocationExhausted> {
        let span = self.find_slot(cell_info, record.span_x, record.span_y)?;
        let mut record = record.at(span.x, span.y);
        record.screen = span.screen;

        let mut state = self.state.borrow_mut();
        state.pending_add = None;
        state.pending_saved = None;
        if state.restoring {
            state.deferred_items.push(record.clone());
            return Ok(record);
        }
        drop(state);

        let mut surface = self.surface.borrow_mut();
        match create_view_for(&mut *surface, &record) {
            Some(view) => {
                surface.place_at(span, view);
                surface.request_layout();
            }
            None => log::warn!("no view created for {} item {}", record.kind.name(), record.id),
        }
        Ok(record)
    }

    /// Places a new host widget sized from the host's minimum size.
    ///
    /// The widget id is handed back to the host whenever the widget cannot
    /// be placed.
    pub fn add_widget(
        &mut self,
        widget_id: WidgetId,
        cell_info: Option<&CellInfo>,
    ) -> Result<WidgetRecord, AddError> {
        let info = self.host.borrow().widget_info(widget_id);
        let info = match info {
            Ok(info) => info,
            Err(err) => return Err(self.release_widget(widget_id, err.into())),
        };

        let (span_x, span_y) = self.config.metrics.rect_to_cell(info.min_width, info.min_height);
        let span = match self.find_slot(cell_info, span_x, span_y) {
            Ok(span) => span,
            Err(err) => return Err(self.release_widget(widget_id, err.into())),
        };
        let mut record = WidgetRecord::new(widget_id, span);

        {
            let mut state = self.state.borrow_mut();
            state.pending_add = None;
            state.pending_saved = None;
            if state.restoring {
                state.deferred_widgets.push(record.clone());
                return Ok(record);
            }
        }

        let created = self.host.borrow_mut().create_view(widget_id, &info);
        match created {
            Ok(view) => {
                record.host_view = Some(view);
                let mut surface = self.surface.borrow_mut();
                surface.place_at(span, view);
                surface.request_layout();
                Ok(record)
            }
            Err(err) => Err(self.release_widget(widget_id, err.into())),
        }
    }

    fn release_widget(&self, widget_id: WidgetId, err: AddError) -> AddError {
        log::warn!("widget {widget_id} not added: {err}");
        self.host.borrow_mut().delete_widget_id(widget_id);
        err
    }

    pub fn save_state(&self) -> StateBundle {
        let mut bundle = StateBundle::new();
        let surface = self.surface.borrow();
        bundle.put_int(CURRENT_SCREEN, surface.current_screen() as u64);

        let open_folders = surface.open_folder_ids();
        if !open_folders.is_empty() {
            bundle.put(OPEN_FOLDERS, StateValue::Ids(open_folders));
        }
        if surface.is_all_items_open() {
            bundle.put_bool(ALL_ITEMS_OPEN, true);
        }
        if surface.is_quick_access_open() {
            bundle.put_bool(QUICK_ACCESS_OPEN, true);
        }

        let state = self.state.borrow();
        if let Some(info) = &state.pending_add {
            if let Some(grid) = info.grid(info.screen) {
                let saved = SavedOccupancy::capture(grid);
                bundle.put_int(PENDING_ADD_SCREEN, info.screen as u64);
                bundle.put_int(PENDING_ADD_CELL_X, info.cell_x as u64);
                bundle.put_int(PENDING_ADD_CELL_Y, info.cell_y as u64);
                bundle.put_int(PENDING_ADD_SPAN_X, info.span_x as u64);
                bundle.put_int(PENDING_ADD_SPAN_Y, info.span_y as u64);
                bundle.put_int(PENDING_ADD_COUNT_X, saved.count_x as u64);
                bundle.put_int(PENDING_ADD_COUNT_Y, saved.count_y as u64);
                bundle.put(PENDING_ADD_OCCUPIED, StateValue::Mask(saved.occupied));
            }
        }

        let rename = state
            .rename_target
            .as_ref()
            .and_then(|folder| folder.kind.folder_id())
            .or(state.restore.rename_folder);
        if let Some(id) = rename {
            bundle.put_bool(PENDING_FOLDER_RENAME, true);
            bundle.put_int(PENDING_FOLDER_RENAME_ID, id);
        }
        bundle
    }

    /// Reads back a bundle written by [`save_state`](Self::save_state).
    ///
    /// Entries that no longer resolve are skipped. A pending placement or
    /// folder rename puts the shell into restoring mode until the next
    /// binding run starts.
    pub fn restore_state(&mut self, bundle: &StateBundle) {
        if let Some(screen) = bundle.index(CURRENT_SCREEN) {
            let mut surface = self.surface.borrow_mut();
            if screen < surface.screen_count() {
                surface.set_current_screen(screen);
            } else {
                log::debug!("saved screen {screen} no longer exists");
            }
        }

        let mut state = self.state.borrow_mut();
        state.restore = PendingRestore {
            open_folders: bundle.ids(OPEN_FOLDERS).map(<[u64]>::to_vec).unwrap_or_default(),
            all_items_open: bundle.flag(ALL_ITEMS_OPEN),
            quick_access_open: bundle.flag(QUICK_ACCESS_OPEN),
            rename_folder: None,
        };

        if let Some(saved) = saved_placement(bundle) {
            let (size, screens) = {
                let surface = self.surface.borrow();
                (surface.grid_size(), surface.screen_count())
            };
            let restored = if saved.screen >= screens {
                Err(GridError::ScreenOutOfRange {
                    screen: saved.screen,
                    screens,
                })
            } else if saved.count_x != size.width || saved.count_y != size.height {
                log::debug!(
                    "saved placement dropped: grid was {}x{}, desk is {}x{}",
                    saved.count_x,
                    saved.count_y,
                    size.width,
                    size.height
                );
                Ok(None)
            } else {
                CellInfo::from_saved(&saved).map(Some)
            };
            match restored {
                Ok(None) => {}
                Ok(Some(info)) => {
                    let cell_x = bundle.index(PENDING_ADD_CELL_X).unwrap_or_default();
                    let cell_y = bundle.index(PENDING_ADD_CELL_Y).unwrap_or_default();
                    let span_x = bundle.index(PENDING_ADD_SPAN_X).unwrap_or(1);
                    let span_y = bundle.index(PENDING_ADD_SPAN_Y).unwrap_or(1);
                    state.pending_add = Some(info.with_cell(cell_x, cell_y, span_x, span_y));
                    state.pending_saved = Some(saved);
                    state.restoring = true;
                }
                Err(err) => log::debug!("saved placement dropped: {err}"),
            }
        }

        if bundle.flag(PENDING_FOLDER_RENAME) {
            if let Some(id) = bundle.int(PENDING_FOLDER_RENAME_ID) {
                state.restore.rename_folder = Some(id);
                state.restoring = true;
            }
        }
    }
}

fn saved_placement(bundle: &StateBundle) -> Option<SavedOccupancy> {
    Some(SavedOccupancy {
        screen: bundle.index(PENDING_ADD_SCREEN)?,
        count_x: bundle.index(PENDING_ADD_COUNT_X)?,
        count_y: bundle.index(PENDING_ADD_COUNT_Y)?,
        occupied: bundle.mask(PENDING_ADD_OCCUPIED)?.to_vec(),
    })
}

impl<S, H> Drop for DesktopShell<S, H>
where
    S: DesktopSurface + 'static,
    H: WidgetHost + 'static,
{
    fn drop(&mut self) {
        self.cancel();
        self.generation.invalidate();
    }
}
