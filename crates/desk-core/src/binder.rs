//! Staged, chunked application of loaded records to the presentation.
//!
//! A [`DesktopBinder`] walks three stages: desktop items in fixed-size
//! chunks, then the drawer in a single step, then host widgets one at a
//! time. Every stage posts its continuation back onto the runtime instead of
//! looping, so queued interactive work gets a turn between steps. The move
//! from the drawer to widgets goes through the runtime's idle lane, which
//! keeps host calls behind anything else that is waiting.
//!
//! Each resumption first checks the binder's [`GenerationToken`]. Once the
//! token is stale the binder stops without further side effects.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use desk_grid::{find_all_vacant, find_cell_for_span, CellSpan, GridError, ScreenIndex};

use crate::generation::GenerationToken;
use crate::record::{Container, DrawerAdapter, ItemKind, ItemRecord, WidgetId, WidgetRecord};
use crate::runtime::RuntimeHandle;
use crate::surface::{live_grids, DesktopSurface, HostError, ViewHandle, WidgetHost};

pub const DEFAULT_ITEMS_PER_CHUNK: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinderConfig {
    /// Desktop items bound per step. Zero is treated as one.
    pub items_per_chunk: usize,
}

impl BinderConfig {
    fn chunk_size(&self) -> usize {
        self.items_per_chunk.max(1)
    }
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            items_per_chunk: DEFAULT_ITEMS_PER_CHUNK,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindStage {
    Idle,
    BindingItems,
    BindingIndex,
    BindingWidgets,
    Done,
    Cancelled,
    /// The widget host failed in a way later calls would repeat.
    Failed,
}

impl BindStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, BindStage::Done | BindStage::Cancelled | BindStage::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    Host(HostError),
    Grid(GridError),
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindError::Host(err) => write!(f, "widget binding failed: {err}"),
            BindError::Grid(err) => write!(f, "presentation grid is inconsistent: {err}"),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindError::Host(err) => Some(err),
            BindError::Grid(err) => Some(err),
        }
    }
}

impl From<HostError> for BindError {
    fn from(err: HostError) -> Self {
        BindError::Host(err)
    }
}

impl From<GridError> for BindError {
    fn from(err: GridError) -> Self {
        BindError::Grid(err)
    }
}

/// Freshly loaded data for one binding run.
#[derive(Clone, Debug, Default)]
pub struct BindRequest {
    pub items: Vec<ItemRecord>,
    pub widgets: Vec<WidgetRecord>,
    pub drawer: DrawerAdapter,
    /// Read once; later screen changes do not reorder this run.
    pub current_screen: ScreenIndex,
}

/// Stable partition: widgets on `current_screen` first, then the rest, each
/// group in its original order.
pub fn prioritize_widgets(
    widgets: Vec<WidgetRecord>,
    current_screen: ScreenIndex,
) -> VecDeque<WidgetRecord> {
    let (current, others): (Vec<_>, Vec<_>) = widgets
        .into_iter()
        .partition(|widget| widget.screen == current_screen);
    current.into_iter().chain(others).collect()
}

/// Creates the view for `item` with the factory matching its kind.
/// Host widgets have no factory here and yield `None`.
pub fn create_view_for(surface: &mut dyn DesktopSurface, item: &ItemRecord) -> Option<ViewHandle> {
    match &item.kind {
        ItemKind::Application(info) | ItemKind::Shortcut(info) => surface.create_shortcut(info),
        ItemKind::UserFolder(folder) => surface.create_user_folder(folder),
        ItemKind::LiveFolder(folder) => surface.create_live_folder(folder),
        ItemKind::SearchWidget => surface.create_search_widget(),
        ItemKind::Widget(_) => None,
    }
}

/// Stored spans of every desktop item and widget in a request. Allocation
/// treats them as taken even before their records are bound.
fn reserved_spans(items: &[ItemRecord], widgets: &VecDeque<WidgetRecord>) -> Vec<CellSpan> {
    items
        .iter()
        .filter(|item| item.container == Container::Desktop)
        .filter(|item| !matches!(item.kind, ItemKind::Widget(_)))
        .filter_map(ItemRecord::span)
        .chain(widgets.iter().map(WidgetRecord::span))
        .collect()
}

/// Finds room for a `span_x × span_y` span, preferring `screen` and falling
/// back to every screen in ascending order.
///
/// The live surface and `reserved` both count as occupied. Reserved spans
/// that do not fit the desk are ignored.
pub fn allocate_span(
    surface: &dyn DesktopSurface,
    reserved: &[CellSpan],
    screen: ScreenIndex,
    span_x: usize,
    span_y: usize,
) -> Result<Option<CellSpan>, GridError> {
    let size = surface.grid_size();
    let mut grids = live_grids(surface)?;
    for grid in &mut grids {
        let on_screen = grid.screen();
        for span in reserved
            .iter()
            .filter(|span| span.screen == on_screen && span.fits(size))
        {
            grid.mark_occupied(span)?;
        }
    }

    if let Some(preferred) = grids.get(screen) {
        if let Some((x, y)) = find_cell_for_span(preferred, span_x, span_y) {
            return Ok(Some(CellSpan::new(screen, x, y, span_x, span_y)));
        }
    }
    Ok(find_all_vacant(&grids, None)?.find_cell_for_span(span_x, span_y))
}

fn bind_item(
    surface: &mut dyn DesktopSurface,
    reserved: &[CellSpan],
    item: &ItemRecord,
) -> Result<(), GridError> {
    match item.container {
        Container::LeftAction | Container::RightAction => {
            surface.update_action_slot(item.container, item);
            return Ok(());
        }
        Container::DockBar => {
            surface.add_to_dock_bar(item);
            return Ok(());
        }
        Container::Desktop => {}
    }

    if let ItemKind::Widget(widget_id) = item.kind {
        log::warn!(
            "item {} refers to host widget {widget_id}; host widgets bind from the widget list",
            item.id
        );
        return Ok(());
    }

    let span = match item.span() {
        Some(span) if span.fits(surface.grid_size()) && span.screen < surface.screen_count() => span,
        Some(span) => {
            log::warn!("item {} has a span outside the desk: {span:?}", item.id);
            return Ok(());
        }
        None => match allocate_span(&*surface, reserved, item.screen, item.span_x, item.span_y)? {
            Some(span) => span,
            None => {
                log::warn!("no room for item {}; skipping", item.id);
                return Ok(());
            }
        },
    };

    match create_view_for(surface, item) {
        Some(view) => surface.place_at(span, view),
        None => log::warn!("no view created for {} item {}", item.kind.name(), item.id),
    }
    Ok(())
}

enum Step {
    Next,
    WhenIdle,
    Finished,
}

type ItemsBoundCallback = Box<dyn FnMut()>;
type FailureCallback = Box<dyn FnMut(&BindError)>;

struct BinderInner {
    token: GenerationToken,
    runtime: RuntimeHandle,
    surface: Rc<RefCell<dyn DesktopSurface>>,
    host: Rc<RefCell<dyn WidgetHost>>,
    chunk_size: usize,
    current_screen: ScreenIndex,
    items: Vec<ItemRecord>,
    reserved: Vec<CellSpan>,
    next_item: Cell<usize>,
    drawer: RefCell<Option<DrawerAdapter>>,
    widgets: RefCell<VecDeque<WidgetRecord>>,
    bound_widgets: RefCell<Vec<WidgetRecord>>,
    stage: Cell<BindStage>,
    steps: Cell<usize>,
    on_items_bound: RefCell<Option<ItemsBoundCallback>>,
    on_failure: RefCell<Option<FailureCallback>>,
}

impl BinderInner {
    fn resume(self: Rc<Self>) {
        let stage = self.stage.get();
        if stage.is_terminal() {
            return;
        }
        if self.token.is_stale() {
            log::debug!(
                "binder generation {} superseded during {stage:?}",
                self.token.id()
            );
            self.stage.set(BindStage::Cancelled);
            return;
        }

        self.steps.set(self.steps.get() + 1);
        let step = match stage {
            BindStage::BindingItems => self.bind_items(),
            BindStage::BindingIndex => Ok(self.bind_drawer()),
            BindStage::BindingWidgets => self.bind_next_widget(),
            BindStage::Idle | BindStage::Done | BindStage::Cancelled | BindStage::Failed => return,
        };

        match step {
            Ok(Step::Next) => self.post(false),
            Ok(Step::WhenIdle) => self.post(true),
            Ok(Step::Finished) => {
                log::debug!(
                    "binder generation {} done after {} steps",
                    self.token.id(),
                    self.steps.get()
                );
                self.stage.set(BindStage::Done);
            }
            Err(err) => self.fail(err),
        }
    }

    fn post(self: Rc<Self>, when_idle: bool) {
        let runtime = self.runtime.clone();
        let this = Rc::clone(&self);
        let posted = if when_idle {
            runtime.spawn_when_idle(move || this.resume())
        } else {
            runtime.spawn_task(move || this.resume())
        };
        if !posted {
            log::debug!("runtime dropped; binder generation {} stops", self.token.id());
            self.stage.set(BindStage::Cancelled);
        }
    }

    fn bind_items(&self) -> Result<Step, BindError> {
        let start = self.next_item.get();
        let end = (start + self.chunk_size).min(self.items.len());
        {
            let mut surface = self.surface.borrow_mut();
            for item in &self.items[start..end] {
                bind_item(&mut *surface, &self.reserved, item)?;
            }
            surface.request_layout();
        }
        self.next_item.set(end);
        log::trace!("bound items {start}..{end} of {}", self.items.len());

        if end < self.items.len() {
            return Ok(Step::Next);
        }

        // The owner may touch the surface from here; no borrow is held.
        let callback = self.on_items_bound.borrow_mut().take();
        if let Some(mut callback) = callback {
            callback();
        }
        // The callback may have cancelled this binder.
        if self.stage.get() == BindStage::BindingItems {
            self.stage.set(BindStage::BindingIndex);
        }
        Ok(Step::Next)
    }

    fn bind_drawer(&self) -> Step {
        let adapter = self.drawer.borrow_mut().take();
        if let Some(adapter) = adapter {
            self.surface.borrow_mut().set_drawer_adapter(adapter);
        }
        self.stage.set(BindStage::BindingWidgets);
        Step::WhenIdle
    }

    fn bind_next_widget(&self) -> Result<Step, BindError> {
        let next = self.widgets.borrow_mut().pop_front();
        if let Some(mut record) = next {
            let (grid, screens) = {
                let surface = self.surface.borrow();
                (surface.grid_size(), surface.screen_count())
            };
            if !record.span().fits(grid) || record.screen >= screens {
                log::warn!(
                    "widget {} has a span outside the desk: {:?}",
                    record.widget_id,
                    record.span()
                );
            } else {
                match self.attach_host_view(&mut record) {
                    Ok(view) => {
                        let mut surface = self.surface.borrow_mut();
                        surface.place_at(record.span(), view);
                        surface.request_layout();
                        drop(surface);
                        self.bound_widgets.borrow_mut().push(record);
                    }
                    Err(err) if err.is_recoverable() => {
                        log::warn!("skipping widget {}: {err}", record.widget_id);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        if self.widgets.borrow().is_empty() {
            Ok(Step::Finished)
        } else {
            Ok(Step::Next)
        }
    }

    fn attach_host_view(&self, record: &mut WidgetRecord) -> Result<ViewHandle, HostError> {
        let mut host = self.host.borrow_mut();
        let info = host.widget_info(record.widget_id)?;
        let view = host.create_view(record.widget_id, &info)?;
        log::trace!(
            "widget {} ({}) bound on screen {}",
            record.widget_id,
            info.provider,
            record.screen
        );
        record.host_view = Some(view);
        Ok(view)
    }

    fn fail(&self, err: BindError) {
        log::error!("binder generation {} failed: {err}", self.token.id());
        self.stage.set(BindStage::Failed);
        let callback = self.on_failure.borrow_mut().take();
        if let Some(mut callback) = callback {
            callback(&err);
        }
    }
}

/// Binds one loaded desk into the presentation, a step at a time.
///
/// Cloning yields another handle to the same binder.
#[derive(Clone)]
pub struct DesktopBinder {
    inner: Rc<BinderInner>,
}

impl DesktopBinder {
    pub fn new(
        request: BindRequest,
        token: GenerationToken,
        runtime: RuntimeHandle,
        surface: Rc<RefCell<dyn DesktopSurface>>,
        host: Rc<RefCell<dyn WidgetHost>>,
        config: BinderConfig,
    ) -> Self {
        let BindRequest {
            items,
            widgets,
            drawer,
            current_screen,
        } = request;
        let widgets = prioritize_widgets(widgets, current_screen);
        let reserved = reserved_spans(&items, &widgets);
        Self {
            inner: Rc::new(BinderInner {
                token,
                runtime,
                surface,
                host,
                chunk_size: config.chunk_size(),
                current_screen,
                items,
                reserved,
                next_item: Cell::new(0),
                drawer: RefCell::new(Some(drawer)),
                widgets: RefCell::new(widgets),
                bound_widgets: RefCell::new(Vec::new()),
                stage: Cell::new(BindStage::Idle),
                steps: Cell::new(0),
                on_items_bound: RefCell::new(None),
                on_failure: RefCell::new(None),
            }),
        }
    }

    /// Runs once, after the last item chunk and before the drawer step.
    pub fn on_items_bound(&self, callback: impl FnMut() + 'static) {
        *self.inner.on_items_bound.borrow_mut() = Some(Box::new(callback));
    }

    /// Runs if the widget host fails for good.
    pub fn on_failure(&self, callback: impl FnMut(&BindError) + 'static) {
        *self.inner.on_failure.borrow_mut() = Some(Box::new(callback));
    }

    /// Posts the first item chunk. Has no effect unless the binder is idle.
    pub fn start(&self) {
        if self.inner.stage.get() != BindStage::Idle {
            return;
        }
        log::debug!(
            "binder generation {}: {} items, {} widgets, screen {}",
            self.inner.token.id(),
            self.inner.items.len(),
            self.inner.widgets.borrow().len(),
            self.inner.current_screen
        );
        self.inner.stage.set(BindStage::BindingItems);
        Rc::clone(&self.inner).post(false);
    }

    /// Stops the binder at its next resumption. A step already running
    /// finishes first.
    pub fn cancel(&self) {
        self.inner.token.cancel();
        if !self.inner.stage.get().is_terminal() {
            self.inner.stage.set(BindStage::Cancelled);
        }
    }

    pub fn stage(&self) -> BindStage {
        self.inner.stage.get()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.stage.get().is_terminal()
    }

    pub fn generation(&self) -> u64 {
        self.inner.token.id()
    }

    pub fn current_screen(&self) -> ScreenIndex {
        self.inner.current_screen
    }

    /// Number of resumed steps that did work.
    pub fn steps(&self) -> usize {
        self.inner.steps.get()
    }

    pub fn items_bound(&self) -> usize {
        self.inner.next_item.get()
    }

    /// Widgets still waiting, in binding order.
    pub fn pending_widgets(&self) -> Vec<WidgetId> {
        self.inner
            .widgets
            .borrow()
            .iter()
            .map(|widget| widget.widget_id)
            .collect()
    }

    /// Widgets bound so far, with their host views attached.
    pub fn bound_widgets(&self) -> Vec<WidgetRecord> {
        self.inner.bound_widgets.borrow().clone()
    }
}

#[cfg(test)]
#[path = "tests/binder_tests.rs"]
mod tests;
